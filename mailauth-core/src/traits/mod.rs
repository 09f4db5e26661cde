//! Storage and platform abstraction traits
//!
//! Implemented by the platform layer and injected into [`crate::services::ServiceContext`].

mod domain_repository;
mod secret_decryptor;
mod sender_repository;

pub use domain_repository::DomainRepository;
pub use secret_decryptor::SecretDecryptor;
pub use sender_repository::SenderRepository;
