//! Platform adapters for the core traits

mod envelope;
mod memory_store;

pub use envelope::{pbkdf2_iterations, EnvelopeDecryptor, CURRENT_ENVELOPE_VERSION};
pub use memory_store::InMemoryStore;
