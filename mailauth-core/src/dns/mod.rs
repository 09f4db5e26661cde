//! DNS lookups used by the protocol checkers

mod resolver;

pub use resolver::{DnsResolver, HickoryResolver, LookupError};
