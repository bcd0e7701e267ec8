// Path: crates/api/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
//! # LVM Bridge API
//!
//! Core traits at the two seams of the chain task bridge: the chain API the
//! handling thread calls into, and the transport that carries tasks across
//! the thread boundary.

pub mod chain;
pub mod transport;

/// A curated set of the most commonly used traits and types.
pub mod prelude {
    pub use crate::chain::{ChainApi, ChainRequest, ChainResult};
    pub use crate::transport::{CompletionToken, Transport};
}
