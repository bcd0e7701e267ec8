// Path: crates/test_utils/src/lib.rs
#![cfg_attr(
    not(test),
    deny(
        clippy::unwrap_used,
        clippy::expect_used,
        clippy::panic,
        clippy::unimplemented,
        clippy::todo,
        clippy::indexing_slicing
    )
)]

//! # LVM Bridge Test Utilities
//!
//! Utilities for testing the chain task bridge components.

pub mod chain;
pub mod fixtures;

pub use chain::InstrumentedChain;
