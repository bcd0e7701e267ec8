// Path: crates/ipc/src/lib.rs
//! # LVM Bridge IPC Crate Lints
//!
//! This crate enforces a strict set of lints to ensure high-quality,
//! panic-free, and well-documented code. Panics are disallowed in non-test
//! code to promote robust error handling.
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

pub mod actor;
pub mod bridge;
pub mod channel;

pub use actor::{spawn_handler_thread, HandlerActor};
pub use bridge::{ChainBridge, ShutdownError};
pub use channel::{ChannelTransport, Envelope, TaskReceiver, WeakChannelTransport};
