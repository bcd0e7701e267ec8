// Path: crates/types/src/lib.rs
#![forbid(unsafe_code)]
#![deny(missing_docs)]
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

//! # LVM Bridge Types
//!
//! Foundational data structures shared by every crate of the chain task
//! bridge: the `Task`/`TaskResult` pair that crosses the thread boundary
//! between the VM and the chain-handling thread, execution-context handles,
//! storage snapshots and change-sets, and the error and configuration types.
//!
//! ## Architectural Role
//!
//! As the base crate, `lvm-types` has no dependency on any other bridge
//! crate. Everything that travels between the VM side and the handling side
//! is defined here so both ends agree on a single canonical encoding.

/// The canonical binary codec used for task parameters and return values.
pub mod codec;
/// Shared configuration structures (e.g., `BridgeConfig`).
pub mod config;
/// Contract metadata and event records surfaced by the chain API.
pub mod contract;
/// A unified set of all error types used across the bridge.
pub mod error;
/// Opaque execution-context handles and their allocator.
pub mod handle;
/// Storage values, per-context snapshots and structured change-sets.
pub mod storage;
/// Opcodes and the `Task` / `TaskResult` request-response pair.
pub mod task;

pub use handle::{ContextHandle, HandleAllocator};
pub use task::{Opcode, Task, TaskResult, TaskStatus};
