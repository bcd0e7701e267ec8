// Path: crates/dispatch/src/lib.rs
#![forbid(unsafe_code)]
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
//! # LVM Bridge Dispatch
//!
//! The cross-thread task dispatch core. A VM thread calls
//! [`TaskDispatcher::dispatch`], which blocks until the chain-handling thread
//! has run [`RequestHandler::on_request`] for the task and signalled the
//! result back through the transport.
//!
//! ## Components
//!
//! - [`StorageRegistry`]: maps an execution-context handle to the storage
//!   snapshot registered for that transaction evaluation.
//! - [`HandlerTable`]: maps an opcode to its minimum arity, parameter
//!   decoder, chain call and result encoder.
//! - [`RequestHandler`]: runs on the handling thread and turns a `Task` into
//!   exactly one `TaskResult`, whatever happens.
//! - [`TaskDispatcher`]: the VM-facing blocking call.

pub mod dispatcher;
pub mod handler;
pub mod handlers;
pub mod registry;

pub use dispatcher::TaskDispatcher;
pub use handler::RequestHandler;
pub use handlers::{HandlerTable, Params};
pub use registry::{ContextGuard, StorageRegistry};
