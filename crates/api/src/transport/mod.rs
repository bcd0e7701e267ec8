// Path: crates/api/src/transport/mod.rs
//! Defines the `Transport` trait and the single-use completion token.

use lvm_types::error::TransportError;
use lvm_types::{Task, TaskResult};
use tokio::sync::oneshot;

/// The sending half of a one-shot completion signal.
///
/// Created fresh for every call and consumed by [`CompletionToken::complete`],
/// so a result can be delivered at most once and never to a later call.
#[derive(Debug)]
pub struct CompletionToken {
    tx: oneshot::Sender<TaskResult>,
}

impl CompletionToken {
    /// Creates a token and the receiver the waiting side blocks on.
    pub fn channel() -> (Self, oneshot::Receiver<TaskResult>) {
        let (tx, rx) = oneshot::channel();
        (Self { tx }, rx)
    }

    /// Delivers `result` to the waiting side.
    pub fn complete(self, result: TaskResult) -> Result<(), TransportError> {
        self.tx
            .send(result)
            .map_err(|_| TransportError::ReceiverDropped)
    }

    /// Returns `true` once the waiting side has gone away.
    pub fn is_abandoned(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Moves a task from the VM thread to the chain-handling thread.
///
/// `deliver` must not block on the task being handled; it only hands the task
/// and its token over. The handling side eventually calls
/// [`Transport::on_complete`] (or completes the token directly).
pub trait Transport: Send + Sync {
    /// Hands `task` to the handling thread together with its completion token.
    fn deliver(&self, task: Task, token: CompletionToken) -> Result<(), TransportError>;

    /// Signals completion of a task on the handling side.
    fn on_complete(&self, result: TaskResult, token: CompletionToken) -> Result<(), TransportError> {
        token.complete(result)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lvm_types::{ContextHandle, Opcode, TaskStatus};

    fn task() -> Task {
        Task::new(3, Opcode::GetChainNow, vec![], ContextHandle::from_raw(1))
    }

    #[test]
    fn token_delivers_once() {
        let (token, mut rx) = CompletionToken::channel();
        token.complete(TaskResult::ok(&task(), vec![])).unwrap();
        let result = rx.try_recv().unwrap();
        assert_eq!(result.correlation_id, 3);
        assert_eq!(result.status, TaskStatus::Ok);
    }

    #[test]
    fn completing_after_receiver_dropped_fails() {
        let (token, rx) = CompletionToken::channel();
        drop(rx);
        assert!(token.is_abandoned());
        assert_eq!(
            token.complete(TaskResult::ok(&task(), vec![])),
            Err(TransportError::ReceiverDropped)
        );
    }

    #[test]
    fn dropped_token_closes_receiver() {
        let (token, mut rx) = CompletionToken::channel();
        drop(token);
        assert!(rx.try_recv().is_err());
    }
}
