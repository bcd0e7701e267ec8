// Path: crates/ipc/src/channel.rs
//! An in-process transport over a bounded `tokio` channel.

use lvm_api::transport::{CompletionToken, Transport};
use lvm_types::error::TransportError;
use lvm_types::Task;
use tokio::sync::mpsc;

/// A task travelling to the handling thread with the token that answers it.
#[derive(Debug)]
pub struct Envelope {
    pub task: Task,
    pub token: CompletionToken,
}

/// The VM-side half: delivers tasks without waiting for them to be handled.
#[derive(Debug, Clone)]
pub struct ChannelTransport {
    tx: mpsc::Sender<Envelope>,
}

/// A transport handle that does not keep the channel open.
///
/// The handling side completes tasks through one of these, so the task loop
/// still ends once every [`ChannelTransport`] is dropped.
#[derive(Debug, Clone)]
pub struct WeakChannelTransport {
    tx: mpsc::WeakSender<Envelope>,
}

/// The handling-side half, consumed by a [`crate::HandlerActor`].
#[derive(Debug)]
pub struct TaskReceiver {
    rx: mpsc::Receiver<Envelope>,
}

impl ChannelTransport {
    /// Creates a transport whose queue holds up to `capacity` undelivered tasks.
    ///
    /// `capacity` must be non-zero.
    pub fn new(capacity: usize) -> (Self, TaskReceiver) {
        let (tx, rx) = mpsc::channel(capacity);
        (Self { tx }, TaskReceiver { rx })
    }

    /// Returns `true` once the receiving side has been dropped.
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }

    pub fn downgrade(&self) -> WeakChannelTransport {
        WeakChannelTransport {
            tx: self.tx.downgrade(),
        }
    }
}

impl Transport for ChannelTransport {
    /// Blocks the calling (VM) thread only while the queue is full.
    fn deliver(&self, task: Task, token: CompletionToken) -> Result<(), TransportError> {
        self.tx
            .blocking_send(Envelope { task, token })
            .map_err(|_| TransportError::Closed)
    }
}

impl Transport for WeakChannelTransport {
    fn deliver(&self, task: Task, token: CompletionToken) -> Result<(), TransportError> {
        let tx = self.tx.upgrade().ok_or(TransportError::Closed)?;
        tx.blocking_send(Envelope { task, token })
            .map_err(|_| TransportError::Closed)
    }
}

impl TaskReceiver {
    /// Next envelope, blocking the current thread. `None` once every
    /// transport handle is gone and the queue is drained.
    pub fn blocking_recv(&mut self) -> Option<Envelope> {
        self.rx.blocking_recv()
    }

    /// Next envelope. `None` once every transport handle is gone and the
    /// queue is drained.
    pub async fn recv(&mut self) -> Option<Envelope> {
        self.rx.recv().await
    }
}
