// Path: crates/ipc/src/actor.rs
//! The chain-handling thread's task loop.

use crate::channel::{Envelope, TaskReceiver};
use lvm_api::transport::Transport;
use lvm_dispatch::RequestHandler;
use lvm_types::config::BridgeConfig;
use std::sync::Arc;
use std::thread::JoinHandle;

/// Owns the receiving end of the transport and answers every task on it.
///
/// Each task is handled to completion before [`Transport::on_complete`] is
/// invoked for it, so all chain effects of a call happen-before the VM thread
/// resumes.
pub struct HandlerActor {
    receiver: TaskReceiver,
    handler: Arc<RequestHandler>,
    transport: Arc<dyn Transport>,
}

impl HandlerActor {
    /// `transport` must not keep the channel behind `receiver` open (use
    /// [`crate::ChannelTransport::downgrade`]), or the loop never ends.
    pub fn new(
        receiver: TaskReceiver,
        handler: Arc<RequestHandler>,
        transport: Arc<dyn Transport>,
    ) -> Self {
        Self {
            receiver,
            handler,
            transport,
        }
    }

    /// Runs on a dedicated OS thread until every transport handle is dropped.
    pub fn run_blocking(mut self) {
        tracing::info!(target: "ipc", "chain handler loop started");
        while let Some(envelope) = self.receiver.blocking_recv() {
            self.handle(envelope);
        }
        tracing::info!(target: "ipc", "chain handler loop terminated");
    }

    /// Async form of [`HandlerActor::run_blocking`].
    ///
    /// Chain operations run inline on the polling task, so this belongs on a
    /// runtime (or `LocalSet`) dedicated to chain handling.
    pub async fn run(mut self) {
        tracing::info!(target: "ipc", "chain handler task started");
        while let Some(envelope) = self.receiver.recv().await {
            self.handle(envelope);
        }
        tracing::info!(target: "ipc", "chain handler task terminated");
    }

    fn handle(&self, Envelope { task, token }: Envelope) {
        // No cancel path: an abandoned task still runs so its effects are not
        // left half-applied relative to the order the VM issued them.
        if token.is_abandoned() {
            tracing::warn!(target: "ipc", id = task.correlation_id, "waiting caller is gone; handling anyway");
        }
        let result = self.handler.on_request(&task);
        if let Err(e) = self.transport.on_complete(result, token) {
            tracing::warn!(target: "ipc", id = task.correlation_id, error = %e, "result could not be delivered");
        }
    }
}

/// Starts a [`HandlerActor`] on a named OS thread.
pub fn spawn_handler_thread(
    config: &BridgeConfig,
    receiver: TaskReceiver,
    handler: Arc<RequestHandler>,
    transport: Arc<dyn Transport>,
) -> std::io::Result<JoinHandle<()>> {
    std::thread::Builder::new()
        .name(config.handler_thread_name.clone())
        .spawn(move || HandlerActor::new(receiver, handler, transport).run_blocking())
}
