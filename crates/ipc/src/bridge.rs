// Path: crates/ipc/src/bridge.rs
//! Assembles the registry, handler, transport and handling thread.

use crate::actor::spawn_handler_thread;
use crate::channel::ChannelTransport;
use anyhow::{bail, Context, Result};
use lvm_api::chain::ChainApi;
use lvm_dispatch::{RequestHandler, StorageRegistry, TaskDispatcher};
use lvm_telemetry::sinks::DispatchMetricsSink;
use lvm_types::config::BridgeConfig;
use std::sync::Arc;
use std::thread::JoinHandle;
use thiserror::Error;

/// Why [`ChainBridge::shutdown`] did not complete.
#[derive(Error, Debug)]
pub enum ShutdownError {
    /// Other owners still hold the dispatcher. The bridge is handed back
    /// untouched so shutdown can be retried once they are gone.
    #[error("dispatcher is still referenced by {owners} other owners")]
    StillShared {
        /// The bridge, still running.
        bridge: Box<ChainBridge>,
        /// Number of other dispatcher owners.
        owners: usize,
    },
    /// The handling thread terminated by panicking.
    #[error("chain handler thread panicked")]
    HandlerPanicked,
}

/// The node-owned bridge context: built once at startup, passed by reference
/// to the VM integration layer, torn down with [`ChainBridge::shutdown`].
#[derive(Debug)]
pub struct ChainBridge {
    dispatcher: Arc<TaskDispatcher>,
    handler_thread: JoinHandle<()>,
}

impl ChainBridge {
    /// Builds the bridge and starts the chain-handling thread.
    pub fn start(
        config: &BridgeConfig,
        chain: Arc<dyn ChainApi>,
        metrics: Arc<dyn DispatchMetricsSink>,
    ) -> Result<Self> {
        if config.channel_capacity == 0 {
            bail!("channel_capacity must be greater than zero");
        }
        let registry = Arc::new(StorageRegistry::new());
        let handler = Arc::new(
            RequestHandler::new(registry, chain)
                .with_metrics(Arc::clone(&metrics))
                .with_log_params(config.log_params),
        );
        let (transport, receiver) = ChannelTransport::new(config.channel_capacity);
        let handler_thread = spawn_handler_thread(
            config,
            receiver,
            Arc::clone(&handler),
            Arc::new(transport.downgrade()),
        )
        .context("failed to spawn chain handler thread")?;
        let dispatcher =
            Arc::new(TaskDispatcher::new(handler, Arc::new(transport)).with_metrics(metrics));
        tracing::info!(
            target: "ipc",
            thread = %config.handler_thread_name,
            capacity = config.channel_capacity,
            "chain bridge started"
        );
        Ok(Self {
            dispatcher,
            handler_thread,
        })
    }

    pub fn dispatcher(&self) -> &Arc<TaskDispatcher> {
        &self.dispatcher
    }

    pub fn registry(&self) -> &Arc<StorageRegistry> {
        self.dispatcher.registry()
    }

    /// Closes the transport and joins the handling thread.
    ///
    /// The handling thread only stops once the last transport handle is gone,
    /// so this refuses while any clone of the dispatcher is alive and returns
    /// the bridge inside [`ShutdownError::StillShared`].
    pub fn shutdown(self) -> Result<(), ShutdownError> {
        let refs = Arc::strong_count(&self.dispatcher);
        if refs > 1 {
            return Err(ShutdownError::StillShared {
                bridge: Box::new(self),
                owners: refs - 1,
            });
        }
        let Self {
            dispatcher,
            handler_thread,
        } = self;
        drop(dispatcher);
        handler_thread
            .join()
            .map_err(|_| ShutdownError::HandlerPanicked)?;
        tracing::info!(target: "ipc", "chain bridge stopped");
        Ok(())
    }
}
