// Path: crates/dispatch/src/handler.rs
//! The handling-thread side of the bridge.

use crate::handlers::HandlerTable;
use crate::registry::StorageRegistry;
use lvm_api::chain::{ChainApi, ChainRequest};
use lvm_telemetry::sinks::{DispatchMetricsSink, NopSink};
use lvm_types::error::{ChainApiError, DispatchError};
use lvm_types::{Task, TaskResult, TaskStatus};
use std::panic::{catch_unwind, AssertUnwindSafe};
use std::sync::Arc;

/// Turns each task into exactly one [`TaskResult`] on the chain-handling thread.
///
/// Nothing escapes `on_request` except a result: arity and decoding errors,
/// missing contexts, unknown opcodes, chain domain errors and even a
/// panicking chain implementation are all reported through the status code.
pub struct RequestHandler {
    registry: Arc<StorageRegistry>,
    table: HandlerTable,
    chain: Arc<dyn ChainApi>,
    metrics: Arc<dyn DispatchMetricsSink>,
    log_params: bool,
}

impl RequestHandler {
    /// A handler using the standard opcode table and no metrics.
    pub fn new(registry: Arc<StorageRegistry>, chain: Arc<dyn ChainApi>) -> Self {
        Self {
            registry,
            table: HandlerTable::standard(),
            chain,
            metrics: Arc::new(NopSink),
            log_params: false,
        }
    }

    pub fn with_table(mut self, table: HandlerTable) -> Self {
        self.table = table;
        self
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn with_log_params(mut self, log_params: bool) -> Self {
        self.log_params = log_params;
        self
    }

    pub fn registry(&self) -> &Arc<StorageRegistry> {
        &self.registry
    }

    /// Handles one task. Must run on the chain-handling thread.
    pub fn on_request(&self, task: &Task) -> TaskResult {
        let opcode = task
            .known_opcode()
            .map(|op| op.name())
            .unwrap_or("UNKNOWN");
        if self.log_params {
            let params: Vec<String> = task.params.iter().map(hex::encode).collect();
            tracing::trace!(target: "dispatch", id = task.correlation_id, opcode, ?params, "task params");
        }

        let result = match self.try_handle(task) {
            Ok(values) => {
                tracing::debug!(
                    target: "dispatch",
                    id = task.correlation_id,
                    opcode,
                    context = %task.context,
                    values = values.len(),
                    "task handled"
                );
                TaskResult::ok(task, values)
            }
            Err(e) => {
                let status = e.status();
                if status == TaskStatus::MissingContext {
                    tracing::error!(target: "dispatch", id = task.correlation_id, opcode, error = %e, "task for unregistered execution context");
                } else {
                    tracing::warn!(target: "dispatch", id = task.correlation_id, opcode, context = %task.context, error = %e, "task failed");
                }
                TaskResult::failed(task, status, e.to_string())
            }
        };

        self.metrics
            .inc_dispatch_total(opcode, result.status.label());
        self.metrics.set_registered_contexts(self.registry.len());
        result
    }

    fn try_handle(&self, task: &Task) -> Result<Vec<Vec<u8>>, DispatchError> {
        let snapshot = self
            .registry
            .lookup(task.context)
            .ok_or(DispatchError::MissingContext(task.context))?;
        let req = ChainRequest::new(task.context, &snapshot);
        let chain = self.chain.as_ref();
        let outcome = catch_unwind(AssertUnwindSafe(|| self.table.dispatch(chain, &req, task)));
        outcome.unwrap_or_else(|_| {
            Err(ChainApiError::Backend("chain operation panicked".to_string()).into())
        })
    }
}

impl std::fmt::Debug for RequestHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestHandler")
            .field("registry", &self.registry)
            .field("table", &self.table)
            .field("chain", &"Arc<dyn ChainApi>")
            .finish()
    }
}
