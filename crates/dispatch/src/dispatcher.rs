// Path: crates/dispatch/src/dispatcher.rs
//! The VM-facing blocking call.

use crate::handler::RequestHandler;
use crate::registry::StorageRegistry;
use lvm_api::transport::{CompletionToken, Transport};
use lvm_telemetry::sinks::{DispatchMetricsSink, NopSink};
use lvm_telemetry::time::RoundTripTimer;
use lvm_types::error::{BridgeError, TransportError};
use lvm_types::{ContextHandle, Task, TaskResult, TaskStatus};
use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::Arc;

/// Makes an asynchronous, cross-thread chain request look synchronous to the VM.
///
/// One instance serves one VM execution thread: a call blocks the calling
/// thread until the handling thread has produced the result. Overlapping
/// calls on the same instance are rejected with [`BridgeError::CallInFlight`];
/// run one dispatcher per VM thread or serialize callers externally.
///
/// There is no timeout and no cancellation. A caller that needs a bounded
/// wait must layer it above [`TaskDispatcher::submit_and_wait`].
pub struct TaskDispatcher {
    handler: Arc<RequestHandler>,
    transport: Arc<dyn Transport>,
    next_correlation_id: AtomicU64,
    in_flight: AtomicBool,
    metrics: Arc<dyn DispatchMetricsSink>,
}

/// Holds the in-flight flag for the duration of one call.
struct CallSlot<'a>(&'a AtomicBool);

impl<'a> CallSlot<'a> {
    fn acquire(flag: &'a AtomicBool) -> Option<Self> {
        flag.compare_exchange(false, true, Ordering::Acquire, Ordering::Relaxed)
            .ok()
            .map(|_| CallSlot(flag))
    }
}

impl Drop for CallSlot<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}

impl TaskDispatcher {
    pub fn new(handler: Arc<RequestHandler>, transport: Arc<dyn Transport>) -> Self {
        Self {
            handler,
            transport,
            next_correlation_id: AtomicU64::new(1),
            in_flight: AtomicBool::new(false),
            metrics: Arc::new(NopSink),
        }
    }

    pub fn with_metrics(mut self, metrics: Arc<dyn DispatchMetricsSink>) -> Self {
        self.metrics = metrics;
        self
    }

    pub fn registry(&self) -> &Arc<StorageRegistry> {
        self.handler.registry()
    }

    pub fn handler(&self) -> &Arc<RequestHandler> {
        &self.handler
    }

    /// Allocates a correlation id for a new task.
    pub fn next_correlation_id(&self) -> u64 {
        self.next_correlation_id.fetch_add(1, Ordering::Relaxed)
    }

    /// Hands `task` to the handling thread and blocks until its result arrives.
    ///
    /// A fresh one-shot channel is created for every call and dropped before
    /// returning, so no later call can observe this call's signal.
    ///
    /// Must not be called from within an async runtime: the wait is a plain
    /// thread block.
    pub fn submit_and_wait(&self, task: Task) -> Result<TaskResult, BridgeError> {
        let _slot = CallSlot::acquire(&self.in_flight).ok_or(BridgeError::CallInFlight)?;
        let opcode = task
            .known_opcode()
            .map(|op| op.name())
            .unwrap_or("UNKNOWN");
        let _timer = RoundTripTimer::start(self.metrics.as_ref(), opcode);
        let correlation_id = task.correlation_id;

        let (token, rx) = CompletionToken::channel();
        if let Err(e) = self.transport.deliver(task, token) {
            return Err(self.transport_failure(correlation_id, opcode, e));
        }

        let result = match rx.blocking_recv() {
            Ok(result) => result,
            Err(_) => {
                return Err(self.transport_failure(
                    correlation_id,
                    opcode,
                    TransportError::CompletionLost,
                ))
            }
        };
        if result.correlation_id != correlation_id {
            return Err(self.transport_failure(
                correlation_id,
                opcode,
                TransportError::MismatchedResult {
                    expected: correlation_id,
                    got: result.correlation_id,
                },
            ));
        }
        Ok(result)
    }

    /// The VM's native-call entry point: `(status, return values)` for one request.
    pub fn dispatch(
        &self,
        context: ContextHandle,
        opcode: u32,
        params: Vec<Vec<u8>>,
    ) -> Result<(TaskStatus, Vec<Vec<u8>>), BridgeError> {
        let task = Task {
            correlation_id: self.next_correlation_id(),
            opcode,
            params,
            context,
        };
        let result = self.submit_and_wait(task)?;
        Ok((result.status, result.values))
    }

    /// Runs a task on the calling thread. Intended for the handling thread.
    pub fn on_request(&self, task: &Task) -> TaskResult {
        self.handler.on_request(task)
    }

    fn transport_failure(&self, id: u64, opcode: &str, e: TransportError) -> BridgeError {
        self.metrics.inc_transport_failures();
        tracing::error!(target: "dispatch", id, opcode, error = %e, "blocking call aborted");
        BridgeError::TransportFailure(e)
    }
}

impl std::fmt::Debug for TaskDispatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDispatcher")
            .field("handler", &self.handler)
            .field("in_flight", &self.in_flight.load(Ordering::Relaxed))
            .finish_non_exhaustive()
    }
}
