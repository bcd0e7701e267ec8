// Path: crates/telemetry/src/sinks.rs
//! Defines abstract traits for metrics reporting, decoupling core logic from the backend.

/// A no-op sink for use in tests where metrics are not needed.
#[derive(Debug, Clone, Copy, Default)]
pub struct NopSink;

pub trait DispatchMetricsSink: Send + Sync + std::fmt::Debug {
    /// Counts one handled task, labelled by opcode name and status.
    fn inc_dispatch_total(&self, opcode: &str, status: &str);
    /// Records the VM-side wall time of one blocking call.
    fn observe_round_trip(&self, opcode: &str, duration_secs: f64);
    /// Counts calls that failed to reach or return from the handling thread.
    fn inc_transport_failures(&self);
    /// Sets the number of currently registered storage snapshots.
    fn set_registered_contexts(&self, count: usize);
}
impl DispatchMetricsSink for NopSink {
    fn inc_dispatch_total(&self, _opcode: &str, _status: &str) {}
    fn observe_round_trip(&self, _opcode: &str, _duration_secs: f64) {}
    fn inc_transport_failures(&self) {}
    fn set_registered_contexts(&self, _count: usize) {}
}
