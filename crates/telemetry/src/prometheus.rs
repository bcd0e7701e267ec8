// Path: crates/telemetry/src/prometheus.rs
//! A concrete implementation of the metrics sinks using the Prometheus crate.

use crate::sinks::*;
use once_cell::sync::Lazy;
use prometheus::{
    exponential_buckets, register_histogram_vec, register_int_counter, register_int_counter_vec,
    register_int_gauge, HistogramVec, IntCounter, IntCounterVec, IntGauge,
};

// --- Metric Definitions ---

// GAUGE (no _total suffix)
static REGISTERED_CONTEXTS: Lazy<Option<IntGauge>> = Lazy::new(|| {
    register_int_gauge!(
        "lvm_bridge_registered_contexts",
        "Current number of execution contexts with a registered storage snapshot."
    )
    .ok()
});

// COUNTER (correctly uses _total suffix)
static DISPATCH_TOTAL: Lazy<Option<IntCounterVec>> = Lazy::new(|| {
    register_int_counter_vec!(
        "lvm_bridge_dispatch_total",
        "Total number of tasks handled on the chain-handling thread.",
        &["opcode", "status"]
    )
    .ok()
});
static TRANSPORT_FAILURES_TOTAL: Lazy<Option<IntCounter>> = Lazy::new(|| {
    register_int_counter!(
        "lvm_bridge_transport_failures_total",
        "Total number of blocking calls aborted by a transport failure."
    )
    .ok()
});

// HISTOGRAM
static ROUND_TRIP_SECONDS: Lazy<Option<HistogramVec>> = Lazy::new(|| {
    let buckets = exponential_buckets(0.00001, 4.0, 10).ok()?;
    register_histogram_vec!(
        "lvm_bridge_round_trip_seconds",
        "VM-side latency of one blocking chain call.",
        &["opcode"],
        buckets
    )
    .ok()
});

/// Sink backed by the default Prometheus registry.
///
/// Metrics that fail to register (e.g. a name clash in an embedding process)
/// are silently skipped rather than aborting dispatch.
#[derive(Debug, Clone, Copy, Default)]
pub struct PrometheusSink;

impl DispatchMetricsSink for PrometheusSink {
    fn inc_dispatch_total(&self, opcode: &str, status: &str) {
        if let Some(counter) = DISPATCH_TOTAL.as_ref() {
            counter.with_label_values(&[opcode, status]).inc();
        }
    }
    fn observe_round_trip(&self, opcode: &str, duration_secs: f64) {
        if let Some(histogram) = ROUND_TRIP_SECONDS.as_ref() {
            histogram.with_label_values(&[opcode]).observe(duration_secs);
        }
    }
    fn inc_transport_failures(&self) {
        if let Some(counter) = TRANSPORT_FAILURES_TOTAL.as_ref() {
            counter.inc();
        }
    }
    fn set_registered_contexts(&self, count: usize) {
        if let Some(gauge) = REGISTERED_CONTEXTS.as_ref() {
            gauge.set(count as i64);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counters_accumulate() {
        let sink = PrometheusSink;
        sink.inc_dispatch_total("EMIT", "Ok");
        sink.inc_dispatch_total("EMIT", "Ok");
        let counter = DISPATCH_TOTAL.as_ref().unwrap();
        assert!(counter.with_label_values(&["EMIT", "Ok"]).get() >= 2);
        sink.set_registered_contexts(3);
        assert_eq!(REGISTERED_CONTEXTS.as_ref().unwrap().get(), 3);
    }
}
