// Path: crates/telemetry/src/time.rs
//! An RAII timer that reports its lifetime to a metrics sink.

use crate::sinks::DispatchMetricsSink;
use std::time::Instant;

/// Observes the elapsed time between creation and drop as a round trip.
pub struct RoundTripTimer<'a> {
    sink: &'a dyn DispatchMetricsSink,
    opcode: &'a str,
    start: Instant,
}

impl<'a> RoundTripTimer<'a> {
    pub fn start(sink: &'a dyn DispatchMetricsSink, opcode: &'a str) -> Self {
        Self {
            sink,
            opcode,
            start: Instant::now(),
        }
    }
}

impl Drop for RoundTripTimer<'_> {
    fn drop(&mut self) {
        self.sink
            .observe_round_trip(self.opcode, self.start.elapsed().as_secs_f64());
    }
}
