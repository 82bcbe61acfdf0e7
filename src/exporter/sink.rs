//! Output sinks for generated values
//!
//! A sink wraps the prometheus child handle one metric instance writes
//! into. Handles are cheap clones; the collector itself stays owned by
//! the registry. Each sink is written by exactly one time-group task.

use prometheus::{IntCounter, IntGauge};

use crate::config::MetricKind;

/// The write side of one (metric, label-combination) pair
#[derive(Clone)]
pub enum MetricSink {
    /// Monotonic counter handle
    Counter(IntCounter),
    /// Free-standing gauge handle
    Gauge(IntGauge),
}

impl MetricSink {
    /// The metric kind this sink accepts
    pub fn kind(&self) -> MetricKind {
        match self {
            MetricSink::Counter(_) => MetricKind::Counter,
            MetricSink::Gauge(_) => MetricKind::Gauge,
        }
    }

    /// The value currently exposed by this sink
    pub fn last_value(&self) -> i64 {
        match self {
            MetricSink::Counter(counter) => counter.get() as i64,
            MetricSink::Gauge(gauge) => gauge.get(),
        }
    }

    /// Expose `value` as the sink's new current value.
    ///
    /// Counters apply the difference from the current value, clamped to
    /// zero from below so the exposed series never decreases.
    pub fn record(&self, value: i64) {
        match self {
            MetricSink::Counter(counter) => {
                let delta = value - counter.get() as i64;
                counter.inc_by(delta.max(0) as u64);
            }
            MetricSink::Gauge(gauge) => gauge.set(value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counter_sink_applies_deltas() {
        let counter = IntCounter::new("requests", "test").unwrap();
        let sink = MetricSink::Counter(counter.clone());

        sink.record(10);
        sink.record(25);
        assert_eq!(counter.get(), 25);
        assert_eq!(sink.last_value(), 25);

        // a stale lower value must not move the counter backwards
        sink.record(5);
        assert_eq!(counter.get(), 25);
    }

    #[test]
    fn test_gauge_sink_sets_absolute_values() {
        let gauge = IntGauge::new("depth", "test").unwrap();
        let sink = MetricSink::Gauge(gauge.clone());

        sink.record(50);
        assert_eq!(sink.last_value(), 50);
        sink.record(-3);
        assert_eq!(gauge.get(), -3);
    }
}
