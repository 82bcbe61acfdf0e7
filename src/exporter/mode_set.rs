//! Per-instance mode parameter sets
//!
//! Every metric instance carries one `ModeSet`: the parameters to use
//! for each mode index, with index 0 as the always-present default.
//! Indices without an override resolve to the default, so switching to
//! a mode a metric does not care about simply keeps its baseline
//! behavior.

use rand::Rng;

use crate::config::Parameters;
use crate::exporter::sink::MetricSink;
use crate::generator::generate;

/// Index into a mode set; assigned by the scheduler's mode table
pub type ModeIndex = usize;

/// Index of the default parameter set, present in every mode set
pub const DEFAULT_MODE: ModeIndex = 0;

/// Parameter sets for one metric instance, keyed by mode index
pub struct ModeSet {
    sink: MetricSink,
    modes: Vec<Option<Parameters>>,
}

impl ModeSet {
    /// Create an empty mode set writing into `sink`.
    ///
    /// The default parameters (index 0) must be set before the first
    /// update.
    pub fn new(sink: MetricSink) -> Self {
        Self {
            sink,
            modes: Vec::new(),
        }
    }

    /// Record the parameters for a mode index, growing the set as
    /// needed. Index 0 sets the default.
    pub fn set_parameters(&mut self, index: ModeIndex, params: Parameters) {
        if self.modes.len() <= index {
            self.modes.resize(index + 1, None);
        }
        self.modes[index] = Some(params);
    }

    /// Parameters in effect for `index`: the override if present,
    /// otherwise the default at index 0.
    ///
    /// Panics if the default was never populated; that is a
    /// construction bug, not a runtime condition.
    pub fn resolve(&self, index: ModeIndex) -> &Parameters {
        self.modes
            .get(index)
            .and_then(Option::as_ref)
            .or_else(|| self.modes.get(DEFAULT_MODE).and_then(Option::as_ref))
            .expect("mode set has no default parameters at index 0")
    }

    /// Generate the next value under `index` and push it to the sink
    pub fn update(&self, index: ModeIndex, rng: &mut impl Rng) {
        let params = self.resolve(index);
        let previous = self.sink.last_value();
        let next = generate(self.sink.kind(), params, previous, rng);
        self.sink.record(next);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use prometheus::{IntCounter, IntGauge};
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn params(average: i64) -> Parameters {
        Parameters {
            average,
            jitter_bound: 0,
        }
    }

    fn counter_set() -> (ModeSet, IntCounter) {
        let counter = IntCounter::new("requests", "test").unwrap();
        let set = ModeSet::new(MetricSink::Counter(counter.clone()));
        (set, counter)
    }

    #[test]
    fn test_resolve_prefers_override() {
        let (mut set, _counter) = counter_set();
        set.set_parameters(DEFAULT_MODE, params(10));
        set.set_parameters(2, params(100));

        assert_eq!(set.resolve(2).average, 100);
        assert_eq!(set.resolve(DEFAULT_MODE).average, 10);
    }

    #[test]
    fn test_resolve_falls_back_to_default() {
        let (mut set, _counter) = counter_set();
        set.set_parameters(DEFAULT_MODE, params(10));
        set.set_parameters(3, params(42));

        // index 1 was never set, index 7 is beyond the vector
        assert_eq!(set.resolve(1).average, 10);
        assert_eq!(set.resolve(7).average, 10);
    }

    #[test]
    #[should_panic(expected = "no default parameters")]
    fn test_resolve_without_default_is_fatal() {
        let (set, _counter) = counter_set();
        set.resolve(DEFAULT_MODE);
    }

    #[test]
    fn test_counter_updates_accumulate() {
        let (mut set, counter) = counter_set();
        set.set_parameters(DEFAULT_MODE, params(10));

        let mut rng = StdRng::seed_from_u64(0);
        for expected in [10, 20, 30] {
            set.update(DEFAULT_MODE, &mut rng);
            assert_eq!(counter.get(), expected);
        }
    }

    #[test]
    fn test_gauge_update_ignores_previous_value() {
        let gauge = IntGauge::new("depth", "test").unwrap();
        let mut set = ModeSet::new(MetricSink::Gauge(gauge.clone()));
        set.set_parameters(DEFAULT_MODE, params(50));
        set.set_parameters(1, params(-5));

        let mut rng = StdRng::seed_from_u64(0);
        set.update(DEFAULT_MODE, &mut rng);
        assert_eq!(gauge.get(), 50);
        set.update(1, &mut rng);
        assert_eq!(gauge.get(), -5);
        set.update(DEFAULT_MODE, &mut rng);
        assert_eq!(gauge.get(), 50);
    }

    #[test]
    fn test_update_in_unknown_mode_uses_default() {
        let (mut set, counter) = counter_set();
        set.set_parameters(DEFAULT_MODE, params(10));
        set.set_parameters(1, params(1000));

        let mut rng = StdRng::seed_from_u64(0);
        set.update(5, &mut rng);
        assert_eq!(counter.get(), 10);
    }
}
