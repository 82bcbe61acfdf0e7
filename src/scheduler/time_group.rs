//! Interval buckets of metric instances
//!
//! A time group holds every metric instance that updates on the same
//! interval. The group knows nothing about wall-clock scheduling; the
//! scheduler drives `tick` from its per-group loop, which keeps update
//! semantics testable without timers.

use rand::Rng;
use std::time::Duration;

use crate::exporter::mode_set::{ModeIndex, ModeSet};

/// A bucket of metric instances sharing one update interval
pub struct TimeGroup {
    interval: Duration,
    members: Vec<ModeSet>,
}

impl TimeGroup {
    /// Create an empty group for the given interval
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            members: Vec::new(),
        }
    }

    /// The fixed update interval of this group
    pub fn interval(&self) -> Duration {
        self.interval
    }

    /// Append a member; no de-duplication, no cap
    pub fn add_member(&mut self, set: ModeSet) {
        self.members.push(set);
    }

    /// Number of members in this group
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Whether the group has no members
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Update every member using the given mode.
    ///
    /// Members are independent; no cross-member ordering is guaranteed.
    pub fn tick(&self, mode: ModeIndex, rng: &mut impl Rng) {
        for member in &self.members {
            member.update(mode, rng);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Parameters;
    use crate::exporter::mode_set::DEFAULT_MODE;
    use crate::exporter::sink::MetricSink;
    use prometheus::IntCounter;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn counter_member(average: i64) -> (ModeSet, IntCounter) {
        let counter = IntCounter::new("ticks", "test counter").unwrap();
        let mut set = ModeSet::new(MetricSink::Counter(counter.clone()));
        set.set_parameters(
            DEFAULT_MODE,
            Parameters {
                average,
                jitter_bound: 0,
            },
        );
        (set, counter)
    }

    #[test]
    fn test_tick_updates_every_member() {
        let mut group = TimeGroup::new(Duration::from_secs(5));
        let (first, first_counter) = counter_member(3);
        let (second, second_counter) = counter_member(7);
        group.add_member(first);
        group.add_member(second);

        let mut rng = StdRng::seed_from_u64(1);
        group.tick(DEFAULT_MODE, &mut rng);
        group.tick(DEFAULT_MODE, &mut rng);

        assert_eq!(first_counter.get(), 6);
        assert_eq!(second_counter.get(), 14);
    }

    #[test]
    fn test_interval_is_fixed_at_creation() {
        let group = TimeGroup::new(Duration::from_secs(10));
        assert_eq!(group.interval(), Duration::from_secs(10));
        assert!(group.is_empty());
    }
}
