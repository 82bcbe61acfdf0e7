//! Synthetic value generation
//!
//! Pure functions turning statistical parameters into the next value of
//! a metric. The only source of nondeterminism is the caller-supplied
//! RNG, so tests can drive these with a seeded `StdRng`.

use rand::Rng;

use crate::config::{MetricKind, Parameters};

/// Compute the next value for a metric.
///
/// Jitter is drawn uniformly from the closed interval
/// `[-jitter_bound, +jitter_bound]`. A counter never decreases: its
/// per-tick increase is clamped to zero from below. A gauge is the
/// absolute jittered value and may go negative.
pub fn generate(
    kind: MetricKind,
    params: &Parameters,
    previous: i64,
    rng: &mut impl Rng,
) -> i64 {
    let jitter = draw_jitter(params.jitter_bound, rng);
    match kind {
        MetricKind::Counter => {
            let delta = (params.average + jitter).max(0);
            previous + delta
        }
        MetricKind::Gauge => params.average + jitter,
    }
}

fn draw_jitter(bound: i64, rng: &mut impl Rng) -> i64 {
    if bound == 0 {
        return 0;
    }
    rng.gen_range(-bound..=bound)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn rng() -> StdRng {
        StdRng::seed_from_u64(42)
    }

    #[test]
    fn test_counter_never_decreases() {
        let params = Parameters {
            average: 10,
            jitter_bound: 4,
        };
        let mut rng = rng();
        let mut value = 0;
        for _ in 0..1000 {
            let next = generate(MetricKind::Counter, &params, value, &mut rng);
            assert!(next >= value);
            let increase = next - value;
            assert!((6..=14).contains(&increase));
            value = next;
        }
    }

    #[test]
    fn test_counter_clamps_negative_increase() {
        // average far below zero: every draw clamps to no-op
        let params = Parameters {
            average: -100,
            jitter_bound: 5,
        };
        let mut rng = rng();
        for _ in 0..100 {
            assert_eq!(generate(MetricKind::Counter, &params, 37, &mut rng), 37);
        }
    }

    #[test]
    fn test_gauge_stays_within_bounds() {
        let params = Parameters {
            average: 50,
            jitter_bound: 7,
        };
        let mut rng = rng();
        for previous in [0, -500, 1_000_000] {
            for _ in 0..1000 {
                let value = generate(MetricKind::Gauge, &params, previous, &mut rng);
                assert!((43..=57).contains(&value));
            }
        }
    }

    #[test]
    fn test_gauge_may_be_negative() {
        let params = Parameters {
            average: -20,
            jitter_bound: 0,
        };
        let mut rng = rng();
        assert_eq!(generate(MetricKind::Gauge, &params, 99, &mut rng), -20);
    }

    #[test]
    fn test_zero_jitter_is_deterministic() {
        let params = Parameters {
            average: 10,
            jitter_bound: 0,
        };
        let mut rng = rng();
        let mut value = 0;
        for expected in [10, 20, 30] {
            value = generate(MetricKind::Counter, &params, value, &mut rng);
            assert_eq!(value, expected);
        }
    }

    #[test]
    fn test_jitter_covers_the_full_interval() {
        let params = Parameters {
            average: 0,
            jitter_bound: 2,
        };
        let mut rng = rng();
        let mut seen = std::collections::HashSet::new();
        for _ in 0..1000 {
            seen.insert(generate(MetricKind::Gauge, &params, 0, &mut rng));
        }
        assert_eq!(seen, [-2, -1, 0, 1, 2].into_iter().collect());
    }
}
