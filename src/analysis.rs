//! Statistical cold-start detection over a completed latency sample.
//!
//! The threshold is the larger of two heuristics:
//!
//!   * `median + 2 * stddev` (population standard deviation)
//!   * `3 * median`
//!
//! and every measurement strictly above it counts as a cold start. The
//! "median" is `sorted[n / 2]`, i.e. the upper-middle element for even
//! sample sizes rather than the mean of the two middle values.

use std::time::Duration;

use serde::Serialize;
use tracing::debug;

use crate::metrics::LatencySample;

const DEVIATION_FACTOR: u32 = 2;
const MEDIAN_FACTOR: f64 = 3.0;

/// Which heuristic produced the final threshold.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ThresholdRule {
    /// `median + 2 * stddev`
    #[default]
    Deviation,
    /// `3 * median`
    MedianMultiple,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ColdStartAnalysis {
    /// Measurements classified as cold starts.
    pub count: usize,
    /// Total duration of the cold-start measurements.
    pub sum: Duration,
    pub threshold: Duration,
    pub median: Duration,
    pub std_dev: Duration,
    pub rule: ThresholdRule,
}

impl ColdStartAnalysis {
    pub fn has_cold_starts(&self) -> bool {
        self.count > 0
    }

    /// Mean cold-start duration, zero when none were found.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.count) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.sum / n,
            Err(_) => {
                Duration::from_nanos((self.sum.as_nanos() as f64 / self.count as f64) as u64)
            }
        }
    }

    /// Share of `successes` that were cold starts, in percent.
    pub fn rate(&self, successes: usize) -> f64 {
        if successes == 0 {
            return 0.0;
        }
        self.count as f64 * 100.0 / successes as f64
    }
}

/// Classifies every measurement in `sample`.
///
/// A sample without successes yields the all-zero analysis.
pub fn analyze(sample: &LatencySample) -> ColdStartAnalysis {
    let n = sample.success_count();
    if n == 0 {
        return ColdStartAnalysis::default();
    }

    let mut sorted = sample.measurements().to_vec();
    sorted.sort_unstable();
    let median = sorted[n / 2];

    let mean_nanos = sample.sum().as_nanos() as f64 / n as f64;
    let variance = sample
        .measurements()
        .iter()
        .map(|d| {
            let diff = d.as_nanos() as f64 - mean_nanos;
            diff * diff
        })
        .sum::<f64>()
        / n as f64;
    let std_dev = Duration::from_nanos(variance.sqrt() as u64);

    let deviation = median + std_dev * DEVIATION_FACTOR;
    let multiple = Duration::from_nanos((median.as_nanos() as f64 * MEDIAN_FACTOR) as u64);

    let (threshold, rule) = if multiple > deviation {
        (multiple, ThresholdRule::MedianMultiple)
    } else {
        (deviation, ThresholdRule::Deviation)
    };

    let (count, sum) = sample
        .measurements()
        .iter()
        .filter(|d| **d > threshold)
        .fold((0usize, Duration::ZERO), |(count, sum), d| (count + 1, sum + *d));

    debug!(
        "median={:?} std_dev={:?} threshold={:?} ({:?})",
        median, std_dev, threshold, rule
    );

    ColdStartAnalysis {
        count,
        sum,
        threshold,
        median,
        std_dev,
        rule,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_ms(values: &[u64]) -> LatencySample {
        LatencySample::from_measurements(
            values.iter().copied().map(Duration::from_millis).collect(),
        )
    }

    #[test]
    fn empty_sample_gives_zero_analysis() {
        let analysis = analyze(&sample_ms(&[]));
        assert_eq!(analysis, ColdStartAnalysis::default());
        assert_eq!(analysis.count, 0);
        assert_eq!(analysis.threshold, Duration::ZERO);
        assert_eq!(analysis.average(), Duration::ZERO);
        assert_eq!(analysis.rate(0), 0.0);
    }

    #[test]
    fn even_sample_median_is_upper_middle() {
        let analysis = analyze(&sample_ms(&[10, 20, 30, 40]));
        assert_eq!(analysis.median, Duration::from_millis(30));
    }

    #[test]
    fn median_ignores_completion_order() {
        let analysis = analyze(&sample_ms(&[40, 10, 30, 20, 50]));
        assert_eq!(analysis.median, Duration::from_millis(30));
    }

    #[test]
    fn std_dev_is_the_population_estimator() {
        // mean 5, squared deviations sum to 32, 32 / 8 = 4, sqrt = 2
        let analysis = analyze(&sample_ms(&[2, 4, 4, 4, 5, 5, 7, 9]));
        assert_eq!(analysis.std_dev, Duration::from_millis(2));
    }

    #[test]
    fn low_variance_uses_the_median_multiple() {
        let analysis = analyze(&sample_ms(&[10, 10, 10, 11]));

        assert_eq!(analysis.rule, ThresholdRule::MedianMultiple);
        assert_eq!(analysis.threshold, Duration::from_millis(30));
        assert!(analysis.threshold > analysis.median + analysis.std_dev * 2);
        assert_eq!(analysis.count, 0);
    }

    #[test]
    fn large_outlier_uses_the_deviation_rule() {
        let analysis = analyze(&sample_ms(&[10, 10, 10, 100]));

        assert_eq!(analysis.rule, ThresholdRule::Deviation);
        assert_eq!(analysis.threshold, analysis.median + analysis.std_dev * 2);
        assert!(analysis.threshold > analysis.median * 3);
    }

    #[test]
    fn only_the_outlier_is_a_cold_start() {
        let analysis = analyze(&sample_ms(&[10, 10, 10, 100]));

        assert_eq!(analysis.median, Duration::from_millis(10));
        assert!(Duration::from_millis(100) > analysis.median * 3);
        assert!(Duration::from_millis(100) > analysis.median + analysis.std_dev * 2);
        assert_eq!(analysis.count, 1);
        assert_eq!(analysis.sum, Duration::from_millis(100));
        assert_eq!(analysis.average(), Duration::from_millis(100));
        assert_eq!(analysis.rate(4), 25.0);
    }

    #[test]
    fn values_equal_to_the_threshold_are_not_cold() {
        // threshold = 3 * 10ms; 30ms sits exactly on it
        let analysis = analyze(&sample_ms(&[10, 10, 10, 10, 10, 10, 10, 10, 10, 30]));

        assert_eq!(analysis.rule, ThresholdRule::MedianMultiple);
        assert_eq!(analysis.threshold, Duration::from_millis(30));
        assert_eq!(analysis.count, 0);
    }

    #[test]
    fn analysis_is_idempotent() {
        let sample = sample_ms(&[12, 9, 250, 11, 10, 13, 8, 400, 10]);
        let before = sample.measurements().to_vec();

        let first = analyze(&sample);
        let second = analyze(&sample);

        assert_eq!(first, second);
        assert_eq!(sample.measurements(), before.as_slice());
    }

    #[test]
    fn single_measurement_is_never_cold() {
        let analysis = analyze(&sample_ms(&[42]));

        assert_eq!(analysis.median, Duration::from_millis(42));
        assert_eq!(analysis.std_dev, Duration::ZERO);
        assert_eq!(analysis.threshold, Duration::from_millis(126));
        assert_eq!(analysis.count, 0);
    }
}
