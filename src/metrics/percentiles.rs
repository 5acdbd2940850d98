use std::time::Duration;

use hdrhistogram::Histogram;
use serde::Serialize;

/// HdrHistogram range: 1 μs → 60 s, 3 significant figures.
/// Longer responses are clamped to the upper bound.
const HIST_LOW: u64 = 1;
const HIST_HIGH: u64 = 60_000_000;
const HIST_SIGFIG: u8 = 3;

/// Percentile breakdown of a latency sample, in microseconds.
/// Serialized straight into the JSON report and into the text summary.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PercentileSet {
    pub min: u64,
    pub max: u64,
    pub mean: f64,
    pub p50: u64,
    pub p95: u64,
    pub p99: u64,
    pub p999: u64,
    pub count: u64,
}

impl PercentileSet {
    /// Returns zeroed values if there is nothing to record.
    pub fn from_durations(samples: &[Duration]) -> Self {
        if samples.is_empty() {
            return Self::empty();
        }

        let Ok(mut hist) = Histogram::<u64>::new_with_bounds(HIST_LOW, HIST_HIGH, HIST_SIGFIG)
        else {
            return Self::empty();
        };
        for d in samples {
            let us = u64::try_from(d.as_micros()).unwrap_or(u64::MAX);
            hist.saturating_record(us.clamp(HIST_LOW, HIST_HIGH));
        }

        Self::from_histogram(&hist)
    }

    /// Reads the distribution of successful round trips out of `hist`,
    /// whose values are microseconds.
    fn from_histogram(hist: &Histogram<u64>) -> Self {
        if hist.len() == 0 {
            return Self::empty();
        }

        Self {
            min: hist.min(),
            max: hist.max(),
            mean: hist.mean(),
            p50: hist.value_at_percentile(50.0),
            p95: hist.value_at_percentile(95.0),
            p99: hist.value_at_percentile(99.0),
            p999: hist.value_at_percentile(99.9),
            count: hist.len(),
        }
    }

    /// What a run with no successful responses reports: every field zero,
    /// so neither report format ever divides by an empty sample.
    pub fn empty() -> Self {
        Self::default()
    }

    /// False when no request succeeded; the text report then omits the
    /// percentile line.
    pub fn has_data(&self) -> bool {
        self.count > 0
    }
}
