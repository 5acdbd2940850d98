pub mod percentiles;

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

pub use percentiles::PercentileSet;

/// Transport-level failure categories. The run only ever reports the
/// aggregate count; the per-kind split is informational.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FailureKind {
    Connect,
    Timeout,
    Request,
}

/// Per-kind failure tallies.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FailureBreakdown {
    pub connect: usize,
    pub timeout: usize,
    pub request: usize,
}

impl FailureBreakdown {
    pub fn record(&mut self, kind: FailureKind) {
        match kind {
            FailureKind::Connect => self.connect += 1,
            FailureKind::Timeout => self.timeout += 1,
            FailureKind::Request => self.request += 1,
        }
    }

    pub fn total(&self) -> usize {
        self.connect + self.timeout + self.request
    }
}

// ─── Latency sample ──────────────────────────────────────────────

/// Everything one dispatch produced.
///
/// Built once, after every worker has finished, and never mutated again.
/// `measurements` is in completion order, which is unrelated to the order
/// jobs were queued in.
#[derive(Debug, Clone)]
pub struct LatencySample {
    started_at: DateTime<Utc>,
    requested: usize,
    total_time: Duration,
    measurements: Vec<Duration>,
    sum: Duration,
    failures: FailureBreakdown,
}

impl LatencySample {
    pub fn new(
        requested: usize,
        measurements: Vec<Duration>,
        failures: FailureBreakdown,
        total_time: Duration,
    ) -> Self {
        let sum: Duration = measurements.iter().sum();
        Self {
            started_at: Utc::now(),
            requested,
            total_time,
            measurements,
            sum,
            failures,
        }
    }

    /// A failure-free sample, mostly useful for feeding the analyzer
    /// directly.
    pub fn from_measurements(measurements: Vec<Duration>) -> Self {
        let requested = measurements.len();
        Self::new(
            requested,
            measurements,
            FailureBreakdown::default(),
            Duration::ZERO,
        )
    }

    pub fn with_started_at(mut self, started_at: DateTime<Utc>) -> Self {
        self.started_at = started_at;
        self
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    /// Number of requests the run was asked to send.
    pub fn requested(&self) -> usize {
        self.requested
    }

    /// Dispatch start to full drain.
    pub fn total_time(&self) -> Duration {
        self.total_time
    }

    pub fn measurements(&self) -> &[Duration] {
        &self.measurements
    }

    pub fn success_count(&self) -> usize {
        self.measurements.len()
    }

    pub fn failure_count(&self) -> usize {
        self.failures.total()
    }

    pub fn failures(&self) -> &FailureBreakdown {
        &self.failures
    }

    pub fn sum(&self) -> Duration {
        self.sum
    }

    /// Mean response time, zero when nothing succeeded.
    pub fn average(&self) -> Duration {
        match u32::try_from(self.success_count()) {
            Ok(0) => Duration::ZERO,
            Ok(n) => self.sum / n,
            Err(_) => Duration::from_nanos(
                (self.sum.as_nanos() as f64 / self.success_count() as f64) as u64,
            ),
        }
    }

    pub fn percentiles(&self) -> PercentileSet {
        PercentileSet::from_durations(&self.measurements)
    }
}
