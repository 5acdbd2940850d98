use chrono::{DateTime, Utc};
use serde::Serialize;
use uuid::Uuid;

use super::{millis, percent};
use crate::analysis::{ColdStartAnalysis, ThresholdRule};
use crate::config::LoadTestConfig;
use crate::metrics::{FailureBreakdown, LatencySample, PercentileSet};

/// Machine-readable form of a run. Durations are milliseconds, the
/// percentile set is microseconds.
#[derive(Debug, Clone, Serialize)]
pub struct RunReport {
    pub run_id: Uuid,
    pub started_at: DateTime<Utc>,
    pub target: TargetSection,
    pub results: ResultsSection,
    pub performance: PerformanceSection,
    pub cold_starts: ColdStartSection,
}

#[derive(Debug, Clone, Serialize)]
pub struct TargetSection {
    pub url: String,
    pub requests: usize,
    pub concurrency: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct ResultsSection {
    pub successful: usize,
    pub failed: usize,
    pub success_pct: f64,
    pub failure_pct: f64,
    pub failures: FailureBreakdown,
}

#[derive(Debug, Clone, Serialize)]
pub struct PerformanceSection {
    pub total_duration_ms: f64,
    pub average_response_ms: f64,
    pub latency_us: PercentileSet,
}

#[derive(Debug, Clone, Serialize)]
pub struct ColdStartSection {
    pub count: usize,
    pub pct_of_successful: f64,
    pub average_ms: f64,
    pub threshold_ms: f64,
    pub median_ms: f64,
    pub std_dev_ms: f64,
    pub rule: ThresholdRule,
}

impl RunReport {
    pub fn new(
        config: &LoadTestConfig,
        sample: &LatencySample,
        analysis: &ColdStartAnalysis,
    ) -> Self {
        Self {
            run_id: Uuid::new_v4(),
            started_at: sample.started_at(),
            target: TargetSection {
                url: config.url.to_string(),
                requests: config.requests,
                concurrency: config.concurrency,
            },
            results: ResultsSection {
                successful: sample.success_count(),
                failed: sample.failure_count(),
                success_pct: percent(sample.success_count(), config.requests),
                failure_pct: percent(sample.failure_count(), config.requests),
                failures: *sample.failures(),
            },
            performance: PerformanceSection {
                total_duration_ms: millis(sample.total_time()),
                average_response_ms: millis(sample.average()),
                latency_us: sample.percentiles(),
            },
            cold_starts: ColdStartSection {
                count: analysis.count,
                pct_of_successful: analysis.rate(sample.success_count()),
                average_ms: millis(analysis.average()),
                threshold_ms: millis(analysis.threshold),
                median_ms: millis(analysis.median),
                std_dev_ms: millis(analysis.std_dev),
                rule: analysis.rule,
            },
        }
    }

    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use serde_json::Value;

    use super::*;
    use crate::analysis::analyze;
    use crate::config::DEFAULT_URL;
    use crate::metrics::FailureKind;

    #[test]
    fn json_report_carries_counts_and_analysis() {
        let config = LoadTestConfig::new(DEFAULT_URL, 5, 2).unwrap();
        let mut failures = FailureBreakdown::default();
        failures.record(FailureKind::Timeout);
        let measurements = [10, 10, 10, 100].map(Duration::from_millis).to_vec();
        let sample = LatencySample::new(5, measurements, failures, Duration::from_millis(140));
        let analysis = analyze(&sample);

        let json = RunReport::new(&config, &sample, &analysis).to_json().unwrap();
        let v: Value = serde_json::from_str(&json).unwrap();

        assert_eq!(v["target"]["requests"], 5);
        assert_eq!(v["target"]["url"], "http://localhost:8080/");
        assert_eq!(v["results"]["successful"], 4);
        assert_eq!(v["results"]["failed"], 1);
        assert_eq!(v["results"]["failures"]["timeout"], 1);
        assert_eq!(v["results"]["success_pct"], 80.0);
        assert_eq!(v["performance"]["total_duration_ms"], 140.0);
        assert_eq!(v["performance"]["average_response_ms"], 32.5);
        assert_eq!(v["performance"]["latency_us"]["count"], 4);
        assert_eq!(v["cold_starts"]["count"], 1);
        assert_eq!(v["cold_starts"]["median_ms"], 10.0);
        assert_eq!(v["cold_starts"]["rule"], "deviation");
        assert!(v["run_id"].is_string());
        assert!(v["started_at"].is_string());
    }

    #[test]
    fn empty_run_serializes_zeroes() {
        let config = LoadTestConfig::new(DEFAULT_URL, 0, 1).unwrap();
        let sample = LatencySample::from_measurements(Vec::new());
        let analysis = analyze(&sample);

        let report = RunReport::new(&config, &sample, &analysis);

        assert_eq!(report.results.success_pct, 0.0);
        assert_eq!(report.cold_starts.pct_of_successful, 0.0);
        assert_eq!(report.performance.latency_us, PercentileSet::empty());
        assert!(report.to_json().is_ok());
    }
}
