use std::fmt::{self, Write};

use colored::Color;

use super::{millis, percent};
use crate::analysis::{ColdStartAnalysis, ThresholdRule};
use crate::config::LoadTestConfig;
use crate::metrics::LatencySample;

const RULE: &str = "════════════════════════════════════════";

/// Success rates below these are shown yellow / red.
const SUCCESS_WARN_PCT: f64 = 95.0;
const SUCCESS_BAD_PCT: f64 = 90.0;
/// Cold-start rates above this are shown red instead of yellow.
const COLD_START_BAD_PCT: f64 = 20.0;

/// Wraps text in ANSI escapes when `enabled`.
///
/// The escapes are built from the color codes directly so the caller's
/// flag is the only thing deciding; `colored`'s process-wide TTY and
/// `NO_COLOR` detection is not consulted.
struct Palette {
    enabled: bool,
}

impl Palette {
    fn paint(&self, text: &str, color: Color) -> String {
        if self.enabled {
            format!("\x1b[{}m{}\x1b[0m", color.to_fg_str(), text)
        } else {
            text.to_owned()
        }
    }

    fn heading(&self, text: &str, color: Color) -> String {
        if self.enabled {
            format!("\x1b[1;{}m{}\x1b[0m", color.to_fg_str(), text)
        } else {
            text.to_owned()
        }
    }
}

/// Human-readable multi-section report.
///
/// Percentages of successes and failures are against the number of
/// requests asked for, not the number that completed.
pub fn render_text(
    config: &LoadTestConfig,
    sample: &LatencySample,
    analysis: &ColdStartAnalysis,
    color: bool,
) -> String {
    let mut out = String::new();
    // Writing into a String never fails.
    let _ = write_report(&mut out, config, sample, analysis, &Palette { enabled: color });
    out
}

fn write_report(
    out: &mut String,
    config: &LoadTestConfig,
    sample: &LatencySample,
    analysis: &ColdStartAnalysis,
    p: &Palette,
) -> fmt::Result {
    writeln!(out)?;
    writeln!(out, "{}", p.heading(RULE, Color::Cyan))?;
    writeln!(out, "{}", p.heading("           LOAD TEST REPORT", Color::Cyan))?;
    writeln!(out, "{}", p.heading(RULE, Color::Cyan))?;

    // ── Configuration ───────────────────────────────────────────
    writeln!(out)?;
    writeln!(out, "{}", p.heading("Test Configuration:", Color::Blue))?;
    writeln!(out, "  Target URL:      {}", config.url)?;
    writeln!(out, "  Total Requests:  {}", config.requests)?;
    writeln!(out, "  Concurrency:     {}", config.concurrency)?;

    // ── Outcomes ────────────────────────────────────────────────
    writeln!(out)?;
    writeln!(out, "{}", p.heading("Execution Results:", Color::Blue))?;

    let success_rate = percent(sample.success_count(), config.requests);
    let success_color = if success_rate < SUCCESS_BAD_PCT {
        Color::Red
    } else if success_rate < SUCCESS_WARN_PCT {
        Color::Yellow
    } else {
        Color::Green
    };
    let line = format!(
        "  Successful:      {} ({:.1}%)",
        sample.success_count(),
        success_rate
    );
    writeln!(out, "{}", p.paint(&line, success_color))?;

    if sample.failure_count() > 0 {
        let line = format!(
            "  Failed:          {} ({:.1}%)",
            sample.failure_count(),
            percent(sample.failure_count(), config.requests)
        );
        writeln!(out, "{}", p.paint(&line, Color::Red))?;

        let f = sample.failures();
        let line = format!(
            "    connect {}, timeout {}, other {}",
            f.connect, f.timeout, f.request
        );
        writeln!(out, "{}", p.paint(&line, Color::Red))?;
    } else {
        let line = format!("  Failed:          {}", sample.failure_count());
        writeln!(out, "{}", p.paint(&line, Color::Green))?;
    }

    // ── Timing ──────────────────────────────────────────────────
    writeln!(out)?;
    writeln!(out, "{}", p.heading("Performance Metrics:", Color::Blue))?;
    let total = format!("{:?}", sample.total_time());
    let avg = format!("{:?}", sample.average());
    writeln!(out, "  Total Duration:  {}", p.paint(&total, Color::White))?;
    writeln!(out, "  Average Response: {}", p.paint(&avg, Color::White))?;

    let pct = sample.percentiles();
    if pct.has_data() {
        let line = format!(
            "{:.2}ms / {:.2}ms / {:.2}ms",
            pct.p50 as f64 / 1000.0,
            pct.p95 as f64 / 1000.0,
            pct.p99 as f64 / 1000.0
        );
        writeln!(out, "  p50 / p95 / p99: {}", p.paint(&line, Color::White))?;
    }

    // ── Cold starts ─────────────────────────────────────────────
    writeln!(out)?;
    writeln!(out, "{}", p.heading("Cold Start Analysis:", Color::Blue))?;
    if analysis.has_cold_starts() {
        let rate = analysis.rate(sample.success_count());
        let cold_color = if rate > COLD_START_BAD_PCT {
            Color::Red
        } else {
            Color::Yellow
        };
        let line = format!(
            "  Cold Starts:     {} ({:.1}% of successful requests)",
            analysis.count, rate
        );
        writeln!(out, "{}", p.paint(&line, cold_color))?;
        let line = format!("  Avg Cold Start:  {:?}", analysis.average());
        writeln!(out, "{}", p.paint(&line, cold_color))?;
    } else {
        writeln!(out, "{}", p.paint("  Cold Starts:     None detected", Color::Green))?;
        writeln!(out, "{}", p.paint("  Avg Cold Start:  N/A", Color::Green))?;
    }
    if sample.success_count() > 0 {
        let rule = match analysis.rule {
            ThresholdRule::Deviation => "median + 2σ",
            ThresholdRule::MedianMultiple => "3 × median",
        };
        writeln!(
            out,
            "  Threshold:       {:.2}ms ({}; median {:.2}ms, σ {:.2}ms)",
            millis(analysis.threshold),
            rule,
            millis(analysis.median),
            millis(analysis.std_dev)
        )?;
    }

    writeln!(out)?;
    writeln!(out, "{}", p.heading(RULE, Color::Cyan))
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::analysis::analyze;
    use crate::config::{LoadTestConfig, DEFAULT_URL};
    use crate::metrics::{FailureBreakdown, FailureKind};

    fn ms(v: u64) -> Duration {
        Duration::from_millis(v)
    }

    #[test]
    fn zero_requests_render_without_nan() {
        let config = LoadTestConfig::new(DEFAULT_URL, 0, 10).unwrap();
        let sample = LatencySample::new(0, Vec::new(), FailureBreakdown::default(), ms(1));
        let analysis = analyze(&sample);

        let report = render_text(&config, &sample, &analysis, false);

        assert!(!report.contains("NaN"));
        assert!(report.contains("Successful:      0 (0.0%)"));
        assert!(report.contains("Failed:          0"));
        assert!(report.contains("None detected"));
        assert!(!report.contains("Threshold:"));
    }

    #[test]
    fn total_failure_still_renders() {
        let config = LoadTestConfig::new(DEFAULT_URL, 4, 2).unwrap();
        let mut failures = FailureBreakdown::default();
        for _ in 0..3 {
            failures.record(FailureKind::Connect);
        }
        failures.record(FailureKind::Timeout);
        let sample = LatencySample::new(4, Vec::new(), failures, ms(20));
        let analysis = analyze(&sample);

        let report = render_text(&config, &sample, &analysis, false);

        assert!(report.contains("Successful:      0 (0.0%)"));
        assert!(report.contains("Failed:          4 (100.0%)"));
        assert!(report.contains("connect 3, timeout 1, other 0"));
        assert!(report.contains("Average Response: 0ns"));
    }

    #[test]
    fn cold_starts_are_reported_against_successes() {
        let config = LoadTestConfig::new(DEFAULT_URL, 5, 1).unwrap();
        let mut failures = FailureBreakdown::default();
        failures.record(FailureKind::Request);
        let measurements = vec![ms(10), ms(10), ms(10), ms(100)];
        let sample = LatencySample::new(5, measurements, failures, ms(130));
        let analysis = analyze(&sample);

        let report = render_text(&config, &sample, &analysis, false);

        assert!(report.contains("Successful:      4 (80.0%)"));
        assert!(report.contains("Failed:          1 (20.0%)"));
        assert!(report.contains("Cold Starts:     1 (25.0% of successful requests)"));
        assert!(report.contains("Avg Cold Start:  100ms"));
        assert!(report.contains("median + 2σ"));
    }

    #[test]
    fn plain_output_has_no_escape_codes() {
        let config = LoadTestConfig::new(DEFAULT_URL, 2, 1).unwrap();
        let sample = LatencySample::from_measurements(vec![ms(3), ms(4)]);
        let analysis = analyze(&sample);

        let report = render_text(&config, &sample, &analysis, false);

        assert!(!report.contains('\x1b'));
        assert!(report.contains("LOAD TEST REPORT"));
        assert!(report.contains("p50 / p95 / p99:"));
    }

    #[test]
    fn color_flag_alone_turns_on_escape_codes() {
        let config = LoadTestConfig::new(DEFAULT_URL, 2, 1).unwrap();
        let sample = LatencySample::from_measurements(vec![ms(3), ms(4)]);
        let analysis = analyze(&sample);

        let report = render_text(&config, &sample, &analysis, true);

        assert!(report.contains('\x1b'));
        assert!(report.contains("\x1b[1;36m"));
        assert!(report.contains("\x1b[0m"));
        assert!(report.contains("LOAD TEST REPORT"));
    }
}
