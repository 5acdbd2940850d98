//! Turns a finished run into something a person or a program can read.
//!
//! Nothing here feeds back into the dispatch or the analysis.

mod json;
mod text;

use std::time::Duration;

use crate::analysis::ColdStartAnalysis;
use crate::config::LoadTestConfig;
use crate::metrics::LatencySample;

pub use json::RunReport;
pub use text::render_text;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct RenderOptions {
    pub format: OutputFormat,
    /// Only meaningful for `OutputFormat::Text`.
    pub color: bool,
}

pub fn render(
    config: &LoadTestConfig,
    sample: &LatencySample,
    analysis: &ColdStartAnalysis,
    options: RenderOptions,
) -> Result<String, serde_json::Error> {
    match options.format {
        OutputFormat::Text => Ok(render_text(config, sample, analysis, options.color)),
        OutputFormat::Json => RunReport::new(config, sample, analysis).to_json(),
    }
}

/// `part` as a percentage of `whole`; 0 when `whole` is 0.
pub(crate) fn percent(part: usize, whole: usize) -> f64 {
    if whole == 0 {
        return 0.0;
    }
    part as f64 * 100.0 / whole as f64
}

pub(crate) fn millis(d: Duration) -> f64 {
    d.as_nanos() as f64 / 1_000_000.0
}
