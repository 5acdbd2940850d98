use clap::Parser;
use reqwest::Url;

use crate::error::ConfigError;

pub const DEFAULT_URL: &str = "http://localhost:8080";
pub const DEFAULT_REQUESTS: usize = 100;
pub const DEFAULT_CONCURRENCY: usize = 10;

// ─── Command line ────────────────────────────────────────────────

#[derive(Parser, Debug, Clone)]
#[command(
    name = "cold-start-bench",
    about = "Fire a fixed batch of GET requests and flag cold-start outliers"
)]
pub struct Args {
    /// API endpoint to test
    #[arg(long, default_value = DEFAULT_URL)]
    pub url: String,

    /// Number of requests to send
    #[arg(short = 'n', default_value_t = DEFAULT_REQUESTS)]
    pub requests: usize,

    /// Number of concurrent workers
    #[arg(short = 'c', default_value_t = DEFAULT_CONCURRENCY)]
    pub concurrency: usize,

    /// Emit the report as a single JSON document
    #[arg(long)]
    pub json: bool,

    /// Never colorize the text report
    #[arg(long)]
    pub no_color: bool,
}

impl Args {
    pub fn into_config(self) -> Result<LoadTestConfig, ConfigError> {
        LoadTestConfig::new(&self.url, self.requests, self.concurrency)
    }
}

// ─── Validated run configuration ─────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadTestConfig {
    pub url: Url,
    pub requests: usize,
    pub concurrency: usize,
}

impl LoadTestConfig {
    pub fn new(url: &str, requests: usize, concurrency: usize) -> Result<Self, ConfigError> {
        let url = Url::parse(url).map_err(|e| ConfigError::InvalidUrl {
            url: url.to_owned(),
            reason: e.to_string(),
        })?;

        let config = Self {
            url,
            requests,
            concurrency,
        };
        config.validate()?;
        Ok(config)
    }

    /// Zero workers would leave the job queue undrained forever.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.concurrency == 0 {
            return Err(ConfigError::ZeroWorkers);
        }
        Ok(())
    }
}
