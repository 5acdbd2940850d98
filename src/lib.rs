//! Concurrent HTTP load generator with statistical cold-start detection.
//!
//! A run is three steps: the [`Dispatcher`] drains a fixed batch of GET
//! requests through a worker pool into a [`LatencySample`], [`analyze`]
//! classifies the slow outliers, and [`report::render`] formats both.

pub mod analysis;
pub mod config;
pub mod dispatcher;
pub mod error;
pub mod metrics;
pub mod report;
pub mod transport;

pub use analysis::{analyze, ColdStartAnalysis, ThresholdRule};
pub use config::{Args, LoadTestConfig};
pub use dispatcher::Dispatcher;
pub use error::{ConfigError, DispatchError, TransportError};
pub use metrics::{FailureBreakdown, FailureKind, LatencySample, PercentileSet};
pub use transport::{HttpTransport, StubTransport, Transport};
