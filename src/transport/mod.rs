//! The "send one GET and time it" capability the dispatcher is built on.

mod http;
mod stub;

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Url;

use crate::error::TransportError;

pub use http::HttpTransport;
pub use stub::StubTransport;

/// Sends a single GET request to `url` and reports how long the round
/// trip took.
///
/// Implementations only fail for transport-level problems. A response of
/// any status is a success.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Short label used in logs.
    fn name(&self) -> &'static str;

    async fn send(&self, url: &Url) -> Result<Duration, TransportError>;
}
