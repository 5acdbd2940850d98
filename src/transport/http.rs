use std::time::{Duration, Instant};

use async_trait::async_trait;
use reqwest::{Client, Url};

use super::Transport;
use crate::error::TransportError;

/// Real network transport backed by a shared `reqwest::Client`.
///
/// No request timeout is configured; a hung server hangs the worker, same
/// as the underlying client would.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> reqwest::Result<Self> {
        Ok(Self::with_client(Client::builder().build()?))
    }

    /// Uses `client` exactly as configured, including any timeout or
    /// connection-pool settings the caller put on it.
    pub fn with_client(client: Client) -> Self {
        Self { client }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    fn name(&self) -> &'static str {
        "http"
    }

    async fn send(&self, url: &Url) -> Result<Duration, TransportError> {
        let begin = Instant::now();
        let response = self.client.get(url.clone()).send().await?;
        // The body is never read; the status is never looked at.
        drop(response);
        Ok(begin.elapsed())
    }
}
