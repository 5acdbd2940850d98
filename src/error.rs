use thiserror::Error;

use crate::metrics::FailureKind;

/// Problems with the run configuration. Always surfaced before any
/// request is dispatched.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigError {
    #[error("configuration error: worker count must be positive")]
    ZeroWorkers,

    #[error("configuration error: invalid target URL \"{url}\": {reason}")]
    InvalidUrl { url: String, reason: String },
}

/// A request that never produced a response.
///
/// HTTP status codes are not inspected, so a 500 is still a success from
/// the transport's point of view.
#[derive(Debug, Clone, Error)]
pub enum TransportError {
    #[error("connection failed: {0}")]
    Connect(String),

    #[error("request timed out: {0}")]
    Timeout(String),

    #[error("request failed: {0}")]
    Request(String),
}

impl TransportError {
    pub fn kind(&self) -> FailureKind {
        match self {
            Self::Connect(_) => FailureKind::Connect,
            Self::Timeout(_) => FailureKind::Timeout,
            Self::Request(_) => FailureKind::Request,
        }
    }
}

impl From<reqwest::Error> for TransportError {
    fn from(err: reqwest::Error) -> Self {
        let message = err.to_string();
        if err.is_timeout() {
            Self::Timeout(message)
        } else if err.is_connect() {
            Self::Connect(message)
        } else {
            Self::Request(message)
        }
    }
}

/// Errors that abort a whole dispatch. Per-request failures never end up
/// here; they are tallied in the `LatencySample` instead.
#[derive(Debug, Error)]
pub enum DispatchError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("worker {id} terminated abnormally: {source}")]
    Worker {
        id: usize,
        #[source]
        source: tokio::task::JoinError,
    },

    #[error("{0} channel closed before worker {1} finished")]
    ChannelClosed(&'static str, usize),
}
