use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use parking_lot::Mutex;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use reqwest::Url;

use super::Transport;
use crate::error::TransportError;

/// Deterministic in-process transport.
///
/// Nothing goes over the network and nothing sleeps: each call returns a
/// synthetic latency immediately. The first `cold_calls` calls report the
/// cold latency, every `fail_every`-th call fails with a connect error,
/// and an optional seeded jitter is added on top of successful calls.
pub struct StubTransport {
    warm: Duration,
    cold: Duration,
    cold_calls: usize,
    fail_every: Option<usize>,
    jitter: Duration,
    rng: Mutex<StdRng>,
    calls: AtomicUsize,
}

impl StubTransport {
    pub fn new(warm: Duration) -> Self {
        Self {
            warm,
            cold: warm,
            cold_calls: 0,
            fail_every: None,
            jitter: Duration::ZERO,
            rng: Mutex::new(StdRng::seed_from_u64(0)),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_cold_starts(mut self, calls: usize, latency: Duration) -> Self {
        self.cold_calls = calls;
        self.cold = latency;
        self
    }

    /// `0` disables failures.
    pub fn failing_every(mut self, n: usize) -> Self {
        self.fail_every = (n > 0).then_some(n);
        self
    }

    pub fn with_jitter(mut self, jitter: Duration, seed: u64) -> Self {
        self.jitter = jitter;
        self.rng = Mutex::new(StdRng::seed_from_u64(seed));
        self
    }

    /// How many times `send` has been called so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl Transport for StubTransport {
    fn name(&self) -> &'static str {
        "stub"
    }

    async fn send(&self, url: &Url) -> Result<Duration, TransportError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst) + 1;

        // Give other workers a chance to interleave.
        tokio::task::yield_now().await;

        if matches!(self.fail_every, Some(n) if call % n == 0) {
            return Err(TransportError::Connect(format!(
                "stub refused call #{call} to {url}"
            )));
        }

        let base = if call <= self.cold_calls {
            self.cold
        } else {
            self.warm
        };

        if self.jitter.is_zero() {
            return Ok(base);
        }
        let max = u64::try_from(self.jitter.as_nanos()).unwrap_or(u64::MAX);
        let extra = self.rng.lock().gen_range(0..=max);
        Ok(base + Duration::from_nanos(extra))
    }
}
