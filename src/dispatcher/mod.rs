//! Fixed-size worker pool that drains a pre-loaded job queue.

mod queue;

use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::Utc;
use reqwest::Url;
use tokio::sync::mpsc;
use tokio_stream::wrappers::ReceiverStream;
use tokio_stream::StreamExt;
use tracing::{info, warn};

use crate::config::LoadTestConfig;
use crate::error::{DispatchError, TransportError};
use crate::metrics::{FailureBreakdown, LatencySample};
use crate::transport::Transport;

pub use queue::JobQueue;

// ─── Public entry point ──────────────────────────────────────────

pub struct Dispatcher {
    transport: Arc<dyn Transport>,
}

impl Dispatcher {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self { transport }
    }

    /// Sends `config.requests` GETs to `config.url` from
    /// `config.concurrency` workers and returns once every job has
    /// produced exactly one measurement or failure.
    ///
    /// Request failures are tallied, never returned. The only errors are
    /// a bad configuration (checked before anything is spawned) and a
    /// worker that died.
    pub async fn run(&self, config: &LoadTestConfig) -> Result<LatencySample, DispatchError> {
        config.validate()?;

        let requests = config.requests;
        let jobs = Arc::new(JobQueue::preloaded(requests));

        // Sized to the request count so a worker never waits for space.
        // tokio rejects a zero capacity.
        let capacity = requests.max(1);
        let (results_tx, results_rx) = mpsc::channel::<Duration>(capacity);
        let (errors_tx, errors_rx) = mpsc::channel::<TransportError>(capacity);

        info!(
            "dispatching {} requests to {} with {} workers ({} transport)",
            requests,
            config.url,
            config.concurrency,
            self.transport.name()
        );

        let started_at = Utc::now();
        let start = Instant::now();

        let mut handles = Vec::with_capacity(config.concurrency);
        for worker_id in 0..config.concurrency {
            let jobs = jobs.clone();
            let transport = self.transport.clone();
            let url = config.url.clone();
            let results = results_tx.clone();
            let errors = errors_tx.clone();

            handles.push(tokio::spawn(async move {
                worker(worker_id, jobs, transport, url, results, errors).await
            }));
        }

        // Completion barrier: every worker has seen the queue run dry.
        // A failed worker does not short-circuit it; the rest are still
        // awaited so nothing is left sending after `run` returns.
        let mut first_error = None;
        for (id, handle) in handles.into_iter().enumerate() {
            let outcome = match handle.await {
                Ok(result) => result,
                Err(source) => Err(DispatchError::Worker { id, source }),
            };
            if let Err(err) = outcome {
                warn!("worker {} stopped early: {}", id, err);
                first_error.get_or_insert(err);
            }
        }
        if let Some(err) = first_error {
            return Err(err);
        }

        drop(results_tx);
        drop(errors_tx);
        let total_time = start.elapsed();

        // ── Single-threaded aggregation ─────────────────────────────
        let measurements: Vec<Duration> = ReceiverStream::new(results_rx).collect().await;
        let failures = ReceiverStream::new(errors_rx)
            .fold(FailureBreakdown::default(), |mut acc, err| {
                acc.record(err.kind());
                acc
            })
            .await;

        let sample = LatencySample::new(requests, measurements, failures, total_time)
            .with_started_at(started_at);

        info!(
            "dispatch finished in {:?}: {} succeeded, {} failed",
            total_time,
            sample.success_count(),
            sample.failure_count()
        );

        Ok(sample)
    }
}

// ─── Worker loop ─────────────────────────────────────────────────

async fn worker(
    id: usize,
    jobs: Arc<JobQueue>,
    transport: Arc<dyn Transport>,
    url: Url,
    results: mpsc::Sender<Duration>,
    errors: mpsc::Sender<TransportError>,
) -> Result<(), DispatchError> {
    while let Some(job) = jobs.next() {
        info!("worker {} sending request #{} to {}", id, job + 1, url);

        match transport.send(&url).await {
            Ok(elapsed) => results
                .send(elapsed)
                .await
                .map_err(|_| DispatchError::ChannelClosed("result", id))?,
            Err(err) => {
                warn!("worker {} request #{} failed: {}", id, job + 1, err);
                errors
                    .send(err)
                    .await
                    .map_err(|_| DispatchError::ChannelClosed("failure", id))?;
            }
        }
    }

    Ok(())
}
