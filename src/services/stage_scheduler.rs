//! Stage scheduler for bounded parallel worker execution.

use futures::stream::{FuturesUnordered, StreamExt};
use std::any::Any;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::Semaphore;
use tokio_util::sync::CancellationToken;

use crate::adapters::workers::WorkerRegistry;
use crate::domain::errors::WorkerFailure;
use crate::domain::models::{ResultMap, WorkerResult, WorkerSpec};
use crate::domain::ports::Worker;

/// Configuration for the stage scheduler.
#[derive(Debug, Clone)]
pub struct SchedulerConfig {
    /// Maximum workers in flight at once.
    pub max_concurrency: usize,
    /// Deadline for a single worker; `None` waits indefinitely.
    pub worker_timeout: Option<Duration>,
}

impl Default for SchedulerConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 4,
            worker_timeout: Some(Duration::from_secs(300)),
        }
    }
}

impl SchedulerConfig {
    /// Build from config values, where a timeout of `0` disables the deadline.
    pub fn new(max_concurrency: usize, worker_timeout_secs: u64) -> Self {
        Self {
            max_concurrency: max_concurrency.max(1),
            worker_timeout: (worker_timeout_secs > 0)
                .then(|| Duration::from_secs(worker_timeout_secs)),
        }
    }
}

/// Runs a set of mutually independent workers and waits for all of them.
pub struct StageScheduler {
    registry: Arc<WorkerRegistry>,
    config: SchedulerConfig,
}

impl StageScheduler {
    pub fn new(registry: Arc<WorkerRegistry>, config: SchedulerConfig) -> Self {
        Self { registry, config }
    }

    pub const fn config(&self) -> &SchedulerConfig {
        &self.config
    }

    /// Run every spec concurrently (bounded) and return once each one has a
    /// terminal result.
    ///
    /// One worker failing, timing out or panicking never affects the others.
    /// Cancellation turns every unfinished worker into an error result.
    pub async fn run_stage(&self, specs: Vec<WorkerSpec>, cancel: &CancellationToken) -> ResultMap {
        let semaphore = Arc::new(Semaphore::new(self.config.max_concurrency));
        let mut pending = FuturesUnordered::new();

        for spec in specs {
            let name = spec.name.clone();
            let worker = self.registry.resolve(&name);
            let semaphore = Arc::clone(&semaphore);
            let cancel = cancel.clone();
            let timeout = self.config.worker_timeout;

            let handle = tokio::spawn(async move {
                tokio::select! {
                    biased;
                    () = cancel.cancelled() => {
                        tracing::warn!(worker = %spec.name, "worker cancelled");
                        WorkerResult::from_failure(&WorkerFailure::Cancelled)
                    }
                    result = async {
                        // The semaphore is never closed, so acquisition only fails on a bug.
                        let Ok(_permit) = semaphore.acquire_owned().await else {
                            return WorkerResult::from_failure(&WorkerFailure::Cancelled);
                        };
                        execute_single_worker(worker, &spec, timeout).await
                    } => result,
                }
            });

            pending.push(async move {
                let result = match handle.await {
                    Ok(result) => result,
                    Err(e) if e.is_panic() => {
                        let message = panic_message(e.into_panic());
                        tracing::error!(worker = %name, panic = %message, "worker task panicked");
                        WorkerResult::from_failure(&WorkerFailure::Panicked(message))
                    }
                    Err(_) => WorkerResult::from_failure(&WorkerFailure::Cancelled),
                };
                (name, result)
            });
        }

        let mut results = ResultMap::new();
        while let Some((name, result)) = pending.next().await {
            results.entry(name).or_insert(result);
        }
        results
    }
}

/// Execute a single worker with an optional deadline.
async fn execute_single_worker(
    worker: Arc<dyn Worker>,
    spec: &WorkerSpec,
    timeout: Option<Duration>,
) -> WorkerResult {
    let start = Instant::now();
    tracing::debug!(worker = %spec.name, backend = worker.name(), "worker started");

    let result = match timeout {
        Some(limit) => match tokio::time::timeout(limit, worker.invoke(spec)).await {
            Ok(result) => result,
            Err(_) => {
                tracing::warn!(worker = %spec.name, timeout_secs = limit.as_secs(), "worker timed out");
                WorkerResult::from_failure(&WorkerFailure::TimedOut(limit.as_secs()))
            }
        },
        None => worker.invoke(spec).await,
    };

    tracing::info!(
        worker = %spec.name,
        status = %result.status(),
        elapsed_ms = u64::try_from(start.elapsed().as_millis()).unwrap_or(u64::MAX),
        "worker finished"
    );
    result
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    payload
        .downcast_ref::<&str>()
        .map(|s| (*s).to_string())
        .or_else(|| payload.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string())
}
