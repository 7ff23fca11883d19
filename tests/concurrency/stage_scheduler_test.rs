//! Concurrency tests for StageScheduler
//!
//! Probes the in-flight high-water mark and per-worker isolation using a
//! delaying mock worker.

use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio_util::sync::CancellationToken;

use vigil::adapters::workers::{MockResponse, MockWorker, WorkerRegistry};
use vigil::domain::models::{WorkerSpec, WorkerStatus};
use vigil::services::{SchedulerConfig, StageScheduler};

use crate::common;

fn specs(count: usize) -> Vec<WorkerSpec> {
    (0..count)
        .map(|i| WorkerSpec::new(format!("worker_{i}"), "mock"))
        .collect()
}

fn scheduler(worker: Arc<MockWorker>, max_concurrency: usize, timeout_secs: u64) -> StageScheduler {
    StageScheduler::new(
        Arc::new(WorkerRegistry::new(worker)),
        SchedulerConfig::new(max_concurrency, timeout_secs),
    )
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_high_water_mark_respects_bound() {
    common::setup_test_logging();
    let worker = Arc::new(MockWorker::with_default_response(
        MockResponse::success("{\"ok\": true}").with_delay(Duration::from_millis(100)),
    ));

    let results = scheduler(worker.clone(), 4, 0)
        .run_stage(specs(6), &CancellationToken::new())
        .await;

    assert_eq!(results.len(), 6);
    assert!(results.values().all(|r| r.status() == WorkerStatus::Ok));
    assert!(worker.max_in_flight() <= 4, "saw {}", worker.max_in_flight());
    assert!(worker.max_in_flight() >= 2, "workers never overlapped");
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_bound_of_one_serializes() {
    let worker = Arc::new(MockWorker::with_default_response(
        MockResponse::success("{}").with_delay(Duration::from_millis(20)),
    ));

    let results = scheduler(worker.clone(), 1, 0)
        .run_stage(specs(5), &CancellationToken::new())
        .await;

    assert_eq!(results.len(), 5);
    assert_eq!(worker.max_in_flight(), 1);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_independent_workers_run_concurrently() {
    let worker = Arc::new(MockWorker::with_default_response(
        MockResponse::success("{}").with_delay(Duration::from_millis(200)),
    ));

    let start = Instant::now();
    scheduler(worker, 4, 0)
        .run_stage(specs(4), &CancellationToken::new())
        .await;

    assert!(start.elapsed() < Duration::from_millis(700));
}

#[tokio::test]
async fn test_slow_worker_times_out_alone() {
    let worker = Arc::new(MockWorker::new());
    worker
        .set_response(
            "worker_0",
            MockResponse::success("{}").with_delay(Duration::from_secs(30)),
        )
        .await;

    let results = scheduler(worker, 4, 1)
        .run_stage(specs(3), &CancellationToken::new())
        .await;

    let slow = &results["worker_0"];
    assert_eq!(slow.status(), WorkerStatus::Error);
    assert_eq!(slow.message(), Some("Worker timed out after 1 seconds"));
    assert_eq!(results["worker_1"].status(), WorkerStatus::Ok);
    assert_eq!(results["worker_2"].status(), WorkerStatus::Ok);
}

#[tokio::test]
async fn test_cancel_resolves_queued_and_running_workers() {
    let worker = Arc::new(MockWorker::with_default_response(
        MockResponse::success("{}").with_delay(Duration::from_secs(30)),
    ));
    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let results = tokio::time::timeout(
        Duration::from_secs(5),
        scheduler(worker, 2, 0).run_stage(specs(4), &cancel),
    )
    .await
    .unwrap();

    assert_eq!(results.len(), 4);
    assert!(results
        .values()
        .all(|r| r.message() == Some("Worker cancelled")));
}
