//! End-to-end pipeline tests with mock workers and a mock reasoning client.

mod common;

use serde_json::json;
use std::sync::Arc;
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use vigil::adapters::reasoning::MockReasoningClient;
use vigil::adapters::workers::{MockResponse, MockWorker};
use vigil::domain::models::{SystemStatus, WorkerStatus, SYNTHESIS_KEY};
use vigil::services::pipeline_orchestrator::CANCELLED_MESSAGE;
use vigil::services::synthesis::FAILURE_MESSAGE;
use vigil::services::OrchestratorConfig;

const DECLARED: [&str; 5] = [
    "biometrics",
    "cctv_retrieval",
    "gps",
    "object_detection",
    "ocr_environment",
];

#[tokio::test]
async fn test_every_worker_has_exactly_one_entry() {
    common::setup_test_logging();
    let (_dir, image) = common::temp_image();

    let worker = Arc::new(MockWorker::with_default_response(MockResponse::failure(1)));
    worker.set_response("object_detection", MockResponse::empty()).await;
    worker
        .set_response("ocr_environment", MockResponse::success("no json here"))
        .await;
    let reasoner = Arc::new(MockReasoningClient::unreachable("offline"));

    let run = common::orchestrator_with(worker, reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    let mut expected: Vec<&str> = DECLARED.to_vec();
    expected.push(SYNTHESIS_KEY);
    expected.sort_unstable();
    let names: Vec<&str> = run.modules().keys().map(String::as_str).collect();
    assert_eq!(names, expected);

    assert_eq!(run.module("gps").unwrap().status(), WorkerStatus::Error);
    assert_eq!(
        run.module("gps").unwrap().message(),
        Some("Worker failed with exit code 1")
    );
    assert_eq!(run.module("object_detection").unwrap().message(), Some("Empty output"));
    assert_eq!(
        run.module("ocr_environment").unwrap().message(),
        Some("No JSON object found in output")
    );
    assert_eq!(run.module("cctv_retrieval").unwrap().status(), WorkerStatus::Skipped);
    assert_eq!(run.system_status(), SystemStatus::SynthesisFailed);
}

#[tokio::test]
async fn test_failed_gps_skips_cctv_without_invoking_it() {
    let (_dir, image) = common::temp_image();

    let worker = Arc::new(MockWorker::new());
    worker.set_response("gps", MockResponse::failure(2)).await;
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("LOW")));

    let run = common::orchestrator_with(worker.clone(), reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    let cctv = run.module("cctv_retrieval").unwrap();
    assert_eq!(cctv.status(), WorkerStatus::Skipped);
    assert!(cctv.payload().is_none());
    assert_eq!(worker.invocation_count("cctv_retrieval").await, 0);
    assert_eq!(worker.invocation_count("gps").await, 1);
}

#[tokio::test]
async fn test_gps_without_coordinates_skips_cctv() {
    let (_dir, image) = common::temp_image();

    let worker = Arc::new(MockWorker::new());
    worker
        .set_response("gps", MockResponse::json(&json!({"lat": 24.7, "lng": null})))
        .await;
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("LOW")));

    let run = common::orchestrator_with(worker.clone(), reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    assert_eq!(run.module("cctv_retrieval").unwrap().status(), WorkerStatus::Skipped);
    assert_eq!(worker.invocation_count("cctv_retrieval").await, 0);
}

#[tokio::test]
async fn test_string_coordinates_run_cctv_and_reach_context() {
    let (_dir, image) = common::temp_image();

    let worker = Arc::new(MockWorker::new());
    worker
        .set_response(
            "gps",
            MockResponse::json(&json!({"lat": "24.7136", "lng": "46.6753"})),
        )
        .await;
    worker
        .set_response("cctv_retrieval", MockResponse::json(&common::cctv_payload()))
        .await;
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("LOW")));

    let run = common::orchestrator_with(
        worker.clone(),
        reasoner.clone(),
        OrchestratorConfig::default(),
    )
    .run(&image)
    .await
    .unwrap();

    assert_eq!(worker.invocation_count("cctv_retrieval").await, 1);
    assert_eq!(run.module("cctv_retrieval").unwrap().status(), WorkerStatus::Ok);

    let requests = reasoner.requests().await;
    let context: serde_json::Value = serde_json::from_str(&requests[0].user_payload).unwrap();
    assert_eq!(context["location"], json!({"lat": "24.7136", "lng": "46.6753"}));
    assert_eq!(context["cctv"][0]["id"], "CAM-07");
}

#[tokio::test]
async fn test_gps_fix_feeds_cctv_arguments() {
    let (_dir, image) = common::temp_image();

    let worker = Arc::new(MockWorker::new());
    worker.set_response("gps", MockResponse::json(&common::gps_payload())).await;
    worker
        .set_response("cctv_retrieval", MockResponse::json(&common::cctv_payload()))
        .await;
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("HIGH")));

    let run = common::orchestrator_with(
        worker.clone(),
        reasoner.clone(),
        OrchestratorConfig::default(),
    )
    .run(&image)
    .await
    .unwrap();

    let calls: Vec<_> = worker
        .invocations()
        .await
        .into_iter()
        .filter(|spec| spec.name == "cctv_retrieval")
        .collect();
    assert_eq!(calls.len(), 1);
    let args = &calls[0].args;
    assert!(args.windows(2).any(|w| w == ["--lat", "24.7136"]));
    assert!(args.windows(2).any(|w| w == ["--lng", "46.6753"]));

    assert_eq!(run.module("cctv_retrieval").unwrap().status(), WorkerStatus::Ok);
    assert_eq!(run.system_status(), SystemStatus::Analyzed);

    let requests = reasoner.requests().await;
    assert_eq!(requests.len(), 1);
    let context: serde_json::Value = serde_json::from_str(&requests[0].user_payload).unwrap();
    assert_eq!(context["location"]["lat"], json!(24.7136));
    assert_eq!(context["cctv"][0]["id"], "CAM-07");
}

#[tokio::test]
async fn test_input_path_is_absolute_in_worker_args() {
    let (_dir, image) = common::temp_image();
    let worker = Arc::new(MockWorker::new());
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("LOW")));

    let run = common::orchestrator_with(worker.clone(), reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    assert!(run.target_image().is_absolute());
    let gps = worker
        .invocations()
        .await
        .into_iter()
        .find(|spec| spec.name == "gps")
        .unwrap();
    assert_eq!(gps.args.last().map(String::as_str), run.target_image().to_str());
}

#[tokio::test]
async fn test_unreachable_synthesis_yields_error_marker() {
    let (_dir, image) = common::temp_image();
    let worker = Arc::new(MockWorker::new());
    let reasoner = Arc::new(MockReasoningClient::unreachable("connection refused"));

    let run = common::orchestrator_with(worker, reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    let reasoning = run.module(SYNTHESIS_KEY).unwrap();
    assert_eq!(reasoning.status(), WorkerStatus::Error);
    assert_eq!(reasoning.message(), Some(FAILURE_MESSAGE));
    assert!(reasoning.details().unwrap().contains("connection refused"));
    assert!(!run.pipeline_id().is_nil());
    assert_eq!(run.system_status(), SystemStatus::SynthesisFailed);

    let record = serde_json::to_value(&run).unwrap();
    assert_eq!(record["system_status"], "SYNTHESIS_FAILED");
    assert!(record["timestamp"].is_string());
    let marker = &record["modules"]["reasoning"];
    assert_eq!(marker["status"], "error");
    assert_eq!(marker["error"], FAILURE_MESSAGE);
    assert!(marker["details"]
        .as_str()
        .unwrap()
        .contains("connection refused"));
    assert!(marker.get("payload").is_none());
}

#[tokio::test]
async fn test_report_is_flattened_into_module_entry() {
    let (_dir, image) = common::temp_image();
    let worker = Arc::new(MockWorker::new());
    worker.set_response("gps", MockResponse::json(&common::gps_payload())).await;
    let reasoner = Arc::new(MockReasoningClient::replying(format!(
        "Here is the report:\n{}\nEnd.",
        common::valid_report("CRITICAL")
    )));

    let run = common::orchestrator_with(worker, reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    let record = serde_json::to_value(&run).unwrap();
    assert_eq!(record["system_status"], "ANALYZED");
    assert_eq!(
        record["modules"]["reasoning"]["classification"]["priority"],
        "CRITICAL"
    );
    assert_eq!(record["modules"]["reasoning"]["status"], "ok");
    assert!(record["modules"]["reasoning"].get("payload").is_none());
    assert_eq!(record["modules"]["gps"]["lat"], json!(24.7136));
    assert_eq!(run.priority_rank(), 0);
}

#[tokio::test]
async fn test_panicking_worker_is_isolated() {
    let (_dir, image) = common::temp_image();
    let worker = Arc::new(MockWorker::new());
    worker.set_response("biometrics", MockResponse::panicking()).await;
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("MEDIUM")));

    let run = common::orchestrator_with(worker, reasoner, OrchestratorConfig::default())
        .run(&image)
        .await
        .unwrap();

    let biometrics = run.module("biometrics").unwrap();
    assert_eq!(biometrics.status(), WorkerStatus::Error);
    assert!(biometrics.message().unwrap().starts_with("Worker panicked"));
    assert_eq!(run.module("gps").unwrap().status(), WorkerStatus::Ok);
    assert_eq!(run.system_status(), SystemStatus::Analyzed);
}

#[tokio::test]
async fn test_cancelled_run_still_produces_full_record() {
    let (_dir, image) = common::temp_image();
    let worker = Arc::new(MockWorker::with_default_response(
        MockResponse::json(&common::gps_payload()).with_delay(Duration::from_secs(30)),
    ));
    let reasoner = Arc::new(MockReasoningClient::replying_json(&common::valid_report("LOW")));
    let orchestrator =
        common::orchestrator_with(worker.clone(), reasoner, OrchestratorConfig::default());

    let cancel = CancellationToken::new();
    let trigger = cancel.clone();
    tokio::spawn(async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        trigger.cancel();
    });

    let run = tokio::time::timeout(
        Duration::from_secs(5),
        orchestrator.run_with_cancel(&image, &cancel),
    )
    .await
    .expect("cancellation should end the run promptly")
    .unwrap();

    assert_eq!(run.modules().len(), DECLARED.len() + 1);
    assert_eq!(run.module("gps").unwrap().message(), Some("Worker cancelled"));
    let cctv = run.module("cctv_retrieval").unwrap();
    assert_eq!(cctv.status(), WorkerStatus::Skipped);
    assert_eq!(cctv.message(), Some(CANCELLED_MESSAGE));
    assert_eq!(worker.invocation_count("cctv_retrieval").await, 0);
    assert_eq!(run.module(SYNTHESIS_KEY).unwrap().status(), WorkerStatus::Error);
}
