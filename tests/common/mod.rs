//! Common test utilities for integration tests
//!
//! Provides shared fixtures and helpers used across multiple integration
//! test files.

#![allow(dead_code)]

use serde_json::{json, Value};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use vigil::adapters::reasoning::MockReasoningClient;
use vigil::adapters::workers::{MockWorker, WorkerRegistry};
use vigil::domain::models::PipelineDefinition;
use vigil::services::{OrchestratorConfig, PipelineOrchestrator};

/// Create a temporary directory for test isolation
pub fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("Failed to create temp dir")
}

/// Create an image file to feed the pipeline
///
/// Returns the TempDir (keep it alive) and the image path.
pub fn temp_image() -> (TempDir, PathBuf) {
    let dir = temp_dir();
    let path = dir.path().join("scene.jpg");
    std::fs::write(&path, b"\xFF\xD8\xFF\xE0 not really a jpeg").expect("Failed to write image");
    (dir, path)
}

/// Setup test logging
///
/// Call this at the beginning of tests that need logging.
pub fn setup_test_logging() {
    use tracing_subscriber::fmt;

    let _ = fmt()
        .with_test_writer()
        .with_max_level(tracing::Level::DEBUG)
        .try_init();
}

/// A reasoning-service answer that passes schema validation.
pub fn valid_report(priority: &str) -> Value {
    json!({
        "incident_id": "INC-2026-0001",
        "timestamp": "2026-10-18T12:00:00Z",
        "classification": {"priority": priority, "domain": "SECURITY", "type": "ARMED_ROBBERY"},
        "report": {
            "summary": "Armed suspect near a shop entrance",
            "detailed_narrative": "A masked individual holding a handgun stands by the door.",
            "visual_evidence": ["handgun", "mask"]
        },
        "action_plan": {"recommended_unit": "Armed response", "nearest_cctv": "CAM-07"}
    })
}

pub fn gps_payload() -> Value {
    json!({"lat": 24.7136, "lng": 46.6753, "confidence": 0.91})
}

pub fn cctv_payload() -> Value {
    json!({"cameras": [{"id": "CAM-07", "distance_m": 40}]})
}

/// Orchestrator over the standard pipeline with every worker served by `worker`.
pub fn orchestrator_with(
    worker: Arc<MockWorker>,
    reasoner: Arc<MockReasoningClient>,
    config: OrchestratorConfig,
) -> PipelineOrchestrator {
    PipelineOrchestrator::new(
        PipelineDefinition::standard(),
        Arc::new(WorkerRegistry::new(worker)),
        reasoner,
        config,
    )
    .expect("standard pipeline is valid")
}
