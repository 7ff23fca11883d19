//! Pipeline run models.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use super::incident::{Priority, UNRECOGNISED_PRIORITY_RANK};
use super::pipeline::SYNTHESIS_KEY;
use super::worker::WorkerResult;

/// Worker name → result. Ordered so emitted records are stable.
pub type ResultMap = BTreeMap<String, WorkerResult>;

/// Overall outcome of a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum SystemStatus {
    /// Synthesis produced a valid incident report
    Analyzed,
    /// Synthesis degraded to an error marker
    SynthesisFailed,
}

/// A run that is still collecting results.
///
/// Results are insert-only: once a worker's result is recorded it is never
/// replaced.
#[derive(Debug, Clone)]
pub struct PendingRun {
    pipeline_id: Uuid,
    timestamp: DateTime<Utc>,
    target_image: PathBuf,
    modules: ResultMap,
}

impl PendingRun {
    pub fn start(target_image: impl Into<PathBuf>) -> Self {
        Self {
            pipeline_id: Uuid::new_v4(),
            timestamp: Utc::now(),
            target_image: target_image.into(),
            modules: ResultMap::new(),
        }
    }

    pub const fn pipeline_id(&self) -> Uuid {
        self.pipeline_id
    }

    pub fn target_image(&self) -> &Path {
        &self.target_image
    }

    /// Record a result. Returns `false` (and keeps the first result) if the
    /// worker already reported.
    pub fn record(&mut self, name: impl Into<String>, result: WorkerResult) -> bool {
        let name = name.into();
        if self.modules.contains_key(&name) {
            tracing::warn!(worker = %name, "ignoring duplicate result for worker");
            return false;
        }
        self.modules.insert(name, result);
        true
    }

    pub const fn results(&self) -> &ResultMap {
        &self.modules
    }

    pub(crate) fn into_parts(self) -> (Uuid, DateTime<Utc>, PathBuf, ResultMap) {
        (self.pipeline_id, self.timestamp, self.target_image, self.modules)
    }
}

/// The frozen, emittable record of one run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineRun {
    pipeline_id: Uuid,
    timestamp: DateTime<Utc>,
    target_image: PathBuf,
    modules: ResultMap,
    system_status: SystemStatus,
}

impl PipelineRun {
    pub(crate) const fn new(
        pipeline_id: Uuid,
        timestamp: DateTime<Utc>,
        target_image: PathBuf,
        modules: ResultMap,
        system_status: SystemStatus,
    ) -> Self {
        Self {
            pipeline_id,
            timestamp,
            target_image,
            modules,
            system_status,
        }
    }

    pub const fn pipeline_id(&self) -> Uuid {
        self.pipeline_id
    }

    pub const fn timestamp(&self) -> DateTime<Utc> {
        self.timestamp
    }

    pub fn target_image(&self) -> &Path {
        &self.target_image
    }

    pub const fn modules(&self) -> &ResultMap {
        &self.modules
    }

    pub fn module(&self, name: &str) -> Option<&WorkerResult> {
        self.modules.get(name)
    }

    pub const fn system_status(&self) -> SystemStatus {
        self.system_status
    }

    /// Sort rank from `modules.reasoning.classification.priority`.
    ///
    /// A bare string `classification` is taken as the label itself. Missing
    /// classification ranks as `UNKNOWN`; a label outside the rank table
    /// ranks after everything else.
    pub fn priority_rank(&self) -> u8 {
        let label = self
            .module(SYNTHESIS_KEY)
            .and_then(|r| r.field("classification"))
            .and_then(|c| match c {
                serde_json::Value::String(label) => Some(label.as_str()),
                other => other.get("priority").and_then(|v| v.as_str()),
            });

        match label {
            None => Priority::Unknown.rank(),
            Some(label) => {
                Priority::from_label(label).map_or(UNRECOGNISED_PRIORITY_RANK, Priority::rank)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::worker::Payload;
    use serde_json::json;

    fn reasoning(priority: serde_json::Value) -> WorkerResult {
        let payload: Payload = serde_json::from_value(json!({
            "classification": {"priority": priority}
        }))
        .unwrap();
        WorkerResult::ok(payload)
    }

    fn finished(modules: ResultMap) -> PipelineRun {
        PipelineRun::new(
            Uuid::new_v4(),
            Utc::now(),
            PathBuf::from("/tmp/a.jpg"),
            modules,
            SystemStatus::Analyzed,
        )
    }

    #[test]
    fn test_record_is_insert_only() {
        let mut run = PendingRun::start("/tmp/a.jpg");
        assert!(run.record("gps", WorkerResult::error("first")));
        assert!(!run.record("gps", WorkerResult::error("second")));
        assert_eq!(run.results()["gps"].message(), Some("first"));
    }

    #[test]
    fn test_priority_rank() {
        let mut modules = ResultMap::new();
        modules.insert(SYNTHESIS_KEY.to_string(), reasoning(json!("CRITICAL")));
        assert_eq!(finished(modules).priority_rank(), 0);

        let mut modules = ResultMap::new();
        modules.insert(SYNTHESIS_KEY.to_string(), reasoning(json!("low")));
        assert_eq!(finished(modules).priority_rank(), 3);

        let mut modules = ResultMap::new();
        modules.insert(SYNTHESIS_KEY.to_string(), reasoning(json!("SEVERE")));
        assert_eq!(finished(modules).priority_rank(), 99);

        let mut modules = ResultMap::new();
        modules.insert(
            SYNTHESIS_KEY.to_string(),
            WorkerResult::error_with_details("Failed to analyze incident", "offline"),
        );
        assert_eq!(finished(modules).priority_rank(), 4);
    }

    #[test]
    fn test_priority_rank_reads_flat_record() {
        let mut modules = ResultMap::new();
        modules.insert(SYNTHESIS_KEY.to_string(), reasoning(json!("HIGH")));
        let record = serde_json::to_value(finished(modules)).unwrap();
        assert_eq!(
            record["modules"]["reasoning"]["classification"]["priority"],
            json!("HIGH")
        );

        let restored: PipelineRun = serde_json::from_value(record).unwrap();
        assert_eq!(restored.priority_rank(), 1);
    }

    #[test]
    fn test_priority_rank_string_classification() {
        let payload: Payload = serde_json::from_value(json!({"classification": "medium"})).unwrap();
        let mut modules = ResultMap::new();
        modules.insert(SYNTHESIS_KEY.to_string(), WorkerResult::ok(payload));
        assert_eq!(finished(modules).priority_rank(), 2);
    }

    #[test]
    fn test_serialized_field_names() {
        let value = serde_json::to_value(finished(ResultMap::new())).unwrap();
        let obj = value.as_object().unwrap();
        for key in ["pipeline_id", "timestamp", "target_image", "modules", "system_status"] {
            assert!(obj.contains_key(key), "missing {key}");
        }
        assert_eq!(obj["system_status"], json!("ANALYZED"));
    }
}
