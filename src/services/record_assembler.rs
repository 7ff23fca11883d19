//! Freezes a pending run into its emittable record.

use crate::domain::models::{PendingRun, PipelineRun, SystemStatus, WorkerResult, SYNTHESIS_KEY};

/// Message recorded for a declared worker that never reported.
pub const NOT_RUN_MESSAGE: &str = "Worker did not run";

pub struct RecordAssembler;

impl RecordAssembler {
    /// Assemble the final record. No I/O.
    ///
    /// Every name in `declared` (and the synthesis key) is guaranteed an
    /// entry; any that never reported is recorded as `skipped`.
    pub fn assemble(pending: PendingRun, declared: &[String]) -> PipelineRun {
        let (pipeline_id, timestamp, target_image, mut modules) = pending.into_parts();

        for name in declared.iter().map(String::as_str).chain([SYNTHESIS_KEY]) {
            modules
                .entry(name.to_string())
                .or_insert_with(|| WorkerResult::skipped(NOT_RUN_MESSAGE));
        }

        let system_status = match modules.get(SYNTHESIS_KEY) {
            Some(result) if result.is_ok() => SystemStatus::Analyzed,
            _ => SystemStatus::SynthesisFailed,
        };

        PipelineRun::new(pipeline_id, timestamp, target_image, modules, system_status)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{Payload, WorkerStatus};

    #[test]
    fn test_fills_missing_entries() {
        let mut pending = PendingRun::start("/tmp/a.jpg");
        let id = pending.pipeline_id();
        pending.record("gps", WorkerResult::error("Empty output"));

        let run = RecordAssembler::assemble(pending, &["gps".to_string(), "ocr".to_string()]);

        assert_eq!(run.pipeline_id(), id);
        assert_eq!(run.modules().len(), 3);
        assert_eq!(run.module("gps").unwrap().status(), WorkerStatus::Error);
        assert_eq!(run.module("ocr").unwrap().status(), WorkerStatus::Skipped);
        assert_eq!(run.system_status(), SystemStatus::SynthesisFailed);
    }

    #[test]
    fn test_analyzed_when_synthesis_ok() {
        let mut pending = PendingRun::start("/tmp/a.jpg");
        pending.record(SYNTHESIS_KEY, WorkerResult::ok(Payload::new()));
        let run = RecordAssembler::assemble(pending, &[]);
        assert_eq!(run.system_status(), SystemStatus::Analyzed);
    }
}
