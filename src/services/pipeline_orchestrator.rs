//! Pipeline orchestrator.
//!
//! Drives one run end to end: waves of workers (gated on their
//! dependencies), context reduction, synthesis and record assembly.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::adapters::workers::WorkerRegistry;
use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{
    Config, ContextSources, PendingRun, PipelineDefinition, PipelineRun, WorkerResult,
    SYNTHESIS_KEY,
};
use crate::domain::ports::ReasoningClient;
use crate::services::context_reducer::ContextReducer;
use crate::services::dependency_gate::{self, GateDecision};
use crate::services::dependency_plan::DependencyPlan;
use crate::services::record_assembler::RecordAssembler;
use crate::services::stage_scheduler::{SchedulerConfig, StageScheduler};
use crate::services::synthesis::SynthesisService;

/// Message recorded for workers that were never started because the run was
/// cancelled.
pub const CANCELLED_MESSAGE: &str = "Run cancelled";

/// Configuration for the orchestrator.
#[derive(Debug, Clone, Default)]
pub struct OrchestratorConfig {
    pub scheduler: SchedulerConfig,
    pub context: ContextSources,
    /// Sampling temperature passed to the reasoning service.
    pub temperature: f64,
}

impl From<&Config> for OrchestratorConfig {
    fn from(config: &Config) -> Self {
        Self {
            scheduler: SchedulerConfig::new(config.max_concurrency, config.worker_timeout_secs),
            context: config.context.clone(),
            temperature: config.synthesis.temperature,
        }
    }
}

pub struct PipelineOrchestrator {
    definition: PipelineDefinition,
    plan: DependencyPlan,
    scheduler: StageScheduler,
    reducer: ContextReducer,
    synthesis: SynthesisService,
}

impl PipelineOrchestrator {
    /// Build an orchestrator, validating the pipeline definition.
    ///
    /// # Errors
    /// Returns a [`PipelineError`] if the definition is invalid.
    pub fn new(
        definition: PipelineDefinition,
        registry: Arc<WorkerRegistry>,
        reasoner: Arc<dyn ReasoningClient>,
        config: OrchestratorConfig,
    ) -> PipelineResult<Self> {
        let plan = DependencyPlan::build(&definition)?;
        Ok(Self {
            definition,
            plan,
            scheduler: StageScheduler::new(registry, config.scheduler),
            reducer: ContextReducer::new(config.context),
            synthesis: SynthesisService::new(reasoner, config.temperature),
        })
    }

    pub const fn definition(&self) -> &PipelineDefinition {
        &self.definition
    }

    pub const fn plan(&self) -> &DependencyPlan {
        &self.plan
    }

    /// Run the pipeline over `image`.
    ///
    /// # Errors
    /// Only [`PipelineError::InputNotFound`], before any worker is dispatched.
    pub async fn run(&self, image: impl AsRef<Path>) -> PipelineResult<PipelineRun> {
        self.run_with_cancel(image, &CancellationToken::new()).await
    }

    /// Run the pipeline, stopping early if `cancel` fires.
    ///
    /// A cancelled run still returns a complete record: in-flight workers
    /// resolve to errors and unstarted ones to `skipped`.
    pub async fn run_with_cancel(
        &self,
        image: impl AsRef<Path>,
        cancel: &CancellationToken,
    ) -> PipelineResult<PipelineRun> {
        let target = resolve_input(image.as_ref()).await?;
        let pending = PendingRun::start(target);
        let span = tracing::info_span!("pipeline_run", pipeline_id = %pending.pipeline_id());
        Ok(self.execute(pending, cancel).instrument(span).await)
    }

    async fn execute(&self, mut pending: PendingRun, cancel: &CancellationToken) -> PipelineRun {
        tracing::info!(
            image = %pending.target_image().display(),
            waves = self.plan.waves().len(),
            "pipeline run started"
        );

        for (index, wave) in self.plan.waves().iter().enumerate() {
            if cancel.is_cancelled() {
                for name in wave {
                    pending.record(name.as_str(), WorkerResult::skipped(CANCELLED_MESSAGE));
                }
                continue;
            }

            let mut specs = Vec::with_capacity(wave.len());
            for name in wave {
                let Some(worker) = self.definition.worker(name) else {
                    continue;
                };
                let decision = dependency_gate::evaluate(
                    worker,
                    self.definition.edges_for(name),
                    pending.results(),
                    pending.target_image(),
                );
                match decision {
                    GateDecision::Run(spec) => specs.push(spec),
                    GateDecision::Skip(reason) => {
                        tracing::info!(worker = %name, reason = %reason, "worker skipped");
                        pending.record(name.as_str(), WorkerResult::skipped(reason));
                    }
                }
            }

            tracing::debug!(wave = index + 1, workers = specs.len(), "dispatching wave");
            for (name, result) in self.scheduler.run_stage(specs, cancel).await {
                pending.record(name, result);
            }
        }

        let context = self.reducer.reduce(pending.results());
        let synthesis = self.synthesis.synthesize(&context, cancel).await;
        pending.record(SYNTHESIS_KEY, synthesis);

        let run = RecordAssembler::assemble(pending, &self.definition.worker_names());
        tracing::info!(system_status = ?run.system_status(), "pipeline run completed");
        run
    }
}

/// Make the input path absolute and check that it names an existing file.
async fn resolve_input(image: &Path) -> PipelineResult<PathBuf> {
    let absolute =
        std::path::absolute(image).map_err(|_| PipelineError::InputNotFound(image.to_path_buf()))?;

    match tokio::fs::metadata(&absolute).await {
        Ok(meta) if meta.is_file() => Ok(absolute),
        _ => {
            tracing::warn!(image = %absolute.display(), "input image not found");
            Err(PipelineError::InputNotFound(absolute))
        }
    }
}
