//! Service layer: the pipeline stages and the orchestrator that drives them.

pub mod context_reducer;
pub mod dependency_gate;
pub mod dependency_plan;
pub mod output_parser;
pub mod pipeline_orchestrator;
pub mod record_assembler;
pub mod stage_scheduler;
pub mod synthesis;

pub use context_reducer::ContextReducer;
pub use dependency_gate::GateDecision;
pub use dependency_plan::DependencyPlan;
pub use output_parser::{extract_json_object, RawOutput};
pub use pipeline_orchestrator::{OrchestratorConfig, PipelineOrchestrator};
pub use record_assembler::RecordAssembler;
pub use stage_scheduler::{SchedulerConfig, StageScheduler};
pub use synthesis::SynthesisService;
