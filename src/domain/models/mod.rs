//! Domain models.

pub mod config;
pub mod context;
pub mod incident;
pub mod pipeline;
pub mod run;
pub mod worker;

pub use config::{Config, LoggingConfig, SynthesisConfig};
pub use context::{ContextSources, Location, SynthesisContext};
pub use incident::{
    ActionPlan, Classification, IncidentDomain, IncidentNarrative, IncidentReport, Priority,
};
pub use pipeline::{DependencyEdge, PipelineDefinition, WorkerDefinition, SYNTHESIS_KEY};
pub use run::{PendingRun, PipelineRun, ResultMap, SystemStatus};
pub use worker::{OutputFraming, Payload, WorkerResult, WorkerSpec, WorkerStatus};
