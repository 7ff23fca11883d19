//! Vigil - concurrent image-analysis orchestrator
//!
//! Vigil runs a set of independent analysis workers over one image, gates
//! dependent workers on the fields their providers produced, reduces the
//! results to a compact context and asks a reasoning service for a
//! structured incident report. Every run yields exactly one record, however
//! many workers failed.
//!
//! # Architecture
//!
//! This crate follows Hexagonal Architecture principles:
//!
//! - **Domain Layer** (`domain`): models, port traits and error taxonomy
//! - **Service Layer** (`services`): planning, scheduling, gating, reduction,
//!   synthesis and record assembly
//! - **Adapters** (`adapters`): subprocess/in-process workers, the Anthropic
//!   reasoning client and the in-memory report store
//! - **Infrastructure Layer** (`infrastructure`): configuration, logging and wiring
//! - **CLI Layer** (`cli`): Command-line interface
//!
//! # Example
//!
//! ```ignore
//! use vigil::infrastructure::{config::ConfigLoader, setup::build_orchestrator};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigLoader::load()?;
//!     let orchestrator = build_orchestrator(&config)?;
//!     let run = orchestrator.run("scene.jpg").await?;
//!     println!("{}", serde_json::to_string_pretty(&run)?);
//!     Ok(())
//! }
//! ```

pub mod adapters;
pub mod cli;
pub mod domain;
pub mod infrastructure;
pub mod services;

// Re-export commonly used types for convenience
pub use domain::models::{
    Config, DependencyEdge, PipelineDefinition, PipelineRun, SystemStatus, WorkerDefinition,
    WorkerResult, WorkerSpec, WorkerStatus,
};
pub use domain::ports::{ReasoningClient, ReportSort, ReportStore, Worker};
pub use domain::{PipelineError, SynthesisError, WorkerFailure};
pub use infrastructure::config::{ConfigError, ConfigLoader};
pub use services::{OrchestratorConfig, PipelineOrchestrator};
