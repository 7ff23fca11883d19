//! Domain layer for the vigil pipeline
//!
//! Core types (worker specs, results, runs, synthesis context), the port
//! traits adapters implement, and the error taxonomy.

pub mod errors;
pub mod models;
pub mod ports;

pub use errors::{PipelineError, PipelineResult, SynthesisError, WorkerFailure};
