//! Domain errors for the vigil pipeline.

use std::path::PathBuf;
use thiserror::Error;

/// Format a cycle path as a human-readable string: `a -> b -> c -> a`.
fn format_cycle_path(path: &[String]) -> String {
    path.join(" -> ")
}

/// Errors surfaced to the caller of the orchestrator.
///
/// Only [`PipelineError::InputNotFound`] can occur once a pipeline has been
/// constructed; the remaining variants reject an invalid pipeline definition
/// up front.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("Image not found: {}", .0.display())]
    InputNotFound(PathBuf),

    #[error("Duplicate worker name: {0}")]
    DuplicateWorker(String),

    #[error("Worker name '{0}' is reserved for the synthesis stage")]
    ReservedName(String),

    #[error("Dependency edge references unknown worker: {0}")]
    UnknownWorker(String),

    #[error("Worker dependency cycle detected: {}", format_cycle_path(.0))]
    DependencyCycle(Vec<String>),

    #[error("Invalid pipeline definition: {0}")]
    InvalidDefinition(String),
}

pub type PipelineResult<T> = Result<T, PipelineError>;

/// Terminal failure of a single worker invocation.
///
/// These never propagate out of the scheduler; each one is folded into an
/// `error` [`WorkerResult`](crate::domain::models::WorkerResult) whose message
/// is the `Display` text below.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum WorkerFailure {
    #[error("Failed to launch worker: {0}")]
    LaunchFailed(String),

    #[error("Worker failed with exit code {}", exit_code_label(*.0))]
    NonZeroExit(Option<i32>),

    #[error("Empty output")]
    EmptyOutput,

    /// Output contained no `{ ... }` span, or the span was not an object.
    #[error("No JSON object found in output")]
    NoJsonObject,

    /// The `{ ... }` span could not be parsed.
    #[error("JSON decode error")]
    DecodeError,

    #[error("Worker timed out after {0} seconds")]
    TimedOut(u64),

    #[error("Worker cancelled")]
    Cancelled,

    #[error("Worker panicked: {0}")]
    Panicked(String),
}

fn exit_code_label(code: Option<i32>) -> String {
    code.map_or_else(|| "unknown (terminated by signal)".to_string(), |c| c.to_string())
}

/// Failures of the synthesis (reasoning) call.
#[derive(Debug, Error)]
pub enum SynthesisError {
    #[error("API key not configured (set synthesis.api_key or ANTHROPIC_API_KEY)")]
    MissingApiKey,

    #[error("Request to reasoning service failed: {0}")]
    Request(String),

    #[error("Reasoning service returned {status}: {body}")]
    Status { status: u16, body: String },

    #[error("Reasoning service returned no text content")]
    EmptyResponse,

    #[error("No JSON object found in reasoning response")]
    NoJsonObject,

    #[error("Malformed reasoning response: {0}")]
    Malformed(String),

    #[error("Reasoning response does not match the incident schema: {0}")]
    Schema(String),

    #[error("Run cancelled before synthesis completed")]
    Cancelled,
}

impl From<serde_json::Error> for SynthesisError {
    fn from(err: serde_json::Error) -> Self {
        Self::Malformed(err.to_string())
    }
}
