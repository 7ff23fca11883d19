//! Worker output interpretation.
//!
//! Turns the captured exit status and stdout of a worker into a terminal
//! [`WorkerResult`]. Raw output never leaves this module except through the
//! debug log.

use serde_json::Value;

use crate::domain::errors::WorkerFailure;
use crate::domain::models::{OutputFraming, Payload, WorkerResult};

/// Maximum number of stdout characters echoed to the debug log.
const LOG_SNIPPET_CHARS: usize = 512;

/// Captured output of one finished worker process.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawOutput {
    /// `true` when the process exited with status zero
    pub success: bool,
    /// Exit code, `None` when terminated by a signal
    pub exit_code: Option<i32>,
    pub stdout: String,
    pub stderr: String,
}

impl RawOutput {
    pub fn succeeded(stdout: impl Into<String>) -> Self {
        Self {
            success: true,
            exit_code: Some(0),
            stdout: stdout.into(),
            stderr: String::new(),
        }
    }

    pub fn failed(exit_code: Option<i32>) -> Self {
        Self {
            success: false,
            exit_code,
            ..Self::default()
        }
    }
}

/// Span from the first `{` to the last `}` inclusive.
///
/// Text around the span is ignored. Returns `None` when either brace is
/// missing or the last `}` comes before the first `{`.
pub fn extract_json_object(text: &str) -> Option<&str> {
    let start = text.find('{')?;
    let end = text.rfind('}')?;
    (end > start).then(|| &text[start..=end])
}

/// Parse worker stdout into a payload under the given framing.
pub fn parse_payload(text: &str, framing: OutputFraming) -> Result<Payload, WorkerFailure> {
    let candidate = match framing {
        OutputFraming::Outermost => extract_json_object(text).ok_or(WorkerFailure::NoJsonObject)?,
        OutputFraming::Strict => {
            let trimmed = text.trim();
            if !trimmed.starts_with('{') || !trimmed.ends_with('}') {
                return Err(WorkerFailure::NoJsonObject);
            }
            trimmed
        }
    };

    match serde_json::from_str::<Value>(candidate) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(_) => Err(WorkerFailure::NoJsonObject),
        Err(_) => Err(WorkerFailure::DecodeError),
    }
}

/// Interpret a finished worker's output.
///
/// A non-zero exit wins over everything else; stdout is not inspected.
pub fn interpret(worker: &str, raw: &RawOutput, framing: OutputFraming) -> WorkerResult {
    if !raw.stderr.trim().is_empty() {
        tracing::debug!(worker, stderr = %raw.stderr.trim_end(), "worker stderr");
    }

    if !raw.success {
        let failure = WorkerFailure::NonZeroExit(raw.exit_code);
        tracing::warn!(worker, exit_code = ?raw.exit_code, "worker exited unsuccessfully");
        return WorkerResult::from_failure(&failure);
    }

    if raw.stdout.trim().is_empty() {
        tracing::warn!(worker, "worker produced no output");
        return WorkerResult::from_failure(&WorkerFailure::EmptyOutput);
    }

    match parse_payload(&raw.stdout, framing) {
        Ok(payload) => WorkerResult::ok(payload),
        Err(failure) => {
            let snippet: String = raw.stdout.chars().take(LOG_SNIPPET_CHARS).collect();
            tracing::debug!(worker, output = %snippet, "unparseable worker output");
            tracing::warn!(worker, error = %failure, "worker output rejected");
            WorkerResult::from_failure(&failure)
        }
    }
}
