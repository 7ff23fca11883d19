//! Synthesis stage: turns the reduced context into an incident report.
//!
//! Every failure is folded into an error marker; synthesis never aborts a run.

use serde_json::Value;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;

use crate::domain::errors::SynthesisError;
use crate::domain::models::{IncidentReport, Payload, SynthesisContext, WorkerResult};
use crate::domain::ports::{ReasoningClient, ReasoningRequest};
use crate::services::output_parser::extract_json_object;

/// Message carried by the error marker stored under the synthesis key.
pub const FAILURE_MESSAGE: &str = "Failed to analyze incident";

/// Instruction sent with every synthesis request.
pub const SYSTEM_PROMPT: &str = r#"You are an objective incident analyst for a public-safety operations centre.
You receive one JSON object with the fields biometrics, objects, ocr, location and cctv, produced by automated image analysis. Any field may be empty or null; never invent evidence that is not present.

Respond with exactly one JSON object and nothing else, using this structure:
{
  "incident_id": "unique identifier string",
  "timestamp": "ISO 8601 timestamp",
  "classification": {
    "priority": "CRITICAL" | "HIGH" | "MEDIUM" | "LOW",
    "domain": "SECURITY" | "MUNICIPAL" | "CIVIL_DEFENSE",
    "type": "short incident type code"
  },
  "report": {
    "summary": "one-sentence tactical summary",
    "detailed_narrative": "formal paragraph describing the scene",
    "visual_evidence": ["each observed item"]
  },
  "action_plan": {
    "recommended_unit": "unit to dispatch",
    "nearest_cctv": "camera id from the cctv field, or null"
  }
}
You may add further fields, but the fields above are required."#;

/// Calls the reasoning service and validates its answer.
pub struct SynthesisService {
    client: Arc<dyn ReasoningClient>,
    temperature: f64,
}

impl SynthesisService {
    pub fn new(client: Arc<dyn ReasoningClient>, temperature: f64) -> Self {
        Self {
            client,
            temperature,
        }
    }

    /// Produce the synthesis result: `ok` with the report as payload, or the
    /// error marker with the cause in `details`.
    pub async fn synthesize(
        &self,
        context: &SynthesisContext,
        cancel: &CancellationToken,
    ) -> WorkerResult {
        let outcome = tokio::select! {
            biased;
            () = cancel.cancelled() => Err(SynthesisError::Cancelled),
            outcome = self.request_report(context) => outcome,
        };

        match outcome {
            Ok(report) => {
                tracing::info!(client = self.client.name(), "synthesis completed");
                WorkerResult::ok(report)
            }
            Err(e) => {
                tracing::error!(client = self.client.name(), error = %e, "synthesis failed");
                WorkerResult::error_with_details(FAILURE_MESSAGE, e.to_string())
            }
        }
    }

    async fn request_report(&self, context: &SynthesisContext) -> Result<Payload, SynthesisError> {
        let request = ReasoningRequest {
            system_prompt: SYSTEM_PROMPT.to_string(),
            user_payload: serde_json::to_string(context)?,
            temperature: self.temperature,
        };

        let text = self.client.complete(request).await?;
        parse_report(&text)
    }
}

/// Extract and validate an incident report from raw response text.
///
/// The whole object is kept as the payload so extra fields survive; the
/// typed schema is only used to check that required fields are present.
pub fn parse_report(text: &str) -> Result<Payload, SynthesisError> {
    let span = extract_json_object(text).ok_or(SynthesisError::NoJsonObject)?;
    let Value::Object(payload) = serde_json::from_str::<Value>(span)? else {
        return Err(SynthesisError::NoJsonObject);
    };

    serde_json::from_value::<IncidentReport>(Value::Object(payload.clone()))
        .map_err(|e| SynthesisError::Schema(e.to_string()))?;

    Ok(payload)
}
