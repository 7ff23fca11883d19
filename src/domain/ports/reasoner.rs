//! Reasoning port - interface for the synthesis backend.

use async_trait::async_trait;

use crate::domain::errors::SynthesisError;

/// One synthesis request: a fixed instruction plus the serialized context.
#[derive(Debug, Clone, PartialEq)]
pub struct ReasoningRequest {
    pub system_prompt: String,
    pub user_payload: String,
    pub temperature: f64,
}

#[async_trait]
pub trait ReasoningClient: Send + Sync {
    fn name(&self) -> &'static str;

    /// Send the request and return the raw text of the answer.
    async fn complete(&self, request: ReasoningRequest) -> Result<String, SynthesisError>;
}
