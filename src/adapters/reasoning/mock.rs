//! Mock reasoning client for testing.

use async_trait::async_trait;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::errors::SynthesisError;
use crate::domain::ports::{ReasoningClient, ReasoningRequest};

#[derive(Debug, Clone)]
enum Reply {
    Text(String),
    Unreachable(String),
}

/// Reasoning client returning a canned reply and recording each request.
pub struct MockReasoningClient {
    reply: Reply,
    requests: Arc<RwLock<Vec<ReasoningRequest>>>,
}

impl MockReasoningClient {
    /// Always answer with `text`.
    pub fn replying(text: impl Into<String>) -> Self {
        Self {
            reply: Reply::Text(text.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    /// Always answer with the JSON encoding of `value`.
    pub fn replying_json(value: &serde_json::Value) -> Self {
        Self::replying(value.to_string())
    }

    /// Always fail as if the service could not be reached.
    pub fn unreachable(reason: impl Into<String>) -> Self {
        Self {
            reply: Reply::Unreachable(reason.into()),
            requests: Arc::new(RwLock::new(Vec::new())),
        }
    }

    pub async fn requests(&self) -> Vec<ReasoningRequest> {
        self.requests.read().await.clone()
    }
}

#[async_trait]
impl ReasoningClient for MockReasoningClient {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn complete(&self, request: ReasoningRequest) -> Result<String, SynthesisError> {
        self.requests.write().await.push(request);
        match &self.reply {
            Reply::Text(text) => Ok(text.clone()),
            Reply::Unreachable(reason) => Err(SynthesisError::Request(reason.clone())),
        }
    }
}
