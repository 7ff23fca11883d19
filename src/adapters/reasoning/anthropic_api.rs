//! Anthropic API reasoning client.
//!
//! Makes one non-streaming call to the Anthropic Messages API per synthesis.

use async_trait::async_trait;
use reqwest::{header, Client};
use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::domain::errors::SynthesisError;
use crate::domain::models::SynthesisConfig;
use crate::domain::ports::{ReasoningClient, ReasoningRequest};

/// Configuration for the Anthropic API client.
#[derive(Debug, Clone)]
pub struct AnthropicApiConfig {
    /// API key (will be read from ANTHROPIC_API_KEY env if not set).
    pub api_key: Option<String>,
    /// API base URL.
    pub base_url: String,
    pub model: String,
    /// API version header.
    pub api_version: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    pub max_tokens: u32,
}

impl Default for AnthropicApiConfig {
    fn default() -> Self {
        Self::from(&SynthesisConfig::default())
    }
}

impl From<&SynthesisConfig> for AnthropicApiConfig {
    fn from(config: &SynthesisConfig) -> Self {
        Self {
            api_key: config.api_key.clone(),
            base_url: config.base_url.trim_end_matches('/').to_string(),
            model: config.model.clone(),
            api_version: config.api_version.clone(),
            timeout_secs: config.timeout_secs,
            max_tokens: config.max_tokens,
        }
    }
}

impl AnthropicApiConfig {
    /// Get API key from config or environment.
    pub fn get_api_key(&self) -> Option<String> {
        let usable = |key: &String| !key.trim().is_empty();
        self.api_key
            .clone()
            .filter(usable)
            .or_else(|| std::env::var("ANTHROPIC_API_KEY").ok())
            .filter(usable)
    }

    pub fn with_api_key(mut self, key: impl Into<String>) -> Self {
        self.api_key = Some(key.into());
        self
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

/// Request to the Anthropic Messages API.
#[derive(Debug, Serialize)]
struct MessagesRequest<'a> {
    model: &'a str,
    max_tokens: u32,
    system: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type")]
enum ContentBlock {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(other)]
    Other,
}

/// Response from the Anthropic Messages API.
#[derive(Debug, Deserialize)]
struct MessagesResponse {
    #[serde(default)]
    content: Vec<ContentBlock>,
}

/// Reasoning client backed by the Anthropic Messages API.
pub struct AnthropicReasoningClient {
    config: AnthropicApiConfig,
    client: Client,
}

impl AnthropicReasoningClient {
    pub fn new(config: AnthropicApiConfig) -> Result<Self, SynthesisError> {
        let client = Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| SynthesisError::Request(format!("Failed to create HTTP client: {e}")))?;

        Ok(Self { config, client })
    }

    pub fn from_settings(settings: &SynthesisConfig) -> Result<Self, SynthesisError> {
        Self::new(AnthropicApiConfig::from(settings))
    }
}

#[async_trait]
impl ReasoningClient for AnthropicReasoningClient {
    fn name(&self) -> &'static str {
        "anthropic_api"
    }

    async fn complete(&self, request: ReasoningRequest) -> Result<String, SynthesisError> {
        let api_key = self.config.get_api_key().ok_or(SynthesisError::MissingApiKey)?;

        let body = MessagesRequest {
            model: &self.config.model,
            max_tokens: self.config.max_tokens,
            system: &request.system_prompt,
            messages: vec![Message {
                role: "user",
                content: &request.user_payload,
            }],
            temperature: request.temperature,
        };

        tracing::debug!(model = %self.config.model, "sending synthesis request");

        let response = self
            .client
            .post(format!("{}/v1/messages", self.config.base_url))
            .header(header::CONTENT_TYPE, "application/json")
            .header("x-api-key", &api_key)
            .header("anthropic-version", &self.config.api_version)
            .json(&body)
            .send()
            .await
            .map_err(|e| SynthesisError::Request(e.to_string()))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SynthesisError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let parsed: MessagesResponse = response
            .json()
            .await
            .map_err(|e| SynthesisError::Malformed(format!("Failed to parse response: {e}")))?;

        let text = parsed
            .content
            .into_iter()
            .filter_map(|block| match block {
                ContentBlock::Text { text } => Some(text),
                ContentBlock::Other => None,
            })
            .collect::<Vec<_>>()
            .join("\n");

        if text.trim().is_empty() {
            return Err(SynthesisError::EmptyResponse);
        }
        Ok(text)
    }
}
