//! Reasoning service adapter implementations.

pub mod anthropic_api;
pub mod mock;

pub use anthropic_api::{AnthropicApiConfig, AnthropicReasoningClient};
pub use mock::MockReasoningClient;
