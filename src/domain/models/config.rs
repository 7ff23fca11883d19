use serde::{Deserialize, Serialize};

use super::context::ContextSources;
use super::pipeline::PipelineDefinition;
use super::worker::OutputFraming;

/// Main configuration structure for vigil
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct Config {
    /// Maximum number of workers in flight at once (1-64)
    #[serde(default = "default_max_concurrency")]
    pub max_concurrency: usize,

    /// Per-worker deadline in seconds; 0 disables it
    #[serde(default = "default_worker_timeout_secs")]
    pub worker_timeout_secs: u64,

    /// How worker stdout is framed
    #[serde(default)]
    pub output_framing: OutputFraming,

    /// Directory worker programs are launched from (defaults to cwd)
    #[serde(default)]
    pub working_dir: Option<String>,

    /// Logging configuration
    #[serde(default)]
    pub logging: LoggingConfig,

    /// Reasoning service configuration
    #[serde(default)]
    pub synthesis: SynthesisConfig,

    /// Worker feeding each synthesis context field
    #[serde(default)]
    pub context: ContextSources,

    /// Workers and dependency edges; the standard pipeline when unset.
    ///
    /// A configured pipeline replaces the default one wholesale.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pipeline: Option<PipelineDefinition>,
}

impl Config {
    /// The effective pipeline definition.
    pub fn pipeline_definition(&self) -> PipelineDefinition {
        self.pipeline.clone().unwrap_or_else(PipelineDefinition::standard)
    }
}

const fn default_max_concurrency() -> usize {
    4
}

const fn default_worker_timeout_secs() -> u64 {
    300
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_concurrency: default_max_concurrency(),
            worker_timeout_secs: default_worker_timeout_secs(),
            output_framing: OutputFraming::default(),
            working_dir: None,
            logging: LoggingConfig::default(),
            synthesis: SynthesisConfig::default(),
            context: ContextSources::default(),
            pipeline: None,
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct LoggingConfig {
    /// Log level: trace, debug, info, warn, error
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Log format: json or pretty
    #[serde(default = "default_log_format")]
    pub format: String,

    /// Directory for rolling log files; stderr only when unset
    #[serde(default)]
    pub log_dir: Option<String>,

    /// File rotation: daily, hourly or never
    #[serde(default = "default_rotation")]
    pub rotation: String,
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_log_format() -> String {
    "json".to_string()
}

fn default_rotation() -> String {
    "daily".to_string()
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            format: default_log_format(),
            log_dir: None,
            rotation: default_rotation(),
        }
    }
}

/// Reasoning service (Anthropic Messages API) configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct SynthesisConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_api_version")]
    pub api_version: String,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,

    /// Sampling temperature; 0 keeps reports reproducible
    #[serde(default)]
    pub temperature: f64,

    /// Request timeout in seconds
    #[serde(default = "default_synthesis_timeout_secs")]
    pub timeout_secs: u64,

    /// API key; falls back to `ANTHROPIC_API_KEY` when unset
    #[serde(default)]
    pub api_key: Option<String>,
}

fn default_base_url() -> String {
    "https://api.anthropic.com".to_string()
}

fn default_model() -> String {
    "claude-3-5-sonnet-20241022".to_string()
}

fn default_api_version() -> String {
    "2023-06-01".to_string()
}

const fn default_max_tokens() -> u32 {
    4096
}

const fn default_synthesis_timeout_secs() -> u64 {
    120
}

impl Default for SynthesisConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            model: default_model(),
            api_version: default_api_version(),
            max_tokens: default_max_tokens(),
            temperature: 0.0,
            timeout_secs: default_synthesis_timeout_secs(),
            api_key: None,
        }
    }
}
