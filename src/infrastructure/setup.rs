//! Vigil setup and wiring
//!
//! Handles project initialization (config directory and default config file)
//! and builds a ready-to-run orchestrator from a loaded [`Config`].

use anyhow::{Context, Result};
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use crate::adapters::reasoning::AnthropicReasoningClient;
use crate::adapters::workers::{SubprocessConfig, WorkerRegistry};
use crate::domain::models::Config;
use crate::services::pipeline_orchestrator::{OrchestratorConfig, PipelineOrchestrator};

/// Default configuration template content
pub const DEFAULT_CONFIG_TEMPLATE: &str = r#"# Vigil Configuration
# Override settings by editing this file, adding .vigil/local.yaml, or setting
# environment variables with the VIGIL_ prefix
#
# Example environment variables:
#   export VIGIL_MAX_CONCURRENCY=8
#   export VIGIL_WORKER_TIMEOUT_SECS=120
#   export VIGIL_LOGGING__LEVEL=debug
#   export VIGIL_SYNTHESIS__MODEL=claude-3-5-sonnet-20241022

# Maximum workers in flight at once (1-64)
max_concurrency: 4

# Per-worker deadline in seconds (0 disables it)
worker_timeout_secs: 300

# Worker stdout framing: outermost (first '{' to last '}') or strict
output_framing: outermost

# Logging configuration
logging:
  # Log level: trace, debug, info, warn, error
  level: "info"

  # Log format: json, pretty
  format: "json"

  # Rotation for files under log_dir: daily, hourly, never
  rotation: "daily"

# Reasoning service (Anthropic Messages API)
# The API key is read from ANTHROPIC_API_KEY unless synthesis.api_key is set
synthesis:
  base_url: "https://api.anthropic.com"
  model: "claude-3-5-sonnet-20241022"
  max_tokens: 4096
  temperature: 0.0
  timeout_secs: 120

# Worker whose payload feeds each synthesis context field
context:
  biometrics: biometrics
  objects: object_detection
  ocr: ocr_environment
  location: gps
  cctv: cctv_retrieval

# Workers and dependency edges
# {input} is replaced with the absolute image path; {field} placeholders are
# filled from the provider fields an edge requires
pipeline:
  workers:
    - name: gps
      program: python3
      args: ["workers/gps/model.py", "{input}"]

    - name: biometrics
      program: python3
      args: ["workers/biometrics/main_biometrics.py", "--input", "{input}"]

    - name: object_detection
      program: python3
      args: ["workers/objects/main_objects.py", "{input}"]

    - name: ocr_environment
      program: python3
      args: ["workers/ocr/main_ocr.py", "{input}"]

    - name: cctv_retrieval
      program: python3
      args: ["workers/cctv/main_cctv_retrieval.py", "--lat", "{lat}", "--lng", "{lng}"]

  dependencies:
    - consumer: cctv_retrieval
      provider: gps
      required_fields: [lat, lng]
"#;

/// Setup paths and directories
pub struct SetupPaths {
    pub config_dir: PathBuf,
    pub config_file: PathBuf,
}

impl SetupPaths {
    /// Get setup paths for the current directory
    pub fn new() -> Result<Self> {
        let current_dir = std::env::current_dir().context("Failed to get current directory")?;
        Ok(Self::for_root(current_dir))
    }

    /// Setup paths rooted at `root`
    pub fn for_root(root: impl AsRef<Path>) -> Self {
        let config_dir = root.as_ref().join(".vigil");
        Self {
            config_file: config_dir.join("config.yaml"),
            config_dir,
        }
    }

    /// Check if vigil is already initialized
    pub fn is_initialized(&self) -> bool {
        self.config_file.exists()
    }
}

/// Create the configuration directory
pub fn create_config_dir(paths: &SetupPaths) -> Result<()> {
    fs::create_dir_all(&paths.config_dir).context("Failed to create config directory")
}

/// Create the default configuration file
///
/// Returns `false` when the file already exists and `force` is not set.
pub fn create_config_file(paths: &SetupPaths, force: bool) -> Result<bool> {
    if paths.config_file.exists() && !force {
        return Ok(false);
    }

    fs::write(&paths.config_file, DEFAULT_CONFIG_TEMPLATE).context("Failed to write config file")?;

    Ok(true)
}

/// Build the worker registry: every worker runs as a subprocess.
pub fn build_registry(config: &Config) -> WorkerRegistry {
    WorkerRegistry::subprocess(SubprocessConfig {
        working_dir: config.working_dir.as_ref().map(PathBuf::from),
        framing: config.output_framing,
        ..SubprocessConfig::default()
    })
}

/// Build an orchestrator backed by subprocess workers and the Anthropic API.
pub fn build_orchestrator(config: &Config) -> Result<PipelineOrchestrator> {
    let reasoner = AnthropicReasoningClient::from_settings(&config.synthesis)
        .context("Failed to build reasoning client")?;

    PipelineOrchestrator::new(
        config.pipeline_definition(),
        Arc::new(build_registry(config)),
        Arc::new(reasoner),
        OrchestratorConfig::from(config),
    )
    .context("Invalid pipeline definition")
}
