use anyhow::{Context, Result};
use figment::providers::{Env, Format, Serialized, Yaml};
use figment::Figment;
use std::path::Path;
use thiserror::Error;

use crate::domain::errors::PipelineError;
use crate::domain::models::config::Config;
use crate::services::dependency_plan::DependencyPlan;

/// Upper bound for `max_concurrency`.
pub const MAX_CONCURRENCY_LIMIT: usize = 64;

/// Configuration error types
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid max_concurrency: {0}. Must be between 1 and {MAX_CONCURRENCY_LIMIT}")]
    InvalidMaxConcurrency(usize),

    #[error("Invalid log level: {0}. Must be one of: trace, debug, info, warn, error")]
    InvalidLogLevel(String),

    #[error("Invalid log format: {0}. Must be one of: json, pretty")]
    InvalidLogFormat(String),

    #[error("Invalid log rotation: {0}. Must be one of: daily, hourly, never")]
    InvalidRotation(String),

    #[error("Invalid temperature: {0}. Must be between 0.0 and 1.0")]
    InvalidTemperature(f64),

    #[error("Invalid max_tokens: {0}. Must be at least 1")]
    InvalidMaxTokens(u32),

    #[error("Invalid pipeline: {0}")]
    InvalidPipeline(#[from] PipelineError),

    #[error("Configuration validation failed: {0}")]
    ValidationFailed(String),
}

/// Configuration loader with hierarchical merging
pub struct ConfigLoader;

impl ConfigLoader {
    /// Load configuration with hierarchical merging
    ///
    /// Precedence (lowest to highest):
    /// 1. Programmatic defaults (Serialized)
    /// 2. .vigil/config.yaml (project config)
    /// 3. .vigil/local.yaml (project local overrides, optional)
    /// 4. Environment variables (VIGIL_* prefix, highest priority)
    pub fn load() -> Result<Config> {
        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(".vigil/config.yaml"))
            .merge(Yaml::file(".vigil/local.yaml"))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .context("Failed to extract configuration from figment")?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Load configuration from a specific file, still honouring `VIGIL_*`
    /// environment overrides.
    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Config> {
        let path = path.as_ref();
        if !path.is_file() {
            anyhow::bail!("Config file not found: {}", path.display());
        }

        let config: Config = Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(Yaml::file(path))
            .merge(Env::prefixed("VIGIL_").split("__"))
            .extract()
            .with_context(|| format!("Failed to load config from {}", path.display()))?;

        Self::validate(&config)?;
        Ok(config)
    }

    /// Validate configuration after loading
    pub fn validate(config: &Config) -> Result<(), ConfigError> {
        if config.max_concurrency == 0 || config.max_concurrency > MAX_CONCURRENCY_LIMIT {
            return Err(ConfigError::InvalidMaxConcurrency(config.max_concurrency));
        }

        let valid_log_levels = ["trace", "debug", "info", "warn", "error"];
        if !valid_log_levels.contains(&config.logging.level.to_lowercase().as_str()) {
            return Err(ConfigError::InvalidLogLevel(config.logging.level.clone()));
        }

        let valid_log_formats = ["json", "pretty"];
        if !valid_log_formats.contains(&config.logging.format.as_str()) {
            return Err(ConfigError::InvalidLogFormat(config.logging.format.clone()));
        }

        let valid_rotations = ["daily", "hourly", "never"];
        if !valid_rotations.contains(&config.logging.rotation.as_str()) {
            return Err(ConfigError::InvalidRotation(config.logging.rotation.clone()));
        }

        let synthesis = &config.synthesis;
        if !(0.0..=1.0).contains(&synthesis.temperature) {
            return Err(ConfigError::InvalidTemperature(synthesis.temperature));
        }

        if synthesis.max_tokens == 0 {
            return Err(ConfigError::InvalidMaxTokens(synthesis.max_tokens));
        }

        if synthesis.base_url.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "synthesis.base_url cannot be empty".to_string(),
            ));
        }

        if synthesis.model.trim().is_empty() {
            return Err(ConfigError::ValidationFailed(
                "synthesis.model cannot be empty".to_string(),
            ));
        }

        DependencyPlan::build(&config.pipeline_definition())?;

        Ok(())
    }
}
