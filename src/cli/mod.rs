//! Command-line interface.

pub mod commands;
pub mod output;
pub mod types;

use anyhow::Result;
use std::path::Path;

pub use types::{Cli, Commands};

use crate::domain::errors::PipelineError;
use crate::domain::models::{Config, LoggingConfig};
use crate::infrastructure::config::ConfigLoader;
use crate::infrastructure::logging::{LogConfig, LoggerImpl};

/// Load configuration from `path`, or from `.vigil/` and the environment.
pub fn load_config(path: Option<&Path>) -> Result<Config> {
    match path {
        Some(path) => ConfigLoader::load_from_file(path),
        None => ConfigLoader::load(),
    }
}

/// Install the global subscriber described by `logging`.
///
/// The returned logger must be kept alive for file output to be flushed.
pub fn init_logging(logging: &LoggingConfig) -> Result<LoggerImpl> {
    let log_config = LogConfig::try_from(logging)?;
    LoggerImpl::init(&log_config)
}

/// Report a command failure and exit with status 1.
///
/// A missing input image is reported on stdout as `{"error": "Image not found"}`
/// whatever the output mode, since stdout is where records are read from.
pub fn handle_error(err: anyhow::Error, json_mode: bool) -> ! {
    if let Some(PipelineError::InputNotFound(_)) = err.downcast_ref::<PipelineError>() {
        println!("{}", serde_json::json!({ "error": "Image not found" }));
    } else if json_mode {
        let body = serde_json::json!({ "error": format!("{err:#}") });
        println!("{}", serde_json::to_string_pretty(&body).unwrap_or_default());
    } else {
        eprintln!("Error: {err:#}");
    }
    std::process::exit(1);
}
