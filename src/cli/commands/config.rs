//! Implementation of the `vigil config` command.

use anyhow::Result;
use serde::Serialize;

use crate::cli::output::{output, CommandOutput};
use crate::domain::models::Config;

const REDACTED: &str = "<redacted>";

/// The effective configuration, with the pipeline filled in and secrets hidden.
#[derive(Debug, Serialize)]
#[serde(transparent)]
pub struct ConfigOutput {
    config: Config,
}

impl ConfigOutput {
    pub fn new(config: &Config) -> Self {
        let mut config = config.clone();
        config.pipeline = Some(config.pipeline_definition());
        if config.synthesis.api_key.is_some() {
            config.synthesis.api_key = Some(REDACTED.to_string());
        }
        Self { config }
    }
}

impl CommandOutput for ConfigOutput {
    fn to_human(&self) -> String {
        serde_yaml::to_string(&self.config).unwrap_or_default()
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(&self.config).unwrap_or_default()
    }
}

pub fn execute(config: &Config, json_mode: bool) -> Result<()> {
    output(&ConfigOutput::new(config), json_mode);
    Ok(())
}
