//! Implementation of the `vigil init` command.

use anyhow::{Context, Result};
use clap::Args;
use std::path::PathBuf;

use crate::cli::output::{output, CommandOutput};
use crate::infrastructure::setup::{self, SetupPaths};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Overwrite an existing configuration file
    #[arg(long, short)]
    pub force: bool,

    /// Target directory (defaults to current directory)
    #[arg(default_value = ".")]
    pub path: PathBuf,
}

#[derive(Debug, serde::Serialize)]
pub struct InitOutput {
    pub success: bool,
    pub message: String,
    pub config_file: PathBuf,
}

impl CommandOutput for InitOutput {
    fn to_human(&self) -> String {
        if self.success {
            format!("{}\n\nConfiguration written to {}", self.message, self.config_file.display())
        } else {
            self.message.clone()
        }
    }

    fn to_json(&self) -> serde_json::Value {
        serde_json::to_value(self).unwrap_or_default()
    }
}

pub async fn execute(args: InitArgs, json_mode: bool) -> Result<()> {
    let target_path = if args.path.is_absolute() {
        args.path.clone()
    } else {
        std::env::current_dir()
            .context("Failed to get current directory")?
            .join(&args.path)
    };

    let paths = SetupPaths::for_root(&target_path);
    let output_data = initialize(&paths, args.force)?;
    output(&output_data, json_mode);
    Ok(())
}

fn initialize(paths: &SetupPaths, force: bool) -> Result<InitOutput> {
    setup::create_config_dir(paths)?;
    let written = setup::create_config_file(paths, force)?;

    let message = if written {
        tracing::info!(path = %paths.config_file.display(), "configuration initialized");
        "Vigil initialized successfully.".to_string()
    } else {
        "Project already initialized. Use --force to reinitialize.".to_string()
    };

    Ok(InitOutput {
        success: written,
        message,
        config_file: paths.config_file.clone(),
    })
}
