//! CLI type definitions
//!
//! This module contains clap command structures that define the CLI interface.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

use super::commands::analyze::AnalyzeArgs;
use super::commands::init::InitArgs;

#[derive(Parser, Debug)]
#[command(name = "vigil")]
#[command(about = "Vigil - concurrent image-analysis orchestrator", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Output in JSON format
    #[arg(short, long, global = true)]
    pub json: bool,

    /// Load configuration from this file instead of .vigil/
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Run the analysis pipeline over one or more images
    Analyze(AnalyzeArgs),

    /// Print the effective configuration
    Config,

    /// Create .vigil/config.yaml with the default configuration
    Init(InitArgs),
}
