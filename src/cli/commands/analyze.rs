//! Implementation of the `vigil analyze` command.

use anyhow::{Context, Result};
use clap::{Args, ValueEnum};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use crate::adapters::store::InMemoryReportStore;
use crate::domain::errors::PipelineError;
use crate::domain::models::{Config, PipelineRun};
use crate::domain::ports::{ReportSort, ReportStore};
use crate::infrastructure::setup::build_orchestrator;
use crate::services::PipelineOrchestrator;

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Images to analyze, processed one after another
    #[arg(required = true, value_name = "IMAGE")]
    pub images: Vec<PathBuf>,

    /// Order of records when several images are analyzed
    #[arg(long, value_enum, default_value_t = SortOrder::Insertion)]
    pub sort: SortOrder,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum SortOrder {
    /// Order the images were given in
    Insertion,
    /// Most urgent incident first
    Priority,
}

impl From<SortOrder> for ReportSort {
    fn from(order: SortOrder) -> Self {
        match order {
            SortOrder::Insertion => Self::Insertion,
            SortOrder::Priority => Self::Priority,
        }
    }
}

/// Records are printed as indented JSON, or as a single compact line with
/// `--json`.
///
/// If a later image fails, the records already stored are printed before the
/// error is returned.
pub async fn execute(args: AnalyzeArgs, config: &Config, json_mode: bool) -> Result<()> {
    // Every path is checked before the first run starts.
    if let Some(missing) = args.images.iter().find(|image| !image.is_file()) {
        return Err(PipelineError::InputNotFound(missing.clone()).into());
    }

    let orchestrator = build_orchestrator(config)?;
    let store = InMemoryReportStore::new();

    let cancel = CancellationToken::new();
    let _ctrl_c = spawn_ctrl_c_handler(cancel.clone());

    let outcome = analyze_images(&orchestrator, &args.images, &store, &cancel).await;

    let records = store.list(args.sort.into()).await;
    if outcome.is_ok() || !records.is_empty() {
        let single = args.images.len() == 1;
        println!("{}", render_records(&records, single, json_mode)?);
    }
    outcome
}

async fn analyze_images(
    orchestrator: &PipelineOrchestrator,
    images: &[PathBuf],
    store: &dyn ReportStore,
    cancel: &CancellationToken,
) -> Result<()> {
    for (index, image) in images.iter().enumerate() {
        let run = match orchestrator.run_with_cancel(image, cancel).await {
            Ok(run) => run,
            Err(err) => {
                tracing::error!(
                    image = %image.display(),
                    completed = index,
                    error = %err,
                    "analysis aborted"
                );
                return Err(err.into());
            }
        };
        tracing::info!(
            pipeline_id = %run.pipeline_id(),
            system_status = ?run.system_status(),
            "record stored"
        );
        store.append(run).await;

        if cancel.is_cancelled() {
            tracing::warn!("analysis interrupted; remaining images not processed");
            break;
        }
    }
    Ok(())
}

fn render_records(records: &[PipelineRun], single: bool, json_mode: bool) -> Result<String> {
    let value = match records {
        [record] if single => serde_json::to_value(record),
        _ => serde_json::to_value(records),
    }
    .context("Failed to serialize pipeline records")?;

    let rendered = if json_mode {
        serde_json::to_string(&value)
    } else {
        serde_json::to_string_pretty(&value)
    };
    rendered.context("Failed to serialize pipeline records")
}

/// Cancel `token` on the first Ctrl-C. Aborted when the guard drops.
fn spawn_ctrl_c_handler(token: CancellationToken) -> AbortOnDrop {
    AbortOnDrop(tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling run");
            token.cancel();
        }
    }))
}

struct AbortOnDrop(tokio::task::JoinHandle<()>);

impl Drop for AbortOnDrop {
    fn drop(&mut self) {
        self.0.abort();
    }
}
