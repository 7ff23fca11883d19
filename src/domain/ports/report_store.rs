//! Report store port - keeps finished run records.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::models::PipelineRun;

/// Listing order for stored reports.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReportSort {
    /// Order of arrival
    #[default]
    Insertion,
    /// Most urgent first; ties keep arrival order
    Priority,
}

#[async_trait]
pub trait ReportStore: Send + Sync {
    async fn append(&self, run: PipelineRun);

    async fn list(&self, sort: ReportSort) -> Vec<PipelineRun>;

    /// Drop every stored report, returning how many were removed.
    async fn clear(&self) -> usize;
}
