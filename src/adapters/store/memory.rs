//! In-memory report store.

use async_trait::async_trait;
use tokio::sync::RwLock;

use crate::domain::models::PipelineRun;
use crate::domain::ports::{ReportSort, ReportStore};

/// Process-lifetime report store.
#[derive(Default)]
pub struct InMemoryReportStore {
    reports: RwLock<Vec<PipelineRun>>,
}

impl InMemoryReportStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ReportStore for InMemoryReportStore {
    async fn append(&self, run: PipelineRun) {
        self.reports.write().await.push(run);
    }

    async fn list(&self, sort: ReportSort) -> Vec<PipelineRun> {
        let mut reports = self.reports.read().await.clone();
        if sort == ReportSort::Priority {
            // stable: equal ranks keep arrival order
            reports.sort_by_key(PipelineRun::priority_rank);
        }
        reports
    }

    async fn clear(&self) -> usize {
        let mut reports = self.reports.write().await;
        let removed = reports.len();
        reports.clear();
        removed
    }
}
