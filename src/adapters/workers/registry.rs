//! Worker registry.

use std::collections::HashMap;
use std::sync::Arc;

use crate::domain::ports::Worker;

use super::subprocess::{SubprocessConfig, SubprocessWorker};

/// Maps worker names to the backend that runs them.
///
/// Names without an override go to the default backend.
pub struct WorkerRegistry {
    default: Arc<dyn Worker>,
    overrides: HashMap<String, Arc<dyn Worker>>,
}

impl WorkerRegistry {
    pub fn new(default: Arc<dyn Worker>) -> Self {
        Self {
            default,
            overrides: HashMap::new(),
        }
    }

    /// Registry that launches every worker as a subprocess.
    pub fn subprocess(config: SubprocessConfig) -> Self {
        Self::new(Arc::new(SubprocessWorker::new(config)))
    }

    pub fn with_worker(mut self, name: impl Into<String>, worker: Arc<dyn Worker>) -> Self {
        self.register(name, worker);
        self
    }

    pub fn register(&mut self, name: impl Into<String>, worker: Arc<dyn Worker>) {
        self.overrides.insert(name.into(), worker);
    }

    pub fn resolve(&self, name: &str) -> Arc<dyn Worker> {
        self.overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| Arc::clone(&self.default))
    }
}

impl Default for WorkerRegistry {
    fn default() -> Self {
        Self::subprocess(SubprocessConfig::default())
    }
}
