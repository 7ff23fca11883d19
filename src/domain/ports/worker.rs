//! Worker port - interface for analysis task backends.

use async_trait::async_trait;

use crate::domain::models::{WorkerResult, WorkerSpec};

/// Trait for worker implementations.
///
/// An invocation never fails from the caller's point of view: launch errors,
/// bad exit codes and unparseable output are all folded into an `error`
/// [`WorkerResult`].
#[async_trait]
pub trait Worker: Send + Sync {
    /// Get the worker backend name.
    fn name(&self) -> &'static str;

    /// Run the task described by `spec` to completion.
    async fn invoke(&self, spec: &WorkerSpec) -> WorkerResult;
}
