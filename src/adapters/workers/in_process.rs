//! In-process worker implementation.
//!
//! Wraps an async handler so analysis code linked into the binary can stand
//! in for an external program.

use async_trait::async_trait;
use futures::future::BoxFuture;
use std::sync::Arc;

use crate::domain::models::{Payload, WorkerResult, WorkerSpec};
use crate::domain::ports::Worker;

type Handler = dyn Fn(WorkerSpec) -> BoxFuture<'static, Result<Payload, String>> + Send + Sync;

/// Worker backed by an async closure.
///
/// `Ok(payload)` becomes an `ok` result; `Err(message)` becomes an `error`
/// result carrying the message.
#[derive(Clone)]
pub struct InProcessWorker {
    handler: Arc<Handler>,
}

impl InProcessWorker {
    pub fn new<F, Fut>(handler: F) -> Self
    where
        F: Fn(WorkerSpec) -> Fut + Send + Sync + 'static,
        Fut: std::future::Future<Output = Result<Payload, String>> + Send + 'static,
    {
        Self {
            handler: Arc::new(move |spec| Box::pin(handler(spec))),
        }
    }
}

impl std::fmt::Debug for InProcessWorker {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InProcessWorker").finish_non_exhaustive()
    }
}

#[async_trait]
impl Worker for InProcessWorker {
    fn name(&self) -> &'static str {
        "in_process"
    }

    async fn invoke(&self, spec: &WorkerSpec) -> WorkerResult {
        match (self.handler)(spec.clone()).await {
            Ok(payload) => WorkerResult::ok(payload),
            Err(message) => {
                tracing::warn!(worker = %spec.name, error = %message, "in-process worker failed");
                WorkerResult::error(message)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[tokio::test]
    async fn test_handler_receives_spec_args() {
        let worker = InProcessWorker::new(|spec: WorkerSpec| async move {
            let mut payload = Payload::new();
            payload.insert("seen".to_string(), json!(spec.args));
            Ok(payload)
        });

        let result = worker
            .invoke(&WorkerSpec::new("echo", "echo").with_args(["a", "b"]))
            .await;
        assert_eq!(result.payload().unwrap()["seen"], json!(["a", "b"]));
    }

    #[tokio::test]
    async fn test_handler_error_becomes_error_result() {
        let worker = InProcessWorker::new(|_| async { Err("model not loaded".to_string()) });
        let result = worker.invoke(&WorkerSpec::new("w", "w")).await;
        assert_eq!(result.message(), Some("model not loaded"));
    }
}
