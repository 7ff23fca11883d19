//! Mock worker for testing.

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;

use crate::domain::models::{OutputFraming, WorkerResult, WorkerSpec};
use crate::domain::ports::Worker;
use crate::services::output_parser::{self, RawOutput};

/// Mock response configuration.
#[derive(Debug, Clone)]
pub struct MockResponse {
    /// Simulated exit code
    pub exit_code: i32,
    /// Simulated stdout
    pub stdout: String,
    /// How long the invocation takes
    pub delay: Duration,
    /// Simulate a crash inside the worker task
    pub panics: bool,
}

impl Default for MockResponse {
    fn default() -> Self {
        Self {
            exit_code: 0,
            stdout: "{}".to_string(),
            delay: Duration::ZERO,
            panics: false,
        }
    }
}

impl MockResponse {
    pub fn success(stdout: impl Into<String>) -> Self {
        Self {
            stdout: stdout.into(),
            ..Default::default()
        }
    }

    pub fn json(value: &serde_json::Value) -> Self {
        Self::success(value.to_string())
    }

    pub fn failure(exit_code: i32) -> Self {
        Self {
            exit_code,
            stdout: String::new(),
            ..Default::default()
        }
    }

    pub fn empty() -> Self {
        Self::success("")
    }

    pub fn panicking() -> Self {
        Self {
            panics: true,
            ..Default::default()
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }
}

struct InFlightGuard<'a>(&'a AtomicUsize);

impl Drop for InFlightGuard<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Scriptable worker that records every invocation.
///
/// Responses are looked up by worker name, falling back to the default. The
/// mock also tracks the highest number of concurrent invocations it saw.
pub struct MockWorker {
    default_response: MockResponse,
    response_overrides: Arc<RwLock<HashMap<String, MockResponse>>>,
    invocations: Arc<RwLock<Vec<WorkerSpec>>>,
    in_flight: AtomicUsize,
    max_in_flight: AtomicUsize,
    framing: OutputFraming,
}

impl MockWorker {
    pub fn new() -> Self {
        Self::with_default_response(MockResponse::default())
    }

    pub fn with_default_response(response: MockResponse) -> Self {
        Self {
            default_response: response,
            response_overrides: Arc::new(RwLock::new(HashMap::new())),
            invocations: Arc::new(RwLock::new(Vec::new())),
            in_flight: AtomicUsize::new(0),
            max_in_flight: AtomicUsize::new(0),
            framing: OutputFraming::default(),
        }
    }

    pub fn with_framing(mut self, framing: OutputFraming) -> Self {
        self.framing = framing;
        self
    }

    /// Set a specific response for a worker name.
    pub async fn set_response(&self, name: impl Into<String>, response: MockResponse) {
        let mut overrides = self.response_overrides.write().await;
        overrides.insert(name.into(), response);
    }

    async fn get_response(&self, name: &str) -> MockResponse {
        let overrides = self.response_overrides.read().await;
        overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.default_response.clone())
    }

    /// Every spec this mock was invoked with, in call order.
    pub async fn invocations(&self) -> Vec<WorkerSpec> {
        self.invocations.read().await.clone()
    }

    pub async fn invocation_count(&self, name: &str) -> usize {
        self.invocations
            .read()
            .await
            .iter()
            .filter(|spec| spec.name == name)
            .count()
    }

    /// Highest number of simultaneous invocations observed.
    pub fn max_in_flight(&self) -> usize {
        self.max_in_flight.load(Ordering::SeqCst)
    }
}

impl Default for MockWorker {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl Worker for MockWorker {
    fn name(&self) -> &'static str {
        "mock"
    }

    async fn invoke(&self, spec: &WorkerSpec) -> WorkerResult {
        self.invocations.write().await.push(spec.clone());

        let current = self.in_flight.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_in_flight.fetch_max(current, Ordering::SeqCst);
        let _guard = InFlightGuard(&self.in_flight);

        let response = self.get_response(&spec.name).await;
        if !response.delay.is_zero() {
            tokio::time::sleep(response.delay).await;
        }

        if response.panics {
            panic!("mock worker '{}' crashed", spec.name);
        }

        let raw = RawOutput {
            success: response.exit_code == 0,
            exit_code: Some(response.exit_code),
            stdout: response.stdout,
            stderr: String::new(),
        };
        output_parser::interpret(&spec.name, &raw, self.framing)
    }
}
