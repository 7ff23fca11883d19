//! Subprocess worker implementation.
//!
//! Spawns one external program per invocation and interprets its stdout.

use async_trait::async_trait;
use std::collections::HashMap;
use std::path::PathBuf;
use std::process::Stdio;
use tokio::process::Command;

use crate::domain::errors::WorkerFailure;
use crate::domain::models::{OutputFraming, WorkerResult, WorkerSpec};
use crate::domain::ports::Worker;
use crate::services::output_parser::{self, RawOutput};

/// Subprocess worker configuration.
#[derive(Debug, Clone, Default)]
pub struct SubprocessConfig {
    /// Directory programs are launched from; inherits the cwd when unset
    pub working_dir: Option<PathBuf>,
    /// Extra environment passed to every worker
    pub env_vars: HashMap<String, String>,
    /// How stdout is framed
    pub framing: OutputFraming,
}

/// Runs each worker as a child process.
///
/// The child is killed if the invocation future is dropped, which is how
/// timeouts and cancellation reach the process.
pub struct SubprocessWorker {
    config: SubprocessConfig,
}

impl SubprocessWorker {
    pub fn new(config: SubprocessConfig) -> Self {
        Self { config }
    }

    fn command(&self, spec: &WorkerSpec) -> Command {
        let mut cmd = Command::new(&spec.executable);
        cmd.args(&spec.args)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(ref dir) = self.config.working_dir {
            cmd.current_dir(dir);
        }

        for (key, value) in &self.config.env_vars {
            cmd.env(key, value);
        }

        cmd.env("VIGIL_WORKER_NAME", &spec.name);
        cmd
    }
}

impl Default for SubprocessWorker {
    fn default() -> Self {
        Self::new(SubprocessConfig::default())
    }
}

#[async_trait]
impl Worker for SubprocessWorker {
    fn name(&self) -> &'static str {
        "subprocess"
    }

    async fn invoke(&self, spec: &WorkerSpec) -> WorkerResult {
        tracing::debug!(
            worker = %spec.name,
            program = %spec.executable,
            args = ?spec.args,
            "launching worker process"
        );

        let output = match self.command(spec).output().await {
            Ok(output) => output,
            Err(e) => {
                tracing::warn!(worker = %spec.name, error = %e, "failed to launch worker");
                return WorkerResult::from_failure(&WorkerFailure::LaunchFailed(e.to_string()));
            }
        };

        let raw = RawOutput {
            success: output.status.success(),
            exit_code: output.status.code(),
            stdout: String::from_utf8_lossy(&output.stdout).into_owned(),
            stderr: String::from_utf8_lossy(&output.stderr).into_owned(),
        };

        output_parser::interpret(&spec.name, &raw, self.config.framing)
    }
}
