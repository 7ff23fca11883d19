//! Pipeline definition models
//!
//! A pipeline is a list of worker definitions plus dependency edges declared
//! as data. Workers without an incoming edge form the independent stage.

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::Path;

use super::worker::WorkerSpec;

/// Result-map key under which the synthesis outcome is stored.
pub const SYNTHESIS_KEY: &str = "reasoning";

/// Placeholder replaced with the absolute input path.
pub const INPUT_PLACEHOLDER: &str = "input";

/// A worker as declared in configuration.
///
/// `args` may contain `{input}` and `{<field>}` placeholders; field
/// placeholders are filled from the upstream fields a dependency edge
/// requires.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct WorkerDefinition {
    pub name: String,
    pub program: String,
    #[serde(default)]
    pub args: Vec<String>,
}

impl WorkerDefinition {
    pub fn new<I, S>(name: impl Into<String>, program: impl Into<String>, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            name: name.into(),
            program: program.into(),
            args: args.into_iter().map(Into::into).collect(),
        }
    }

    /// Build the spec for one run, substituting placeholders.
    pub fn render_spec(&self, input: &Path, fields: &BTreeMap<String, String>) -> WorkerSpec {
        let input = input.display().to_string();
        let args = self
            .args
            .iter()
            .map(|arg| {
                let mut rendered = arg.replace(&placeholder(INPUT_PLACEHOLDER), &input);
                for (key, value) in fields {
                    rendered = rendered.replace(&placeholder(key), value);
                }
                rendered
            })
            .collect::<Vec<_>>();

        WorkerSpec::new(&self.name, &self.program).with_args(args)
    }
}

fn placeholder(key: &str) -> String {
    format!("{{{key}}}")
}

/// Render an upstream field value as a command-line argument.
pub fn field_to_arg(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

/// `consumer` runs only if `provider` succeeded and its payload carries every
/// one of `required_fields`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct DependencyEdge {
    pub consumer: String,
    pub provider: String,
    pub required_fields: Vec<String>,
}

impl DependencyEdge {
    pub fn new<I, S>(consumer: impl Into<String>, provider: impl Into<String>, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            consumer: consumer.into(),
            provider: provider.into(),
            required_fields: fields.into_iter().map(Into::into).collect(),
        }
    }
}

/// The full set of workers and their dependency edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub struct PipelineDefinition {
    #[serde(default)]
    pub workers: Vec<WorkerDefinition>,
    #[serde(default)]
    pub dependencies: Vec<DependencyEdge>,
}

impl PipelineDefinition {
    pub fn new(workers: Vec<WorkerDefinition>, dependencies: Vec<DependencyEdge>) -> Self {
        Self {
            workers,
            dependencies,
        }
    }

    /// The stock five-worker pipeline: location, biometrics, objects and text
    /// run independently; camera lookup is gated on the location fix.
    pub fn standard() -> Self {
        let python = "python3";
        Self {
            workers: vec![
                WorkerDefinition::new("gps", python, ["workers/gps/model.py", "{input}"]),
                WorkerDefinition::new(
                    "biometrics",
                    python,
                    ["workers/biometrics/main_biometrics.py", "--input", "{input}"],
                ),
                WorkerDefinition::new(
                    "object_detection",
                    python,
                    ["workers/objects/main_objects.py", "{input}"],
                ),
                WorkerDefinition::new("ocr_environment", python, ["workers/ocr/main_ocr.py", "{input}"]),
                WorkerDefinition::new(
                    "cctv_retrieval",
                    python,
                    ["workers/cctv/main_cctv_retrieval.py", "--lat", "{lat}", "--lng", "{lng}"],
                ),
            ],
            dependencies: vec![DependencyEdge::new("cctv_retrieval", "gps", ["lat", "lng"])],
        }
    }

    pub fn worker(&self, name: &str) -> Option<&WorkerDefinition> {
        self.workers.iter().find(|w| w.name == name)
    }

    pub fn worker_names(&self) -> Vec<String> {
        self.workers.iter().map(|w| w.name.clone()).collect()
    }

    /// Edges whose consumer is `name`.
    pub fn edges_for<'a>(&'a self, name: &'a str) -> impl Iterator<Item = &'a DependencyEdge> + 'a {
        self.dependencies.iter().filter(move |e| e.consumer == name)
    }
}
