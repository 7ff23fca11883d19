//! Dependent-stage gating.
//!
//! Decides whether a worker with incoming dependency edges may run, and if so
//! renders its spec with the upstream field values.

use std::collections::BTreeMap;
use std::path::Path;

use crate::domain::models::pipeline::field_to_arg;
use crate::domain::models::{DependencyEdge, ResultMap, WorkerDefinition, WorkerSpec};

/// Outcome of evaluating a worker's prerequisites.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GateDecision {
    /// All prerequisites satisfied; invoke this spec
    Run(WorkerSpec),
    /// A prerequisite is missing; record `skipped` with this message
    Skip(String),
}

/// Evaluate `worker` against the results recorded so far.
///
/// Each required field is exposed to the argument template twice: as
/// `{field}` and as `{provider.field}`.
pub fn evaluate<'a, I>(
    worker: &WorkerDefinition,
    edges: I,
    results: &ResultMap,
    input: &Path,
) -> GateDecision
where
    I: IntoIterator<Item = &'a DependencyEdge>,
{
    let mut fields = BTreeMap::new();

    for edge in edges {
        let upstream = match results.get(&edge.provider) {
            Some(result) if result.is_ok() => result,
            Some(result) => {
                return GateDecision::Skip(format!(
                    "Missing prerequisite: {} did not succeed ({})",
                    edge.provider,
                    result.status()
                ));
            }
            None => {
                return GateDecision::Skip(format!(
                    "Missing prerequisite: {} has no result",
                    edge.provider
                ));
            }
        };

        for field in &edge.required_fields {
            let Some(value) = upstream.field(field) else {
                return GateDecision::Skip(format!(
                    "Missing prerequisite: {}.{} is absent",
                    edge.provider, field
                ));
            };
            let arg = field_to_arg(value);
            fields.insert(format!("{}.{}", edge.provider, field), arg.clone());
            fields.insert(field.clone(), arg);
        }
    }

    GateDecision::Run(worker.render_spec(input, &fields))
}
