//! Dependency planning for pipeline definitions.
//!
//! Validates a [`PipelineDefinition`] and groups its workers into waves: every
//! worker in a wave depends only on workers from earlier waves.

use std::collections::{BTreeMap, BTreeSet, HashSet};

use crate::domain::errors::{PipelineError, PipelineResult};
use crate::domain::models::{PipelineDefinition, SYNTHESIS_KEY};

/// Ordered execution waves for a validated pipeline.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DependencyPlan {
    waves: Vec<Vec<String>>,
}

fn detect_cycle_util<'a>(
    node: &'a str,
    graph: &BTreeMap<&'a str, Vec<&'a str>>,
    visited: &mut HashSet<&'a str>,
    rec_stack: &mut HashSet<&'a str>,
    path: &mut Vec<&'a str>,
) -> bool {
    visited.insert(node);
    rec_stack.insert(node);
    path.push(node);

    if let Some(neighbors) = graph.get(node) {
        for &neighbor in neighbors {
            if !visited.contains(neighbor) {
                if detect_cycle_util(neighbor, graph, visited, rec_stack, path) {
                    return true;
                }
            } else if rec_stack.contains(neighbor) {
                if let Some(cycle_start) = path.iter().position(|&n| n == neighbor) {
                    path.drain(0..cycle_start);
                    path.push(neighbor);
                    return true;
                }
            }
        }
    }

    rec_stack.remove(node);
    path.pop();
    false
}

/// Find a dependency cycle, returned as `a -> b -> a` style path.
fn detect_cycle(definition: &PipelineDefinition) -> Option<Vec<String>> {
    // provider -> consumers
    let mut graph: BTreeMap<&str, Vec<&str>> = BTreeMap::new();
    for edge in &definition.dependencies {
        graph
            .entry(edge.provider.as_str())
            .or_default()
            .push(edge.consumer.as_str());
    }

    let mut visited = HashSet::new();
    let mut rec_stack = HashSet::new();
    let mut path = Vec::new();

    for worker in &definition.workers {
        let name = worker.name.as_str();
        if !visited.contains(name)
            && detect_cycle_util(name, &graph, &mut visited, &mut rec_stack, &mut path)
        {
            return Some(path.into_iter().map(str::to_string).collect());
        }
    }
    None
}

impl DependencyPlan {
    /// Validate the definition and compute its waves.
    ///
    /// # Errors
    /// Rejects empty or duplicate names, use of the reserved synthesis key,
    /// edges naming undeclared workers, and dependency cycles.
    pub fn build(definition: &PipelineDefinition) -> PipelineResult<Self> {
        let mut names = BTreeSet::new();
        for worker in &definition.workers {
            if worker.name.trim().is_empty() {
                return Err(PipelineError::InvalidDefinition(
                    "worker name cannot be empty".to_string(),
                ));
            }
            if worker.program.trim().is_empty() {
                return Err(PipelineError::InvalidDefinition(format!(
                    "worker '{}' has no program",
                    worker.name
                )));
            }
            if worker.name == SYNTHESIS_KEY {
                return Err(PipelineError::ReservedName(worker.name.clone()));
            }
            if !names.insert(worker.name.as_str()) {
                return Err(PipelineError::DuplicateWorker(worker.name.clone()));
            }
        }

        for edge in &definition.dependencies {
            for endpoint in [&edge.consumer, &edge.provider] {
                if !names.contains(endpoint.as_str()) {
                    return Err(PipelineError::UnknownWorker(endpoint.clone()));
                }
            }
        }

        if let Some(cycle) = detect_cycle(definition) {
            return Err(PipelineError::DependencyCycle(cycle));
        }

        // Kahn layering; each wave keeps declaration order
        let mut in_degree: BTreeMap<&str, usize> = names.iter().map(|&n| (n, 0)).collect();
        for edge in &definition.dependencies {
            if let Some(degree) = in_degree.get_mut(edge.consumer.as_str()) {
                *degree += 1;
            }
        }

        let mut waves = Vec::new();
        let mut placed = 0;
        while placed < definition.workers.len() {
            let wave: Vec<String> = definition
                .workers
                .iter()
                .filter(|w| in_degree.get(w.name.as_str()) == Some(&0))
                .map(|w| w.name.clone())
                .collect();

            if wave.is_empty() {
                // cycles were rejected above
                return Err(PipelineError::InvalidDefinition(
                    "unable to order workers".to_string(),
                ));
            }

            for name in &wave {
                in_degree.remove(name.as_str());
                for edge in definition.dependencies.iter().filter(|e| &e.provider == name) {
                    if let Some(degree) = in_degree.get_mut(edge.consumer.as_str()) {
                        *degree -= 1;
                    }
                }
            }

            placed += wave.len();
            waves.push(wave);
        }

        Ok(Self { waves })
    }

    pub fn waves(&self) -> &[Vec<String>] {
        &self.waves
    }

    /// Every worker name, in wave order.
    pub fn worker_names(&self) -> impl Iterator<Item = &str> {
        self.waves.iter().flatten().map(String::as_str)
    }
}
