//! Constraint resolution
//!
//! Turns the active stages' declarative before/after sets into one execution
//! order. Kahn's algorithm over the constraint graph, with a priority heap so
//! that stages with no relative constraint always resolve in registry
//! priority order. Constraints naming inactive stages impose no edge.

use crate::clean::error::ConfigError;
use crate::clean::registry::ActiveStage;
use std::cmp::Reverse;
use std::collections::{BTreeSet, BinaryHeap, HashMap};

/// Compute the execution order as indices into `stages`.
///
/// Fails with [`ConfigError::ConstraintCycle`] when the constraints admit no
/// ordering; the error names the stages still locked in the cycle.
pub fn resolve_order(stages: &[ActiveStage]) -> Result<Vec<usize>, ConfigError> {
    let index: HashMap<&str, usize> = stages
        .iter()
        .enumerate()
        .map(|(i, s)| (s.spec.name, i))
        .collect();

    let mut successors: Vec<BTreeSet<usize>> = vec![BTreeSet::new(); stages.len()];
    for (i, stage) in stages.iter().enumerate() {
        for name in &stage.before {
            if let Some(&j) = index.get(name.as_str()) {
                successors[i].insert(j);
            }
        }
        for name in &stage.after {
            if let Some(&j) = index.get(name.as_str()) {
                successors[j].insert(i);
            }
        }
    }

    let mut in_degree = vec![0usize; stages.len()];
    for succs in &successors {
        for &j in succs {
            in_degree[j] += 1;
        }
    }

    let mut ready: BinaryHeap<Reverse<(u32, usize)>> = stages
        .iter()
        .enumerate()
        .filter(|(i, _)| in_degree[*i] == 0)
        .map(|(i, s)| Reverse((s.spec.priority, i)))
        .collect();

    let mut order = Vec::with_capacity(stages.len());
    while let Some(Reverse((_, i))) = ready.pop() {
        order.push(i);
        for &j in &successors[i] {
            in_degree[j] -= 1;
            if in_degree[j] == 0 {
                ready.push(Reverse((stages[j].spec.priority, j)));
            }
        }
    }

    if order.len() < stages.len() {
        let mut blocked: Vec<(u32, String)> = stages
            .iter()
            .enumerate()
            .filter(|(i, _)| in_degree[*i] > 0)
            .map(|(_, s)| (s.spec.priority, s.spec.name.to_string()))
            .collect();
        blocked.sort();
        return Err(ConfigError::ConstraintCycle {
            stages: blocked.into_iter().map(|(_, name)| name).collect(),
        });
    }

    Ok(order)
}
