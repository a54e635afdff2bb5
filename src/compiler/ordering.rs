//! Evaluation orders derived once at compile time.

use super::{ConfigNode, Edge};
use crate::ast::RefPath;
use crate::definition::{END, EdgeDefinition, GraphNodeKind, START};
use crate::error::ConfigurationError;
use ahash::{AHashMap, AHashSet};
use petgraph::algo::toposort;
use petgraph::graph::{DiGraph, NodeIndex};
use std::hash::Hash;

fn vertex<T: Clone + Eq + Hash>(
    graph: &mut DiGraph<T, ()>,
    indices: &mut AHashMap<T, NodeIndex>,
    key: T,
) -> NodeIndex {
    *indices
        .entry(key.clone())
        .or_insert_with(|| graph.add_node(key))
}

/// Orders edges so that every edge into a node precedes the edges leaving it.
///
/// `END` is made to depend on `START` so the sentinels always sort in that order.
/// Edges leaving the same node keep their declaration order.
pub(super) fn edge_evaluation_order(
    edges: &[EdgeDefinition],
    kinds: &AHashMap<String, GraphNodeKind>,
) -> Result<Vec<Edge>, ConfigurationError> {
    let mut graph = DiGraph::<&str, ()>::new();
    let mut indices: AHashMap<&str, NodeIndex> = AHashMap::new();

    let start = vertex(&mut graph, &mut indices, START);
    let end = vertex(&mut graph, &mut indices, END);
    graph.add_edge(start, end, ());
    for edge in edges {
        let from = vertex(&mut graph, &mut indices, edge.from.as_str());
        let to = vertex(&mut graph, &mut indices, edge.to.as_str());
        graph.add_edge(from, to, ());
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        ConfigurationError::CycleDetected(graph[cycle.node_id()].to_string())
    })?;
    let rank: AHashMap<&str, usize> = sorted
        .iter()
        .enumerate()
        .map(|(position, index)| (graph[*index], position))
        .collect();

    let kind_of = |id: &str| {
        kinds
            .get(id)
            .copied()
            .unwrap_or(GraphNodeKind::Section)
    };
    let mut ordered: Vec<Edge> = edges
        .iter()
        .map(|edge| Edge {
            from: edge.from.clone(),
            to: edge.to.clone(),
            when_input_is: edge.when_input_is,
            from_kind: kind_of(&edge.from),
            to_kind: kind_of(&edge.to),
        })
        .collect();
    ordered.sort_by_key(|edge| rank.get(edge.from.as_str()).copied().unwrap_or(usize::MAX));
    Ok(ordered)
}

/// Orders preconditioned node paths so that every referenced path is pruned
/// before the paths that depend on it.
///
/// Relative (`^`) references are normalized to `*` and self references are ignored.
/// A reference also depends on every preconditioned ancestor of the path it names,
/// since pruning an ancestor removes the referenced value with it.
pub(super) fn precondition_order(nodes: &[ConfigNode]) -> Result<Vec<RefPath>, ConfigurationError> {
    let mut graph = DiGraph::<RefPath, ()>::new();
    let mut indices: AHashMap<RefPath, NodeIndex> = AHashMap::new();
    let preconditioned: AHashSet<&RefPath> = nodes
        .iter()
        .filter(|node| node.has_preconditions())
        .map(|node| &node.path)
        .collect();

    for node in nodes.iter().filter(|node| node.has_preconditions()) {
        let dependant = vertex(&mut graph, &mut indices, node.path.clone());
        for precondition in &node.preconditions {
            for reference in precondition.references() {
                let referenced = reference.normalize_relative();
                if referenced == node.path {
                    continue;
                }
                for ancestor in preconditioned_ancestors(&referenced, &preconditioned) {
                    if node.path.starts_with(&ancestor) {
                        continue;
                    }
                    let ancestor = vertex(&mut graph, &mut indices, ancestor);
                    graph.update_edge(ancestor, dependant, ());
                }
                let referenced = vertex(&mut graph, &mut indices, referenced);
                graph.update_edge(referenced, dependant, ());
            }
        }
    }

    let sorted = toposort(&graph, None).map_err(|cycle| {
        ConfigurationError::PreconditionCycle(graph[cycle.node_id()].to_string())
    })?;
    Ok(sorted.into_iter().map(|index| graph[index].clone()).collect())
}

/// Strict prefixes of `path` that are node paths carrying preconditions.
fn preconditioned_ancestors(path: &RefPath, preconditioned: &AHashSet<&RefPath>) -> Vec<RefPath> {
    (1..path.len())
        .map(|len| RefPath::new(path.tokens()[..len].to_vec()))
        .filter_map(|prefix| {
            if preconditioned.contains(&prefix) {
                return Some(prefix);
            }
            let repeatable = prefix.with_trailing_wildcard();
            preconditioned.contains(&repeatable).then_some(repeatable)
        })
        .collect()
}
