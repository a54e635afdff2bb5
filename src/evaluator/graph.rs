use super::resolver::Resolver;
use crate::compiler::CompiledConfig;
use crate::context::Context;
use crate::definition::{GraphNodeKind, START, is_sentinel};
use crate::state::{EdgeState, EdgeStatus, SectionState};
use ahash::AHashMap;
use itertools::Itertools;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use tracing::trace;

/// Walks edges in evaluation order and marks each one active or inactive.
///
/// An edge can only be active when its source was entered through an earlier
/// active edge. The first invalid reachable section becomes the frontier: its
/// edge and every later section or decision edge are inactive.
pub(crate) fn evaluate_edge_states(
    data: &Json,
    config: &CompiledConfig,
    context: &Context,
    section_states: &BTreeMap<String, SectionState>,
) -> Vec<EdgeState> {
    let resolver = Resolver::new(data, context);
    let mut decision_outputs: AHashMap<&str, bool> = AHashMap::new();
    let mut frontier_found = false;
    let mut states: Vec<EdgeState> = Vec::with_capacity(config.edges().len());

    for edge in config.edges() {
        let reachable = edge.from == START
            || edge.to == START
            || states
                .iter()
                .any(|state| state.is_active() && state.to == edge.from);

        let active = reachable
            && match edge.from_kind {
                GraphNodeKind::Start => true,
                GraphNodeKind::End => false,
                GraphNodeKind::Section if frontier_found => false,
                GraphNodeKind::Section => {
                    let valid = section_states
                        .get(&edge.from)
                        .is_some_and(SectionState::is_valid);
                    if !valid {
                        trace!(section = %edge.from, "frontier reached");
                        frontier_found = true;
                    }
                    valid
                }
                GraphNodeKind::Decision if frontier_found => false,
                GraphNodeKind::Decision => {
                    let output = *decision_outputs.entry(edge.from.as_str()).or_insert_with(|| {
                        config
                            .decision(&edge.from)
                            .is_some_and(|decision| resolver.resolve(&decision.output, None).is_truthy())
                    });
                    edge.when_input_is == Some(output)
                }
            };

        let status = if active {
            EdgeStatus::Active
        } else {
            EdgeStatus::Inactive
        };
        states.push(EdgeState::new(edge, status));
    }
    states
}

/// Ids passed through along active edges, excluding the sentinels.
pub(crate) fn current_pathway(edge_states: &[EdgeState]) -> Vec<String> {
    edge_states
        .iter()
        .filter(|edge| edge.is_active() && edge.to != START)
        .map(|edge| &edge.from)
        .filter(|from| !is_sentinel(from))
        .unique()
        .cloned()
        .collect()
}
