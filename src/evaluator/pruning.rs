//! Precondition checks, pruning and derived values.

use super::resolver::Resolver;
use crate::ast::{DataPath, Value};
use crate::compiler::{CompiledConfig, NodeId};
use crate::context::Context;
use serde_json::{Map, Value as Json};
use tracing::debug;

/// True when the preconditions of every node along `path` hold.
///
/// Prefixes are checked longest first; each distinct node is evaluated once,
/// against the deepest prefix that maps to it.
pub fn preconditions_met(
    config: &CompiledConfig,
    context: &Context,
    data: &Json,
    path: &DataPath,
) -> bool {
    let resolver = Resolver::new(data, context);
    let mut previous: Option<NodeId> = None;
    for depth in (1..=path.len()).rev() {
        let prefix = path.prefix(depth);
        let Some(node_id) = config.node_id_for_data_path(&prefix) else {
            continue;
        };
        if previous == Some(node_id) {
            continue;
        }
        previous = Some(node_id);
        let node = config.node(node_id);
        let met = node
            .preconditions
            .iter()
            .all(|precondition| resolver.resolve(precondition, Some(&prefix)).is_truthy());
        if !met {
            return false;
        }
    }
    true
}

/// Removes every value whose preconditions fail.
///
/// Nodes are visited in dependency order and each check sees the data as
/// pruned so far, so a value that depends on a pruned value is pruned too.
pub(crate) fn prune(mut data: Json, config: &CompiledConfig, context: &Context) -> Json {
    for reference in config.precondition_order() {
        for path in reference.data_paths(&data) {
            if !preconditions_met(config, context, &data, &path) {
                debug!(path = %path, "pruning value with unmet preconditions");
                path.remove(&mut data);
            }
        }
    }
    data
}

/// Resolves every derived entry. Results with no JSON form become `null`.
pub(crate) fn evaluate_derived(
    data: &Json,
    config: &CompiledConfig,
    context: &Context,
) -> Map<String, Json> {
    let resolver = Resolver::new(data, context);
    config
        .derived()
        .iter()
        .map(|derived| {
            let value: Value = resolver.resolve(&derived.resolvable, None);
            (derived.id.clone(), value.to_json())
        })
        .collect()
}
