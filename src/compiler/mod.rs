use crate::ast::{DataKey, DataPath, RefPath, Resolvable};
use crate::definition::{GraphNodeKind, WorkflowDefinition};
use crate::error::ConfigurationError;
use ahash::AHashMap;
use serde::Serialize;
use serde_json::{Map, Value as Json};
use tracing::debug;

mod graph;
mod ordering;
mod tree;

pub use tree::{ConfigNode, NodeId};

use tree::NodeTree;

/// A compiled decision: its output resolvable plus any extra attributes.
#[derive(Debug, Clone)]
pub struct Decision {
    pub id: String,
    pub output: Resolvable,
    pub attributes: Map<String, Json>,
}

/// A named value computed from the pruned data.
#[derive(Debug, Clone)]
pub struct DerivedValue {
    pub id: String,
    pub resolvable: Resolvable,
}

/// A graph edge annotated with the kinds of both endpoints.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Edge {
    pub from: String,
    pub to: String,
    pub when_input_is: Option<bool>,
    pub from_kind: GraphNodeKind,
    pub to_kind: GraphNodeKind,
}

/// Immutable, validated configuration ready for evaluation.
#[derive(Debug, Clone)]
pub struct CompiledConfig {
    nodes: Vec<ConfigNode>,
    sections: Vec<NodeId>,
    path_index: AHashMap<RefPath, NodeId>,
    decisions: Vec<Decision>,
    edges: Vec<Edge>,
    derived: Vec<DerivedValue>,
    kinds: AHashMap<String, GraphNodeKind>,
    precondition_order: Vec<RefPath>,
}

impl CompiledConfig {
    pub fn nodes(&self) -> &[ConfigNode] {
        &self.nodes
    }

    pub fn node(&self, id: NodeId) -> &ConfigNode {
        &self.nodes[id]
    }

    /// Top-level sections in declaration order.
    pub fn sections(&self) -> impl Iterator<Item = &ConfigNode> + '_ {
        self.sections.iter().map(|id| &self.nodes[*id])
    }

    pub fn section_ids(&self) -> &[NodeId] {
        &self.sections
    }

    pub fn section(&self, id: &str) -> Option<&ConfigNode> {
        self.sections().find(|section| section.id == id)
    }

    pub fn decisions(&self) -> &[Decision] {
        &self.decisions
    }

    pub fn decision(&self, id: &str) -> Option<&Decision> {
        self.decisions.iter().find(|decision| decision.id == id)
    }

    /// Edges in evaluation order.
    pub fn edges(&self) -> &[Edge] {
        &self.edges
    }

    pub fn derived(&self) -> &[DerivedValue] {
        &self.derived
    }

    /// Kind of a graph vertex, `None` for ids that are not in the graph.
    pub fn kind_of(&self, id: &str) -> Option<GraphNodeKind> {
        self.kinds.get(id).copied()
    }

    /// Preconditioned node paths, dependencies first.
    pub fn precondition_order(&self) -> &[RefPath] {
        &self.precondition_order
    }

    /// The node and all of its descendants, depth first.
    pub fn descendants(&self, id: NodeId) -> Vec<NodeId> {
        let mut found = Vec::new();
        let mut stack = vec![id];
        while let Some(next) = stack.pop() {
            found.push(next);
            stack.extend(self.nodes[next].children.iter().rev());
        }
        found
    }

    /// Exact lookup, falling back to the repeatable form (`path.*`).
    pub fn node_id_by_path(&self, path: &RefPath) -> Option<NodeId> {
        self.path_index
            .get(path)
            .or_else(|| self.path_index.get(&path.with_trailing_wildcard()))
            .copied()
    }

    pub fn get_config_node_by_path(&self, path: &RefPath) -> Option<&ConfigNode> {
        self.node_id_by_path(path).map(|id| &self.nodes[id])
    }

    pub fn node_id_for_data_path(&self, path: &DataPath) -> Option<NodeId> {
        self.node_id_by_path(&RefPath::from_data_path(path))
    }

    pub fn node_for_data_path(&self, path: &DataPath) -> Option<&ConfigNode> {
        self.node_id_for_data_path(path).map(|id| &self.nodes[id])
    }

    /// Concrete paths at which every value node could hold data, given the
    /// array lengths present in `data`.
    pub fn value_candidate_paths(&self, data: &Json) -> Vec<DataPath> {
        self.nodes
            .iter()
            .filter(|node| node.is_value())
            .flat_map(|node| node.path.expand(data))
            .collect()
    }

    /// Rewrites a data path using the `data_mapping` keys of the nodes along it.
    ///
    /// A mapped node replaces the pending segment with its mapping key; index
    /// keys are carried over and close the segment.
    pub fn mapped_path(&self, path: &DataPath) -> DataPath {
        let mut mapped: Vec<DataKey> = Vec::new();
        let mut segment: Vec<DataKey> = Vec::new();
        for (depth, key) in path.keys().iter().enumerate() {
            segment.push(key.clone());
            let is_index = matches!(key, DataKey::Index(_));
            let mapping = self
                .node_for_data_path(&path.prefix(depth + 1))
                .and_then(|node| node.data_mapping.as_ref());
            if let Some(mapping) = mapping {
                segment = vec![DataKey::Field(mapping.clone())];
                if is_index {
                    segment.push(key.clone());
                }
            }
            if is_index {
                mapped.append(&mut segment);
            }
        }
        mapped.append(&mut segment);
        DataPath::new(mapped)
    }
}

/// Turns a raw JSON configuration into a [`CompiledConfig`].
///
/// Compilation runs the shape checks, the graph checks, then derives the
/// node lookup and both evaluation orders. The first violation is returned.
pub struct Compiler<'a> {
    raw: &'a Json,
}

impl<'a> Compiler<'a> {
    pub fn new(raw: &'a Json) -> Self {
        Self { raw }
    }

    pub fn compile(&self) -> Result<CompiledConfig, ConfigurationError> {
        let definition = WorkflowDefinition::from_value(self.raw)?;
        let kinds = graph::validate(&definition)?;
        let tree = NodeTree::build(&definition.sections)?;
        let edges = ordering::edge_evaluation_order(&definition.edges, &kinds)?;
        let precondition_order = ordering::precondition_order(&tree.nodes)?;

        let decisions = definition
            .decisions
            .iter()
            .map(|decision| Decision {
                id: decision.id.clone(),
                output: Resolvable::parse(&decision.output),
                attributes: decision.attributes.clone(),
            })
            .collect();
        let derived = definition
            .derived
            .iter()
            .map(|derived| DerivedValue {
                id: derived.id.clone(),
                resolvable: Resolvable::parse(&derived.resolvable),
            })
            .collect();

        debug!(
            sections = tree.sections.len(),
            nodes = tree.nodes.len(),
            edges = edges.len(),
            preconditioned = precondition_order.len(),
            "compiled workflow configuration"
        );

        Ok(CompiledConfig {
            nodes: tree.nodes,
            sections: tree.sections,
            path_index: tree.index,
            decisions,
            edges,
            derived,
            kinds,
            precondition_order,
        })
    }
}

/// Shorthand for `Compiler::new(raw).compile()`.
pub fn compile(raw: &Json) -> Result<CompiledConfig, ConfigurationError> {
    Compiler::new(raw).compile()
}
