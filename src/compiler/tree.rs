use crate::ast::{PathToken, RefPath, Required, Resolvable, ValidationRule};
use crate::definition::{NodeDefinition, NodeType};
use crate::error::ConfigurationError;
use ahash::AHashMap;
use serde_json::Value as Json;

/// Index of a node inside a [`CompiledConfig`](super::CompiledConfig).
pub type NodeId = usize;

/// A configuration node with its reference path and parsed attributes.
#[derive(Debug, Clone)]
pub struct ConfigNode {
    pub id: String,
    pub node_type: Option<NodeType>,
    /// `$.section.group.*.field`; repeatable nodes end in `*`.
    pub path: RefPath,
    pub parent: Option<NodeId>,
    pub children: Vec<NodeId>,
    /// The top-level section this node belongs to (itself for sections).
    pub section: NodeId,
    pub repeatable: bool,
    pub preconditions: Vec<Resolvable>,
    pub required: Option<Required>,
    pub validations: Vec<ValidationRule>,
    pub item_validations: Vec<ValidationRule>,
    pub data_mapping: Option<String>,
    /// Initial value for form renderers. Evaluation never writes it into data.
    pub default_value: Option<Json>,
}

impl ConfigNode {
    pub fn is_section(&self) -> bool {
        self.parent.is_none()
    }

    pub fn is_array_value(&self) -> bool {
        self.node_type == Some(NodeType::ArrayValue)
    }

    pub fn is_value(&self) -> bool {
        matches!(
            self.node_type,
            Some(NodeType::Value) | Some(NodeType::ArrayValue)
        )
    }

    pub fn has_preconditions(&self) -> bool {
        !self.preconditions.is_empty()
    }
}

/// Flattened section forest with a path lookup.
#[derive(Debug, Default)]
pub(super) struct NodeTree {
    pub(super) nodes: Vec<ConfigNode>,
    pub(super) index: AHashMap<RefPath, NodeId>,
    pub(super) sections: Vec<NodeId>,
}

impl NodeTree {
    pub(super) fn build(sections: &[NodeDefinition]) -> Result<Self, ConfigurationError> {
        let mut tree = NodeTree::default();
        for section in sections {
            tree.insert(section, None, &RefPath::default())?;
        }
        Ok(tree)
    }

    fn insert(
        &mut self,
        definition: &NodeDefinition,
        parent: Option<NodeId>,
        base: &RefPath,
    ) -> Result<(), ConfigurationError> {
        // Id-less nodes contribute no path segment; their children attach to the parent.
        let Some(id) = &definition.id else {
            for child in &definition.children {
                self.insert(child, parent, base)?;
            }
            return Ok(());
        };

        let mut path = base.child(PathToken::Key(id.clone()));
        if definition.is_repeatable() {
            path = path.with_trailing_wildcard();
        }
        if self.index.contains_key(&path) {
            return Err(ConfigurationError::DuplicateNodePath(path.to_string()));
        }

        let node_id = self.nodes.len();
        let section = parent.map_or(node_id, |p| self.nodes[p].section);
        let node_type = match (definition.node_type, parent) {
            (Some(node_type), _) => Some(node_type),
            (None, None) => Some(NodeType::Section),
            (None, Some(_)) => None,
        };

        self.nodes.push(ConfigNode {
            id: id.clone(),
            node_type,
            path: path.clone(),
            parent,
            children: Vec::new(),
            section,
            repeatable: definition.is_repeatable(),
            preconditions: parse_preconditions(definition.preconditions.as_ref()),
            required: definition
                .required
                .as_ref()
                .filter(|raw| !raw.is_null())
                .map(Required::parse),
            validations: definition.validations.iter().map(ValidationRule::parse).collect(),
            item_validations: definition
                .item_validations
                .iter()
                .map(ValidationRule::parse)
                .collect(),
            data_mapping: definition.data_mapping.clone(),
            default_value: definition.default_value.clone(),
        });
        self.index.insert(path.clone(), node_id);

        match parent {
            Some(p) => self.nodes[p].children.push(node_id),
            None => self.sections.push(node_id),
        }

        for child in &definition.children {
            self.insert(child, Some(node_id), &path)?;
        }
        Ok(())
    }
}

fn parse_preconditions(raw: Option<&Json>) -> Vec<Resolvable> {
    match raw {
        None | Some(Json::Null) => Vec::new(),
        Some(Json::Array(items)) => items.iter().map(Resolvable::parse).collect(),
        Some(single) => vec![Resolvable::parse(single)],
    }
}
