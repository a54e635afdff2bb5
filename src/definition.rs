//! Raw configuration model.
//!
//! These structs mirror the JSON a caller supplies. They are read once by the
//! compiler, checked, and turned into a [`CompiledConfig`](crate::compiler::CompiledConfig).

use crate::error::ConfigurationError;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::{Map, Value as Json};

/// Reserved id of the graph entry point.
pub const START: &str = "START";
/// Reserved id of the graph exit point.
pub const END: &str = "END";

pub fn is_sentinel(id: &str) -> bool {
    id == START || id == END
}

/// Kind of a node in the configuration tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NodeType {
    Section,
    Group,
    ArrayGroup,
    Value,
    ArrayValue,
}

/// Kind of a vertex in the section graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum GraphNodeKind {
    Start,
    End,
    Section,
    Decision,
}

/// One node of the section tree as written in the configuration.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct NodeDefinition {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "type")]
    pub node_type: Option<NodeType>,
    #[serde(default)]
    pub is_array: bool,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub children: Vec<NodeDefinition>,
    #[serde(default)]
    pub preconditions: Option<Json>,
    #[serde(default)]
    pub required: Option<Json>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub validations: Vec<Json>,
    #[serde(default, deserialize_with = "null_as_empty")]
    pub item_validations: Vec<Json>,
    #[serde(default)]
    pub data_mapping: Option<String>,
    #[serde(default)]
    pub default_value: Option<Json>,
}

impl NodeDefinition {
    /// Repeatable nodes hold an array of child records.
    pub fn is_repeatable(&self) -> bool {
        self.node_type == Some(NodeType::ArrayGroup)
            || (self.node_type == Some(NodeType::Group) && self.is_array)
    }
}

/// Reads an explicit `null` list as an empty one.
fn null_as_empty<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    Ok(Option::<Vec<T>>::deserialize(deserializer)?.unwrap_or_default())
}

/// A branching point whose truthy/falsy output selects an outgoing edge.
#[derive(Debug, Clone, Deserialize)]
pub struct DecisionDefinition {
    pub id: String,
    pub output: Json,
    #[serde(flatten)]
    pub attributes: Map<String, Json>,
}

/// A directed edge between graph nodes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct EdgeDefinition {
    pub from: String,
    pub to: String,
    #[serde(default)]
    pub when_input_is: Option<bool>,
}

impl EdgeDefinition {
    pub fn new(from: &str, to: &str) -> Self {
        Self {
            from: from.to_string(),
            to: to.to_string(),
            when_input_is: None,
        }
    }
}

/// A computed value exposed alongside the workflow state.
#[derive(Debug, Clone)]
pub struct DerivedDefinition {
    pub id: String,
    pub resolvable: Json,
}

impl DerivedDefinition {
    fn from_value(raw: &Json) -> Result<Self, ConfigurationError> {
        let id = raw
            .get("id")
            .and_then(Json::as_str)
            .ok_or_else(|| ConfigurationError::MalformedDefinition {
                collection: "derived",
                message: "derived entry is missing a string `id`".to_string(),
            })?;
        let resolvable = raw.get("resolvable").cloned().unwrap_or_else(|| raw.clone());
        Ok(Self {
            id: id.to_string(),
            resolvable,
        })
    }
}

/// The full workflow configuration after shape checks.
#[derive(Debug, Clone, Default)]
pub struct WorkflowDefinition {
    pub sections: Vec<NodeDefinition>,
    pub decisions: Vec<DecisionDefinition>,
    pub edges: Vec<EdgeDefinition>,
    pub derived: Vec<DerivedDefinition>,
}

impl WorkflowDefinition {
    /// Checks the top-level shape and deserializes each collection.
    ///
    /// A configuration with no decisions and no (or empty) edges is given an implicit
    /// linear flow: `START`, every top-level section in order, then `END`.
    pub fn from_value(raw: &Json) -> Result<Self, ConfigurationError> {
        let root = match raw {
            Json::Null => return Err(ConfigurationError::ConfigUndefined),
            Json::Object(root) => root,
            _ => return Err(ConfigurationError::ConfigNotObject),
        };

        let sections = match root.get("sections") {
            None | Some(Json::Null) => return Err(ConfigurationError::NoSections),
            Some(Json::Array(items)) if items.is_empty() => {
                return Err(ConfigurationError::SectionsEmpty);
            }
            Some(Json::Array(items)) => parse_collection::<NodeDefinition>("sections", items)?,
            Some(_) => return Err(ConfigurationError::SectionsNotArray),
        };

        let decisions = match root.get("decisions") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => parse_collection::<DecisionDefinition>("decisions", items)?,
            Some(_) => return Err(malformed("decisions", "expected an array")),
        };

        let edges = match root.get("edges") {
            Some(Json::Array(items)) if items.is_empty() => {
                if !decisions.is_empty() {
                    return Err(ConfigurationError::EdgesEmpty);
                }
                linear_flow(&sections)
            }
            Some(Json::Array(items)) => parse_collection::<EdgeDefinition>("edges", items)?,
            None | Some(Json::Null) if decisions.is_empty() => linear_flow(&sections),
            _ if !decisions.is_empty() => return Err(ConfigurationError::EdgesNotArray),
            Some(_) => return Err(malformed("edges", "expected an array")),
            None => Vec::new(),
        };

        let derived = match root.get("derived") {
            None | Some(Json::Null) => Vec::new(),
            Some(Json::Array(items)) => items
                .iter()
                .map(DerivedDefinition::from_value)
                .collect::<Result<_, _>>()?,
            Some(_) => return Err(malformed("derived", "expected an array")),
        };

        Ok(Self {
            sections,
            decisions,
            edges,
            derived,
        })
    }
}

fn parse_collection<T: DeserializeOwned>(
    collection: &'static str,
    items: &[Json],
) -> Result<Vec<T>, ConfigurationError> {
    items
        .iter()
        .map(|item| {
            serde_json::from_value(item.clone()).map_err(|e| malformed(collection, &e.to_string()))
        })
        .collect()
}

fn malformed(collection: &'static str, message: &str) -> ConfigurationError {
    ConfigurationError::MalformedDefinition {
        collection,
        message: message.to_string(),
    }
}

fn linear_flow(sections: &[NodeDefinition]) -> Vec<EdgeDefinition> {
    let ids: Vec<&str> = std::iter::once(START)
        .chain(sections.iter().filter_map(|s| s.id.as_deref()))
        .chain(std::iter::once(END))
        .collect();
    ids.windows(2)
        .map(|pair| EdgeDefinition::new(pair[0], pair[1]))
        .collect()
}
