//! The evaluation result returned by [`Engine::workflow_state`](crate::evaluator::Engine::workflow_state).

use crate::ast::DataPath;
use crate::compiler::Edge;
use crate::definition::{GraphNodeKind, START};
use serde::Serialize;
use serde_json::{Map, Value as Json};
use std::collections::BTreeMap;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionStatus {
    Valid,
    Invalid,
    Unreachable,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationMessage {
    pub path: String,
    pub message: String,
}

impl ValidationMessage {
    pub fn new(path: &DataPath, message: impl Into<String>) -> Self {
        Self {
            path: path.to_string(),
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SectionState {
    pub status: SectionStatus,
    #[serde(rename = "validationMessages")]
    pub validation_messages: Vec<ValidationMessage>,
}

impl SectionState {
    pub fn is_valid(&self) -> bool {
        self.status == SectionStatus::Valid
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum EdgeStatus {
    Active,
    Inactive,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct EdgeState {
    pub from: String,
    pub to: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub when_input_is: Option<bool>,
    pub status: EdgeStatus,
    #[serde(rename = "fromType")]
    pub from_type: GraphNodeKind,
    #[serde(rename = "toType")]
    pub to_type: GraphNodeKind,
}

impl EdgeState {
    pub fn new(edge: &Edge, status: EdgeStatus) -> Self {
        Self {
            from: edge.from.clone(),
            to: edge.to.clone(),
            when_input_is: edge.when_input_is,
            status,
            from_type: edge.from_kind,
            to_type: edge.to_kind,
        }
    }

    pub fn is_active(&self) -> bool {
        self.status == EdgeStatus::Active
    }
}

/// Everything the engine knows about one data snapshot.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct WorkflowState {
    /// Pruned data with unreachable sections removed.
    pub data: Json,
    /// `data` re-keyed through `data_mapping`.
    pub mapped_data: Json,
    pub derived: Map<String, Json>,
    pub section_states: BTreeMap<String, SectionState>,
    /// Edges in evaluation order.
    pub edge_states: Vec<EdgeState>,
    /// Sections and decisions passed through, in order.
    pub current_pathway: Vec<String>,
}

impl WorkflowState {
    pub fn section_state(&self, id: &str) -> Option<&SectionState> {
        self.section_states.get(id)
    }

    pub fn edge_state(&self, from: &str, to: &str) -> Option<&EdgeState> {
        self.edge_states
            .iter()
            .find(|edge| edge.from == from && edge.to == to)
    }

    /// `START`, nodes with an active incoming edge, and the node before `START`.
    pub fn is_reachable(&self, id: &str) -> bool {
        id == START
            || self.edge_states.iter().any(|edge| {
                (edge.to == id && edge.is_active()) || (edge.from == id && edge.to == START)
            })
    }

    /// True when `id` is a vertex of the section graph.
    pub fn is_known(&self, id: &str) -> bool {
        self.edge_states
            .iter()
            .any(|edge| edge.from == id || edge.to == id)
    }

    /// First active edge leaving `id`, in evaluation order.
    pub fn active_edge_from(&self, id: &str) -> Option<&EdgeState> {
        self.edge_states
            .iter()
            .find(|edge| edge.from == id && edge.is_active())
    }

    /// First active edge entering `id`, in evaluation order.
    pub fn active_edge_into(&self, id: &str) -> Option<&EdgeState> {
        self.edge_states
            .iter()
            .find(|edge| edge.to == id && edge.is_active())
    }
}

/// Result of a navigation query.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Navigation {
    pub section_id: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub validation_messages: Option<Vec<ValidationMessage>>,
}

impl Navigation {
    pub fn to(section_id: impl Into<String>) -> Self {
        Self {
            section_id: section_id.into(),
            validation_messages: None,
        }
    }

    pub fn with_messages(section_id: impl Into<String>, messages: Vec<ValidationMessage>) -> Self {
        Self {
            section_id: section_id.into(),
            validation_messages: Some(messages),
        }
    }
}
