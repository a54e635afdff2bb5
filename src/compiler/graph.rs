use crate::definition::{END, EdgeDefinition, GraphNodeKind, START, WorkflowDefinition, is_sentinel};
use crate::error::ConfigurationError;
use ahash::AHashMap;

struct GraphEntry<'a> {
    id: &'a str,
    kind: GraphNodeKind,
    incoming: Vec<&'a EdgeDefinition>,
    outgoing: Vec<&'a EdgeDefinition>,
}

/// Checks the section/decision graph and returns the kind of every vertex,
/// sentinels included.
pub(super) fn validate(
    definition: &WorkflowDefinition,
) -> Result<AHashMap<String, GraphNodeKind>, ConfigurationError> {
    let mut entries: Vec<GraphEntry<'_>> = Vec::new();
    let mut lookup: AHashMap<&str, usize> = AHashMap::new();

    let sections = definition.sections.iter().map(|section| {
        section
            .id
            .as_deref()
            .map(|id| (id, GraphNodeKind::Section))
            .ok_or_else(|| ConfigurationError::MalformedDefinition {
                collection: "sections",
                message: "top-level section is missing an `id`".to_string(),
            })
    });
    let decisions = definition
        .decisions
        .iter()
        .map(|decision| Ok((decision.id.as_str(), GraphNodeKind::Decision)));

    for entry in sections.chain(decisions) {
        let (id, kind) = entry?;
        if is_sentinel(id) {
            return Err(ConfigurationError::ReservedNodeId(id.to_string()));
        }
        if lookup.insert(id, entries.len()).is_some() {
            return Err(ConfigurationError::DuplicateNodeId(id.to_string()));
        }
        entries.push(GraphEntry {
            id,
            kind,
            incoming: Vec::new(),
            outgoing: Vec::new(),
        });
    }

    let mut start_edges = 0;
    let mut pre_start: Option<&EdgeDefinition> = None;
    for edge in &definition.edges {
        if !is_sentinel(&edge.to) {
            let index = *lookup
                .get(edge.to.as_str())
                .ok_or_else(|| ConfigurationError::EdgeToNonExistent(edge.to.clone()))?;
            entries[index].incoming.push(edge);
        }

        let from_kind = if edge.from == START {
            start_edges += 1;
            GraphNodeKind::Start
        } else if edge.from == END {
            return Err(ConfigurationError::EdgeFromNonExistent(edge.from.clone()));
        } else {
            let index = *lookup
                .get(edge.from.as_str())
                .ok_or_else(|| ConfigurationError::EdgeFromNonExistent(edge.from.clone()))?;
            entries[index].outgoing.push(edge);
            entries[index].kind
        };

        match (from_kind, edge.when_input_is) {
            (GraphNodeKind::Decision, None) => {
                return Err(ConfigurationError::MissingEdgeCondition {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
            (GraphNodeKind::Section | GraphNodeKind::Start, Some(_)) => {
                return Err(ConfigurationError::UnexpectedEdgeCondition {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
            _ => {}
        }

        if edge.to == START {
            if pre_start.is_some() {
                return Err(ConfigurationError::MultiplePreStartNodes {
                    from: edge.from.clone(),
                    to: edge.to.clone(),
                });
            }
            pre_start = Some(edge);
        }
    }

    if start_edges == 0 {
        return Err(ConfigurationError::MissingStartEdge);
    }

    for entry in &entries {
        let precedes_start = entry.outgoing.iter().any(|edge| edge.to == START);
        if let (true, Some(first)) = (precedes_start, entry.incoming.first()) {
            return Err(ConfigurationError::MultiplePreStartNodes {
                from: first.from.clone(),
                to: first.to.clone(),
            });
        }
        if entry.outgoing.is_empty() {
            return Err(ConfigurationError::UnexpectedPathTermination(
                entry.id.to_string(),
            ));
        }
        if entry.kind == GraphNodeKind::Section && entry.outgoing.len() > 1 {
            return Err(ConfigurationError::MultipleEdgesFromSection(
                entry.id.to_string(),
            ));
        }
        if !precedes_start && entry.incoming.is_empty() {
            return Err(ConfigurationError::UnreachableNode(entry.id.to_string()));
        }
        if entry.kind == GraphNodeKind::Decision {
            let has_branch = |branch: bool| {
                entry
                    .outgoing
                    .iter()
                    .any(|edge| edge.when_input_is == Some(branch))
            };
            if !has_branch(true) {
                return Err(ConfigurationError::NoTrueDecisionPath(entry.id.to_string()));
            }
            if !has_branch(false) {
                return Err(ConfigurationError::NoFalseDecisionPath(entry.id.to_string()));
            }
            if entry.outgoing.len() > 2 {
                return Err(ConfigurationError::TooManyDecisionPaths(
                    entry.id.to_string(),
                ));
            }
        }
    }

    let mut kinds: AHashMap<String, GraphNodeKind> = entries
        .iter()
        .map(|entry| (entry.id.to_string(), entry.kind))
        .collect();
    kinds.insert(START.to_string(), GraphNodeKind::Start);
    kinds.insert(END.to_string(), GraphNodeKind::End);
    Ok(kinds)
}
