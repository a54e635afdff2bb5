//! Next/previous section queries over an evaluated [`WorkflowState`].

use crate::definition::{END, GraphNodeKind, START};
use crate::state::{Navigation, WorkflowState};
use ahash::AHashSet;
use std::collections::VecDeque;

fn messages_for(state: &WorkflowState, id: &str) -> Navigation {
    match state.section_state(id) {
        Some(section) if !section.validation_messages.is_empty() => {
            Navigation::with_messages(id, section.validation_messages.clone())
        }
        _ => Navigation::to(id),
    }
}

/// Follows active edges from `from`, passing through decisions, to the next
/// section or `END`.
fn walk_forward(state: &WorkflowState, from: &str) -> Option<String> {
    let mut current = from;
    for _ in 0..=state.edge_states.len() {
        let edge = state.active_edge_from(current)?;
        match edge.to_type {
            GraphNodeKind::Section | GraphNodeKind::End => return Some(edge.to.clone()),
            GraphNodeKind::Start | GraphNodeKind::Decision => current = &edge.to,
        }
    }
    None
}

/// Follows active edges into `from`, passing through decisions, to the
/// previous section or `START`.
fn walk_backward(state: &WorkflowState, from: &str) -> Option<String> {
    let mut current = from;
    for _ in 0..=state.edge_states.len() {
        let edge = state.active_edge_into(current)?;
        match edge.from_type {
            GraphNodeKind::Section | GraphNodeKind::Start => return Some(edge.from.clone()),
            GraphNodeKind::Decision | GraphNodeKind::End => current = &edge.from,
        }
    }
    None
}

/// Last section (or `END`) reached by following active edges from `START`.
fn furthest_reachable(state: &WorkflowState) -> String {
    let mut current = START.to_string();
    let mut furthest = START.to_string();
    for _ in 0..=state.edge_states.len() {
        let Some(edge) = state.active_edge_from(&current) else {
            break;
        };
        current = edge.to.clone();
        if matches!(edge.to_type, GraphNodeKind::Section | GraphNodeKind::End) {
            furthest = current.clone();
        }
    }
    furthest
}

pub(crate) fn next_section(state: &WorkflowState, current: &str) -> Option<Navigation> {
    if current == END || !(current == START || state.is_known(current)) {
        return None;
    }
    if current == START {
        return walk_forward(state, START).map(Navigation::to);
    }
    if !state.is_reachable(current) {
        return Some(messages_for(state, &furthest_reachable(state)));
    }
    if let Some(section) = state.section_state(current) {
        if !section.is_valid() {
            return Some(Navigation::with_messages(
                current,
                section.validation_messages.clone(),
            ));
        }
    }
    walk_forward(state, current).map(Navigation::to)
}

pub(crate) fn previous_section(state: &WorkflowState, current: &str) -> Option<Navigation> {
    if current == START || !state.is_known(current) {
        return None;
    }
    let entered_from_start = state
        .edge_states
        .iter()
        .any(|edge| edge.from == START && edge.to == current && edge.is_active());
    if entered_from_start {
        return Some(Navigation::to(START));
    }
    if state.is_reachable(current) {
        return walk_backward(state, current).map(Navigation::to);
    }
    search_backward(state, current)
}

/// Breadth-first search over incoming edges, in evaluation order, for the
/// nearest reachable predecessor of an unreachable node.
fn search_backward(state: &WorkflowState, current: &str) -> Option<Navigation> {
    let mut visited: AHashSet<&str> = AHashSet::new();
    let mut queue: VecDeque<&str> = VecDeque::new();
    visited.insert(current);
    queue.push_back(current);

    while let Some(node) = queue.pop_front() {
        for edge in state.edge_states.iter().filter(|edge| edge.to == node) {
            let predecessor = edge.from.as_str();
            if !visited.insert(predecessor) {
                continue;
            }
            if predecessor == START {
                return Some(Navigation::to(START));
            }
            if state.is_reachable(predecessor) {
                match edge.from_type {
                    GraphNodeKind::Section => return Some(messages_for(state, predecessor)),
                    GraphNodeKind::Decision => {
                        return walk_backward(state, predecessor).map(Navigation::to);
                    }
                    GraphNodeKind::Start | GraphNodeKind::End => {}
                }
            }
            queue.push_back(predecessor);
        }
    }
    None
}
