use crate::compiler::CompiledConfig;
use crate::evaluator::is_blank_node;
use crate::state::{SectionStatus, WorkflowState};
use itertools::Itertools;

/// Formats a workflow state into a human-readable summary.
pub struct StateReport;

impl StateReport {
    /// Renders pathway, per-section progress and messages, then derived values.
    pub fn render(config: &CompiledConfig, state: &WorkflowState) -> String {
        let mut out = String::new();

        let pathway = if state.current_pathway.is_empty() {
            "(not started)".to_string()
        } else {
            state.current_pathway.iter().join(" -> ")
        };
        out.push_str(&format!("Pathway: {}\n", pathway));

        let candidates = config.value_candidate_paths(&state.data);
        out.push_str("Sections:\n");
        for section in config.sections() {
            let Some(section_state) = state.section_state(&section.id) else {
                continue;
            };
            let in_section: Vec<_> = candidates
                .iter()
                .filter(|path| path.first().is_some_and(|key| key.to_string() == section.id))
                .collect();
            let answered = in_section
                .iter()
                .filter(|path| !is_blank_node(path.get(&state.data)))
                .count();

            let messages = &section_state.validation_messages;
            let suffix = match messages.len() {
                0 => String::new(),
                1 => ", 1 message".to_string(),
                n => format!(", {} messages", n),
            };
            out.push_str(&format!(
                "  {:<13} {} ({}/{} answered{})\n",
                Self::status_label(section_state.status),
                section.id,
                answered,
                in_section.len(),
                suffix
            ));
            for message in messages {
                out.push_str(&format!("      - {}: {}\n", message.path, message.message));
            }
        }

        if !state.derived.is_empty() {
            out.push_str("Derived:\n");
            for (id, value) in &state.derived {
                out.push_str(&format!("  {} = {}\n", id, value));
            }
        }
        out
    }

    fn status_label(status: SectionStatus) -> &'static str {
        match status {
            SectionStatus::Valid => "[valid]",
            SectionStatus::Invalid => "[invalid]",
            SectionStatus::Unreachable => "[unreachable]",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::evaluator::Engine;
    use serde_json::json;

    #[test]
    fn renders_pathway_progress_and_messages() {
        let engine = Engine::from_definition(&json!({
            "sections": [
                { "id": "about", "children": [
                    { "id": "name", "type": "value", "required": "Name is required" },
                    { "id": "age", "type": "value" }
                ]},
                { "id": "done" }
            ]
        }))
        .unwrap();
        let state = engine.workflow_state(&json!({ "about": { "age": 30 } }));
        let report = StateReport::render(engine.config(), &state);

        assert!(report.starts_with("Pathway: (not started)\n"));
        assert!(report.contains("[invalid]     about (1/2 answered, 1 message)"));
        assert!(report.contains("      - about.name: Name is required"));
        assert!(report.contains("[unreachable] done (0/0 answered)"));
    }

    #[test]
    fn answered_counts_agree_with_required_messages() {
        let engine = Engine::from_definition(&json!({
            "sections": [{ "id": "contact", "children": [
                { "id": "numbers", "type": "array_value", "required": "Numbers are required" }
            ]}]
        }))
        .unwrap();
        let state = engine.workflow_state(&json!({ "contact": { "numbers": [""] } }));
        let report = StateReport::render(engine.config(), &state);

        assert!(report.contains("[invalid]     contact (0/1 answered, 1 message)"));
        assert!(report.contains("      - contact.numbers: Numbers are required"));
    }
}
