use super::pruning::preconditions_met;
use super::resolver::Resolver;
use crate::ast::{DataKey, DataPath, Required, ValidationRule, Value, walk_leaves};
use crate::compiler::{CompiledConfig, ConfigNode, NodeId};
use crate::context::Context;
use crate::state::{SectionState, SectionStatus, ValidationMessage};
use ahash::AHashSet;
use serde_json::Value as Json;
use std::collections::BTreeMap;
use tracing::trace;

/// Blank for `required`: missing, null, empty string, an empty array, or an
/// array whose first element is blank.
pub(crate) fn is_blank_node(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) => true,
        Some(Json::String(s)) => s.is_empty(),
        Some(Json::Array(items)) => items.first().is_none_or(|first| is_blank_value(Some(first))),
        Some(_) => false,
    }
}

/// Blank for custom validations: missing, null or empty string.
fn is_blank_value(value: Option<&Json>) -> bool {
    match value {
        None | Some(Json::Null) => true,
        Some(Json::String(s)) => s.is_empty(),
        Some(_) => false,
    }
}

struct SectionValidator<'a> {
    config: &'a CompiledConfig,
    context: &'a Context,
    data: &'a Json,
    resolver: Resolver<'a>,
}

impl<'a> SectionValidator<'a> {
    fn new(config: &'a CompiledConfig, context: &'a Context, data: &'a Json) -> Self {
        Self {
            config,
            context,
            data,
            resolver: Resolver::new(data, context),
        }
    }

    fn evaluate(&self, section: &ConfigNode, section_id: NodeId) -> SectionState {
        let mut messages = self.required_messages(section_id);
        messages.extend(self.custom_messages(section));
        let status = if messages.is_empty() {
            SectionStatus::Valid
        } else {
            SectionStatus::Invalid
        };
        SectionState {
            status,
            validation_messages: messages,
        }
    }

    fn required_messages(&self, section_id: NodeId) -> Vec<ValidationMessage> {
        let mut messages = Vec::new();
        for node_id in self.config.descendants(section_id) {
            let node = self.config.node(node_id);
            let Some(required) = &node.required else {
                continue;
            };
            for path in node.path.expand(self.data) {
                if !is_blank_node(path.get(self.data)) {
                    continue;
                }
                let Some(message) = self.required_message(required, node, &path) else {
                    continue;
                };
                if preconditions_met(self.config, self.context, self.data, &path) {
                    messages.push(ValidationMessage::new(&path, message));
                }
            }
        }
        messages
    }

    fn required_message(
        &self,
        required: &Required,
        node: &ConfigNode,
        path: &DataPath,
    ) -> Option<String> {
        match required {
            Required::Message(resolvable) => match self.resolver.resolve(resolvable, Some(path)) {
                Value::String(message) if !message.is_empty() => Some(message),
                value if value.is_truthy() => Some(format!("{} is required", node.id)),
                _ => None,
            },
            Required::Alternatives(rules) => rules
                .iter()
                .find(|rule| {
                    !rule.message.is_empty()
                        && self.resolver.resolve(&rule.check, Some(path)).is_truthy()
                })
                .map(|rule| rule.message.clone()),
        }
    }

    fn custom_messages(&self, section: &ConfigNode) -> Vec<ValidationMessage> {
        let mut messages: Vec<ValidationMessage> = Vec::new();
        let Some(section_data) = self.data.get(&section.id) else {
            return messages;
        };

        let mut leaves = Vec::new();
        walk_leaves(section_data, &DataPath::field(&section.id), &mut |path, _| {
            leaves.push(path.clone())
        });

        let mut checked: AHashSet<(DataPath, bool)> = AHashSet::new();
        for leaf in leaves {
            let Some(node) = self.config.node_for_data_path(&leaf) else {
                continue;
            };
            let is_element = node.is_array_value() && matches!(leaf.last(), Some(DataKey::Index(_)));
            if is_element {
                self.check(&node.item_validations, &leaf, true, &mut checked, &mut messages);
                if let Some(array) = leaf.parent() {
                    self.check(&node.validations, &array, false, &mut checked, &mut messages);
                }
            } else {
                self.check(&node.validations, &leaf, false, &mut checked, &mut messages);
            }
        }
        messages
    }

    fn check(
        &self,
        rules: &[ValidationRule],
        path: &DataPath,
        item: bool,
        checked: &mut AHashSet<(DataPath, bool)>,
        messages: &mut Vec<ValidationMessage>,
    ) {
        if rules.is_empty() || !checked.insert((path.clone(), item)) {
            return;
        }
        let path_string = path.to_string();
        if messages.iter().any(|message| message.path == path_string) {
            return;
        }
        if is_blank_value(path.get(self.data))
            || !preconditions_met(self.config, self.context, self.data, path)
        {
            return;
        }
        let failed = rules
            .iter()
            .find(|rule| self.resolver.resolve(&rule.check, Some(path)) == Value::Bool(false));
        if let Some(rule) = failed {
            trace!(path = %path, message = %rule.message, "custom validation failed");
            messages.push(ValidationMessage::new(path, rule.message.clone()));
        }
    }
}

/// Validates every section against the pruned data.
pub(crate) fn evaluate_section_states(
    data: &Json,
    config: &CompiledConfig,
    context: &Context,
) -> BTreeMap<String, SectionState> {
    let validator = SectionValidator::new(config, context, data);
    config
        .section_ids()
        .iter()
        .map(|&section_id| {
            let section = config.node(section_id);
            (section.id.clone(), validator.evaluate(section, section_id))
        })
        .collect()
}
