//! Tests for configuration checks, node lookup and evaluation orders.
mod common;
use common::*;
use keiro::compiler::ConfigNode;
use keiro::definition::GraphNodeKind;
use keiro::prelude::*;
use serde_json::{Value as Json, json};

fn compile_err(raw: Json) -> ConfigurationError {
    compile(&raw).expect_err("configuration should be rejected")
}

fn section_config(edges: Json) -> Json {
    json!({
        "sections": [{ "id": "a" }, { "id": "b" }],
        "edges": edges
    })
}

fn decision_config(edges: Json) -> Json {
    json!({
        "sections": [{ "id": "a" }, { "id": "b" }, { "id": "c" }],
        "decisions": [{ "id": "d", "output": true }],
        "edges": edges
    })
}

#[test]
fn test_compiles_full_workflow() {
    let config = compile(&workflow_config()).expect("Failed to compile");

    assert_eq!(config.sections().count(), 8);
    assert_eq!(config.decisions().len(), 1);
    assert_eq!(config.edges().len(), 11);
    assert_eq!(config.derived().len(), 2);
    assert_eq!(config.kind_of("START"), Some(GraphNodeKind::Start));
    assert_eq!(config.kind_of("meets_premium_requirements"), Some(GraphNodeKind::Decision));
    assert_eq!(config.kind_of("final_notes"), Some(GraphNodeKind::Section));
    assert_eq!(config.kind_of("nowhere"), None);
}

#[test]
fn test_decision_keeps_extra_attributes() {
    let config = compile(&workflow_config()).unwrap();
    let decision = config.decision("meets_premium_requirements").unwrap();
    assert_eq!(
        decision.attributes.get("label"),
        Some(&json!("Total assets of at least 100000"))
    );
}

#[test]
fn test_rejects_missing_or_non_object_configuration() {
    assert_eq!(compile_err(Json::Null), ConfigurationError::ConfigUndefined);
    assert_eq!(compile_err(json!("sections")), ConfigurationError::ConfigNotObject);
    assert_eq!(compile_err(json!([])), ConfigurationError::ConfigNotObject);
}

#[test]
fn test_rejects_bad_sections() {
    assert_eq!(compile_err(json!({})), ConfigurationError::NoSections);
    assert_eq!(
        compile_err(json!({ "sections": {} })),
        ConfigurationError::SectionsNotArray
    );
    assert_eq!(
        compile_err(json!({ "sections": [] })),
        ConfigurationError::SectionsEmpty
    );
}

#[test]
fn test_rejects_missing_edges_when_decisions_exist() {
    let mut raw = decision_config(json!([]));
    assert_eq!(compile_err(raw.clone()), ConfigurationError::EdgesEmpty);

    raw["edges"] = json!("a -> b");
    assert_eq!(compile_err(raw.clone()), ConfigurationError::EdgesNotArray);

    raw.as_object_mut().unwrap().remove("edges");
    assert_eq!(compile_err(raw), ConfigurationError::EdgesNotArray);
}

#[test]
fn test_missing_edges_without_decisions_form_linear_flow() {
    let config = compile(&linear_config()).unwrap();
    let pairs: Vec<(&str, &str)> = config
        .edges()
        .iter()
        .map(|edge| (edge.from.as_str(), edge.to.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("START", "first"),
            ("first", "second"),
            ("second", "third"),
            ("third", "END")
        ]
    );

    let mut raw = linear_config();
    raw["edges"] = json!([]);
    assert_eq!(compile(&raw).unwrap().edges().len(), 4);
}

#[test]
fn test_rejects_duplicate_and_reserved_ids() {
    let raw = json!({
        "sections": [{ "id": "a" }, { "id": "a" }],
        "edges": [{ "from": "START", "to": "a" }]
    });
    assert_eq!(
        compile_err(raw),
        ConfigurationError::DuplicateNodeId("a".to_string())
    );

    let raw = json!({
        "sections": [{ "id": "a" }],
        "decisions": [{ "id": "a", "output": true }],
        "edges": [{ "from": "START", "to": "a" }]
    });
    assert_eq!(
        compile_err(raw),
        ConfigurationError::DuplicateNodeId("a".to_string())
    );

    let raw = json!({ "sections": [{ "id": "END" }] });
    assert_eq!(
        compile_err(raw),
        ConfigurationError::ReservedNodeId("END".to_string())
    );
}

#[test]
fn test_rejects_section_without_id() {
    let raw = json!({ "sections": [{ "children": [] }], "edges": [{ "from": "START", "to": "END" }] });
    assert!(matches!(
        compile_err(raw),
        ConfigurationError::MalformedDefinition { collection: "sections", .. }
    ));
}

#[test]
fn test_rejects_unknown_node_type() {
    let raw = json!({ "sections": [{ "id": "a", "type": "table" }] });
    assert!(matches!(
        compile_err(raw),
        ConfigurationError::MalformedDefinition { collection: "sections", .. }
    ));
}

#[test]
fn test_null_validation_lists_mean_none() {
    let config = compile(&json!({
        "sections": [{ "id": "a", "children": [
            { "id": "x", "type": "value", "validations": null },
            { "id": "y", "type": "array_value", "item_validations": null, "children": null }
        ]}]
    }))
    .unwrap();

    let x = config.get_config_node_by_path(&RefPath::parse("$.a.x")).unwrap();
    assert!(x.validations.is_empty());
    let y = config.get_config_node_by_path(&RefPath::parse("$.a.y")).unwrap();
    assert!(y.item_validations.is_empty());
}

#[test]
fn test_rejects_duplicate_node_paths() {
    let raw = json!({
        "sections": [{
            "id": "a",
            "children": [
                { "id": "x", "type": "value" },
                { "children": [{ "id": "x", "type": "value" }] }
            ]
        }]
    });
    assert_eq!(
        compile_err(raw),
        ConfigurationError::DuplicateNodePath("$.a.x".to_string())
    );
}

#[test]
fn test_rejects_edges_to_and_from_unknown_nodes() {
    let raw = section_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "c" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::EdgeToNonExistent("c".to_string())
    );

    let raw = section_config(json!([
        { "from": "START", "to": "a" },
        { "from": "c", "to": "b" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::EdgeFromNonExistent("c".to_string())
    );

    let raw = section_config(json!([
        { "from": "START", "to": "a" },
        { "from": "END", "to": "b" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::EdgeFromNonExistent("END".to_string())
    );
}

#[test]
fn test_edge_conditions_belong_to_decisions_only() {
    let raw = section_config(json!([
        { "from": "START", "to": "a", "when_input_is": true },
        { "from": "a", "to": "b" },
        { "from": "b", "to": "END" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::UnexpectedEdgeCondition {
            from: "START".to_string(),
            to: "a".to_string()
        }
    );

    let raw = decision_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "d" },
        { "from": "d", "to": "b" },
        { "from": "d", "to": "c", "when_input_is": false },
        { "from": "b", "to": "c" },
        { "from": "c", "to": "END" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::MissingEdgeCondition {
            from: "d".to_string(),
            to: "b".to_string()
        }
    );
}

#[test]
fn test_requires_an_edge_from_start() {
    let raw = section_config(json!([
        { "from": "a", "to": "b" },
        { "from": "b", "to": "END" }
    ]));
    assert_eq!(compile_err(raw), ConfigurationError::MissingStartEdge);
}

#[test]
fn test_rejects_dead_ends_and_forks_from_sections() {
    let raw = section_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "b" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::UnexpectedPathTermination("b".to_string())
    );

    let raw = section_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "b" },
        { "from": "a", "to": "END" },
        { "from": "b", "to": "END" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::MultipleEdgesFromSection("a".to_string())
    );
}

#[test]
fn test_rejects_unreachable_sections() {
    let raw = section_config(json!([
        { "from": "START", "to": "END" },
        { "from": "a", "to": "END" },
        { "from": "b", "to": "END" }
    ]));
    assert_eq!(
        compile_err(raw),
        ConfigurationError::UnreachableNode("a".to_string())
    );
}

#[test]
fn test_decisions_need_exactly_one_true_and_one_false_branch() {
    let only_false = decision_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "d" },
        { "from": "d", "to": "b", "when_input_is": false },
        { "from": "b", "to": "c" },
        { "from": "c", "to": "END" }
    ]));
    assert_eq!(
        compile_err(only_false),
        ConfigurationError::NoTrueDecisionPath("d".to_string())
    );

    let only_true = decision_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "d" },
        { "from": "d", "to": "b", "when_input_is": true },
        { "from": "b", "to": "c" },
        { "from": "c", "to": "END" }
    ]));
    assert_eq!(
        compile_err(only_true),
        ConfigurationError::NoFalseDecisionPath("d".to_string())
    );

    let three_ways = decision_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "d" },
        { "from": "d", "to": "b", "when_input_is": true },
        { "from": "d", "to": "c", "when_input_is": false },
        { "from": "d", "to": "END", "when_input_is": false },
        { "from": "b", "to": "c" },
        { "from": "c", "to": "END" }
    ]));
    assert_eq!(
        compile_err(three_ways),
        ConfigurationError::TooManyDecisionPaths("d".to_string())
    );
}

#[test]
fn test_only_one_node_may_precede_start() {
    let raw = json!({
        "sections": [{ "id": "a" }, { "id": "b" }, { "id": "c" }],
        "edges": [
            { "from": "a", "to": "START" },
            { "from": "b", "to": "START" },
            { "from": "START", "to": "c" },
            { "from": "c", "to": "END" }
        ]
    });
    assert_eq!(
        compile_err(raw),
        ConfigurationError::MultiplePreStartNodes {
            from: "b".to_string(),
            to: "START".to_string()
        }
    );

    // A node feeding the pre-start node makes two nodes before START.
    let raw = json!({
        "sections": [{ "id": "b" }, { "id": "a" }, { "id": "c" }],
        "edges": [
            { "from": "a", "to": "b" },
            { "from": "b", "to": "START" },
            { "from": "START", "to": "c" },
            { "from": "c", "to": "END" }
        ]
    });
    assert_eq!(
        compile_err(raw),
        ConfigurationError::MultiplePreStartNodes {
            from: "a".to_string(),
            to: "b".to_string()
        }
    );
}

#[test]
fn test_rejects_cycles() {
    let raw = section_config(json!([
        { "from": "START", "to": "a" },
        { "from": "a", "to": "b" },
        { "from": "b", "to": "a" }
    ]));
    assert!(matches!(
        compile_err(raw),
        ConfigurationError::CycleDetected(_)
    ));
}

#[test]
fn test_rejects_precondition_cycles() {
    let raw = json!({
        "sections": [{
            "id": "a",
            "children": [
                { "id": "x", "type": "value", "preconditions": ["$.a.y"] },
                { "id": "y", "type": "value", "preconditions": ["$.a.x"] }
            ]
        }]
    });
    assert!(matches!(
        compile_err(raw),
        ConfigurationError::PreconditionCycle(_)
    ));
}

#[test]
fn test_edges_are_in_evaluation_order() {
    let config = compile(&workflow_config()).unwrap();
    let pairs: Vec<(&str, &str)> = config
        .edges()
        .iter()
        .map(|edge| (edge.from.as_str(), edge.to.as_str()))
        .collect();
    assert_eq!(
        pairs,
        vec![
            ("global", "START"),
            ("START", "application_details"),
            ("application_details", "personal_details"),
            ("personal_details", "asset_details"),
            ("asset_details", "liability_details"),
            ("liability_details", "previous_applications"),
            ("previous_applications", "meets_premium_requirements"),
            ("meets_premium_requirements", "premium_enrollment"),
            ("meets_premium_requirements", "final_notes"),
            ("premium_enrollment", "final_notes"),
            ("final_notes", "END"),
        ]
    );
    assert_eq!(config.edges()[7].when_input_is, Some(true));
    assert_eq!(config.edges()[8].when_input_is, Some(false));
    assert_eq!(config.edges()[7].from_kind, GraphNodeKind::Decision);
    assert_eq!(config.edges()[10].to_kind, GraphNodeKind::End);
}

#[test]
fn test_edges_declared_out_of_order_are_sorted() {
    let raw = section_config(json!([
        { "from": "b", "to": "END" },
        { "from": "a", "to": "b" },
        { "from": "START", "to": "a" }
    ]));
    let config = compile(&raw).unwrap();
    let froms: Vec<&str> = config.edges().iter().map(|edge| edge.from.as_str()).collect();
    assert_eq!(froms, vec!["START", "a", "b"]);
}

#[test]
fn test_precondition_order_puts_dependencies_first() {
    let config = compile(&workflow_config()).unwrap();
    let order: Vec<String> = config
        .precondition_order()
        .iter()
        .map(ToString::to_string)
        .collect();
    let position = |path: &str| {
        order
            .iter()
            .position(|entry| entry == path)
            .unwrap_or_else(|| panic!("{} missing from {:?}", path, order))
    };

    assert!(position("$.personal_details.is_anonymous") < position("$.personal_details.name"));
    assert!(position("$.personal_details.name") < position("$.personal_details.doctor_type"));
    assert!(
        position("$.personal_details.name.title") < position("$.personal_details.doctor_type")
    );
    assert!(
        position("$.asset_details.assets.*.kind") < position("$.asset_details.assets.*.value")
    );
    assert!(position("$.previous_applications.exist") < position("$.previous_applications.items.*"));
}

#[test]
fn test_node_lookup_by_path() {
    let config = compile(&workflow_config()).unwrap();

    let assets = config
        .get_config_node_by_path(&RefPath::parse("$.asset_details.assets"))
        .expect("repeatable node found without trailing wildcard");
    assert!(assets.repeatable);
    assert_eq!(assets.path.to_string(), "$.asset_details.assets.*");

    let value: &ConfigNode = config
        .node_for_data_path(&DataPath::parse("asset_details.assets.1.value"))
        .unwrap();
    assert_eq!(value.id, "value");
    assert!(value.has_preconditions());

    let element = config
        .node_for_data_path(&DataPath::parse("personal_details.contact_numbers.3"))
        .unwrap();
    assert!(element.is_array_value());

    assert!(config
        .node_for_data_path(&DataPath::parse("personal_details.unknown"))
        .is_none());
}

#[test]
fn test_idless_groups_are_transparent() {
    let raw = json!({
        "sections": [{
            "id": "a",
            "children": [{ "type": "group", "children": [{ "id": "x", "type": "value" }] }]
        }]
    });
    let config = compile(&raw).unwrap();
    assert!(config
        .get_config_node_by_path(&RefPath::parse("$.a.x"))
        .is_some());
}

#[test]
fn test_mapped_path_rewrites_mapped_segments() {
    let config = compile(&workflow_config()).unwrap();
    let mapped = |path: &str| config.mapped_path(&DataPath::parse(path)).to_string();

    assert_eq!(mapped("previous_applications.exist"), "previous_applications_exist");
    assert_eq!(
        mapped("liability_details.liabilities.0.value"),
        "liability_details.liabilities.0.liability_value"
    );
    assert_eq!(
        mapped("previous_applications.items.0.comments.1.author"),
        "previous_applications.0.comments.1.comment_author"
    );
    assert_eq!(mapped("application_details.location"), "application_details.location");
}

#[test]
fn test_configuration_error_messages() {
    assert_eq!(
        ConfigurationError::DuplicateNodeId("a".to_string()).to_string(),
        "Duplicate id: a encountered"
    );
    assert_eq!(
        ConfigurationError::EdgesNotArray.to_string(),
        "Decisions exist, but edges not an array"
    );
    assert_eq!(
        ConfigurationError::UnreachableNode("b".to_string()).to_string(),
        "No edges defined going to section: b"
    );
}
