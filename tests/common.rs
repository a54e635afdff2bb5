//! Common test utilities for building workflow configurations and data.
use keiro::prelude::*;
use serde_json::{Value as Json, json};

/// A loan-application style workflow covering every node type.
///
/// Route: `global -> START -> application_details -> personal_details ->
/// asset_details -> liability_details -> previous_applications ->
/// meets_premium_requirements -> (premium_enrollment ->) final_notes -> END`
#[allow(dead_code)]
pub fn workflow_config() -> Json {
    json!({
        "sections": [
            {
                "id": "global",
                "children": [
                    { "id": "consent", "type": "value" }
                ]
            },
            {
                "id": "application_details",
                "children": [
                    { "id": "location", "type": "value", "required": "Location of application is required" }
                ]
            },
            {
                "id": "personal_details",
                "children": [
                    { "id": "is_anonymous", "type": "value" },
                    {
                        "id": "name",
                        "type": "group",
                        "preconditions": [
                            { "fn": "not", "args": ["$.personal_details.is_anonymous"] }
                        ],
                        "children": [
                            { "id": "title", "type": "value", "required": "Title is required" },
                            {
                                "id": "first",
                                "type": "value",
                                "validations": [{
                                    "resolvable": {
                                        "fn": "greaterThanOrEqual",
                                        "args": [{ "fn": "length", "args": ["$value"] }, 2]
                                    },
                                    "message": "First name must be at least 2 characters long"
                                }]
                            },
                            { "id": "last", "type": "value" }
                        ]
                    },
                    {
                        "id": "doctor_type",
                        "type": "value",
                        "preconditions": [
                            { "fn": "equals", "args": ["$.personal_details.name.title", "dr"] }
                        ]
                    },
                    {
                        "id": "contact_numbers",
                        "type": "array_value",
                        "required": "Contact numbers are required",
                        "validations": [{
                            "resolvable": {
                                "fn": "greaterThanOrEqual",
                                "args": [{ "fn": "arrayLength", "args": ["$value"] }, 2]
                            },
                            "message": "At least 2 contact numbers are required"
                        }],
                        "item_validations": [{
                            "resolvable": { "fn": "isNumeric", "args": ["$value"] },
                            "message": "Contact numbers must be numeric"
                        }]
                    }
                ]
            },
            {
                "id": "asset_details",
                "children": [
                    {
                        "id": "assets",
                        "type": "array_group",
                        "required": "At least one asset is required",
                        "children": [
                            { "id": "description", "type": "value", "required": "Asset description is required" },
                            { "id": "kind", "type": "value" },
                            {
                                "id": "value",
                                "type": "value",
                                "required": "Asset value is required",
                                "preconditions": [
                                    { "fn": "notEquals", "args": ["$.asset_details.assets.^.kind", "intangible"] }
                                ],
                                "validations": [{
                                    "resolvable": { "fn": "isNumber", "args": ["$value"] },
                                    "message": "Value must be a number"
                                }]
                            },
                            { "id": "depreciation", "type": "value" }
                        ]
                    }
                ]
            },
            {
                "id": "liability_details",
                "children": [
                    {
                        "id": "liabilities",
                        "type": "array_group",
                        "children": [
                            { "id": "description", "type": "value" },
                            { "id": "value", "type": "value", "data_mapping": "liability_value" }
                        ]
                    }
                ]
            },
            {
                "id": "previous_applications",
                "children": [
                    { "id": "exist", "type": "value", "data_mapping": "previous_applications_exist" },
                    {
                        "id": "items",
                        "type": "array_group",
                        "data_mapping": "previous_applications",
                        "preconditions": ["$.previous_applications.exist"],
                        "children": [
                            { "id": "date", "type": "value" },
                            {
                                "id": "comments",
                                "type": "array_group",
                                "children": [
                                    {
                                        "id": "author",
                                        "type": "value",
                                        "required": "Author of comment is required",
                                        "data_mapping": "comment_author"
                                    },
                                    { "id": "message", "type": "value" }
                                ]
                            }
                        ]
                    }
                ]
            },
            {
                "id": "premium_enrollment",
                "children": [
                    { "id": "plan", "type": "value" }
                ]
            },
            {
                "id": "final_notes",
                "children": [
                    { "id": "notes", "type": "value" },
                    { "id": "contact_preference", "type": "value", "default_value": "email" }
                ]
            }
        ],
        "decisions": [
            {
                "id": "meets_premium_requirements",
                "label": "Total assets of at least 100000",
                "output": {
                    "fn": "greaterThanOrEqual",
                    "args": [{ "fn": "sum", "args": ["$.asset_details.assets.*.value"] }, 100000]
                }
            }
        ],
        "edges": [
            { "from": "global", "to": "START" },
            { "from": "START", "to": "application_details" },
            { "from": "application_details", "to": "personal_details" },
            { "from": "personal_details", "to": "asset_details" },
            { "from": "asset_details", "to": "liability_details" },
            { "from": "liability_details", "to": "previous_applications" },
            { "from": "previous_applications", "to": "meets_premium_requirements" },
            { "from": "meets_premium_requirements", "to": "premium_enrollment", "when_input_is": true },
            { "from": "meets_premium_requirements", "to": "final_notes", "when_input_is": false },
            { "from": "premium_enrollment", "to": "final_notes" },
            { "from": "final_notes", "to": "END" }
        ],
        "derived": [
            {
                "id": "assets_total_value",
                "resolvable": { "fn": "sum", "args": ["$.asset_details.assets.*.value"] }
            },
            {
                "id": "assets_total_adjusted",
                "resolvable": {
                    "fn": "subtract",
                    "args": [
                        { "fn": "sum", "args": ["$.asset_details.assets.*.value"] },
                        { "fn": "sum", "args": ["$.asset_details.assets.*.depreciation"] }
                    ]
                }
            }
        ]
    })
}

/// Data that satisfies every section of [`workflow_config`] and takes the
/// premium branch.
#[allow(dead_code)]
pub fn valid_data() -> Json {
    json!({
        "global": { "consent": true },
        "application_details": { "location": "Manchester" },
        "personal_details": {
            "is_anonymous": false,
            "name": { "title": "mr", "first": "John", "last": "Smith" },
            "contact_numbers": ["0123456789", "0987654321"]
        },
        "asset_details": {
            "assets": [
                { "description": "House", "kind": "property", "value": 1000000, "depreciation": 10000 },
                { "description": "Car", "kind": "vehicle", "value": 12000, "depreciation": 0 }
            ]
        },
        "liability_details": {
            "liabilities": [
                { "description": "Mortgage", "value": 5000 }
            ]
        },
        "previous_applications": {
            "exist": true,
            "items": [
                {
                    "date": "2019-01-01",
                    "comments": [
                        { "author": "Bob", "message": "Approved" }
                    ]
                }
            ]
        },
        "premium_enrollment": { "plan": "gold" },
        "final_notes": { "notes": "None" }
    })
}

/// [`valid_data`] with asset values too low for the premium branch.
#[allow(dead_code)]
pub fn standard_data() -> Json {
    let mut data = valid_data();
    data["asset_details"]["assets"][0]["value"] = json!(1);
    data["asset_details"]["assets"][1]["value"] = json!(1);
    data
}

#[allow(dead_code)]
pub fn engine() -> Engine {
    Engine::from_definition(&workflow_config()).expect("test configuration compiles")
}

/// Messages of one section, as `(path, message)` pairs.
#[allow(dead_code)]
pub fn messages(state: &WorkflowState, section: &str) -> Vec<(String, String)> {
    state
        .section_state(section)
        .map(|section| {
            section
                .validation_messages
                .iter()
                .map(|m| (m.path.clone(), m.message.clone()))
                .collect()
        })
        .unwrap_or_default()
}

#[allow(dead_code)]
pub fn has_message(state: &WorkflowState, section: &str, path: &str, message: &str) -> bool {
    messages(state, section)
        .iter()
        .any(|(p, m)| p == path && m == message)
}

#[allow(dead_code)]
pub fn edge_status(state: &WorkflowState, from: &str, to: &str) -> Option<EdgeStatus> {
    state.edge_state(from, to).map(|edge| edge.status)
}

/// A minimal three-section linear workflow.
#[allow(dead_code)]
pub fn linear_config() -> Json {
    json!({
        "sections": [
            { "id": "first", "children": [{ "id": "a", "type": "value", "required": true }] },
            { "id": "second", "children": [{ "id": "b", "type": "value" }] },
            { "id": "third", "children": [{ "id": "c", "type": "value" }] }
        ]
    })
}
