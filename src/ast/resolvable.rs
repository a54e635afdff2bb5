use super::{RefPath, Value};
use serde_json::Value as Json;

/// Property naming the context function of a call object.
pub const FUNCTION_PROPERTY: &str = "fn";
/// Property listing the arguments of a call object.
pub const ARGS_PROPERTY: &str = "args";
/// Property marking an object as a reference to a context function.
pub const FUNCTION_REF_PROPERTY: &str = "fnRef";
/// Literal string that resolves to the value at the path being evaluated.
pub const SELF_VALUE: &str = "$value";
/// Prefix marking a string as a reference path.
pub const REFERENCE_PREFIX: &str = "$.";

/// A parsed configuration expression.
///
/// Raw JSON is classified once at compile time; the resolver only walks this tree.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolvable {
    Literal(Value),
    /// `$value`
    SelfValue,
    /// `$.a.*.b`
    Reference(RefPath),
    Array(Vec<Resolvable>),
    Object(Vec<(String, Resolvable)>),
    /// `{ "fn": name, "args": [...] }`. When `name` is not registered the
    /// object is resolved as a plain object through `fallback`.
    Call {
        name: String,
        args: Vec<Resolvable>,
        fallback: Box<Resolvable>,
    },
    /// `{ "fnRef": name }`
    FunctionRef {
        name: Option<String>,
        target: Box<Resolvable>,
    },
}

impl Resolvable {
    pub fn parse(raw: &Json) -> Self {
        match raw {
            Json::String(s) if s == SELF_VALUE => Resolvable::SelfValue,
            Json::String(s) if s.starts_with(REFERENCE_PREFIX) => {
                Resolvable::Reference(RefPath::parse(s))
            }
            Json::Array(items) => Resolvable::Array(items.iter().map(Resolvable::parse).collect()),
            Json::Object(map) => {
                let plain = match map.get(FUNCTION_REF_PROPERTY) {
                    Some(target) => Resolvable::FunctionRef {
                        name: target.as_str().map(str::to_string),
                        target: Box::new(Resolvable::parse(target)),
                    },
                    None => Resolvable::Object(
                        map.iter()
                            .map(|(key, value)| (key.clone(), Resolvable::parse(value)))
                            .collect(),
                    ),
                };
                match map.get(FUNCTION_PROPERTY) {
                    Some(Json::String(name)) => {
                        let args = match map.get(ARGS_PROPERTY) {
                            Some(Json::Array(items)) => items.iter().map(Resolvable::parse).collect(),
                            _ => Vec::new(),
                        };
                        Resolvable::Call {
                            name: name.clone(),
                            args,
                            fallback: Box::new(plain),
                        }
                    }
                    _ => plain,
                }
            }
            other => Resolvable::Literal(Value::from(other)),
        }
    }

    /// Collects every reference path used anywhere in this expression.
    pub fn get_references<'a>(&'a self, references: &mut Vec<&'a RefPath>) {
        match self {
            Resolvable::Reference(path) => references.push(path),
            Resolvable::Array(items) => {
                for item in items {
                    item.get_references(references);
                }
            }
            Resolvable::Object(fields) => {
                for (_, value) in fields {
                    value.get_references(references);
                }
            }
            // The fallback object carries the arguments as well.
            Resolvable::Call { fallback, .. } => fallback.get_references(references),
            Resolvable::FunctionRef { target, .. } => target.get_references(references),
            Resolvable::Literal(_) | Resolvable::SelfValue => {}
        }
    }

    pub fn references(&self) -> Vec<&RefPath> {
        let mut references = Vec::new();
        self.get_references(&mut references);
        references
    }
}

impl From<&Json> for Resolvable {
    fn from(raw: &Json) -> Self {
        Resolvable::parse(raw)
    }
}

/// A check paired with the message reported when it fails.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidationRule {
    pub check: Resolvable,
    pub message: String,
}

impl ValidationRule {
    /// Reads `{ "resolvable": ..., "message": ... }`. Entries without a
    /// `resolvable` property use the whole object as the check, so a call
    /// object can carry its own `message`.
    pub fn parse(raw: &Json) -> Self {
        let check = raw
            .get("resolvable")
            .map(Resolvable::parse)
            .unwrap_or_else(|| Resolvable::parse(raw));
        let message = raw
            .get("message")
            .and_then(Json::as_str)
            .unwrap_or_default()
            .to_string();
        Self { check, message }
    }
}

/// The `required` attribute of a value node.
#[derive(Debug, Clone, PartialEq)]
pub enum Required {
    /// Resolves to a message string (or a truthy non-string for the default message).
    Message(Resolvable),
    /// The first rule whose check resolves truthy supplies the message.
    Alternatives(Vec<ValidationRule>),
}

impl Required {
    pub fn parse(raw: &Json) -> Self {
        match raw {
            Json::Array(items) => Required::Alternatives(items.iter().map(ValidationRule::parse).collect()),
            other => Required::Message(Resolvable::parse(other)),
        }
    }
}
