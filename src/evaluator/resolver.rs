use crate::ast::{DataPath, RefPath, Resolvable, Value};
use crate::context::Context;
use serde_json::Value as Json;
use std::borrow::Cow;
use tracing::{trace, warn};

/// Resolves [`Resolvable`] trees against one data snapshot.
///
/// Resolution is total: missing data yields `undefined`, unknown function
/// names fall back to plain-object resolution.
pub struct Resolver<'a> {
    data: &'a Json,
    context: &'a Context,
}

impl<'a> Resolver<'a> {
    pub fn new(data: &'a Json, context: &'a Context) -> Self {
        Self { data, context }
    }

    /// Resolves `resolvable`. `target` is the concrete path being evaluated,
    /// used by `$value` and by `^` tokens in references.
    pub fn resolve(&self, resolvable: &Resolvable, target: Option<&DataPath>) -> Value {
        match resolvable {
            Resolvable::Literal(value) => value.clone(),
            Resolvable::SelfValue => match target {
                Some(path) => self.lookup(path),
                None => {
                    warn!("`$value` used without a target path; resolving to undefined");
                    Value::Undefined
                }
            },
            Resolvable::Reference(path) => self.resolve_reference(path, target),
            Resolvable::Array(items) => Value::Array(
                items
                    .iter()
                    .map(|item| self.resolve(item, target))
                    .collect(),
            ),
            Resolvable::Object(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(key, value)| (key.clone(), self.resolve(value, target)))
                    .collect(),
            ),
            Resolvable::Call {
                name,
                args,
                fallback,
            } => match self.context.function(name) {
                Some(function) => {
                    let args: Vec<Value> = args.iter().map(|arg| self.resolve(arg, target)).collect();
                    function.call(&args)
                }
                None => {
                    trace!(function = %name, "function not in context; resolving as object");
                    self.resolve(fallback, target)
                }
            },
            Resolvable::FunctionRef { name, target: inner } => {
                if let Some(function) = name.as_deref().and_then(|n| self.context.function(n)) {
                    return Value::Function(function.clone());
                }
                match self.resolve(inner, target) {
                    function @ Value::Function(_) => function,
                    _ => Value::Null,
                }
            }
        }
    }

    fn lookup(&self, path: &DataPath) -> Value {
        path.get(self.data).map_or(Value::Undefined, Value::from)
    }

    fn resolve_reference(&self, path: &RefPath, target: Option<&DataPath>) -> Value {
        let path = match target {
            Some(target) if path.has_relative() => Cow::Owned(path.with_relative_from(target)),
            _ => Cow::Borrowed(path),
        };
        if path.has_wildcard() {
            let values = path
                .data_paths(self.data)
                .iter()
                .map(|found| self.lookup(found))
                .collect();
            return Value::Array(values);
        }
        path.to_data_path()
            .map_or(Value::Undefined, |found| self.lookup(&found))
    }
}

/// Resolves a single expression. See [`Resolver::resolve`].
pub fn resolve(
    resolvable: &Resolvable,
    data: &Json,
    context: &Context,
    target: Option<&DataPath>,
) -> Value {
    Resolver::new(data, context).resolve(resolvable, target)
}
