//! The function table available to resolvables.
//!
//! A [`Context`] maps names to pure functions. Call objects (`{"fn": ..., "args": [...]}`)
//! only ever invoke names present here; unknown names fall back to plain-object resolution.

mod functions;

use crate::ast::{Function, Value};
use ahash::AHashMap;

pub use functions::DEFAULT_FUNCTIONS;

/// An immutable table of named functions.
#[derive(Debug, Clone)]
pub struct Context {
    functions: AHashMap<String, Function>,
}

impl Context {
    /// Starts a builder preloaded with the default functions.
    pub fn builder() -> ContextBuilder {
        ContextBuilder::new()
    }

    /// A context with no functions at all.
    pub fn empty() -> Self {
        Self {
            functions: AHashMap::new(),
        }
    }

    pub fn function(&self, name: &str) -> Option<&Function> {
        self.functions.get(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.functions.contains_key(name)
    }

    /// Registered names in alphabetical order.
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.functions.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.functions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.functions.is_empty()
    }
}

impl Default for Context {
    fn default() -> Self {
        ContextBuilder::new().build()
    }
}

/// Builds a [`Context`], merging caller functions over the defaults.
pub struct ContextBuilder {
    functions: AHashMap<String, Function>,
}

impl ContextBuilder {
    pub fn new() -> Self {
        let mut functions = AHashMap::new();
        functions::register_default_functions(&mut functions);
        Self { functions }
    }

    /// Drops every function registered so far, defaults included.
    pub fn without_defaults(mut self) -> Self {
        self.functions.clear();
        self
    }

    /// Adds a function, replacing any existing entry with the same name.
    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.functions
            .insert(name.to_string(), Function::new(name, function));
        self
    }

    /// Merges every entry of another context over this one.
    pub fn with_context(mut self, other: &Context) -> Self {
        for (name, function) in &other.functions {
            self.functions.insert(name.clone(), function.clone());
        }
        self
    }

    pub fn build(self) -> Context {
        Context {
            functions: self.functions,
        }
    }
}

impl Default for ContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
