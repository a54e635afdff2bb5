use crate::ast::{DataPath, Value};
use crate::compiler::{CompiledConfig, compile};
use crate::context::{Context, ContextBuilder};
use crate::error::ConfigurationError;
use crate::state::{Navigation, SectionStatus, WorkflowState};
use serde_json::Value as Json;
use tracing::debug;

mod graph;
mod mapping;
mod navigation;
mod pruning;
pub mod resolver;
mod validation;

pub use pruning::preconditions_met;
pub(crate) use validation::is_blank_node;
pub use resolver::{Resolver, resolve};

/// Evaluates user data against a compiled workflow configuration.
///
/// An `Engine` is immutable once built. Every query is a pure function of the
/// configuration, the context and the data passed in, so a single engine can
/// be shared across threads and reused for any number of snapshots.
#[derive(Debug, Clone)]
pub struct Engine {
    config: CompiledConfig,
    context: Context,
}

/// Configures the function table of an [`Engine`].
pub struct EngineBuilder {
    config: CompiledConfig,
    context: ContextBuilder,
}

impl EngineBuilder {
    pub fn new(config: CompiledConfig) -> Self {
        Self {
            config,
            context: Context::builder(),
        }
    }

    /// Registers a function, overriding a default of the same name.
    pub fn with_function<F>(mut self, name: &str, function: F) -> Self
    where
        F: Fn(&[Value]) -> Value + Send + Sync + 'static,
    {
        self.context = self.context.with_function(name, function);
        self
    }

    /// Merges all functions of `context` over the current table.
    pub fn with_context(mut self, context: &Context) -> Self {
        self.context = self.context.with_context(context);
        self
    }

    /// Removes the default functions. Functions added earlier are dropped too.
    pub fn without_default_functions(mut self) -> Self {
        self.context = self.context.without_defaults();
        self
    }

    pub fn build(self) -> Engine {
        Engine {
            config: self.config,
            context: self.context.build(),
        }
    }
}

impl Engine {
    pub fn new(config: CompiledConfig, context: Context) -> Self {
        Self { config, context }
    }

    pub fn builder(config: CompiledConfig) -> EngineBuilder {
        EngineBuilder::new(config)
    }

    /// Compiles `raw` and builds an engine with the default functions.
    pub fn from_definition(raw: &Json) -> Result<Self, ConfigurationError> {
        Ok(Self::new(compile(raw)?, Context::default()))
    }

    pub fn config(&self) -> &CompiledConfig {
        &self.config
    }

    pub fn context(&self) -> &Context {
        &self.context
    }

    /// Prunes, validates, evaluates the graph, then hides unreachable
    /// sections and maps the result.
    pub fn workflow_state(&self, data: &Json) -> WorkflowState {
        let pruned = pruning::prune(data.clone(), &self.config, &self.context);

        let derived = pruning::evaluate_derived(&pruned, &self.config, &self.context);
        let mut section_states =
            validation::evaluate_section_states(&pruned, &self.config, &self.context);
        let edge_states =
            graph::evaluate_edge_states(&pruned, &self.config, &self.context, &section_states);
        let current_pathway = graph::current_pathway(&edge_states);

        let mut state = WorkflowState {
            data: pruned,
            mapped_data: Json::Null,
            derived,
            section_states: Default::default(),
            edge_states,
            current_pathway,
        };

        for (id, section) in section_states.iter_mut() {
            if !state.is_reachable(id) {
                section.status = SectionStatus::Unreachable;
                DataPath::field(id).remove(&mut state.data);
            }
        }
        state.section_states = section_states;
        state.mapped_data = mapping::map_data(&state.data, &self.config);

        debug!(
            pathway = ?state.current_pathway,
            "evaluated workflow state"
        );
        state
    }

    /// Where to go after `current_id`. See the crate docs for the rules.
    pub fn next_section(&self, current_id: &str, data: &Json) -> Option<Navigation> {
        navigation::next_section(&self.workflow_state(data), current_id)
    }

    /// Where to go back to from `current_id`.
    pub fn previous_section(&self, current_id: &str, data: &Json) -> Option<Navigation> {
        navigation::previous_section(&self.workflow_state(data), current_id)
    }

    pub fn is_section_reachable(&self, section_id: &str, data: &Json) -> bool {
        self.workflow_state(data).is_reachable(section_id)
    }

    /// Navigation against a state that was already evaluated.
    pub fn next_section_in(&self, state: &WorkflowState, current_id: &str) -> Option<Navigation> {
        navigation::next_section(state, current_id)
    }

    pub fn previous_section_in(
        &self,
        state: &WorkflowState,
        current_id: &str,
    ) -> Option<Navigation> {
        navigation::previous_section(state, current_id)
    }
}

impl From<CompiledConfig> for Engine {
    fn from(config: CompiledConfig) -> Self {
        Self::new(config, Context::default())
    }
}
