use thiserror::Error;

/// Errors raised while compiling a workflow configuration.
///
/// Compilation is all-or-nothing: the first violation aborts and no engine is built.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Configuration undefined. `compile` must be called with a valid configuration object")]
    ConfigUndefined,

    #[error("Configuration is not an object. `compile` must be called with a valid configuration object")]
    ConfigNotObject,

    #[error("Configuration does not contain any sections. At least one section is required")]
    NoSections,

    #[error("Sections property is not an array")]
    SectionsNotArray,

    #[error("Sections array is empty")]
    SectionsEmpty,

    #[error("Decisions exist, but edges not an array")]
    EdgesNotArray,

    #[error("Decisions exist, but edges array is empty")]
    EdgesEmpty,

    #[error("Malformed `{collection}` definition: {message}")]
    MalformedDefinition {
        collection: &'static str,
        message: String,
    },

    #[error("Duplicate id: {0} encountered")]
    DuplicateNodeId(String),

    #[error("Duplicate reference path: {0} is declared more than once")]
    DuplicateNodePath(String),

    #[error("Id '{0}' is reserved and cannot be used for a section or decision")]
    ReservedNodeId(String),

    #[error("Multiple nodes before START (from: {from}, to: {to})")]
    MultiplePreStartNodes { from: String, to: String },

    #[error("Edge `to` points to non-existent node: {0}")]
    EdgeToNonExistent(String),

    #[error("Edge `from` points to non-existent node: {0}")]
    EdgeFromNonExistent(String),

    #[error("Edge from decision '{from}' to '{to}' does not declare `when_input_is`")]
    MissingEdgeCondition { from: String, to: String },

    #[error("Edge from '{from}' to '{to}' declares `when_input_is`, but only decision edges may")]
    UnexpectedEdgeCondition { from: String, to: String },

    #[error("No edges defined going from START")]
    MissingStartEdge,

    #[error("No edges defined going from section: {0}")]
    UnexpectedPathTermination(String),

    #[error("Multiple edges defined going from section: {0}")]
    MultipleEdgesFromSection(String),

    #[error("No edges defined going to section: {0}")]
    UnreachableNode(String),

    #[error("No edges defined going from decision: {0} for true conditions")]
    NoTrueDecisionPath(String),

    #[error("No edges defined going from decision: {0} for false conditions")]
    NoFalseDecisionPath(String),

    #[error("Too many edges going from decision: {0}")]
    TooManyDecisionPaths(String),

    #[error("Edge graph contains a cycle involving node '{0}'")]
    CycleDetected(String),

    #[error("Preconditions form a dependency cycle involving '{0}'")]
    PreconditionCycle(String),
}
