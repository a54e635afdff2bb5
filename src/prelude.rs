//! Prelude module for convenient imports
//!
//! This module re-exports the most commonly used types from the keiro crate.
//! Import it to get the compiler, the engine and the state types in one line.
//!
//! # Example
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//!
//! # fn run_example() -> Result<()> {
//! let config: serde_json::Value =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/workflow.json")?)?;
//! let data: serde_json::Value =
//!     serde_json::from_str(&std::fs::read_to_string("path/to/data.json")?)?;
//!
//! let engine = Engine::from_definition(&config)?;
//! let state = engine.workflow_state(&data);
//!
//! println!("{}", StateReport::render(engine.config(), &state));
//! # Ok(())
//! # }
//! ```

// Compilation and evaluation
pub use crate::compiler::{CompiledConfig, Compiler, compile};
pub use crate::context::{Context, ContextBuilder};
pub use crate::evaluator::{Engine, EngineBuilder};

// Expressions and paths
pub use crate::ast::{DataPath, RefPath, Resolvable, Value};

// Results
pub use crate::state::{
    EdgeState, EdgeStatus, Navigation, SectionState, SectionStatus, ValidationMessage,
    WorkflowState,
};

// Errors
pub use crate::error::ConfigurationError;

// Report formatting
pub use crate::report::StateReport;

// Result type alias for convenience
pub type Result<T> = std::result::Result<T, Box<dyn std::error::Error>>;
