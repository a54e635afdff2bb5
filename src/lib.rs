//! # Keiro - Declarative Form Workflow Engine
//!
//! **Keiro** evaluates multi-section form configurations against user data. A
//! configuration declares sections of fields, decisions that branch between
//! them, and the edges that join everything into a route from `START` to `END`.
//! The engine compiles it once and then answers, for any data snapshot, which
//! values are in play, which sections are valid, which route is active and
//! where the user should go next.
//!
//! ## Core Workflow
//!
//! 1.  **Compile**: `compile` (or `Compiler::new(..).compile()`) checks the configuration
//!     and builds an immutable `CompiledConfig`: node paths, edge evaluation order and
//!     precondition dependency order.
//! 2.  **Build an engine**: `Engine::builder(config)` pairs the compiled configuration with a
//!     `Context` of named functions. The defaults cover comparisons, blank checks, array
//!     helpers and arithmetic; callers may add or override entries.
//! 3.  **Evaluate**: `Engine::workflow_state(&data)` returns a `WorkflowState`:
//!     - `data`: the input with values whose preconditions fail removed,
//!     - `section_states`: `valid`, `invalid` (with messages) or `unreachable`,
//!     - `edge_states` and `current_pathway`: the route the data currently takes,
//!     - `derived` and `mapped_data`.
//! 4.  **Navigate**: `next_section` and `previous_section` answer where to go from a section.
//!
//! ## Resolvables
//!
//! Every dynamic attribute (preconditions, `required`, validations, decision outputs,
//! derived values) is a *resolvable*:
//!
//! - `"$.a.b"` reads data; `*` collects every array element, `^` reuses the index of the
//!   path being evaluated,
//! - `"$value"` is the value at the path being evaluated,
//! - `{"fn": "name", "args": [...]}` calls a context function,
//! - arrays and objects resolve element-wise, anything else is a literal.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use keiro::prelude::*;
//! use serde_json::json;
//!
//! fn main() -> Result<()> {
//!     let config = json!({
//!         "sections": [
//!             { "id": "about", "children": [
//!                 { "id": "name", "type": "value", "required": "Name is required" },
//!                 { "id": "age", "type": "value",
//!                   "validations": [{
//!                       "fn": "greaterThanOrEqual", "args": ["$value", 18],
//!                       "message": "Must be an adult"
//!                   }]
//!                 }
//!             ]},
//!             { "id": "adult_details", "children": [
//!                 { "id": "employer", "type": "value" }
//!             ]},
//!             { "id": "summary" }
//!         ],
//!         "decisions": [
//!             { "id": "is_adult", "output": { "fn": "greaterThanOrEqual", "args": ["$.about.age", 18] } }
//!         ],
//!         "edges": [
//!             { "from": "START", "to": "about" },
//!             { "from": "about", "to": "is_adult" },
//!             { "from": "is_adult", "to": "adult_details", "when_input_is": true },
//!             { "from": "is_adult", "to": "summary", "when_input_is": false },
//!             { "from": "adult_details", "to": "summary" },
//!             { "from": "summary", "to": "END" }
//!         ]
//!     });
//!
//!     let engine = Engine::builder(compile(&config)?)
//!         .with_function("isEven", |args| {
//!             Value::Bool(args.first().is_some_and(|v| v.to_number() % 2.0 == 0.0))
//!         })
//!         .build();
//!
//!     let data = json!({ "about": { "name": "Ada", "age": 36 } });
//!     let state = engine.workflow_state(&data);
//!     println!("Pathway: {:?}", state.current_pathway);
//!
//!     if let Some(next) = engine.next_section("about", &data) {
//!         println!("-> Next section: {}", next.section_id);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod ast;
pub mod compiler;
pub mod context;
pub mod definition;
pub mod error;
pub mod evaluator;
pub mod prelude;
pub mod report;
pub mod state;
