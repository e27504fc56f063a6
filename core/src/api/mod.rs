//! Public API of the formula engine.
//!
//! The [`Engine`] evaluates expression text against any
//! [`ExpressionSource`](crate::source::ExpressionSource) and keeps a snapshot
//! cache so that recomputation can skip lexing. A [`Document`] pairs an engine
//! with a [`Workbook`](crate::graph::Workbook) and drives edits, renames,
//! moves and deletes through the dependency graph.
//!
//! # Example
//!
//! ```
//! use reckon_core::api::{Engine, EngineOptions};
//! use reckon_core::source::Detached;
//! use reckon_core::values::Value;
//!
//! let mut engine = Engine::new(EngineOptions::default(), |_| {});
//! let result = engine.evaluate_in("", "max(1 + 2, 7) % 4", &Detached);
//! assert_eq!(result.value, Value::Integer(3));
//! assert!(result.is_static);
//! ```

pub mod document;
pub mod engine;
pub mod error;
pub mod options;

pub use document::{Document, Edit};
pub use engine::Engine;
pub use error::{Diagnostic, Severity};
pub use options::EngineOptions;
