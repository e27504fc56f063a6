//! Reactive formula engine.
//!
//! Expressions are short formulas such as `2 * max(@(/stats/str), 3)` living in
//! a tree of groups. The [`api::Engine`] lexes, resolves and reduces them; the
//! [`graph`] module keeps their dependency edges and drives recomputation when
//! an expression changes.

pub mod api;
pub mod casting;
pub mod evaluator;
pub mod functions;
pub mod graph;
pub mod lexer;
pub mod model;
pub mod path;
pub mod snapshot;
pub mod source;
pub mod token;
pub mod values;
