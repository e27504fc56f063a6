//! Reckon - a reactive formula engine
//!
//! # Overview
//!
//! Reckon evaluates short formulas that live in a tree of named groups and
//! refer to each other by path. Typical uses are character sheets, quick
//! spreadsheets and configuration values derived from other values.
//!
//! ```text
//! /stats/str    = 14
//! /stats/bonus  = (@(..str) - 10) / 2
//! /attack       = roll(1, 20) + @(stats/bonus)
//! ```
//!
//! When an expression changes, everything that depends on it is brought up to
//! date: dependents that only see fixed values are recomputed right away,
//! dependents of `random` or `roll` are marked out of date and recomputed when
//! they are next demanded.
//!
//! # Quick Start
//!
//! ```
//! use reckon::{Document, EngineOptions, Value};
//!
//! let mut doc = Document::new(EngineOptions::default());
//! let root = doc.root();
//! let stats = doc.add_group(root, "stats").unwrap();
//! let (str_id, _) = doc.add_expression(stats, "str", "14").unwrap();
//! let (bonus, _) = doc.add_expression(stats, "bonus", "(@(..str) - 10) / 2").unwrap();
//!
//! doc.edit(str_id, "18").unwrap();
//! assert_eq!(doc.expression(bonus).unwrap().result.value, Value::Double(4.0));
//! ```
//!
//! # Custom functions
//!
//! Functions are registered when the engine is built. Each one declares its
//! precedence rank, associativity and typed variants:
//!
//! ```
//! use reckon::{Engine, EngineOptions, Value};
//! use reckon::functions::{Associativity, Function};
//! use reckon::source::Detached;
//! use reckon::values::LiteralKind;
//!
//! let mut engine = Engine::new(EngineOptions::default(), |registry| {
//!     registry.register(
//!         Function::new("clamp", 1, Associativity::LeftToRight).variant(
//!             &[LiteralKind::Integer, LiteralKind::Integer, LiteralKind::Integer],
//!             LiteralKind::Integer,
//!             |args, _| {
//!                 let v = args[0].as_int().unwrap_or(0);
//!                 let lo = args[1].as_int().unwrap_or(0);
//!                 let hi = args[2].as_int().unwrap_or(0);
//!                 Ok(Value::Integer(v.clamp(lo, hi)))
//!             },
//!         ),
//!     );
//! });
//!
//! let result = engine.evaluate_in("", "clamp(25, 0, 20)", &Detached);
//! assert_eq!(result.value, Value::Integer(20));
//! ```

mod error_renderer;

// Re-export public API from reckon_core
pub use reckon_core::api::{Diagnostic, Document, Edit, Engine, EngineOptions, Severity};

// Re-export the building blocks hosts work with directly
pub use reckon_core::graph::{self, ExpressionStore, Propagation, Workbook, WorkbookError};
pub use reckon_core::model::{
    self, EvaluationState, Expression, ExpressionId, Group, GroupId, ParseResult,
};
pub use reckon_core::values::{self, LiteralKind, Value};
pub use reckon_core::{functions, source};

// Re-export errors
pub use reckon_core::evaluator::EvalError;

pub use error_renderer::{
    render_error, render_error_to, render_error_to_string, render_error_to_string_no_color,
};
