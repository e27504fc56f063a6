//! Dependency graph and recomputation.
//!
//! An edge `dependency -> dependent` exists for every reference an expression
//! made at its last successful evaluation. [`ExpressionStore`] is the write
//! side a store offers on top of [`crate::source::ExpressionSource`];
//! [`Workbook`] is the in-memory store. [`propagate`] pushes a change through
//! the dependents of an expression and [`rewrite_references`] keeps reference
//! text valid when paths change.

mod propagate;
mod rename;
mod store;
mod workbook;

#[cfg(test)]
mod workbook_test;

pub use propagate::{Propagation, propagate};
pub use rename::rewrite_references;
pub use store::ExpressionStore;
pub use workbook::{Workbook, WorkbookError};
