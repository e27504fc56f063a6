//! Read access the evaluator needs from whatever stores expressions.

use crate::model::{Expression, ExpressionId};

/// Lookups an expression store provides to the engine.
///
/// All methods are reads; the engine never mutates the store through this
/// trait.
pub trait ExpressionSource {
    /// Find the expression at an absolute path such as `/stats/str`.
    fn resolve_path(&self, path: &str) -> Option<ExpressionId>;

    /// Path of the group that contains `id`; `""` for the root group.
    fn current_group_path(&self, id: ExpressionId) -> String;

    /// Last persisted state of `id`.
    fn fetch(&self, id: ExpressionId) -> Option<Expression>;

    /// Which of `candidates` already depend on `id`, directly or not.
    fn overlap(&self, id: ExpressionId, candidates: &[ExpressionId]) -> Vec<ExpressionId>;
}

/// A source with no expressions, for evaluating standalone text.
#[derive(Debug, Clone, Copy, Default)]
pub struct Detached;

impl ExpressionSource for Detached {
    fn resolve_path(&self, _path: &str) -> Option<ExpressionId> {
        None
    }

    fn current_group_path(&self, _id: ExpressionId) -> String {
        String::new()
    }

    fn fetch(&self, _id: ExpressionId) -> Option<Expression> {
        None
    }

    fn overlap(&self, _id: ExpressionId, _candidates: &[ExpressionId]) -> Vec<ExpressionId> {
        Vec::new()
    }
}
