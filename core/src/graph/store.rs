use std::collections::{BTreeSet, VecDeque};

use crate::model::{ExpressionId, ParseResult};
use crate::source::ExpressionSource;

/// Write access to an expression store, plus its dependency index.
pub trait ExpressionStore: ExpressionSource {
    /// Expressions whose last successful evaluation referenced `id`.
    fn direct_dependents(&self, id: ExpressionId) -> Vec<ExpressionId>;

    /// Every expression reachable from `id` over dependent edges, nearest
    /// first. `id` itself is not included.
    fn deep_dependents(&self, id: ExpressionId) -> Vec<ExpressionId> {
        let mut seen = BTreeSet::from([id]);
        let mut order = Vec::new();
        let mut queue = VecDeque::from([id]);
        while let Some(next) = queue.pop_front() {
            for dependent in self.direct_dependents(next) {
                if seen.insert(dependent) {
                    order.push(dependent);
                    queue.push_back(dependent);
                }
            }
        }
        order
    }

    /// Persist a successful evaluation of `text`: the result, the text, and
    /// the outgoing edges named by the result. Marks the expression updated.
    fn commit(&mut self, id: ExpressionId, text: &str, result: ParseResult);

    /// Persist an error-carrying result and leave text and edges alone.
    fn record_failure(&mut self, id: ExpressionId, result: ParseResult);

    /// Flag the cached result of `id` as out of date.
    fn mark_stale(&mut self, id: ExpressionId);

    /// Replace the text of `id` without touching its result or edges.
    fn rewrite_text(&mut self, id: ExpressionId, text: String);
}
