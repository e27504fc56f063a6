//! Cache of resolved token sequences.
//!
//! Replaying a snapshot skips lexing and resolution: only the reference
//! values are refreshed before the reduction pass runs again. Pure
//! expressions without references never need replay and are never cached.

use hashbrown::HashMap;
use tracing::trace;

use crate::model::ExpressionId;
use crate::token::Token;

#[derive(Debug, Clone)]
pub struct ParserSnapshot {
    /// Text the tokens were lexed from.
    pub text: String,
    pub tokens: Vec<Token>,
    pub is_static: bool,
    pub global: Vec<ExpressionId>,
    pub local: Vec<ExpressionId>,
}

impl ParserSnapshot {
    pub fn is_worth_keeping(&self) -> bool {
        !self.is_static || !self.global.is_empty() || !self.local.is_empty()
    }
}

/// Snapshots keyed by expression, owned by one engine.
#[derive(Debug, Clone, Default)]
pub struct SnapshotCache {
    entries: HashMap<ExpressionId, ParserSnapshot>,
}

impl SnapshotCache {
    pub fn new() -> Self {
        Self::default()
    }

    /// Store `snapshot` for `id`, or drop any entry for `id` when the
    /// snapshot is pure and has no references.
    pub fn store(&mut self, id: ExpressionId, snapshot: ParserSnapshot) {
        if snapshot.is_worth_keeping() {
            trace!(%id, tokens = snapshot.tokens.len(), "Caching snapshot");
            self.entries.insert(id, snapshot);
        } else {
            self.entries.remove(&id);
        }
    }

    pub fn get(&self, id: ExpressionId) -> Option<&ParserSnapshot> {
        self.entries.get(&id)
    }

    pub fn remove(&mut self, id: ExpressionId) -> Option<ParserSnapshot> {
        self.entries.remove(&id)
    }

    /// Point the snapshot of `id` at new text whose tokens are unchanged, as
    /// after a reference rewrite.
    pub fn retext(&mut self, id: ExpressionId, text: &str) {
        if let Some(snapshot) = self.entries.get_mut(&id) {
            snapshot.text = text.to_string();
        }
    }

    pub fn contains(&self, id: ExpressionId) -> bool {
        self.entries.contains_key(&id)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(is_static: bool, global: Vec<ExpressionId>) -> ParserSnapshot {
        ParserSnapshot {
            text: "1".into(),
            tokens: Vec::new(),
            is_static,
            global,
            local: Vec::new(),
        }
    }

    #[test]
    fn test_pure_standalone_snapshot_is_not_kept() {
        let mut cache = SnapshotCache::new();
        cache.store(ExpressionId(1), snapshot(true, vec![]));
        assert!(cache.is_empty());
    }

    #[test]
    fn test_impure_or_referencing_snapshots_are_kept() {
        let mut cache = SnapshotCache::new();
        cache.store(ExpressionId(1), snapshot(false, vec![]));
        cache.store(ExpressionId(2), snapshot(true, vec![ExpressionId(1)]));
        assert_eq!(cache.len(), 2);
    }

    #[test]
    fn test_storing_a_pure_snapshot_drops_the_old_one() {
        let mut cache = SnapshotCache::new();
        cache.store(ExpressionId(1), snapshot(false, vec![]));
        cache.store(ExpressionId(1), snapshot(true, vec![]));
        assert!(!cache.contains(ExpressionId(1)));
    }

    #[test]
    fn test_retext() {
        let mut cache = SnapshotCache::new();
        cache.store(ExpressionId(1), snapshot(false, vec![]));
        cache.retext(ExpressionId(1), "roll(1,6)");
        assert_eq!(cache.get(ExpressionId(1)).unwrap().text, "roll(1,6)");
    }
}
