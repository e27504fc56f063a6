use std::collections::{BTreeMap, BTreeSet};

use tracing::{debug, trace};

use super::ExpressionStore;
use crate::api::Engine;
use crate::model::{ExpressionId, ParseResult};

/// What a propagation pass did, in processing order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Propagation {
    /// Reevaluated and committed.
    pub recomputed: Vec<ExpressionId>,
    /// Marked out of date without reevaluation.
    pub stale: Vec<ExpressionId>,
    /// Reevaluated, and the reevaluation failed.
    pub failed: Vec<ExpressionId>,
}

/// What a processed expression tells its dependents.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Notice {
    /// A static value changed: static dependents recompute.
    Pure,
    /// A dynamic value changed: dependents only go stale.
    Impure,
}

/// Push the change of `origin` through its dependents.
///
/// Dependents are visited in topological order over the affected subgraph
/// (ties broken by id), so every expression is handled at most once and only
/// after all of its changed inputs. A dependent that hears only from static
/// inputs and is itself static is reevaluated (through the snapshot fast path
/// when possible) and committed; anything else is marked stale. Stale
/// expressions do not notify their own dependents.
pub fn propagate<S: ExpressionStore>(
    engine: &mut Engine,
    store: &mut S,
    origin: ExpressionId,
) -> Propagation {
    let affected: BTreeSet<ExpressionId> = store
        .deep_dependents(origin)
        .into_iter()
        .filter(|id| *id != origin)
        .collect();

    let mut children: BTreeMap<ExpressionId, Vec<ExpressionId>> = BTreeMap::new();
    let mut pending: BTreeMap<ExpressionId, usize> = affected.iter().map(|id| (*id, 0)).collect();
    for node in std::iter::once(origin).chain(affected.iter().copied()) {
        let next: Vec<ExpressionId> = store
            .direct_dependents(node)
            .into_iter()
            .filter(|id| affected.contains(id))
            .collect();
        for child in &next {
            if let Some(count) = pending.get_mut(child) {
                *count += 1;
            }
        }
        children.insert(node, next);
    }

    let mut notices: BTreeMap<ExpressionId, Notice> = BTreeMap::new();
    let mut ready: BTreeSet<ExpressionId> = BTreeSet::new();
    let origin_static = store.fetch(origin).is_none_or(|e| e.result.is_static);
    let origin_notice = if origin_static {
        Notice::Pure
    } else {
        Notice::Impure
    };
    release(origin, Some(origin_notice), &children, &mut pending, &mut notices, &mut ready);

    let mut report = Propagation::default();
    while let Some(id) = ready.pop_first() {
        let notice = match notices.get(&id) {
            None => None,
            Some(Notice::Impure) => {
                store.mark_stale(id);
                report.stale.push(id);
                None
            }
            Some(Notice::Pure) => recompute(engine, store, id, &mut report),
        };
        release(id, notice, &children, &mut pending, &mut notices, &mut ready);
    }

    debug!(
        %origin,
        recomputed = report.recomputed.len(),
        stale = report.stale.len(),
        failed = report.failed.len(),
        "Propagated change"
    );
    report
}

fn recompute<S: ExpressionStore>(
    engine: &mut Engine,
    store: &mut S,
    id: ExpressionId,
    report: &mut Propagation,
) -> Option<Notice> {
    let expression = store.fetch(id)?;
    if !expression.result.is_static {
        store.mark_stale(id);
        report.stale.push(id);
        return None;
    }
    match engine.try_reevaluate(id, &*store) {
        Ok(evaluation) => {
            trace!(%id, value = %evaluation.value, "Recomputed dependent");
            let notice = if evaluation.is_static {
                Notice::Pure
            } else {
                Notice::Impure
            };
            store.commit(id, &expression.text, evaluation.into());
            report.recomputed.push(id);
            Some(notice)
        }
        Err(err) => {
            trace!(%id, %err, "Dependent failed");
            store.record_failure(id, ParseResult::from(err));
            report.failed.push(id);
            Some(Notice::Pure)
        }
    }
}

fn release(
    id: ExpressionId,
    notice: Option<Notice>,
    children: &BTreeMap<ExpressionId, Vec<ExpressionId>>,
    pending: &mut BTreeMap<ExpressionId, usize>,
    notices: &mut BTreeMap<ExpressionId, Notice>,
    ready: &mut BTreeSet<ExpressionId>,
) {
    for child in children.get(&id).into_iter().flatten() {
        if let Some(notice) = notice {
            let entry = notices.entry(*child).or_insert(notice);
            if notice == Notice::Impure {
                *entry = Notice::Impure;
            }
        }
        if let Some(count) = pending.get_mut(child) {
            *count = count.saturating_sub(1);
            if *count == 0 {
                ready.insert(*child);
            }
        }
    }
}
