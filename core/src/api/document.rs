//! A workbook paired with the engine that evaluates it.

use tracing::{debug, warn};

use super::{Engine, EngineOptions};
use crate::evaluator::{EvalError, Evaluation};
use crate::graph::{ExpressionStore, Propagation, Workbook, WorkbookError, propagate, rewrite_references};
use crate::model::{Expression, ExpressionId, GroupId, ParseResult};
use crate::source::ExpressionSource;
use crate::token::Token;

#[derive(Debug, Clone, Copy)]
enum Entity {
    Expression(ExpressionId),
    Group(GroupId),
}

/// Outcome of an edit or a demand.
#[derive(Debug, Clone, PartialEq)]
pub struct Edit {
    /// The result the expression was evaluated to. For a rejected edit this
    /// is the error; the stored expression keeps its previous state.
    pub result: ParseResult,
    /// `None` when the edit was rejected and nothing changed.
    pub propagation: Option<Propagation>,
}

impl Edit {
    pub fn is_rejected(&self) -> bool {
        self.propagation.is_none()
    }
}

/// Structural and text edits over a [`Workbook`], keeping values, edges,
/// snapshots and reference text consistent.
///
/// # Example
///
/// ```
/// use reckon_core::api::{Document, EngineOptions};
/// use reckon_core::values::Value;
///
/// let mut doc = Document::new(EngineOptions::default());
/// let root = doc.root();
/// let stats = doc.add_group(root, "stats").unwrap();
/// let (str_id, _) = doc.add_expression(stats, "str", "14").unwrap();
/// let (bonus, _) = doc.add_expression(stats, "bonus", "(@(..str) - 10) / 2").unwrap();
///
/// doc.edit(str_id, "18").unwrap();
/// assert_eq!(doc.expression(bonus).unwrap().result.value, Value::Double(4.0));
/// ```
pub struct Document {
    engine: Engine,
    workbook: Workbook,
}

impl Document {
    pub fn new(options: EngineOptions) -> Self {
        Self::with_engine(Engine::new(options, |_| {}), Workbook::new())
    }

    pub fn with_engine(engine: Engine, workbook: Workbook) -> Self {
        Self { engine, workbook }
    }

    pub fn engine(&self) -> &Engine {
        &self.engine
    }

    pub fn engine_mut(&mut self) -> &mut Engine {
        &mut self.engine
    }

    pub fn workbook(&self) -> &Workbook {
        &self.workbook
    }

    pub fn root(&self) -> GroupId {
        self.workbook.root()
    }

    pub fn expression(&self, id: ExpressionId) -> Option<&Expression> {
        self.workbook.expression(id)
    }

    pub fn find(&self, path: &str) -> Option<ExpressionId> {
        self.workbook.find(path)
    }

    pub fn add_group(&mut self, parent: GroupId, name: &str) -> Result<GroupId, WorkbookError> {
        self.workbook.add_group(parent, name)
    }

    /// Add an expression and evaluate its initial text.
    ///
    /// The expression exists even when the text is rejected; it then keeps
    /// empty text.
    pub fn add_expression(
        &mut self,
        parent: GroupId,
        name: &str,
        text: &str,
    ) -> Result<(ExpressionId, Edit), WorkbookError> {
        let id = self.workbook.add_expression(parent, name)?;
        let edit = self.edit(id, text)?;
        Ok((id, edit))
    }

    /// Replace the text of `id`.
    ///
    /// A text that fails to evaluate is rejected: text, value and edges stay
    /// as they were. Otherwise the result is committed and pushed through the
    /// dependents.
    pub fn edit(&mut self, id: ExpressionId, text: &str) -> Result<Edit, WorkbookError> {
        self.require(id)?;
        match self.engine.try_evaluate(id, text, &self.workbook) {
            Ok(evaluation) => {
                self.workbook.commit(id, text, evaluation.into());
                let propagation = propagate(&mut self.engine, &mut self.workbook, id);
                Ok(Edit {
                    result: self.result_of(id),
                    propagation: Some(propagation),
                })
            }
            Err(err) => {
                debug!(%id, %err, "Rejected edit");
                Ok(Edit {
                    result: err.into(),
                    propagation: None,
                })
            }
        }
    }

    /// Evaluate text that belongs to no expression against the workbook, as
    /// if it lived in the group at `group_path`. Nothing is stored.
    pub fn evaluate_in(&mut self, group_path: &str, text: &str) -> Result<Evaluation, EvalError> {
        self.engine.try_evaluate_in(group_path, text, &self.workbook)
    }

    /// Lex and resolve `text` as it would be inside `group_path`.
    pub fn tokenize(&self, group_path: &str, text: &str) -> Result<Vec<Token>, EvalError> {
        self.engine.tokenize(text, group_path, &self.workbook)
    }

    /// Evaluate `id` again, re-rolling anything random, and push the new
    /// value through the dependents.
    pub fn demand(&mut self, id: ExpressionId) -> Result<Edit, WorkbookError> {
        let text = self.require(id)?.text.clone();
        match self.engine.try_reevaluate(id, &self.workbook) {
            Ok(evaluation) => self.workbook.commit(id, &text, evaluation.into()),
            Err(err) => self.workbook.record_failure(id, err.into()),
        }
        let propagation = propagate(&mut self.engine, &mut self.workbook, id);
        Ok(Edit {
            result: self.result_of(id),
            propagation: Some(propagation),
        })
    }

    /// Rename an expression and rewrite references to it. Returns the
    /// expressions whose text was rewritten.
    pub fn rename_expression(
        &mut self,
        id: ExpressionId,
        name: &str,
    ) -> Result<Vec<ExpressionId>, WorkbookError> {
        self.relocate(Entity::Expression(id), |wb| wb.rename_expression(id, name))
    }

    pub fn move_expression(
        &mut self,
        id: ExpressionId,
        parent: GroupId,
    ) -> Result<Vec<ExpressionId>, WorkbookError> {
        self.relocate(Entity::Expression(id), |wb| wb.move_expression(id, parent))
    }

    pub fn rename_group(
        &mut self,
        id: GroupId,
        name: &str,
    ) -> Result<Vec<ExpressionId>, WorkbookError> {
        self.relocate(Entity::Group(id), |wb| wb.rename_group(id, name))
    }

    pub fn move_group(
        &mut self,
        id: GroupId,
        parent: GroupId,
    ) -> Result<Vec<ExpressionId>, WorkbookError> {
        self.relocate(Entity::Group(id), |wb| wb.move_group(id, parent))
    }

    /// Delete an expression. Its direct dependents are marked stale and
    /// returned.
    pub fn delete_expression(&mut self, id: ExpressionId) -> Result<Vec<ExpressionId>, WorkbookError> {
        self.require(id)?;
        self.delete(&[id])
    }

    /// Delete a group and everything under it. Dependents outside the group
    /// are marked stale and returned.
    pub fn delete_group(&mut self, id: GroupId) -> Result<Vec<ExpressionId>, WorkbookError> {
        if self.workbook.group(id).is_none() {
            return Err(WorkbookError::UnknownGroup(id));
        }
        if id == self.workbook.root() {
            return Err(WorkbookError::RootGroup);
        }
        let doomed = self.workbook.subtree_expressions(id);
        let stale = self.stale_dependents(&doomed);
        self.workbook.remove_group(id)?;
        self.finish_delete(&doomed, &stale);
        Ok(stale)
    }

    fn delete(&mut self, doomed: &[ExpressionId]) -> Result<Vec<ExpressionId>, WorkbookError> {
        let stale = self.stale_dependents(doomed);
        for id in doomed {
            self.workbook.remove_expression(*id)?;
        }
        self.finish_delete(doomed, &stale);
        Ok(stale)
    }

    fn stale_dependents(&self, doomed: &[ExpressionId]) -> Vec<ExpressionId> {
        let mut stale: Vec<ExpressionId> = doomed
            .iter()
            .flat_map(|id| self.workbook.direct_dependents(*id))
            .filter(|id| !doomed.contains(id))
            .collect();
        stale.sort();
        stale.dedup();
        stale
    }

    fn finish_delete(&mut self, doomed: &[ExpressionId], stale: &[ExpressionId]) {
        for id in doomed {
            self.engine.forget(*id);
        }
        // Their snapshots hold the deleted ids; the next evaluation must
        // resolve paths again.
        for id in stale {
            self.workbook.mark_stale(*id);
            self.engine.forget(*id);
        }
        debug!(deleted = doomed.len(), stale = stale.len(), "Deleted expressions");
    }

    /// Apply a path change and rewrite the reference text it affects.
    fn relocate(
        &mut self,
        entity: Entity,
        change: impl FnOnce(&mut Workbook) -> Result<(), WorkbookError>,
    ) -> Result<Vec<ExpressionId>, WorkbookError> {
        let from = self.path_of(entity)?;
        let moved = match entity {
            Entity::Expression(id) => vec![id],
            Entity::Group(id) => self.workbook.subtree_expressions(id),
        };
        let owners = self.owners(&moved);
        let old_groups = self.group_paths(&owners);
        change(&mut self.workbook)?;
        let to = self.path_of(entity)?;
        Ok(self.rewrite(&owners, &old_groups, &from, &to))
    }

    fn path_of(&self, entity: Entity) -> Result<String, WorkbookError> {
        match entity {
            Entity::Expression(id) => self
                .workbook
                .expression_path(id)
                .ok_or(WorkbookError::UnknownExpression(id)),
            Entity::Group(id) => self
                .workbook
                .group(id)
                .map(|_| self.workbook.group_path(id))
                .ok_or(WorkbookError::UnknownGroup(id)),
        }
    }

    /// Texts that may mention a moved expression: the moved expressions
    /// themselves and their direct dependents.
    fn owners(&self, moved: &[ExpressionId]) -> Vec<ExpressionId> {
        let mut owners: Vec<ExpressionId> = moved
            .iter()
            .copied()
            .chain(moved.iter().flat_map(|id| self.workbook.direct_dependents(*id)))
            .collect();
        owners.sort();
        owners.dedup();
        owners
    }

    fn group_paths(&self, owners: &[ExpressionId]) -> Vec<String> {
        owners
            .iter()
            .map(|id| self.workbook.current_group_path(*id))
            .collect()
    }

    fn rewrite(
        &mut self,
        owners: &[ExpressionId],
        old_groups: &[String],
        from: &str,
        to: &str,
    ) -> Vec<ExpressionId> {
        let mut rewritten = Vec::new();
        if from == to {
            return rewritten;
        }
        for (id, old_group) in owners.iter().zip(old_groups) {
            let Some(expression) = self.workbook.expression(*id) else {
                warn!(%id, "Lost expression while rewriting references");
                continue;
            };
            let new_group = self.workbook.current_group_path(*id);
            let Some(text) = rewrite_references(&expression.text, old_group, &new_group, from, to)
            else {
                continue;
            };
            debug!(%id, %text, "Rewrote references");
            self.engine.retext(*id, &text);
            self.workbook.rewrite_text(*id, text);
            rewritten.push(*id);
        }
        rewritten
    }

    fn require(&self, id: ExpressionId) -> Result<&Expression, WorkbookError> {
        self.workbook
            .expression(id)
            .ok_or(WorkbookError::UnknownExpression(id))
    }

    fn result_of(&self, id: ExpressionId) -> ParseResult {
        self.workbook
            .expression(id)
            .map(|e| e.result.clone())
            .unwrap_or_default()
    }
}
