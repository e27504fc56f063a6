use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::ExpressionStore;
use crate::model::{Expression, ExpressionId, Group, GroupId, ParseResult};
use crate::path;
use crate::source::ExpressionSource;

/// In-memory tree of groups and expressions with its dependency index.
///
/// Names are unique among siblings of the same kind, so a group and an
/// expression in the same parent may share a name.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Workbook {
    root: GroupId,
    next_id: u64,
    groups: BTreeMap<GroupId, Group>,
    expressions: BTreeMap<ExpressionId, Expression>,
    child_groups: BTreeMap<GroupId, BTreeMap<String, GroupId>>,
    child_expressions: BTreeMap<GroupId, BTreeMap<String, ExpressionId>>,
    /// `id -> expressions id references`.
    references: BTreeMap<ExpressionId, BTreeSet<ExpressionId>>,
    /// `id -> expressions referencing id`.
    dependents: BTreeMap<ExpressionId, BTreeSet<ExpressionId>>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum WorkbookError {
    #[error("invalid name \"{0}\": use letters, digits, '-' and '_'")]
    InvalidName(String),
    #[error("\"{name}\" already exists in \"{parent}\"")]
    Duplicate { name: String, parent: String },
    #[error("group {0} does not exist")]
    UnknownGroup(GroupId),
    #[error("expression {0} does not exist")]
    UnknownExpression(ExpressionId),
    #[error("group {0} cannot be moved into its own subtree")]
    MoveIntoSelf(GroupId),
    #[error("the root group cannot be renamed, moved or removed")]
    RootGroup,
}

impl Default for Workbook {
    fn default() -> Self {
        Self::new()
    }
}

impl Workbook {
    pub fn new() -> Self {
        let root = GroupId(0);
        Self {
            root,
            next_id: 1,
            groups: BTreeMap::from([(
                root,
                Group {
                    id: root,
                    parent: None,
                    name: String::new(),
                    template: None,
                },
            )]),
            expressions: BTreeMap::new(),
            child_groups: BTreeMap::new(),
            child_expressions: BTreeMap::new(),
            references: BTreeMap::new(),
            dependents: BTreeMap::new(),
        }
    }

    pub fn root(&self) -> GroupId {
        self.root
    }

    pub fn group(&self, id: GroupId) -> Option<&Group> {
        self.groups.get(&id)
    }

    pub fn expression(&self, id: ExpressionId) -> Option<&Expression> {
        self.expressions.get(&id)
    }

    pub fn expressions(&self) -> impl Iterator<Item = &Expression> {
        self.expressions.values()
    }

    /// Child groups and expressions of `id`, each sorted by name.
    pub fn children(&self, id: GroupId) -> (Vec<GroupId>, Vec<ExpressionId>) {
        let groups = self
            .child_groups
            .get(&id)
            .map(|c| c.values().copied().collect())
            .unwrap_or_default();
        let expressions = self
            .child_expressions
            .get(&id)
            .map(|c| c.values().copied().collect())
            .unwrap_or_default();
        (groups, expressions)
    }

    pub fn add_group(&mut self, parent: GroupId, name: &str) -> Result<GroupId, WorkbookError> {
        self.check_group(parent)?;
        validate_name(name)?;
        self.check_free(parent, name, |wb| &wb.child_groups)?;
        let id = GroupId(self.allocate());
        self.groups.insert(
            id,
            Group {
                id,
                parent: Some(parent),
                name: name.to_string(),
                template: None,
            },
        );
        self.child_groups
            .entry(parent)
            .or_default()
            .insert(name.to_string(), id);
        debug!(%id, path = %self.group_path(id), "Added group");
        Ok(id)
    }

    /// Add an expression with empty text.
    pub fn add_expression(
        &mut self,
        parent: GroupId,
        name: &str,
    ) -> Result<ExpressionId, WorkbookError> {
        self.check_group(parent)?;
        validate_name(name)?;
        self.check_free(parent, name, |wb| &wb.child_expressions)?;
        let id = ExpressionId(self.allocate());
        self.expressions.insert(
            id,
            Expression {
                id,
                parent,
                name: name.to_string(),
                text: String::new(),
                updated: true,
                result: ParseResult::default(),
            },
        );
        self.child_expressions
            .entry(parent)
            .or_default()
            .insert(name.to_string(), id);
        Ok(id)
    }

    /// Absolute path of a group; `""` for the root.
    pub fn group_path(&self, id: GroupId) -> String {
        let mut names = Vec::new();
        let mut current = self.groups.get(&id);
        while let Some(group) = current {
            let Some(parent) = group.parent else { break };
            names.push(group.name.as_str());
            current = self.groups.get(&parent);
        }
        names
            .iter()
            .rev()
            .fold(String::new(), |acc, name| path::join(&acc, name))
    }

    pub fn expression_path(&self, id: ExpressionId) -> Option<String> {
        let expression = self.expressions.get(&id)?;
        Some(path::join(&self.group_path(expression.parent), &expression.name))
    }

    /// Find the group at an absolute path. `""` and `"/"` are the root.
    pub fn find_group(&self, path: &str) -> Option<GroupId> {
        path.split('/')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |group, name| {
                self.child_groups.get(&group)?.get(name).copied()
            })
    }

    /// Find the expression at an absolute path.
    pub fn find(&self, path: &str) -> Option<ExpressionId> {
        let (parent, name) = path.trim_end_matches('/').rsplit_once('/')?;
        let group = self.find_group(parent)?;
        self.child_expressions.get(&group)?.get(name).copied()
    }

    pub fn rename_group(&mut self, id: GroupId, name: &str) -> Result<(), WorkbookError> {
        let parent = self.non_root_parent(id)?;
        validate_name(name)?;
        let old = self.groups[&id].name.clone();
        if old == name {
            return Ok(());
        }
        self.check_free(parent, name, |wb| &wb.child_groups)?;
        let children = self.child_groups.entry(parent).or_default();
        children.remove(&old);
        children.insert(name.to_string(), id);
        if let Some(group) = self.groups.get_mut(&id) {
            group.name = name.to_string();
        }
        Ok(())
    }

    pub fn rename_expression(&mut self, id: ExpressionId, name: &str) -> Result<(), WorkbookError> {
        let expression = self
            .expressions
            .get(&id)
            .ok_or(WorkbookError::UnknownExpression(id))?;
        let (parent, old) = (expression.parent, expression.name.clone());
        validate_name(name)?;
        if old == name {
            return Ok(());
        }
        self.check_free(parent, name, |wb| &wb.child_expressions)?;
        let children = self.child_expressions.entry(parent).or_default();
        children.remove(&old);
        children.insert(name.to_string(), id);
        if let Some(expression) = self.expressions.get_mut(&id) {
            expression.name = name.to_string();
        }
        Ok(())
    }

    pub fn move_group(&mut self, id: GroupId, new_parent: GroupId) -> Result<(), WorkbookError> {
        let parent = self.non_root_parent(id)?;
        self.check_group(new_parent)?;
        if self.is_within(new_parent, id) {
            return Err(WorkbookError::MoveIntoSelf(id));
        }
        if parent == new_parent {
            return Ok(());
        }
        let name = self.groups[&id].name.clone();
        self.check_free(new_parent, &name, |wb| &wb.child_groups)?;
        if let Some(children) = self.child_groups.get_mut(&parent) {
            children.remove(&name);
        }
        self.child_groups
            .entry(new_parent)
            .or_default()
            .insert(name, id);
        if let Some(group) = self.groups.get_mut(&id) {
            group.parent = Some(new_parent);
        }
        Ok(())
    }

    pub fn move_expression(
        &mut self,
        id: ExpressionId,
        new_parent: GroupId,
    ) -> Result<(), WorkbookError> {
        let expression = self
            .expressions
            .get(&id)
            .ok_or(WorkbookError::UnknownExpression(id))?;
        let (parent, name) = (expression.parent, expression.name.clone());
        self.check_group(new_parent)?;
        if parent == new_parent {
            return Ok(());
        }
        self.check_free(new_parent, &name, |wb| &wb.child_expressions)?;
        if let Some(children) = self.child_expressions.get_mut(&parent) {
            children.remove(&name);
        }
        self.child_expressions
            .entry(new_parent)
            .or_default()
            .insert(name, id);
        if let Some(expression) = self.expressions.get_mut(&id) {
            expression.parent = new_parent;
        }
        Ok(())
    }

    /// Remove an expression and every edge touching it.
    pub fn remove_expression(&mut self, id: ExpressionId) -> Result<Expression, WorkbookError> {
        let expression = self
            .expressions
            .remove(&id)
            .ok_or(WorkbookError::UnknownExpression(id))?;
        if let Some(children) = self.child_expressions.get_mut(&expression.parent) {
            children.remove(&expression.name);
        }
        self.set_references(id, BTreeSet::new());
        self.references.remove(&id);
        for dependent in self.dependents.remove(&id).unwrap_or_default() {
            if let Some(targets) = self.references.get_mut(&dependent) {
                targets.remove(&id);
            }
        }
        Ok(expression)
    }

    /// Remove a group with everything under it. Returns the removed
    /// expressions.
    pub fn remove_group(&mut self, id: GroupId) -> Result<Vec<Expression>, WorkbookError> {
        let parent = self.non_root_parent(id)?;
        let name = self.groups[&id].name.clone();
        let mut removed = Vec::new();
        for expression in self.subtree_expressions(id) {
            removed.push(self.remove_expression(expression)?);
        }
        let mut doomed = vec![id];
        let mut index = 0;
        while let Some(&group) = doomed.get(index) {
            if let Some(children) = self.child_groups.remove(&group) {
                doomed.extend(children.into_values());
            }
            self.child_expressions.remove(&group);
            index += 1;
        }
        for group in &doomed {
            self.groups.remove(group);
        }
        if let Some(children) = self.child_groups.get_mut(&parent) {
            children.remove(&name);
        }
        debug!(%id, %name, groups = doomed.len(), expressions = removed.len(), "Removed group");
        Ok(removed)
    }

    /// Expressions anywhere under `id`, sorted by id.
    pub fn subtree_expressions(&self, id: GroupId) -> Vec<ExpressionId> {
        let mut found: Vec<ExpressionId> = self
            .expressions
            .values()
            .filter(|e| self.is_within(e.parent, id))
            .map(|e| e.id)
            .collect();
        found.sort();
        found
    }

    /// Whether `group` is `ancestor` or lies under it.
    pub fn is_within(&self, group: GroupId, ancestor: GroupId) -> bool {
        let mut current = Some(group);
        while let Some(id) = current {
            if id == ancestor {
                return true;
            }
            current = self.groups.get(&id).and_then(|g| g.parent);
        }
        false
    }

    fn allocate(&mut self) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        id
    }

    fn check_group(&self, id: GroupId) -> Result<(), WorkbookError> {
        if self.groups.contains_key(&id) {
            Ok(())
        } else {
            Err(WorkbookError::UnknownGroup(id))
        }
    }

    fn non_root_parent(&self, id: GroupId) -> Result<GroupId, WorkbookError> {
        let group = self.groups.get(&id).ok_or(WorkbookError::UnknownGroup(id))?;
        group.parent.ok_or(WorkbookError::RootGroup)
    }

    fn check_free<T>(
        &self,
        parent: GroupId,
        name: &str,
        siblings: impl Fn(&Self) -> &BTreeMap<GroupId, BTreeMap<String, T>>,
    ) -> Result<(), WorkbookError> {
        let taken = siblings(self)
            .get(&parent)
            .is_some_and(|children| children.contains_key(name));
        if taken {
            return Err(WorkbookError::Duplicate {
                name: name.to_string(),
                parent: self.group_path(parent),
            });
        }
        Ok(())
    }

    fn set_references(&mut self, id: ExpressionId, targets: BTreeSet<ExpressionId>) {
        let old = self.references.insert(id, targets.clone()).unwrap_or_default();
        for target in old.difference(&targets) {
            if let Some(set) = self.dependents.get_mut(target) {
                set.remove(&id);
                if set.is_empty() {
                    self.dependents.remove(target);
                }
            }
        }
        for target in targets.difference(&old) {
            self.dependents.entry(*target).or_default().insert(id);
        }
    }
}

fn validate_name(name: &str) -> Result<(), WorkbookError> {
    let valid = !name.is_empty()
        && name
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(WorkbookError::InvalidName(name.to_string()))
    }
}

impl ExpressionSource for Workbook {
    fn resolve_path(&self, path: &str) -> Option<ExpressionId> {
        self.find(path)
    }

    fn current_group_path(&self, id: ExpressionId) -> String {
        self.expressions
            .get(&id)
            .map(|e| self.group_path(e.parent))
            .unwrap_or_default()
    }

    fn fetch(&self, id: ExpressionId) -> Option<Expression> {
        self.expressions.get(&id).cloned()
    }

    fn overlap(&self, id: ExpressionId, candidates: &[ExpressionId]) -> Vec<ExpressionId> {
        let deep: BTreeSet<ExpressionId> = self.deep_dependents(id).into_iter().collect();
        candidates
            .iter()
            .copied()
            .filter(|candidate| deep.contains(candidate))
            .collect()
    }
}

impl ExpressionStore for Workbook {
    fn direct_dependents(&self, id: ExpressionId) -> Vec<ExpressionId> {
        self.dependents
            .get(&id)
            .map(|set| set.iter().copied().collect())
            .unwrap_or_default()
    }

    fn commit(&mut self, id: ExpressionId, text: &str, result: ParseResult) {
        let targets: BTreeSet<ExpressionId> = result.dependencies().collect();
        let Some(expression) = self.expressions.get_mut(&id) else {
            return;
        };
        expression.text = text.to_string();
        expression.result = result;
        expression.updated = true;
        self.set_references(id, targets);
    }

    fn record_failure(&mut self, id: ExpressionId, result: ParseResult) {
        if let Some(expression) = self.expressions.get_mut(&id) {
            expression.result = result;
            expression.updated = true;
        }
    }

    fn mark_stale(&mut self, id: ExpressionId) {
        if let Some(expression) = self.expressions.get_mut(&id) {
            expression.updated = false;
        }
    }

    fn rewrite_text(&mut self, id: ExpressionId, text: String) {
        if let Some(expression) = self.expressions.get_mut(&id) {
            expression.text = text;
        }
    }
}
