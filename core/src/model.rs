//! Records persisted by an expression store.

use core::fmt;

use serde::{Deserialize, Serialize};

use crate::values::{LiteralKind, Value};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ExpressionId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroupId(pub u64);

impl fmt::Display for ExpressionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

impl fmt::Display for GroupId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Outcome of one evaluation, replaced wholesale on every (re)evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParseResult {
    pub value: Value,
    pub is_static: bool,
    /// Targets of absolute references, in first-seen order.
    pub global: Vec<ExpressionId>,
    /// Targets of `..` references, in first-seen order.
    pub local: Vec<ExpressionId>,
    /// Empty on success.
    pub error_text: String,
}

impl Default for ParseResult {
    fn default() -> Self {
        Self {
            value: Value::None,
            is_static: true,
            global: Vec::new(),
            local: Vec::new(),
            error_text: String::new(),
        }
    }
}

impl ParseResult {
    pub fn failure(message: impl Into<String>) -> Self {
        Self {
            error_text: message.into(),
            ..Self::default()
        }
    }

    pub fn kind(&self) -> LiteralKind {
        self.value.kind()
    }

    pub fn is_error(&self) -> bool {
        !self.error_text.trim().is_empty()
    }

    /// Every referenced expression, global ones first.
    pub fn dependencies(&self) -> impl Iterator<Item = ExpressionId> + '_ {
        self.global.iter().chain(&self.local).copied()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EvaluationState {
    Ready,
    Error,
    OutOfDate,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Expression {
    pub id: ExpressionId,
    pub parent: GroupId,
    pub name: String,
    pub text: String,
    /// `false` once an upstream change made the cached result stale.
    pub updated: bool,
    pub result: ParseResult,
}

impl Expression {
    pub fn state(&self) -> EvaluationState {
        if self.result.is_error() {
            EvaluationState::Error
        } else if !self.updated {
            EvaluationState::OutOfDate
        } else {
            EvaluationState::Ready
        }
    }

    /// What a viewer shows for this expression: the error or the value.
    pub fn result_text(&self) -> String {
        if self.result.is_error() {
            self.result.error_text.clone()
        } else {
            self.result.value.to_string()
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Group {
    pub id: GroupId,
    /// `None` only for the root group.
    pub parent: Option<GroupId>,
    pub name: String,
    pub template: Option<String>,
}
