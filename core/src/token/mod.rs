//! Semantic tokens.
//!
//! A [`Token`] is a plain value: the lexeme it came from plus what it means.
//! Reference tokens carry the last value pulled from their target; refreshing
//! that value is the evaluator's job (see
//! [`crate::evaluator::refresh_reference`]).

mod resolver;

use core::ops::Range;
use std::sync::Arc;

use crate::functions::Function;
use crate::model::ExpressionId;
use crate::path::ReferencePath;
use crate::values::{LiteralKind, Value};

pub use resolver::{Class, ReferenceError, classify, resolve};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Punct {
    Open,
    Close,
    Comma,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Reference {
    pub target: ExpressionId,
    pub path: ReferencePath,
    /// Absolute path the reference resolved through.
    pub qualified: String,
    pub value: Value,
    pub is_static: bool,
}

#[derive(Debug, Clone)]
pub enum TokenKind {
    Literal(Value),
    Operator(Arc<Function>),
    Function(Arc<Function>),
    Punctuation(Punct),
    /// Text between `["` and `"]`.
    Comment(String),
    Reference(Reference),
}

#[derive(Debug, Clone)]
pub struct Token {
    pub text: String,
    pub span: Range<usize>,
    pub kind: TokenKind,
}

impl Token {
    pub fn literal_kind(&self) -> LiteralKind {
        self.value().map_or(LiteralKind::None, Value::kind)
    }

    pub fn value(&self) -> Option<&Value> {
        match &self.kind {
            TokenKind::Literal(value) => Some(value),
            TokenKind::Reference(reference) => Some(&reference.value),
            _ => None,
        }
    }

    /// Purity of this token alone. Only impure functions and references to
    /// impure expressions are dynamic.
    pub fn is_static(&self) -> bool {
        match &self.kind {
            TokenKind::Operator(function) | TokenKind::Function(function) => function.is_static(),
            TokenKind::Reference(reference) => reference.is_static,
            _ => true,
        }
    }

    /// The function behind an operator or function token.
    pub fn callable(&self) -> Option<&Arc<Function>> {
        match &self.kind {
            TokenKind::Operator(function) | TokenKind::Function(function) => Some(function),
            _ => None,
        }
    }

    pub fn reference(&self) -> Option<&Reference> {
        match &self.kind {
            TokenKind::Reference(reference) => Some(reference),
            _ => None,
        }
    }

    pub fn is_comment(&self) -> bool {
        matches!(self.kind, TokenKind::Comment(_))
    }

    pub fn is_punct(&self, punct: Punct) -> bool {
        matches!(self.kind, TokenKind::Punctuation(p) if p == punct)
    }
}

/// Targets of the reference tokens, split by locality, each listed once in
/// first-seen order.
pub fn dependencies(tokens: &[Token]) -> (Vec<ExpressionId>, Vec<ExpressionId>) {
    let mut global = Vec::new();
    let mut local = Vec::new();
    for reference in tokens.iter().filter_map(Token::reference) {
        let list = if reference.path.local {
            &mut local
        } else {
            &mut global
        };
        if !list.contains(&reference.target) {
            list.push(reference.target);
        }
    }
    (global, local)
}
