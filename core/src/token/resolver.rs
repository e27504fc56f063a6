use core::ops::Range;

use tracing::trace;

use super::{Punct, Reference, Token, TokenKind};
use crate::evaluator::EvalError;
use crate::functions::{FunctionRegistry, UNARY_MINUS};
use crate::lexer::Lexeme;
use crate::model::ExpressionId;
use crate::path::{self, ReferencePath};
use crate::source::ExpressionSource;
use crate::values::{LiteralKind, Value};

/// Grammar class of a single lexeme.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Class {
    Punctuation,
    Comment,
    Operator,
    Function,
    Literal(LiteralKind),
    Reference,
}

/// Classify `text`, checking classes in priority order: punctuation,
/// comment, operator, function keyword, literal, reference.
pub fn classify(text: &str, registry: &FunctionRegistry) -> Option<Class> {
    if matches!(text, "(" | ")" | ",") {
        return Some(Class::Punctuation);
    }
    if text.len() >= 4 && text.starts_with("[\"") && text.ends_with("\"]") {
        return Some(Class::Comment);
    }
    if matches!(text, "+" | "-" | "*" | "/" | "%" | "^" | UNARY_MINUS) {
        return Some(Class::Operator);
    }
    if registry.is_keyword(text) {
        return Some(Class::Function);
    }
    if let Some(kind) = literal_kind(text) {
        return Some(Class::Literal(kind));
    }
    if path::parse_reference(text).is_some() {
        return Some(Class::Reference);
    }
    None
}

/// `-?digits` is an integer, `-?digits.digits` a double.
fn literal_kind(text: &str) -> Option<LiteralKind> {
    let digits = text.strip_prefix('-').unwrap_or(text);
    let all_digits = |s: &str| !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit());
    match digits.split_once('.') {
        None if all_digits(digits) => Some(LiteralKind::Integer),
        Some((whole, fraction)) if all_digits(whole) && all_digits(fraction) => {
            Some(LiteralKind::Double)
        }
        _ => None,
    }
}

/// Turn a lexeme into a token.
///
/// References are looked up through `source` after qualifying local paths
/// against `group_path`. Their value stays empty until the evaluator
/// refreshes it.
pub fn resolve(
    lexeme: &Lexeme,
    registry: &FunctionRegistry,
    source: &dyn ExpressionSource,
    group_path: &str,
) -> Result<Token, EvalError> {
    let text = lexeme.text.as_str();
    let unknown = || EvalError::UnknownToken {
        text: text.to_string(),
        span: lexeme.span.clone(),
    };
    let class = classify(text, registry).ok_or_else(unknown)?;

    let kind = match class {
        Class::Punctuation => TokenKind::Punctuation(match text {
            "(" => Punct::Open,
            ")" => Punct::Close,
            _ => Punct::Comma,
        }),
        Class::Comment => TokenKind::Comment(text[2..text.len() - 2].to_string()),
        Class::Operator => TokenKind::Operator(registry.get(text).ok_or_else(unknown)?),
        Class::Function => TokenKind::Function(registry.get(text).ok_or_else(unknown)?),
        Class::Literal(kind) => TokenKind::Literal(kind.decode(text)?),
        Class::Reference => {
            let path = path::parse_reference(text).ok_or_else(unknown)?;
            TokenKind::Reference(resolve_reference(path, source, group_path, &lexeme.span)?)
        }
    };

    Ok(Token {
        text: text.to_string(),
        span: lexeme.span.clone(),
        kind,
    })
}

fn resolve_reference(
    path: ReferencePath,
    source: &dyn ExpressionSource,
    group_path: &str,
    span: &Range<usize>,
) -> Result<Reference, ReferenceError> {
    let qualified = path.qualify(group_path);
    let target = source
        .resolve_path(&qualified)
        .ok_or_else(|| ReferenceError::Unresolved {
            path: path.display(),
            span: span.clone(),
        })?;
    trace!(%qualified, %target, "Resolved reference");
    Ok(Reference {
        target,
        path,
        qualified,
        value: Value::None,
        is_static: true,
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ReferenceError {
    #[error("cannot find reference \"{path}\"")]
    Unresolved { path: String, span: Range<usize> },
    #[error("referenced expression {id} does not exist")]
    Missing { id: ExpressionId },
    #[error("referenced expression \"{path}\" has an error: {message}")]
    Failed { path: String, message: String },
}
