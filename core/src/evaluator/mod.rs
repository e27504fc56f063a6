//! Operator-precedence evaluator.
//!
//! There is no syntax tree: [`reduce`] walks the token sequence once with an
//! output queue and an operator stack and applies functions as it reduces.
//! The engine (see [`crate::api::Engine`]) drives lexing, resolution and
//! reference refreshing around it.
//!
//! ## Example
//!
//! ```
//! use reckon_core::api::{Engine, EngineOptions};
//! use reckon_core::source::Detached;
//! use reckon_core::values::Value;
//!
//! let mut engine = Engine::new(EngineOptions::default(), |_| {});
//! let result = engine.try_evaluate_in("", "2 + 3 * 4", &Detached).unwrap();
//! assert_eq!(result.value, Value::Integer(14));
//! assert!(result.is_static);
//! ```

mod error;
mod reduce;


pub use error::EvalError;
pub use reduce::reduce;

use crate::model::{ExpressionId, ParseResult};
use crate::token::{Reference, Token, TokenKind};
use crate::values::Value;

/// Successful outcome of one evaluation.
#[derive(Debug, Clone, PartialEq)]
pub struct Evaluation {
    pub value: Value,
    pub is_static: bool,
    pub global: Vec<ExpressionId>,
    pub local: Vec<ExpressionId>,
}

impl Evaluation {
    /// Result of blank text.
    pub fn empty() -> Self {
        Self {
            value: Value::None,
            is_static: true,
            global: Vec::new(),
            local: Vec::new(),
        }
    }

    pub fn dependencies(&self) -> impl Iterator<Item = ExpressionId> + '_ {
        self.global.iter().chain(&self.local).copied()
    }
}

impl From<Evaluation> for ParseResult {
    fn from(evaluation: Evaluation) -> Self {
        ParseResult {
            value: evaluation.value,
            is_static: evaluation.is_static,
            global: evaluation.global,
            local: evaluation.local,
            error_text: String::new(),
        }
    }
}

impl From<EvalError> for ParseResult {
    fn from(err: EvalError) -> Self {
        ParseResult::failure(err.to_string())
    }
}

/// Supplies the current value of a referenced expression.
pub trait ReferenceValues {
    /// The target's value and whether it is static.
    fn current(&mut self, reference: &Reference) -> Result<(Value, bool), EvalError>;
}

/// Copy of `token` with its reference value pulled fresh from `values`.
///
/// Non-reference tokens are returned unchanged.
pub fn refresh_reference(
    token: &Token,
    values: &mut dyn ReferenceValues,
) -> Result<Token, EvalError> {
    let TokenKind::Reference(reference) = &token.kind else {
        return Ok(token.clone());
    };
    let (value, is_static) = values.current(reference)?;
    Ok(Token {
        text: token.text.clone(),
        span: token.span.clone(),
        kind: TokenKind::Reference(Reference {
            value,
            is_static,
            ..reference.clone()
        }),
    })
}
