//! Evaluation errors.
//!
//! Every failure of a single evaluation attempt is an [`EvalError`]. None of
//! them are fatal: the engine folds the error into a `ParseResult` whose
//! `error_text` is the `Display` form.

use core::ops::Range;

use crate::casting::CastError;
use crate::functions::FunctionError;
use crate::lexer::LexError;
use crate::model::ExpressionId;
use crate::token::ReferenceError;
use crate::values::DecodeError;

#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum EvalError {
    #[error(transparent)]
    Lex(#[from] LexError),

    #[error(transparent)]
    Reference(#[from] ReferenceError),

    #[error(transparent)]
    Function(#[from] FunctionError),

    #[error(transparent)]
    Cast(#[from] CastError),

    #[error(transparent)]
    Decode(#[from] DecodeError),

    #[error("unknown token \"{text}\"")]
    UnknownToken { text: String, span: Range<usize> },

    #[error("expression {id} references itself")]
    SelfReference { id: ExpressionId },

    #[error("cyclic dependency: {id} is already used by {}", ids(.conflicts))]
    CyclicDependency {
        id: ExpressionId,
        conflicts: Vec<ExpressionId>,
    },

    #[error("unbalanced parentheses: \")\" without a matching \"(\"")]
    UnbalancedParens { span: Range<usize> },

    #[error("unclosed parenthesis")]
    UnclosedParen { span: Range<usize> },

    #[error("comma outside of a function call")]
    MisplacedComma { span: Range<usize> },

    #[error("\"{name}\" needs {expected} operand(s), found {found}")]
    StackUnderflow {
        name: String,
        expected: usize,
        found: usize,
        span: Range<usize>,
    },

    #[error("\"{name}\" does not take a fixed number of operands")]
    ArityUnknown { name: String, span: Range<usize> },

    #[error("expression produced no value")]
    EmptyOutput,

    #[error("expression produced an empty value")]
    NullResult,

    #[error("{count} values are not joined by any operator")]
    ExtraOperands { count: usize },

    #[error("references nest deeper than {max_depth}")]
    DepthExceeded { depth: usize, max_depth: usize },
}

impl EvalError {
    /// Source range the error points at, when there is one.
    pub fn span(&self) -> Option<Range<usize>> {
        match self {
            EvalError::Lex(err) => {
                let residue = err.residue();
                let start = residue.first()?.span.start;
                let end = residue.last()?.span.end;
                Some(start..end)
            }
            EvalError::Reference(ReferenceError::Unresolved { span, .. })
            | EvalError::UnknownToken { span, .. }
            | EvalError::UnbalancedParens { span }
            | EvalError::UnclosedParen { span }
            | EvalError::MisplacedComma { span }
            | EvalError::StackUnderflow { span, .. }
            | EvalError::ArityUnknown { span, .. } => Some(span.clone()),
            _ => None,
        }
    }

    /// Short code identifying the error family, for documentation lookup.
    pub fn code(&self) -> &'static str {
        match self {
            EvalError::Lex(_) | EvalError::UnknownToken { .. } | EvalError::Decode(_) => "L001",
            EvalError::Reference(_) => "R001",
            EvalError::SelfReference { .. } => "R002",
            EvalError::CyclicDependency { .. } => "R003",
            EvalError::DepthExceeded { .. } => "R004",
            EvalError::UnbalancedParens { .. }
            | EvalError::UnclosedParen { .. }
            | EvalError::MisplacedComma { .. } => "P001",
            EvalError::StackUnderflow { .. }
            | EvalError::ArityUnknown { .. }
            | EvalError::EmptyOutput
            | EvalError::NullResult
            | EvalError::ExtraOperands { .. } => "P002",
            EvalError::Function(FunctionError::TypeMismatch { .. }) | EvalError::Cast(_) => "F001",
            EvalError::Function(FunctionError::RuntimeFault { .. }) => "F002",
        }
    }
}

fn ids(ids: &[ExpressionId]) -> String {
    ids.iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
