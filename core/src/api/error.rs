//! Diagnostics for displaying evaluation errors.
//!
//! Evaluation errors stay typed inside the engine; hosts that want to point at
//! the offending text convert them to a [`Diagnostic`].

use core::fmt;
use core::ops::Range;

use crate::evaluator::EvalError;
use crate::lexer::LexError;

/// A diagnostic message with source locations.
#[derive(Debug, Clone, PartialEq)]
pub struct Diagnostic {
    pub severity: Severity,

    /// Primary diagnostic message.
    pub message: String,

    /// Source ranges with a short note each. Empty when the error is not
    /// tied to a place in the text.
    pub labels: Vec<(Range<usize>, String)>,

    /// Optional help text suggesting how to fix the issue.
    pub help: Option<String>,

    /// Error code (e.g., "P001") for documentation lookup.
    pub code: &'static str,
}

/// Severity level for diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Severity {
    Error,
    Warning,
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Severity::Error => write!(f, "error"),
            Severity::Warning => write!(f, "warning"),
        }
    }
}

impl EvalError {
    pub fn to_diagnostic(&self) -> Diagnostic {
        let labels = match self {
            EvalError::Lex(LexError::BadInput { residue }) => residue
                .iter()
                .map(|r| (r.span.clone(), "not part of any token".to_string()))
                .collect(),
            other => other
                .span()
                .map(|span| vec![(span, label(other))])
                .unwrap_or_default(),
        };
        Diagnostic {
            severity: Severity::Error,
            message: self.to_string(),
            labels,
            help: help(self),
            code: self.code(),
        }
    }
}

fn label(err: &EvalError) -> String {
    match err {
        EvalError::Reference(_) => "no expression at this path".into(),
        EvalError::UnbalancedParens { .. } => "closes nothing".into(),
        EvalError::UnclosedParen { .. } => "never closed".into(),
        EvalError::MisplacedComma { .. } => "not inside parentheses".into(),
        EvalError::StackUnderflow { .. } => "missing operand".into(),
        _ => "here".into(),
    }
}

fn help(err: &EvalError) -> Option<String> {
    match err {
        EvalError::Lex(_) | EvalError::UnknownToken { .. } => {
            Some("expressions contain numbers, operators, functions and @(path) references".into())
        }
        EvalError::CyclicDependency { .. } => {
            Some("an expression cannot depend on its own dependents".into())
        }
        EvalError::DepthExceeded { .. } => {
            Some("shorten the chain of expressions that use random or roll".into())
        }
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::lex;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_bad_input_labels_each_residue() {
        let err: EvalError = lex("1 ? 2 $").unwrap_err().into();
        let diagnostic = err.to_diagnostic();
        assert_eq!(diagnostic.code, "L001");
        assert_eq!(
            diagnostic.labels.iter().map(|(s, _)| s.clone()).collect::<Vec<_>>(),
            vec![2..3, 6..7]
        );
        assert!(diagnostic.help.is_some());
    }

    #[test]
    fn test_errors_without_span_have_no_labels() {
        let diagnostic = EvalError::EmptyOutput.to_diagnostic();
        assert_eq!(diagnostic.severity, Severity::Error);
        assert!(diagnostic.labels.is_empty());
        assert_eq!(diagnostic.message, "expression produced no value");
    }
}
