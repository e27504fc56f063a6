use std::sync::Arc;

use tracing::trace;

use super::EvalError;
use crate::functions::{Associativity, CallContext, Function};
use crate::token::{Punct, Token, TokenKind};
use crate::values::Value;

/// Run the reduction pass over resolved tokens.
///
/// Operators are only ever pushed; they are reduced when a comma, a closing
/// parenthesis or the end of input unwinds the stack. Function tokens are the
/// only ones compared against the stack top. So `10-2-3` is `10-(2-3)` and
/// `2*3+4` is `2*(3+4)`.
pub fn reduce(tokens: &[Token], ctx: &mut CallContext<'_>) -> Result<Value, EvalError> {
    if tokens.iter().all(Token::is_comment) {
        return Ok(Value::None);
    }

    let mut output: Vec<Value> = Vec::new();
    let mut stack: Vec<&Token> = Vec::new();

    for token in tokens {
        match &token.kind {
            TokenKind::Literal(value) => output.push(value.clone()),
            TokenKind::Reference(reference) => output.push(reference.value.clone()),
            TokenKind::Comment(_) => {}
            TokenKind::Operator(_) | TokenKind::Punctuation(Punct::Open) => stack.push(token),
            TokenKind::Punctuation(Punct::Comma) => loop {
                match stack.last().copied() {
                    None => {
                        return Err(EvalError::MisplacedComma {
                            span: token.span.clone(),
                        });
                    }
                    Some(top) if top.is_punct(Punct::Open) => break,
                    Some(_) => pop_and_apply(&mut stack, &mut output, ctx)?,
                }
            },
            TokenKind::Punctuation(Punct::Close) => {
                loop {
                    match stack.last().copied() {
                        None => {
                            return Err(EvalError::UnbalancedParens {
                                span: token.span.clone(),
                            });
                        }
                        Some(top) if top.is_punct(Punct::Open) => break,
                        Some(_) => pop_and_apply(&mut stack, &mut output, ctx)?,
                    }
                }
                stack.pop();
                if stack
                    .last()
                    .is_some_and(|top| matches!(top.kind, TokenKind::Function(_)))
                {
                    pop_and_apply(&mut stack, &mut output, ctx)?;
                }
            }
            TokenKind::Function(incoming) => {
                while let Some(top) = stack.last().copied() {
                    let TokenKind::Function(current) = &top.kind else {
                        break;
                    };
                    if !yields_to(current, incoming) {
                        break;
                    }
                    pop_and_apply(&mut stack, &mut output, ctx)?;
                }
                stack.push(token);
            }
        }
    }

    while let Some(top) = stack.last().copied() {
        if top.is_punct(Punct::Open) {
            return Err(EvalError::UnclosedParen {
                span: top.span.clone(),
            });
        }
        pop_and_apply(&mut stack, &mut output, ctx)?;
    }

    match output.len() {
        0 => Err(EvalError::EmptyOutput),
        1 => match output.pop() {
            Some(Value::None) | None => Err(EvalError::NullResult),
            Some(value) => Ok(value),
        },
        count => Err(EvalError::ExtraOperands { count }),
    }
}

/// Whether `current`, already on the stack, must be reduced before
/// `incoming` is pushed. Lower ranks bind tighter.
fn yields_to(current: &Arc<Function>, incoming: &Arc<Function>) -> bool {
    current.precedence() < incoming.precedence()
        || (current.precedence() == incoming.precedence()
            && incoming.associativity() == Associativity::LeftToRight)
}

fn pop_and_apply(
    stack: &mut Vec<&Token>,
    output: &mut Vec<Value>,
    ctx: &mut CallContext<'_>,
) -> Result<(), EvalError> {
    let Some(token) = stack.pop() else {
        return Ok(());
    };
    let Some(function) = token.callable() else {
        return Ok(());
    };
    let arity = function
        .parameter_count()
        .ok_or_else(|| EvalError::ArityUnknown {
            name: function.name().to_string(),
            span: token.span.clone(),
        })?;
    if output.len() < arity {
        return Err(EvalError::StackUnderflow {
            name: function.name().to_string(),
            expected: arity,
            found: output.len(),
            span: token.span.clone(),
        });
    }
    let args = output.split_off(output.len() - arity);
    let value = function.apply(&args, ctx)?;
    trace!(function = function.name(), %value, "Reduced");
    output.push(value);
    Ok(())
}
