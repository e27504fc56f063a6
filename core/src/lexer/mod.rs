//! Splits expression text into lexemes.
//!
//! The grammar is a fixed set of patterns: references `@( [..]path )`,
//! function keywords, single character operators, `( ) ,`, bracketed
//! comments `["..."]`, doubles and integers. Whitespace separates lexemes and
//! anything else is collected as residue and reported as
//! [`LexError::BadInput`]. A lexing pass either covers the whole input or
//! fails.

mod error;

#[cfg(test)]
mod lexer_test;

use core::ops::Range;

use logos::Logos;
use tracing::debug;

pub use error::{LexError, Residue};

use crate::functions::{STANDARD_KEYWORDS, UNARY_MINUS};

#[derive(Logos, Debug, Clone, Copy, PartialEq, Eq)]
#[logos(skip r"[ \t\r\n\f]+")]
enum Pattern {
    #[regex(r"@\([ \t\r\n\f]*(\.\.)?[a-zA-Z0-9/_-]+[ \t\r\n\f]*\)")]
    Reference,

    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Word,

    #[regex(r"[-+*/%^]")]
    Operator,

    #[token("(")]
    #[token(")")]
    #[token(",")]
    Punctuation,

    #[regex(r#"\["([^"\n]|"+[^"\]\n])*"+\]"#)]
    Comment,

    #[regex(r"[0-9]+\.[0-9]+")]
    Double,

    // An integer never swallows a fraction: `1.5` is a double, `1.` leaves `.`
    // behind as residue.
    #[regex(r"[0-9]+")]
    Integer,
}

impl Pattern {
    fn is_number(self) -> bool {
        matches!(self, Pattern::Integer | Pattern::Double)
    }
}

/// One matched substring of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lexeme {
    pub text: String,
    pub span: Range<usize>,
}

impl Lexeme {
    fn new(source: &str, span: Range<usize>) -> Self {
        Self {
            text: source[span.clone()].to_string(),
            span,
        }
    }
}

/// Lex `source` accepting only the standard function keywords.
pub fn lex(source: &str) -> Result<Vec<Lexeme>, LexError> {
    lex_with(source, |word| STANDARD_KEYWORDS.contains(&word))
}

/// Lex `source`, accepting a word only if `is_function` knows it.
///
/// A standalone `-` becomes the unary marker when it starts the input or
/// follows `(`, `,` or another operator. A unary marker directly in front of
/// a number is folded into a negative literal.
pub fn lex_with(
    source: &str,
    is_function: impl Fn(&str) -> bool,
) -> Result<Vec<Lexeme>, LexError> {
    let mut matched: Vec<(Pattern, Range<usize>)> = Vec::new();
    let mut residue: Vec<Residue> = Vec::new();

    for (result, span) in Pattern::lexer(source).spanned() {
        match result {
            Ok(Pattern::Word) if !is_function(&source[span.clone()]) => {
                push_residue(&mut residue, source, span)
            }
            Ok(pattern) => matched.push((pattern, span)),
            Err(()) => push_residue(&mut residue, source, span),
        }
    }

    if !residue.is_empty() {
        debug!(?residue, "Rejected input");
        return Err(LexError::BadInput { residue });
    }

    let mut lexemes: Vec<Lexeme> = Vec::with_capacity(matched.len());
    let mut iter = matched.into_iter().peekable();
    while let Some((pattern, span)) = iter.next() {
        let unary = pattern == Pattern::Operator
            && &source[span.clone()] == "-"
            && lexemes.last().is_none_or(|prev| opens_operand(&prev.text));
        if !unary {
            lexemes.push(Lexeme::new(source, span));
            continue;
        }
        match iter.peek() {
            Some((next, number)) if next.is_number() => {
                let folded = span.start..number.end;
                lexemes.push(Lexeme {
                    text: format!("-{}", &source[number.clone()]),
                    span: folded,
                });
                iter.next();
            }
            _ => lexemes.push(Lexeme {
                text: UNARY_MINUS.to_string(),
                span,
            }),
        }
    }

    debug!(count = lexemes.len(), "Lexed expression");
    Ok(lexemes)
}

/// Every reference substring of `source`, with its byte range.
///
/// Unlike [`lex`] this never fails: unmatched text is skipped, so references
/// can be rewritten inside text that does not lex cleanly.
pub fn references(source: &str) -> impl Iterator<Item = (Range<usize>, &str)> {
    Pattern::lexer(source)
        .spanned()
        .filter(|(result, _)| *result == Ok(Pattern::Reference))
        .map(move |(_, span)| (span.clone(), &source[span]))
}

/// Whether an operand is expected after a lexeme with this text.
fn opens_operand(previous: &str) -> bool {
    matches!(
        previous,
        "(" | "," | "+" | "-" | "*" | "/" | "%" | "^" | UNARY_MINUS
    )
}

fn push_residue(residue: &mut Vec<Residue>, source: &str, span: Range<usize>) {
    if let Some(last) = residue.last_mut() {
        if last.span.end == span.start {
            last.span.end = span.end;
            last.text = source[last.span.clone()].to_string();
            return;
        }
    }
    residue.push(Residue {
        text: source[span.clone()].to_string(),
        span,
    });
}
