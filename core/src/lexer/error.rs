use core::fmt;
use core::ops::Range;

/// Unmatched text left over after lexing.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Residue {
    pub text: String,
    pub span: Range<usize>,
}

impl fmt::Display for Residue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "\"{}\"", self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LexError {
    #[error("bad input: {}", list(.residue))]
    BadInput { residue: Vec<Residue> },
}

impl LexError {
    pub fn residue(&self) -> &[Residue] {
        match self {
            LexError::BadInput { residue } => residue,
        }
    }
}

fn list(residue: &[Residue]) -> String {
    residue
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join(", ")
}
