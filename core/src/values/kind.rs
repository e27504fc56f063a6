use core::fmt;
use core::str::FromStr;

use serde::{Deserialize, Serialize};

use super::Value;

/// Kind of a literal value.
///
/// The set is closed: expressions only ever produce one of these four kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum LiteralKind {
    None,
    String,
    Integer,
    Double,
}

impl LiteralKind {
    pub const ALL: [LiteralKind; 4] = [
        LiteralKind::None,
        LiteralKind::String,
        LiteralKind::Integer,
        LiteralKind::Double,
    ];

    /// Stable position of the kind, used by [`crate::casting::signature_hash`].
    pub fn ordinal(self) -> u64 {
        match self {
            LiteralKind::None => 0,
            LiteralKind::String => 1,
            LiteralKind::Integer => 2,
            LiteralKind::Double => 3,
        }
    }

    pub fn can_cast_to(self, target: LiteralKind) -> bool {
        crate::casting::can_cast(self, target)
    }

    /// Decode the textual form of a value of this kind.
    ///
    /// `Integer` parses a signed 64-bit integer, `Double` a float, `String` is
    /// the identity and `None` always yields [`Value::None`].
    pub fn decode(self, text: &str) -> Result<Value, DecodeError> {
        let failed = || DecodeError {
            kind: self,
            text: text.into(),
        };
        match self {
            LiteralKind::None => Ok(Value::None),
            LiteralKind::String => Ok(Value::String(text.into())),
            LiteralKind::Integer => text.trim().parse().map(Value::Integer).map_err(|_| failed()),
            LiteralKind::Double => text.trim().parse().map(Value::Double).map_err(|_| failed()),
        }
    }
}

impl fmt::Display for LiteralKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LiteralKind::None => "None",
            LiteralKind::String => "String",
            LiteralKind::Integer => "Integer",
            LiteralKind::Double => "Double",
        };
        f.write_str(name)
    }
}

impl FromStr for LiteralKind {
    type Err = DecodeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        LiteralKind::ALL
            .into_iter()
            .find(|kind| kind.to_string() == s)
            .ok_or_else(|| DecodeError {
                kind: LiteralKind::None,
                text: s.into(),
            })
    }
}

/// Text that could not be decoded as the requested kind.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("cannot decode \"{text}\" as {kind}")]
pub struct DecodeError {
    pub kind: LiteralKind,
    pub text: String,
}
