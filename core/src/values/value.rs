use core::fmt;

use serde::{Deserialize, Serialize};

use super::LiteralKind;

/// A decoded literal.
///
/// The `Display` form is the canonical text of the value and decodes back
/// through [`LiteralKind::decode`]. Doubles always carry a fractional part so
/// that `3.0` is not read back as an integer.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub enum Value {
    #[default]
    None,
    String(String),
    Integer(i64),
    Double(f64),
}

impl Value {
    pub fn kind(&self) -> LiteralKind {
        match self {
            Value::None => LiteralKind::None,
            Value::String(_) => LiteralKind::String,
            Value::Integer(_) => LiteralKind::Integer,
            Value::Double(_) => LiteralKind::Double,
        }
    }

    pub fn is_none(&self) -> bool {
        matches!(self, Value::None)
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            Value::Integer(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_double(&self) -> Option<f64> {
        match self {
            Value::Double(value) => Some(*value),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(value) => Some(value),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::None => Ok(()),
            Value::String(value) => f.write_str(value),
            Value::Integer(value) => write!(f, "{}", value),
            Value::Double(value) => {
                let text = value.to_string();
                if value.is_finite() && !text.contains('.') {
                    write!(f, "{}.0", text)
                } else {
                    f.write_str(&text)
                }
            }
        }
    }
}

impl From<i64> for Value {
    fn from(value: i64) -> Self {
        Value::Integer(value)
    }
}

impl From<f64> for Value {
    fn from(value: f64) -> Self {
        Value::Double(value)
    }
}

impl From<&str> for Value {
    fn from(value: &str) -> Self {
        Value::String(value.into())
    }
}

impl From<String> for Value {
    fn from(value: String) -> Self {
        Value::String(value)
    }
}
