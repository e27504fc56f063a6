//! Casting lattice between literal kinds.
//!
//! Every kind casts to itself, every kind casts to `String` and `Integer`
//! casts to `Double`. No other pair is castable. Casting a whole argument list
//! is all-or-nothing.

use crate::values::{LiteralKind, Value};

/// Check if a value of kind `from` may be used where `to` is expected.
pub fn can_cast(from: LiteralKind, to: LiteralKind) -> bool {
    from == to
        || to == LiteralKind::String
        || (from == LiteralKind::Integer && to == LiteralKind::Double)
}

/// Check a whole argument list against a parameter list, position by position.
pub fn can_cast_all(from: &[LiteralKind], to: &[LiteralKind]) -> bool {
    from.len() == to.len() && from.iter().zip(to).all(|(f, t)| can_cast(*f, *t))
}

/// Convert `value` to `target`, or fail if the lattice forbids it.
pub fn cast_value(value: &Value, target: LiteralKind) -> Result<Value, CastError> {
    let from = value.kind();
    if !can_cast(from, target) {
        return Err(CastError::Incompatible { from, to: target });
    }
    let cast = match (value, target) {
        (_, kind) if kind == from => value.clone(),
        (Value::Integer(i), LiteralKind::Double) => Value::Double(*i as f64),
        (other, LiteralKind::String) => Value::String(other.to_string()),
        _ => return Err(CastError::Incompatible { from, to: target }),
    };
    Ok(cast)
}

/// Cast every value to the kind at the same position.
pub fn cast_all(values: &[Value], targets: &[LiteralKind]) -> Result<Vec<Value>, CastError> {
    if values.len() != targets.len() {
        return Err(CastError::ArityMismatch {
            expected: targets.len(),
            found: values.len(),
        });
    }
    values
        .iter()
        .zip(targets)
        .map(|(value, target)| cast_value(value, *target))
        .collect()
}

/// Order-sensitive hash of a kind list, used for exact variant lookup.
///
/// Each kind contributes `ordinal + 1` as a base-5 digit, so lists of different
/// lengths never collide with each other for the short lists functions take.
pub fn signature_hash(kinds: &[LiteralKind]) -> u64 {
    kinds.iter().fold(0u64, |acc, kind| {
        acc.wrapping_mul(5).wrapping_add(kind.ordinal() + 1)
    })
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum CastError {
    #[error("cannot cast {from} to {to}")]
    Incompatible { from: LiteralKind, to: LiteralKind },
    #[error("expected {expected} value(s), found {found}")]
    ArityMismatch { expected: usize, found: usize },
}

#[cfg(test)]
mod tests {
    use super::*;
    use LiteralKind::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_lattice() {
        for kind in LiteralKind::ALL {
            assert!(can_cast(kind, kind));
            assert!(can_cast(kind, String));
        }
        assert!(can_cast(Integer, Double));
        assert!(!can_cast(Double, Integer));
        assert!(!can_cast(String, Integer));
        assert!(!can_cast(None, Integer));
    }

    #[test]
    fn test_cast_all_is_all_or_nothing() {
        let values = [Value::Integer(1), Value::Double(2.5)];
        assert_eq!(
            cast_all(&values, &[Double, Double]),
            Ok(vec![Value::Double(1.0), Value::Double(2.5)])
        );
        assert_eq!(
            cast_all(&values, &[Double, Integer]),
            Err(CastError::Incompatible {
                from: Double,
                to: Integer
            })
        );
        assert_eq!(
            cast_all(&values, &[Double]),
            Err(CastError::ArityMismatch {
                expected: 1,
                found: 2
            })
        );
    }

    #[test]
    fn test_cast_to_string_uses_text_form() {
        assert_eq!(
            cast_value(&Value::Double(4.0), String),
            Ok(Value::from("4.0"))
        );
        assert_eq!(cast_value(&Value::Integer(-7), String), Ok(Value::from("-7")));
    }

    #[test]
    fn test_signature_hash_is_order_sensitive() {
        assert_ne!(
            signature_hash(&[Integer, Double]),
            signature_hash(&[Double, Integer])
        );
        assert_ne!(signature_hash(&[Integer]), signature_hash(&[Integer, None]));
        assert_eq!(signature_hash(&[]), 0);
    }
}
