//! Built-in catalog.
//!
//! Ranks: `+ -` 4, `*` 3, `/ % ^ sqrt` and unary minus 2, everything named 1.
//! Integer arithmetic wraps on overflow.

use rand::Rng;

use super::{Associativity, CallContext, Function, FunctionRegistry, UNARY_MINUS};
use crate::values::{LiteralKind, Value};

use Associativity::{LeftToRight, RightToLeft};
use LiteralKind::{Double, Integer};

/// Words the lexer accepts as function names without consulting a registry.
pub const STANDARD_KEYWORDS: &[&str] = &[
    "random", "roll", "ceil", "floor", "round", "max", "min", "sqrt",
];

pub(super) fn register_all(registry: &mut FunctionRegistry) {
    registry.register(
        Function::new("+", 4, LeftToRight)
            .variant(&[Integer, Integer], Integer, |a, _| {
                Ok(Value::Integer(int(a, 0)?.wrapping_add(int(a, 1)?)))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)? + double(a, 1)?))
            }),
    );
    registry.register(
        Function::new("-", 4, LeftToRight)
            .variant(&[Integer, Integer], Integer, |a, _| {
                Ok(Value::Integer(int(a, 0)?.wrapping_sub(int(a, 1)?)))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)? - double(a, 1)?))
            }),
    );
    registry.register(
        Function::new("*", 3, LeftToRight)
            .variant(&[Integer, Integer], Integer, |a, _| {
                Ok(Value::Integer(int(a, 0)?.wrapping_mul(int(a, 1)?)))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)? * double(a, 1)?))
            }),
    );
    registry.register(
        Function::new(UNARY_MINUS, 2, RightToLeft)
            .variant(&[Integer], Integer, |a, _| {
                Ok(Value::Integer(int(a, 0)?.wrapping_neg()))
            })
            .variant(&[Double], Double, |a, _| Ok(Value::Double(-double(a, 0)?))),
    );
    // Division is always floating point; integers are cast.
    registry.register(
        Function::new("/", 2, LeftToRight).variant(&[Double, Double], Double, |a, _| {
            Ok(Value::Double(double(a, 0)? / double(a, 1)?))
        }),
    );
    registry.register(
        Function::new("^", 2, RightToLeft)
            .variant(&[Integer, Integer], Integer, |a, _| {
                Ok(Value::Integer(int_pow(int(a, 0)?, int(a, 1)?)?))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)?.powf(double(a, 1)?)))
            }),
    );
    registry.register(
        Function::new("%", 2, LeftToRight)
            .variant(&[Integer, Integer], Integer, |a, _| {
                let divisor = int(a, 1)?;
                if divisor == 0 {
                    return Err("remainder by zero".into());
                }
                Ok(Value::Integer(int(a, 0)?.wrapping_rem(divisor)))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)? % double(a, 1)?))
            }),
    );
    registry.register(
        Function::new("sqrt", 2, LeftToRight)
            .variant(&[Double], Double, |a, _| Ok(Value::Double(double(a, 0)?.sqrt()))),
    );

    // ========================================================================
    // Named functions
    // ========================================================================

    registry.register(
        Function::new("max", 1, LeftToRight)
            .variant(&[Integer, Integer], Integer, |a, _| {
                Ok(Value::Integer(int(a, 0)?.max(int(a, 1)?)))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)?.max(double(a, 1)?)))
            }),
    );
    registry.register(
        Function::new("min", 1, LeftToRight)
            .variant(&[Integer, Integer], Integer, |a, _| {
                Ok(Value::Integer(int(a, 0)?.min(int(a, 1)?)))
            })
            .variant(&[Double, Double], Double, |a, _| {
                Ok(Value::Double(double(a, 0)?.min(double(a, 1)?)))
            }),
    );
    registry.register(
        Function::new("floor", 1, LeftToRight).variant(&[Double], Integer, |a, _| {
            Ok(Value::Integer(to_int(double(a, 0)?.floor())?))
        }),
    );
    registry.register(
        Function::new("ceil", 1, LeftToRight).variant(&[Double], Integer, |a, _| {
            Ok(Value::Integer(to_int(double(a, 0)?.ceil())?))
        }),
    );
    // Halves round away from zero: round(2.5) = 3, round(-2.5) = -3.
    registry.register(
        Function::new("round", 1, LeftToRight).variant(&[Double], Integer, |a, _| {
            Ok(Value::Integer(to_int(double(a, 0)?.round())?))
        }),
    );

    // ========================================================================
    // Randomness
    // ========================================================================

    registry.register(
        Function::new("random", 1, LeftToRight)
            .impure()
            .variant(&[Integer, Integer], Integer, random_int)
            .variant(&[Double, Double], Double, random_double),
    );
    registry.register(
        Function::new("roll", 1, LeftToRight)
            .impure()
            .variant(&[Integer, Integer], Integer, roll),
    );
}

/// Uniform integer in `[low, high)`.
fn random_int(args: &[Value], ctx: &mut CallContext<'_>) -> Result<Value, String> {
    let (low, high) = (int(args, 0)?, int(args, 1)?);
    if low >= high {
        return Err(format!("empty range [{}, {})", low, high));
    }
    Ok(Value::Integer(ctx.rng.gen_range(low..high)))
}

/// Uniform double in `[low, high)`.
fn random_double(args: &[Value], ctx: &mut CallContext<'_>) -> Result<Value, String> {
    let (low, high) = (double(args, 0)?, double(args, 1)?);
    if !(low < high) || !(high - low).is_finite() {
        return Err(format!("empty range [{}, {})", low, high));
    }
    Ok(Value::Double(ctx.rng.gen_range(low..high)))
}

/// Sum of `count` dice with `sides` faces each.
fn roll(args: &[Value], ctx: &mut CallContext<'_>) -> Result<Value, String> {
    let (count, sides) = (int(args, 0)?, int(args, 1)?);
    if sides <= 0 {
        return Err(format!("a die needs at least one side, got {}", sides));
    }
    if count > ctx.max_roll_count {
        return Err(format!(
            "cannot roll {} dice, the limit is {}",
            count, ctx.max_roll_count
        ));
    }
    let mut sum: i64 = 0;
    for _ in 0..count.max(0) {
        sum = sum.wrapping_add(ctx.rng.gen_range(1..=sides));
    }
    Ok(Value::Integer(sum))
}

fn int_pow(base: i64, exponent: i64) -> Result<i64, String> {
    if exponent < 0 {
        return to_int((base as f64).powf(exponent as f64));
    }
    u32::try_from(exponent)
        .map(|e| base.wrapping_pow(e))
        .map_err(|_| format!("exponent {} is too large", exponent))
}

fn to_int(value: f64) -> Result<i64, String> {
    // i64::MAX is not representable, so the upper bound is exclusive.
    if value.is_finite() && value >= i64::MIN as f64 && value < -(i64::MIN as f64) {
        Ok(value as i64)
    } else {
        Err(format!("{} has no integer value", value))
    }
}

fn int(args: &[Value], index: usize) -> Result<i64, String> {
    args.get(index)
        .and_then(Value::as_int)
        .ok_or_else(|| format!("argument {} is not an Integer", index + 1))
}

fn double(args: &[Value], index: usize) -> Result<f64, String> {
    args.get(index)
        .and_then(Value::as_double)
        .ok_or_else(|| format!("argument {} is not a Double", index + 1))
}
