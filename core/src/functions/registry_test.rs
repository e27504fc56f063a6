use super::*;
use pretty_assertions::assert_eq;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

fn call(name: &str, args: &[Value]) -> Result<Value, FunctionError> {
    let registry = FunctionRegistry::standard();
    let function = registry.get(name).unwrap();
    let mut rng = ChaCha8Rng::seed_from_u64(7);
    let mut ctx = CallContext {
        rng: &mut rng,
        max_roll_count: 100,
    };
    function.apply(args, &mut ctx)
}

#[test]
fn test_standard_catalog_is_complete() {
    let registry = FunctionRegistry::standard();
    for name in ["+", "-", "*", "/", "%", "^", UNARY_MINUS] {
        assert!(registry.contains(name), "missing operator {name}");
        assert!(!registry.is_keyword(name));
    }
    for name in STANDARD_KEYWORDS {
        assert!(registry.is_keyword(name), "missing function {name}");
    }
}

#[test]
fn test_exact_variant_preferred() {
    assert_eq!(
        call("+", &[Value::Integer(1), Value::Integer(2)]),
        Ok(Value::Integer(3))
    );
    assert_eq!(
        call("+", &[Value::Double(1.5), Value::Double(2.0)]),
        Ok(Value::Double(3.5))
    );
}

#[test]
fn test_mixed_arguments_cast_to_double() {
    assert_eq!(
        call("+", &[Value::Double(1.0), Value::Integer(2)]),
        Ok(Value::Double(3.0))
    );
    assert_eq!(
        call("/", &[Value::Integer(7), Value::Integer(2)]),
        Ok(Value::Double(3.5))
    );
}

#[test]
fn test_cast_fallback_picks_first_declared_variant() {
    let function = Function::new("pick", 1, Associativity::LeftToRight)
        .variant(&[LiteralKind::Double], LiteralKind::Integer, |_, _| {
            Ok(Value::Integer(1))
        })
        .variant(&[LiteralKind::String], LiteralKind::Integer, |_, _| {
            Ok(Value::Integer(2))
        });
    let chosen = function.resolve_variant(&[LiteralKind::Integer]).unwrap();
    assert_eq!(chosen.params.as_slice(), &[LiteralKind::Double]);
}

#[test]
fn test_without_casts_rejects_inexact_signature() {
    let function = Function::new("exact", 1, Associativity::LeftToRight)
        .without_casts()
        .variant(&[LiteralKind::Double], LiteralKind::Double, |a, _| {
            Ok(a[0].clone())
        });
    assert!(function.resolve_variant(&[LiteralKind::Integer]).is_none());
    assert!(function.resolve_variant(&[LiteralKind::Double]).is_some());
}

#[test]
fn test_type_mismatch_names_function_and_kinds() {
    let err = call("*", &[Value::from("a"), Value::Integer(2)]).unwrap_err();
    assert_eq!(
        err,
        FunctionError::TypeMismatch {
            name: "*".into(),
            kinds: vec![LiteralKind::String, LiteralKind::Integer],
        }
    );
    assert_eq!(
        err.to_string(),
        "function \"*\" has no variant accepting [ String, Integer ]"
    );
}

#[test]
fn test_parameter_count() {
    let registry = FunctionRegistry::standard();
    assert_eq!(registry.get("+").unwrap().parameter_count(), Some(2));
    assert_eq!(registry.get(UNARY_MINUS).unwrap().parameter_count(), Some(1));

    let uneven = Function::new("uneven", 1, Associativity::LeftToRight)
        .variant(&[LiteralKind::Integer], LiteralKind::Integer, |a, _| {
            Ok(a[0].clone())
        })
        .variant(
            &[LiteralKind::Integer, LiteralKind::Integer],
            LiteralKind::Integer,
            |a, _| Ok(a[1].clone()),
        );
    assert_eq!(uneven.parameter_count(), None);
    assert_eq!(
        Function::new("empty", 1, Associativity::LeftToRight).parameter_count(),
        None
    );
}

#[test]
fn test_rounding() {
    assert_eq!(call("floor", &[Value::Double(2.8)]), Ok(Value::Integer(2)));
    assert_eq!(call("ceil", &[Value::Double(2.2)]), Ok(Value::Integer(3)));
    assert_eq!(call("round", &[Value::Double(2.5)]), Ok(Value::Integer(3)));
    assert_eq!(call("round", &[Value::Double(2.2)]), Ok(Value::Integer(2)));
    assert_eq!(call("round", &[Value::Double(-2.5)]), Ok(Value::Integer(-3)));
    assert_eq!(call("round", &[Value::Double(-2.2)]), Ok(Value::Integer(-2)));
    assert_eq!(call("floor", &[Value::Integer(4)]), Ok(Value::Integer(4)));
}

#[test]
fn test_integer_power() {
    assert_eq!(
        call("^", &[Value::Integer(2), Value::Integer(10)]),
        Ok(Value::Integer(1024))
    );
    assert_eq!(
        call("^", &[Value::Integer(2), Value::Integer(-1)]),
        Ok(Value::Integer(0))
    );
    assert_eq!(
        call("^", &[Value::Integer(10), Value::Integer(30)]),
        Ok(Value::Integer(5076944270305263616))
    );
    assert!(call("^", &[Value::Integer(0), Value::Integer(-1)]).is_err());
    assert!(call("^", &[Value::Integer(2), Value::Integer(1 << 40)]).is_err());
}

#[test]
fn test_integer_arithmetic_wraps() {
    assert_eq!(
        call("+", &[Value::Integer(i64::MAX), Value::Integer(1)]),
        Ok(Value::Integer(i64::MIN))
    );
    assert_eq!(
        call(UNARY_MINUS, &[Value::Integer(i64::MIN)]),
        Ok(Value::Integer(i64::MIN))
    );
}

#[test]
fn test_runtime_faults() {
    let err = call("%", &[Value::Integer(5), Value::Integer(0)]).unwrap_err();
    assert!(matches!(
        err,
        FunctionError::RuntimeFault { ref name, ref message, .. }
            if name == "%" && message == "remainder by zero"
    ));
    assert_eq!(
        err.to_string(),
        "function \"%\" with parameter types [ Integer, Integer ], given [ 5, 0 ], failed: remainder by zero"
    );

    assert!(call("random", &[Value::Integer(3), Value::Integer(3)]).is_err());
    assert!(call("roll", &[Value::Integer(2), Value::Integer(0)]).is_err());
    assert!(call("roll", &[Value::Integer(101), Value::Integer(6)]).is_err());
    assert!(call("floor", &[Value::Double(f64::NAN)]).is_err());
    assert!(call("floor", &[Value::Double(99999999999999999999.0)]).is_err());
    assert!(call("ceil", &[Value::Double(-1e19)]).is_err());
}

#[test]
fn test_randomness_stays_in_range() {
    let registry = FunctionRegistry::standard();
    let roll = registry.get("roll").unwrap();
    let random = registry.get("random").unwrap();
    assert!(!roll.is_static());
    assert!(!random.is_static());

    let mut rng = ChaCha8Rng::seed_from_u64(42);
    let mut ctx = CallContext {
        rng: &mut rng,
        max_roll_count: 100,
    };
    for _ in 0..200 {
        let total = roll
            .apply(&[Value::Integer(3), Value::Integer(6)], &mut ctx)
            .unwrap()
            .as_int()
            .unwrap();
        assert!((3..=18).contains(&total), "roll out of range: {total}");

        let pick = random
            .apply(&[Value::Double(0.5), Value::Double(1.5)], &mut ctx)
            .unwrap()
            .as_double()
            .unwrap();
        assert!((0.5..1.5).contains(&pick));
    }
    assert_eq!(
        roll.apply(&[Value::Integer(0), Value::Integer(6)], &mut ctx),
        Ok(Value::Integer(0))
    );
}
