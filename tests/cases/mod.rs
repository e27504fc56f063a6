use reckon::source::Detached;
use reckon::{EvalError, Engine, EngineOptions, Value};

/// Evaluate standalone text with a seeded engine.
pub fn eval(input: &str) -> Result<Value, EvalError> {
    let mut engine = Engine::new(
        EngineOptions {
            seed: Some(42),
            ..Default::default()
        },
        |_| {},
    );
    engine
        .try_evaluate_in("", input, &Detached)
        .map(|evaluation| evaluation.value)
}

macro_rules! test_case {
    ($name:ident, input: $input:expr, value: $value:expr $(,)?) => {
        #[test]
        fn $name() {
            pretty_assertions::assert_eq!(crate::cases::eval($input), Ok($value));
        }
    };
    ($name:ident, input: $input:expr, error: $error:pat $(,)?) => {
        #[test]
        fn $name() {
            let result = crate::cases::eval($input);
            assert!(matches!(result, Err($error)), "{:?}", result);
        }
    };
}
