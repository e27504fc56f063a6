#[macro_use]
mod cases;

use reckon::{EvalError, Value};

test_case!(leading_comment, input: "[\"base\"] 10", value: Value::Integer(10));
test_case!(
    comments_between,
    input: "1 [\"one\"] + [\"two\"] 2",
    value: Value::Integer(3),
);
test_case!(only_comment, input: "[\"todo\"]", value: Value::None);
test_case!(whitespace, input: " \t1\n+\r\n2 ", value: Value::Integer(3));
test_case!(tight, input: "(1+2)*3", value: Value::Integer(9));
test_case!(bad_input, input: "1 + 2a", error: EvalError::Lex(_));
test_case!(unknown_function, input: "foo(1)", error: EvalError::Lex(_));
test_case!(unknown_symbol, input: "1 & 2", error: EvalError::Lex(_));
test_case!(
    missing_reference,
    input: "@(/nowhere) + 1",
    error: EvalError::Reference(_),
);

#[test]
fn residue_is_reported_in_order() {
    let Err(EvalError::Lex(err)) = cases::eval("1 ? 2 $$") else {
        panic!("expected a lex error");
    };
    let texts: Vec<&str> = err.residue().iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["?", "$$"]);
}

#[test]
fn multi_line_text_with_comments() {
    let text = indoc::indoc! {r#"
        ["base damage"] 2 * (
            ["weapon"] 4 +
            ["bonus"] 1
        )
    "#};
    assert_eq!(cases::eval(text), Ok(Value::Integer(10)));
}
