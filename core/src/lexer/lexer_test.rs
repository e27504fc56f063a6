use super::*;
use pretty_assertions::assert_eq;

fn texts(source: &str) -> Vec<String> {
    lex(source)
        .unwrap()
        .into_iter()
        .map(|lexeme| lexeme.text)
        .collect()
}

#[test]
fn test_blank_input() {
    assert_eq!(lex("").unwrap(), vec![]);
    assert_eq!(lex("  \t\n").unwrap(), vec![]);
}

#[test]
fn test_splits_every_pattern() {
    assert_eq!(
        texts(r#"max(@(/stats/str), 2.5) * 3 ["bonus"]"#),
        vec!["max", "(", "@(/stats/str)", ",", "2.5", ")", "*", "3", r#"["bonus"]"#]
    );
}

#[test]
fn test_comment_ends_at_first_close() {
    assert_eq!(
        texts(r#"["say "hi" loudly"] 1 ["a"] ["b"]"#),
        vec![r#"["say "hi" loudly"]"#, "1", r#"["a"]"#, r#"["b"]"#]
    );
    assert_eq!(texts(r#"[""] 2"#), vec![r#"[""]"#, "2"]);
}

#[test]
fn test_spans_point_into_source() {
    let source = "10 +  @( ..dex )";
    let lexemes = lex(source).unwrap();
    for lexeme in &lexemes {
        assert_eq!(&source[lexeme.span.clone()], lexeme.text);
    }
    assert_eq!(lexemes[2].text, "@( ..dex )");
}

#[test]
fn test_residue_is_reported() {
    let err = lex("1 + 2a").unwrap_err();
    assert_eq!(
        err,
        LexError::BadInput {
            residue: vec![Residue {
                text: "a".into(),
                span: 5..6,
            }]
        }
    );
    assert_eq!(err.to_string(), "bad input: \"a\"");
}

#[test]
fn test_contiguous_residue_is_merged() {
    let err = lex("1 + $$ + foo").unwrap_err();
    let texts: Vec<_> = err.residue().iter().map(|r| r.text.as_str()).collect();
    assert_eq!(texts, vec!["$$", "foo"]);
}

#[test]
fn test_integer_does_not_take_a_dangling_dot() {
    let err = lex("1.").unwrap_err();
    assert_eq!(err.residue()[0].text, ".");
    assert_eq!(texts("1.25"), vec!["1.25"]);
}

#[test]
fn test_unknown_words_need_a_registry() {
    assert!(lex("dice(2)").is_err());
    let lexemes = lex_with("dice(2)", |word| word == "dice").unwrap();
    assert_eq!(lexemes[0].text, "dice");
}

#[test]
fn test_unary_minus_folds_into_literal() {
    assert_eq!(texts("-1+2"), vec!["-1", "+", "2"]);
    assert_eq!(texts("(1,-2)"), vec!["(", "1", ",", "-2", ")"]);
    assert_eq!(texts("3*-2.5"), vec!["3", "*", "-2.5"]);
}

#[test]
fn test_unary_minus_before_non_literal_stays_operator() {
    assert_eq!(texts("-(1)"), vec![UNARY_MINUS, "(", "1", ")"]);
    assert_eq!(texts("--3"), vec![UNARY_MINUS, "-3"]);
    assert_eq!(texts("2 - -max(1,2)"), vec!["2", "-", UNARY_MINUS, "max", "(", "1", ",", "2", ")"]);
}

#[test]
fn test_binary_minus_after_operand() {
    assert_eq!(texts("5-3"), vec!["5", "-", "3"]);
    assert_eq!(texts("(1)-3"), vec!["(", "1", ")", "-", "3"]);
}

#[test]
fn test_unary_marker_is_not_input() {
    assert!(lex("~1").is_err());
}

#[test]
fn test_references_survive_bad_input() {
    let found: Vec<_> = references("@(a/b) + ?? + @(..c)").collect();
    assert_eq!(found, vec![(0..6, "@(a/b)"), (14..20, "@(..c)")]);
}

#[test]
fn test_multi_line_source() {
    let source = indoc::indoc! {r#"
        ["armor class"]
        10 + floor(
            (@(..dex) - 10) / 2
        )
    "#};
    assert_eq!(
        texts(source),
        vec![
            r#"["armor class"]"#, "10", "+", "floor", "(", "(", "@(..dex)", "-", "10", ")", "/",
            "2", ")"
        ]
    );
}
