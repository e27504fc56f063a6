use postcard::{from_bytes, to_allocvec};
use pretty_assertions::assert_eq;
use reckon_core::api::{Document, EngineOptions};
use reckon_core::graph::{ExpressionStore, Workbook};
use reckon_core::model::{ExpressionId, ParseResult};
use reckon_core::values::Value;

#[test]
fn test_parse_result_round_trip() {
    let result = ParseResult {
        value: Value::Double(2.5),
        is_static: false,
        global: vec![ExpressionId(3)],
        local: vec![ExpressionId(9), ExpressionId(4)],
        error_text: String::new(),
    };
    let bytes = to_allocvec(&result).unwrap();
    let decoded: ParseResult = from_bytes(&bytes).unwrap();
    assert_eq!(decoded, result);

    let failure = ParseResult::failure("cannot find reference \"/x\"");
    let decoded: ParseResult = from_bytes(&to_allocvec(&failure).unwrap()).unwrap();
    assert!(decoded.is_error());
    assert_eq!(decoded, failure);
}

#[test]
fn test_workbook_round_trip_keeps_graph() {
    let mut doc = Document::new(EngineOptions::default());
    let root = doc.root();
    let stats = doc.add_group(root, "stats").unwrap();
    let (str_id, _) = doc.add_expression(stats, "str", "14").unwrap();
    let (bonus, _) = doc
        .add_expression(stats, "bonus", "(@(..str) - 10) / 2")
        .unwrap();
    doc.add_expression(root, "label", "[\"hp\"] 12").unwrap();

    let bytes = to_allocvec(doc.workbook()).unwrap();
    let restored: Workbook = from_bytes(&bytes).unwrap();
    assert_eq!(&restored, doc.workbook());
    assert_eq!(restored.direct_dependents(str_id), vec![bonus]);
    assert_eq!(
        restored.expression(bonus).unwrap().result.value,
        Value::Double(2.0)
    );
}

#[test]
fn test_restored_workbook_keeps_evaluating() {
    let mut doc = Document::new(EngineOptions::default());
    let root = doc.root();
    let (a, _) = doc.add_expression(root, "a", "3").unwrap();
    let (b, _) = doc.add_expression(root, "b", "@(a) * @(a)").unwrap();

    let restored: Workbook = from_bytes(&to_allocvec(doc.workbook()).unwrap()).unwrap();
    let engine = reckon_core::api::Engine::new(EngineOptions::default(), |_| {});
    let mut doc = Document::with_engine(engine, restored);

    // The fresh engine has no snapshots; the first recomputation lexes again.
    doc.edit(a, "4").unwrap();
    assert_eq!(doc.expression(b).unwrap().result.value, Value::Integer(16));
    let (c, _) = doc.add_expression(root, "c", "@(b) + 1").unwrap();
    assert_eq!(doc.expression(c).unwrap().result.value, Value::Integer(17));
}
