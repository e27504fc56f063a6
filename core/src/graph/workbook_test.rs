use super::*;
use crate::model::{ExpressionId, ParseResult};
use crate::source::ExpressionSource;
use crate::values::Value;
use pretty_assertions::assert_eq;

fn with_refs(value: i64, global: &[ExpressionId]) -> ParseResult {
    ParseResult {
        value: Value::Integer(value),
        global: global.to_vec(),
        ..Default::default()
    }
}

#[test]
fn test_paths() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let stats = wb.add_group(root, "stats").unwrap();
    let base = wb.add_group(stats, "base").unwrap();
    let str_id = wb.add_expression(base, "str").unwrap();
    let top = wb.add_expression(root, "top").unwrap();

    assert_eq!(wb.group_path(root), "");
    assert_eq!(wb.group_path(base), "/stats/base");
    assert_eq!(wb.expression_path(str_id).unwrap(), "/stats/base/str");
    assert_eq!(wb.expression_path(top).unwrap(), "/top");
    assert_eq!(wb.current_group_path(str_id), "/stats/base");

    assert_eq!(wb.find("/stats/base/str"), Some(str_id));
    assert_eq!(wb.find("/top"), Some(top));
    assert_eq!(wb.find("/stats/str"), None);
    assert_eq!(wb.find_group("/stats"), Some(stats));
    assert_eq!(wb.find_group(""), Some(root));
}

#[test]
fn test_new_expression_is_empty_and_ready() {
    let mut wb = Workbook::new();
    let id = wb.add_expression(wb.root(), "hp").unwrap();
    let expression = wb.expression(id).unwrap();
    assert_eq!(expression.text, "");
    assert!(expression.updated);
    assert_eq!(expression.result, ParseResult::default());
}

#[test]
fn test_names_are_unique_per_kind() {
    let mut wb = Workbook::new();
    let root = wb.root();
    wb.add_group(root, "dex").unwrap();
    wb.add_expression(root, "dex").unwrap();
    assert_eq!(
        wb.add_expression(root, "dex"),
        Err(WorkbookError::Duplicate {
            name: "dex".into(),
            parent: "".into()
        })
    );
    assert!(matches!(
        wb.add_group(root, "dex"),
        Err(WorkbookError::Duplicate { .. })
    ));
}

#[test]
fn test_invalid_names() {
    let mut wb = Workbook::new();
    let root = wb.root();
    for name in ["", "a b", "a/b", "x.y"] {
        assert_eq!(
            wb.add_expression(root, name),
            Err(WorkbookError::InvalidName(name.into()))
        );
    }
}

#[test]
fn test_commit_maintains_edges() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let a = wb.add_expression(root, "a").unwrap();
    let b = wb.add_expression(root, "b").unwrap();
    let c = wb.add_expression(root, "c").unwrap();

    wb.commit(c, "@(a) + @(b)", with_refs(3, &[a, b]));
    assert_eq!(wb.direct_dependents(a), vec![c]);
    assert_eq!(wb.direct_dependents(b), vec![c]);

    wb.commit(c, "@(b)", with_refs(2, &[b]));
    assert!(wb.direct_dependents(a).is_empty());
    assert_eq!(wb.direct_dependents(b), vec![c]);
    assert_eq!(wb.expression(c).unwrap().text, "@(b)");
}

#[test]
fn test_record_failure_keeps_text_and_edges() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let a = wb.add_expression(root, "a").unwrap();
    let b = wb.add_expression(root, "b").unwrap();
    wb.commit(b, "@(a)", with_refs(1, &[a]));

    wb.record_failure(b, ParseResult::failure("boom"));
    let expression = wb.expression(b).unwrap();
    assert_eq!(expression.text, "@(a)");
    assert!(expression.result.is_error());
    assert_eq!(wb.direct_dependents(a), vec![b]);
}

#[test]
fn test_deep_dependents_and_overlap() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let a = wb.add_expression(root, "a").unwrap();
    let b = wb.add_expression(root, "b").unwrap();
    let c = wb.add_expression(root, "c").unwrap();
    let d = wb.add_expression(root, "d").unwrap();
    wb.commit(b, "@(a)", with_refs(1, &[a]));
    wb.commit(c, "@(b)", with_refs(1, &[b]));

    assert_eq!(wb.deep_dependents(a), vec![b, c]);
    assert_eq!(wb.overlap(a, &[c, d]), vec![c]);
    assert!(wb.overlap(c, &[a, b]).is_empty());
}

#[test]
fn test_remove_expression_scrubs_edges() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let a = wb.add_expression(root, "a").unwrap();
    let b = wb.add_expression(root, "b").unwrap();
    let c = wb.add_expression(root, "c").unwrap();
    wb.commit(b, "@(a)", with_refs(1, &[a]));
    wb.commit(c, "@(b)", with_refs(1, &[b]));

    let removed = wb.remove_expression(b).unwrap();
    assert_eq!(removed.name, "b");
    assert!(wb.direct_dependents(a).is_empty());
    assert!(wb.direct_dependents(b).is_empty());
    assert_eq!(wb.find("/b"), None);
    assert_eq!(
        wb.remove_expression(b),
        Err(WorkbookError::UnknownExpression(b))
    );
}

#[test]
fn test_remove_group_takes_subtree() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let g = wb.add_group(root, "g").unwrap();
    let h = wb.add_group(g, "h").unwrap();
    let x = wb.add_expression(g, "x").unwrap();
    let y = wb.add_expression(h, "y").unwrap();
    let keep = wb.add_expression(root, "keep").unwrap();

    assert_eq!(wb.subtree_expressions(g), vec![x, y]);
    let removed = wb.remove_group(g).unwrap();
    assert_eq!(removed.len(), 2);
    assert!(wb.group(g).is_none());
    assert!(wb.group(h).is_none());
    assert_eq!(wb.children(root), (vec![], vec![keep]));
    assert_eq!(wb.remove_group(root), Err(WorkbookError::RootGroup));
}

#[test]
fn test_rename_and_move() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let g = wb.add_group(root, "g").unwrap();
    let h = wb.add_group(root, "h").unwrap();
    let x = wb.add_expression(g, "x").unwrap();

    wb.rename_expression(x, "y").unwrap();
    assert_eq!(wb.find("/g/y"), Some(x));
    assert_eq!(wb.find("/g/x"), None);

    wb.rename_group(g, "g2").unwrap();
    assert_eq!(wb.expression_path(x).unwrap(), "/g2/y");

    wb.move_expression(x, h).unwrap();
    assert_eq!(wb.expression_path(x).unwrap(), "/h/y");

    wb.move_group(g, h).unwrap();
    assert_eq!(wb.group_path(g), "/h/g2");
    assert_eq!(wb.move_group(h, g), Err(WorkbookError::MoveIntoSelf(h)));
    assert_eq!(wb.rename_group(root, "r"), Err(WorkbookError::RootGroup));
}

#[test]
fn test_move_refuses_name_clash() {
    let mut wb = Workbook::new();
    let root = wb.root();
    let g = wb.add_group(root, "g").unwrap();
    let x = wb.add_expression(g, "x").unwrap();
    wb.add_expression(root, "x").unwrap();
    assert!(matches!(
        wb.move_expression(x, root),
        Err(WorkbookError::Duplicate { .. })
    ));
    assert_eq!(wb.expression_path(x).unwrap(), "/g/x");
}

#[test]
fn test_stale_and_rewrite() {
    let mut wb = Workbook::new();
    let a = wb.add_expression(wb.root(), "a").unwrap();
    wb.commit(a, "1", with_refs(1, &[]));
    wb.mark_stale(a);
    assert!(!wb.expression(a).unwrap().updated);

    wb.rewrite_text(a, "[\"one\"] 1".into());
    let expression = wb.expression(a).unwrap();
    assert_eq!(expression.text, "[\"one\"] 1");
    assert_eq!(expression.result.value, Value::Integer(1));
}
