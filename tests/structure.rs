//! Structural rules against workbooks that carry drawings, pivots,
//! validations, filters and sheet dimensions.

mod common;

use common::{Sheet, write_xlsx};
use gridcheck_core::{TableOptions, compare_table};
use serde_json::{Value, json};
use std::path::{Path, PathBuf};
use tempfile::tempdir;

fn score(result: &Path, expected: &Path, rules: Value) -> f64 {
    let options = TableOptions::from_json(&json!({ "rules": rules })).unwrap();
    compare_table(result, Some(expected), &options).unwrap()
}

fn data() -> Sheet {
    Sheet::new("Sheet1")
        .row(0, &["Name", "Value"])
        .text("A2", "alpha")
        .number("B2", 1.0)
        .text("A3", "beta")
        .number("B3", 2.0)
}

/// Writes `result.xlsx` and `expected.xlsx`, returning their paths.
fn pair(dir: &Path, result: Sheet, expected: Sheet) -> (PathBuf, PathBuf) {
    (
        write_xlsx(dir, "result.xlsx", &[result]),
        write_xlsx(dir, "expected.xlsx", &[expected]),
    )
}

fn between(kind: &str) -> Value {
    json!([{"type": kind, "sheet_idx0": 0, "sheet_idx1": "EI0"}])
}

#[test]
fn test_sparkline() {
    let dir = tempdir().unwrap();
    let (result, expected) = pair(
        dir.path(),
        data().sparkline("C2", "Sheet1!B2:B3"),
        data().sparkline("C2", "Sheet1!B2:B3"),
    );
    assert_eq!(score(&result, &expected, between("sparkline")), 1.0);

    let other = write_xlsx(dir.path(), "other.xlsx", &[data().sparkline("C2", "Sheet1!B2:B2")]);
    assert_eq!(score(&other, &expected, between("sparkline")), 0.0);

    // A sheet without sparklines does not match one that has them.
    let bare = write_xlsx(dir.path(), "bare.xlsx", &[data()]);
    assert_eq!(score(&bare, &expected, between("sparkline")), 0.0);
}

#[test]
fn test_chart() {
    let dir = tempdir().unwrap();
    let chart = |sheet: Sheet, title: &str| sheet.chart("D2", "barChart", title, "Sheet1!$B$2:$B$3");
    let (result, expected) = pair(dir.path(), chart(data(), "Totals"), chart(data(), "Totals"));
    assert_eq!(score(&result, &expected, between("chart")), 1.0);

    let retitled = write_xlsx(dir.path(), "retitled.xlsx", &[chart(data(), "Sums")]);
    assert_eq!(score(&retitled, &expected, between("chart")), 0.0);

    // Only the requested properties take part.
    let typed = json!([{"type": "chart", "sheet_idx0": 0, "sheet_idx1": "EI0",
                        "chart_props": ["type", "anchor"]}]);
    assert_eq!(score(&retitled, &expected, typed.clone()), 1.0);

    let lines = write_xlsx(
        dir.path(),
        "lines.xlsx",
        &[data().chart("D2", "lineChart", "Totals", "Sheet1!$B$2:$B$3")],
    );
    assert_eq!(score(&lines, &expected, typed), 0.0);
}

#[test]
fn test_data_validation() {
    let dir = tempdir().unwrap();
    let result = write_xlsx(
        dir.path(),
        "result.xlsx",
        &[data().validation("D2:D29", "list", "\"Yes,No\"")],
    );
    let rule = json!([{"type": "data_validation", "sheet_idx": 0,
                       "dv_props": [{"type": {"method": "eq", "ref": "list"},
                                     "formula1": {"method": "eq", "ref": "\"Yes,No\""},
                                     "ranges": {"method": "spreadsheet_range",
                                                "ref": ["D2:D29", "D2:D1048576"]}}]}]);
    assert_eq!(score(&result, &result, rule.clone()), 1.0);

    // Whole-column validations lie within the whole-column bound.
    let column = write_xlsx(
        dir.path(),
        "column.xlsx",
        &[data().validation("D2:D1048576", "list", "\"Yes,No\"")],
    );
    assert_eq!(score(&column, &column, rule.clone()), 1.0);

    let shifted = write_xlsx(
        dir.path(),
        "shifted.xlsx",
        &[data().validation("C2:C29", "list", "\"Yes,No\"")],
    );
    assert_eq!(score(&shifted, &shifted, rule.clone()), 0.0);

    let none = write_xlsx(dir.path(), "none.xlsx", &[data()]);
    assert_eq!(score(&none, &none, rule), 0.0);
}

#[test]
fn test_row_props() {
    let dir = tempdir().unwrap();
    let (result, expected) = pair(
        dir.path(),
        data().row_height(0, 30.0).hide_row(4),
        data().row_height(0, 30.0).hide_row(4),
    );
    assert_eq!(score(&result, &expected, between("row_props")), 1.0);

    let taller = write_xlsx(dir.path(), "taller.xlsx", &[data().row_height(0, 45.0).hide_row(4)]);
    assert_eq!(score(&taller, &expected, between("row_props")), 0.0);

    let hidden_only = json!([{"type": "row_props", "sheet_idx0": 0, "sheet_idx1": "EI0",
                              "props": ["hidden"]}]);
    assert_eq!(score(&taller, &expected, hidden_only), 1.0);
}

#[test]
fn test_col_props() {
    let dir = tempdir().unwrap();
    let (result, expected) = pair(
        dir.path(),
        data().column("B", 20.0, false).column("C", 9.0, true),
        data().column("B", 20.0, false).column("C", 9.0, true),
    );
    assert_eq!(score(&result, &expected, between("col_props")), 1.0);

    let shown = write_xlsx(
        dir.path(),
        "shown.xlsx",
        &[data().column("B", 20.0, false).column("C", 9.0, false)],
    );
    assert_eq!(score(&shown, &expected, between("col_props")), 0.0);

    let widths = json!([{"type": "col_props", "sheet_idx0": 0, "sheet_idx1": "EI0",
                         "props": ["width"]}]);
    assert_eq!(score(&shown, &expected, widths), 1.0);
}

#[test]
fn test_filter() {
    let dir = tempdir().unwrap();
    let filtered = |values: &[&str]| {
        data()
            .auto_filter("A1:B3", 0, values)
            .sort_state("A2:B3", "B2:B3", true)
    };
    let (result, expected) = pair(dir.path(), filtered(&["alpha"]), filtered(&["alpha"]));
    assert_eq!(score(&result, &expected, between("filter")), 1.0);

    let wider = write_xlsx(dir.path(), "wider.xlsx", &[filtered(&["alpha", "beta"])]);
    assert_eq!(score(&wider, &expected, between("filter")), 0.0);

    let ascending = write_xlsx(
        dir.path(),
        "ascending.xlsx",
        &[data().auto_filter("A1:B3", 0, &["alpha"]).sort_state("A2:B3", "B2:B3", false)],
    );
    assert_eq!(score(&ascending, &expected, between("filter")), 0.0);
}

#[test]
fn test_pivot_table() {
    let dir = tempdir().unwrap();
    let fields = ["Name", "Value"];
    let (result, expected) = pair(
        dir.path(),
        data().pivot("E1:F4", "Sheet1!A1:B3", &fields, 0, 1),
        data().pivot("E1:F4", "Sheet1!A1:B3", &fields, 0, 1),
    );
    assert_eq!(score(&result, &expected, between("pivot_table")), 1.0);

    let swapped = write_xlsx(
        dir.path(),
        "swapped.xlsx",
        &[data().pivot("E1:F4", "Sheet1!A1:B3", &fields, 1, 0)],
    );
    assert_eq!(score(&swapped, &expected, between("pivot_table")), 0.0);

    let placed = json!([{"type": "pivot_table", "sheet_idx0": 0, "sheet_idx1": "EI0",
                         "pivot_props": ["location", "source"]}]);
    assert_eq!(score(&swapped, &expected, placed), 1.0);
}

#[test]
fn test_sheet_fuzzy_whole_column() {
    let dir = tempdir().unwrap();
    let (result, expected) = pair(dir.path(), data(), data().text("A3", "Beta"));
    let rule = |kind: &str| {
        json!([{"type": "sheet_fuzzy", "sheet_idx0": 0, "sheet_idx1": "EI0",
                "rules": [{"range": "A1:A1048576", "type": kind, "ignore_case": true}]}])
    };
    assert_eq!(score(&result, &expected, rule("exact_match")), 1.0);

    let renamed = write_xlsx(dir.path(), "renamed.xlsx", &[data().text("A3", "gamma")]);
    assert_eq!(score(&renamed, &expected, rule("exact_match")), 0.0);
}

#[test]
fn test_sheet_data_skips_leading_blank_rows() {
    let dir = tempdir().unwrap();
    let lowered = Sheet::new("Sheet1")
        .row(2, &["Name", "Value"])
        .text("A4", "alpha")
        .number("B4", 1.0)
        .text("A5", "beta")
        .number("B5", 2.0);
    let (result, expected) = pair(dir.path(), lowered, data());
    let rule = json!([{"type": "sheet_data", "sheet_idx0": 0, "sheet_idx1": "EI0"}]);
    assert_eq!(score(&result, &expected, rule), 1.0);
}
