//! One comparison per rule kind, on already loaded content.

use crate::extract::DataValidation;
use crate::rules::FuzzyRangeRule;
use gridcheck_engine::engine::{
    CellGrid, CellRange, CellRef, ConfigError, Predicate, TabularFrame, matches,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Order-sensitive equality of the two workbooks' sheet names.
pub fn sheet_names_equal(result: &[String], expected: Option<&[String]>) -> bool {
    expected.is_some_and(|expected| result == expected)
}

/// Frame equality after rounding numbers on both sides.
pub fn frames_equal(left: &TabularFrame, right: &TabularFrame, precision: u32) -> bool {
    match left.rounded(precision).first_difference(&right.rounded(precision)) {
        Some(difference) => {
            debug!(%difference, "sheet data differs");
            false
        }
        None => true,
    }
}

/// Line-by-line equality of printed sheets.
pub fn lines_equal(left: &[String], right: &[String], ignore_case: bool) -> bool {
    if left.len() != right.len() {
        return false;
    }
    left.iter().zip(right).all(|(a, b)| {
        if ignore_case {
            a.to_lowercase() == b.to_lowercase()
        } else {
            a == b
        }
    })
}

/// Every cell of every range passes the sub-rule's match after
/// normalization. An empty cell reads as the empty string.
///
/// Only cells inside the combined extent of both grids are visited; past
/// it both sides are empty and always agree.
pub fn fuzzy_ranges_match(
    left: &CellGrid,
    right: &CellGrid,
    rule: &FuzzyRangeRule,
    default_threshold: f64,
) -> Result<bool, ConfigError> {
    let range = rule.range.parse()?;
    let threshold = rule.threshold.unwrap_or(default_threshold);
    let (left_rows, left_cols) = left.extent();
    let (right_rows, right_cols) = right.extent();
    let (rows, cols) = (left_rows.max(right_rows), left_cols.max(right_cols));
    if rows == 0 || cols == 0 {
        return Ok(true);
    }
    let used = CellRange {
        start: CellRef::new(0, 0),
        end: CellRef::new(cols - 1, rows - 1),
    };
    let visited: Vec<CellRange> = range.areas.iter().filter_map(|area| area.intersection(&used)).collect();
    for cell in visited.iter().flat_map(|area| area.cells()) {
        let a = rule.normalization.apply(&left.get(&cell).to_string());
        let b = rule.normalization.apply(&right.get(&cell).to_string());
        let passed = matches(rule.kind, &a, &b, threshold);
        debug!(%cell, left = %a, right = %b, passed, "fuzzy cell");
        if !passed {
            return Ok(false);
        }
    }
    Ok(true)
}

/// The sheet has at least as many validations as there are property
/// entries, and every validation satisfies at least one entry.
pub fn data_validations_match(
    validations: &[DataValidation],
    entries: &[BTreeMap<String, Predicate>],
) -> bool {
    if validations.len() < entries.len() {
        return false;
    }
    validations.iter().all(|dv| {
        entries.iter().any(|entry| {
            entry.iter().all(|(attribute, check)| {
                dv.attribute(attribute)
                    .is_some_and(|value| check.evaluate(&value.to_json()))
            })
        })
    })
}
