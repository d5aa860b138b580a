//! Conversion of calamine ranges into engine grids.

use calamine::{Data, Range};
use gridcheck_engine::engine::{CellGrid, CellRef, CellValue};
use std::collections::HashMap;

/// Formula text keyed by absolute cell position.
pub type FormulaGrid = HashMap<CellRef, String>;

fn to_cell_value(data: &Data) -> CellValue {
    match data {
        Data::Empty => CellValue::Empty,
        Data::Int(i) => CellValue::Number(*i as f64),
        Data::Float(f) => CellValue::Number(*f),
        Data::String(s) if s.is_empty() => CellValue::Empty,
        Data::String(s) => CellValue::Text(s.clone()),
        Data::Bool(b) => CellValue::Bool(*b),
        Data::DateTime(dt) => CellValue::DateTime(dt.as_f64()),
        Data::DateTimeIso(s) | Data::DurationIso(s) => CellValue::Text(s.clone()),
        Data::Error(e) => CellValue::Error(e.to_string()),
    }
}

/// Copy a worksheet range into a grid, keeping absolute positions.
pub fn range_to_grid(range: &Range<Data>) -> CellGrid {
    let Some((row, col)) = range.start() else {
        return CellGrid::default();
    };
    let rows = range
        .rows()
        .map(|r| r.iter().map(to_cell_value).collect())
        .collect();
    CellGrid::new(CellRef::new(col as usize, row as usize), rows)
}

/// Formula text by absolute position. Formulas are returned with their
/// leading `=`, the way a spreadsheet displays them.
pub fn formula_grid(range: &Range<String>) -> FormulaGrid {
    let mut formulas = FormulaGrid::new();
    let Some((start_row, start_col)) = range.start() else {
        return formulas;
    };
    for (r, row) in range.rows().enumerate() {
        for (c, text) in row.iter().enumerate() {
            if text.is_empty() {
                continue;
            }
            let formula = if text.starts_with('=') {
                text.clone()
            } else {
                format!("={}", text)
            };
            formulas.insert(
                CellRef::new(start_col as usize + c, start_row as usize + r),
                formula,
            );
        }
    }
    formulas
}
