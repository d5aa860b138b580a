//! Storage formats (delimited text, workbook ranges).

mod delimited;
mod workbook;

pub use self::delimited::{delimiter_for, parse_csv, parse_delimited};
pub use self::workbook::{FormulaGrid, formula_grid, range_to_grid};
