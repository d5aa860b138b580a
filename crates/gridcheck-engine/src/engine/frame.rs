//! Sheet content as a cell grid and as a header + rows frame.
//!
//! - [`CellGrid`] - absolute-position cell storage, read by coordinate
//! - [`TabularFrame`] - the sheet read as a table anchored at `A1`: the
//!   first row is the header, the remaining rows are data, trailing empty
//!   rows are dropped

use super::addressing::CellRef;
use super::value::CellValue;

static EMPTY: CellValue = CellValue::Empty;

/// Dense storage for the used area of a sheet.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellGrid {
    /// Absolute position of `rows[0][0]`.
    pub origin: CellRef,
    pub rows: Vec<Vec<CellValue>>,
}

impl CellGrid {
    pub fn new(origin: CellRef, rows: Vec<Vec<CellValue>>) -> CellGrid {
        CellGrid { origin, rows }
    }

    /// Build a grid anchored at `A1` from rows of delimited-text fields.
    pub fn from_text_rows<I, R, S>(rows: I) -> CellGrid
    where
        I: IntoIterator<Item = R>,
        R: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let rows = rows
            .into_iter()
            .map(|row| row.into_iter().map(|f| CellValue::infer(f.as_ref())).collect())
            .collect();
        CellGrid::new(CellRef::new(0, 0), rows)
    }

    /// Value at an absolute coordinate; cells outside the used area are empty.
    pub fn get(&self, cell: &CellRef) -> &CellValue {
        let (Some(row), Some(col)) = (
            cell.row.checked_sub(self.origin.row),
            cell.col.checked_sub(self.origin.col),
        ) else {
            return &EMPTY;
        };
        self.rows
            .get(row)
            .and_then(|r| r.get(col))
            .unwrap_or(&EMPTY)
    }

    /// One past the last used row / column, in absolute coordinates.
    pub fn extent(&self) -> (usize, usize) {
        let mut max_row = 0;
        let mut max_col = 0;
        for (r, row) in self.rows.iter().enumerate() {
            for (c, value) in row.iter().enumerate() {
                if !value.is_empty() {
                    max_row = max_row.max(self.origin.row + r + 1);
                    max_col = max_col.max(self.origin.col + c + 1);
                }
            }
        }
        (max_row, max_col)
    }

    pub fn to_frame(&self) -> TabularFrame {
        TabularFrame::from_grid(self)
    }
}

/// A sheet read as a table.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TabularFrame {
    pub columns: Vec<String>,
    pub rows: Vec<Vec<CellValue>>,
}

impl TabularFrame {
    /// The first non-empty row is the header; blank rows above it are skipped.
    pub fn from_grid(grid: &CellGrid) -> TabularFrame {
        let (height, width) = grid.extent();
        let blank = |row: usize| (0..width).all(|col| grid.get(&CellRef::new(col, row)).is_empty());
        let Some(header) = (0..height).find(|&row| !blank(row)) else {
            return TabularFrame::default();
        };

        let columns = (0..width)
            .map(|col| match grid.get(&CellRef::new(col, header)) {
                CellValue::Empty => format!("Unnamed: {}", col),
                value => value.to_string(),
            })
            .collect();
        let rows = (header + 1..height)
            .map(|row| {
                (0..width)
                    .map(|col| grid.get(&CellRef::new(col, row)).clone())
                    .collect()
            })
            .collect();

        TabularFrame { columns, rows }
    }

    pub fn shape(&self) -> (usize, usize) {
        (self.rows.len(), self.columns.len())
    }

    pub fn rounded(&self, digits: u32) -> TabularFrame {
        TabularFrame {
            columns: self.columns.clone(),
            rows: self
                .rows
                .iter()
                .map(|row| row.iter().map(|v| v.rounded(digits)).collect())
                .collect(),
        }
    }

    /// First position where the two frames disagree, for diagnostics.
    /// `None` means the frames are equal.
    pub fn first_difference(&self, other: &TabularFrame) -> Option<String> {
        if self.columns != other.columns {
            return Some(format!(
                "columns differ: {:?} vs {:?}",
                self.columns, other.columns
            ));
        }
        if self.shape() != other.shape() {
            return Some(format!("shape differs: {:?} vs {:?}", self.shape(), other.shape()));
        }
        for (r, (left, right)) in self.rows.iter().zip(&other.rows).enumerate() {
            for (c, (a, b)) in left.iter().zip(right).enumerate() {
                if a != b {
                    // Data row r sits below the header row.
                    return Some(format!("{}: {:?} vs {:?}", CellRef::new(c, r + 1), a, b));
                }
            }
        }
        None
    }
}
