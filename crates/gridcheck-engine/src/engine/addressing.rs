//! A1-style cell addressing.
//!
//! Provides bidirectional conversion between spreadsheet-style coordinates
//! (e.g., "A1", "B2", "AA100") and zero-indexed column/row positions, plus
//! rectangular ranges (`"A1:B6"`) and whitespace-separated multi-area ranges
//! (`"A1:B6 C2:E5"`).
//!
//! # Examples
//!
//! ```
//! use gridcheck_engine::engine::CellRef;
//!
//! let cell = CellRef::from_str("B3").unwrap();
//! assert_eq!(cell.col, 1);
//! assert_eq!(cell.row, 2);
//! assert_eq!(cell.to_string(), "B3");
//! ```

use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::OnceLock;

use super::error::ConfigError;

fn a1_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^\$?(?<letters>[A-Za-z]+)\$?(?<numbers>[0-9]+)$").expect("valid A1 regex")
    })
}

/// A reference to a cell by column and row indices (0-indexed).
#[derive(Clone, Copy, Debug, Default, Hash, Eq, PartialEq, Ord, PartialOrd, Serialize, Deserialize)]
pub struct CellRef {
    pub row: usize,
    pub col: usize,
}

impl CellRef {
    pub fn new(col: usize, row: usize) -> CellRef {
        CellRef { row, col }
    }

    /// Parse a coordinate in spreadsheet notation (e.g., "A1", "$B$2", "aa10").
    /// Returns None if the input is invalid.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(name: &str) -> Option<CellRef> {
        let caps = a1_re().captures(name.trim())?;
        let col = Self::letters_to_col(&caps["letters"])?;
        let row = caps["numbers"].parse::<usize>().ok()?.checked_sub(1)?;
        Some(CellRef::new(col, row))
    }

    /// Like [`CellRef::from_str`], but reports a configuration error.
    pub fn parse_coordinate(name: &str) -> Result<CellRef, ConfigError> {
        Self::from_str(name).ok_or_else(|| ConfigError::InvalidRange(name.to_string()))
    }

    /// Convert column letters to a zero-based index ("A" -> 0, "AA" -> 26).
    pub fn letters_to_col(letters: &str) -> Option<usize> {
        if letters.is_empty() {
            return None;
        }
        let mut acc = 0usize;
        for c in letters.to_ascii_uppercase().bytes() {
            if !c.is_ascii_uppercase() {
                return None;
            }
            let digit = (c - b'A') as usize + 1;
            acc = acc.checked_mul(26)?.checked_add(digit)?;
        }
        acc.checked_sub(1)
    }

    /// Convert column index to spreadsheet-style letters (0 -> A, 25 -> Z, 26 -> AA).
    pub fn col_to_letters(col: usize) -> String {
        let mut result = String::new();
        let mut n = col as u128 + 1;
        while n > 0 {
            n -= 1;
            result.insert(0, (b'A' + (n % 26) as u8) as char);
            n /= 26;
        }
        result
    }
}

impl std::str::FromStr for CellRef {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        CellRef::parse_coordinate(s)
    }
}

impl fmt::Display for CellRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}{}", CellRef::col_to_letters(self.col), self.row + 1)
    }
}

/// An inclusive rectangular area of cells.
#[derive(Clone, Copy, Debug, Hash, Eq, PartialEq)]
pub struct CellRange {
    pub start: CellRef,
    pub end: CellRef,
}

impl CellRange {
    /// Parse `"A1:B5"` or a single coordinate `"C3"`. Corners are normalized
    /// so `start` is always the top-left cell.
    pub fn parse(text: &str) -> Result<CellRange, ConfigError> {
        let text = text.trim();
        let (first, second) = match text.split_once(':') {
            Some((a, b)) => (a, b),
            None => (text, text),
        };
        let a = CellRef::from_str(first).ok_or_else(|| ConfigError::InvalidRange(text.to_string()))?;
        let b = CellRef::from_str(second).ok_or_else(|| ConfigError::InvalidRange(text.to_string()))?;

        Ok(CellRange {
            start: CellRef::new(a.col.min(b.col), a.row.min(b.row)),
            end: CellRef::new(a.col.max(b.col), a.row.max(b.row)),
        })
    }

    pub fn height(&self) -> usize {
        self.end.row - self.start.row + 1
    }

    pub fn width(&self) -> usize {
        self.end.col - self.start.col + 1
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        (self.start.row..=self.end.row).contains(&cell.row)
            && (self.start.col..=self.end.col).contains(&cell.col)
    }

    /// Cells in row-major order.
    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        (self.start.row..=self.end.row)
            .flat_map(move |row| (self.start.col..=self.end.col).map(move |col| CellRef::new(col, row)))
    }

    /// The overlap of two areas, if any.
    pub fn intersection(&self, other: &CellRange) -> Option<CellRange> {
        let start = CellRef::new(self.start.col.max(other.start.col), self.start.row.max(other.start.row));
        let end = CellRef::new(self.end.col.min(other.end.col), self.end.row.min(other.end.row));
        (start.col <= end.col && start.row <= end.row).then_some(CellRange { start, end })
    }

    /// True when the union of `areas` covers every cell of `self`.
    ///
    /// Works on row bands between area edges, so whole-column areas cost
    /// no more than small ones.
    fn is_covered_by(&self, areas: &[CellRange]) -> bool {
        let mut edges: Vec<usize> = vec![self.start.row, self.end.row + 1];
        for area in areas {
            for edge in [area.start.row, area.end.row + 1] {
                if edge > self.start.row && edge <= self.end.row {
                    edges.push(edge);
                }
            }
        }
        edges.sort_unstable();
        edges.dedup();

        edges.windows(2).all(|band| {
            // Every area either spans the whole band or misses it.
            let (top, bottom) = (band[0], band[1] - 1);
            let mut spans: Vec<(usize, usize)> = areas
                .iter()
                .filter(|a| a.start.row <= top && a.end.row >= bottom)
                .map(|a| (a.start.col, a.end.col))
                .collect();
            spans.sort_unstable();

            let mut next = self.start.col;
            for (first, last) in spans {
                if first > next {
                    break;
                }
                if last >= next {
                    next = last + 1;
                }
                if next > self.end.col {
                    return true;
                }
            }
            next > self.end.col
        })
    }
}

impl fmt::Display for CellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.start == self.end {
            write!(f, "{}", self.start)
        } else {
            write!(f, "{}:{}", self.start, self.end)
        }
    }
}

/// A union of areas, written as whitespace-separated ranges.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct MultiCellRange {
    pub areas: Vec<CellRange>,
}

impl MultiCellRange {
    pub fn parse(text: &str) -> Result<MultiCellRange, ConfigError> {
        let areas = text
            .split_whitespace()
            .map(CellRange::parse)
            .collect::<Result<Vec<_>, _>>()?;
        if areas.is_empty() {
            return Err(ConfigError::InvalidRange(text.to_string()));
        }
        Ok(MultiCellRange { areas })
    }

    /// Parse several range strings into one multi-range, preserving order.
    pub fn parse_all<S: AsRef<str>>(parts: &[S]) -> Result<MultiCellRange, ConfigError> {
        let mut areas = Vec::new();
        for part in parts {
            areas.extend(MultiCellRange::parse(part.as_ref())?.areas);
        }
        Ok(MultiCellRange { areas })
    }

    pub fn cells(&self) -> impl Iterator<Item = CellRef> + '_ {
        self.areas.iter().flat_map(|area| area.cells())
    }

    pub fn contains(&self, cell: &CellRef) -> bool {
        self.areas.iter().any(|area| area.contains(cell))
    }

    /// True when every cell of `self` lies inside `other`.
    pub fn is_subset_of(&self, other: &MultiCellRange) -> bool {
        self.areas.iter().all(|area| area.is_covered_by(&other.areas))
    }
}

impl fmt::Display for MultiCellRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self.areas.iter().map(|a| a.to_string()).collect();
        write!(f, "{}", parts.join(" "))
    }
}
