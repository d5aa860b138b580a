//! Comparison engine API.
//!
//! This module provides the I/O-free building blocks of a grading run:
//!
//! - [`CellRef`], [`CellRange`], [`MultiCellRange`] - A1 addressing
//! - [`SheetRef`] - cross-document sheet references (`RI0`, `ENSummary`, ...)
//! - [`CellValue`], [`CellGrid`], [`TabularFrame`] - sheet content
//! - [`Normalization`], [`ratio`] - fuzzy text matching
//! - [`PredicateSpec`], [`Predicate`] - `{method, ref}` value checks
//! - [`ConfigError`] - errors in a task definition

mod addressing;
mod error;
mod frame;
mod fuzzy;
mod predicate;
mod sheet_ref;
mod value;

pub use addressing::{CellRange, CellRef, MultiCellRange};
pub use error::ConfigError;
pub use frame::{CellGrid, TabularFrame};
pub use fuzzy::{DEFAULT_FUZZY_THRESHOLD, MatchKind, Normalization, matches, ratio};
pub use predicate::{Method, Predicate, PredicateSpec};
pub use sheet_ref::{RawSheetRef, ResolvedSheet, SheetRef, SheetSelector, Source, resolve_selector};
pub use value::{CellValue, format_number, round_to};
