//! gridcheck-core - document loading, rule model and checkers.

pub mod compare;
pub mod document;
pub mod error;
pub mod extract;
pub mod rules;
pub mod storage;

pub use compare::{Checker, CsvOptions, compare_csv, compare_table, compare_table_with, evaluate};
pub use document::{Document, SheetSource};
pub use error::{GridcheckError, Result};
pub use extract::{OoxmlExtractor, StructuralExtractor};
pub use rules::{DEFAULT_PRECISION, Defaults, Rule, TableOptions};

pub use gridcheck_engine::engine::{CellRef, ConfigError, DEFAULT_FUZZY_THRESHOLD};
