//! Checkers: `compare_table` (rule engine) and `compare_csv` (text files).

mod csv;
mod primitives;
mod table;

pub use self::csv::{CsvOptions, compare_csv};
pub use primitives::{
    data_validations_match, frames_equal, fuzzy_ranges_match, lines_equal, sheet_names_equal,
};
pub use table::{compare_table, compare_table_with};

use crate::error::Result;
use crate::rules::{Defaults, TableOptions};
use gridcheck_engine::engine::ConfigError;
use serde_json::Value as JsonValue;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::error;

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Checker {
    CompareTable,
    CompareCsv,
}

impl FromStr for Checker {
    type Err = ConfigError;

    fn from_str(name: &str) -> std::result::Result<Checker, ConfigError> {
        match name {
            "compare_table" => Ok(Checker::CompareTable),
            "compare_csv" => Ok(Checker::CompareCsv),
            other => Err(ConfigError::UnknownChecker(other.to_string())),
        }
    }
}

impl fmt::Display for Checker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Checker::CompareTable => write!(f, "compare_table"),
            Checker::CompareCsv => write!(f, "compare_csv"),
        }
    }
}

/// Run a checker with the `(result, expected, options) -> score` contract.
///
/// `compare_table` uses the first expected path (if any); `compare_csv`
/// accepts any of them. `defaults` fill in parameters a rule leaves out.
pub fn evaluate(
    checker: Checker,
    result: Option<&Path>,
    expected: &[PathBuf],
    options: &JsonValue,
    defaults: Defaults,
) -> Result<f64> {
    match checker {
        Checker::CompareTable => {
            let options = TableOptions::from_json(options)?.with_defaults(defaults);
            let Some(result) = result else {
                options.validate()?;
                error!("no result file given");
                return Ok(0.0);
            };
            compare_table(result, expected.first().map(PathBuf::as_path), &options)
        }
        Checker::CompareCsv => {
            let options = if options.is_null() {
                CsvOptions::default()
            } else {
                serde_json::from_value(options.clone())
                    .map_err(|e| ConfigError::invalid("options", e.to_string()))?
            };
            let Some(result) = result else {
                error!("no result file given");
                return Ok(0.0);
            };
            Ok(compare_csv(result, expected, &options))
        }
    }
}
