use crate::document::encoding::read_lines;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tracing::{debug, error};

#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CsvOptions {
    /// When false, surrounding whitespace on each line is ignored.
    pub strict: bool,
    pub ignore_case: bool,
}

impl Default for CsvOptions {
    fn default() -> Self {
        CsvOptions {
            strict: true,
            ignore_case: false,
        }
    }
}

fn normalize(lines: Vec<String>, options: &CsvOptions) -> Vec<String> {
    lines
        .into_iter()
        .map(|line| {
            let line = if options.strict {
                line
            } else {
                line.trim().to_string()
            };
            if options.ignore_case {
                line.to_lowercase()
            } else {
                line
            }
        })
        .collect()
}

/// `1.0` if the result file's lines equal those of any candidate.
/// An unreadable result scores `0.0`; unreadable candidates are skipped.
pub fn compare_csv(result: &Path, expected: &[PathBuf], options: &CsvOptions) -> f64 {
    let result_lines = match read_lines(result) {
        Ok(lines) => normalize(lines, options),
        Err(e) => {
            error!(path = %result.display(), error = %e, "failed to read result file");
            return 0.0;
        }
    };

    for candidate in expected {
        match read_lines(candidate) {
            Ok(lines) => {
                if normalize(lines, options) == result_lines {
                    debug!(path = %candidate.display(), "result matches candidate");
                    return 1.0;
                }
            }
            Err(e) => debug!(path = %candidate.display(), error = %e, "skipping unreadable candidate"),
        }
    }
    0.0
}
