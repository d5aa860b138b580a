//! Error types for gridcheck core.

use gridcheck_engine::engine::ConfigError;
use thiserror::Error;

/// Errors that can occur while grading.
///
/// Only [`GridcheckError::Config`] escapes a grading call; every other
/// variant describes an unreadable or malformed artifact and is turned into
/// a failing score by the comparison engine.
#[derive(Error, Debug)]
pub enum GridcheckError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Workbook error: {0}")]
    Workbook(#[from] calamine::Error),

    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    #[error("Zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    #[error("XML error in {part}: {message}")]
    Xml { part: String, message: String },

    #[error("Missing package part: {0}")]
    MissingPart(String),

    #[error("Sheet not found: {0}")]
    SheetNotFound(String),

    #[error("{0} documents do not carry this information")]
    Unsupported(String),

    #[error("Invalid task definition: {0}")]
    Config(#[from] ConfigError),
}

impl GridcheckError {
    pub fn is_config(&self) -> bool {
        matches!(self, GridcheckError::Config(_))
    }

    pub(crate) fn xml(part: &str, message: impl ToString) -> Self {
        GridcheckError::Xml {
            part: part.to_string(),
            message: message.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, GridcheckError>;
