//! Configuration errors.
//!
//! These indicate a malformed grading task (bad rule type, bad sheet
//! reference grammar, unknown predicate method, ...), never a wrong artifact.

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConfigError {
    #[error("Unknown rule type: {0}")]
    UnknownRuleType(String),

    #[error("Unknown checker: {0}")]
    UnknownChecker(String),

    #[error("Unrecognized sheet index: {0}")]
    UnknownSheetPrefix(String),

    #[error("Unknown comparison method: {0}")]
    UnknownPredicateMethod(String),

    #[error("Unknown style property: {0}")]
    UnknownStyleProperty(String),

    #[error("Invalid cell range: {0}")]
    InvalidRange(String),

    #[error("Invalid parameter `{name}`: {message}")]
    InvalidParameter { name: String, message: String },
}

impl ConfigError {
    pub fn invalid(name: &str, message: impl Into<String>) -> Self {
        ConfigError::InvalidParameter {
            name: name.to_string(),
            message: message.into(),
        }
    }
}
