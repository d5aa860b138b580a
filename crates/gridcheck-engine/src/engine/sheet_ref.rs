//! Symbolic sheet references across a result and an expected document.
//!
//! Grammar:
//!
//! - bare integer `n` - the n-th sheet of the result document
//! - `RI<n>` / `EI<n>` - the n-th sheet (zero-based) of result / expected
//! - `RN<name>` / `EN<name>` - the sheet called `name` in result / expected
//!
//! Resolving never fails: a reference that cannot be satisfied resolves to
//! `None`, which callers treat as a failing comparison. Only an unknown
//! prefix is an error, and it is reported when the reference is parsed.

use serde::{Deserialize, Serialize};
use std::fmt;

use super::error::ConfigError;

/// Which of the two documents a reference points into.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash, Serialize, Deserialize)]
pub enum Source {
    Result,
    Expected,
}

impl fmt::Display for Source {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Source::Result => write!(f, "result"),
            Source::Expected => write!(f, "expected"),
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum SheetSelector {
    Ordinal(usize),
    Name(String),
    /// An index that can never match (negative, or not a number).
    Unresolvable(String),
}

/// A parsed sheet reference.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SheetRef {
    pub source: Source,
    pub selector: SheetSelector,
}

/// A reference pinned to a concrete sheet name.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct ResolvedSheet {
    pub source: Source,
    pub name: String,
}

impl SheetRef {
    pub fn result_ordinal(index: i64) -> SheetRef {
        let selector = match usize::try_from(index) {
            Ok(n) => SheetSelector::Ordinal(n),
            Err(_) => SheetSelector::Unresolvable(index.to_string()),
        };
        SheetRef {
            source: Source::Result,
            selector,
        }
    }

    /// Parse a prefixed reference such as `"RI0"` or `"ENSummary"`.
    pub fn parse(code: &str) -> Result<SheetRef, ConfigError> {
        let unknown = || ConfigError::UnknownSheetPrefix(code.to_string());
        let mut chars = code.chars();
        let source = match chars.next() {
            Some('R') => Source::Result,
            Some('E') => Source::Expected,
            _ => return Err(unknown()),
        };
        let kind = chars.next().ok_or_else(unknown)?;
        let rest = chars.as_str();

        let selector = match kind {
            'I' => match rest.trim().parse::<usize>() {
                Ok(n) => SheetSelector::Ordinal(n),
                Err(_) => SheetSelector::Unresolvable(rest.to_string()),
            },
            'N' => SheetSelector::Name(rest.trim_start().to_string()),
            _ => return Err(unknown()),
        };
        Ok(SheetRef { source, selector })
    }

    /// Resolve against the two documents' sheet names. `expected_names` is
    /// `None` when no expected document takes part in the comparison.
    pub fn resolve(
        &self,
        result_names: &[String],
        expected_names: Option<&[String]>,
    ) -> Option<ResolvedSheet> {
        let names = match self.source {
            Source::Result => result_names,
            Source::Expected => expected_names?,
        };
        let name = match &self.selector {
            SheetSelector::Ordinal(n) => names.get(*n)?.clone(),
            SheetSelector::Name(name) => name.clone(),
            SheetSelector::Unresolvable(_) => return None,
        };
        Some(ResolvedSheet {
            source: self.source,
            name,
        })
    }
}

impl fmt::Display for SheetRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let side = match self.source {
            Source::Result => 'R',
            Source::Expected => 'E',
        };
        match &self.selector {
            SheetSelector::Ordinal(n) => write!(f, "{}I{}", side, n),
            SheetSelector::Name(name) => write!(f, "{}N{}", side, name),
            SheetSelector::Unresolvable(raw) => write!(f, "{}I{}", side, raw),
        }
    }
}

/// A sheet reference as written in a rule: a bare ordinal or a prefixed code.
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum RawSheetRef {
    Ordinal(i64),
    Code(String),
}

impl RawSheetRef {
    pub fn parse(&self) -> Result<SheetRef, ConfigError> {
        match self {
            RawSheetRef::Ordinal(n) => Ok(SheetRef::result_ordinal(*n)),
            RawSheetRef::Code(code) => SheetRef::parse(code),
        }
    }
}

/// Parse and resolve in one step.
pub fn resolve_selector(
    selector: &RawSheetRef,
    result_names: &[String],
    expected_names: Option<&[String]>,
) -> Result<Option<ResolvedSheet>, ConfigError> {
    Ok(selector.parse()?.resolve(result_names, expected_names))
}
