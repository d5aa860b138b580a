//! Value predicates: `{"method": <name>, "ref": <reference>}`.
//!
//! Supported methods:
//!
//! - `eq`, `ne`, `lt`, `le`, `gt`, `ge` - equality and ordering (numbers
//!   numerically, strings lexicographically)
//! - `contains`, `not_contains` - substring (or array element) test on the value
//! - `in`, `not_in` - membership of the value in the reference list
//! - `re`, `re.I`, `re.M`, `re.S` (flags combine: `re.I.M`) - regex search
//! - `approx:<tolerance>` - `|value - ref| <= tolerance`
//! - `range.<l><r>` - `ref[0] < value < ref[1]` where `t` is strict and `e`
//!   inclusive on each side (`range.te` means `ref[0] < value <= ref[1]`)
//! - `str_list_eq`, `str_set_eq` - split the value on `,` and compare as a
//!   list / set of strings
//! - `spreadsheet_range` - the value is a multi-range that must contain
//!   `ref[0]` and lie within `ref[1]`
//!
//! An unknown method is a configuration error, reported by [`PredicateSpec::compile`].

use regex::{Regex, RegexBuilder};
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::cmp::Ordering;
use std::collections::BTreeSet;

use super::addressing::MultiCellRange;
use super::error::ConfigError;

/// A predicate as written in a rule, before validation.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PredicateSpec {
    pub method: String,
    #[serde(rename = "ref", default)]
    pub reference: JsonValue,
}

#[derive(Clone, Debug)]
pub enum Method {
    Eq,
    Ne,
    Lt,
    Le,
    Gt,
    Ge,
    Contains,
    NotContains,
    In,
    NotIn,
    Regex(Regex),
    Approx(f64),
    Range { left_inclusive: bool, right_inclusive: bool },
    StrListEq,
    StrSetEq,
    SpreadsheetRange { subset: MultiCellRange, superset: MultiCellRange },
}

/// A validated predicate, ready to evaluate.
#[derive(Clone, Debug)]
pub struct Predicate {
    pub method: Method,
    pub reference: JsonValue,
}

impl PredicateSpec {
    pub fn new(method: &str, reference: JsonValue) -> PredicateSpec {
        PredicateSpec {
            method: method.to_string(),
            reference,
        }
    }

    pub fn compile(&self) -> Result<Predicate, ConfigError> {
        let name = self.method.as_str();
        let method = match name {
            "eq" => Method::Eq,
            "ne" => Method::Ne,
            "lt" => Method::Lt,
            "le" => Method::Le,
            "gt" => Method::Gt,
            "ge" => Method::Ge,
            "contains" => Method::Contains,
            "not_contains" => Method::NotContains,
            "in" => Method::In,
            "not_in" => Method::NotIn,
            "str_list_eq" => Method::StrListEq,
            "str_set_eq" => Method::StrSetEq,
            "spreadsheet_range" => self.compile_spreadsheet_range()?,
            _ if name == "re" || name.starts_with("re.") => self.compile_regex()?,
            _ if name.starts_with("approx:") => {
                let tolerance = name["approx:".len()..].parse::<f64>().map_err(|_| {
                    ConfigError::invalid("method", format!("bad tolerance in {}", name))
                })?;
                Method::Approx(tolerance)
            }
            _ if name.starts_with("range.") => {
                let bounds: Vec<char> = name["range.".len()..].chars().collect();
                let inclusive = |c: char| match c {
                    't' => Ok(false),
                    'e' => Ok(true),
                    _ => Err(ConfigError::UnknownPredicateMethod(name.to_string())),
                };
                let [left, right] = bounds.as_slice() else {
                    return Err(ConfigError::UnknownPredicateMethod(name.to_string()));
                };
                Method::Range {
                    left_inclusive: inclusive(*left)?,
                    right_inclusive: inclusive(*right)?,
                }
            }
            _ => return Err(ConfigError::UnknownPredicateMethod(name.to_string())),
        };
        Ok(Predicate {
            method,
            reference: self.reference.clone(),
        })
    }

    fn compile_regex(&self) -> Result<Method, ConfigError> {
        let mut builder_flags = (false, false, false);
        for flag in self.method.split('.').skip(1) {
            match flag {
                "I" | "IGNORECASE" => builder_flags.0 = true,
                "M" | "MULTILINE" => builder_flags.1 = true,
                "S" | "DOTALL" => builder_flags.2 = true,
                _ => return Err(ConfigError::UnknownPredicateMethod(self.method.clone())),
            }
        }
        let pattern = self
            .reference
            .as_str()
            .ok_or_else(|| ConfigError::invalid("ref", "regex reference must be a string"))?;
        let regex = RegexBuilder::new(pattern)
            .case_insensitive(builder_flags.0)
            .multi_line(builder_flags.1)
            .dot_matches_new_line(builder_flags.2)
            .build()
            .map_err(|e| ConfigError::invalid("ref", e.to_string()))?;
        Ok(Method::Regex(regex))
    }

    fn compile_spreadsheet_range(&self) -> Result<Method, ConfigError> {
        let parts = self
            .reference
            .as_array()
            .filter(|a| a.len() == 2)
            .ok_or_else(|| ConfigError::invalid("ref", "expected [subset, superset]"))?;
        let parse = |v: &JsonValue| {
            v.as_str()
                .ok_or_else(|| ConfigError::invalid("ref", "range must be a string"))
                .and_then(MultiCellRange::parse)
        };
        Ok(Method::SpreadsheetRange {
            subset: parse(&parts[0])?,
            superset: parse(&parts[1])?,
        })
    }
}

impl Predicate {
    pub fn evaluate(&self, value: &JsonValue) -> bool {
        let reference = &self.reference;
        match &self.method {
            Method::Eq => json_eq(value, reference),
            Method::Ne => !json_eq(value, reference),
            Method::Lt => json_cmp(value, reference) == Some(Ordering::Less),
            Method::Le => matches!(json_cmp(value, reference), Some(Ordering::Less | Ordering::Equal)),
            Method::Gt => json_cmp(value, reference) == Some(Ordering::Greater),
            Method::Ge => matches!(
                json_cmp(value, reference),
                Some(Ordering::Greater | Ordering::Equal)
            ),
            Method::Contains => contains(value, reference),
            Method::NotContains => !contains(value, reference),
            Method::In => contains(reference, value),
            Method::NotIn => !contains(reference, value),
            Method::Regex(re) => value.as_str().is_some_and(|s| re.is_match(s)),
            Method::Approx(tolerance) => match (as_number(value), as_number(reference)) {
                (Some(v), Some(r)) => (v - r).abs() <= *tolerance,
                _ => false,
            },
            Method::Range {
                left_inclusive,
                right_inclusive,
            } => {
                let (Some(lo), Some(hi)) = (reference.get(0), reference.get(1)) else {
                    return false;
                };
                let left_ok = match json_cmp(lo, value) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => *left_inclusive,
                    _ => false,
                };
                let right_ok = match json_cmp(value, hi) {
                    Some(Ordering::Less) => true,
                    Some(Ordering::Equal) => *right_inclusive,
                    _ => false,
                };
                left_ok && right_ok
            }
            Method::StrListEq => match (split_list(value), string_list(reference)) {
                (Some(v), Some(r)) => v == r,
                _ => false,
            },
            Method::StrSetEq => match (split_list(value), string_list(reference)) {
                (Some(v), Some(r)) => {
                    v.into_iter().collect::<BTreeSet<_>>() == r.into_iter().collect::<BTreeSet<_>>()
                }
                _ => false,
            },
            Method::SpreadsheetRange { subset, superset } => {
                let Some(actual) = value.as_str().and_then(|s| MultiCellRange::parse(s).ok()) else {
                    return false;
                };
                subset.is_subset_of(&actual) && actual.is_subset_of(superset)
            }
        }
    }
}

fn as_number(value: &JsonValue) -> Option<f64> {
    match value {
        JsonValue::Number(n) => n.as_f64(),
        JsonValue::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
}

fn json_eq(a: &JsonValue, b: &JsonValue) -> bool {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64() == y.as_f64(),
        _ => a == b,
    }
}

fn json_cmp(a: &JsonValue, b: &JsonValue) -> Option<Ordering> {
    match (a, b) {
        (JsonValue::Number(x), JsonValue::Number(y)) => x.as_f64()?.partial_cmp(&y.as_f64()?),
        (JsonValue::String(x), JsonValue::String(y)) => Some(x.cmp(y)),
        (JsonValue::Bool(x), JsonValue::Bool(y)) => Some(x.cmp(y)),
        _ => None,
    }
}

/// Substring test for strings, element test for arrays.
fn contains(haystack: &JsonValue, needle: &JsonValue) -> bool {
    match haystack {
        JsonValue::String(h) => needle.as_str().is_some_and(|n| h.contains(n)),
        JsonValue::Array(items) => items.iter().any(|item| json_eq(item, needle)),
        _ => false,
    }
}

fn split_list(value: &JsonValue) -> Option<Vec<String>> {
    let text = value.as_str()?;
    let text = text.trim_matches(|c| c == '"' || c == '\'');
    Some(text.split(',').map(str::to_string).collect())
}

fn string_list(value: &JsonValue) -> Option<Vec<String>> {
    value
        .as_array()?
        .iter()
        .map(|v| v.as_str().map(str::to_string))
        .collect()
}
