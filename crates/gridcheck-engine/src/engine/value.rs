//! Materialized cell values.

use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::fmt;

/// A cell value as stored in the file (formulas are never evaluated here).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum CellValue {
    Empty,
    Number(f64),
    Text(String),
    Bool(bool),
    /// Spreadsheet serial date/time (days since the 1899-12-30 epoch).
    DateTime(f64),
    Error(String),
}

impl CellValue {
    /// Interpret a field of delimited text.
    /// - Empty string -> Empty
    /// - Valid number -> Number (unless it has leading zeros like "007")
    /// - TRUE/FALSE -> Bool
    /// - Otherwise -> Text
    pub fn infer(field: &str) -> CellValue {
        if field.is_empty() {
            return CellValue::Empty;
        }

        // Explicit surrounding whitespace means the writer quoted a text value.
        let trimmed = field.trim();
        if field != trimmed {
            return CellValue::Text(field.to_string());
        }

        if trimmed.starts_with('0')
            && trimmed.len() > 1
            && !trimmed.starts_with("0.")
            && trimmed.chars().nth(1).is_some_and(|c| c.is_ascii_digit())
        {
            return CellValue::Text(trimmed.to_string());
        }

        if let Ok(n) = trimmed.parse::<f64>() {
            if n.is_finite() {
                return CellValue::Number(n);
            }
        }

        match trimmed {
            "TRUE" | "True" | "true" => CellValue::Bool(true),
            "FALSE" | "False" | "false" => CellValue::Bool(false),
            _ => CellValue::Text(trimmed.to_string()),
        }
    }

    pub fn is_empty(&self) -> bool {
        matches!(self, CellValue::Empty)
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            CellValue::Number(n) | CellValue::DateTime(n) => Some(*n),
            _ => None,
        }
    }

    /// Round numeric values to `digits` decimals, half to even.
    pub fn rounded(&self, digits: u32) -> CellValue {
        match self {
            CellValue::Number(n) => CellValue::Number(round_to(*n, digits)),
            CellValue::DateTime(n) => CellValue::DateTime(round_to(*n, digits)),
            other => other.clone(),
        }
    }

    /// The value as seen by predicates.
    pub fn to_json(&self) -> JsonValue {
        match self {
            CellValue::Empty => JsonValue::Null,
            CellValue::Number(n) | CellValue::DateTime(n) => number_to_json(*n),
            CellValue::Text(s) | CellValue::Error(s) => JsonValue::String(s.clone()),
            CellValue::Bool(b) => JsonValue::Bool(*b),
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CellValue::Empty => Ok(()),
            CellValue::Number(n) | CellValue::DateTime(n) => write!(f, "{}", format_number(*n)),
            CellValue::Text(s) | CellValue::Error(s) => write!(f, "{}", s),
            CellValue::Bool(b) => write!(f, "{}", if *b { "TRUE" } else { "FALSE" }),
        }
    }
}

pub fn round_to(n: f64, digits: u32) -> f64 {
    if !n.is_finite() {
        return n;
    }
    let scale = 10f64.powi(digits as i32);
    let scaled = n * scale;
    if !scaled.is_finite() {
        return n;
    }
    scaled.round_ties_even() / scale
}

/// Format a number the way it reads in a cell: integral values without a
/// fractional part, everything else in shortest round-trip form.
pub fn format_number(n: f64) -> String {
    if n.is_nan() {
        "#NAN!".to_string()
    } else if n.is_infinite() {
        "#INF!".to_string()
    } else if n.fract() == 0.0 && n.abs() < 1e15 {
        format!("{:.0}", n)
    } else {
        format!("{}", n)
    }
}

fn number_to_json(n: f64) -> JsonValue {
    if n.fract() == 0.0 && n.abs() < 9.0e15 {
        JsonValue::from(n as i64)
    } else {
        serde_json::Number::from_f64(n)
            .map(JsonValue::Number)
            .unwrap_or(JsonValue::Null)
    }
}
