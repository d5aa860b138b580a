//! Structural facts about a sheet: charts, styles, validations, pivots...
//!
//! The comparison engine only sees the [`StructuralExtractor`] trait. Facts
//! come back as plain typed values so two sheets can be compared with `==`.

mod ooxml;
mod package;
mod styles;
mod xml;

pub use ooxml::OoxmlExtractor;

use crate::error::Result;
use gridcheck_engine::engine::{CellRef, CellValue};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt;
use std::path::PathBuf;

/// Properties `check_cell` and `style` rules may ask a cell for.
pub const STYLE_PROPERTIES: [&str; 16] = [
    "number_format",
    "font_name",
    "font_family",
    "font_color",
    "font_bold",
    "font_italic",
    "font_underline",
    "font_size",
    "fill_type",
    "bgcolor",
    "fgcolor",
    "hyperlink",
    "merge",
    "horizontal_alignment",
    "vertical_alignment",
    "wrap_text",
];

pub const DATA_VALIDATION_ATTRIBUTES: [&str; 15] = [
    "ranges",
    "type",
    "formula1",
    "formula2",
    "operator",
    "allowBlank",
    "showDropDown",
    "showInputMessage",
    "showErrorMessage",
    "error",
    "errorTitle",
    "errorStyle",
    "prompt",
    "promptTitle",
    "imeMode",
];

pub const CHART_PROPERTIES: [&str; 7] =
    ["type", "direction", "title", "xtitle", "ytitle", "legend", "anchor"];

pub const ROW_PROPERTIES: [&str; 4] = ["height", "hidden", "outline_level", "collapsed"];

pub const COLUMN_PROPERTIES: [&str; 4] = ["width", "hidden", "outline_level", "collapsed"];

pub const PIVOT_PROPERTIES: [&str; 7] = [
    "name",
    "source",
    "location",
    "row_fields",
    "col_fields",
    "data_fields",
    "page_fields",
];

/// One scalar fact.
#[derive(Clone, Debug, Default, PartialEq)]
pub enum FactValue {
    #[default]
    Missing,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl FactValue {
    pub fn text(value: Option<&str>) -> FactValue {
        value.map_or(FactValue::Missing, |s| FactValue::Text(s.to_string()))
    }

    pub fn number(value: Option<f64>) -> FactValue {
        value.map_or(FactValue::Missing, FactValue::Number)
    }

    /// The fact as a predicate input.
    pub fn to_json(&self) -> JsonValue {
        match self {
            FactValue::Missing => JsonValue::Null,
            FactValue::Bool(b) => JsonValue::Bool(*b),
            FactValue::Number(n) => CellValue::Number(*n).to_json(),
            FactValue::Text(s) => JsonValue::String(s.clone()),
        }
    }
}

impl fmt::Display for FactValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FactValue::Missing => Ok(()),
            FactValue::Bool(b) => write!(f, "{}", b),
            FactValue::Number(n) => write!(f, "{}", CellValue::Number(*n)),
            FactValue::Text(s) => write!(f, "{}", s),
        }
    }
}

/// Facts keyed by an object (cell, row, chart, pivot table) and then by
/// property name.
pub type FactTable = BTreeMap<String, BTreeMap<String, FactValue>>;

/// One `<dataValidation>` entry.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DataValidation {
    pub ranges: String,
    pub kind: Option<String>,
    pub operator: Option<String>,
    pub formula1: Option<String>,
    pub formula2: Option<String>,
    pub allow_blank: bool,
    pub show_drop_down: bool,
    pub show_input_message: bool,
    pub show_error_message: bool,
    pub error: Option<String>,
    pub error_title: Option<String>,
    pub error_style: Option<String>,
    pub prompt: Option<String>,
    pub prompt_title: Option<String>,
    pub ime_mode: Option<String>,
}

impl DataValidation {
    /// Attribute by its OOXML name; `None` for names not in
    /// [`DATA_VALIDATION_ATTRIBUTES`].
    pub fn attribute(&self, name: &str) -> Option<FactValue> {
        let text = |v: &Option<String>| FactValue::text(v.as_deref());
        Some(match name {
            "ranges" => FactValue::Text(self.ranges.clone()),
            "type" => text(&self.kind),
            "formula1" => text(&self.formula1),
            "formula2" => text(&self.formula2),
            "operator" => text(&self.operator),
            "allowBlank" => FactValue::Bool(self.allow_blank),
            "showDropDown" => FactValue::Bool(self.show_drop_down),
            "showInputMessage" => FactValue::Bool(self.show_input_message),
            "showErrorMessage" => FactValue::Bool(self.show_error_message),
            "error" => text(&self.error),
            "errorTitle" => text(&self.error_title),
            "errorStyle" => text(&self.error_style),
            "prompt" => text(&self.prompt),
            "promptTitle" => text(&self.prompt_title),
            "imeMode" => text(&self.ime_mode),
            _ => return None,
        })
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum NativeFormat {
    /// `.xlsx` / `.xlsm` package.
    Ooxml,
    /// Any other workbook container (`.xls`, `.xlsb`, `.ods`).
    Workbook,
    Text,
}

impl NativeFormat {
    pub fn label(self) -> &'static str {
        match self {
            NativeFormat::Ooxml => "xlsx",
            NativeFormat::Workbook => "binary workbook",
            NativeFormat::Text => "text",
        }
    }
}

/// Handle to one sheet of an opened document, as extractors need it.
#[derive(Clone, Debug, PartialEq)]
pub struct NativeSheet {
    pub path: PathBuf,
    pub format: NativeFormat,
    pub sheet: String,
}

/// Reads normalized facts out of a sheet.
///
/// Property lists select which facts are reported; an empty list means all
/// of them. Unknown property names are rejected before extraction, so
/// implementations may ignore names they do not recognize.
pub trait StructuralExtractor {
    /// Sparkline location -> data range formula.
    fn sparklines(&self, sheet: &NativeSheet) -> Result<BTreeMap<String, String>>;

    /// Charts keyed by their series references.
    fn charts(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable>;

    /// Cell styles keyed by coordinate, plus conditional formatting rules.
    fn styles(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable>;

    /// Top-left cell of the scrolling area when panes are set.
    fn freeze_panes(&self, sheet: &NativeSheet) -> Result<Option<String>>;

    /// Zoom scale in percent; 100 when not set.
    fn zoom(&self, sheet: &NativeSheet) -> Result<f64>;

    fn data_validations(&self, sheet: &NativeSheet) -> Result<Vec<DataValidation>>;

    /// Row dimensions keyed by 1-based row number.
    fn row_props(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable>;

    /// Column dimensions keyed by column letters.
    fn col_props(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable>;

    /// Auto filter, filter columns and sort state.
    fn filters(&self, sheet: &NativeSheet) -> Result<FactTable>;

    /// Pivot tables anchored on the sheet, keyed by location.
    fn pivot_tables(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable>;

    /// One style property of one cell.
    fn cell_style(&self, sheet: &NativeSheet, cell: CellRef, property: &str) -> Result<FactValue>;
}

/// Keep only the requested properties (all when `props` is empty).
pub(crate) fn select_props(
    facts: BTreeMap<String, FactValue>,
    props: &[String],
) -> BTreeMap<String, FactValue> {
    if props.is_empty() {
        return facts;
    }
    facts
        .into_iter()
        .filter(|(name, _)| props.iter().any(|p| p == name))
        .collect()
}
