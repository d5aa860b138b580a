//! The rule language of `compare_table`.
//!
//! A task lists rules as JSON objects, `{"type": <kind>, ...params}`. Each
//! kind has its own parameter struct; [`Rule::from_json`] picks the struct by
//! the `type` tag and [`Rule::validate`] checks everything that can be
//! checked without opening a document (sheet reference grammar, ranges,
//! coordinates, predicate methods, property names).

use crate::extract::{
    CHART_PROPERTIES, COLUMN_PROPERTIES, DATA_VALIDATION_ATTRIBUTES, PIVOT_PROPERTIES,
    ROW_PROPERTIES, STYLE_PROPERTIES,
};
use gridcheck_engine::engine::{
    CellRef, ConfigError, DEFAULT_FUZZY_THRESHOLD, MatchKind, MultiCellRange, Normalization,
    PredicateSpec, RawSheetRef,
};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;

pub const DEFAULT_PRECISION: u32 = 4;

/// Values used when a rule leaves a parameter out.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Defaults {
    pub precision: u32,
    pub fuzzy_threshold: f64,
}

impl Default for Defaults {
    fn default() -> Self {
        Defaults {
            precision: DEFAULT_PRECISION,
            fuzzy_threshold: DEFAULT_FUZZY_THRESHOLD,
        }
    }
}

/// Two sheets compared with each other.
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SheetPair {
    pub sheet_idx0: RawSheetRef,
    pub sheet_idx1: RawSheetRef,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SheetDataRule {
    #[serde(flatten)]
    pub sheets: SheetPair,
    #[serde(default)]
    pub precision: Option<u32>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SheetPrintRule {
    #[serde(flatten)]
    pub sheets: SheetPair,
    #[serde(default)]
    pub ignore_case: bool,
}

/// A fuzzy range: `"A1:B6 C2:E5"` or `["A1:B6", "C2:E5"]`.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(untagged)]
pub enum RangeSpec {
    One(String),
    Many(Vec<String>),
}

impl RangeSpec {
    pub fn parse(&self) -> Result<MultiCellRange, ConfigError> {
        match self {
            RangeSpec::One(text) => MultiCellRange::parse(text),
            RangeSpec::Many(parts) => MultiCellRange::parse_all(parts),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct FuzzyRangeRule {
    pub range: RangeSpec,
    #[serde(rename = "type")]
    pub kind: MatchKind,
    #[serde(default)]
    pub threshold: Option<f64>,
    #[serde(flatten)]
    pub normalization: Normalization,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct SheetFuzzyRule {
    #[serde(flatten)]
    pub sheets: SheetPair,
    pub rules: Vec<FuzzyRangeRule>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ChartRule {
    #[serde(flatten)]
    pub sheets: SheetPair,
    #[serde(default)]
    pub chart_props: Vec<String>,
}

/// Sheet pair plus a property selection (`style`, `row_props`, `col_props`).
#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PropsRule {
    #[serde(flatten)]
    pub sheets: SheetPair,
    #[serde(default)]
    pub props: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct PivotTableRule {
    #[serde(flatten)]
    pub sheets: SheetPair,
    #[serde(default)]
    pub pivot_props: Vec<String>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct ZoomRule {
    pub sheet_idx: RawSheetRef,
    #[serde(flatten)]
    pub check: PredicateSpec,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct DataValidationRule {
    pub sheet_idx: RawSheetRef,
    pub dv_props: Vec<BTreeMap<String, PredicateSpec>>,
}

#[derive(Clone, Debug, PartialEq, Deserialize)]
pub struct CheckCellRule {
    pub sheet_idx: RawSheetRef,
    pub coordinate: String,
    pub props: BTreeMap<String, PredicateSpec>,
}

#[derive(Clone, Debug, PartialEq)]
pub enum Rule {
    SheetName,
    SheetData(SheetDataRule),
    SheetPrint(SheetPrintRule),
    SheetFuzzy(SheetFuzzyRule),
    Sparkline(SheetPair),
    Chart(ChartRule),
    Style(PropsRule),
    Freeze(SheetPair),
    Zoom(ZoomRule),
    DataValidation(DataValidationRule),
    RowProps(PropsRule),
    ColProps(PropsRule),
    Filter(SheetPair),
    PivotTable(PivotTableRule),
    CheckCell(CheckCellRule),
}

fn params<T: DeserializeOwned>(kind: &str, value: &JsonValue) -> Result<T, ConfigError> {
    serde_json::from_value(value.clone()).map_err(|e| ConfigError::invalid(kind, e.to_string()))
}

fn pair(sheets: &SheetPair) -> Vec<&RawSheetRef> {
    vec![&sheets.sheet_idx0, &sheets.sheet_idx1]
}

fn check_names(field: &str, names: &[String], allowed: &[&str]) -> Result<(), ConfigError> {
    match names.iter().find(|n| !allowed.contains(&n.as_str())) {
        Some(unknown) => Err(ConfigError::invalid(field, format!("unknown property `{}`", unknown))),
        None => Ok(()),
    }
}

impl Rule {
    pub fn from_json(value: &JsonValue) -> Result<Rule, ConfigError> {
        let kind = value
            .get("type")
            .and_then(JsonValue::as_str)
            .ok_or_else(|| ConfigError::invalid("type", "rule needs a string `type`"))?;
        Ok(match kind {
            "sheet_name" => Rule::SheetName,
            "sheet_data" => Rule::SheetData(params(kind, value)?),
            "sheet_print" => Rule::SheetPrint(params(kind, value)?),
            "sheet_fuzzy" => Rule::SheetFuzzy(params(kind, value)?),
            "sparkline" => Rule::Sparkline(params(kind, value)?),
            "chart" => Rule::Chart(params(kind, value)?),
            "style" => Rule::Style(params(kind, value)?),
            "freeze" => Rule::Freeze(params(kind, value)?),
            "zoom" => Rule::Zoom(params(kind, value)?),
            "data_validation" => Rule::DataValidation(params(kind, value)?),
            "row_props" => Rule::RowProps(params(kind, value)?),
            "col_props" => Rule::ColProps(params(kind, value)?),
            "filter" => Rule::Filter(params(kind, value)?),
            "pivot_table" => Rule::PivotTable(params(kind, value)?),
            "check_cell" => Rule::CheckCell(params(kind, value)?),
            other => return Err(ConfigError::UnknownRuleType(other.to_string())),
        })
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Rule::SheetName => "sheet_name",
            Rule::SheetData(_) => "sheet_data",
            Rule::SheetPrint(_) => "sheet_print",
            Rule::SheetFuzzy(_) => "sheet_fuzzy",
            Rule::Sparkline(_) => "sparkline",
            Rule::Chart(_) => "chart",
            Rule::Style(_) => "style",
            Rule::Freeze(_) => "freeze",
            Rule::Zoom(_) => "zoom",
            Rule::DataValidation(_) => "data_validation",
            Rule::RowProps(_) => "row_props",
            Rule::ColProps(_) => "col_props",
            Rule::Filter(_) => "filter",
            Rule::PivotTable(_) => "pivot_table",
            Rule::CheckCell(_) => "check_cell",
        }
    }

    fn sheet_refs(&self) -> Vec<&RawSheetRef> {
        match self {
            Rule::SheetName => Vec::new(),
            Rule::SheetData(r) => pair(&r.sheets),
            Rule::SheetPrint(r) => pair(&r.sheets),
            Rule::SheetFuzzy(r) => pair(&r.sheets),
            Rule::Sparkline(p) | Rule::Freeze(p) | Rule::Filter(p) => pair(p),
            Rule::Chart(r) => pair(&r.sheets),
            Rule::Style(r) | Rule::RowProps(r) | Rule::ColProps(r) => pair(&r.sheets),
            Rule::PivotTable(r) => pair(&r.sheets),
            Rule::Zoom(r) => vec![&r.sheet_idx],
            Rule::DataValidation(r) => vec![&r.sheet_idx],
            Rule::CheckCell(r) => vec![&r.sheet_idx],
        }
    }

    /// Reject anything that would make the rule meaningless, before any
    /// document is opened.
    pub fn validate(&self) -> Result<(), ConfigError> {
        for selector in self.sheet_refs() {
            selector.parse()?;
        }
        match self {
            Rule::SheetFuzzy(r) => {
                for sub in &r.rules {
                    sub.range.parse()?;
                    if let Some(t) = sub.threshold
                        && !(0.0..=100.0).contains(&t)
                    {
                        return Err(ConfigError::invalid("threshold", format!("{} is outside 0..=100", t)));
                    }
                }
            }
            Rule::Chart(r) => check_names("chart_props", &r.chart_props, &CHART_PROPERTIES)?,
            Rule::Style(r) => {
                if let Some(unknown) = r.props.iter().find(|p| !STYLE_PROPERTIES.contains(&p.as_str())) {
                    return Err(ConfigError::UnknownStyleProperty(unknown.clone()));
                }
            }
            Rule::RowProps(r) => check_names("props", &r.props, &ROW_PROPERTIES)?,
            Rule::ColProps(r) => check_names("props", &r.props, &COLUMN_PROPERTIES)?,
            Rule::PivotTable(r) => check_names("pivot_props", &r.pivot_props, &PIVOT_PROPERTIES)?,
            Rule::Zoom(r) => {
                r.check.compile()?;
            }
            Rule::DataValidation(r) => {
                for entry in &r.dv_props {
                    for (attribute, check) in entry {
                        if !DATA_VALIDATION_ATTRIBUTES.contains(&attribute.as_str()) {
                            return Err(ConfigError::invalid(
                                "dv_props",
                                format!("unknown data validation attribute `{}`", attribute),
                            ));
                        }
                        check.compile()?;
                    }
                }
            }
            Rule::CheckCell(r) => {
                CellRef::parse_coordinate(&r.coordinate)?;
                for (property, check) in &r.props {
                    let known = property == "value"
                        || property == "formula"
                        || STYLE_PROPERTIES.contains(&property.as_str());
                    if !known {
                        return Err(ConfigError::UnknownStyleProperty(property.clone()));
                    }
                    check.compile()?;
                }
            }
            Rule::SheetName
            | Rule::SheetData(_)
            | Rule::SheetPrint(_)
            | Rule::Sparkline(_)
            | Rule::Freeze(_)
            | Rule::Filter(_) => {}
        }
        Ok(())
    }
}

/// Options of the `compare_table` checker: `{"rules": [...]}`.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct TableOptions {
    pub rules: Vec<Rule>,
    pub defaults: Defaults,
}

impl TableOptions {
    pub fn new(rules: Vec<Rule>) -> TableOptions {
        TableOptions {
            rules,
            defaults: Defaults::default(),
        }
    }

    pub fn with_defaults(mut self, defaults: Defaults) -> TableOptions {
        self.defaults = defaults;
        self
    }

    /// Accepts `{"rules": [...]}` or a bare rule array.
    pub fn from_json(value: &JsonValue) -> Result<TableOptions, ConfigError> {
        let list = match value {
            JsonValue::Array(items) => items,
            JsonValue::Object(map) => map
                .get("rules")
                .and_then(JsonValue::as_array)
                .ok_or_else(|| ConfigError::invalid("rules", "expected a list of rules"))?,
            _ => return Err(ConfigError::invalid("rules", "expected a list of rules")),
        };
        let rules = list.iter().map(Rule::from_json).collect::<Result<Vec<_>, _>>()?;
        Ok(TableOptions::new(rules))
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        self.rules.iter().try_for_each(Rule::validate)
    }
}
