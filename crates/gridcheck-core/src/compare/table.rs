use super::primitives::{
    data_validations_match, frames_equal, fuzzy_ranges_match, lines_equal, sheet_names_equal,
};
use crate::document::{Document, SheetSource};
use crate::error::Result;
use crate::extract::{NativeSheet, OoxmlExtractor, StructuralExtractor};
use crate::rules::{Defaults, Rule, SheetPair, TableOptions};
use gridcheck_engine::engine::{CellRef, Predicate, PredicateSpec, RawSheetRef, ResolvedSheet, Source};
use serde_json::Value as JsonValue;
use std::collections::BTreeMap;
use std::fmt::Debug;
use std::path::Path;
use tracing::{debug, error, info};

/// Grade `result` against `expected` with the default OOXML extractor.
///
/// Returns `Ok(1.0)` when every rule holds and `Ok(0.0)` as soon as one
/// fails or a document/sheet cannot be read. Only a malformed rule list is
/// an `Err`.
pub fn compare_table(result: &Path, expected: Option<&Path>, options: &TableOptions) -> Result<f64> {
    compare_table_with(&OoxmlExtractor::new(), result, expected, options)
}

pub fn compare_table_with<E: StructuralExtractor + ?Sized>(
    extractor: &E,
    result: &Path,
    expected: Option<&Path>,
    options: &TableOptions,
) -> Result<f64> {
    options.validate()?;

    let result_doc = match Document::open(result) {
        Ok(doc) => doc,
        Err(e) => {
            error!(path = %result.display(), error = %e, "failed to open result document");
            return Ok(0.0);
        }
    };
    let expected_doc = match expected.map(Document::open).transpose() {
        Ok(doc) => doc,
        Err(e) => {
            error!(path = ?expected, error = %e, "failed to open expected document");
            return Ok(0.0);
        }
    };

    let mut run = TableRun {
        sheets: SheetSource::new(result_doc, expected_doc),
        extractor,
        defaults: options.defaults,
    };
    for (index, rule) in options.rules.iter().enumerate() {
        let passed = run.check(rule)?;
        debug!(index, rule = rule.kind(), passed, "assertion");
        if !passed {
            info!(index, rule = rule.kind(), "rule failed");
            return Ok(0.0);
        }
    }
    Ok(1.0)
}

struct TableRun<'a, E: StructuralExtractor + ?Sized> {
    sheets: SheetSource,
    extractor: &'a E,
    defaults: Defaults,
}

fn compile_all(specs: &BTreeMap<String, PredicateSpec>) -> Result<BTreeMap<String, Predicate>> {
    specs
        .iter()
        .map(|(name, spec)| -> Result<(String, Predicate)> { Ok((name.clone(), spec.compile()?)) })
        .collect()
}

impl<E: StructuralExtractor + ?Sized> TableRun<'_, E> {
    fn resolve(&self, selector: &RawSheetRef) -> Result<Option<ResolvedSheet>> {
        Ok(self.sheets.resolve(selector)?)
    }

    fn resolve_pair(&self, pair: &SheetPair) -> Result<Option<(ResolvedSheet, ResolvedSheet)>> {
        let left = self.resolve(&pair.sheet_idx0)?;
        let right = self.resolve(&pair.sheet_idx1)?;
        Ok(left.zip(right))
    }

    /// Run one extractor query; read failures are logged and yield `None`.
    fn fact<T>(
        &self,
        sheet: &ResolvedSheet,
        query: impl FnOnce(&E, &NativeSheet) -> Result<T>,
    ) -> Option<T> {
        let native = self.sheets.native(sheet)?;
        match query(self.extractor, &native) {
            Ok(value) => Some(value),
            Err(e) => {
                error!(path = %native.path.display(), sheet = %native.sheet, error = %e, "failed to read sheet facts");
                None
            }
        }
    }

    /// Extract the same fact from both sheets and compare with `==`.
    fn facts_equal<T: PartialEq + Debug>(
        &self,
        pair: &SheetPair,
        query: impl Fn(&E, &NativeSheet) -> Result<T>,
    ) -> Result<bool> {
        let Some((left, right)) = self.resolve_pair(pair)? else {
            return Ok(false);
        };
        let (Some(a), Some(b)) = (self.fact(&left, &query), self.fact(&right, &query)) else {
            return Ok(false);
        };
        if a != b {
            debug!(left = ?a, right = ?b, "facts differ");
        }
        Ok(a == b)
    }

    fn check(&mut self, rule: &Rule) -> Result<bool> {
        match rule {
            Rule::SheetName => Ok(sheet_names_equal(
                self.sheets.sheet_names(Source::Result).unwrap_or_default(),
                self.sheets.sheet_names(Source::Expected),
            )),

            Rule::SheetData(r) => {
                let Some((left, right)) = self.resolve_pair(&r.sheets)? else {
                    return Ok(false);
                };
                let (Some(a), Some(b)) = (self.sheets.load_frame(&left), self.sheets.load_frame(&right))
                else {
                    return Ok(false);
                };
                Ok(frames_equal(&a, &b, r.precision.unwrap_or(self.defaults.precision)))
            }

            Rule::SheetPrint(r) => {
                let Some((left, right)) = self.resolve_pair(&r.sheets)? else {
                    return Ok(false);
                };
                let (Some(a), Some(b)) = (self.sheets.load_lines(&left), self.sheets.load_lines(&right))
                else {
                    return Ok(false);
                };
                Ok(lines_equal(&a, &b, r.ignore_case))
            }

            Rule::SheetFuzzy(r) => {
                let Some((left, right)) = self.resolve_pair(&r.sheets)? else {
                    return Ok(false);
                };
                let (Some(a), Some(b)) = (self.sheets.load_grid(&left), self.sheets.load_grid(&right))
                else {
                    return Ok(false);
                };
                for sub in &r.rules {
                    if !fuzzy_ranges_match(&a, &b, sub, self.defaults.fuzzy_threshold)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }

            Rule::Sparkline(pair) => self.facts_equal(pair, |x, s| x.sparklines(s)),
            Rule::Chart(r) => self.facts_equal(&r.sheets, |x, s| x.charts(s, &r.chart_props)),
            Rule::Style(r) => self.facts_equal(&r.sheets, |x, s| x.styles(s, &r.props)),
            Rule::Freeze(pair) => self.facts_equal(pair, |x, s| x.freeze_panes(s)),
            Rule::RowProps(r) => self.facts_equal(&r.sheets, |x, s| x.row_props(s, &r.props)),
            Rule::ColProps(r) => self.facts_equal(&r.sheets, |x, s| x.col_props(s, &r.props)),
            Rule::Filter(pair) => self.facts_equal(pair, |x, s| x.filters(s)),
            Rule::PivotTable(r) => {
                self.facts_equal(&r.sheets, |x, s| x.pivot_tables(s, &r.pivot_props))
            }

            Rule::Zoom(r) => {
                let check = r.check.compile()?;
                let Some(sheet) = self.resolve(&r.sheet_idx)? else {
                    return Ok(false);
                };
                let Some(zoom) = self.fact(&sheet, |x, s| x.zoom(s)) else {
                    return Ok(false);
                };
                debug!(zoom, method = %r.check.method, "zoom");
                Ok(check.evaluate(&JsonValue::from(zoom)))
            }

            Rule::DataValidation(r) => {
                let entries = r.dv_props.iter().map(compile_all).collect::<Result<Vec<_>>>()?;
                let Some(sheet) = self.resolve(&r.sheet_idx)? else {
                    return Ok(false);
                };
                let Some(validations) = self.fact(&sheet, |x, s| x.data_validations(s)) else {
                    return Ok(false);
                };
                Ok(data_validations_match(&validations, &entries))
            }

            Rule::CheckCell(r) => {
                let checks = compile_all(&r.props)?;
                let cell = CellRef::parse_coordinate(&r.coordinate)?;
                let Some(sheet) = self.resolve(&r.sheet_idx)? else {
                    return Ok(false);
                };
                for (property, check) in &checks {
                    let Some(value) = self.cell_property(&sheet, cell, property) else {
                        return Ok(false);
                    };
                    let passed = check.evaluate(&value);
                    debug!(%cell, property = %property, value = %value, passed, "cell check");
                    if !passed {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    /// `value` comes from the cell grid, `formula` from the formula grid and
    /// anything else from the extractor. `None` if the sheet is unreadable.
    fn cell_property(&mut self, sheet: &ResolvedSheet, cell: CellRef, property: &str) -> Option<JsonValue> {
        match property {
            "value" => Some(self.sheets.load_grid(sheet)?.get(&cell).to_json()),
            "formula" => Some(
                self.sheets
                    .load_formulas(sheet)?
                    .remove(&cell)
                    .map_or(JsonValue::Null, JsonValue::String),
            ),
            style => self
                .fact(sheet, |x, s| x.cell_style(s, cell, style))
                .map(|value| value.to_json()),
        }
    }
}
