//! [`StructuralExtractor`] over the parts of an `.xlsx` package.

use super::package::{Package, Relationship};
use super::styles::{Font, Stylesheet};
use super::xml::Element;
use super::{
    DataValidation, FactTable, FactValue, NativeFormat, NativeSheet, StructuralExtractor,
    select_props,
};
use crate::error::{GridcheckError, Result};
use gridcheck_engine::engine::{CellRange, CellRef};
use std::collections::{BTreeMap, HashMap};
use tracing::debug;

/// Reads facts straight from the worksheet, drawing, chart, pivot and style
/// parts. Every call opens the package afresh and closes it on return.
#[derive(Clone, Copy, Debug, Default)]
pub struct OoxmlExtractor;

const MAX_COLUMNS: usize = 16_384;

/// A worksheet part and the package it came from.
struct SheetPart {
    package: Package,
    part: String,
    root: Element,
}

impl SheetPart {
    fn related(&mut self, kind: &str) -> Result<Vec<Relationship>> {
        Ok(self
            .package
            .relationships(&self.part)?
            .into_iter()
            .filter(|r| r.is(kind) && !r.external)
            .collect())
    }
}

/// Everything needed to answer style questions about single cells.
struct StyleContext {
    styles: Stylesheet,
    cell_styles: HashMap<CellRef, usize>,
    merged: Vec<CellRange>,
    hyperlinks: Vec<(CellRange, String)>,
}

impl OoxmlExtractor {
    pub fn new() -> OoxmlExtractor {
        OoxmlExtractor
    }

    fn open(&self, sheet: &NativeSheet) -> Result<SheetPart> {
        if sheet.format != NativeFormat::Ooxml {
            return Err(GridcheckError::Unsupported(sheet.format.label().to_string()));
        }
        let mut package = Package::open(&sheet.path)?;
        let part = package.sheet_part(&sheet.sheet)?;
        let root = package.xml(&part)?;
        debug!(path = %sheet.path.display(), sheet = %sheet.sheet, part = %part, "read worksheet part");
        Ok(SheetPart {
            package,
            part,
            root,
        })
    }

    fn style_context(&self, sheet: &mut SheetPart) -> Result<StyleContext> {
        let styles = sheet
            .package
            .xml_optional("xl/styles.xml")?
            .map(|root| Stylesheet::from_element(&root))
            .unwrap_or_default();

        let cell_styles = sheet_cells(&sheet.root)
            .filter_map(|(cell, c)| Some((cell, c.attr("s")?.parse().ok()?)))
            .collect();

        let merged = sheet
            .root
            .child("mergeCells")
            .map(|m| {
                m.children_named("mergeCell")
                    .filter_map(|mc| CellRange::parse(mc.attr("ref")?).ok())
                    .collect()
            })
            .unwrap_or_default();

        // Hyperlink relationships are usually external, so `related` would drop them.
        let links: Vec<Relationship> = sheet
            .package
            .relationships(&sheet.part)?
            .into_iter()
            .filter(|r| r.is("hyperlink"))
            .collect();
        let hyperlinks = sheet
            .root
            .child("hyperlinks")
            .map(|h| {
                h.children_named("hyperlink")
                    .filter_map(|link| {
                        let range = CellRange::parse(link.attr("ref")?).ok()?;
                        let target = match link.attr("id") {
                            Some(id) => links.iter().find(|r| r.id == id)?.target.clone(),
                            None => link.attr("location")?.to_string(),
                        };
                        Some((range, target))
                    })
                    .collect()
            })
            .unwrap_or_default();

        Ok(StyleContext {
            styles,
            cell_styles,
            merged,
            hyperlinks,
        })
    }
}

/// `(coordinate, <c> element)` for every cell written in `sheetData`.
fn sheet_cells(root: &Element) -> impl Iterator<Item = (CellRef, &Element)> {
    root.child("sheetData")
        .into_iter()
        .flat_map(|data| data.children.iter().filter(|r| r.name == "row"))
        .flat_map(|row| row.children.iter().filter(|c| c.name == "c"))
        .filter_map(|c| Some((CellRef::from_str(c.attr("r")?)?, c)))
}

impl StyleContext {
    fn property(&self, cell: &CellRef, property: &str) -> FactValue {
        let xf = self
            .styles
            .cell_format(self.cell_styles.get(cell).copied().unwrap_or(0));
        let font = || self.styles.font(xf.font_id);
        let fill = || self.styles.fill(xf.fill_id);
        match property {
            "number_format" => FactValue::Text(self.styles.number_format(xf.num_fmt_id)),
            "font_name" => FactValue::text(font().name.as_deref()),
            "font_family" => FactValue::number(font().family),
            "font_color" => font().color,
            "font_bold" => FactValue::Bool(font().bold),
            "font_italic" => FactValue::Bool(font().italic),
            "font_underline" => FactValue::text(font().underline.as_deref()),
            "font_size" => FactValue::number(font().size),
            "fill_type" => FactValue::text(fill().pattern_type.as_deref()),
            "bgcolor" => fill().bg_color,
            "fgcolor" => fill().fg_color,
            "hyperlink" => FactValue::text(
                self.hyperlinks
                    .iter()
                    .find(|(range, _)| range.contains(cell))
                    .map(|(_, target)| target.as_str()),
            ),
            "merge" => FactValue::Bool(self.merged.iter().any(|range| range.contains(cell))),
            "horizontal_alignment" => FactValue::text(xf.horizontal.as_deref()),
            "vertical_alignment" => FactValue::text(xf.vertical.as_deref()),
            "wrap_text" => FactValue::Bool(xf.wrap_text),
            _ => FactValue::Missing,
        }
    }
}

fn font_facts(font: &Font, facts: &mut BTreeMap<String, FactValue>) {
    facts.insert("font_name".into(), FactValue::text(font.name.as_deref()));
    facts.insert("font_color".into(), font.color.clone());
    facts.insert("font_bold".into(), FactValue::Bool(font.bold));
    facts.insert("font_italic".into(), FactValue::Bool(font.italic));
    facts.insert("font_underline".into(), FactValue::text(font.underline.as_deref()));
    facts.insert("font_size".into(), FactValue::number(font.size));
}

fn number(element: &Element, name: &str) -> FactValue {
    FactValue::number(element.attr(name).and_then(|v| v.parse().ok()))
}

/// Concatenated `<a:t>` runs of a `<c:title>`.
fn title_text(title: Option<&Element>) -> FactValue {
    match title {
        Some(title) => FactValue::Text(
            title
                .descendants("t")
                .iter()
                .map(|t| t.text.as_str())
                .collect(),
        ),
        None => FactValue::Missing,
    }
}

fn formula_of(series: &Element, path: &[&str]) -> Option<String> {
    series.find(path).map(|f| f.text.clone())
}

fn series_key(series: &Element) -> String {
    let values = formula_of(series, &["val", "numRef", "f"])
        .or_else(|| formula_of(series, &["yVal", "numRef", "f"]))
        .unwrap_or_default();
    let categories = formula_of(series, &["cat", "numRef", "f"])
        .or_else(|| formula_of(series, &["cat", "strRef", "f"]))
        .or_else(|| formula_of(series, &["xVal", "numRef", "f"]))
        .or_else(|| formula_of(series, &["xVal", "strRef", "f"]));
    match categories {
        Some(categories) => format!("{};{}", values, categories),
        None => values,
    }
}

/// Facts for one chart part. Returns the series key and the facts.
fn chart_facts(
    chart_space: &Element,
    anchor: Option<String>,
) -> Option<(String, BTreeMap<String, FactValue>)> {
    let chart = chart_space.child("chart")?;
    let plot_area = chart.child("plotArea")?;
    let kinds: Vec<&Element> = plot_area
        .children
        .iter()
        .filter(|c| c.name.ends_with("Chart"))
        .collect();
    let first = kinds.first()?;

    let key = kinds
        .iter()
        .flat_map(|k| k.children_named("ser"))
        .map(series_key)
        .collect::<Vec<_>>()
        .join(",");

    let axis_title = |axis: Option<&Element>| title_text(axis.and_then(|a| a.child("title")));
    let value_axes: Vec<&Element> = plot_area.children_named("valAx").collect();
    let category_axis = plot_area
        .child("catAx")
        .or_else(|| plot_area.child("dateAx"));
    let (x_axis, y_axis) = match category_axis {
        Some(cat) => (Some(cat), value_axes.first().copied()),
        // Scatter charts have two value axes; the bottom one is x.
        None => {
            let bottom = value_axes
                .iter()
                .copied()
                .find(|a| a.child_val("axPos") == Some("b"));
            let other = value_axes
                .iter()
                .copied()
                .find(|a| a.child_val("axPos") != Some("b"));
            (bottom, other)
        }
    };

    let mut facts = BTreeMap::new();
    facts.insert("type".to_string(), FactValue::Text(first.name.clone()));
    facts.insert("direction".to_string(), FactValue::text(first.child_val("barDir")));
    facts.insert("title".to_string(), title_text(chart.child("title")));
    facts.insert("xtitle".to_string(), axis_title(x_axis));
    facts.insert("ytitle".to_string(), axis_title(y_axis));
    facts.insert(
        "legend".to_string(),
        match chart.child("legend") {
            Some(legend) => FactValue::Text(legend.child_val("legendPos").unwrap_or("r").to_string()),
            None => FactValue::Missing,
        },
    );
    facts.insert("anchor".to_string(), FactValue::text(anchor.as_deref()));
    Some((key, facts))
}

/// Top-left cell of a drawing anchor (`<xdr:from>`).
fn anchor_cell(anchor: &Element) -> Option<String> {
    let from = anchor.child("from")?;
    let col = from.child("col")?.text.trim().parse().ok()?;
    let row = from.child("row")?.text.trim().parse().ok()?;
    Some(CellRef::new(col, row).to_string())
}

fn field_names(cache: &Element) -> Vec<String> {
    cache
        .child("cacheFields")
        .map(|fields| {
            fields
                .children_named("cacheField")
                .map(|f| f.attr("name").unwrap_or_default().to_string())
                .collect()
        })
        .unwrap_or_default()
}

fn field_name(names: &[String], index: Option<&str>) -> String {
    match index.and_then(|i| i.parse::<i64>().ok()) {
        // -2 is the synthetic "Values" field.
        Some(-2) => "Values".to_string(),
        Some(i) => usize::try_from(i)
            .ok()
            .and_then(|i| names.get(i))
            .cloned()
            .unwrap_or_else(|| i.to_string()),
        None => String::new(),
    }
}

fn pivot_field_list(
    table: &Element,
    container: &str,
    item: &str,
    attr: &str,
    names: &[String],
) -> FactValue {
    match table.child(container) {
        Some(list) => FactValue::Text(
            list.children
                .iter()
                .filter(|f| f.name == item)
                .map(|f| field_name(names, f.attr(attr)))
                .collect::<Vec<_>>()
                .join(","),
        ),
        None => FactValue::Missing,
    }
}

impl StructuralExtractor for OoxmlExtractor {
    fn sparklines(&self, sheet: &NativeSheet) -> Result<BTreeMap<String, String>> {
        let part = self.open(sheet)?;
        Ok(part
            .root
            .descendants("sparkline")
            .into_iter()
            .filter_map(|s| {
                let location = s.child("sqref")?.text.clone();
                let data = s.child("f").map(|f| f.text.clone()).unwrap_or_default();
                Some((location, data))
            })
            .collect())
    }

    fn charts(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable> {
        let mut part = self.open(sheet)?;
        let mut table = FactTable::new();
        for drawing in part.related("drawing")? {
            let Some(root) = part.package.xml_optional(&drawing.target)? else {
                continue;
            };
            let chart_rels = part.package.relationships(&drawing.target)?;
            for anchor in &root.children {
                for chart_ref in anchor.descendants("chart") {
                    let Some(rel) = chart_ref
                        .attr("id")
                        .and_then(|id| chart_rels.iter().find(|r| r.id == id))
                    else {
                        continue;
                    };
                    let chart_space = part.package.xml(&rel.target)?;
                    if let Some((key, facts)) = chart_facts(&chart_space, anchor_cell(anchor)) {
                        table.insert(key, select_props(facts, props));
                    }
                }
            }
        }
        Ok(table)
    }

    fn styles(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable> {
        let mut part = self.open(sheet)?;
        let context = self.style_context(&mut part)?;
        let mut table = FactTable::new();

        let wanted: Vec<&str> = if props.is_empty() {
            super::STYLE_PROPERTIES.to_vec()
        } else {
            props.iter().map(String::as_str).collect()
        };
        for (cell, _) in sheet_cells(&part.root) {
            let facts = wanted
                .iter()
                .map(|p| (p.to_string(), context.property(&cell, p)))
                .collect();
            table.insert(cell.to_string(), facts);
        }

        for formatting in part.root.children_named("conditionalFormatting") {
            let sqref = formatting.attr("sqref").unwrap_or_default();
            for rule in formatting.children_named("cfRule") {
                let mut dxf_facts = BTreeMap::new();
                if let Some(dxf) = rule
                    .attr("dxfId")
                    .and_then(|id| id.parse::<usize>().ok())
                    .and_then(|id| context.styles.differential.get(id))
                {
                    if let Some(font) = &dxf.font {
                        font_facts(font, &mut dxf_facts);
                    }
                    if let Some(fill) = &dxf.fill {
                        dxf_facts.insert("fill_type".into(), FactValue::text(fill.pattern_type.as_deref()));
                        dxf_facts.insert("bgcolor".into(), fill.bg_color.clone());
                        dxf_facts.insert("fgcolor".into(), fill.fg_color.clone());
                    }
                    if let Some(format) = &dxf.number_format {
                        dxf_facts.insert("number_format".into(), FactValue::Text(format.clone()));
                    }
                }
                let mut facts = select_props(dxf_facts, props);
                facts.insert("type".into(), FactValue::text(rule.attr("type")));
                facts.insert("operator".into(), FactValue::text(rule.attr("operator")));
                facts.insert(
                    "formula".into(),
                    FactValue::Text(
                        rule.children_named("formula")
                            .map(|f| f.text.as_str())
                            .collect::<Vec<_>>()
                            .join(";"),
                    ),
                );
                let priority = rule.attr("priority").unwrap_or_default();
                table.insert(format!("conditional {} #{}", sqref, priority), facts);
            }
        }
        Ok(table)
    }

    fn freeze_panes(&self, sheet: &NativeSheet) -> Result<Option<String>> {
        let part = self.open(sheet)?;
        Ok(part
            .root
            .find(&["sheetViews", "sheetView", "pane"])
            .and_then(|pane| pane.attr("topLeftCell"))
            .map(str::to_string))
    }

    fn zoom(&self, sheet: &NativeSheet) -> Result<f64> {
        let part = self.open(sheet)?;
        Ok(part
            .root
            .find(&["sheetViews", "sheetView"])
            .and_then(|view| view.attr("zoomScale"))
            .and_then(|z| z.parse::<f64>().ok())
            .filter(|z| *z > 0.0)
            .unwrap_or(100.0))
    }

    fn data_validations(&self, sheet: &NativeSheet) -> Result<Vec<DataValidation>> {
        let part = self.open(sheet)?;
        Ok(part
            .root
            .descendants("dataValidation")
            .into_iter()
            .map(|dv| {
                let text = |name: &str| dv.attr(name).map(str::to_string);
                let formula = |name: &str| {
                    dv.child(name)
                        .map(|f| f.text_content().trim().to_string())
                };
                // Extension-list validations keep the range in a child element.
                let ranges = dv
                    .attr("sqref")
                    .map(str::to_string)
                    .or_else(|| dv.child("sqref").map(|s| s.text.clone()))
                    .unwrap_or_default();
                DataValidation {
                    ranges,
                    kind: text("type"),
                    operator: text("operator"),
                    formula1: formula("formula1"),
                    formula2: formula("formula2"),
                    allow_blank: dv.flag("allowBlank", false),
                    show_drop_down: dv.flag("showDropDown", false),
                    show_input_message: dv.flag("showInputMessage", false),
                    show_error_message: dv.flag("showErrorMessage", false),
                    error: text("error"),
                    error_title: text("errorTitle"),
                    error_style: text("errorStyle"),
                    prompt: text("prompt"),
                    prompt_title: text("promptTitle"),
                    ime_mode: text("imeMode"),
                }
            })
            .collect())
    }

    fn row_props(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable> {
        let part = self.open(sheet)?;
        let mut table = FactTable::new();
        let rows = part
            .root
            .child("sheetData")
            .into_iter()
            .flat_map(|data| data.children_named("row"));
        for row in rows {
            let customized = ["ht", "hidden", "outlineLevel", "collapsed"]
                .iter()
                .any(|a| row.attr(a).is_some());
            let Some(index) = row.attr("r").filter(|_| customized) else {
                continue;
            };
            let mut facts = BTreeMap::new();
            facts.insert("height".to_string(), number(row, "ht"));
            facts.insert("hidden".to_string(), FactValue::Bool(row.flag("hidden", false)));
            facts.insert(
                "outline_level".to_string(),
                FactValue::Number(row.attr("outlineLevel").and_then(|v| v.parse().ok()).unwrap_or(0.0)),
            );
            facts.insert("collapsed".to_string(), FactValue::Bool(row.flag("collapsed", false)));
            table.insert(index.to_string(), select_props(facts, props));
        }
        Ok(table)
    }

    fn col_props(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable> {
        let part = self.open(sheet)?;
        let mut table = FactTable::new();
        let cols = part
            .root
            .child("cols")
            .into_iter()
            .flat_map(|cols| cols.children_named("col"));
        for col in cols {
            let bound = |name: &str| col.attr(name).and_then(|v| v.parse::<usize>().ok());
            let (Some(min), Some(max)) = (bound("min"), bound("max")) else {
                continue;
            };
            let mut facts = BTreeMap::new();
            facts.insert("width".to_string(), number(col, "width"));
            facts.insert("hidden".to_string(), FactValue::Bool(col.flag("hidden", false)));
            facts.insert(
                "outline_level".to_string(),
                FactValue::Number(col.attr("outlineLevel").and_then(|v| v.parse().ok()).unwrap_or(0.0)),
            );
            facts.insert("collapsed".to_string(), FactValue::Bool(col.flag("collapsed", false)));
            let facts = select_props(facts, props);
            // `min`/`max` are 1-based and inclusive.
            for index in min.max(1)..=max.min(MAX_COLUMNS) {
                table.insert(CellRef::col_to_letters(index - 1), facts.clone());
            }
        }
        Ok(table)
    }

    fn filters(&self, sheet: &NativeSheet) -> Result<FactTable> {
        let part = self.open(sheet)?;
        let mut table = FactTable::new();

        if let Some(filter) = part.root.child("autoFilter") {
            let mut facts = BTreeMap::new();
            facts.insert("ref".to_string(), FactValue::text(filter.attr("ref")));
            table.insert("auto_filter".to_string(), facts);

            for column in filter.children_named("filterColumn") {
                let mut facts = BTreeMap::new();
                if let Some(values) = column.child("filters") {
                    let listed: Vec<&str> = values
                        .children_named("filter")
                        .filter_map(|f| f.attr("val"))
                        .collect();
                    facts.insert("values".to_string(), FactValue::Text(listed.join(",")));
                    facts.insert("blank".to_string(), FactValue::Bool(values.flag("blank", false)));
                }
                if let Some(custom) = column.child("customFilters") {
                    let conditions: Vec<String> = custom
                        .children_named("customFilter")
                        .map(|f| {
                            format!(
                                "{} {}",
                                f.attr("operator").unwrap_or("equal"),
                                f.attr("val").unwrap_or_default()
                            )
                        })
                        .collect();
                    facts.insert("custom".to_string(), FactValue::Text(conditions.join(";")));
                    facts.insert("and".to_string(), FactValue::Bool(custom.flag("and", false)));
                }
                let id = column.attr("colId").unwrap_or_default();
                table.insert(format!("filter_column {}", id), facts);
            }
        }

        let sort_state = part
            .root
            .child("sortState")
            .or_else(|| part.root.find(&["autoFilter", "sortState"]));
        if let Some(sort) = sort_state {
            let conditions: Vec<String> = sort
                .children_named("sortCondition")
                .map(|c| {
                    let order = if c.flag("descending", false) { "desc" } else { "asc" };
                    format!("{} {}", c.attr("ref").unwrap_or_default(), order)
                })
                .collect();
            let mut facts = BTreeMap::new();
            facts.insert("ref".to_string(), FactValue::text(sort.attr("ref")));
            facts.insert("conditions".to_string(), FactValue::Text(conditions.join(",")));
            table.insert("sort_state".to_string(), facts);
        }
        Ok(table)
    }

    fn pivot_tables(&self, sheet: &NativeSheet, props: &[String]) -> Result<FactTable> {
        let mut part = self.open(sheet)?;
        let mut table = FactTable::new();
        for pivot in part.related("pivotTable")? {
            let definition = part.package.xml(&pivot.target)?;
            let cache_rels = part.package.relationships(&pivot.target)?;
            let cache = match cache_rels.iter().find(|r| r.is("pivotCacheDefinition")) {
                Some(rel) => part.package.xml_optional(&rel.target)?,
                None => None,
            };
            let names = cache.as_ref().map(field_names).unwrap_or_default();
            let source = cache
                .as_ref()
                .and_then(|c| c.find(&["cacheSource", "worksheetSource"]))
                .map(|ws| match (ws.attr("sheet"), ws.attr("ref"), ws.attr("name")) {
                    (Some(sheet), Some(range), _) => format!("{}!{}", sheet, range),
                    (None, Some(range), _) => range.to_string(),
                    (_, None, Some(name)) => name.to_string(),
                    _ => String::new(),
                });

            let location = definition
                .child("location")
                .and_then(|l| l.attr("ref"))
                .unwrap_or_default()
                .to_string();
            let data_fields = match definition.child("dataFields") {
                Some(list) => FactValue::Text(
                    list.children_named("dataField")
                        .map(|f| {
                            format!(
                                "{}:{}",
                                field_name(&names, f.attr("fld")),
                                f.attr("subtotal").unwrap_or("sum")
                            )
                        })
                        .collect::<Vec<_>>()
                        .join(","),
                ),
                None => FactValue::Missing,
            };

            let mut facts = BTreeMap::new();
            facts.insert("name".to_string(), FactValue::text(definition.attr("name")));
            facts.insert("source".to_string(), FactValue::text(source.as_deref()));
            facts.insert("location".to_string(), FactValue::Text(location.clone()));
            facts.insert(
                "row_fields".to_string(),
                pivot_field_list(&definition, "rowFields", "field", "x", &names),
            );
            facts.insert(
                "col_fields".to_string(),
                pivot_field_list(&definition, "colFields", "field", "x", &names),
            );
            facts.insert("data_fields".to_string(), data_fields);
            facts.insert(
                "page_fields".to_string(),
                pivot_field_list(&definition, "pageFields", "pageField", "fld", &names),
            );
            if props.is_empty() {
                // Table names differ between otherwise identical workbooks.
                facts.remove("name");
            }
            table.insert(location, select_props(facts, props));
        }
        Ok(table)
    }

    fn cell_style(&self, sheet: &NativeSheet, cell: CellRef, property: &str) -> Result<FactValue> {
        let mut part = self.open(sheet)?;
        let context = self.style_context(&mut part)?;
        Ok(context.property(&cell, property))
    }
}
