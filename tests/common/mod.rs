//! Builds small `.xlsx` packages for integration tests.

#![allow(dead_code)]

use gridcheck_engine::engine::CellRef;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};
use zip::ZipWriter;
use zip::write::SimpleFileOptions;

const MAIN_NS: &str = "http://schemas.openxmlformats.org/spreadsheetml/2006/main";
const REL_NS: &str = "http://schemas.openxmlformats.org/officeDocument/2006/relationships";
const PACKAGE_REL_NS: &str = "http://schemas.openxmlformats.org/package/2006/relationships";

const STYLES: &str = r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
  <numFmts count="1"><numFmt numFmtId="164" formatCode="0.000"/></numFmts>
  <fonts count="2">
    <font><sz val="11"/><name val="Calibri"/></font>
    <font><b/><sz val="11"/><color rgb="FFFF0000"/><name val="Calibri"/></font>
  </fonts>
  <fills count="2">
    <fill><patternFill patternType="none"/></fill>
    <fill><patternFill patternType="gray125"/></fill>
  </fills>
  <borders count="1"><border/></borders>
  <cellStyleXfs count="1"><xf numFmtId="0" fontId="0" fillId="0" borderId="0"/></cellStyleXfs>
  <cellXfs count="3">
    <xf numFmtId="0" fontId="0" fillId="0" borderId="0" xfId="0"/>
    <xf numFmtId="0" fontId="1" fillId="0" borderId="0" xfId="0" applyFont="1"/>
    <xf numFmtId="164" fontId="0" fillId="0" borderId="0" xfId="0" applyNumberFormat="1"/>
  </cellXfs>
</styleSheet>"#;

/// Cell style index into the fixture stylesheet.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Style {
    Plain = 0,
    BoldRed = 1,
    ThreeDecimals = 2,
}

#[derive(Clone, Debug)]
enum Content {
    Number(f64),
    Text(String),
    Formula(String, f64),
}

/// A chart in its own drawing, anchored at one cell.
#[derive(Clone, Debug)]
struct Chart {
    anchor: CellRef,
    kind: String,
    title: String,
    values: String,
}

#[derive(Clone, Debug)]
struct Pivot {
    location: String,
    source_sheet: String,
    source_ref: String,
    fields: Vec<String>,
    row_field: usize,
    data_field: usize,
}

#[derive(Clone, Debug)]
struct AutoFilter {
    range: String,
    column: usize,
    values: Vec<String>,
}

#[derive(Clone, Debug, Default)]
struct RowFormat {
    height: Option<f64>,
    hidden: bool,
}

#[derive(Clone, Debug)]
pub struct Sheet {
    name: String,
    cells: BTreeMap<(usize, usize), (Content, Style)>,
    zoom: Option<u32>,
    freeze: Option<String>,
    rows: BTreeMap<usize, RowFormat>,
    /// `(column, width, hidden)`, 0-based column.
    columns: Vec<(usize, f64, bool)>,
    auto_filter: Option<AutoFilter>,
    /// `(range, key, descending)`
    sort: Option<(String, String, bool)>,
    /// `(sqref, type, formula1)`
    validations: Vec<(String, String, String)>,
    /// `(location, data)`
    sparklines: Vec<(String, String)>,
    chart: Option<Chart>,
    pivot: Option<Pivot>,
}

impl Sheet {
    pub fn new(name: &str) -> Sheet {
        Sheet {
            name: name.to_string(),
            cells: BTreeMap::new(),
            zoom: None,
            freeze: None,
            rows: BTreeMap::new(),
            columns: Vec::new(),
            auto_filter: None,
            sort: None,
            validations: Vec::new(),
            sparklines: Vec::new(),
            chart: None,
            pivot: None,
        }
    }

    fn put(mut self, coord: &str, content: Content, style: Style) -> Sheet {
        let cell = CellRef::from_str(coord).unwrap();
        self.cells.insert((cell.row, cell.col), (content, style));
        self
    }

    pub fn number(self, coord: &str, value: f64) -> Sheet {
        self.put(coord, Content::Number(value), Style::Plain)
    }

    pub fn text(self, coord: &str, value: &str) -> Sheet {
        self.put(coord, Content::Text(value.to_string()), Style::Plain)
    }

    pub fn styled_text(self, coord: &str, value: &str, style: Style) -> Sheet {
        self.put(coord, Content::Text(value.to_string()), style)
    }

    pub fn formula(self, coord: &str, formula: &str, cached: f64) -> Sheet {
        self.put(coord, Content::Formula(formula.to_string(), cached), Style::Plain)
    }

    /// One row of text cells starting at column A.
    pub fn row(mut self, row: usize, values: &[&str]) -> Sheet {
        for (col, value) in values.iter().enumerate() {
            let coord = CellRef::new(col, row).to_string();
            self = self.text(&coord, value);
        }
        self
    }

    pub fn zoom(mut self, scale: u32) -> Sheet {
        self.zoom = Some(scale);
        self
    }

    pub fn freeze(mut self, top_left: &str) -> Sheet {
        self.freeze = Some(top_left.to_string());
        self
    }

    /// Custom height for a 0-based row.
    pub fn row_height(mut self, row: usize, height: f64) -> Sheet {
        self.rows.entry(row).or_default().height = Some(height);
        self
    }

    pub fn hide_row(mut self, row: usize) -> Sheet {
        self.rows.entry(row).or_default().hidden = true;
        self
    }

    /// Width and visibility of one column, by letters.
    pub fn column(mut self, letters: &str, width: f64, hidden: bool) -> Sheet {
        let col = CellRef::letters_to_col(letters).unwrap();
        self.columns.push((col, width, hidden));
        self
    }

    /// An auto filter over `range` keeping `values` in the 0-based `column`.
    pub fn auto_filter(mut self, range: &str, column: usize, values: &[&str]) -> Sheet {
        self.auto_filter = Some(AutoFilter {
            range: range.to_string(),
            column,
            values: values.iter().map(|v| v.to_string()).collect(),
        });
        self
    }

    pub fn sort_state(mut self, range: &str, key: &str, descending: bool) -> Sheet {
        self.sort = Some((range.to_string(), key.to_string(), descending));
        self
    }

    pub fn validation(mut self, sqref: &str, kind: &str, formula1: &str) -> Sheet {
        self.validations
            .push((sqref.to_string(), kind.to_string(), formula1.to_string()));
        self
    }

    /// A line sparkline drawn in `location` from the cells in `data`.
    pub fn sparkline(mut self, location: &str, data: &str) -> Sheet {
        self.sparklines.push((location.to_string(), data.to_string()));
        self
    }

    /// A chart of kind `kind` (`barChart`, `lineChart`...) over one series.
    pub fn chart(mut self, anchor: &str, kind: &str, title: &str, values: &str) -> Sheet {
        self.chart = Some(Chart {
            anchor: CellRef::from_str(anchor).unwrap(),
            kind: kind.to_string(),
            title: title.to_string(),
            values: values.to_string(),
        });
        self
    }

    /// A pivot table at `location` over `source` (`Sheet!A1:B3`), grouping
    /// rows by `fields[row_field]` and summing `fields[data_field]`.
    pub fn pivot(
        mut self,
        location: &str,
        source: &str,
        fields: &[&str],
        row_field: usize,
        data_field: usize,
    ) -> Sheet {
        let (source_sheet, source_ref) = source.rsplit_once('!').unwrap();
        self.pivot = Some(Pivot {
            location: location.to_string(),
            source_sheet: source_sheet.to_string(),
            source_ref: source_ref.to_string(),
            fields: fields.iter().map(|f| f.to_string()).collect(),
            row_field,
            data_field,
        });
        self
    }

    fn xml(&self, strings: &mut Vec<String>) -> String {
        let mut view = String::from("<sheetView workbookViewId=\"0\"");
        if let Some(zoom) = self.zoom {
            view.push_str(&format!(" zoomScale=\"{}\"", zoom));
        }
        view.push('>');
        if let Some(top_left) = &self.freeze {
            let cell = CellRef::from_str(top_left).unwrap();
            view.push_str(&format!(
                "<pane xSplit=\"{}\" ySplit=\"{}\" topLeftCell=\"{}\" state=\"frozen\"/>",
                cell.col, cell.row, top_left
            ));
        }
        view.push_str("</sheetView>");

        let mut cols = String::new();
        if !self.columns.is_empty() {
            cols.push_str("<cols>");
            for (col, width, hidden) in &self.columns {
                cols.push_str(&format!(
                    "<col min=\"{0}\" max=\"{0}\" width=\"{1}\" customWidth=\"1\"{2}/>",
                    col + 1,
                    width,
                    if *hidden { " hidden=\"1\"" } else { "" }
                ));
            }
            cols.push_str("</cols>");
        }

        let mut by_row: BTreeMap<usize, Vec<(usize, &Content, Style)>> = BTreeMap::new();
        for row in self.rows.keys() {
            by_row.entry(*row).or_default();
        }
        for ((row, col), (content, style)) in &self.cells {
            by_row.entry(*row).or_default().push((*col, content, *style));
        }

        let mut data = String::new();
        for (row, cells) in &by_row {
            data.push_str(&format!("<row r=\"{}\"", row + 1));
            if let Some(format) = self.rows.get(row) {
                if let Some(height) = format.height {
                    data.push_str(&format!(" ht=\"{}\" customHeight=\"1\"", height));
                }
                if format.hidden {
                    data.push_str(" hidden=\"1\"");
                }
            }
            data.push('>');
            for (col, content, style) in cells {
                let coord = CellRef::new(*col, *row);
                let s = *style as usize;
                match content {
                    Content::Number(n) => {
                        data.push_str(&format!("<c r=\"{}\" s=\"{}\"><v>{}</v></c>", coord, s, n))
                    }
                    Content::Text(t) => {
                        let index = strings.iter().position(|x| x == t).unwrap_or_else(|| {
                            strings.push(t.clone());
                            strings.len() - 1
                        });
                        data.push_str(&format!(
                            "<c r=\"{}\" s=\"{}\" t=\"s\"><v>{}</v></c>",
                            coord, s, index
                        ));
                    }
                    Content::Formula(f, cached) => data.push_str(&format!(
                        "<c r=\"{}\" s=\"{}\"><f>{}</f><v>{}</v></c>",
                        coord,
                        s,
                        escape(f),
                        cached
                    )),
                }
            }
            data.push_str("</row>");
        }

        let mut tail = String::new();
        if let Some(filter) = &self.auto_filter {
            tail.push_str(&format!("<autoFilter ref=\"{}\">", filter.range));
            if !filter.values.is_empty() {
                tail.push_str(&format!("<filterColumn colId=\"{}\"><filters>", filter.column));
                for value in &filter.values {
                    tail.push_str(&format!("<filter val=\"{}\"/>", escape(value)));
                }
                tail.push_str("</filters></filterColumn>");
            }
            tail.push_str("</autoFilter>");
        }
        if let Some((range, key, descending)) = &self.sort {
            tail.push_str(&format!(
                "<sortState ref=\"{}\"><sortCondition{} ref=\"{}\"/></sortState>",
                range,
                if *descending { " descending=\"1\"" } else { "" },
                key
            ));
        }
        if !self.validations.is_empty() {
            tail.push_str(&format!("<dataValidations count=\"{}\">", self.validations.len()));
            for (sqref, kind, formula1) in &self.validations {
                tail.push_str(&format!(
                    "<dataValidation type=\"{}\" allowBlank=\"1\" showErrorMessage=\"1\" sqref=\"{}\"><formula1>{}</formula1></dataValidation>",
                    kind,
                    sqref,
                    escape(formula1)
                ));
            }
            tail.push_str("</dataValidations>");
        }
        if self.chart.is_some() {
            tail.push_str("<drawing r:id=\"rId1\"/>");
        }
        if !self.sparklines.is_empty() {
            tail.push_str(
                r#"<extLst><ext uri="{05C60535-1F16-4fd2-B633-F4F36F0B64E0}" xmlns:x14="http://schemas.microsoft.com/office/spreadsheetml/2009/9/main"><x14:sparklineGroups xmlns:xm="http://schemas.microsoft.com/office/excel/2006/main"><x14:sparklineGroup displayEmptyCellsAs="gap"><x14:colorSeries rgb="FF376092"/><x14:sparklines>"#,
            );
            for (location, data) in &self.sparklines {
                tail.push_str(&format!(
                    "<x14:sparkline><xm:f>{}</xm:f><xm:sqref>{}</xm:sqref></x14:sparkline>",
                    escape(data),
                    location
                ));
            }
            tail.push_str("</x14:sparklines></x14:sparklineGroup></x14:sparklineGroups></ext></extLst>");
        }

        format!(
            r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<worksheet xmlns="{}" xmlns:r="{}"><sheetViews>{}</sheetViews><sheetFormatPr defaultRowHeight="15"/>{}<sheetData>{}</sheetData>{}</worksheet>"#,
            MAIN_NS, REL_NS, view, cols, data, tail
        )
    }

    /// `xl/worksheets/_rels/sheetN.xml.rels`, if the sheet links any parts.
    fn rels(&self, n: usize) -> Option<String> {
        let mut rels = String::new();
        if self.chart.is_some() {
            rels.push_str(&relationship(
                "rId1",
                "drawing",
                &format!("../drawings/drawing{}.xml", n),
            ));
        }
        if self.pivot.is_some() {
            rels.push_str(&relationship(
                "rId2",
                "pivotTable",
                &format!("../pivotTables/pivotTable{}.xml", n),
            ));
        }
        (!rels.is_empty()).then(|| relationships(&rels))
    }
}

fn escape(text: &str) -> String {
    text.replace('&', "&amp;")
        .replace('<', "&lt;")
        .replace('>', "&gt;")
        .replace('"', "&quot;")
}

fn relationship(id: &str, kind: &str, target: &str) -> String {
    format!(
        "<Relationship Id=\"{}\" Type=\"{}/{}\" Target=\"{}\"/>",
        id, REL_NS, kind, target
    )
}

fn relationships(body: &str) -> String {
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Relationships xmlns="{}">{}</Relationships>"#,
        PACKAGE_REL_NS, body
    )
}

fn content_type(part: &str, kind: &str) -> String {
    format!(
        "<Override PartName=\"/{}\" ContentType=\"application/vnd.openxmlformats-officedocument.{}+xml\"/>",
        part, kind
    )
}

fn drawing_xml(chart: &Chart) -> String {
    let (col, row) = (chart.anchor.col, chart.anchor.row);
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<xdr:wsDr xmlns:xdr="http://schemas.openxmlformats.org/drawingml/2006/spreadsheetDrawing" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><xdr:twoCellAnchor><xdr:from><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:from><xdr:to><xdr:col>{}</xdr:col><xdr:colOff>0</xdr:colOff><xdr:row>{}</xdr:row><xdr:rowOff>0</xdr:rowOff></xdr:to><xdr:graphicFrame macro=""><xdr:nvGraphicFramePr><xdr:cNvPr id="2" name="Chart 1"/><xdr:cNvGraphicFramePr/></xdr:nvGraphicFramePr><xdr:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/></xdr:xfrm><a:graphic><a:graphicData uri="http://schemas.openxmlformats.org/drawingml/2006/chart"><c:chart xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:r="{}" r:id="rId1"/></a:graphicData></a:graphic></xdr:graphicFrame><xdr:clientData/></xdr:twoCellAnchor></xdr:wsDr>"#,
        col,
        row,
        col + 6,
        row + 15,
        REL_NS
    )
}

fn chart_xml(chart: &Chart) -> String {
    let direction = if chart.kind == "barChart" {
        "<c:barDir val=\"col\"/>"
    } else {
        ""
    };
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<c:chartSpace xmlns:c="http://schemas.openxmlformats.org/drawingml/2006/chart" xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main"><c:chart><c:title><c:tx><c:rich><a:p><a:r><a:t>{title}</a:t></a:r></a:p></c:rich></c:tx></c:title><c:plotArea><c:{kind}>{direction}<c:ser><c:idx val="0"/><c:order val="0"/><c:val><c:numRef><c:f>{values}</c:f></c:numRef></c:val></c:ser><c:axId val="1"/><c:axId val="2"/></c:{kind}><c:catAx><c:axId val="1"/><c:axPos val="b"/><c:crossAx val="2"/></c:catAx><c:valAx><c:axId val="2"/><c:axPos val="l"/><c:crossAx val="1"/></c:valAx></c:plotArea><c:legend><c:legendPos val="r"/></c:legend></c:chart></c:chartSpace>"#,
        title = escape(&chart.title),
        kind = chart.kind,
        direction = direction,
        values = escape(&chart.values),
    )
}

fn pivot_table_xml(pivot: &Pivot, cache_id: usize) -> String {
    let fields: String = (0..pivot.fields.len())
        .map(|i| {
            if i == pivot.row_field {
                "<pivotField axis=\"axisRow\" showAll=\"0\"/>".to_string()
            } else if i == pivot.data_field {
                "<pivotField dataField=\"1\" showAll=\"0\"/>".to_string()
            } else {
                "<pivotField showAll=\"0\"/>".to_string()
            }
        })
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<pivotTableDefinition xmlns="{ns}" name="PivotTable{id}" cacheId="{id}" dataCaption="Values"><location ref="{location}" firstHeaderRow="1" firstDataRow="1" firstDataCol="1"/><pivotFields count="{count}">{fields}</pivotFields><rowFields count="1"><field x="{row}"/></rowFields><dataFields count="1"><dataField name="Sum of {data_name}" fld="{data}" baseField="0" baseItem="0"/></dataFields></pivotTableDefinition>"#,
        ns = MAIN_NS,
        id = cache_id,
        location = pivot.location,
        count = pivot.fields.len(),
        fields = fields,
        row = pivot.row_field,
        data_name = escape(&pivot.fields[pivot.data_field]),
        data = pivot.data_field,
    )
}

fn pivot_cache_xml(pivot: &Pivot) -> String {
    let fields: String = pivot
        .fields
        .iter()
        .map(|f| format!("<cacheField name=\"{}\" numFmtId=\"0\"><sharedItems/></cacheField>", escape(f)))
        .collect();
    format!(
        r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<pivotCacheDefinition xmlns="{}" xmlns:r="{}" refreshOnLoad="1" recordCount="0"><cacheSource type="worksheet"><worksheetSource ref="{}" sheet="{}"/></cacheSource><cacheFields count="{}">{}</cacheFields></pivotCacheDefinition>"#,
        MAIN_NS,
        REL_NS,
        pivot.source_ref,
        escape(&pivot.source_sheet),
        pivot.fields.len(),
        fields
    )
}

/// Write a workbook with the given sheets to `dir/name`.
pub fn write_xlsx(dir: &Path, name: &str, sheets: &[Sheet]) -> PathBuf {
    let path = dir.join(name);
    let file = std::fs::File::create(&path).unwrap();
    let mut zip = ZipWriter::new(file);
    let options = SimpleFileOptions::default();

    let mut strings = Vec::new();
    let mut parts: Vec<(String, String)> = Vec::new();
    let mut overrides = String::new();
    let mut entries = String::new();
    let mut caches = String::new();
    let mut rels = String::new();
    for (i, sheet) in sheets.iter().enumerate() {
        let n = i + 1;
        let sheet_part = format!("xl/worksheets/sheet{}.xml", n);
        overrides.push_str(&content_type(&sheet_part, "spreadsheetml.worksheet"));
        parts.push((sheet_part, sheet.xml(&mut strings)));
        entries.push_str(&format!(
            "<sheet name=\"{}\" sheetId=\"{}\" r:id=\"rId{}\"/>",
            escape(&sheet.name),
            n,
            n
        ));
        rels.push_str(&relationship(
            &format!("rId{}", n),
            "worksheet",
            &format!("worksheets/sheet{}.xml", n),
        ));

        if let Some(sheet_rels) = sheet.rels(n) {
            parts.push((format!("xl/worksheets/_rels/sheet{}.xml.rels", n), sheet_rels));
        }
        if let Some(chart) = &sheet.chart {
            let drawing = format!("xl/drawings/drawing{}.xml", n);
            let chart_part = format!("xl/charts/chart{}.xml", n);
            overrides.push_str(&content_type(&drawing, "drawing"));
            overrides.push_str(&content_type(&chart_part, "drawingml.chart"));
            parts.push((drawing, drawing_xml(chart)));
            parts.push((
                format!("xl/drawings/_rels/drawing{}.xml.rels", n),
                relationships(&relationship("rId1", "chart", &format!("../charts/chart{}.xml", n))),
            ));
            parts.push((chart_part, chart_xml(chart)));
        }
        if let Some(pivot) = &sheet.pivot {
            let table = format!("xl/pivotTables/pivotTable{}.xml", n);
            let cache = format!("xl/pivotCache/pivotCacheDefinition{}.xml", n);
            overrides.push_str(&content_type(&table, "spreadsheetml.pivotTable"));
            overrides.push_str(&content_type(&cache, "spreadsheetml.pivotCacheDefinition"));
            parts.push((table, pivot_table_xml(pivot, n)));
            parts.push((
                format!("xl/pivotTables/_rels/pivotTable{}.xml.rels", n),
                relationships(&relationship(
                    "rId1",
                    "pivotCacheDefinition",
                    &format!("../pivotCache/pivotCacheDefinition{}.xml", n),
                )),
            ));
            parts.push((cache, pivot_cache_xml(pivot)));
            caches.push_str(&format!("<pivotCache cacheId=\"{0}\" r:id=\"rIdCache{0}\"/>", n));
            rels.push_str(&relationship(
                &format!("rIdCache{}", n),
                "pivotCacheDefinition",
                &format!("pivotCache/pivotCacheDefinition{}.xml", n),
            ));
        }
    }
    rels.push_str(&relationship("rIdStyles", "styles", "styles.xml"));
    rels.push_str(&relationship("rIdStrings", "sharedStrings", "sharedStrings.xml"));
    if !caches.is_empty() {
        caches = format!("<pivotCaches>{}</pivotCaches>", caches);
    }

    parts.extend([
        (
            "[Content_Types].xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<Types xmlns="http://schemas.openxmlformats.org/package/2006/content-types"><Default Extension="rels" ContentType="application/vnd.openxmlformats-package.relationships+xml"/><Default Extension="xml" ContentType="application/xml"/>{}{}{}{}</Types>"#,
                content_type("xl/workbook.xml", "spreadsheetml.sheet.main"),
                overrides,
                content_type("xl/styles.xml", "spreadsheetml.styles"),
                content_type("xl/sharedStrings.xml", "spreadsheetml.sharedStrings"),
            ),
        ),
        (
            "_rels/.rels".to_string(),
            relationships(&relationship("rId1", "officeDocument", "xl/workbook.xml")),
        ),
        (
            "xl/workbook.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<workbook xmlns="{}" xmlns:r="{}"><sheets>{}</sheets>{}</workbook>"#,
                MAIN_NS, REL_NS, entries, caches
            ),
        ),
        ("xl/_rels/workbook.xml.rels".to_string(), relationships(&rels)),
        ("xl/styles.xml".to_string(), STYLES.to_string()),
        (
            "xl/sharedStrings.xml".to_string(),
            format!(
                r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>
<sst xmlns="{0}" count="{1}" uniqueCount="{1}">{2}</sst>"#,
                MAIN_NS,
                strings.len(),
                strings
                    .iter()
                    .map(|s| format!("<si><t xml:space=\"preserve\">{}</t></si>", escape(s)))
                    .collect::<String>()
            ),
        ),
    ]);

    for (name, content) in parts {
        zip.start_file(name, options).unwrap();
        zip.write_all(content.as_bytes()).unwrap();
    }
    zip.finish().unwrap();
    path
}
