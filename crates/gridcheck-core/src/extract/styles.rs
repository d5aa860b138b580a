//! `xl/styles.xml`: number formats, fonts, fills and cell formats.

use super::FactValue;
use super::xml::Element;

/// Number formats every spreadsheet application knows by id.
fn builtin_number_format(id: u32) -> Option<&'static str> {
    Some(match id {
        0 => "General",
        1 => "0",
        2 => "0.00",
        3 => "#,##0",
        4 => "#,##0.00",
        5 => "\"$\"#,##0_);(\"$\"#,##0)",
        6 => "\"$\"#,##0_);[Red](\"$\"#,##0)",
        7 => "\"$\"#,##0.00_);(\"$\"#,##0.00)",
        8 => "\"$\"#,##0.00_);[Red](\"$\"#,##0.00)",
        9 => "0%",
        10 => "0.00%",
        11 => "0.00E+00",
        12 => "# ?/?",
        13 => "# ??/??",
        14 => "mm-dd-yy",
        15 => "d-mmm-yy",
        16 => "d-mmm",
        17 => "mmm-yy",
        18 => "h:mm AM/PM",
        19 => "h:mm:ss AM/PM",
        20 => "h:mm",
        21 => "h:mm:ss",
        22 => "m/d/yy h:mm",
        37 => "#,##0_);(#,##0)",
        38 => "#,##0_);[Red](#,##0)",
        39 => "#,##0.00_);(#,##0.00)",
        40 => "#,##0.00_);[Red](#,##0.00)",
        41 => "_(* #,##0_);_(* \\(#,##0\\);_(* \"-\"_);_(@_)",
        42 => "_(\"$\"* #,##0_);_(\"$\"* \\(#,##0\\);_(\"$\"* \"-\"_);_(@_)",
        43 => "_(* #,##0.00_);_(* \\(#,##0.00\\);_(* \"-\"??_);_(@_)",
        44 => "_(\"$\"* #,##0.00_)_(\"$\"* \\(#,##0.00\\)_(\"$\"* \"-\"??_)_(@_)",
        45 => "mm:ss",
        46 => "[h]:mm:ss",
        47 => "mmss.0",
        48 => "##0.0E+0",
        49 => "@",
        _ => return None,
    })
}

/// Render a `<color>` element the way facts carry it: the ARGB string, or
/// `theme:<n>` / `indexed:<n>` for palette references.
pub fn color_text(color: Option<&Element>) -> FactValue {
    let Some(color) = color else {
        return FactValue::Missing;
    };
    if let Some(rgb) = color.attr("rgb") {
        return FactValue::Text(rgb.to_string());
    }
    if let Some(theme) = color.attr("theme") {
        return FactValue::Text(format!("theme:{}", theme));
    }
    if let Some(indexed) = color.attr("indexed") {
        return FactValue::Text(format!("indexed:{}", indexed));
    }
    if color.flag("auto", false) {
        return FactValue::Text("auto".to_string());
    }
    FactValue::Missing
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Font {
    pub name: Option<String>,
    pub family: Option<f64>,
    pub size: Option<f64>,
    pub bold: bool,
    pub italic: bool,
    pub underline: Option<String>,
    pub color: FactValue,
}

impl Font {
    fn from_element(font: &Element) -> Font {
        // `<b/>` means bold; `<b val="0"/>` turns it off.
        let toggle = |name: &str| font.child(name).is_some_and(|e| e.flag("val", true));
        Font {
            name: font.child_val("name").map(str::to_string),
            family: font.child_val("family").and_then(|v| v.parse().ok()),
            size: font.child_val("sz").and_then(|v| v.parse().ok()),
            bold: toggle("b"),
            italic: toggle("i"),
            underline: font
                .child("u")
                .map(|u| u.attr("val").unwrap_or("single").to_string()),
            color: color_text(font.child("color")),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Fill {
    pub pattern_type: Option<String>,
    pub fg_color: FactValue,
    pub bg_color: FactValue,
}

impl Fill {
    fn from_element(fill: &Element) -> Fill {
        match fill.child("patternFill") {
            Some(pattern) => Fill {
                pattern_type: pattern.attr("patternType").map(str::to_string),
                fg_color: color_text(pattern.child("fgColor")),
                bg_color: color_text(pattern.child("bgColor")),
            },
            None => Fill::default(),
        }
    }
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct CellFormat {
    pub num_fmt_id: u32,
    pub font_id: usize,
    pub fill_id: usize,
    pub horizontal: Option<String>,
    pub vertical: Option<String>,
    pub wrap_text: bool,
}

/// Differential format used by conditional formatting rules.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DifferentialFormat {
    pub font: Option<Font>,
    pub fill: Option<Fill>,
    pub number_format: Option<String>,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Stylesheet {
    pub custom_formats: Vec<(u32, String)>,
    pub fonts: Vec<Font>,
    pub fills: Vec<Fill>,
    pub cell_formats: Vec<CellFormat>,
    pub differential: Vec<DifferentialFormat>,
}

fn list<'a>(root: &'a Element, container: &str, item: &str) -> Vec<&'a Element> {
    root.child(container)
        .map(|c| c.children.iter().filter(|e| e.name == item).collect())
        .unwrap_or_default()
}

impl Stylesheet {
    pub fn from_element(root: &Element) -> Stylesheet {
        let custom_formats = list(root, "numFmts", "numFmt")
            .into_iter()
            .filter_map(|f| {
                let id = f.attr("numFmtId")?.parse().ok()?;
                Some((id, f.attr("formatCode")?.to_string()))
            })
            .collect();

        let cell_formats = list(root, "cellXfs", "xf")
            .into_iter()
            .map(|xf| {
                let index = |name: &str| xf.attr(name).and_then(|v| v.parse().ok()).unwrap_or(0);
                let alignment = xf.child("alignment");
                CellFormat {
                    num_fmt_id: xf.attr("numFmtId").and_then(|v| v.parse().ok()).unwrap_or(0),
                    font_id: index("fontId"),
                    fill_id: index("fillId"),
                    horizontal: alignment.and_then(|a| a.attr("horizontal")).map(str::to_string),
                    vertical: alignment.and_then(|a| a.attr("vertical")).map(str::to_string),
                    wrap_text: alignment.is_some_and(|a| a.flag("wrapText", false)),
                }
            })
            .collect();

        let differential = list(root, "dxfs", "dxf")
            .into_iter()
            .map(|dxf| DifferentialFormat {
                font: dxf.child("font").map(Font::from_element),
                fill: dxf.child("fill").map(Fill::from_element),
                number_format: dxf
                    .child("numFmt")
                    .and_then(|f| f.attr("formatCode"))
                    .map(str::to_string),
            })
            .collect();

        Stylesheet {
            custom_formats,
            fonts: list(root, "fonts", "font").into_iter().map(Font::from_element).collect(),
            fills: list(root, "fills", "fill").into_iter().map(Fill::from_element).collect(),
            cell_formats,
            differential,
        }
    }

    pub fn number_format(&self, id: u32) -> String {
        self.custom_formats
            .iter()
            .find(|(fid, _)| *fid == id)
            .map(|(_, code)| code.clone())
            .or_else(|| builtin_number_format(id).map(str::to_string))
            .unwrap_or_else(|| "General".to_string())
    }

    pub fn cell_format(&self, style_index: usize) -> CellFormat {
        self.cell_formats
            .get(style_index)
            .cloned()
            .unwrap_or_default()
    }

    pub fn font(&self, id: usize) -> Font {
        self.fonts.get(id).cloned().unwrap_or_default()
    }

    pub fn fill(&self, id: usize) -> Fill {
        self.fills.get(id).cloned().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STYLES: &str = r#"<styleSheet xmlns="http://schemas.openxmlformats.org/spreadsheetml/2006/main">
      <numFmts count="1"><numFmt numFmtId="164" formatCode="0.000"/></numFmts>
      <fonts count="2">
        <font><sz val="11"/><name val="Calibri"/><family val="2"/></font>
        <font><b/><i val="0"/><u/><sz val="14"/><color rgb="FFFF0000"/><name val="Arial"/></font>
      </fonts>
      <fills count="2">
        <fill><patternFill patternType="none"/></fill>
        <fill><patternFill patternType="solid"><fgColor rgb="FFFFFF00"/><bgColor indexed="64"/></patternFill></fill>
      </fills>
      <cellXfs count="2">
        <xf numFmtId="0" fontId="0" fillId="0"/>
        <xf numFmtId="164" fontId="1" fillId="1"><alignment horizontal="center" wrapText="1"/></xf>
      </cellXfs>
    </styleSheet>"#;

    #[test]
    fn test_parse_stylesheet() {
        let root = Element::parse(STYLES, "xl/styles.xml").unwrap();
        let styles = Stylesheet::from_element(&root);

        let xf = styles.cell_format(1);
        assert_eq!(styles.number_format(xf.num_fmt_id), "0.000");
        assert_eq!(xf.horizontal.as_deref(), Some("center"));
        assert!(xf.wrap_text);

        let font = styles.font(xf.font_id);
        assert_eq!(font.name.as_deref(), Some("Arial"));
        assert!(font.bold);
        assert!(!font.italic);
        assert_eq!(font.underline.as_deref(), Some("single"));
        assert_eq!(font.size, Some(14.0));
        assert_eq!(font.color, FactValue::Text("FFFF0000".into()));

        let fill = styles.fill(xf.fill_id);
        assert_eq!(fill.pattern_type.as_deref(), Some("solid"));
        assert_eq!(fill.bg_color, FactValue::Text("indexed:64".into()));
    }

    #[test]
    fn test_builtin_formats() {
        let styles = Stylesheet::default();
        assert_eq!(styles.number_format(0), "General");
        assert_eq!(styles.number_format(10), "0.00%");
        assert_eq!(styles.number_format(999), "General");
        // Out-of-range style index falls back to the default format.
        assert_eq!(styles.cell_format(7), CellFormat::default());
    }
}
