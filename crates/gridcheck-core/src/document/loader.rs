use super::encoding::{read_lines, trim_trailing_blank_lines};
use super::state::Document;
use crate::extract::{NativeFormat, NativeSheet};
use crate::storage::FormulaGrid;
use gridcheck_engine::engine::{
    CellGrid, ConfigError, RawSheetRef, ResolvedSheet, Source, TabularFrame,
};
use tracing::{error, warn};

/// The documents taking part in one comparison.
///
/// Every `load_*` call returns `None` when the sheet cannot be read; the
/// reason is logged and callers score the comparison as failed.
pub struct SheetSource {
    result: Document,
    expected: Option<Document>,
}

impl SheetSource {
    pub fn new(result: Document, expected: Option<Document>) -> SheetSource {
        SheetSource { result, expected }
    }

    pub fn document(&self, source: Source) -> Option<&Document> {
        match source {
            Source::Result => Some(&self.result),
            Source::Expected => self.expected.as_ref(),
        }
    }

    fn document_mut(&mut self, source: Source) -> Option<&mut Document> {
        match source {
            Source::Result => Some(&mut self.result),
            Source::Expected => self.expected.as_mut(),
        }
    }

    /// Sheet names of one side; `None` when there is no expected document.
    pub fn sheet_names(&self, source: Source) -> Option<&[String]> {
        self.document(source).map(Document::sheet_names)
    }

    /// Resolve a rule's sheet reference. A reference that parses but does
    /// not point at a sheet is `Ok(None)`.
    pub fn resolve(&self, selector: &RawSheetRef) -> Result<Option<ResolvedSheet>, ConfigError> {
        let sheet_ref = selector.parse()?;
        let resolved = sheet_ref.resolve(
            self.result.sheet_names(),
            self.sheet_names(Source::Expected),
        );
        if resolved.is_none() {
            warn!(selector = %sheet_ref, "sheet reference does not resolve");
        }
        Ok(resolved)
    }

    pub fn load_grid(&mut self, sheet: &ResolvedSheet) -> Option<CellGrid> {
        let document = self.document_mut(sheet.source)?;
        match document.grid(&sheet.name) {
            Ok(grid) => Some(grid),
            Err(e) => {
                error!(path = %document.path().display(), sheet = %sheet.name, error = %e, "failed to load sheet");
                None
            }
        }
    }

    pub fn load_frame(&mut self, sheet: &ResolvedSheet) -> Option<TabularFrame> {
        self.load_grid(sheet).map(|grid| grid.to_frame())
    }

    /// Lines of the sheet's printed form, each stripped of surrounding
    /// whitespace, with trailing blank lines removed.
    pub fn load_lines(&self, sheet: &ResolvedSheet) -> Option<Vec<String>> {
        let document = self.document(sheet.source)?;
        let path = document.printed_path(&sheet.name);
        match read_lines(&path) {
            Ok(lines) => {
                let stripped = lines.iter().map(|line| line.trim().to_string()).collect();
                Some(trim_trailing_blank_lines(stripped))
            }
            Err(e) => {
                error!(path = %path.display(), sheet = %sheet.name, error = %e, "failed to read printed sheet");
                None
            }
        }
    }

    pub fn load_formulas(&mut self, sheet: &ResolvedSheet) -> Option<FormulaGrid> {
        let document = self.document_mut(sheet.source)?;
        match document.formulas(&sheet.name) {
            Ok(formulas) => Some(formulas),
            Err(e) => {
                error!(path = %document.path().display(), sheet = %sheet.name, error = %e, "failed to load formulas");
                None
            }
        }
    }

    /// Handle for structural extractors. The sheet must exist.
    pub fn native(&self, sheet: &ResolvedSheet) -> Option<NativeSheet> {
        let document = self.document(sheet.source)?;
        if !document.has_sheet(&sheet.name) {
            warn!(path = %document.path().display(), sheet = %sheet.name, "sheet not found");
            return None;
        }
        let format = if !document.is_tabular() {
            NativeFormat::Text
        } else if document.is_ooxml() {
            NativeFormat::Ooxml
        } else {
            NativeFormat::Workbook
        };
        Some(NativeSheet {
            path: document.path().to_path_buf(),
            format,
            sheet: sheet.name.clone(),
        })
    }
}
