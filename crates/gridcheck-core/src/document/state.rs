use crate::error::{GridcheckError, Result};
use crate::storage::{FormulaGrid, formula_grid, parse_csv, range_to_grid};
use calamine::{Reader, Sheets, open_workbook_auto};
use gridcheck_engine::engine::CellGrid;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use tracing::info;

/// Extensions opened as workbooks; everything else is delimited text.
pub const WORKBOOK_EXTENSIONS: [&str; 6] = ["xlsx", "xlsm", "xlsb", "xls", "xla", "ods"];

pub enum DocumentKind {
    Tabular(Box<Sheets<BufReader<File>>>),
    /// A delimited text file with one implicit sheet.
    Text,
}

/// An artifact opened read-only for one grading call.
pub struct Document {
    path: PathBuf,
    kind: DocumentKind,
    sheet_names: Vec<String>,
}

fn extension_of(path: &Path) -> Option<String> {
    path.extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
}

impl Document {
    pub fn open(path: &Path) -> Result<Document> {
        let is_workbook = extension_of(path)
            .is_some_and(|ext| WORKBOOK_EXTENSIONS.contains(&ext.as_str()));

        let document = if is_workbook {
            let workbook = open_workbook_auto(path)?;
            let sheet_names = workbook.sheet_names();
            Document {
                path: path.to_path_buf(),
                kind: DocumentKind::Tabular(Box::new(workbook)),
                sheet_names,
            }
        } else {
            // Fail early on a missing file; content is read on demand.
            std::fs::metadata(path)?;
            let stem = path
                .file_stem()
                .and_then(|s| s.to_str())
                .unwrap_or_default()
                .to_string();
            Document {
                path: path.to_path_buf(),
                kind: DocumentKind::Text,
                sheet_names: vec![stem],
            }
        };

        info!(
            path = %path.display(),
            kind = document.kind_label(),
            sheets = ?document.sheet_names,
            "opened document"
        );
        Ok(document)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_tabular(&self) -> bool {
        matches!(self.kind, DocumentKind::Tabular(_))
    }

    /// Zip-packaged workbook whose parts can be read directly.
    pub fn is_ooxml(&self) -> bool {
        self.is_tabular()
            && extension_of(&self.path).is_some_and(|ext| ext == "xlsx" || ext == "xlsm")
    }

    pub fn kind_label(&self) -> &'static str {
        match self.kind {
            DocumentKind::Tabular(_) => "workbook",
            DocumentKind::Text => "text",
        }
    }

    /// Sheet names in workbook order.
    pub fn sheet_names(&self) -> &[String] {
        &self.sheet_names
    }

    pub fn has_sheet(&self, name: &str) -> bool {
        self.sheet_names.iter().any(|n| n == name)
    }

    fn require_sheet(&self, name: &str) -> Result<()> {
        if self.has_sheet(name) {
            Ok(())
        } else {
            Err(GridcheckError::SheetNotFound(format!(
                "{} in {}",
                name,
                self.path.display()
            )))
        }
    }

    /// Cell values of one sheet at their absolute positions.
    pub fn grid(&mut self, sheet: &str) -> Result<CellGrid> {
        self.require_sheet(sheet)?;
        match &mut self.kind {
            DocumentKind::Tabular(workbook) => Ok(range_to_grid(&workbook.worksheet_range(sheet)?)),
            DocumentKind::Text => parse_csv(&self.path),
        }
    }

    /// Formula text of one sheet. Text documents carry no formulas.
    pub fn formulas(&mut self, sheet: &str) -> Result<FormulaGrid> {
        self.require_sheet(sheet)?;
        match &mut self.kind {
            DocumentKind::Tabular(workbook) => Ok(formula_grid(&workbook.worksheet_formula(sheet)?)),
            DocumentKind::Text => Ok(FormulaGrid::new()),
        }
    }

    /// Where the printed (exported) form of a sheet lives:
    /// `<base>-<sheet>.<ext>`, with `ext` = `csv` for workbooks and the
    /// document's own extension for text documents. The implicit sheet of a
    /// text document falls back to the document itself.
    pub fn printed_path(&self, sheet: &str) -> PathBuf {
        let base = self.path.with_extension("");
        let ext = match self.kind {
            DocumentKind::Tabular(_) => "csv".to_string(),
            DocumentKind::Text => extension_of(&self.path).unwrap_or_else(|| "csv".to_string()),
        };
        let candidate = PathBuf::from(format!("{}-{}.{}", base.display(), sheet, ext));
        if matches!(self.kind, DocumentKind::Text) && !candidate.exists() && self.has_sheet(sheet) {
            return self.path.clone();
        }
        candidate
    }
}
