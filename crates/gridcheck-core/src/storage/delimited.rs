//! Delimited text import.

use crate::document::encoding::read_text;
use crate::error::Result;
use gridcheck_engine::engine::CellGrid;
use std::path::Path;

/// Field delimiter for a text document, chosen by file extension.
pub fn delimiter_for(path: &Path) -> u8 {
    match path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .as_deref()
    {
        Some("tsv") | Some("tab") => b'\t',
        _ => b',',
    }
}

/// Parse delimited text into a grid anchored at `A1`.
pub fn parse_delimited(content: &str, delimiter: u8) -> Result<CellGrid> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(false)
        .flexible(true)
        .delimiter(delimiter)
        .from_reader(content.as_bytes());

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record?;
        rows.push(record.iter().map(str::to_string).collect::<Vec<_>>());
    }
    Ok(CellGrid::from_text_rows(rows))
}

/// Read a delimited text file (through the encoding ladder) into a grid.
pub fn parse_csv(path: &Path) -> Result<CellGrid> {
    let decoded = read_text(path)?;
    parse_delimited(&decoded.text, delimiter_for(path))
}
