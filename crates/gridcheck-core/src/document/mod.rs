//! Opened documents and sheet loading.

pub mod encoding;
mod loader;
mod state;

pub use loader::SheetSource;
pub use state::{Document, DocumentKind, WORKBOOK_EXTENSIONS};
