//! Excel import/export for annotated records
//!
//! This module provides bidirectional records ↔ workbook conversion:
//! - Export: `&[T]` → Excel (.xlsx), chunked across worksheets
//! - Import: Excel (.xlsx, .xlsb, .xls, .ods) → `Vec<T>`, matched by header

mod exporter;
mod importer;

pub use exporter::SheetExporter;
pub use importer::{column_letter, to_cell_value, SheetImporter, SheetSummary};
