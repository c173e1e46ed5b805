//! Excel export
//!
//! Writes a coerced table to a single-sheet .xlsx workbook: column names in the
//! header row, one row per table row, cells typed by their column.

mod exporter;

pub use exporter::{excel_serial, xlsx_path, ExcelExporter, ExportOptions, DEFAULT_SHEET_NAME};
