//! Excel exporter implementation

use crate::error::{ConvertError, ConvertResult};
use crate::types::{ColumnValue, TypedTable};
use chrono::{Datelike, NaiveDate};
use rust_xlsxwriter::{Format, Workbook, Worksheet};
use std::ffi::OsString;
use std::path::{Path, PathBuf};

/// Default worksheet name, matching what Excel gives a new workbook
pub const DEFAULT_SHEET_NAME: &str = "Sheet1";

/// `num_days_from_ce` of 1899-12-30, day zero of the Excel 1900 date system
const EXCEL_EPOCH_DAYS_FROM_CE: i32 = 693_594;

/// First serial day past Excel's phantom 1900-02-29
const FIRST_RELIABLE_SERIAL: i32 = 61;

const DATE_NUM_FORMAT: &str = "yyyy-mm-dd";

#[derive(Debug, Clone)]
pub struct ExportOptions {
    pub sheet_name: String,
}

impl Default for ExportOptions {
    fn default() -> Self {
        Self {
            sheet_name: DEFAULT_SHEET_NAME.to_string(),
        }
    }
}

/// Writes one [`TypedTable`] to a single-sheet .xlsx workbook
pub struct ExcelExporter<'a> {
    table: &'a TypedTable,
    options: ExportOptions,
}

impl<'a> ExcelExporter<'a> {
    /// Create a new Excel exporter
    pub fn new(table: &'a TypedTable) -> Self {
        Self::with_options(table, ExportOptions::default())
    }

    pub fn with_options(table: &'a TypedTable, options: ExportOptions) -> Self {
        Self { table, options }
    }

    /// Export the table to an Excel .xlsx file
    pub fn export(&self, output_path: &Path) -> ConvertResult<()> {
        let mut workbook = Workbook::new();
        let worksheet = workbook.add_worksheet();
        worksheet
            .set_name(&self.options.sheet_name)
            .map_err(|e| ConvertError::Export(format!("Failed to set worksheet name: {}", e)))?;

        let header_format = Format::new().set_bold();
        let date_format = Format::new().set_num_format(DATE_NUM_FORMAT);

        for (col_idx, column) in self.table.columns.iter().enumerate() {
            let col = u16::try_from(col_idx).map_err(|_| {
                ConvertError::Export(format!(
                    "Too many columns for a worksheet: {}",
                    self.table.column_count()
                ))
            })?;

            worksheet
                .write_string_with_format(0, col, &column.name, &header_format)
                .map_err(|e| ConvertError::Export(format!("Failed to write header: {}", e)))?;

            for row_idx in 0..column.len() {
                let row = u32::try_from(row_idx + 1).map_err(|_| {
                    ConvertError::Export(format!("Too many rows for a worksheet: {}", row_idx))
                })?;
                write_cell_value(worksheet, row, col, &column.values, row_idx, &date_format)?;
            }
        }

        workbook
            .save(output_path)
            .map_err(|e| ConvertError::Export(format!("Failed to save Excel file: {}", e)))?;

        Ok(())
    }
}

/// Write a single cell; missing values leave the cell blank
fn write_cell_value(
    worksheet: &mut Worksheet,
    row: u32,
    col: u16,
    values: &ColumnValue,
    index: usize,
    date_format: &Format,
) -> ConvertResult<()> {
    let written = match values {
        ColumnValue::Text(texts) => match texts.get(index).and_then(|v| v.as_deref()) {
            Some(value) => worksheet.write_string(row, col, value).map(|_| ()),
            None => Ok(()),
        },
        ColumnValue::Number(nums) => match nums.get(index).copied().flatten() {
            Some(value) => worksheet.write_number(row, col, value).map(|_| ()),
            None => Ok(()),
        },
        ColumnValue::Integer(ints) => match ints.get(index).copied().flatten() {
            Some(value) => worksheet.write_number(row, col, value as f64).map(|_| ()),
            None => Ok(()),
        },
        ColumnValue::Boolean(bools) => match bools.get(index).copied().flatten() {
            Some(value) => worksheet.write_boolean(row, col, value).map(|_| ()),
            None => Ok(()),
        },
        ColumnValue::Date(dates) => match dates.get(index).copied().flatten() {
            Some(date) => match excel_serial(date) {
                Some(serial) => worksheet
                    .write_number_with_format(row, col, serial, date_format)
                    .map(|_| ()),
                None => worksheet
                    .write_string(row, col, date.format("%Y-%m-%d").to_string())
                    .map(|_| ()),
            },
            None => Ok(()),
        },
        ColumnValue::Factor { .. } => match values.display_cell(index) {
            Some(label) => worksheet.write_string(row, col, label).map(|_| ()),
            None => Ok(()),
        },
    };

    written.map_err(|e| {
        ConvertError::Export(format!(
            "Failed to write {} cell at row {}, column {}: {}",
            values.type_name(),
            row,
            col,
            e
        ))
    })
}

/// Excel 1900-system serial for `date`, `None` for dates Excel cannot show
/// correctly (before 1900-03-01)
pub fn excel_serial(date: NaiveDate) -> Option<f64> {
    let serial = date.num_days_from_ce() - EXCEL_EPOCH_DAYS_FROM_CE;
    (serial >= FIRST_RELIABLE_SERIAL).then_some(serial as f64)
}

/// `<file_name>.xlsx`; the suffix is appended, never substituted
pub fn xlsx_path(file_name: &Path) -> PathBuf {
    let mut path: OsString = file_name.as_os_str().to_owned();
    path.push(".xlsx");
    PathBuf::from(path)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::Column;
    use tempfile::TempDir;

    fn sample_table() -> TypedTable {
        TypedTable {
            columns: vec![
                Column::new(
                    "name",
                    ColumnValue::Text(vec![Some("a".to_string()), None]),
                ),
                Column::new("n", ColumnValue::Integer(vec![Some(1), Some(2)])),
                Column::new("x", ColumnValue::Number(vec![Some(0.5), None])),
                Column::new("ok", ColumnValue::Boolean(vec![Some(true), None])),
                Column::new(
                    "when",
                    ColumnValue::Date(vec![NaiveDate::from_ymd_opt(2024, 1, 1), None]),
                ),
                Column::new(
                    "grade",
                    ColumnValue::Factor {
                        levels: vec!["hi".to_string()],
                        codes: vec![Some(0), Some(0)],
                    },
                ),
            ],
        }
    }

    #[test]
    fn test_excel_serial_known_dates() {
        assert_eq!(excel_serial(NaiveDate::from_ymd_opt(1900, 3, 1).unwrap()), Some(61.0));
        assert_eq!(excel_serial(NaiveDate::from_ymd_opt(1970, 1, 1).unwrap()), Some(25569.0));
        assert_eq!(excel_serial(NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()), Some(45292.0));
        assert_eq!(excel_serial(NaiveDate::from_ymd_opt(1899, 1, 1).unwrap()), None);
    }

    #[test]
    fn test_xlsx_path_appends_suffix() {
        assert_eq!(xlsx_path(Path::new("out/life")), PathBuf::from("out/life.xlsx"));
        assert_eq!(xlsx_path(Path::new("report.v2")), PathBuf::from("report.v2.xlsx"));
    }

    #[test]
    fn test_export_all_column_types() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("typed.xlsx");

        let table = sample_table();
        let result = ExcelExporter::new(&table).export(&output_path);

        assert!(result.is_ok(), "Export should succeed: {:?}", result.err());
        assert!(output_path.exists(), "Output file should exist");
    }

    #[test]
    fn test_export_empty_table() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("empty.xlsx");

        let table = TypedTable::default();
        ExcelExporter::new(&table).export(&output_path).unwrap();
        assert!(output_path.exists());
    }

    #[test]
    fn test_export_invalid_sheet_name() {
        let temp_dir = TempDir::new().unwrap();
        let output_path = temp_dir.path().join("bad.xlsx");

        let table = sample_table();
        let options = ExportOptions {
            sheet_name: "bad[name]".to_string(),
        };
        let err = ExcelExporter::with_options(&table, options)
            .export(&output_path)
            .unwrap_err();
        assert!(matches!(err, ConvertError::Export(_)));
        assert!(!output_path.exists());
    }

    #[test]
    fn test_export_to_missing_directory_fails() {
        let table = sample_table();
        let err = ExcelExporter::new(&table)
            .export(Path::new("/nonexistent/dir/out.xlsx"))
            .unwrap_err();
        assert!(matches!(err, ConvertError::Export(_)));
    }
}
