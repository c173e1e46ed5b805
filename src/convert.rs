//! Markdown table to .xlsx conversion entry point

use crate::core::{CoercerOptions, CoercionOutcome, ColumnCoercer};
use crate::error::ConvertResult;
use crate::excel::{xlsx_path, ExcelExporter, ExportOptions};
use crate::parser::{ParserOptions, TableParser};
use crate::types::{CoercionWarning, TypeSpec};
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::info;

#[derive(Debug, Clone, Default)]
pub struct ConvertOptions {
    pub parser: ParserOptions,
    pub coercer: CoercerOptions,
    pub export: ExportOptions,
}

/// What one conversion produced
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConversionReport {
    pub output_path: PathBuf,
    pub rows: usize,
    pub columns: usize,
    pub warnings: Vec<CoercionWarning>,
}

/// Parses, coerces and exports with a fixed set of options
#[derive(Debug, Clone)]
pub struct Converter {
    parser: TableParser,
    coercer: ColumnCoercer,
    export: ExportOptions,
}

impl Converter {
    /// Validate options up front; bad patterns or formats are fatal
    pub fn new(options: ConvertOptions) -> ConvertResult<Self> {
        Ok(Self {
            parser: TableParser::new(&options.parser)?,
            coercer: ColumnCoercer::new(options.coercer)?,
            export: options.export,
        })
    }

    /// Parse `md_path` and apply `type_spec` without writing anything
    pub fn load(&self, md_path: &Path, type_spec: &TypeSpec) -> ConvertResult<CoercionOutcome> {
        let raw = self.parser.parse_file(md_path)?;
        Ok(self.coercer.coerce(raw, type_spec))
    }

    /// Convert `md_path` into `<file_name>.xlsx`
    pub fn convert(
        &self,
        md_path: &Path,
        type_spec: &TypeSpec,
        file_name: &Path,
    ) -> ConvertResult<ConversionReport> {
        let output_path = xlsx_path(file_name);
        info!(
            input = %md_path.display(),
            output = %output_path.display(),
            "converting markdown table"
        );

        let CoercionOutcome { table, warnings } = self.load(md_path, type_spec)?;

        ExcelExporter::with_options(&table, self.export.clone()).export(&output_path)?;

        info!(
            rows = table.row_count(),
            columns = table.column_count(),
            warnings = warnings.len(),
            output = %output_path.display(),
            "conversion complete"
        );

        Ok(ConversionReport {
            output_path,
            rows: table.row_count(),
            columns: table.column_count(),
            warnings,
        })
    }
}

/// Convert with default options: `md_path` -> `<file_name>.xlsx`
pub fn convert_markdown_table(
    md_path: &Path,
    type_spec: &TypeSpec,
    file_name: &Path,
) -> ConvertResult<ConversionReport> {
    Converter::new(ConvertOptions::default())?.convert(md_path, type_spec, file_name)
}
