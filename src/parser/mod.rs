//! Markdown pipe-table parser
//!
//! Turns a table such as
//!
//! ```text
//! | name | qty |
//! | ---- | --: |
//! | nut  | 12  |
//! ```
//!
//! into a [`RawTable`] with columns `name` and `qty`. The first non-blank line
//! is the header, the second is the alignment row and is always discarded, and
//! every later line is a data row.
//!
//! Splitting `| name | qty |` on `|` yields an empty leading and trailing cell.
//! Blank header cells are given placeholder names (`NA`, `NA.1`, `NA.2`, ...)
//! and every column whose header matches the placeholder pattern is dropped.

use crate::error::{ConvertError, ConvertResult};
use crate::types::{RawColumn, RawTable};
use regex::Regex;
use std::path::Path;
use tracing::debug;

/// Header names treated as decoration: `NA`, `NA.1`, `NA.2`, ...
pub const DEFAULT_PLACEHOLDER_PATTERN: &str = r"^NA(\.\d+)?$";

const PLACEHOLDER_NAME: &str = "NA";

#[derive(Debug, Clone)]
pub struct ParserOptions {
    /// Regex matched against header names; matching columns are dropped
    pub placeholder_pattern: String,
}

impl Default for ParserOptions {
    fn default() -> Self {
        Self {
            placeholder_pattern: DEFAULT_PLACEHOLDER_PATTERN.to_string(),
        }
    }
}

/// Markdown table parser
#[derive(Debug, Clone)]
pub struct TableParser {
    placeholder: Regex,
}

impl TableParser {
    pub fn new(options: &ParserOptions) -> ConvertResult<Self> {
        let placeholder = Regex::new(&options.placeholder_pattern).map_err(|e| {
            ConvertError::Config(format!(
                "invalid placeholder pattern '{}': {}",
                options.placeholder_pattern, e
            ))
        })?;
        Ok(Self { placeholder })
    }

    /// Read and parse a markdown table file
    pub fn parse_file(&self, path: &Path) -> ConvertResult<RawTable> {
        let content = std::fs::read_to_string(path)?;
        Ok(self.parse_str(&content))
    }

    /// Parse markdown table text
    pub fn parse_str(&self, content: &str) -> RawTable {
        // `trim` keeps U+FEFF, so a BOM would survive as a header cell
        let content = content.strip_prefix('\u{feff}').unwrap_or(content);
        let lines: Vec<Vec<String>> = content
            .lines()
            .filter(|line| !line.trim().is_empty())
            .map(split_cells)
            .collect();

        let Some(header_cells) = lines.first() else {
            return RawTable::new();
        };

        // Line 2 is the alignment row, never data
        let rows: &[Vec<String>] = lines.get(2..).unwrap_or(&[]);

        let width = rows
            .iter()
            .map(Vec::len)
            .chain(std::iter::once(header_cells.len()))
            .max()
            .unwrap_or(0);

        let header = name_columns(header_cells, width);

        let mut table = RawTable::new();
        for (idx, name) in header.into_iter().enumerate() {
            if self.is_placeholder(&name) {
                debug!(column = idx, name = %name, "dropping placeholder column");
                continue;
            }
            let values = rows.iter().map(|row| row.get(idx).cloned()).collect();
            table.add_column(RawColumn::new(name, values));
        }

        debug!(
            columns = table.column_count(),
            rows = rows.len(),
            "parsed markdown table"
        );
        table
    }

    pub fn is_placeholder(&self, name: &str) -> bool {
        self.placeholder.is_match(name)
    }
}

/// Parse a markdown table file with default options
pub fn parse_markdown_table(path: &Path) -> ConvertResult<RawTable> {
    TableParser::new(&ParserOptions::default())?.parse_file(path)
}

/// Split a line on `|`, trimming each cell
fn split_cells(line: &str) -> Vec<String> {
    line.split('|').map(|cell| cell.trim().to_string()).collect()
}

/// Header names for `width` columns; blank or absent cells get `NA`, `NA.1`, ...
fn name_columns(header_cells: &[String], width: usize) -> Vec<String> {
    let mut placeholders = 0usize;
    (0..width)
        .map(|idx| match header_cells.get(idx) {
            Some(name) if !name.is_empty() => name.clone(),
            _ => {
                let name = if placeholders == 0 {
                    PLACEHOLDER_NAME.to_string()
                } else {
                    format!("{}.{}", PLACEHOLDER_NAME, placeholders)
                };
                placeholders += 1;
                name
            }
        })
        .collect()
}
