//! Column type coercion
//!
//! Each [`TypeSpec`] entry is applied to one column in mapping order. Problems
//! never abort the call: a missing column, an unsupported tag or a failed
//! conversion becomes a [`CoercionWarning`] and the column keeps its previous
//! values. Unparsable cells inside an otherwise successful conversion become
//! missing values.

use crate::error::{ConvertError, ConvertResult};
use crate::types::{
    CoercionWarning, Column, ColumnValue, RawTable, TypeSpec, TypeTag, TypedTable, WarningKind,
};
use chrono::format::{Item, StrftimeItems};
use chrono::NaiveDate;
use std::collections::HashMap;
use thiserror::Error;
use tracing::{debug, warn};

/// Formats tried, in order, when no explicit date format is configured
pub const DEFAULT_DATE_FORMATS: &[&str] = &["%Y-%m-%d", "%Y/%m/%d"];

const TRUE_TOKENS: &[&str] = &["TRUE", "true", "True", "T"];
const FALSE_TOKENS: &[&str] = &["FALSE", "false", "False", "F"];

#[derive(Debug, Clone, Default)]
pub struct CoercerOptions {
    /// chrono format for `date` columns; detected per column when unset
    pub date_format: Option<String>,
}

/// Column-level conversion failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("{0}")]
pub struct ConversionError(pub String);

/// Coerced table plus the warnings raised while producing it
#[derive(Debug, Clone, PartialEq)]
pub struct CoercionOutcome {
    pub table: TypedTable,
    pub warnings: Vec<CoercionWarning>,
}

#[derive(Debug, Clone, Default)]
pub struct ColumnCoercer {
    options: CoercerOptions,
}

impl ColumnCoercer {
    pub fn new(options: CoercerOptions) -> ConvertResult<Self> {
        if let Some(format) = &options.date_format {
            let invalid = format.is_empty()
                || StrftimeItems::new(format).any(|item| matches!(item, Item::Error));
            if invalid {
                return Err(ConvertError::Config(format!(
                    "invalid date format '{}'",
                    format
                )));
            }
        }
        Ok(Self { options })
    }

    /// Apply `spec` to `raw`.
    ///
    /// Every entry converts from the column's original text, so when a column
    /// is listed more than once the last successful conversion wins.
    pub fn coerce(&self, raw: RawTable, spec: &TypeSpec) -> CoercionOutcome {
        let mut converted: Vec<Option<ColumnValue>> = vec![None; raw.column_count()];
        let mut warnings = Vec::new();

        for (column, tag_text) in spec.iter() {
            let Some(idx) = raw.position(column) else {
                warnings.push(CoercionWarning::new(
                    WarningKind::ColumnNotFound,
                    column,
                    tag_text,
                    "column not found, skipping",
                ));
                continue;
            };

            let tag = match tag_text.parse::<TypeTag>() {
                Ok(tag) => tag,
                Err(e) => {
                    warnings.push(CoercionWarning::new(
                        WarningKind::UnsupportedType,
                        column,
                        tag_text,
                        format!("{}, column left unchanged", e),
                    ));
                    continue;
                }
            };

            let cells = &raw.columns[idx].values;
            match self.convert(tag, cells) {
                Ok(values) => {
                    let lost = degraded_cells(cells, &values);
                    if lost > 0 {
                        warnings.push(CoercionWarning::new(
                            WarningKind::ValuesDegraded,
                            column,
                            tag_text,
                            format!("{} value(s) could not be converted and are missing", lost),
                        ));
                    }
                    debug!(column, tag = %tag, missing = values.missing_count(), "converted column");
                    converted[idx] = Some(values);
                }
                Err(e) => {
                    warnings.push(CoercionWarning::new(
                        WarningKind::ConversionFailed,
                        column,
                        tag_text,
                        format!("conversion to {} failed: {}", tag, e),
                    ));
                }
            }
        }

        for warning in &warnings {
            warn!("{}", warning);
        }

        let table = TypedTable {
            columns: raw
                .columns
                .into_iter()
                .zip(converted)
                .map(|(raw_col, values)| {
                    let values = values.unwrap_or(ColumnValue::Text(raw_col.values));
                    Column::new(raw_col.name, values)
                })
                .collect(),
        };

        CoercionOutcome { table, warnings }
    }

    /// Convert one column of text cells to `tag`
    pub fn convert(
        &self,
        tag: TypeTag,
        cells: &[Option<String>],
    ) -> Result<ColumnValue, ConversionError> {
        let values = match tag {
            TypeTag::Numeric => ColumnValue::Number(map_cells(cells, parse_number)),
            TypeTag::Integer => ColumnValue::Integer(map_cells(cells, parse_integer)),
            TypeTag::Character => ColumnValue::Text(cells.to_vec()),
            TypeTag::Logical => ColumnValue::Boolean(map_cells(cells, parse_logical)),
            TypeTag::Date => {
                let format = match &self.options.date_format {
                    Some(format) => format.clone(),
                    None => detect_date_format(cells)?.to_string(),
                };
                ColumnValue::Date(map_cells(cells, |s| parse_date(s, &format)))
            }
            TypeTag::Factor => to_factor(cells),
        };
        Ok(values)
    }
}

/// Coerce with default options
pub fn coerce_columns(raw: RawTable, spec: &TypeSpec) -> CoercionOutcome {
    ColumnCoercer::default().coerce(raw, spec)
}

fn map_cells<T>(cells: &[Option<String>], parse: impl Fn(&str) -> Option<T>) -> Vec<Option<T>> {
    cells
        .iter()
        .map(|cell| cell.as_deref().and_then(&parse))
        .collect()
}

/// Keep only digits, `.` and `-`, then parse: `"$1,200.50"` -> `1200.5`
pub fn parse_number(text: &str) -> Option<f64> {
    let cleaned: String = text
        .chars()
        .filter(|c| c.is_ascii_digit() || matches!(c, '.' | '-'))
        .collect();
    if cleaned.is_empty() {
        return None;
    }
    cleaned.parse::<f64>().ok().filter(|n| n.is_finite())
}

/// [`parse_number`] truncated toward zero: `"42 units"` -> `42`
pub fn parse_integer(text: &str) -> Option<i64> {
    let n = parse_number(text)?.trunc();
    if n >= i64::MIN as f64 && n < i64::MAX as f64 {
        Some(n as i64)
    } else {
        None
    }
}

pub fn parse_logical(text: &str) -> Option<bool> {
    if TRUE_TOKENS.contains(&text) {
        Some(true)
    } else if FALSE_TOKENS.contains(&text) {
        Some(false)
    } else {
        None
    }
}

pub fn parse_date(text: &str, format: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(text.trim(), format).ok()
}

/// Pick the date format from the first non-empty cell.
///
/// A column whose first value matches none of [`DEFAULT_DATE_FORMATS`] fails
/// as a whole.
fn detect_date_format(cells: &[Option<String>]) -> Result<&'static str, ConversionError> {
    let first = cells
        .iter()
        .flatten()
        .map(|s| s.trim())
        .find(|s| !s.is_empty());

    let Some(first) = first else {
        return Ok(DEFAULT_DATE_FORMATS[0]);
    };

    DEFAULT_DATE_FORMATS
        .iter()
        .copied()
        .find(|format| parse_date(first, format).is_some())
        .ok_or_else(|| {
            ConversionError(format!(
                "character string is not in a standard unambiguous format: '{}'",
                first
            ))
        })
}

fn to_factor(cells: &[Option<String>]) -> ColumnValue {
    let mut levels: Vec<String> = Vec::new();
    let mut index: HashMap<&str, usize> = HashMap::new();
    let mut codes = Vec::with_capacity(cells.len());

    for cell in cells {
        let code = cell.as_deref().map(|value| {
            *index.entry(value).or_insert_with(|| {
                levels.push(value.to_string());
                levels.len() - 1
            })
        });
        codes.push(code);
    }

    ColumnValue::Factor { levels, codes }
}

/// Cells that had non-empty text but came out missing
fn degraded_cells(cells: &[Option<String>], values: &ColumnValue) -> usize {
    cells
        .iter()
        .enumerate()
        .filter(|(idx, cell)| {
            cell.as_deref().is_some_and(|s| !s.trim().is_empty()) && values.is_missing(*idx)
        })
        .count()
}
