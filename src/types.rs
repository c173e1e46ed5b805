use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//==============================================================================
// Raw (text) tables
//==============================================================================

/// A column of text cells as read from the markdown source.
///
/// `None` marks a cell the source line did not contain at all; a cell that was
/// present but blank is `Some("")`.
#[derive(Debug, Clone, PartialEq)]
pub struct RawColumn {
    pub name: String,
    pub values: Vec<Option<String>>,
}

impl RawColumn {
    pub fn new(name: impl Into<String>, values: Vec<Option<String>>) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Parsed markdown table, every value still text
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawTable {
    pub columns: Vec<RawColumn>,
}

impl RawTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a column. All columns must share the same row count.
    pub fn add_column(&mut self, column: RawColumn) {
        debug_assert!(
            self.columns.is_empty() || column.len() == self.row_count(),
            "column '{}' has {} rows, table has {}",
            column.name,
            column.len(),
            self.row_count()
        );
        self.columns.push(column);
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    /// First column carrying `name`; duplicate headers resolve to the leftmost.
    pub fn column(&self, name: &str) -> Option<&RawColumn> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn position(&self, name: &str) -> Option<usize> {
        self.columns.iter().position(|c| c.name == name)
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

//==============================================================================
// Type tags and mappings
//==============================================================================

/// Target type a column can be coerced to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TypeTag {
    /// Floating point number (`numeric`, `double`)
    Numeric,
    /// Whole number, fractional part truncated
    Integer,
    /// Text, unchanged
    Character,
    /// Boolean
    Logical,
    /// Calendar date
    Date,
    /// Categorical column with levels in first-seen order
    Factor,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unsupported type '{0}'")]
pub struct UnknownTypeTag(pub String);

impl TypeTag {
    pub fn as_str(&self) -> &'static str {
        match self {
            TypeTag::Numeric => "numeric",
            TypeTag::Integer => "integer",
            TypeTag::Character => "character",
            TypeTag::Logical => "logical",
            TypeTag::Date => "date",
            TypeTag::Factor => "factor",
        }
    }

    pub fn all() -> &'static [TypeTag] {
        &[
            TypeTag::Numeric,
            TypeTag::Integer,
            TypeTag::Character,
            TypeTag::Logical,
            TypeTag::Date,
            TypeTag::Factor,
        ]
    }

    /// Alternative spellings accepted besides [`TypeTag::as_str`]
    pub fn aliases(&self) -> &'static [&'static str] {
        match self {
            TypeTag::Numeric => &["double"],
            TypeTag::Date => &["Date"],
            _ => &[],
        }
    }
}

impl fmt::Display for TypeTag {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TypeTag {
    type Err = UnknownTypeTag;

    /// Tags are case-sensitive, surrounding whitespace is ignored.
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim() {
            "numeric" | "double" => Ok(TypeTag::Numeric),
            "integer" => Ok(TypeTag::Integer),
            "character" => Ok(TypeTag::Character),
            "logical" => Ok(TypeTag::Logical),
            "date" | "Date" => Ok(TypeTag::Date),
            "factor" => Ok(TypeTag::Factor),
            other => Err(UnknownTypeTag(other.to_string())),
        }
    }
}

/// Ordered column name -> type tag mapping.
///
/// Tags are kept as written so that unsupported ones can be reported per
/// column during coercion instead of rejecting the whole mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TypeSpec {
    entries: Vec<(String, String)>,
}

impl TypeSpec {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, column: impl Into<String>, tag: impl Into<String>) {
        self.entries.push((column.into(), tag.into()));
    }

    pub fn extend(&mut self, other: TypeSpec) {
        self.entries.extend(other.entries);
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(c, t)| (c.as_str(), t.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl<C: Into<String>, T: Into<String>> FromIterator<(C, T)> for TypeSpec {
    fn from_iter<I: IntoIterator<Item = (C, T)>>(iter: I) -> Self {
        let mut spec = TypeSpec::new();
        for (column, tag) in iter {
            spec.insert(column, tag);
        }
        spec
    }
}

//==============================================================================
// Typed tables
//==============================================================================

/// Column value types (homogeneous arrays, every cell optionally missing)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "type", content = "values", rename_all = "lowercase")]
pub enum ColumnValue {
    Text(Vec<Option<String>>),
    Number(Vec<Option<f64>>),
    Integer(Vec<Option<i64>>),
    Boolean(Vec<Option<bool>>),
    Date(Vec<Option<NaiveDate>>),
    /// Indices into `levels`
    Factor {
        levels: Vec<String>,
        codes: Vec<Option<usize>>,
    },
}

impl ColumnValue {
    pub fn len(&self) -> usize {
        match self {
            ColumnValue::Text(v) => v.len(),
            ColumnValue::Number(v) => v.len(),
            ColumnValue::Integer(v) => v.len(),
            ColumnValue::Boolean(v) => v.len(),
            ColumnValue::Date(v) => v.len(),
            ColumnValue::Factor { codes, .. } => codes.len(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn type_name(&self) -> &'static str {
        match self {
            ColumnValue::Text(_) => TypeTag::Character.as_str(),
            ColumnValue::Number(_) => TypeTag::Numeric.as_str(),
            ColumnValue::Integer(_) => TypeTag::Integer.as_str(),
            ColumnValue::Boolean(_) => TypeTag::Logical.as_str(),
            ColumnValue::Date(_) => TypeTag::Date.as_str(),
            ColumnValue::Factor { .. } => TypeTag::Factor.as_str(),
        }
    }

    /// Number of missing cells
    pub fn missing_count(&self) -> usize {
        match self {
            ColumnValue::Text(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValue::Number(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValue::Integer(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValue::Boolean(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValue::Date(v) => v.iter().filter(|x| x.is_none()).count(),
            ColumnValue::Factor { codes, .. } => codes.iter().filter(|x| x.is_none()).count(),
        }
    }

    pub fn is_missing(&self, index: usize) -> bool {
        match self {
            ColumnValue::Text(v) => matches!(v.get(index), None | Some(None)),
            ColumnValue::Number(v) => matches!(v.get(index), None | Some(None)),
            ColumnValue::Integer(v) => matches!(v.get(index), None | Some(None)),
            ColumnValue::Boolean(v) => matches!(v.get(index), None | Some(None)),
            ColumnValue::Date(v) => matches!(v.get(index), None | Some(None)),
            ColumnValue::Factor { codes, .. } => matches!(codes.get(index), None | Some(None)),
        }
    }

    /// Display text of one cell, `None` when missing or out of range
    pub fn display_cell(&self, index: usize) -> Option<String> {
        match self {
            ColumnValue::Text(v) => v.get(index)?.clone(),
            ColumnValue::Number(v) => v.get(index)?.map(|n| n.to_string()),
            ColumnValue::Integer(v) => v.get(index)?.map(|n| n.to_string()),
            ColumnValue::Boolean(v) => v
                .get(index)?
                .map(|b| if b { "TRUE" } else { "FALSE" }.to_string()),
            ColumnValue::Date(v) => v.get(index)?.map(|d| d.format("%Y-%m-%d").to_string()),
            ColumnValue::Factor { levels, codes } => {
                codes.get(index)?.and_then(|c| levels.get(c).cloned())
            }
        }
    }
}

/// A named column in a [`TypedTable`]
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Column {
    pub name: String,
    #[serde(flatten)]
    pub values: ColumnValue,
}

impl Column {
    pub fn new(name: impl Into<String>, values: ColumnValue) -> Self {
        Self {
            name: name.into(),
            values,
        }
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

/// Table after coercion; unlisted columns stay [`ColumnValue::Text`]
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct TypedTable {
    pub columns: Vec<Column>,
}

impl TypedTable {
    pub fn column(&self, name: &str) -> Option<&Column> {
        self.columns.iter().find(|c| c.name == name)
    }

    pub fn column_names(&self) -> Vec<&str> {
        self.columns.iter().map(|c| c.name.as_str()).collect()
    }

    pub fn row_count(&self) -> usize {
        self.columns.first().map(|c| c.len()).unwrap_or(0)
    }

    pub fn column_count(&self) -> usize {
        self.columns.len()
    }
}

impl From<RawTable> for TypedTable {
    fn from(raw: RawTable) -> Self {
        Self {
            columns: raw
                .columns
                .into_iter()
                .map(|c| Column::new(c.name, ColumnValue::Text(c.values)))
                .collect(),
        }
    }
}

//==============================================================================
// Coercion diagnostics
//==============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum WarningKind {
    /// Mapping names a column the table does not have
    ColumnNotFound,
    /// Mapping uses a tag outside [`TypeTag::all`]
    UnsupportedType,
    /// Conversion of the whole column failed, column left as it was
    ConversionFailed,
    /// Conversion succeeded but some non-empty cells became missing
    ValuesDegraded,
}

/// Non-fatal, column-scoped diagnostic produced during coercion
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CoercionWarning {
    pub kind: WarningKind,
    pub column: String,
    pub type_tag: String,
    pub message: String,
}

impl CoercionWarning {
    pub fn new(
        kind: WarningKind,
        column: impl Into<String>,
        type_tag: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            column: column.into(),
            type_tag: type_tag.into(),
            message: message.into(),
        }
    }
}

impl fmt::Display for CoercionWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "column '{}' ({}): {}",
            self.column, self.type_tag, self.message
        )
    }
}
