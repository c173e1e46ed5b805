//! md2xlsx - markdown pipe tables to Excel with column type coercion
//!
//! The pipeline has two steps in front of the Excel writer:
//!
//! - parse a markdown table, dropping the alignment row and the empty columns
//!   produced by leading/trailing pipes
//! - coerce listed columns to `numeric`, `integer`, `character`, `logical`,
//!   `date` or `factor`; failures are reported per column and never abort
//!
//! # Example
//!
//! ```no_run
//! use md2xlsx::convert_markdown_table;
//! use md2xlsx::types::TypeSpec;
//! use std::path::Path;
//!
//! let spec: TypeSpec = [("Age(x)", "integer"), ("q_x", "numeric")]
//!     .into_iter()
//!     .collect();
//! let report = convert_markdown_table(Path::new("life.md"), &spec, Path::new("life"))?;
//!
//! println!("Wrote {} rows to {}", report.rows, report.output_path.display());
//! for warning in &report.warnings {
//!     eprintln!("warning: {}", warning);
//! }
//! # Ok::<(), md2xlsx::error::ConvertError>(())
//! ```

pub mod cli;
pub mod convert;
pub mod core;
pub mod error;
pub mod excel;
pub mod parser;
pub mod types;
pub mod typespec;

// Re-export commonly used types
pub use convert::{convert_markdown_table, ConversionReport, ConvertOptions, Converter};
pub use error::{ConvertError, ConvertResult};
pub use types::{
    CoercionWarning, Column, ColumnValue, RawTable, TypeSpec, TypeTag, TypedTable, WarningKind,
};
