//! Column type coercion engine

pub mod coercer;

pub use coercer::{coerce_columns, CoercerOptions, CoercionOutcome, ColumnCoercer, ConversionError};
