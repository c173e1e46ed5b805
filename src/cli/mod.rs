//! CLI command handlers

pub mod commands;

pub use commands::{build_type_spec, convert, preview, types};
