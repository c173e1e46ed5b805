use crate::convert::{ConvertOptions, Converter};
use crate::core::CoercionOutcome;
use crate::error::ConvertResult;
use crate::excel::xlsx_path;
use crate::types::{CoercionWarning, TypeSpec, TypeTag, TypedTable};
use crate::typespec;
use colored::Colorize;
use serde::Serialize;
use std::path::{Path, PathBuf};

/// Shown for missing cells in previews
const MISSING: &str = "NA";

/// Widest a preview column gets before values are cut
const MAX_PREVIEW_WIDTH: usize = 24;

/// Merge the YAML mapping file (first) with `NAME=TYPE` pairs (appended)
pub fn build_type_spec(types_file: Option<&Path>, pairs: &[String]) -> ConvertResult<TypeSpec> {
    let mut spec = match types_file {
        Some(path) => typespec::load_type_spec(path)?,
        None => TypeSpec::new(),
    };
    spec.extend(typespec::type_spec_from_pairs(pairs)?);
    Ok(spec)
}

/// Execute the convert command
pub fn convert(
    input: PathBuf,
    file_name: PathBuf,
    type_spec: TypeSpec,
    options: ConvertOptions,
    verbose: bool,
    json: bool,
) -> ConvertResult<()> {
    if json {
        let report = Converter::new(options)?.convert(&input, &type_spec, &file_name)?;
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("{}", "🔥 md2xlsx - Markdown to Excel".bold().green());
    println!("   Input:  {}", input.display());
    println!("   Output: {}\n", xlsx_path(&file_name).display());

    if verbose {
        print_type_spec(&type_spec);
    }

    let converter = Converter::new(options)?;
    let report = converter.convert(&input, &type_spec, &file_name)?;

    print_warnings(&report.warnings);

    println!("{}", "✅ Conversion Complete!".bold().green());
    println!(
        "   {} rows, {} columns",
        report.rows.to_string().bold(),
        report.columns.to_string().bold()
    );
    println!("   Excel file: {}\n", report.output_path.display());

    Ok(())
}

/// Preview document for `--json`
#[derive(Serialize)]
struct Preview<'a> {
    table: &'a TypedTable,
    warnings: &'a [CoercionWarning],
}

/// Execute the preview command: parse and coerce, print instead of writing
pub fn preview(
    input: PathBuf,
    type_spec: TypeSpec,
    options: ConvertOptions,
    json: bool,
) -> ConvertResult<()> {
    let converter = Converter::new(options)?;
    let CoercionOutcome { table, warnings } = converter.load(&input, &type_spec)?;

    if json {
        let doc = Preview {
            table: &table,
            warnings: &warnings,
        };
        println!("{}", serde_json::to_string_pretty(&doc)?);
        return Ok(());
    }

    println!("{}", "🔍 md2xlsx - Preview".bold().green());
    println!("   Input: {}\n", input.display());

    print_table(&table);
    println!();
    print_warnings(&warnings);

    println!(
        "{}",
        format!(
            "✅ {} rows, {} columns",
            table.row_count(),
            table.column_count()
        )
        .bold()
        .green()
    );

    Ok(())
}

/// Execute the types command
pub fn types() -> ConvertResult<()> {
    println!("{}", "📐 Supported column types".bold().green());
    for tag in TypeTag::all() {
        let aliases = tag.aliases();
        if aliases.is_empty() {
            println!("   {:<10} {}", tag.as_str().bright_blue(), describe_tag(*tag));
        } else {
            println!(
                "   {:<10} {} (also: {})",
                tag.as_str().bright_blue(),
                describe_tag(*tag),
                aliases.join(", ")
            );
        }
    }
    Ok(())
}

fn describe_tag(tag: TypeTag) -> &'static str {
    match tag {
        TypeTag::Numeric => "number; keeps digits, '.' and '-' before parsing",
        TypeTag::Integer => "whole number; like numeric, fraction truncated",
        TypeTag::Character => "text, unchanged",
        TypeTag::Logical => "TRUE/FALSE (also true/false, True/False, T/F)",
        TypeTag::Date => "date; YYYY-MM-DD or YYYY/MM/DD unless --date-format is given",
        TypeTag::Factor => "categorical; levels in first-seen order",
    }
}

fn print_type_spec(type_spec: &TypeSpec) {
    if type_spec.is_empty() {
        println!("{}", "📋 No column types given, all columns stay text\n".cyan());
        return;
    }
    println!("{}", "📋 Column types:".cyan());
    for (column, tag) in type_spec.iter() {
        println!("   {} → {}", column.bright_blue(), tag);
    }
    println!();
}

fn print_warnings(warnings: &[CoercionWarning]) {
    if warnings.is_empty() {
        return;
    }
    println!(
        "{}",
        format!("⚠️  {} warning(s):", warnings.len()).yellow().bold()
    );
    for warning in warnings {
        println!("   {}", warning.to_string().yellow());
    }
    println!();
}

fn print_table(table: &TypedTable) {
    let headers: Vec<String> = table
        .columns
        .iter()
        .map(|c| format!("{} <{}>", c.name, c.values.type_name()))
        .collect();

    let rows: Vec<Vec<String>> = (0..table.row_count())
        .map(|row| {
            table
                .columns
                .iter()
                .map(|c| format_cell(c.values.display_cell(row)))
                .collect()
        })
        .collect();

    let widths: Vec<usize> = headers
        .iter()
        .enumerate()
        .map(|(idx, header)| {
            rows.iter()
                .map(|row| row[idx].chars().count())
                .chain(std::iter::once(header.chars().count()))
                .max()
                .unwrap_or(0)
        })
        .collect();

    let header_line: Vec<String> = headers
        .iter()
        .zip(&widths)
        .map(|(h, w)| format!("{:<w$}", h, w = *w))
        .collect();
    println!("   {}", header_line.join(" │ ").bold());
    println!(
        "   {}",
        "─".repeat(widths.iter().sum::<usize>() + 3 * widths.len().saturating_sub(1))
    );

    for row in &rows {
        let line: Vec<String> = row
            .iter()
            .zip(&widths)
            .map(|(v, w)| format!("{:<w$}", v, w = *w))
            .collect();
        println!("   {}", line.join(" │ "));
    }
}

/// Cell text for previews, cut to [`MAX_PREVIEW_WIDTH`] characters
fn format_cell(value: Option<String>) -> String {
    match value {
        None => MISSING.to_string(),
        Some(text) if text.chars().count() > MAX_PREVIEW_WIDTH => {
            let cut: String = text.chars().take(MAX_PREVIEW_WIDTH - 1).collect();
            format!("{}…", cut)
        }
        Some(text) => text,
    }
}

#[cfg(test)]
#[path = "commands_tests.rs"]
mod tests;
