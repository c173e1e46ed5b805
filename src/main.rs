use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use md2xlsx::cli;
use md2xlsx::convert::ConvertOptions;
use md2xlsx::core::CoercerOptions;
use md2xlsx::excel::{ExportOptions, DEFAULT_SHEET_NAME};
use md2xlsx::parser::{ParserOptions, DEFAULT_PLACEHOLDER_PATTERN};
use md2xlsx::types::TypeSpec;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "md2xlsx")]
#[command(about = "Convert a markdown pipe table to Excel, coercing column types.")]
#[command(long_about = "md2xlsx - Markdown pipe tables to Excel (.xlsx)

Reads a markdown table, drops the alignment row and the empty columns
produced by leading/trailing pipes, converts the columns you name to
numbers, integers, booleans, dates or factors, and writes one worksheet.

A column that cannot be converted is left as text with a warning;
only unreadable input or a malformed type mapping stops the run.

COMMANDS:
  convert   - Markdown table to <FILE_NAME>.xlsx
  preview   - Show the parsed and typed table without writing
  types     - List supported column types

EXAMPLES:
  md2xlsx convert life.md life -t 'Age(x)=integer' -t q_x=numeric
  md2xlsx convert life.md out/life --types types.yaml
  md2xlsx convert life.md life -t q_x=numeric --json
  md2xlsx preview life.md -t q_x=numeric --json")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args)]
struct TypeArgs {
    /// Column type as NAME=TYPE (repeatable, applied in order)
    #[arg(short = 't', long = "type", value_name = "NAME=TYPE")]
    pairs: Vec<String>,

    /// YAML file mapping column names to types (applied before --type)
    #[arg(long = "types", value_name = "FILE")]
    file: Option<PathBuf>,
}

#[derive(Args)]
struct ParseArgs {
    /// Regex for header names whose columns are dropped
    #[arg(long, value_name = "REGEX", default_value = DEFAULT_PLACEHOLDER_PATTERN)]
    placeholder_pattern: String,

    /// chrono format for date columns (default: YYYY-MM-DD or YYYY/MM/DD)
    #[arg(long, value_name = "FORMAT")]
    date_format: Option<String>,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Convert a markdown table file to <FILE_NAME>.xlsx.

The .xlsx suffix is appended to FILE_NAME. Column types come from --types
(a YAML mapping) followed by any --type NAME=TYPE pairs, in order.

TYPES:
  numeric, integer, character, logical, date, factor

EXAMPLE:
  md2xlsx convert life.md life -t 'Age(x)=integer' -t l_x=integer -t q_x=numeric")]
    /// Convert a markdown table to Excel
    Convert {
        /// Markdown file containing one pipe table
        input: PathBuf,

        /// Output base name, without extension
        file_name: PathBuf,

        #[command(flatten)]
        types: TypeArgs,

        #[command(flatten)]
        parse: ParseArgs,

        /// Worksheet name
        #[arg(long, default_value = DEFAULT_SHEET_NAME)]
        sheet: String,

        /// Show verbose conversion steps
        #[arg(short, long)]
        verbose: bool,

        /// Print the conversion report as JSON instead of banners
        #[arg(long)]
        json: bool,
    },

    /// Show the parsed and typed table without writing a file
    Preview {
        /// Markdown file containing one pipe table
        input: PathBuf,

        #[command(flatten)]
        types: TypeArgs,

        #[command(flatten)]
        parse: ParseArgs,

        /// Print JSON instead of a text table
        #[arg(long)]
        json: bool,
    },

    /// List supported column types
    Types,
}

impl TypeArgs {
    fn type_spec(&self) -> anyhow::Result<TypeSpec> {
        cli::build_type_spec(self.file.as_deref(), &self.pairs).context("invalid column types")
    }
}

impl ParseArgs {
    fn options(self, sheet_name: String) -> ConvertOptions {
        ConvertOptions {
            parser: ParserOptions {
                placeholder_pattern: self.placeholder_pattern,
            },
            coercer: CoercerOptions {
                date_format: self.date_format,
            },
            export: ExportOptions { sheet_name },
        }
    }
}

fn init_logging(verbose: bool) {
    let default_filter = if verbose { "md2xlsx=debug" } else { "md2xlsx=error" };
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Convert {
            input,
            file_name,
            types,
            parse,
            sheet,
            verbose,
            json,
        } => {
            init_logging(verbose);
            let type_spec = types.type_spec()?;
            let context = format!("failed to convert {}", input.display());
            cli::convert(input, file_name, type_spec, parse.options(sheet), verbose, json)
                .context(context)
        }

        Commands::Preview {
            input,
            types,
            parse,
            json,
        } => {
            init_logging(false);
            let type_spec = types.type_spec()?;
            let context = format!("failed to preview {}", input.display());
            cli::preview(
                input,
                type_spec,
                parse.options(DEFAULT_SHEET_NAME.to_string()),
                json,
            )
            .context(context)
        }

        Commands::Types => Ok(cli::types()?),
    }
}
