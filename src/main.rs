use clap::{Parser, Subcommand};
use royalbit_sheetmap::cli;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "sheetmap")]
#[command(about = "Inspect workbooks and manage export options for sheetmap record mapping.")]
#[command(long_about = "Sheetmap - annotated Rust records <-> Excel workbooks

COMMANDS:
  inspect   - Show sheets, headers and row counts of a workbook
  defaults  - Print or write the default export options (YAML)
  options   - Validate an export options file

EXAMPLES:
  sheetmap inspect orders.xlsx --verbose
  sheetmap inspect orders.xlsx --json
  sheetmap defaults -o export.yaml
  sheetmap options export.yaml

Logging follows RUST_LOG (default: warn).")]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    #[command(long_about = "Show the sheets of a workbook.

Lists every worksheet with its header row and the number of non-blank
data rows below it. Supports .xlsx, .xlsm, .xlsb, .xls and .ods.")]
    /// Show sheets, headers and row counts of a workbook
    Inspect {
        /// Path to the workbook
        file: PathBuf,

        /// Print the summary as JSON
        #[arg(long)]
        json: bool,

        /// List every header per sheet
        #[arg(short, long)]
        verbose: bool,
    },

    /// Print or write the default export options (YAML)
    Defaults {
        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Validate an export options file
    Options {
        /// Path to YAML options file
        file: PathBuf,
    },
}

fn init_tracing(verbose: bool) {
    let default_filter = if verbose {
        "royalbit_sheetmap=debug"
    } else {
        "warn"
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .init();
}

fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let verbose = matches!(cli.command, Commands::Inspect { verbose: true, .. });
    init_tracing(verbose);

    match cli.command {
        Commands::Inspect {
            file,
            json,
            verbose,
        } => cli::inspect(file, json, verbose)?,

        Commands::Defaults { output } => cli::defaults(output)?,

        Commands::Options { file } => cli::options(file)?,
    }

    Ok(())
}
