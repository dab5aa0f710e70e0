//! datasynth - Seeded synthetic data generation for tabular data

use std::fs::File;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand, ValueEnum};

use datasynth::analyze::{analyze, AnalyzeSpec};
use datasynth::output::{render_preview, OutputFactory, OutputFormat};
use datasynth::reader::ReaderFactory;
use datasynth::recipe::Recipe;
use datasynth::Table;

#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliOutputFormat {
    Terminal,
    Csv,
    Json,
}

impl From<CliOutputFormat> for OutputFormat {
    fn from(f: CliOutputFormat) -> Self {
        match f {
            CliOutputFormat::Terminal => OutputFormat::Terminal,
            CliOutputFormat::Csv => OutputFormat::Csv,
            CliOutputFormat::Json => OutputFormat::Json,
        }
    }
}

/// Seeded synthetic data generation for tabular data
#[derive(Parser, Debug)]
#[command(name = "datasynth")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Generate a table from a JSON recipe of column operations
    Generate {
        /// Recipe file describing the columns to generate
        #[arg(short, long)]
        recipe: PathBuf,

        /// Number of rows to generate
        #[arg(short = 'n', long)]
        rows: usize,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,
    },

    /// Generate a statistical replica of a reference table (CSV or JSON)
    Mimic {
        /// Reference file to mimic
        reference: PathBuf,

        /// Number of rows to generate (defaults to the reference row count)
        #[arg(short = 'n', long)]
        rows: Option<usize>,

        /// Seed for reproducible output
        #[arg(short, long)]
        seed: Option<u64>,

        /// String column(s) to treat as categorical (comma-separated)
        #[arg(long, value_delimiter = ',')]
        categorical: Vec<String>,

        /// Emit replica date columns in ascending order
        #[arg(long)]
        ordered_dates: bool,

        /// Write to this file instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Output format
        #[arg(short, long, value_enum, default_value = "terminal")]
        format: CliOutputFormat,
    },
}

fn main() -> ExitCode {
    match run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            ExitCode::from(2)
        }
    }
}

fn run() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Command::Generate {
            recipe,
            rows,
            seed,
            output,
            format,
        } => {
            let text = std::fs::read_to_string(&recipe)
                .with_context(|| format!("Failed to read recipe: {}", recipe.display()))?;
            let recipe = Recipe::from_json(&text)?;
            let table = recipe.apply(rows, seed)?;
            emit(&table, output, format, "generated table")
        }
        Command::Mimic {
            reference,
            rows,
            seed,
            categorical,
            ordered_dates,
            output,
            format,
        } => {
            let factory = ReaderFactory::new();
            let table = factory
                .read(&reference)
                .with_context(|| format!("Failed to read reference: {}", reference.display()))?;

            let mut spec = AnalyzeSpec::new(rows.unwrap_or_else(|| table.height()))
                .with_categorical(categorical)
                .with_ordered_dates(ordered_dates);
            spec.seed = seed;

            let replica = analyze(&table, &spec)?;
            emit(&replica, output, format, "replica table")
        }
    }
}

/// Write a table to a file or stdout in the requested format
fn emit(
    table: &Table,
    output: Option<PathBuf>,
    format: CliOutputFormat,
    title: &str,
) -> Result<()> {
    match output {
        Some(path) => {
            let mut file = File::create(&path)
                .with_context(|| format!("Failed to create output file: {}", path.display()))?;
            let formatter = OutputFactory::create(file_format(format, &path));
            formatter.render(table, &mut file)
        }
        None => match format {
            CliOutputFormat::Terminal => render_preview(table, title),
            other => {
                let formatter = OutputFactory::create(other.into());
                formatter.render(table, &mut std::io::stdout())
            }
        },
    }
}

/// A terminal preview makes no sense in a file; fall back to the
/// extension's format, defaulting to CSV.
fn file_format(format: CliOutputFormat, path: &std::path::Path) -> OutputFormat {
    match format {
        CliOutputFormat::Terminal => match path.extension().and_then(|e| e.to_str()) {
            Some("json") => OutputFormat::Json,
            _ => OutputFormat::Csv,
        },
        other => other.into(),
    }
}
