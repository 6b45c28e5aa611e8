use anyhow::{Context, Result};
use clap::Parser;
use comfy_table::{presets::UTF8_FULL, Cell, CellAlignment, ContentArrangement, Table};
use configuration::{load_config, OutlierCriterion};
use evaluation::{EvaluationError, EvaluationResult, FlaggedSeries};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

/// Time-bucketed data quality evaluation with outlier detection.
#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// The evaluation config (TOML, JSON or YAML).
    config: PathBuf,

    /// Also write the full result as JSON to this file.
    #[arg(long)]
    json: Option<PathBuf>,

    /// Overrides `outliers.criterion` from the config.
    #[arg(long, value_enum)]
    criterion: Option<OutlierCriterion>,

    /// Also write the log to this file.
    #[arg(long)]
    log_file: Option<PathBuf>,
}

/// The main entry point for the Chronoscope CLI.
fn main() -> ExitCode {
    let cli = Cli::parse();

    let _guard = match init_tracing(cli.log_file.as_deref()) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    match execute(&cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            if let Some(schema) = e
                .downcast_ref::<EvaluationError>()
                .and_then(EvaluationError::available_schema)
            {
                eprintln!("Available columns:\n{schema}");
            }
            tracing::error!("{e:#}");
            ExitCode::FAILURE
        }
    }
}

// ==============================================================================
// Logging
// ==============================================================================

/// Logs to stderr, filtered by `RUST_LOG` (default `info`), and optionally to
/// a file. The returned guard flushes the file writer when dropped.
fn init_tracing(log_file: Option<&Path>) -> Result<Option<WorkerGuard>> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let (file_layer, guard) = match log_file {
        Some(path) => {
            let directory = path
                .parent()
                .filter(|p| !p.as_os_str().is_empty())
                .unwrap_or(Path::new("."));
            let file_name = path
                .file_name()
                .with_context(|| format!("`{}` is not a file path", path.display()))?;
            let appender = tracing_appender::rolling::never(directory, file_name);
            let (writer, guard) = tracing_appender::non_blocking(appender);
            let layer = fmt::layer().with_ansi(false).with_writer(writer);
            (Some(layer), Some(guard))
        }
        None => (None, None),
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().with_writer(std::io::stderr))
        .with(file_layer)
        .try_init()
        .context("Failed to install the log subscriber")?;
    Ok(guard)
}

// ==============================================================================
// Evaluation
// ==============================================================================

fn execute(cli: &Cli) -> Result<()> {
    // A missing .env file is fine; `$VAR` placeholders fall back to the process env.
    if let Err(e) = dotenvy::dotenv() {
        tracing::debug!("No .env file loaded: {e}");
    }

    let mut config = load_config(&cli.config)
        .with_context(|| format!("Failed to load config from {}", cli.config.display()))?;
    if let Some(criterion) = cli.criterion {
        config.outliers.criterion = criterion;
    }

    let result = evaluation::run(&config)?;
    println!("{}", summary_table(&result));

    if let Some(path) = &cli.json {
        let file = File::create(path)
            .with_context(|| format!("Failed to create {}", path.display()))?;
        serde_json::to_writer_pretty(BufWriter::new(file), &result)
            .with_context(|| format!("Failed to write {}", path.display()))?;
        tracing::info!(path = %path.display(), "Result written");
    }
    Ok(())
}

/// One row per series: how many buckets it covers and how many are flagged.
fn summary_table(result: &EvaluationResult) -> Table {
    let mut table = Table::new();
    table
        .load_preset(UTF8_FULL)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_header(vec![
            "Column", "Metric", "Buckets", "Outliers", "Mean", "Std", "Min", "Max",
        ]);

    add_series_row(&mut table, "(rows)", "row_count", result.row_counts());
    for column in result.columns() {
        for metric in column.metrics() {
            add_series_row(&mut table, column.name(), metric.metric().name(), metric.series());
        }
    }
    if let Some(target) = result.target() {
        add_series_row(&mut table, target.column(), "target_average", target.series());
    }

    for index in 2..8 {
        if let Some(column) = table.column_mut(index) {
            column.set_cell_alignment(CellAlignment::Right);
        }
    }
    table
}

fn add_series_row<T>(table: &mut Table, column: &str, metric: &str, series: &FlaggedSeries<T>) {
    let summary = series.summary();
    table.add_row(vec![
        Cell::new(column),
        Cell::new(metric),
        Cell::new(series.len()),
        Cell::new(series.outliers().flagged()),
        Cell::new(format_number(summary.mean)),
        Cell::new(format_number(summary.std)),
        Cell::new(format_number(summary.min)),
        Cell::new(format_number(summary.max)),
    ]);
}

fn format_number(value: Option<f64>) -> String {
    match value {
        Some(v) => format!("{v:.4}"),
        None => "-".to_string(),
    }
}
