//! CLI entry point for the CSV analysis pipeline.
//!
//! Prints exactly one JSON document on stdout: the analysis result, or
//! `{"error": ...}`. Logs go to stderr.

use anyhow::{Context, Result, bail};
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use clap::Parser;
use lex_insight::{
    AnalysisConfig, AnalysisPipeline, AnalysisResult, CleaningOptions, FilterOptions,
};
use serde::de::DeserializeOwned;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use tracing::{debug, error, info};

/// Error printed when no input path is given.
const NO_PATH_MESSAGE: &str = "No CSV file path provided";

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Analyse a CSV file: statistics, outliers, plots and a PDF report",
    long_about = "Analyse a CSV file and print the result as JSON.\n\n\
                  EXAMPLES:\n  \
                  # Plain analysis\n  \
                  lex-insight data.csv\n\n  \
                  # Clean and filter with JSON options\n  \
                  lex-insight data.csv --cleaning '{\"removeDuplicates\":true}' \
                  --filters '{\"location\":\"york\"}'\n\n  \
                  # Same with flags, keeping the PDF\n  \
                  lex-insight data.csv --remove-duplicates --location york --report-out report.pdf"
)]
struct Args {
    /// Path to the `.csv` or headerless `.data` file to analyse
    file: Option<PathBuf>,

    /// Cleaning options as a JSON object
    /// (`removeDuplicates`, `handleMissing`, `standardizeFormats`)
    #[arg(long)]
    cleaning: Option<String>,

    /// Filter options as a JSON object (`date`, `location`)
    #[arg(long)]
    filters: Option<String>,

    /// Drop rows that repeat an earlier row
    #[arg(long)]
    remove_duplicates: bool,

    /// Forward-fill missing cells
    #[arg(long)]
    handle_missing: bool,

    /// Normalise `date` to ISO 8601 and `zip` to 5 digits
    #[arg(long)]
    standardize_formats: bool,

    /// Keep rows whose `date` equals this text
    #[arg(long)]
    date: Option<String>,

    /// Keep rows whose `location` contains this text (case-insensitive)
    #[arg(long)]
    location: Option<String>,

    /// Number of histogram bins
    #[arg(long, default_value_t = lex_insight::config::DEFAULT_HISTOGRAM_BINS)]
    bins: usize,

    /// Also write the PDF report to this path
    #[arg(long)]
    report_out: Option<PathBuf>,

    /// Pretty-print the JSON result
    #[arg(long)]
    pretty: bool,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only log warnings and errors
    #[arg(short, long)]
    quiet: bool,
}

fn init_logging(level: &str, quiet: bool) {
    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    // stdout carries only the JSON result
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Parse an optional JSON options object, ignoring unknown keys.
fn parse_options<T>(raw: Option<&str>, known: &[&str], what: &str) -> Result<T>
where
    T: DeserializeOwned + Default,
{
    let Some(raw) = raw else {
        return Ok(T::default());
    };

    let value: serde_json::Value =
        serde_json::from_str(raw).with_context(|| format!("Invalid {what} options JSON"))?;

    match &value {
        serde_json::Value::Null => return Ok(T::default()),
        serde_json::Value::Object(map) => {
            for key in map.keys().filter(|k| !known.contains(&k.as_str())) {
                debug!("Ignoring unknown {} option '{}'", what, key);
            }
        }
        _ => bail!("Invalid {what} options JSON: expected an object"),
    }

    serde_json::from_value(value).with_context(|| format!("Invalid {what} options"))
}

/// Merge JSON options with the command-line flags.
fn build_config(args: &Args) -> Result<AnalysisConfig> {
    let mut cleaning: CleaningOptions = parse_options(
        args.cleaning.as_deref(),
        &CleaningOptions::KNOWN_KEYS,
        "cleaning",
    )?;
    cleaning.remove_duplicates |= args.remove_duplicates;
    cleaning.handle_missing |= args.handle_missing;
    cleaning.standardize_formats |= args.standardize_formats;

    let mut filters: FilterOptions =
        parse_options(args.filters.as_deref(), &FilterOptions::KNOWN_KEYS, "filter")?;
    if args.date.is_some() {
        filters.date = args.date.clone();
    }
    if args.location.is_some() {
        filters.location = args.location.clone();
    }

    let config = AnalysisConfig::builder()
        .cleaning(cleaning)
        .filters(filters)
        .histogram_bins(args.bins)
        .build()?;
    Ok(config)
}

fn emit(result: &AnalysisResult, pretty: bool) {
    let rendered = if pretty {
        serde_json::to_string_pretty(result)
    } else {
        serde_json::to_string(result)
    };
    match rendered {
        Ok(json) => println!("{json}"),
        Err(e) => println!("{}", serde_json::json!({ "error": e.to_string() })),
    }
}

fn write_report(result: &AnalysisResult, path: &Path) -> Result<()> {
    let AnalysisResult::Success(report) = result else {
        return Ok(());
    };
    let pdf = STANDARD
        .decode(&report.pdf_report)
        .context("Failed to decode PDF report")?;
    std::fs::write(path, &pdf)
        .with_context(|| format!("Failed to write report to {}", path.display()))?;
    info!("Wrote {} byte report to {}", pdf.len(), path.display());
    Ok(())
}

fn run(args: &Args, file: &Path) -> Result<AnalysisResult> {
    let config = build_config(args)?;
    let pipeline = AnalysisPipeline::builder().config(config).build()?;
    Ok(pipeline.analyze(file))
}

fn main() -> ExitCode {
    let args = Args::parse();
    init_logging(&args.log_level, args.quiet);

    let Some(file) = args.file.clone() else {
        emit(&AnalysisResult::Failure { error: NO_PATH_MESSAGE.to_string() }, args.pretty);
        return ExitCode::FAILURE;
    };

    let result = match run(&args, &file) {
        Ok(result) => result,
        Err(e) => {
            error!("{:#}", e);
            emit(&AnalysisResult::Failure { error: format!("{:#}", e) }, args.pretty);
            return ExitCode::FAILURE;
        }
    };

    emit(&result, args.pretty);

    if let Some(path) = &args.report_out {
        if let Err(e) = write_report(&result, path) {
            error!("{:#}", e);
            return ExitCode::FAILURE;
        }
    }

    ExitCode::SUCCESS
}
