//! CLI entry point for the JSON report generator.

use anyhow::Result;
use clap::Parser;
use json_report::config::DEFAULT_REPORT_DIR;
use json_report::utils::truncate_str;
use json_report::{
    ReportConfig, ReportGenerator, classify_columns, dtype_category_str, load_json_dataset,
    plan_pages,
};
use std::path::PathBuf;
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Statistical PDF reports from JSON datasets",
    long_about = "Generate a multi-page PDF report with distribution, correlation and \
                  category charts for every column of a JSON dataset.\n\n\
                  EXAMPLES:\n  \
                  # Basic usage\n  \
                  json-report data.json\n\n  \
                  # Custom title and output directory\n  \
                  json-report data.json --title \"Sales Overview\" --report-dir out/\n\n  \
                  # Preview the pages without writing a file\n  \
                  json-report data.json --dry-run"
)]
struct Args {
    /// Path to the JSON dataset
    json_path: PathBuf,

    /// Directory the PDF report is written to
    #[arg(long, default_value = DEFAULT_REPORT_DIR)]
    report_dir: PathBuf,

    /// Report title
    ///
    /// If not specified, derived from the dataset file name
    #[arg(long)]
    title: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Only show warnings and errors
    #[arg(short, long)]
    quiet: bool,

    /// Output the report summary as JSON to stdout
    ///
    /// Disables all logs; only the final JSON is printed.
    #[arg(long)]
    json: bool,

    /// Load and classify the dataset, print the page plan, write nothing
    #[arg(long)]
    dry_run: bool,
}

/// Initialize the tracing subscriber for logging.
///
/// When `json_output` is true, logging is completely disabled to ensure
/// only JSON is written to stdout.
fn init_logging(level: &str, quiet: bool, json_output: bool) {
    if json_output {
        return;
    }

    use tracing_subscriber::EnvFilter;

    let effective_level = if quiet { "warn" } else { level };

    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(effective_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = ReportConfig::builder()
        .json_path(&args.json_path)
        .report_dir(&args.report_dir)
        .maybe_title(args.title.clone())
        .build()?;

    if args.dry_run {
        return run_dry_run(&config);
    }

    let outcome = ReportGenerator::generate(&config)?;

    if args.json {
        println!("{}", serde_json::to_string_pretty(&outcome)?);
    } else {
        info!("Wrote {} pages", outcome.pages.len());
        println!("Report generated at: {}", outcome.report_path.display());
    }
    Ok(())
}

/// Show the dataset overview and page plan without writing a report.
///
/// Uses `println!` for user-facing output so it is visible at every log
/// level.
fn run_dry_run(config: &ReportConfig) -> Result<()> {
    let dataset = load_json_dataset(&config.json_path)?;
    let classification = classify_columns(&dataset);

    println!("\n{}", "=".repeat(80));
    println!("DRY RUN - Preview of report pages");
    println!("{}\n", "=".repeat(80));

    println!("DATASET OVERVIEW");
    println!("{}", "-".repeat(40));
    println!("  File: {}", config.json_path.display());
    println!("  Rows: {}", dataset.height());
    println!("  Columns: {}", dataset.width());
    println!("  Title: {}", config.resolved_title());
    println!();

    println!("COLUMNS");
    println!("{}", "-".repeat(40));
    println!("{:<30} {:<10} {:<10} {:<12}", "Column", "Kind", "Dtype", "Role");
    println!("{}", "-".repeat(65));
    for name in dataset.column_names() {
        let kind = dataset
            .column_kind(&name)
            .map(|kind| kind.to_string())
            .unwrap_or_default();
        let dtype = dtype_category_str(dataset.series(&name)?.dtype());
        let role = if classification.numeric.contains(&name) {
            "numeric"
        } else if classification.categorical.contains(&name) {
            "categorical"
        } else {
            "skipped"
        };
        println!(
            "{:<30} {:<10} {:<10} {:<12}",
            truncate_str(&name, 29),
            kind,
            dtype,
            role
        );
    }
    println!();

    println!("PAGE PLAN");
    println!("{}", "-".repeat(40));
    for (index, page) in plan_pages(&classification).iter().enumerate() {
        println!("  {:>2}. {}", index + 1, page);
    }
    println!();
    println!(
        "No report written. Run without --dry-run to write to {}",
        config.report_dir.display()
    );
    Ok(())
}
