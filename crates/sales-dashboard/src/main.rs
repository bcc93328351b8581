//! CLI entry point for the sales dashboard.

use anyhow::{Context, Result, anyhow};
use clap::{ArgAction, Parser, ValueEnum};
use sales_dashboard::{
    Dashboard, DashboardConfig, DashboardError, DashboardView, MetricsBasis, Upload, render_text,
};
use std::io::Read;
use tracing::{debug, error, info};

/// CLI-compatible metrics basis enum
#[derive(Debug, Clone, Copy, ValueEnum)]
enum CliMetricsBasis {
    /// Sum cleaned values before outlier clamping
    Raw,
    /// Sum values after outlier clamping
    Clamped,
}

impl From<CliMetricsBasis> for MetricsBasis {
    fn from(cli: CliMetricsBasis) -> Self {
        match cli {
            CliMetricsBasis::Raw => MetricsBasis::Raw,
            CliMetricsBasis::Clamped => MetricsBasis::Clamped,
        }
    }
}

#[derive(Parser, Debug)]
#[command(
    version,
    about = "Retail Sales Dashboard",
    long_about = "Builds a sales dashboard from a CSV of transactions.\n\n\
                  EXAMPLES:\n  \
                  # Dashboard for a file on disk\n  \
                  sales-dashboard -i superstore.csv\n\n  \
                  # Upload through stdin\n  \
                  cat superstore.csv | sales-dashboard --upload superstore.csv\n\n  \
                  # Machine-readable output\n  \
                  sales-dashboard -i superstore.csv --json | jq .metrics"
)]
struct Args {
    /// Path to the CSV file to load
    #[arg(short, long, conflicts_with = "upload")]
    input: Option<String>,

    /// Read an uploaded CSV from stdin under this file name
    ///
    /// The name is only used for the `.csv` extension check and display.
    #[arg(short, long)]
    upload: Option<String>,

    /// JSON file with dashboard settings
    ///
    /// Command-line flags override values from the file.
    #[arg(short, long)]
    config: Option<String>,

    /// Number of rows in the dataset preview
    #[arg(long)]
    preview_rows: Option<usize>,

    /// IQR multiplier for the outlier fences
    #[arg(long)]
    iqr_multiplier: Option<f64>,

    /// Whether metrics are summed before or after outlier clamping
    #[arg(long, value_enum)]
    metrics_basis: Option<CliMetricsBasis>,

    /// Also clamp the derived numeric columns (true or false)
    #[arg(long, action = ArgAction::Set)]
    clamp_derived_columns: Option<bool>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    log_level: String,

    /// Suppress progress output (only show errors and final result)
    #[arg(short, long)]
    quiet: bool,

    /// Output JSON to stdout instead of the text dashboard
    ///
    /// Disables all progress logs; only outputs the final JSON.
    #[arg(long)]
    json: bool,
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
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> Result<()> {
    let args = Args::parse();

    init_logging(&args.log_level, args.quiet, args.json);

    let config = build_config(&args)?;
    let dashboard = build_dashboard(&args, config)?;

    let result = match (&args.input, &args.upload) {
        (Some(path), _) => dashboard.render_path(path),
        (None, upload_name) => dashboard.render_upload(read_upload(upload_name.as_deref())?),
    };

    match result {
        Ok(view) => print_view(&view, args.json),
        Err(e) if e.is_prompt() => {
            print_prompt(&e, args.json)?;
            Ok(())
        }
        Err(e) => {
            error!("Dashboard failed: {}", e);
            if e.is_recoverable() {
                info!("Check the input file and settings, then run again");
            }
            if args.json {
                println!("{}", serde_json::to_string_pretty(&e)?);
            }
            Err(anyhow!("Dashboard failed [{}]: {}", e.error_code(), e))
        }
    }
}

/// Merge the optional config file with command-line overrides.
fn build_config(args: &Args) -> Result<DashboardConfig> {
    let base = match &args.config {
        Some(path) => {
            let content = std::fs::read_to_string(path)
                .with_context(|| format!("Failed to read config file {}", path))?;
            let config: DashboardConfig = serde_json::from_str(&content)
                .with_context(|| format!("Invalid config file {}", path))?;
            debug!("Loaded config from {}", path);
            config
        }
        None => DashboardConfig::default(),
    };

    let mut builder = DashboardConfig::builder().base(base);

    if let Some(rows) = args.preview_rows {
        builder = builder.preview_rows(rows);
    }
    if let Some(multiplier) = args.iqr_multiplier {
        builder = builder.iqr_multiplier(multiplier);
    }
    if let Some(basis) = args.metrics_basis {
        builder = builder.metrics_basis(basis.into());
    }
    if let Some(clamp) = args.clamp_derived_columns {
        builder = builder.clamp_derived_columns(clamp);
    }

    Ok(builder.build()?)
}

fn build_dashboard(args: &Args, config: DashboardConfig) -> Result<Dashboard> {
    let mut builder = Dashboard::builder().config(config);

    if !args.quiet {
        builder = builder.on_progress(|update| {
            info!(
                "[{:.0}%] {}: {}",
                update.progress * 100.0,
                update.stage.display_name(),
                update.message
            );
        });
    }

    Ok(builder.build()?)
}

/// Read the uploaded payload from stdin. No name means nothing was uploaded.
fn read_upload(name: Option<&str>) -> Result<Option<Upload>> {
    let Some(name) = name else {
        return Ok(None);
    };

    let mut bytes = Vec::new();
    std::io::stdin()
        .read_to_end(&mut bytes)
        .context("Failed to read upload from stdin")?;
    debug!("Read {} bytes from stdin", bytes.len());

    Ok(Some(Upload::new(name, bytes)))
}

fn print_view(view: &DashboardView, json: bool) -> Result<()> {
    if json {
        println!("{}", view.to_json()?);
    } else {
        println!("{}", render_text(view));
    }
    Ok(())
}

/// Show the upload prompt. This is a halt, not a failure.
fn print_prompt(e: &DashboardError, json: bool) -> Result<()> {
    if json {
        println!("{}", serde_json::to_string_pretty(e)?);
    } else {
        eprintln!("{}", e);
    }
    Ok(())
}
