//! Opsmetrics - job-search metrics tracker
//!
//! A CLI tool that reads a job-application tracker, computes counts and
//! conversion rates, keeps a timestamped history of those metrics and
//! renders a report showing the change since the previous run.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Any error (bad records, corrupt history, I/O failure, ...)

mod analysis;
mod cli;
mod config;
mod error;
mod history;
mod loader;
mod models;
mod pipeline;
mod report;

use anyhow::{Context, Result};
use cli::{Args, OutputFormat};
use config::{Config, CONFIG_FILE_NAME};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    init_logging(&args);

    info!("Opsmetrics v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    if let Err(e) = run(args) {
        error!("Run failed: {:#}", e);
        eprintln!("\n❌ Error: {:#}", e);
        std::process::exit(1);
    }

    Ok(())
}

/// Handle --init-config: generate a default .opsmetrics.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(CONFIG_FILE_NAME);

    if path.exists() {
        eprintln!(
            "⚠️  {} already exists. Remove it first or edit it manually.",
            CONFIG_FILE_NAME
        );
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content)
        .with_context(|| format!("Failed to write {}", CONFIG_FILE_NAME))?;

    println!("✅ Created {} with default settings.", CONFIG_FILE_NAME);
    println!("   Edit it to set data file locations and report options.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete update-and-report workflow.
fn run(args: Args) -> Result<()> {
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    if args.check {
        return handle_check(&config, args.quiet);
    }

    let outcome = pipeline::run(&config, !args.no_record)?;
    let dashboard = &outcome.dashboard;

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(dashboard)?,
        OutputFormat::Markdown => report::generate_markdown_report(dashboard, &config.report),
    };
    report::write_report(&config.report.output, &output)?;

    if args.quiet {
        return Ok(());
    }

    let metrics = &dashboard.metrics;
    println!("\n📊 Metrics Summary:");
    println!(
        "   Applications: {} | Interviews: {} | Offers: {}",
        metrics.total_applications, metrics.interviews, metrics.offers
    );
    println!(
        "   Interview rate: {:.1}% | Offer rate: {:.1}% | Offer/Interview: {:.1}%",
        metrics.interview_rate, metrics.offer_rate, metrics.offer_to_interview_rate
    );
    println!("   Hours saved: {:.1}", metrics.hours_saved);

    if let Some(delta) = dashboard.deltas.get("total_applications") {
        println!("   Since last run: {:+} applications", delta);
    }

    match outcome.recorded_at {
        Some(ref timestamp) => println!(
            "\n🕒 Appended metrics snapshot at {} to {}",
            timestamp,
            config.data.history.display()
        ),
        None => println!("\n🕒 Snapshot not recorded (--no-record)"),
    }

    println!("✅ Report saved to: {}", config.report.output.display());

    Ok(())
}

/// Handle --check: validate the applications file and exit.
fn handle_check(config: &Config, quiet: bool) -> Result<()> {
    let records = loader::load_applications(&config.data.applications)?;

    if !quiet {
        println!(
            "✅ {} is valid: {} applications.",
            config.data.applications.display(),
            records.len()
        );
    }
    Ok(())
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from {}", CONFIG_FILE_NAME);
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {:#}", e);
            Ok(Config::default())
        }
    }
}
