//! Command implementation for the CNPJ lookup CLI
//!
//! Sets up logging, builds the HTTP transport, runs the batch and prints the
//! summary.

use crate::cli::args::Args;
use crate::error::Result;
use crate::models::{BatchReport, ProcessingStats};
use crate::processor::run_lookup;
use crate::registry::HttpTransport;
use colored::*;
use indicatif::HumanDuration;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info};

/// Run a full lookup from parsed arguments
pub async fn run(args: Args, cancel: CancellationToken) -> Result<BatchReport> {
    setup_logging(&args);

    info!("Starting CNPJ lookup");
    debug!("Command line arguments: {:?}", args);

    // run_lookup validates the config before any I/O
    let config = args.to_config();
    let transport = HttpTransport::new(&config.api_url, config.timeout)?;
    let report = run_lookup(&config, Arc::new(transport), &cancel).await?;

    if !args.quiet {
        print_summary(&report.stats);
    }

    Ok(report)
}

/// Set up structured logging based on CLI arguments
fn setup_logging(args: &Args) {
    use tracing_subscriber::{EnvFilter, fmt, layer::SubscriberExt, util::SubscriberInitExt};

    let log_level = args.get_log_level();

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("cnpj_lookup={}", log_level)));

    let initialized = tracing_subscriber::registry()
        .with(filter)
        .with(
            fmt::layer()
                .with_target(false)
                .with_level(true)
                .with_timer(fmt::time::uptime())
                .with_writer(std::io::stderr)
                .compact(),
        )
        .try_init();

    if initialized.is_ok() {
        debug!("Logging initialized at level: {}", log_level);
    }
}

/// Print the human-readable run summary
pub fn print_summary(stats: &ProcessingStats) {
    let title = if stats.interrupted {
        "CNPJ lookup interrupted".bright_yellow().bold()
    } else {
        "CNPJ lookup complete".bright_green().bold()
    };

    println!("\n{}", title);
    println!(
        "  {} {} ({} blank skipped, {} duplicates removed)",
        "Rows read:".bright_cyan(),
        stats.rows_read,
        stats.blank_rows_skipped,
        stats.duplicates_removed
    );
    println!(
        "  {} {}",
        "Unique identifiers:".bright_cyan(),
        stats.unique_identifiers
    );
    println!(
        "  {} {}",
        "Success:".bright_cyan(),
        stats.succeeded.to_string().bright_green()
    );
    println!("  {} {}", "Invalid:".bright_cyan(), stats.invalid);
    println!("  {} {}", "Not found:".bright_cyan(), stats.not_found);
    println!("  {} {}", "Unavailable:".bright_cyan(), stats.unavailable);

    if stats.incomplete > 0 {
        println!(
            "  {} {}",
            "Incomplete:".bright_cyan(),
            stats.incomplete.to_string().bright_yellow()
        );
    }

    println!(
        "  {} {}",
        "Elapsed:".bright_cyan(),
        HumanDuration(stats.elapsed)
    );

    if let Some(path) = &stats.output_path {
        println!("  {} {}", "Output:".bright_cyan(), path.display());
    }
}
