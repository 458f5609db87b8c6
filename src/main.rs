use clap::Parser;
use cnpj_lookup::cli::{args::Args, commands};
use std::process;
use tokio_util::sync::CancellationToken;

/// Exit code for a run stopped by CTRL+C
const EXIT_INTERRUPTED: i32 = 130;

fn main() {
    // Parse command line arguments
    let args = Args::parse();

    let runtime = tokio::runtime::Runtime::new().unwrap_or_else(|e| {
        eprintln!("Failed to create async runtime: {}", e);
        process::exit(1);
    });

    let result = runtime.block_on(async {
        let cancellation_token = CancellationToken::new();

        // Cancel on CTRL+C; the batch still writes its report
        let signal_token = cancellation_token.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                eprintln!("\nReceived CTRL+C, finishing with partial results...");
                signal_token.cancel();
            }
        });

        commands::run(args, cancellation_token).await
    });

    match result {
        Ok(report) if report.stats.interrupted => process::exit(EXIT_INTERRUPTED),
        Ok(_) => process::exit(0),
        Err(cnpj_lookup::LookupError::Interrupted { reason }) => {
            eprintln!("Interrupted: {}", reason);
            process::exit(EXIT_INTERRUPTED);
        }
        Err(error) => {
            eprintln!("Error: {:#}", error);
            process::exit(1);
        }
    }
}
