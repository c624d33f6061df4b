//! Powerload - Main Entry Point
//!
//! Trains the load forecasting pipeline, cross-validates it and reports
//! errors on the held-out period.

use clap::Parser;
use powerload::cli::{cmd_run, Cli};

fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "powerload=info".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();
    cmd_run(&cli)
}
