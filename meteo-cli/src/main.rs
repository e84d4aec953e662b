//! Binary crate for the `meteo` weather dashboard.
//!
//! This crate focuses on:
//! - Parsing CLI arguments
//! - Interactive browsing and configuration
//! - Rendering the dashboard in the terminal

use clap::Parser;
use tracing_subscriber::EnvFilter;

mod cli;
mod dashboard;
mod prompt;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cmd = cli::Cli::parse();
    init_tracing(cmd.verbose);
    cmd.run().await
}

fn init_tracing(verbose: bool) {
    let default_level = if verbose { "debug" } else { "warn" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .init();
}
