//! shuttum command-line entry point.

mod cli;
mod commands;

use clap::Parser;
use cli::{Cli, Commands};
use eyre::Result;
use tracing::debug;
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Logs go to stderr, stdout is reserved for command output
    tracing_subscriber::fmt()
        .with_env_filter(env_filter(&cli))
        .with_writer(std::io::stderr)
        .init();

    debug!(version = env!("CARGO_PKG_VERSION"), "shuttum starting");

    match &cli.command {
        Commands::Info(args) => commands::run_info(args),
        Commands::Query(args) => commands::run_query(args),
    }
}

fn env_filter(cli: &Cli) -> EnvFilter {
    if cli.quiet {
        return EnvFilter::new("error");
    }

    let default_level = match cli.verbose {
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level))
}
