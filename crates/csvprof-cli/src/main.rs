//! csvprof CLI - column validation and profiling for delimited files.

mod cli;
mod commands;
mod report;

use clap::Parser;
use cli::{Cli, Commands};
use tracing_subscriber::prelude::*;

/// Exit status for configuration and I/O failures.
const EXIT_ERROR: i32 = 2;

/// Install the global subscriber. Logs go to stderr so reports and JSON on
/// stdout stay clean; `RUST_LOG` overrides the default level.
pub(crate) fn init_logging(verbose: bool) {
    let filter = if verbose { "debug" } else { "info" };
    let _ = tracing_subscriber::registry()
        .with(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| filter.into()))
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr).without_time())
        .try_init();
}

fn main() {
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Run { config, json, report } => commands::run::run(config, json, report, cli.verbose),
        Commands::Check { config } => commands::check::run(config, cli.verbose),
        Commands::Tests { config, json } => commands::tests::run(config, json, cli.verbose),
    };

    match result {
        Ok(code) => std::process::exit(code),
        Err(e) => {
            eprintln!("Error: {}", e);
            std::process::exit(EXIT_ERROR);
        }
    }
}
