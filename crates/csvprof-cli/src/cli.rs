//! CLI argument definitions using clap.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// csvprof: column validation and profiling for delimited files
#[derive(Parser)]
#[command(name = "csvprof")]
#[command(version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Test and profile the input file named in a run configuration
    Run {
        /// Path to the run configuration (TOML)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,

        /// Print the statistics snapshot as JSON instead of the text report
        #[arg(long)]
        json: bool,

        /// Write the report here instead of the configured report_file
        #[arg(short, long)]
        report: Option<PathBuf>,
    },

    /// Validate a run configuration and its parameter grid without reading data
    Check {
        /// Path to the run configuration (TOML)
        #[arg(value_name = "CONFIG")]
        config: PathBuf,
    },

    /// List registered tests
    Tests {
        /// Also resolve the tests a run configuration defines
        #[arg(short, long)]
        config: Option<PathBuf>,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}
