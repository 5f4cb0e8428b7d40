//! Check command - validate configuration without reading data.

use std::path::PathBuf;

use colored::Colorize;
use csvprof::{Profiler, RunConfig};

pub fn run(config_path: PathBuf, verbose: bool) -> Result<i32, Box<dyn std::error::Error>> {
    let config = RunConfig::load(&config_path)?;
    let verbose = verbose || config.output.verbose;
    crate::init_logging(verbose);

    let profiler = Profiler::new(config);
    let context = profiler.prepare()?;
    if verbose {
        super::dump_context(profiler.config(), &context);
    }

    let xchecks = context.tally().groups().len();
    println!(
        "{} {} columns, {} cross-check groups, {} tests registered",
        "✓".green().bold(),
        context.columns(),
        xchecks,
        context.registry().len()
    );
    if !profiler.config().files.csv_file.exists() {
        println!(
            "{} input file {} does not exist yet",
            "!".yellow().bold(),
            profiler.config().files.csv_file.display()
        );
    }
    Ok(0)
}
