//! Run command - test and profile an input file.

use std::fs;
use std::path::PathBuf;

use colored::Colorize;
use csvprof::{Profiler, RunConfig};

use crate::report;

pub fn run(
    config_path: PathBuf,
    json_output: bool,
    report_path: Option<PathBuf>,
    verbose: bool,
) -> Result<i32, Box<dyn std::error::Error>> {
    let config = RunConfig::load(&config_path)?;
    let verbose = verbose || config.output.verbose;
    crate::init_logging(verbose);

    let profiler = Profiler::new(config);
    let context = profiler.prepare()?;
    if verbose && !json_output {
        super::dump_context(profiler.config(), &context);
    }

    let snapshot = profiler.run_prepared(context)?;
    let config = profiler.config();

    if json_output {
        println!("{}", snapshot.to_json()?);
        return Ok(snapshot.exit_code());
    }

    let text = report::render(config, &snapshot);
    match report_path.as_ref().or(config.files.report_file.as_ref()) {
        Some(path) => {
            if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| format!("cannot create report directory {}: {}", parent.display(), e))?;
            }
            fs::write(path, &text).map_err(|e| format!("cannot write report {}: {}", path.display(), e))?;
            eprintln!("{} {}", "Report written to".cyan(), path.display().to_string().white());
        }
        None => print!("{}", text),
    }

    let records = &snapshot.records;
    let summary = format!(
        "{} records read, {} bad, {} in error",
        report::group(records.read),
        report::group(records.bad),
        report::group(records.in_error)
    );
    if snapshot.exit_code() == 0 {
        eprintln!("{} {}", "✓".green().bold(), summary);
    } else {
        eprintln!("{} {}", "✗".red().bold(), summary);
    }

    Ok(snapshot.exit_code())
}
