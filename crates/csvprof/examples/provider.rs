//! Example: bind a lookup provider and run a profile.
//!
//! Usage:
//!   cargo run --example provider -- <config.toml>
//!
//! The configuration may name `lookup_weekday = "import calendar weekday"`
//! in its `[user]` table; any `lookup_even` test is served by a closure.

use std::env;
use std::process;

use csvprof::{LookupProviders, Profiler, RunConfig};

const WEEKDAYS: &[&str] = &["Mon", "Tue", "Wed", "Thu", "Fri", "Sat", "Sun"];

fn main() -> csvprof::Result<()> {
    let args: Vec<String> = env::args().collect();
    if args.len() < 2 {
        eprintln!("Usage: cargo run --example provider -- <config.toml>");
        process::exit(2);
    }

    let config = RunConfig::load(&args[1])?;

    let mut providers = LookupProviders::new();
    providers.register_import("calendar", "weekday", |value: &str| WEEKDAYS.contains(&value));
    providers.register("lookup_even", |value: &str| {
        value.parse::<i64>().is_ok_and(|n| n % 2 == 0)
    });

    let snapshot = Profiler::new(config).with_providers(providers).run()?;

    let separator = "=".repeat(60);
    println!("{separator}");
    println!(
        "{} records read, {} bad, {} in error",
        snapshot.records.read, snapshot.records.bad, snapshot.records.in_error
    );
    println!("{separator}");
    for column in &snapshot.columns {
        println!(
            "({}) {:<20} {:<20} passed {:>8}  failed {:>8}  blank {:>8}",
            column.number,
            column.header,
            column.test,
            column.stats.passed,
            column.stats.failed,
            column.stats.blank
        );
    }

    process::exit(snapshot.exit_code());
}
