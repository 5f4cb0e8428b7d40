//! CLI command implementations.

pub mod check;
pub mod run;

use colored::Colorize;
use csvprof::{RunConfig, RunContext};

/// Print the registry and the configured columns.
pub(crate) fn dump_context(config: &RunConfig, context: &RunContext) {
    println!("{}", "Registered tests:".yellow().bold());
    for (name, predicate) in context.registry().iter() {
        println!("  {:<20} {}", name, predicate);
    }
    if !config.user.is_empty() {
        println!();
        println!("{}", "User defined items:".yellow().bold());
        for (name, item) in config.user.iter() {
            println!("  {}: {}", name, item);
        }
    }
    println!();
    println!("{}", "Columns:".yellow().bold());
    for field in context.fields() {
        let c = field.config();
        println!(
            "  ({}) {} -> {}  length={} max={} profile={:?} blank_is_error={} strip={}",
            c.number, c.header, c.test, c.length, c.max_length, c.profile, c.blank_is_error, c.strip
        );
        if !c.user_data.is_empty() {
            println!("      user data: {}", c.user_data.join(", "));
        }
    }
    println!();
}
