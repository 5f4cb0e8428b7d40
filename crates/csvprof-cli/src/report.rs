//! Plain-text report rendered from a run snapshot.

use chrono::Local;
use csvprof::profile::{OccurrenceReport, ProfileReport};
use csvprof::snapshot::ColumnSnapshot;
use csvprof::xcheck::XcheckReport;
use csvprof::{RunConfig, RunSnapshot};

/// Right-aligned label width used for every `label = value` line.
const LABEL_WIDTH: usize = 25;

#[derive(Default)]
struct Report {
    out: String,
}

impl Report {
    fn line(&mut self, text: impl AsRef<str>) {
        self.out.push_str(text.as_ref());
        self.out.push('\n');
    }

    fn blank(&mut self) {
        self.out.push('\n');
    }

    fn stat(&mut self, label: &str, value: impl AsRef<str>) {
        self.line(format!("{label:>LABEL_WIDTH$} = {}", value.as_ref()));
    }
}

/// Thousands-separated integer.
pub fn group(n: u64) -> String {
    let digits = n.to_string();
    let mut out = String::with_capacity(digits.len() + digits.len() / 3);
    for (i, c) in digits.chars().enumerate() {
        if i > 0 && (digits.len() - i) % 3 == 0 {
            out.push(',');
        }
        out.push(c);
    }
    out
}

pub fn render(config: &RunConfig, snapshot: &RunSnapshot) -> String {
    let mut r = Report::default();

    let finished = snapshot.finished_at.with_timezone(&Local);
    r.line(format!("csvprof report - {}", finished.format("%Y-%m-%d %H:%M:%S")));
    r.blank();
    r.line(format!("   csv_file: {}", config.files.csv_file.display()));
    r.line(format!(" param_file: {}", config.files.param_file.display()));
    if let Some(input) = &snapshot.input {
        r.line(format!("     sha256: {}", input.hash.trim_start_matches("sha256:")));
        r.line(format!("       size: {} bytes ({})", group(input.size_bytes), input.encoding));
    }
    if let Some(path) = &snapshot.artifacts.error_csv {
        r.line(format!("  error_csv: {}", path.display()));
    }
    if let Some(path) = &snapshot.artifacts.error_log {
        r.line(format!("  error_log: {}", path.display()));
    }
    if !config.user.is_empty() {
        r.blank();
        r.line("user defined items:");
        for (name, item) in config.user.iter() {
            r.line(format!("  {name}: {item}"));
        }
    }

    r.blank();
    r.line("******************** csvprof column report *******************");
    r.blank();
    let totals = &snapshot.totals;
    r.stat("Total Fields", group(totals.total_fields));
    r.stat("Total Test Errors", group(totals.test_errors));
    r.stat("Total Blank Errors", group(totals.blank_errors));
    r.stat("Total Length Errors", group(totals.length_errors));
    r.stat("Total Max Length Errors", group(totals.max_length_errors));

    for column in &snapshot.columns {
        render_column(&mut r, column);
    }
    for xcheck in &snapshot.xchecks {
        render_xcheck(&mut r, xcheck);
    }

    let records = &snapshot.records;
    r.blank();
    r.stat("Total Records Read", group(records.read));
    r.stat("Bad Records", group(records.bad));
    r.stat("Records In Error", group(records.in_error));
    r.stat("Errors Written", group(records.errors_written));
    r.stat("CSV Records Written", group(records.csv_written));
    r.stat("Log Records Written", group(records.log_written));
    r.blank();
    r.stat("Processing Time", format!("{:.3} s", snapshot.elapsed_ms as f64 / 1000.0));
    r.stat("Per Record", format!("{:.4} ms", snapshot.ms_per_record()));

    r.out
}

fn render_column(r: &mut Report, column: &ColumnSnapshot) {
    r.blank();
    r.line(format!("({}) {} -> {}", column.number, column.header, column.test));
    let stats = &column.stats;
    r.stat("Passed", group(stats.passed));
    r.stat("Failed", group(stats.failed));
    r.stat("Blank", group(stats.blank));
    if column.length > 0 {
        r.stat("Length Errors", group(stats.length_errors));
    }
    if column.max_length > 0 {
        r.stat("Max Length Errors", group(stats.max_length_errors));
    }
    if column.blank_is_error {
        r.stat("Blank Errors", group(stats.blank_errors));
    }

    match &column.profile {
        Some(ProfileReport::Occurrence(report)) => {
            r.blank();
            r.line("  *** Column Profile ***");
            render_occurrence(r, report);
        }
        Some(ProfileReport::Unique(report)) => {
            r.blank();
            r.line("  *** Unique Profile Results ***");
            if report.duplicates.is_empty() {
                r.line("      No duplicates found");
            } else {
                r.line("  ***    Duplicates Found    ***");
                r.line(format!("{:>LABEL_WIDTH$} : record sequence numbers", "value"));
                for entry in &report.duplicates {
                    let records: Vec<String> = entry.records().map(|n| n.to_string()).collect();
                    r.line(format!("{:>LABEL_WIDTH$} : {}", entry.value, records.join(", ")));
                }
                r.blank();
            }
            r.stat("(total field values)", group(report.total_values as u64));
            r.stat("(duplicated values)", group(report.duplicated_values as u64));
            r.stat("(total duplicates)", group(report.total_duplicates as u64));
        }
        Some(ProfileReport::Statistical(report)) => {
            r.blank();
            r.line("  *** Statistical Profile ***");
            for (name, value) in report.summary.fields() {
                if name == "count" {
                    r.stat(name, group(report.summary.count as u64));
                } else {
                    r.stat(name, format!("{value:.6}"));
                }
            }
            r.line("  discarded values : record sequence numbers");
            for discard in &report.discards {
                let records: Vec<String> = discard.records.iter().map(u64::to_string).collect();
                r.line(format!("{:>LABEL_WIDTH$} : {}", discard.value, records.join(", ")));
            }
        }
        None => {}
    }

    if let Some(misses) = &column.lookup_failures {
        r.blank();
        r.line(" *** Lookup Failures ***");
        render_occurrence(r, misses);
    }
}

fn render_occurrence(r: &mut Report, report: &OccurrenceReport) {
    for entry in &report.values {
        r.stat(&entry.value, group(entry.count));
    }
    r.stat("(unique values)", group(report.distinct_values as u64));
}

fn render_xcheck(r: &mut Report, xcheck: &XcheckReport) {
    r.blank();
    let columns: Vec<String> = xcheck.columns.iter().map(usize::to_string).collect();
    r.line(format!("{} ({}):", xcheck.name, columns.join(", ")));
    r.stat("Matched", group(xcheck.matched));
    r.stat("Unmatched", group(xcheck.unmatched));
    for row in &xcheck.rows {
        r.line(format!("Row #{}:", row.row));
        for member in &row.members {
            r.line(format!("\t({}) -> {}", member.column, member.test));
            r.stat("Passed", group(member.passed));
            r.stat("Failed", group(member.failed));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_group() {
        assert_eq!(group(0), "0");
        assert_eq!(group(999), "999");
        assert_eq!(group(1000), "1,000");
        assert_eq!(group(1234567), "1,234,567");
    }

    #[test]
    fn test_stat_alignment() {
        let mut r = Report::default();
        r.stat("Passed", "3");
        assert_eq!(r.out, format!("{}Passed = 3\n", " ".repeat(19)));
    }

    #[test]
    fn test_render_run() {
        let dir = tempfile::TempDir::new().unwrap();
        std::fs::write(
            dir.path().join("params.csv"),
            "csvp_options,id,amount\n\
             Column Test,int,float\n\
             Column Length,,\n\
             Max Length,,\n\
             Profile (y/n/p/u/s),u,s\n\
             Blank is Error (y/n),y,\n\
             Strip Surrounding Spaces (y/n),,\n\
             Error Output Limit,,\n\
             Error Output Limit - Length Errors,,\n\
             Error Output Limit - Blank Errors,,\n\
             User Data,,\n",
        )
        .unwrap();
        std::fs::write(dir.path().join("data.csv"), "id,amount\n1,2.5\n1,x\n,4\n").unwrap();
        let config = RunConfig::from_toml(
            "[files]\ncsv_file = \"data.csv\"\nparam_file = \"params.csv\"\n",
            dir.path(),
        )
        .unwrap();
        let snapshot = csvprof::Profiler::new(config.clone()).run().unwrap();

        let text = render(&config, &snapshot);
        assert!(text.contains("(1) id -> int"));
        assert!(text.contains("*** Unique Profile Results ***"));
        assert!(text.contains("*** Statistical Profile ***"));
        assert!(text.contains(&format!("{:>LABEL_WIDTH$} = 1", "Blank Errors")));
        assert!(text.contains(&format!("{:>LABEL_WIDTH$} : 1, 2", "1")));
        assert!(text.contains(&format!("{:>LABEL_WIDTH$} = 3", "Total Records Read")));
    }
}
