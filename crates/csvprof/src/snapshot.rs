//! End-of-run statistics snapshot.
//!
//! The snapshot is plain serializable data; rendering it as a text report
//! is left to callers.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::context::RunContext;
use crate::field::{FieldStats, GrandTotals};
use crate::input::InputFingerprint;
use crate::profile::{OccurrenceReport, ProfileReport};
use crate::xcheck::XcheckReport;

/// Record-level counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct RecordTotals {
    pub read: u64,
    /// Rows whose field count did not match the column count.
    pub bad: u64,
    /// Rows with at least one flagged column.
    pub in_error: u64,
    /// Rows for which any error output was written.
    pub errors_written: u64,
    pub csv_written: u64,
    pub log_written: u64,
}

/// Final state of one column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnSnapshot {
    pub number: usize,
    pub header: String,
    pub test: String,
    pub length: usize,
    pub max_length: usize,
    pub blank_is_error: bool,
    pub stats: FieldStats,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub profile: Option<ProfileReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lookup_failures: Option<OccurrenceReport>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ArtifactPaths {
    /// Error CSV, if one was kept.
    pub error_csv: Option<PathBuf>,
    /// Error log, if one was kept.
    pub error_log: Option<PathBuf>,
}

/// Everything a report needs about a finished run.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunSnapshot {
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub elapsed_ms: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub input: Option<InputFingerprint>,
    pub records: RecordTotals,
    pub totals: GrandTotals,
    pub columns: Vec<ColumnSnapshot>,
    pub xchecks: Vec<XcheckReport>,
    pub artifacts: ArtifactPaths,
}

impl RunSnapshot {
    pub(crate) fn capture(
        context: &RunContext,
        records: RecordTotals,
        started_at: DateTime<Utc>,
        elapsed_ms: u64,
        input: Option<InputFingerprint>,
        artifacts: ArtifactPaths,
    ) -> Self {
        let columns = context
            .fields()
            .iter()
            .map(|field| {
                let config = field.config();
                ColumnSnapshot {
                    number: config.number,
                    header: config.header.clone(),
                    test: config.test.identifier.clone(),
                    length: config.length,
                    max_length: config.max_length,
                    blank_is_error: config.blank_is_error,
                    stats: context.tally().stats(config.number).copied().unwrap_or_default(),
                    profile: field.profile().map(|p| p.report()),
                    lookup_failures: field.lookup_misses().map(|m| m.report()),
                }
            })
            .collect();

        Self {
            started_at,
            finished_at: Utc::now(),
            elapsed_ms,
            input,
            records,
            totals: *context.totals(),
            columns,
            xchecks: context.tally().groups().iter().map(|g| g.report()).collect(),
            artifacts,
        }
    }

    /// 1 when any test, blank or length error was recorded, else 0.
    pub fn exit_code(&self) -> i32 {
        if self.totals.failing_errors() > 0 { 1 } else { 0 }
    }

    /// Average processing time per record read.
    pub fn ms_per_record(&self) -> f64 {
        if self.records.read == 0 {
            0.0
        } else {
            self.elapsed_ms as f64 / self.records.read as f64
        }
    }

    pub fn column(&self, number: usize) -> Option<&ColumnSnapshot> {
        number.checked_sub(1).and_then(|i| self.columns.get(i))
    }

    pub fn to_json(&self) -> crate::Result<String> {
        Ok(serde_json::to_string_pretty(self)?)
    }
}
