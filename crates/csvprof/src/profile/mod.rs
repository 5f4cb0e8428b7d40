//! Per-column data collection, selected by the column's profile mode.

mod occurrence;
mod statistical;
mod unique;

use serde::Serialize;

use crate::config::ProfileMode;

pub use occurrence::{OccurrenceProfile, OccurrenceReport, ValueCount};
pub use statistical::{Discard, StatisticalProfile, StatisticalReport, Summary, INF_BUCKET, NAN_BUCKET};
pub use unique::{DuplicateEntry, UniqueProfile, UniqueReport};

/// A column's collector.
#[derive(Debug, Clone)]
pub enum Profile {
    Occurrence(OccurrenceProfile),
    Unique(UniqueProfile),
    Statistical(StatisticalProfile),
}

impl Profile {
    /// `None` when the mode collects nothing.
    pub fn for_mode(mode: ProfileMode) -> Option<Self> {
        match mode {
            ProfileMode::None => None,
            ProfileMode::Occurrence => Some(Profile::Occurrence(OccurrenceProfile::new())),
            ProfileMode::Unique => Some(Profile::Unique(UniqueProfile::new())),
            ProfileMode::Statistical => Some(Profile::Statistical(StatisticalProfile::new())),
        }
    }

    pub fn mode(&self) -> ProfileMode {
        match self {
            Profile::Occurrence(_) => ProfileMode::Occurrence,
            Profile::Unique(_) => ProfileMode::Unique,
            Profile::Statistical(_) => ProfileMode::Statistical,
        }
    }

    pub fn record(&mut self, value: &str, record: u64) {
        match self {
            Profile::Occurrence(p) => p.record(value),
            Profile::Unique(p) => p.record(value, record),
            Profile::Statistical(p) => p.record(value, record),
        }
    }

    pub fn report(&self) -> ProfileReport {
        match self {
            Profile::Occurrence(p) => ProfileReport::Occurrence(p.report()),
            Profile::Unique(p) => ProfileReport::Unique(p.report()),
            Profile::Statistical(p) => ProfileReport::Statistical(p.report()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "mode", rename_all = "snake_case")]
pub enum ProfileReport {
    Occurrence(OccurrenceReport),
    Unique(UniqueReport),
    Statistical(StatisticalReport),
}
