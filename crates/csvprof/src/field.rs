//! Per-column test controller.
//!
//! A [`FieldTest`] applies one column's configuration to each raw value:
//! length checks, stripping, profiling, then the column's predicate or its
//! cross-check group. Counters and flags live in the run's [`Tally`] so a
//! cross-check decision can update every member column at once.

use std::sync::Arc;

use serde::Serialize;

use crate::accounting::ErrorKind;
use crate::config::{ColumnConfig, ProfileMode};
use crate::context::Tally;
use crate::predicate::Predicate;
use crate::profile::{OccurrenceProfile, Profile};
use crate::xcheck::XcheckOutcome;

/// What happened to one value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum FieldOutcome {
    Passed,
    Failed,
    Blank,
    /// Cross-check member waiting for a higher column.
    Pending,
}

/// Per-column counters.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FieldStats {
    pub passed: u64,
    pub failed: u64,
    pub blank: u64,
    pub length_errors: u64,
    pub max_length_errors: u64,
    pub blank_errors: u64,
}

/// Run-wide counters across every column.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct GrandTotals {
    pub total_fields: u64,
    pub test_errors: u64,
    pub blank_errors: u64,
    pub length_errors: u64,
    pub max_length_errors: u64,
}

impl GrandTotals {
    /// Errors that make a run unsuccessful. Max-length errors are reported
    /// but do not count.
    pub fn failing_errors(&self) -> u64 {
        self.test_errors + self.blank_errors + self.length_errors
    }
}

/// The column's predicate: a registered test or a cross-check group index.
#[derive(Debug, Clone)]
pub enum FieldPredicate {
    Test(Arc<Predicate>),
    Xcheck(usize),
}

#[derive(Debug, Clone)]
pub struct FieldTest {
    config: ColumnConfig,
    predicate: FieldPredicate,
    profile: Option<Profile>,
    /// Values that missed a profiled lookup.
    lookup_misses: Option<OccurrenceProfile>,
    current: String,
}

impl FieldTest {
    pub fn new(config: ColumnConfig, predicate: FieldPredicate) -> Self {
        let is_lookup = matches!(&predicate, FieldPredicate::Test(p) if p.is_lookup());
        let lookup_misses = (is_lookup && config.profile == ProfileMode::Occurrence)
            .then(OccurrenceProfile::new);
        Self {
            profile: Profile::for_mode(config.profile),
            lookup_misses,
            config,
            predicate,
            current: String::new(),
        }
    }

    pub fn config(&self) -> &ColumnConfig {
        &self.config
    }

    pub fn number(&self) -> usize {
        self.config.number
    }

    pub fn header(&self) -> &str {
        &self.config.header
    }

    pub fn test_name(&self) -> &str {
        &self.config.test.identifier
    }

    pub fn predicate(&self) -> &FieldPredicate {
        &self.predicate
    }

    pub fn profile(&self) -> Option<&Profile> {
        self.profile.as_ref()
    }

    pub fn lookup_misses(&self) -> Option<&OccurrenceProfile> {
        self.lookup_misses.as_ref()
    }

    /// The raw value most recently tested.
    pub fn current_value(&self) -> &str {
        &self.current
    }

    fn is_lookup(&self) -> bool {
        matches!(&self.predicate, FieldPredicate::Test(p) if p.is_lookup())
    }

    /// Test one raw value from record `record`.
    pub fn test(&mut self, raw: &str, record: u64, tally: &mut Tally) -> FieldOutcome {
        let column = self.config.number;
        self.current.clear();
        self.current.push_str(raw);
        tally.totals.total_fields += 1;

        let mut max_exceeded = false;
        if self.config.max_length > 0 && raw.chars().count() > self.config.max_length {
            tally.raise(ErrorKind::MaxLength, column);
            max_exceeded = true;
        }

        let value = if self.config.strip { raw.trim() } else { raw };

        // Lookup occurrence profiles count hits only, after the test.
        let deferred = self.config.profile == ProfileMode::Occurrence && self.is_lookup();
        if let Some(profile) = &mut self.profile {
            if !value.is_empty() && !deferred {
                profile.record(value, record);
            }
        }

        let predicate = match &self.predicate {
            FieldPredicate::Xcheck(group) => {
                let group = *group;
                return match tally.supply_xcheck(group, column, value) {
                    _ if max_exceeded => FieldOutcome::Failed,
                    XcheckOutcome::Pending => FieldOutcome::Pending,
                    XcheckOutcome::Decided(true) => FieldOutcome::Passed,
                    XcheckOutcome::Decided(false) => FieldOutcome::Failed,
                };
            }
            FieldPredicate::Test(predicate) => Arc::clone(predicate),
        };

        if value.is_empty() {
            tally.stats_mut(column).blank += 1;
            if self.config.blank_is_error {
                tally.raise(ErrorKind::Blank, column);
            }
            return FieldOutcome::Blank;
        }

        if predicate.is_lookup() {
            return if predicate.test(value) {
                tally.stats_mut(column).passed += 1;
                if let Some(Profile::Occurrence(profile)) = &mut self.profile {
                    profile.record(value);
                }
                FieldOutcome::Passed
            } else {
                tally.stats_mut(column).failed += 1;
                tally.raise(ErrorKind::Test, column);
                if let Some(misses) = &mut self.lookup_misses {
                    misses.record(value);
                }
                FieldOutcome::Failed
            };
        }

        let mut length_failed = false;
        if self.config.length > 0 && value.chars().count() != self.config.length {
            tally.raise(ErrorKind::Length, column);
            length_failed = true;
        }

        let matched = predicate.test(value);
        if matched && !length_failed && !max_exceeded {
            tally.stats_mut(column).passed += 1;
            FieldOutcome::Passed
        } else {
            tally.stats_mut(column).failed += 1;
            if !matched {
                tally.raise(ErrorKind::Test, column);
            }
            FieldOutcome::Failed
        }
    }
}
