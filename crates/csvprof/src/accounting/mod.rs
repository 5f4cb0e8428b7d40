//! Per-row error flags and the limits deciding which errors get written.
//!
//! Field tests raise flags by category while a row is processed. After the
//! row, the flags are collected into [`RowFlags`]; each flagged column's
//! category bits then pass through that column's [`ErrorGate`], and the
//! run-wide [`EmissionLimit`] caps how many records produce output at all.

mod writer;

use std::collections::BTreeSet;
use std::fmt;

use serde::Serialize;

use crate::config::CategoryLimits;

pub use writer::{ErrorArtifacts, ErrorCsvWriter, ErrorLogWriter, LogEntry, ERROR_COLUMNS_HEADER};

/// Error category raised by a field test.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    Test,
    Blank,
    Length,
    MaxLength,
}

impl ErrorKind {
    fn bit(self) -> u8 {
        match self {
            ErrorKind::Test => ErrorBits::TEST.0,
            ErrorKind::Blank => ErrorBits::BLANK.0,
            ErrorKind::Length => ErrorBits::LENGTH.0,
            ErrorKind::MaxLength => ErrorBits::MAX_LENGTH.0,
        }
    }
}

/// Category bits for one column in one row.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize)]
pub struct ErrorBits(u8);

impl ErrorBits {
    pub const NONE: ErrorBits = ErrorBits(0);
    pub const TEST: ErrorBits = ErrorBits(1);
    pub const BLANK: ErrorBits = ErrorBits(2);
    pub const LENGTH: ErrorBits = ErrorBits(4);
    pub const MAX_LENGTH: ErrorBits = ErrorBits(8);

    const LABELS: [(ErrorBits, &'static str); 4] = [
        (ErrorBits::TEST, "col"),
        (ErrorBits::BLANK, "blk"),
        (ErrorBits::LENGTH, "len"),
        (ErrorBits::MAX_LENGTH, "max"),
    ];

    pub fn bits(self) -> u8 {
        self.0
    }

    pub fn is_empty(self) -> bool {
        self.0 == 0
    }

    pub fn contains(self, other: ErrorBits) -> bool {
        self.0 & other.0 == other.0
    }

    pub fn insert(&mut self, other: ErrorBits) {
        self.0 |= other.0;
    }

    pub fn remove(&mut self, other: ErrorBits) {
        self.0 &= !other.0;
    }

    /// Space-separated category labels, e.g. `col len`.
    pub fn description(self) -> String {
        Self::LABELS
            .iter()
            .filter(|(bit, _)| self.contains(*bit))
            .map(|(_, label)| *label)
            .collect::<Vec<_>>()
            .join(" ")
    }
}

impl fmt::Display for ErrorBits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.description())
    }
}

/// Columns flagged per category while a row is processed.
#[derive(Debug, Clone, Default)]
pub struct FlagSets {
    test: BTreeSet<usize>,
    blank: BTreeSet<usize>,
    length: BTreeSet<usize>,
    max_length: BTreeSet<usize>,
}

impl FlagSets {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn raise(&mut self, kind: ErrorKind, column: usize) {
        self.set_mut(kind).insert(column);
    }

    fn set_mut(&mut self, kind: ErrorKind) -> &mut BTreeSet<usize> {
        match kind {
            ErrorKind::Test => &mut self.test,
            ErrorKind::Blank => &mut self.blank,
            ErrorKind::Length => &mut self.length,
            ErrorKind::MaxLength => &mut self.max_length,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.test.is_empty()
            && self.blank.is_empty()
            && self.length.is_empty()
            && self.max_length.is_empty()
    }

    /// Take this row's flags, leaving every set empty.
    pub fn collect_and_clear(&mut self) -> RowFlags {
        RowFlags(std::mem::take(self))
    }
}

/// One row's collected flags.
#[derive(Debug, Clone, Default)]
pub struct RowFlags(FlagSets);

impl RowFlags {
    /// Ascending union of every flagged column.
    pub fn columns(&self) -> BTreeSet<usize> {
        let sets = &self.0;
        sets.test
            .iter()
            .chain(&sets.blank)
            .chain(&sets.length)
            .chain(&sets.max_length)
            .copied()
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn contains(&self, kind: ErrorKind, column: usize) -> bool {
        let sets = &self.0;
        match kind {
            ErrorKind::Test => sets.test.contains(&column),
            ErrorKind::Blank => sets.blank.contains(&column),
            ErrorKind::Length => sets.length.contains(&column),
            ErrorKind::MaxLength => sets.max_length.contains(&column),
        }
    }

    pub fn bits_for(&self, column: usize) -> ErrorBits {
        let mut bits = ErrorBits::NONE;
        for kind in [ErrorKind::Test, ErrorKind::Blank, ErrorKind::Length, ErrorKind::MaxLength] {
            if self.contains(kind, column) {
                bits.insert(ErrorBits(kind.bit()));
            }
        }
        bits
    }
}

/// Per-column category limits on approved errors.
///
/// Every approval request counts against each category flagged in it;
/// a category is withheld once its count passes the limit. Max-length
/// errors count against the length limit. Categories are independent: an
/// exhausted test limit never withholds blank or length errors.
#[derive(Debug, Clone, Default)]
pub struct ErrorGate {
    limits: CategoryLimits,
    requests: u64,
    test: u64,
    blank: u64,
    length: u64,
}

impl ErrorGate {
    pub fn new(limits: CategoryLimits) -> Self {
        Self {
            limits,
            ..Self::default()
        }
    }

    /// Bits still approved for output after applying the limits.
    pub fn approve(&mut self, bits: ErrorBits) -> ErrorBits {
        self.requests += 1;
        let mut approved = bits;

        if bits.contains(ErrorBits::TEST) {
            self.test += 1;
            if exceeds(self.test, self.limits.test) {
                approved.remove(ErrorBits::TEST);
            }
        }
        if bits.contains(ErrorBits::BLANK) {
            self.blank += 1;
            if exceeds(self.blank, self.limits.blank) {
                approved.remove(ErrorBits::BLANK);
            }
        }
        for bit in [ErrorBits::LENGTH, ErrorBits::MAX_LENGTH] {
            if bits.contains(bit) {
                self.length += 1;
                if exceeds(self.length, self.limits.length) {
                    approved.remove(bit);
                }
            }
        }
        approved
    }

    /// Approval requests seen so far, whatever was approved.
    pub fn requests(&self) -> u64 {
        self.requests
    }
}

fn exceeds(count: u64, limit: Option<u64>) -> bool {
    limit.is_some_and(|limit| count > limit)
}

/// Run-wide cap on records producing error output; `None` is unlimited.
#[derive(Debug, Clone, Copy, Default)]
pub struct EmissionLimit {
    limit: Option<u64>,
    written: u64,
}

impl EmissionLimit {
    pub fn new(limit: Option<u64>) -> Self {
        Self { limit, written: 0 }
    }

    pub fn allows(&self) -> bool {
        self.limit.map_or(true, |limit| self.written < limit)
    }

    pub fn record_written(&mut self) {
        self.written += 1;
    }

    pub fn written(&self) -> u64 {
        self.written
    }
}
