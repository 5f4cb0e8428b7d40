//! Inclusive `range(<from>:<to>)` tests over integers, floats and dates.

use std::fmt;

use chrono::NaiveDate;
use once_cell::sync::Lazy;
use regex::Regex;

use super::numeric::{parse_decimal_int, parse_float};
use crate::error::{ProfilerError, Result};

/// Date text formats tried in order; each is anchored at the start only.
static YMD: Lazy<Regex> = Lazy::new(|| Regex::new(r"^([0-9]{4})([0-9]{2})([0-9]{2})").unwrap());
static MDY: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{1,2})[-/]([0-9]{1,2})[-/]([0-9]{4})").unwrap());
static YMD_SEP: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^([0-9]{4})[-/]([0-9]{1,2})[-/]([0-9]{1,2})").unwrap());

/// Bounds of a range test, flavored by the literal's content.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum RangeBounds {
    Int { from: i128, to: i128 },
    Float { from: f64, to: f64 },
    Date { from: NaiveDate, to: NaiveDate },
}

/// A parsed range literal.
#[derive(Debug, Clone, PartialEq)]
pub struct RangeTest {
    literal: String,
    bounds: RangeBounds,
}

impl RangeTest {
    /// Parse a `range(<from>:<to>)` literal.
    ///
    /// A `.` anywhere between the parentheses selects floats, a leading `d`
    /// selects dates written `dYYYYMMDD`, anything else is an integer range.
    pub fn parse(literal: &str) -> Result<Self> {
        let malformed = |message: &str| ProfilerError::Range {
            literal: literal.to_string(),
            message: message.to_string(),
        };

        let (open, close) = match (literal.find('('), literal.find(')')) {
            (Some(open), Some(close)) if close >= open + 4 => (open, close),
            _ => return Err(malformed("expected range(<from>:<to>)")),
        };
        let inner = &literal[open + 1..close];
        let parts: Vec<&str> = inner.split(':').collect();
        let [from, to] = parts.as_slice() else {
            return Err(malformed("expected exactly one ':' separator"));
        };

        let bounds = if inner.contains('.') {
            match (parse_float(from), parse_float(to)) {
                (Some(from), Some(to)) => RangeBounds::Float { from, to },
                _ => return Err(malformed("could not convert bounds to floats")),
            }
        } else if inner.starts_with('d') {
            match (parse_date_bound(from), parse_date_bound(to)) {
                (Some(from), Some(to)) => RangeBounds::Date { from, to },
                _ => return Err(malformed("date bounds must be dYYYYMMDD")),
            }
        } else {
            match (parse_decimal_int(from), parse_decimal_int(to)) {
                (Some(from), Some(to)) => RangeBounds::Int { from, to },
                _ => return Err(malformed("could not convert bounds to integers")),
            }
        };

        Ok(Self {
            literal: literal.to_string(),
            bounds,
        })
    }

    pub fn literal(&self) -> &str {
        &self.literal
    }

    pub fn bounds(&self) -> RangeBounds {
        self.bounds
    }

    /// True when the value converts to the range's flavor and lies within
    /// the bounds, both ends included.
    pub fn test(&self, value: &str) -> bool {
        match self.bounds {
            RangeBounds::Int { from, to } => {
                parse_decimal_int(value).is_some_and(|v| from <= v && v <= to)
            }
            RangeBounds::Float { from, to } => {
                parse_float(value).is_some_and(|v| from <= v && v <= to)
            }
            RangeBounds::Date { from, to } => {
                parse_field_date(value).is_some_and(|v| from <= v && v <= to)
            }
        }
    }
}

impl fmt::Display for RangeTest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.bounds {
            RangeBounds::Int { from, to } => write!(f, "{} -> {from}-{to}", self.literal),
            RangeBounds::Float { from, to } => write!(f, "{} -> {from}-{to}", self.literal),
            RangeBounds::Date { from, to } => write!(f, "{} -> {from}-{to}", self.literal),
        }
    }
}

fn parse_date_bound(bound: &str) -> Option<NaiveDate> {
    let digits = bound.strip_prefix('d')?;
    if digits.len() != 8 || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    ymd(&digits[0..4], &digits[4..6], &digits[6..8])
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}

/// Convert field text to a date. The first format whose prefix matches
/// decides; an impossible calendar date does not fall through.
fn parse_field_date(value: &str) -> Option<NaiveDate> {
    if let Some(c) = YMD.captures(value) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    if let Some(c) = MDY.captures(value) {
        return ymd(&c[3], &c[1], &c[2]);
    }
    if let Some(c) = YMD_SEP.captures(value) {
        return ymd(&c[1], &c[2], &c[3]);
    }
    None
}
