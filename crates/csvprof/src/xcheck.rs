//! Cross-check groups: one test spanning several columns.
//!
//! Each member column carries an ordered list of tests, all lists the same
//! length. Values are buffered as columns arrive; when the highest member
//! column is supplied, test rows are tried in order and the first row whose
//! tests pass for every member decides a match.

use std::sync::Arc;

use serde::Serialize;

use crate::config::{UserItem, UserItems};
use crate::error::{ProfilerError, Result};
use crate::external::ExternalFiles;
use crate::predicate::Predicate;

/// Result of supplying one value to a group.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum XcheckOutcome {
    /// The group is still waiting for a higher member column.
    Pending,
    /// Every member has a value; `true` when some test row matched.
    Decided(bool),
}

#[derive(Debug, Clone)]
struct Member {
    column: usize,
    test_names: Vec<String>,
    tests: Vec<Arc<Predicate>>,
    passed: Vec<u64>,
    failed: Vec<u64>,
    value: String,
}

/// A named multi-column test and its per-row counters.
#[derive(Debug, Clone)]
pub struct XcheckGroup {
    name: String,
    members: Vec<Member>,
    matched: u64,
    unmatched: u64,
}

impl XcheckGroup {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            members: Vec::new(),
            matched: 0,
            unmatched: 0,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// Add a member column with its test list.
    ///
    /// Columns must be added in strictly ascending order and every list
    /// must have the same length as the first.
    pub fn add_member(
        &mut self,
        column: usize,
        test_names: Vec<String>,
        tests: Vec<Arc<Predicate>>,
    ) -> Result<()> {
        debug_assert_eq!(test_names.len(), tests.len());
        if tests.is_empty() {
            return Err(ProfilerError::xcheck(
                &self.name,
                format!("field #{column} has no tests"),
            ));
        }
        if let Some(last) = self.members.last() {
            if column <= last.column {
                return Err(ProfilerError::xcheck(
                    &self.name,
                    format!("field numbers {:?} out of order", self.with_column(column)),
                ));
            }
            if tests.len() != last.tests.len() {
                return Err(ProfilerError::xcheck(
                    &self.name,
                    format!("lists of unequal length, fields #{:?}", self.with_column(column)),
                ));
            }
        }

        tracing::debug!(group = %self.name, column, rows = tests.len(), "xcheck member added");
        let rows = tests.len();
        self.members.push(Member {
            column,
            test_names,
            tests,
            passed: vec![0; rows],
            failed: vec![0; rows],
            value: String::new(),
        });
        Ok(())
    }

    fn with_column(&self, column: usize) -> Vec<usize> {
        let mut columns = self.columns();
        columns.push(column);
        columns
    }

    /// Check the group is complete enough to evaluate.
    pub fn validate(&self) -> Result<()> {
        if self.members.len() < 2 {
            return Err(ProfilerError::xcheck(
                &self.name,
                format!("requires at least 2 fields, only has #{:?}", self.columns()),
            ));
        }
        Ok(())
    }

    /// Member column numbers in ascending order.
    pub fn columns(&self) -> Vec<usize> {
        self.members.iter().map(|m| m.column).collect()
    }

    /// Column whose value triggers evaluation.
    pub fn last_column(&self) -> Option<usize> {
        self.members.last().map(|m| m.column)
    }

    /// Number of test rows.
    pub fn rows(&self) -> usize {
        self.members.first().map_or(0, |m| m.tests.len())
    }

    /// Buffer `value` for `column`, evaluating once the last member arrives.
    pub fn supply(&mut self, column: usize, value: &str) -> XcheckOutcome {
        let Some(member) = self.members.iter_mut().find(|m| m.column == column) else {
            return XcheckOutcome::Pending;
        };
        member.value.clear();
        member.value.push_str(value);

        if Some(column) != self.last_column() {
            return XcheckOutcome::Pending;
        }

        let matched = self.evaluate();
        if matched {
            self.matched += 1;
        } else {
            self.unmatched += 1;
        }
        for member in &mut self.members {
            member.value.clear();
        }
        XcheckOutcome::Decided(matched)
    }

    fn evaluate(&mut self) -> bool {
        let Some((base, others)) = self.members.split_first_mut() else {
            return false;
        };
        for row in 0..base.tests.len() {
            if !base.tests[row].test(&base.value) {
                base.failed[row] += 1;
                continue;
            }
            base.passed[row] += 1;

            let mut row_matches = true;
            for member in others.iter_mut() {
                if member.tests[row].test(&member.value) {
                    member.passed[row] += 1;
                } else {
                    member.failed[row] += 1;
                    row_matches = false;
                    break;
                }
            }
            if row_matches {
                return true;
            }
        }
        false
    }

    /// Per-row, per-member counters for reporting.
    pub fn report(&self) -> XcheckReport {
        let rows = (0..self.rows())
            .map(|row| XcheckRowReport {
                row: row + 1,
                members: self
                    .members
                    .iter()
                    .map(|m| XcheckMemberReport {
                        column: m.column,
                        test: m.test_names[row].clone(),
                        passed: m.passed[row],
                        failed: m.failed[row],
                    })
                    .collect(),
            })
            .collect();
        XcheckReport {
            name: self.name.clone(),
            columns: self.columns(),
            matched: self.matched,
            unmatched: self.unmatched,
            rows,
        }
    }
}

/// Counters for one group.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XcheckReport {
    pub name: String,
    pub columns: Vec<usize>,
    pub matched: u64,
    pub unmatched: u64,
    pub rows: Vec<XcheckRowReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XcheckRowReport {
    /// 1-based test row.
    pub row: usize,
    pub members: Vec<XcheckMemberReport>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XcheckMemberReport {
    pub column: usize,
    pub test: String,
    pub passed: u64,
    pub failed: u64,
}

/// Expand a member's user data into its test list.
///
/// A first entry of `xcheck_<name>` uses the `[user]` list of that name when
/// one is configured, otherwise loads `xcheck_<name>.txt`;
/// `xcheck_<name>[k]` loads column `k` of `xcheck_<name>.csv`. Empty user data
/// falls back to a `[user]` list named after the group. Anything else is the
/// list itself.
pub fn load_test_list(
    group: &str,
    user_data: &[String],
    user: &UserItems,
    files: &ExternalFiles,
) -> Result<Vec<String>> {
    let configured = |name: &str| match user.get(name) {
        Some(UserItem::List(values)) => Some(values.clone()),
        _ => None,
    };

    let Some(first) = user_data.first() else {
        return configured(group)
            .ok_or_else(|| ProfilerError::xcheck(group, "user data with a test list is required"));
    };
    if !first.starts_with("xcheck_") {
        return Ok(user_data.to_vec());
    }

    let Some(open) = first.find('[') else {
        return match configured(first) {
            Some(values) => Ok(values),
            None => files.lines(first),
        };
    };
    let index = first
        .find(']')
        .filter(|close| *close >= open + 2)
        .and_then(|close| first[open + 1..close].trim().parse::<usize>().ok())
        .ok_or_else(|| {
            ProfilerError::xcheck(group, format!("Incorrect format of xcheck index option \"{first}\""))
        })?;
    let table = &first[..open];
    if configured(table).is_some() {
        return Err(ProfilerError::xcheck(
            group,
            format!("{table} is a single list and has no column {index}"),
        ));
    }
    files.column(table, index)
}
