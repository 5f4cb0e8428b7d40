//! Run context: the field tests for every column and their shared tally.

use indexmap::IndexMap;

use crate::accounting::{ErrorKind, FlagSets, RowFlags};
use crate::config::ColumnConfig;
use crate::error::{ProfilerError, Result};
use crate::field::{FieldOutcome, FieldPredicate, FieldStats, FieldTest, GrandTotals};
use crate::registry::{TestKind, TestRegistry, TestSources};
use crate::xcheck::{self, XcheckGroup, XcheckOutcome};

/// Counters, flags and cross-check buffers shared by all columns.
#[derive(Debug, Clone, Default)]
pub struct Tally {
    stats: Vec<FieldStats>,
    groups: Vec<XcheckGroup>,
    flags: FlagSets,
    pub totals: GrandTotals,
}

impl Tally {
    fn new(columns: usize, groups: Vec<XcheckGroup>) -> Self {
        Self {
            stats: vec![FieldStats::default(); columns],
            groups,
            flags: FlagSets::new(),
            totals: GrandTotals::default(),
        }
    }

    pub fn stats(&self, column: usize) -> Option<&FieldStats> {
        column.checked_sub(1).and_then(|i| self.stats.get(i))
    }

    pub(crate) fn stats_mut(&mut self, column: usize) -> &mut FieldStats {
        &mut self.stats[column - 1]
    }

    /// Flag `column` and count the error in its category.
    pub(crate) fn raise(&mut self, kind: ErrorKind, column: usize) {
        let stats = &mut self.stats[column - 1];
        match kind {
            ErrorKind::Test => self.totals.test_errors += 1,
            ErrorKind::Blank => {
                stats.blank_errors += 1;
                self.totals.blank_errors += 1;
            }
            ErrorKind::Length => {
                stats.length_errors += 1;
                self.totals.length_errors += 1;
            }
            ErrorKind::MaxLength => {
                stats.max_length_errors += 1;
                self.totals.max_length_errors += 1;
            }
        }
        self.flags.raise(kind, column);
    }

    /// Feed a value to a cross-check group. A decision updates every member
    /// column: one pass each on a match, otherwise one failure and one test
    /// error each.
    pub(crate) fn supply_xcheck(&mut self, group: usize, column: usize, value: &str) -> XcheckOutcome {
        let outcome = self.groups[group].supply(column, value);
        if let XcheckOutcome::Decided(matched) = outcome {
            let members = self.groups[group].columns();
            for member in members {
                if matched {
                    self.stats_mut(member).passed += 1;
                } else {
                    self.stats_mut(member).failed += 1;
                    self.raise(ErrorKind::Test, member);
                }
            }
        }
        outcome
    }

    pub fn groups(&self) -> &[XcheckGroup] {
        &self.groups
    }
}

/// Everything needed to test rows of one input.
#[derive(Debug, Clone)]
pub struct RunContext {
    registry: TestRegistry,
    fields: Vec<FieldTest>,
    tally: Tally,
}

impl RunContext {
    /// Resolve every column's test and build its controller.
    ///
    /// Columns must be numbered densely from 1 in order. Cross-check columns
    /// join the group named by their test; each group needs two or more
    /// members with equal-length test lists.
    pub fn build(columns: Vec<ColumnConfig>, mut registry: TestRegistry, sources: &TestSources<'_>) -> Result<Self> {
        let mut groups: IndexMap<String, XcheckGroup> = IndexMap::new();
        let mut predicates = Vec::with_capacity(columns.len());

        for (i, column) in columns.iter().enumerate() {
            if column.number != i + 1 {
                return Err(ProfilerError::Config(format!(
                    "column numbers must run 1..{} in order, found #{} at position {}",
                    columns.len(),
                    column.number,
                    i + 1
                )));
            }

            let predicate = if column.test.kind == TestKind::Xcheck {
                let name = column.test.identifier.as_str();
                let names = xcheck::load_test_list(name, &column.user_data, sources.user, sources.files)?;
                let tests = names
                    .iter()
                    .map(|item| registry.resolve_xcheck_item(item, sources))
                    .collect::<Result<Vec<_>>>()?;
                let entry = groups.entry(name.to_string());
                let index = entry.index();
                entry
                    .or_insert_with(|| XcheckGroup::new(name))
                    .add_member(column.number, names, tests)?;
                FieldPredicate::Xcheck(index)
            } else {
                let predicate = registry
                    .resolve_spec(&column.test, &column.user_data, sources)
                    .map_err(|e| match e {
                        ProfilerError::UnknownTest { name, .. } => ProfilerError::UnknownTest {
                            column: column.number,
                            name,
                        },
                        other => other,
                    })?;
                FieldPredicate::Test(predicate)
            };
            predicates.push(predicate);
        }

        for group in groups.values() {
            group.validate()?;
        }

        let count = columns.len();
        let fields: Vec<FieldTest> = columns
            .into_iter()
            .zip(predicates)
            .map(|(config, predicate)| FieldTest::new(config, predicate))
            .collect();
        tracing::info!(
            columns = count,
            xchecks = groups.len(),
            tests = registry.len(),
            "run context built"
        );

        Ok(Self {
            registry,
            fields,
            tally: Tally::new(count, groups.into_values().collect()),
        })
    }

    pub fn registry(&self) -> &TestRegistry {
        &self.registry
    }

    pub fn columns(&self) -> usize {
        self.fields.len()
    }

    pub fn fields(&self) -> &[FieldTest] {
        &self.fields
    }

    pub fn field(&self, column: usize) -> Option<&FieldTest> {
        column.checked_sub(1).and_then(|i| self.fields.get(i))
    }

    pub fn tally(&self) -> &Tally {
        &self.tally
    }

    pub fn totals(&self) -> &GrandTotals {
        &self.tally.totals
    }

    /// Test `value` in `column` (1-based) of record `record`.
    pub fn test_field(&mut self, column: usize, value: &str, record: u64) -> FieldOutcome {
        self.fields[column - 1].test(value, record, &mut self.tally)
    }

    /// Take and reset the flags raised since the last call.
    pub fn collect_flags(&mut self) -> RowFlags {
        self.tally.flags.collect_and_clear()
    }
}
