//! Duplicate detection.

use indexmap::IndexMap;
use serde::Serialize;

/// Tracks where each value was first seen and the records that repeat it.
#[derive(Debug, Clone, Default)]
pub struct UniqueProfile {
    first_seen: IndexMap<String, u64>,
    duplicates: IndexMap<String, Vec<u64>>,
}

impl UniqueProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: &str, record: u64) {
        if self.first_seen.contains_key(value) {
            match self.duplicates.get_mut(value) {
                Some(records) => records.push(record),
                None => {
                    self.duplicates.insert(value.to_string(), vec![record]);
                }
            }
        } else {
            self.first_seen.insert(value.to_string(), record);
        }
    }

    /// Distinct values seen.
    pub fn unique_values(&self) -> usize {
        self.first_seen.len()
    }

    /// Records repeating an earlier value.
    pub fn total_duplicates(&self) -> usize {
        self.duplicates.values().map(Vec::len).sum()
    }

    pub fn report(&self) -> UniqueReport {
        let duplicates: Vec<DuplicateEntry> = self
            .duplicates
            .iter()
            .map(|(value, repeats)| DuplicateEntry {
                value: value.clone(),
                first_seen: self.first_seen.get(value).copied().unwrap_or_default(),
                repeats: repeats.clone(),
            })
            .collect();
        let unique_values = self.unique_values();
        let total_duplicates = self.total_duplicates();
        UniqueReport {
            total_values: unique_values + total_duplicates,
            unique_values,
            duplicated_values: duplicates.len(),
            total_duplicates,
            duplicates,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UniqueReport {
    pub total_values: usize,
    pub unique_values: usize,
    /// Distinct values seen more than once.
    pub duplicated_values: usize,
    pub total_duplicates: usize,
    /// In order of first repetition.
    pub duplicates: Vec<DuplicateEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DuplicateEntry {
    pub value: String,
    pub first_seen: u64,
    pub repeats: Vec<u64>,
}

impl DuplicateEntry {
    /// First record followed by every repeat.
    pub fn records(&self) -> impl Iterator<Item = u64> + '_ {
        std::iter::once(self.first_seen).chain(self.repeats.iter().copied())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicates_report_first_seen() {
        let mut profile = UniqueProfile::new();
        for (record, value) in ["A", "B", "A", "C", "A"].into_iter().enumerate() {
            profile.record(value, record as u64 + 1);
        }

        let report = profile.report();
        assert_eq!(report.unique_values, 3);
        assert_eq!(report.total_duplicates, 2);
        assert_eq!(report.total_values, 5);
        assert_eq!(report.duplicated_values, 1);

        let entry = &report.duplicates[0];
        assert_eq!(entry.value, "A");
        assert_eq!(entry.records().collect::<Vec<_>>(), vec![1, 3, 5]);
    }

    #[test]
    fn test_no_duplicates() {
        let mut profile = UniqueProfile::new();
        profile.record("x", 1);
        profile.record("y", 2);
        let report = profile.report();
        assert!(report.duplicates.is_empty());
        assert_eq!(report.total_values, 2);
    }
}
