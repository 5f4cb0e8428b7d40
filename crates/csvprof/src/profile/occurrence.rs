//! Value frequency collection.

use std::collections::BTreeMap;

use serde::Serialize;

/// Counts how often each distinct value occurs.
#[derive(Debug, Clone, Default)]
pub struct OccurrenceProfile {
    counts: BTreeMap<String, u64>,
}

impl OccurrenceProfile {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record(&mut self, value: &str) {
        match self.counts.get_mut(value) {
            Some(count) => *count += 1,
            None => {
                self.counts.insert(value.to_string(), 1);
            }
        }
    }

    pub fn count(&self, value: &str) -> u64 {
        self.counts.get(value).copied().unwrap_or(0)
    }

    /// Number of distinct values seen.
    pub fn distinct(&self) -> usize {
        self.counts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.is_empty()
    }

    /// Values in sorted order with their counts.
    pub fn iter(&self) -> impl Iterator<Item = (&str, u64)> {
        self.counts.iter().map(|(v, c)| (v.as_str(), *c))
    }

    pub fn report(&self) -> OccurrenceReport {
        OccurrenceReport {
            distinct_values: self.distinct(),
            values: self
                .iter()
                .map(|(value, count)| ValueCount {
                    value: value.to_string(),
                    count,
                })
                .collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct OccurrenceReport {
    pub distinct_values: usize,
    pub values: Vec<ValueCount>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ValueCount {
    pub value: String,
    pub count: u64,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_counts_sorted_by_value() {
        let mut profile = OccurrenceProfile::new();
        for value in ["b", "a", "b", "c", "b"] {
            profile.record(value);
        }
        assert_eq!(profile.count("b"), 3);
        assert_eq!(profile.count("z"), 0);
        assert_eq!(profile.distinct(), 3);

        let order: Vec<&str> = profile.iter().map(|(v, _)| v).collect();
        assert_eq!(order, vec!["a", "b", "c"]);

        let report = profile.report();
        assert_eq!(report.distinct_values, 3);
        assert_eq!(report.values[1], ValueCount { value: "b".into(), count: 3 });
    }
}
