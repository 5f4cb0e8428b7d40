//! Parameter grid reader.
//!
//! The grid is a CSV file with one column per data column. Column 0 holds
//! fixed row tags; each remaining column is transposed into a
//! [`ColumnConfig`].

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use encoding_rs::Encoding;
use serde::{Deserialize, Serialize};

use crate::error::{ProfilerError, Result};
use crate::registry::TestSpec;

/// Row tags expected in column 0, in order.
pub const ROW_TAGS: [&str; 11] = [
    "csvp_options",
    "Column Test",
    "Column Length",
    "Max Length",
    "Profile (y/n/p/u/s)",
    "Blank is Error (y/n)",
    "Strip Surrounding Spaces (y/n)",
    "Error Output Limit",
    "Error Output Limit - Length Errors",
    "Error Output Limit - Blank Errors",
    "User Data",
];

const USER_DATA_ROW: usize = 10;

/// Optional per-column data collection.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ProfileMode {
    #[default]
    None,
    Occurrence,
    Unique,
    Statistical,
}

impl ProfileMode {
    fn parse(cell: &str) -> Option<Self> {
        match cell {
            "" | "n" | "N" => Some(ProfileMode::None),
            "y" | "Y" | "p" | "P" => Some(ProfileMode::Occurrence),
            "u" | "U" => Some(ProfileMode::Unique),
            "s" | "S" => Some(ProfileMode::Statistical),
            _ => None,
        }
    }
}

/// Per-column caps on approved errors by category; `None` is unlimited.
///
/// Max-length errors share the length limit.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CategoryLimits {
    pub test: Option<u64>,
    pub length: Option<u64>,
    pub blank: Option<u64>,
}

/// Everything the parameter grid says about one data column.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ColumnConfig {
    /// 1-based column number.
    pub number: usize,
    pub header: String,
    pub test: TestSpec,
    /// Exact length required after stripping; 0 disables.
    pub length: usize,
    /// Maximum raw length; 0 disables.
    pub max_length: usize,
    pub profile: ProfileMode,
    pub blank_is_error: bool,
    pub strip: bool,
    pub limits: CategoryLimits,
    /// Lookup values, regex text or xcheck test list.
    pub user_data: Vec<String>,
}

impl ColumnConfig {
    /// A column running `test` with every option off.
    pub fn new(number: usize, header: impl Into<String>, test: TestSpec) -> Self {
        Self {
            number,
            header: header.into(),
            test,
            length: 0,
            max_length: 0,
            profile: ProfileMode::None,
            blank_is_error: false,
            strip: false,
            limits: CategoryLimits::default(),
            user_data: Vec::new(),
        }
    }
}

/// Read and validate a parameter file.
pub fn read_params(path: impl AsRef<Path>, encoding: &'static Encoding) -> Result<Vec<ColumnConfig>> {
    let path = path.as_ref();
    let bytes = fs::read(path).map_err(|e| ProfilerError::io(path, e))?;
    let (text, _, had_errors) = encoding.decode(&bytes);
    if had_errors {
        return Err(ProfilerError::Config(format!(
            "param file {} is not valid {}",
            path.display(),
            encoding.name()
        )));
    }
    parse_params(&text)
}

/// Parse parameter grid text.
pub fn parse_params(text: &str) -> Result<Vec<ColumnConfig>> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b',')
        .has_headers(false)
        .flexible(true)
        .from_reader(text.as_bytes());

    let mut grid: Vec<Vec<String>> = Vec::new();
    for record in reader.records() {
        let record = record?;
        grid.push(record.iter().map(|cell| cell.trim().to_string()).collect());
    }

    if grid.len() < ROW_TAGS.len() {
        return Err(ProfilerError::Config(format!(
            "param file is incomplete, expecting at least {} rows",
            ROW_TAGS.len()
        )));
    }

    let tags: Vec<&str> = grid
        .iter()
        .take(ROW_TAGS.len())
        .map(|row| row.first().map(String::as_str).unwrap_or_default())
        .collect();
    if tags != ROW_TAGS {
        return Err(ProfilerError::Config(format!(
            "params rows do not match expected format, expected these row tags, in order: {ROW_TAGS:?}"
        )));
    }

    let headers: Vec<String> = grid[0].iter().skip(1).cloned().collect();
    let mut seen = HashSet::new();
    for header in &headers {
        if header.is_empty() {
            return Err(ProfilerError::Config(
                "blank column found in params, please remove".to_string(),
            ));
        }
        if !seen.insert(header.as_str()) {
            return Err(ProfilerError::Config(format!(
                "Duplicate header name in params: {header}"
            )));
        }
    }

    headers
        .iter()
        .enumerate()
        .map(|(i, header)| {
            let col = i + 1;
            let user_data = (USER_DATA_ROW..grid.len())
                .map(|row| cell(&grid, row, col))
                .take_while(|value| !value.is_empty())
                .map(str::to_string)
                .collect();
            build_column(col, header, |row| cell(&grid, row, col), user_data)
        })
        .collect()
}

/// Missing cells in short rows read as blank.
fn cell(grid: &[Vec<String>], row: usize, col: usize) -> &str {
    grid.get(row)
        .and_then(|r| r.get(col))
        .map(String::as_str)
        .unwrap_or_default()
}

fn build_column<'a>(
    number: usize,
    header: &str,
    cell: impl Fn(usize) -> &'a str,
    user_data: Vec<String>,
) -> Result<ColumnConfig> {
    let column_error = |message: String| ProfilerError::Column {
        column: number,
        header: header.to_string(),
        message,
    };

    let test = TestSpec::parse(cell(1)).map_err(|e| column_error(e.to_string()))?;

    let length = parse_length(cell(2))
        .ok_or_else(|| column_error(format!("has invalid length specification: {}", cell(2))))?;
    let max_length = parse_length(cell(3)).ok_or_else(|| {
        column_error(format!("has invalid max length specification: {}", cell(3)))
    })?;
    let profile = ProfileMode::parse(cell(4))
        .ok_or_else(|| column_error(format!("has invalid profile specification: {}", cell(4))))?;

    let limits = CategoryLimits {
        test: parse_limit(cell(7))
            .ok_or_else(|| column_error(format!("has invalid error limit specification: {}", cell(7))))?,
        length: parse_limit(cell(8)).ok_or_else(|| {
            column_error(format!("has invalid length error limit specification: {}", cell(8)))
        })?,
        blank: parse_limit(cell(9)).ok_or_else(|| {
            column_error(format!("has invalid blank error limit specification: {}", cell(9)))
        })?,
    };

    Ok(ColumnConfig {
        number,
        header: header.to_string(),
        test,
        length,
        max_length,
        profile,
        blank_is_error: is_yes(cell(5)),
        strip: is_yes(cell(6)),
        limits,
        user_data,
    })
}

/// Blank is 0; values at or below zero disable the check.
fn parse_length(cell: &str) -> Option<usize> {
    if cell.is_empty() {
        return Some(0);
    }
    let n: i64 = cell.parse().ok()?;
    Some(usize::try_from(n).unwrap_or(0))
}

/// Blank is unlimited; negative limits approve nothing.
fn parse_limit(cell: &str) -> Option<Option<u64>> {
    if cell.is_empty() {
        return Some(None);
    }
    let n: i64 = cell.parse().ok()?;
    Some(Some(u64::try_from(n).unwrap_or(0)))
}

fn is_yes(cell: &str) -> bool {
    cell.starts_with(['y', 'Y', 't', 'T'])
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::registry::TestKind;

    fn grid(columns: &[&[&str]]) -> String {
        let rows = columns.iter().map(|c| c.len()).max().unwrap_or(0);
        let mut lines = Vec::new();
        for row in 0..rows.max(ROW_TAGS.len()) {
            let mut cells = vec![ROW_TAGS.get(row).copied().unwrap_or("").to_string()];
            for column in columns {
                cells.push(column.get(row).copied().unwrap_or("").to_string());
            }
            lines.push(cells.join(","));
        }
        lines.join("\n")
    }

    #[test]
    fn test_parse_two_columns() {
        let text = grid(&[
            &["state", "lookup_states", "2", "", "p", "y", "n", "5", "", "1", "AK", "AL", ""],
            &["zip", " zipcode+ ", "", "10", "", "", "yes", "", "3", "", ""],
        ]);
        let columns = parse_params(&text).unwrap();
        assert_eq!(columns.len(), 2);

        let state = &columns[0];
        assert_eq!(state.number, 1);
        assert_eq!(state.header, "state");
        assert_eq!(state.test.kind, TestKind::Lookup);
        assert_eq!(state.length, 2);
        assert_eq!(state.profile, ProfileMode::Occurrence);
        assert!(state.blank_is_error);
        assert!(!state.strip);
        assert_eq!(state.limits.test, Some(5));
        assert_eq!(state.limits.length, None);
        assert_eq!(state.limits.blank, Some(1));
        assert_eq!(state.user_data, vec!["AK", "AL"]);

        let zip = &columns[1];
        assert_eq!(zip.test.identifier, "zipcode+");
        assert_eq!(zip.max_length, 10);
        assert!(zip.strip);
        assert_eq!(zip.limits.length, Some(3));
        assert!(zip.user_data.is_empty());
    }

    #[test]
    fn test_blank_test_means_anything() {
        let text = grid(&[&["id"]]);
        let columns = parse_params(&text).unwrap();
        assert_eq!(columns[0].test.identifier, "anything");
        assert_eq!(columns[0].profile, ProfileMode::None);
    }

    #[test]
    fn test_user_data_stops_at_first_blank() {
        let text = grid(&[&["c", "lookup_x", "", "", "", "", "", "", "", "", "a", "", "b"]]);
        let columns = parse_params(&text).unwrap();
        assert_eq!(columns[0].user_data, vec!["a"]);
    }

    #[test]
    fn test_rejects_short_grid_and_bad_tags() {
        assert!(parse_params("csvp_options,a\nColumn Test,anything\n").is_err());

        let text = grid(&[&["a"]]).replace("Max Length", "Maximum Length");
        assert!(matches!(parse_params(&text), Err(ProfilerError::Config(_))));
    }

    #[test]
    fn test_rejects_duplicate_and_blank_headers() {
        let dup = grid(&[&["a"], &["a"]]);
        assert!(parse_params(&dup).unwrap_err().to_string().contains("Duplicate"));
        let blank = grid(&[&["a"], &[""]]);
        assert!(parse_params(&blank).unwrap_err().to_string().contains("blank column"));
    }

    #[test]
    fn test_column_errors_carry_context() {
        let text = grid(&[&["a"], &["b", "anything", "x"]]);
        match parse_params(&text) {
            Err(ProfilerError::Column { column, header, .. }) => {
                assert_eq!(column, 2);
                assert_eq!(header, "b");
            }
            other => panic!("unexpected {other:?}"),
        }

        let text = grid(&[&["a", "anything", "", "", "q"]]);
        assert!(parse_params(&text).unwrap_err().to_string().contains("profile"));

        let text = grid(&[&["a", "range(1:)"]]);
        assert!(matches!(parse_params(&text), Err(ProfilerError::Column { .. })));
    }

    #[test]
    fn test_negative_values() {
        let text = grid(&[&["a", "", "-1", "", "", "", "", "-2"]]);
        let columns = parse_params(&text).unwrap();
        assert_eq!(columns[0].length, 0);
        assert_eq!(columns[0].limits.test, Some(0));
    }
}
