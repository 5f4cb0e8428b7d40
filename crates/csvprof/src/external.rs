//! Loading of external lookup, regex and xcheck files.
//!
//! A test named `lookup_states` reads `lookup_states.txt` from the parameter
//! file's directory unless the run configuration names another path for it.
//! Indexed xcheck lists read one column of `<name>.csv` instead.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};

use encoding_rs::Encoding;

use crate::error::{ProfilerError, Result};

/// Resolves and reads external files for one run.
#[derive(Debug, Clone)]
pub struct ExternalFiles {
    base_dir: PathBuf,
    encoding: &'static Encoding,
    overrides: HashMap<String, PathBuf>,
}

impl ExternalFiles {
    pub fn new(base_dir: impl Into<PathBuf>, encoding: &'static Encoding) -> Self {
        Self {
            base_dir: base_dir.into(),
            encoding,
            overrides: HashMap::new(),
        }
    }

    /// Use `path` for `name` instead of the default location.
    pub fn with_override(mut self, name: impl Into<String>, path: impl Into<PathBuf>) -> Self {
        self.overrides.insert(name.into(), path.into());
        self
    }

    pub fn base_dir(&self) -> &Path {
        &self.base_dir
    }

    /// Where `name` is read from, given the default file extension.
    pub fn path_for(&self, name: &str, extension: &str) -> PathBuf {
        self.overrides
            .get(name)
            .cloned()
            .unwrap_or_else(|| self.base_dir.join(format!("{name}.{extension}")))
    }

    /// Read `<name>.txt` as a list of lines with trailing whitespace removed.
    pub fn lines(&self, name: &str) -> Result<Vec<String>> {
        let path = self.path_for(name, "txt");
        let text = self.read(&path)?;
        let lines: Vec<String> = text.lines().map(|l| l.trim_end().to_string()).collect();
        tracing::debug!(name, path = %path.display(), lines = lines.len(), "external file loaded");
        Ok(lines)
    }

    /// Read `<name>.txt` and join its lines into one regex pattern.
    pub fn pattern(&self, name: &str) -> Result<String> {
        Ok(self.lines(name)?.join(" ").trim().to_string())
    }

    /// Read column `index` (0-based) of `<name>.csv`, values trimmed.
    pub fn column(&self, name: &str, index: usize) -> Result<Vec<String>> {
        let path = self.path_for(name, "csv");
        let text = self.read(&path)?;

        let mut reader = csv::ReaderBuilder::new()
            .delimiter(b',')
            .quote(b'"')
            .double_quote(true)
            .has_headers(false)
            .flexible(true)
            .from_reader(text.as_bytes());

        let mut values = Vec::new();
        let mut width = None;
        for record in reader.records() {
            let record = record?;
            let columns = *width.get_or_insert(record.len());
            if index >= columns {
                return Err(ProfilerError::ExternalFile {
                    path,
                    message: format!("xcheck index not within range: {index}"),
                });
            }
            values.push(record.get(index).unwrap_or_default().trim().to_string());
        }
        tracing::debug!(name, path = %path.display(), index, rows = values.len(), "external column loaded");
        Ok(values)
    }

    fn read(&self, path: &Path) -> Result<String> {
        if !path.exists() {
            return Err(ProfilerError::ExternalFile {
                path: path.to_path_buf(),
                message: "not found".to_string(),
            });
        }
        let bytes = fs::read(path).map_err(|e| ProfilerError::io(path, e))?;
        let (text, _, _) = self.encoding.decode(&bytes);
        Ok(text.into_owned())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn files(dir: &TempDir) -> ExternalFiles {
        ExternalFiles::new(dir.path(), encoding_rs::UTF_8)
    }

    #[test]
    fn test_lines_are_right_trimmed() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("lookup_states.txt"), "AK  \nAL\r\n CA\n").unwrap();
        let lines = files(&dir).lines("lookup_states").unwrap();
        assert_eq!(lines, vec!["AK", "AL", " CA"]);
    }

    #[test]
    fn test_pattern_joins_lines() {
        let dir = TempDir::new().unwrap();
        fs::write(dir.path().join("regex_code.txt"), "  [A-Z]{2}\n[0-9]+  \n").unwrap();
        assert_eq!(files(&dir).pattern("regex_code").unwrap(), "[A-Z]{2} [0-9]+");
    }

    #[test]
    fn test_indexed_column() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("xcheck_geo.csv"),
            "alpha,\"range(1:5)\"\nnumeric , lookup_codes\n",
        )
        .unwrap();
        let f = files(&dir);
        assert_eq!(f.column("xcheck_geo", 0).unwrap(), vec!["alpha", "numeric"]);
        assert_eq!(f.column("xcheck_geo", 1).unwrap(), vec!["range(1:5)", "lookup_codes"]);
        assert!(matches!(
            f.column("xcheck_geo", 2),
            Err(ProfilerError::ExternalFile { .. })
        ));
    }

    #[test]
    fn test_override_and_missing_file() {
        let dir = TempDir::new().unwrap();
        let elsewhere = dir.path().join("other.list");
        fs::write(&elsewhere, "x\n").unwrap();
        let f = files(&dir).with_override("lookup_x", &elsewhere);
        assert_eq!(f.lines("lookup_x").unwrap(), vec!["x"]);
        assert!(matches!(
            f.lines("lookup_y"),
            Err(ProfilerError::ExternalFile { .. })
        ));
    }
}
