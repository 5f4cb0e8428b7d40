//! Error artifact writers.
//!
//! Both artifacts are written in the run's configured encoding and removed
//! again on finish if no error row or line was written to them.

use std::fs::{self, File};
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

use encoding_rs::{Encoding, UTF_8};

use crate::config::{Dialect, QuotingMode};
use crate::error::{ProfilerError, Result};

/// Header cell for the error-column list.
pub const ERROR_COLUMNS_HEADER: &str = "colnums_in_error";

fn create(path: &Path) -> Result<BufWriter<File>> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).map_err(|e| ProfilerError::io(parent, e))?;
    }
    let file = File::create(path).map_err(|e| ProfilerError::io(path, e))?;
    Ok(BufWriter::new(file))
}

fn write_encoded(out: &mut BufWriter<File>, path: &Path, encoding: &'static Encoding, text: &str) -> Result<()> {
    let result = if encoding == UTF_8 {
        out.write_all(text.as_bytes())
    } else {
        let (bytes, _, _) = encoding.encode(text);
        out.write_all(&bytes)
    };
    result.map_err(|e| ProfilerError::io(path, e))
}

/// Flush `out`, then delete `path` when nothing was written to it.
fn close(mut out: BufWriter<File>, path: PathBuf, written: u64) -> Result<Option<PathBuf>> {
    out.flush().map_err(|e| ProfilerError::io(&path, e))?;
    drop(out);
    if written == 0 {
        fs::remove_file(&path).map_err(|e| ProfilerError::io(&path, e))?;
        tracing::debug!(path = %path.display(), "empty error artifact removed");
        return Ok(None);
    }
    Ok(Some(path))
}

/// CSV artifact: the flagged column numbers (or a bad-record message)
/// followed by the record's values, in the input dialect.
pub struct ErrorCsvWriter {
    path: PathBuf,
    out: BufWriter<File>,
    encoding: &'static Encoding,
    delimiter: u8,
    quote: Option<u8>,
    escape: Option<u8>,
    double_quote: bool,
    quoting: QuotingMode,
    rows: u64,
}

impl ErrorCsvWriter {
    pub fn create(path: impl Into<PathBuf>, dialect: &Dialect) -> Result<Self> {
        let path = path.into();
        let out = create(&path)?;
        Ok(Self {
            out,
            encoding: dialect.encoding()?,
            delimiter: dialect.delimiter_byte()?,
            quote: dialect.quote_byte()?,
            escape: dialect.escape_byte()?,
            double_quote: dialect.doublequote,
            quoting: dialect.quoting,
            rows: 0,
            path,
        })
    }

    /// Write the header row: the error-column label, then each column
    /// header suffixed with its number unless it is already `Column<n>`.
    pub fn write_header(&mut self, headers: &[String]) -> Result<()> {
        let mut cells = Vec::with_capacity(headers.len() + 1);
        cells.push(ERROR_COLUMNS_HEADER.to_string());
        cells.extend(headers.iter().enumerate().map(|(i, header)| {
            let number = i + 1;
            if *header == format!("Column{number}") {
                header.clone()
            } else {
                format!("{header}_{number}")
            }
        }));
        self.write_cells(&cells)
    }

    /// Write an error row for the given flagged columns.
    pub fn write_columns(&mut self, columns: &[usize], row: &[String]) -> Result<()> {
        let label = columns.iter().map(usize::to_string).collect::<Vec<_>>().join(" ");
        self.write_labelled(label, row)
    }

    /// Write a record-level failure row.
    pub fn write_failure(&mut self, message: &str, row: &[String]) -> Result<()> {
        self.write_labelled(message.to_string(), row)
    }

    fn write_labelled(&mut self, label: String, row: &[String]) -> Result<()> {
        let mut cells = Vec::with_capacity(row.len() + 1);
        cells.push(label);
        cells.extend(row.iter().cloned());
        self.write_cells(&cells)?;
        self.rows += 1;
        Ok(())
    }

    fn write_cells(&mut self, cells: &[String]) -> Result<()> {
        let mut builder = csv::WriterBuilder::new();
        builder
            .delimiter(self.delimiter)
            .quote_style(self.quoting.quote_style())
            .double_quote(self.double_quote)
            .has_headers(false);
        if let Some(quote) = self.quote {
            builder.quote(quote);
        }
        if let Some(escape) = self.escape {
            builder.escape(escape);
        }

        let mut writer = builder.from_writer(Vec::new());
        writer.write_record(cells)?;
        let bytes = writer
            .into_inner()
            .map_err(|e| ProfilerError::io(&self.path, e.into_error()))?;
        let text = String::from_utf8_lossy(&bytes);
        write_encoded(&mut self.out, &self.path, self.encoding, &text)
    }

    /// Error rows written, not counting the header.
    pub fn rows(&self) -> u64 {
        self.rows
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Flush and return the path, or delete the file if it has no error rows.
    pub fn finish(self) -> Result<Option<PathBuf>> {
        close(self.out, self.path, self.rows)
    }
}

/// Tab-separated log artifact, one line per approved column error.
pub struct ErrorLogWriter {
    path: PathBuf,
    out: BufWriter<File>,
    encoding: &'static Encoding,
    lines: u64,
}

/// One approved column error as written to the log.
#[derive(Debug, Clone, Copy)]
pub struct LogEntry<'a> {
    pub key: &'a str,
    pub header: &'a str,
    pub test: &'a str,
    pub length: usize,
    pub max_length: usize,
    pub failure: &'a str,
    pub value: &'a str,
}

impl ErrorLogWriter {
    pub fn create(path: impl Into<PathBuf>, encoding: &'static Encoding) -> Result<Self> {
        let path = path.into();
        let out = create(&path)?;
        Ok(Self {
            path,
            out,
            encoding,
            lines: 0,
        })
    }

    pub fn write_field(&mut self, entry: &LogEntry<'_>) -> Result<()> {
        let line = format!(
            "{}\t{}\t{}\t({}:{})\t({})\t{}\n",
            entry.key, entry.header, entry.test, entry.length, entry.max_length, entry.failure, entry.value
        );
        self.write_line(&line)
    }

    /// `<message> -> [values]` for a record-level failure.
    pub fn write_failure(&mut self, message: &str, row: &[String]) -> Result<()> {
        self.write_line(&format!("{message} -> {row:?}\n"))
    }

    fn write_line(&mut self, line: &str) -> Result<()> {
        write_encoded(&mut self.out, &self.path, self.encoding, line)?;
        self.lines += 1;
        Ok(())
    }

    pub fn lines(&self) -> u64 {
        self.lines
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn finish(self) -> Result<Option<PathBuf>> {
        close(self.out, self.path, self.lines)
    }
}

/// The enabled error artifacts for a run.
#[derive(Default)]
pub struct ErrorArtifacts {
    pub csv: Option<ErrorCsvWriter>,
    pub log: Option<ErrorLogWriter>,
}

impl ErrorArtifacts {
    /// No artifacts; rows are still tested and counted.
    pub fn disabled() -> Self {
        Self::default()
    }

    pub fn is_enabled(&self) -> bool {
        self.csv.is_some() || self.log.is_some()
    }

    /// Finish both writers, returning the paths that were kept.
    pub fn finish(self) -> Result<(Option<PathBuf>, Option<PathBuf>)> {
        let csv = self.csv.map(ErrorCsvWriter::finish).transpose()?.flatten();
        let log = self.log.map(ErrorLogWriter::finish).transpose()?.flatten();
        Ok((csv, log))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn strings(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_csv_header_and_rows() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.csv");
        let mut writer = ErrorCsvWriter::create(&path, &Dialect::default()).unwrap();
        writer.write_header(&strings(&["id", "Column2", "name"])).unwrap();
        writer.write_columns(&[1, 3], &strings(&["x", "y", "a,b"])).unwrap();
        writer
            .write_failure("Record# 4 has too few columns - skipped", &strings(&["x"]))
            .unwrap();
        assert_eq!(writer.rows(), 2);
        assert_eq!(writer.finish().unwrap(), Some(path.clone()));

        let text = fs::read_to_string(&path).unwrap();
        let lines: Vec<&str> = text.lines().collect();
        assert_eq!(lines[0], "colnums_in_error,id_1,Column2,name_3");
        assert_eq!(lines[1], "1 3,x,y,\"a,b\"");
        assert_eq!(lines[2], "Record# 4 has too few columns - skipped,x");
    }

    #[test]
    fn test_empty_artifacts_are_removed() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("errors.csv");
        let log_path = dir.path().join("errors.log");

        let mut csv = ErrorCsvWriter::create(&csv_path, &Dialect::default()).unwrap();
        csv.write_header(&strings(&["a"])).unwrap();
        let log = ErrorLogWriter::create(&log_path, UTF_8).unwrap();

        let artifacts = ErrorArtifacts {
            csv: Some(csv),
            log: Some(log),
        };
        assert!(artifacts.is_enabled());
        assert_eq!(artifacts.finish().unwrap(), (None, None));
        assert!(!csv_path.exists());
        assert!(!log_path.exists());
    }

    #[test]
    fn test_artifacts_create_missing_directories() {
        let dir = TempDir::new().unwrap();
        let csv_path = dir.path().join("out/errors.csv");
        let log_path = dir.path().join("out/logs/errors.log");

        let mut csv = ErrorCsvWriter::create(&csv_path, &Dialect::default()).unwrap();
        csv.write_columns(&[1], &strings(&["x"])).unwrap();
        let mut log = ErrorLogWriter::create(&log_path, UTF_8).unwrap();
        log.write_failure("Record# 1 has too few columns - skipped", &[]).unwrap();

        assert_eq!(csv.finish().unwrap(), Some(csv_path.clone()));
        assert_eq!(log.finish().unwrap(), Some(log_path.clone()));
        assert!(csv_path.exists());
        assert!(log_path.exists());
    }

    #[test]
    fn test_log_lines() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.log");
        let mut log = ErrorLogWriter::create(&path, UTF_8).unwrap();
        log.write_field(&LogEntry {
            key: "7",
            header: "zip",
            test: "zipcode",
            length: 5,
            max_length: 0,
            failure: "col len",
            value: "123",
        })
        .unwrap();
        log.write_failure("Record# 8 has too many columns - skipped", &strings(&["a", "b"]))
            .unwrap();
        assert_eq!(log.lines(), 2);
        log.finish().unwrap();

        let text = fs::read_to_string(&path).unwrap();
        assert_eq!(
            text,
            "7\tzip\tzipcode\t(5:0)\t(col len)\t123\n\
             Record# 8 has too many columns - skipped -> [\"a\", \"b\"]\n"
        );
    }

    #[test]
    fn test_log_uses_configured_encoding() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("errors.log");
        let mut log = ErrorLogWriter::create(&path, encoding_rs::WINDOWS_1252).unwrap();
        log.write_failure("caf\u{e9}", &[]).unwrap();
        log.finish().unwrap();
        assert_eq!(fs::read(&path).unwrap(), b"caf\xe9 -> []\n");
    }
}
