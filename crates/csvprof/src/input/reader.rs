//! Dialect-driven row reader.
//!
//! The whole file is read once for fingerprinting, decoded with the
//! configured encoding (invalid sequences become U+FFFD), and then parsed
//! row by row. Rows are returned with whatever field count they have; the
//! caller decides what a mismatch means. Blank lines, which the `csv` crate
//! skips, come back as empty rows.

use std::fs;
use std::io::Cursor;
use std::path::Path;

use csv::StringRecord;

use crate::config::Dialect;
use crate::error::{ProfilerError, Result};

use super::source::InputFingerprint;

pub struct InputReader {
    reader: csv::Reader<Cursor<Vec<u8>>>,
    record: StringRecord,
    fingerprint: InputFingerprint,
    /// Blank lines seen ahead of `record` and not yet returned.
    blank_lines: u64,
    record_ready: bool,
    exhausted: bool,
    /// The last consumed byte was a `\r` whose `\n` may follow.
    after_cr: bool,
}

impl InputReader {
    /// Open and decode `path`.
    pub fn open(path: impl AsRef<Path>, dialect: &Dialect) -> Result<Self> {
        let path = path.as_ref();
        let contents = fs::read(path).map_err(|e| ProfilerError::io(path, e))?;

        let encoding = dialect.encoding()?;
        let (text, used, had_replacements) = encoding.decode(&contents);
        if had_replacements {
            tracing::warn!(path = %path.display(), encoding = used.name(), "undecodable bytes replaced");
        }
        let fingerprint = InputFingerprint::new(path.to_path_buf(), &contents, used.name(), had_replacements);
        let text = text.into_owned();

        Self::from_text(text, dialect, fingerprint)
    }

    fn from_text(text: String, dialect: &Dialect, fingerprint: InputFingerprint) -> Result<Self> {
        let mut builder = csv::ReaderBuilder::new();
        builder
            .delimiter(dialect.delimiter_byte()?)
            .double_quote(dialect.doublequote)
            .escape(dialect.escape_byte()?)
            .has_headers(false)
            .flexible(true);
        match dialect.quote_byte()? {
            Some(quote) => builder.quote(quote),
            None => builder.quoting(false),
        };

        Ok(Self {
            reader: builder.from_reader(Cursor::new(text.into_bytes())),
            record: StringRecord::new(),
            fingerprint,
            blank_lines: 0,
            record_ready: false,
            exhausted: false,
            after_cr: false,
        })
    }

    pub fn fingerprint(&self) -> &InputFingerprint {
        &self.fingerprint
    }

    /// Next row's fields, or `None` at end of input.
    pub fn next_row(&mut self) -> Result<Option<Vec<String>>> {
        loop {
            if self.blank_lines > 0 {
                self.blank_lines -= 1;
                return Ok(Some(Vec::new()));
            }
            if self.record_ready {
                self.record_ready = false;
                return Ok(Some(self.record.iter().map(str::to_string).collect()));
            }
            if self.exhausted {
                return Ok(None);
            }

            let start = self.reader.position().byte();
            let found = self.reader.read_record(&mut self.record)?;
            let end = self.reader.position().byte();
            self.blank_lines = self.skipped_lines(start, end);
            self.record_ready = found;
            self.exhausted = !found;
        }
    }

    /// Count the empty lines at the front of the bytes consumed by one read.
    fn skipped_lines(&mut self, start: u64, end: u64) -> u64 {
        let data = self.reader.get_ref().get_ref();
        let end = (end as usize).min(data.len());
        let consumed = &data[(start as usize).min(end)..end];

        let mut i = 0;
        if self.after_cr && consumed.first() == Some(&b'\n') {
            i = 1;
        }
        let mut lines = 0;
        while let Some(&byte) = consumed.get(i) {
            match byte {
                b'\r' => {
                    i += 1;
                    if consumed.get(i) == Some(&b'\n') {
                        i += 1;
                    }
                }
                b'\n' => i += 1,
                _ => break,
            }
            lines += 1;
        }
        if !consumed.is_empty() {
            self.after_cr = consumed.last() == Some(&b'\r');
        }
        lines
    }
}

impl Iterator for InputReader {
    type Item = Result<Vec<String>>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_row().transpose()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::QuotingMode;
    use tempfile::TempDir;

    fn read_all(contents: &[u8], dialect: &Dialect) -> Vec<Vec<String>> {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, contents).unwrap();
        InputReader::open(&path, dialect)
            .unwrap()
            .collect::<Result<Vec<_>>>()
            .unwrap()
    }

    #[test]
    fn test_reads_rows_of_any_width() {
        let rows = read_all(b"a,b,c\n1,\"2,5\",3\nx\n", &Dialect::default());
        assert_eq!(rows.len(), 3);
        assert_eq!(rows[1], vec!["1", "2,5", "3"]);
        assert_eq!(rows[2], vec!["x"]);
    }

    #[test]
    fn test_blank_lines_are_empty_rows() {
        let rows = read_all(b"a,b\n1,2\n\n3,4\n\n", &Dialect::default());
        let empty: Vec<String> = Vec::new();
        assert_eq!(rows.len(), 5);
        assert_eq!(rows[1], vec!["1", "2"]);
        assert_eq!(rows[2], empty);
        assert_eq!(rows[3], vec!["3", "4"]);
        assert_eq!(rows[4], empty);

        let rows = read_all(b"a\r\n\r\n\r\nb\r\n\"x\ny\"\r\nc", &Dialect::default());
        assert_eq!(rows.len(), 6);
        assert_eq!(rows[1], empty);
        assert_eq!(rows[2], empty);
        assert_eq!(rows[3], vec!["b"]);
        assert_eq!(rows[4], vec!["x\ny"]);
        assert_eq!(rows[5], vec!["c"]);
    }

    #[test]
    fn test_pipe_delimited_without_quoting() {
        let dialect = Dialect {
            delimiter: '|',
            quoting: QuotingMode::None,
            ..Dialect::default()
        };
        let rows = read_all(b"\"a\"|b\n", &dialect);
        assert_eq!(rows[0], vec!["\"a\"", "b"]);
    }

    #[test]
    fn test_latin1_and_replacement() {
        let dialect = Dialect {
            encoding: "latin1".to_string(),
            ..Dialect::default()
        };
        let rows = read_all(b"caf\xe9,x\n", &dialect);
        assert_eq!(rows[0][0], "caf\u{e9}");

        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.csv");
        fs::write(&path, b"ok,\xff\n").unwrap();
        let mut reader = InputReader::open(&path, &Dialect::default()).unwrap();
        assert!(reader.fingerprint().had_replacements);
        assert_eq!(reader.next_row().unwrap().unwrap()[1], "\u{fffd}");
        assert!(reader.next_row().unwrap().is_none());
    }

    #[test]
    fn test_missing_file() {
        assert!(matches!(
            InputReader::open("/nonexistent/in.csv", &Dialect::default()),
            Err(ProfilerError::Io { .. })
        ));
    }
}
