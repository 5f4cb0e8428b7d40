//! Run orchestration.
//!
//! [`Profiler`] turns a [`RunConfig`] into a finished [`RunSnapshot`]:
//! read the parameter grid, build the run context, skip and check the
//! header, then push every row through a [`Run`].

use std::time::Instant;

use chrono::{DateTime, Utc};

use crate::accounting::{EmissionLimit, ErrorArtifacts, ErrorCsvWriter, ErrorGate, ErrorLogWriter, LogEntry};
use crate::config::{read_params, OutputConfig, RunConfig};
use crate::context::RunContext;
use crate::error::{ProfilerError, Result};
use crate::input::{InputFingerprint, InputReader};
use crate::predicate::LookupProviders;
use crate::registry::{TestRegistry, TestSources};
use crate::snapshot::{ArtifactPaths, RecordTotals, RunSnapshot};

/// Records between progress log lines.
pub const PROGRESS_INTERVAL: u64 = 100_000;

pub struct Profiler {
    config: RunConfig,
    providers: LookupProviders,
    registry: TestRegistry,
}

impl Profiler {
    pub fn new(config: RunConfig) -> Self {
        Self {
            config,
            providers: LookupProviders::new(),
            registry: TestRegistry::new(),
        }
    }

    /// Bind lookup providers for `lookup_*` tests and import directives.
    pub fn with_providers(mut self, providers: LookupProviders) -> Self {
        self.providers = providers;
        self
    }

    /// Start from `registry` instead of the built-in tests alone.
    pub fn with_registry(mut self, registry: TestRegistry) -> Self {
        self.registry = registry;
        self
    }

    pub fn config(&self) -> &RunConfig {
        &self.config
    }

    /// Read the parameter grid and resolve every column's test.
    ///
    /// Every configuration problem surfaces here, before any data row is
    /// read.
    pub fn prepare(&self) -> Result<RunContext> {
        let encoding = self.config.dialect.encoding()?;
        let columns = read_params(&self.config.files.param_file, encoding)?;
        let files = self.config.external_files()?;
        let sources = TestSources {
            user: &self.config.user,
            providers: &self.providers,
            files: &files,
        };
        let context = RunContext::build(columns, self.registry.clone(), &sources)?;
        check_key_column(&self.config.output, context.columns())?;
        Ok(context)
    }

    /// Process the whole input file.
    pub fn run(&self) -> Result<RunSnapshot> {
        let context = self.prepare()?;
        self.run_prepared(context)
    }

    /// Process the whole input file with a context from [`Profiler::prepare`].
    ///
    /// Lookup providers are initialised while the context is built, so
    /// callers that inspect the context first avoid binding them twice.
    pub fn run_prepared(&self, context: RunContext) -> Result<RunSnapshot> {
        let dialect = &self.config.dialect;
        let mut reader = InputReader::open(&self.config.files.csv_file, dialect)?;

        if dialect.has_header {
            if let Some(header) = reader.next_row()? {
                if header.len() != context.columns() {
                    return Err(ProfilerError::HeaderMismatch {
                        expected: context.columns(),
                        found: header.len(),
                    });
                }
            }
        }

        let artifacts = self.open_artifacts(&context)?;
        tracing::info!(
            input = %self.config.files.csv_file.display(),
            columns = context.columns(),
            "run started"
        );

        let mut run = Run::new(context, &self.config.output)?.with_artifacts(artifacts);
        while let Some(row) = reader.next_row()? {
            run.process_row(&row)?;
        }
        run.finish(Some(reader.fingerprint().clone()))
    }

    fn open_artifacts(&self, context: &RunContext) -> Result<ErrorArtifacts> {
        let output = &self.config.output;
        if !output.writes_artifacts() {
            return Ok(ErrorArtifacts::disabled());
        }

        let mut artifacts = ErrorArtifacts::disabled();
        if output.output_error_csv {
            if let Some(path) = &self.config.files.error_csv_file {
                let mut csv = ErrorCsvWriter::create(path, &self.config.dialect)?;
                if self.config.dialect.has_header {
                    let headers: Vec<String> =
                        context.fields().iter().map(|f| f.header().to_string()).collect();
                    csv.write_header(&headers)?;
                }
                artifacts.csv = Some(csv);
            }
        }
        if output.output_error_log {
            if let Some(path) = &self.config.files.error_log_file {
                artifacts.log = Some(ErrorLogWriter::create(path, self.config.dialect.encoding()?)?);
            }
        }
        Ok(artifacts)
    }
}

fn check_key_column(output: &OutputConfig, columns: usize) -> Result<()> {
    if output.key_colnum > columns {
        return Err(ProfilerError::Config(format!(
            "key_colnum {} is beyond the last column ({columns})",
            output.key_colnum
        )));
    }
    Ok(())
}

/// Row-by-row processing state for one run.
pub struct Run {
    context: RunContext,
    gates: Vec<ErrorGate>,
    emission: EmissionLimit,
    artifacts: ErrorArtifacts,
    key_column: usize,
    records: RecordTotals,
    started_at: DateTime<Utc>,
    started: Instant,
}

impl Run {
    /// A run with no error artifacts attached.
    pub fn new(context: RunContext, output: &OutputConfig) -> Result<Self> {
        check_key_column(output, context.columns())?;
        let gates = context
            .fields()
            .iter()
            .map(|f| ErrorGate::new(f.config().limits))
            .collect();
        Ok(Self {
            context,
            gates,
            emission: EmissionLimit::new(output.error_limit),
            artifacts: ErrorArtifacts::disabled(),
            key_column: output.key_colnum,
            records: RecordTotals::default(),
            started_at: Utc::now(),
            started: Instant::now(),
        })
    }

    pub fn with_artifacts(mut self, artifacts: ErrorArtifacts) -> Self {
        self.artifacts = artifacts;
        self
    }

    pub fn context(&self) -> &RunContext {
        &self.context
    }

    pub fn records(&self) -> &RecordTotals {
        &self.records
    }

    /// Test one data row and write whatever error output it earns.
    pub fn process_row(&mut self, row: &[String]) -> Result<()> {
        self.records.read += 1;
        let record = self.records.read;
        if record % PROGRESS_INTERVAL == 0 {
            tracing::info!(records = record, "progress");
        }

        let columns = self.context.columns();
        if row.len() != columns {
            return self.bad_record(record, row);
        }

        for (i, value) in row.iter().enumerate() {
            self.context.test_field(i + 1, value, record);
        }

        let flags = self.context.collect_flags();
        let flagged = flags.columns();
        if flagged.is_empty() {
            return Ok(());
        }
        self.records.in_error += 1;

        if !self.artifacts.is_enabled() || !self.emission.allows() {
            return Ok(());
        }

        let key = match self.key_column {
            0 => record.to_string(),
            n => self
                .context
                .field(n)
                .map(|f| f.current_value().to_string())
                .unwrap_or_default(),
        };

        let mut wrote = false;
        let mut approved_columns = Vec::new();
        for column in flagged {
            let bits = flags.bits_for(column);
            let approved = self.gates[column - 1].approve(bits);
            tracing::trace!(
                record,
                column,
                raw = bits.bits(),
                approved = approved.bits(),
                requests = self.gates[column - 1].requests(),
                "approval"
            );
            if approved.is_empty() {
                continue;
            }
            approved_columns.push(column);

            if let (Some(log), Some(field)) = (&mut self.artifacts.log, self.context.field(column)) {
                let config = field.config();
                log.write_field(&LogEntry {
                    key: &key,
                    header: &config.header,
                    test: &config.test.identifier,
                    length: config.length,
                    max_length: config.max_length,
                    failure: &bits.description(),
                    value: field.current_value(),
                })?;
                self.records.log_written += 1;
                wrote = true;
            }
        }

        if !approved_columns.is_empty() {
            if let Some(csv) = &mut self.artifacts.csv {
                csv.write_columns(&approved_columns, row)?;
                self.records.csv_written += 1;
                wrote = true;
            }
        }

        if wrote {
            self.emission.record_written();
            self.records.errors_written += 1;
        }
        Ok(())
    }

    fn bad_record(&mut self, record: u64, row: &[String]) -> Result<()> {
        self.records.bad += 1;
        if !self.artifacts.is_enabled() || !self.emission.allows() {
            return Ok(());
        }

        let message = if row.len() > self.context.columns() {
            format!("Record# {record} has too many columns - skipped")
        } else {
            format!("Record# {record} has too few columns - skipped")
        };
        tracing::warn!(record, fields = row.len(), expected = self.context.columns(), "{message}");

        if let Some(csv) = &mut self.artifacts.csv {
            csv.write_failure(&message, row)?;
            self.records.csv_written += 1;
        }
        if let Some(log) = &mut self.artifacts.log {
            log.write_failure(&message, row)?;
            self.records.log_written += 1;
        }
        self.emission.record_written();
        self.records.errors_written += 1;
        Ok(())
    }

    /// Close the artifacts and capture the final statistics.
    pub fn finish(self, input: Option<InputFingerprint>) -> Result<RunSnapshot> {
        let (error_csv, error_log) = self.artifacts.finish()?;
        let elapsed_ms = self.started.elapsed().as_millis() as u64;
        let snapshot = RunSnapshot::capture(
            &self.context,
            self.records,
            self.started_at,
            elapsed_ms,
            input,
            ArtifactPaths { error_csv, error_log },
        );
        tracing::info!(
            records = snapshot.records.read,
            bad = snapshot.records.bad,
            in_error = snapshot.records.in_error,
            errors_written = snapshot.records.errors_written,
            elapsed_ms,
            "run finished"
        );
        Ok(snapshot)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{ColumnConfig, UserItems};
    use crate::external::ExternalFiles;
    use crate::registry::TestSpec;
    use std::fs;
    use tempfile::TempDir;

    fn context(columns: Vec<ColumnConfig>) -> RunContext {
        let dir = TempDir::new().unwrap();
        let files = ExternalFiles::new(dir.path(), encoding_rs::UTF_8);
        let user = UserItems::default();
        let providers = LookupProviders::new();
        let sources = TestSources {
            user: &user,
            providers: &providers,
            files: &files,
        };
        RunContext::build(columns, TestRegistry::new(), &sources).unwrap()
    }

    fn column(number: usize, test: &str) -> ColumnConfig {
        ColumnConfig::new(number, format!("c{number}"), TestSpec::parse(test).unwrap())
    }

    fn row(values: &[&str]) -> Vec<String> {
        values.iter().map(|s| s.to_string()).collect()
    }

    fn output(limit: Option<u64>) -> OutputConfig {
        OutputConfig {
            output_error_csv: true,
            output_error_log: true,
            error_limit: limit,
            ..OutputConfig::default()
        }
    }

    fn artifacts(dir: &TempDir) -> ErrorArtifacts {
        ErrorArtifacts {
            csv: Some(ErrorCsvWriter::create(dir.path().join("e.csv"), &Default::default()).unwrap()),
            log: Some(ErrorLogWriter::create(dir.path().join("e.log"), encoding_rs::UTF_8).unwrap()),
        }
    }

    #[test]
    fn test_counts_without_artifacts() {
        let ctx = context(vec![column(1, "int"), column(2, "anything")]);
        let mut run = Run::new(ctx, &OutputConfig::default()).unwrap();
        run.process_row(&row(&["1", "a"])).unwrap();
        run.process_row(&row(&["x", "a"])).unwrap();
        run.process_row(&row(&["1"])).unwrap();

        let records = *run.records();
        assert_eq!(records.read, 3);
        assert_eq!(records.bad, 1);
        assert_eq!(records.in_error, 1);
        assert_eq!(records.errors_written, 0);

        let snapshot = run.finish(None).unwrap();
        assert_eq!(snapshot.exit_code(), 1);
        assert_eq!(snapshot.totals.total_fields, 4);
    }

    #[test]
    fn test_error_limit_caps_written_records() {
        let dir = TempDir::new().unwrap();
        let ctx = context(vec![column(1, "int")]);
        let mut run = Run::new(ctx, &output(Some(2))).unwrap().with_artifacts(artifacts(&dir));
        for value in ["a", "b", "c", "d"] {
            run.process_row(&row(&[value])).unwrap();
        }
        run.process_row(&row(&["1", "2"])).unwrap();

        let snapshot = run.finish(None).unwrap();
        assert_eq!(snapshot.records.in_error, 4);
        assert_eq!(snapshot.records.bad, 1);
        assert_eq!(snapshot.records.errors_written, 2);
        assert_eq!(snapshot.records.csv_written, 2);
        assert_eq!(snapshot.records.log_written, 2);

        let log = fs::read_to_string(dir.path().join("e.log")).unwrap();
        assert_eq!(log, "1\tc1\tint\t(0:0)\t(col)\ta\n2\tc1\tint\t(0:0)\t(col)\tb\n");
    }

    #[test]
    fn test_bad_record_output() {
        let dir = TempDir::new().unwrap();
        let ctx = context(vec![column(1, "anything"), column(2, "anything")]);
        let mut run = Run::new(ctx, &output(None)).unwrap().with_artifacts(artifacts(&dir));
        run.process_row(&row(&["a", "b", "c"])).unwrap();
        let snapshot = run.finish(None).unwrap();
        assert_eq!(snapshot.exit_code(), 0);

        let csv = fs::read_to_string(dir.path().join("e.csv")).unwrap();
        assert_eq!(csv, "Record# 1 has too many columns - skipped,a,b,c\n");
        let log = fs::read_to_string(dir.path().join("e.log")).unwrap();
        assert!(log.starts_with("Record# 1 has too many columns - skipped -> "));
    }

    #[test]
    fn test_key_column_and_combined_csv_row() {
        let dir = TempDir::new().unwrap();
        let ctx = context(vec![column(1, "anything"), column(2, "int"), column(3, "int")]);
        let mut out = output(None);
        out.key_colnum = 1;
        let mut run = Run::new(ctx, &out).unwrap().with_artifacts(artifacts(&dir));
        run.process_row(&row(&["id-7", "x", "y"])).unwrap();
        run.finish(None).unwrap();

        let csv = fs::read_to_string(dir.path().join("e.csv")).unwrap();
        assert_eq!(csv, "2 3,id-7,x,y\n");
        let log = fs::read_to_string(dir.path().join("e.log")).unwrap();
        let keys: Vec<&str> = log.lines().map(|l| l.split('\t').next().unwrap()).collect();
        assert_eq!(keys, vec!["id-7", "id-7"]);
    }

    #[test]
    fn test_category_limit_withholds_column() {
        let dir = TempDir::new().unwrap();
        let mut c = column(1, "int");
        c.limits.test = Some(1);
        let ctx = context(vec![c]);
        let mut run = Run::new(ctx, &output(None)).unwrap().with_artifacts(artifacts(&dir));
        run.process_row(&row(&["a"])).unwrap();
        run.process_row(&row(&["b"])).unwrap();
        let snapshot = run.finish(None).unwrap();
        assert_eq!(snapshot.records.in_error, 2);
        assert_eq!(snapshot.records.errors_written, 1);
    }

    #[test]
    fn test_exhausted_test_limit_still_writes_length_errors() {
        let dir = TempDir::new().unwrap();
        let mut c = column(1, "int");
        c.limits.test = Some(1);
        c.length = 2;
        let ctx = context(vec![c]);
        let mut run = Run::new(ctx, &output(None)).unwrap().with_artifacts(artifacts(&dir));
        for value in ["xy", "xz", "5"] {
            run.process_row(&row(&[value])).unwrap();
        }
        let snapshot = run.finish(None).unwrap();
        assert_eq!(snapshot.records.in_error, 3);
        assert_eq!(snapshot.records.errors_written, 2);

        let log = fs::read_to_string(dir.path().join("e.log")).unwrap();
        assert_eq!(log, "1\tc1\tint\t(2:0)\t(col)\txy\n3\tc1\tint\t(2:0)\t(len)\t5\n");
    }

    #[test]
    fn test_empty_artifacts_removed_on_clean_run() {
        let dir = TempDir::new().unwrap();
        let ctx = context(vec![column(1, "anything")]);
        let mut run = Run::new(ctx, &output(None)).unwrap().with_artifacts(artifacts(&dir));
        run.process_row(&row(&["a"])).unwrap();
        let snapshot = run.finish(None).unwrap();
        assert_eq!(snapshot.artifacts, ArtifactPaths::default());
        assert!(!dir.path().join("e.csv").exists());
        assert!(!dir.path().join("e.log").exists());
    }

    #[test]
    fn test_key_column_out_of_range() {
        let ctx = context(vec![column(1, "anything")]);
        let out = OutputConfig {
            key_colnum: 2,
            ..OutputConfig::default()
        };
        assert!(matches!(Run::new(ctx, &out), Err(ProfilerError::Config(_))));
    }
}
