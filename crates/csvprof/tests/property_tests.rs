//! Property-based tests for csvprof predicates and error accounting.
//!
//! Property-based tests verify:
//! 1. **No panics**: tests and literal parsing never crash on any input
//! 2. **Inclusivity**: range bounds accept both endpoints
//! 3. **Accounting**: per-column counters always add up to the rows seen
//!
//! # Running Property Tests
//!
//! ```bash
//! cargo test -p csvprof --test property_tests
//! PROPTEST_CASES=10000 cargo test -p csvprof --test property_tests
//! ```

use proptest::prelude::*;

use csvprof::accounting::{ErrorBits, ErrorGate};
use csvprof::config::{CategoryLimits, ColumnConfig, UserItems};
use csvprof::external::ExternalFiles;
use csvprof::predicate::{LookupProviders, RangeTest};
use csvprof::registry::TestSources;
use csvprof::{OutputConfig, Run, RunContext, TestRegistry, TestSpec};

// =============================================================================
// Test Strategies
// =============================================================================

/// Field values as they show up in real files, plus noise.
fn field_value() -> impl Strategy<Value = String> {
    prop_oneof![
        "-?[0-9]{1,12}",
        "-?[0-9]{1,6}\\.[0-9]{0,6}",
        "[0-9]{4}-[0-9]{2}-[0-9]{2}",
        "[0-9]{1,2}/[0-9]{1,2}/[0-9]{4}",
        " *[A-Za-z ]{0,20} *",
        "\\PC{0,30}",
        Just(String::new()),
    ]
}

/// Range literals, well-formed or not.
fn range_literal() -> impl Strategy<Value = String> {
    prop_oneof![
        (any::<i32>(), any::<i32>()).prop_map(|(a, b)| format!("range({a}:{b})")),
        (-1e6f64..1e6, -1e6f64..1e6).prop_map(|(a, b)| format!("range({a:.3}:{b:.3})")),
        "range\\(d[0-9]{8}:d[0-9]{8}\\)",
        "range\\([^)]{0,12}\\)",
        "\\PC{0,20}",
    ]
}

fn error_bits() -> impl Strategy<Value = ErrorBits> {
    (any::<bool>(), any::<bool>(), any::<bool>(), any::<bool>()).prop_map(|(t, b, l, m)| {
        let mut bits = ErrorBits::NONE;
        for (on, bit) in [
            (t, ErrorBits::TEST),
            (b, ErrorBits::BLANK),
            (l, ErrorBits::LENGTH),
            (m, ErrorBits::MAX_LENGTH),
        ] {
            if on {
                bits.insert(bit);
            }
        }
        bits
    })
}

fn context(columns: Vec<ColumnConfig>) -> RunContext {
    let dir = tempfile::TempDir::new().unwrap();
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

// =============================================================================
// Predicates
// =============================================================================

proptest! {
    #[test]
    fn prop_range_parse_never_panics(literal in range_literal()) {
        let _ = RangeTest::parse(&literal);
    }

    #[test]
    fn prop_range_test_never_panics(literal in range_literal(), value in field_value()) {
        if let Ok(range) = RangeTest::parse(&literal) {
            let _ = range.test(&value);
        }
    }

    #[test]
    fn prop_int_range_is_inclusive(a in -1_000_000i64..1_000_000, b in -1_000_000i64..1_000_000) {
        let (from, to) = (a.min(b), a.max(b));
        let range = RangeTest::parse(&format!("range({from}:{to})")).unwrap();
        prop_assert!(range.test(&from.to_string()));
        prop_assert!(range.test(&to.to_string()));
        prop_assert!(!range.test(&(to + 1).to_string()));
        prop_assert!(!range.test(&(from - 1).to_string()));
    }

    #[test]
    fn prop_builtin_tests_never_panic(value in field_value()) {
        let registry = TestRegistry::new();
        for (_, predicate) in registry.iter() {
            let _ = predicate.test(&value);
        }
    }

    #[test]
    fn prop_nothing_accepts_only_empty(value in field_value()) {
        let registry = TestRegistry::new();
        let nothing = registry.get("nothing").unwrap();
        let something = registry.get("something").unwrap();
        prop_assert_eq!(nothing.test(&value), value.is_empty());
        prop_assert_eq!(something.test(&value), !value.is_empty());
    }
}

// =============================================================================
// Accounting
// =============================================================================

proptest! {
    #[test]
    fn prop_gate_only_removes_bits(
        requests in proptest::collection::vec(error_bits(), 1..50),
        test in proptest::option::of(0u64..5),
        length in proptest::option::of(0u64..5),
        blank in proptest::option::of(0u64..5),
    ) {
        let mut gate = ErrorGate::new(CategoryLimits { test, length, blank });
        let mut approved_tests = 0u64;
        for bits in requests {
            let approved = gate.approve(bits);
            prop_assert_eq!(approved.bits() & !bits.bits(), 0);
            if approved.contains(ErrorBits::TEST) {
                approved_tests += 1;
            }
        }
        if let Some(limit) = test {
            prop_assert!(approved_tests <= limit);
        }
    }

    #[test]
    fn prop_column_counts_cover_every_row(
        values in proptest::collection::vec(field_value(), 0..100),
        length in 0usize..4,
    ) {
        let mut config = ColumnConfig::new(1, "n", TestSpec::parse("int").unwrap());
        config.length = length;
        config.strip = true;
        let mut run = Run::new(context(vec![config]), &OutputConfig::default()).unwrap();
        for value in &values {
            run.process_row(&[value.clone()]).unwrap();
        }

        let stats = run.context().tally().stats(1).unwrap();
        prop_assert_eq!(stats.passed + stats.failed + stats.blank, values.len() as u64);
        prop_assert!(stats.length_errors <= stats.failed);
        prop_assert_eq!(run.records().read, values.len() as u64);
    }

    #[test]
    fn prop_error_limit_caps_output(
        rows in proptest::collection::vec(
            proptest::collection::vec(field_value(), 1..4),
            0..60,
        ),
        limit in proptest::option::of(0u64..10),
    ) {
        let dir = tempfile::TempDir::new().unwrap();
        let columns = vec![
            ColumnConfig::new(1, "a", TestSpec::parse("int").unwrap()),
            ColumnConfig::new(2, "b", TestSpec::parse("isalpha").unwrap()),
        ];
        let output = OutputConfig {
            output_error_csv: true,
            output_error_log: true,
            error_limit: limit,
            ..OutputConfig::default()
        };
        let artifacts = csvprof::accounting::ErrorArtifacts {
            csv: Some(
                csvprof::accounting::ErrorCsvWriter::create(dir.path().join("e.csv"), &Default::default())
                    .unwrap(),
            ),
            log: Some(
                csvprof::accounting::ErrorLogWriter::create(dir.path().join("e.log"), encoding_rs::UTF_8)
                    .unwrap(),
            ),
        };
        let mut run = Run::new(context(columns), &output).unwrap().with_artifacts(artifacts);
        for row in &rows {
            run.process_row(row).unwrap();
        }

        let records = *run.records();
        prop_assert!(records.errors_written <= records.in_error + records.bad);
        prop_assert!(records.csv_written <= records.errors_written);
        if let Some(limit) = limit {
            prop_assert!(records.errors_written <= limit);
        }
    }
}
