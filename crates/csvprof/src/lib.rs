//! csvprof: column-level validation and profiling for delimited files.
//!
//! A parameter grid assigns every column a test (a built-in name, a regex,
//! a lookup list, a numeric or date range, or a cross-check spanning several
//! columns) plus length, blank and profiling options. Each row of the input
//! is tested column by column; failures are counted, limited per column and
//! per run, and written to optional error artifacts. The run ends with a
//! [`RunSnapshot`] of every counter and profile.
//!
//! # Example
//!
//! ```no_run
//! use csvprof::{Profiler, RunConfig};
//!
//! let config = RunConfig::load("csvprof.toml").unwrap();
//! let snapshot = Profiler::new(config).run().unwrap();
//!
//! println!("records read: {}", snapshot.records.read);
//! std::process::exit(snapshot.exit_code());
//! ```

pub mod accounting;
pub mod config;
pub mod context;
pub mod error;
pub mod external;
pub mod field;
pub mod input;
pub mod predicate;
pub mod profile;
pub mod profiler;
pub mod registry;
pub mod snapshot;
pub mod xcheck;

pub use config::{ColumnConfig, Dialect, OutputConfig, ProfileMode, RunConfig, UserItem};
pub use context::RunContext;
pub use error::{ProfilerError, Result};
pub use field::{FieldOutcome, FieldStats, GrandTotals};
pub use predicate::{LookupProvider, LookupProviders, Predicate};
pub use profiler::{Profiler, Run};
pub use registry::{TestKind, TestRegistry, TestSpec};
pub use snapshot::{RecordTotals, RunSnapshot};
