//! Error types for the csvprof library.
//!
//! Only configuration and I/O problems are errors. Data problems found while
//! rows are processed are outcomes recorded in statistics, never `Err`.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for csvprof operations.
#[derive(Debug, Error)]
pub enum ProfilerError {
    /// Error reading or accessing a file.
    #[error("IO error for '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Error from the CSV library.
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),

    /// Malformed TOML run configuration.
    #[error("TOML error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON serialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// A regex test failed to compile.
    #[error("bad regex for test '{test}': {source}")]
    Regex {
        test: String,
        #[source]
        source: regex::Error,
    },

    /// General configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Configuration error tied to one parameter column.
    #[error("Column #{column} {header}: {message}")]
    Column {
        column: usize,
        header: String,
        message: String,
    },

    /// Malformed `range(<from>:<to>)` literal.
    #[error("Incorrect range option \"{literal}\": {message}")]
    Range { literal: String, message: String },

    /// Cross-check group definition problem.
    #[error("{group}: {message}")]
    Xcheck { group: String, message: String },

    /// External lookup, regex or xcheck file problem.
    #[error("external file {path}: {message}")]
    ExternalFile { path: PathBuf, message: String },

    /// Header row length differs from the parameter definition.
    #[error("Params header list length ({expected}) does not match input CSV header ({found})")]
    HeaderMismatch { expected: usize, found: usize },

    /// Named test not present in the registry.
    #[error("Named test \"{name}\" not found - field #{column}")]
    UnknownTest { column: usize, name: String },

    /// Lookup provider binding failed.
    #[error("lookup provider '{name}': {message}")]
    Provider { name: String, message: String },
}

impl ProfilerError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        ProfilerError::Io {
            path: path.into(),
            source,
        }
    }

    pub(crate) fn xcheck(group: impl Into<String>, message: impl Into<String>) -> Self {
        ProfilerError::Xcheck {
            group: group.into(),
            message: message.into(),
        }
    }
}

/// Result type alias for csvprof operations.
pub type Result<T> = std::result::Result<T, ProfilerError>;
