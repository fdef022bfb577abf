use std::collections::TryReserveError;
use std::path::PathBuf;
use thiserror::Error;

/// Failure of a single extraction call on a scan.
#[derive(Error, Debug)]
pub enum ScanAccessError {
    /// The parser handle of the file was released. Disposal is permanent,
    /// retrying will fail the same way.
    #[error("The raw data file '{file}' has been disposed")]
    ResourceDisposed { file: String },

    #[error(transparent)]
    Parse(#[from] ParseError),

    #[error(transparent)]
    Allocation(#[from] AllocationError),
}

pub type Result<T> = std::result::Result<T, ScanAccessError>;

/// Diagnostics coming out of a format parser.
#[derive(Error, Debug)]
pub enum ParseError {
    #[error("Unknown spectrum identifier '{0}'")]
    UnknownSpectrum(String),

    #[error("Malformed input at line {line}: {reason}")]
    Malformed { line: usize, reason: String },

    #[error("Invalid data point #{index} ({mz}, {intensity})")]
    InvalidPoint { index: usize, mz: f64, intensity: f64 },

    #[error("Unsupported data format for {}: {reason}", path.display())]
    UnsupportedFormat { path: PathBuf, reason: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Errors raised by a third-party reader, kept as their message.
    #[error("Reader backend error: {0}")]
    Backend(String),
}

impl ParseError {
    pub fn malformed(line: usize, reason: impl std::fmt::Display) -> Self {
        Self::Malformed {
            line,
            reason: reason.to_string(),
        }
    }
}

#[derive(Error, Debug)]
#[error("Unable to grow data point buffer to {requested} points: {source}")]
pub struct AllocationError {
    pub requested: usize,
    #[source]
    pub source: TryReserveError,
}

/// Failures of a file import task.
#[derive(Error, Debug)]
pub enum ImportError {
    #[error("Cannot read file {}: {source}", path.display())]
    Unreadable {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: ParseError,
    },

    #[error("Import of {} was cancelled after {completed} scans", path.display())]
    Cancelled { path: PathBuf, completed: usize },

    #[error("Invalid import configuration: {0}")]
    Config(String),
}

/// A file name wildcard that could not be turned into a regex.
#[derive(Error, Debug)]
#[error("Invalid file name pattern '{pattern}': {source}")]
pub struct PatternError {
    pub pattern: String,
    #[source]
    pub source: regex::Error,
}
