use rawscan::errors::{
    ImportError,
    PatternError,
    ScanAccessError,
};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum CliError {
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Import(#[from] ImportError),

    #[error("Scan access error: {0}")]
    ScanAccess(#[from] ScanAccessError),

    #[error(transparent)]
    Pattern(#[from] PatternError),

    #[error("No scan {scan} in {file}")]
    ScanNotFound { file: String, scan: String },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}
