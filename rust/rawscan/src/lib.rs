#![doc = include_str!("../README.md")]

// Re-export main structures
pub use crate::config::ImportConfig;
pub use crate::import::{
    ImportTask,
    ImportedRawData,
    import_files,
};
pub use crate::models::{
    DataPointList,
    PeakListColumn,
    PeakListRow,
    RawDataFile,
    Scan,
    ScanInfo,
};
pub use crate::parsers::{
    InMemoryParser,
    MgfParser,
    ParserFormat,
    open_parser,
};
#[cfg(feature = "tdf")]
pub use crate::parsers::TdfParser;
pub use crate::project::{
    Project,
    RawDataFilesSelection,
};

// Re-export traits
pub use crate::traits::{
    NativeSpectrum,
    ParserHandle,
    SpectrumHeader,
};

// Declare modules
pub mod config;
pub mod errors;
pub mod import;
pub mod models;
pub mod parsers;
pub mod project;
pub mod traits;
pub mod utils;
pub use crate::utils::TupleRange;

// Re-export errors
pub use crate::errors::{
    AllocationError,
    ImportError,
    ParseError,
    PatternError,
    Result,
    ScanAccessError,
};
