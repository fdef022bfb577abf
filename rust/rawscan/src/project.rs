use regex::Regex;
use std::sync::{
    Arc,
    PoisonError,
    RwLock,
};
use tracing::info;

use crate::errors::PatternError;
use crate::import::ImportedRawData;
use crate::models::{
    RawDataFile,
    Scan,
};

/// Thread safe collection of imported files, fed by import tasks.
#[derive(Debug, Default)]
pub struct Project {
    files: RwLock<Vec<ImportedRawData>>,
}

impl Project {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, data: ImportedRawData) {
        info!("Adding {} to the project", data.file.name());
        self.files
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(data);
    }

    pub fn len(&self) -> usize {
        self.files.read().unwrap_or_else(PoisonError::into_inner).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Files in the order they were added.
    pub fn raw_data_files(&self) -> Vec<Arc<RawDataFile>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .map(|d| d.file.clone())
            .collect()
    }

    pub fn scans(&self, file_name: &str) -> Option<Vec<Scan>> {
        self.files
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .iter()
            .find(|d| d.file.name() == file_name)
            .map(|d| d.scans.clone())
    }

    /// Removes a file from the project and disposes it. Scans still held
    /// elsewhere fail from then on.
    pub fn remove(&self, file_name: &str) -> bool {
        let mut files = self.files.write().unwrap_or_else(PoisonError::into_inner);
        match files.iter().position(|d| d.file.name() == file_name) {
            Some(pos) => {
                let removed = files.remove(pos);
                drop(files);
                removed.file.dispose();
                true
            }
            None => false,
        }
    }
}

/// Which files of a project an operation applies to.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawDataFilesSelection {
    All,
    Specific(Vec<String>),
    /// Shell style wildcard (`*`, `?`) matched against the whole file name.
    NamePattern(String),
}

impl RawDataFilesSelection {
    pub fn matching_files(&self, project: &Project) -> Result<Vec<Arc<RawDataFile>>, PatternError> {
        let files = project.raw_data_files();
        let out = match self {
            Self::All => files,
            Self::Specific(names) => files
                .into_iter()
                .filter(|f| names.iter().any(|n| n == f.name()))
                .collect(),
            Self::NamePattern(pattern) if pattern.is_empty() => Vec::new(),
            Self::NamePattern(pattern) => {
                let re = wildcard_regex(pattern)?;
                files.into_iter().filter(|f| re.is_match(f.name())).collect()
            }
        };
        Ok(out)
    }
}

fn wildcard_regex(pattern: &str) -> Result<Regex, PatternError> {
    let body = regex::escape(pattern).replace(r"\*", ".*").replace(r"\?", ".");
    Regex::new(&format!("^{}$", body)).map_err(|source| PatternError {
        pattern: pattern.to_string(),
        source,
    })
}
