use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;

use crate::errors::ImportError;
use crate::parsers::ParserFormat;

/// Settings shared by every file of an import run.
///
/// Serialized as JSON; missing keys take their default value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ImportConfig {
    pub format: ParserFormat,
    /// Do not create scans for spectra with no data points.
    pub skip_empty_spectra: bool,
    /// Worker threads for multi-file imports, `None` uses rayon's default.
    pub num_threads: Option<usize>,
    pub show_progress: bool,
}

impl Default for ImportConfig {
    fn default() -> Self {
        Self {
            format: ParserFormat::Auto,
            skip_empty_spectra: false,
            num_threads: None,
            show_progress: true,
        }
    }
}

impl ImportConfig {
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ImportError> {
        let path = path.as_ref();
        let contents = std::fs::read_to_string(path).map_err(|source| ImportError::Unreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&contents)
    }

    pub fn from_json(contents: &str) -> Result<Self, ImportError> {
        let config: Self =
            serde_json::from_str(contents).map_err(|e| ImportError::Config(e.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ImportError> {
        if self.num_threads == Some(0) {
            return Err(ImportError::Config(
                "num_threads must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_partial_config_uses_defaults() {
        let config = ImportConfig::from_json(r#"{"format": "mgf", "num_threads": 2}"#).unwrap();
        assert_eq!(config.format, ParserFormat::Mgf);
        assert_eq!(config.num_threads, Some(2));
        assert!(config.show_progress);
        assert!(!config.skip_empty_spectra);
    }

    #[test]
    fn test_invalid_configs() {
        assert!(matches!(
            ImportConfig::from_json(r#"{"num_threads": 0}"#),
            Err(ImportError::Config(_))
        ));
        assert!(matches!(
            ImportConfig::from_json(r#"{"format": "mzml"}"#),
            Err(ImportError::Config(_))
        ));
    }

    #[test]
    fn test_default_round_trips_through_json() {
        let json = serde_json::to_string_pretty(&ImportConfig::default()).unwrap();
        assert_eq!(ImportConfig::from_json(&json).unwrap(), ImportConfig::default());
    }
}
