pub mod in_memory;
pub mod mgf;
#[cfg(feature = "tdf")]
pub mod tdf;

pub use in_memory::InMemoryParser;
pub use mgf::MgfParser;
#[cfg(feature = "tdf")]
pub use tdf::TdfParser;

use mzdata::io::{
    infer_format,
    MassSpectrometryFormat,
};
use serde::{
    Deserialize,
    Serialize,
};
use std::path::Path;

use crate::errors::ParseError;
use crate::traits::ParserHandle;

/// Which parser to open a raw file with.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParserFormat {
    /// Decide from the file name, then from its first bytes.
    #[default]
    Auto,
    Mgf,
    /// Bruker timsTOF `.d` directories (needs the `tdf` feature).
    Tdf,
}

impl ParserFormat {
    /// Infers the format of `path`.
    ///
    /// `.d` directories are Bruker data. Anything else goes through
    /// `mzdata`'s inference, which looks at the extension and falls back to
    /// sniffing the content.
    pub fn detect(path: &Path) -> Result<Self, ParseError> {
        let is_bruker = path
            .extension()
            .is_some_and(|ext| ext.eq_ignore_ascii_case("d"));
        if is_bruker {
            return Ok(Self::Tdf);
        }

        let unsupported = |reason: String| ParseError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason,
        };
        match infer_format(path)? {
            (MassSpectrometryFormat::MGF, false) => Ok(Self::Mgf),
            (format, true) => Err(unsupported(format!(
                "gzipped {} files are not supported",
                format
            ))),
            (MassSpectrometryFormat::Unknown, false) => {
                Err(unsupported("cannot determine the file type".to_string()))
            }
            (format, false) => Err(unsupported(format!("{} files are not supported", format))),
        }
    }

    /// Resolves `Auto` against a path, other variants are returned as is.
    pub fn resolve(self, path: &Path) -> Result<Self, ParseError> {
        match self {
            Self::Auto => Self::detect(path),
            other => Ok(other),
        }
    }
}

/// Opens `path` with the parser for `format`.
pub fn open_parser(
    path: &Path,
    format: ParserFormat,
) -> Result<Box<dyn ParserHandle>, ParseError> {
    match format.resolve(path)? {
        ParserFormat::Mgf => Ok(Box::new(MgfParser::open(path)?)),
        #[cfg(feature = "tdf")]
        ParserFormat::Tdf => Ok(Box::new(TdfParser::open(path)?)),
        #[cfg(not(feature = "tdf"))]
        ParserFormat::Tdf => Err(ParseError::UnsupportedFormat {
            path: path.to_path_buf(),
            reason: "built without the `tdf` feature".to_string(),
        }),
        ParserFormat::Auto => unreachable!("resolve never returns Auto"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    fn write_tmp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("rawscan_format_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        std::fs::write(&path, contents).unwrap();
        path
    }

    #[test]
    fn test_detect_format() {
        assert_eq!(
            ParserFormat::detect(Path::new("a/b/run.MGF")).unwrap(),
            ParserFormat::Mgf
        );
        assert_eq!(
            ParserFormat::detect(Path::new("a/b/run.d")).unwrap(),
            ParserFormat::Tdf
        );
        assert_eq!(
            ParserFormat::Mgf.resolve(Path::new("whatever.txt")).unwrap(),
            ParserFormat::Mgf
        );
    }

    #[test]
    fn test_detect_from_content() {
        let path = write_tmp("peaks.txt", "BEGIN IONS\nTITLE=a\n100.0 1.0\nEND IONS\n");
        assert_eq!(ParserFormat::detect(&path).unwrap(), ParserFormat::Mgf);
    }

    #[test]
    fn test_gzipped_mgf_is_unsupported() {
        assert!(matches!(
            ParserFormat::detect(Path::new("run.mgf.gz")),
            Err(ParseError::UnsupportedFormat { .. })
        ));
    }

    #[test]
    fn test_unknown_content_is_unsupported() {
        let path = write_tmp("file.xyz", "just some text\n");
        let res = open_parser(&path, ParserFormat::Auto);
        assert!(matches!(res, Err(ParseError::UnsupportedFormat { .. })));

        let missing = open_parser(Path::new("/definitely/not/here.xyz"), ParserFormat::Auto);
        assert!(matches!(missing, Err(ParseError::Io(_))));
    }
}
