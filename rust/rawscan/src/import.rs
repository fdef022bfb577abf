//! Turning files on disk into [`RawDataFile`]s and their [`Scan`]s.
use indicatif::{
    ParallelProgressIterator,
    ProgressBar,
    ProgressStyle,
};
use rayon::prelude::*;
use std::path::{
    Path,
    PathBuf,
};
use std::sync::Arc;
use std::sync::atomic::{
    AtomicBool,
    Ordering,
};
use std::time::Instant;
use tracing::{
    debug,
    info,
    instrument,
    warn,
};

use crate::config::ImportConfig;
use crate::errors::{
    ImportError,
    ParseError,
};
use crate::models::{
    RawDataFile,
    Scan,
    ScanInfo,
};
use crate::parsers::open_parser;
use crate::traits::ParserHandle;

/// Result of importing one file.
#[derive(Debug)]
pub struct ImportedRawData {
    pub file: Arc<RawDataFile>,
    pub scans: Vec<Scan>,
}

/// Import of a single file. Cancellable from another thread through
/// [`ImportTask::cancel_flag`].
#[derive(Debug, Clone)]
pub struct ImportTask {
    path: PathBuf,
    config: ImportConfig,
    cancelled: Arc<AtomicBool>,
}

impl ImportTask {
    pub fn new(path: impl Into<PathBuf>, config: ImportConfig) -> Self {
        Self {
            path: path.into(),
            config,
            cancelled: Arc::new(AtomicBool::new(false)),
        }
    }

    /// Shares `cancelled` with other tasks, so one store stops all of them.
    pub fn with_cancel_flag(mut self, cancelled: Arc<AtomicBool>) -> Self {
        self.cancelled = cancelled;
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Setting the flag makes `run` stop before the next scan.
    pub fn cancel_flag(&self) -> Arc<AtomicBool> {
        self.cancelled.clone()
    }

    pub fn cancel(&self) {
        self.cancelled.store(true, Ordering::Relaxed);
    }

    #[instrument(skip(self), fields(path = %self.path.display()))]
    pub fn run(&self) -> Result<ImportedRawData, ImportError> {
        let metadata =
            std::fs::metadata(&self.path).map_err(|source| ImportError::Unreadable {
                path: self.path.clone(),
                source,
            })?;
        debug!("Opening {} ({} bytes)", self.path.display(), metadata.len());

        let parser =
            open_parser(&self.path, self.config.format).map_err(|source| match source {
                ParseError::Io(source) => ImportError::Unreadable {
                    path: self.path.clone(),
                    source,
                },
                source => ImportError::Parse {
                    path: self.path.clone(),
                    source,
                },
            })?;

        let name = self
            .path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| self.path.display().to_string());

        import_parser(
            name,
            Some(self.path.clone()),
            parser,
            &self.config,
            &self.cancelled,
        )
    }
}

/// Builds the scans of an already opened parser.
///
/// The parser is closed when the import fails or is cancelled. On success
/// it is owned by the returned [`RawDataFile`].
pub fn import_parser(
    name: String,
    path: Option<PathBuf>,
    mut parser: Box<dyn ParserHandle>,
    config: &ImportConfig,
    cancelled: &AtomicBool,
) -> Result<ImportedRawData, ImportError> {
    let start = Instant::now();
    let err_path = path.clone().unwrap_or_else(|| PathBuf::from(&name));

    let infos = match scan_infos(&mut *parser, config, cancelled, &err_path) {
        Ok(infos) => infos,
        Err(e) => {
            parser.close();
            return Err(e);
        }
    };

    let file = Arc::new(RawDataFile::new(name, path, parser));
    let scans: Vec<Scan> = infos
        .into_iter()
        .map(|(id, info)| Scan::new(file.clone(), id, info))
        .collect();

    info!(
        "Imported {} scans from {} ({}) in {:?}",
        scans.len(),
        file.name(),
        file.format_name(),
        start.elapsed()
    );
    Ok(ImportedRawData { file, scans })
}

fn scan_infos(
    parser: &mut dyn ParserHandle,
    config: &ImportConfig,
    cancelled: &AtomicBool,
    path: &Path,
) -> Result<Vec<(String, ScanInfo)>, ImportError> {
    let to_import_error = |source: ParseError| ImportError::Parse {
        path: path.to_path_buf(),
        source,
    };

    let ids = parser.spectrum_ids().map_err(to_import_error)?;
    let mut out = Vec::with_capacity(ids.len());
    let mut skipped = 0;

    for (position, id) in ids.into_iter().enumerate() {
        if cancelled.load(Ordering::Relaxed) {
            warn!("Import of {} cancelled", path.display());
            return Err(ImportError::Cancelled {
                path: path.to_path_buf(),
                completed: position,
            });
        }

        let native = parser.spectrum_by_id(&id).map_err(to_import_error)?;
        native.check_points().map_err(to_import_error)?;
        if config.skip_empty_spectra && native.points.is_empty() {
            skipped += 1;
            continue;
        }
        out.push((id, ScanInfo::from_native(&native, position)));
    }

    if skipped > 0 {
        debug!("Skipped {} empty spectra in {}", skipped, path.display());
    }
    Ok(out)
}

/// Imports every path in parallel, one result per path in input order.
///
/// All tasks watch `cancelled`: once it is set, files not yet finished
/// come back as [`ImportError::Cancelled`]. Fails as a whole only when the
/// thread pool cannot be built.
pub fn import_files(
    paths: &[PathBuf],
    config: &ImportConfig,
    cancelled: &Arc<AtomicBool>,
) -> Result<Vec<Result<ImportedRawData, ImportError>>, ImportError> {
    config.validate()?;
    let mut builder = rayon::ThreadPoolBuilder::new();
    if let Some(num_threads) = config.num_threads {
        builder = builder.num_threads(num_threads);
    }
    let pool = builder
        .build()
        .map_err(|e| ImportError::Config(e.to_string()))?;

    let progress = if config.show_progress {
        let style = ProgressStyle::with_template(
            "{spinner:.green} [{elapsed_precise}] [{wide_bar:.cyan/blue}] {pos}/{len} ({eta})",
        )
        .unwrap_or_else(|_| ProgressStyle::default_bar());
        ProgressBar::new(paths.len() as u64).with_style(style)
    } else {
        ProgressBar::hidden()
    };

    info!("Importing {} files", paths.len());
    let results: Vec<_> = pool.install(|| {
        paths
            .par_iter()
            .progress_with(progress.clone())
            .map(|path| {
                let res = ImportTask::new(path.clone(), config.clone())
                    .with_cancel_flag(cancelled.clone())
                    .run();
                if let Err(e) = &res {
                    warn!("{}", e);
                }
                res
            })
            .collect()
    });
    progress.finish_and_clear();
    Ok(results)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::ScanAccessError;
    use crate::parsers::InMemoryParser;
    use crate::traits::SpectrumHeader;

    fn parser() -> InMemoryParser {
        let mut parser = InMemoryParser::new();
        parser.push_with_header(
            "scan=10",
            SpectrumHeader {
                scan_number: Some(10),
                retention_time_seconds: Some(12.5),
                ..Default::default()
            },
            vec![(100.0, 5.0), (200.0, 50.0)],
        );
        parser.push_points("scan=11", vec![]);
        parser.push_points("scan=12", vec![(150.0, 2.0)]);
        parser
    }

    #[test]
    fn test_import_builds_scans_in_order() {
        let flag = AtomicBool::new(false);
        let imported = import_parser(
            "mem".into(),
            None,
            Box::new(parser()),
            &ImportConfig::default(),
            &flag,
        )
        .unwrap();
        let numbers: Vec<u32> = imported.scans.iter().map(|s| s.scan_number()).collect();
        assert_eq!(numbers, vec![10, 2, 3]);
        assert_eq!(imported.scans[0].tic(), 55.0);
        assert_eq!(imported.scans[0].chromatography_info().retention_time, Some(12.5));
        assert_eq!(imported.scans[2].data_points().unwrap().len(), 1);
    }

    #[test]
    fn test_skip_empty_spectra() {
        let config = ImportConfig {
            skip_empty_spectra: true,
            ..Default::default()
        };
        let imported = import_parser(
            "mem".into(),
            None,
            Box::new(parser()),
            &config,
            &AtomicBool::new(false),
        )
        .unwrap();
        let ids: Vec<&str> = imported.scans.iter().map(|s| s.spectrum_id()).collect();
        assert_eq!(ids, vec!["scan=10", "scan=12"]);
    }

    #[test]
    fn test_cancelled_import_closes_parser() {
        let parser = parser();
        let closes = parser.close_counter();
        let res = import_parser(
            "mem".into(),
            None,
            Box::new(parser),
            &ImportConfig::default(),
            &AtomicBool::new(true),
        );
        assert!(matches!(res, Err(ImportError::Cancelled { completed: 0, .. })));
        assert_eq!(closes.count(), 1);
    }

    #[test]
    fn test_corrupt_spectrum_fails_import() {
        let mut parser = parser();
        parser.push_corrupt("scan=13", "bad peak line");
        let res = import_parser(
            "mem".into(),
            None,
            Box::new(parser),
            &ImportConfig::default(),
            &AtomicBool::new(false),
        );
        assert!(matches!(res, Err(ImportError::Parse { .. })));
    }

    #[test]
    fn test_negative_intensity_fails_import() {
        let mut parser = parser();
        parser.push_points("scan=13", vec![(100.0, -3.0)]);
        let res = import_parser(
            "mem".into(),
            None,
            Box::new(parser),
            &ImportConfig::default(),
            &AtomicBool::new(false),
        );
        assert!(matches!(
            res,
            Err(ImportError::Parse {
                source: ParseError::InvalidPoint { index: 0, .. },
                ..
            })
        ));
    }

    #[test]
    fn test_dropping_import_disposes_scans() {
        let imported = import_parser(
            "mem".into(),
            None,
            Box::new(parser()),
            &ImportConfig::default(),
            &AtomicBool::new(false),
        )
        .unwrap();
        let scan = imported.scans[0].clone();
        imported.file.dispose();
        assert!(matches!(
            scan.data_points(),
            Err(ScanAccessError::ResourceDisposed { .. })
        ));
    }

    #[test]
    fn test_missing_file_is_unreadable() {
        let task = ImportTask::new("/definitely/not/here.mgf", ImportConfig::default());
        assert!(matches!(task.run(), Err(ImportError::Unreadable { .. })));
    }
}
