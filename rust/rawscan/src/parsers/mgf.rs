//! Mascot Generic Format (MGF) spectra, read through `mzdata`.
//!
//! Opening builds `mzdata`'s byte offset index of the file. Peaks are read
//! from disk every time a spectrum is requested. Ids are the keys of that
//! index (the block titles), so they are unique within a file.
use mzdata::io::MGFReader;
use mzdata::prelude::*;
use mzdata::spectrum::{
    MultiLayerSpectrum,
    RefPeakDataLevel,
    ScanPolarity,
    SignalContinuity,
};
use std::collections::HashMap;
use std::fs::File;
use std::path::{
    Path,
    PathBuf,
};
use tracing::debug;

use crate::errors::ParseError;
use crate::models::scan_metadata::{
    IsolationInfo,
    MsSpectrumType,
    PolarityType,
};
use crate::traits::{
    NativeSpectrum,
    ParserHandle,
    SpectrumHeader,
};

pub struct MgfParser {
    path: PathBuf,
    reader: Option<MGFReader<File>>,
    ids: Vec<String>,
    positions: HashMap<String, usize>,
}

impl MgfParser {
    /// Opens and indexes an MGF file.
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref().to_path_buf();
        let reader = MGFReader::new_indexed(File::open(&path)?);

        let index = reader.get_index();
        let mut ids = Vec::with_capacity(index.len());
        for i in 0..index.len() {
            if let Some((id, _offset)) = index.get_index(i) {
                ids.push(id.to_string());
            }
        }
        let positions: HashMap<String, usize> = ids
            .iter()
            .enumerate()
            .map(|(i, id)| (id.clone(), i))
            .collect();
        debug!("Indexed {} MGF spectra in {}", ids.len(), path.display());

        Ok(Self {
            path,
            reader: Some(reader),
            ids,
            positions,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }
}

impl ParserHandle for MgfParser {
    fn format_name(&self) -> &'static str {
        "mgf"
    }

    fn spectrum_ids(&mut self) -> Result<Vec<String>, ParseError> {
        Ok(self.ids.clone())
    }

    fn spectrum_by_id(&mut self, id: &str) -> Result<NativeSpectrum, ParseError> {
        let position = *self
            .positions
            .get(id)
            .ok_or_else(|| ParseError::UnknownSpectrum(id.to_string()))?;
        let reader = self
            .reader
            .as_mut()
            .ok_or_else(|| ParseError::Backend(format!("{} is closed", self.path.display())))?;
        let spectrum = reader.get_spectrum_by_index(position).ok_or_else(|| {
            ParseError::Backend(format!(
                "cannot read spectrum '{}' from {}",
                id,
                self.path.display()
            ))
        })?;

        Ok(NativeSpectrum {
            header: spectrum_header(&spectrum),
            points: native_points(&spectrum)?,
        })
    }

    fn close(&mut self) {
        self.reader = None;
    }
}

fn backend(e: impl std::fmt::Display) -> ParseError {
    ParseError::Backend(e.to_string())
}

fn native_points(spectrum: &MultiLayerSpectrum) -> Result<Vec<(f64, f64)>, ParseError> {
    match spectrum.peaks() {
        RefPeakDataLevel::Missing => Ok(Vec::new()),
        RefPeakDataLevel::Centroid(peaks) => Ok(peaks
            .iter()
            .map(|p| (p.mz, p.intensity as f64))
            .collect()),
        RefPeakDataLevel::RawData(arrays) => {
            let mzs = arrays.mzs().map_err(backend)?;
            let intensities = arrays.intensities().map_err(backend)?;
            Ok(mzs
                .iter()
                .copied()
                .zip(intensities.iter().map(|&x| x as f64))
                .collect())
        }
        RefPeakDataLevel::Deconvoluted(_) => Err(ParseError::Backend(format!(
            "spectrum '{}' only holds deconvoluted peaks",
            spectrum.id()
        ))),
    }
}

fn spectrum_header(spectrum: &MultiLayerSpectrum) -> SpectrumHeader {
    let isolations = spectrum
        .precursor()
        .and_then(|precursor| IsolationInfo::centered(precursor.mz(), 0.0, precursor.charge()))
        .into_iter()
        .collect();

    let polarity = match spectrum.polarity() {
        ScanPolarity::Positive => PolarityType::Positive,
        ScanPolarity::Negative => PolarityType::Negative,
        _ => PolarityType::Unknown,
    };
    // MGF peak lists are centroids unless the reader says otherwise
    let spectrum_type = match spectrum.signal_continuity() {
        SignalContinuity::Profile => MsSpectrumType::Profile,
        _ => MsSpectrumType::Centroided,
    };

    SpectrumHeader {
        title: Some(spectrum.id().to_string()),
        scan_number: u32::try_from(spectrum.index() + 1).ok(),
        ms_level: Some(spectrum.ms_level()),
        spectrum_type: Some(spectrum_type),
        polarity: Some(polarity),
        // mzdata keeps start times in minutes
        retention_time_seconds: Some((spectrum.start_time() * 60.0) as f32),
        isolations,
        ..Default::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    fn write_tmp(name: &str, contents: &str) -> PathBuf {
        let dir = std::env::temp_dir().join("rawscan_mgf_tests");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join(name);
        let mut f = File::create(&path).unwrap();
        f.write_all(contents.as_bytes()).unwrap();
        path
    }

    const TWO_SPECTRA: &str = "BEGIN IONS\n\
TITLE=first\n\
PEPMASS=445.12 10000\n\
CHARGE=2+\n\
RTINSECONDS=60.5\n\
100.0 5.0\n\
200.0 50.0\n\
300.0 1.0\n\
END IONS\n\
\n\
BEGIN IONS\n\
TITLE=second\n\
PEPMASS=512.3\n\
RTINSECONDS=61\n\
150.5 7\n\
END IONS\n";

    #[test]
    fn test_index_and_read() {
        let path = write_tmp("two.mgf", TWO_SPECTRA);
        let mut parser = MgfParser::open(&path).unwrap();
        assert_eq!(parser.len(), 2);
        assert_eq!(parser.spectrum_ids().unwrap(), vec!["first", "second"]);

        let first = parser.spectrum_by_id("first").unwrap();
        assert_eq!(first.points, vec![(100.0, 5.0), (200.0, 50.0), (300.0, 1.0)]);
        assert_eq!(first.header.title.as_deref(), Some("first"));
        assert_eq!(first.header.scan_number, Some(1));
        assert_eq!(first.header.ms_level, Some(2));
        let rt = first.header.retention_time_seconds.unwrap();
        assert!((rt - 60.5).abs() < 1e-3, "{}", rt);
        assert_eq!(first.header.isolations[0].precursor_mz, Some(445.12));
        assert_eq!(first.header.isolations[0].precursor_charge, Some(2));

        let second = parser.spectrum_by_id("second").unwrap();
        assert_eq!(second.points, vec![(150.5, 7.0)]);
        assert_eq!(second.header.scan_number, Some(2));

        // Reads are repeatable, every call goes back to disk
        assert_eq!(parser.spectrum_by_id("first").unwrap(), first);
        assert!(matches!(
            parser.spectrum_by_id("third"),
            Err(ParseError::UnknownSpectrum(_))
        ));
    }

    #[test]
    fn test_scientific_notation_retention_time() {
        let path = write_tmp(
            "sci_rt.mgf",
            "BEGIN IONS\nTITLE=x\nPEPMASS=300.0\nRTINSECONDS=1.5e-01\n100.0 1.0\nEND IONS\n",
        );
        let mut parser = MgfParser::open(&path).unwrap();
        let spectrum = parser.spectrum_by_id("x").unwrap();
        let rt = spectrum.header.retention_time_seconds.unwrap();
        assert!((rt - 0.15).abs() < 1e-4, "{}", rt);
        assert_eq!(spectrum.points, vec![(100.0, 1.0)]);
    }

    #[test]
    fn test_ids_are_unique() {
        let path = write_tmp(
            "dup.mgf",
            "BEGIN IONS\nTITLE=index=1\n1 1\nEND IONS\n\
BEGIN IONS\nTITLE=x\n2 2\nEND IONS\n\
BEGIN IONS\nTITLE=x\n3 3\nEND IONS\n",
        );
        let mut parser = MgfParser::open(&path).unwrap();
        let ids = parser.spectrum_ids().unwrap();
        let unique: std::collections::HashSet<&String> = ids.iter().collect();
        assert_eq!(unique.len(), ids.len());
        assert!(ids.iter().any(|id| id == "index=1"));
        for id in &ids {
            assert!(parser.spectrum_by_id(id).is_ok(), "{}", id);
        }
    }

    #[test]
    fn test_negative_intensity_fails_point_check() {
        let path = write_tmp("neg.mgf", "BEGIN IONS\nTITLE=neg\n100.0 -1.0\nEND IONS\n");
        let mut parser = MgfParser::open(&path).unwrap();
        let spectrum = parser.spectrum_by_id("neg").unwrap();
        assert!(matches!(
            spectrum.check_points(),
            Err(ParseError::InvalidPoint { index: 0, .. })
        ));
    }

    #[test]
    fn test_closed_parser_errors() {
        let path = write_tmp("closed.mgf", TWO_SPECTRA);
        let mut parser = MgfParser::open(&path).unwrap();
        parser.close();
        assert!(matches!(
            parser.spectrum_by_id("first"),
            Err(ParseError::Backend(_))
        ));
    }
}
