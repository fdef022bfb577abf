//! Bruker timsTOF (`.d` directory) spectra, read through `timsrust`.
//!
//! Only the DDA spectrum view is exposed: one spectrum per precursor, ids are
//! `index=<n>` with `n` the timsrust spectrum index.
use std::path::{
    Path,
    PathBuf,
};
use timsrust::readers::SpectrumReader;
use tracing::debug;

use crate::errors::ParseError;
use crate::models::scan_metadata::{
    ActivationInfo,
    ActivationType,
    IsolationInfo,
    MsSpectrumType,
    PolarityType,
};
use crate::traits::{
    NativeSpectrum,
    ParserHandle,
    SpectrumHeader,
};

const ID_PREFIX: &str = "index=";

pub struct TdfParser {
    path: PathBuf,
    reader: Option<SpectrumReader>,
    num_spectra: usize,
}

impl TdfParser {
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ParseError> {
        let path = path.as_ref().to_path_buf();
        let reader = SpectrumReader::new(&path).map_err(|e| ParseError::Backend(e.to_string()))?;
        let num_spectra = reader.len();
        debug!("Opened {} with {} spectra", path.display(), num_spectra);
        Ok(Self {
            path,
            reader: Some(reader),
            num_spectra,
        })
    }

    fn parse_id(&self, id: &str) -> Option<usize> {
        let idx: usize = id.strip_prefix(ID_PREFIX)?.parse().ok()?;
        (idx < self.num_spectra).then_some(idx)
    }
}

impl ParserHandle for TdfParser {
    fn format_name(&self) -> &'static str {
        "tdf"
    }

    fn spectrum_ids(&mut self) -> Result<Vec<String>, ParseError> {
        Ok((0..self.num_spectra)
            .map(|i| format!("{}{}", ID_PREFIX, i))
            .collect())
    }

    fn spectrum_by_id(&mut self, id: &str) -> Result<NativeSpectrum, ParseError> {
        let idx = self
            .parse_id(id)
            .ok_or_else(|| ParseError::UnknownSpectrum(id.to_string()))?;
        let reader = self
            .reader
            .as_ref()
            .ok_or_else(|| ParseError::Backend(format!("{} is closed", self.path.display())))?;
        let spectrum = reader
            .get(idx)
            .map_err(|e| ParseError::Backend(e.to_string()))?;

        let points = spectrum
            .mz_values
            .iter()
            .copied()
            .zip(spectrum.intensities.iter().copied())
            .collect();

        let activation = ActivationInfo {
            activation_type: ActivationType::Cid,
            activation_energy: Some(spectrum.collision_energy),
        };
        let isolation =
            IsolationInfo::centered(spectrum.isolation_mz, spectrum.isolation_width, None)
                .map(|iso| IsolationInfo {
                    activation_info: Some(activation),
                    ..iso
                });

        let header = SpectrumHeader {
            title: Some(id.to_string()),
            scan_number: Some(idx as u32 + 1),
            ms_level: Some(2),
            spectrum_type: Some(MsSpectrumType::Centroided),
            polarity: Some(PolarityType::Unknown),
            isolations: isolation.into_iter().collect(),
            ..Default::default()
        };

        Ok(NativeSpectrum { header, points })
    }

    fn close(&mut self) {
        self.reader = None;
    }
}
