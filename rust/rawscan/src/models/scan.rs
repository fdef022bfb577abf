use serde::{
    Deserialize,
    Serialize,
};
use std::num::NonZeroU32;
use std::sync::Arc;

use crate::errors::Result;
use crate::models::data_point_list::DataPointList;
use crate::models::raw_data_file::RawDataFile;
use crate::models::scan_metadata::{
    ActivationInfo,
    ChromatographyInfo,
    IsolationInfo,
    MsFunction,
    MsScanType,
    MsSpectrumType,
    PolarityType,
};
use crate::traits::{
    NativeSpectrum,
    SpectrumHeader,
};
use crate::utils::TupleRange;

/// Immutable description of a scan. Everything a [`Scan`] knows except
/// its data points.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScanInfo {
    pub spectrum_type: MsSpectrumType,
    pub ms_function: MsFunction,
    pub chromatography_info: ChromatographyInfo,
    pub scan_type: MsScanType,
    pub mz_range: Option<TupleRange<f64>>,
    pub scanning_range: Option<TupleRange<f64>>,
    pub scan_number: NonZeroU32,
    pub scan_definition: Option<String>,
    pub tic: f32,
    pub polarity: PolarityType,
    pub source_fragmentation: Option<ActivationInfo>,
    pub isolations: Vec<IsolationInfo>,
}

impl ScanInfo {
    /// Builds the scan description out of a parsed spectrum.
    ///
    /// `position` is the 0-based position of the spectrum in the file, used
    /// as scan number when the format has none. The TIC comes from the
    /// header when present, otherwise it is summed from the native points.
    pub fn from_native(native: &NativeSpectrum, position: usize) -> Self {
        let header: &SpectrumHeader = &native.header;
        let scan_number = header
            .scan_number
            .and_then(NonZeroU32::new)
            .unwrap_or_else(|| {
                let fallback = u32::try_from(position.saturating_add(1)).unwrap_or(u32::MAX);
                NonZeroU32::new(fallback).unwrap_or(NonZeroU32::MIN)
            });

        let tic = header
            .total_ion_current
            .unwrap_or_else(|| native.total_intensity() as f32);

        let mz_range = native
            .points
            .iter()
            .map(|(mz, _)| *mz)
            .fold(None, |acc: Option<(f64, f64)>, mz| match acc {
                None => Some((mz, mz)),
                Some((lo, hi)) => Some((lo.min(mz), hi.max(mz))),
            })
            .and_then(|(lo, hi)| TupleRange::try_new(lo, hi).ok());

        Self {
            spectrum_type: header.spectrum_type.unwrap_or_default(),
            ms_function: header.ms_function(),
            chromatography_info: ChromatographyInfo {
                retention_time: header.retention_time_seconds,
                secondary_retention_time: None,
            },
            scan_type: header.scan_type.unwrap_or_default(),
            mz_range,
            scanning_range: header.scanning_range,
            scan_number,
            scan_definition: header.scan_definition.clone(),
            tic: if tic.is_finite() { tic.max(0.0) } else { 0.0 },
            polarity: header.polarity.unwrap_or_default(),
            source_fragmentation: header.activation,
            isolations: header.isolations.clone(),
        }
    }
}

/// One spectrum of a raw data file.
///
/// A scan only keeps metadata and the id of its spectrum. Data points are
/// read from the parent file's parser on every call, nothing is cached, so
/// the same scan fails cleanly with
/// [`crate::ScanAccessError::ResourceDisposed`] once its file is disposed.
#[derive(Debug, Clone)]
pub struct Scan {
    data_file: Arc<RawDataFile>,
    spectrum_id: String,
    info: ScanInfo,
}

impl Scan {
    pub fn new(
        data_file: Arc<RawDataFile>,
        spectrum_id: impl Into<String>,
        info: ScanInfo,
    ) -> Self {
        Self {
            data_file,
            spectrum_id: spectrum_id.into(),
            info,
        }
    }

    pub fn raw_data_file(&self) -> &Arc<RawDataFile> {
        &self.data_file
    }

    pub fn spectrum_id(&self) -> &str {
        &self.spectrum_id
    }

    pub fn info(&self) -> &ScanInfo {
        &self.info
    }

    pub fn spectrum_type(&self) -> MsSpectrumType {
        self.info.spectrum_type
    }

    pub fn ms_function(&self) -> &MsFunction {
        &self.info.ms_function
    }

    pub fn chromatography_info(&self) -> &ChromatographyInfo {
        &self.info.chromatography_info
    }

    pub fn scan_type(&self) -> MsScanType {
        self.info.scan_type
    }

    pub fn mz_range(&self) -> Option<TupleRange<f64>> {
        self.info.mz_range
    }

    pub fn scanning_range(&self) -> Option<TupleRange<f64>> {
        self.info.scanning_range
    }

    pub fn scan_number(&self) -> u32 {
        self.info.scan_number.get()
    }

    pub fn scan_definition(&self) -> Option<&str> {
        self.info.scan_definition.as_deref()
    }

    pub fn tic(&self) -> f32 {
        self.info.tic
    }

    pub fn polarity(&self) -> PolarityType {
        self.info.polarity
    }

    pub fn source_fragmentation(&self) -> Option<&ActivationInfo> {
        self.info.source_fragmentation.as_ref()
    }

    pub fn isolations(&self) -> &[IsolationInfo] {
        &self.info.isolations
    }

    /// "MS spectrum <file>#<scan number>"
    pub fn display_title(&self) -> String {
        format!("MS spectrum {}#{}", self.data_file.name(), self.scan_number())
    }

    // Holds the file lock only while the parser reads.
    fn fetch_native(&self) -> Result<NativeSpectrum> {
        let native = self
            .data_file
            .with_parser(|parser| parser.spectrum_by_id(&self.spectrum_id))?;
        native.check_points()?;
        Ok(native)
    }

    /// Replaces the contents of `out` with every point of the spectrum.
    ///
    /// On error `out` is either untouched (disposed file, parse failure) or
    /// cleared (allocation failure), never partially filled.
    pub fn extract_all(&self, out: &mut DataPointList) -> Result<()> {
        let native = self.fetch_native()?;
        out.clear();
        out.allocate(native.points.len())?;
        for (mz, intensity) in native.points {
            out.add(mz, intensity as f32);
        }
        Ok(())
    }

    /// Replaces the contents of `out` with the points inside both ranges.
    ///
    /// Single pass over the native points, in source order; the intensity
    /// test only runs for points inside `mz_range`. Capacity is reserved for
    /// the whole spectrum up front so the loop never reallocates.
    pub fn extract_filtered(
        &self,
        out: &mut DataPointList,
        mz_range: &TupleRange<f64>,
        intensity_range: &TupleRange<f32>,
    ) -> Result<()> {
        let native = self.fetch_native()?;
        out.clear();
        out.allocate(native.points.len())?;
        for (mz, intensity) in native.points {
            if !mz_range.contains(mz) {
                continue;
            }
            let intensity = intensity as f32;
            if !intensity_range.contains(intensity) {
                continue;
            }
            out.add(mz, intensity);
        }
        Ok(())
    }

    /// [`Scan::extract_all`] into a fresh buffer.
    pub fn data_points(&self) -> Result<DataPointList> {
        let mut out = DataPointList::new();
        self.extract_all(&mut out)?;
        Ok(out)
    }

    /// [`Scan::extract_filtered`] into a fresh buffer.
    pub fn data_points_by_mz_and_intensity(
        &self,
        mz_range: &TupleRange<f64>,
        intensity_range: &TupleRange<f32>,
    ) -> Result<DataPointList> {
        let mut out = DataPointList::new();
        self.extract_filtered(&mut out, mz_range, intensity_range)?;
        Ok(out)
    }
}
