use crate::errors::ParseError;
use crate::models::scan_metadata::{
    ActivationInfo,
    IsolationInfo,
    MsFunction,
    MsScanType,
    MsSpectrumType,
    PolarityType,
};
use crate::utils::TupleRange;

/// A stateful, format specific reader of raw spectra.
///
/// Implementations are opened by their own constructor (the `open` side of
/// the contract, it differs per format) and are owned by exactly one
/// [`crate::RawDataFile`]. The file serializes every call behind a lock, so
/// implementations do not need to be `Sync`, and can keep cursors, caches or
/// open file descriptors in `&mut self`.
///
/// # Example
///
/// ```
/// use rawscan::{InMemoryParser, ParserHandle};
///
/// let mut parser = InMemoryParser::default();
/// parser.push_points("scan=1", vec![(100.0, 5.0), (200.0, 50.0)]);
///
/// assert_eq!(parser.spectrum_ids().unwrap(), vec!["scan=1".to_string()]);
/// let native = parser.spectrum_by_id("scan=1").unwrap();
/// assert_eq!(native.points.len(), 2);
/// assert!(parser.spectrum_by_id("scan=2").is_err());
/// ```
pub trait ParserHandle: Send {
    /// Short name of the format, used in logs.
    fn format_name(&self) -> &'static str;

    /// Identifiers of every spectrum in the file, in acquisition order.
    fn spectrum_ids(&mut self) -> Result<Vec<String>, ParseError>;

    /// Reads the native point collection (and header) of one spectrum.
    ///
    /// Fails with [`ParseError::UnknownSpectrum`] for ids the file does not
    /// contain, or with another [`ParseError`] when the data is malformed.
    /// Points must have a finite m/z and a finite, non-negative intensity
    /// that fits in an `f32`; callers reject anything else through
    /// [`NativeSpectrum::check_points`].
    fn spectrum_by_id(&mut self, id: &str) -> Result<NativeSpectrum, ParseError>;

    /// Releases whatever the parser holds. Called exactly once, by
    /// [`crate::RawDataFile::dispose`], before the handle is dropped.
    fn close(&mut self) {}
}

/// Spectrum as returned by a parser, before any conversion.
///
/// `points` are (m/z, intensity) pairs in the order the format stores them.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NativeSpectrum {
    pub header: SpectrumHeader,
    pub points: Vec<(f64, f64)>,
}

impl NativeSpectrum {
    pub fn new(points: Vec<(f64, f64)>) -> Self {
        Self {
            header: SpectrumHeader::default(),
            points,
        }
    }

    pub fn with_header(mut self, header: SpectrumHeader) -> Self {
        self.header = header;
        self
    }

    /// First point with a non-finite m/z, or an intensity that is negative
    /// or not representable as a finite `f32`.
    pub fn check_points(&self) -> Result<(), ParseError> {
        let bad = self.points.iter().enumerate().find(|(_, (mz, intensity))| {
            let valid = mz.is_finite() && *intensity >= 0.0 && (*intensity as f32).is_finite();
            !valid
        });
        match bad {
            Some((index, &(mz, intensity))) => Err(ParseError::InvalidPoint {
                index,
                mz,
                intensity,
            }),
            None => Ok(()),
        }
    }

    /// Summed intensity of the native points.
    pub fn total_intensity(&self) -> f64 {
        self.points.iter().map(|(_, intensity)| intensity).sum()
    }
}

/// Whatever metadata the format carries for one spectrum. Every field is
/// optional, import fills the gaps with defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SpectrumHeader {
    pub title: Option<String>,
    pub scan_number: Option<u32>,
    pub ms_level: Option<u8>,
    pub spectrum_type: Option<MsSpectrumType>,
    pub scan_type: Option<MsScanType>,
    pub polarity: Option<PolarityType>,
    pub retention_time_seconds: Option<f32>,
    pub total_ion_current: Option<f32>,
    pub scan_definition: Option<String>,
    pub scanning_range: Option<TupleRange<f64>>,
    pub activation: Option<ActivationInfo>,
    pub isolations: Vec<IsolationInfo>,
}

impl SpectrumHeader {
    pub fn ms_function(&self) -> MsFunction {
        MsFunction::ms(self.ms_level.unwrap_or(1))
    }
}
