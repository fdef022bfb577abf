//! Descriptive, immutable metadata attached to every scan.
use serde::{
    Deserialize,
    Serialize,
};

use crate::utils::TupleRange;

/// How the points of a spectrum should be interpreted.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsSpectrumType {
    /// Continuous intensity curve.
    Profile,
    /// Discrete peaks.
    #[default]
    Centroided,
    /// Profile data that was thresholded (zero intensities removed).
    Thresholded,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PolarityType {
    Positive,
    Negative,
    #[default]
    Unknown,
}

impl PolarityType {
    /// Parses the trailing sign of an MGF style charge ("2+", "1-").
    pub fn from_charge_sign(charge: &str) -> Self {
        match charge.trim().chars().last() {
            Some('+') => PolarityType::Positive,
            Some('-') => PolarityType::Negative,
            _ => PolarityType::Unknown,
        }
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MsScanType {
    FullScan,
    Sim,
    Mrm,
    #[default]
    Unknown,
}

/// Instrument function that produced the scan, e.g. `ms` level 1 or 2.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MsFunction {
    pub name: String,
    pub ms_level: Option<u8>,
}

impl MsFunction {
    pub fn new(name: impl Into<String>, ms_level: Option<u8>) -> Self {
        Self {
            name: name.into(),
            ms_level,
        }
    }

    pub fn ms(level: u8) -> Self {
        Self::new("ms", Some(level))
    }
}

impl Default for MsFunction {
    fn default() -> Self {
        Self::ms(1)
    }
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChromatographyInfo {
    /// Retention time, in seconds.
    pub retention_time: Option<f32>,
    /// Secondary dimension (e.g. GCxGC modulation), in seconds.
    pub secondary_retention_time: Option<f32>,
}

impl ChromatographyInfo {
    pub fn with_rt(rt_seconds: f32) -> Self {
        Self {
            retention_time: Some(rt_seconds),
            secondary_retention_time: None,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActivationType {
    Cid,
    Hcd,
    Etd,
    Ecd,
    Unknown,
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ActivationInfo {
    pub activation_type: ActivationType,
    pub activation_energy: Option<f64>,
}

/// One isolation window of a fragmentation scan.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IsolationInfo {
    pub isolation_mz: TupleRange<f64>,
    pub ion_injection_time: Option<f32>,
    pub precursor_mz: Option<f64>,
    pub precursor_charge: Option<i32>,
    pub activation_info: Option<ActivationInfo>,
}

impl IsolationInfo {
    /// Window centered on `precursor_mz`, `width` Th wide.
    pub fn centered(precursor_mz: f64, width: f64, precursor_charge: Option<i32>) -> Option<Self> {
        let half = width.abs() / 2.0;
        let isolation_mz = TupleRange::try_new(precursor_mz - half, precursor_mz + half).ok()?;
        Some(Self {
            isolation_mz,
            ion_injection_time: None,
            precursor_mz: Some(precursor_mz),
            precursor_charge,
            activation_info: None,
        })
    }
}
