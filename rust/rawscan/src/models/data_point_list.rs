use serde::{
    Deserialize,
    Serialize,
};
use std::ops::Range;
use thiserror::Error;

use crate::errors::AllocationError;
use crate::utils::{
    partition_range_by_key,
    TupleRange,
};

/// Reusable columnar buffer of (m/z, intensity) points.
///
/// `mz` and `intensity` are parallel arrays, they always have the same
/// length. The allocated capacity can be larger than the logical length,
/// so a single buffer can be cleared and refilled across many extraction
/// calls without touching the allocator again.
///
/// Growth policy: [`DataPointList::add`] grows the buffer implicitly
/// (amortized, like `Vec::push`). Calling [`DataPointList::allocate`] first
/// is only an optimization, and the only way to observe an allocation
/// failure as an error instead of an abort.
///
/// ```
/// use rawscan::DataPointList;
///
/// let mut buffer = DataPointList::with_capacity(16);
/// buffer.add(100.0, 5.0);
/// buffer.add(200.0, 50.0);
/// assert_eq!(buffer.len(), 2);
///
/// buffer.clear();
/// assert!(buffer.is_empty());
/// assert!(buffer.capacity() >= 16);
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "DataPointColumns")]
pub struct DataPointList {
    mz: Vec<f64>,
    intensity: Vec<f32>,
}

/// Unchecked wire form of a [`DataPointList`].
#[derive(Deserialize)]
pub struct DataPointColumns {
    mz: Vec<f64>,
    intensity: Vec<f32>,
}

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("m/z and intensity columns differ in length ({mz} != {intensity})")]
pub struct MismatchedColumns {
    pub mz: usize,
    pub intensity: usize,
}

impl TryFrom<DataPointColumns> for DataPointList {
    type Error = MismatchedColumns;

    fn try_from(value: DataPointColumns) -> Result<Self, Self::Error> {
        let (mz, intensity) = (value.mz.len(), value.intensity.len());
        Self::try_from_vecs(value.mz, value.intensity)
            .ok_or(MismatchedColumns { mz, intensity })
    }
}

impl DataPointList {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            mz: Vec::with_capacity(capacity),
            intensity: Vec::with_capacity(capacity),
        }
    }

    /// Builds a list from already separated columns.
    ///
    /// Returns `None` when the columns differ in length.
    pub fn try_from_vecs(mz: Vec<f64>, intensity: Vec<f32>) -> Option<Self> {
        if mz.len() != intensity.len() {
            return None;
        }
        Some(Self { mz, intensity })
    }

    /// Resets the logical length to zero. Capacity is kept.
    pub fn clear(&mut self) {
        self.mz.clear();
        self.intensity.clear();
    }

    /// Ensures room for at least `min_capacity` points in total.
    ///
    /// Contents are preserved. Growth is delegated to `Vec::try_reserve`,
    /// which grows geometrically, so repeated calls with slowly increasing
    /// sizes stay amortized O(1) per point.
    pub fn allocate(&mut self, min_capacity: usize) -> Result<(), AllocationError> {
        let to_alloc_error = |source| AllocationError {
            requested: min_capacity,
            source,
        };
        let len = self.len();
        if self.mz.capacity() < min_capacity {
            self.mz
                .try_reserve(min_capacity - len)
                .map_err(to_alloc_error)?;
        }
        if self.intensity.capacity() < min_capacity {
            self.intensity
                .try_reserve(min_capacity - len)
                .map_err(to_alloc_error)?;
        }
        Ok(())
    }

    #[inline]
    pub fn add(&mut self, mz: f64, intensity: f32) {
        self.mz.push(mz);
        self.intensity.push(intensity);
    }

    pub fn len(&self) -> usize {
        self.mz.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mz.is_empty()
    }

    /// Number of points that fit without reallocating.
    pub fn capacity(&self) -> usize {
        self.mz.capacity().min(self.intensity.capacity())
    }

    pub fn mz_values(&self) -> &[f64] {
        &self.mz
    }

    pub fn intensity_values(&self) -> &[f32] {
        &self.intensity
    }

    pub fn get(&self, index: usize) -> Option<(f64, f32)> {
        Some((*self.mz.get(index)?, *self.intensity.get(index)?))
    }

    pub fn iter(&self) -> impl ExactSizeIterator<Item = (f64, f32)> + '_ {
        self.mz
            .iter()
            .copied()
            .zip(self.intensity.iter().copied())
    }

    /// Index range of the points inside `mz_range`.
    ///
    /// Binary search, so the buffer has to be sorted by m/z (which is
    /// what extraction produces for well-formed sources).
    pub fn mz_index_range(&self, mz_range: &TupleRange<f64>) -> Range<usize> {
        partition_range_by_key(&self.mz, mz_range, |x| *x)
    }

    /// Keeps only the points inside both ranges, in place and in order.
    pub fn retain_in_ranges(
        &mut self,
        mz_range: &TupleRange<f64>,
        intensity_range: &TupleRange<f32>,
    ) {
        let mut write = 0;
        for read in 0..self.mz.len() {
            let mz = self.mz[read];
            let intensity = self.intensity[read];
            if mz_range.contains(mz) && intensity_range.contains(intensity) {
                self.mz[write] = mz;
                self.intensity[write] = intensity;
                write += 1;
            }
        }
        self.mz.truncate(write);
        self.intensity.truncate(write);
    }

    pub fn max_intensity(&self) -> Option<f32> {
        self.intensity.iter().copied().reduce(f32::max)
    }

    /// Sum of all intensities (the TIC of the points in the buffer).
    pub fn total_intensity(&self) -> f64 {
        self.intensity.iter().map(|x| *x as f64).sum()
    }

    /// Lowest and highest m/z of a sorted buffer.
    pub fn mz_span(&self) -> Option<TupleRange<f64>> {
        let first = *self.mz.first()?;
        let last = *self.mz.last()?;
        TupleRange::try_new(first, last).ok()
    }

    pub fn is_sorted_by_mz(&self) -> bool {
        self.mz.windows(2).all(|w| w[0] <= w[1])
    }
}

impl FromIterator<(f64, f32)> for DataPointList {
    fn from_iter<I: IntoIterator<Item = (f64, f32)>>(iter: I) -> Self {
        let iter = iter.into_iter();
        let mut out = Self::with_capacity(iter.size_hint().0);
        for (mz, intensity) in iter {
            out.add(mz, intensity);
        }
        out
    }
}

impl Extend<(f64, f32)> for DataPointList {
    fn extend<I: IntoIterator<Item = (f64, f32)>>(&mut self, iter: I) {
        for (mz, intensity) in iter {
            self.add(mz, intensity);
        }
    }
}
