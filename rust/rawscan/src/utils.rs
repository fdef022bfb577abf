use std::cmp::Ordering;
use std::ops::{
    Range,
    RangeInclusive,
};
use thiserror::Error;

/// Finds the index range of elements in a sorted slice whose keys fall within
/// the specified closed range.
///
/// The slice must be sorted ascending by `key_fn`. Works with float keys,
/// so NaN keys compare as "not less than" anything and end up after the range.
///
/// # Examples
///
/// ```
/// use rawscan::utils::{partition_range_by_key, TupleRange};
///
/// let mzs = [100.0, 150.0, 200.0, 200.0, 250.0, 300.0];
/// let range = TupleRange::try_new(150.0, 250.0).unwrap();
/// let idx = partition_range_by_key(&mzs, &range, |x| *x);
/// assert_eq!(idx, 1..5);
///
/// let empty = TupleRange::try_new(301.0, 400.0).unwrap();
/// assert!(partition_range_by_key(&mzs, &empty, |x| *x).is_empty());
/// ```
pub fn partition_range_by_key<T, K, F>(
    slice: &[T],
    key_range: &TupleRange<K>,
    key_fn: F,
) -> Range<usize>
where
    F: Fn(&T) -> K,
    K: Copy + PartialOrd + std::fmt::Debug,
{
    let start_idx = slice.partition_point(|x| key_fn(x) < key_range.start());
    let end_idx = start_idx + slice[start_idx..].partition_point(|x| key_fn(x) <= key_range.end());

    start_idx..end_idx
}

/// TupleRange represents a range defined by a tuple of two elements (T, T).
///
/// It represents a range as closed-closed [a, b], meaning both endpoints are inclusive.
/// The first element is always less than or equal to the second; a range that
/// would violate that (including one with an unordered bound such as NaN) cannot
/// be built.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
#[serde(try_from = "(T, T)", into = "(T, T)")]
#[serde(bound(
    serialize = "T: Copy + PartialOrd + std::fmt::Debug + serde::Serialize",
    deserialize = "T: Copy + PartialOrd + std::fmt::Debug + serde::Deserialize<'de>"
))]
pub struct TupleRange<T: Copy + PartialOrd + std::fmt::Debug>(T, T);

#[derive(Error, Debug, Clone, PartialEq)]
pub enum TupleRangeError<T: Copy + PartialOrd + std::fmt::Debug> {
    #[error(
        "Expected the first element to be less than or equal to the second, got ({0:?}, {1:?})"
    )]
    ExpectedOrderedRange(T, T),
}

impl<T: Copy + PartialOrd + std::fmt::Debug> TupleRange<T> {
    /// Creates a new `TupleRange` ensuring that the first element
    /// is less than or equal to the second.
    pub fn try_new(left: T, right: T) -> Result<Self, TupleRangeError<T>> {
        // Unordered bounds (NaN) are rejected as well
        match left.partial_cmp(&right) {
            Some(Ordering::Less | Ordering::Equal) => Ok(Self(left, right)),
            _ => Err(TupleRangeError::ExpectedOrderedRange(left, right)),
        }
    }

    pub fn as_tuple(&self) -> (T, T) {
        (self.0, self.1)
    }

    pub fn as_inclusive_range(&self) -> RangeInclusive<T> {
        self.0..=self.1
    }

    #[inline(always)]
    pub fn contains(&self, x: T) -> bool {
        self.0 <= x && x <= self.1
    }

    pub fn start(&self) -> T {
        self.0
    }

    pub fn end(&self) -> T {
        self.1
    }

    pub fn map_elems<W: Copy + PartialOrd + std::fmt::Debug>(
        self,
        f: impl Fn(T) -> W,
    ) -> Result<TupleRange<W>, TupleRangeError<W>> {
        TupleRange::try_new(f(self.0), f(self.1))
    }

    pub fn intersects(&self, other: Self) -> bool {
        !(self.end() < other.start() || other.end() < self.start())
    }

    pub fn try_intercept(&self, other: Self) -> Option<Self> {
        let left = if other.start() > self.start() {
            other.start()
        } else {
            self.start()
        };
        let right = if other.end() < self.end() {
            other.end()
        } else {
            self.end()
        };
        Self::try_new(left, right).ok()
    }

    /// True when the range covers every value of `other`.
    pub fn covers(&self, other: &Self) -> bool {
        self.start() <= other.start() && other.end() <= self.end()
    }
}

impl TupleRange<f64> {
    /// [-inf, +inf], matches every ordered value.
    pub const fn unbounded() -> Self {
        Self(f64::NEG_INFINITY, f64::INFINITY)
    }
}

impl TupleRange<f32> {
    /// [-inf, +inf], matches every ordered value.
    pub const fn unbounded() -> Self {
        Self(f32::NEG_INFINITY, f32::INFINITY)
    }
}

impl<T> AsRef<TupleRange<T>> for TupleRange<T>
where
    T: Copy + PartialOrd + std::fmt::Debug,
{
    fn as_ref(&self) -> &TupleRange<T> {
        self
    }
}

impl<T> TryFrom<(T, T)> for TupleRange<T>
where
    T: Copy + PartialOrd + std::fmt::Debug,
{
    type Error = TupleRangeError<T>;

    fn try_from(value: (T, T)) -> Result<Self, Self::Error> {
        TupleRange::try_new(value.0, value.1)
    }
}

impl<T> From<TupleRange<T>> for (T, T)
where
    T: Copy + PartialOrd + std::fmt::Debug,
{
    fn from(value: TupleRange<T>) -> Self {
        value.as_tuple()
    }
}

impl<T> std::fmt::Display for TupleRange<T>
where
    T: Copy + PartialOrd + std::fmt::Debug + std::fmt::Display,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "[{}, {}]", self.0, self.1)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_contains_is_inclusive() {
        let range = TupleRange::try_new(150.0, 250.0).unwrap();
        assert!(range.contains(150.0));
        assert!(range.contains(250.0));
        assert!(range.contains(200.0));
        assert!(!range.contains(149.999));
        assert!(!range.contains(250.001));
    }

    #[test]
    fn test_degenerate_range() {
        let range = TupleRange::try_new(10.0f32, 10.0).unwrap();
        assert!(range.contains(10.0));
        assert!(!range.contains(10.000_001));
    }

    #[test]
    fn test_unordered_ranges_are_rejected() {
        assert_eq!(
            TupleRange::try_new(2, 1),
            Err(TupleRangeError::ExpectedOrderedRange(2, 1))
        );
        assert!(TupleRange::try_new(f64::NAN, 1.0).is_err());
        assert!(TupleRange::try_new(1.0, f64::NAN).is_err());
        let from_tuple: Result<TupleRange<f64>, _> = (5.0, 1.0).try_into();
        assert!(from_tuple.is_err());
    }

    #[test]
    fn test_unbounded() {
        let range = TupleRange::<f64>::unbounded();
        assert!(range.contains(f64::MIN));
        assert!(range.contains(f64::MAX));
        assert!(range.contains(f64::INFINITY));
        assert!(!range.contains(f64::NAN));
    }

    #[test]
    fn test_intercept() {
        let a = TupleRange::try_new(0, 10).unwrap();
        let b = TupleRange::try_new(5, 20).unwrap();
        let c = TupleRange::try_new(11, 20).unwrap();
        assert_eq!(a.try_intercept(b), Some(TupleRange::try_new(5, 10).unwrap()));
        assert!(a.intersects(b));
        assert!(!a.intersects(c));
        assert_eq!(a.try_intercept(c), None);
        assert!(TupleRange::try_new(0, 20).unwrap().covers(&a));
        assert!(!b.covers(&a));
    }

    #[test]
    fn test_serde_rejects_unordered() {
        let ok: TupleRange<f64> = serde_json::from_str("[1.0, 2.0]").unwrap();
        assert_eq!(ok.as_tuple(), (1.0, 2.0));
        let bad: Result<TupleRange<f64>, _> = serde_json::from_str("[3.0, 2.0]");
        assert!(bad.is_err());
    }

    #[test]
    fn test_slice_search_repeats() {
        let input = vec![1.0, 2.0, 3.0, 3.0, 3.0, 4.0, 5.0, 7.0, 7.0, 8.0];
        let range = TupleRange::try_new(3.0, 7.0).unwrap();
        let result = partition_range_by_key(&input, &range, |&x| x);
        assert_eq!(result, 2..9);
        assert_eq!(&input[result], &[3.0, 3.0, 3.0, 4.0, 5.0, 7.0, 7.0]);
    }

    #[test]
    fn test_slice_search_by_tuple_key() {
        let peaks = vec![(100.0f64, 1.0f32), (150.0, 2.0), (150.0, 3.0), (210.0, 4.0)];
        let range = TupleRange::try_new(150.0, 200.0).unwrap();
        assert_eq!(partition_range_by_key(&peaks, &range, |p| p.0), 1..3);

        let ordered_by_intensity = vec![(3.0f64, 0.5f32), (1.0, 2.0), (2.0, 8.0)];
        let by_intensity = TupleRange::try_new(1.0f32, 10.0).unwrap();
        assert_eq!(
            partition_range_by_key(&ordered_by_intensity, &by_intensity, |p| p.1),
            1..3
        );
    }
}
