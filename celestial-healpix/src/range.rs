//! Half-open ranges of depth-29 nested indices.
//!
//! [`NestedRange`] is the storage unit of this crate. It is what a coverage
//! holds after merging and what gets written to an integer-range column. A
//! range need not correspond to a single hierarchical pixel; for that
//! stronger guarantee see [`Tile`](crate::tile::Tile).
//!
//! The text form is the canonical PostgreSQL `int8range` literal, inclusive
//! lower bound and exclusive upper bound:
//!
//! ```
//! use celestial_healpix::NestedRange;
//!
//! let range: NestedRange = "[16,32)".parse().unwrap();
//! assert_eq!(range.len(), 16);
//! assert_eq!(range.to_string(), "[16,32)");
//! ```

use std::fmt;
use std::ops::Range;
use std::str::FromStr;

use crate::constants::{NPIX, PIXEL_AREA};
use crate::errors::{HealpixError, HealpixResult};

/// Half-open range `[lo, hi)` of nested indices at [`MAX_DEPTH`](crate::MAX_DEPTH).
///
/// Invariant: `lo < hi ≤ NPIX`. Ordered lexicographically by `(lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawRange", into = "RawRange"))]
pub struct NestedRange {
    lo: u64,
    hi: u64,
}

impl NestedRange {
    /// # Errors
    /// [`HealpixError::InvalidRange`] if `lo >= hi` or `hi > NPIX`.
    pub fn new(lo: u64, hi: u64) -> HealpixResult<Self> {
        if lo >= hi {
            return Err(HealpixError::invalid_range(lo, hi, "range is empty"));
        }
        if hi > NPIX {
            return Err(HealpixError::invalid_range(
                lo,
                hi,
                format!("upper bound exceeds {}", NPIX),
            ));
        }
        Ok(Self { lo, hi })
    }

    /// Caller guarantees `lo < hi ≤ NPIX`.
    #[inline]
    pub(crate) fn new_unchecked(lo: u64, hi: u64) -> Self {
        debug_assert!(lo < hi && hi <= NPIX, "bad range [{},{})", lo, hi);
        Self { lo, hi }
    }

    /// The whole sphere, `[0, NPIX)`.
    pub fn full_sky() -> Self {
        Self { lo: 0, hi: NPIX }
    }

    #[inline]
    pub fn lo(&self) -> u64 {
        self.lo
    }

    #[inline]
    pub fn hi(&self) -> u64 {
        self.hi
    }

    /// Number of depth-29 pixels in the range. Never zero.
    #[inline]
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> u64 {
        self.hi - self.lo
    }

    /// Solid angle in steradians.
    #[inline]
    pub fn area(&self) -> f64 {
        self.len() as f64 * PIXEL_AREA
    }

    #[inline]
    pub fn contains_index(&self, nested: u64) -> bool {
        self.lo <= nested && nested < self.hi
    }

    /// `true` if `other` lies entirely inside this range (`@>`).
    #[inline]
    pub fn contains_range(&self, other: &Self) -> bool {
        self.lo <= other.lo && other.hi <= self.hi
    }

    /// `true` if the ranges share at least one index (`&&`).
    #[inline]
    pub fn overlaps(&self, other: &Self) -> bool {
        self.lo < other.hi && other.lo < self.hi
    }

    /// `true` if the ranges overlap or are adjacent, i.e. their union is a
    /// single range.
    #[inline]
    pub fn touches(&self, other: &Self) -> bool {
        self.lo <= other.hi && other.lo <= self.hi
    }

    #[inline]
    pub fn as_range(&self) -> Range<u64> {
        self.lo..self.hi
    }
}

impl fmt::Display for NestedRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{},{})", self.lo, self.hi)
    }
}

impl FromStr for NestedRange {
    type Err = HealpixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        let inner = trimmed
            .strip_prefix('[')
            .and_then(|rest| rest.strip_suffix(')'))
            .ok_or_else(|| HealpixError::parse(s, "expected a '[lo,hi)' range literal"))?;
        let (lo, hi) = inner
            .split_once(',')
            .ok_or_else(|| HealpixError::parse(s, "missing ',' between bounds"))?;
        let lo: u64 = lo
            .trim()
            .parse()
            .map_err(|e| HealpixError::parse(s, format!("lower bound: {}", e)))?;
        let hi: u64 = hi
            .trim()
            .parse()
            .map_err(|e| HealpixError::parse(s, format!("upper bound: {}", e)))?;
        Self::new(lo, hi)
    }
}

impl From<NestedRange> for (u64, u64) {
    fn from(range: NestedRange) -> Self {
        (range.lo, range.hi)
    }
}

impl From<NestedRange> for Range<u64> {
    fn from(range: NestedRange) -> Self {
        range.as_range()
    }
}

impl TryFrom<(u64, u64)> for NestedRange {
    type Error = HealpixError;

    fn try_from((lo, hi): (u64, u64)) -> Result<Self, Self::Error> {
        Self::new(lo, hi)
    }
}

impl TryFrom<Range<u64>> for NestedRange {
    type Error = HealpixError;

    fn try_from(range: Range<u64>) -> Result<Self, Self::Error> {
        Self::new(range.start, range.end)
    }
}

/// Unvalidated wire form of a [`NestedRange`].
#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawRange {
    lo: u64,
    hi: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRange> for NestedRange {
    type Error = HealpixError;

    fn try_from(raw: RawRange) -> Result<Self, Self::Error> {
        Self::new(raw.lo, raw.hi)
    }
}

#[cfg(feature = "serde")]
impl From<NestedRange> for RawRange {
    fn from(range: NestedRange) -> Self {
        Self {
            lo: range.lo,
            hi: range.hi,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use celestial_core::constants::FOUR_PI;

    fn r(lo: u64, hi: u64) -> NestedRange {
        NestedRange::new(lo, hi).unwrap()
    }

    #[test]
    fn test_new_validates() {
        assert!(NestedRange::new(0, 1).is_ok());
        assert!(NestedRange::new(5, 5).is_err());
        assert!(NestedRange::new(6, 5).is_err());
        assert!(NestedRange::new(0, NPIX).is_ok());
        assert!(NestedRange::new(0, NPIX + 1).is_err());
    }

    #[test]
    fn test_contains_index_half_open() {
        let range = r(4, 8);
        assert!(!range.contains_index(3));
        assert!(range.contains_index(4));
        assert!(range.contains_index(7));
        assert!(!range.contains_index(8));
    }

    #[test]
    fn test_overlaps_and_touches() {
        assert!(r(0, 4).overlaps(&r(3, 5)));
        assert!(!r(0, 4).overlaps(&r(4, 8)));
        assert!(r(0, 4).touches(&r(4, 8)));
        assert!(!r(0, 4).touches(&r(5, 8)));
        assert!(r(4, 8).overlaps(&r(0, 16)));
    }

    #[test]
    fn test_contains_range() {
        assert!(r(0, 16).contains_range(&r(4, 8)));
        assert!(r(0, 16).contains_range(&r(0, 16)));
        assert!(!r(0, 16).contains_range(&r(12, 20)));
    }

    #[test]
    fn test_ordering_is_lexicographic() {
        let mut ranges = vec![r(4, 8), r(0, 16), r(0, 4)];
        ranges.sort();
        assert_eq!(ranges, vec![r(0, 4), r(0, 16), r(4, 8)]);
    }

    #[test]
    fn test_full_sky_area() {
        let full = NestedRange::full_sky();
        assert!((full.area() - FOUR_PI).abs() < 1e-12);
    }

    #[test]
    fn test_parse_and_display() {
        let range: NestedRange = " [ 0 , 4 ) ".parse().unwrap();
        assert_eq!(range, r(0, 4));
        assert_eq!(range.to_string(), "[0,4)");

        assert!("(0,4)".parse::<NestedRange>().is_err());
        assert!("[0,4]".parse::<NestedRange>().is_err());
        assert!("[0;4)".parse::<NestedRange>().is_err());
        assert!("[a,4)".parse::<NestedRange>().is_err());
        assert!("empty".parse::<NestedRange>().is_err());
        assert!(matches!(
            "[4,4)".parse::<NestedRange>(),
            Err(HealpixError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_conversions() {
        let range = NestedRange::try_from(2..9).unwrap();
        assert_eq!(<(u64, u64)>::from(range), (2, 9));
        assert_eq!(Range::from(range), 2..9);
        assert!(NestedRange::try_from((9, 2)).is_err());
    }
}
