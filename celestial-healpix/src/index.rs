//! UNIQ ⇔ nested-range arithmetic.
//!
//! A hierarchical pixel `(level, pixel)` has two integer forms:
//!
//! - **UNIQ**: `pixel + 4^(level + 1)`, the interchange number other HEALPix
//!   tools expect. The position of the leading bit encodes the level.
//! - **Nested range**: `[pixel << s, (pixel + 1) << s)` with
//!   `s = 2 · (MAX_DEPTH - level)`, the block of depth-29 indices the pixel
//!   covers. This is what gets stored and range-queried.
//!
//! Going back from a range to a UNIQ value requires the range to be exactly
//! one pixel: its width must be a power of four and its lower bound aligned
//! to that width. Anything else is rejected with
//! [`HealpixError::InvalidTileShape`]; the level is never guessed by rounding
//! a logarithm.
//!
//! ```
//! use celestial_healpix::index::{range_to_uniq, uniq_of, uniq_to_range};
//!
//! let uniq = uniq_of(3, 12).unwrap();
//! let (lo, hi) = uniq_to_range(uniq).unwrap();
//! assert_eq!(hi - lo, 1 << 52);
//! assert_eq!(range_to_uniq(lo, hi).unwrap(), uniq);
//! ```

use std::fmt;

use crate::constants::{npix_at, MAX_DEPTH, NPIX};
use crate::errors::{HealpixError, HealpixResult};

/// A hierarchical pixel: `pixel` numbered in the nested scheme at `level`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawUniqIndex", into = "RawUniqIndex"))]
pub struct UniqIndex {
    level: u8,
    pixel: u64,
}

impl UniqIndex {
    /// Validates `level ≤ MAX_DEPTH` and `pixel < 12 · 4^level`.
    pub fn new(level: u8, pixel: u64) -> HealpixResult<Self> {
        if level > MAX_DEPTH {
            return Err(HealpixError::invalid_index(
                level as u64,
                format!("level {} exceeds maximum depth {}", level, MAX_DEPTH),
            ));
        }
        let npix = npix_at(level);
        if pixel >= npix {
            return Err(HealpixError::invalid_index(
                pixel,
                format!("pixel out of range [0, {}) at level {}", npix, level),
            ));
        }
        Ok(Self { level, pixel })
    }

    /// Caller guarantees `level ≤ MAX_DEPTH` and `pixel < 12 · 4^level`.
    #[inline]
    pub(crate) fn new_unchecked(level: u8, pixel: u64) -> Self {
        debug_assert!(level <= MAX_DEPTH && pixel < npix_at(level));
        Self { level, pixel }
    }

    /// Decodes a packed UNIQ integer.
    pub fn from_uniq(uniq: u64) -> HealpixResult<Self> {
        if uniq < 4 {
            return Err(HealpixError::invalid_index(
                uniq,
                "UNIQ values start at 4 (level 0, pixel 0)",
            ));
        }
        let msb = 63 - uniq.leading_zeros();
        let level = msb / 2 - 1;
        if level > MAX_DEPTH as u32 {
            return Err(HealpixError::invalid_index(
                uniq,
                format!("decodes to level {} above maximum depth {}", level, MAX_DEPTH),
            ));
        }
        let level = level as u8;
        Ok(Self {
            level,
            pixel: uniq - level_offset(level),
        })
    }

    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    #[inline]
    pub fn pixel(&self) -> u64 {
        self.pixel
    }

    #[inline]
    pub fn uniq(&self) -> u64 {
        self.pixel + level_offset(self.level)
    }

    /// The half-open block of depth-29 indices covered by this pixel.
    #[inline]
    pub fn to_range(&self) -> (u64, u64) {
        let shift = depth_shift(self.level);
        (self.pixel << shift, (self.pixel + 1) << shift)
    }
}

impl fmt::Display for UniqIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.level, self.pixel)
    }
}

/// `4^(level + 1)`, the UNIQ offset of the first pixel at `level`.
#[inline]
fn level_offset(level: u8) -> u64 {
    1 << (2 * (level as u32 + 1))
}

/// Bit shift between `level` and [`MAX_DEPTH`].
#[inline]
pub(crate) fn depth_shift(level: u8) -> u32 {
    2 * (MAX_DEPTH - level) as u32
}

/// Packs `(level, pixel)` into a UNIQ integer.
pub fn uniq_of(level: u8, pixel: u64) -> HealpixResult<u64> {
    UniqIndex::new(level, pixel).map(|index| index.uniq())
}

/// Splits a UNIQ integer into `(level, pixel)`.
pub fn uniq_to_level_pixel(uniq: u64) -> HealpixResult<(u8, u64)> {
    UniqIndex::from_uniq(uniq).map(|index| (index.level, index.pixel))
}

/// Nested range `[lo, hi)` at [`MAX_DEPTH`] covered by a UNIQ pixel.
///
/// # Errors
/// [`HealpixError::InvalidIndex`] if `uniq < 4` or the decoded level is
/// above [`MAX_DEPTH`].
pub fn uniq_to_range(uniq: u64) -> HealpixResult<(u64, u64)> {
    UniqIndex::from_uniq(uniq).map(|index| index.to_range())
}

/// Level of a pixel whose range spans `width` depth-29 indices.
///
/// # Errors
/// [`HealpixError::InvalidTileShape`] unless `width` is `4^k` for some
/// `k ≤ MAX_DEPTH`.
pub fn level_of_width(width: u64) -> HealpixResult<u8> {
    if width == 0 || !width.is_power_of_two() || width.trailing_zeros() % 2 != 0 {
        return Err(HealpixError::invalid_tile_shape(
            0,
            width,
            format!("width {} is not a power of 4", width),
        ));
    }
    let steps = width.trailing_zeros() / 2;
    if steps > MAX_DEPTH as u32 {
        return Err(HealpixError::invalid_tile_shape(
            0,
            width,
            format!("width {} is wider than a base pixel", width),
        ));
    }
    Ok(MAX_DEPTH - steps as u8)
}

/// Validates that `[lo, hi)` is exactly one hierarchical pixel.
pub fn range_to_uniq_index(lo: u64, hi: u64) -> HealpixResult<UniqIndex> {
    if hi <= lo {
        return Err(HealpixError::invalid_tile_shape(lo, hi, "range is empty"));
    }
    if hi > NPIX {
        return Err(HealpixError::invalid_range(
            lo,
            hi,
            format!("upper bound exceeds {}", NPIX),
        ));
    }
    let width = hi - lo;
    let level = level_of_width(width).map_err(|_| {
        HealpixError::invalid_tile_shape(lo, hi, format!("width {} is not a power of 4", width))
    })?;
    if lo % width != 0 {
        return Err(HealpixError::invalid_tile_shape(
            lo,
            hi,
            format!("lower bound is not aligned to a level-{} pixel", level),
        ));
    }
    Ok(UniqIndex {
        level,
        pixel: lo >> depth_shift(level),
    })
}

/// Inverse of [`uniq_to_range`].
///
/// # Errors
/// [`HealpixError::InvalidTileShape`] if the range is empty, its width is not
/// an exact power of 4, or its lower bound is not aligned to that width;
/// [`HealpixError::InvalidRange`] if it extends past the last pixel.
pub fn range_to_uniq(lo: u64, hi: u64) -> HealpixResult<u64> {
    range_to_uniq_index(lo, hi).map(|index| index.uniq())
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawUniqIndex {
    level: u8,
    pixel: u64,
}

#[cfg(feature = "serde")]
impl TryFrom<RawUniqIndex> for UniqIndex {
    type Error = HealpixError;

    fn try_from(raw: RawUniqIndex) -> Result<Self, Self::Error> {
        Self::new(raw.level, raw.pixel)
    }
}

#[cfg(feature = "serde")]
impl From<UniqIndex> for RawUniqIndex {
    fn from(index: UniqIndex) -> Self {
        Self {
            level: index.level,
            pixel: index.pixel,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::width_at;

    #[test]
    fn test_level_zero_pixel_zero_covers_first_base_pixel() {
        let uniq = uniq_of(0, 0).unwrap();
        assert_eq!(uniq, 4);
        assert_eq!(uniq_to_range(uniq).unwrap(), (0, 1 << 58));
    }

    #[test]
    fn test_last_pixel_at_max_depth() {
        let uniq = uniq_of(MAX_DEPTH, NPIX - 1).unwrap();
        assert_eq!(uniq_to_range(uniq).unwrap(), (NPIX - 1, NPIX));
        assert_eq!(uniq_to_level_pixel(uniq).unwrap(), (MAX_DEPTH, NPIX - 1));
    }

    #[test]
    fn test_uniq_below_four_rejected() {
        for uniq in 0..4 {
            assert!(matches!(
                uniq_to_range(uniq),
                Err(HealpixError::InvalidIndex { .. })
            ));
        }
    }

    #[test]
    fn test_uniq_above_max_depth_rejected() {
        let level_30_first = 1u64 << 62;
        assert!(matches!(
            uniq_to_range(level_30_first),
            Err(HealpixError::InvalidIndex { .. })
        ));
        assert!(uniq_to_range(u64::MAX).is_err());
    }

    #[test]
    fn test_uniq_of_validates_inputs() {
        assert!(uniq_of(30, 0).is_err());
        assert!(uniq_of(0, 12).is_err());
        assert!(uniq_of(1, 47).is_ok());
        assert!(uniq_of(1, 48).is_err());
    }

    #[test]
    fn test_level_of_width() {
        assert_eq!(level_of_width(1).unwrap(), MAX_DEPTH);
        assert_eq!(level_of_width(4).unwrap(), MAX_DEPTH - 1);
        assert_eq!(level_of_width(width_at(0)).unwrap(), 0);
        assert!(level_of_width(0).is_err());
        assert!(level_of_width(2).is_err());
        assert!(level_of_width(8).is_err());
        assert!(level_of_width(12).is_err());
        assert!(level_of_width(width_at(0) * 4).is_err());
    }

    #[test]
    fn test_range_to_uniq_rejects_non_power_of_four() {
        // ceil(log2(12) / 2) = 2 would silently claim level 27 here
        let err = range_to_uniq(0, 12).unwrap_err();
        assert!(matches!(err, HealpixError::InvalidTileShape { lo: 0, hi: 12, .. }));

        assert!(matches!(
            range_to_uniq(0, 2),
            Err(HealpixError::InvalidTileShape { .. })
        ));
    }

    #[test]
    fn test_range_to_uniq_rejects_misaligned_and_empty() {
        assert!(matches!(
            range_to_uniq(2, 6),
            Err(HealpixError::InvalidTileShape { .. })
        ));
        assert!(matches!(
            range_to_uniq(8, 8),
            Err(HealpixError::InvalidTileShape { .. })
        ));
        assert!(matches!(
            range_to_uniq(NPIX, NPIX + 1),
            Err(HealpixError::InvalidRange { .. })
        ));
    }

    #[test]
    fn test_round_trip_every_level() {
        for level in 0..=MAX_DEPTH {
            let npix = npix_at(level);
            for pixel in [0, 1, npix / 3, npix - 1] {
                let uniq = uniq_of(level, pixel).unwrap();
                let (lo, hi) = uniq_to_range(uniq).unwrap();
                assert_eq!(hi - lo, width_at(level));
                assert_eq!(range_to_uniq(lo, hi).unwrap(), uniq, "level {}", level);
            }
        }
    }

    #[test]
    fn test_display() {
        let index = UniqIndex::new(3, 12).unwrap();
        assert_eq!(index.to_string(), "3/12");
        assert_eq!(UniqIndex::from_uniq(index.uniq()).unwrap(), index);
    }
}
