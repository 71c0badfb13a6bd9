//! A single hierarchical pixel stored as a depth-29 index range.
//!
//! A [`Tile`] is a [`NestedRange`] with one extra guarantee: it covers
//! exactly one HEALPix pixel at some level, so it can always be converted
//! back to a UNIQ number. The guarantee is checked on construction, never
//! assumed:
//!
//! ```
//! use celestial_healpix::{HealpixError, Tile};
//!
//! let tile = Tile::from_level_pixel(3, 12).unwrap();
//! assert_eq!(tile.level(), 3);
//! assert_eq!(Tile::new(tile.lo(), tile.hi()).unwrap(), tile);
//!
//! // Width 12 is not a power of four.
//! assert!(matches!(
//!     Tile::new(0, 12),
//!     Err(HealpixError::InvalidTileShape { .. })
//! ));
//! ```

use std::fmt;
use std::str::FromStr;

use crate::constants::MAX_DEPTH;
use crate::errors::{HealpixError, HealpixResult};
use crate::index::{range_to_uniq_index, UniqIndex};
use crate::point::Point;
use crate::range::NestedRange;

/// One hierarchical pixel as `[lo, hi)` at [`MAX_DEPTH`].
///
/// Equality and ordering follow `(lo, hi)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "NestedRange", into = "NestedRange"))]
pub struct Tile {
    range: NestedRange,
    level: u8,
}

impl Tile {
    /// Builds a tile from its depth-29 bounds.
    ///
    /// # Errors
    /// [`HealpixError::InvalidTileShape`] unless `hi - lo` is a power of
    /// four and `lo` is a multiple of it.
    pub fn new(lo: u64, hi: u64) -> HealpixResult<Self> {
        let index = range_to_uniq_index(lo, hi)?;
        Ok(Self {
            range: NestedRange::new_unchecked(lo, hi),
            level: index.level(),
        })
    }

    pub fn from_index(index: UniqIndex) -> Self {
        let (lo, hi) = index.to_range();
        Self {
            range: NestedRange::new_unchecked(lo, hi),
            level: index.level(),
        }
    }

    pub fn from_uniq(uniq: u64) -> HealpixResult<Self> {
        UniqIndex::from_uniq(uniq).map(Self::from_index)
    }

    pub fn from_level_pixel(level: u8, pixel: u64) -> HealpixResult<Self> {
        UniqIndex::new(level, pixel).map(Self::from_index)
    }

    /// The depth-29 leaf pixel containing `point`.
    pub fn leaf_of(point: &Point) -> Self {
        let nested = point.nested();
        Self {
            range: NestedRange::new_unchecked(nested, nested + 1),
            level: MAX_DEPTH,
        }
    }

    #[inline]
    pub fn lo(&self) -> u64 {
        self.range.lo()
    }

    #[inline]
    pub fn hi(&self) -> u64 {
        self.range.hi()
    }

    #[inline]
    pub fn range(&self) -> NestedRange {
        self.range
    }

    /// HEALPix level, `MAX_DEPTH - log4(hi - lo)`.
    #[inline]
    pub fn level(&self) -> u8 {
        self.level
    }

    /// Pixel number at this tile's own level.
    #[inline]
    pub fn pixel(&self) -> u64 {
        self.lo() >> crate::index::depth_shift(self.level)
    }

    #[inline]
    pub fn uniq_index(&self) -> UniqIndex {
        UniqIndex::new_unchecked(self.level, self.pixel())
    }

    #[inline]
    pub fn uniq(&self) -> u64 {
        self.uniq_index().uniq()
    }

    /// Solid angle in steradians.
    #[inline]
    pub fn area(&self) -> f64 {
        self.range.area()
    }

    /// `lo <= point.nested < hi`.
    #[inline]
    pub fn contains(&self, point: &Point) -> bool {
        self.range.contains_index(point.nested())
    }

    #[inline]
    pub fn contains_index(&self, nested: u64) -> bool {
        self.range.contains_index(nested)
    }

    #[inline]
    pub fn overlaps(&self, other: &Tile) -> bool {
        self.range.overlaps(&other.range)
    }

    /// Tiles never partially overlap: either one contains the other or
    /// they are disjoint.
    #[inline]
    pub fn contains_tile(&self, other: &Tile) -> bool {
        self.range.contains_range(&other.range)
    }

    /// The enclosing pixel one level up, `None` at level 0.
    pub fn parent(&self) -> Option<Tile> {
        if self.level == 0 {
            return None;
        }
        let width = self.range.len() << 2;
        let lo = self.lo() - self.lo() % width;
        Some(Self {
            range: NestedRange::new_unchecked(lo, lo + width),
            level: self.level - 1,
        })
    }

    /// The four sub-pixels one level down, `None` at [`MAX_DEPTH`].
    pub fn children(&self) -> Option<[Tile; 4]> {
        if self.level == MAX_DEPTH {
            return None;
        }
        let width = self.range.len() >> 2;
        let child = |i: u64| {
            let lo = self.lo() + i * width;
            Tile {
                range: NestedRange::new_unchecked(lo, lo + width),
                level: self.level + 1,
            }
        };
        Some([child(0), child(1), child(2), child(3)])
    }
}

impl From<UniqIndex> for Tile {
    fn from(index: UniqIndex) -> Self {
        Self::from_index(index)
    }
}

impl From<Tile> for NestedRange {
    fn from(tile: Tile) -> Self {
        tile.range
    }
}

impl TryFrom<NestedRange> for Tile {
    type Error = HealpixError;

    fn try_from(range: NestedRange) -> Result<Self, Self::Error> {
        Self::new(range.lo(), range.hi())
    }
}

impl fmt::Display for Tile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.range.fmt(f)
    }
}

/// Accepts either a `[lo,hi)` range literal or a bare UNIQ integer.
impl FromStr for Tile {
    type Err = HealpixError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let trimmed = s.trim();
        if trimmed.starts_with('[') {
            let range: NestedRange = trimmed.parse()?;
            return Self::try_from(range);
        }
        let uniq: u64 = trimmed
            .parse()
            .map_err(|e| HealpixError::parse(s, format!("UNIQ integer: {}", e)))?;
        Self::from_uniq(uniq)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::{width_at, NPIX, PIXEL_AREA};
    use crate::index::uniq_of;

    #[test]
    fn test_uniq_setter_matches_getter() {
        let uniq = uniq_of(3, 12).unwrap();
        let shift = 2 * (MAX_DEPTH as u32 - 3);
        let tile = Tile::from_uniq(uniq).unwrap();
        assert_eq!(tile.lo(), 12 << shift);
        assert_eq!(tile.hi(), 13 << shift);
        assert_eq!(tile.uniq(), uniq);
        assert_eq!(tile.uniq_index().to_string(), "3/12");
        assert_eq!(tile.pixel(), 12);
    }

    #[test]
    fn test_level_from_width() {
        assert_eq!(Tile::new(0, 1).unwrap().level(), MAX_DEPTH);
        assert_eq!(Tile::new(4, 8).unwrap().level(), MAX_DEPTH - 1);
        assert_eq!(Tile::new(0, width_at(0)).unwrap().level(), 0);
    }

    #[test]
    fn test_rejects_bad_shapes() {
        assert!(matches!(
            Tile::new(0, 12),
            Err(HealpixError::InvalidTileShape { .. })
        ));
        assert!(matches!(
            Tile::new(1, 5),
            Err(HealpixError::InvalidTileShape { .. })
        ));
        assert!(Tile::new(0, NPIX).is_err());
    }

    #[test]
    fn test_area() {
        let tile = Tile::new(0, 16).unwrap();
        assert_eq!(tile.area(), 16.0 * PIXEL_AREA);
    }

    #[test]
    fn test_contains_point() {
        let point = Point::new(45.0, 30.0).unwrap();
        let leaf = Tile::leaf_of(&point);
        assert!(leaf.contains(&point));
        let base = Tile::from_level_pixel(0, point.nested() >> 58).unwrap();
        assert!(base.contains(&point));
        assert!(base.contains_tile(&leaf));
        assert!(base.overlaps(&leaf));
    }

    #[test]
    fn test_parent_and_children() {
        let tile = Tile::from_level_pixel(2, 37).unwrap();
        let parent = tile.parent().unwrap();
        assert_eq!((parent.level(), parent.pixel()), (1, 9));
        assert!(parent.contains_tile(&tile));

        let children = tile.children().unwrap();
        assert_eq!(children[0].lo(), tile.lo());
        assert_eq!(children[3].hi(), tile.hi());
        for (i, child) in children.iter().enumerate() {
            assert_eq!(child.level(), 3);
            assert_eq!(child.pixel(), 37 * 4 + i as u64);
            assert_eq!(child.parent(), Some(tile));
        }

        assert_eq!(Tile::from_level_pixel(0, 5).unwrap().parent(), None);
        assert!(Tile::new(0, 1).unwrap().children().is_none());
    }

    #[test]
    fn test_ordering_by_bounds() {
        let a = Tile::new(0, 4).unwrap();
        let b = Tile::new(0, 16).unwrap();
        let c = Tile::new(4, 8).unwrap();
        let mut tiles = vec![c, b, a];
        tiles.sort();
        assert_eq!(tiles, vec![a, b, c]);
    }

    #[test]
    fn test_parse_range_or_uniq() {
        let tile: Tile = "[4,8)".parse().unwrap();
        assert_eq!(tile.level(), MAX_DEPTH - 1);
        let same: Tile = tile.uniq().to_string().parse().unwrap();
        assert_eq!(same, tile);
        assert!("[0,12)".parse::<Tile>().is_err());
        assert!("3".parse::<Tile>().is_err());
        assert!("x".parse::<Tile>().is_err());
        assert_eq!(tile.to_string(), "[4,8)");
    }
}
