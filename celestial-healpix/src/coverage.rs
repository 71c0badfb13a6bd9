//! Multi-order coverage: a sky region as merged nested ranges.
//!
//! A [`CoverageSet`] is a sorted, pairwise disjoint, minimal list of
//! [`NestedRange`]s. Minimal means no two members touch: `[0,4)` and `[4,8)`
//! are always stored as `[0,8)`. Every constructor and every set operation
//! re-establishes this, so membership tests can binary search and two
//! coverages can be merged in a single linear pass.
//!
//! ```
//! use celestial_healpix::{CoverageSet, NestedRange};
//!
//! let a = CoverageSet::from_ranges([NestedRange::new(0, 4).unwrap()]);
//! let b = CoverageSet::from_ranges([NestedRange::new(4, 8).unwrap()]);
//! let merged = a.union(&b);
//! assert_eq!(merged.to_range_list(), vec![(0, 8)]);
//! ```
//!
//! An empty region is a valid value: [`CoverageSet::new`] holds no ranges
//! and has zero area, and so does any coverage built from an empty
//! rasterization.

use std::fmt;
use std::slice;

use tracing::debug;

use crate::constants::{MAX_DEPTH, NPIX};
use crate::errors::HealpixResult;
use crate::index::UniqIndex;
use crate::point::Point;
use crate::range::NestedRange;
use crate::raster::PolygonRasterizer;
use crate::tile::Tile;

#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(from = "Vec<NestedRange>", into = "Vec<NestedRange>"))]
pub struct CoverageSet {
    ranges: Vec<NestedRange>,
}

impl CoverageSet {
    /// The empty region.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn full_sky() -> Self {
        Self {
            ranges: vec![NestedRange::full_sky()],
        }
    }

    /// Sorts by lower bound and coalesces overlapping or adjacent ranges.
    pub fn from_ranges<I>(ranges: I) -> Self
    where
        I: IntoIterator<Item = NestedRange>,
    {
        let mut sorted: Vec<NestedRange> = ranges.into_iter().collect();
        let input = sorted.len();
        sorted.sort_unstable();

        let mut merged: Vec<NestedRange> = Vec::with_capacity(sorted.len());
        for next in sorted {
            push_merged(&mut merged, next);
        }
        merged.shrink_to_fit();
        debug!(input, merged = merged.len(), "coalesced coverage ranges");
        Self { ranges: merged }
    }

    pub fn from_tiles<I>(tiles: I) -> Self
    where
        I: IntoIterator<Item = Tile>,
    {
        Self::from_ranges(tiles.into_iter().map(NestedRange::from))
    }

    /// # Errors
    /// The first UNIQ value that fails to decode.
    pub fn from_uniqs<I>(uniqs: I) -> HealpixResult<Self>
    where
        I: IntoIterator<Item = u64>,
    {
        let tiles = uniqs
            .into_iter()
            .map(Tile::from_uniq)
            .collect::<HealpixResult<Vec<_>>>()?;
        Ok(Self::from_tiles(tiles))
    }

    /// Builds from `(level, pixel)` cells such as a pixelization library
    /// emits.
    pub fn from_cells<I>(cells: I) -> HealpixResult<Self>
    where
        I: IntoIterator<Item = (u8, u64)>,
    {
        let tiles = cells
            .into_iter()
            .map(|(level, pixel)| Tile::from_level_pixel(level, pixel))
            .collect::<HealpixResult<Vec<_>>>()?;
        Ok(Self::from_tiles(tiles))
    }

    /// Rasterizes a polygon and coalesces the result.
    pub fn from_polygon<R>(rasterizer: &R, vertices: &[Point]) -> HealpixResult<Self>
    where
        R: PolygonRasterizer + ?Sized,
    {
        Ok(Self::from_ranges(rasterizer.rasterize_polygon(vertices)?))
    }

    pub fn from_cone<R>(rasterizer: &R, center: &Point, radius_deg: f64) -> HealpixResult<Self>
    where
        R: PolygonRasterizer + ?Sized,
    {
        Ok(Self::from_ranges(rasterizer.rasterize_cone(center, radius_deg)?))
    }

    /// Two-pointer merge, `O(n + m)`.
    pub fn union(&self, other: &Self) -> Self {
        let (a, b) = (&self.ranges, &other.ranges);
        let mut merged = Vec::with_capacity(a.len() + b.len());
        let (mut i, mut j) = (0, 0);
        while i < a.len() || j < b.len() {
            let take_a = j == b.len() || (i < a.len() && a[i] <= b[j]);
            let next = if take_a {
                i += 1;
                a[i - 1]
            } else {
                j += 1;
                b[j - 1]
            };
            push_merged(&mut merged, next);
        }
        Self { ranges: merged }
    }

    /// Union of any number of coverages.
    pub fn union_all<'a, I>(coverages: I) -> Self
    where
        I: IntoIterator<Item = &'a CoverageSet>,
    {
        Self::from_ranges(
            coverages
                .into_iter()
                .flat_map(|coverage| coverage.ranges.iter().copied()),
        )
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.ranges.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.ranges.is_empty()
    }

    #[inline]
    pub fn ranges(&self) -> &[NestedRange] {
        &self.ranges
    }

    pub fn iter(&self) -> slice::Iter<'_, NestedRange> {
        self.ranges.iter()
    }

    /// Number of depth-29 pixels covered.
    pub fn pixel_count(&self) -> u64 {
        self.ranges.iter().map(NestedRange::len).sum()
    }

    /// Solid angle in steradians, summed in sorted order.
    pub fn total_area(&self) -> f64 {
        self.ranges.iter().map(NestedRange::area).sum()
    }

    /// Fraction of the sphere covered, in `[0, 1]`.
    pub fn sky_fraction(&self) -> f64 {
        self.pixel_count() as f64 / NPIX as f64
    }

    /// Position of the first member whose upper bound is above `nested`.
    fn first_ending_after(&self, nested: u64) -> usize {
        self.ranges.partition_point(|range| range.hi() <= nested)
    }

    pub fn contains_index(&self, nested: u64) -> bool {
        self.ranges
            .get(self.first_ending_after(nested))
            .is_some_and(|range| range.lo() <= nested)
    }

    #[inline]
    pub fn contains_point(&self, point: &Point) -> bool {
        self.contains_index(point.nested())
    }

    /// `true` if every index of `range` is covered. Members are minimal, so
    /// this holds only when a single member contains the whole range.
    pub fn contains_range(&self, range: &NestedRange) -> bool {
        self.ranges
            .get(self.first_ending_after(range.lo()))
            .is_some_and(|member| member.contains_range(range))
    }

    pub fn intersects_range(&self, range: &NestedRange) -> bool {
        self.ranges
            .get(self.first_ending_after(range.lo()))
            .is_some_and(|member| member.lo() < range.hi())
    }

    #[inline]
    pub fn intersects_tile(&self, tile: &Tile) -> bool {
        self.intersects_range(&tile.range())
    }

    /// `true` if the two regions share at least one pixel.
    pub fn overlaps(&self, other: &Self) -> bool {
        let (a, b) = (&self.ranges, &other.ranges);
        let (mut i, mut j) = (0, 0);
        while i < a.len() && j < b.len() {
            if a[i].overlaps(&b[j]) {
                return true;
            }
            if a[i].hi() <= b[j].hi() {
                i += 1;
            } else {
                j += 1;
            }
        }
        false
    }

    /// Number of depth-29 pixels shared with `range`.
    pub fn overlap_len(&self, range: &NestedRange) -> u64 {
        self.ranges[self.first_ending_after(range.lo())..]
            .iter()
            .take_while(|member| member.lo() < range.hi())
            .map(|member| member.hi().min(range.hi()) - member.lo().max(range.lo()))
            .sum()
    }

    /// Splits every member into the fewest aligned hierarchical tiles,
    /// ordered by lower bound. This is the UNIQ interchange form of the
    /// region.
    pub fn to_tiles(&self) -> Vec<Tile> {
        let mut tiles = Vec::new();
        for range in &self.ranges {
            let (mut lo, hi) = (range.lo(), range.hi());
            while lo < hi {
                let steps = largest_aligned_steps(lo, hi - lo);
                let level = MAX_DEPTH - steps as u8;
                tiles.push(Tile::from_index(UniqIndex::new_unchecked(
                    level,
                    lo >> (2 * steps),
                )));
                lo += 1 << (2 * steps);
            }
        }
        tiles
    }

    pub fn to_uniqs(&self) -> Vec<u64> {
        self.to_tiles().iter().map(Tile::uniq).collect()
    }

    pub fn to_range_list(&self) -> Vec<(u64, u64)> {
        self.ranges.iter().map(|&range| range.into()).collect()
    }

    /// Members in the persisted `[lo,hi)` text form, one row each.
    pub fn to_range_literals(&self) -> Vec<String> {
        self.ranges.iter().map(NestedRange::to_string).collect()
    }
}

/// Appends `next` (not below the last member) to a sorted, minimal list.
fn push_merged(merged: &mut Vec<NestedRange>, next: NestedRange) {
    match merged.last_mut() {
        Some(last) if next.lo() <= last.hi() => {
            if next.hi() > last.hi() {
                *last = NestedRange::new_unchecked(last.lo(), next.hi());
            }
        }
        _ => merged.push(next),
    }
}

/// Largest `k ≤ MAX_DEPTH` with `4^k` dividing `lo` and `4^k ≤ len`.
fn largest_aligned_steps(lo: u64, len: u64) -> u32 {
    let by_alignment = if lo == 0 {
        MAX_DEPTH as u32
    } else {
        (lo.trailing_zeros() / 2).min(MAX_DEPTH as u32)
    };
    let by_length = (63 - len.leading_zeros()) / 2;
    by_alignment.min(by_length)
}

impl From<Vec<NestedRange>> for CoverageSet {
    fn from(ranges: Vec<NestedRange>) -> Self {
        Self::from_ranges(ranges)
    }
}

impl From<CoverageSet> for Vec<NestedRange> {
    fn from(coverage: CoverageSet) -> Self {
        coverage.ranges
    }
}

impl FromIterator<NestedRange> for CoverageSet {
    fn from_iter<I: IntoIterator<Item = NestedRange>>(iter: I) -> Self {
        Self::from_ranges(iter)
    }
}

impl FromIterator<Tile> for CoverageSet {
    fn from_iter<I: IntoIterator<Item = Tile>>(iter: I) -> Self {
        Self::from_tiles(iter)
    }
}

impl<'a> IntoIterator for &'a CoverageSet {
    type Item = &'a NestedRange;
    type IntoIter = slice::Iter<'a, NestedRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.iter()
    }
}

impl IntoIterator for CoverageSet {
    type Item = NestedRange;
    type IntoIter = std::vec::IntoIter<NestedRange>;

    fn into_iter(self) -> Self::IntoIter {
        self.ranges.into_iter()
    }
}

impl fmt::Display for CoverageSet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("{")?;
        for (i, range) in self.ranges.iter().enumerate() {
            if i > 0 {
                f.write_str(",")?;
            }
            write!(f, "{}", range)?;
        }
        f.write_str("}")
    }
}
