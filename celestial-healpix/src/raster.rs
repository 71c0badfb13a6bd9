//! Region rasterization: polygons and cones to nested ranges.
//!
//! Turning a spherical polygon into pixels is delegated. [`PolygonRasterizer`]
//! is the seam. The crate ships [`CdsRasterizer`], backed by `cdshealpix`, and
//! coverage construction accepts any implementation so callers can plug in
//! a precomputed or remote pixelization.
//!
//! Rasterizer output is raw: ranges may be unsorted, adjacent, or (for
//! implementations other than `cdshealpix`) overlapping. Coalescing is the
//! job of [`CoverageSet::from_ranges`](crate::CoverageSet::from_ranges).

use celestial_core::constants::DEG_TO_RAD;
use cdshealpix::nested::bmoc::BMOC;
use tracing::{debug, trace};

use crate::constants::MAX_DEPTH;
use crate::errors::{HealpixError, HealpixResult};
use crate::index::UniqIndex;
use crate::point::Point;
use crate::range::NestedRange;

/// Converts sky regions into depth-29 index ranges.
pub trait PolygonRasterizer {
    /// Ranges covering the polygon with the given vertices, in order.
    fn rasterize_polygon(&self, vertices: &[Point]) -> HealpixResult<Vec<NestedRange>>;

    /// Ranges covering the cone of `radius_deg` around `center`.
    fn rasterize_cone(&self, center: &Point, radius_deg: f64) -> HealpixResult<Vec<NestedRange>>;
}

/// `cdshealpix`-backed rasterizer.
///
/// `depth` bounds the finest cells produced; boundary cells are emitted at
/// that depth and interior cells at the coarsest depth that fits. With
/// `exact = true` the extreme points of each great-circle edge are tested
/// too, so boundary cells that only an edge's bulge reaches are not missed.
///
/// Exact polygon coverage cannot handle an edge running along a meridian
/// (both ends at the same longitude). Such polygons are rasterized
/// approximately instead.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "RawRasterizer", into = "RawRasterizer"))]
pub struct CdsRasterizer {
    depth: u8,
    exact: bool,
}

impl CdsRasterizer {
    pub const DEFAULT_DEPTH: u8 = 12;

    /// # Errors
    /// [`HealpixError::InvalidIndex`] if `depth > MAX_DEPTH`.
    pub fn new(depth: u8, exact: bool) -> HealpixResult<Self> {
        if depth > MAX_DEPTH {
            return Err(HealpixError::invalid_index(
                depth as u64,
                format!("rasterization depth above maximum {}", MAX_DEPTH),
            ));
        }
        Ok(Self { depth, exact })
    }

    #[inline]
    pub fn depth(&self) -> u8 {
        self.depth
    }

    #[inline]
    pub fn exact(&self) -> bool {
        self.exact
    }

    fn collect(&self, bmoc: &BMOC) -> HealpixResult<Vec<NestedRange>> {
        let mut ranges = Vec::new();
        for cell in bmoc {
            let index = UniqIndex::new(cell.depth, cell.hash)?;
            let (lo, hi) = index.to_range();
            ranges.push(NestedRange::new_unchecked(lo, hi));
        }
        trace!(cells = ranges.len(), depth = self.depth, "collected rasterized cells");
        Ok(ranges)
    }
}

impl Default for CdsRasterizer {
    fn default() -> Self {
        Self {
            depth: Self::DEFAULT_DEPTH,
            exact: false,
        }
    }
}

impl PolygonRasterizer for CdsRasterizer {
    fn rasterize_polygon(&self, vertices: &[Point]) -> HealpixResult<Vec<NestedRange>> {
        if vertices.len() < 3 {
            return Err(HealpixError::invalid_coordinate(format!(
                "polygon needs at least 3 vertices, got {}",
                vertices.len()
            )));
        }
        let radians: Vec<(f64, f64)> = vertices
            .iter()
            .map(|v| (v.lon() * DEG_TO_RAD, v.lat() * DEG_TO_RAD))
            .collect();
        let exact = self.exact && !has_meridian_edge(vertices);
        debug!(
            vertices = vertices.len(),
            depth = self.depth,
            exact,
            requested_exact = self.exact,
            "rasterizing polygon"
        );
        let bmoc = cdshealpix::nested::polygon_coverage(self.depth, &radians, exact);
        self.collect(&bmoc)
    }

    fn rasterize_cone(&self, center: &Point, radius_deg: f64) -> HealpixResult<Vec<NestedRange>> {
        if !radius_deg.is_finite() || radius_deg <= 0.0 || radius_deg >= 180.0 {
            return Err(HealpixError::invalid_coordinate(format!(
                "cone radius {}° outside (0°, 180°)",
                radius_deg
            )));
        }
        debug!(
            lon = center.lon(),
            lat = center.lat(),
            radius_deg,
            depth = self.depth,
            "rasterizing cone"
        );
        let bmoc = cdshealpix::nested::cone_coverage_approx(
            self.depth,
            center.lon() * DEG_TO_RAD,
            center.lat() * DEG_TO_RAD,
            radius_deg * DEG_TO_RAD,
        );
        self.collect(&bmoc)
    }
}

/// `true` if two consecutive vertices, including last to first, share a
/// longitude.
fn has_meridian_edge(vertices: &[Point]) -> bool {
    let next = vertices.iter().cycle().skip(1);
    vertices.iter().zip(next).any(|(a, b)| a.lon() == b.lon())
}

#[cfg(feature = "serde")]
#[derive(serde::Serialize, serde::Deserialize)]
struct RawRasterizer {
    depth: u8,
    exact: bool,
}

#[cfg(feature = "serde")]
impl TryFrom<RawRasterizer> for CdsRasterizer {
    type Error = HealpixError;

    fn try_from(raw: RawRasterizer) -> Result<Self, Self::Error> {
        Self::new(raw.depth, raw.exact)
    }
}

#[cfg(feature = "serde")]
impl From<CdsRasterizer> for RawRasterizer {
    fn from(rasterizer: CdsRasterizer) -> Self {
        Self {
            depth: rasterizer.depth,
            exact: rasterizer.exact,
        }
    }
}
