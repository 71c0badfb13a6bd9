//! Angular proximity between points.
//!
//! [`within`] is evaluated in two stages. A per-axis bounding box on the
//! Cartesian components is tested first; it maps directly onto a composite
//! index over `(x, y, z)` and discards most candidates. Survivors then get
//! the exact test: the dot product of the unit vectors, which is the cosine
//! of their separation, must be at least `cos r`.
//!
//! The box is only a prefilter. Two points can sit inside each other's box
//! and still be farther apart than `r`, so the dot product test always runs.

use celestial_core::constants::{DEG_TO_RAD, RAD_TO_DEG};
use celestial_core::math::{sincos_deg, vincenty_angular_separation};
use celestial_core::Vector3;
use tracing::debug;

use crate::point::Point;

/// Axis-aligned box of half-width `2 sin r` around a unit vector.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BoundingBox {
    center: Vector3,
    half_width: f64,
}

impl BoundingBox {
    pub fn around(center: &Point, radius_deg: f64) -> Self {
        Self {
            center: center.cartesian(),
            half_width: box_half_width(radius_deg),
        }
    }

    #[inline]
    pub fn half_width(&self) -> f64 {
        self.half_width
    }

    pub fn contains(&self, point: &Point) -> bool {
        self.center.max_axis_delta(&point.cartesian()) <= self.half_width
    }

    /// `(min, max)` of the box along x.
    pub fn x_bounds(&self) -> (f64, f64) {
        (self.center.x - self.half_width, self.center.x + self.half_width)
    }
}

/// For radii of 90° or more the box spans every axis.
fn box_half_width(radius_deg: f64) -> f64 {
    if radius_deg >= 90.0 {
        2.0
    } else {
        2.0 * sincos_deg(radius_deg).0
    }
}

/// Every separation is at most 180°, so wider radii match everything.
fn min_cos_radius(radius_deg: f64) -> f64 {
    if radius_deg >= 180.0 {
        f64::NEG_INFINITY
    } else {
        sincos_deg(radius_deg).1
    }
}

/// `true` if `a` and `b` are at most `radius_deg` apart.
///
/// Symmetric in `a` and `b`. A negative or NaN radius matches nothing; a
/// radius of 180° or more matches every pair.
pub fn within(a: &Point, b: &Point, radius_deg: f64) -> bool {
    if radius_deg.is_nan() || radius_deg < 0.0 {
        return false;
    }
    within_prepared(a, b, box_half_width(radius_deg), min_cos_radius(radius_deg))
}

#[inline]
fn within_prepared(a: &Point, b: &Point, half_width: f64, cos_radius: f64) -> bool {
    let (va, vb) = (a.cartesian(), b.cartesian());
    va.max_axis_delta(&vb) <= half_width && va.dot(&vb) >= cos_radius
}

/// Great-circle separation in degrees (Vincenty formula, stable at all
/// distances).
pub fn angular_separation_deg(a: &Point, b: &Point) -> f64 {
    let (sin_lat1, cos_lat1) = sincos_deg(a.lat());
    let (sin_lat2, cos_lat2) = sincos_deg(b.lat());
    let delta_lon = (b.lon() - a.lon()) * DEG_TO_RAD;
    vincenty_angular_separation(sin_lat1, cos_lat1, sin_lat2, cos_lat2, delta_lon) * RAD_TO_DEG
}

/// All pairs `(i, j)` with `within(&left[i], &right[j], radius_deg)`,
/// ordered by `i` then `j`.
///
/// `right` is sorted once by its x component; each left point then scans
/// only the slice inside its box's x bounds.
pub fn match_within(left: &[Point], right: &[Point], radius_deg: f64) -> Vec<(usize, usize)> {
    if radius_deg.is_nan() || radius_deg < 0.0 {
        return Vec::new();
    }
    let half_width = box_half_width(radius_deg);
    let cos_radius = min_cos_radius(radius_deg);

    let mut by_x: Vec<(f64, usize)> = right
        .iter()
        .enumerate()
        .map(|(j, p)| (p.cartesian().x, j))
        .collect();
    by_x.sort_by(|a, b| a.0.total_cmp(&b.0));

    let mut pairs = Vec::new();
    for (i, a) in left.iter().enumerate() {
        let bbox = BoundingBox {
            center: a.cartesian(),
            half_width,
        };
        let (x_min, x_max) = bbox.x_bounds();
        let start = by_x.partition_point(|&(bx, _)| bx < x_min);
        let end = by_x.partition_point(|&(bx, _)| bx <= x_max);
        let first = pairs.len();
        for &(_, j) in &by_x[start..end] {
            if within_prepared(a, &right[j], half_width, cos_radius) {
                pairs.push((i, j));
            }
        }
        pairs[first..].sort_unstable();
    }
    debug!(
        left = left.len(),
        right = right.len(),
        radius_deg,
        matches = pairs.len(),
        "matched points within radius"
    );
    pairs
}
