//! Sky positions and their cached index forms.
//!
//! A [`Point`] owns a longitude and latitude in degrees. Two derived values
//! ride along with it:
//!
//! - the Cartesian unit vector, used by the proximity predicate and as a
//!   B-tree-friendly index key;
//! - the depth-29 nested pixel index, used for equality and range joins
//!   against tiles.
//!
//! Neither is authoritative. Both are recomputed in [`Point::new`] and
//! [`Point::set_position`], the only ways to change the coordinates, so the
//! caches cannot drift from lon/lat.
//!
//! Pixelization itself is delegated to `cdshealpix`.

use celestial_core::constants::{DEG_TO_RAD, HALF_PI, RAD_TO_DEG};
use celestial_core::utils::wrap_longitude_deg;
use celestial_core::{require_finite, AstroError, MathErrorKind, Vector3};

use crate::constants::{MAX_DEPTH, NPIX};
use crate::errors::{HealpixError, HealpixResult};

/// Bare coordinates, the persisted form of a [`Point`].
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LonLat {
    /// Longitude in degrees.
    pub lon: f64,
    /// Latitude in degrees.
    pub lat: f64,
}

/// A position on the unit sphere with cached Cartesian and nested forms.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(try_from = "LonLat", into = "LonLat"))]
pub struct Point {
    lon: f64,
    lat: f64,
    cartesian: Vector3,
    nested: u64,
}

impl Point {
    /// Longitude is wrapped into `[0°, 360°)`.
    ///
    /// # Errors
    /// A [`MathErrorKind::NotFinite`] or [`MathErrorKind::OutOfRange`] core
    /// error if either coordinate is not finite or `|lat| > 90°`.
    pub fn new(lon: f64, lat: f64) -> HealpixResult<Self> {
        let (lon, lat) = validate_lon_lat(lon, lat)?;
        Ok(Self {
            lon,
            lat,
            cartesian: to_cartesian(lon, lat),
            nested: hash_unchecked(lon, lat),
        })
    }

    /// Moves the point, recomputing the cached Cartesian vector and nested
    /// index. On error the point is left unchanged.
    pub fn set_position(&mut self, lon: f64, lat: f64) -> HealpixResult<()> {
        *self = Self::new(lon, lat)?;
        Ok(())
    }

    /// Longitude in degrees, `[0, 360)`.
    #[inline]
    pub fn lon(&self) -> f64 {
        self.lon
    }

    /// Latitude in degrees, `[-90, 90]`.
    #[inline]
    pub fn lat(&self) -> f64 {
        self.lat
    }

    #[inline]
    pub fn cartesian(&self) -> Vector3 {
        self.cartesian
    }

    /// Depth-29 nested index of the leaf pixel containing the point.
    #[inline]
    pub fn nested(&self) -> u64 {
        self.nested
    }

    /// See [`crate::proximity::within`].
    #[inline]
    pub fn within(&self, other: &Point, radius_deg: f64) -> bool {
        crate::proximity::within(self, other, radius_deg)
    }
}

impl TryFrom<LonLat> for Point {
    type Error = HealpixError;

    fn try_from(value: LonLat) -> Result<Self, Self::Error> {
        Self::new(value.lon, value.lat)
    }
}

impl From<Point> for LonLat {
    fn from(point: Point) -> Self {
        Self {
            lon: point.lon,
            lat: point.lat,
        }
    }
}

fn validate_lon_lat(lon: f64, lat: f64) -> Result<(f64, f64), AstroError> {
    let lon = require_finite("point encode", "longitude", lon)?;
    let lat = require_finite("point encode", "latitude", lat)?;
    if !(-90.0..=90.0).contains(&lat) {
        return Err(AstroError::math_error(
            "point encode",
            MathErrorKind::OutOfRange,
            &format!("latitude {}° outside [-90°, +90°]", lat),
        ));
    }
    Ok((wrap_longitude_deg(lon), lat))
}

fn hash_unchecked(lon: f64, lat: f64) -> u64 {
    let lat_rad = (lat * DEG_TO_RAD).clamp(-HALF_PI, HALF_PI);
    cdshealpix::nested::hash(MAX_DEPTH, lon * DEG_TO_RAD, lat_rad)
}

/// Depth-29 nested index of the pixel containing `(lon, lat)` in degrees.
///
/// # Errors
/// Same domain checks as [`Point::new`].
pub fn encode(lon: f64, lat: f64) -> HealpixResult<u64> {
    let (lon, lat) = validate_lon_lat(lon, lat)?;
    Ok(hash_unchecked(lon, lat))
}

/// Center of a depth-29 pixel as `(lon, lat)` in degrees.
///
/// # Errors
/// [`HealpixError::InvalidIndex`] if `nested >= NPIX`.
pub fn decode(nested: u64) -> HealpixResult<(f64, f64)> {
    if nested >= NPIX {
        return Err(HealpixError::invalid_index(
            nested,
            format!("nested index out of range [0, {})", NPIX),
        ));
    }
    let (lon, lat) = cdshealpix::nested::center(MAX_DEPTH, nested);
    Ok((lon * RAD_TO_DEG, lat * RAD_TO_DEG))
}

/// `(cos lon cos lat, sin lon cos lat, sin lat)` for degrees input.
#[inline]
pub fn to_cartesian(lon: f64, lat: f64) -> Vector3 {
    Vector3::from_lon_lat_deg(lon, lat)
}
