//! Longitude helpers.
//!
//! Sky longitudes (right ascension, galactic longitude) are stored in
//! `[0°, 360°)`; [`wrap_longitude_deg`] brings any finite angle into that
//! range.

use crate::math::fmod;

/// Wraps a longitude in degrees to `[0°, 360°)`.
///
/// ```
/// use celestial_core::utils::wrap_longitude_deg;
///
/// assert_eq!(wrap_longitude_deg(370.0), 10.0);
/// assert_eq!(wrap_longitude_deg(-90.0), 270.0);
/// assert_eq!(wrap_longitude_deg(360.0), 0.0);
/// ```
#[inline]
pub fn wrap_longitude_deg(lon: f64) -> f64 {
    let w = fmod(lon, 360.0);
    let w = if w < 0.0 { w + 360.0 } else { w };
    // -1e-20 + 360.0 rounds to 360.0
    if w >= 360.0 {
        0.0
    } else {
        w
    }
}
