//! Cartesian unit vectors for positions on the celestial sphere.
//!
//! Angular-distance tests are cheapest in Cartesian form: for unit vectors,
//! `a.dot(&b)` is the cosine of their separation, so "within r degrees"
//! becomes `a.dot(&b) >= cos(r)` with no inverse trigonometry. The
//! components also make good index keys, since a small cone maps to a
//! small axis-aligned box.
//!
//! ```
//! use celestial_core::Vector3;
//!
//! let a = Vector3::from_lon_lat_deg(0.0, 0.0);
//! let b = Vector3::from_lon_lat_deg(90.0, 0.0);
//! assert!(a.dot(&b).abs() < 1e-15);
//! ```
//!
//! The spherical convention matches astronomical practice: longitude is
//! measured from +X toward +Y, latitude from the XY plane toward +Z.

/// A 3D Cartesian vector.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Vector3 {
    pub x: f64,
    pub y: f64,
    pub z: f64,
}

impl Vector3 {
    #[inline]
    pub fn new(x: f64, y: f64, z: f64) -> Self {
        Self { x, y, z }
    }

    /// Unit vector from longitude and latitude in degrees,
    /// `(cos lat cos lon, cos lat sin lon, sin lat)`.
    ///
    /// ```
    /// use celestial_core::Vector3;
    ///
    /// let pole = Vector3::from_lon_lat_deg(123.0, 90.0);
    /// assert!((pole.z - 1.0).abs() < 1e-15);
    /// ```
    pub fn from_lon_lat_deg(lon_deg: f64, lat_deg: f64) -> Self {
        let (sin_lon, cos_lon) = crate::math::sincos_deg(lon_deg);
        let (sin_lat, cos_lat) = crate::math::sincos_deg(lat_deg);
        Self::new(cos_lat * cos_lon, cos_lat * sin_lon, sin_lat)
    }

    /// Computes the dot product.
    ///
    /// For unit vectors this equals the cosine of the angle between them.
    #[inline]
    pub fn dot(&self, other: &Self) -> f64 {
        self.x * other.x + self.y * other.y + self.z * other.z
    }

    /// Largest per-axis absolute difference (Chebyshev distance).
    #[inline]
    pub fn max_axis_delta(&self, other: &Self) -> f64 {
        (self.x - other.x)
            .abs()
            .max((self.y - other.y).abs())
            .max((self.z - other.z).abs())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_abs_diff_eq;

    #[test]
    fn test_axes() {
        let v = Vector3::from_lon_lat_deg(0.0, 0.0);
        assert_abs_diff_eq!(v.x, 1.0, epsilon = 1e-15);
        assert_abs_diff_eq!(v.y, 0.0, epsilon = 1e-15);

        let v = Vector3::from_lon_lat_deg(90.0, 0.0);
        assert_abs_diff_eq!(v.y, 1.0, epsilon = 1e-15);

        let v = Vector3::from_lon_lat_deg(0.0, -90.0);
        assert_abs_diff_eq!(v.z, -1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_unit_length() {
        let v = Vector3::from_lon_lat_deg(45.0, 30.0);
        assert_abs_diff_eq!(v.dot(&v), 1.0, epsilon = 1e-15);
    }

    #[test]
    fn test_dot_is_cosine_of_separation() {
        let a = Vector3::from_lon_lat_deg(10.0, 0.0);
        let b = Vector3::from_lon_lat_deg(70.0, 0.0);
        assert_abs_diff_eq!(a.dot(&b), 0.5, epsilon = 1e-14);
        assert_eq!(Vector3::new(1.0, 2.0, 3.0).dot(&Vector3::new(4.0, 5.0, 6.0)), 32.0);
    }

    #[test]
    fn test_max_axis_delta() {
        let a = Vector3::new(1.0, 2.0, 3.0);
        let b = Vector3::new(1.5, 0.0, 3.25);
        assert_eq!(a.max_axis_delta(&b), 2.0);
        assert_eq!(b.max_axis_delta(&a), 2.0);
    }
}
