//! Fixed pixelization parameters.
//!
//! Every index handled by this crate lives at [`MAX_DEPTH`]. A coarser pixel
//! is not stored by its own number but as the contiguous block of
//! `4^(MAX_DEPTH - level)` depth-29 indices it covers, which is what lets a
//! relational range column answer parent/child questions.

use celestial_core::constants::FOUR_PI;

/// Finest HEALPix depth whose pixel count fits a signed 64-bit integer.
///
/// `12 · 4^29 = 3 · 2^60 < 2^63`; depth 30 would need `3 · 2^62`.
pub const MAX_DEPTH: u8 = 29;

/// Number of pixels at [`MAX_DEPTH`]: `12 · 4^29`.
///
/// Exclusive upper bound of every nested range.
pub const NPIX: u64 = 12 << (2 * MAX_DEPTH as u32);

/// Number of base pixels (level 0).
pub const N_BASE_PIXELS: u64 = 12;

/// Solid angle of one depth-29 pixel, in steradians.
pub const PIXEL_AREA: f64 = FOUR_PI / NPIX as f64;

/// Number of pixels at `level`: `12 · 4^level`.
#[inline]
pub const fn npix_at(level: u8) -> u64 {
    N_BASE_PIXELS << (2 * level as u32)
}

/// Number of depth-29 indices covered by one pixel at `level`.
#[inline]
pub const fn width_at(level: u8) -> u64 {
    1 << (2 * (MAX_DEPTH - level) as u32)
}

const _: () = assert!(NPIX <= i64::MAX as u64);
const _: () = assert!(npix_at(MAX_DEPTH) == NPIX);

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_npix_values() {
        assert_eq!(npix_at(0), 12);
        assert_eq!(npix_at(1), 48);
        assert_eq!(NPIX, 3_458_764_513_820_540_928);
    }

    #[test]
    fn test_width_values() {
        assert_eq!(width_at(MAX_DEPTH), 1);
        assert_eq!(width_at(MAX_DEPTH - 1), 4);
        assert_eq!(width_at(0), 1 << 58);
        assert_eq!(width_at(0) * 12, NPIX);
    }

    #[test]
    fn test_pixel_area_sums_to_sphere() {
        assert_relative_eq!(PIXEL_AREA * NPIX as f64, FOUR_PI, max_relative = 1e-15);
    }
}
