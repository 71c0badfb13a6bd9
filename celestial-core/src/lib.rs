//! Shared numerics for the celestial crates.
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`constants`] | π multiples, degree/radian factors, sphere solid angle |
//! | [`errors`] | [`AstroError`], [`MathErrorKind`], [`AstroResult`] |
//! | [`math`] | `fmod`, degree sin/cos, Vincenty angular separation |
//! | [`utils`] | Longitude wrapping |
//! | [`vector3`] | [`Vector3`] Cartesian unit vectors |

pub mod constants;
pub mod errors;
pub mod math;
pub mod utils;
pub mod vector3;

pub use errors::{require_finite, AstroError, AstroResult, MathErrorKind};
pub use vector3::Vector3;
