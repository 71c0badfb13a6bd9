//! Error types shared by the celestial crates.
//!
//! [`AstroError`] covers the numerical failures that can occur below the
//! level of any particular pixelization: non-finite input and values outside
//! their physical domain. Pixel-level errors wrap it.
//!
//! Checks return [`AstroResult<T>`], which is `Result<T, AstroError>`.
//!
//! ```
//! use celestial_core::{AstroError, MathErrorKind};
//!
//! fn checked_latitude(lat_deg: f64) -> Result<f64, AstroError> {
//!     if !(-90.0..=90.0).contains(&lat_deg) {
//!         return Err(AstroError::math_error(
//!             "checked_latitude",
//!             MathErrorKind::OutOfRange,
//!             "latitude outside [-90°, +90°]",
//!         ));
//!     }
//!     Ok(lat_deg)
//! }
//!
//! assert!(checked_latitude(91.0).is_err());
//! ```

use thiserror::Error;

/// Classification of mathematical errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MathErrorKind {
    /// Input or result is NaN or infinity.
    NotFinite,
    /// Value outside valid domain (e.g., latitude > 90°).
    OutOfRange,
}

/// Unified error type for low-level numerical work.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum AstroError {
    /// Numerical computation failure.
    #[error("Math error in {operation} ({kind:?}): {message}")]
    MathError {
        operation: String,
        kind: MathErrorKind,
        message: String,
    },
}

/// Convenience alias for `Result<T, AstroError>`.
pub type AstroResult<T> = Result<T, AstroError>;

impl AstroError {
    /// Creates a [`MathError`](Self::MathError) with the given kind.
    pub fn math_error(operation: &str, kind: MathErrorKind, reason: &str) -> Self {
        Self::MathError {
            operation: operation.to_string(),
            kind,
            message: reason.to_string(),
        }
    }

    /// Returns the [`MathErrorKind`] for math errors, `None` otherwise.
    pub fn math_kind(&self) -> Option<MathErrorKind> {
        match self {
            Self::MathError { kind, .. } => Some(*kind),
        }
    }
}

/// Rejects NaN and infinities with a [`MathErrorKind::NotFinite`] error.
pub fn require_finite(operation: &str, name: &str, value: f64) -> AstroResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(AstroError::math_error(
            operation,
            MathErrorKind::NotFinite,
            &format!("{} is not finite ({})", name, value),
        ))
    }
}
