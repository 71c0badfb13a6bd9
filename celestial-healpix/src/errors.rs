use celestial_core::AstroError;
use thiserror::Error;

pub type HealpixResult<T> = Result<T, HealpixError>;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum HealpixError {
    /// UNIQ value or (level, pixel) pair outside the representable range.
    #[error("Invalid HEALPix index {value}: {message}")]
    InvalidIndex { value: u64, message: String },

    /// A range that does not cover exactly one hierarchical pixel.
    #[error("Invalid tile shape [{lo},{hi}): {message}")]
    InvalidTileShape { lo: u64, hi: u64, message: String },

    /// A range that is empty, reversed, or extends past the last pixel.
    #[error("Invalid nested range [{lo},{hi}): {message}")]
    InvalidRange { lo: u64, hi: u64, message: String },

    #[error("Invalid coordinate: {message}")]
    InvalidCoordinate { message: String },

    #[error("Invalid sky map: {message}")]
    InvalidSkyMap { message: String },

    #[error("Cannot parse '{input}': {message}")]
    Parse { input: String, message: String },

    #[error("Core calculation failed: {source}")]
    Core {
        #[from]
        source: AstroError,
    },
}

impl HealpixError {
    pub fn invalid_index(value: u64, message: impl Into<String>) -> Self {
        Self::InvalidIndex {
            value,
            message: message.into(),
        }
    }

    pub fn invalid_tile_shape(lo: u64, hi: u64, message: impl Into<String>) -> Self {
        Self::InvalidTileShape {
            lo,
            hi,
            message: message.into(),
        }
    }

    pub fn invalid_range(lo: u64, hi: u64, message: impl Into<String>) -> Self {
        Self::InvalidRange {
            lo,
            hi,
            message: message.into(),
        }
    }

    pub fn invalid_coordinate(message: impl Into<String>) -> Self {
        Self::InvalidCoordinate {
            message: message.into(),
        }
    }

    pub fn invalid_sky_map(message: impl Into<String>) -> Self {
        Self::InvalidSkyMap {
            message: message.into(),
        }
    }

    pub fn parse(input: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Parse {
            input: input.into(),
            message: message.into(),
        }
    }
}
