//! Error types for coordinate validation in geogallery-types.

use thiserror::Error;

/// Errors that can occur when building or parsing a [`Coord`](crate::Coord).
///
/// This enum is marked `#[non_exhaustive]` to allow adding new error variants
/// in future versions without breaking downstream code.
#[derive(Debug, Clone, PartialEq, Error)]
#[non_exhaustive]
pub enum CoordError {
    /// Latitude outside [-90, 90] or not a finite number.
    #[error("Invalid latitude {0}: must be between -90 and 90")]
    LatitudeOutOfRange(f64),

    /// Longitude outside [-180, 180] or not a finite number.
    #[error("Invalid longitude {0}: must be between -180 and 180")]
    LongitudeOutOfRange(f64),

    /// Text could not be parsed as a `lat,lon` pair.
    #[error("Invalid coordinate '{0}': expected 'lat,lon'")]
    Malformed(String),
}

/// Result type alias using geogallery-types' CoordError type.
pub type CoordResult<T> = std::result::Result<T, CoordError>;
