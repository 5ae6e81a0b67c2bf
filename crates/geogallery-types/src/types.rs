//! Core coordinate types and great-circle math.

use core::fmt;
use core::str::FromStr;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::error::CoordError;

/// Mean Earth radius in kilometers, used by [`distance_km`].
pub const EARTH_RADIUS_KM: f64 = 6371.0;

/// Minimum valid latitude in degrees.
pub const MIN_LATITUDE: f64 = -90.0;
/// Maximum valid latitude in degrees.
pub const MAX_LATITUDE: f64 = 90.0;
/// Minimum valid longitude in degrees.
pub const MIN_LONGITUDE: f64 = -180.0;
/// Maximum valid longitude in degrees.
pub const MAX_LONGITUDE: f64 = 180.0;

/// A WGS84 latitude/longitude pair in decimal degrees.
///
/// Latitude and longitude always travel together: a photo either has a full
/// coordinate or none at all (`Option<Coord>`).
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Coord {
    /// Latitude in degrees, -90 (south pole) to 90 (north pole).
    pub latitude: f64,
    /// Longitude in degrees, -180 to 180.
    pub longitude: f64,
}

impl Coord {
    /// Create a coordinate, rejecting non-finite or out-of-range values.
    ///
    /// # Examples
    ///
    /// ```
    /// use geogallery_types::Coord;
    ///
    /// let paris = Coord::new(48.8566, 2.3522).unwrap();
    /// assert_eq!(paris.latitude, 48.8566);
    ///
    /// assert!(Coord::new(91.0, 0.0).is_err());
    /// assert!(Coord::new(0.0, f64::NAN).is_err());
    /// ```
    pub fn new(latitude: f64, longitude: f64) -> Result<Self, CoordError> {
        let coord = Self {
            latitude,
            longitude,
        };
        coord.validate()?;
        Ok(coord)
    }

    /// Check that both components are finite and within range.
    ///
    /// Fields are public, so values built with a struct literal are not
    /// checked until this is called.
    pub fn validate(&self) -> Result<(), CoordError> {
        if !self.latitude.is_finite() || !(MIN_LATITUDE..=MAX_LATITUDE).contains(&self.latitude) {
            return Err(CoordError::LatitudeOutOfRange(self.latitude));
        }
        if !self.longitude.is_finite()
            || !(MIN_LONGITUDE..=MAX_LONGITUDE).contains(&self.longitude)
        {
            return Err(CoordError::LongitudeOutOfRange(self.longitude));
        }
        Ok(())
    }

    /// Great-circle distance to another coordinate in kilometers.
    #[must_use]
    pub fn distance_to(&self, other: &Coord) -> f64 {
        distance_km(*self, *other)
    }
}

impl fmt::Display for Coord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.6}, {:.6}", self.latitude, self.longitude)
    }
}

impl FromStr for Coord {
    type Err = CoordError;

    /// Parse `"lat,lon"` (whitespace around either number is ignored).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let (lat, lon) = s
            .split_once(',')
            .ok_or_else(|| CoordError::Malformed(s.to_string()))?;
        let latitude: f64 = lat
            .trim()
            .parse()
            .map_err(|_| CoordError::Malformed(s.to_string()))?;
        let longitude: f64 = lon
            .trim()
            .parse()
            .map_err(|_| CoordError::Malformed(s.to_string()))?;
        Coord::new(latitude, longitude)
    }
}

/// Great-circle distance between two coordinates in kilometers (haversine).
///
/// Pure and symmetric; returns exactly `0.0` for identical inputs. The
/// intermediate term is clamped to `[0, 1]` so rounding near antipodal points
/// cannot produce NaN. Inputs are not range-checked here; use [`Coord::new`].
///
/// # Examples
///
/// ```
/// use geogallery_types::{Coord, distance_km};
///
/// let a = Coord::new(0.0, 0.0).unwrap();
/// let b = Coord::new(0.0, 1.0).unwrap();
/// let d = distance_km(a, b);
/// assert!((d - 111.19).abs() < 0.5);
/// ```
#[must_use]
pub fn distance_km(a: Coord, b: Coord) -> f64 {
    let lat1 = a.latitude.to_radians();
    let lat2 = b.latitude.to_radians();
    // Absolute deltas keep the result bit-for-bit symmetric.
    let dlat = (b.latitude - a.latitude).abs().to_radians();
    let dlon = (b.longitude - a.longitude).abs().to_radians();

    let sin_dlat = (dlat / 2.0).sin();
    let sin_dlon = (dlon / 2.0).sin();
    let h = sin_dlat * sin_dlat + lat1.cos() * lat2.cos() * sin_dlon * sin_dlon;
    let h = h.clamp(0.0, 1.0);

    let c = 2.0 * h.sqrt().atan2((1.0 - h).sqrt());
    EARTH_RADIUS_KM * c
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_coord_new_valid() {
        let coord = Coord::new(51.5074, -0.1278).unwrap();
        assert_eq!(coord.latitude, 51.5074);
        assert_eq!(coord.longitude, -0.1278);
    }

    #[test]
    fn test_coord_new_bounds_inclusive() {
        assert!(Coord::new(90.0, 180.0).is_ok());
        assert!(Coord::new(-90.0, -180.0).is_ok());
    }

    #[test]
    fn test_coord_new_out_of_range() {
        assert_eq!(
            Coord::new(90.5, 0.0),
            Err(CoordError::LatitudeOutOfRange(90.5))
        );
        assert_eq!(
            Coord::new(0.0, -180.1),
            Err(CoordError::LongitudeOutOfRange(-180.1))
        );
        assert!(Coord::new(f64::INFINITY, 0.0).is_err());
    }

    #[test]
    fn test_coord_validate_struct_literal() {
        let coord = Coord {
            latitude: 10.0,
            longitude: 200.0,
        };
        assert!(coord.validate().is_err());
    }

    #[test]
    fn test_coord_from_str() {
        let coord: Coord = "48.8566, 2.3522".parse().unwrap();
        assert_eq!(coord, Coord::new(48.8566, 2.3522).unwrap());

        let coord: Coord = "-33.8688,151.2093".parse().unwrap();
        assert_eq!(coord.longitude, 151.2093);
    }

    #[test]
    fn test_coord_from_str_malformed() {
        assert!(matches!(
            "48.8566".parse::<Coord>(),
            Err(CoordError::Malformed(_))
        ));
        assert!(matches!(
            "north,east".parse::<Coord>(),
            Err(CoordError::Malformed(_))
        ));
        assert!(matches!(
            "95,0".parse::<Coord>(),
            Err(CoordError::LatitudeOutOfRange(_))
        ));
    }

    #[test]
    fn test_coord_display() {
        let coord = Coord::new(1.5, -2.25).unwrap();
        assert_eq!(coord.to_string(), "1.500000, -2.250000");
    }

    #[test]
    fn test_distance_identical_is_zero() {
        let coord = Coord::new(37.7749, -122.4194).unwrap();
        assert_eq!(distance_km(coord, coord), 0.0);
    }

    #[test]
    fn test_distance_one_degree_longitude_at_equator() {
        let a = Coord::new(0.0, 0.0).unwrap();
        let b = Coord::new(0.0, 1.0).unwrap();
        assert!((distance_km(a, b) - 111.19).abs() < 0.5);
    }

    #[test]
    fn test_distance_known_cities() {
        // London to Paris is roughly 343 km.
        let london = Coord::new(51.5074, -0.1278).unwrap();
        let paris = Coord::new(48.8566, 2.3522).unwrap();
        let d = london.distance_to(&paris);
        assert!((d - 343.5).abs() < 2.0, "got {}", d);
    }

    #[test]
    fn test_distance_antipodal_no_nan() {
        let a = Coord::new(0.0, 0.0).unwrap();
        let b = Coord::new(0.0, 180.0).unwrap();
        let d = distance_km(a, b);
        assert!(!d.is_nan());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-3);
    }

    #[test]
    fn test_distance_pole_to_pole() {
        let north = Coord::new(90.0, 0.0).unwrap();
        let south = Coord::new(-90.0, 45.0).unwrap();
        let d = distance_km(north, south);
        assert!(!d.is_nan());
        assert!((d - std::f64::consts::PI * EARTH_RADIUS_KM).abs() < 1e-3);
    }

    #[test]
    fn test_distance_across_antimeridian() {
        let a = Coord::new(0.0, 179.5).unwrap();
        let b = Coord::new(0.0, -179.5).unwrap();
        assert!((distance_km(a, b) - 111.19).abs() < 0.5);
    }
}
