//! Coordinate types and great-circle math for the geogallery photo store.
//!
//! This crate has no I/O and is shared by the store and the command-line
//! front end.
//!
//! # Features
//!
//! - [`Coord`]: a validated latitude/longitude pair
//! - [`distance_km`]: haversine great-circle distance
//! - [`CoordError`]: validation and parsing errors
//!
//! # Example
//!
//! ```
//! use geogallery_types::{Coord, distance_km};
//!
//! let home = Coord::new(52.3676, 4.9041)?;
//! let office: Coord = "52.3731, 4.8922".parse()?;
//! assert!(distance_km(home, office) < 2.0);
//! # Ok::<(), geogallery_types::CoordError>(())
//! ```

pub mod error;
pub mod types;

pub use error::{CoordError, CoordResult};
pub use types::{
    Coord, EARTH_RADIUS_KM, MAX_LATITUDE, MAX_LONGITUDE, MIN_LATITUDE, MIN_LONGITUDE,
    distance_km,
};
