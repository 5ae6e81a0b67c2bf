//! Local persistence and geospatial queries for geotagged photos.
//!
//! This crate provides SQLite-based storage for photo records together with
//! the queries a gallery needs: radius and nearest-N search, text search over
//! place names and descriptions, and capture-time ranges.
//!
//! # Features
//!
//! - Store photos with optional coordinates and a resolved place name
//! - Reverse geocoding with a bounded timeout and a fixed fallback name
//! - Delete a record together with its backing file
//! - Query by distance, text, time range, with pagination
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use geogallery_store::{Gallery, GalleryOptions, NewPhoto, default_db_path};
//! use geogallery_store::geocode::NominatimGeocoder;
//! use geogallery_types::Coord;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let gallery = Gallery::open(
//!     default_db_path(),
//!     Arc::new(NominatimGeocoder::new()?),
//!     GalleryOptions::default(),
//! )?;
//!
//! let here = Coord::new(40.4168, -3.7038)?;
//! gallery.create(NewPhoto::new("/photos/plaza.jpg").at(here)).await?;
//!
//! for hit in gallery.find_near(here, 5.0).await? {
//!     println!("{:.2} km  {}", hit.distance_km, hit.record.location_name);
//! }
//! # Ok(())
//! # }
//! ```

mod error;
mod gallery;
mod models;
mod queries;
mod schema;
mod store;

pub mod files;
pub mod geocode;
pub mod search;

pub use error::{Error, Result, ValidationError};
pub use gallery::{Gallery, GalleryOptions};
pub use models::{NearbyPhoto, NewPhoto, PhotoRecord};
pub use queries::PhotoQuery;
pub use schema::SCHEMA_VERSION;
pub use store::Store;

/// Default database path following platform conventions.
///
/// - Linux: `~/.local/share/geogallery/geo_gallery.db`
/// - macOS: `~/Library/Application Support/geogallery/geo_gallery.db`
/// - Windows: `C:\Users\<user>\AppData\Local\geogallery\geo_gallery.db`
pub fn default_db_path() -> std::path::PathBuf {
    dirs::data_local_dir()
        .unwrap_or_else(|| std::path::PathBuf::from("."))
        .join("geogallery")
        .join("geo_gallery.db")
}
