//! Error types for geogallery-store.

use std::path::PathBuf;

use geogallery_types::CoordError;

/// Result type for geogallery-store operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in geogallery-store.
///
/// Validation errors are raised before anything is written. Every other
/// variant except [`Error::NotFound`] is a storage error; the store stays
/// usable after any of them.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Input rejected before any write.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No photo with this id.
    #[error("Photo not found: {0}")]
    NotFound(i64),

    /// Database error from SQLite.
    #[error("Database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// The database was written by a newer schema version.
    #[error("Unsupported schema version {found} (this build supports up to {supported})")]
    SchemaMismatch { found: i32, supported: i32 },

    /// A stored row cannot be mapped into a photo record.
    #[error("Corrupt photo row {id}: {reason}")]
    CorruptRow { id: i64, reason: String },

    /// Failed to create database directory.
    #[error("Failed to create database directory {path}: {source}")]
    CreateDirectory {
        path: PathBuf,
        source: std::io::Error,
    },

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl Error {
    /// Whether this error comes from the storage medium rather than the input.
    pub fn is_storage(&self) -> bool {
        !matches!(self, Error::Validation(_) | Error::NotFound(_))
    }
}

/// Reasons a photo is rejected before it reaches the database.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// The file URI is empty or whitespace.
    #[error("file URI cannot be empty")]
    EmptyFileUri,

    /// Latitude/longitude out of range or not finite.
    #[error(transparent)]
    Coord(#[from] CoordError),
}
