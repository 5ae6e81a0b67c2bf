//! Data models for stored photos.

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use geogallery_types::Coord;

use crate::error::ValidationError;

/// A photo stored in the database.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PhotoRecord {
    /// Database row ID, assigned on insert and never reused.
    pub id: i64,
    /// Path or `file://` URI of the photo file.
    pub file_uri: String,
    /// Capture location, if location access was available.
    pub coords: Option<Coord>,
    /// Human-readable place name resolved from `coords`.
    ///
    /// Empty when the photo has no coordinates.
    pub location_name: String,
    /// When the record was inserted (UTC, whole seconds).
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl PhotoRecord {
    /// Check the user-editable fields before a write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.file_uri, self.coords.as_ref())
    }

    /// Whether the record carries a capture location.
    pub fn has_coords(&self) -> bool {
        self.coords.is_some()
    }
}

/// A photo as handed over by the capture step, before it has an id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NewPhoto {
    /// Path or `file://` URI of the captured photo.
    pub file_uri: String,
    /// Capture location, `None` when location permission was denied.
    pub coords: Option<Coord>,
    /// Optional free-text description.
    pub description: Option<String>,
}

impl NewPhoto {
    /// Create a new photo entry without location or description.
    pub fn new(file_uri: impl Into<String>) -> Self {
        Self {
            file_uri: file_uri.into(),
            coords: None,
            description: None,
        }
    }

    /// Attach a capture location.
    pub fn at(mut self, coords: Coord) -> Self {
        self.coords = Some(coords);
        self
    }

    /// Attach a description.
    pub fn described(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// Check the fields before a write.
    pub fn validate(&self) -> Result<(), ValidationError> {
        validate_fields(&self.file_uri, self.coords.as_ref())
    }
}

fn validate_fields(file_uri: &str, coords: Option<&Coord>) -> Result<(), ValidationError> {
    if file_uri.trim().is_empty() {
        return Err(ValidationError::EmptyFileUri);
    }
    if let Some(coords) = coords {
        coords.validate()?;
    }
    Ok(())
}

/// A photo paired with its distance from a search center.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NearbyPhoto {
    /// The matching photo.
    #[serde(flatten)]
    pub record: PhotoRecord,
    /// Great-circle distance from the search center in kilometers.
    pub distance_km: f64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_new_photo_builder() {
        let coords = Coord::new(1.0, 2.0).unwrap();
        let photo = NewPhoto::new("/photos/a.jpg")
            .at(coords)
            .described("beach");

        assert_eq!(photo.file_uri, "/photos/a.jpg");
        assert_eq!(photo.coords, Some(coords));
        assert_eq!(photo.description.as_deref(), Some("beach"));
        assert!(photo.validate().is_ok());
    }

    #[test]
    fn test_new_photo_rejects_empty_uri() {
        assert_eq!(
            NewPhoto::new("   ").validate(),
            Err(ValidationError::EmptyFileUri)
        );
    }

    #[test]
    fn test_record_rejects_bad_coords() {
        let record = PhotoRecord {
            id: 1,
            file_uri: "a.jpg".to_string(),
            coords: Some(Coord {
                latitude: -91.0,
                longitude: 0.0,
            }),
            location_name: String::new(),
            created_at: datetime!(2024-05-01 12:00:00 UTC),
            description: None,
        };
        assert!(matches!(
            record.validate(),
            Err(ValidationError::Coord(_))
        ));
    }

    #[test]
    fn test_record_serializes_rfc3339() {
        let record = PhotoRecord {
            id: 7,
            file_uri: "a.jpg".to_string(),
            coords: None,
            location_name: String::new(),
            created_at: datetime!(2024-05-01 12:00:00 UTC),
            description: None,
        };
        let json = serde_json::to_value(&record).unwrap();
        assert_eq!(json["created_at"], "2024-05-01T12:00:00Z");
        assert!(json["coords"].is_null());
    }

    #[test]
    fn test_nearby_photo_flattens_record() {
        let nearby = NearbyPhoto {
            record: PhotoRecord {
                id: 3,
                file_uri: "b.jpg".to_string(),
                coords: Some(Coord::new(0.0, 0.0).unwrap()),
                location_name: "Null Island".to_string(),
                created_at: datetime!(2024-05-01 12:00:00 UTC),
                description: None,
            },
            distance_km: 1.5,
        };
        let json = serde_json::to_value(&nearby).unwrap();
        assert_eq!(json["id"], 3);
        assert_eq!(json["distance_km"], 1.5);
    }
}
