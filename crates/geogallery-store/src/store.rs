//! Main store implementation.

use std::path::Path;
use std::time::Duration;

use rusqlite::{Connection, OptionalExtension, Row};
use time::OffsetDateTime;
use tracing::{debug, info};

use geogallery_types::Coord;

use crate::error::{Error, Result};
use crate::models::{NewPhoto, PhotoRecord};
use crate::queries::{PHOTO_COLUMNS, PhotoQuery};
use crate::schema;

/// How long a statement waits on a locked database before failing.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

/// SQLite-based store for geotagged photo records.
///
/// The store is synchronous and owns a single connection. Share it across
/// tasks through [`Gallery`](crate::Gallery), which serializes access.
pub struct Store {
    conn: Connection,
}

impl Store {
    /// Open or create a database at the given path.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        // Create parent directories if needed
        if let Some(parent) = path.parent()
            && !parent.as_os_str().is_empty()
            && !parent.exists()
        {
            std::fs::create_dir_all(parent).map_err(|e| Error::CreateDirectory {
                path: parent.to_path_buf(),
                source: e,
            })?;
        }

        info!("Opening photo database at {}", path.display());
        let conn = Connection::open(path)?;
        conn.busy_timeout(BUSY_TIMEOUT)?;

        // WAL lets readers proceed while a write is in flight
        conn.execute_batch(
            "PRAGMA journal_mode = WAL;
             PRAGMA synchronous = NORMAL;",
        )?;

        let store = Self { conn };
        store.initialize()?;
        Ok(store)
    }

    /// Open the default database location.
    pub fn open_default() -> Result<Self> {
        Self::open(crate::default_db_path())
    }

    /// Open an in-memory database (for testing).
    pub fn open_in_memory() -> Result<Self> {
        let store = Self {
            conn: Connection::open_in_memory()?,
        };
        store.initialize()?;
        Ok(store)
    }

    /// Create the schema if absent. Idempotent; called by every `open*`.
    pub fn initialize(&self) -> Result<()> {
        schema::initialize(&self.conn)
    }

    /// Close the connection, flushing any pending WAL state.
    pub fn close(self) -> Result<()> {
        self.conn.close().map_err(|(_, e)| Error::Database(e))
    }
}

// Write operations
impl Store {
    /// Insert a photo stamped with the current time. Returns the new id.
    pub fn insert(&self, photo: &NewPhoto, location_name: &str) -> Result<i64> {
        self.insert_at(photo, location_name, OffsetDateTime::now_utc())
    }

    /// Insert a photo with an explicit creation time (imports, fixtures).
    ///
    /// The timestamp is stored with whole-second precision.
    pub fn insert_at(
        &self,
        photo: &NewPhoto,
        location_name: &str,
        created_at: OffsetDateTime,
    ) -> Result<i64> {
        photo.validate()?;

        let (latitude, longitude) = split_coords(photo.coords);
        self.conn.execute(
            "INSERT INTO photos (file_uri, latitude, longitude, location_name,
             created_at, description)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            rusqlite::params![
                photo.file_uri,
                latitude,
                longitude,
                location_name,
                created_at.unix_timestamp(),
                photo.description,
            ],
        )?;

        let id = self.conn.last_insert_rowid();
        debug!("Inserted photo {} ({})", id, photo.file_uri);
        Ok(id)
    }

    /// Replace the editable fields of an existing photo.
    ///
    /// `id` selects the row and `created_at` is ignored; neither is ever
    /// rewritten. Fails with [`Error::NotFound`] if the id does not exist.
    pub fn update(&self, record: &PhotoRecord) -> Result<()> {
        record.validate()?;

        let (latitude, longitude) = split_coords(record.coords);
        let changed = self.conn.execute(
            "UPDATE photos SET
                file_uri = ?2,
                latitude = ?3,
                longitude = ?4,
                location_name = ?5,
                description = ?6
             WHERE id = ?1",
            rusqlite::params![
                record.id,
                record.file_uri,
                latitude,
                longitude,
                record.location_name,
                record.description,
            ],
        )?;

        if changed == 0 {
            return Err(Error::NotFound(record.id));
        }

        debug!("Updated photo {}", record.id);
        Ok(())
    }

    /// Delete a photo row. Returns whether a row existed.
    ///
    /// This does not touch the backing file; use
    /// [`Gallery::remove`](crate::Gallery::remove) for that.
    pub fn delete(&self, id: i64) -> Result<bool> {
        let changed = self
            .conn
            .execute("DELETE FROM photos WHERE id = ?", [id])?;
        debug!("Delete photo {}: {} row(s)", id, changed);
        Ok(changed > 0)
    }
}

// Read operations
impl Store {
    /// All photos, newest first (ties by id, highest first).
    pub fn list(&self) -> Result<Vec<PhotoRecord>> {
        self.query(&PhotoQuery::new())
    }

    /// Get a photo by id. A missing id is `Ok(None)`.
    pub fn get(&self, id: i64) -> Result<Option<PhotoRecord>> {
        let sql = format!("SELECT {} FROM photos WHERE id = ?", PHOTO_COLUMNS);
        let raw = self
            .conn
            .query_row(&sql, [id], RawPhotoRow::from_row)
            .optional()?;

        raw.map(RawPhotoRow::into_record).transpose()
    }

    /// Query photos with filters.
    pub fn query(&self, query: &PhotoQuery) -> Result<Vec<PhotoRecord>> {
        let sql = query.build_sql();
        let (_, params) = query.build_where();

        debug!("Executing query: {}", sql);

        let params_ref: Vec<&dyn rusqlite::ToSql> = params.iter().map(|p| p.as_ref()).collect();

        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt
            .query_map(params_ref.as_slice(), RawPhotoRow::from_row)?
            .collect::<std::result::Result<Vec<_>, _>>()?;

        rows.into_iter().map(RawPhotoRow::into_record).collect()
    }

    /// Look up only the file URI of a photo.
    pub fn file_uri(&self, id: i64) -> Result<Option<String>> {
        let uri = self
            .conn
            .query_row("SELECT file_uri FROM photos WHERE id = ?", [id], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(uri)
    }

    /// Count stored photos.
    pub fn count(&self) -> Result<u64> {
        let count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM photos", [], |row| row.get(0))?;
        Ok(count as u64)
    }
}

fn split_coords(coords: Option<Coord>) -> (Option<f64>, Option<f64>) {
    match coords {
        Some(c) => (Some(c.latitude), Some(c.longitude)),
        None => (None, None),
    }
}

/// A `photos` row exactly as SQLite returns it.
struct RawPhotoRow {
    id: i64,
    file_uri: String,
    latitude: Option<f64>,
    longitude: Option<f64>,
    location_name: String,
    created_at: i64,
    description: Option<String>,
}

impl RawPhotoRow {
    fn from_row(row: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: row.get(0)?,
            file_uri: row.get(1)?,
            latitude: row.get(2)?,
            longitude: row.get(3)?,
            location_name: row.get(4)?,
            created_at: row.get(5)?,
            description: row.get(6)?,
        })
    }

    fn into_record(self) -> Result<PhotoRecord> {
        let coords = match (self.latitude, self.longitude) {
            (Some(latitude), Some(longitude)) => {
                Some(Coord::new(latitude, longitude).map_err(|e| Error::CorruptRow {
                    id: self.id,
                    reason: e.to_string(),
                })?)
            }
            (None, None) => None,
            _ => {
                return Err(Error::CorruptRow {
                    id: self.id,
                    reason: "only one of latitude/longitude is set".to_string(),
                });
            }
        };

        let created_at =
            OffsetDateTime::from_unix_timestamp(self.created_at).map_err(|e| {
                Error::CorruptRow {
                    id: self.id,
                    reason: format!("invalid created_at {}: {}", self.created_at, e),
                }
            })?;

        Ok(PhotoRecord {
            id: self.id,
            file_uri: self.file_uri,
            coords,
            location_name: self.location_name,
            created_at,
            description: self.description,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    fn coord(latitude: f64, longitude: f64) -> Coord {
        Coord::new(latitude, longitude).unwrap()
    }

    #[test]
    fn test_open_in_memory() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.list().unwrap().is_empty());
        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_open_creates_parent_directories() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("deeper").join("photos.db");

        let store = Store::open(&path).unwrap();
        store.insert(&NewPhoto::new("a.jpg"), "").unwrap();
        store.close().unwrap();

        assert!(path.exists());
        let reopened = Store::open(&path).unwrap();
        assert_eq!(reopened.count().unwrap(), 1);
    }

    #[test]
    fn test_insert_and_get() {
        let store = Store::open_in_memory().unwrap();
        let photo = NewPhoto::new("/photos/a.jpg")
            .at(coord(48.8566, 2.3522))
            .described("Eiffel tower");

        let id = store.insert(&photo, "Paris, Île-de-France").unwrap();
        let record = store.get(id).unwrap().unwrap();

        assert_eq!(record.id, id);
        assert_eq!(record.file_uri, photo.file_uri);
        assert_eq!(record.coords, photo.coords);
        assert_eq!(record.description, photo.description);
        assert_eq!(record.location_name, "Paris, Île-de-France");
        assert_eq!(record.created_at.nanosecond(), 0);
    }

    #[test]
    fn test_insert_without_coords() {
        let store = Store::open_in_memory().unwrap();
        let id = store.insert(&NewPhoto::new("b.jpg"), "").unwrap();

        let record = store.get(id).unwrap().unwrap();
        assert!(record.coords.is_none());
        assert_eq!(record.location_name, "");
        assert!(record.description.is_none());
    }

    #[test]
    fn test_insert_rejects_invalid_input() {
        let store = Store::open_in_memory().unwrap();

        let result = store.insert(&NewPhoto::new(""), "");
        assert!(matches!(result, Err(Error::Validation(_))));

        let bad = NewPhoto::new("a.jpg").at(Coord {
            latitude: 0.0,
            longitude: 500.0,
        });
        assert!(matches!(store.insert(&bad, ""), Err(Error::Validation(_))));

        assert_eq!(store.count().unwrap(), 0);
    }

    #[test]
    fn test_get_missing_is_none() {
        let store = Store::open_in_memory().unwrap();
        assert!(store.get(99).unwrap().is_none());
    }

    #[test]
    fn test_list_orders_newest_first_with_id_tiebreak() {
        let store = Store::open_in_memory().unwrap();
        let t0 = datetime!(2024-03-01 10:00:00 UTC);
        let t1 = datetime!(2024-03-02 10:00:00 UTC);

        let old = store.insert_at(&NewPhoto::new("old.jpg"), "", t0).unwrap();
        let first = store.insert_at(&NewPhoto::new("a.jpg"), "", t1).unwrap();
        let second = store.insert_at(&NewPhoto::new("b.jpg"), "", t1).unwrap();

        let ids: Vec<i64> = store.list().unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![second, first, old]);
    }

    #[test]
    fn test_update_roundtrip() {
        let store = Store::open_in_memory().unwrap();
        let id = store
            .insert(&NewPhoto::new("a.jpg").at(coord(1.0, 1.0)), "Somewhere")
            .unwrap();

        let mut record = store.get(id).unwrap().unwrap();
        record.file_uri = "moved.jpg".to_string();
        record.coords = Some(coord(2.0, 3.0));
        record.location_name = "Elsewhere".to_string();
        record.description = Some("edited".to_string());
        store.update(&record).unwrap();

        assert_eq!(store.get(id).unwrap().unwrap(), record);
    }

    #[test]
    fn test_update_never_rewrites_created_at() {
        let store = Store::open_in_memory().unwrap();
        let created = datetime!(2023-07-04 09:30:00 UTC);
        let id = store.insert_at(&NewPhoto::new("a.jpg"), "", created).unwrap();

        let mut record = store.get(id).unwrap().unwrap();
        record.created_at = datetime!(2030-01-01 00:00:00 UTC);
        store.update(&record).unwrap();

        assert_eq!(store.get(id).unwrap().unwrap().created_at, created);
    }

    #[test]
    fn test_update_missing_is_not_found() {
        let store = Store::open_in_memory().unwrap();
        let record = PhotoRecord {
            id: 5,
            file_uri: "a.jpg".to_string(),
            coords: None,
            location_name: String::new(),
            created_at: OffsetDateTime::now_utc(),
            description: None,
        };

        assert!(matches!(store.update(&record), Err(Error::NotFound(5))));
    }

    #[test]
    fn test_delete() {
        let store = Store::open_in_memory().unwrap();
        let id = store.insert(&NewPhoto::new("a.jpg"), "").unwrap();

        assert!(store.delete(id).unwrap());
        assert!(store.get(id).unwrap().is_none());
        assert!(!store.delete(id).unwrap());
        assert!(!store.delete(12345).unwrap());
    }

    #[test]
    fn test_ids_not_reused_after_delete() {
        let store = Store::open_in_memory().unwrap();
        let first = store.insert(&NewPhoto::new("a.jpg"), "").unwrap();
        store.delete(first).unwrap();

        let second = store.insert(&NewPhoto::new("b.jpg"), "").unwrap();
        assert!(second > first);
    }

    #[test]
    fn test_query_time_range_inclusive() {
        let store = Store::open_in_memory().unwrap();
        let t1 = datetime!(2024-01-01 00:00:00 UTC);
        let t2 = datetime!(2024-02-01 00:00:00 UTC);
        let t3 = datetime!(2024-03-01 00:00:00 UTC);
        store.insert_at(&NewPhoto::new("1.jpg"), "", t1).unwrap();
        let b = store.insert_at(&NewPhoto::new("2.jpg"), "", t2).unwrap();
        let c = store.insert_at(&NewPhoto::new("3.jpg"), "", t3).unwrap();

        let query = PhotoQuery::new().since(t2).until(t3);
        let ids: Vec<i64> = store.query(&query).unwrap().iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![c, b]);
    }

    #[test]
    fn test_query_time_range_with_fractional_bounds() {
        let store = Store::open_in_memory().unwrap();
        let t = datetime!(2024-01-01 12:00:00 UTC);
        let id = store.insert_at(&NewPhoto::new("a.jpg"), "", t).unwrap();

        let ids = |since: OffsetDateTime, until: OffsetDateTime| -> Vec<i64> {
            let query = PhotoQuery::new().since(since).until(until);
            store.query(&query).unwrap().iter().map(|r| r.id).collect()
        };

        // Both bounds inside the same second, after the photo
        let start = t + time::Duration::milliseconds(300);
        let end = t + time::Duration::milliseconds(700);
        assert!(ids(start, end).is_empty());

        // Bounds straddling the photo
        let start = t - time::Duration::milliseconds(500);
        let end = t + time::Duration::milliseconds(500);
        assert_eq!(ids(start, end), vec![id]);

        // Just after and just before
        let hour = time::Duration::hours(1);
        let milli = time::Duration::milliseconds(1);
        assert!(ids(t + milli, t + hour).is_empty());
        assert!(ids(t - hour, t - milli).is_empty());
    }

    #[test]
    fn test_query_coords_only_and_pagination() {
        let store = Store::open_in_memory().unwrap();
        let t = datetime!(2024-01-01 00:00:00 UTC);
        store.insert_at(&NewPhoto::new("none.jpg"), "", t).unwrap();
        let a = store
            .insert_at(&NewPhoto::new("a.jpg").at(coord(1.0, 1.0)), "", t)
            .unwrap();
        let b = store
            .insert_at(&NewPhoto::new("b.jpg").at(coord(2.0, 2.0)), "", t)
            .unwrap();

        let all = store.query(&PhotoQuery::new().with_coords_only()).unwrap();
        assert_eq!(all.iter().map(|r| r.id).collect::<Vec<_>>(), vec![b, a]);

        let page = store
            .query(&PhotoQuery::new().with_coords_only().offset(1))
            .unwrap();
        assert_eq!(page.len(), 1);
        assert_eq!(page[0].id, a);
    }

    #[test]
    fn test_file_uri_lookup() {
        let store = Store::open_in_memory().unwrap();
        let id = store.insert(&NewPhoto::new("file:///x/a.jpg"), "").unwrap();

        assert_eq!(
            store.file_uri(id).unwrap().as_deref(),
            Some("file:///x/a.jpg")
        );
        assert!(store.file_uri(id + 1).unwrap().is_none());
    }

    #[test]
    fn test_corrupt_row_is_storage_error() {
        let store = Store::open_in_memory().unwrap();
        store
            .conn
            .execute(
                "INSERT INTO photos (file_uri, created_at) VALUES ('a.jpg', ?)",
                [i64::MAX],
            )
            .unwrap();

        let err = store.list().unwrap_err();
        assert!(matches!(err, Error::CorruptRow { .. }));
        assert!(err.is_storage());

        // The store stays usable after a failed call
        store.insert(&NewPhoto::new("b.jpg"), "").unwrap();
        assert_eq!(store.count().unwrap(), 2);
    }
}
