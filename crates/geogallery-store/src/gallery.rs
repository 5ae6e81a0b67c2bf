//! Async facade over the store: the query surface used by front ends.
//!
//! A [`Gallery`] is built once at start and cloned wherever it is needed.
//! All clones share one [`Store`] behind a `tokio::sync::Mutex`, which
//! serializes writes. Reverse geocoding runs before the lock is taken, so a
//! slow lookup never blocks readers.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use time::OffsetDateTime;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use geogallery_types::Coord;

use crate::error::{Error, Result};
use crate::files::{self, FileRemoval};
use crate::geocode::{DEFAULT_GEOCODE_TIMEOUT, ReverseGeocoder, resolve_name};
use crate::models::{NearbyPhoto, NewPhoto, PhotoRecord};
use crate::queries::PhotoQuery;
use crate::search;
use crate::store::Store;

/// Tuning knobs for a [`Gallery`].
#[derive(Debug, Clone)]
pub struct GalleryOptions {
    /// Upper bound on a single reverse-geocoding lookup.
    pub geocode_timeout: Duration,
}

impl Default for GalleryOptions {
    fn default() -> Self {
        Self {
            geocode_timeout: DEFAULT_GEOCODE_TIMEOUT,
        }
    }
}

/// Shared handle to the photo store and its location enrichment.
#[derive(Clone)]
pub struct Gallery {
    store: Arc<Mutex<Store>>,
    geocoder: Arc<dyn ReverseGeocoder>,
    options: GalleryOptions,
}

impl Gallery {
    /// Wrap an open store.
    pub fn new(store: Store, geocoder: Arc<dyn ReverseGeocoder>, options: GalleryOptions) -> Self {
        Self {
            store: Arc::new(Mutex::new(store)),
            geocoder,
            options,
        }
    }

    /// Open (or create) the database at `path` and wrap it.
    pub fn open<P: AsRef<Path>>(
        path: P,
        geocoder: Arc<dyn ReverseGeocoder>,
        options: GalleryOptions,
    ) -> Result<Self> {
        let store = Store::open(path)?;
        Ok(Self::new(store, geocoder, options))
    }

    /// Store a new photo and return its id.
    ///
    /// Input is validated before any lookup or write. The location name is
    /// resolved only when coordinates are present.
    pub async fn create(&self, photo: NewPhoto) -> Result<i64> {
        photo.validate()?;

        let location_name = self.location_name_for(photo.coords).await;

        let store = self.store.lock().await;
        let id = store.insert(&photo, &location_name)?;
        info!("Added photo {} ({})", id, photo.file_uri);
        Ok(id)
    }

    /// Every photo, newest first.
    pub async fn list_all(&self) -> Result<Vec<PhotoRecord>> {
        self.store.lock().await.list()
    }

    /// Photos matching a filtered, paginated query.
    pub async fn query(&self, query: &PhotoQuery) -> Result<Vec<PhotoRecord>> {
        self.store.lock().await.query(query)
    }

    /// A single photo, or `None` if the id is unknown.
    pub async fn get(&self, id: i64) -> Result<Option<PhotoRecord>> {
        self.store.lock().await.get(id)
    }

    /// Replace a photo's file URI, coordinates and description.
    ///
    /// The location name is resolved again only when the coordinates changed;
    /// removing the coordinates clears it. `created_at` is never changed.
    /// Returns the record as stored.
    pub async fn update(&self, mut record: PhotoRecord) -> Result<PhotoRecord> {
        record.validate()?;

        let current = self
            .get(record.id)
            .await?
            .ok_or(Error::NotFound(record.id))?;

        record.location_name = if record.coords == current.coords {
            current.location_name
        } else {
            self.location_name_for(record.coords).await
        };
        record.created_at = current.created_at;

        self.store.lock().await.update(&record)?;
        debug!("Updated photo {}", record.id);
        Ok(record)
    }

    /// Delete a photo and its backing file. Returns whether the record existed.
    ///
    /// A file that cannot be removed is logged and left behind; the record is
    /// deleted regardless.
    pub async fn remove(&self, id: i64) -> Result<bool> {
        let store = self.store.lock().await;

        let Some(uri) = store.file_uri(id)? else {
            debug!("Remove: no photo {}", id);
            return Ok(false);
        };

        match files::remove_photo_file(&uri) {
            Ok(FileRemoval::Removed) => debug!("Removed file for photo {}", id),
            Ok(FileRemoval::AlreadyAbsent) => {
                warn!("File {} for photo {} was already gone", uri, id)
            }
            Ok(FileRemoval::NotLocal) => debug!("File for photo {} is not local: {}", id, uri),
            Err(e) => warn!("Could not remove file {} for photo {}: {}", uri, id, e),
        }

        let existed = store.delete(id)?;
        info!("Removed photo {}", id);
        Ok(existed)
    }

    /// Photos strictly within `radius_km` of `center`, nearest first.
    pub async fn find_near(&self, center: Coord, radius_km: f64) -> Result<Vec<NearbyPhoto>> {
        let snapshot = self.geotagged().await?;
        let hits = search::within_radius(&snapshot, center, radius_km);
        debug!(
            "find_near({}, {} km): {} of {}",
            center,
            radius_km,
            hits.len(),
            snapshot.len()
        );
        Ok(hits)
    }

    /// The `n` photos closest to `center`, nearest first.
    pub async fn find_nearest(&self, center: Coord, n: usize) -> Result<Vec<NearbyPhoto>> {
        let snapshot = self.geotagged().await?;
        Ok(search::nearest(&snapshot, center, n))
    }

    /// Photos whose location name or description contains `text`.
    pub async fn find_by_text(&self, text: &str) -> Result<Vec<PhotoRecord>> {
        let snapshot = self.list_all().await?;
        let hits = search::matching_text(&snapshot, text);
        debug!("find_by_text({:?}): {} of {}", text, hits.len(), snapshot.len());
        Ok(hits)
    }

    /// Photos created within `[start, end]`, newest first.
    ///
    /// Evaluated in SQL; the result equals [`search::within_time_range`] over
    /// [`list_all`](Self::list_all).
    pub async fn find_by_date_range(
        &self,
        start: OffsetDateTime,
        end: OffsetDateTime,
    ) -> Result<Vec<PhotoRecord>> {
        if start > end {
            return Ok(Vec::new());
        }

        let query = PhotoQuery::new().since(start).until(end);
        self.store.lock().await.query(&query)
    }

    /// Number of stored photos.
    pub async fn count(&self) -> Result<u64> {
        self.store.lock().await.count()
    }

    /// Close the underlying database.
    ///
    /// If other clones are still alive the connection stays open until the
    /// last one is dropped.
    pub async fn close(self) -> Result<()> {
        match Arc::try_unwrap(self.store) {
            Ok(store) => store.into_inner().close(),
            Err(_) => {
                debug!("Gallery still shared, deferring close");
                Ok(())
            }
        }
    }

    async fn geotagged(&self) -> Result<Vec<PhotoRecord>> {
        let query = PhotoQuery::new().with_coords_only();
        self.store.lock().await.query(&query)
    }

    async fn location_name_for(&self, coords: Option<Coord>) -> String {
        match coords {
            Some(coord) => {
                resolve_name(self.geocoder.as_ref(), coord, self.options.geocode_timeout).await
            }
            None => String::new(),
        }
    }
}

impl std::fmt::Debug for Gallery {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Gallery")
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
