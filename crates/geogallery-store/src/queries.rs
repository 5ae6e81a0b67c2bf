//! Query builder for stored photos.
//!
//! [`PhotoQuery`] covers the filters that SQLite can evaluate exactly
//! (capture-time range, coordinate presence, pagination). Distance and text
//! matching live in [`crate::search`].
//!
//! # Example
//!
//! ```
//! use geogallery_store::{PhotoQuery, Store};
//! use time::{Duration, OffsetDateTime};
//!
//! let store = Store::open_in_memory()?;
//! let last_week = OffsetDateTime::now_utc() - Duration::days(7);
//!
//! let query = PhotoQuery::new()
//!     .since(last_week)
//!     .with_coords_only()
//!     .limit(20);
//!
//! let photos = store.query(&query)?;
//! assert!(photos.is_empty());
//! # Ok::<(), geogallery_store::Error>(())
//! ```

use time::OffsetDateTime;

/// Columns selected for every photo query, in row-mapping order.
pub(crate) const PHOTO_COLUMNS: &str =
    "id, file_uri, latitude, longitude, location_name, created_at, description";

/// Which photos [`Store::query`](crate::Store::query) returns, and in what order.
///
/// Photos added in the same second come back in insertion order (reversed
/// for the newest-first listing).
#[derive(Debug, Default, Clone)]
pub struct PhotoQuery {
    /// Earliest capture time, inclusive.
    pub since: Option<OffsetDateTime>,
    /// Latest capture time, inclusive.
    pub until: Option<OffsetDateTime>,
    /// Leave out photos taken without location access.
    pub coords_only: bool,
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    /// Gallery order. `false` lists the oldest photo first.
    pub newest_first: bool,
}

impl PhotoQuery {
    /// The whole gallery, newest first.
    ///
    /// Unlike `PhotoQuery::default()`, which lists oldest first.
    pub fn new() -> Self {
        Self {
            newest_first: true,
            ..Default::default()
        }
    }

    /// Keep photos taken at `time` or later.
    pub fn since(mut self, time: OffsetDateTime) -> Self {
        self.since = Some(time);
        self
    }

    /// Keep photos taken at `time` or earlier.
    pub fn until(mut self, time: OffsetDateTime) -> Self {
        self.until = Some(time);
        self
    }

    /// Skip photos without coordinates (map view).
    pub fn with_coords_only(mut self) -> Self {
        self.coords_only = true;
        self
    }

    /// Page size.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Number of photos to skip before the page starts.
    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = Some(offset);
        self
    }

    /// List the oldest photo first.
    pub fn oldest_first(mut self) -> Self {
        self.newest_first = false;
        self
    }

    /// WHERE clause over the `photos` table and its bound values.
    ///
    /// `created_at` holds whole seconds, so a bound with a fractional part
    /// is moved inward to the nearest second it still covers. The result is
    /// the same as comparing full timestamps.
    pub(crate) fn build_where(&self) -> (String, Vec<Box<dyn rusqlite::ToSql>>) {
        let mut conditions = Vec::new();
        let mut params: Vec<Box<dyn rusqlite::ToSql>> = Vec::new();

        if let Some(since) = self.since {
            conditions.push("created_at >= ?");
            params.push(Box::new(first_second_at_or_after(since)));
        }

        if let Some(until) = self.until {
            conditions.push("created_at <= ?");
            params.push(Box::new(until.unix_timestamp()));
        }

        if self.coords_only {
            conditions.push("latitude IS NOT NULL AND longitude IS NOT NULL");
        }

        let where_clause = if conditions.is_empty() {
            String::new()
        } else {
            format!("WHERE {}", conditions.join(" AND "))
        };

        (where_clause, params)
    }

    pub(crate) fn build_sql(&self) -> String {
        let (where_clause, _) = self.build_where();
        let order = if self.newest_first { "DESC" } else { "ASC" };

        let mut sql = format!(
            "SELECT {} FROM photos {} ORDER BY created_at {}, id {}",
            PHOTO_COLUMNS, where_clause, order, order
        );

        // SQLite only accepts OFFSET after a LIMIT; -1 means unbounded.
        match (self.limit, self.offset) {
            (Some(limit), Some(offset)) => {
                sql.push_str(&format!(" LIMIT {} OFFSET {}", limit, offset))
            }
            (Some(limit), None) => sql.push_str(&format!(" LIMIT {}", limit)),
            (None, Some(offset)) => sql.push_str(&format!(" LIMIT -1 OFFSET {}", offset)),
            (None, None) => {}
        }

        sql
    }
}

/// Smallest whole unix second that is not before `time`.
fn first_second_at_or_after(time: OffsetDateTime) -> i64 {
    let seconds = time.unix_timestamp();
    if time.nanosecond() > 0 {
        seconds + 1
    } else {
        seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::datetime;

    #[test]
    fn test_new_lists_whole_gallery_newest_first() {
        let query = PhotoQuery::new();
        assert_eq!((query.since, query.until), (None, None));
        assert!(!query.coords_only);
        assert_eq!((query.limit, query.offset), (None, None));
        assert!(query.newest_first);

        assert!(!PhotoQuery::default().newest_first);
    }

    #[test]
    fn test_map_page_of_last_summer() {
        let since = datetime!(2024-06-01 00:00:00 UTC);
        let until = datetime!(2024-08-31 23:59:59 UTC);

        let query = PhotoQuery::new()
            .with_coords_only()
            .since(since)
            .until(until)
            .oldest_first()
            .limit(10)
            .offset(5);

        assert_eq!(query.since, Some(since));
        assert_eq!(query.until, Some(until));
        assert!(query.coords_only);
        assert_eq!((query.limit, query.offset), (Some(10), Some(5)));
        assert!(!query.newest_first);
    }

    #[test]
    fn test_fractional_bounds_move_inward() {
        let whole = datetime!(2024-05-01 12:00:00 UTC);
        assert_eq!(first_second_at_or_after(whole), whole.unix_timestamp());

        let fractional = datetime!(2024-05-01 12:00:00.300 UTC);
        assert_eq!(first_second_at_or_after(fractional), whole.unix_timestamp() + 1);

        // Before the epoch the whole-second part is already the floor
        let early = datetime!(1969-12-31 23:59:59.500 UTC);
        assert_eq!(early.unix_timestamp(), -1);
        assert_eq!(first_second_at_or_after(early), 0);
    }

    #[test]
    fn test_build_where_empty() {
        let (where_clause, params) = PhotoQuery::new().build_where();
        assert_eq!(where_clause, "");
        assert!(params.is_empty());
    }

    #[test]
    fn test_build_where_time_range() {
        let query = PhotoQuery::new()
            .since(datetime!(2024-01-01 00:00:00 UTC))
            .until(datetime!(2024-12-31 23:59:59 UTC));
        let (where_clause, params) = query.build_where();

        assert_eq!(where_clause, "WHERE created_at >= ? AND created_at <= ?");
        assert_eq!(params.len(), 2);
    }

    #[test]
    fn test_build_where_coords_only_has_no_params() {
        let (where_clause, params) = PhotoQuery::new().with_coords_only().build_where();
        assert!(where_clause.contains("latitude IS NOT NULL"));
        assert!(params.is_empty());
    }

    #[test]
    fn test_build_sql_basic() {
        let sql = PhotoQuery::new().build_sql();

        assert!(sql.contains("FROM photos"));
        assert!(sql.contains("ORDER BY created_at DESC, id DESC"));
        assert!(!sql.contains("WHERE"));
        assert!(!sql.contains("LIMIT"));
    }

    #[test]
    fn test_build_sql_oldest_first() {
        let sql = PhotoQuery::new().oldest_first().build_sql();
        assert!(sql.contains("ORDER BY created_at ASC, id ASC"));
    }

    #[test]
    fn test_build_sql_pagination() {
        let sql = PhotoQuery::new().limit(50).offset(25).build_sql();
        assert!(sql.ends_with("LIMIT 50 OFFSET 25"));

        let sql = PhotoQuery::new().offset(25).build_sql();
        assert!(sql.ends_with("LIMIT -1 OFFSET 25"));
    }

    #[test]
    fn test_build_sql_selects_all_columns() {
        let sql = PhotoQuery::new().build_sql();
        for column in [
            "file_uri",
            "latitude",
            "longitude",
            "location_name",
            "created_at",
            "description",
        ] {
            assert!(sql.contains(column), "missing column {}", column);
        }
    }
}
