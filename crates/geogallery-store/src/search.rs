//! Geospatial and text search over a snapshot of photo records.
//!
//! Everything here is a pure function of its inputs. [`Gallery`](crate::Gallery)
//! feeds these from [`Store::list`](crate::Store::list), so results always
//! match filtering the full table in memory.

use std::cmp::Ordering;

use time::OffsetDateTime;

use geogallery_types::{Coord, distance_km};

use crate::models::{NearbyPhoto, PhotoRecord};

/// Photos strictly closer than `radius_km` to `center`, nearest first.
///
/// Photos without coordinates are skipped. Equal distances are ordered by
/// ascending id. A radius that is not a positive number matches nothing.
pub fn within_radius(records: &[PhotoRecord], center: Coord, radius_km: f64) -> Vec<NearbyPhoto> {
    if !(radius_km > 0.0) {
        return Vec::new();
    }

    let mut hits: Vec<NearbyPhoto> = with_distances(records, center)
        .filter(|hit| hit.distance_km < radius_km)
        .collect();
    hits.sort_by(by_distance_then_id);
    hits
}

/// The `n` photos closest to `center`, nearest first.
pub fn nearest(records: &[PhotoRecord], center: Coord, n: usize) -> Vec<NearbyPhoto> {
    if n == 0 {
        return Vec::new();
    }

    let mut hits: Vec<NearbyPhoto> = with_distances(records, center).collect();
    hits.sort_by(by_distance_then_id);
    hits.truncate(n);
    hits
}

/// Photos whose location name or description contains `needle`, ignoring case.
///
/// A blank needle returns the snapshot unchanged. Input order is preserved.
pub fn matching_text(records: &[PhotoRecord], needle: &str) -> Vec<PhotoRecord> {
    if needle.trim().is_empty() {
        return records.to_vec();
    }

    let needle = needle.to_lowercase();
    records
        .iter()
        .filter(|record| {
            record.location_name.to_lowercase().contains(&needle)
                || record
                    .description
                    .as_deref()
                    .is_some_and(|d| d.to_lowercase().contains(&needle))
        })
        .cloned()
        .collect()
}

/// Photos created within `[start, end]`, both ends inclusive.
///
/// `start > end` matches nothing.
pub fn within_time_range(
    records: &[PhotoRecord],
    start: OffsetDateTime,
    end: OffsetDateTime,
) -> Vec<PhotoRecord> {
    if start > end {
        return Vec::new();
    }

    records
        .iter()
        .filter(|record| record.created_at >= start && record.created_at <= end)
        .cloned()
        .collect()
}

fn with_distances(
    records: &[PhotoRecord],
    center: Coord,
) -> impl Iterator<Item = NearbyPhoto> + '_ {
    records.iter().filter_map(move |record| {
        let coords = record.coords?;
        Some(NearbyPhoto {
            distance_km: distance_km(center, coords),
            record: record.clone(),
        })
    })
}

fn by_distance_then_id(a: &NearbyPhoto, b: &NearbyPhoto) -> Ordering {
    a.distance_km
        .total_cmp(&b.distance_km)
        .then_with(|| a.record.id.cmp(&b.record.id))
}
