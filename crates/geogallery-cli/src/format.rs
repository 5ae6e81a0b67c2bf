//! Output formatting utilities for text, JSON, and CSV output.

use anyhow::Result;
use geogallery_store::{NearbyPhoto, PhotoRecord};
use owo_colors::OwoColorize;
use serde::Serialize;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

/// Formatting options for output.
#[derive(Debug, Clone, Copy, Default)]
pub struct FormatOptions {
    /// Disable colored output.
    pub no_color: bool,
    /// Omit header row in CSV output.
    pub no_header: bool,
    /// Use compact JSON output (no pretty-printing).
    pub compact: bool,
}

impl FormatOptions {
    pub fn new(no_color: bool, compact: bool) -> Self {
        Self {
            no_color,
            no_header: false,
            compact,
        }
    }

    /// Create with no_header option for CSV output.
    pub fn with_no_header(mut self, no_header: bool) -> Self {
        self.no_header = no_header;
        self
    }

    /// Serialize value to JSON string, respecting compact option.
    pub fn as_json<T: Serialize + ?Sized>(&self, value: &T) -> Result<String> {
        let json = if self.compact {
            serde_json::to_string(value)?
        } else {
            serde_json::to_string_pretty(value)?
        };
        Ok(json + "\n")
    }

    fn heading(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.bold().to_string()
        }
    }

    fn dim(&self, text: &str) -> String {
        if self.no_color {
            text.to_string()
        } else {
            text.dimmed().to_string()
        }
    }
}

/// Escape a value for CSV output.
#[must_use]
pub fn csv_escape(s: &str) -> String {
    if s.contains(',') || s.contains('"') || s.contains('\n') || s.contains('\r') {
        format!("\"{}\"", s.replace('"', "\"\""))
    } else {
        s.to_string()
    }
}

fn timestamp(dt: OffsetDateTime) -> String {
    dt.format(&Rfc3339).unwrap_or_else(|_| String::new())
}

fn coords_text(record: &PhotoRecord) -> String {
    record
        .coords
        .map(|c| c.to_string())
        .unwrap_or_else(|| "-".to_string())
}

fn place_text(record: &PhotoRecord) -> &str {
    if record.location_name.is_empty() {
        "-"
    } else {
        &record.location_name
    }
}

/// Format a photo list as aligned text, one photo per line.
#[must_use]
pub fn format_records_text(records: &[PhotoRecord], opts: &FormatOptions) -> String {
    if records.is_empty() {
        return "No photos found.\n".to_string();
    }

    let mut output = opts.heading(&format!(
        "{:>6}  {:<20}  {:<24}  {}\n",
        "ID", "CREATED", "LOCATION", "PLACE"
    ));
    for record in records {
        output.push_str(&format!(
            "{:>6}  {:<20}  {:<24}  {}\n",
            record.id,
            timestamp(record.created_at),
            coords_text(record),
            place_text(record)
        ));
        output.push_str(&format!("        {}\n", opts.dim(&record.file_uri)));
    }
    output.push_str(&format!("\n{} photo(s)\n", records.len()));
    output
}

/// Format every field of a single photo.
#[must_use]
pub fn format_record_detail(record: &PhotoRecord, opts: &FormatOptions) -> String {
    let mut output = opts.heading(&format!("Photo {}\n", record.id));
    output.push_str(&format!("  File:        {}\n", record.file_uri));
    output.push_str(&format!("  Created:     {}\n", timestamp(record.created_at)));
    output.push_str(&format!("  Location:    {}\n", coords_text(record)));
    output.push_str(&format!("  Place:       {}\n", place_text(record)));
    output.push_str(&format!(
        "  Description: {}\n",
        record.description.as_deref().unwrap_or("-")
    ));
    output
}

/// Format a photo list as CSV.
#[must_use]
pub fn format_records_csv(records: &[PhotoRecord], opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "id,created_at,latitude,longitude,location_name,file_uri,description\n".to_string()
    };
    for record in records {
        output.push_str(&record_csv_fields(record));
        output.push('\n');
    }
    output
}

fn record_csv_fields(record: &PhotoRecord) -> String {
    let (latitude, longitude) = match record.coords {
        Some(c) => (format!("{:.6}", c.latitude), format!("{:.6}", c.longitude)),
        None => (String::new(), String::new()),
    };
    format!(
        "{},{},{},{},{},{},{}",
        record.id,
        timestamp(record.created_at),
        latitude,
        longitude,
        csv_escape(&record.location_name),
        csv_escape(&record.file_uri),
        csv_escape(record.description.as_deref().unwrap_or(""))
    )
}

/// Format distance search results as aligned text.
#[must_use]
pub fn format_nearby_text(hits: &[NearbyPhoto], opts: &FormatOptions) -> String {
    if hits.is_empty() {
        return "No photos found.\n".to_string();
    }

    let mut output = opts.heading(&format!(
        "{:>6}  {:>10}  {:<24}  {}\n",
        "ID", "DISTANCE", "LOCATION", "PLACE"
    ));
    for hit in hits {
        output.push_str(&format!(
            "{:>6}  {:>10}  {:<24}  {}\n",
            hit.record.id,
            format_distance(hit.distance_km),
            coords_text(&hit.record),
            place_text(&hit.record)
        ));
        output.push_str(&format!("        {}\n", opts.dim(&hit.record.file_uri)));
    }
    output.push_str(&format!("\n{} photo(s)\n", hits.len()));
    output
}

/// Format distance search results as CSV.
#[must_use]
pub fn format_nearby_csv(hits: &[NearbyPhoto], opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "distance_km,id,created_at,latitude,longitude,location_name,file_uri,description\n"
            .to_string()
    };
    for hit in hits {
        output.push_str(&format!(
            "{:.3},{}\n",
            hit.distance_km,
            record_csv_fields(&hit.record)
        ));
    }
    output
}

/// Human-readable distance: meters below 1 km.
#[must_use]
pub fn format_distance(km: f64) -> String {
    if km < 1.0 {
        format!("{:.0} m", km * 1000.0)
    } else {
        format!("{:.2} km", km)
    }
}
