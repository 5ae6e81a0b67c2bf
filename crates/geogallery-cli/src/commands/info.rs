//! Info command implementation.

use std::path::{Path, PathBuf};

use anyhow::Result;
use geogallery_store::{Gallery, PhotoQuery, SCHEMA_VERSION};
use serde::Serialize;

use super::emit;
use crate::cli::OutputFormat;
use crate::config::Config;
use crate::format::{FormatOptions, csv_escape};

#[derive(Debug, Serialize)]
struct InfoReport {
    database: PathBuf,
    config_file: PathBuf,
    schema_version: i32,
    photos: u64,
    with_location: usize,
    geocoding: bool,
    geocoding_endpoint: String,
    default_radius_km: f64,
}

pub async fn cmd_info(
    gallery: &Gallery,
    config: &Config,
    config_path: &Path,
    format: OutputFormat,
    opts: &FormatOptions,
) -> Result<()> {
    let photos = gallery.count().await?;
    let with_location = gallery
        .query(&PhotoQuery::new().with_coords_only())
        .await?
        .len();

    let report = InfoReport {
        database: config.storage.path.clone(),
        config_file: config_path.to_path_buf(),
        schema_version: SCHEMA_VERSION,
        photos,
        with_location,
        geocoding: config.geocoding.enabled,
        geocoding_endpoint: config.geocoding.endpoint.clone(),
        default_radius_km: config.search.default_radius_km,
    };

    let content = match format {
        OutputFormat::Json => opts.as_json(&report)?,
        OutputFormat::Text => format_info_text(&report),
        OutputFormat::Csv => format_info_csv(&report, opts),
    };
    emit(&content)
}

fn format_info_text(report: &InfoReport) -> String {
    let geocoding = if report.geocoding {
        format!("on ({})", report.geocoding_endpoint)
    } else {
        "off".to_string()
    };

    let mut output = String::new();
    output.push_str(&format!("Database:       {}\n", report.database.display()));
    output.push_str(&format!("Config file:    {}\n", report.config_file.display()));
    output.push_str(&format!("Schema version: {}\n", report.schema_version));
    output.push_str(&format!("Photos:         {}\n", report.photos));
    output.push_str(&format!("With location:  {}\n", report.with_location));
    output.push_str(&format!("Geocoding:      {}\n", geocoding));
    output.push_str(&format!("Default radius: {} km\n", report.default_radius_km));
    output
}

fn format_info_csv(report: &InfoReport, opts: &FormatOptions) -> String {
    let mut output = if opts.no_header {
        String::new()
    } else {
        "database,config_file,schema_version,photos,with_location,geocoding,default_radius_km\n"
            .to_string()
    };
    output.push_str(&format!(
        "{},{},{},{},{},{},{}\n",
        csv_escape(&report.database.display().to_string()),
        csv_escape(&report.config_file.display().to_string()),
        report.schema_version,
        report.photos,
        report.with_location,
        report.geocoding,
        report.default_radius_km
    ));
    output
}
