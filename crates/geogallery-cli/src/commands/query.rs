//! Listing and lookup commands.

use anyhow::{Context, Result};
use geogallery_store::{Gallery, PhotoQuery};
use time::OffsetDateTime;

use super::{emit, render_record, render_records};
use crate::cli::OutputArgs;
use crate::format::FormatOptions;

/// Arguments for the list command.
pub struct ListArgs {
    pub limit: Option<u32>,
    pub offset: Option<u32>,
    pub oldest_first: bool,
    pub with_location: bool,
    pub output: OutputArgs,
}

impl ListArgs {
    fn query(&self) -> PhotoQuery {
        let mut query = PhotoQuery::new();
        if let Some(limit) = self.limit {
            query = query.limit(limit);
        }
        if let Some(offset) = self.offset {
            query = query.offset(offset);
        }
        if self.oldest_first {
            query = query.oldest_first();
        }
        if self.with_location {
            query = query.with_coords_only();
        }
        query
    }
}

pub async fn cmd_list(gallery: &Gallery, args: ListArgs, opts: &FormatOptions) -> Result<()> {
    let records = gallery.query(&args.query()).await?;
    emit(&render_records(&records, &args.output, opts)?)
}

pub async fn cmd_show(
    gallery: &Gallery,
    id: i64,
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<()> {
    let record = gallery
        .get(id)
        .await?
        .with_context(|| format!("Photo {} not found", id))?;
    emit(&render_record(&record, output, opts)?)
}

pub async fn cmd_search(
    gallery: &Gallery,
    text: &str,
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<()> {
    let records = gallery.find_by_text(text).await?;
    emit(&render_records(&records, output, opts)?)
}

pub async fn cmd_between(
    gallery: &Gallery,
    start: OffsetDateTime,
    end: OffsetDateTime,
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<()> {
    if start > end {
        tracing::warn!("Start is after end; no photos can match");
    }
    let records = gallery.find_by_date_range(start, end).await?;
    emit(&render_records(&records, output, opts)?)
}
