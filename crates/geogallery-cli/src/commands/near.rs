//! Distance search commands.

use anyhow::Result;
use geogallery_store::Gallery;
use geogallery_types::Coord;

use super::{emit, render_nearby};
use crate::cli::OutputArgs;
use crate::format::FormatOptions;

pub async fn cmd_near(
    gallery: &Gallery,
    center: Coord,
    radius_km: f64,
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<()> {
    let hits = gallery.find_near(center, radius_km).await?;
    emit(&render_nearby(&hits, output, opts)?)
}

pub async fn cmd_nearest(
    gallery: &Gallery,
    center: Coord,
    count: usize,
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<()> {
    let hits = gallery.find_nearest(center, count).await?;
    emit(&render_nearby(&hits, output, opts)?)
}
