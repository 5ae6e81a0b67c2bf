//! Add command implementation.

use anyhow::{Context, Result};
use geogallery_store::{Gallery, NewPhoto, files};
use geogallery_types::Coord;
use tracing::warn;

use super::{emit, render_record};
use crate::cli::{OutputArgs, OutputFormat};
use crate::format::FormatOptions;

/// Arguments for the add command.
pub struct AddArgs {
    pub file_uri: String,
    pub at: Option<Coord>,
    pub description: Option<String>,
    pub output: OutputArgs,
}

pub async fn cmd_add(gallery: &Gallery, args: AddArgs, opts: &FormatOptions) -> Result<()> {
    let mut photo = NewPhoto::new(args.file_uri);
    if let Some(coord) = args.at {
        photo = photo.at(coord);
    }
    if let Some(description) = args.description {
        photo = photo.described(description);
    }

    // The store accepts any URI; only hint when a local file is missing
    if let Some(path) = files::local_path(&photo.file_uri)
        && !path.exists()
    {
        warn!("{} does not exist", path.display());
    }

    let id = gallery.create(photo).await.context("Failed to add photo")?;
    let record = gallery
        .get(id)
        .await?
        .with_context(|| format!("Photo {} disappeared after insert", id))?;

    let mut content = String::new();
    if args.output.format == OutputFormat::Text {
        content.push_str(&format!("Added photo {}\n\n", id));
    }
    content.push_str(&render_record(&record, &args.output, opts)?);
    emit(&content)
}
