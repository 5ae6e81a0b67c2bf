//! Update command implementation.

use anyhow::{Context, Result};
use geogallery_store::Gallery;
use geogallery_types::Coord;

use super::{emit, render_record};
use crate::cli::OutputArgs;
use crate::format::FormatOptions;

/// Arguments for the update command.
pub struct UpdateArgs {
    pub id: i64,
    pub file_uri: Option<String>,
    pub at: Option<Coord>,
    pub clear_location: bool,
    pub description: Option<String>,
    pub clear_description: bool,
    pub output: OutputArgs,
}

impl UpdateArgs {
    fn has_changes(&self) -> bool {
        self.file_uri.is_some()
            || self.at.is_some()
            || self.clear_location
            || self.description.is_some()
            || self.clear_description
    }
}

pub async fn cmd_update(gallery: &Gallery, args: UpdateArgs, opts: &FormatOptions) -> Result<()> {
    if !args.has_changes() {
        anyhow::bail!(
            "Nothing to update. Use --file-uri, --at, --clear-location, --description or --clear-description"
        );
    }

    let mut record = gallery
        .get(args.id)
        .await?
        .with_context(|| format!("Photo {} not found", args.id))?;

    if let Some(file_uri) = args.file_uri {
        record.file_uri = file_uri;
    }
    if args.clear_location {
        record.coords = None;
    } else if let Some(coord) = args.at {
        record.coords = Some(coord);
    }
    if args.clear_description {
        record.description = None;
    } else if let Some(description) = args.description {
        record.description = Some(description);
    }

    let updated = gallery
        .update(record)
        .await
        .with_context(|| format!("Failed to update photo {}", args.id))?;

    emit(&render_record(&updated, &args.output, opts)?)
}
