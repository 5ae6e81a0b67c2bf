//! Command implementations for the CLI.

mod add;
mod config;
mod info;
mod near;
mod query;
mod remove;
mod update;

use std::io::{self, Write};

use anyhow::Result;
use geogallery_store::{NearbyPhoto, PhotoRecord};

use crate::cli::{OutputArgs, OutputFormat};
use crate::format::{
    FormatOptions, format_nearby_csv, format_nearby_text, format_record_detail,
    format_records_csv, format_records_text,
};

pub use add::{AddArgs, cmd_add};
pub use config::cmd_config;
pub use info::cmd_info;
pub use near::{cmd_near, cmd_nearest};
pub use query::{ListArgs, cmd_between, cmd_list, cmd_search, cmd_show};
pub use remove::cmd_remove;
pub use update::{UpdateArgs, cmd_update};

/// Write rendered output to stdout.
fn emit(content: &str) -> Result<()> {
    let mut stdout = io::stdout().lock();
    stdout.write_all(content.as_bytes())?;
    stdout.flush()?;
    Ok(())
}

fn render_records(
    records: &[PhotoRecord],
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<String> {
    let opts = opts.with_no_header(output.no_header);
    Ok(match output.format {
        OutputFormat::Text => format_records_text(records, &opts),
        OutputFormat::Json => opts.as_json(records)?,
        OutputFormat::Csv => format_records_csv(records, &opts),
    })
}

fn render_record(
    record: &PhotoRecord,
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<String> {
    let opts = opts.with_no_header(output.no_header);
    Ok(match output.format {
        OutputFormat::Text => format_record_detail(record, &opts),
        OutputFormat::Json => opts.as_json(record)?,
        OutputFormat::Csv => format_records_csv(std::slice::from_ref(record), &opts),
    })
}

fn render_nearby(
    hits: &[NearbyPhoto],
    output: &OutputArgs,
    opts: &FormatOptions,
) -> Result<String> {
    let opts = opts.with_no_header(output.no_header);
    Ok(match output.format {
        OutputFormat::Text => format_nearby_text(hits, &opts),
        OutputFormat::Json => opts.as_json(hits)?,
        OutputFormat::Csv => format_nearby_csv(hits, &opts),
    })
}
