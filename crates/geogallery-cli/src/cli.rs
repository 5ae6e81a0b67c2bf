//! CLI argument definitions using clap.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use geogallery_types::Coord;
use time::OffsetDateTime;

/// Output format for commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Reusable output format arguments
#[derive(Debug, Clone, Args)]
pub struct OutputArgs {
    /// Output format
    #[arg(short, long, value_enum, default_value = "text")]
    pub format: OutputFormat,

    /// Omit header row in CSV output (useful for appending)
    #[arg(long)]
    pub no_header: bool,
}

#[derive(Parser)]
#[command(name = "geogallery")]
#[command(author, version, about = "Browse and search geotagged photos", long_about = None)]
pub struct Cli {
    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, global = true, env = "GEOGALLERY_CONFIG")]
    pub config: Option<PathBuf>,

    /// Database file (overrides storage.path from the config)
    #[arg(long, global = true, env = "GEOGALLERY_DB")]
    pub database: Option<PathBuf>,

    /// Skip reverse geocoding; new locations are stored as "Unknown Location"
    #[arg(long, global = true)]
    pub offline: bool,

    /// Output compact JSON (no pretty-printing)
    #[arg(long, global = true)]
    pub compact: bool,

    /// Disable colored output
    #[arg(long, global = true, env = "NO_COLOR")]
    pub no_color: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Add a photo to the gallery
    Add {
        /// Path or file:// URI of the photo
        file_uri: String,

        /// Capture location as "LAT,LON"
        #[arg(long, value_parser = parse_coord, allow_hyphen_values = true)]
        at: Option<Coord>,

        /// Free-text description
        #[arg(short, long)]
        description: Option<String>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// List photos, newest first
    #[command(alias = "ls")]
    List {
        /// Maximum number of photos to show
        #[arg(short = 'n', long)]
        limit: Option<u32>,

        /// Skip this many photos
        #[arg(long)]
        offset: Option<u32>,

        /// Show oldest photos first
        #[arg(long)]
        oldest_first: bool,

        /// Only photos with a capture location
        #[arg(long)]
        with_location: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show a single photo
    Show {
        /// Photo id
        id: i64,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Edit a photo's file, location or description
    Update {
        /// Photo id
        id: i64,

        /// New path or file:// URI
        #[arg(long)]
        file_uri: Option<String>,

        /// New capture location as "LAT,LON"
        #[arg(
            long,
            value_parser = parse_coord,
            allow_hyphen_values = true,
            conflicts_with = "clear_location"
        )]
        at: Option<Coord>,

        /// Remove the capture location
        #[arg(long)]
        clear_location: bool,

        /// New description
        #[arg(short, long, conflicts_with = "clear_description")]
        description: Option<String>,

        /// Remove the description
        #[arg(long)]
        clear_description: bool,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Delete a photo and its file
    #[command(alias = "rm")]
    Remove {
        /// Photo id
        id: i64,
    },

    /// Photos within a radius of a point, nearest first
    Near {
        /// Center as "LAT,LON"
        #[arg(value_parser = parse_coord, allow_hyphen_values = true)]
        center: Coord,

        /// Radius in kilometers (defaults to search.default_radius_km)
        #[arg(short, long, value_parser = parse_radius)]
        radius: Option<f64>,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// The photos closest to a point
    Nearest {
        /// Center as "LAT,LON"
        #[arg(value_parser = parse_coord, allow_hyphen_values = true)]
        center: Coord,

        /// How many photos to return
        #[arg(short = 'n', long, default_value = "5")]
        count: usize,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Search place names and descriptions
    Search {
        /// Text to look for (case-insensitive); empty lists everything
        #[arg(default_value = "")]
        text: String,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Photos taken within a time range (inclusive)
    Between {
        /// Start (RFC3339 or YYYY-MM-DD)
        #[arg(value_parser = parse_start)]
        start: OffsetDateTime,

        /// End (RFC3339, or YYYY-MM-DD for the whole day)
        #[arg(value_parser = parse_end)]
        end: OffsetDateTime,

        #[command(flatten)]
        output: OutputArgs,
    },

    /// Show database location and statistics
    Info {
        /// Output format
        #[arg(short, long, value_enum, default_value = "text")]
        format: OutputFormat,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

/// Configuration subcommands
#[derive(Debug, Clone, Subcommand)]
pub enum ConfigAction {
    /// Show the effective configuration
    Show,

    /// Show configuration file path
    Path,

    /// Write a default configuration file
    Init {
        /// Overwrite an existing file
        #[arg(long)]
        force: bool,
    },
}

/// Parse a "LAT,LON" pair.
fn parse_coord(s: &str) -> Result<Coord, String> {
    s.parse::<Coord>().map_err(|e| e.to_string())
}

/// Parse a search radius in kilometers.
fn parse_radius(s: &str) -> Result<f64, String> {
    let radius: f64 = s
        .trim()
        .parse()
        .map_err(|_| format!("'{}' is not a valid number", s))?;
    if radius.is_finite() && radius > 0.0 {
        Ok(radius)
    } else {
        Err(format!("Radius must be a positive number of kilometers, got {}", s))
    }
}

fn parse_start(s: &str) -> Result<OffsetDateTime, String> {
    parse_datetime(s, false).map_err(|e| e.to_string())
}

fn parse_end(s: &str) -> Result<OffsetDateTime, String> {
    parse_datetime(s, true).map_err(|e| e.to_string())
}

/// Parse RFC3339 or a bare date.
///
/// A bare date means midnight UTC, or the last second of that day when
/// `end_of_day` is set.
pub fn parse_datetime(s: &str, end_of_day: bool) -> anyhow::Result<OffsetDateTime> {
    // Try RFC3339 first
    if let Ok(dt) = OffsetDateTime::parse(s, &time::format_description::well_known::Rfc3339) {
        return Ok(dt);
    }

    // Try date only (YYYY-MM-DD)
    let format = time::format_description::parse("[year]-[month]-[day]")?;
    if let Ok(date) = time::Date::parse(s, &format) {
        let dt = if end_of_day {
            date.with_hms(23, 59, 59)?
        } else {
            date.with_hms(0, 0, 0)?
        };
        return Ok(dt.assume_utc());
    }

    anyhow::bail!("Invalid date/time format: {}. Use RFC3339 or YYYY-MM-DD", s)
}
