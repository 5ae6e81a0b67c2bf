use std::io;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::{CommandFactory, Parser};
use geogallery_store::geocode::{NominatimGeocoder, OfflineGeocoder, ReverseGeocoder};
use geogallery_store::{Gallery, GalleryOptions};
use tracing::warn;
use tracing_subscriber::EnvFilter;

mod cli;
mod commands;
mod config;
mod format;

use cli::{Cli, Commands};
use commands::{AddArgs, ListArgs, UpdateArgs};
use config::{Config, GeocodingConfig, default_config_path};
use format::FormatOptions;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Handle completions command early (before tracing init)
    if let Commands::Completions { shell } = cli.command {
        let mut cmd = Cli::command();
        clap_complete::generate(shell, &mut cmd, "geogallery", &mut io::stdout());
        return Ok(());
    }

    // Logs go to stderr so stdout stays parseable
    let filter = if cli.quiet {
        EnvFilter::new("warn")
    } else if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .init();

    let config_path = cli.config.clone().unwrap_or_else(default_config_path);
    let mut config = match &cli.config {
        // `config init` creates the file, so it may not exist yet
        Some(path) if !path.exists() && matches!(cli.command, Commands::Config { .. }) => {
            Config::default()
        }
        Some(path) => Config::load(path)?,
        None => Config::load_default()?,
    };

    // Command-line flags take precedence over the file
    if let Some(database) = &cli.database {
        config.storage.path = database.clone();
    }
    if cli.offline {
        config.geocoding.enabled = false;
    }

    if let Commands::Config { action } = &cli.command {
        return commands::cmd_config(action, &config, &config_path);
    }

    config.validate()?;

    let opts = FormatOptions::new(cli.no_color, cli.compact);
    let gallery = open_gallery(&config)?;

    let result = match cli.command {
        Commands::Add {
            file_uri,
            at,
            description,
            output,
        } => {
            let args = AddArgs {
                file_uri,
                at,
                description,
                output,
            };
            commands::cmd_add(&gallery, args, &opts).await
        }
        Commands::List {
            limit,
            offset,
            oldest_first,
            with_location,
            output,
        } => {
            let args = ListArgs {
                limit,
                offset,
                oldest_first,
                with_location,
                output,
            };
            commands::cmd_list(&gallery, args, &opts).await
        }
        Commands::Show { id, output } => commands::cmd_show(&gallery, id, &output, &opts).await,
        Commands::Update {
            id,
            file_uri,
            at,
            clear_location,
            description,
            clear_description,
            output,
        } => {
            let args = UpdateArgs {
                id,
                file_uri,
                at,
                clear_location,
                description,
                clear_description,
                output,
            };
            commands::cmd_update(&gallery, args, &opts).await
        }
        Commands::Remove { id } => commands::cmd_remove(&gallery, id, cli.quiet).await,
        Commands::Near {
            center,
            radius,
            output,
        } => {
            let radius = radius.unwrap_or(config.search.default_radius_km);
            commands::cmd_near(&gallery, center, radius, &output, &opts).await
        }
        Commands::Nearest {
            center,
            count,
            output,
        } => commands::cmd_nearest(&gallery, center, count, &output, &opts).await,
        Commands::Search { text, output } => {
            commands::cmd_search(&gallery, &text, &output, &opts).await
        }
        Commands::Between { start, end, output } => {
            commands::cmd_between(&gallery, start, end, &output, &opts).await
        }
        Commands::Info { format } => {
            commands::cmd_info(&gallery, &config, &config_path, format, &opts).await
        }
        Commands::Config { .. } | Commands::Completions { .. } => {
            // Already handled above
            unreachable!()
        }
    };

    let closed = gallery.close().await.context("Failed to close database");
    finish(result, closed)
}

/// Combine the command outcome with the database close.
///
/// The command's own error wins; a close failure after it is only logged.
fn finish(result: Result<()>, closed: Result<()>) -> Result<()> {
    match (result, closed) {
        (Err(e), Err(close_err)) => {
            warn!("{:#}", close_err);
            Err(e)
        }
        (Err(e), Ok(())) => Err(e),
        (Ok(()), closed) => closed,
    }
}

fn open_gallery(config: &Config) -> Result<Gallery> {
    let geocoder = build_geocoder(&config.geocoding)?;
    let options = GalleryOptions {
        geocode_timeout: config.geocoding.timeout(),
    };

    Gallery::open(&config.storage.path, geocoder, options).with_context(|| {
        format!(
            "Failed to open database {}",
            config.storage.path.display()
        )
    })
}

fn build_geocoder(config: &GeocodingConfig) -> Result<Arc<dyn ReverseGeocoder>> {
    if !config.enabled {
        return Ok(Arc::new(OfflineGeocoder));
    }

    let geocoder =
        NominatimGeocoder::with_endpoint(&config.endpoint, &config.user_agent, config.timeout())
            .context("Failed to set up reverse geocoding")?;
    Ok(Arc::new(geocoder))
}
