//! Subcommand handlers.
//!
//! Each module owns one subcommand: its clap arguments and a `handle_*`
//! function. `main.rs` only parses and dispatches.

use std::path::PathBuf;

use anyhow::{Context, Result};
use chrono::{Local, NaiveDate};

use eventfinder_lib::{AlgoliaClient, AlgoliaConfig, Coordinates, MapboxConfig, MapboxGeocoder};

use crate::output::OutputFormat;

pub mod geocode;
pub mod history;
pub mod index;
pub mod locate;
pub mod map;
pub mod route;
pub mod search;
pub mod suggest;

/// Settings shared by every subcommand.
#[derive(Debug, Clone)]
pub struct CommandContext {
    pub format: OutputFormat,
    /// Location history directory; `None` means the platform default.
    pub data_dir: Option<PathBuf>,
    /// Routing origin.
    pub origin: Coordinates,
}

/// Calendar day used to anchor date presets.
pub(crate) fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub(crate) fn search_client() -> Result<(AlgoliaClient, AlgoliaConfig)> {
    let config = AlgoliaConfig::search_from_env().context("search index is not configured")?;
    let client = AlgoliaClient::new(&config).context("failed to build search client")?;
    Ok((client, config))
}

pub(crate) fn mapbox_config() -> Result<MapboxConfig> {
    MapboxConfig::from_env().context("maps service is not configured")
}

pub(crate) fn geocoder() -> Result<MapboxGeocoder> {
    MapboxGeocoder::new(&mapbox_config()?).context("failed to build geocoding client")
}
