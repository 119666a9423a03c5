//! Locate command: the geolocation resolver fed by a fixed position.
//!
//! A terminal has no device position, so `--at` stands in for it. Without
//! `--at` the resolver reports that geolocation is unsupported.

use anyhow::{Context, Result};
use clap::Args;

use eventfinder_lib::geolocation::PositionError;
use eventfinder_lib::{Coordinates, FixedPosition, GeolocationResolver};

use crate::commands::{geocoder, CommandContext};
use crate::output::{emit, render_locate};

#[derive(Debug, Clone, Args)]
pub struct LocateArgs {
    /// Device position to resolve into a place label.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub at: Option<Coordinates>,
}

pub fn handle_locate(ctx: &CommandContext, args: &LocateArgs) -> Result<()> {
    let mut resolver = GeolocationResolver::new();
    match args.at {
        Some(position) => {
            let geocoder = geocoder()?;
            resolver.locate(&FixedPosition::at(position), &geocoder);
        }
        None => {
            let token = resolver.start();
            resolver.on_position(token, Err(PositionError::Unsupported));
        }
    }

    emit(ctx.format, resolver.state(), render_locate).context("failed to write location")
}
