//! Forward and reverse geocoding commands.

use anyhow::{Context, Result};
use clap::Args;
use serde::Serialize;
use tracing::info;

use eventfinder_lib::{Coordinates, Geocoder};

use crate::commands::{geocoder, CommandContext};
use crate::output::emit;

#[derive(Debug, Clone, Args)]
pub struct GeocodeArgs {
    /// Place name to resolve.
    pub text: String,
}

#[derive(Debug, Clone, Args)]
pub struct ReverseArgs {
    /// Position to describe.
    #[arg(value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub position: Coordinates,
}

#[derive(Debug, Clone, Serialize)]
struct GeocodeResult<'a> {
    query: &'a str,
    coordinates: Option<Coordinates>,
}

#[derive(Debug, Clone, Serialize)]
struct ReverseResult {
    coordinates: Coordinates,
    place_name: Option<String>,
}

pub fn handle_geocode(ctx: &CommandContext, args: &GeocodeArgs) -> Result<()> {
    let geocoder = geocoder()?;
    let coordinates = geocoder
        .forward(&args.text)
        .with_context(|| format!("failed to geocode {:?}", args.text))?;
    if coordinates.is_none() {
        info!(query = %args.text, "no geocoding match");
    }

    let result = GeocodeResult {
        query: &args.text,
        coordinates,
    };
    emit(ctx.format, &result, |result, _| match result.coordinates {
        Some(coordinates) => format!("{coordinates}\n"),
        None => format!("No match for {:?}.\n", result.query),
    })
}

pub fn handle_reverse(ctx: &CommandContext, args: &ReverseArgs) -> Result<()> {
    let geocoder = geocoder()?;
    let place_name = geocoder
        .reverse(args.position)
        .with_context(|| format!("failed to reverse geocode {}", args.position))?;

    let result = ReverseResult {
        coordinates: args.position,
        place_name,
    };
    emit(ctx.format, &result, |result, _| match &result.place_name {
        Some(name) => format!("{name}\n"),
        None => format!("No place found at {}.\n", result.coordinates),
    })
}
