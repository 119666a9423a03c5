//! Route command: driving directions to a position.

use anyhow::{Context, Result};
use clap::Args;
use tracing::info;

use eventfinder_lib::{Coordinates, MapboxDirections, RouteProvider};

use crate::commands::{mapbox_config, CommandContext};
use crate::output::{emit, render_route, RouteOutcome};

/// Printed instead of directions when the destination is outside the routing
/// area.
pub const OUTSIDE_AREA_NOTICE: &str =
    "Directions are only available for events in the United Kingdom; no route was requested.";

#[derive(Debug, Clone, Args)]
pub struct RouteArgs {
    /// Destination.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub to: Coordinates,
    /// Starting point; defaults to EVENTFINDER_ORIGIN or the fixed user location.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub from: Option<Coordinates>,
}

/// The notice outcome when `destination` is outside the routing area.
pub fn outside_area(destination: Coordinates) -> Option<RouteOutcome> {
    if destination.is_uk_eligible() {
        return None;
    }
    info!(%destination, "destination outside routing area");
    Some(RouteOutcome::OutsideArea {
        destination,
        notice: OUTSIDE_AREA_NOTICE.to_string(),
    })
}

/// Gate on the routing area, then ask `provider` for the route.
pub fn plan_route<P>(
    provider: &P,
    origin: Coordinates,
    destination: Coordinates,
) -> Result<RouteOutcome>
where
    P: RouteProvider + ?Sized,
{
    if let Some(outcome) = outside_area(destination) {
        return Ok(outcome);
    }

    let route = provider
        .route(origin, destination)
        .with_context(|| format!("failed to compute a route from {origin} to {destination}"))?;
    Ok(RouteOutcome::Routed {
        origin,
        destination,
        route,
    })
}

pub fn handle_route(ctx: &CommandContext, args: &RouteArgs) -> Result<()> {
    let origin = args.from.unwrap_or(ctx.origin);

    let outcome = match outside_area(args.to) {
        Some(outcome) => outcome,
        None => {
            let provider = MapboxDirections::new(&mapbox_config()?)
                .context("failed to build directions client")?;
            plan_route(&provider, origin, args.to)?
        }
    };

    emit(ctx.format, &outcome, render_route).context("failed to write route")
}
