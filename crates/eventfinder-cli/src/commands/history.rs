//! History command: the saved location list.

use anyhow::{Context, Result};
use clap::Subcommand;
use tracing::info;

use eventfinder_lib::{Coordinates, HistoryStore, LocationHistory, LocationSuggestion};

use crate::commands::CommandContext;
use crate::output::{emit, render_locations};

#[derive(Debug, Clone, Subcommand)]
pub enum HistoryCommand {
    /// Show saved locations, most recent first.
    List,
    /// Save a location as if it had been picked from the suggestions.
    Add {
        /// Full place name, e.g. "Leeds, West Yorkshire, England".
        place_name: String,
        #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
        at: Coordinates,
        /// Short name; defaults to the first part of the place name.
        #[arg(long)]
        name: Option<String>,
        /// Region line; defaults to the rest of the place name.
        #[arg(long)]
        context: Option<String>,
    },
    /// Forget one location by its full place name.
    Remove { place_name: String },
    /// Forget every saved location.
    Clear,
}

/// Build a history entry from a place name, splitting off the short name.
pub fn place_from_name(
    place_name: &str,
    at: Coordinates,
    name: Option<&str>,
    context: Option<&str>,
) -> LocationSuggestion {
    let place_name = place_name.trim();
    let (head, tail) = place_name
        .split_once(',')
        .map(|(head, tail)| (head.trim(), tail.trim()))
        .unwrap_or((place_name, ""));
    let context = context.unwrap_or(tail);
    LocationSuggestion {
        name: name.unwrap_or(head).to_string(),
        context: if context.is_empty() {
            place_name.to_string()
        } else {
            context.to_string()
        },
        place_name: place_name.to_string(),
        lat: at.lat,
        lng: at.lng,
    }
}

pub fn handle_history(ctx: &CommandContext, command: &HistoryCommand) -> Result<()> {
    let store = HistoryStore::resolve(ctx.data_dir.as_deref())
        .context("failed to locate the history file")?;
    let mut history: LocationHistory = store
        .load()
        .with_context(|| format!("failed to read {}", store.path().display()))?;

    match command {
        HistoryCommand::List => {}
        HistoryCommand::Add {
            place_name,
            at,
            name,
            context,
        } => {
            history.add(place_from_name(
                place_name,
                *at,
                name.as_deref(),
                context.as_deref(),
            ));
            store.save(&history)?;
        }
        HistoryCommand::Remove { place_name } => {
            if history.remove(place_name.trim()) {
                store.save(&history)?;
            } else {
                info!(place = %place_name, "not in history");
            }
        }
        HistoryCommand::Clear => {
            history.clear();
            store.save(&history)?;
        }
    }

    emit(ctx.format, history.entries(), render_locations).context("failed to write history")
}
