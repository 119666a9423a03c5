//! Suggest command: one debounced autocomplete round.

use std::time::Instant;

use anyhow::{Context, Result};
use clap::Subcommand;

use eventfinder_lib::autocomplete::DEBOUNCE_DELAY;
use eventfinder_lib::session::TRENDING_KEYWORDS;
use eventfinder_lib::{
    Autocomplete, HistoryStore, KeywordSuggestions, LocationSuggestion, LocationSuggestions,
    SuggestionSource,
};

use crate::commands::{geocoder, search_client, CommandContext};
use crate::output::{emit, render_keywords, render_locations};

#[derive(Debug, Clone, Subcommand)]
pub enum SuggestCommand {
    /// Event titles matching the text; trending keywords when blank.
    Keywords { text: String },
    /// Places matching the text; saved history when blank.
    Locations { text: String },
}

/// Feed `text` as a burst of keystrokes and fetch once the debounce window
/// has passed.
pub fn complete_once<S>(text: &str, source: &S) -> Vec<S::Item>
where
    S: SuggestionSource,
    S::Item: Clone,
{
    let mut autocomplete = Autocomplete::default();
    let start = Instant::now();
    autocomplete.input(text, start);
    autocomplete.fetch_due(start + DEBOUNCE_DELAY, source);
    autocomplete.suggestions().to_vec()
}

pub fn handle_suggest(ctx: &CommandContext, command: &SuggestCommand) -> Result<()> {
    match command {
        SuggestCommand::Keywords { text } => {
            let keywords: Vec<String> = if text.trim().is_empty() {
                TRENDING_KEYWORDS.iter().map(|k| k.to_string()).collect()
            } else {
                let (client, _) = search_client()?;
                complete_once(text, &KeywordSuggestions::new(&client))
            };
            emit(ctx.format, keywords.as_slice(), render_keywords)
                .context("failed to write suggestions")
        }
        SuggestCommand::Locations { text } => {
            let places: Vec<LocationSuggestion> = if text.trim().is_empty() {
                let store = HistoryStore::resolve(ctx.data_dir.as_deref())
                    .context("failed to locate the history file")?;
                store.load()?.entries().to_vec()
            } else {
                let geocoder = geocoder()?;
                complete_once(text, &LocationSuggestions::new(&geocoder))
            };
            emit(ctx.format, places.as_slice(), render_locations)
                .context("failed to write suggestions")
        }
    }
}
