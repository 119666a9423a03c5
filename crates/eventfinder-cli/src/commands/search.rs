//! Search command: one run of the search session.

use std::time::Instant;

use anyhow::{Context, Result};
use chrono::{NaiveDate, TimeZone};
use clap::Args;
use tracing::debug;

use eventfinder_lib::{
    Coordinates, DatePreset, DateRange, FilterContext, Pagination, ResultRenderer, SearchSession,
};

use crate::commands::{geocoder, search_client, today, CommandContext};
use crate::output::{emit, render_search_page, SearchPage};

#[derive(Debug, Clone, Args)]
pub struct SearchArgs {
    /// Free-text keyword; blank lists everything.
    pub keyword: Option<String>,
    /// Place name, geocoded before searching.
    #[arg(long, conflicts_with = "near")]
    pub location: Option<String>,
    /// Search around this position instead of a place name.
    #[arg(long, value_name = "LAT,LNG", allow_hyphen_values = true)]
    pub near: Option<Coordinates>,
    /// Date preset: today, tomorrow or week.
    #[arg(long, value_name = "PRESET", conflicts_with = "from")]
    pub date: Option<DatePreset>,
    /// First day of a custom range (YYYY-MM-DD).
    #[arg(long, requires = "to")]
    pub from: Option<NaiveDate>,
    /// Last day of a custom range (YYYY-MM-DD).
    #[arg(long, requires = "from")]
    pub to: Option<NaiveDate>,
    /// Event type; repeat to match any of several.
    #[arg(long = "type", value_name = "TYPE")]
    pub types: Vec<String>,
    /// Page number, starting at 1.
    #[arg(long, default_value_t = 1)]
    pub page: usize,
}

/// Apply keyword, date and type inputs to a fresh session.
pub fn apply_filters<Tz: TimeZone>(
    session: &mut SearchSession<Tz>,
    args: &SearchArgs,
) -> Result<()> {
    if let Some(keyword) = &args.keyword {
        session.set_keyword(keyword);
    }

    if let (Some(from), Some(to)) = (args.from, args.to) {
        let range = DateRange::new(from, to)?;
        let dates = session.date_filter_mut();
        dates.select_preset(DatePreset::Custom);
        dates.set_custom_range(range);
        dates.apply()?;
    } else if let Some(preset) = args.date {
        session.date_filter_mut().select_preset(preset);
    }

    let types = session.event_types_mut();
    for event_type in &args.types {
        if !types.is_selected(event_type) {
            types.toggle(event_type);
        }
    }
    Ok(())
}

pub fn handle_search(ctx: &CommandContext, args: &SearchArgs) -> Result<()> {
    let (client, config) = search_client()?;
    let mut session = SearchSession::new(FilterContext::new(), config.hits_per_page);
    apply_filters(&mut session, args)?;

    if let Some(text) = &args.location {
        let geocoder = geocoder()?;
        session.edit_location(text);
        session.submit(&geocoder);
    } else if let Some(near) = args.near {
        session.use_current_location(&near.to_string(), near);
    }
    session.set_page(args.page.saturating_sub(1));

    let results = session.run(&client, today());
    debug!(hits = results.nb_hits, page = results.page, "search page received");

    let mut renderer = ResultRenderer::default();
    let now = Instant::now();
    renderer.observe(&results.hits, now);

    let pagination = Pagination::from_results(&results);
    let page = SearchPage {
        summary: renderer.summary(results.nb_hits, config.hits_per_page, now),
        results: renderer.view(now),
        pages: if pagination.should_render() {
            pagination.pages()
        } else {
            Vec::new()
        },
        pagination,
        trending: session
            .trending_keywords()
            .iter()
            .map(|k| k.to_string())
            .collect(),
    };

    emit(ctx.format, &page, render_search_page).context("failed to write search results")
}
