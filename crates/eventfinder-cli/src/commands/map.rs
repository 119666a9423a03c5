//! Map command: clustered markers for the current query, plus an optional
//! marker selection with its route.

use anyhow::{anyhow, Context, Result};
use clap::Args;

use eventfinder_lib::cluster::{cluster_events, DEFAULT_CLUSTER_RADIUS_PX, DEFAULT_ZOOM};
use eventfinder_lib::selection::DetachedOverlay;
use eventfinder_lib::session::run_query;
use eventfinder_lib::{
    mappable_events, Event, EventCard, FilterContext, MapSession, MapboxDirections, RouteProvider,
    SearchSession,
};

use crate::commands::{mapbox_config, search_client, today, CommandContext};
use crate::output::{emit, render_map, LabelledCluster, MapView, SelectionView};

#[derive(Debug, Clone, Args)]
pub struct MapArgs {
    /// Free-text keyword; blank maps everything.
    pub keyword: Option<String>,
    /// Zoom level used for clustering.
    #[arg(long, default_value_t = DEFAULT_ZOOM)]
    pub zoom: u8,
    /// Event id (objectID) of the marker to click.
    #[arg(long, value_name = "ID")]
    pub select: Option<String>,
}

/// Cluster the mappable hits, titling single-event clusters.
pub fn build_clusters(hits: &[Event], zoom: u8) -> Vec<LabelledCluster> {
    let mappable = mappable_events(hits);
    cluster_events(mappable.iter().copied(), zoom, DEFAULT_CLUSTER_RADIUS_PX)
        .into_iter()
        .map(|cluster| {
            let title = if cluster.is_single() {
                mappable
                    .iter()
                    .find(|event| event.object_id == cluster.members[0])
                    .map(|event| event.title.clone())
            } else {
                None
            };
            LabelledCluster { cluster, title }
        })
        .collect()
}

/// Click the marker for `event_id` and fetch its route when eligible.
pub fn select_marker<P>(
    session: &mut MapSession<P, DetachedOverlay>,
    hits: &[Event],
    event_id: &str,
) -> Result<SelectionView>
where
    P: RouteProvider,
{
    let event = mappable_events(hits)
        .into_iter()
        .find(|event| event.object_id == event_id)
        .ok_or_else(|| anyhow!("no event with id {event_id:?} on the map"))?;

    let state = session.click_and_route(event).clone();
    let card = state.card_visible().then(|| EventCard::from(event));
    Ok(SelectionView { state, card })
}

pub fn handle_map(ctx: &CommandContext, args: &MapArgs) -> Result<()> {
    let (client, config) = search_client()?;
    let mut session = SearchSession::new(FilterContext::new(), config.hits_per_page);
    if let Some(keyword) = &args.keyword {
        session.set_keyword(keyword);
    }
    let results = run_query(&client, &session.map_params(today()));
    let clusters = build_clusters(&results.hits, args.zoom);

    let selection = match &args.select {
        Some(event_id) => {
            let provider = MapboxDirections::new(&mapbox_config()?)
                .context("failed to build directions client")?;
            let mut map = MapSession::new(provider, DetachedOverlay, ctx.origin);
            Some(select_marker(&mut map, &results.hits, event_id)?)
        }
        None => None,
    };

    let view = MapView {
        zoom: args.zoom,
        total_hits: results.nb_hits,
        mappable: mappable_events(&results.hits).len(),
        clusters,
        selection,
    };
    emit(ctx.format, &view, render_map).context("failed to write map")
}
