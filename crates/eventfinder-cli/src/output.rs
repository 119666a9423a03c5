//! Output formatting for command results.
//!
//! Every command builds one serialisable value. `--format json` prints it as
//! pretty JSON; `--format text` hands it to one of the `render_*` functions
//! below, which return the finished text so they can be tested directly.

use std::fmt::Write as _;
use std::io::{self, Write};

use anyhow::Result;
use clap::ValueEnum;
use serde::Serialize;

use eventfinder_lib::cluster::Cluster;
use eventfinder_lib::{
    Coordinates, EventCard, GeolocationState, IndexReport, LocationSuggestion, Pagination,
    RouteData, ResultsView, SelectionState,
};

use crate::terminal::ColorPalette;

/// Output format selected with the global `--format` flag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// Write `value` to stdout in the requested format.
pub fn emit<T, F>(format: OutputFormat, value: &T, render: F) -> Result<()>
where
    T: Serialize + ?Sized,
    F: FnOnce(&T, &ColorPalette) -> String,
{
    let stdout = io::stdout();
    let mut out = stdout.lock();
    match format {
        OutputFormat::Json => {
            serde_json::to_writer_pretty(&mut out, value)?;
            writeln!(out)?;
        }
        OutputFormat::Text => {
            let palette = ColorPalette::detect();
            write!(out, "{}", render(value, &palette))?;
        }
    }
    out.flush()?;
    Ok(())
}

/// One page of search results as shown by `search`.
#[derive(Debug, Clone, Serialize)]
pub struct SearchPage {
    pub summary: String,
    pub results: ResultsView,
    pub pagination: Pagination,
    pub pages: Vec<usize>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub trending: Vec<String>,
}

/// Result of `route`.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "outcome", rename_all = "snake_case")]
pub enum RouteOutcome {
    Routed {
        origin: Coordinates,
        destination: Coordinates,
        route: RouteData,
    },
    /// Destination outside the routing area; no request was made.
    OutsideArea { destination: Coordinates, notice: String },
}

/// Marker selection as shown by `map --select`.
#[derive(Debug, Clone, Serialize)]
pub struct SelectionView {
    pub state: SelectionState,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub card: Option<EventCard>,
}

/// Result of `map`.
#[derive(Debug, Clone, Serialize)]
pub struct MapView {
    pub zoom: u8,
    pub total_hits: usize,
    pub mappable: usize,
    pub clusters: Vec<LabelledCluster>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub selection: Option<SelectionView>,
}

/// A cluster plus the title of its event when it holds exactly one.
#[derive(Debug, Clone, Serialize)]
pub struct LabelledCluster {
    #[serde(flatten)]
    pub cluster: Cluster,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
}

/// Result of `index`.
#[derive(Debug, Clone, Serialize)]
pub struct IndexOutput {
    pub dry_run: bool,
    pub report: IndexReport,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub records: Vec<IndexedRecord>,
}

/// Short form of one transformed record, listed on dry runs.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct IndexedRecord {
    #[serde(rename = "objectID")]
    pub object_id: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub geoloc: Option<Coordinates>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_timestamp: Option<i64>,
}

fn plural(count: usize, one: &str, many: &str) -> String {
    if count == 1 {
        format!("{count} {one}")
    } else {
        format!("{count} {many}")
    }
}

fn render_card(out: &mut String, card: &EventCard, palette: &ColorPalette) {
    let _ = write!(out, "{}{}{}", palette.title, card.title, palette.reset);
    if let Some(tag) = &card.event_type {
        let _ = write!(out, " {}[{}]{}", palette.tag, tag, palette.reset);
    }
    out.push('\n');
    if let Some(dates) = &card.dates {
        for line in dates.lines() {
            let _ = writeln!(out, "  {}{}{}", palette.muted, line, palette.reset);
        }
    }
    if let Some(location) = &card.location {
        let _ = writeln!(out, "  {location}");
    }
    if let Some(summary) = &card.summary {
        for line in summary.lines().filter(|line| !line.trim().is_empty()) {
            let _ = writeln!(out, "  {}", line.trim());
        }
    }
    let _ = writeln!(out, "  {}{}{}", palette.price, card.price, palette.reset);
    if !card.slug.is_empty() {
        let _ = writeln!(out, "  {}/{}{}", palette.muted, card.slug, palette.reset);
    }
}

/// Summary line, cards and page controls.
pub fn render_search_page(page: &SearchPage, palette: &ColorPalette) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}\n", page.summary);

    match &page.results {
        ResultsView::Empty => {
            let _ = writeln!(out, "{}", eventfinder_lib::results::EMPTY_MESSAGE);
        }
        ResultsView::Skeleton { count } => {
            for _ in 0..*count {
                let _ = writeln!(out, "{}...{}", palette.muted, palette.reset);
            }
        }
        ResultsView::Cards { cards } => {
            for card in cards {
                render_card(&mut out, card, palette);
                out.push('\n');
            }
        }
    }

    if page.pagination.should_render() {
        let labels: Vec<String> = page
            .pages
            .iter()
            .map(|&p| {
                if p == page.pagination.current {
                    format!("[{}]", p + 1)
                } else {
                    (p + 1).to_string()
                }
            })
            .collect();
        let _ = writeln!(
            out,
            "Page {} of {}: {}",
            page.pagination.current + 1,
            page.pagination.nb_pages,
            labels.join(" ")
        );
    }

    if !page.trending.is_empty() {
        let _ = writeln!(
            out,
            "{}Trending: {}{}",
            palette.muted,
            page.trending.join(", "),
            palette.reset
        );
    }
    out
}

/// One keyword per line.
pub fn render_keywords(keywords: &[String], _palette: &ColorPalette) -> String {
    keywords.iter().map(|k| format!("{k}\n")).collect()
}

/// Place name with its context underneath.
pub fn render_locations(places: &[LocationSuggestion], palette: &ColorPalette) -> String {
    if places.is_empty() {
        return "No locations.\n".to_string();
    }
    let mut out = String::new();
    for place in places {
        let _ = writeln!(
            out,
            "{}{}{}  {}{}{}",
            palette.title,
            place.name,
            palette.reset,
            palette.muted,
            place.context,
            palette.reset
        );
        let _ = writeln!(out, "  {} ({:.5},{:.5})", place.place_name, place.lat, place.lng);
    }
    out
}

fn render_route_body(out: &mut String, route: &RouteData, palette: &ColorPalette) {
    let _ = writeln!(
        out,
        "{}{} · {}{}",
        palette.price,
        route.distance_label(),
        route.duration_label(),
        palette.reset
    );
    for (n, step) in route.steps.iter().enumerate() {
        let distance = step.distance_label();
        let _ = write!(
            out,
            "{:>3}. {}{:<20}{} {}",
            n + 1,
            palette.tag,
            step.maneuver.to_string(),
            palette.reset,
            step.instruction
        );
        if !distance.is_empty() {
            let _ = write!(out, " {}({}){}", palette.muted, distance, palette.reset);
        }
        out.push('\n');
    }
}

pub fn render_route(outcome: &RouteOutcome, palette: &ColorPalette) -> String {
    let mut out = String::new();
    match outcome {
        RouteOutcome::Routed {
            origin,
            destination,
            route,
        } => {
            let _ = writeln!(out, "Route from {origin} to {destination}");
            render_route_body(&mut out, route, palette);
        }
        RouteOutcome::OutsideArea { notice, .. } => {
            let _ = writeln!(out, "{}{}{}", palette.notice, notice, palette.reset);
        }
    }
    out
}

fn render_selection(out: &mut String, selection: &SelectionView, palette: &ColorPalette) {
    out.push('\n');
    if let Some(card) = &selection.card {
        let _ = writeln!(out, "Selected:");
        render_card(out, card, palette);
    }
    match &selection.state {
        SelectionState::Routed { route, .. } | SelectionState::RoutedCardClosed { route, .. } => {
            let _ = writeln!(out, "Directions:");
            render_route_body(out, route, palette);
        }
        SelectionState::CardOnly { .. } => {
            let _ = writeln!(
                out,
                "{}Directions are not available for this event.{}",
                palette.notice, palette.reset
            );
        }
        SelectionState::NoneSelected => {
            let _ = writeln!(out, "No event selected.");
        }
        SelectionState::Selecting { .. } | SelectionState::Reselecting { .. } => {
            let _ = writeln!(out, "Loading route...");
        }
    }
}

/// Cluster list, then the selected marker when there is one.
pub fn render_map(view: &MapView, palette: &ColorPalette) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{} on the map in {} (zoom {}, {} matched)",
        plural(view.mappable, "event", "events"),
        plural(view.clusters.len(), "cluster", "clusters"),
        view.zoom,
        view.total_hits
    );
    for entry in &view.clusters {
        let cluster = &entry.cluster;
        match (&entry.title, cluster.is_single()) {
            (Some(title), true) => {
                let _ = writeln!(
                    out,
                    "  {}  {}{}{} {}[{}]{}",
                    cluster.center,
                    palette.title,
                    title,
                    palette.reset,
                    palette.muted,
                    cluster.members.join(", "),
                    palette.reset
                );
            }
            _ => {
                let _ = writeln!(
                    out,
                    "  {}  {} {}[{}]{}",
                    cluster.center,
                    plural(cluster.len(), "event", "events"),
                    palette.muted,
                    cluster.members.join(", "),
                    palette.reset
                );
            }
        }
    }
    if let Some(selection) = &view.selection {
        render_selection(&mut out, selection, palette);
    }
    out
}

pub fn render_locate(state: &GeolocationState, palette: &ColorPalette) -> String {
    match state {
        GeolocationState::Resolved { label, coordinates } => {
            format!("{}{}{} ({})\n", palette.title, label, palette.reset, coordinates)
        }
        GeolocationState::Denied { message } | GeolocationState::Failed { message } => {
            format!("{}{}{}\n", palette.notice, message, palette.reset)
        }
        GeolocationState::Locating => "Locating...\n".to_string(),
        GeolocationState::Idle => "Location not requested.\n".to_string(),
    }
}

pub fn render_index(output: &IndexOutput, palette: &ColorPalette) -> String {
    let mut out = String::new();
    if output.dry_run {
        let _ = writeln!(
            out,
            "Dry run: {} transformed, index left untouched",
            plural(output.report.fetched, "event", "events")
        );
        for record in &output.records {
            let position = record
                .geoloc
                .map(|geo| geo.to_string())
                .unwrap_or_else(|| "no position".to_string());
            let _ = writeln!(
                out,
                "  {}{}{}  {}  {}{}{}",
                palette.muted,
                record.object_id,
                palette.reset,
                record.title,
                palette.muted,
                position,
                palette.reset
            );
        }
    } else {
        let _ = writeln!(
            out,
            "Indexed {} of {} fetched",
            plural(output.report.indexed, "event", "events"),
            output.report.fetched
        );
    }
    out
}
