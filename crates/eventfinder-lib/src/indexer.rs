//! CMS to search index pipeline.

use serde::Serialize;
use tracing::{debug, info};

use crate::dates::parse_event_datetime;
use crate::error::Result;
use crate::event::{Event, EventImage};
use crate::geo::Coordinates;
use crate::storyblok::{EventSource, StoryblokEvent};

/// Write side of the search index.
pub trait IndexWriter {
    /// Upsert records keyed by `objectID`. Returns the ids written.
    fn save_objects(&self, records: &[Event]) -> Result<Vec<String>>;
}

/// Outcome of one indexing run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct IndexReport {
    pub fetched: usize,
    pub indexed: usize,
}

fn parse_coordinate(raw: Option<&str>) -> Option<f64> {
    raw.map(str::trim)
        .filter(|value| !value.is_empty())
        .and_then(|value| value.parse::<f64>().ok())
}

/// Flatten one CMS entry into an index record.
pub fn to_index_record(event: StoryblokEvent) -> Event {
    let geoloc = match (
        parse_coordinate(event.latitude.as_deref()),
        parse_coordinate(event.longitude.as_deref()),
    ) {
        (Some(lat), Some(lng)) => Some(Coordinates::new(lat, lng)),
        _ => None,
    };
    let image = event.image.unwrap_or_default();
    let start_timestamp = parse_event_datetime(&event.start_date).map(|t| t.timestamp_millis());
    let end_timestamp = parse_event_datetime(&event.end_date).map(|t| t.timestamp_millis());

    if start_timestamp.is_none() && !event.start_date.is_empty() {
        debug!(uid = %event.uid, start = %event.start_date, "unparseable start date");
    }

    Event {
        object_id: event.uid,
        title: event.title,
        image: Some(EventImage {
            url: image.filename.unwrap_or_default(),
            alt: image.alt.unwrap_or_default(),
        }),
        summary: event.summary,
        location: event.location,
        geoloc,
        event_format: event.event_format,
        event_type: event.event_type,
        start_date: event.start_date,
        start_timestamp,
        end_date: event.end_date,
        end_timestamp,
        slug: event.slug,
        price: Some(event.price.unwrap_or(0.0)),
    }
}

/// Fetch, transform and (unless `dry_run`) upsert every published event.
pub fn run_indexing<S, W>(
    source: &S,
    writer: &W,
    dry_run: bool,
) -> Result<(IndexReport, Vec<Event>)>
where
    S: EventSource + ?Sized,
    W: IndexWriter + ?Sized,
{
    let records: Vec<Event> = source
        .fetch_events()?
        .into_iter()
        .map(to_index_record)
        .collect();
    let fetched = records.len();

    let indexed = if dry_run {
        info!(records = fetched, "dry run; index left untouched");
        0
    } else {
        let ids = writer.save_objects(&records)?;
        info!(records = ids.len(), "indexed events");
        ids.len()
    };

    Ok((IndexReport { fetched, indexed }, records))
}
