//! Result cards, skeleton placeholders and the summary line.

use std::time::{Duration, Instant};

use serde::Serialize;

use crate::dates::EventDates;
use crate::event::Event;

/// Placeholders shown when there are no previous hits to size the grid by.
pub const DEFAULT_SKELETON_COUNT: usize = 3;

/// Message shown when the result set is empty.
pub const EMPTY_MESSAGE: &str = "No events found.";

/// Summary line shown while placeholders are up.
pub const LOADING_MESSAGE: &str = "Loading events...";

/// Display model of one result card.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EventCard {
    pub id: String,
    pub title: String,
    pub image_url: String,
    pub image_alt: String,
    pub event_type: Option<String>,
    pub dates: Option<EventDates>,
    pub location: Option<String>,
    pub summary: Option<String>,
    pub price: String,
    pub slug: String,
}

impl From<&Event> for EventCard {
    fn from(event: &Event) -> Self {
        Self {
            id: event.object_id.clone(),
            title: event.title.clone(),
            image_url: event.card_image_url(),
            image_alt: event
                .image
                .as_ref()
                .map(|image| image.alt.clone())
                .unwrap_or_default(),
            event_type: event.type_label(),
            dates: event.dates(),
            location: event.location_label(),
            summary: event.summary_text(),
            price: event.price_label(),
            slug: event.slug.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(tag = "view", rename_all = "snake_case")]
pub enum ResultsView {
    Skeleton { count: usize },
    Empty,
    Cards { cards: Vec<EventCard> },
}

/// `"Showing 12 of 15 events"`, `"Showing 1 event"`, `"Showing 0 events"`.
pub fn summary_text(shown: usize, total: usize, page_size: usize) -> String {
    if total > page_size {
        format!("Showing {shown} of {total} events")
    } else {
        let plural = if total == 1 { "" } else { "s" };
        format!("Showing {total} event{plural}")
    }
}

/// Tracks the current hits and a transient skeleton window after changes.
#[derive(Debug, Clone)]
pub struct ResultRenderer {
    skeleton_window: Duration,
    hits: Vec<Event>,
    skeleton_until: Option<Instant>,
}

impl Default for ResultRenderer {
    fn default() -> Self {
        Self::new(Duration::ZERO)
    }
}

impl ResultRenderer {
    pub fn new(skeleton_window: Duration) -> Self {
        Self {
            skeleton_window,
            hits: Vec::new(),
            skeleton_until: None,
        }
    }

    pub fn hits(&self) -> &[Event] {
        &self.hits
    }

    /// Take a new hit list. Returns whether it counts as changed: the count
    /// differs, or the first hit's id differs.
    pub fn observe(&mut self, hits: &[Event], now: Instant) -> bool {
        let changed = hits.len() != self.hits.len()
            || match (hits.first(), self.hits.first()) {
                (Some(new), Some(old)) => new.object_id != old.object_id,
                _ => false,
            };

        self.hits = hits.to_vec();
        if changed && !self.skeleton_window.is_zero() {
            self.skeleton_until = Some(now + self.skeleton_window);
        }
        changed
    }

    pub fn skeleton_visible(&self, now: Instant) -> bool {
        self.skeleton_until.is_some_and(|until| now < until)
    }

    pub fn view(&self, now: Instant) -> ResultsView {
        if self.skeleton_visible(now) {
            let count = if self.hits.is_empty() {
                DEFAULT_SKELETON_COUNT
            } else {
                self.hits.len()
            };
            return ResultsView::Skeleton { count };
        }
        if self.hits.is_empty() {
            return ResultsView::Empty;
        }
        ResultsView::Cards {
            cards: self.hits.iter().map(EventCard::from).collect(),
        }
    }

    /// Summary line, or the loading message during the skeleton window.
    pub fn summary(&self, total: usize, page_size: usize, now: Instant) -> String {
        if self.skeleton_visible(now) {
            LOADING_MESSAGE.to_string()
        } else {
            summary_text(self.hits.len(), total, page_size)
        }
    }
}
