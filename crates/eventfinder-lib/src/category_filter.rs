//! Category (event type) refinement.

use crate::filter::{FilterContext, FilterUpdate};

/// Attribute holding the category tag in the index.
pub const EVENT_TYPE_ATTRIBUTE: &str = "eventType";

/// Categories offered by the filter panel.
pub const EVENT_TYPES: &[&str] = &["Conference", "Lecture", "Networking", "Social", "Webinar"];

/// Formats offered by the filter panel.
pub const EVENT_FORMATS: &[&str] = &["In-person", "Online", "Hybrid"];

/// Multi-select category filter mirrored into the shared [`FilterContext`].
#[derive(Debug, Clone)]
pub struct EventTypeFilter {
    filters: FilterContext,
    selected: Vec<String>,
}

impl EventTypeFilter {
    /// Start from whatever the shared state already holds.
    pub fn new(filters: FilterContext) -> Self {
        let selected = filters.snapshot().event_types;
        Self { filters, selected }
    }

    pub fn selected(&self) -> &[String] {
        &self.selected
    }

    pub fn is_selected(&self, event_type: &str) -> bool {
        self.selected.iter().any(|t| t == event_type)
    }

    /// Add the type if absent, otherwise remove it.
    pub fn toggle(&mut self, event_type: &str) {
        if self.is_selected(event_type) {
            self.selected.retain(|t| t != event_type);
        } else {
            self.selected.push(event_type.to_string());
        }
        self.filters
            .update(FilterUpdate::event_types(self.selected.clone()));
    }

    pub fn clear(&mut self) {
        self.selected.clear();
        self.filters.update(FilterUpdate::event_types(Vec::new()));
    }

    /// `eventType:"A" OR eventType:"B"`, or `None` when nothing is selected.
    pub fn query(&self) -> Option<String> {
        event_type_query(&self.selected)
    }
}

/// Disjunction over the given category tags.
pub fn event_type_query<S: AsRef<str>>(types: &[S]) -> Option<String> {
    if types.is_empty() {
        return None;
    }
    Some(
        types
            .iter()
            .map(|t| format!("{EVENT_TYPE_ATTRIBUTE}:\"{}\"", t.as_ref().replace('"', "\\\"")))
            .collect::<Vec<_>>()
            .join(" OR "),
    )
}
