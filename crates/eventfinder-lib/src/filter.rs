//! Transient filter state shared between the search coordinators.
//!
//! The state is owned by a [`FilterContext`] which is cloned into every
//! coordinator that needs to read or update it, instead of living in an
//! ambient global.

use std::cell::RefCell;
use std::rc::Rc;

use serde::Serialize;

use crate::date_filter::DateRange;
use crate::geo::Coordinates;

/// Everything the user has narrowed the search by.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct FilterState {
    pub keyword: String,
    pub location: String,
    pub coordinates: Option<Coordinates>,
    pub date_range: Option<DateRange>,
    pub event_types: Vec<String>,
}

/// Partial update merged into [`FilterState`]; `None` fields are left alone.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterUpdate {
    pub keyword: Option<String>,
    pub location: Option<String>,
    pub coordinates: Option<Option<Coordinates>>,
    pub date_range: Option<Option<DateRange>>,
    pub event_types: Option<Vec<String>>,
}

impl FilterUpdate {
    pub fn keyword(value: impl Into<String>) -> Self {
        Self {
            keyword: Some(value.into()),
            ..Self::default()
        }
    }

    pub fn location(label: impl Into<String>, coordinates: Option<Coordinates>) -> Self {
        Self {
            location: Some(label.into()),
            coordinates: Some(coordinates),
            ..Self::default()
        }
    }

    pub fn coordinates(coordinates: Option<Coordinates>) -> Self {
        Self {
            coordinates: Some(coordinates),
            ..Self::default()
        }
    }

    pub fn date_range(range: Option<DateRange>) -> Self {
        Self {
            date_range: Some(range),
            ..Self::default()
        }
    }

    pub fn event_types(types: Vec<String>) -> Self {
        Self {
            event_types: Some(types),
            ..Self::default()
        }
    }
}

/// Shared read/update capability over one [`FilterState`].
///
/// Cloning yields another handle onto the same state. Everything runs on a
/// single thread, so the handle is not `Send`.
#[derive(Debug, Clone, Default)]
pub struct FilterContext {
    state: Rc<RefCell<FilterState>>,
}

impl FilterContext {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_state(state: FilterState) -> Self {
        Self {
            state: Rc::new(RefCell::new(state)),
        }
    }

    /// Copy of the current state.
    pub fn snapshot(&self) -> FilterState {
        self.state.borrow().clone()
    }

    /// Merge a partial update into the shared state.
    pub fn update(&self, update: FilterUpdate) {
        let mut state = self.state.borrow_mut();
        if let Some(keyword) = update.keyword {
            state.keyword = keyword;
        }
        if let Some(location) = update.location {
            state.location = location;
        }
        if let Some(coordinates) = update.coordinates {
            state.coordinates = coordinates;
        }
        if let Some(range) = update.date_range {
            state.date_range = range;
        }
        if let Some(types) = update.event_types {
            state.event_types = types;
        }
    }

    pub fn reset(&self) {
        *self.state.borrow_mut() = FilterState::default();
    }
}

/// Join filter predicates with `AND`.
///
/// Blank parts are skipped and parts containing a top-level `OR` are
/// parenthesised so precedence survives the join.
pub fn combine_filters<'a, I>(parts: I) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    let parts: Vec<String> = parts
        .into_iter()
        .flatten()
        .map(str::trim)
        .filter(|part| !part.is_empty())
        .map(|part| {
            if part.contains(" OR ") && !(part.starts_with('(') && part.ends_with(')')) {
                format!("({part})")
            } else {
                part.to_string()
            }
        })
        .collect();

    if parts.is_empty() {
        None
    } else {
        Some(parts.join(" AND "))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clones_share_state() {
        let ctx = FilterContext::new();
        let other = ctx.clone();
        other.update(FilterUpdate::keyword("rocket"));
        assert_eq!(ctx.snapshot().keyword, "rocket");
    }

    #[test]
    fn partial_update_leaves_other_fields() {
        let ctx = FilterContext::new();
        ctx.update(FilterUpdate::location(
            "Leeds, England",
            Some(Coordinates::new(53.8, -1.55)),
        ));
        ctx.update(FilterUpdate::event_types(vec!["Lecture".to_string()]));

        let state = ctx.snapshot();
        assert_eq!(state.location, "Leeds, England");
        assert!(state.coordinates.is_some());
        assert_eq!(state.event_types, vec!["Lecture".to_string()]);

        ctx.update(FilterUpdate::coordinates(None));
        assert_eq!(ctx.snapshot().coordinates, None);
        assert_eq!(ctx.snapshot().location, "Leeds, England");
    }

    #[test]
    fn combine_skips_blank_and_wraps_or_groups() {
        assert_eq!(combine_filters([None, Some("  ")]), None);
        assert_eq!(
            combine_filters([Some("a >= 1 AND a < 2"), None]).as_deref(),
            Some("a >= 1 AND a < 2")
        );
        assert_eq!(
            combine_filters([
                Some("startTimestamp >= 1 AND startTimestamp < 2"),
                Some(r#"eventType:"A" OR eventType:"B""#),
            ])
            .as_deref(),
            Some(r#"startTimestamp >= 1 AND startTimestamp < 2 AND (eventType:"A" OR eventType:"B")"#)
        );
    }
}
