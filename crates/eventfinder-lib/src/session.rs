//! Search session: keyword and location inputs turned into index queries.

use chrono::{Local, NaiveDate, TimeZone};
use tracing::{debug, error, info, warn};

use crate::category_filter::EventTypeFilter;
use crate::date_filter::DateFilter;
use crate::filter::{combine_filters, FilterContext, FilterUpdate};
use crate::geo::Coordinates;
use crate::geocode::{Geocoder, LocationSuggestion};
use crate::history::LocationHistory;
use crate::search::{SearchBackend, SearchParams, SearchResults, AROUND_RADIUS_METRES};

/// Suggestions offered while the keyword box is empty.
pub const TRENDING_KEYWORDS: &[&str] = &[
    "dissemination seminar",
    "smeaton lecture",
    "quarry tips",
    "ravensthorpe station",
    "rocket",
];

/// Filter that matches nothing; used when typed location text could not be
/// resolved to a position.
pub const INVALID_GEO_FILTER: &str = "__invalid_geo:true";

/// Page size of the map query, which wants every hit at once.
pub const MAP_HITS_PER_PAGE: usize = 1000;

/// Coordinates the inputs of one search page.
#[derive(Debug)]
pub struct SearchSession<Tz: TimeZone = Local> {
    filters: FilterContext,
    date_filter: DateFilter<Tz>,
    event_types: EventTypeFilter,
    hits_per_page: usize,
    page: usize,
    location_typing: bool,
}

impl SearchSession<Local> {
    pub fn new(filters: FilterContext, hits_per_page: usize) -> Self {
        Self::with_timezone(filters, hits_per_page, Local)
    }
}

impl<Tz: TimeZone> SearchSession<Tz> {
    pub fn with_timezone(filters: FilterContext, hits_per_page: usize, tz: Tz) -> Self {
        Self {
            date_filter: DateFilter::new(filters.clone(), tz),
            event_types: EventTypeFilter::new(filters.clone()),
            filters,
            hits_per_page,
            page: 0,
            location_typing: false,
        }
    }

    pub fn filters(&self) -> &FilterContext {
        &self.filters
    }

    pub fn date_filter_mut(&mut self) -> &mut DateFilter<Tz> {
        &mut self.date_filter
    }

    pub fn event_types_mut(&mut self) -> &mut EventTypeFilter {
        &mut self.event_types
    }

    pub fn page(&self) -> usize {
        self.page
    }

    pub fn set_page(&mut self, page: usize) {
        self.page = page;
    }

    pub fn hits_per_page(&self) -> usize {
        self.hits_per_page
    }

    pub fn is_location_typing(&self) -> bool {
        self.location_typing
    }

    /// Trending keywords while the keyword is blank, otherwise none.
    pub fn trending_keywords(&self) -> &'static [&'static str] {
        if self.filters.snapshot().keyword.trim().is_empty() {
            TRENDING_KEYWORDS
        } else {
            &[]
        }
    }

    pub fn set_keyword(&mut self, keyword: &str) {
        self.filters.update(FilterUpdate::keyword(keyword.trim()));
        self.page = 0;
    }

    /// Free typing in the location box; any resolved position is stale.
    pub fn edit_location(&mut self, text: &str) {
        self.filters.update(FilterUpdate::location(text, None));
        self.location_typing = true;
    }

    /// Pick a suggestion or history entry.
    pub fn select_location(&mut self, place: &LocationSuggestion, history: &mut LocationHistory) {
        self.filters.update(FilterUpdate::location(
            place.place_name.clone(),
            Some(place.coordinates()),
        ));
        history.add(place.clone());
        self.location_typing = false;
        self.page = 0;
        debug!(place = %place.place_name, "location selected");
    }

    /// Apply a position from the geolocation resolver.
    pub fn use_current_location(&mut self, label: &str, coordinates: Coordinates) {
        self.filters
            .update(FilterUpdate::location(label, Some(coordinates)));
        self.location_typing = false;
        self.page = 0;
    }

    pub fn clear_location(&mut self) {
        self.filters.update(FilterUpdate::location("", None));
        self.location_typing = false;
        self.page = 0;
    }

    /// Resolve typed location text (only when no position is set yet).
    pub fn submit<G: Geocoder + ?Sized>(&mut self, geocoder: &G) {
        let state = self.filters.snapshot();
        let location = state.location.trim();

        if location.is_empty() {
            self.filters.update(FilterUpdate::coordinates(None));
        } else if state.coordinates.is_none() {
            let resolved = match geocoder.forward(location) {
                Ok(found) => found,
                Err(err) => {
                    warn!(location, error = %err, "forward geocode failed");
                    None
                }
            };
            if resolved.is_none() {
                info!(location, "location not found; search will return no events");
            }
            self.filters.update(FilterUpdate::coordinates(resolved));
        }

        self.location_typing = false;
        self.page = 0;
    }

    /// Query for the current inputs, with date predicates anchored at `today`.
    pub fn search_params(&mut self, today: NaiveDate) -> SearchParams {
        let state = self.filters.snapshot();

        let mut params = SearchParams {
            query: state.keyword.clone(),
            hits_per_page: self.hits_per_page,
            page: self.page,
            ..SearchParams::default()
        };

        let mut geo_filter = None;
        if !self.location_typing {
            match state.coordinates {
                Some(coordinates) => {
                    params.around_lat_lng = Some(coordinates.to_search_origin());
                    params.around_radius = Some(AROUND_RADIUS_METRES);
                }
                None if !state.location.trim().is_empty() => geo_filter = Some(INVALID_GEO_FILTER),
                None => {}
            }
        }

        let date_query = self.date_filter.filter_query(today);
        let type_query = self.event_types.query();
        params.filters = combine_filters([
            geo_filter,
            date_query.as_deref(),
            type_query.as_deref(),
        ]);
        params
    }

    /// Same filters, first page, sized for the map.
    pub fn map_params(&mut self, today: NaiveDate) -> SearchParams {
        SearchParams {
            hits_per_page: MAP_HITS_PER_PAGE,
            page: 0,
            ..self.search_params(today)
        }
    }

    /// Run the current query; failures degrade to an empty page.
    pub fn run<B: SearchBackend + ?Sized>(
        &mut self,
        backend: &B,
        today: NaiveDate,
    ) -> SearchResults {
        let params = self.search_params(today);
        run_query(backend, &params)
    }
}

/// Execute `params`, logging and swallowing remote failures.
pub fn run_query<B: SearchBackend + ?Sized>(backend: &B, params: &SearchParams) -> SearchResults {
    match backend.search(params) {
        Ok(results) => {
            debug!(hits = results.nb_hits, page = results.page, "search completed");
            results
        }
        Err(err) => {
            if err.is_remote() {
                warn!(error = %err, "search service unavailable; showing no results");
            } else {
                error!(error = %err, "search failed; showing no results");
            }
            SearchResults {
                hits_per_page: params.hits_per_page,
                ..SearchResults::default()
            }
        }
    }
}
