#![allow(dead_code)]

use std::cell::{Cell, RefCell};
use std::fs;
use std::path::PathBuf;

use eventfinder_lib::directions::parse_directions;
use eventfinder_lib::{
    Coordinates, Event, Geocoder, LocationSuggestion, Result, RouteData, RouteProvider,
    SearchBackend, SearchParams, SearchResults,
};

pub fn fixtures_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../docs/fixtures")
}

pub fn fixture(name: &str) -> String {
    fs::read_to_string(fixtures_dir().join(name)).expect("fixture readable")
}

pub fn event(id: &str, lat: f64, lng: f64) -> Event {
    Event {
        object_id: id.to_string(),
        title: format!("Event {id}"),
        geoloc: Some(Coordinates::new(lat, lng)),
        ..Event::default()
    }
}

/// Serves the Manchester to Leeds fixture and counts requests.
#[derive(Default)]
pub struct FixtureDirections {
    pub calls: Cell<usize>,
}

impl RouteProvider for FixtureDirections {
    fn route(&self, _origin: Coordinates, _destination: Coordinates) -> Result<RouteData> {
        self.calls.set(self.calls.get() + 1);
        parse_directions(&fixture("directions_manchester_leeds.json"))
    }
}

/// Index stand-in holding `total` generic hits and recording every query.
pub struct PagedBackend {
    pub total: usize,
    pub seen: RefCell<Vec<SearchParams>>,
}

impl PagedBackend {
    pub fn new(total: usize) -> Self {
        Self {
            total,
            seen: RefCell::new(Vec::new()),
        }
    }
}

impl SearchBackend for PagedBackend {
    fn search(&self, params: &SearchParams) -> Result<SearchResults> {
        self.seen.borrow_mut().push(params.clone());
        let per_page = params.hits_per_page.max(1);
        let start = params.page * per_page;
        let end = (start + per_page).min(self.total);
        let hits = (start..end)
            .map(|i| event(&format!("evt-{i}"), 53.0 + i as f64 * 0.01, -2.0))
            .collect();
        Ok(SearchResults {
            hits,
            nb_hits: self.total,
            page: params.page,
            nb_pages: self.total.div_ceil(per_page),
            hits_per_page: per_page,
        })
    }
}

/// Geocoder with canned answers.
#[derive(Default)]
pub struct CannedGeocoder {
    pub forward: Option<Coordinates>,
    pub label: Option<String>,
    pub forward_calls: Cell<usize>,
}

impl Geocoder for CannedGeocoder {
    fn forward(&self, _name: &str) -> Result<Option<Coordinates>> {
        self.forward_calls.set(self.forward_calls.get() + 1);
        Ok(self.forward)
    }

    fn suggest(&self, partial: &str) -> Result<Vec<LocationSuggestion>> {
        Ok(vec![LocationSuggestion {
            name: partial.to_string(),
            context: "England".to_string(),
            place_name: format!("{partial}, England"),
            lat: 53.8,
            lng: -1.55,
        }])
    }

    fn reverse(&self, _coordinates: Coordinates) -> Result<Option<String>> {
        Ok(self.label.clone())
    }
}
