//! Eventfinder library entry points.
//!
//! This crate holds the search, filter, geocoding and routing coordination
//! behind the event finder, plus the CMS to search index pipeline. Hosted
//! services sit behind small traits ([`SearchBackend`], [`Geocoder`],
//! [`RouteProvider`], [`EventSource`], [`IndexWriter`]) so the coordinators can
//! be driven without the network. Higher-level consumers (the CLI) should only
//! depend on the items exported here instead of reimplementing behavior.
//!

pub mod autocomplete;
pub mod category_filter;
pub mod cluster;
pub mod config;
pub mod date_filter;
pub mod dates;
pub mod directions;
pub mod error;
pub mod event;
pub mod filter;
pub mod geo;
pub mod geocode;
pub mod geolocation;
pub mod history;
mod http;
pub mod indexer;
pub mod keyboard;
pub mod results;
pub mod search;
pub mod selection;
pub mod session;
pub mod storyblok;

pub use autocomplete::{
    Autocomplete, Debouncer, KeywordSuggestions, LocationSuggestions, StaleResponsePolicy,
    SuggestionSource,
};
pub use category_filter::EventTypeFilter;
pub use cluster::{cluster_events, Cluster};
pub use config::{AlgoliaConfig, AppConfig, MapboxConfig, StoryblokConfig};
pub use date_filter::{build_date_filter_query, DateFilter, DatePreset, DateRange};
pub use directions::{MapboxDirections, ManeuverKind, RouteData, RouteProvider, RouteStep};
pub use error::{Error, Result};
pub use event::{mappable_events, Event, EventFormat};
pub use filter::{FilterContext, FilterState, FilterUpdate};
pub use geo::{is_uk_event, Coordinates};
pub use geocode::{Geocoder, LocationSuggestion, MapboxGeocoder};
pub use geolocation::{FixedPosition, GeolocationResolver, GeolocationState, PositionSource};
pub use history::{HistoryStore, LocationHistory};
pub use indexer::{run_indexing, to_index_record, IndexReport, IndexWriter};
pub use keyboard::HighlightCursor;
pub use results::{summary_text, EventCard, ResultRenderer, ResultsView};
pub use search::{AlgoliaClient, Pagination, SearchBackend, SearchParams, SearchResults};
pub use selection::{MapSession, RouteOverlay, SelectionState};
pub use session::SearchSession;
pub use storyblok::{EventSource, StoryblokClient, StoryblokEvent};
