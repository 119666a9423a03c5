mod common;

use common::FixtureDirections;
use eventfinder_lib::config::DEFAULT_ORIGIN;
use eventfinder_lib::selection::DetachedOverlay;
use eventfinder_lib::{
    cluster_events, is_uk_event, mappable_events, Event, MapSession, SearchResults,
    SelectionState,
};

const MIXED_PAGE: &str = r#"{
    "hits": [
        {"objectID": "leeds", "title": "Smeaton lecture", "_geoloc": {"lat": 53.8008, "lng": -1.5491}},
        {"objectID": "half", "title": "Latitude only", "_geoloc": {"lat": 53.8}},
        {"objectID": "garbled", "title": "Typo in the CMS", "_geoloc": {"lat": "abc", "lng": -1.5}},
        {"objectID": "online", "title": "Webinar"}
    ],
    "nbHits": 4,
    "page": 0,
    "nbPages": 1,
    "hitsPerPage": 12
}"#;

fn page() -> SearchResults {
    serde_json::from_str(MIXED_PAGE).expect("page decodes")
}

fn hit<'a>(results: &'a SearchResults, id: &str) -> &'a Event {
    results
        .hits
        .iter()
        .find(|event| event.object_id == id)
        .expect("hit present")
}

#[test]
fn half_coordinate_keeps_the_rest_of_the_page() {
    let results = page();
    assert_eq!(results.hits.len(), 4);
    assert_eq!(results.nb_hits, 4);

    let half = hit(&results, "half").geoloc.expect("partial pair kept");
    assert_eq!(half.lat, 53.8);
    assert!(half.lng.is_nan());
}

#[test]
fn only_numeric_pairs_are_uk_events() {
    let results = page();
    assert!(is_uk_event(hit(&results, "leeds")));
    assert!(!is_uk_event(hit(&results, "half")));
    assert!(!is_uk_event(hit(&results, "garbled")));
    assert!(!is_uk_event(hit(&results, "online")));
}

#[test]
fn map_skips_events_without_a_numeric_pair() {
    let results = page();
    let ids: Vec<&str> = mappable_events(&results.hits)
        .into_iter()
        .map(|event| event.object_id.as_str())
        .collect();
    assert_eq!(ids, vec!["leeds"]);

    let clusters = cluster_events(mappable_events(&results.hits), 8, 80.0);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].members, vec!["leeds"]);
}

#[test]
fn garbled_coordinate_is_never_routed() {
    let results = page();
    let mut map = MapSession::new(FixtureDirections::default(), DetachedOverlay, DEFAULT_ORIGIN);

    let state = map.click_and_route(hit(&results, "garbled"));
    assert_eq!(
        state,
        &SelectionState::CardOnly {
            event_id: "garbled".to_string()
        }
    );
    assert_eq!(map.provider().calls.get(), 0);
}
