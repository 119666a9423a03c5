mod common;

use common::{event, FixtureDirections};
use eventfinder_lib::config::DEFAULT_ORIGIN;
use eventfinder_lib::selection::DetachedOverlay;
use eventfinder_lib::{cluster_events, mappable_events, ManeuverKind, MapSession, SelectionState};

#[test]
fn selecting_the_same_routed_marker_twice_issues_no_extra_requests() {
    let mut map = MapSession::new(FixtureDirections::default(), DetachedOverlay, DEFAULT_ORIGIN);
    let leeds = event("leeds", 53.8008, -1.5491);

    map.click_and_route(&leeds);
    assert_eq!(map.provider().calls.get(), 1);

    map.click_and_route(&leeds);
    map.click_and_route(&leeds);
    assert_eq!(map.provider().calls.get(), 1);
    assert!(matches!(map.state(), SelectionState::Routed { .. }));
}

#[test]
fn routed_panel_shows_fixture_route() {
    let mut map = MapSession::new(FixtureDirections::default(), DetachedOverlay, DEFAULT_ORIGIN);
    let state = map.click_and_route(&event("leeds", 53.8008, -1.5491));
    let route = state.route().expect("route present");

    assert_eq!(route.distance_label(), "44.80 mi");
    assert_eq!(route.duration_label(), "58 min");
    assert_eq!(route.steps.len(), 5);
    assert_eq!(route.steps[0].maneuver, ManeuverKind::Head);
    assert_eq!(route.steps[1].maneuver, ManeuverKind::Right);
    assert_eq!(route.steps[2].maneuver, ManeuverKind::Merge);
    assert_eq!(route.steps[4].maneuver, ManeuverKind::DestinationReached);
    assert_eq!(route.steps[4].distance_label(), "");

    let segment = route.segment(&route.steps[2]).expect("segment");
    assert_eq!(segment[0], route.geometry[2]);
    assert_eq!(segment[1], route.geometry[3]);
}

#[test]
fn international_events_only_show_the_card() {
    let mut map = MapSession::new(FixtureDirections::default(), DetachedOverlay, DEFAULT_ORIGIN);
    let paris = event("paris", 48.8566, 2.3522);
    let state = map.click_and_route(&paris);
    assert_eq!(
        state,
        &SelectionState::CardOnly {
            event_id: "paris".to_string()
        }
    );
    assert!(!state.is_loading());
    assert_eq!(map.provider().calls.get(), 0);
}

#[test]
fn mappable_events_feed_clusters() {
    let mut unmapped = event("nowhere", 0.0, 0.0);
    unmapped.geoloc = None;
    let events = vec![
        event("a", 53.48, -2.24),
        event("b", 53.49, -2.25),
        unmapped,
    ];
    let mappable = mappable_events(&events);
    assert_eq!(mappable.len(), 2);

    let clusters = cluster_events(mappable, 6, 80.0);
    assert_eq!(clusters.len(), 1);
    assert_eq!(clusters[0].len(), 2);
}
