//! Integration tests for commands that must not reach the network: missing
//! configuration, destinations outside the routing area, and inputs that are
//! answered locally.

use assert_cmd::Command;
use predicates::prelude::*;

const SERVICE_VARS: &[&str] = &[
    "PUBLIC_ALGOLIA_APP_ID",
    "PUBLIC_ALGOLIA_SEARCH_KEY",
    "PUBLIC_ALGOLIA_INDEX_NAME",
    "PUBLIC_ALGOLIA_HITS_PER_PAGE",
    "ALGOLIA_ADMIN_KEY",
    "ALGOLIA_INDEX_NAME",
    "PUBLIC_MAPBOX_API_KEY",
    "PUBLIC_STORYBLOK_TOKEN",
    "EVENTFINDER_ORIGIN",
];

fn eventfinder() -> Command {
    let mut cmd = Command::cargo_bin("eventfinder").expect("binary exists");
    cmd.env("NO_COLOR", "1");
    for var in SERVICE_VARS {
        cmd.env_remove(var);
    }
    cmd
}

#[test]
fn search_without_credentials_names_the_variable() {
    eventfinder()
        .args(["search", "rocket"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PUBLIC_ALGOLIA_APP_ID"));
}

#[test]
fn blank_credentials_count_as_missing() {
    eventfinder()
        .env("PUBLIC_ALGOLIA_APP_ID", "APP")
        .env("PUBLIC_ALGOLIA_SEARCH_KEY", "   ")
        .env("PUBLIC_ALGOLIA_INDEX_NAME", "events")
        .args(["search"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PUBLIC_ALGOLIA_SEARCH_KEY"));
}

#[test]
fn index_without_cms_token_fails() {
    eventfinder()
        .args(["index", "--dry-run"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PUBLIC_STORYBLOK_TOKEN"));
}

#[test]
fn route_in_uk_needs_maps_token() {
    eventfinder()
        .args(["route", "--to", "53.8008,-1.5491"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("PUBLIC_MAPBOX_API_KEY"));
}

#[test]
fn route_to_paris_prints_notice_without_request() {
    eventfinder()
        .env("PUBLIC_MAPBOX_API_KEY", "dummy-token")
        .args(["route", "--to", "48.8566,2.3522"])
        .assert()
        .success()
        .stdout(predicate::str::contains(
            "Directions are only available for events in the United Kingdom",
        ));
}

#[test]
fn route_outside_area_as_json() {
    let output = eventfinder()
        .args(["--format", "json", "route", "--to", "40.7128,-74.0060"])
        .output()
        .expect("run route");
    assert!(output.status.success());
    let value: serde_json::Value = serde_json::from_slice(&output.stdout).expect("json output");
    assert_eq!(value["outcome"], "outside_area");
    assert_eq!(value["destination"]["lat"], 40.7128);
}

#[test]
fn invalid_coordinates_are_rejected() {
    eventfinder()
        .args(["route", "--to", "95,10"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("invalid coordinates"));
}

#[test]
fn bad_origin_setting_fails() {
    eventfinder()
        .env("EVENTFINDER_ORIGIN", "somewhere")
        .args(["route", "--to", "48.8566,2.3522"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("EVENTFINDER_ORIGIN"));
}

#[test]
fn locate_without_position_reports_unsupported() {
    eventfinder()
        .args(["locate"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Geolocation not supported."));
}

#[test]
fn blank_keyword_suggests_trending() {
    eventfinder()
        .args(["suggest", "keywords", ""])
        .assert()
        .success()
        .stdout(predicate::str::contains("smeaton lecture"))
        .stdout(predicate::str::contains("ravensthorpe station"));
}

#[test]
fn unknown_date_preset_is_rejected() {
    eventfinder()
        .args(["search", "--date", "yesterday"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("unknown date preset"));
}
