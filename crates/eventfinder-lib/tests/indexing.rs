mod common;

use std::cell::RefCell;

use common::fixture;
use eventfinder_lib::storyblok::parse_event_story;
use eventfinder_lib::{
    is_uk_event, run_indexing, Coordinates, Event, EventSource, IndexWriter, Result,
    StoryblokEvent,
};

struct FixtureSource;

impl EventSource for FixtureSource {
    fn fetch_events(&self) -> Result<Vec<StoryblokEvent>> {
        parse_event_story(&fixture("events_story.json"))
    }
}

#[derive(Default)]
struct MemoryIndex {
    records: RefCell<Vec<Event>>,
}

impl IndexWriter for MemoryIndex {
    fn save_objects(&self, records: &[Event]) -> Result<Vec<String>> {
        let mut stored = self.records.borrow_mut();
        for record in records {
            stored.retain(|existing| existing.object_id != record.object_id);
            stored.push(record.clone());
        }
        Ok(records.iter().map(|r| r.object_id.clone()).collect())
    }
}

#[test]
fn fixture_story_is_indexed_by_uid() {
    let index = MemoryIndex::default();
    let (report, _) = run_indexing(&FixtureSource, &index, false).expect("indexing runs");
    assert_eq!(report.fetched, 3);
    assert_eq!(report.indexed, 3);

    let records = index.records.borrow();
    let ids: Vec<&str> = records.iter().map(|r| r.object_id.as_str()).collect();
    assert_eq!(
        ids,
        vec!["7d3f2a10-smeaton", "91ab44c2-webinar", "c5d0e1f3-paris"]
    );
}

#[test]
fn reindexing_upserts_without_duplicates() {
    let index = MemoryIndex::default();
    run_indexing(&FixtureSource, &index, false).unwrap();
    run_indexing(&FixtureSource, &index, false).unwrap();
    assert_eq!(index.records.borrow().len(), 3);
}

#[test]
fn records_are_flattened_for_search() {
    let (_, records) = run_indexing(&FixtureSource, &MemoryIndex::default(), true).unwrap();

    let lecture = &records[0];
    assert_eq!(lecture.geoloc, Some(Coordinates::new(53.8008, -1.5491)));
    assert!(is_uk_event(lecture));
    assert_eq!(lecture.price_label(), "From £25.00 (Excl. VAT)");
    assert_eq!(
        lecture.summary_text().as_deref(),
        Some("Annual lecture on civil engineering.")
    );
    assert!(lecture.start_timestamp.is_some());

    let webinar = &records[1];
    assert_eq!(webinar.geoloc, None);
    assert_eq!(webinar.price, Some(0.0));
    assert_eq!(webinar.image.as_ref().map(|i| i.url.as_str()), Some(""));
    assert_eq!(webinar.location_label().as_deref(), Some("Online"));

    let paris = &records[2];
    assert!(!is_uk_event(paris));
    assert_eq!(
        paris.start_timestamp,
        Some(1_757_487_600_000),
        "offset timestamps keep their zone"
    );

    let json = serde_json::to_value(lecture).unwrap();
    assert_eq!(json["objectID"], "7d3f2a10-smeaton");
    assert_eq!(json["_geoloc"]["lat"], 53.8008);
    assert_eq!(json["eventType"], "Lecture");
}
