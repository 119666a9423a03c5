use chrono::{Duration, FixedOffset, NaiveDate, TimeZone, Utc};

use eventfinder_lib::date_filter::local_midnight_millis;
use eventfinder_lib::{build_date_filter_query, DateFilter, DatePreset, DateRange, FilterContext};

const DAY_MS: i64 = 86_400_000;

fn day(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn interval(query: &str) -> (i64, i64) {
    let numbers: Vec<i64> = query
        .split_whitespace()
        .filter_map(|tok| tok.parse().ok())
        .collect();
    assert_eq!(numbers.len(), 2, "two bounds in {query}");
    (numbers[0], numbers[1])
}

fn query_for<Tz: TimeZone>(preset: DatePreset, tz: &Tz, today: NaiveDate) -> String {
    build_date_filter_query(Some(preset), None, tz, today).expect("preset yields a predicate")
}

#[test]
fn preset_lengths_are_one_one_and_seven_days() {
    let today = day(2025, 7, 18);
    for (preset, days) in [
        (DatePreset::Today, 1),
        (DatePreset::Tomorrow, 1),
        (DatePreset::Week, 7),
    ] {
        let (start, end) = interval(&query_for(preset, &Utc, today));
        assert_eq!(end - start, days * DAY_MS, "{preset}");
    }
}

#[test]
fn presets_anchor_at_local_midnight() {
    let tz = FixedOffset::east_opt(3600).unwrap();
    let today = day(2025, 7, 18);

    let (start, _) = interval(&query_for(DatePreset::Today, &tz, today));
    assert_eq!(Some(start), local_midnight_millis(&tz, today));

    let (start, _) = interval(&query_for(DatePreset::Tomorrow, &tz, today));
    assert_eq!(
        Some(start),
        local_midnight_millis(&tz, today + Duration::days(1))
    );
}

#[test]
fn custom_range_includes_the_whole_end_day() {
    let range = DateRange::new(day(2025, 7, 18), day(2025, 7, 20)).unwrap();
    let query =
        build_date_filter_query(Some(DatePreset::Custom), Some(&range), &Utc, day(2025, 7, 1))
            .unwrap();
    let (start, end) = interval(&query);
    assert_eq!(start, Utc.with_ymd_and_hms(2025, 7, 18, 0, 0, 0).unwrap().timestamp_millis());
    assert_eq!(end, Utc.with_ymd_and_hms(2025, 7, 21, 0, 0, 0).unwrap().timestamp_millis());
    assert_eq!(
        query,
        format!("startTimestamp >= {start} AND startTimestamp < {end}")
    );
}

#[test]
fn incomplete_custom_selection_keeps_last_predicate() {
    let mut filter = DateFilter::new(FilterContext::new(), Utc);
    let today = day(2025, 7, 18);

    filter.select_preset(DatePreset::Week);
    let week = filter.filter_query(today).unwrap();

    filter.select_preset(DatePreset::Custom);
    filter.set_custom_range(DateRange::single(day(2025, 8, 1)));
    assert_eq!(filter.filter_query(today), Some(week));

    filter.apply().unwrap();
    let (start, end) = interval(&filter.filter_query(today).unwrap());
    assert_eq!(end - start, DAY_MS);
}

#[test]
fn clearing_leaves_no_residual_predicate() {
    for preset in [DatePreset::Today, DatePreset::Tomorrow, DatePreset::Week] {
        let mut filter = DateFilter::new(FilterContext::new(), Utc);
        filter.select_preset(preset);
        assert!(filter.filter_query(day(2025, 7, 18)).is_some());
        filter.clear();
        assert_eq!(filter.filter_query(day(2025, 7, 18)), None);
    }

    let ctx = FilterContext::new();
    let mut filter = DateFilter::new(ctx.clone(), Utc);
    filter.select_preset(DatePreset::Custom);
    filter.set_custom_range(DateRange::new(day(2025, 7, 18), day(2025, 7, 20)).unwrap());
    filter.apply().unwrap();
    assert!(filter.filter_query(day(2025, 7, 18)).is_some());
    filter.clear();
    assert_eq!(filter.filter_query(day(2025, 7, 18)), None);
    assert_eq!(ctx.snapshot().date_range, None);
}
