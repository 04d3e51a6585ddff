// File: crates/chart-optimize/tests/range.rs
// Purpose: Preset resolution, custom range clamping and forecast timeline selection.

use chart_optimize::{
    resolve_custom, resolve_range, resolve_range_at, timeline_for_forecast, Granularity, RangeError, TimeRange,
};
use chrono::{Duration, TimeZone, Utc};

#[test]
fn presets_resolve_deterministically() {
    let one_month = resolve_range("1M").expect("1M");
    assert_eq!((one_month.granularity, one_month.days), (Granularity::Day, 30));
    let five_years = resolve_range("5Y").expect("5Y");
    assert_eq!((five_years.granularity, five_years.days), (Granularity::Month, 1825));
}

#[test]
fn preset_table_matches_granularity_plateaus() {
    let expected = [
        ("1W", 7, Granularity::Hour),
        ("2W", 14, Granularity::Day),
        ("1M", 30, Granularity::Day),
        ("2M", 60, Granularity::Week),
        ("3M", 90, Granularity::Week),
        ("6M", 180, Granularity::Week),
        ("1Y", 365, Granularity::Week),
        ("5Y", 1825, Granularity::Month),
    ];
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
    for (key, days, granularity) in expected {
        let d = resolve_range_at(key, now).expect(key);
        assert_eq!(d.days, days, "{key}");
        assert_eq!(d.granularity, granularity, "{key}");
        assert_eq!(d.end_date, now);
        assert_eq!(d.end_date - d.start_date, Duration::days(days));
    }
}

#[test]
fn keys_are_case_insensitive_and_unknown_keys_error() {
    assert_eq!("1y".parse::<TimeRange>().ok(), Some(TimeRange::Year1));
    assert!(matches!(resolve_range("10Y"), Err(RangeError::UnknownPreset(k)) if k == "10Y"));
}

#[test]
fn custom_ranges_round_up_to_whole_days() {
    let start = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    let d = resolve_custom(start, start + Duration::hours(36));
    assert_eq!(d.days, 2);
    assert_eq!(d.granularity, Granularity::Hour);
    assert_eq!(d.key, "custom");

    for (days, granularity) in [(7, Granularity::Hour), (30, Granularity::Day), (90, Granularity::Week), (365, Granularity::Week), (366, Granularity::Month)] {
        assert_eq!(resolve_custom(start, start + Duration::days(days)).granularity, granularity, "{days}");
    }
}

#[test]
fn reversed_custom_range_is_clamped_to_one_day() {
    let start = Utc.with_ymd_and_hms(2024, 3, 10, 0, 0, 0).unwrap();
    let d = resolve_custom(start, start - Duration::days(5));
    assert_eq!(d.days, 1);
    assert_eq!(d.start_date, start);
    assert_eq!(d.end_date, start + Duration::days(1));
    assert_eq!(d.granularity, Granularity::Hour);
}

#[test]
fn forecast_horizon_picks_smallest_covering_preset() {
    assert_eq!(timeline_for_forecast(45), TimeRange::Month2);
    assert_eq!(timeline_for_forecast(7), TimeRange::Week1);
    assert_eq!(timeline_for_forecast(0), TimeRange::Week1);
    assert_eq!(timeline_for_forecast(366), TimeRange::Year5);
    assert_eq!(timeline_for_forecast(5000), TimeRange::Year5);
}

#[test]
fn descriptor_serializes_with_wire_names() {
    let now = Utc.with_ymd_and_hms(2024, 6, 1, 0, 0, 0).unwrap();
    let d = resolve_range_at("2W", now).expect("2W");
    let json = serde_json::to_value(&d).expect("serialize");
    assert_eq!(json["key"], "2W");
    assert_eq!(json["granularity"], "day");
    assert_eq!(json["days"], 14);
    assert!(json.get("startDate").is_some());
}
