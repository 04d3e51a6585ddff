// File: crates/chart-optimize/src/temporal.rs
// Summary: Timestamp parsing and time-field detection for the optimizer's path selection.

use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};

use crate::record::{Record, Schema, TemporalHint, Value};

/// Field names recognized as time axes when no explicit hint is given.
pub const TEMPORAL_FIELDS: [&str; 6] = ["date", "time", "timestamp", "created_at", "updated_at", "ds"];

const NAIVE_FORMATS: [&str; 3] = ["%Y-%m-%d %H:%M:%S", "%Y-%m-%dT%H:%M:%S", "%Y-%m-%d %H:%M"];

/// Parse a cell into a UTC timestamp.
/// Text accepts RFC 3339, a few naive date-time layouts and bare dates;
/// numbers are epoch milliseconds.
pub fn parse_timestamp(value: &Value) -> Option<DateTime<Utc>> {
    match value {
        Value::Number(ms) if ms.is_finite() => Utc.timestamp_millis_opt(*ms as i64).single(),
        Value::Text(s) => parse_text(s.trim()),
        _ => None,
    }
}

fn parse_text(s: &str) -> Option<DateTime<Utc>> {
    if s.is_empty() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in NAIVE_FORMATS {
        if let Ok(naive) = NaiveDateTime::parse_from_str(s, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Scan the first record for a recognized time field whose value parses.
pub fn detect_time_field(first: &Record) -> Option<&'static str> {
    TEMPORAL_FIELDS
        .iter()
        .copied()
        .find(|name| first.get(name).and_then(parse_timestamp).is_some())
}

/// Resolve the time field for a dataset under an optional schema.
///
/// `Temporal` trusts the declared x-field but still requires the first
/// record's value to parse; otherwise the caller falls back to the
/// statistical path.
pub fn resolve_time_field(dataset: &[Record], schema: Option<&Schema>) -> Option<String> {
    let first = dataset.first()?;
    match schema.map(|s| (s.temporal, s.x_field.as_str())) {
        Some((TemporalHint::Categorical, _)) => None,
        Some((TemporalHint::Temporal, x)) => first
            .get(x)
            .and_then(parse_timestamp)
            .map(|_| x.to_string()),
        Some((TemporalHint::Auto, _)) | None => detect_time_field(first).map(str::to_string),
    }
}

/// Sort key: parseable timestamps first (ascending), unparseable after.
pub(crate) fn sort_key(record: &Record, field: &str) -> (bool, i64) {
    match record.get(field).and_then(parse_timestamp) {
        Some(ts) => (false, ts.timestamp_millis()),
        None => (true, 0),
    }
}
