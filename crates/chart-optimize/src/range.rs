// File: crates/chart-optimize/src/range.rs
// Summary: Time range presets and their mapping to aggregation granularity.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, TimeZone, Timelike, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::RangeError;

const DAY_MS: i64 = 86_400_000;

/// Time-bucket size used to pre-aggregate a series.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Granularity {
    Hour,
    Day,
    Week,
    Month,
}

impl Granularity {
    pub fn as_str(&self) -> &'static str {
        match self {
            Granularity::Hour => "hour",
            Granularity::Day => "day",
            Granularity::Week => "week",
            Granularity::Month => "month",
        }
    }

    /// Nominal bucket width. Months are counted as 30 days.
    pub fn duration(&self) -> Duration {
        match self {
            Granularity::Hour => Duration::hours(1),
            Granularity::Day => Duration::days(1),
            Granularity::Week => Duration::weeks(1),
            Granularity::Month => Duration::days(30),
        }
    }

    /// Granularity for an arbitrary span in days.
    pub fn for_days(days: i64) -> Self {
        match days {
            d if d <= 7 => Granularity::Hour,
            d if d <= 30 => Granularity::Day,
            d if d <= 90 => Granularity::Week,
            d if d <= 365 => Granularity::Week,
            _ => Granularity::Month,
        }
    }

    /// Start of the calendar bucket containing `ts` (weeks start on Monday).
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        let date = ts.date_naive();
        let start = match self {
            Granularity::Hour => return truncate_hour(ts),
            Granularity::Day => date,
            Granularity::Week => date - Duration::days(date.weekday().num_days_from_monday() as i64),
            Granularity::Month => date.with_day(1).unwrap_or(date),
        };
        start.and_hms_opt(0, 0, 0).map(|n| n.and_utc()).unwrap_or(ts)
    }
}

fn truncate_hour(ts: DateTime<Utc>) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(ts.year(), ts.month(), ts.day(), ts.hour(), 0, 0)
        .single()
        .unwrap_or(ts)
}

impl fmt::Display for Granularity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Preset time windows, ordered by length ascending.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Default)]
pub enum TimeRange {
    Week1,
    Week2,
    #[default]
    Month1,
    Month2,
    Month3,
    Month6,
    Year1,
    Year5,
}

impl TimeRange {
    pub const ALL: [TimeRange; 8] = [
        TimeRange::Week1,
        TimeRange::Week2,
        TimeRange::Month1,
        TimeRange::Month2,
        TimeRange::Month3,
        TimeRange::Month6,
        TimeRange::Year1,
        TimeRange::Year5,
    ];

    /// Short key used by the API and UI.
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::Week1 => "1W",
            TimeRange::Week2 => "2W",
            TimeRange::Month1 => "1M",
            TimeRange::Month2 => "2M",
            TimeRange::Month3 => "3M",
            TimeRange::Month6 => "6M",
            TimeRange::Year1 => "1Y",
            TimeRange::Year5 => "5Y",
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            TimeRange::Week1 => "1 Week",
            TimeRange::Week2 => "2 Weeks",
            TimeRange::Month1 => "1 Month",
            TimeRange::Month2 => "2 Months",
            TimeRange::Month3 => "3 Months",
            TimeRange::Month6 => "6 Months",
            TimeRange::Year1 => "1 Year",
            TimeRange::Year5 => "5 Years",
        }
    }

    pub fn days(&self) -> i64 {
        match self {
            TimeRange::Week1 => 7,
            TimeRange::Week2 => 14,
            TimeRange::Month1 => 30,
            TimeRange::Month2 => 60,
            TimeRange::Month3 => 90,
            TimeRange::Month6 => 180,
            TimeRange::Year1 => 365,
            TimeRange::Year5 => 1825,
        }
    }

    /// Fixed per preset. Beyond a week of history, hourly buckets would
    /// exceed point budgets; beyond a month, daily ones would.
    pub fn granularity(&self) -> Granularity {
        match self {
            TimeRange::Week1 => Granularity::Hour,
            TimeRange::Week2 | TimeRange::Month1 => Granularity::Day,
            TimeRange::Month2 | TimeRange::Month3 | TimeRange::Month6 | TimeRange::Year1 => Granularity::Week,
            TimeRange::Year5 => Granularity::Month,
        }
    }

    /// Descriptor for the window ending at `now`.
    pub fn resolve_at(&self, now: DateTime<Utc>) -> RangeDescriptor {
        RangeDescriptor {
            key: self.as_str().to_string(),
            label: self.label().to_string(),
            start_date: now - Duration::days(self.days()),
            end_date: now,
            days: self.days(),
            granularity: self.granularity(),
        }
    }
}

impl fmt::Display for TimeRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl FromStr for TimeRange {
    type Err = RangeError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim();
        TimeRange::ALL
            .into_iter()
            .find(|r| r.as_str().eq_ignore_ascii_case(key))
            .ok_or_else(|| RangeError::UnknownPreset(s.to_string()))
    }
}

impl<'de> Deserialize<'de> for TimeRange {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let s = String::deserialize(deserializer)?;
        s.parse().map_err(serde::de::Error::custom)
    }
}

impl Serialize for TimeRange {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(self.as_str())
    }
}

/// Resolved window handed to the fetch collaborator and the optimizer.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RangeDescriptor {
    pub key: String,
    pub label: String,
    pub start_date: DateTime<Utc>,
    pub end_date: DateTime<Utc>,
    pub days: i64,
    pub granularity: Granularity,
}

/// Resolve a preset key against the current clock.
pub fn resolve_range(key: &str) -> Result<RangeDescriptor, RangeError> {
    resolve_range_at(key, Utc::now())
}

pub fn resolve_range_at(key: &str, now: DateTime<Utc>) -> Result<RangeDescriptor, RangeError> {
    Ok(key.parse::<TimeRange>()?.resolve_at(now))
}

/// Resolve an explicit window. Spans shorter than a day, including
/// reversed ones, are clamped to one day starting at `start`.
pub fn resolve_custom(start: DateTime<Utc>, end: DateTime<Utc>) -> RangeDescriptor {
    let span_ms = (end - start).num_milliseconds();
    let days = if span_ms <= 0 { 1 } else { ((span_ms + DAY_MS - 1) / DAY_MS).max(1) };
    let end_date = if span_ms <= 0 { start + Duration::days(1) } else { end };
    RangeDescriptor {
        key: "custom".to_string(),
        label: format!("Custom ({days} days)"),
        start_date: start,
        end_date,
        days,
        granularity: Granularity::for_days(days),
    }
}

/// Smallest preset whose window covers a forecast horizon, so the history
/// shown next to a prediction is at least as long as the prediction.
pub fn timeline_for_forecast(horizon_days: i64) -> TimeRange {
    TimeRange::ALL
        .into_iter()
        .find(|r| r.days() >= horizon_days)
        .unwrap_or(TimeRange::Year5)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn bucket_start_truncates() {
        let ts = Utc.with_ymd_and_hms(2024, 5, 16, 13, 45, 10).unwrap();
        assert_eq!(Granularity::Hour.bucket_start(ts), Utc.with_ymd_and_hms(2024, 5, 16, 13, 0, 0).unwrap());
        assert_eq!(Granularity::Day.bucket_start(ts), Utc.with_ymd_and_hms(2024, 5, 16, 0, 0, 0).unwrap());
        // 2024-05-16 is a Thursday
        assert_eq!(Granularity::Week.bucket_start(ts), Utc.with_ymd_and_hms(2024, 5, 13, 0, 0, 0).unwrap());
        assert_eq!(Granularity::Month.bucket_start(ts), Utc.with_ymd_and_hms(2024, 5, 1, 0, 0, 0).unwrap());
    }

    #[test]
    fn presets_are_sorted_by_days() {
        let days: Vec<_> = TimeRange::ALL.iter().map(|r| r.days()).collect();
        let mut sorted = days.clone();
        sorted.sort();
        assert_eq!(days, sorted);
    }
}
