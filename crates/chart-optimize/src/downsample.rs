// File: crates/chart-optimize/src/downsample.rs
// Summary: Dataset optimization (time-window aggregation for temporal data, boundary-preserving
// statistical sampling otherwise) and calendar-bucket aggregation.

use std::ops::Range;

use crate::range::Granularity;
use crate::record::{Dataset, Record, Schema, Value};
use crate::temporal::{parse_timestamp, resolve_time_field, sort_key};
use crate::types::{effective_point_limit, ChartType};

/// Which path produced an optimized view.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Strategy {
    /// Input already fits; returned unchanged.
    Identity,
    /// Sorted by time and collapsed into consecutive windows.
    TimeWindows { window_size: usize },
    /// First, last and every `step`-th record in between.
    Statistical { step: usize },
}

/// Optimized records plus the source range each one stands for.
///
/// `spans[i]` indexes the input for the identity and statistical paths and
/// the time-sorted input for the temporal path; the two coincide when the
/// input is already in ascending time order.
#[derive(Clone, Debug, PartialEq)]
pub struct OptimizedView {
    pub records: Dataset,
    pub spans: Vec<Range<usize>>,
    pub strategy: Strategy,
}

impl OptimizedView {
    pub fn len(&self) -> usize { self.records.len() }

    pub fn is_empty(&self) -> bool { self.records.is_empty() }

    /// Source range covered by rendered indices `[start, end)`.
    pub fn source_range(&self, start: usize, end: usize) -> Option<Range<usize>> {
        let end = end.min(self.spans.len());
        if start >= end { return None; }
        Some(self.spans[start].start..self.spans[end - 1].end)
    }
}

/// Reduce `dataset` to at most the chart type's point budget (or `point_limit`).
/// Every numeric field except the detected time field is aggregated.
pub fn optimize(dataset: &[Record], chart_type: ChartType, point_limit: Option<usize>) -> Dataset {
    optimize_indexed(dataset, None, effective_point_limit(chart_type, point_limit)).records
}

/// Like [`optimize`], but only the schema's y-fields are aggregated and the
/// schema's temporal hint decides the path.
pub fn optimize_with_schema(
    dataset: &[Record],
    schema: &Schema,
    chart_type: ChartType,
    point_limit: Option<usize>,
) -> Dataset {
    optimize_indexed(dataset, Some(schema), effective_point_limit(chart_type, point_limit)).records
}

/// Core optimizer. A `limit` of 0 is treated as 1.
pub fn optimize_indexed(dataset: &[Record], schema: Option<&Schema>, limit: usize) -> OptimizedView {
    let n = dataset.len();
    let limit = limit.max(1);
    if n <= limit {
        return OptimizedView {
            records: dataset.to_vec(),
            spans: (0..n).map(|i| i..i + 1).collect(),
            strategy: Strategy::Identity,
        };
    }

    let view = match resolve_time_field(dataset, schema) {
        Some(time_field) => {
            let fields = aggregate_fields(dataset, schema, &time_field);
            time_windows(dataset, &time_field, &fields, limit)
        }
        None => statistical_sample(dataset, limit),
    };
    tracing::debug!(input = n, output = view.len(), limit, strategy = ?view.strategy, "optimized dataset");
    view
}

/// Fields that hold a finite number in at least one record, in first-seen order.
pub fn numeric_fields(dataset: &[Record]) -> Vec<String> {
    let mut out: Vec<String> = Vec::new();
    for r in dataset {
        for (name, value) in r.iter() {
            if value.as_f64().is_some() && !out.iter().any(|f| f == name) {
                out.push(name.to_string());
            }
        }
    }
    out
}

fn aggregate_fields(dataset: &[Record], schema: Option<&Schema>, time_field: &str) -> Vec<String> {
    let fields = match schema {
        Some(s) => s.y_fields.clone(),
        None => numeric_fields(dataset),
    };
    fields.into_iter().filter(|f| f != time_field).collect()
}

fn time_windows(dataset: &[Record], time_field: &str, fields: &[String], limit: usize) -> OptimizedView {
    let sorted = sort_by_time(dataset, time_field);
    let n = sorted.len();
    let window_size = n.div_ceil(limit);

    let mut records = Vec::with_capacity(limit);
    let mut spans = Vec::with_capacity(limit);
    for (w, chunk) in sorted.chunks(window_size).enumerate() {
        let start = w * window_size;
        records.push(collapse_window(chunk, fields));
        spans.push(start..start + chunk.len());
    }
    OptimizedView { records, spans, strategy: Strategy::TimeWindows { window_size } }
}

fn statistical_sample(dataset: &[Record], limit: usize) -> OptimizedView {
    let n = dataset.len();
    let step = n.div_ceil(limit);
    if limit < 2 {
        return OptimizedView {
            records: vec![dataset[0].clone()],
            spans: vec![0..n],
            strategy: Strategy::Statistical { step },
        };
    }

    let mut picks = Vec::with_capacity(limit);
    picks.push(0);
    picks.extend((1..).map(|k| k * step).take_while(|&i| i < n - 1).take(limit - 2));
    picks.push(n - 1);

    let records = picks.iter().map(|&i| dataset[i].clone()).collect();
    let spans = picks
        .iter()
        .enumerate()
        .map(|(j, &i)| i..picks.get(j + 1).copied().unwrap_or(n))
        .collect();
    OptimizedView { records, spans, strategy: Strategy::Statistical { step } }
}

/// Stable ascending sort on the parsed time field; unparseable values last.
pub(crate) fn sort_by_time<'a>(dataset: &'a [Record], time_field: &str) -> Vec<&'a Record> {
    let mut keyed: Vec<_> = dataset.iter().map(|r| (sort_key(r, time_field), r)).collect();
    keyed.sort_by_key(|(k, _)| *k);
    keyed.into_iter().map(|(_, r)| r).collect()
}

/// Collapse a window into one record anchored on its first member.
///
/// For each aggregated field with at least one numeric value the field
/// becomes the mean and `{field}_min`, `{field}_max`, `{field}_count` are
/// appended; with none the field is dropped. Single-record windows are
/// returned verbatim.
pub fn collapse_window(window: &[&Record], fields: &[String]) -> Record {
    let Some(first) = window.first() else { return Record::new() };
    if window.len() == 1 { return (*first).clone(); }

    let mut out = (*first).clone();
    for field in fields {
        let mut count = 0usize;
        let mut sum = 0.0f64;
        let mut min = f64::INFINITY;
        let mut max = f64::NEG_INFINITY;
        for v in window.iter().filter_map(|r| r.number(field)) {
            count += 1;
            sum += v;
            min = min.min(v);
            max = max.max(v);
        }
        if count == 0 {
            out.remove(field);
            continue;
        }
        out.set(field.as_str(), sum / count as f64);
        out.set(format!("{field}_min"), min);
        out.set(format!("{field}_max"), max);
        out.set(format!("{field}_count"), Value::Number(count as f64));
    }
    out
}

/// Collapse records into calendar buckets of `granularity` on `time_field`.
/// Records whose time value does not parse are kept verbatim at the end.
pub fn aggregate_by_granularity(dataset: &[Record], time_field: &str, granularity: Granularity) -> Dataset {
    let fields: Vec<String> = numeric_fields(dataset).into_iter().filter(|f| f != time_field).collect();
    let sorted = sort_by_time(dataset, time_field);

    let mut out = Vec::new();
    let mut bucket: Vec<&Record> = Vec::new();
    let mut current = None;
    for r in sorted {
        let Some(ts) = r.get(time_field).and_then(parse_timestamp) else {
            if !bucket.is_empty() { out.push(collapse_window(&bucket, &fields)); bucket.clear(); }
            out.push(r.clone());
            continue;
        };
        let key = granularity.bucket_start(ts);
        if current != Some(key) && !bucket.is_empty() {
            out.push(collapse_window(&bucket, &fields));
            bucket.clear();
        }
        current = Some(key);
        bucket.push(r);
    }
    if !bucket.is_empty() { out.push(collapse_window(&bucket, &fields)); }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn rec(v: f64) -> Record { Record::new().with("label", "p").with("v", v) }

    #[test]
    fn collapse_skips_non_numeric() {
        let a = rec(1.0);
        let b = Record::new().with("label", "p").with("v", "n/a");
        let c = rec(5.0);
        let out = collapse_window(&[&a, &b, &c], &["v".to_string()]);
        assert_eq!(out.number("v"), Some(3.0));
        assert_eq!(out.number("v_count"), Some(2.0));
        assert_eq!(out.number("v_min"), Some(1.0));
        assert_eq!(out.number("v_max"), Some(5.0));
    }

    #[test]
    fn collapse_drops_all_non_numeric_field() {
        let a = Record::new().with("v", Value::Null).with("w", 1.0);
        let b = Record::new().with("v", "x").with("w", 3.0);
        let out = collapse_window(&[&a, &b], &["v".to_string(), "w".to_string()]);
        assert!(!out.contains("v"));
        assert!(!out.contains("v_count"));
        assert_eq!(out.number("w"), Some(2.0));
    }

    #[test]
    fn statistical_never_exceeds_limit() {
        let data: Vec<_> = (0..30).map(|i| rec(i as f64)).collect();
        let view = statistical_sample(&data, 10);
        assert!(view.len() <= 10);
        assert_eq!(view.records.first(), data.first());
        assert_eq!(view.records.last(), data.last());
        assert_eq!(view.spans.last(), Some(&(29..30)));
    }

    #[test]
    fn source_range_spans_windows() {
        let view = OptimizedView {
            records: vec![Record::new(); 3],
            spans: vec![0..4, 4..8, 8..10],
            strategy: Strategy::TimeWindows { window_size: 4 },
        };
        assert_eq!(view.source_range(1, 3), Some(4..10));
        assert_eq!(view.source_range(2, 2), None);
    }
}
