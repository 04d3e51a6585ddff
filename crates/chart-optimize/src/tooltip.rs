// File: crates/chart-optimize/src/tooltip.rs
// Summary: Hover/inspection content for a rendered point. Aggregated values must be
// disclosed as averages, using the `_count`/`_min`/`_max` companions the optimizer emits.

use std::fmt;

use crate::record::{Record, Value};

/// Window statistics attached to an averaged value.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AggregateInfo {
    pub count: usize,
    pub min: Option<f64>,
    pub max: Option<f64>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct TooltipEntry {
    pub field: String,
    pub value: Value,
    pub aggregate: Option<AggregateInfo>,
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tooltip {
    pub x: Value,
    pub entries: Vec<TooltipEntry>,
}

impl Tooltip {
    /// Build the tooltip for one record. Fields absent from the record
    /// (e.g. dropped because a window had no numeric values) are skipped.
    pub fn inspect(record: &Record, x_field: &str, y_fields: &[String]) -> Self {
        let entries = y_fields
            .iter()
            .filter_map(|field| {
                let value = record.get(field)?.clone();
                Some(TooltipEntry { aggregate: aggregate_info(record, field), field: field.clone(), value })
            })
            .collect();
        Self { x: record.get(x_field).cloned().unwrap_or(Value::Null), entries }
    }

    /// True when any entry is an average rather than a raw observation.
    pub fn is_aggregated(&self) -> bool {
        self.entries.iter().any(|e| e.aggregate.is_some())
    }
}

fn aggregate_info(record: &Record, field: &str) -> Option<AggregateInfo> {
    let count = record.number(&format!("{field}_count"))?;
    if count < 1.0 { return None; }
    Some(AggregateInfo {
        count: count as usize,
        min: record.number(&format!("{field}_min")),
        max: record.number(&format!("{field}_max")),
    })
}

impl fmt::Display for TooltipEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: ", self.field)?;
        match &self.value {
            Value::Number(n) => write!(f, "{n:.2}")?,
            Value::Text(s) => f.write_str(s)?,
            Value::Null => f.write_str("-")?,
        }
        if let Some(agg) = self.aggregate {
            write!(f, " (average of {} points", agg.count)?;
            if let (Some(min), Some(max)) = (agg.min, agg.max) {
                write!(f, ", min {min:.2}, max {max:.2}")?;
            }
            f.write_str(")")?;
        }
        Ok(())
    }
}

impl fmt::Display for Tooltip {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.x {
            Value::Number(n) => writeln!(f, "{n}")?,
            Value::Text(s) => writeln!(f, "{s}")?,
            Value::Null => {}
        }
        for (i, e) in self.entries.iter().enumerate() {
            if i > 0 { f.write_str("\n")?; }
            write!(f, "{e}")?;
        }
        Ok(())
    }
}
