// File: crates/chart-optimize/src/config.rs
// Summary: Chart configuration surface (JSON-loadable, every field defaulted).

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::record::{Schema, TemporalHint};
use crate::types::{effective_point_limit, ChartType, FRAME_BUDGET_MS};

/// Options recognized by [`crate::ChartController`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ChartConfig {
    pub chart_type: ChartType,
    /// Overrides the per-type default point budget.
    pub point_limit: Option<usize>,
    pub enable_zoom: bool,
    pub enable_brush: bool,
    pub enable_export: bool,
    pub x_field: String,
    pub y_fields: Vec<String>,
    pub temporal: TemporalHint,
    /// Recomputations slower than this are reported as diagnostics.
    pub frame_budget_ms: u64,
}

impl Default for ChartConfig {
    fn default() -> Self {
        Self {
            chart_type: ChartType::Line,
            point_limit: None,
            enable_zoom: true,
            enable_brush: true,
            enable_export: true,
            x_field: "date".to_string(),
            y_fields: Vec::new(),
            temporal: TemporalHint::Auto,
            frame_budget_ms: FRAME_BUDGET_MS,
        }
    }
}

impl ChartConfig {
    pub fn new<I, S>(x_field: impl Into<String>, y_fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            x_field: x_field.into(),
            y_fields: y_fields.into_iter().map(Into::into).collect(),
            ..Self::default()
        }
    }

    pub fn from_json_str(s: &str) -> Result<Self, ConfigError> {
        Ok(serde_json::from_str(s)?)
    }

    /// Load a JSON config file.
    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let content = std::fs::read_to_string(path)?;
        Self::from_json_str(&content)
    }

    pub fn schema(&self) -> Schema {
        Schema::new(self.x_field.clone(), self.y_fields.iter().cloned()).with_temporal(self.temporal)
    }

    pub fn effective_point_limit(&self) -> usize {
        effective_point_limit(self.chart_type, self.point_limit)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let cfg = ChartConfig::from_json_str(r#"{"chartType":"bar","yFields":["sales"]}"#).expect("config");
        assert_eq!(cfg.chart_type, ChartType::Bar);
        assert_eq!(cfg.y_fields, vec!["sales".to_string()]);
        assert!(cfg.enable_zoom);
        assert_eq!(cfg.effective_point_limit(), 500);
        assert_eq!(cfg.frame_budget_ms, 100);
    }

    #[test]
    fn invalid_json_is_an_error() {
        assert!(matches!(ChartConfig::from_json_str("{"), Err(ConfigError::Parse(_))));
        assert!(ChartConfig::from_json_str(r#"{"chartType":"pie"}"#).is_err());
    }
}
