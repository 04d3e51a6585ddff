// File: crates/chart-optimize/src/types.rs
// Summary: Shared types and constants (chart kinds, default point budgets, frame budget).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;

/// Default per-interaction recomputation budget, in milliseconds.
pub const FRAME_BUDGET_MS: u64 = 100;

/// Chart shape. Also selects the default number of renderable points.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ChartType {
    #[default]
    Line,
    Area,
    Bar,
    Scatter,
}

impl ChartType {
    pub const ALL: [ChartType; 4] = [ChartType::Line, ChartType::Area, ChartType::Bar, ChartType::Scatter];

    /// Point budget used when no explicit limit is configured.
    pub const fn default_point_limit(self) -> usize {
        match self {
            ChartType::Line => 1000,
            ChartType::Area => 800,
            ChartType::Bar => 500,
            ChartType::Scatter => 2000,
        }
    }

    pub const fn as_str(self) -> &'static str {
        match self {
            ChartType::Line => "line",
            ChartType::Area => "area",
            ChartType::Bar => "bar",
            ChartType::Scatter => "scatter",
        }
    }
}

impl fmt::Display for ChartType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ChartType {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ChartType::ALL
            .into_iter()
            .find(|t| t.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ConfigError::UnknownChartType(s.to_string()))
    }
}

/// Effective limit: an explicit override wins, else the chart type default.
pub fn effective_point_limit(chart_type: ChartType, point_limit: Option<usize>) -> usize {
    point_limit.unwrap_or_else(|| chart_type.default_point_limit())
}
