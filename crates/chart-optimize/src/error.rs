// File: crates/chart-optimize/src/error.rs
// Summary: Error types for range resolution, configuration and export.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum RangeError {
    #[error("unknown time range preset: {0}, expected one of 1W, 2W, 1M, 2M, 3M, 6M, 1Y, 5Y")]
    UnknownPreset(String),
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("unknown chart type: {0}, expected line, area, bar or scatter")]
    UnknownChartType(String),
    #[error("invalid chart config: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("failed to read chart config: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("no rendering surface is attached")]
    NoSurface,
    #[error("rendering surface has not drawn a frame yet")]
    NotRendered,
    #[error("csv encoding failed: {0}")]
    Csv(#[from] csv::Error),
    #[error("surface export failed: {0}")]
    Surface(String),
}
