// File: crates/chart-optimize/src/lib.rs
// Summary: Core library entry point; time range resolution, dataset optimization and
// interactive chart control for large time-series and categorical datasets.

pub mod config;
pub mod controller;
pub mod diagnostics;
pub mod downsample;
pub mod error;
pub mod export;
pub mod range;
pub mod record;
pub mod temporal;
pub mod tooltip;
pub mod types;
pub mod view;

pub use config::ChartConfig;
pub use controller::{ChartController, ChartState, RequestId};
pub use diagnostics::Diagnostic;
pub use downsample::{aggregate_by_granularity, optimize, optimize_indexed, optimize_with_schema, OptimizedView, Strategy};
pub use error::{ConfigError, ExportError, RangeError};
pub use export::{to_csv, ChartSpec, ImageFormat, RenderSurface};
pub use range::{resolve_custom, resolve_range, resolve_range_at, timeline_for_forecast, Granularity, RangeDescriptor, TimeRange};
pub use record::{Dataset, Record, Schema, TemporalHint, Value};
pub use tooltip::Tooltip;
pub use types::ChartType;
pub use view::ZoomExtent;
