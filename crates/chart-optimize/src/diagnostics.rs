// File: crates/chart-optimize/src/diagnostics.rs
// Summary: Non-fatal diagnostics surfaced by the controller instead of failing an interaction.

use std::fmt;
use std::time::Duration;

use crate::export::ImageFormat;

#[derive(Clone, Debug, PartialEq)]
pub enum Diagnostic {
    /// Recomputation exceeded the frame budget.
    SlowOptimization { elapsed: Duration, budget: Duration, records: usize },
    /// A response arrived for a request that has since been superseded.
    StaleResponse { request: u64, latest: u64 },
    /// Image export was requested before a surface was attached or drew a frame.
    ExportUnavailable { format: Option<ImageFormat>, reason: String },
    ExportDisabled,
    ExportFailed { format: Option<ImageFormat>, message: String },
    /// The attached surface failed to draw the current view.
    RenderFailed { message: String },
    /// The dataset was windowed on a detected time field other than the
    /// configured x-field, whose column may then be blank in exports and tooltips.
    TimeFieldMismatch { x_field: String, time_field: String },
    /// A zoom/brush event arrived while the matching interaction is disabled,
    /// or carried an empty selection.
    InteractionIgnored { event: &'static str },
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Diagnostic::SlowOptimization { elapsed, budget, records } => write!(
                f,
                "optimizing {records} records took {} ms (budget {} ms)",
                elapsed.as_millis(),
                budget.as_millis()
            ),
            Diagnostic::StaleResponse { request, latest } => {
                write!(f, "discarded response for request {request}; latest is {latest}")
            }
            Diagnostic::ExportUnavailable { format, reason } => match format {
                Some(kind) => write!(f, "{kind} export unavailable: {reason}"),
                None => write!(f, "export unavailable: {reason}"),
            },
            Diagnostic::ExportDisabled => f.write_str("export is disabled"),
            Diagnostic::ExportFailed { format, message } => match format {
                Some(kind) => write!(f, "{kind} export failed: {message}"),
                None => write!(f, "data export failed: {message}"),
            },
            Diagnostic::RenderFailed { message } => write!(f, "render failed: {message}"),
            Diagnostic::TimeFieldMismatch { x_field, time_field } => {
                write!(f, "data is ordered by {time_field}, but the x-field is {x_field}")
            }
            Diagnostic::InteractionIgnored { event } => write!(f, "{event} ignored"),
        }
    }
}
