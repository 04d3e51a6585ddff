// File: crates/chart-optimize/src/controller.rs
// Summary: Interactive chart controller. Owns chart state (type, zoom extent, point budget),
// re-optimizes the raw dataset on every state change and mediates export.
// Notes:
// - The zoom extent indexes the raw dataset; brushing maps rendered indices back
//   through the optimizer's spans so zooming always re-derives from source.
// - Fetch results are sequenced: only the most recently issued request renders.

use std::time::{Duration, Instant};

use crate::config::ChartConfig;
use crate::diagnostics::Diagnostic;
use crate::downsample::{numeric_fields, optimize_indexed, OptimizedView, Strategy};
use crate::error::ExportError;
use crate::export::{to_csv, ChartSpec, ImageFormat, RenderSurface};
use crate::record::{Dataset, Record, Schema};
use crate::temporal::{resolve_time_field, sort_key};
use crate::tooltip::Tooltip;
use crate::types::{effective_point_limit, ChartType};
use crate::view::ZoomExtent;

/// Identifier handed out by [`ChartController::begin_request`].
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct RequestId(u64);

impl RequestId {
    pub fn get(&self) -> u64 { self.0 }
}

/// Interaction state owned by one chart instance.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChartState {
    pub chart_type: ChartType,
    /// Raw-dataset window being viewed; `None` is the full view.
    pub zoom_extent: Option<ZoomExtent>,
    pub point_limit: usize,
}

impl ChartState {
    pub fn is_zoomed(&self) -> bool { self.zoom_extent.is_some() }
}

pub struct ChartController {
    config: ChartConfig,
    state: ChartState,
    schema: Schema,
    raw: Dataset,
    view: OptimizedView,
    surface: Option<Box<dyn RenderSurface>>,
    latest_request: u64,
    diagnostics: Vec<Diagnostic>,
}

impl ChartController {
    pub fn new(config: ChartConfig) -> Self {
        let state = ChartState {
            chart_type: config.chart_type,
            zoom_extent: None,
            point_limit: config.effective_point_limit(),
        };
        Self {
            schema: config.schema(),
            config,
            state,
            raw: Vec::new(),
            view: OptimizedView { records: Vec::new(), spans: Vec::new(), strategy: Strategy::Identity },
            surface: None,
            latest_request: 0,
            diagnostics: Vec::new(),
        }
    }

    pub fn config(&self) -> &ChartConfig { &self.config }

    pub fn state(&self) -> &ChartState { &self.state }

    /// Axes in effect for the current dataset.
    pub fn schema(&self) -> &Schema { &self.schema }

    pub fn raw(&self) -> &[Record] { &self.raw }

    /// The dataset currently handed to the surface.
    pub fn rendered(&self) -> &[Record] { &self.view.records }

    pub fn view(&self) -> &OptimizedView { &self.view }

    /// Drain pending non-fatal diagnostics.
    pub fn take_diagnostics(&mut self) -> Vec<Diagnostic> {
        std::mem::take(&mut self.diagnostics)
    }

    // ---- data ingestion -------------------------------------------------------

    /// Start a fetch; any response for an earlier request is discarded.
    pub fn begin_request(&mut self) -> RequestId {
        self.latest_request += 1;
        RequestId(self.latest_request)
    }

    /// Accept a fetch result if it belongs to the latest request.
    pub fn receive(&mut self, request: RequestId, dataset: Dataset) -> bool {
        if request.0 != self.latest_request {
            tracing::warn!(request = request.0, latest = self.latest_request, "discarding superseded response");
            self.report(Diagnostic::StaleResponse { request: request.0, latest: self.latest_request });
            return false;
        }
        self.set_dataset(dataset);
        true
    }

    /// Replace the raw dataset. Clears the zoom extent.
    pub fn set_dataset(&mut self, mut dataset: Dataset) {
        let time_field = resolve_time_field(&dataset, Some(&self.config.schema()));
        if let Some(field) = &time_field {
            dataset.sort_by_cached_key(|r| sort_key(r, field));
            if *field != self.config.x_field {
                tracing::warn!(x_field = %self.config.x_field, time_field = %field, "time axis differs from configured x-field");
                self.report(Diagnostic::TimeFieldMismatch { x_field: self.config.x_field.clone(), time_field: field.clone() });
            }
        }
        self.schema = self.derive_schema(&dataset, time_field.as_deref());
        self.raw = dataset;
        self.state.zoom_extent = None;
        self.refresh();
    }

    fn derive_schema(&self, dataset: &[Record], time_field: Option<&str>) -> Schema {
        let mut schema = self.config.schema();
        if schema.y_fields.is_empty() {
            schema.y_fields = numeric_fields(dataset)
                .into_iter()
                .filter(|f| *f != schema.x_field && Some(f.as_str()) != time_field)
                .collect();
        }
        schema
    }

    // ---- state transitions ----------------------------------------------------

    /// Switch chart shape. The point budget follows the new type unless an
    /// explicit limit is configured; the zoom extent is kept.
    pub fn set_chart_type(&mut self, chart_type: ChartType) {
        self.config.chart_type = chart_type;
        self.state.chart_type = chart_type;
        self.state.point_limit = effective_point_limit(chart_type, self.config.point_limit);
        self.refresh();
    }

    pub fn set_point_limit(&mut self, point_limit: Option<usize>) {
        self.config.point_limit = point_limit;
        self.state.point_limit = effective_point_limit(self.state.chart_type, point_limit);
        self.refresh();
    }

    /// Brush-drag over rendered indices `[start, end)`. The selection is
    /// mapped to raw indices and re-optimized at the same point budget.
    pub fn brush(&mut self, start: usize, end: usize) -> bool {
        if !self.config.enable_brush {
            return self.ignore("brush");
        }
        let Some(range) = self.view.source_range(start, end) else {
            return self.ignore("empty brush");
        };
        let offset = self.offset();
        match ZoomExtent::new(offset + range.start, offset + range.end) {
            Some(extent) => {
                self.set_extent(extent);
                true
            }
            None => self.ignore("empty brush"),
        }
    }

    /// Scale the view around a rendered index: `factor < 1` narrows, `> 1` widens.
    pub fn zoom_by(&mut self, factor: f64, anchor: usize) -> bool {
        if !self.config.enable_zoom {
            return self.ignore("zoom");
        }
        if self.raw.is_empty() {
            return self.ignore("zoom on empty dataset");
        }
        let anchor_raw = self
            .view
            .spans
            .get(anchor.min(self.view.spans.len().saturating_sub(1)))
            .map(|s| self.offset() + s.start)
            .unwrap_or(0);
        let mut extent = self.state.zoom_extent.unwrap_or_else(|| ZoomExtent::full(self.raw.len()));
        extent.zoom_at(factor, anchor_raw, self.raw.len());
        self.set_extent(extent);
        true
    }

    /// Shift a zoomed view by `delta` raw indices.
    pub fn pan_by(&mut self, delta: isize) -> bool {
        if !self.config.enable_zoom {
            return self.ignore("pan");
        }
        let Some(mut extent) = self.state.zoom_extent else {
            return self.ignore("pan without zoom");
        };
        extent.pan_by(delta, self.raw.len());
        self.set_extent(extent);
        true
    }

    /// Back to the full-range view.
    pub fn reset_zoom(&mut self) {
        self.state.zoom_extent = None;
        self.refresh();
    }

    fn set_extent(&mut self, extent: ZoomExtent) {
        self.state.zoom_extent = extent
            .clamp_to(self.raw.len())
            .filter(|e| !e.is_full(self.raw.len()));
        self.refresh();
    }

    fn offset(&self) -> usize {
        self.state.zoom_extent.map(|z| z.left).unwrap_or(0)
    }

    fn ignore(&mut self, event: &'static str) -> bool {
        tracing::debug!(event, "interaction ignored");
        self.report(Diagnostic::InteractionIgnored { event });
        false
    }

    fn report(&mut self, diagnostic: Diagnostic) {
        self.diagnostics.push(diagnostic);
    }

    /// Re-derive the rendered view from the raw dataset and redraw the
    /// attached surface, if any.
    fn refresh(&mut self) {
        let started = Instant::now();
        let view = {
            let slice = match self.state.zoom_extent {
                Some(z) => &self.raw[z.left..z.right],
                None => &self.raw[..],
            };
            optimize_indexed(slice, Some(&self.schema), self.state.point_limit)
        };
        let elapsed = started.elapsed();
        let budget = Duration::from_millis(self.config.frame_budget_ms);
        tracing::debug!(
            chart_type = %self.state.chart_type,
            zoomed = self.state.is_zoomed(),
            rendered = view.len(),
            elapsed_us = elapsed.as_micros() as u64,
            "chart view refreshed"
        );
        if elapsed > budget {
            let records = self.state.zoom_extent.map(|z| z.len()).unwrap_or(self.raw.len());
            tracing::warn!(records, elapsed_ms = elapsed.as_millis() as u64, "optimization exceeded frame budget");
            self.report(Diagnostic::SlowOptimization { elapsed, budget, records });
        }
        self.view = view;
        if self.surface.is_some() {
            self.present();
        }
    }

    // ---- inspection & export --------------------------------------------------

    pub fn tooltip(&self, index: usize) -> Option<Tooltip> {
        self.view
            .records
            .get(index)
            .map(|r| Tooltip::inspect(r, &self.schema.x_field, &self.schema.y_fields))
    }

    /// Rendered view as comma-separated text; `None` when export is disabled or fails.
    pub fn export_csv(&mut self) -> Option<String> {
        if !self.config.enable_export {
            self.report(Diagnostic::ExportDisabled);
            return None;
        }
        match to_csv(&self.view.records, &self.schema.x_field, &self.schema.y_fields) {
            Ok(text) => Some(text),
            Err(err) => {
                tracing::warn!(error = %err, "data export failed");
                self.report(Diagnostic::ExportFailed { format: None, message: err.to_string() });
                None
            }
        }
    }

    pub fn attach_surface(&mut self, surface: Box<dyn RenderSurface>) {
        self.surface = Some(surface);
    }

    pub fn detach_surface(&mut self) -> Option<Box<dyn RenderSurface>> {
        self.surface.take()
    }

    /// Draw the current view on the attached surface.
    pub fn present(&mut self) -> bool {
        let spec = ChartSpec {
            chart_type: self.state.chart_type,
            x_field: &self.schema.x_field,
            y_fields: &self.schema.y_fields,
            records: &self.view.records,
        };
        let Some(surface) = self.surface.as_mut() else { return false };
        match surface.draw(&spec) {
            Ok(()) => true,
            Err(err) => {
                tracing::warn!(error = %err, "surface draw failed");
                self.diagnostics.push(Diagnostic::RenderFailed { message: err.to_string() });
                false
            }
        }
    }

    /// Encode the current view as an image. Failures, including a missing
    /// surface, are reported as diagnostics and yield `None`.
    pub fn export_image(&mut self, format: ImageFormat) -> Option<Vec<u8>> {
        if !self.config.enable_export {
            self.report(Diagnostic::ExportDisabled);
            return None;
        }
        let spec = ChartSpec {
            chart_type: self.state.chart_type,
            x_field: &self.schema.x_field,
            y_fields: &self.schema.y_fields,
            records: &self.view.records,
        };
        let result = match self.surface.as_mut() {
            Some(surface) => surface.export(&spec, format),
            None => Err(ExportError::NoSurface),
        };
        match result {
            Ok(bytes) => Some(bytes),
            Err(err @ (ExportError::NoSurface | ExportError::NotRendered)) => {
                tracing::warn!(%format, error = %err, "image export unavailable");
                self.report(Diagnostic::ExportUnavailable { format: Some(format), reason: err.to_string() });
                None
            }
            Err(err) => {
                tracing::warn!(%format, error = %err, "image export failed");
                self.report(Diagnostic::ExportFailed { format: Some(format), message: err.to_string() });
                None
            }
        }
    }
}
