// File: crates/chart-render-skia/src/lib.rs
// Summary: Skia-backed rendering surface. Draws an optimized chart view on a CPU raster
// surface (PNG export) or Skia's SVG canvas (vector export).

pub mod scale;
pub mod theme;

use std::io::Cursor;

use anyhow::{anyhow, Result};
use chart_optimize::temporal::parse_timestamp;
use chart_optimize::{ChartSpec, ChartType, ExportError, ImageFormat, Record, RenderSurface};
use skia_safe as skia;

use crate::scale::LinearScale;
pub use crate::theme::Theme;

/// Default surface width in pixels.
pub const WIDTH: i32 = 1024;
/// Default surface height in pixels.
pub const HEIGHT: i32 = 640;

/// Screen margins around the plot area, in pixels.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Insets {
    pub left: i32,
    pub right: i32,
    pub top: i32,
    pub bottom: i32,
}

impl Default for Insets {
    fn default() -> Self {
        Self { left: 72, right: 24, top: 24, bottom: 56 }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct RenderOptions {
    pub width: i32,
    pub height: i32,
    pub insets: Insets,
    pub theme: Theme,
    /// Axis labels depend on system fonts; tests turn them off.
    pub draw_labels: bool,
}

impl Default for RenderOptions {
    fn default() -> Self {
        Self { width: WIDTH, height: HEIGHT, insets: Insets::default(), theme: Theme::dark(), draw_labels: true }
    }
}

/// Last rasterized frame, RGBA8 unpremultiplied.
struct Frame {
    width: u32,
    height: u32,
    rgba: Vec<u8>,
}

/// CPU raster surface implementing the controller's rendering seam.
pub struct SkiaSurface {
    opts: RenderOptions,
    frame: Option<Frame>,
}

impl SkiaSurface {
    pub fn new(opts: RenderOptions) -> Self {
        Self { opts, frame: None }
    }

    pub fn options(&self) -> &RenderOptions { &self.opts }

    /// Pixels of the last presented frame as `(rgba, width, height)`, for
    /// hosts that blit the surface to a window.
    pub fn last_frame(&self) -> Option<(&[u8], u32, u32)> {
        self.frame.as_ref().map(|f| (f.rgba.as_slice(), f.width, f.height))
    }

    /// Rasterize `spec` and return RGBA8 pixels with the frame size.
    pub fn render_rgba8(&self, spec: &ChartSpec<'_>) -> Result<(Vec<u8>, u32, u32)> {
        let (w, h) = (self.opts.width, self.opts.height);
        let mut surface = skia::surfaces::raster_n32_premul((w, h))
            .ok_or_else(|| anyhow!("failed to create {w}x{h} raster surface"))?;
        paint_chart(surface.canvas(), &self.opts, spec);

        let info = skia::ImageInfo::new((w, h), skia::ColorType::RGBA8888, skia::AlphaType::Unpremul, None);
        let row_bytes = w as usize * 4;
        let mut rgba = vec![0u8; row_bytes * h as usize];
        if !surface.read_pixels(&info, &mut rgba, row_bytes, (0, 0)) {
            return Err(anyhow!("failed to read back raster pixels"));
        }
        Ok((rgba, w as u32, h as u32))
    }

    /// Render `spec` and encode it as PNG.
    pub fn render_png(&self, spec: &ChartSpec<'_>) -> Result<Vec<u8>> {
        let (rgba, w, h) = self.render_rgba8(spec)?;
        encode_png(w, h, rgba)
    }

    /// Render `spec` through Skia's SVG canvas.
    pub fn render_svg(&self, spec: &ChartSpec<'_>) -> Result<Vec<u8>> {
        let bounds = skia::Rect::from_wh(self.opts.width as f32, self.opts.height as f32);
        let canvas = skia::svg::Canvas::new(bounds, None);
        paint_chart(&canvas, &self.opts, spec);
        let data = canvas.end();
        if data.as_bytes().is_empty() {
            return Err(anyhow!("svg canvas produced no output"));
        }
        Ok(data.as_bytes().to_vec())
    }
}

impl Default for SkiaSurface {
    fn default() -> Self { Self::new(RenderOptions::default()) }
}

impl RenderSurface for SkiaSurface {
    fn draw(&mut self, spec: &ChartSpec<'_>) -> Result<(), ExportError> {
        let (rgba, width, height) = self.render_rgba8(spec).map_err(surface_error)?;
        tracing::debug!(chart_type = %spec.chart_type, points = spec.records.len(), "frame drawn");
        self.frame = Some(Frame { width, height, rgba });
        Ok(())
    }

    /// Both formats re-render from `spec`, so an export always shows the
    /// view it was asked for, never an older frame.
    fn export(&mut self, spec: &ChartSpec<'_>, format: ImageFormat) -> Result<Vec<u8>, ExportError> {
        if self.frame.is_none() {
            return Err(ExportError::NotRendered);
        }
        match format {
            ImageFormat::Png => self.render_png(spec).map_err(surface_error),
            ImageFormat::Svg => self.render_svg(spec).map_err(surface_error),
        }
    }
}

fn surface_error(err: anyhow::Error) -> ExportError {
    ExportError::Surface(format!("{err:#}"))
}

fn encode_png(width: u32, height: u32, rgba: Vec<u8>) -> Result<Vec<u8>> {
    let img = image::RgbaImage::from_raw(width, height, rgba)
        .ok_or_else(|| anyhow!("pixel buffer does not match {width}x{height}"))?;
    let mut out = Cursor::new(Vec::new());
    img.write_to(&mut out, image::ImageFormat::Png)?;
    Ok(out.into_inner())
}

// ---- drawing ----------------------------------------------------------------

/// Plot rectangle in pixels.
#[derive(Clone, Copy)]
struct Plot {
    l: f32,
    t: f32,
    r: f32,
    b: f32,
}

fn paint_chart(canvas: &skia::Canvas, opts: &RenderOptions, spec: &ChartSpec<'_>) {
    canvas.clear(opts.theme.background);
    let plot = Plot {
        l: opts.insets.left as f32,
        t: opts.insets.top as f32,
        r: (opts.width - opts.insets.right) as f32,
        b: (opts.height - opts.insets.bottom) as f32,
    };

    draw_grid(canvas, &opts.theme, plot);
    draw_axes(canvas, opts, plot, spec);

    let xs = x_positions(spec.records, spec.x_field);
    let (x_min, x_max) = min_max(xs.iter().copied()).unwrap_or((0.0, 1.0));
    let values = spec.y_fields.iter().flat_map(|f| spec.records.iter().filter_map(move |r| r.number(f)));
    let (y_min, y_max) = min_max(values).unwrap_or((0.0, 1.0));
    let (y_min, y_max) = match spec.chart_type {
        // bars and areas grow from zero
        ChartType::Bar | ChartType::Area => (y_min.min(0.0), y_max.max(0.0)),
        ChartType::Line | ChartType::Scatter => (y_min, y_max),
    };
    let sx = LinearScale::new(plot.l, plot.r, x_min, x_max);
    let sy = LinearScale::value_axis(plot.b, plot.t, y_min, y_max);

    for (i, field) in spec.y_fields.iter().enumerate() {
        let points: Vec<(f32, f32)> = spec
            .records
            .iter()
            .zip(&xs)
            .filter_map(|(r, &x)| r.number(field).map(|y| (sx.to_px(x), sy.to_px(y))))
            .collect();
        let ctx = SeriesCtx { theme: &opts.theme, index: i, series_count: spec.y_fields.len(), plot, baseline: sy.to_px(0.0) };
        match spec.chart_type {
            ChartType::Line => draw_line_series(canvas, &ctx, &points),
            ChartType::Area => draw_area_series(canvas, &ctx, &points),
            ChartType::Bar => draw_bar_series(canvas, &ctx, &points, spec.records.len()),
            ChartType::Scatter => draw_scatter_series(canvas, &ctx, &points),
        }
    }
}

/// X coordinate per record: timestamps (ms; numbers count as epoch ms) when
/// every record has one, otherwise the record index.
fn x_positions(records: &[Record], x_field: &str) -> Vec<f64> {
    let times: Option<Vec<f64>> = records
        .iter()
        .map(|r| r.get(x_field).and_then(parse_timestamp).map(|t| t.timestamp_millis() as f64))
        .collect();
    times.unwrap_or_else(|| (0..records.len()).map(|i| i as f64).collect())
}

fn min_max(values: impl Iterator<Item = f64>) -> Option<(f64, f64)> {
    values.fold(None, |acc, v| match acc {
        None => Some((v, v)),
        Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
    })
}

struct SeriesCtx<'a> {
    theme: &'a Theme,
    index: usize,
    series_count: usize,
    plot: Plot,
    baseline: f32,
}

fn stroke_paint(color: skia::Color, width: f32) -> skia::Paint {
    let mut p = skia::Paint::default();
    p.set_anti_alias(true);
    p.set_style(skia::paint::Style::Stroke);
    p.set_stroke_width(width);
    p.set_color(color);
    p
}

fn fill_paint(color: skia::Color) -> skia::Paint {
    let mut p = skia::Paint::default();
    p.set_anti_alias(true);
    p.set_style(skia::paint::Style::Fill);
    p.set_color(color);
    p
}

fn draw_grid(canvas: &skia::Canvas, theme: &Theme, plot: Plot) {
    let paint = stroke_paint(theme.grid, 1.0);
    for x in linspace(plot.l, plot.r, 10) {
        canvas.draw_line((x, plot.t), (x, plot.b), &paint);
    }
    for y in linspace(plot.t, plot.b, 6) {
        canvas.draw_line((plot.l, y), (plot.r, y), &paint);
    }
}

fn linspace(start: f32, end: f32, steps: usize) -> impl Iterator<Item = f32> {
    let step = (end - start) / (steps.max(2) - 1) as f32;
    (0..steps.max(2)).map(move |i| start + step * i as f32)
}

fn draw_axes(canvas: &skia::Canvas, opts: &RenderOptions, plot: Plot, spec: &ChartSpec<'_>) {
    let axis = stroke_paint(opts.theme.axis_line, 1.5);
    canvas.draw_line((plot.l, plot.b), (plot.r, plot.b), &axis);
    canvas.draw_line((plot.l, plot.t), (plot.l, plot.b), &axis);

    if !opts.draw_labels {
        return;
    }
    let text = fill_paint(opts.theme.axis_label);
    let mut font = skia::Font::default();
    font.set_size(14.0);
    canvas.draw_str(spec.x_field, (plot.r - 80.0, plot.b + 24.0), &font, &text);
    canvas.draw_str(spec.y_fields.join(", "), (plot.l - 56.0, plot.t + 14.0), &font, &text);
}

fn draw_line_series(canvas: &skia::Canvas, ctx: &SeriesCtx<'_>, points: &[(f32, f32)]) {
    if points.len() < 2 {
        return draw_scatter_series(canvas, ctx, points);
    }
    let mut path = skia::Path::new();
    path.move_to(points[0]);
    for &p in &points[1..] {
        path.line_to(p);
    }
    canvas.draw_path(&path, &stroke_paint(ctx.theme.series_color(ctx.index), 2.0));
}

fn draw_area_series(canvas: &skia::Canvas, ctx: &SeriesCtx<'_>, points: &[(f32, f32)]) {
    let (Some(&(x0, _)), Some(&(xn, _))) = (points.first(), points.last()) else { return };
    let mut fill = skia::Path::new();
    fill.move_to((x0, ctx.baseline));
    for &p in points {
        fill.line_to(p);
    }
    fill.line_to((xn, ctx.baseline));
    fill.close();
    canvas.draw_path(&fill, &fill_paint(ctx.theme.series_fill(ctx.index)));
    draw_line_series(canvas, ctx, points);
}

fn draw_bar_series(canvas: &skia::Canvas, ctx: &SeriesCtx<'_>, points: &[(f32, f32)], slots: usize) {
    let slot_px = (ctx.plot.r - ctx.plot.l) / slots.max(1) as f32;
    let group_px = (slot_px * 0.8).max(1.0);
    let bar_px = (group_px / ctx.series_count.max(1) as f32).max(1.0);
    let offset = -group_px * 0.5 + bar_px * ctx.index as f32;
    let paint = fill_paint(ctx.theme.series_color(ctx.index));
    for &(x, y) in points {
        let left = x + offset;
        let (top, bottom) = if y <= ctx.baseline { (y, ctx.baseline) } else { (ctx.baseline, y) };
        let rect = skia::Rect::from_ltrb(left, top, left + bar_px, bottom.max(top + 1.0));
        canvas.draw_rect(rect, &paint);
    }
}

fn draw_scatter_series(canvas: &skia::Canvas, ctx: &SeriesCtx<'_>, points: &[(f32, f32)]) {
    let paint = fill_paint(ctx.theme.series_color(ctx.index));
    for &p in points {
        canvas.draw_circle(p, 2.5, &paint);
    }
}
