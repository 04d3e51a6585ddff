// File: crates/demo/src/main.rs
// Summary: Demo loads a CSV (or synthesizes one), resolves a time range, drives the chart
// controller through zoom/brush interactions and writes CSV/PNG/SVG exports to target/out.

use anyhow::{Context, Result};
use chart_optimize::{
    resolve_range, ChartConfig, ChartController, ChartType, Dataset, ImageFormat, RangeDescriptor, Record, Value,
};
use chart_render_skia::{theme, RenderOptions, SkiaSurface};
use chrono::{Duration, Utc};
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    // Usage: chart-optimize-demo [data.csv] [chart.json]
    let mut args = std::env::args().skip(1);
    let data_path = args.next().map(PathBuf::from);
    let config_path = args.next().map(PathBuf::from);

    let range = resolve_window("1M")?;
    tracing::info!(
        key = %range.key,
        start = %range.start_date,
        end = %range.end_date,
        granularity = %range.granularity,
        "resolved time range"
    );

    let dataset = match &data_path {
        Some(path) => load_csv(path).with_context(|| format!("failed to load CSV '{}'", path.display()))?,
        None => synthesize(50_000),
    };
    if dataset.is_empty() {
        anyhow::bail!("no rows loaded; check headers/delimiter");
    }
    tracing::info!(rows = dataset.len(), "dataset loaded");

    let config = match &config_path {
        Some(path) => ChartConfig::load(path).with_context(|| format!("reading config '{}'", path.display()))?,
        None => ChartConfig::new("date", Vec::<String>::new()),
    };

    let mut chart = ChartController::new(config);
    // CHART_THEME=light switches the palette
    let theme = std::env::var("CHART_THEME").map(|name| theme::find(&name)).unwrap_or_default();
    chart.attach_surface(Box::new(SkiaSurface::new(RenderOptions { theme, ..RenderOptions::default() })));

    let request = chart.begin_request();
    chart.receive(request, dataset);
    tracing::info!(
        raw = chart.raw().len(),
        rendered = chart.rendered().len(),
        y_fields = ?chart.schema().y_fields,
        "initial view"
    );
    write_exports(&mut chart, "full")?;

    // Brush the middle tenth of the rendered view and zoom further in.
    let n = chart.rendered().len();
    if chart.brush(n * 45 / 100, n * 55 / 100) {
        if let Some(extent) = chart.state().zoom_extent {
            tracing::info!(left = extent.left, right = extent.right, rendered = chart.rendered().len(), "brushed");
        }
        write_exports(&mut chart, "brushed")?;
    }
    if let Some(tip) = chart.tooltip(chart.rendered().len() / 2) {
        println!("{tip}");
    }

    chart.set_chart_type(ChartType::Bar);
    write_exports(&mut chart, "bar")?;

    chart.reset_zoom();
    chart.set_chart_type(ChartType::Scatter);
    write_exports(&mut chart, "scatter")?;

    for diagnostic in chart.take_diagnostics() {
        tracing::warn!(%diagnostic, "chart diagnostic");
    }
    Ok(())
}

fn resolve_window(key: &str) -> Result<RangeDescriptor> {
    resolve_range(key).with_context(|| format!("resolving {key} range"))
}

fn write_exports(chart: &mut ChartController, label: &str) -> Result<()> {
    let dir = PathBuf::from("target/out");
    std::fs::create_dir_all(&dir).with_context(|| format!("creating {}", dir.display()))?;
    let stem = format!("chart_{}_{}", chart.state().chart_type, label);

    if let Some(text) = chart.export_csv() {
        let path = dir.join(format!("{stem}.csv"));
        std::fs::write(&path, text)?;
        println!("Wrote {}", path.display());
    }
    if !chart.present() {
        return Ok(());
    }
    for format in [ImageFormat::Png, ImageFormat::Svg] {
        if let Some(bytes) = chart.export_image(format) {
            let path = dir.join(format!("{stem}.{}", format.extension()));
            std::fs::write(&path, bytes)?;
            println!("Wrote {}", path.display());
        }
    }
    Ok(())
}

/// Load a headed CSV into records. Numeric cells become numbers, blanks become nulls.
fn load_csv(path: &Path) -> Result<Dataset> {
    let mut rdr = csv::ReaderBuilder::new()
        .has_headers(true)
        .from_path(path)
        .with_context(|| format!("opening {}", path.display()))?;
    let headers = rdr.headers()?.iter().map(|h| h.trim().to_lowercase()).collect::<Vec<_>>();
    tracing::debug!(?headers, "csv headers");

    let mut out = Vec::new();
    for row in rdr.records() {
        let row = row?;
        let record = headers
            .iter()
            .zip(row.iter())
            .map(|(h, cell)| (h.clone(), cell_value(cell)))
            .collect::<Record>();
        out.push(record);
    }
    Ok(out)
}

fn cell_value(cell: &str) -> Value {
    let cell = cell.trim();
    if cell.is_empty() {
        return Value::Null;
    }
    match cell.parse::<f64>() {
        Ok(n) if n.is_finite() => Value::Number(n),
        _ => Value::Text(cell.to_string()),
    }
}

/// Minute-resolution series ending now: a slow wave with drift plus a second metric.
fn synthesize(n: usize) -> Dataset {
    let end = Utc::now();
    (0..n)
        .map(|i| {
            let t = end - Duration::minutes((n - i) as i64);
            let x = i as f64;
            Record::new()
                .with("date", t.format("%Y-%m-%d %H:%M:%S").to_string())
                .with("sales", (x * 0.01).sin() * 10.0 + x * 0.0001 + 50.0)
                .with("returns", (x * 0.003).cos() * 3.0 + 5.0)
        })
        .collect()
}
