// File: crates/chart-optimize/tests/controller.rs
// Purpose: Controller state transitions: brush/zoom re-derivation from raw data, gating,
// request sequencing, chart-type switches and non-fatal diagnostics.

use chart_optimize::{
    ChartConfig, ChartController, ChartSpec, ChartType, Diagnostic, ExportError, ImageFormat, Record, RenderSurface,
    Strategy, ZoomExtent,
};
use chrono::{Duration, TimeZone, Utc};
use std::cell::RefCell;
use std::rc::Rc;

fn hourly(n: usize) -> Vec<Record> {
    let start = Utc.with_ymd_and_hms(2020, 1, 1, 0, 0, 0).unwrap();
    (0..n)
        .map(|i| {
            Record::new()
                .with("date", (start + Duration::hours(i as i64)).to_rfc3339())
                .with("sales", (i % 97) as f64)
                .with("region", "east")
        })
        .collect()
}

fn line_chart() -> ChartController {
    ChartController::new(ChartConfig::new("date", ["sales"]))
}

#[test]
fn brushing_rederives_finer_view_from_raw() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(50_000));
    assert_eq!(chart.rendered().len(), 1000);
    assert_eq!(chart.view().strategy, Strategy::TimeWindows { window_size: 50 });

    assert!(chart.brush(100, 200));
    assert_eq!(chart.state().zoom_extent, ZoomExtent::new(5000, 10_000));
    assert_eq!(chart.rendered().len(), 1000);
    assert_eq!(chart.view().strategy, Strategy::TimeWindows { window_size: 5 });
    assert_eq!(chart.rendered()[0].get("date"), chart.raw()[5000].get("date"));
    assert_eq!(chart.rendered()[0].number("sales_count"), Some(5.0));

    // brushing again composes with the current extent and reaches raw points
    assert!(chart.brush(0, 10));
    assert_eq!(chart.state().zoom_extent, ZoomExtent::new(5000, 5050));
    assert_eq!(chart.view().strategy, Strategy::Identity);
    assert_eq!(chart.rendered(), &chart.raw()[5000..5050]);
}

#[test]
fn reset_restores_full_view() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(20_000));
    let full = chart.rendered().to_vec();
    assert!(chart.brush(10, 20));
    assert!(chart.state().is_zoomed());
    chart.reset_zoom();
    assert!(!chart.state().is_zoomed());
    assert_eq!(chart.rendered(), full.as_slice());
}

#[test]
fn chart_type_switch_keeps_zoom_and_changes_budget() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(50_000));
    assert!(chart.brush(0, 500));
    let extent = chart.state().zoom_extent;

    chart.set_chart_type(ChartType::Bar);
    assert_eq!(chart.state().chart_type, ChartType::Bar);
    assert_eq!(chart.state().point_limit, 500);
    assert_eq!(chart.state().zoom_extent, extent);
    assert!(chart.rendered().len() <= 500);
}

#[test]
fn explicit_point_limit_survives_type_switch() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(10_000));
    chart.set_point_limit(Some(200));
    assert_eq!(chart.rendered().len(), 200);
    chart.set_chart_type(ChartType::Scatter);
    assert_eq!(chart.state().point_limit, 200);
    chart.set_point_limit(None);
    assert_eq!(chart.state().point_limit, 2000);
}

#[test]
fn new_dataset_clears_zoom() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(5000));
    assert!(chart.brush(1, 3));
    chart.set_dataset(hourly(3000));
    assert_eq!(chart.state().zoom_extent, None);
    assert_eq!(chart.raw().len(), 3000);
}

#[test]
fn disabled_interactions_are_ignored() {
    let mut config = ChartConfig::new("date", ["sales"]);
    config.enable_brush = false;
    config.enable_zoom = false;
    let mut chart = ChartController::new(config);
    chart.set_dataset(hourly(5000));
    let before = chart.rendered().to_vec();

    assert!(!chart.brush(10, 20));
    assert!(!chart.zoom_by(0.5, 10));
    assert!(!chart.pan_by(5));
    assert_eq!(chart.state().zoom_extent, None);
    assert_eq!(chart.rendered(), before.as_slice());
    assert_eq!(
        chart.take_diagnostics(),
        vec![
            Diagnostic::InteractionIgnored { event: "brush" },
            Diagnostic::InteractionIgnored { event: "zoom" },
            Diagnostic::InteractionIgnored { event: "pan" },
        ]
    );
}

#[test]
fn wheel_zoom_and_pan_move_the_extent() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(50_000));
    assert!(!chart.pan_by(10));

    // rendered index 500 is raw index 25_000
    assert!(chart.zoom_by(0.5, 500));
    assert_eq!(chart.state().zoom_extent, ZoomExtent::new(12_500, 37_500));
    assert!(chart.pan_by(1000));
    assert_eq!(chart.state().zoom_extent, ZoomExtent::new(13_500, 38_500));
    assert!(chart.pan_by(-100_000));
    assert_eq!(chart.state().zoom_extent, ZoomExtent::new(0, 25_000));

    // widening past the dataset returns to the full view
    assert!(chart.zoom_by(4.0, 0));
    assert_eq!(chart.state().zoom_extent, None);
}

#[test]
fn superseded_responses_are_discarded() {
    let mut chart = line_chart();
    let first = chart.begin_request();
    let second = chart.begin_request();
    assert!(second > first);

    assert!(chart.receive(second, hourly(10)));
    assert!(!chart.receive(first, hourly(20)));
    assert_eq!(chart.raw().len(), 10);
    assert_eq!(
        chart.take_diagnostics(),
        vec![Diagnostic::StaleResponse { request: first.get(), latest: second.get() }]
    );
}

#[test]
fn temporal_input_is_sorted_on_ingestion() {
    let mut data = hourly(100);
    data.reverse();
    let mut chart = line_chart();
    chart.set_dataset(data);
    assert_eq!(chart.raw()[0].get("date"), hourly(1)[0].get("date"));
}

#[test]
fn y_fields_default_to_numeric_columns() {
    let mut chart = ChartController::new(ChartConfig::default());
    chart.set_dataset(hourly(10));
    assert_eq!(chart.schema().y_fields, vec!["sales".to_string()]);
}

#[test]
fn tooltip_discloses_averaging() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(50_000));
    let tip = chart.tooltip(0).expect("tooltip");
    assert!(tip.is_aggregated());
    assert!(tip.to_string().contains("average of 50 points"));
    assert!(chart.tooltip(5000).is_none());
}

#[test]
fn slow_recompute_is_reported() {
    let mut config = ChartConfig::new("date", ["sales"]);
    config.frame_budget_ms = 0;
    let mut chart = ChartController::new(config);
    chart.set_dataset(hourly(20_000));
    let diagnostics = chart.take_diagnostics();
    assert!(matches!(diagnostics.as_slice(), [Diagnostic::SlowOptimization { records: 20_000, .. }]));
}

#[test]
fn empty_dataset_renders_empty_state() {
    let mut chart = line_chart();
    chart.set_dataset(Vec::new());
    assert!(chart.rendered().is_empty());
    assert!(!chart.brush(0, 10));
    assert!(!chart.zoom_by(0.5, 0));
    let csv = chart.export_csv().expect("header-only export");
    assert_eq!(csv.lines().collect::<Vec<_>>(), vec![r#""date","sales""#]);
}

#[test]
fn image_export_without_surface_is_a_diagnostic() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(10));
    assert!(!chart.present());
    assert!(chart.export_image(ImageFormat::Svg).is_none());
    assert!(matches!(
        chart.take_diagnostics().as_slice(),
        [Diagnostic::ExportUnavailable { format: Some(ImageFormat::Svg), .. }]
    ));
}

#[test]
fn disabled_export_yields_nothing() {
    let mut config = ChartConfig::new("date", ["sales"]);
    config.enable_export = false;
    let mut chart = ChartController::new(config);
    chart.set_dataset(hourly(10));
    assert!(chart.export_csv().is_none());
    assert!(chart.export_image(ImageFormat::Png).is_none());
    assert_eq!(chart.take_diagnostics(), vec![Diagnostic::ExportDisabled, Diagnostic::ExportDisabled]);
}

/// Surface that records what it was asked to draw and fails on demand.
#[derive(Default)]
struct RecordingSurface {
    drawn: Option<usize>,
    fail_draw: bool,
    frames: Rc<RefCell<Vec<usize>>>,
}

impl RenderSurface for RecordingSurface {
    fn draw(&mut self, spec: &ChartSpec<'_>) -> Result<(), ExportError> {
        if self.fail_draw {
            return Err(ExportError::Surface("device lost".into()));
        }
        self.drawn = Some(spec.records.len());
        self.frames.borrow_mut().push(spec.records.len());
        Ok(())
    }

    fn export(&mut self, _spec: &ChartSpec<'_>, format: ImageFormat) -> Result<Vec<u8>, ExportError> {
        match (self.drawn, format) {
            (None, _) => Err(ExportError::NotRendered),
            (Some(n), ImageFormat::Png) => Ok(vec![n as u8]),
            (Some(_), ImageFormat::Svg) => Err(ExportError::Surface("vector backend missing".into())),
        }
    }
}

#[test]
fn surface_failures_do_not_escape() {
    let mut chart = line_chart();
    chart.set_dataset(hourly(40));
    chart.attach_surface(Box::new(RecordingSurface::default()));

    assert!(chart.export_image(ImageFormat::Png).is_none());
    assert!(chart.present());
    assert_eq!(chart.export_image(ImageFormat::Png), Some(vec![40]));
    assert!(chart.export_image(ImageFormat::Svg).is_none());

    chart.attach_surface(Box::new(RecordingSurface { fail_draw: true, ..Default::default() }));
    assert!(!chart.present());

    let diagnostics = chart.take_diagnostics();
    assert!(matches!(
        diagnostics.as_slice(),
        [
            Diagnostic::ExportUnavailable { format: Some(ImageFormat::Png), .. },
            Diagnostic::ExportFailed { format: Some(ImageFormat::Svg), .. },
            Diagnostic::RenderFailed { .. },
        ]
    ));
    assert!(chart.detach_surface().is_some());
}

#[test]
fn every_rederived_view_reaches_the_surface() {
    let frames = Rc::new(RefCell::new(Vec::new()));
    let mut chart = line_chart();
    chart.set_dataset(hourly(5000));
    chart.attach_surface(Box::new(RecordingSurface { frames: Rc::clone(&frames), ..Default::default() }));
    assert!(chart.present());

    // rendered 0..10 covers raw 0..50, which fits the budget unaggregated
    assert!(chart.brush(0, 10));
    chart.set_chart_type(ChartType::Bar);
    chart.reset_zoom();
    chart.set_dataset(hourly(300));
    assert_eq!(*frames.borrow(), vec![1000, 50, 50, 500, 300]);

    // exports see the zoomed view, not the frame presented before the brush
    assert!(chart.brush(0, 2));
    assert_eq!(chart.export_image(ImageFormat::Png), Some(vec![2]));
    assert!(chart.take_diagnostics().is_empty());
}

#[test]
fn detected_time_field_other_than_x_is_reported() {
    let data: Vec<_> = (0..20)
        .map(|i| Record::new().with("timestamp", 1_700_000_000_000.0 + i as f64 * 60_000.0).with("sales", i as f64))
        .collect();
    let mut chart = ChartController::new(ChartConfig::new("date", ["sales"]));
    chart.set_dataset(data);
    assert_eq!(
        chart.take_diagnostics(),
        vec![Diagnostic::TimeFieldMismatch { x_field: "date".into(), time_field: "timestamp".into() }]
    );

    chart.set_dataset(hourly(20));
    assert!(chart.take_diagnostics().is_empty());
}
