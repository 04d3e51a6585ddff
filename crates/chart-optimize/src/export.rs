// File: crates/chart-optimize/src/export.rs
// Summary: Data export (delimited text of the rendered view) and the rendering-surface seam
// used for raster/vector image export.

use std::fmt;

use csv::{QuoteStyle, WriterBuilder};

use crate::error::ExportError;
use crate::record::{Record, Value};
use crate::types::ChartType;

/// Image formats a surface can produce.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ImageFormat {
    /// Raster bitmap.
    Png,
    /// Scalable vector.
    Svg,
}

impl ImageFormat {
    pub fn extension(&self) -> &'static str {
        match self {
            ImageFormat::Png => "png",
            ImageFormat::Svg => "svg",
        }
    }
}

impl fmt::Display for ImageFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            ImageFormat::Png => "PNG",
            ImageFormat::Svg => "SVG",
        })
    }
}

/// Declarative description of what to draw: chart shape, axes and the
/// already-optimized records.
#[derive(Clone, Copy, Debug)]
pub struct ChartSpec<'a> {
    pub chart_type: ChartType,
    pub x_field: &'a str,
    pub y_fields: &'a [String],
    pub records: &'a [Record],
}

/// Rendering surface the controller feeds. Implementations own pixels;
/// the controller never touches drawing primitives.
pub trait RenderSurface {
    /// Draw the current view.
    fn draw(&mut self, spec: &ChartSpec<'_>) -> Result<(), ExportError>;

    /// Encode the current view as an image.
    fn export(&mut self, spec: &ChartSpec<'_>, format: ImageFormat) -> Result<Vec<u8>, ExportError>;
}

/// Comma-separated table: header = x-field then y-fields, one row per record.
/// Quoting follows the value's type: text (and header names) is always
/// quoted, even when it looks numeric, numbers never are, and missing or null
/// cells are left empty.
pub fn to_csv(records: &[Record], x_field: &str, y_fields: &[String]) -> Result<String, ExportError> {
    let mut wtr = WriterBuilder::new().quote_style(QuoteStyle::Never).from_writer(Vec::new());

    let header = std::iter::once(x_field)
        .chain(y_fields.iter().map(String::as_str))
        .map(quoted);
    wtr.write_record(header)?;

    for r in records {
        let row = std::iter::once(x_field)
            .chain(y_fields.iter().map(String::as_str))
            .map(|f| cell(r.get(f)));
        wtr.write_record(row)?;
    }

    let bytes = wtr.into_inner().map_err(|e| ExportError::Csv(e.into_error().into()))?;
    Ok(String::from_utf8_lossy(&bytes).into_owned())
}

fn cell(value: Option<&Value>) -> String {
    match value {
        Some(Value::Number(n)) if n.is_finite() => n.to_string(),
        Some(Value::Text(s)) => quoted(s),
        _ => String::new(),
    }
}

/// `QuoteStyle::Never` writes fields as given, so text is escaped here.
fn quoted(s: &str) -> String {
    format!("\"{}\"", s.replace('"', "\"\""))
}
