// File: crates/chart-render-skia/src/theme.rs
// Summary: Light/Dark palettes for chart surfaces, with a per-series color cycle.

use skia_safe as skia;

#[derive(Clone, Copy, Debug)]
pub struct Theme {
    pub name: &'static str,
    pub background: skia::Color,
    pub grid: skia::Color,
    pub axis_line: skia::Color,
    pub axis_label: skia::Color,
    /// Cycled across y-fields in declaration order.
    pub series: [skia::Color; 4],
    /// Alpha applied to area fills.
    pub fill_alpha: u8,
}

impl Theme {
    pub fn dark() -> Self {
        Self {
            name: "dark",
            background: skia::Color::from_argb(255, 18, 18, 20),
            grid: skia::Color::from_argb(255, 40, 40, 45),
            axis_line: skia::Color::from_argb(255, 180, 180, 190),
            axis_label: skia::Color::from_argb(255, 235, 235, 245),
            series: [
                skia::Color::from_argb(255, 64, 160, 255),
                skia::Color::from_argb(255, 40, 200, 120),
                skia::Color::from_argb(255, 255, 190, 60),
                skia::Color::from_argb(255, 220, 80, 80),
            ],
            fill_alpha: 96,
        }
    }

    pub fn light() -> Self {
        Self {
            name: "light",
            background: skia::Color::from_argb(255, 250, 250, 252),
            grid: skia::Color::from_argb(255, 230, 230, 235),
            axis_line: skia::Color::from_argb(255, 60, 60, 70),
            axis_label: skia::Color::from_argb(255, 20, 20, 30),
            series: [
                skia::Color::from_argb(255, 32, 120, 200),
                skia::Color::from_argb(255, 20, 160, 90),
                skia::Color::from_argb(255, 210, 140, 20),
                skia::Color::from_argb(255, 200, 60, 60),
            ],
            fill_alpha: 80,
        }
    }

    pub fn series_color(&self, index: usize) -> skia::Color {
        self.series[index % self.series.len()]
    }

    pub fn series_fill(&self, index: usize) -> skia::Color {
        self.series_color(index).with_a(self.fill_alpha)
    }
}

impl Default for Theme {
    fn default() -> Self { Self::dark() }
}

/// Find a theme by its `name`, falling back to dark.
pub fn find(name: &str) -> Theme {
    [Theme::dark(), Theme::light()]
        .into_iter()
        .find(|t| t.name.eq_ignore_ascii_case(name))
        .unwrap_or_else(Theme::dark)
}
