// File: crates/chart-render-skia/src/scale.rs
// Summary: Linear data -> pixel transforms for the plot area.

/// Maps `[vmin, vmax]` onto `[from_px, to_px]`. Degenerate domains are
/// widened to one unit so a flat series still draws.
#[derive(Clone, Copy, Debug)]
pub struct LinearScale {
    pub from_px: f32,
    pub to_px: f32,
    pub vmin: f64,
    pub vmax: f64,
}

impl LinearScale {
    pub fn new(from_px: f32, to_px: f32, vmin: f64, vmax: f64) -> Self {
        let mut s = Self { from_px, to_px, vmin, vmax };
        if !(s.vmax - s.vmin).is_finite() || (s.vmax - s.vmin).abs() < 1e-12 {
            s.vmin = if vmin.is_finite() { vmin } else { 0.0 };
            s.vmax = s.vmin + 1.0;
        }
        s
    }

    /// Value axis over `[bottom, top]`, padded by 2% of the span on each side.
    pub fn value_axis(bottom_px: f32, top_px: f32, vmin: f64, vmax: f64) -> Self {
        let pad = ((vmax - vmin) * 0.02).max(0.0);
        Self::new(bottom_px, top_px, vmin - pad, vmax + pad)
    }

    #[inline]
    pub fn to_px(&self, v: f64) -> f32 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.from_px + ((v - self.vmin) / span) as f32 * (self.to_px - self.from_px)
    }

    #[inline]
    pub fn from_px(&self, px: f32) -> f64 {
        let span = (self.vmax - self.vmin).max(1e-12);
        self.vmin + ((px - self.from_px) / (self.to_px - self.from_px)) as f64 * span
    }
}
