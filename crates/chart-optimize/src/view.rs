// File: crates/chart-optimize/src/view.rs
// Zoom extent over the raw dataset: half-open index window with zoom/pan helpers.

/// Half-open `[left, right)` window of raw-dataset indices.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ZoomExtent {
    pub left: usize,
    pub right: usize,
}

impl ZoomExtent {
    /// `None` for empty or reversed windows.
    pub fn new(left: usize, right: usize) -> Option<Self> {
        (left < right).then_some(Self { left, right })
    }

    pub fn full(len: usize) -> Self { Self { left: 0, right: len } }

    pub fn len(&self) -> usize { self.right - self.left }

    pub fn is_empty(&self) -> bool { self.left >= self.right }

    pub fn is_full(&self, len: usize) -> bool { self.left == 0 && self.right >= len }

    /// Intersect with `[0, len)`; `None` when nothing remains.
    pub fn clamp_to(self, len: usize) -> Option<Self> {
        Self::new(self.left.min(len), self.right.min(len))
    }

    /// Scale the window around `anchor` (a raw index). `factor < 1` narrows,
    /// `factor > 1` widens. The anchor keeps its relative position, like a
    /// cursor-anchored wheel zoom.
    pub fn zoom_at(&mut self, factor: f64, anchor: usize, len: usize) {
        if len == 0 || !factor.is_finite() || factor <= 0.0 { return; }
        let span = self.len().max(1) as f64;
        let anchor = anchor.clamp(self.left, self.right.saturating_sub(1).max(self.left)) as f64;
        let rel = (anchor - self.left as f64) / span;
        let new_span = (span * factor).round().clamp(1.0, len as f64);
        let left = (anchor - rel * new_span).round().max(0.0);
        let left = (left as usize).min(len - new_span as usize);
        self.left = left;
        self.right = left + new_span as usize;
    }

    /// Shift by `delta` indices, stopping at the dataset edges.
    pub fn pan_by(&mut self, delta: isize, len: usize) {
        let span = self.len().min(len);
        let max_left = len - span;
        let left = if delta < 0 {
            self.left.saturating_sub(delta.unsigned_abs())
        } else {
            self.left.saturating_add(delta as usize).min(max_left)
        };
        self.left = left;
        self.right = left + span;
    }
}
