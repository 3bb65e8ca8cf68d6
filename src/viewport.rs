//! Pure functions mapping (scroll position, container size, size cache,
//! total items, compression state) to visible/render ranges and
//! scroll-to-index positions.
//!
//! Every function here is pure and, where the source object already
//! exists, mutates it in place instead of allocating — the scroll hot
//! path (§5 of the spec) must not allocate per tick.

use crate::compression::CompressionState;
use crate::range::{clamp_scroll_position, Align, Range};
use crate::size_cache::SizeCache;

/// A `visible_range_fn` matching this signature can be substituted for
/// [`simple_visible_range`] (e.g. by the compression feature) via
/// `VListContext::set_visible_range_fn`.
pub type VisibleRangeFn = dyn Fn(f64, f64, &SizeCache, usize, &CompressionState, &mut Range);

/// Mutable, per-tick viewport state. Reused across scroll ticks to avoid
/// allocation; `content_size`/`actual_size`/`is_compressed`/
/// `compression_ratio` mirror the current [`CompressionState`].
#[derive(Debug, Clone)]
pub struct ViewportState {
    /// Current scroll position, main axis.
    pub scroll_pos: f64,
    /// Main-axis size of the container (height for vertical, width for horizontal).
    pub container_size: f64,
    /// Virtual (possibly compressed) total content size.
    pub total_size: f64,
    /// True, uncompressed total content size.
    pub actual_size: f64,
    /// Whether compression is currently active.
    pub is_compressed: bool,
    /// `virtual_size / actual_size`, `1.0` when uncompressed.
    pub compression_ratio: f64,
    /// Items whose rectangles intersect the viewport.
    pub visible_range: Range,
    /// Visible range expanded by overscan.
    pub render_range: Range,
}

impl Default for ViewportState {
    fn default() -> Self {
        ViewportState {
            scroll_pos: 0.0,
            container_size: 0.0,
            total_size: 0.0,
            actual_size: 0.0,
            is_compressed: false,
            compression_ratio: 1.0,
            visible_range: Range::EMPTY,
            render_range: Range::EMPTY,
        }
    }
}

impl ViewportState {
    /// Recompute `visible_range`/`render_range` in place using
    /// `visible_range_fn` (defaulting to [`simple_visible_range`] when
    /// `None`), then expand by `overscan`.
    pub fn recompute(
        &mut self,
        sc: &SizeCache,
        total: usize,
        comp: &CompressionState,
        overscan: usize,
        visible_range_fn: &VisibleRangeFn,
    ) {
        self.actual_size = sc.get_total_size();
        self.total_size = comp.virtual_size;
        self.is_compressed = comp.is_compressed;
        self.compression_ratio = comp.ratio;
        visible_range_fn(
            self.scroll_pos,
            self.container_size,
            sc,
            total,
            comp,
            &mut self.visible_range,
        );
        calculate_render_range(&self.visible_range, overscan, total, &mut self.render_range);
    }
}

/// Visible range for an uncompressed list: `start = index_at_offset(scroll)`,
/// `end = index_at_offset(scroll + container)`, expanded by one item unless
/// that already reaches the last item (half-item overshoot). `comp` is
/// accepted for signature parity with [`VisibleRangeFn`] but ignored here —
/// compressed lists use `crate::compression::compressed_visible_range` instead.
pub fn simple_visible_range(
    scroll: f64,
    container: f64,
    sc: &SizeCache,
    total: usize,
    _comp: &CompressionState,
    out: &mut Range,
) {
    if total == 0 || container <= 0.0 {
        *out = Range::EMPTY;
        return;
    }
    let start = sc.index_at_offset(scroll);
    let mut end = sc.index_at_offset(scroll + container);
    if end < total - 1 {
        end += 1;
    }
    let end = end.min(total - 1);
    *out = Range::new(start.min(end), end);
}

/// Expand `visible` by `overscan` on each side, clamped to `[0, total-1]`.
pub fn calculate_render_range(visible: &Range, overscan: usize, total: usize, out: &mut Range) {
    if visible.is_empty() || total == 0 {
        *out = Range::EMPTY;
        return;
    }
    let start = visible.start.saturating_sub(overscan);
    let end = (visible.end as usize + overscan).min(total - 1);
    *out = Range::new(start, end);
}

/// Scroll position (uncompressed) that aligns item `idx` per `align`,
/// clamped to `[0, max(0, total_size - container)]`.
pub fn simple_scroll_to_index(
    idx: usize,
    sc: &SizeCache,
    container: f64,
    total: usize,
    _comp: &CompressionState,
    align: Align,
) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let idx = idx.min(total - 1);
    let pivot = sc.get_offset(idx);
    let item_size = sc.get_size(idx);
    let target = match align {
        Align::Start => pivot,
        Align::Center => pivot - container / 2.0 + item_size / 2.0,
        Align::End => pivot - container + item_size,
    };
    let max_scroll = (sc.get_total_size() - container).max(0.0);
    clamp_scroll_position(target, max_scroll)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_cache::SizeSpec;

    fn fixed(total: usize, size: f64) -> SizeCache {
        SizeCache::new(SizeSpec::Fixed(size), total)
    }

    #[test]
    fn e1_fixed_small_scroll_zero() {
        let sc = fixed(100, 50.0);
        let comp = CompressionState::derive(100, &sc);
        let mut visible = Range::EMPTY;
        simple_visible_range(0.0, 500.0, &sc, 100, &comp, &mut visible);
        assert_eq!(visible.start, 0);
        assert_eq!(visible.end, 10);

        let mut render = Range::EMPTY;
        calculate_render_range(&visible, 3, 100, &mut render);
        assert_eq!(render, Range::new(0, 13));
        assert_eq!(sc.get_total_size(), 5000.0);
    }

    #[test]
    fn e2_fixed_scrolled() {
        let sc = fixed(100, 50.0);
        let comp = CompressionState::derive(100, &sc);
        let mut visible = Range::EMPTY;
        simple_visible_range(250.0, 500.0, &sc, 100, &comp, &mut visible);
        assert_eq!(visible.start, 5);
        assert!(visible.end == 15 || visible.end == 16);
    }

    #[test]
    fn e5_scroll_to_index_alignments() {
        let sc = fixed(100, 50.0);
        let comp = CompressionState::derive(100, &sc);
        assert_eq!(simple_scroll_to_index(10, &sc, 500.0, 100, &comp, Align::Center), 275.0);
        assert_eq!(simple_scroll_to_index(10, &sc, 500.0, 100, &comp, Align::End), 50.0);
        assert_eq!(simple_scroll_to_index(10, &sc, 500.0, 100, &comp, Align::Start), 500.0);
    }

    #[test]
    fn empty_total_yields_empty_ranges() {
        let sc = fixed(0, 50.0);
        let comp = CompressionState::derive(0, &sc);
        let mut visible = Range::EMPTY;
        simple_visible_range(0.0, 500.0, &sc, 0, &comp, &mut visible);
        assert!(visible.is_empty());
    }

    #[test]
    fn zero_container_yields_empty_range() {
        let sc = fixed(100, 50.0);
        let comp = CompressionState::derive(100, &sc);
        let mut visible = Range::EMPTY;
        simple_visible_range(0.0, 0.0, &sc, 100, &comp, &mut visible);
        assert!(visible.is_empty());
    }

    #[test]
    fn render_range_always_contains_visible() {
        let sc = fixed(1000, 20.0);
        let comp = CompressionState::derive(1000, &sc);
        let mut visible = Range::EMPTY;
        simple_visible_range(12345.0, 333.0, &sc, 1000, &comp, &mut visible);
        let mut render = Range::EMPTY;
        calculate_render_range(&visible, 3, 1000, &mut render);
        assert!(render.start <= visible.start);
        assert!(render.end >= visible.end);
        assert!(render.start == 0 || render.start as isize <= visible.start as isize);
        assert!(render.end as usize <= 999);
    }
}
