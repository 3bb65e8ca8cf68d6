//! Maps a bounded virtual scroll space onto the true item space once the
//! content would exceed the browser's safe maximum absolute-positioned
//! element size.
//!
//! Compression is a runtime *value*, not a type (spec §9 design note):
//! every caller accepts a [`CompressionState`] which may be the no-op
//! (`is_compressed == false`) variant.

use crate::range::{clamp_scroll_position, Align, Range};
use crate::size_cache::{count_items_fitting_from_bottom, count_visible_items, SizeCache};

/// The browser's conventional safe maximum for an absolutely positioned
/// element's extent, ~16.7 million pixels.
pub const MAX_VIRTUAL_SIZE: f64 = 16_700_000.0;

/// Derived, cacheable compression state for a given `(total_items, SizeCache)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct CompressionState {
    /// `true` when `actual_size > MAX_VIRTUAL_SIZE`.
    pub is_compressed: bool,
    /// True, uncompressed content size.
    pub actual_size: f64,
    /// `min(actual_size, MAX_VIRTUAL_SIZE)`.
    pub virtual_size: f64,
    /// `virtual_size / actual_size`, `1.0` when not compressed or when
    /// `actual_size == 0`.
    pub ratio: f64,
}

impl CompressionState {
    /// The no-op state for an empty or sub-threshold list.
    pub const NONE: CompressionState = CompressionState {
        is_compressed: false,
        actual_size: 0.0,
        virtual_size: 0.0,
        ratio: 1.0,
    };

    /// Derive compression state from the current total and size cache.
    /// Cheap enough to call on every `total_items` change; callers should
    /// still cache by `total_items` per spec §3 to avoid recomputation
    /// inside a single render tick.
    pub fn derive(_total_items: usize, sc: &SizeCache) -> Self {
        let actual_size = sc.get_total_size();
        let virtual_size = actual_size.min(MAX_VIRTUAL_SIZE);
        let ratio = if actual_size > 0.0 {
            virtual_size / actual_size
        } else {
            1.0
        };
        CompressionState {
            is_compressed: actual_size > MAX_VIRTUAL_SIZE,
            actual_size,
            virtual_size,
            ratio,
        }
    }
}

/// Visible range for a compressed list (spec §4.3 "Visible range").
pub fn compressed_visible_range(
    scroll: f64,
    container: f64,
    sc: &SizeCache,
    total: usize,
    comp: &CompressionState,
    out: &mut Range,
) {
    if total == 0 || container <= 0.0 || comp.virtual_size <= 0.0 {
        *out = Range::EMPTY;
        return;
    }
    let scroll_ratio = scroll / comp.virtual_size;
    let exact_idx = scroll_ratio * total as f64;
    let start = exact_idx.floor().max(0.0) as usize;
    let visible_count = count_visible_items(sc, start.min(total.saturating_sub(1)), container, total);
    let mut end = (exact_idx.ceil() as usize).saturating_add(visible_count);

    let max_scroll = (comp.virtual_size - container).max(0.0);
    let distance_from_bottom = max_scroll - scroll;
    let mut start = start;
    if distance_from_bottom <= container {
        let first_visible_at_bottom =
            total.saturating_sub(count_items_fitting_from_bottom(sc, container, total));
        let t = (1.0 - (distance_from_bottom / container)).clamp(0.0, 1.0);
        let blended = start as f64 + (first_visible_at_bottom as f64 - start as f64) * t;
        start = (blended.round() as usize).min(first_visible_at_bottom);
        end = end.max(total.saturating_sub(1));
    }
    if scroll >= max_scroll - f64::EPSILON {
        end = total.saturating_sub(1);
    }
    end = end.min(total.saturating_sub(1));
    start = start.min(end);
    *out = Range::new(start, end);
}

/// Position of item `i` relative to the viewport, for a compressed list
/// (spec §4.3 "Item position"). Items are laid out relative to the
/// viewport rather than at absolute scroll offsets since no real scroll
/// container exists past `MAX_VIRTUAL_SIZE`.
pub fn compressed_item_position(
    i: usize,
    scroll: f64,
    container: f64,
    sc: &SizeCache,
    total: usize,
    comp: &CompressionState,
) -> f64 {
    if comp.virtual_size <= 0.0 {
        return sc.get_offset(i);
    }
    let scroll_ratio = scroll / comp.virtual_size;
    let virtual_scroll_offset = scroll_ratio * comp.actual_size;
    let normal_position = sc.get_offset(i) - virtual_scroll_offset;

    let max_scroll = (comp.virtual_size - container).max(0.0);
    let distance_from_bottom = max_scroll - scroll;
    if distance_from_bottom <= container && container > 0.0 {
        let first_visible_at_bottom =
            total.saturating_sub(count_items_fitting_from_bottom(sc, container, total));
        if scroll >= max_scroll - f64::EPSILON {
            // Exact bottom: position cumulatively from the bottom of the
            // viewport so the last item's bottom edge aligns with the
            // container's bottom edge.
            let mut y = container;
            for idx in (first_visible_at_bottom..total).rev() {
                y -= sc.get_size(idx);
                if idx == i {
                    return y;
                }
            }
            return normal_position;
        }
        let bottom_position = sc.get_offset(i) - sc.get_offset(first_visible_at_bottom);
        let t = (1.0 - (distance_from_bottom / container)).clamp(0.0, 1.0);
        return normal_position + (bottom_position - normal_position) * t;
    }
    normal_position
}

/// Scroll-to-index target for a compressed list (spec §4.3
/// "Scroll-to-index"). `align == End` on the last item returns
/// `max(0, virtual_size - container)` directly to avoid a fractional gap.
pub fn compressed_scroll_to_index(
    idx: usize,
    sc: &SizeCache,
    container: f64,
    total: usize,
    comp: &CompressionState,
    align: Align,
) -> f64 {
    if total == 0 || comp.virtual_size <= 0.0 {
        return 0.0;
    }
    let idx = idx.min(total - 1);
    let max_scroll = (comp.virtual_size - container).max(0.0);
    if align == Align::End && idx == total - 1 {
        return max_scroll;
    }
    let base = (idx as f64 / total as f64) * comp.virtual_size;
    let item_size = sc.get_size(idx) * comp.ratio;
    let target = match align {
        Align::Start => base,
        Align::Center => base - container / 2.0 + item_size / 2.0,
        Align::End => base - container + item_size,
    };
    clamp_scroll_position(target, max_scroll)
}

/// State captured when switching from native scrolling into compression,
/// so the ratio can be restored on the way back out (spec §4.3 "State
/// transitions").
#[derive(Clone, Copy, Debug)]
pub struct CompressionTransition {
    /// `scroll / max_scroll` at the moment of the transition.
    pub scroll_ratio: f64,
}

impl CompressionTransition {
    /// Capture the current native scroll ratio before switching to manual
    /// compressed scrolling.
    pub fn enter(native_scroll: f64, native_max_scroll: f64) -> Self {
        let ratio = if native_max_scroll > 0.0 {
            (native_scroll / native_max_scroll).clamp(0.0, 1.0)
        } else {
            0.0
        };
        CompressionTransition { scroll_ratio: ratio }
    }

    /// Scroll position to seed the manual/compressed counter with,
    /// proportional to the captured ratio.
    pub fn initial_compressed_scroll(&self, virtual_size: f64, container: f64) -> f64 {
        let max_scroll = (virtual_size - container).max(0.0);
        self.scroll_ratio * max_scroll
    }

    /// Scroll position to restore on the native scroller when leaving
    /// compression, proportional to the same ratio (spec testable
    /// property #7: "preserved within one container height").
    pub fn restore_native_scroll(&self, native_total: f64, container: f64) -> f64 {
        let max_scroll = (native_total - container).max(0.0);
        self.scroll_ratio * max_scroll
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::size_cache::SizeSpec;

    #[test]
    fn e4_compression_threshold_and_scroll_to_index() {
        // E4: 1,000,000 items x 48px.
        let sc = SizeCache::new(SizeSpec::Fixed(48.0), 1_000_000);
        let comp = CompressionState::derive(1_000_000, &sc);
        assert_eq!(comp.actual_size, 48_000_000.0);
        assert!(comp.is_compressed);
        assert!(comp.virtual_size <= MAX_VIRTUAL_SIZE);

        let container = 600.0;
        let start_scroll = compressed_scroll_to_index(500_000, &sc, container, 1_000_000, &comp, Align::Start);
        assert!(start_scroll > 0.0 && start_scroll < MAX_VIRTUAL_SIZE);
        // Proportional to 0.5 of the virtual space (within alignment noise).
        let expected = 0.5 * comp.virtual_size;
        assert!((start_scroll - expected).abs() < comp.virtual_size * 0.01);

        let end_scroll = compressed_scroll_to_index(999_999, &sc, container, 1_000_000, &comp, Align::End);
        let max_scroll = (comp.virtual_size - container).max(0.0);
        assert_eq!(end_scroll, max_scroll);
    }

    #[test]
    fn invariant_5_compression_threshold() {
        let sc_small = SizeCache::new(SizeSpec::Fixed(10.0), 100);
        let comp_small = CompressionState::derive(100, &sc_small);
        assert!(!comp_small.is_compressed);
        assert!(comp_small.ratio > 0.0 && comp_small.ratio <= 1.0);

        let sc_big = SizeCache::new(SizeSpec::Fixed(1000.0), 1_000_000);
        let comp_big = CompressionState::derive(1_000_000, &sc_big);
        assert!(comp_big.is_compressed);
        assert!(comp_big.virtual_size <= MAX_VIRTUAL_SIZE);
        assert!(comp_big.ratio > 0.0 && comp_big.ratio <= 1.0);
    }

    #[test]
    fn transition_preserves_ratio_round_trip() {
        let t = CompressionTransition::enter(250.0, 1000.0);
        assert_eq!(t.scroll_ratio, 0.25);
        let compressed_start = t.initial_compressed_scroll(500_000.0, 100.0);
        let restored = t.restore_native_scroll(1000.0, 100.0);
        assert!((restored - 250.0).abs() < 1.0);
        assert!(compressed_start > 0.0);
    }

    #[test]
    fn compressed_visible_range_is_never_empty_for_nonzero_total() {
        let sc = SizeCache::new(SizeSpec::Fixed(48.0), 2_000_000);
        let comp = CompressionState::derive(2_000_000, &sc);
        let mut out = Range::EMPTY;
        compressed_visible_range(0.0, 600.0, &sc, 2_000_000, &comp, &mut out);
        assert!(!out.is_empty());
        let max_scroll = (comp.virtual_size - 600.0).max(0.0);
        compressed_visible_range(max_scroll, 600.0, &sc, 2_000_000, &comp, &mut out);
        assert_eq!(out.end as usize, 1_999_999);
    }
}
