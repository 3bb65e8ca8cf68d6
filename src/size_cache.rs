//! Ordered offsets of items along the scroll axis.
//!
//! [`SizeCache`] is the foundation the rest of the engine builds on: every
//! other module asks it "where does item `i` start" or "which item is at
//! offset `y`" and never mutates it directly. It is rebuilt wholesale
//! whenever `total_items` or the [`SizeSpec`] changes (see [`SizeCache::rebuild`]).

use std::rc::Rc;

/// How an item's main-axis size is determined.
#[derive(Clone)]
pub enum SizeSpec {
    /// Every item has the same size.
    Fixed(f64),
    /// Per-item size, evaluated lazily and never memoized by the cache
    /// itself (spec: "the cache deliberately does not memoize individual
    /// sizes").
    Variable(Rc<dyn Fn(usize) -> f64>),
}

impl std::fmt::Debug for SizeSpec {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Fixed(s) => f.debug_tuple("Fixed").field(s).finish(),
            Self::Variable(_) => f.write_str("Variable(..)"),
        }
    }
}

impl PartialEq for SizeSpec {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::Fixed(a), Self::Fixed(b)) => a == b,
            (Self::Variable(a), Self::Variable(b)) => Rc::ptr_eq(a, b),
            _ => false,
        }
    }
}

/// Ordered offsets of `total_items` along the scroll axis.
///
/// Invariants (spec §3): `prefix_sums[0] == 0`;
/// `prefix_sums[i+1] - prefix_sums[i] == size(i) >= 0`;
/// `get_total_size() == prefix_sums[total_items]`.
#[derive(Debug, Clone)]
pub struct SizeCache {
    spec: SizeSpec,
    total_items: usize,
    /// Only populated for `SizeSpec::Variable`; length `total_items + 1`.
    /// `Rc<[f64]>` rather than `Vec<f64>` so a whole cache can be cloned
    /// (e.g. captured into a per-tick positioning closure) in O(1).
    prefix_sums: Rc<[f64]>,
}

impl SizeCache {
    /// Build a cache for `total_items` items sized per `spec`.
    pub fn new(spec: SizeSpec, total_items: usize) -> Self {
        let mut cache = SizeCache {
            spec,
            total_items: 0,
            prefix_sums: Rc::from([]),
        };
        cache.rebuild(total_items);
        cache
    }

    /// Rebuild for a (possibly unchanged) item count. Idempotent for the
    /// same `total_items` and `spec` (spec §4.1 contract).
    pub fn rebuild(&mut self, total_items: usize) {
        self.total_items = total_items;
        match &self.spec {
            SizeSpec::Fixed(_) => self.prefix_sums = Rc::from([]),
            SizeSpec::Variable(f) => {
                let mut sums = Vec::with_capacity(total_items + 1);
                sums.push(0.0);
                let mut running = 0.0;
                for i in 0..total_items {
                    running += f(i).max(0.0);
                    sums.push(running);
                }
                self.prefix_sums = Rc::from(sums);
            }
        }
    }

    /// Replace the size spec (e.g. switching fixed<->variable) and rebuild.
    pub fn set_spec(&mut self, spec: SizeSpec) {
        self.spec = spec;
        let total = self.total_items;
        self.rebuild(total);
    }

    /// Number of items this cache was built for.
    pub fn total_items(&self) -> usize {
        self.total_items
    }

    /// Size of item `i`. O(1) for both variants; the variable case calls
    /// the caller's size function and is not memoized.
    pub fn get_size(&self, i: usize) -> f64 {
        match &self.spec {
            SizeSpec::Fixed(s) => *s,
            SizeSpec::Variable(f) => f(i),
        }
    }

    /// Offset of the leading edge of item `i`, clamped to `[0, total_items]`.
    /// O(1) fixed, O(1) variable (direct prefix-sum lookup).
    pub fn get_offset(&self, i: usize) -> f64 {
        let i = i.min(self.total_items);
        match &self.spec {
            SizeSpec::Fixed(s) => i as f64 * s,
            SizeSpec::Variable(_) => self.prefix_sums[i],
        }
    }

    /// Total size of the scrollable content.
    pub fn get_total_size(&self) -> f64 {
        self.get_offset(self.total_items)
    }

    /// Largest index `i` such that `get_offset(i) <= y`, clamped into
    /// `[0, total_items - 1]`. O(1) fixed, O(log n) variable (binary
    /// search over the prefix-sum array).
    pub fn index_at_offset(&self, y: f64) -> usize {
        if self.total_items == 0 {
            return 0;
        }
        let last = self.total_items - 1;
        if y <= 0.0 {
            return 0;
        }
        let total_size = self.get_total_size();
        if y >= total_size {
            return last;
        }
        match &self.spec {
            SizeSpec::Fixed(s) => {
                if *s <= 0.0 {
                    return last;
                }
                ((y / s).floor() as usize).clamp(0, last)
            }
            SizeSpec::Variable(_) => {
                // Largest i with prefix_sums[i] <= y.
                let mut lo = 0usize;
                let mut hi = self.total_items; // prefix_sums has total_items+1 entries
                while lo < hi {
                    let mid = lo + (hi - lo) / 2;
                    if self.prefix_sums[mid] <= y {
                        lo = mid + 1;
                    } else {
                        hi = mid;
                    }
                }
                // lo is now the first index whose prefix sum exceeds y;
                // the item containing y is lo - 1.
                lo.saturating_sub(1).clamp(0, last)
            }
        }
    }
}

/// Number of whole-or-partial items visible in `container_size` pixels
/// starting at item `start_idx`.
pub fn count_visible_items(sc: &SizeCache, start_idx: usize, container_size: f64, total: usize) -> usize {
    if total == 0 || container_size <= 0.0 {
        return 0;
    }
    let start_offset = sc.get_offset(start_idx);
    let target = start_offset + container_size;
    let mut count = 0usize;
    let mut i = start_idx;
    let mut passed = start_offset;
    while i < total && passed < target {
        passed += sc.get_size(i);
        count += 1;
        i += 1;
    }
    count.max(1).min(total - start_idx.min(total))
}

/// Number of items, counted backwards from the end, that fit within
/// `container_size` pixels of the bottom of the content.
pub fn count_items_fitting_from_bottom(sc: &SizeCache, container_size: f64, total: usize) -> usize {
    if total == 0 || container_size <= 0.0 {
        return 0;
    }
    let mut count = 0usize;
    let mut remaining = container_size;
    let mut i = total;
    while i > 0 && remaining > 0.0 {
        i -= 1;
        remaining -= sc.get_size(i);
        count += 1;
    }
    count
}

/// Offset corresponding to a fractional "virtual index", linearly
/// interpolating within the floor-indexed item using its own size.
pub fn get_offset_for_virtual_index(sc: &SizeCache, virtual_idx: f64, total: usize) -> f64 {
    if total == 0 {
        return 0.0;
    }
    let floor_idx = (virtual_idx.floor() as isize).clamp(0, total as isize - 1) as usize;
    let frac = virtual_idx - floor_idx as f64;
    sc.get_offset(floor_idx) + frac * sc.get_size(floor_idx)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fixed_offsets_are_closed_form() {
        let sc = SizeCache::new(SizeSpec::Fixed(50.0), 100);
        assert_eq!(sc.get_offset(0), 0.0);
        assert_eq!(sc.get_offset(10), 500.0);
        assert_eq!(sc.get_total_size(), 5000.0);
    }

    #[test]
    fn e3_variable_alternating_heights() {
        // E3 from spec §8: heights alternating 40/80, 10 items.
        let sc = SizeCache::new(
            SizeSpec::Variable(Rc::new(|i| if i % 2 == 0 { 40.0 } else { 80.0 })),
            10,
        );
        assert_eq!(sc.get_offset(0), 0.0);
        assert_eq!(sc.get_offset(1), 40.0);
        assert_eq!(sc.get_offset(2), 120.0);
        assert_eq!(sc.get_offset(3), 160.0);
        assert_eq!(sc.get_total_size(), 600.0);
        assert_eq!(sc.index_at_offset(159.0), 2);
        assert_eq!(sc.index_at_offset(160.0), 3);
    }

    #[test]
    fn index_at_offset_clamps_out_of_range() {
        let sc = SizeCache::new(SizeSpec::Fixed(50.0), 100);
        assert_eq!(sc.index_at_offset(-100.0), 0);
        assert_eq!(sc.index_at_offset(1_000_000.0), 99);
    }

    #[test]
    fn rebuild_is_idempotent() {
        let mut sc = SizeCache::new(SizeSpec::Fixed(10.0), 50);
        let before: Vec<f64> = (0..=50).map(|i| sc.get_offset(i)).collect();
        sc.rebuild(50);
        let after: Vec<f64> = (0..=50).map(|i| sc.get_offset(i)).collect();
        assert_eq!(before, after);
    }

    #[test]
    fn variable_rebuild_reflects_new_total() {
        let mut sc = SizeCache::new(SizeSpec::Variable(Rc::new(|_| 10.0)), 5);
        assert_eq!(sc.get_total_size(), 50.0);
        sc.rebuild(10);
        assert_eq!(sc.get_total_size(), 100.0);
    }

    #[test]
    fn count_visible_items_e1() {
        // E1: 100 items x 50px, container 500px, scroll 0.
        let sc = SizeCache::new(SizeSpec::Fixed(50.0), 100);
        assert_eq!(count_visible_items(&sc, 0, 500.0, 100), 10);
    }

    #[test]
    fn empty_cache_has_zero_total_size() {
        let sc = SizeCache::new(SizeSpec::Fixed(50.0), 0);
        assert_eq!(sc.get_total_size(), 0.0);
        assert_eq!(sc.index_at_offset(0.0), 0);
    }
}
