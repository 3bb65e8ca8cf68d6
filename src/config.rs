//! Plain-data configuration (spec §6.2), populated progressively by
//! [`crate::builder::VListBuilder`] rather than parsed from a document —
//! there is no outer option-normalization layer in scope (spec §1).

use crate::scroll::{Orientation, DEFAULT_IDLE_TIMEOUT_MS, DEFAULT_WHEEL_SENSITIVITY};
use crate::size_cache::SizeSpec;

/// Default overscan (items rendered outside the viewport on each side).
pub const DEFAULT_OVERSCAN: usize = 3;
/// Default class prefix for generated DOM (`vlist-item`, `vlist-viewport`, ...).
pub const DEFAULT_CLASS_PREFIX: &str = "vlist";
/// Default pooled-element cap, see [`crate::pool::DEFAULT_POOL_CAP`].
pub const DEFAULT_POOL_CAP: usize = crate::pool::DEFAULT_POOL_CAP;

/// Scroll-related options (spec §6.2 `scroll = {wheel?, wrap?, idleTimeout?, element?}`).
#[derive(Clone, Debug)]
pub struct ScrollConfig {
    pub wheel_enabled: bool,
    pub wheel_sensitivity: f64,
    pub idle_timeout_ms: u32,
    /// `true` to bind the window as the scroll target (spec §4.4 `Window` mode).
    pub use_window: bool,
}

impl Default for ScrollConfig {
    fn default() -> Self {
        ScrollConfig {
            wheel_enabled: true,
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
            use_window: false,
        }
    }
}

/// Item-level options: how big an item is and how it renders.
#[derive(Clone)]
pub struct ItemConfig {
    pub size: SizeSpec,
}

impl ItemConfig {
    pub fn fixed(size: f64) -> Self {
        ItemConfig {
            size: SizeSpec::Fixed(size),
        }
    }
}

/// Top-level configuration (spec §6.2). Holds only plain data; DOM
/// construction and feature wiring happen in `builder`/`component`.
#[derive(Clone)]
pub struct VListConfig {
    pub item: ItemConfig,
    pub overscan: usize,
    pub class_prefix: String,
    pub aria_label: Option<String>,
    pub orientation: Orientation,
    pub reverse: bool,
    pub scroll: ScrollConfig,
}

impl Default for VListConfig {
    fn default() -> Self {
        VListConfig {
            item: ItemConfig::fixed(0.0),
            overscan: DEFAULT_OVERSCAN,
            class_prefix: DEFAULT_CLASS_PREFIX.to_string(),
            aria_label: None,
            orientation: Orientation::Vertical,
            reverse: false,
            scroll: ScrollConfig::default(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_documented_values() {
        let cfg = VListConfig::default();
        assert_eq!(cfg.overscan, 3);
        assert_eq!(cfg.class_prefix, "vlist");
        assert_eq!(cfg.scroll.idle_timeout_ms, 150);
        assert!(cfg.scroll.wheel_enabled);
        assert!(!cfg.reverse);
    }
}
