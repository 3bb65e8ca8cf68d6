//! Window-scroll integration (spec §6.5 `setScrollTarget`,
//! `disableViewportResize`): rebinds the scroll source to the
//! window/document scroller instead of `.vlist-viewport`, and stops the
//! viewport's own `ResizeObserver` from driving container dimensions
//! (the window's `resize` event does that instead, at the materializer
//! layer).

use crate::context::{ScrollTarget, VListContext};
use crate::feature::Feature;

#[derive(Default)]
pub struct WindowMode;

impl WindowMode {
    pub fn new() -> Self {
        WindowMode
    }
}

impl<T: 'static> Feature<T> for WindowMode {
    fn name(&self) -> &'static str {
        "window-mode"
    }

    fn priority(&self) -> i32 {
        // Early: later features should see the final scroll target and
        // container dimensions, not the viewport-bound defaults.
        10
    }

    fn setup(&mut self, ctx: &mut VListContext<T>) {
        ctx.scroll.set_window_mode();
        ctx.set_scroll_target(ScrollTarget::Window);
        ctx.disable_viewport_resize();

        if let Some(window) = web_sys::window() {
            let width = window.inner_width().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            let height = window.inner_height().ok().and_then(|v| v.as_f64()).unwrap_or(0.0);
            ctx.set_container_dimensions(width, height);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn runs_before_most_features() {
        let w = WindowMode::new();
        assert!(<WindowMode as Feature<()>>::priority(&w) < 50);
    }
}
