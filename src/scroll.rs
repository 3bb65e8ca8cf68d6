//! Scroll position state machine: `Native` (browser scrolls an
//! `overflow: auto` container), `Manual` (overflow hidden, wheel-driven —
//! used once compressed), and `Window` (the global scroller drives the
//! list; compression there stays purely mathematical, spec §4.4).
//!
//! RAF throttling, idle-timer scheduling and DOM listener attachment are
//! deliberately kept out of this module (see [`crate::component`]) so the
//! state machine itself stays plain data, testable without a browser.

use web_sys::Element;

use crate::range::{clamp_scroll_position, get_scroll_direction, Direction};
use crate::velocity::VelocityTracker;

/// Default debounce/idle window after the last scroll tick (ms).
pub const DEFAULT_IDLE_TIMEOUT_MS: u32 = 150;
/// Default smooth-scroll animation duration (ms).
pub const DEFAULT_SMOOTH_DURATION_MS: u32 = 300;
/// Default wheel sensitivity multiplier.
pub const DEFAULT_WHEEL_SENSITIVITY: f64 = 1.0;

/// Which scroll position source drives the list.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ScrollMode {
    /// The browser scrolls an `overflow: auto` container.
    Native,
    /// `overflow: hidden`; wheel events update an internal counter.
    Manual,
    /// The window/document scroller drives the list.
    Window,
}

/// Scroll axis. Horizontal mode swaps `scrollTop<->scrollLeft`,
/// `height<->width`, `clientHeight<->clientWidth` (spec §4.4).
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Orientation {
    Vertical,
    Horizontal,
}

/// What a wheel event should do, decided by [`ScrollController::apply_wheel`].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelAction {
    /// Let the browser handle it (native scrolling on the main axis).
    PassThrough,
    /// The controller moved the scroll position; caller should `prevent_default`.
    Handled,
    /// Wheel is disabled; caller should `prevent_default` and do nothing.
    Swallowed,
}

/// Owns a scroll position source and emits throttled, velocity-annotated
/// updates. All operations are infallible; invalid positions are clamped
/// (spec §4.4 "Failure semantics").
#[derive(Debug)]
pub struct ScrollController {
    mode: ScrollMode,
    orientation: Orientation,
    native_el: Option<Element>,
    /// Authoritative position for `Manual`/`Window`; best-effort mirror for `Native`.
    scroll_pos: f64,
    max_scroll: f64,
    container_size: f64,
    velocity: VelocityTracker,
    wheel_enabled: bool,
    wheel_sensitivity: f64,
    idle_timeout_ms: u32,
}

impl ScrollController {
    /// A controller starting in `Native` mode (spec §4.4 "Initial mode is
    /// Native unless window mode is requested").
    pub fn new(orientation: Orientation) -> Self {
        ScrollController {
            mode: ScrollMode::Native,
            orientation,
            native_el: None,
            scroll_pos: 0.0,
            max_scroll: 0.0,
            container_size: 0.0,
            velocity: VelocityTracker::new(),
            wheel_enabled: true,
            wheel_sensitivity: DEFAULT_WHEEL_SENSITIVITY,
            idle_timeout_ms: DEFAULT_IDLE_TIMEOUT_MS,
        }
    }

    /// Construct directly in `Window` mode.
    pub fn new_window(orientation: Orientation) -> Self {
        let mut ctl = Self::new(orientation);
        ctl.mode = ScrollMode::Window;
        ctl
    }

    pub fn mode(&self) -> ScrollMode {
        self.mode
    }

    pub fn orientation(&self) -> Orientation {
        self.orientation
    }

    pub fn idle_timeout_ms(&self) -> u32 {
        self.idle_timeout_ms
    }

    pub fn set_idle_timeout_ms(&mut self, ms: u32) {
        self.idle_timeout_ms = ms;
    }

    pub fn set_wheel_enabled(&mut self, enabled: bool) {
        self.wheel_enabled = enabled;
    }

    pub fn set_wheel_sensitivity(&mut self, sensitivity: f64) {
        self.wheel_sensitivity = sensitivity;
    }

    /// Bind (or clear) the native `overflow: auto` element. Required
    /// before `Native`-mode `get_scroll_top`/`scroll_to` do anything real.
    pub fn set_native_element(&mut self, el: Option<Element>) {
        self.native_el = el;
    }

    /// Recompute `maxScroll` (spec §4.4 `updateContainerHeight`). The
    /// browser clamps its own scrollbar for `Native` mode regardless, but
    /// `max_scroll` is kept in sync there too since `scroll_to`/`scroll_by`
    /// report their clamped result from this field and native horizontal
    /// wheel translation goes through `scroll_by`.
    pub fn update_container_height(&mut self, container_size: f64, content_size: f64) {
        self.container_size = container_size.max(0.0);
        self.max_scroll = (content_size - self.container_size).max(0.0);
    }

    /// Directly set the clamp bound (used by the compression feature,
    /// which computes `max_scroll` from the virtual size).
    pub fn set_max_scroll(&mut self, max_scroll: f64) {
        self.max_scroll = max_scroll.max(0.0);
    }

    pub fn max_scroll(&self) -> f64 {
        self.max_scroll
    }

    /// Current scroll position. `Native` mode reads the live DOM value
    /// when bound; otherwise returns the internal counter.
    pub fn get_scroll_top(&self) -> f64 {
        match self.mode {
            ScrollMode::Native => match &self.native_el {
                Some(el) if self.orientation == Orientation::Horizontal => el.scroll_left() as f64,
                Some(el) => el.scroll_top() as f64,
                None => self.scroll_pos,
            },
            ScrollMode::Manual | ScrollMode::Window => self.scroll_pos,
        }
    }

    /// Clamp `pos` to `[0, max_scroll]` and apply it to the current
    /// source. Returns the clamped value actually applied.
    pub fn scroll_to(&mut self, pos: f64) -> f64 {
        let clamped = clamp_scroll_position(pos, self.max_scroll);
        match self.mode {
            ScrollMode::Native => {
                if let Some(el) = &self.native_el {
                    if self.orientation == Orientation::Horizontal {
                        el.set_scroll_left(clamped as i32);
                    } else {
                        el.set_scroll_top(clamped as i32);
                    }
                }
                self.scroll_pos = clamped;
            }
            ScrollMode::Manual | ScrollMode::Window => {
                self.scroll_pos = clamped;
            }
        }
        clamped
    }

    pub fn scroll_by(&mut self, delta: f64) -> f64 {
        self.scroll_to(self.get_scroll_top() + delta)
    }

    pub fn is_at_top(&self, threshold: f64) -> bool {
        self.get_scroll_top() <= threshold
    }

    pub fn is_at_bottom(&self, threshold: f64) -> bool {
        (self.max_scroll - self.get_scroll_top()) <= threshold
    }

    pub fn get_velocity(&self) -> f64 {
        self.velocity.get_velocity()
    }

    pub fn is_tracking(&self) -> bool {
        self.velocity.is_tracking()
    }

    /// Switch `Native -> Manual`. No-op in `Window` mode, where
    /// compression stays purely mathematical and the browser keeps
    /// scrolling the window natively (spec §4.4).
    pub fn enable_compression(&mut self, initial_scroll: f64) {
        if self.mode == ScrollMode::Native {
            self.mode = ScrollMode::Manual;
            self.scroll_pos = initial_scroll;
        }
    }

    /// Switch `Manual -> Native`, seeding the restored native position.
    /// Caller is responsible for actually writing `restored_scroll` to
    /// the bound native element once it is re-attached.
    pub fn disable_compression(&mut self, restored_scroll: f64) {
        if self.mode == ScrollMode::Manual {
            self.mode = ScrollMode::Native;
            self.scroll_pos = restored_scroll;
        }
    }

    /// Rebind the scroll target to the window (used by the window-mode
    /// feature). Cancels whatever the native element was tracking.
    pub fn set_window_mode(&mut self) {
        self.mode = ScrollMode::Window;
        self.native_el = None;
    }

    /// Process one throttled scroll tick: update velocity, compute
    /// direction, and (for `Manual`/`Window`) commit the clamped
    /// position. Returns `(direction, velocity)` for the caller to emit
    /// as the `scroll` event payload.
    pub fn process_tick(&mut self, new_pos: f64, now_ms: f64) -> (Direction, f64) {
        let old = self.get_scroll_top();
        if self.mode != ScrollMode::Native {
            self.scroll_pos = clamp_scroll_position(new_pos, self.max_scroll);
        }
        let current = self.get_scroll_top();
        self.velocity.update(current, now_ms);
        (get_scroll_direction(old, current), self.velocity.get_velocity())
    }

    /// Called when the idle timer fires: reset velocity tracking.
    pub fn on_idle(&mut self) {
        self.velocity.reset();
    }

    /// Decide what a wheel event should do per spec §4.4 "Wheel policy".
    pub fn apply_wheel(&mut self, delta_x: f64, delta_y: f64) -> WheelAction {
        match self.mode {
            ScrollMode::Manual => {
                if !self.wheel_enabled {
                    return WheelAction::Swallowed;
                }
                let raw = match self.orientation {
                    Orientation::Horizontal if delta_x != 0.0 => delta_x,
                    Orientation::Horizontal => delta_y,
                    Orientation::Vertical => delta_y,
                };
                self.scroll_by(raw * self.wheel_sensitivity);
                WheelAction::Handled
            }
            ScrollMode::Native | ScrollMode::Window => match self.orientation {
                Orientation::Vertical => WheelAction::PassThrough,
                Orientation::Horizontal => {
                    if delta_x == 0.0 {
                        self.scroll_by(delta_y);
                        WheelAction::Handled
                    } else {
                        WheelAction::PassThrough
                    }
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_native_unless_window_requested() {
        let ctl = ScrollController::new(Orientation::Vertical);
        assert_eq!(ctl.mode(), ScrollMode::Native);
        let win = ScrollController::new_window(Orientation::Vertical);
        assert_eq!(win.mode(), ScrollMode::Window);
    }

    #[test]
    fn scroll_to_clamps_to_max_scroll() {
        let mut ctl = ScrollController::new_window(Orientation::Vertical);
        ctl.set_max_scroll(500.0);
        assert_eq!(ctl.scroll_to(-100.0), 0.0);
        assert_eq!(ctl.scroll_to(10_000.0), 500.0);
        assert_eq!(ctl.scroll_to(250.0), 250.0);
    }

    #[test]
    fn compression_mode_transitions_are_idempotent_and_window_is_noop() {
        let mut ctl = ScrollController::new(Orientation::Vertical);
        ctl.enable_compression(42.0);
        assert_eq!(ctl.mode(), ScrollMode::Manual);
        assert_eq!(ctl.get_scroll_top(), 42.0);
        ctl.enable_compression(99.0); // idempotent: already Manual
        assert_eq!(ctl.get_scroll_top(), 42.0);
        ctl.disable_compression(10.0);
        assert_eq!(ctl.mode(), ScrollMode::Native);

        let mut win = ScrollController::new_window(Orientation::Vertical);
        win.enable_compression(42.0);
        assert_eq!(win.mode(), ScrollMode::Window, "window mode ignores compression transitions");
    }

    #[test]
    fn manual_wheel_is_captured_and_respects_enabled_flag() {
        let mut ctl = ScrollController::new(Orientation::Vertical);
        ctl.enable_compression(0.0);
        ctl.set_max_scroll(1000.0);
        assert_eq!(ctl.apply_wheel(0.0, 20.0), WheelAction::Handled);
        assert_eq!(ctl.get_scroll_top(), 20.0);

        ctl.set_wheel_enabled(false);
        assert_eq!(ctl.apply_wheel(0.0, 20.0), WheelAction::Swallowed);
        assert_eq!(ctl.get_scroll_top(), 20.0, "swallowed wheel must not move the position");
    }

    #[test]
    fn native_vertical_wheel_passes_through() {
        let mut ctl = ScrollController::new(Orientation::Vertical);
        assert_eq!(ctl.apply_wheel(0.0, 20.0), WheelAction::PassThrough);
    }

    #[test]
    fn native_horizontal_wheel_translates_deltay_only_without_deltax() {
        let mut ctl = ScrollController::new(Orientation::Horizontal);
        ctl.set_max_scroll(1000.0);
        assert_eq!(ctl.apply_wheel(5.0, 20.0), WheelAction::PassThrough);
        assert_eq!(ctl.apply_wheel(0.0, 20.0), WheelAction::Handled);
        assert_eq!(ctl.get_scroll_top(), 20.0);
    }

    #[test]
    fn process_tick_reports_direction_and_velocity() {
        let mut ctl = ScrollController::new_window(Orientation::Vertical);
        ctl.set_max_scroll(1000.0);
        let (dir, _v) = ctl.process_tick(0.0, 0.0);
        assert_eq!(dir, Direction::Down);
        let (dir, v) = ctl.process_tick(100.0, 16.0);
        assert_eq!(dir, Direction::Down);
        assert!(v > 0.0);
        let (dir, _v) = ctl.process_tick(50.0, 32.0);
        assert_eq!(dir, Direction::Up);
    }

    #[test]
    fn on_idle_resets_velocity_tracking() {
        let mut ctl = ScrollController::new_window(Orientation::Vertical);
        ctl.set_max_scroll(1000.0);
        ctl.process_tick(0.0, 0.0);
        ctl.process_tick(10.0, 16.0);
        assert!(ctl.is_tracking());
        ctl.on_idle();
        assert!(!ctl.is_tracking());
        assert_eq!(ctl.get_velocity(), 0.0);
    }

    #[test]
    fn is_at_top_and_bottom_use_threshold() {
        let mut ctl = ScrollController::new_window(Orientation::Vertical);
        ctl.set_max_scroll(1000.0);
        ctl.scroll_to(2.0);
        assert!(ctl.is_at_top(5.0));
        ctl.scroll_to(997.0);
        assert!(ctl.is_at_bottom(5.0));
    }
}
