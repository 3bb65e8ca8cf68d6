//! The mutable handle passed to every feature during setup (spec §3
//! `BuilderContext`, §6.5 composition seams).
//!
//! Cyclic references are avoided the way spec §9 asks: features are
//! handed a short-lived `&mut VListContext<T>` only inside `setup`/
//! `destroy`; afterwards they interact solely through the hook arrays and
//! method slots they registered, never through a stored back-reference.
//! Every hook array closure therefore takes `&mut VListContext<T>` as its
//! first argument rather than capturing one: the materializer, which owns
//! the single `Rc<RefCell<VListContext<T>>>`, borrows it and threads it
//! through at dispatch time.

use std::any::Any;
use std::cell::RefCell;
use std::collections::HashMap;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Element, KeyboardEvent, MouseEvent};

use crate::compression::CompressionState;
use crate::config::VListConfig;
use crate::data::DataManager;
use crate::range::{Align, Direction, Range};
use crate::renderer::{ItemIds, PositionFn, Renderer};
use crate::scroll::{Orientation, ScrollController};
use crate::size_cache::{SizeCache, SizeSpec};
use crate::template::TemplateFn;
use crate::viewport::{VisibleRangeFn, ViewportState};

/// Events emitted by the core (spec §6.3).
#[derive(Clone, Debug)]
pub enum VListEvent {
    RangeChange { range: Range },
    Scroll { pos: f64, direction: Direction, velocity: f64 },
    Resize { width: f64, height: f64 },
    ItemClick { index: usize },
    SelectionChange { selected: Vec<String> },
    LoadStart,
    LoadEnd,
    Error { message: String },
}

type Listener = Rc<dyn Fn(&VListEvent)>;

/// A minimal pub/sub emitter; `on` returns a token `off` can later remove.
#[derive(Default)]
pub struct EventEmitter {
    next_id: u32,
    listeners: Vec<(u32, Listener)>,
}

impl EventEmitter {
    pub fn on(&mut self, f: Listener) -> u32 {
        let id = self.next_id;
        self.next_id += 1;
        self.listeners.push((id, f));
        id
    }

    pub fn off(&mut self, id: u32) {
        self.listeners.retain(|(existing, _)| *existing != id);
    }

    pub fn emit(&self, event: VListEvent) {
        for (_, listener) in &self.listeners {
            listener(&event);
        }
    }
}

/// Where scroll position currently comes from.
#[derive(Clone)]
pub enum ScrollTarget {
    Element(Element),
    Window,
}

/// Render-pipeline step, re-armable by features ("wrap previous, replace",
/// spec §4.7 "Render pipeline"). Takes `&mut` since it both reads viewport/
/// scroll state and mutates the renderer.
pub type RenderFn<T> = Rc<dyn Fn(&mut VListContext<T>)>;
pub type ScrollToPosFn =
    Rc<dyn Fn(usize, &SizeCache, f64, usize, &CompressionState, Align) -> f64>;
/// Per-index `(selected, focused)` classifier, overlaid onto every
/// rendered item (selection's seam into the render loop).
pub type ClassifyFn = Rc<dyn Fn(usize) -> (bool, bool)>;
/// Reads the current scroll position through whatever source a feature
/// has installed (spec §6.5 `setScrollFns(get, set)`); defaults to
/// [`ScrollController::get_scroll_top`].
pub type ScrollGetFn = Rc<dyn Fn(&ScrollController) -> f64>;
/// Writes a new scroll position and returns the clamped value actually
/// applied; defaults to [`ScrollController::scroll_to`].
pub type ScrollSetFn = Rc<dyn Fn(&mut ScrollController, f64) -> f64>;

/// Adapter letting [`Renderer`] query stable ids through a type-erased
/// `Rc<RefCell<dyn DataManager<T>>>` without making the renderer itself
/// generic over `T`.
struct DataManagerIds<T> {
    data: Rc<RefCell<dyn DataManager<T>>>,
}

impl<T> ItemIds for DataManagerIds<T> {
    fn id_at(&self, index: usize) -> Option<String> {
        self.data.borrow().id_at(index)
    }
}

/// The mutable handle every [`crate::feature::Feature`] receives during
/// `setup`/`destroy`, and the materializer drives on every render tick.
pub struct VListContext<T: 'static> {
    pub root: Element,
    pub viewport_el: Element,
    pub content_el: Element,
    pub items_el: Element,
    pub header_el: Option<Element>,

    pub config: VListConfig,
    pub size_cache: SizeCache,
    pub viewport: ViewportState,
    pub compression: CompressionState,
    pub scroll: ScrollController,
    pub renderer: Renderer,
    pub data: Rc<RefCell<dyn DataManager<T>>>,
    pub emitter: EventEmitter,

    pub is_destroyed: bool,

    template: TemplateFn,
    virtual_total_fn: Option<Rc<dyn Fn() -> usize>>,
    classify_fn: Option<ClassifyFn>,
    visible_range_fn: Rc<VisibleRangeFn>,
    scroll_to_pos_fn: ScrollToPosFn,
    scroll_get_fn: ScrollGetFn,
    scroll_set_fn: ScrollSetFn,
    scroll_target: ScrollTarget,
    container_dims: (f64, f64),
    disable_viewport_resize: bool,
    /// `true` once a feature has called [`VListContext::set_position_element_fn`]
    /// (e.g. Grid's row/col layout) — `core_render` must then leave the
    /// renderer's position function alone instead of reinstalling the
    /// plain-list/compressed default on every tick.
    position_fn_overridden: bool,

    render_if_needed: Option<RenderFn<T>>,
    force_render: Option<RenderFn<T>>,

    pub after_scroll: Vec<Rc<dyn Fn(&mut VListContext<T>, f64, Direction)>>,
    pub click_handlers: Vec<Rc<dyn Fn(&mut VListContext<T>, &MouseEvent)>>,
    pub keydown_handlers: Vec<Rc<dyn Fn(&mut VListContext<T>, &KeyboardEvent)>>,
    pub resize_handlers: Vec<Rc<dyn Fn(&mut VListContext<T>, f64, f64)>>,
    pub content_size_handlers: Vec<Rc<dyn Fn(&mut VListContext<T>, f64)>>,
    pub destroy_handlers: Vec<Rc<dyn Fn(&mut VListContext<T>)>>,

    methods: HashMap<&'static str, Box<dyn Any>>,
}

impl<T: 'static> VListContext<T> {
    #[allow(clippy::too_many_arguments)]
    pub(crate) fn new(
        root: Element,
        viewport_el: Element,
        content_el: Element,
        items_el: Element,
        config: VListConfig,
        size_cache: SizeCache,
        scroll: ScrollController,
        renderer: Renderer,
        data: Rc<RefCell<dyn DataManager<T>>>,
        template: TemplateFn,
    ) -> Self {
        VListContext {
            root,
            viewport_el,
            content_el,
            items_el,
            header_el: None,
            config,
            size_cache,
            viewport: ViewportState::default(),
            compression: CompressionState::NONE,
            scroll,
            renderer,
            data,
            emitter: EventEmitter::default(),
            is_destroyed: false,
            template,
            virtual_total_fn: None,
            classify_fn: None,
            visible_range_fn: Rc::new(crate::viewport::simple_visible_range),
            scroll_to_pos_fn: Rc::new(crate::viewport::simple_scroll_to_index),
            scroll_get_fn: Rc::new(ScrollController::get_scroll_top),
            scroll_set_fn: Rc::new(ScrollController::scroll_to),
            scroll_target: ScrollTarget::Window,
            container_dims: (0.0, 0.0),
            disable_viewport_resize: false,
            position_fn_overridden: false,
            render_if_needed: None,
            force_render: None,
            after_scroll: Vec::new(),
            click_handlers: Vec::new(),
            keydown_handlers: Vec::new(),
            resize_handlers: Vec::new(),
            content_size_handlers: Vec::new(),
            destroy_handlers: Vec::new(),
            methods: HashMap::new(),
        }
    }

    /// Total item count, via the feature-installed override if one was
    /// set (async-data uses this for "more pages than currently loaded"),
    /// falling back to the data manager's length.
    pub fn total_items(&self) -> usize {
        match &self.virtual_total_fn {
            Some(f) => f(),
            None => self.data.borrow().len(),
        }
    }

    pub fn set_virtual_total_fn(&mut self, f: Rc<dyn Fn() -> usize>) {
        self.virtual_total_fn = Some(f);
    }

    pub fn set_size_config(&mut self, spec: SizeSpec) {
        self.config.item.size = spec;
        let total = self.total_items();
        self.size_cache.set_spec(self.config.item.size.clone());
        self.size_cache.rebuild(total);
        self.update_compression_mode();
    }

    /// Rebuild the size cache for the current (or an explicitly supplied)
    /// total, then refresh derived compression state and notify
    /// `content_size_handlers` (spec §4.7 step 5 / §5 "shared resources").
    pub fn rebuild_size_cache(&mut self, total: Option<usize>) {
        let total = total.unwrap_or_else(|| self.total_items());
        self.size_cache.rebuild(total);
        self.update_compression_mode();
    }

    /// Explicitly set the tracked content size without touching the size
    /// spec (used when a feature knows the total changed but the size
    /// function does not — e.g. async-data appending a page).
    pub fn update_content_size(&mut self, total: usize) {
        self.rebuild_size_cache(Some(total));
    }

    /// Recompute [`CompressionState`] from the current size cache and
    /// drive the scroll controller's native/manual transition plus the
    /// renderer's positioning function accordingly (spec §4.3 "State
    /// transitions", §4.4 mode machine).
    pub fn update_compression_mode(&mut self) {
        let total = self.total_items();
        let new_comp = CompressionState::derive(total, &self.size_cache);
        let was_compressed = self.compression.is_compressed;
        self.compression = new_comp;

        if new_comp.is_compressed && !was_compressed {
            let native_scroll = self.get_scroll_pos();
            let native_max = self.scroll.max_scroll();
            let transition = crate::compression::CompressionTransition::enter(native_scroll, native_max);
            let initial =
                transition.initial_compressed_scroll(new_comp.virtual_size, self.container_dims.1);
            self.scroll.enable_compression(initial);
        } else if !new_comp.is_compressed && was_compressed {
            self.scroll.disable_compression(0.0);
        }

        let main_axis_container = match self.config.orientation {
            Orientation::Vertical => self.container_dims.1,
            Orientation::Horizontal => self.container_dims.0,
        };
        let scroll_space = if new_comp.is_compressed {
            new_comp.virtual_size
        } else {
            self.size_cache.get_total_size()
        };
        self.scroll.set_max_scroll((scroll_space - main_axis_container).max(0.0));

        if let Some(html_el) = self.content_el.dyn_ref::<web_sys::HtmlElement>() {
            let prop = match self.config.orientation {
                Orientation::Vertical => "height",
                Orientation::Horizontal => "width",
            };
            let _ = html_el.style().set_property(prop, &format!("{scroll_space}px"));
        }

        let size = new_comp.virtual_size;
        for handler in self.content_size_handlers.clone() {
            handler(self, size);
        }
    }

    pub fn set_visible_range_fn(&mut self, f: Rc<VisibleRangeFn>) {
        self.visible_range_fn = f;
    }

    pub fn visible_range_fn(&self) -> Rc<VisibleRangeFn> {
        self.visible_range_fn.clone()
    }

    pub fn set_scroll_to_pos_fn(&mut self, f: ScrollToPosFn) {
        self.scroll_to_pos_fn = f;
    }

    pub fn scroll_to_pos_fn(&self) -> ScrollToPosFn {
        self.scroll_to_pos_fn.clone()
    }

    /// Install a feature's own `(get, set)` pair for scroll position (spec
    /// §6.5 `setScrollFns`) — e.g. a feature driving scroll from a source
    /// other than [`ScrollController`]'s own mode machine.
    pub fn set_scroll_fns(&mut self, get: ScrollGetFn, set: ScrollSetFn) {
        self.scroll_get_fn = get;
        self.scroll_set_fn = set;
    }

    /// Current scroll position, through whatever `scroll_get_fn` is
    /// currently installed.
    pub fn get_scroll_pos(&self) -> f64 {
        (self.scroll_get_fn)(&self.scroll)
    }

    /// Write a new scroll position through the currently installed
    /// `scroll_set_fn`, returning the value actually applied.
    pub fn set_scroll_pos(&mut self, pos: f64) -> f64 {
        let f = self.scroll_set_fn.clone();
        f(&mut self.scroll, pos)
    }

    /// Swap in a different [`Renderer`] outright (spec §6.5
    /// `replaceRenderer`) — e.g. a feature that needs a renderer with
    /// different pooling/positioning internals than the core's default.
    pub fn replace_renderer(&mut self, renderer: Renderer) {
        self.renderer = renderer;
    }

    /// Swap in a different [`DataManager`] backing the list's items (spec
    /// §6.5 `replaceDataManager`) — e.g. a paged/async-backed manager
    /// instead of the default [`crate::data::VecDataManager`].
    pub fn replace_data_manager(&mut self, data: Rc<RefCell<dyn DataManager<T>>>) {
        self.data = data;
    }

    /// Swap in a different [`ScrollController`] outright (spec §6.5
    /// `replaceScrollController`) — the new controller's mode/max-scroll
    /// bookkeeping takes over entirely; `scroll_get_fn`/`scroll_set_fn`
    /// keep operating on whatever controller is current.
    pub fn replace_scroll_controller(&mut self, scroll: ScrollController) {
        self.scroll = scroll;
    }

    /// Install selection's `(selected, focused)` overlay (spec §6.5
    /// selection feature's seam into the render loop).
    pub fn set_classify_fn(&mut self, f: ClassifyFn) {
        self.classify_fn = Some(f);
    }

    pub fn classify_fn(&self) -> Option<ClassifyFn> {
        self.classify_fn.clone()
    }

    /// Replace the renderer's positioning function outright (grid's seam).
    /// Marks the position function as feature-owned so `core_render` stops
    /// reinstalling its own list-mode/compressed default every tick.
    pub fn set_position_element_fn(&mut self, f: PositionFn) {
        self.position_fn_overridden = true;
        self.renderer.set_position_fn(f);
    }

    pub fn set_scroll_target(&mut self, target: ScrollTarget) {
        self.scroll_target = target;
    }

    pub fn scroll_target(&self) -> &ScrollTarget {
        &self.scroll_target
    }

    pub fn set_container_dimensions(&mut self, width: f64, height: f64) {
        self.container_dims = (width, height);
        let main_axis = match self.config.orientation {
            Orientation::Vertical => height,
            Orientation::Horizontal => width,
        };
        self.viewport.container_size = main_axis;
        self.update_compression_mode();
    }

    pub fn container_dimensions(&self) -> (f64, f64) {
        self.container_dims
    }

    pub fn disable_viewport_resize(&mut self) {
        self.disable_viewport_resize = true;
    }

    pub fn viewport_resize_disabled(&self) -> bool {
        self.disable_viewport_resize
    }

    pub fn replace_template(&mut self, template: TemplateFn) {
        self.template = template.clone();
        self.renderer.set_template(template);
    }

    pub fn template(&self) -> TemplateFn {
        self.template.clone()
    }

    /// Replace the `(renderIfNeeded, forceRender)` pair (spec §4.7
    /// "Render pipeline"). Called once at setup time per feature that
    /// wraps rendering; never re-sorted afterward.
    pub fn set_render_fns(&mut self, render_if_needed: RenderFn<T>, force_render: RenderFn<T>) {
        self.render_if_needed = Some(render_if_needed);
        self.force_render = Some(force_render);
    }

    pub fn render_fns(&self) -> (Option<RenderFn<T>>, Option<RenderFn<T>>) {
        (self.render_if_needed.clone(), self.force_render.clone())
    }

    /// Install a feature-contributed method under `name` (spec §6.4
    /// "Feature-contributed methods ... installed via `ctx.methods`").
    pub fn set_method(&mut self, name: &'static str, f: Box<dyn Any>) {
        self.methods.insert(name, f);
    }

    pub fn method(&self, name: &str) -> Option<&Box<dyn Any>> {
        self.methods.get(name)
    }

    /// Run the installed render pipeline (or the core default if no
    /// feature replaced it) for the current range.
    pub fn run_render_if_needed(ctx: &mut Self) {
        if let Some(f) = ctx.render_if_needed.clone() {
            f(ctx);
        } else {
            core_render(ctx);
        }
    }

    pub fn run_force_render(ctx: &mut Self) {
        if let Some(f) = ctx.force_render.clone() {
            f(ctx);
        } else {
            core_render(ctx);
        }
    }
}

/// The core's own render step: recompute viewport ranges, hand the
/// renderer the resulting range plus a stable-id adapter over the data
/// manager. This is what `render_if_needed`/`force_render` default to
/// before any feature wraps them.
pub fn core_render<T: 'static>(ctx: &mut VListContext<T>) {
    let total = ctx.total_items();
    let visible_range_fn = ctx.visible_range_fn();
    ctx.viewport.recompute(
        &ctx.size_cache,
        total,
        &ctx.compression,
        ctx.config.overscan,
        visible_range_fn.as_ref(),
    );

    if !ctx.position_fn_overridden {
        let position_fn = default_position_fn(ctx, total);
        ctx.renderer.set_position_fn(position_fn);
    }

    let ids = DataManagerIds { data: ctx.data.clone() };
    let range = ctx.viewport.render_range;
    let classify = ctx
        .classify_fn
        .clone()
        .unwrap_or_else(|| Rc::new(|_| (false, false)) as ClassifyFn);
    let mut errors = Vec::new();
    ctx.renderer.render(range, &ids, Some(total), classify.as_ref(), |err| {
        log::error!("{err}");
        errors.push(err.to_string());
    });
    for message in errors {
        ctx.emitter.emit(VListEvent::Error { message });
    }

    ctx.emitter.emit(VListEvent::RangeChange { range });
}

/// Build the list-mode positioning closure for the current tick:
/// absolute offset when native-scrolled (the browser moves the viewport
/// over the content), viewport-relative [`crate::compression::compressed_item_position`]
/// once compressed (spec §4.3 "no real scroll container exists past MAX").
/// Grid mode replaces this wholesale via `set_position_element_fn`.
fn default_position_fn<T: 'static>(ctx: &VListContext<T>, total: usize) -> PositionFn {
    let sc = ctx.size_cache.clone();
    let comp = ctx.compression;
    let orientation = ctx.config.orientation;
    if comp.is_compressed {
        let scroll = ctx.get_scroll_pos();
        let container = ctx.viewport.container_size;
        Box::new(move |i| {
            let main = crate::compression::compressed_item_position(i, scroll, container, &sc, total, &comp);
            match orientation {
                Orientation::Vertical => (0.0, main),
                Orientation::Horizontal => (main, 0.0),
            }
        })
    } else {
        Box::new(move |i| {
            let main = sc.get_offset(i);
            match orientation {
                Orientation::Vertical => (0.0, main),
                Orientation::Horizontal => (main, 0.0),
            }
        })
    }
}
