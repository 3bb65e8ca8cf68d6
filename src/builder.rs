//! `VListBuilder`: accumulates feature descriptors and materializes the
//! DOM skeleton, core objects, and context (spec §4.7 "Builder").

use std::cell::RefCell;
use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::{Document, Element};

use crate::config::VListConfig;
use crate::context::{ScrollTarget, VListContext};
use crate::data::{DataManager, VecDataManager};
use crate::error::VListError;
use crate::feature::{validate_and_sort, Feature};
use crate::pool::ElementPool;
use crate::range::Align;
use crate::renderer::Renderer;
use crate::scroll::{Orientation, ScrollController};
use crate::size_cache::{SizeCache, SizeSpec};
use crate::template::{TemplateFn, TemplateOutput};

/// Accumulates configuration and features, then materializes one list
/// instance. Mirrors the teacher's own builder-less-but-fluent `VirtualList`
/// props in spirit; this crate's composition is explicit because multiple
/// independent features need a registration point the teacher never had.
pub struct VListBuilder<T: 'static> {
    config: VListConfig,
    features: Vec<Box<dyn Feature<T>>>,
    items: Vec<T>,
    id_fn: Rc<dyn Fn(&T, usize) -> String>,
    template: Option<TemplateFn>,
}

impl<T: 'static> VListBuilder<T> {
    pub fn new(id_fn: Rc<dyn Fn(&T, usize) -> String>) -> Self {
        VListBuilder {
            config: VListConfig::default(),
            features: Vec::new(),
            items: Vec::new(),
            id_fn,
            template: None,
        }
    }

    pub fn items(mut self, items: Vec<T>) -> Self {
        self.items = items;
        self
    }

    pub fn item_size(mut self, spec: SizeSpec) -> Self {
        self.config.item.size = spec;
        self
    }

    pub fn template(mut self, template: TemplateFn) -> Self {
        self.template = Some(template);
        self
    }

    pub fn overscan(mut self, overscan: usize) -> Self {
        self.config.overscan = overscan;
        self
    }

    pub fn class_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.config.class_prefix = prefix.into();
        self
    }

    pub fn aria_label(mut self, label: impl Into<String>) -> Self {
        self.config.aria_label = Some(label.into());
        self
    }

    pub fn orientation(mut self, orientation: Orientation) -> Self {
        self.config.orientation = orientation;
        self
    }

    pub fn reverse(mut self, reverse: bool) -> Self {
        self.config.reverse = reverse;
        self
    }

    pub fn wheel_enabled(mut self, enabled: bool) -> Self {
        self.config.scroll.wheel_enabled = enabled;
        self
    }

    pub fn wheel_sensitivity(mut self, sensitivity: f64) -> Self {
        self.config.scroll.wheel_sensitivity = sensitivity;
        self
    }

    pub fn idle_timeout_ms(mut self, ms: u32) -> Self {
        self.config.scroll.idle_timeout_ms = ms;
        self
    }

    pub fn use_window_scroll(mut self, use_window: bool) -> Self {
        self.config.scroll.use_window = use_window;
        self
    }

    pub fn use_feature(mut self, feature: Box<dyn Feature<T>>) -> Self {
        self.features.push(feature);
        self
    }

    /// Materialize the list into `container` (spec §4.7 steps 1-7).
    pub fn build(
        self,
        document: &Document,
        container: &Element,
    ) -> Result<VListHandle<T>, VListError> {
        if self.config.reverse && self.features.iter().any(|f| f.name() == "grid") {
            return Err(VListError::GridReverseConflict);
        }
        let mut features = validate_and_sort(self.features)?;

        let prefix = self.config.class_prefix.clone();
        let root = document
            .create_element("div")
            .map_err(|_| VListError::MissingBrowserApi("document.createElement"))?;
        root.set_class_name(&prefix);
        root.set_attribute("role", "listbox").ok();
        root.set_attribute("tabindex", "0").ok();
        if let Some(label) = &self.config.aria_label {
            root.set_attribute("aria-label", label).ok();
        }

        let viewport_el = document
            .create_element("div")
            .map_err(|_| VListError::MissingBrowserApi("document.createElement"))?;
        viewport_el.set_class_name(&format!("{prefix}-viewport"));
        set_style(&viewport_el, "overflow:auto;height:100%;width:100%;position:relative;");

        let content_el = document
            .create_element("div")
            .map_err(|_| VListError::MissingBrowserApi("document.createElement"))?;
        content_el.set_class_name(&format!("{prefix}-content"));
        set_style(&content_el, "position:relative;");

        let items_el = document
            .create_element("div")
            .map_err(|_| VListError::MissingBrowserApi("document.createElement"))?;
        items_el.set_class_name(&format!("{prefix}-items"));
        set_style(&items_el, "position:relative;");

        content_el.append_child(&items_el).ok();
        viewport_el.append_child(&content_el).ok();
        root.append_child(&viewport_el).ok();
        container.append_child(&root).ok();

        let total = self.items.len();
        let size_cache = SizeCache::new(self.config.item.size.clone(), total);
        let scroll = if self.config.scroll.use_window {
            ScrollController::new_window(self.config.orientation)
        } else {
            let mut sc = ScrollController::new(self.config.orientation);
            sc.set_native_element(Some(viewport_el.clone()));
            sc.set_wheel_enabled(self.config.scroll.wheel_enabled);
            sc.set_wheel_sensitivity(self.config.scroll.wheel_sensitivity);
            sc.set_idle_timeout_ms(self.config.scroll.idle_timeout_ms);
            sc
        };

        let pool = ElementPool::new(document.clone(), "div", "option", crate::config::DEFAULT_POOL_CAP);
        let orientation = self.config.orientation;
        let template = self.template.unwrap_or_else(default_template);
        let renderer = Renderer::new(
            document.clone(),
            items_el.clone(),
            pool,
            template.clone(),
            Box::new(move |i| default_position(i, orientation, 0.0)),
            prefix.clone(),
            prefix.clone(),
        );

        let data: Rc<RefCell<dyn DataManager<T>>> =
            Rc::new(RefCell::new(VecDataManager::new(self.items, self.id_fn)));

        let mut ctx = VListContext::new(
            root.clone(),
            viewport_el.clone(),
            content_el.clone(),
            items_el.clone(),
            self.config,
            size_cache,
            scroll,
            renderer,
            data,
            template,
        );
        ctx.set_scroll_target(if ctx.scroll.mode() == crate::scroll::ScrollMode::Window {
            ScrollTarget::Window
        } else {
            ScrollTarget::Element(viewport_el.clone())
        });

        if let Some(html_el) = viewport_el.dyn_ref::<web_sys::HtmlElement>() {
            ctx.set_container_dimensions(html_el.client_width() as f64, html_el.client_height() as f64);
        }
        ctx.rebuild_size_cache(Some(total));

        for feature in features.iter_mut() {
            log::debug!("setting up feature: {}", feature.name());
            feature.setup(&mut ctx);
        }

        VListContext::run_force_render(&mut ctx);
        ctx.emitter.emit(crate::context::VListEvent::Resize {
            width: ctx.container_dimensions().0,
            height: ctx.container_dimensions().1,
        });

        Ok(VListHandle {
            ctx: Rc::new(RefCell::new(ctx)),
            features,
        })
    }
}

fn set_style(el: &Element, text: &str) {
    if let Some(html_el) = el.dyn_ref::<web_sys::HtmlElement>() {
        html_el.style().set_css_text(text);
    }
}

fn default_template() -> TemplateFn {
    crate::template::template_fn(|index, _state| {
        Ok(TemplateOutput::Html(format!("item {index}")))
    })
}

fn default_position(i: usize, orientation: Orientation, offset: f64) -> (f64, f64) {
    match orientation {
        Orientation::Vertical => (0.0, offset + i as f64),
        Orientation::Horizontal => (offset + i as f64, 0.0),
    }
}

/// The public API surface returned by [`VListBuilder::build`] (spec §6.4).
pub struct VListHandle<T: 'static> {
    ctx: Rc<RefCell<VListContext<T>>>,
    features: Vec<Box<dyn Feature<T>>>,
}

impl<T: 'static> VListHandle<T> {
    pub fn element(&self) -> Element {
        self.ctx.borrow().root.clone()
    }

    pub fn total(&self) -> usize {
        self.ctx.borrow().total_items()
    }

    pub fn set_items(&self, items: Vec<T>) {
        if self.is_destroyed() {
            return;
        }
        let mut ctx = self.ctx.borrow_mut();
        ctx.data.borrow_mut().set_items(items);
        let total = ctx.data.borrow().len();
        ctx.rebuild_size_cache(Some(total));
        drop(ctx);
        self.force_render();
    }

    pub fn append_items(&self, items: Vec<T>) {
        if self.is_destroyed() {
            return;
        }
        let mut ctx = self.ctx.borrow_mut();
        ctx.data.borrow_mut().append_items(items);
        let total = ctx.data.borrow().len();
        ctx.rebuild_size_cache(Some(total));
        drop(ctx);
        self.force_render();
    }

    pub fn prepend_items(&self, items: Vec<T>) {
        if self.is_destroyed() {
            return;
        }
        let mut ctx = self.ctx.borrow_mut();
        ctx.data.borrow_mut().prepend_items(items);
        let total = ctx.data.borrow().len();
        ctx.rebuild_size_cache(Some(total));
        drop(ctx);
        self.force_render();
    }

    pub fn update_item(&self, index: usize, item: T) {
        if self.is_destroyed() {
            return;
        }
        self.ctx.borrow().data.borrow_mut().update_item(index, item);
        self.force_render();
    }

    pub fn remove_item(&self, index: usize) {
        if self.is_destroyed() {
            return;
        }
        let mut ctx = self.ctx.borrow_mut();
        ctx.data.borrow_mut().remove_item(index);
        let total = ctx.data.borrow().len();
        ctx.rebuild_size_cache(Some(total));
        drop(ctx);
        self.force_render();
    }

    pub fn reload(&self) {
        self.force_render();
    }

    pub fn scroll_to_index(&self, index: usize, align: Align) {
        if self.is_destroyed() {
            return;
        }
        let mut ctx = self.ctx.borrow_mut();
        let container = ctx.viewport.container_size;
        let total = ctx.total_items();
        let f = ctx.scroll_to_pos_fn();
        let pos = f(index, &ctx.size_cache, container, total, &ctx.compression, align);
        ctx.set_scroll_pos(pos);
        drop(ctx);
        self.force_render();
    }

    /// No smooth-scroll RAF animation lives at this layer (see
    /// [`crate::component`]); cancellation is a no-op here and is real
    /// once the component's animation loop is wired in.
    pub fn cancel_scroll(&self) {}

    pub fn get_scroll_position(&self) -> f64 {
        self.ctx.borrow().get_scroll_pos()
    }

    pub fn on(&self, f: Rc<dyn Fn(&crate::context::VListEvent)>) -> u32 {
        self.ctx.borrow_mut().emitter.on(f)
    }

    pub fn off(&self, id: u32) {
        self.ctx.borrow_mut().emitter.off(id);
    }

    pub fn is_destroyed(&self) -> bool {
        self.ctx.borrow().is_destroyed
    }

    /// Invoke `destroyHandlers` in reverse registration order, then each
    /// feature's own `destroy`, then tear down the renderer/pool and
    /// detach the root (spec §4.7 "Destroy").
    pub fn destroy(&mut self) {
        if self.is_destroyed() {
            return;
        }
        let mut ctx = self.ctx.borrow_mut();
        for handler in ctx.destroy_handlers.clone().into_iter().rev() {
            handler(&mut ctx);
        }
        for feature in self.features.iter_mut().rev() {
            feature.destroy(&mut ctx);
        }
        ctx.renderer.destroy();
        if let Some(parent) = ctx.root.parent_node() {
            let _ = parent.remove_child(&ctx.root);
        }
        ctx.is_destroyed = true;
    }

    fn force_render(&self) {
        let mut ctx = self.ctx.borrow_mut();
        VListContext::run_force_render(&mut ctx);
    }

    /// Direct context access for the materializer / advanced features.
    pub fn context(&self) -> Rc<RefCell<VListContext<T>>> {
        self.ctx.clone()
    }
}

impl<T: 'static> Drop for VListHandle<T> {
    fn drop(&mut self) {
        self.destroy();
    }
}
