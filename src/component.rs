//! The `yew::Component` that materializes a [`VListBuilder`] and wires the
//! real DOM listeners spec §4.7 step 6 describes: a throttled `scroll`
//! listener on the current scroll target, a `click`/`keydown` listener,
//! and a `ResizeObserver` on the viewport (disabled by window-mode).
//!
//! The virtualized subtree itself is never Yew-diffed: `view` renders one
//! empty host `<div>`, and [`VListBuilder::build`] appends its own DOM
//! skeleton into it directly (see [`crate::renderer`] for why).

use std::cell::RefCell;
use std::rc::Rc;

use gloo_render::{request_animation_frame, AnimationFrame};
use gloo_timers::callback::Timeout;
use wasm_bindgen::prelude::Closure;
use wasm_bindgen::JsCast;
use web_sys::{Element, EventTarget, KeyboardEvent, MouseEvent};
use yew::html::Scope;
use yew::prelude::*;

use crate::builder::{VListBuilder, VListHandle};
use crate::context::{ScrollTarget, VListEvent};
use crate::resize_observer::{ObservedElement, ResizeObserver};

/// Props wrap a builder factory rather than every individual builder
/// option: `VListBuilder<T>` already owns the full fluent configuration
/// surface (spec §6.2), and its features (`Box<dyn Feature<T>>`) cannot
/// be compared for equality the way `yew::Properties` requires. Identity
/// of the factory closure — the same pattern the teacher uses for
/// [`crate::lib::ItemGenerator`] — stands in for prop equality.
pub struct VListProps<T: 'static> {
    /// Produces a freshly configured, unbuilt builder. Called once, on
    /// first render.
    pub builder: Rc<RefCell<Option<VListBuilder<T>>>>,
    pub classes: Classes,
}

impl<T: 'static> PartialEq for VListProps<T> {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.builder, &other.builder) && self.classes == other.classes
    }
}

impl<T: 'static> yew::Properties for VListProps<T> {
    type Builder = VListPropsBuilder<T>;

    fn builder() -> Self::Builder {
        VListPropsBuilder::default()
    }
}

/// Minimal manual properties-builder (spec §6.2's configuration surface
/// is already exposed by [`VListBuilder`]; this only carries it and the
/// outer wrapper's CSS classes through to the component).
pub struct VListPropsBuilder<T: 'static> {
    builder: Option<Rc<RefCell<Option<VListBuilder<T>>>>>,
    classes: Classes,
}

impl<T: 'static> Default for VListPropsBuilder<T> {
    fn default() -> Self {
        VListPropsBuilder {
            builder: None,
            classes: Classes::new(),
        }
    }
}

impl<T: 'static> VListPropsBuilder<T> {
    pub fn builder(mut self, builder: VListBuilder<T>) -> Self {
        self.builder = Some(Rc::new(RefCell::new(Some(builder))));
        self
    }

    pub fn classes(mut self, classes: impl Into<Classes>) -> Self {
        self.classes = classes.into();
        self
    }

    pub fn build(self) -> VListProps<T> {
        VListProps {
            builder: self.builder.unwrap_or_else(|| Rc::new(RefCell::new(None))),
            classes: self.classes,
        }
    }
}

/// Internal message type (spec §5 "Suspension points").
pub enum VListMsg {
    Scroll,
    Resize(f64, f64),
    KeyDown(KeyboardEvent),
    Click(MouseEvent),
    Idle,
}

/// Materializes and owns one virtualized list instance.
pub struct VList<T: 'static> {
    link: Scope<Self>,
    host_ref: NodeRef,
    handle: Option<VListHandle<T>>,
    pending_raf: Rc<RefCell<Option<AnimationFrame>>>,
    idle_timer: Rc<RefCell<Option<Timeout>>>,
    scroll_closure: Option<Closure<dyn FnMut(web_sys::Event)>>,
    scroll_target: Option<EventTarget>,
    resize_observer: Option<(ResizeObserver, ObservedElement)>,
}

impl<T: 'static> Component for VList<T> {
    type Message = VListMsg;
    type Properties = VListProps<T>;

    fn create(ctx: &Context<Self>) -> Self {
        VList {
            link: ctx.link().clone(),
            host_ref: NodeRef::default(),
            handle: None,
            pending_raf: Rc::new(RefCell::new(None)),
            idle_timer: Rc::new(RefCell::new(None)),
            scroll_closure: None,
            scroll_target: None,
            resize_observer: None,
        }
    }

    fn update(&mut self, _ctx: &Context<Self>, msg: Self::Message) -> bool {
        let Some(handle) = &self.handle else { return false };
        let ctx_rc = handle.context();
        match msg {
            VListMsg::Scroll => {
                let mut ctx = ctx_rc.borrow_mut();
                let now_ms = js_sys::Date::now();
                let pos = ctx.get_scroll_pos();
                let (direction, velocity) = ctx.scroll.process_tick(pos, now_ms);
                crate::context::VListContext::run_render_if_needed(&mut ctx);
                ctx.emitter.emit(VListEvent::Scroll { pos, direction, velocity });
                for hook in ctx.after_scroll.clone() {
                    hook(&mut ctx, pos, direction);
                }
                drop(ctx);
                self.rearm_idle_timer();
            }
            VListMsg::Resize(width, height) => {
                let mut ctx = ctx_rc.borrow_mut();
                if !ctx.viewport_resize_disabled() {
                    ctx.set_container_dimensions(width, height);
                }
                crate::context::VListContext::run_force_render(&mut ctx);
                for handler in ctx.resize_handlers.clone() {
                    handler(&mut ctx, width, height);
                }
                ctx.emitter.emit(VListEvent::Resize { width, height });
            }
            VListMsg::KeyDown(event) => {
                let mut ctx = ctx_rc.borrow_mut();
                for handler in ctx.keydown_handlers.clone() {
                    handler(&mut ctx, &event);
                }
            }
            VListMsg::Click(event) => {
                let mut ctx = ctx_rc.borrow_mut();
                for handler in ctx.click_handlers.clone() {
                    handler(&mut ctx, &event);
                }
            }
            VListMsg::Idle => {
                ctx_rc.borrow_mut().scroll.on_idle();
            }
        }
        false
    }

    fn view(&self, ctx: &Context<Self>) -> Html {
        let onclick = ctx.link().callback(VListMsg::Click);
        let onkeydown = ctx.link().callback(VListMsg::KeyDown);
        html! {
            <div ref={&self.host_ref} class={ctx.props().classes.clone()}
                 onclick={onclick} onkeydown={onkeydown}>
            </div>
        }
    }

    fn rendered(&mut self, ctx: &Context<Self>, first_render: bool) {
        if !first_render {
            return;
        }
        let Some(host) = self.host_ref.cast::<Element>() else { return };
        let Some(builder) = ctx.props().builder.borrow_mut().take() else {
            log::error!("VList mounted without a builder; pass one via VListPropsBuilder::builder");
            return;
        };
        let document = match web_sys::window().and_then(|w| w.document()) {
            Some(d) => d,
            None => {
                log::error!("no document available to build the list into");
                return;
            }
        };
        let handle = match builder.build(&document, &host) {
            Ok(handle) => handle,
            Err(err) => {
                log::error!("failed to build virtual list: {err}");
                return;
            }
        };

        self.attach_scroll_listener(ctx, &handle);
        self.attach_resize_observer(ctx, &handle);
        self.handle = Some(handle);
    }

    fn destroy(&mut self, _ctx: &Context<Self>) {
        // spec §4.7 "Destroy": destroy_handlers (reverse) run first, then
        // DOM-listener/ResizeObserver/RAF/timer teardown — handle.destroy()
        // is where destroy_handlers actually execute, so it must go first.
        if let Some(mut handle) = self.handle.take() {
            handle.destroy();
        }
        if let (Some(target), Some(closure)) = (self.scroll_target.take(), self.scroll_closure.take()) {
            let _ = target.remove_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        }
        self.resize_observer = None;
        self.pending_raf.borrow_mut().take();
        self.idle_timer.borrow_mut().take();
    }
}

impl<T: 'static> VList<T> {
    /// `scroll` does not bubble, so it cannot ride Yew's delegated event
    /// system (unlike click/keydown in `view`) — bound directly on the
    /// current scroll target with a raw `wasm_bindgen::Closure`, the same
    /// low-level idiom [`crate::resize_observer`] already uses for
    /// `ResizeObserver`. RAF-throttled: at most one `Scroll` message per
    /// animation frame, re-entrant calls within a frame coalesce
    /// (spec §5 "Suspension points").
    fn attach_scroll_listener(&mut self, ctx: &Context<Self>, handle: &VListHandle<T>) {
        let target: EventTarget = {
            let list_ctx = handle.context();
            let borrowed = list_ctx.borrow();
            match borrowed.scroll_target() {
                ScrollTarget::Element(el) => el.clone().unchecked_into(),
                ScrollTarget::Window => match web_sys::window() {
                    Some(w) => w.unchecked_into(),
                    None => return,
                },
            }
        };

        let link = ctx.link().clone();
        let pending_raf = self.pending_raf.clone();
        let closure = Closure::wrap(Box::new(move |_event: web_sys::Event| {
            if pending_raf.borrow().is_some() {
                return;
            }
            let link = link.clone();
            let pending_raf_inner = pending_raf.clone();
            let frame = request_animation_frame(move |_ts| {
                link.send_message(VListMsg::Scroll);
                pending_raf_inner.borrow_mut().take();
            });
            *pending_raf.borrow_mut() = Some(frame);
        }) as Box<dyn FnMut(web_sys::Event)>);

        let _ = target.add_event_listener_with_callback("scroll", closure.as_ref().unchecked_ref());
        self.scroll_target = Some(target);
        self.scroll_closure = Some(closure);
    }

    /// Observes only the viewport container (spec §4.7 step 6); a no-op
    /// under window-mode, which disables viewport resize tracking in
    /// favor of the window's own `resize` event (not yet wired here —
    /// window-mode relies on the initial `set_container_dimensions` call
    /// plus whatever the embedding page triggers).
    fn attach_resize_observer(&mut self, ctx: &Context<Self>, handle: &VListHandle<T>) {
        let list_ctx = handle.context();
        let disabled = list_ctx.borrow().viewport_resize_disabled();
        if disabled {
            return;
        }
        let viewport_el = list_ctx.borrow().viewport_el.clone();
        let link = ctx.link().clone();
        let observer = ResizeObserver::new(move |entries| {
            if let Some(entry) = entries.first() {
                let rect = entry.content_rect();
                link.send_message(VListMsg::Resize(rect.width(), rect.height()));
            }
        });
        let observed = observer.observe(viewport_el);
        self.resize_observer = Some((observer, observed));
    }

    /// Idle fires `STALE_GAP_MS`-independent velocity reset (spec §6.2
    /// `scroll.idleTimeout`); rearming cancels the previous timer since
    /// `gloo_timers::Timeout` cancels on drop.
    fn rearm_idle_timer(&mut self) {
        let Some(handle) = &self.handle else { return };
        let ctx_rc = handle.context();
        let idle_ms = ctx_rc.borrow().config.scroll.idle_timeout_ms;
        let link = self.link.clone();
        *self.idle_timer.borrow_mut() = Some(Timeout::new(idle_ms, move || {
            link.send_message(VListMsg::Idle);
        }));
    }
}
