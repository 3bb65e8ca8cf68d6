//! Recycles item elements and maintains the authoritative index -> DOM
//! element mapping (spec §4.6).
//!
//! `Renderer` deliberately works against raw `web_sys::Element`s rather
//! than through Yew's virtual DOM: the spec's eviction/reuse/positioning
//! contract (data-id comparison, document-fragment batched inserts,
//! transform-based positioning) is the kind of imperative, allocation-
//! averse DOM surgery a vdom diff does not expose hooks for. The items
//! container is a single `NodeRef` the outer `yew::Component` hands over
//! to the renderer after mount; Yew never re-diffs inside it.

use std::collections::HashMap;

use wasm_bindgen::JsCast;
use web_sys::{Document, DocumentFragment, Element, HtmlElement};

use crate::pool::ElementPool;
use crate::range::Range;
use crate::template::{RenderError, TemplateFn, TemplateOutput, TemplateState};

/// Positions an item given its index; injected so list mode (simple
/// offset) and grid mode (row/col coordinates) can both drive the same
/// renderer (spec §6.5 `setPositionElementFn`).
pub type PositionFn = Box<dyn Fn(usize) -> (f64, f64)>;

/// Source of stable per-item ids, used to decide whether a rendered
/// element can be reused in place or must be re-templated (spec §4.6
/// step 3: "the element's stored `data-id` equals `String(item.id)`").
pub trait ItemIds {
    /// Stable id for the item currently at `index`, or `None` if the
    /// index has no backing item (skipped by the render loop).
    fn id_at(&self, index: usize) -> Option<String>;
}

/// Recycles item elements and keeps `rendered` as the single source of
/// truth for "what is currently in the DOM."
pub struct Renderer {
    document: Document,
    items_container: Element,
    pool: ElementPool,
    rendered: HashMap<usize, Element>,
    template: TemplateFn,
    position_fn: PositionFn,
    class_prefix: String,
    id_prefix: String,
    last_total_items: Option<usize>,
    scratch: TemplateState,
}

impl Renderer {
    /// `items_container` is the `.{prefix}-items` element the caller has
    /// already mounted; `pool` backs element recycling; `position_fn`
    /// starts as a simple list-mode offset and can be replaced by the
    /// grid feature via [`Renderer::set_position_fn`].
    pub fn new(
        document: Document,
        items_container: Element,
        pool: ElementPool,
        template: TemplateFn,
        position_fn: PositionFn,
        class_prefix: impl Into<String>,
        id_prefix: impl Into<String>,
    ) -> Self {
        Renderer {
            document,
            items_container,
            pool,
            rendered: HashMap::new(),
            template,
            position_fn,
            class_prefix: class_prefix.into(),
            id_prefix: id_prefix.into(),
            last_total_items: None,
            scratch: TemplateState::default(),
        }
    }

    /// Replace the positioning function (grid layout's seam).
    pub fn set_position_fn(&mut self, f: PositionFn) {
        self.position_fn = f;
    }

    /// Replace the template function (a feature's render-decorator seam).
    pub fn set_template(&mut self, template: TemplateFn) {
        self.template = template;
    }

    /// Indices currently present in the DOM.
    pub fn rendered_indices(&self) -> impl Iterator<Item = &usize> {
        self.rendered.keys()
    }

    pub fn get_element(&self, index: usize) -> Option<&Element> {
        self.rendered.get(&index)
    }

    /// Core render step (spec §4.6 `render`). `ids` supplies stable ids
    /// for reuse comparison; `total_items` drives the `aria-setsize`
    /// update policy; `classify` computes `(selected, focused)` for a
    /// given index; `on_error` is called (and the index skipped) if the
    /// template fails.
    pub fn render(
        &mut self,
        range: Range,
        ids: &dyn ItemIds,
        total_items: Option<usize>,
        classify: &dyn Fn(usize) -> (bool, bool),
        mut on_error: impl FnMut(RenderError),
    ) {
        self.evict_outside(range);

        let total_changed = match (self.last_total_items, total_items) {
            (Some(prev), Some(now)) => prev != now,
            (None, Some(_)) => true,
            _ => false,
        };
        if let Some(now) = total_items {
            self.last_total_items = Some(now);
        }

        let fragment: DocumentFragment = self.document.create_document_fragment();
        let mut any_new = false;

        if !range.is_empty() {
            for i in range.start..=(range.end as usize) {
                let Some(id) = ids.id_at(i) else { continue };
                let (selected, focused) = classify(i);

                let reused = self
                    .rendered
                    .get(&i)
                    .map(|el| el.get_attribute("data-id").as_deref() == Some(id.as_str()))
                    .unwrap_or(false);

                if reused {
                    let el = self.rendered.get(&i).unwrap();
                    self.apply_classes(el, selected, focused);
                    if total_changed {
                        if let Some(total) = total_items {
                            let _ = el.set_attribute("aria-setsize", &total.to_string());
                        }
                    }
                    self.position(el, i);
                    continue;
                }

                // Evict a stale occupant of this slot before re-templating.
                if let Some(old) = self.rendered.remove(&i) {
                    old.remove();
                    self.pool.release(old);
                }

                self.scratch.selected = selected;
                self.scratch.focused = focused;
                match (self.template)(i, &mut self.scratch) {
                    Ok(output) => {
                        let el = self.pool.acquire();
                        match output {
                            TemplateOutput::Html(html) => el.set_inner_html(&html),
                            TemplateOutput::Element(content) => {
                                el.set_inner_html("");
                                let _ = el.append_child(&content);
                            }
                        }
                        el.set_class_name(&format!("{}-item", self.class_prefix));
                        let _ = el.set_attribute("data-index", &i.to_string());
                        let _ = el.set_attribute("data-id", &id);
                        let _ = el.set_attribute("id", &format!("{}-item-{}", self.id_prefix, i));
                        let _ = el.set_attribute("aria-posinset", &(i + 1).to_string());
                        if let Some(total) = total_items {
                            let _ = el.set_attribute("aria-setsize", &total.to_string());
                        }
                        self.apply_classes(&el, selected, focused);
                        self.position(&el, i);
                        let _ = fragment.append_child(&el);
                        self.rendered.insert(i, el);
                        any_new = true;
                    }
                    Err(err) => on_error(err),
                }
            }
        }

        if any_new {
            let _ = self.items_container.append_child(&fragment);
        }
    }

    /// Recompute every rendered element's transform (used after each
    /// compressed scroll tick, since compressed positions are
    /// viewport-relative rather than absolute).
    pub fn update_positions(&self) {
        for (&i, el) in self.rendered.iter() {
            self.position(el, i);
        }
    }

    /// Update only the selection/focus classes and `aria-selected` for
    /// one rendered item (no-op if it is not currently rendered).
    pub fn update_item_classes(&self, index: usize, selected: bool, focused: bool) {
        if let Some(el) = self.rendered.get(&index) {
            self.apply_classes(el, selected, focused);
        }
    }

    /// Remove every rendered element, releasing each back to the pool.
    pub fn clear(&mut self) {
        let indices: Vec<usize> = self.rendered.keys().copied().collect();
        for i in indices {
            if let Some(el) = self.rendered.remove(&i) {
                el.remove();
                self.pool.release(el);
            }
        }
    }

    /// Tear down: clear rendered elements and drop the pool's contents.
    pub fn destroy(&mut self) {
        self.clear();
        self.pool.clear();
    }

    fn evict_outside(&mut self, range: Range) {
        let stale: Vec<usize> = self
            .rendered
            .keys()
            .copied()
            .filter(|i| !range.in_range(*i))
            .collect();
        for i in stale {
            if let Some(el) = self.rendered.remove(&i) {
                el.remove();
                self.pool.release(el);
            }
        }
    }

    fn apply_classes(&self, el: &Element, selected: bool, focused: bool) {
        let base = format!("{}-item", self.class_prefix);
        let mut class = base;
        if selected {
            class.push(' ');
            class.push_str(&format!("{}-item--selected", self.class_prefix));
        }
        if focused {
            class.push(' ');
            class.push_str(&format!("{}-item--focused", self.class_prefix));
        }
        el.set_class_name(&class);
        let _ = el.set_attribute("aria-selected", if selected { "true" } else { "false" });
    }

    fn position(&self, el: &Element, index: usize) {
        let (x, y) = (self.position_fn)(index);
        if let Some(html_el) = el.dyn_ref::<HtmlElement>() {
            let transform = format!("translate({}px, {}px)", x.round(), y.round());
            let _ = html_el.style().set_property("transform", &transform);
        }
    }
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use crate::template::template_fn;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    struct Ids(Vec<&'static str>);
    impl ItemIds for Ids {
        fn id_at(&self, index: usize) -> Option<String> {
            self.0.get(index).map(|s| s.to_string())
        }
    }

    fn make_renderer() -> Renderer {
        let document = web_sys::window().unwrap().document().unwrap();
        let container = document.create_element("div").unwrap();
        let pool = ElementPool::new(document.clone(), "div", "option", 50);
        let template = template_fn(|i, _state| {
            Ok(TemplateOutput::Html(format!("item {i}")))
        });
        Renderer::new(
            document,
            container,
            pool,
            template,
            Box::new(|i| (0.0, i as f64 * 20.0)),
            "vlist",
            "vlist",
        )
    }

    #[wasm_bindgen_test]
    fn render_creates_and_evicts_by_range() {
        let mut r = make_renderer();
        let ids = Ids(vec!["a", "b", "c", "d", "e"]);
        r.render(Range::new(0, 2), &ids, Some(5), &|_| (false, false), |_| {});
        assert_eq!(r.rendered_indices().count(), 3);

        r.render(Range::new(2, 4), &ids, Some(5), &|_| (false, false), |_| {});
        let mut indices: Vec<usize> = r.rendered_indices().copied().collect();
        indices.sort_unstable();
        assert_eq!(indices, vec![2, 3, 4]);
    }

    #[wasm_bindgen_test]
    fn render_reuses_matching_data_id() {
        let mut r = make_renderer();
        let ids = Ids(vec!["a", "b", "c"]);
        r.render(Range::new(0, 2), &ids, Some(3), &|_| (false, false), |_| {});
        let el_before = r.get_element(1).unwrap().clone();
        r.render(Range::new(0, 2), &ids, Some(3), &|_| (false, false), |_| {});
        let el_after = r.get_element(1).unwrap().clone();
        assert!(el_before.is_same_node(Some(&el_after)));
    }
}
