//! Bounded LIFO of detached DOM elements recycled by the renderer.
//!
//! Amortizes DOM creation to zero during steady scroll and avoids
//! unbounded memory on very large visible windows (spec §4.6).

use wasm_bindgen::JsCast;
use web_sys::{Document, Element, HtmlElement};

/// Default cap on the number of pooled (detached) elements.
pub const DEFAULT_POOL_CAP: usize = 150;

/// A bounded LIFO of detached elements of one tag/role, ready to be
/// repositioned and re-populated by the renderer.
#[derive(Debug)]
pub struct ElementPool {
    free: Vec<Element>,
    cap: usize,
    document: Document,
    tag_name: String,
    role: &'static str,
}

impl ElementPool {
    /// Create a pool that creates `tag_name` elements with `role` set
    /// once at creation time, holding at most `cap` detached elements.
    pub fn new(document: Document, tag_name: impl Into<String>, role: &'static str, cap: usize) -> Self {
        ElementPool {
            free: Vec::new(),
            cap,
            document,
            tag_name: tag_name.into(),
            role,
        }
    }

    /// Number of currently pooled (detached) elements.
    pub fn len(&self) -> usize {
        self.free.len()
    }

    /// `true` when no elements are pooled.
    pub fn is_empty(&self) -> bool {
        self.free.is_empty()
    }

    /// Pop a pooled element, or create a fresh one with its ARIA role set.
    pub fn acquire(&mut self) -> Element {
        if let Some(el) = self.free.pop() {
            return el;
        }
        let el = self
            .document
            .create_element(&self.tag_name)
            .expect("create_element should not fail for a valid tag name");
        el.set_attribute("role", self.role)
            .expect("set_attribute should not fail on a detached element");
        el
    }

    /// Detach `el` (caller must have already removed it from the DOM),
    /// reset it to a blank slate, and push it back if under capacity;
    /// otherwise let it drop.
    pub fn release(&mut self, el: Element) {
        el.set_class_name("");
        el.set_text_content(Some(""));
        if let Some(html_el) = el.dyn_ref::<HtmlElement>() {
            html_el.style().set_css_text("");
        }
        for name in data_attribute_names(&el) {
            let _ = el.remove_attribute(&name);
        }
        if self.free.len() < self.cap {
            self.free.push(el);
        }
    }

    /// Drop every pooled element (used by `Renderer::destroy`).
    pub fn clear(&mut self) {
        self.free.clear();
    }
}

fn data_attribute_names(el: &Element) -> Vec<String> {
    let attrs = el.attributes();
    let len = attrs.length();
    let mut names = Vec::new();
    for i in 0..len {
        if let Some(attr) = attrs.item(i) {
            let name = attr.name();
            if name.starts_with("data-") {
                names.push(name);
            }
        }
    }
    names
}

#[cfg(all(test, target_arch = "wasm32"))]
mod wasm_tests {
    use super::*;
    use wasm_bindgen_test::*;

    wasm_bindgen_test_configure!(run_in_browser);

    fn document() -> Document {
        web_sys::window().unwrap().document().unwrap()
    }

    #[wasm_bindgen_test]
    fn acquire_sets_role_once() {
        let mut pool = ElementPool::new(document(), "div", "option", 4);
        let el = pool.acquire();
        assert_eq!(el.get_attribute("role").as_deref(), Some("option"));
    }

    #[wasm_bindgen_test]
    fn release_clears_state_and_respects_cap() {
        let mut pool = ElementPool::new(document(), "div", "option", 1);
        let a = pool.acquire();
        a.set_class_name("selected");
        a.set_attribute("data-index", "3").unwrap();
        pool.release(a);
        assert_eq!(pool.len(), 1);

        let recycled = pool.acquire();
        assert_eq!(recycled.class_name(), "");
        assert!(recycled.get_attribute("data-index").is_none());

        let b = pool.acquire();
        let c = pool.acquire();
        pool.release(b);
        pool.release(c);
        assert_eq!(pool.len(), 1, "pool caps at its configured capacity");
    }
}
