//! The item template contract (spec §4.6 "Template contract").
//!
//! A template is a pure function `(index, state) -> Html-or-Element`.
//! `TemplateState` is a single reusable scratch object mutated per call to
//! avoid allocation; templates must not capture the state reference past
//! the call (enforced here by passing it as a short-lived `&mut`).

use std::rc::Rc;

use web_sys::Element;

/// What a template produced for one item.
pub enum TemplateOutput {
    /// Inner HTML to assign via `set_inner_html`. The simplest option —
    /// matches the original `format!("Item {idx}")`-style generators.
    Html(String),
    /// A fully-constructed element subtree the renderer adopts as-is
    /// (its own root is discarded; its children are moved into the
    /// pooled wrapper).
    Element(Element),
}

/// A template failed to produce content for one index. The render loop
/// logs this and skips that index rather than aborting the whole render
/// (spec §7 propagation policy; see SPEC_FULL.md §5 for why this is a
/// `Result` rather than a caught panic).
#[derive(Debug, Clone, thiserror::Error)]
#[error("template failed for item {index}: {reason}")]
pub struct RenderError {
    pub index: usize,
    pub reason: String,
}

/// Reusable scratch state passed to every template invocation.
#[derive(Debug, Default, Clone)]
pub struct TemplateState {
    /// `true` when the item at this index is currently selected.
    pub selected: bool,
    /// `true` when the item at this index currently has keyboard focus.
    pub focused: bool,
}

/// Type-erased template callback, cheap to clone (shared via `Rc`).
pub type TemplateFn = Rc<dyn Fn(usize, &mut TemplateState) -> Result<TemplateOutput, RenderError>>;

/// Wrap a plain closure as a [`TemplateFn`].
pub fn template_fn(f: impl Fn(usize, &mut TemplateState) -> Result<TemplateOutput, RenderError> + 'static) -> TemplateFn {
    Rc::new(f)
}
