//! Grouped sections with a sticky header (spec §6.1: "The sticky section
//! header is a sibling of viewport, `position:absolute; z-index:5;
//! pointer-events:none`, sized to the current section's header size along
//! the scroll axis").
//!
//! Section boundaries and header rendering are caller-supplied; deciding
//! which section the current visible range belongs to is the only
//! internal logic this feature owns.

use std::rc::Rc;

use wasm_bindgen::JsCast;
use web_sys::HtmlElement;

use crate::context::VListContext;
use crate::feature::Feature;
use crate::range::Direction;
use crate::scroll::Orientation;

pub struct Sections {
    /// Ascending start index of each section; section 0 implicitly starts
    /// at index 0 even if `boundaries[0] != 0`.
    boundaries: Vec<usize>,
    header_size: f64,
    render_header: Rc<dyn Fn(usize) -> String>,
}

impl Sections {
    pub fn new(boundaries: Vec<usize>, header_size: f64, render_header: Rc<dyn Fn(usize) -> String>) -> Self {
        Sections { boundaries, header_size, render_header }
    }

    /// Index of the section containing `item_index` (spec leaves the
    /// lookup strategy unspecified; a binary search over boundaries is the
    /// natural fit since they are caller-sorted ascending).
    fn section_for_index(&self, item_index: usize) -> usize {
        match self.boundaries.binary_search(&item_index) {
            Ok(i) => i,
            Err(0) => 0,
            Err(i) => i - 1,
        }
    }
}

impl<T: 'static> Feature<T> for Sections {
    fn name(&self) -> &'static str {
        "sections"
    }

    fn priority(&self) -> i32 {
        30
    }

    fn setup(&mut self, ctx: &mut VListContext<T>) {
        let Some(document) = ctx.root.owner_document() else { return };
        let Ok(header) = document.create_element("div") else { return };
        header.set_class_name(&format!("{}-section-header", ctx.config.class_prefix));
        if let Some(html_el) = header.dyn_ref::<HtmlElement>() {
            html_el
                .style()
                .set_css_text("position:absolute;z-index:5;pointer-events:none;top:0;left:0;");
            let prop = match ctx.config.orientation {
                Orientation::Vertical => "height",
                Orientation::Horizontal => "width",
            };
            let _ = html_el.style().set_property(prop, &format!("{}px", self.header_size));
        }
        if let Some(root_html) = ctx.root.dyn_ref::<HtmlElement>() {
            if root_html.style().get_property_value("position").unwrap_or_default().is_empty() {
                let _ = root_html.style().set_property("position", "relative");
            }
        }
        let _ = ctx.root.append_child(&header);
        header.set_inner_html(&(self.render_header)(0));
        ctx.header_el = Some(header);

        let boundaries = self.boundaries.clone();
        let render_header = self.render_header.clone();
        let hook = move |ctx: &mut VListContext<T>, _pos: f64, _dir: Direction| {
            let current = ctx.viewport.visible_range.start;
            let section = match boundaries.binary_search(&current) {
                Ok(i) => i,
                Err(0) => 0,
                Err(i) => i - 1,
            };
            if let Some(header) = &ctx.header_el {
                header.set_inner_html(&render_header(section));
            }
        };
        ctx.after_scroll.push(Rc::new(hook));
    }

    fn destroy(&mut self, ctx: &mut VListContext<T>) {
        if let Some(header) = ctx.header_el.take() {
            header.remove();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sections_with(boundaries: Vec<usize>) -> Sections {
        Sections::new(boundaries, 32.0, Rc::new(|i| format!("Section {i}")))
    }

    #[test]
    fn section_lookup_handles_boundary_hits_and_gaps() {
        let s = sections_with(vec![0, 10, 25]);
        assert_eq!(s.section_for_index(0), 0);
        assert_eq!(s.section_for_index(5), 0);
        assert_eq!(s.section_for_index(10), 1);
        assert_eq!(s.section_for_index(24), 1);
        assert_eq!(s.section_for_index(25), 2);
        assert_eq!(s.section_for_index(1000), 2);
    }

    #[test]
    fn lookup_before_first_boundary_falls_back_to_zero() {
        let s = sections_with(vec![5, 10]);
        assert_eq!(s.section_for_index(0), 0);
        assert_eq!(s.section_for_index(4), 0);
    }
}
