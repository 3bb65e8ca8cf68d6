//! Minimal host page exercising the builder/component API: a 10,000-item
//! list with single selection, mounted into `#app`.

use std::cell::RefCell;
use std::rc::Rc;

use vlist::features::selection::Selection;
use vlist::{template_fn, TemplateOutput, VList, VListBuilder};
use yew::prelude::*;

fn build_list() -> VListBuilder<String> {
    let items: Vec<String> = (0..10_000).map(|i| format!("Row {i}")).collect();

    VListBuilder::new(Rc::new(|item: &String, _i| item.clone()))
        .items(items)
        .item_size(vlist::SizeSpec::Fixed(32.0))
        .class_prefix("demo-vlist")
        .aria_label("Ten thousand rows")
        .template(template_fn(|index, state| {
            let marker = if state.selected { "[x]" } else { "[ ]" };
            Ok(TemplateOutput::Html(format!("{marker} Row {index}")))
        }))
        .use_feature(Box::new(Selection::new()))
}

#[function_component(App)]
fn app() -> Html {
    let builder = use_state(|| Rc::new(RefCell::new(Some(build_list()))));

    html! {
        <VList<String>
            builder={(*builder).clone()}
            classes={classes!("demo-list")}
        />
    }
}

fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
    yew::Renderer::<App>::new().render();
}
