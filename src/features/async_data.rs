//! Asynchronous data loading (spec §6.3 `load:start`/`load:end`/`error`).
//! Caching, retry, and request deduplication are out of scope (spec §4.1
//! Non-goals); this feature only owns "are we near an edge that needs
//! more data" and the virtual-total override that lets the list show the
//! correct scrollbar length ahead of data actually arriving.
//!
//! The loader future resolves off the render path (spec §5 "the core
//! itself never awaits on the render path"): it writes its result into a
//! shared cell, and the wrapped render pipeline — which does get `&mut
//! ctx` every tick — merges it in and fires `load:end`/`error` on the
//! next tick rather than the loader reaching back into `ctx` itself.

use std::cell::RefCell;
use std::future::Future;
use std::pin::Pin;
use std::rc::Rc;

use crate::context::{core_render, RenderFn, VListContext, VListEvent};
use crate::feature::Feature;
use crate::range::Direction;

pub type LoadFuture<T> = Pin<Box<dyn Future<Output = Result<Vec<T>, String>>>>;
/// `(offset, page_size) -> future of the next page`.
pub type Loader<T> = Rc<dyn Fn(usize, usize) -> LoadFuture<T>>;

enum Pending<T> {
    Loading,
    Done(Result<Vec<T>, String>),
}

/// Loads the next page once the render range comes within `threshold`
/// items of the end of currently-loaded data.
pub struct AsyncData<T> {
    loader: Loader<T>,
    page_size: usize,
    threshold: usize,
    known_total: Option<usize>,
    pending: Rc<RefCell<Option<Pending<T>>>>,
}

impl<T: 'static> AsyncData<T> {
    pub fn new(loader: Loader<T>, page_size: usize, threshold: usize) -> Self {
        AsyncData {
            loader,
            page_size: page_size.max(1),
            threshold,
            known_total: None,
            pending: Rc::new(RefCell::new(None)),
        }
    }

    /// Cap the virtual total so the scrollbar reflects the full dataset
    /// size before every page has loaded.
    pub fn known_total(mut self, total: usize) -> Self {
        self.known_total = Some(total);
        self
    }
}

impl<T: 'static> Feature<T> for AsyncData<T> {
    fn name(&self) -> &'static str {
        "async-data"
    }

    fn priority(&self) -> i32 {
        15
    }

    fn setup(&mut self, ctx: &mut VListContext<T>) {
        if let Some(total) = self.known_total {
            ctx.set_virtual_total_fn(Rc::new(move || total));
            ctx.update_content_size(total);
        }

        let pending_for_scroll = self.pending.clone();
        let loader = self.loader.clone();
        let page_size = self.page_size;
        let threshold = self.threshold;
        let hook = move |ctx: &mut VListContext<T>, _pos: f64, _dir: Direction| {
            if pending_for_scroll.borrow().is_some() {
                return;
            }
            let loaded = ctx.data.borrow().len();
            let total = ctx.total_items();
            if loaded >= total {
                return;
            }
            if total.saturating_sub(ctx.viewport.render_range.last().unwrap_or(0)) > threshold {
                return;
            }
            *pending_for_scroll.borrow_mut() = Some(Pending::Loading);
            ctx.emitter.emit(VListEvent::LoadStart);

            let future = loader(loaded, page_size);
            let pending_for_future = pending_for_scroll.clone();
            wasm_bindgen_futures::spawn_local(async move {
                let result = future.await;
                *pending_for_future.borrow_mut() = Some(Pending::Done(result));
            });
        };
        ctx.after_scroll.push(Rc::new(hook));

        let pending_for_render = self.pending.clone();
        let merge: RenderFn<T> = Rc::new(move |ctx| {
            let ready = matches!(&*pending_for_render.borrow(), Some(Pending::Done(_)));
            if ready {
                if let Some(Pending::Done(result)) = pending_for_render.borrow_mut().take() {
                    match result {
                        Ok(items) => {
                            ctx.data.borrow_mut().append_items(items);
                            let total = ctx.data.borrow().len();
                            ctx.update_content_size(total);
                            ctx.emitter.emit(VListEvent::LoadEnd);
                        }
                        Err(message) => {
                            ctx.emitter.emit(VListEvent::Error { message });
                        }
                    }
                }
            }
        });

        let (prev_if_needed, prev_force) = ctx.render_fns();
        let prev_if_needed = prev_if_needed.unwrap_or_else(|| Rc::new(core_render::<T>) as RenderFn<T>);
        let prev_force = prev_force.unwrap_or_else(|| Rc::new(core_render::<T>) as RenderFn<T>);

        let wrapped_if_needed: RenderFn<T> = {
            let merge = merge.clone();
            let prev = prev_if_needed;
            Rc::new(move |ctx| {
                merge(ctx);
                prev(ctx);
            })
        };
        let wrapped_force: RenderFn<T> = {
            let merge = merge;
            let prev = prev_force;
            Rc::new(move |ctx| {
                merge(ctx);
                prev(ctx);
            })
        };
        ctx.set_render_fns(wrapped_if_needed, wrapped_force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn page_size_is_floored_to_one() {
        let loader: Loader<u32> = Rc::new(|_offset, _n| Box::pin(async { Ok(vec![]) }));
        let feature = AsyncData::new(loader, 0, 5);
        assert_eq!(feature.page_size, 1);
    }
}
