//! Grid layout (spec §6.1 "Grid items add `.vlist-grid-item` and
//! `data-row`, `data-col`"). Column count and cell dimensions are
//! caller-supplied — no auto-measurement from rendered content (spec §4.1
//! Non-goals).
//!
//! Demonstrates both replacement seams a feature can use: it replaces the
//! renderer's positioning function outright (`setPositionElementFn`), and
//! it wraps the render pipeline ("wrap previous, replace", spec §4.7) to
//! decorate each rendered element with its row/col afterward.

use std::rc::Rc;

use crate::context::{core_render, RenderFn, VListContext};
use crate::feature::Feature;
use crate::scroll::Orientation;

pub struct Grid {
    columns: usize,
    cell_width: f64,
    cell_height: f64,
}

impl Grid {
    pub fn new(columns: usize, cell_width: f64, cell_height: f64) -> Self {
        Grid {
            columns: columns.max(1),
            cell_width,
            cell_height,
        }
    }
}

impl<T: 'static> Feature<T> for Grid {
    fn name(&self) -> &'static str {
        "grid"
    }

    fn priority(&self) -> i32 {
        // Before selection (40) so selection's class overlay sees the
        // final `.vlist-grid-item` class already applied.
        20
    }

    fn setup(&mut self, ctx: &mut VListContext<T>) {
        let columns = self.columns;
        let cell_width = self.cell_width;
        let cell_height = self.cell_height;
        let orientation = ctx.config.orientation;

        ctx.set_position_element_fn(Box::new(move |i| {
            let row = i / columns;
            let col = i % columns;
            match orientation {
                Orientation::Vertical => (col as f64 * cell_width, row as f64 * cell_height),
                Orientation::Horizontal => (row as f64 * cell_width, col as f64 * cell_height),
            }
        }));

        let class_prefix = ctx.config.class_prefix.clone();
        let decorate: Rc<dyn Fn(&mut VListContext<T>)> = Rc::new(move |ctx| {
            let indices: Vec<usize> = ctx.renderer.rendered_indices().copied().collect();
            for i in indices {
                if let Some(el) = ctx.renderer.get_element(i) {
                    let _ = el.set_attribute("data-row", &(i / columns).to_string());
                    let _ = el.set_attribute("data-col", &(i % columns).to_string());
                    let grid_class = format!("{}-grid-item", class_prefix);
                    if !el.class_name().split(' ').any(|c| c == grid_class) {
                        let class = format!("{} {}", el.class_name(), grid_class);
                        el.set_class_name(class.trim());
                    }
                }
            }
        });

        let (prev_if_needed, prev_force) = ctx.render_fns();
        let prev_if_needed = prev_if_needed.unwrap_or_else(|| Rc::new(core_render::<T>) as RenderFn<T>);
        let prev_force = prev_force.unwrap_or_else(|| Rc::new(core_render::<T>) as RenderFn<T>);

        let decorated_if_needed: RenderFn<T> = {
            let prev = prev_if_needed.clone();
            let decorate = decorate.clone();
            Rc::new(move |ctx| {
                prev(ctx);
                decorate(ctx);
            })
        };
        let decorated_force: RenderFn<T> = {
            let prev = prev_force;
            let decorate = decorate;
            Rc::new(move |ctx| {
                prev(ctx);
                decorate(ctx);
            })
        };
        ctx.set_render_fns(decorated_if_needed, decorated_force);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_zero_is_clamped_to_one() {
        let g = Grid::new(0, 100.0, 40.0);
        assert_eq!(g.columns, 1);
    }

    #[test]
    fn row_col_from_flat_index() {
        let columns = 3usize;
        assert_eq!((7 / columns, 7 % columns), (2, 1));
    }
}
