//! A composable virtualization engine for scrolling through arbitrarily
//! large ordered sequences in Yew.
//!
//! The surface is [`VListBuilder`], which accumulates configuration and
//! [`Feature`] implementations, then [`VListBuilder::build`]s a
//! [`VListHandle`]; [`VList`] wraps that into a `yew::Component` that also
//! owns the real DOM listeners (scroll/click/keydown/resize).

#![deny(
    missing_debug_implementations,
    bare_trait_objects,
    anonymous_parameters,
    elided_lifetimes_in_paths
)]

mod builder;
mod compression;
mod component;
mod config;
mod context;
mod data;
mod error;
mod feature;
pub mod features;
mod pool;
mod range;
mod renderer;
mod resize_observer;
mod scroll;
mod size_cache;
mod template;
mod velocity;
mod viewport;

pub use builder::{VListBuilder, VListHandle};
pub use component::{VList, VListProps, VListPropsBuilder};
pub use config::{ItemConfig, ScrollConfig, VListConfig};
pub use context::{ScrollTarget, VListContext, VListEvent};
pub use error::VListError;
pub use feature::Feature;
pub use range::{Align, Direction, Range};
pub use scroll::Orientation;
pub use size_cache::SizeSpec;
pub use template::{template_fn, RenderError, TemplateFn, TemplateOutput, TemplateState};
