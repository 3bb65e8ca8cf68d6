//! Error taxonomy (spec §7). Configuration and invariant-breach failures
//! are fatal and returned from [`crate::builder::VListBuilder::build`];
//! arithmetic/boundary failures never occur (every numeric path clamps);
//! DOM/runtime failures (missing browser APIs) surface here too rather
//! than panicking, since a missing `ResizeObserver` or similar is a
//! caller-environment problem, not a programming error inside this crate.

#[derive(Debug, thiserror::Error)]
pub enum VListError {
    #[error("container element not found: {0}")]
    ContainerNotFound(String),

    #[error("duplicate feature registered: {0}")]
    DuplicateFeature(&'static str),

    #[error("feature conflict: {0} conflicts with {1}")]
    FeatureConflict(&'static str, &'static str),

    #[error("grid layout cannot be combined with reverse scrolling")]
    GridReverseConflict,

    #[error("missing required browser API: {0}")]
    MissingBrowserApi(&'static str),
}
