//! Peripheral features (spec §1: "their composition contracts are
//! specified, but their internal logic is out of scope"). Each module
//! here exercises the seams in [`crate::context::VListContext`] that
//! spec §6.5 names; none implement more internal behavior than needed to
//! prove the seam works end to end.

pub mod async_data;
pub mod grid;
pub mod selection;
pub mod sections;
pub mod snapshot;
pub mod window_mode;
