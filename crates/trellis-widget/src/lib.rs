//! List binding for Trellis: pooled, thread-safe holders for per-item
//! layout trees.
//!
//! A recycler list keeps one [`TreeHolder`] per data position. The holder
//! lazily builds a layout tree on first measurement, tracks whether the
//! computed layout is still valid for the currently bound slot, and - when
//! the position scrolls out of the working range - trades the full tree for
//! a small [`RetainedState`](trellis_core::RetainedState) bag so it can be
//! rebuilt cheaply later. Holders themselves are recycled through a bounded
//! [`HolderPool`] to avoid allocation churn during fast scrolling.

mod holder_pool;
mod tree_holder;

pub use holder_pool::*;
pub use tree_holder::*;
