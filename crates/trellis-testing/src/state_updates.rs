//! Helper for writing state update tests.
//!
//! Captures the protocol around holder-managed trees: schedule layout,
//! apply a state mutation, drain the simulated main-thread queue(s), then
//! measure again to observe the updated tree. Tests reach the tree through
//! the factory's explicit accessors; there is no privileged field access.

use trellis_core::{LayoutContext, LayoutError, Size, SizeSpec};
use trellis_widget::TreeHolder;

use crate::{ManualExecutor, TestLayoutTree, TestTreeFactory};

/// Applies `update` to the holder's tree and returns the size measured
/// after the given looper has been drained.
pub fn size_after_state_update(
    context: &LayoutContext,
    factory: &TestTreeFactory,
    holder: &TreeHolder,
    width: SizeSpec,
    height: SizeSpec,
    looper: &ManualExecutor,
    update: impl FnOnce(&TestLayoutTree),
) -> Result<Size, LayoutError> {
    size_after_state_updates(context, factory, holder, width, height, &[looper], update)
}

/// Like [`size_after_state_update`] but drains several loopers, in the
/// order they are given.
pub fn size_after_state_updates(
    context: &LayoutContext,
    factory: &TestTreeFactory,
    holder: &TreeHolder,
    width: SizeSpec,
    height: SizeSpec,
    loopers: &[&ManualExecutor],
    update: impl FnOnce(&TestLayoutTree),
) -> Result<Size, LayoutError> {
    // Schedule an async pass first so there is in-flight work to drain,
    // the way a binder measures ahead while updates land on the main thread.
    holder.compute_layout_async(context, width, height);
    let tree = factory
        .last_tree()
        .expect("holder built no tree for the async pass");
    update(&tree);
    for looper in loopers {
        looper.run_to_end_of_tasks();
    }
    holder.compute_layout_sync(context, width, height)
}

/// Zero-mutation variant: drains outstanding asynchronous work and
/// re-measures.
pub fn size_after_drain(
    context: &LayoutContext,
    factory: &TestTreeFactory,
    holder: &TreeHolder,
    width: SizeSpec,
    height: SizeSpec,
    looper: &ManualExecutor,
) -> Result<Size, LayoutError> {
    size_after_state_updates(context, factory, holder, width, height, &[looper], |_| {})
}
