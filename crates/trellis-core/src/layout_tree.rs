//! Layout engine boundary: tree construction and measurement contracts.

use std::fmt;
use std::sync::Arc;

use crate::{Component, LayoutError, LayoutExecutor, RetainedState, Size, SizeSpec};

/// Callback invoked when an asynchronous measurement finishes.
pub type LayoutCompletion = Box<dyn FnOnce(Result<Size, LayoutError>) + Send + 'static>;

/// A computed layout for one component at a given size.
///
/// Expensive to build, cheap to query once built. Trees are owned by a
/// holder, measured from arbitrary threads, and released when their list
/// position leaves the working range.
pub trait LayoutTree: Send + Sync {
    /// Re-roots the tree on `component` and computes a layout for the given
    /// constraints. Blocks the caller for the full measurement.
    fn set_root_and_size_spec(
        &self,
        component: &Arc<dyn Component>,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError>;

    /// Non-blocking variant of [`set_root_and_size_spec`]. The measurement
    /// runs on the tree's layout executor and `done` is invoked with the
    /// result once it finishes.
    ///
    /// [`set_root_and_size_spec`]: LayoutTree::set_root_and_size_spec
    fn set_root_and_size_spec_async(
        &self,
        component: &Arc<dyn Component>,
        width: SizeSpec,
        height: SizeSpec,
        done: LayoutCompletion,
    );

    /// Tears the tree down. Measuring a released tree is an error.
    fn release(&self);

    /// Moves the component-local state out of the tree, leaving none behind.
    fn take_retained_state(&self) -> Option<RetainedState>;
}

/// Configuration handed to a factory when a tree is built.
pub struct TreeBuildConfig {
    /// State retained from a previous tree for the same slot, consumed by
    /// the new tree.
    pub retained_state: Option<RetainedState>,

    /// Executor the tree should run asynchronous measurements on. When
    /// absent the factory falls back to its own default.
    pub layout_executor: Option<Arc<dyn LayoutExecutor>>,

    /// Whether the tree clips children to its bounds.
    pub clip_children: bool,

    /// Hint that display output may be prefetched ahead of visibility.
    pub prefetch_display_output: bool,

    /// Hint that drawn display output may be cached across frames.
    pub cache_display_output: bool,
}

impl fmt::Debug for TreeBuildConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TreeBuildConfig")
            .field("retained_state", &self.retained_state)
            .field("layout_executor", &self.layout_executor.as_ref().map(|_| "Some(...)"))
            .field("clip_children", &self.clip_children)
            .field("prefetch_display_output", &self.prefetch_display_output)
            .field("cache_display_output", &self.cache_display_output)
            .finish()
    }
}

/// Builds layout trees on behalf of the binding layer.
pub trait LayoutTreeFactory: Send + Sync {
    fn create(
        &self,
        context: &LayoutContext,
        component: &Arc<dyn Component>,
        config: TreeBuildConfig,
    ) -> Arc<dyn LayoutTree>;
}

/// Framework services threaded through layout computation.
///
/// Cheap to clone; every clone refers to the same factory.
#[derive(Clone)]
pub struct LayoutContext {
    factory: Arc<dyn LayoutTreeFactory>,
}

impl LayoutContext {
    pub fn new(factory: Arc<dyn LayoutTreeFactory>) -> Self {
        Self { factory }
    }

    pub fn factory(&self) -> &Arc<dyn LayoutTreeFactory> {
        &self.factory
    }
}
