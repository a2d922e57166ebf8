//! In-memory layout tree used in place of the real layout engine.

use std::sync::{Arc, Mutex};

use trellis_core::{
    AttributeValue, Component, LayoutCompletion, LayoutContext, LayoutError, LayoutExecutor,
    LayoutJob, LayoutTree, LayoutTreeFactory, RetainedState, Size, SizeSpec, TreeBuildConfig,
};

use crate::TestComponent;

/// Layout tree that measures by resolving constraints against the root
/// component's declared intrinsic size.
///
/// Asynchronous measurement is posted to the executor the tree was built
/// with, so tests drive completion by draining that executor. The tree
/// records measure calls and carries retained state exactly the way the
/// holder protocol expects: seeded at creation, moved out on release.
///
/// Handles are cheap to clone; every clone refers to the same tree.
#[derive(Clone)]
pub struct TestLayoutTree {
    inner: Arc<TestTreeInner>,
}

struct TestTreeInner {
    state: Mutex<TreeState>,
    executor: Option<Arc<dyn LayoutExecutor>>,
    clip_children: bool,
    prefetch_display_output: bool,
    cache_display_output: bool,
}

#[derive(Default)]
struct TreeState {
    /// `Some` while the tree is alive and still owns its state.
    retained: Option<RetainedState>,
    released: bool,
    measure_count: usize,
    last_measured: Option<Size>,
    fail_next_measure: bool,
}

impl TestLayoutTree {
    fn from_config(config: TreeBuildConfig) -> Self {
        Self {
            inner: Arc::new(TestTreeInner {
                state: Mutex::new(TreeState {
                    retained: Some(config.retained_state.unwrap_or_default()),
                    ..TreeState::default()
                }),
                executor: config.layout_executor,
                clip_children: config.clip_children,
                prefetch_display_output: config.prefetch_display_output,
                cache_display_output: config.cache_display_output,
            }),
        }
    }

    /// Writes a value into the tree's component state. This is the explicit
    /// stand-in for a component triggering a state update; ignored once the
    /// tree has been released.
    pub fn update_state(&self, key: impl Into<String>, value: AttributeValue) {
        let mut state = self.inner.state.lock().unwrap();
        if state.released {
            return;
        }
        if let Some(retained) = state.retained.as_mut() {
            retained.set(key, value);
        }
    }

    /// Reads a value from the tree's component state.
    pub fn state_value(&self, key: &str) -> Option<AttributeValue> {
        self.inner
            .state
            .lock()
            .unwrap()
            .retained
            .as_ref()
            .and_then(|retained| retained.get(key).cloned())
    }

    /// Forces the next measurement to fail, once.
    pub fn fail_next_measure(&self) {
        self.inner.state.lock().unwrap().fail_next_measure = true;
    }

    pub fn measure_count(&self) -> usize {
        self.inner.state.lock().unwrap().measure_count
    }

    pub fn last_measured(&self) -> Option<Size> {
        self.inner.state.lock().unwrap().last_measured
    }

    pub fn is_released(&self) -> bool {
        self.inner.state.lock().unwrap().released
    }

    /// Clip-children flag the tree was built with.
    pub fn clip_children(&self) -> bool {
        self.inner.clip_children
    }

    /// Prefetch hint the tree was built with.
    pub fn prefetch_display_output(&self) -> bool {
        self.inner.prefetch_display_output
    }

    /// Cache hint the tree was built with.
    pub fn cache_display_output(&self) -> bool {
        self.inner.cache_display_output
    }
}

impl TestTreeInner {
    fn measure(
        &self,
        component: &Arc<dyn Component>,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError> {
        let mut state = self.state.lock().unwrap();
        if state.released {
            return Err(LayoutError::TreeReleased(component.name().to_string()));
        }
        if state.fail_next_measure {
            state.fail_next_measure = false;
            return Err(LayoutError::MeasureFailed {
                component: component.name().to_string(),
                reason: "forced failure".into(),
            });
        }
        let intrinsic = component
            .as_any()
            .downcast_ref::<TestComponent>()
            .map(TestComponent::intrinsic_size)
            .unwrap_or_default();
        let size = Size::new(width.resolve(intrinsic.width), height.resolve(intrinsic.height));
        state.measure_count += 1;
        state.last_measured = Some(size);
        Ok(size)
    }
}

impl LayoutTree for TestLayoutTree {
    fn set_root_and_size_spec(
        &self,
        component: &Arc<dyn Component>,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError> {
        self.inner.measure(component, width, height)
    }

    fn set_root_and_size_spec_async(
        &self,
        component: &Arc<dyn Component>,
        width: SizeSpec,
        height: SizeSpec,
        done: LayoutCompletion,
    ) {
        let inner = Arc::clone(&self.inner);
        let component = Arc::clone(component);
        let job: LayoutJob = Box::new(move || {
            done(inner.measure(&component, width, height));
        });
        match &self.inner.executor {
            Some(executor) => executor.post(job),
            None => job(),
        }
    }

    fn release(&self) {
        self.inner.state.lock().unwrap().released = true;
    }

    fn take_retained_state(&self) -> Option<RetainedState> {
        self.inner.state.lock().unwrap().retained.take()
    }
}

/// Factory producing [`TestLayoutTree`]s and remembering every tree it
/// built, so tests can reach into trees the holder created internally.
#[derive(Default)]
pub struct TestTreeFactory {
    created: Mutex<Vec<TestLayoutTree>>,
}

impl TestTreeFactory {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of trees built so far.
    pub fn created_count(&self) -> usize {
        self.created.lock().unwrap().len()
    }

    /// Handle to the most recently built tree.
    pub fn last_tree(&self) -> Option<TestLayoutTree> {
        self.created.lock().unwrap().last().cloned()
    }

    /// Handle to the `index`-th tree built.
    pub fn tree(&self, index: usize) -> Option<TestLayoutTree> {
        self.created.lock().unwrap().get(index).cloned()
    }
}

impl LayoutTreeFactory for TestTreeFactory {
    fn create(
        &self,
        _context: &LayoutContext,
        _component: &Arc<dyn Component>,
        config: TreeBuildConfig,
    ) -> Arc<dyn LayoutTree> {
        let tree = TestLayoutTree::from_config(config);
        self.created.lock().unwrap().push(tree.clone());
        Arc::new(tree)
    }
}
