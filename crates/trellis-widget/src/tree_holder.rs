//! Thread-safe lifecycle handle for one list position's layout tree.

use std::sync::{Arc, Mutex, MutexGuard};

use trellis_core::{
    Component, LayoutContext, LayoutError, LayoutExecutor, LayoutTree, RenderSlot, RetainedState,
    Size, SizeSpec, TreeBuildConfig,
};

/// Tree-construction hints carried by a holder and forwarded to the factory
/// whenever a tree is built for its slot.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct HolderConfig {
    /// Display output may be prefetched before the item becomes visible.
    pub prefetch_display_output: bool,
    /// Drawn display output may be cached across frames.
    pub cache_display_output: bool,
}

/// Binds one [`RenderSlot`] to at most one live layout tree.
///
/// The holder mediates synchronous and asynchronous layout computation,
/// tracks whether the computed layout is still valid for the currently
/// bound slot, and preserves component state across tree release/rebuild
/// cycles. All bookkeeping sits behind one per-holder lock; the expensive
/// measurement itself always runs with the lock dropped, and a generation
/// token captured with the pre-measurement snapshot decides afterwards
/// whether the result may still mark the holder valid. A slot replacement
/// or tree release that raced with an in-flight measurement bumps the
/// generation, so the stale result is discarded instead of corrupting the
/// holder.
///
/// Handles are cheap to clone; every clone refers to the same holder.
#[derive(Clone)]
pub struct TreeHolder {
    inner: Arc<Mutex<TreeHolderState>>,
}

#[derive(Default)]
struct TreeHolderState {
    slot: Option<RenderSlot>,
    tree: Option<Arc<dyn LayoutTree>>,
    retained_state: Option<RetainedState>,
    tree_valid: bool,
    layout_executor: Option<Arc<dyn LayoutExecutor>>,
    config: HolderConfig,
    /// Bumped on slot replacement, tree build, tree release, and reset.
    /// In-flight measurements compare their snapshot against this before
    /// marking the holder valid.
    generation: u64,
}

impl TreeHolder {
    pub(crate) fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(TreeHolderState::default())),
        }
    }

    pub(crate) fn bind(
        &self,
        slot: RenderSlot,
        executor: Arc<dyn LayoutExecutor>,
        config: HolderConfig,
    ) {
        let mut state = lock_state(&self.inner);
        state.slot = Some(slot);
        state.layout_executor = Some(executor);
        state.config = config;
    }

    /// Computes a layout for the given constraints, blocking the caller for
    /// the full measurement.
    ///
    /// Builds the tree first if the holder has none, consuming any retained
    /// state. On success the holder is marked valid unless a concurrent slot
    /// replacement or tree release superseded this computation; the measured
    /// size is returned to the caller either way.
    ///
    /// # Panics
    ///
    /// Panics if no render slot is bound (layout before `acquire` or after
    /// release is a programming error).
    pub fn compute_layout_sync(
        &self,
        context: &LayoutContext,
        width: SizeSpec,
        height: SizeSpec,
    ) -> Result<Size, LayoutError> {
        let (tree, component, generation) = self.snapshot_for_layout(context);

        // Measurement can take tens of milliseconds; it must not serialize
        // getters and invalidation behind this holder's lock.
        let size = tree.set_root_and_size_spec(&component, width, height)?;

        let mut state = lock_state(&self.inner);
        if state.generation == generation {
            state.tree_valid = true;
        }
        Ok(size)
    }

    /// Like [`compute_layout_sync`] but hands the measurement to the tree's
    /// layout executor and returns immediately.
    ///
    /// There is no result channel: freshness is observed later through
    /// [`is_tree_valid`]. A completion that raced with a slot replacement or
    /// release is discarded, and a failed measurement never validates the
    /// holder.
    ///
    /// [`compute_layout_sync`]: TreeHolder::compute_layout_sync
    /// [`is_tree_valid`]: TreeHolder::is_tree_valid
    pub fn compute_layout_async(&self, context: &LayoutContext, width: SizeSpec, height: SizeSpec) {
        let (tree, component, generation) = self.snapshot_for_layout(context);

        let inner = Arc::clone(&self.inner);
        tree.set_root_and_size_spec_async(
            &component,
            width,
            height,
            Box::new(move |result| {
                if result.is_err() {
                    return;
                }
                let mut state = lock_state(&inner);
                if state.generation == generation {
                    state.tree_valid = true;
                }
            }),
        );
    }

    /// Whether the last layout computation still matches the bound slot.
    pub fn is_tree_valid(&self) -> bool {
        lock_state(&self.inner).tree_valid
    }

    /// The live layout tree, if one has been built and not yet released.
    pub fn layout_tree(&self) -> Option<Arc<dyn LayoutTree>> {
        lock_state(&self.inner).tree.clone()
    }

    /// The currently bound render slot, if any.
    pub fn render_slot(&self) -> Option<RenderSlot> {
        lock_state(&self.inner).slot.clone()
    }

    /// Replaces the bound slot and drops validity immediately.
    ///
    /// The existing tree is kept; the next layout call re-roots it on the
    /// new component. Any in-flight measurement for the old slot can no
    /// longer mark the holder valid.
    pub fn set_render_slot(&self, slot: RenderSlot) {
        let mut state = lock_state(&self.inner);
        state.tree_valid = false;
        state.generation = state.generation.wrapping_add(1);
        state.slot = Some(slot);
    }

    /// Marks the current layout stale without touching the tree. Rebuilding
    /// is deferred to the next layout call.
    pub fn invalidate_tree(&self) {
        lock_state(&self.inner).tree_valid = false;
    }

    /// Extracts the component state from the current tree, releases the
    /// tree, and drops validity, all under one lock acquisition.
    ///
    /// Used when the item leaves the working range: the full tree's memory
    /// is freed while enough state survives to resume cheaply later.
    pub fn acquire_state_and_release_tree(&self) {
        let mut state = lock_state(&self.inner);
        if let Some(tree) = state.tree.take() {
            state.retained_state = tree.take_retained_state();
            tree.release();
            state.generation = state.generation.wrapping_add(1);
            log::trace!("released layout tree, retained state kept");
        }
        state.tree_valid = false;
    }

    /// Drops any retained state without touching the tree.
    pub fn clear_retained_state(&self) {
        lock_state(&self.inner).retained_state = None;
    }

    /// Whether the holder currently carries state for a future tree.
    pub fn has_retained_state(&self) -> bool {
        lock_state(&self.inner).retained_state.is_some()
    }

    /// Tears everything down: releases the tree, clears slot, state,
    /// executor, and hints. The holder is afterwards indistinguishable from
    /// a freshly constructed one and safe to rebind to an unrelated slot.
    pub(crate) fn reset(&self) {
        let mut state = lock_state(&self.inner);
        if let Some(tree) = state.tree.take() {
            tree.release();
        }
        state.retained_state = None;
        state.slot = None;
        state.layout_executor = None;
        state.config = HolderConfig::default();
        state.tree_valid = false;
        state.generation = state.generation.wrapping_add(1);
    }

    /// Locks, builds the tree if absent, and snapshots everything the
    /// unlocked measurement needs: the tree, the rendered component, and
    /// the generation token to compare against afterwards.
    fn snapshot_for_layout(
        &self,
        context: &LayoutContext,
    ) -> (Arc<dyn LayoutTree>, Arc<dyn Component>, u64) {
        let mut state = lock_state(&self.inner);
        let (tree, component) = state.ensure_tree(context);
        (tree, component, state.generation)
    }
}

impl TreeHolderState {
    fn ensure_tree(&mut self, context: &LayoutContext) -> (Arc<dyn LayoutTree>, Arc<dyn Component>) {
        let (component, clip_children) = match &self.slot {
            Some(slot) => (Arc::clone(slot.component()), slot.clip_children()),
            None => panic!("layout requested on a holder with no bound render slot"),
        };

        if let Some(tree) = &self.tree {
            return (Arc::clone(tree), component);
        }

        let config = TreeBuildConfig {
            retained_state: self.retained_state.take(),
            layout_executor: self.layout_executor.clone(),
            clip_children,
            prefetch_display_output: self.config.prefetch_display_output,
            cache_display_output: self.config.cache_display_output,
        };
        let tree = context.factory().create(context, &component, config);
        log::trace!("built layout tree for `{}`", component.name());
        self.generation = self.generation.wrapping_add(1);
        self.tree = Some(Arc::clone(&tree));
        (tree, component)
    }
}

/// Panics inside the lock (factory misbehavior) poison the mutex; the state
/// transitions are ordered so a poisoned guard is still coherent, and
/// recovering it keeps unrelated bindings alive.
fn lock_state(inner: &Mutex<TreeHolderState>) -> MutexGuard<'_, TreeHolderState> {
    match inner.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trellis_testing::{ManualExecutor, TestComponent, TestTreeFactory};

    fn harness() -> (Arc<TestTreeFactory>, LayoutContext, Arc<ManualExecutor>) {
        let factory = Arc::new(TestTreeFactory::new());
        let context = LayoutContext::new(factory.clone());
        (factory, context, Arc::new(ManualExecutor::new()))
    }

    fn slot(name: &str) -> RenderSlot {
        RenderSlot::new(Arc::new(TestComponent::new(name).with_intrinsic_size(60.0, 40.0)))
    }

    #[test]
    #[should_panic(expected = "no bound render slot")]
    fn test_layout_without_slot_panics() {
        let (_, context, _) = harness();
        let holder = TreeHolder::new();
        let _ = holder.compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0));
    }

    #[test]
    fn test_fresh_holder_has_nothing() {
        let holder = TreeHolder::new();
        assert!(!holder.is_tree_valid());
        assert!(holder.layout_tree().is_none());
        assert!(holder.render_slot().is_none());
        assert!(!holder.has_retained_state());
    }

    #[test]
    fn test_sync_layout_builds_tree_and_validates() {
        let (factory, context, executor) = harness();
        let holder = TreeHolder::new();
        holder.bind(slot("row"), executor, HolderConfig::default());

        let size = holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();

        assert_eq!(size, Size::new(60.0, 40.0));
        assert!(holder.is_tree_valid());
        assert!(holder.layout_tree().is_some());
        assert_eq!(factory.created_count(), 1);
    }

    #[test]
    fn test_second_layout_reuses_tree() {
        let (factory, context, executor) = harness();
        let holder = TreeHolder::new();
        holder.bind(slot("row"), executor, HolderConfig::default());

        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();
        holder
            .compute_layout_sync(&context, SizeSpec::Exactly(80.0), SizeSpec::AtMost(100.0))
            .unwrap();

        assert_eq!(factory.created_count(), 1);
    }

    #[test]
    fn test_replacing_slot_drops_validity() {
        let (_, context, executor) = harness();
        let holder = TreeHolder::new();
        holder.bind(slot("a"), executor, HolderConfig::default());
        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();
        assert!(holder.is_tree_valid());

        holder.set_render_slot(slot("b"));
        assert!(!holder.is_tree_valid());
        // The tree is kept for re-rooting.
        assert!(holder.layout_tree().is_some());
    }

    #[test]
    fn test_invalidate_clears_flag_but_keeps_tree() {
        let (_, context, executor) = harness();
        let holder = TreeHolder::new();
        holder.bind(slot("row"), executor, HolderConfig::default());
        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();

        holder.invalidate_tree();
        assert!(!holder.is_tree_valid());
        assert!(holder.layout_tree().is_some());

        // Recomputing with the same slot validates again.
        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();
        assert!(holder.is_tree_valid());
    }

    #[test]
    fn test_release_tree_moves_state_into_holder() {
        let (factory, context, executor) = harness();
        let holder = TreeHolder::new();
        holder.bind(slot("row"), executor, HolderConfig::default());
        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();

        let tree = factory.last_tree().unwrap();
        tree.update_state("counter", trellis_core::AttributeValue::Int(7));

        holder.acquire_state_and_release_tree();
        assert!(holder.layout_tree().is_none());
        assert!(!holder.is_tree_valid());
        assert!(holder.has_retained_state());
        assert!(tree.is_released());
    }

    #[test]
    fn test_clear_retained_state() {
        let (factory, context, executor) = harness();
        let holder = TreeHolder::new();
        holder.bind(slot("row"), executor, HolderConfig::default());
        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();
        factory
            .last_tree()
            .unwrap()
            .update_state("counter", trellis_core::AttributeValue::Int(7));
        holder.acquire_state_and_release_tree();
        assert!(holder.has_retained_state());

        holder.clear_retained_state();
        assert!(!holder.has_retained_state());

        // The next tree starts from scratch.
        holder
            .compute_layout_sync(&context, SizeSpec::AtMost(100.0), SizeSpec::AtMost(100.0))
            .unwrap();
        assert!(factory.last_tree().unwrap().state_value("counter").is_none());
    }
}
