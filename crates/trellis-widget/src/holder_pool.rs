//! Bounded recycling pool for tree holders.

use std::sync::{Arc, Mutex, MutexGuard};

use smallvec::SmallVec;
use trellis_core::{LayoutExecutor, RenderSlot};

use crate::{HolderConfig, TreeHolder};

/// Default number of reset holders kept for reuse.
pub const DEFAULT_POOL_CAPACITY: usize = 8;

/// Policy controlling holder recycling.
#[derive(Clone, Debug)]
pub struct PoolPolicy {
    /// Maximum number of reset holders kept around.
    pub capacity: usize,

    /// Whether recycling is enabled at all.
    pub enabled: bool,
}

impl Default for PoolPolicy {
    fn default() -> Self {
        Self {
            capacity: DEFAULT_POOL_CAPACITY,
            enabled: true,
        }
    }
}

impl PoolPolicy {
    /// Creates a policy with the specified capacity.
    pub fn new(capacity: usize) -> Self {
        Self {
            capacity,
            enabled: true,
        }
    }

    /// Disables recycling; every acquire constructs a fresh holder.
    pub fn disabled() -> Self {
        Self {
            capacity: 0,
            enabled: false,
        }
    }
}

/// Holder lifecycle statistics.
///
/// Used for testing and debugging recycling behavior.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct PoolStats {
    /// Holders constructed because the free list was empty.
    pub created: usize,

    /// Acquires served from the free list.
    pub reused: usize,

    /// Releases that returned the holder to the free list.
    pub recycled: usize,

    /// Releases dropped because the free list was full.
    pub dropped: usize,
}

/// Hands out and recycles [`TreeHolder`] instances.
///
/// The free list is a bounded stack of fully reset holders guarded by the
/// pool's own lock, independent of any holder's lock. Pool exhaustion is
/// never an error: an empty free list just constructs a fresh instance, and
/// releasing into a full one silently drops the holder.
pub struct HolderPool {
    inner: Mutex<PoolInner>,
}

struct PoolInner {
    free: SmallVec<[TreeHolder; DEFAULT_POOL_CAPACITY]>,
    stats: PoolStats,
    policy: PoolPolicy,
}

impl HolderPool {
    /// Creates a pool with the default policy.
    pub fn new() -> Self {
        Self::with_policy(PoolPolicy::default())
    }

    /// Creates a pool with the specified policy.
    pub fn with_policy(policy: PoolPolicy) -> Self {
        Self {
            inner: Mutex::new(PoolInner {
                free: SmallVec::new(),
                stats: PoolStats::default(),
                policy,
            }),
        }
    }

    /// Returns a holder bound to `slot`, reusing a reset instance when one
    /// is available.
    pub fn acquire(
        &self,
        slot: RenderSlot,
        executor: Arc<dyn LayoutExecutor>,
        config: HolderConfig,
    ) -> TreeHolder {
        let recycled = {
            let mut inner = self.lock();
            let holder = inner.free.pop();
            if holder.is_some() {
                inner.stats.reused += 1;
            } else {
                inner.stats.created += 1;
            }
            holder
        };
        let holder = recycled.unwrap_or_else(TreeHolder::new);
        holder.bind(slot, executor, config);
        holder
    }

    /// Tears the holder down and returns it to the free list.
    ///
    /// The holder releases its tree and clears slot, state, executor, and
    /// hints before it is stored. Capacity overflow drops the instance.
    pub fn release(&self, holder: TreeHolder) {
        holder.reset();
        let mut inner = self.lock();
        if inner.policy.enabled && inner.free.len() < inner.policy.capacity {
            inner.free.push(holder);
            inner.stats.recycled += 1;
        } else {
            inner.stats.dropped += 1;
            log::trace!("holder pool full, dropping released instance");
        }
    }

    /// Number of reset holders currently available.
    pub fn available(&self) -> usize {
        self.lock().free.len()
    }

    /// Snapshot of the lifecycle counters.
    pub fn stats(&self) -> PoolStats {
        self.lock().stats
    }

    /// Drops every holder on the free list.
    pub fn clear(&self) {
        self.lock().free.clear();
    }

    fn lock(&self) -> MutexGuard<'_, PoolInner> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }
}

impl Default for HolderPool {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use trellis_testing::{ManualExecutor, TestComponent};

    fn slot(name: &str) -> RenderSlot {
        RenderSlot::new(Arc::new(TestComponent::new(name)))
    }

    fn executor() -> Arc<ManualExecutor> {
        Arc::new(ManualExecutor::new())
    }

    #[test]
    fn test_acquire_reuses_released_holder() {
        let pool = HolderPool::new();
        let executor = executor();

        let first = pool.acquire(slot("a"), executor.clone(), HolderConfig::default());
        pool.release(first);
        assert_eq!(pool.available(), 1);

        let second = pool.acquire(slot("b"), executor.clone(), HolderConfig::default());
        assert_eq!(pool.available(), 0);
        assert_eq!(second.render_slot().unwrap().component().name(), "b");

        let stats = pool.stats();
        assert_eq!(stats.created, 1);
        assert_eq!(stats.reused, 1);
        assert_eq!(stats.recycled, 1);
    }

    #[test]
    fn test_capacity_overflow_drops() {
        let pool = HolderPool::with_policy(PoolPolicy::new(2));
        let executor = executor();

        let holders: Vec<_> = (0..5)
            .map(|i| pool.acquire(slot(&format!("item-{i}")), executor.clone(), HolderConfig::default()))
            .collect();
        for holder in holders {
            pool.release(holder);
        }

        assert_eq!(pool.available(), 2);
        let stats = pool.stats();
        assert_eq!(stats.recycled, 2);
        assert_eq!(stats.dropped, 3);
    }

    #[test]
    fn test_disabled_policy_never_recycles() {
        let pool = HolderPool::with_policy(PoolPolicy::disabled());
        let executor = executor();

        let holder = pool.acquire(slot("a"), executor.clone(), HolderConfig::default());
        pool.release(holder);

        assert_eq!(pool.available(), 0);
        assert_eq!(pool.stats().dropped, 1);
    }

    #[test]
    fn test_released_holder_is_reset_before_reuse() {
        let pool = HolderPool::new();
        let executor = executor();

        let holder = pool.acquire(
            slot("a"),
            executor.clone(),
            HolderConfig {
                prefetch_display_output: true,
                cache_display_output: true,
            },
        );
        pool.release(holder);

        let reused = pool.acquire(slot("b"), executor.clone(), HolderConfig::default());
        assert!(reused.render_slot().is_some());
        assert!(reused.layout_tree().is_none());
        assert!(!reused.is_tree_valid());
        assert!(!reused.has_retained_state());
    }

    #[test]
    fn test_clear_empties_free_list() {
        let pool = HolderPool::new();
        let executor = executor();
        let holder = pool.acquire(slot("a"), executor, HolderConfig::default());
        pool.release(holder);
        assert_eq!(pool.available(), 1);

        pool.clear();
        assert_eq!(pool.available(), 0);
    }
}
