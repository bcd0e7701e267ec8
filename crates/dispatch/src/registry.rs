// Path: crates/dispatch/src/registry.rs
//! Maps execution-context handles to the storage snapshot of their evaluation.

use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use lvm_types::storage::StorageSnapshot;
use lvm_types::ContextHandle;
use std::sync::Arc;

/// The per-execution-context snapshot table shared by the evaluation
/// lifecycle (register/unregister) and the handling thread (lookup).
///
/// Registration is first-writer-wins. The registry performs no cleanup of its
/// own: whoever registers a handle must unregister it when the evaluation
/// ends, or use [`StorageRegistry::enter`] to tie that to a scope.
#[derive(Debug, Default)]
pub struct StorageRegistry {
    snapshots: DashMap<ContextHandle, Arc<StorageSnapshot>>,
}

impl StorageRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Registers `snapshot` for `handle` if none is registered yet.
    ///
    /// Returns `true` if this call inserted the snapshot; an existing entry is
    /// left untouched.
    pub fn register(&self, handle: ContextHandle, snapshot: StorageSnapshot) -> bool {
        match self.snapshots.entry(handle) {
            Entry::Occupied(_) => {
                tracing::debug!(target: "registry", %handle, "snapshot already registered; keeping first");
                false
            }
            Entry::Vacant(slot) => {
                slot.insert(Arc::new(snapshot));
                tracing::trace!(target: "registry", %handle, "snapshot registered");
                true
            }
        }
    }

    /// Removes the snapshot for `handle`. Returns `true` if one was present.
    pub fn unregister(&self, handle: ContextHandle) -> bool {
        let removed = self.snapshots.remove(&handle).is_some();
        if removed {
            tracing::trace!(target: "registry", %handle, "snapshot unregistered");
        }
        removed
    }

    /// The snapshot registered for `handle`, if any.
    pub fn lookup(&self, handle: ContextHandle) -> Option<Arc<StorageSnapshot>> {
        self.snapshots
            .get(&handle)
            .map(|entry| Arc::clone(entry.value()))
    }

    pub fn contains(&self, handle: ContextHandle) -> bool {
        self.snapshots.contains_key(&handle)
    }

    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// Registers `snapshot` for the lifetime of the returned guard.
    ///
    /// If the handle was already registered the guard does not own the entry
    /// and dropping it leaves the existing registration in place.
    pub fn enter(&self, handle: ContextHandle, snapshot: StorageSnapshot) -> ContextGuard<'_> {
        let owned = self.register(handle, snapshot);
        ContextGuard {
            registry: self,
            handle,
            owned,
        }
    }
}

/// Unregisters its handle on drop, covering success, failure and early-return
/// paths of a transaction evaluation alike.
#[must_use = "dropping the guard unregisters the snapshot immediately"]
#[derive(Debug)]
pub struct ContextGuard<'a> {
    registry: &'a StorageRegistry,
    handle: ContextHandle,
    owned: bool,
}

impl ContextGuard<'_> {
    pub fn handle(&self) -> ContextHandle {
        self.handle
    }

    /// Whether this guard created the registration it will remove.
    pub fn is_owner(&self) -> bool {
        self.owned
    }
}

impl Drop for ContextGuard<'_> {
    fn drop(&mut self) {
        if self.owned {
            self.registry.unregister(self.handle);
        }
    }
}
