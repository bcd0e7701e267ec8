// Path: crates/types/src/handle.rs
//! Opaque identities for in-flight transaction evaluations.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

/// Identifies one in-flight transaction evaluation.
///
/// A handle is only ever used as a lookup key. It carries no pointer and no
/// way to reach the evaluation it names, so it can outlive that evaluation
/// safely: a stale handle simply finds nothing registered.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, Encode, Decode,
)]
pub struct ContextHandle {
    /// Slot index.
    pub index: u32,
    /// Incremented each time the index space wraps, so a recycled index
    /// never compares equal to an earlier handle.
    pub generation: u32,
}

impl ContextHandle {
    /// Builds a handle from its packed `u64` form (generation in the high word).
    pub const fn from_raw(raw: u64) -> Self {
        Self {
            index: raw as u32,
            generation: (raw >> 32) as u32,
        }
    }

    /// Returns the packed `u64` form, suitable for passing through a VM as an integer.
    pub const fn as_raw(self) -> u64 {
        ((self.generation as u64) << 32) | self.index as u64
    }
}

impl fmt::Display for ContextHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}v{}", self.index, self.generation)
    }
}

impl From<u64> for ContextHandle {
    fn from(raw: u64) -> Self {
        Self::from_raw(raw)
    }
}

/// Hands out unique [`ContextHandle`]s to the transaction-evaluation subsystem.
#[derive(Debug)]
pub struct HandleAllocator {
    next: AtomicU64,
}

impl Default for HandleAllocator {
    fn default() -> Self {
        Self::new()
    }
}

impl HandleAllocator {
    /// Creates an allocator whose first handle is `1v0`.
    pub const fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Returns a handle that has never been returned by this allocator before.
    pub fn allocate(&self) -> ContextHandle {
        ContextHandle::from_raw(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn raw_form_packs_generation_in_high_word() {
        let handle = ContextHandle {
            index: 7,
            generation: 2,
        };
        assert_eq!(handle.as_raw(), (2u64 << 32) | 7);
        assert_eq!(ContextHandle::from_raw(handle.as_raw()), handle);
        assert_eq!(ContextHandle::from(42).index, 42);
    }

    #[test]
    fn allocator_never_repeats() {
        let alloc = HandleAllocator::new();
        let handles: HashSet<_> = (0..1000).map(|_| alloc.allocate()).collect();
        assert_eq!(handles.len(), 1000);
    }

    #[test]
    fn index_wrap_bumps_generation() {
        let alloc = HandleAllocator {
            next: AtomicU64::new(u32::MAX as u64),
        };
        let last = alloc.allocate();
        let wrapped = alloc.allocate();
        assert_eq!(last.generation, 0);
        assert_eq!(wrapped.index, 0);
        assert_eq!(wrapped.generation, 1);
    }
}
