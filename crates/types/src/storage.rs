// Path: crates/types/src/storage.rs
//! Storage values as seen by contracts, per-context snapshots and change-sets.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// A typed contract storage value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode, Default)]
pub enum StorageValue {
    /// Absent or explicitly cleared cell.
    #[default]
    Nil,
    /// Boolean cell.
    Bool(bool),
    /// Integer cell.
    Int(i64),
    /// UTF-8 string cell.
    String(String),
    /// Raw byte cell.
    Bytes(Vec<u8>),
    /// Nested table, keyed by string.
    Table(BTreeMap<String, StorageValue>),
}

impl StorageValue {
    /// Returns `true` for [`StorageValue::Nil`].
    pub fn is_nil(&self) -> bool {
        matches!(self, StorageValue::Nil)
    }
}

impl From<&str> for StorageValue {
    fn from(s: &str) -> Self {
        StorageValue::String(s.to_string())
    }
}

impl From<String> for StorageValue {
    fn from(s: String) -> Self {
        StorageValue::String(s)
    }
}

impl From<i64> for StorageValue {
    fn from(v: i64) -> Self {
        StorageValue::Int(v)
    }
}

impl From<bool> for StorageValue {
    fn from(v: bool) -> Self {
        StorageValue::Bool(v)
    }
}

/// The storage cells visible to one transaction evaluation.
///
/// A snapshot is created when the evaluation begins and is read-only from
/// the bridge's point of view; the evaluation lifecycle owns it.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct StorageSnapshot {
    cells: BTreeMap<String, StorageValue>,
}

impl StorageSnapshot {
    /// Creates an empty snapshot.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the cell stored under `key`.
    pub fn get(&self, key: &str) -> Option<&StorageValue> {
        self.cells.get(key)
    }

    /// Sets `key` to `value`, returning the previous value.
    pub fn insert(&mut self, key: impl Into<String>, value: StorageValue) -> Option<StorageValue> {
        self.cells.insert(key.into(), value)
    }

    /// Number of cells.
    pub fn len(&self) -> usize {
        self.cells.len()
    }

    /// Returns `true` if the snapshot holds no cells.
    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }

    /// Iterates cells in key order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &StorageValue)> {
        self.cells.iter()
    }
}

impl<K: Into<String>, V: Into<StorageValue>> FromIterator<(K, V)> for StorageSnapshot {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            cells: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

/// One buffered write: the value a contract saw and the value it wants stored.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct StorageChange {
    /// Storage cell name.
    pub key: String,
    /// Value observed before the write.
    pub before: StorageValue,
    /// Value to store.
    pub after: StorageValue,
}

/// All buffered writes of a single contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ContractStorageChanges {
    /// Contract whose storage is being written.
    pub contract_id: String,
    /// Ordered writes.
    pub changes: Vec<StorageChange>,
}

/// The structured change-set decoded for `COMMIT_STORAGE_CHANGES`.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize, Encode, Decode)]
pub struct AllStorageDataChange(pub Vec<ContractStorageChanges>);

impl AllStorageDataChange {
    /// Total number of cell writes across every contract.
    pub fn total_changes(&self) -> usize {
        self.0.iter().map(|c| c.changes.len()).sum()
    }
}
