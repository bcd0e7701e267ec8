// Path: crates/types/src/contract.rs
//! Contract metadata and the event records contracts emit.

use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};

/// Metadata the chain keeps for a deployed contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct ContractInfo {
    /// Contract address.
    pub address: String,
    /// Registered name; empty for anonymous contracts.
    pub name: String,
    /// Owner account address.
    pub owner: String,
    /// Contract level (temporary or forever).
    pub level: u8,
    /// Callable APIs.
    pub apis: Vec<String>,
    /// APIs callable without a transaction.
    pub offline_apis: Vec<String>,
    /// Declared event names.
    pub events: Vec<String>,
}

/// An event appended to a transaction's event log by `EMIT`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct EventRecord {
    /// Emitting contract.
    pub contract_id: String,
    /// Event name.
    pub event_name: String,
    /// Opaque event payload, usually JSON.
    pub payload: String,
}
