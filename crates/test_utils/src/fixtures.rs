// Path: crates/test_utils/src/fixtures.rs
//! Canned contracts, snapshots and parameter encoders.

use lvm_types::contract::ContractInfo;
use lvm_types::storage::{StorageSnapshot, StorageValue};
use parity_scale_codec::Encode;

/// Address of the contract installed by [`crate::InstrumentedChain::with_fixtures`].
pub const CONTRACT_A: &str = "CON_contractA";
/// Registered name of [`CONTRACT_A`].
pub const CONTRACT_A_NAME: &str = "contractA";
/// Asset symbol used by the fixtures.
pub const ASSET: &str = "ALP";
/// A plain account address.
pub const ALICE: &str = "ALPalice";
/// A registered public account name.
pub const PUBLIC_BOB: &str = "bob";
/// Initial [`ASSET`] balance of [`CONTRACT_A`].
pub const CONTRACT_A_BALANCE: i64 = 1_000;

/// Metadata of [`CONTRACT_A`].
pub fn contract_a() -> ContractInfo {
    ContractInfo {
        address: CONTRACT_A.to_string(),
        name: CONTRACT_A_NAME.to_string(),
        owner: ALICE.to_string(),
        level: 1,
        apis: vec!["init".into(), "transfer".into()],
        offline_apis: vec!["balance_of".into()],
        events: vec!["Transfer".into()],
    }
}

/// A snapshot of string cells.
pub fn snapshot(pairs: &[(&str, &str)]) -> StorageSnapshot {
    pairs
        .iter()
        .map(|(k, v)| (*k, StorageValue::from(*v)))
        .collect()
}

/// SCALE-encodes one task parameter.
pub fn param<T: Encode>(value: T) -> Vec<u8> {
    value.encode()
}

/// SCALE-encodes a list of string parameters.
pub fn str_params(values: &[&str]) -> Vec<Vec<u8>> {
    values.iter().map(|v| v.to_string().encode()).collect()
}
