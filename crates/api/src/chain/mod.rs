// Path: crates/api/src/chain/mod.rs
//! Defines the `ChainApi` trait: the chain-side operations reachable from a VM.

use lvm_types::contract::ContractInfo;
use lvm_types::error::ChainApiError;
use lvm_types::storage::{AllStorageDataChange, StorageSnapshot, StorageValue};
use lvm_types::ContextHandle;

/// Result type of every chain operation.
pub type ChainResult<T> = Result<T, ChainApiError>;

/// The binding a handler builds for one task: which transaction evaluation
/// the call belongs to and the storage snapshot registered for it.
///
/// The chain side resolves its own transaction-evaluation state from
/// `context`; the bridge never dereferences it.
#[derive(Debug, Clone, Copy)]
pub struct ChainRequest<'a> {
    /// The evaluation the call belongs to.
    pub context: ContextHandle,
    /// Storage visible to that evaluation.
    pub snapshot: &'a StorageSnapshot,
}

impl<'a> ChainRequest<'a> {
    /// Binds a handle to its snapshot.
    pub fn new(context: ContextHandle, snapshot: &'a StorageSnapshot) -> Self {
        Self { context, snapshot }
    }
}

/// One method per opcode, called only from the chain-handling thread.
///
/// Implementations own the authoritative chain state and the per-context
/// transaction-evaluation state. Domain failures are returned as
/// [`ChainApiError`]; the bridge folds them into the task's status.
/// Methods take `&self`: mutating operations use interior mutability, which
/// is uncontended as long as a single handling thread drives the API.
pub trait ChainApi: Send + Sync {
    /// Metadata of the contract deployed at `address`.
    fn get_stored_contract_info_by_address(
        &self,
        req: &ChainRequest<'_>,
        address: &str,
    ) -> ChainResult<ContractInfo>;

    /// Address of the contract registered under `name`.
    fn get_contract_address_by_name(&self, req: &ChainRequest<'_>, name: &str)
        -> ChainResult<String>;

    /// Whether a contract is registered under `name`.
    fn check_contract_exist(&self, req: &ChainRequest<'_>, name: &str) -> ChainResult<bool>;

    /// Whether a contract is deployed at `address`.
    fn check_contract_exist_by_address(
        &self,
        req: &ChainRequest<'_>,
        address: &str,
    ) -> ChainResult<bool>;

    /// Loads the contract registered under `name`.
    fn open_contract(&self, req: &ChainRequest<'_>, name: &str) -> ChainResult<ContractInfo>;

    /// Loads the contract deployed at `address`.
    fn open_contract_by_address(
        &self,
        req: &ChainRequest<'_>,
        address: &str,
    ) -> ChainResult<ContractInfo>;

    /// Reads storage cell `key` of `contract`, preferring the bound snapshot.
    fn get_storage_value(
        &self,
        req: &ChainRequest<'_>,
        contract: &str,
        key: &str,
    ) -> ChainResult<StorageValue>;

    /// Balance of `asset` held by the contract at `address`.
    fn get_contract_balance_amount(
        &self,
        req: &ChainRequest<'_>,
        address: &str,
        asset: &str,
    ) -> ChainResult<i64>;

    /// Fee paid by the transaction under evaluation.
    fn get_transaction_fee(&self, req: &ChainRequest<'_>) -> ChainResult<i64>;

    /// Timestamp (seconds) of the block being evaluated.
    fn get_chain_now(&self, req: &ChainRequest<'_>) -> ChainResult<u32>;

    /// Deterministic random value for the current block.
    fn get_chain_random(&self, req: &ChainRequest<'_>) -> ChainResult<i64>;

    /// Identifier of the transaction under evaluation.
    fn get_transaction_id(&self, req: &ChainRequest<'_>) -> ChainResult<String>;

    /// Height of the current head block.
    fn get_header_block_num(&self, req: &ChainRequest<'_>) -> ChainResult<u32>;

    /// Registers interest in the random value `blocks_ahead` blocks from now;
    /// returns the target block number to later pass to [`ChainApi::get_waited`].
    fn wait_for_future_random(&self, req: &ChainRequest<'_>, blocks_ahead: i32)
        -> ChainResult<u32>;

    /// The random value revealed at `block_num`.
    fn get_waited(&self, req: &ChainRequest<'_>, block_num: u32) -> ChainResult<i64>;

    /// Applies a contract change-set to chain state.
    fn commit_storage_changes(
        &self,
        req: &ChainRequest<'_>,
        changes: AllStorageDataChange,
    ) -> ChainResult<()>;

    /// Moves `amount` of `asset` from `contract` to the account at `to_address`.
    fn transfer_from_contract_to_address(
        &self,
        req: &ChainRequest<'_>,
        contract: &str,
        to_address: &str,
        asset: &str,
        amount: i64,
    ) -> ChainResult<()>;

    /// Moves `amount` of `asset` from `contract` to the public account named `to_account`.
    fn transfer_from_contract_to_public_account(
        &self,
        req: &ChainRequest<'_>,
        contract: &str,
        to_account: &str,
        asset: &str,
        amount: i64,
    ) -> ChainResult<()>;

    /// Appends an event to the transaction's event log.
    fn emit(
        &self,
        req: &ChainRequest<'_>,
        contract_id: &str,
        event_name: &str,
        payload: &str,
    ) -> ChainResult<()>;
}
