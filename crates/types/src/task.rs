// Path: crates/types/src/task.rs
//! The request/response pair that crosses the VM / chain-handling thread boundary.

use crate::handle::ContextHandle;
use parity_scale_codec::{Decode, Encode};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Selects which chain operation a VM request performs.
///
/// Tasks carry the raw `u32` tag so values outside this set can still be
/// represented, echoed back and rejected explicitly.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[repr(u32)]
pub enum Opcode {
    /// Look up stored contract metadata by contract address.
    GetStoredContractInfoByAddress = 1,
    /// Resolve a registered contract name to its address.
    GetContractAddressByName = 2,
    /// Check whether a contract with the given name exists.
    CheckContractExist = 3,
    /// Check whether a contract with the given address exists.
    CheckContractExistByAddress = 4,
    /// Load a contract's context by name.
    OpenContract = 5,
    /// Load a contract's context by address.
    OpenContractByAddress = 6,
    /// Read one storage cell of a contract.
    GetStorageValueFromChain = 7,
    /// Read a contract's balance of one asset.
    GetContractBalanceAmount = 8,
    /// Fee paid by the transaction under evaluation.
    GetTransactionFee = 9,
    /// Timestamp of the block being evaluated.
    GetChainNow = 10,
    /// Deterministic pseudo-random value for the current block.
    GetChainRandom = 11,
    /// Identifier of the transaction under evaluation.
    GetTransactionId = 12,
    /// Height of the current head block.
    GetHeaderBlockNum = 13,
    /// Register a dependency on randomness revealed in a future block.
    WaitForFutureRandom = 14,
    /// Poll a value previously requested through `WaitForFutureRandom`.
    GetWaited = 15,
    /// Apply a contract's buffered storage writes to chain state.
    CommitStorageChanges = 16,
    /// Move value from a contract balance to an address.
    TransferFromContractToAddress = 17,
    /// Move value from a contract balance to a named public account.
    TransferFromContractToPublicAccount = 18,
    /// Append an event record to the transaction's event log.
    Emit = 19,
}

impl Opcode {
    /// Every known opcode, in tag order.
    pub const ALL: [Opcode; 19] = [
        Opcode::GetStoredContractInfoByAddress,
        Opcode::GetContractAddressByName,
        Opcode::CheckContractExist,
        Opcode::CheckContractExistByAddress,
        Opcode::OpenContract,
        Opcode::OpenContractByAddress,
        Opcode::GetStorageValueFromChain,
        Opcode::GetContractBalanceAmount,
        Opcode::GetTransactionFee,
        Opcode::GetChainNow,
        Opcode::GetChainRandom,
        Opcode::GetTransactionId,
        Opcode::GetHeaderBlockNum,
        Opcode::WaitForFutureRandom,
        Opcode::GetWaited,
        Opcode::CommitStorageChanges,
        Opcode::TransferFromContractToAddress,
        Opcode::TransferFromContractToPublicAccount,
        Opcode::Emit,
    ];

    /// The raw wire tag.
    pub const fn as_u32(self) -> u32 {
        self as u32
    }

    /// Stable name used in logs and metric labels.
    pub const fn name(self) -> &'static str {
        match self {
            Opcode::GetStoredContractInfoByAddress => "GET_STORED_CONTRACT_INFO_BY_ADDRESS",
            Opcode::GetContractAddressByName => "GET_CONTRACT_ADDRESS_BY_NAME",
            Opcode::CheckContractExist => "CHECK_CONTRACT_EXIST",
            Opcode::CheckContractExistByAddress => "CHECK_CONTRACT_EXIST_BY_ADDRESS",
            Opcode::OpenContract => "OPEN_CONTRACT",
            Opcode::OpenContractByAddress => "OPEN_CONTRACT_BY_ADDRESS",
            Opcode::GetStorageValueFromChain => "GET_STORAGE_VALUE_FROM_CHAIN",
            Opcode::GetContractBalanceAmount => "GET_CONTRACT_BALANCE_AMOUNT",
            Opcode::GetTransactionFee => "GET_TRANSACTION_FEE",
            Opcode::GetChainNow => "GET_CHAIN_NOW",
            Opcode::GetChainRandom => "GET_CHAIN_RANDOM",
            Opcode::GetTransactionId => "GET_TRANSACTION_ID",
            Opcode::GetHeaderBlockNum => "GET_HEADER_BLOCK_NUM",
            Opcode::WaitForFutureRandom => "WAIT_FOR_FUTURE_RANDOM",
            Opcode::GetWaited => "GET_WAITED",
            Opcode::CommitStorageChanges => "COMMIT_STORAGE_CHANGES",
            Opcode::TransferFromContractToAddress => "TRANSFER_FROM_CONTRACT_TO_ADDRESS",
            Opcode::TransferFromContractToPublicAccount => {
                "TRANSFER_FROM_CONTRACT_TO_PUBLIC_ACCOUNT"
            }
            Opcode::Emit => "EMIT",
        }
    }
}

impl TryFrom<u32> for Opcode {
    type Error = u32;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Opcode::ALL
            .iter()
            .copied()
            .find(|op| op.as_u32() == value)
            .ok_or(value)
    }
}

impl From<Opcode> for u32 {
    fn from(op: Opcode) -> Self {
        op.as_u32()
    }
}

impl fmt::Display for Opcode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Outcome of handling one task, carried back to the VM as a numeric code.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Encode, Decode, Default,
)]
pub enum TaskStatus {
    /// The chain operation ran and its return values are attached.
    #[default]
    Ok,
    /// Fewer parameters than the opcode requires; the chain was not called.
    ParameterCountError,
    /// A parameter did not decode to its expected type; the chain was not called.
    BadParameterEncoding,
    /// No storage snapshot is registered for the task's execution context.
    MissingContext,
    /// The chain API rejected the operation (unknown contract, insufficient funds, ...).
    ChainOperationError,
    /// The opcode is outside the known set.
    UnknownOpcode,
}

impl TaskStatus {
    /// The numeric status handed to the VM's native-call layer.
    pub const fn code(self) -> i32 {
        match self {
            TaskStatus::Ok => 0,
            TaskStatus::ParameterCountError => -1,
            TaskStatus::BadParameterEncoding => -2,
            TaskStatus::MissingContext => -3,
            TaskStatus::ChainOperationError => -4,
            TaskStatus::UnknownOpcode => -5,
        }
    }

    /// Stable label used in logs and metric labels.
    pub const fn label(self) -> &'static str {
        match self {
            TaskStatus::Ok => "Ok",
            TaskStatus::ParameterCountError => "ParameterCountError",
            TaskStatus::BadParameterEncoding => "BadParameterEncoding",
            TaskStatus::MissingContext => "MissingContext",
            TaskStatus::ChainOperationError => "ChainOperationError",
            TaskStatus::UnknownOpcode => "UnknownOpcode",
        }
    }

    /// Returns `true` for [`TaskStatus::Ok`].
    pub const fn is_ok(self) -> bool {
        matches!(self, TaskStatus::Ok)
    }
}

/// One native call from the VM, consumed exactly once by the handling thread.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct Task {
    /// Identifies this call; echoed in the matching [`TaskResult`].
    pub correlation_id: u64,
    /// Raw opcode tag, see [`Opcode`].
    pub opcode: u32,
    /// Ordered, SCALE-encoded parameters.
    pub params: Vec<Vec<u8>>,
    /// The transaction evaluation this call belongs to.
    pub context: ContextHandle,
}

impl Task {
    /// Creates a task for a known opcode.
    pub fn new(
        correlation_id: u64,
        opcode: Opcode,
        params: Vec<Vec<u8>>,
        context: ContextHandle,
    ) -> Self {
        Self {
            correlation_id,
            opcode: opcode.as_u32(),
            params,
            context,
        }
    }

    /// The opcode, if it is one of the known set.
    pub fn known_opcode(&self) -> Option<Opcode> {
        Opcode::try_from(self.opcode).ok()
    }
}

/// The single response produced for a [`Task`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Encode, Decode)]
pub struct TaskResult {
    /// Echo of [`Task::correlation_id`].
    pub correlation_id: u64,
    /// Echo of [`Task::opcode`].
    pub opcode: u32,
    /// Outcome of the call.
    pub status: TaskStatus,
    /// Ordered, SCALE-encoded return values. Always empty unless `status` is `Ok`.
    pub values: Vec<Vec<u8>>,
    /// Human-readable failure detail for logs; never interpreted by the VM.
    pub error: Option<String>,
}

impl TaskResult {
    /// A successful result for `task`.
    pub fn ok(task: &Task, values: Vec<Vec<u8>>) -> Self {
        Self {
            correlation_id: task.correlation_id,
            opcode: task.opcode,
            status: TaskStatus::Ok,
            values,
            error: None,
        }
    }

    /// A failed result for `task`, with no return values.
    pub fn failed(task: &Task, status: TaskStatus, message: impl Into<String>) -> Self {
        Self {
            correlation_id: task.correlation_id,
            opcode: task.opcode,
            status,
            values: Vec::new(),
            error: Some(message.into()),
        }
    }
}
