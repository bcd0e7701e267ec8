// Path: crates/types/src/error/mod.rs
//! Core error types for the chain task bridge.

use crate::handle::ContextHandle;
use crate::task::TaskStatus;
use thiserror::Error;

/// Domain failures reported by the chain API.
///
/// These are contract-level outcomes, not bugs: they are folded into a
/// `ChainOperationError` status and surfaced to the contract.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ChainApiError {
    /// No contract matches the given name or address.
    #[error("Contract not found: {0}")]
    ContractNotFound(String),
    /// The contract holds less of the asset than the transfer requires.
    #[error("Insufficient balance in {contract} for {asset}: have {balance}, need {requested}")]
    InsufficientBalance {
        /// The paying contract.
        contract: String,
        /// The asset symbol.
        asset: String,
        /// Current balance.
        balance: i64,
        /// Requested amount.
        requested: i64,
    },
    /// Amounts must be strictly positive.
    #[error("Invalid amount: {0}")]
    InvalidAmount(i64),
    /// The address is malformed or names an unknown account.
    #[error("Invalid address: {0}")]
    InvalidAddress(String),
    /// The asset symbol is not known to the chain.
    #[error("Unknown asset: {0}")]
    UnknownAsset(String),
    /// The awaited block has not been produced yet.
    #[error("Random value for block {0} is not yet available")]
    RandomNotReady(u32),
    /// Applying a change-set failed.
    #[error("Storage commit failed: {0}")]
    StorageCommit(String),
    /// Any other failure in the chain backend.
    #[error("Chain backend error: {0}")]
    Backend(String),
}

/// Failures resolved locally on the handling thread.
///
/// Every variant is converted into a `TaskResult` before it crosses back to
/// the VM thread; none of them is ever propagated as an unwind.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DispatchError {
    /// The task carried fewer parameters than the opcode requires.
    #[error("{opcode} expects at least {expected} parameters, got {got}")]
    ParameterCount {
        /// Opcode name.
        opcode: &'static str,
        /// Minimum parameter count.
        expected: usize,
        /// Supplied parameter count.
        got: usize,
    },
    /// A parameter did not decode to the type the opcode expects.
    #[error("{opcode} parameter {index} is not a valid {expected}: {reason}")]
    BadParameterEncoding {
        /// Opcode name.
        opcode: &'static str,
        /// Zero-based parameter position.
        index: usize,
        /// Expected native type.
        expected: &'static str,
        /// Decoder message.
        reason: String,
    },
    /// No snapshot is registered for the handle.
    #[error("No storage snapshot registered for execution context {0}")]
    MissingContext(ContextHandle),
    /// The chain API rejected the operation.
    #[error("Chain operation failed: {0}")]
    ChainOperation(#[from] ChainApiError),
    /// The opcode is outside the known set.
    #[error("Unknown opcode {0}")]
    UnknownOpcode(u32),
}

impl DispatchError {
    /// The status code this error is reported as.
    pub fn status(&self) -> TaskStatus {
        match self {
            DispatchError::ParameterCount { .. } => TaskStatus::ParameterCountError,
            DispatchError::BadParameterEncoding { .. } => TaskStatus::BadParameterEncoding,
            DispatchError::MissingContext(_) => TaskStatus::MissingContext,
            DispatchError::ChainOperation(_) => TaskStatus::ChainOperationError,
            DispatchError::UnknownOpcode(_) => TaskStatus::UnknownOpcode,
        }
    }
}

/// Failures of the mechanism moving tasks and results between threads.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TransportError {
    /// The handling side is gone; the task was never delivered.
    #[error("Transport channel is closed")]
    Closed,
    /// The completion token was dropped without a result being sent.
    #[error("Completion signal was lost before a result arrived")]
    CompletionLost,
    /// The waiting VM side stopped listening before the result was sent.
    #[error("Result receiver was dropped")]
    ReceiverDropped,
    /// A result arrived for a different call than the one waiting.
    #[error("Result for call {got} delivered to call {expected}")]
    MismatchedResult {
        /// Correlation id of the waiting call.
        expected: u64,
        /// Correlation id carried by the result.
        got: u64,
    },
}

/// Errors surfaced to the VM caller of the blocking bridge.
///
/// When one of these is returned the invocation must be treated as aborted:
/// no assumption can be made about whether any state mutation committed.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum BridgeError {
    /// Delivery or completion failed.
    #[error("Transport failure: {0}")]
    TransportFailure(#[from] TransportError),
    /// Another call is already waiting on this dispatcher instance.
    #[error("A blocking call is already in flight on this dispatcher")]
    CallInFlight,
}

/// Errors loading a configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// The file could not be read.
    #[error("Failed to read config file: {0}")]
    Io(#[from] std::io::Error),
    /// The file is not valid TOML for the expected structure.
    #[error("Failed to parse config: {0}")]
    Parse(#[from] toml::de::Error),
    /// A field holds a value outside its allowed range.
    #[error("Invalid config value: {0}")]
    Invalid(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn chain_errors_map_to_chain_operation_status() {
        let err: DispatchError = ChainApiError::ContractNotFound("CON_x".into()).into();
        assert_eq!(err.status(), TaskStatus::ChainOperationError);
        assert!(err.to_string().contains("CON_x"));
    }

    #[test]
    fn parameter_count_message_names_opcode() {
        let err = DispatchError::ParameterCount {
            opcode: "EMIT",
            expected: 3,
            got: 1,
        };
        assert_eq!(err.to_string(), "EMIT expects at least 3 parameters, got 1");
        assert_eq!(err.status(), TaskStatus::ParameterCountError);
    }
}
