// Path: crates/dispatch/tests/on_request.rs
//! Handling-thread behaviour of `RequestHandler::on_request`, driven directly
//! without any transport.

use lvm_api::chain::ChainResult;
use lvm_dispatch::{HandlerTable, Params, RequestHandler, StorageRegistry};
use lvm_test_utils::fixtures::{self, param, snapshot, str_params};
use lvm_test_utils::InstrumentedChain;
use lvm_types::codec::from_bytes_canonical;
use lvm_types::contract::ContractInfo;
use lvm_types::storage::{
    AllStorageDataChange, ContractStorageChanges, StorageChange, StorageSnapshot, StorageValue,
};
use lvm_types::{ContextHandle, Opcode, Task, TaskResult, TaskStatus};
use parity_scale_codec::{Decode, Encode};
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

const H42: ContextHandle = ContextHandle::from_raw(42);
const H99: ContextHandle = ContextHandle::from_raw(99);

struct Harness {
    chain: Arc<InstrumentedChain>,
    registry: Arc<StorageRegistry>,
    handler: RequestHandler,
    next_id: AtomicU64,
}

impl Harness {
    fn new() -> Self {
        let chain = Arc::new(InstrumentedChain::with_fixtures());
        let registry = Arc::new(StorageRegistry::new());
        let handler = RequestHandler::new(Arc::clone(&registry), chain.clone());
        Self {
            chain,
            registry,
            handler,
            next_id: AtomicU64::new(1),
        }
    }

    fn with_context_42() -> Self {
        let h = Self::new();
        h.registry.register(H42, snapshot(&[("x", "1")]));
        h.chain.begin_evaluation(H42, "tx-42", 25);
        h
    }

    fn call(&self, context: ContextHandle, opcode: Opcode, params: Vec<Vec<u8>>) -> TaskResult {
        self.call_raw(context, opcode.as_u32(), params)
    }

    fn call_raw(&self, context: ContextHandle, opcode: u32, params: Vec<Vec<u8>>) -> TaskResult {
        let task = Task {
            correlation_id: self.next_id.fetch_add(1, Ordering::Relaxed),
            opcode,
            params,
            context,
        };
        let result = self.handler.on_request(&task);
        assert_eq!(result.correlation_id, task.correlation_id);
        assert_eq!(result.opcode, task.opcode);
        if !result.status.is_ok() {
            assert!(result.values.is_empty());
        }
        result
    }
}

fn single<T: Decode>(result: &TaskResult) -> T {
    assert_eq!(result.status, TaskStatus::Ok, "{:?}", result.error);
    assert_eq!(result.values.len(), 1);
    from_bytes_canonical(&result.values[0]).unwrap()
}

/// A well-formed parameter list for every opcode.
fn valid_params(opcode: Opcode) -> Vec<Vec<u8>> {
    match opcode {
        Opcode::GetStoredContractInfoByAddress
        | Opcode::CheckContractExistByAddress
        | Opcode::OpenContractByAddress => str_params(&[fixtures::CONTRACT_A]),
        Opcode::GetContractAddressByName
        | Opcode::CheckContractExist
        | Opcode::OpenContract => str_params(&[fixtures::CONTRACT_A_NAME]),
        Opcode::GetStorageValueFromChain => str_params(&[fixtures::CONTRACT_A, "x"]),
        Opcode::GetContractBalanceAmount => str_params(&[fixtures::CONTRACT_A, fixtures::ASSET]),
        Opcode::GetTransactionFee
        | Opcode::GetChainNow
        | Opcode::GetChainRandom
        | Opcode::GetTransactionId
        | Opcode::GetHeaderBlockNum => vec![],
        Opcode::WaitForFutureRandom => vec![param(3i32)],
        Opcode::GetWaited => vec![param(50u32)],
        Opcode::CommitStorageChanges => vec![param(AllStorageDataChange::default())],
        Opcode::TransferFromContractToAddress => {
            let mut p = str_params(&[fixtures::CONTRACT_A, fixtures::ALICE, fixtures::ASSET]);
            p.push(param(10i64));
            p
        }
        Opcode::TransferFromContractToPublicAccount => {
            let mut p = str_params(&[fixtures::CONTRACT_A, fixtures::PUBLIC_BOB, fixtures::ASSET]);
            p.push(param(10i64));
            p
        }
        Opcode::Emit => str_params(&[fixtures::CONTRACT_A, "Transfer", "{}"]),
    }
}

#[test]
fn storage_read_sees_registered_snapshot() {
    let h = Harness::with_context_42();
    let result = h.call(
        H42,
        Opcode::GetStorageValueFromChain,
        str_params(&["c", "x"]),
    );
    assert_eq!(single::<StorageValue>(&result), StorageValue::from("1"));
    assert_eq!(h.chain.calls(Opcode::GetStorageValueFromChain), 1);
}

#[test]
fn short_transfer_never_reaches_chain() {
    let h = Harness::with_context_42();
    let result = h.call(
        H42,
        Opcode::TransferFromContractToAddress,
        str_params(&[fixtures::CONTRACT_A, fixtures::ALICE, fixtures::ASSET]),
    );
    assert_eq!(result.status, TaskStatus::ParameterCountError);
    assert_eq!(result.status.code(), -1);
    assert_eq!(h.chain.total_calls(), 0);
    assert_eq!(
        h.chain.balance(fixtures::CONTRACT_A, fixtures::ASSET),
        fixtures::CONTRACT_A_BALANCE
    );
}

#[test]
fn emit_appends_exactly_one_event() {
    let h = Harness::with_context_42();
    let result = h.call(
        H42,
        Opcode::Emit,
        str_params(&["contractA", "Transfer", r#"{"to":"bob","amount":5}"#]),
    );
    assert_eq!(result.status, TaskStatus::Ok);
    assert!(result.values.is_empty());
    let events = h.chain.events(H42);
    assert_eq!(events.len(), 1);
    assert_eq!(events[0].contract_id, "contractA");
    assert_eq!(events[0].event_name, "Transfer");
    assert_eq!(events[0].payload, r#"{"to":"bob","amount":5}"#);
}

#[test]
fn unregistered_context_is_missing_for_every_opcode() {
    let h = Harness::with_context_42();
    for op in Opcode::ALL {
        let result = h.call(H99, op, valid_params(op));
        assert_eq!(result.status, TaskStatus::MissingContext, "{op}");
    }
    // Even an unknown opcode reports the missing context first.
    assert_eq!(
        h.call_raw(H99, 0xdead, vec![]).status,
        TaskStatus::MissingContext
    );
    assert_eq!(h.chain.total_calls(), 0);
}

#[test]
fn every_opcode_rejects_short_parameter_lists() {
    let h = Harness::with_context_42();
    let table = HandlerTable::standard();
    for op in Opcode::ALL {
        let min = table.get(op).unwrap().min_params();
        let params = valid_params(op);
        assert_eq!(params.len(), min, "{op} fixture arity");
        for short in 0..min {
            let result = h.call(H42, op, params[..short].to_vec());
            assert_eq!(result.status, TaskStatus::ParameterCountError, "{op} with {short}");
        }
    }
    assert_eq!(h.chain.total_calls(), 0);
}

#[test]
fn every_opcode_succeeds_with_valid_parameters() {
    let h = Harness::with_context_42();
    for op in Opcode::ALL {
        let result = h.call(H42, op, valid_params(op));
        assert_eq!(result.status, TaskStatus::Ok, "{op}: {:?}", result.error);
        assert_eq!(h.chain.calls(op), 1, "{op}");
    }
}

#[test]
fn undecodable_parameter_is_bad_encoding() {
    let h = Harness::with_context_42();
    let mut params = str_params(&[fixtures::CONTRACT_A, fixtures::ALICE, fixtures::ASSET]);
    params.push(vec![0x01, 0x02]); // too short for an i64
    let result = h.call(H42, Opcode::TransferFromContractToAddress, params);
    assert_eq!(result.status, TaskStatus::BadParameterEncoding);
    assert!(result.error.unwrap().contains("parameter 3"));
    assert_eq!(h.chain.total_calls(), 0);
}

#[test]
fn unknown_opcode_is_reported_not_defaulted() {
    let h = Harness::with_context_42();
    let result = h.call_raw(H42, 4242, str_params(&["anything"]));
    assert_eq!(result.status, TaskStatus::UnknownOpcode);
    assert_eq!(result.opcode, 4242);
    assert_eq!(h.chain.total_calls(), 0);
}

#[test]
fn extra_parameters_are_ignored() {
    let h = Harness::with_context_42();
    let result = h.call(
        H42,
        Opcode::GetContractAddressByName,
        str_params(&[fixtures::CONTRACT_A_NAME, "surplus"]),
    );
    assert_eq!(single::<String>(&result), fixtures::CONTRACT_A);
}

#[test]
fn unregister_turns_later_calls_into_missing_context() {
    let h = Harness::with_context_42();
    assert_eq!(h.call(H42, Opcode::GetChainNow, vec![]).status, TaskStatus::Ok);
    h.registry.unregister(H42);
    assert!(h.registry.lookup(H42).is_none());
    assert_eq!(
        h.call(H42, Opcode::GetChainNow, vec![]).status,
        TaskStatus::MissingContext
    );
}

#[test]
fn scoped_registration_ends_with_guard() {
    let h = Harness::new();
    {
        let _guard = h.registry.enter(H42, StorageSnapshot::new());
        assert_eq!(h.call(H42, Opcode::GetHeaderBlockNum, vec![]).status, TaskStatus::Ok);
    }
    assert_eq!(
        h.call(H42, Opcode::GetHeaderBlockNum, vec![]).status,
        TaskStatus::MissingContext
    );
}

#[test]
fn contract_lookups() {
    let h = Harness::with_context_42();
    let info: ContractInfo = single(&h.call(
        H42,
        Opcode::GetStoredContractInfoByAddress,
        str_params(&[fixtures::CONTRACT_A]),
    ));
    assert_eq!(info, fixtures::contract_a());

    let opened: ContractInfo = single(&h.call(
        H42,
        Opcode::OpenContract,
        str_params(&[fixtures::CONTRACT_A_NAME]),
    ));
    assert_eq!(opened.address, fixtures::CONTRACT_A);

    assert!(single::<bool>(&h.call(
        H42,
        Opcode::CheckContractExistByAddress,
        str_params(&[fixtures::CONTRACT_A]),
    )));
    assert!(!single::<bool>(&h.call(
        H42,
        Opcode::CheckContractExist,
        str_params(&["nobody"]),
    )));

    let missing = h.call(H42, Opcode::OpenContractByAddress, str_params(&["CON_missing"]));
    assert_eq!(missing.status, TaskStatus::ChainOperationError);
    assert!(missing.error.unwrap().contains("CON_missing"));
}

#[test]
fn context_accessors_read_evaluation_state() {
    let h = Harness::with_context_42();
    assert_eq!(single::<i64>(&h.call(H42, Opcode::GetTransactionFee, vec![])), 25);
    assert_eq!(
        single::<String>(&h.call(H42, Opcode::GetTransactionId, vec![])),
        "tx-42"
    );
    assert_eq!(single::<u32>(&h.call(H42, Opcode::GetHeaderBlockNum, vec![])), 100);
    assert_eq!(
        single::<u32>(&h.call(H42, Opcode::GetChainNow, vec![])),
        1_700_000_000
    );
    let a = single::<i64>(&h.call(H42, Opcode::GetChainRandom, vec![]));
    let b = single::<i64>(&h.call(H42, Opcode::GetChainRandom, vec![]));
    assert_eq!(a, b);
}

#[test]
fn future_random_is_pending_until_block_arrives() {
    let h = Harness::with_context_42();
    let target: u32 = single(&h.call(H42, Opcode::WaitForFutureRandom, vec![param(5i32)]));
    assert_eq!(target, 105);
    assert_eq!(h.chain.evaluation(H42).unwrap().waits, vec![105]);

    let early = h.call(H42, Opcode::GetWaited, vec![param(target)]);
    assert_eq!(early.status, TaskStatus::ChainOperationError);

    h.chain.set_head(105, 1_700_000_500);
    let value: i64 = single(&h.call(H42, Opcode::GetWaited, vec![param(target)]));
    let current: i64 = single(&h.call(H42, Opcode::GetChainRandom, vec![]));
    assert_eq!(value, current);
}

#[test]
fn committed_changes_reach_chain_storage() {
    let h = Harness::with_context_42();
    let changes = AllStorageDataChange(vec![ContractStorageChanges {
        contract_id: fixtures::CONTRACT_A.to_string(),
        changes: vec![StorageChange {
            key: "counter".into(),
            before: StorageValue::Nil,
            after: StorageValue::Int(7),
        }],
    }]);
    let result = h.call(H42, Opcode::CommitStorageChanges, vec![changes.encode()]);
    assert_eq!(result.status, TaskStatus::Ok);
    assert!(result.values.is_empty());
    assert_eq!(
        h.chain.stored(fixtures::CONTRACT_A, "counter"),
        Some(StorageValue::Int(7))
    );

    // Cells absent from the snapshot fall through to committed chain storage.
    let read: StorageValue = single(&h.call(
        H42,
        Opcode::GetStorageValueFromChain,
        str_params(&[fixtures::CONTRACT_A, "counter"]),
    ));
    assert_eq!(read, StorageValue::Int(7));
}

#[test]
fn deeply_nested_change_set_is_bad_encoding() {
    // One contract, one change whose `after` is a table nested 200k deep.
    let mut bytes = vec![4, 0, 4, 0, 0];
    for _ in 0..200_000 {
        bytes.extend_from_slice(&[5, 4, 0]);
    }
    bytes.push(0);

    let worker = std::thread::Builder::new()
        .stack_size(2 << 20)
        .spawn(move || {
            let h = Harness::with_context_42();
            let result = h.call(H42, Opcode::CommitStorageChanges, vec![bytes]);
            (result.status, h.chain.calls(Opcode::CommitStorageChanges))
        })
        .unwrap();
    let (status, calls) = worker.join().unwrap();
    assert_eq!(status, TaskStatus::BadParameterEncoding);
    assert_eq!(calls, 0);
}

#[test]
fn transfers_move_balance_or_fail_without_effect() {
    let h = Harness::with_context_42();
    let ok = h.call(
        H42,
        Opcode::TransferFromContractToPublicAccount,
        valid_params(Opcode::TransferFromContractToPublicAccount),
    );
    assert_eq!(ok.status, TaskStatus::Ok);
    assert_eq!(h.chain.balance("ALPbob", fixtures::ASSET), 10);

    let mut too_much = str_params(&[fixtures::CONTRACT_A, fixtures::ALICE, fixtures::ASSET]);
    too_much.push(param(5_000i64));
    let failed = h.call(H42, Opcode::TransferFromContractToAddress, too_much);
    assert_eq!(failed.status, TaskStatus::ChainOperationError);
    assert!(failed.error.unwrap().contains("Insufficient balance"));
    assert_eq!(
        h.chain.balance(fixtures::CONTRACT_A, fixtures::ASSET),
        fixtures::CONTRACT_A_BALANCE - 10
    );
    assert_eq!(h.chain.balance(fixtures::ALICE, fixtures::ASSET), 0);
}

#[test]
fn transfer_overflowing_recipient_fails_without_effect() {
    let h = Harness::with_context_42();
    h.chain.set_balance(fixtures::ALICE, fixtures::ASSET, i64::MAX);

    let mut params = str_params(&[fixtures::CONTRACT_A, fixtures::ALICE, fixtures::ASSET]);
    params.push(param(1i64));
    let failed = h.call(H42, Opcode::TransferFromContractToAddress, params);

    assert_eq!(failed.status, TaskStatus::ChainOperationError);
    assert!(failed.error.unwrap().contains("overflow"));
    assert_eq!(
        h.chain.balance(fixtures::CONTRACT_A, fixtures::ASSET),
        fixtures::CONTRACT_A_BALANCE
    );
    assert_eq!(h.chain.balance(fixtures::ALICE, fixtures::ASSET), i64::MAX);
}

#[test]
fn panicking_chain_operation_becomes_error_result() {
    let registry = Arc::new(StorageRegistry::new());
    registry.register(H42, StorageSnapshot::new());
    let mut table = HandlerTable::new();
    table.register(
        Opcode::GetChainNow,
        0,
        |_: &Params<'_>| Ok(()),
        |_chain, _req, ()| -> ChainResult<u32> { panic!("backend exploded") },
        |now: u32| vec![now.encode()],
    );
    let handler = RequestHandler::new(registry, Arc::new(InstrumentedChain::new())).with_table(table);

    let task = Task::new(1, Opcode::GetChainNow, vec![], H42);
    let result = handler.on_request(&task);
    assert_eq!(result.status, TaskStatus::ChainOperationError);

    // Opcodes missing from a custom table are unknown to it.
    let task = Task::new(2, Opcode::Emit, str_params(&["a", "b", "c"]), H42);
    assert_eq!(handler.on_request(&task).status, TaskStatus::UnknownOpcode);
}
