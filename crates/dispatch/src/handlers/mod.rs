// Path: crates/dispatch/src/handlers/mod.rs
//! The opcode handler table.
//!
//! Every entry is a (minimum arity, decoder, chain call, encoder) tuple. The
//! arity check and the decode-error mapping live here once; entries only say
//! which types to decode and which chain method to call.

mod params;

pub use params::Params;

use lvm_api::chain::{ChainApi, ChainRequest, ChainResult};
use lvm_types::error::DispatchError;
use lvm_types::storage::AllStorageDataChange;
use lvm_types::{Opcode, Task};
use params::{four, none, nothing, one, single, three, two};
use std::collections::BTreeMap;
use std::fmt;

type Invoke = Box<
    dyn Fn(&dyn ChainApi, &ChainRequest<'_>, &Params<'_>) -> Result<Vec<Vec<u8>>, DispatchError>
        + Send
        + Sync,
>;

/// One row of the table.
pub struct HandlerEntry {
    min_params: usize,
    invoke: Invoke,
}

impl HandlerEntry {
    pub fn min_params(&self) -> usize {
        self.min_params
    }
}

impl fmt::Debug for HandlerEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("HandlerEntry")
            .field("min_params", &self.min_params)
            .finish_non_exhaustive()
    }
}

/// Routes a task to the chain operation its opcode selects.
#[derive(Debug, Default)]
pub struct HandlerTable {
    entries: BTreeMap<Opcode, HandlerEntry>,
}

impl HandlerTable {
    /// An empty table; every opcode is unknown until registered.
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds or replaces the entry for `opcode`.
    ///
    /// `decode` only runs once at least `min_params` parameters are present,
    /// and `call` only runs if `decode` succeeds.
    pub fn register<A, R, D, C, E>(
        &mut self,
        opcode: Opcode,
        min_params: usize,
        decode: D,
        call: C,
        encode: E,
    ) -> &mut Self
    where
        D: Fn(&Params<'_>) -> Result<A, DispatchError> + Send + Sync + 'static,
        C: Fn(&dyn ChainApi, &ChainRequest<'_>, A) -> ChainResult<R> + Send + Sync + 'static,
        E: Fn(R) -> Vec<Vec<u8>> + Send + Sync + 'static,
    {
        let invoke: Invoke = Box::new(
            move |chain: &dyn ChainApi,
                  req: &ChainRequest<'_>,
                  params: &Params<'_>|
                  -> Result<Vec<Vec<u8>>, DispatchError> {
                let args = decode(params)?;
                let out = call(chain, req, args)?;
                Ok(encode(out))
            },
        );
        self.entries.insert(opcode, HandlerEntry { min_params, invoke });
        self
    }

    pub fn get(&self, opcode: Opcode) -> Option<&HandlerEntry> {
        self.entries.get(&opcode)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Validates `task` against its entry and runs it.
    ///
    /// The chain API is never touched unless the opcode is known, enough
    /// parameters are present and every parameter decodes.
    pub fn dispatch(
        &self,
        chain: &dyn ChainApi,
        req: &ChainRequest<'_>,
        task: &Task,
    ) -> Result<Vec<Vec<u8>>, DispatchError> {
        let opcode =
            Opcode::try_from(task.opcode).map_err(DispatchError::UnknownOpcode)?;
        let entry = self
            .entries
            .get(&opcode)
            .ok_or(DispatchError::UnknownOpcode(task.opcode))?;
        if task.params.len() < entry.min_params {
            return Err(DispatchError::ParameterCount {
                opcode: opcode.name(),
                expected: entry.min_params,
                got: task.params.len(),
            });
        }
        (entry.invoke)(chain, req, &Params::new(opcode, &task.params))
    }

    /// The table covering every known opcode.
    pub fn standard() -> Self {
        let mut t = Self::new();

        // --- Contract lookups ---
        t.register(
            Opcode::GetStoredContractInfoByAddress,
            1,
            one::<String>,
            |chain, req, address| chain.get_stored_contract_info_by_address(req, &address),
            single,
        );
        t.register(
            Opcode::GetContractAddressByName,
            1,
            one::<String>,
            |chain, req, name| chain.get_contract_address_by_name(req, &name),
            single,
        );
        t.register(
            Opcode::CheckContractExist,
            1,
            one::<String>,
            |chain, req, name| chain.check_contract_exist(req, &name),
            single,
        );
        t.register(
            Opcode::CheckContractExistByAddress,
            1,
            one::<String>,
            |chain, req, address| chain.check_contract_exist_by_address(req, &address),
            single,
        );
        t.register(
            Opcode::OpenContract,
            1,
            one::<String>,
            |chain, req, name| chain.open_contract(req, &name),
            single,
        );
        t.register(
            Opcode::OpenContractByAddress,
            1,
            one::<String>,
            |chain, req, address| chain.open_contract_by_address(req, &address),
            single,
        );

        // --- State reads ---
        t.register(
            Opcode::GetStorageValueFromChain,
            2,
            two::<String, String>,
            |chain, req, (contract, key)| chain.get_storage_value(req, &contract, &key),
            single,
        );
        t.register(
            Opcode::GetContractBalanceAmount,
            2,
            two::<String, String>,
            |chain, req, (address, asset)| chain.get_contract_balance_amount(req, &address, &asset),
            single,
        );

        // --- Evaluation context accessors ---
        t.register(
            Opcode::GetTransactionFee,
            0,
            none,
            |chain, req, ()| chain.get_transaction_fee(req),
            single,
        );
        t.register(
            Opcode::GetChainNow,
            0,
            none,
            |chain, req, ()| chain.get_chain_now(req),
            single,
        );
        t.register(
            Opcode::GetChainRandom,
            0,
            none,
            |chain, req, ()| chain.get_chain_random(req),
            single,
        );
        t.register(
            Opcode::GetTransactionId,
            0,
            none,
            |chain, req, ()| chain.get_transaction_id(req),
            single,
        );
        t.register(
            Opcode::GetHeaderBlockNum,
            0,
            none,
            |chain, req, ()| chain.get_header_block_num(req),
            single,
        );

        // --- Future randomness ---
        t.register(
            Opcode::WaitForFutureRandom,
            1,
            one::<i32>,
            |chain, req, blocks_ahead| chain.wait_for_future_random(req, blocks_ahead),
            single,
        );
        t.register(
            Opcode::GetWaited,
            1,
            one::<u32>,
            |chain, req, block_num| chain.get_waited(req, block_num),
            single,
        );

        // --- Mutations ---
        t.register(
            Opcode::CommitStorageChanges,
            1,
            one::<AllStorageDataChange>,
            |chain, req, changes| chain.commit_storage_changes(req, changes),
            nothing,
        );
        t.register(
            Opcode::TransferFromContractToAddress,
            4,
            four::<String, String, String, i64>,
            |chain, req, (contract, to, asset, amount)| {
                chain.transfer_from_contract_to_address(req, &contract, &to, &asset, amount)
            },
            nothing,
        );
        t.register(
            Opcode::TransferFromContractToPublicAccount,
            4,
            four::<String, String, String, i64>,
            |chain, req, (contract, to, asset, amount)| {
                chain.transfer_from_contract_to_public_account(req, &contract, &to, &asset, amount)
            },
            nothing,
        );
        t.register(
            Opcode::Emit,
            3,
            three::<String, String, String>,
            |chain, req, (contract_id, event_name, payload)| {
                chain.emit(req, &contract_id, &event_name, &payload)
            },
            nothing,
        );

        t
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_table_covers_every_opcode() {
        let table = HandlerTable::standard();
        assert_eq!(table.len(), Opcode::ALL.len());
        for op in Opcode::ALL {
            assert!(table.get(op).is_some(), "{op} has no handler");
        }
    }

    #[test]
    fn arities_match_the_chain_contract() {
        let table = HandlerTable::standard();
        let arity = |op| table.get(op).map(HandlerEntry::min_params);
        assert_eq!(arity(Opcode::GetStoredContractInfoByAddress), Some(1));
        assert_eq!(arity(Opcode::GetStorageValueFromChain), Some(2));
        assert_eq!(arity(Opcode::GetContractBalanceAmount), Some(2));
        assert_eq!(arity(Opcode::GetChainNow), Some(0));
        assert_eq!(arity(Opcode::WaitForFutureRandom), Some(1));
        assert_eq!(arity(Opcode::CommitStorageChanges), Some(1));
        assert_eq!(arity(Opcode::TransferFromContractToAddress), Some(4));
        assert_eq!(arity(Opcode::TransferFromContractToPublicAccount), Some(4));
        assert_eq!(arity(Opcode::Emit), Some(3));
    }
}
