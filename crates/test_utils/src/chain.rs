// Path: crates/test_utils/src/chain.rs
//! An in-memory `ChainApi` that records every call it receives.

use crate::fixtures;
use lvm_api::chain::{ChainApi, ChainRequest, ChainResult};
use lvm_types::contract::{ContractInfo, EventRecord};
use lvm_types::error::ChainApiError;
use lvm_types::storage::{AllStorageDataChange, StorageValue};
use lvm_types::{ContextHandle, Opcode};
use parking_lot::Mutex;
use std::collections::{BTreeMap, HashMap, HashSet};

/// Per-evaluation state the chain side keeps, keyed by context handle.
#[derive(Debug, Clone, Default)]
pub struct Evaluation {
    pub transaction_id: String,
    pub fee: i64,
    pub events: Vec<EventRecord>,
    pub waits: Vec<u32>,
}

#[derive(Debug, Default)]
struct ChainState {
    contracts: BTreeMap<String, ContractInfo>,
    names: BTreeMap<String, String>,
    public_accounts: BTreeMap<String, String>,
    balances: HashMap<(String, String), i64>,
    assets: HashSet<String>,
    storage: HashMap<(String, String), StorageValue>,
    evaluations: HashMap<ContextHandle, Evaluation>,
    head_block: u32,
    now: u32,
    calls: BTreeMap<Opcode, usize>,
}

/// A chain stand-in for tests.
///
/// Every `ChainApi` method bumps a per-opcode counter before doing anything
/// else, so tests can assert that a rejected task never reached the chain.
#[derive(Debug, Default)]
pub struct InstrumentedChain {
    state: Mutex<ChainState>,
}

impl InstrumentedChain {
    /// An empty chain at block 0.
    pub fn new() -> Self {
        Self::default()
    }

    /// A chain with [`fixtures::CONTRACT_A`] deployed and funded, the
    /// [`fixtures::PUBLIC_BOB`] public account registered, at block 100.
    pub fn with_fixtures() -> Self {
        let chain = Self::new();
        chain.deploy(fixtures::contract_a());
        chain.set_balance(fixtures::CONTRACT_A, fixtures::ASSET, fixtures::CONTRACT_A_BALANCE);
        chain.register_public_account(fixtures::PUBLIC_BOB, "ALPbob");
        chain.set_head(100, 1_700_000_000);
        chain
    }

    pub fn deploy(&self, info: ContractInfo) {
        let mut s = self.state.lock();
        if !info.name.is_empty() {
            s.names.insert(info.name.clone(), info.address.clone());
        }
        s.contracts.insert(info.address.clone(), info);
    }

    pub fn set_balance(&self, address: &str, asset: &str, amount: i64) {
        let mut s = self.state.lock();
        s.assets.insert(asset.to_string());
        s.balances
            .insert((address.to_string(), asset.to_string()), amount);
    }

    pub fn register_public_account(&self, name: &str, address: &str) {
        self.state
            .lock()
            .public_accounts
            .insert(name.to_string(), address.to_string());
    }

    pub fn set_head(&self, block: u32, now: u32) {
        let mut s = self.state.lock();
        s.head_block = block;
        s.now = now;
    }

    pub fn set_storage(&self, contract: &str, key: &str, value: StorageValue) {
        self.state
            .lock()
            .storage
            .insert((contract.to_string(), key.to_string()), value);
    }

    /// Starts the chain-side evaluation state for `context`.
    pub fn begin_evaluation(&self, context: ContextHandle, transaction_id: &str, fee: i64) {
        self.state.lock().evaluations.insert(
            context,
            Evaluation {
                transaction_id: transaction_id.to_string(),
                fee,
                ..Evaluation::default()
            },
        );
    }

    // --- Inspection ---

    pub fn balance(&self, address: &str, asset: &str) -> i64 {
        self.state
            .lock()
            .balances
            .get(&(address.to_string(), asset.to_string()))
            .copied()
            .unwrap_or(0)
    }

    pub fn stored(&self, contract: &str, key: &str) -> Option<StorageValue> {
        self.state
            .lock()
            .storage
            .get(&(contract.to_string(), key.to_string()))
            .cloned()
    }

    pub fn events(&self, context: ContextHandle) -> Vec<EventRecord> {
        self.state
            .lock()
            .evaluations
            .get(&context)
            .map(|e| e.events.clone())
            .unwrap_or_default()
    }

    pub fn evaluation(&self, context: ContextHandle) -> Option<Evaluation> {
        self.state.lock().evaluations.get(&context).cloned()
    }

    /// Number of calls received for `opcode`.
    pub fn calls(&self, opcode: Opcode) -> usize {
        self.state.lock().calls.get(&opcode).copied().unwrap_or(0)
    }

    /// Number of calls received across all opcodes.
    pub fn total_calls(&self) -> usize {
        self.state.lock().calls.values().sum()
    }

    // --- Internals ---

    fn record(&self, opcode: Opcode) -> parking_lot::MutexGuard<'_, ChainState> {
        let mut s = self.state.lock();
        *s.calls.entry(opcode).or_insert(0) += 1;
        s
    }

    fn random_at(block: u32) -> i64 {
        // splitmix-style scramble; deterministic per block.
        let mut z = (block as u64).wrapping_add(0x9E37_79B9_7F4A_7C15);
        z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
        z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
        ((z ^ (z >> 31)) >> 1) as i64
    }
}

impl ChainState {
    fn contract_by_address(&self, address: &str) -> ChainResult<ContractInfo> {
        self.contracts
            .get(address)
            .cloned()
            .ok_or_else(|| ChainApiError::ContractNotFound(address.to_string()))
    }

    fn contract_by_name(&self, name: &str) -> ChainResult<ContractInfo> {
        let address = self
            .names
            .get(name)
            .ok_or_else(|| ChainApiError::ContractNotFound(name.to_string()))?;
        self.contract_by_address(address)
    }

    fn evaluation_mut(&mut self, context: ContextHandle) -> &mut Evaluation {
        self.evaluations.entry(context).or_default()
    }

    fn debit(&mut self, contract: &str, asset: &str, amount: i64) -> ChainResult<()> {
        if amount <= 0 {
            return Err(ChainApiError::InvalidAmount(amount));
        }
        if !self.contracts.contains_key(contract) {
            return Err(ChainApiError::ContractNotFound(contract.to_string()));
        }
        if !self.assets.contains(asset) {
            return Err(ChainApiError::UnknownAsset(asset.to_string()));
        }
        let key = (contract.to_string(), asset.to_string());
        let balance = self.balances.get(&key).copied().unwrap_or(0);
        if balance < amount {
            return Err(ChainApiError::InsufficientBalance {
                contract: contract.to_string(),
                asset: asset.to_string(),
                balance,
                requested: amount,
            });
        }
        self.balances.insert(key, balance - amount);
        Ok(())
    }

    fn credit(&mut self, address: &str, asset: &str, amount: i64) -> ChainResult<()> {
        let balance = self
            .balances
            .entry((address.to_string(), asset.to_string()))
            .or_insert(0);
        *balance = balance
            .checked_add(amount)
            .ok_or_else(|| ChainApiError::Backend(format!("balance overflow crediting {address}")))?;
        Ok(())
    }

    /// Debit then credit, failing before either if the credit would overflow.
    fn transfer(&mut self, contract: &str, to: &str, asset: &str, amount: i64) -> ChainResult<()> {
        let recipient = self
            .balances
            .get(&(to.to_string(), asset.to_string()))
            .copied()
            .unwrap_or(0);
        if amount > 0 && contract != to && recipient.checked_add(amount).is_none() {
            return Err(ChainApiError::Backend(format!("balance overflow crediting {to}")));
        }
        self.debit(contract, asset, amount)?;
        self.credit(to, asset, amount)
    }
}

impl ChainApi for InstrumentedChain {
    fn get_stored_contract_info_by_address(
        &self,
        _req: &ChainRequest<'_>,
        address: &str,
    ) -> ChainResult<ContractInfo> {
        self.record(Opcode::GetStoredContractInfoByAddress)
            .contract_by_address(address)
    }

    fn get_contract_address_by_name(
        &self,
        _req: &ChainRequest<'_>,
        name: &str,
    ) -> ChainResult<String> {
        self.record(Opcode::GetContractAddressByName)
            .contract_by_name(name)
            .map(|info| info.address)
    }

    fn check_contract_exist(&self, _req: &ChainRequest<'_>, name: &str) -> ChainResult<bool> {
        Ok(self.record(Opcode::CheckContractExist).names.contains_key(name))
    }

    fn check_contract_exist_by_address(
        &self,
        _req: &ChainRequest<'_>,
        address: &str,
    ) -> ChainResult<bool> {
        Ok(self
            .record(Opcode::CheckContractExistByAddress)
            .contracts
            .contains_key(address))
    }

    fn open_contract(&self, _req: &ChainRequest<'_>, name: &str) -> ChainResult<ContractInfo> {
        self.record(Opcode::OpenContract).contract_by_name(name)
    }

    fn open_contract_by_address(
        &self,
        _req: &ChainRequest<'_>,
        address: &str,
    ) -> ChainResult<ContractInfo> {
        self.record(Opcode::OpenContractByAddress)
            .contract_by_address(address)
    }

    fn get_storage_value(
        &self,
        req: &ChainRequest<'_>,
        contract: &str,
        key: &str,
    ) -> ChainResult<StorageValue> {
        let s = self.record(Opcode::GetStorageValueFromChain);
        if let Some(value) = req.snapshot.get(key) {
            return Ok(value.clone());
        }
        Ok(s.storage
            .get(&(contract.to_string(), key.to_string()))
            .cloned()
            .unwrap_or_default())
    }

    fn get_contract_balance_amount(
        &self,
        _req: &ChainRequest<'_>,
        address: &str,
        asset: &str,
    ) -> ChainResult<i64> {
        let s = self.record(Opcode::GetContractBalanceAmount);
        if !s.contracts.contains_key(address) {
            return Err(ChainApiError::ContractNotFound(address.to_string()));
        }
        if !s.assets.contains(asset) {
            return Err(ChainApiError::UnknownAsset(asset.to_string()));
        }
        Ok(s.balances
            .get(&(address.to_string(), asset.to_string()))
            .copied()
            .unwrap_or(0))
    }

    fn get_transaction_fee(&self, req: &ChainRequest<'_>) -> ChainResult<i64> {
        let s = self.record(Opcode::GetTransactionFee);
        Ok(s.evaluations.get(&req.context).map(|e| e.fee).unwrap_or(0))
    }

    fn get_chain_now(&self, _req: &ChainRequest<'_>) -> ChainResult<u32> {
        Ok(self.record(Opcode::GetChainNow).now)
    }

    fn get_chain_random(&self, _req: &ChainRequest<'_>) -> ChainResult<i64> {
        let head = self.record(Opcode::GetChainRandom).head_block;
        Ok(Self::random_at(head))
    }

    fn get_transaction_id(&self, req: &ChainRequest<'_>) -> ChainResult<String> {
        let s = self.record(Opcode::GetTransactionId);
        Ok(s.evaluations
            .get(&req.context)
            .map(|e| e.transaction_id.clone())
            .unwrap_or_default())
    }

    fn get_header_block_num(&self, _req: &ChainRequest<'_>) -> ChainResult<u32> {
        Ok(self.record(Opcode::GetHeaderBlockNum).head_block)
    }

    fn wait_for_future_random(
        &self,
        req: &ChainRequest<'_>,
        blocks_ahead: i32,
    ) -> ChainResult<u32> {
        let mut s = self.record(Opcode::WaitForFutureRandom);
        if blocks_ahead <= 0 {
            return Err(ChainApiError::InvalidAmount(blocks_ahead as i64));
        }
        let target = s
            .head_block
            .checked_add(blocks_ahead as u32)
            .ok_or_else(|| ChainApiError::Backend("block number overflow".into()))?;
        s.evaluation_mut(req.context).waits.push(target);
        Ok(target)
    }

    fn get_waited(&self, _req: &ChainRequest<'_>, block_num: u32) -> ChainResult<i64> {
        let s = self.record(Opcode::GetWaited);
        if block_num > s.head_block {
            return Err(ChainApiError::RandomNotReady(block_num));
        }
        Ok(Self::random_at(block_num))
    }

    fn commit_storage_changes(
        &self,
        _req: &ChainRequest<'_>,
        changes: AllStorageDataChange,
    ) -> ChainResult<()> {
        let mut s = self.record(Opcode::CommitStorageChanges);
        if let Some(unknown) = changes
            .0
            .iter()
            .find(|c| !s.contracts.contains_key(&c.contract_id))
        {
            return Err(ChainApiError::StorageCommit(format!(
                "unknown contract {}",
                unknown.contract_id
            )));
        }
        for contract in changes.0 {
            for change in contract.changes {
                let key = (contract.contract_id.clone(), change.key);
                if change.after.is_nil() {
                    s.storage.remove(&key);
                } else {
                    s.storage.insert(key, change.after);
                }
            }
        }
        Ok(())
    }

    fn transfer_from_contract_to_address(
        &self,
        _req: &ChainRequest<'_>,
        contract: &str,
        to_address: &str,
        asset: &str,
        amount: i64,
    ) -> ChainResult<()> {
        let mut s = self.record(Opcode::TransferFromContractToAddress);
        if to_address.is_empty() {
            return Err(ChainApiError::InvalidAddress(to_address.to_string()));
        }
        s.transfer(contract, to_address, asset, amount)
    }

    fn transfer_from_contract_to_public_account(
        &self,
        _req: &ChainRequest<'_>,
        contract: &str,
        to_account: &str,
        asset: &str,
        amount: i64,
    ) -> ChainResult<()> {
        let mut s = self.record(Opcode::TransferFromContractToPublicAccount);
        let address = s
            .public_accounts
            .get(to_account)
            .cloned()
            .ok_or_else(|| ChainApiError::InvalidAddress(to_account.to_string()))?;
        s.transfer(contract, &address, asset, amount)
    }

    fn emit(
        &self,
        req: &ChainRequest<'_>,
        contract_id: &str,
        event_name: &str,
        payload: &str,
    ) -> ChainResult<()> {
        let mut s = self.record(Opcode::Emit);
        s.evaluation_mut(req.context).events.push(EventRecord {
            contract_id: contract_id.to_string(),
            event_name: event_name.to_string(),
            payload: payload.to_string(),
        });
        Ok(())
    }
}
