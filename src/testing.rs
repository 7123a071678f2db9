//! In-memory chain for exercising the session and controller

use crate::contract::IWhitelist;
use crate::wallet::{ProviderConnection, ReceiptSummary, WalletProvider};
use crate::{Error, Result};
use alloy::primitives::{Address, Bytes, TxHash, U256};
use alloy::sol_types::{SolCall, SolValue};
use async_trait::async_trait;
use std::sync::{Arc, Mutex};

struct FakeState {
    chain_id: u64,
    signer: Option<Address>,
    members: Vec<Address>,
    reject_connect: bool,
    reject_send: bool,
    fail_reads: bool,
    receipt_success: bool,
    joins_during_confirmation: Vec<Address>,
    connect_attempts: usize,
    contract_calls: Vec<&'static str>,
    sent: usize,
}

/// Wallet plus a deployed whitelist contract, decoding real calldata
pub(crate) struct FakeChain {
    state: Mutex<FakeState>,
}

impl FakeChain {
    pub fn new(chain_id: u64) -> Arc<Self> {
        Self::build(chain_id, Some(Self::signer_address()))
    }

    /// A wallet that never exposes a signing account
    pub fn read_only(chain_id: u64) -> Arc<Self> {
        Self::build(chain_id, None)
    }

    fn build(chain_id: u64, signer: Option<Address>) -> Arc<Self> {
        Arc::new(Self {
            state: Mutex::new(FakeState {
                chain_id,
                signer,
                members: Vec::new(),
                reject_connect: false,
                reject_send: false,
                fail_reads: false,
                receipt_success: true,
                joins_during_confirmation: Vec::new(),
                connect_attempts: 0,
                contract_calls: Vec::new(),
                sent: 0,
            }),
        })
    }

    pub fn signer_address() -> Address {
        Address::repeat_byte(0x11)
    }

    pub fn contract_address() -> Address {
        Address::repeat_byte(0xc0)
    }

    pub fn wallet(self: &Arc<Self>) -> Arc<dyn WalletProvider> {
        Arc::new(FakeWallet(self.clone()))
    }

    /// The wallet switches to another network
    pub fn set_chain_id(&self, chain_id: u64) {
        self.state.lock().unwrap().chain_id = chain_id;
    }

    pub fn add_member(&self, account: Address) {
        self.state.lock().unwrap().members.push(account);
    }

    pub fn set_reject_connect(&self, reject: bool) {
        self.state.lock().unwrap().reject_connect = reject;
    }

    pub fn set_reject_send(&self, reject: bool) {
        self.state.lock().unwrap().reject_send = reject;
    }

    pub fn set_fail_reads(&self, fail: bool) {
        self.state.lock().unwrap().fail_reads = fail;
    }

    pub fn set_receipt_success(&self, success: bool) {
        self.state.lock().unwrap().receipt_success = success;
    }

    /// Other accounts that join while our transaction is being mined
    pub fn set_joins_during_confirmation(&self, accounts: Vec<Address>) {
        self.state.lock().unwrap().joins_during_confirmation = accounts;
    }

    pub fn connect_attempts(&self) -> usize {
        self.state.lock().unwrap().connect_attempts
    }

    /// Every call and transaction that reached the contract, by function name
    pub fn contract_calls(&self) -> Vec<&'static str> {
        self.state.lock().unwrap().contract_calls.clone()
    }

    pub fn count_calls(&self, name: &str) -> usize {
        self.contract_calls().iter().filter(|c| **c == name).count()
    }

    pub fn sent_transactions(&self) -> usize {
        self.state.lock().unwrap().sent
    }
}

struct FakeWallet(Arc<FakeChain>);

#[async_trait]
impl WalletProvider for FakeWallet {
    async fn connect(&self) -> Result<Arc<dyn ProviderConnection>> {
        let mut state = self.0.state.lock().unwrap();
        state.connect_attempts += 1;
        if state.reject_connect {
            return Err(Error::ProviderRejected(
                "error code 4001: User rejected the request.".to_string(),
            ));
        }
        drop(state);
        Ok(self.0.clone())
    }
}

fn selector(data: &[u8]) -> Option<[u8; 4]> {
    data.get(..4).and_then(|s| s.try_into().ok())
}

#[async_trait]
impl ProviderConnection for FakeChain {
    async fn chain_id(&self) -> Result<u64> {
        Ok(self.state.lock().unwrap().chain_id)
    }

    async fn signer_address(&self) -> Result<Address> {
        self.state
            .lock()
            .unwrap()
            .signer
            .ok_or_else(|| Error::ProviderRejected("no accounts".to_string()))
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes> {
        let mut state = self.state.lock().unwrap();
        if to != Self::contract_address() {
            return Err(Error::CallFailed("call to unknown contract".to_string()));
        }
        if state.fail_reads {
            return Err(Error::CallFailed("connection reset".to_string()));
        }

        let selector = selector(&data);
        if selector == Some(IWhitelist::numAddressesWhitelistedCall::SELECTOR) {
            state.contract_calls.push("numAddressesWhitelisted");
            Ok(U256::from(state.members.len() as u64).abi_encode().into())
        } else if selector == Some(IWhitelist::whitelistedAddressesCall::SELECTOR) {
            state.contract_calls.push("whitelistedAddresses");
            let call = IWhitelist::whitelistedAddressesCall::abi_decode(&data)
                .map_err(|e| Error::CallFailed(e.to_string()))?;
            Ok(state.members.contains(&call.account).abi_encode().into())
        } else if selector == Some(IWhitelist::addAddressToWhitelistCall::SELECTOR) {
            state.contract_calls.push("addAddressToWhitelist");
            let from = from.unwrap_or(Address::ZERO);
            if state.members.contains(&from) {
                return Err(Error::CallFailed(
                    "execution reverted: revert: Sender has already been whitelisted".to_string(),
                ));
            }
            Ok(Bytes::new())
        } else {
            Err(Error::CallFailed("execution reverted".to_string()))
        }
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        let mut state = self.state.lock().unwrap();
        if to != Self::contract_address()
            || selector(&data) != Some(IWhitelist::addAddressToWhitelistCall::SELECTOR)
        {
            return Err(Error::CallFailed("unexpected transaction".to_string()));
        }
        let signer = state
            .signer
            .ok_or_else(|| Error::ProviderRejected("no accounts".to_string()))?;
        if state.reject_send {
            return Err(Error::ProviderRejected(
                "error code 4001: User denied transaction signature.".to_string(),
            ));
        }

        state.contract_calls.push("send:addAddressToWhitelist");
        state.sent += 1;
        if state.receipt_success {
            state.members.push(signer);
        }
        Ok(TxHash::repeat_byte(state.sent as u8))
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        _confirmations: u64,
    ) -> Result<ReceiptSummary> {
        let mut state = self.state.lock().unwrap();
        let others = std::mem::take(&mut state.joins_during_confirmation);
        state.members.extend(others);
        Ok(ReceiptSummary {
            tx_hash,
            block_number: Some(1),
            gas_used: 46_000,
            success: state.receipt_success,
        })
    }
}
