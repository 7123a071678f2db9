//! Wallet provider boundary
//!
//! A [`WalletProvider`] is whatever hands the session a live connection to the
//! user's wallet. The session never talks to a node directly; every chain
//! query, contract call and transaction goes through a [`ProviderConnection`].
//!
//! [`RpcWalletProvider`] is the production implementation: alloy HTTP
//! providers for reads, plus a wallet-filled provider for writes when a local
//! signing key is available.

use super::SecureWallet;
use crate::{Error, Result};
use alloy::network::ReceiptResponse;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::providers::{DynProvider, PendingTransactionConfig, Provider, ProviderBuilder};
use alloy::rpc::types::TransactionRequest;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Summary of a mined transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReceiptSummary {
    pub tx_hash: TxHash,
    pub block_number: Option<u64>,
    pub gas_used: u64,
    /// False when the transaction was mined but reverted
    pub success: bool,
}

/// Opens connections to the user's wallet
#[async_trait]
pub trait WalletProvider: Send + Sync {
    /// Establish a connection, prompting the user where the wallet requires it
    async fn connect(&self) -> Result<Arc<dyn ProviderConnection>>;
}

/// A live connection to a wallet and the network it is attached to
#[async_trait]
pub trait ProviderConnection: Send + Sync {
    /// Chain identifier of the network the wallet is currently on
    async fn chain_id(&self) -> Result<u64>;

    /// Address of the account that signs transactions
    ///
    /// Fails with [`Error::ProviderRejected`] when the wallet refuses to expose
    /// a signing account.
    async fn signer_address(&self) -> Result<Address>;

    /// Execute a read-only `eth_call`
    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes>;

    /// Sign and broadcast a transaction from the signer account
    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash>;

    /// Block until the transaction has the requested confirmations
    async fn wait_for_receipt(&self, tx_hash: TxHash, confirmations: u64)
        -> Result<ReceiptSummary>;
}

/// Map an RPC failure onto the session's error taxonomy
///
/// EIP-1193 code 4001 is the wallet's "user rejected the request".
pub(crate) fn classify_rpc_error(context: &str, err: impl std::fmt::Display) -> Error {
    let message = err.to_string();
    let lower = message.to_lowercase();
    if lower.contains("code 4001")
        || lower.contains("user rejected")
        || lower.contains("user denied")
    {
        Error::ProviderRejected(format!("{}: {}", context, message))
    } else {
        Error::CallFailed(format!("{}: {}", context, message))
    }
}

/// Wallet provider backed by a JSON-RPC endpoint and an optional local key
pub struct RpcWalletProvider {
    rpc_url: String,
    wallet: Option<SecureWallet>,
    poll_interval: Duration,
}

impl RpcWalletProvider {
    pub fn new(rpc_url: impl Into<String>, wallet: Option<SecureWallet>) -> Self {
        Self {
            rpc_url: rpc_url.into(),
            wallet,
            poll_interval: Duration::from_secs(4),
        }
    }

    /// Override how often pending transactions are polled
    pub fn with_poll_interval(mut self, poll_interval: Duration) -> Self {
        self.poll_interval = poll_interval;
        self
    }
}

impl std::fmt::Debug for RpcWalletProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RpcWalletProvider")
            .field("rpc_url", &self.rpc_url)
            .field("wallet", &self.wallet)
            .field("poll_interval", &self.poll_interval)
            .finish()
    }
}

#[async_trait]
impl WalletProvider for RpcWalletProvider {
    async fn connect(&self) -> Result<Arc<dyn ProviderConnection>> {
        let url: url::Url = self
            .rpc_url
            .parse()
            .map_err(|e| Error::Config(format!("Invalid RPC URL: {}", e)))?;

        let reader = ProviderBuilder::new().connect_http(url.clone());
        reader.client().set_poll_interval(self.poll_interval);

        // Test connection
        let chain_id = reader
            .get_chain_id()
            .await
            .map_err(|e| classify_rpc_error("Failed to connect to wallet provider", e))?;

        let signer = self.wallet.as_ref().map(|wallet| {
            let provider = ProviderBuilder::new()
                .wallet(wallet.ethereum_wallet().clone())
                .connect_http(url);
            provider.client().set_poll_interval(self.poll_interval);
            (wallet.address(), provider.erased())
        });

        tracing::info!(
            chain_id,
            signer = ?signer.as_ref().map(|(address, _)| *address),
            "Connected to wallet provider"
        );

        Ok(Arc::new(RpcConnection {
            reader: reader.erased(),
            signer,
        }))
    }
}

/// Connection produced by [`RpcWalletProvider`]
struct RpcConnection {
    reader: DynProvider,
    signer: Option<(Address, DynProvider)>,
}

impl RpcConnection {
    fn signing_provider(&self) -> Result<&DynProvider> {
        self.signer
            .as_ref()
            .map(|(_, provider)| provider)
            .ok_or_else(|| {
                Error::ProviderRejected("No signing key configured for this wallet".to_string())
            })
    }
}

#[async_trait]
impl ProviderConnection for RpcConnection {
    async fn chain_id(&self) -> Result<u64> {
        self.reader
            .get_chain_id()
            .await
            .map_err(|e| classify_rpc_error("Failed to read chain id", e))
    }

    async fn signer_address(&self) -> Result<Address> {
        self.signer
            .as_ref()
            .map(|(address, _)| *address)
            .ok_or_else(|| {
                Error::ProviderRejected("No signing key configured for this wallet".to_string())
            })
    }

    async fn call(&self, from: Option<Address>, to: Address, data: Bytes) -> Result<Bytes> {
        let mut tx = TransactionRequest::default().to(to).input(data.into());
        if let Some(from) = from {
            tx = tx.from(from);
        }

        self.reader
            .call(tx)
            .await
            .map_err(|e| classify_rpc_error("eth_call failed", e))
    }

    async fn send_transaction(&self, to: Address, data: Bytes) -> Result<TxHash> {
        let provider = self.signing_provider()?;
        let tx = TransactionRequest::default().to(to).input(data.into());

        tracing::debug!(
            to = %to,
            data_len = tx.input.input().map(|d| d.len()).unwrap_or(0),
            "Sending transaction"
        );

        let pending = provider
            .send_transaction(tx)
            .await
            .map_err(|e| classify_rpc_error("Failed to send transaction", e))?;

        Ok(*pending.tx_hash())
    }

    async fn wait_for_receipt(
        &self,
        tx_hash: TxHash,
        confirmations: u64,
    ) -> Result<ReceiptSummary> {
        let provider = self.signing_provider().unwrap_or(&self.reader);

        let config =
            PendingTransactionConfig::new(tx_hash).with_required_confirmations(confirmations);

        let confirmed = provider
            .watch_pending_transaction(config)
            .await
            .map_err(|e| classify_rpc_error("Transaction watch failed", e))?
            .await
            .map_err(|e| classify_rpc_error("Failed to confirm transaction", e))?;

        let receipt = provider
            .get_transaction_receipt(confirmed)
            .await
            .map_err(|e| classify_rpc_error("Failed to fetch receipt", e))?
            .ok_or_else(|| Error::CallFailed(format!("No receipt found for {}", confirmed)))?;

        Ok(ReceiptSummary {
            tx_hash: confirmed,
            block_number: receipt.block_number(),
            gas_used: receipt.gas_used(),
            success: receipt.status(),
        })
    }
}
