//! Wallet session
//!
//! Owns the connection to the user's wallet for the lifetime of the
//! controller and gates every handle on the required network.

use super::provider::{ProviderConnection, WalletProvider};
use crate::config::Network;
use crate::notice::Notifier;
use crate::{Error, Result};
use alloy::primitives::Address;
use std::sync::Arc;
use tokio::sync::OnceCell;

/// Read-only access to the connected network
#[derive(Clone)]
pub struct ReadHandle {
    connection: Arc<dyn ProviderConnection>,
    chain_id: u64,
}

impl ReadHandle {
    pub fn chain_id(&self) -> u64 {
        self.chain_id
    }

    pub(crate) fn connection(&self) -> &dyn ProviderConnection {
        self.connection.as_ref()
    }
}

impl std::fmt::Debug for ReadHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ReadHandle")
            .field("chain_id", &self.chain_id)
            .finish()
    }
}

/// Access that can also submit signed transactions
#[derive(Clone, Debug)]
pub struct SignerHandle {
    reader: ReadHandle,
    address: Address,
}

impl SignerHandle {
    /// Account that signs transactions submitted through this handle
    pub fn address(&self) -> Address {
        self.address
    }

    /// View this handle as a read-only one
    pub fn reader(&self) -> &ReadHandle {
        &self.reader
    }
}

/// Either kind of handle, as returned by [`WalletSession::acquire_handle`]
#[derive(Clone, Debug)]
pub enum Handle {
    Read(ReadHandle),
    Signer(SignerHandle),
}

impl Handle {
    pub fn reader(&self) -> &ReadHandle {
        match self {
            Handle::Read(reader) => reader,
            Handle::Signer(signer) => signer.reader(),
        }
    }

    pub fn into_signer(self) -> Option<SignerHandle> {
        match self {
            Handle::Signer(signer) => Some(signer),
            Handle::Read(_) => None,
        }
    }
}

/// Connection lifecycle to a wallet provider, pinned to one network
pub struct WalletSession {
    provider: Arc<dyn WalletProvider>,
    network: Network,
    notifier: Arc<dyn Notifier>,
    connection: OnceCell<Arc<dyn ProviderConnection>>,
}

impl WalletSession {
    pub fn new(
        provider: Arc<dyn WalletProvider>,
        network: Network,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            provider,
            network,
            notifier,
            connection: OnceCell::new(),
        }
    }

    pub fn network(&self) -> Network {
        self.network
    }

    /// Whether a provider connection has been established and cached
    pub fn is_connected(&self) -> bool {
        self.connection.initialized()
    }

    /// Obtain a handle for reading or, with `require_signer`, for signing.
    ///
    /// The provider connection is opened on first use and reused afterwards;
    /// a failed attempt is not cached. Fails with [`Error::WrongNetwork`] and
    /// notifies the user when the wallet is on any other network than the
    /// required one.
    pub async fn acquire_handle(&self, require_signer: bool) -> Result<Handle> {
        let connection = self
            .connection
            .get_or_try_init(|| async {
                tracing::debug!(
                    network = self.network.name(),
                    "Opening wallet provider connection"
                );
                self.provider.connect().await
            })
            .await?
            .clone();

        let chain_id = connection.chain_id().await?;
        let expected = self.network.chain_id();
        if chain_id != expected {
            tracing::warn!(expected, actual = chain_id, "Wallet is on the wrong network");
            self.notifier.notify(&format!(
                "Change the network to {}",
                self.network.display_name()
            ));
            return Err(Error::WrongNetwork {
                expected,
                actual: chain_id,
            });
        }

        let reader = ReadHandle {
            connection,
            chain_id,
        };

        if !require_signer {
            return Ok(Handle::Read(reader));
        }

        let address = reader.connection.signer_address().await?;
        Ok(Handle::Signer(SignerHandle { reader, address }))
    }

    /// Shorthand for `acquire_handle(false)`
    pub async fn reader(&self) -> Result<ReadHandle> {
        match self.acquire_handle(false).await? {
            Handle::Read(reader) => Ok(reader),
            Handle::Signer(signer) => Ok(signer.reader),
        }
    }

    /// Shorthand for `acquire_handle(true)`
    pub async fn signer(&self) -> Result<SignerHandle> {
        self.acquire_handle(true)
            .await?
            .into_signer()
            .ok_or_else(|| Error::ProviderRejected("Wallet returned no signer".to_string()))
    }
}
