//! Local signing key
//!
//! SECURITY: This is the ONLY place where private keys exist.
//! - Keys are read into a `SecretString` and parsed straight into alloy's `PrivateKeySigner`
//! - Keys are never serialized or logged

use crate::{Error, Result};
use alloy::network::EthereumWallet;
use alloy::primitives::Address;
use alloy::signers::local::PrivateKeySigner;
use secrecy::{ExposeSecret, SecretString};

/// Signing key backing the wallet provider's signer handle
pub struct SecureWallet {
    /// Public address (safe to expose)
    address: Address,
    /// Ethereum wallet for alloy integration
    wallet: EthereumWallet,
}

impl SecureWallet {
    /// Create a wallet from an environment variable holding a hex-encoded key
    pub fn from_env(var_name: &str) -> Result<Self> {
        let key = std::env::var(var_name).map(SecretString::from).map_err(|_| {
            Error::Wallet(format!(
                "Environment variable {} not set. Required for signing.",
                var_name
            ))
        })?;

        Self::from_secret(&key)
    }

    /// Create a wallet from a secret hex-encoded private key
    pub fn from_secret(key: &SecretString) -> Result<Self> {
        Self::from_hex(key.expose_secret())
    }

    /// Create a wallet from a hex-encoded private key
    pub fn from_hex(key_hex: &str) -> Result<Self> {
        let key_hex = key_hex.trim();
        let key_hex = key_hex.strip_prefix("0x").unwrap_or(key_hex);

        let signer: PrivateKeySigner = key_hex
            .parse()
            .map_err(|e| Error::Wallet(format!("Invalid private key: {}", e)))?;

        let address = signer.address();
        let wallet = EthereumWallet::from(signer);

        Ok(Self { address, wallet })
    }

    /// Get the public address (safe to share)
    pub fn address(&self) -> Address {
        self.address
    }

    /// Get the EthereumWallet for building a signing provider
    ///
    /// EthereumWallet only exposes signing operations, not the raw key.
    pub fn ethereum_wallet(&self) -> &EthereumWallet {
        &self.wallet
    }
}

// Implement Debug manually to avoid exposing the signer
impl std::fmt::Debug for SecureWallet {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SecureWallet")
            .field("address", &self.address)
            .field("signer", &"[REDACTED]")
            .finish()
    }
}
