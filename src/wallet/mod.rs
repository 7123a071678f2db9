//! Wallet access
//!
//! Private keys stay inside [`SecureWallet`]. Everything else in the crate
//! reaches the chain through a [`WalletSession`] and the typed handles it
//! hands out.

mod provider;
mod session;
mod signer;

pub use provider::{ProviderConnection, ReceiptSummary, RpcWalletProvider, WalletProvider};
pub use session::{Handle, ReadHandle, SignerHandle, WalletSession};
pub use signer::SecureWallet;
