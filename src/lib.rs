//! Whitelist dApp client
//!
//! Connects a wallet, checks whether its account is on an allow-list kept by
//! an external contract, and submits the transaction to join it:
//! - [`wallet::WalletSession`] gates every call on the required network
//! - [`contract::WhitelistContract`] encodes the contract's three entry points
//! - [`WhitelistController`] owns the page state and never lets a failure escape
//!
//! All membership rules live in the contract; this crate only calls it.

pub mod config;
pub mod contract;
pub mod controller;
pub mod notice;
pub mod state;
pub mod wallet;

mod error;

#[cfg(test)]
mod testing;

// Re-export commonly used types
pub use config::{Config, Network, RpcConfig};
pub use controller::WhitelistController;
pub use error::{Error, ErrorKind, Result};
pub use state::{ConnectionState, PageState, PendingTransaction, PrimaryAction, WhitelistStatus};
