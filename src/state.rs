//! Page state
//!
//! Everything a front end needs to draw the whitelist page, with the button
//! and count line derived from it.

use crate::error::ErrorKind;
use alloy::primitives::TxHash;
use serde::Serialize;

/// Whether the wallet has been connected on the required network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionState {
    #[default]
    Disconnected,
    Connected,
}

/// Last known membership of the connected account and size of the list
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct WhitelistStatus {
    pub joined: bool,
    pub total_count: u64,
}

/// A submitted join that has not been confirmed yet
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PendingTransaction {
    #[default]
    Idle,
    AwaitingConfirmation { tx_hash: TxHash },
}

impl PendingTransaction {
    pub fn is_pending(&self) -> bool {
        matches!(self, PendingTransaction::AwaitingConfirmation { .. })
    }
}

/// The single call-to-action the page offers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum PrimaryAction {
    ConnectWallet,
    JoinWhitelist,
    Loading,
    Joined,
}

impl PrimaryAction {
    pub fn label(&self) -> &'static str {
        match self {
            PrimaryAction::ConnectWallet => "Connect your wallet",
            PrimaryAction::JoinWhitelist => "Join the Whitelist",
            PrimaryAction::Loading => "Loading...",
            PrimaryAction::Joined => "Thanks for joining the Whitelist!",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct PageState {
    pub connection: ConnectionState,
    pub status: WhitelistStatus,
    pub pending: PendingTransaction,
    /// Kind of the most recent failure, reset when a connect or join starts
    pub last_error: Option<ErrorKind>,
}

impl PageState {
    pub fn is_connected(&self) -> bool {
        self.connection == ConnectionState::Connected
    }

    pub fn primary_action(&self) -> PrimaryAction {
        if !self.is_connected() {
            PrimaryAction::ConnectWallet
        } else if self.status.joined {
            PrimaryAction::Joined
        } else if self.pending.is_pending() {
            PrimaryAction::Loading
        } else {
            PrimaryAction::JoinWhitelist
        }
    }

    pub fn count_line(&self) -> String {
        format!(
            "{} have already joined the Whitelist",
            self.status.total_count
        )
    }
}
