//! Whitelist page controller
//!
//! Holds the wallet session for the page's lifetime and drives the page state
//! through connect, refresh and join. Every failure is caught here, logged and
//! recorded in [`PageState::last_error`]; nothing propagates to the host, so
//! the page always stays interactive.

use crate::config::Config;
use crate::contract::WhitelistContract;
use crate::notice::Notifier;
use crate::state::{ConnectionState, PageState, PendingTransaction, PrimaryAction};
use crate::wallet::{SignerHandle, WalletProvider, WalletSession};
use crate::{Error, ErrorKind, Result};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, error, info, warn};

pub struct WhitelistController {
    session: WalletSession,
    contract: WhitelistContract,
    confirmations: u64,
    state: PageState,
    subscribers: Vec<mpsc::UnboundedSender<PageState>>,
}

impl WhitelistController {
    pub fn new(session: WalletSession, contract: WhitelistContract) -> Self {
        Self {
            session,
            contract,
            confirmations: 1,
            state: PageState::default(),
            subscribers: Vec::new(),
        }
    }

    /// Build a controller for the configured network and contract
    pub fn from_config(
        config: &Config,
        provider: Arc<dyn WalletProvider>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        let session = WalletSession::new(provider, config.network, notifier);
        Self::new(session, WhitelistContract::new(config.contract_address))
            .with_confirmations(config.confirmations)
    }

    /// Confirmations to wait for before a join counts as done
    pub fn with_confirmations(mut self, confirmations: u64) -> Self {
        self.confirmations = confirmations;
        self
    }

    pub fn state(&self) -> PageState {
        self.state
    }

    pub fn session(&self) -> &WalletSession {
        &self.session
    }

    /// Receive every state change from now on, starting with the current state
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<PageState> {
        let (tx, rx) = mpsc::unbounded_channel();
        let _ = tx.send(self.state);
        self.subscribers.push(tx);
        rx
    }

    fn publish(&mut self) {
        let state = self.state;
        self.subscribers.retain(|tx| tx.send(state).is_ok());
    }

    fn record_failure(&mut self, operation: &'static str, err: &Error) {
        match err.kind() {
            ErrorKind::WrongNetwork => warn!(operation, error = %err, "Blocked by network check"),
            ErrorKind::ProviderRejected => warn!(operation, error = %err, "Rejected by wallet"),
            ErrorKind::NotConnected => warn!(operation, "Wallet is not connected"),
            _ => error!(operation, error = %err, "Operation failed"),
        }
        self.state.last_error = Some(err.kind());
        self.publish();
    }

    /// Perform whatever the page's button currently offers
    pub async fn activate(&mut self) {
        match self.state.primary_action() {
            PrimaryAction::ConnectWallet => self.connect().await,
            PrimaryAction::JoinWhitelist => self.join_whitelist().await,
            PrimaryAction::Loading | PrimaryAction::Joined => {
                debug!(action = ?self.state.primary_action(), "Nothing to do")
            }
        }
    }

    /// Connect the wallet, then refresh membership and the member count
    pub async fn connect(&mut self) {
        self.state.last_error = None;

        if let Err(e) = self.session.acquire_handle(false).await {
            self.record_failure("connect", &e);
            return;
        }

        self.state.connection = ConnectionState::Connected;
        info!(network = self.session.network().name(), "Wallet connected");
        self.publish();

        self.refresh_membership().await;
        self.refresh_count().await;
    }

    /// Re-read whether the connected account is on the list
    pub async fn refresh_membership(&mut self) {
        match self.read_own_membership().await {
            Ok(joined) => {
                debug!(joined, "Membership refreshed");
                self.state.status.joined = joined;
                self.publish();
            }
            Err(e) => self.record_failure("refresh_membership", &e),
        }
    }

    async fn read_own_membership(&self) -> Result<bool> {
        let signer = self.session.signer().await?;
        self.contract
            .is_member(signer.reader(), signer.address())
            .await
    }

    /// Re-read how many addresses have joined
    pub async fn refresh_count(&mut self) {
        let result = match self.session.reader().await {
            Ok(reader) => self.contract.total_members(&reader).await,
            Err(e) => Err(e),
        };

        match result {
            Ok(total_count) => {
                debug!(total_count, "Member count refreshed");
                self.state.status.total_count = total_count;
                self.publish();
            }
            Err(e) => self.record_failure("refresh_count", &e),
        }
    }

    /// Submit a join for the connected account and wait for it to be mined
    pub async fn join_whitelist(&mut self) {
        if !self.state.is_connected() {
            self.record_failure("join_whitelist", &Error::NotConnected);
            return;
        }
        self.state.last_error = None;

        let signer = match self.session.signer().await {
            Ok(signer) => signer,
            Err(e) => {
                self.record_failure("join_whitelist", &e);
                return;
            }
        };

        let pending = match self.contract.submit_join(&signer).await {
            Ok(pending) => pending,
            Err(e) => {
                self.record_failure("join_whitelist", &e);
                return;
            }
        };

        self.state.pending = PendingTransaction::AwaitingConfirmation {
            tx_hash: pending.tx_hash,
        };
        self.publish();

        let confirmed = self
            .contract
            .confirm_join(&signer, pending, self.confirmations)
            .await;

        self.state.pending = PendingTransaction::Idle;
        if let Err(e) = confirmed {
            self.record_failure("join_whitelist", &e);
            return;
        }
        self.publish();

        self.refresh_count().await;
        self.reconcile_membership(&signer).await;
    }

    /// After a confirmed join the contract is asked again; if it cannot be
    /// reached the confirmed receipt is taken as proof of membership.
    async fn reconcile_membership(&mut self, signer: &SignerHandle) {
        let joined = match self
            .contract
            .is_member(signer.reader(), signer.address())
            .await
        {
            Ok(true) => true,
            Ok(false) => {
                warn!(
                    account = %signer.address(),
                    "Contract does not list the account after a confirmed join"
                );
                false
            }
            Err(e) => {
                warn!(error = %e, "Could not re-read membership after join, assuming joined");
                true
            }
        };

        self.state.status.joined = joined;
        self.publish();
    }
}
