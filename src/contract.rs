//! Binding for the external whitelist contract
//!
//! The contract owns all membership rules. This module only encodes calls to
//! its three entry points and decodes what comes back.

use crate::wallet::{ReadHandle, ReceiptSummary, SignerHandle};
use crate::{Error, Result};
use alloy::hex;
use alloy::primitives::{Address, Bytes, TxHash};
use alloy::sol;
use alloy::sol_types::{decode_revert_reason, SolCall};

sol! {
    interface IWhitelist {
        function numAddressesWhitelisted() external view returns (uint8);
        function whitelistedAddresses(address account) external view returns (bool);
        function addAddressToWhitelist() external;
    }
}

/// A join transaction that has been broadcast but not yet confirmed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PendingJoin {
    pub tx_hash: TxHash,
}

/// Typed access to a deployed whitelist contract
#[derive(Debug, Clone, Copy)]
pub struct WhitelistContract {
    address: Address,
}

impl WhitelistContract {
    pub fn new(address: Address) -> Self {
        Self { address }
    }

    /// Number of addresses that have joined
    pub async fn total_members(&self, handle: &ReadHandle) -> Result<u64> {
        let raw = self
            .read(handle, IWhitelist::numAddressesWhitelistedCall {}.abi_encode())
            .await?;
        let count = IWhitelist::numAddressesWhitelistedCall::abi_decode_returns(&raw)
            .map_err(|e| Error::CallFailed(format!("Malformed member count: {}", e)))?;
        Ok(u64::from(count))
    }

    /// Whether `account` is on the list
    pub async fn is_member(&self, handle: &ReadHandle, account: Address) -> Result<bool> {
        let raw = self
            .read(
                handle,
                IWhitelist::whitelistedAddressesCall { account }.abi_encode(),
            )
            .await?;
        IWhitelist::whitelistedAddressesCall::abi_decode_returns(&raw)
            .map_err(|e| Error::CallFailed(format!("Malformed membership flag: {}", e)))
    }

    /// Simulate, then broadcast, a join from the signer's account.
    ///
    /// A join the contract would revert is never sent.
    pub async fn submit_join(&self, signer: &SignerHandle) -> Result<PendingJoin> {
        let data = Bytes::from(IWhitelist::addAddressToWhitelistCall {}.abi_encode());
        let connection = signer.reader().connection();

        connection
            .call(Some(signer.address()), self.address, data.clone())
            .await
            .map_err(|e| match e {
                Error::CallFailed(message) => Error::CallFailed(format!(
                    "Join would revert: {}",
                    parse_revert_reason(&message)
                )),
                other => other,
            })?;

        let tx_hash = connection.send_transaction(self.address, data).await?;
        tracing::info!(
            tx_hash = %tx_hash,
            from = %signer.address(),
            contract = %self.address,
            "Join transaction submitted"
        );

        Ok(PendingJoin { tx_hash })
    }

    /// Wait for a submitted join to be mined with `confirmations` confirmations
    pub async fn confirm_join(
        &self,
        signer: &SignerHandle,
        pending: PendingJoin,
        confirmations: u64,
    ) -> Result<ReceiptSummary> {
        let receipt = signer
            .reader()
            .connection()
            .wait_for_receipt(pending.tx_hash, confirmations)
            .await?;

        if !receipt.success {
            return Err(Error::CallFailed(format!(
                "Join transaction {} reverted",
                receipt.tx_hash
            )));
        }

        tracing::info!(
            tx_hash = %receipt.tx_hash,
            block = ?receipt.block_number,
            gas_used = receipt.gas_used,
            "Join transaction confirmed"
        );
        Ok(receipt)
    }

    async fn read(&self, handle: &ReadHandle, data: Vec<u8>) -> Result<Bytes> {
        handle
            .connection()
            .call(None, self.address, Bytes::from(data))
            .await
    }
}

/// Extract a revert reason from an RPC error message
fn parse_revert_reason(error: &str) -> String {
    if let Some(reason) = decode_revert_data(error) {
        return reason;
    }

    if let Some(start) = error.find("revert: ") {
        let reason = &error[start + 8..];
        let end = [reason.find(", data:"), reason.find('"')]
            .into_iter()
            .flatten()
            .min()
            .unwrap_or(reason.len());
        return reason[..end].trim_end().to_string();
    }

    if error.contains("execution reverted") {
        if let Some(data) = revert_data(error) {
            return format!("reverted with data: {}", data);
        }
        return "execution reverted".to_string();
    }

    error.to_string()
}

/// Hex payload of a revert, taken from the `data:` field when present
fn revert_data(error: &str) -> Option<&str> {
    let from = error.find("data: ").unwrap_or(0);
    let start = from + error[from..].find("0x")?;
    let hex_data = &error[start..];
    let end = hex_data[2..]
        .find(|c: char| !c.is_ascii_hexdigit())
        .map_or(hex_data.len(), |i| i + 2);
    (end > 2).then(|| &hex_data[..end])
}

fn decode_revert_data(error: &str) -> Option<String> {
    let bytes = hex::decode(&revert_data(error)?[2..]).ok()?;
    let reason = decode_revert_reason(&bytes)?;
    Some(
        reason
            .strip_prefix("revert: ")
            .map(str::to_string)
            .unwrap_or(reason),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Network;
    use crate::notice::RecordingNotifier;
    use crate::testing::FakeChain;
    use crate::wallet::WalletSession;
    use alloy::sol_types::{Revert, SolError};
    use std::sync::Arc;

    fn session(chain: &Arc<FakeChain>) -> WalletSession {
        WalletSession::new(
            chain.wallet(),
            Network::Rinkeby,
            Arc::new(RecordingNotifier::new()),
        )
    }

    #[tokio::test]
    async fn test_reads_count_and_membership() {
        let chain = FakeChain::new(4);
        let other = Address::repeat_byte(0x22);
        chain.add_member(other);
        let session = session(&chain);
        let contract = WhitelistContract::new(FakeChain::contract_address());

        let reader = session.reader().await.unwrap();
        assert_eq!(contract.total_members(&reader).await.unwrap(), 1);
        assert!(contract.is_member(&reader, other).await.unwrap());
        assert!(!contract
            .is_member(&reader, FakeChain::signer_address())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_join_then_confirm() {
        let chain = FakeChain::new(4);
        let session = session(&chain);
        let contract = WhitelistContract::new(FakeChain::contract_address());

        let signer = session.signer().await.unwrap();
        let pending = contract.submit_join(&signer).await.unwrap();
        let receipt = contract.confirm_join(&signer, pending, 1).await.unwrap();

        assert_eq!(receipt.tx_hash, pending.tx_hash);
        assert!(contract
            .is_member(signer.reader(), signer.address())
            .await
            .unwrap());
    }

    #[tokio::test]
    async fn test_reverting_join_is_not_sent() {
        let chain = FakeChain::new(4);
        chain.add_member(FakeChain::signer_address());
        let session = session(&chain);
        let contract = WhitelistContract::new(FakeChain::contract_address());

        let signer = session.signer().await.unwrap();
        let err = contract.submit_join(&signer).await.unwrap_err();

        assert!(matches!(
            &err,
            Error::CallFailed(msg) if msg.contains("Sender has already been whitelisted")
        ));
        assert_eq!(chain.sent_transactions(), 0);
    }

    #[tokio::test]
    async fn test_reverted_receipt_is_failure() {
        let chain = FakeChain::new(4);
        chain.set_receipt_success(false);
        let session = session(&chain);
        let contract = WhitelistContract::new(FakeChain::contract_address());

        let signer = session.signer().await.unwrap();
        let pending = contract.submit_join(&signer).await.unwrap();
        let err = contract.confirm_join(&signer, pending, 1).await.unwrap_err();
        assert!(matches!(err, Error::CallFailed(msg) if msg.contains("reverted")));
    }

    #[test]
    fn test_parse_revert_reason_text() {
        let error = "execution reverted: revert: Limit reached\"";
        assert_eq!(parse_revert_reason(error), "Limit reached");

        assert_eq!(parse_revert_reason("execution reverted"), "execution reverted");
        assert_eq!(parse_revert_reason("some other error"), "some other error");
    }

    #[test]
    fn test_parse_revert_reason_abi_data() {
        let data = Revert {
            reason: "More addresses cant be added, limit reached".to_string(),
        }
        .abi_encode();
        let error = format!("execution reverted, data: \"0x{}\"", hex::encode(data));
        assert_eq!(
            parse_revert_reason(&error),
            "More addresses cant be added, limit reached"
        );
    }

    #[test]
    fn test_parse_revert_reason_with_data_suffix() {
        let reason = "Sender has already been whitelisted";
        let data = hex::encode(
            Revert {
                reason: reason.to_string(),
            }
            .abi_encode(),
        );
        let error = format!(
            "server returned an error response: error code 3: execution reverted: \
             revert: {}, data: \"0x{}\"",
            reason, data
        );
        assert_eq!(parse_revert_reason(&error), reason);

        // Truncated payload: fall back to the text before the data field
        let error = format!(
            "server returned an error response: error code 3: execution reverted: \
             revert: {}, data: \"0x08c379a0\"",
            reason
        );
        assert_eq!(parse_revert_reason(&error), reason);
    }
}
