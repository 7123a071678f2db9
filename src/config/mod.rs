//! Configuration for the whitelist client

pub mod rpc;

use crate::{Error, Result};
use alloy::primitives::Address;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::str::FromStr;

// Re-export RPC config
pub use rpc::RpcConfig;

/// Environment variable that overrides the configured contract address
pub const CONTRACT_ADDRESS_ENV: &str = "WHITELIST_CONTRACT_ADDRESS";

/// Default environment variable holding the signing key
pub const DEFAULT_PRIVATE_KEY_ENV: &str = "PRIVATE_KEY";

/// Networks the whitelist contract can be deployed on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Network {
    Mainnet,
    #[default]
    Rinkeby,
    Goerli,
    Sepolia,
    Anvil,
}

impl Network {
    pub fn chain_id(&self) -> u64 {
        match self {
            Network::Mainnet => rpc::chains::MAINNET,
            Network::Rinkeby => rpc::chains::RINKEBY,
            Network::Goerli => rpc::chains::GOERLI,
            Network::Sepolia => rpc::chains::SEPOLIA,
            Network::Anvil => rpc::chains::ANVIL,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Network::Mainnet => "mainnet",
            Network::Rinkeby => "rinkeby",
            Network::Goerli => "goerli",
            Network::Sepolia => "sepolia",
            Network::Anvil => "anvil",
        }
    }

    /// Human-readable name used in user notices
    pub fn display_name(&self) -> &'static str {
        match self {
            Network::Mainnet => "Ethereum Mainnet",
            Network::Rinkeby => "Rinkeby",
            Network::Goerli => "Goerli",
            Network::Sepolia => "Sepolia",
            Network::Anvil => "Anvil (local)",
        }
    }
}

impl FromStr for Network {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.to_lowercase().as_str() {
            "mainnet" | "ethereum" => Ok(Network::Mainnet),
            "rinkeby" => Ok(Network::Rinkeby),
            "goerli" => Ok(Network::Goerli),
            "sepolia" => Ok(Network::Sepolia),
            "anvil" | "local" => Ok(Network::Anvil),
            other => Err(Error::InvalidArgument(format!("Unknown network: {}", other))),
        }
    }
}

/// Main configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// The one network every call must be made on
    pub network: Network,
    /// Address of the whitelist contract
    pub contract_address: Address,
    /// Explicit RPC URL; when unset the URL comes from [`RpcConfig`]
    #[serde(default)]
    pub rpc_url: Option<String>,
    /// Confirmations to wait for after submitting a join
    #[serde(default = "default_confirmations")]
    pub confirmations: u64,
    /// Name of the environment variable holding the signing key
    #[serde(default = "default_private_key_env")]
    pub private_key_env: String,
    /// Receipt polling interval (milliseconds)
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
}

fn default_confirmations() -> u64 {
    1
}

fn default_private_key_env() -> String {
    DEFAULT_PRIVATE_KEY_ENV.to_string()
}

fn default_poll_interval_ms() -> u64 {
    4_000
}

impl Default for Config {
    fn default() -> Self {
        Self {
            network: Network::default(),
            contract_address: Address::ZERO,
            rpc_url: None,
            confirmations: default_confirmations(),
            private_key_env: default_private_key_env(),
            poll_interval_ms: default_poll_interval_ms(),
        }
    }
}

impl Config {
    /// Load config from a JSON file, or defaults when no path is given.
    ///
    /// `WHITELIST_CONTRACT_ADDRESS` overrides the contract address either way.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(path) => {
                let content = std::fs::read_to_string(path)?;
                serde_json::from_str(&content)
                    .map_err(|e| Error::Config(format!("Invalid config file: {}", e)))?
            }
            None => Config::default(),
        };

        if let Ok(address) = std::env::var(CONTRACT_ADDRESS_ENV) {
            config.contract_address = Address::from_str(address.trim()).map_err(|e| {
                Error::Config(format!("Invalid {}: {}", CONTRACT_ADDRESS_ENV, e))
            })?;
            tracing::debug!(
                address = %config.contract_address,
                "Using contract address from environment"
            );
        }

        Ok(config)
    }

    /// Reject configurations that could never reach a contract
    pub fn validate(&self) -> Result<()> {
        if self.contract_address == Address::ZERO {
            return Err(Error::Config(format!(
                "No contract address configured (set contract_address or {})",
                CONTRACT_ADDRESS_ENV
            )));
        }
        if self.private_key_env.is_empty() {
            return Err(Error::Config("private_key_env cannot be empty".to_string()));
        }
        Ok(())
    }

    /// Resolve the RPC URL for the required network
    pub fn resolve_rpc_url(&self, rpc: &RpcConfig) -> Result<String> {
        if let Some(url) = &self.rpc_url {
            return Ok(url.clone());
        }
        rpc.get(self.network.chain_id())
            .map(str::to_string)
            .ok_or_else(|| {
                Error::Config(format!("No RPC URL configured for {}", self.network.name()))
            })
    }
}
