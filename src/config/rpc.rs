//! RPC endpoint configuration
//!
//! Resolution order, following Ethereum ecosystem conventions:
//! 1. Per-chain env vars (ETH_RPC_URL, SEPOLIA_RPC_URL, etc.) - highest priority
//! 2. Provider API keys (ALCHEMY_API_KEY, INFURA_API_KEY) - builds URLs automatically
//! 3. Public RPC fallbacks - for testing only
//!
//! ```bash
//! export SEPOLIA_RPC_URL="https://eth-sepolia.g.alchemy.com/v2/YOUR_KEY"
//! # or
//! export ALCHEMY_API_KEY="YOUR_KEY"
//! ```

use std::collections::HashMap;

/// RPC configuration for multiple chains
#[derive(Debug, Clone)]
pub struct RpcConfig {
    /// RPC URLs indexed by chain ID
    urls: HashMap<u64, String>,
}

/// Chain ID constants
pub mod chains {
    pub const MAINNET: u64 = 1;
    pub const RINKEBY: u64 = 4;
    pub const GOERLI: u64 = 5;
    pub const SEPOLIA: u64 = 11_155_111;
    pub const ANVIL: u64 = 31_337;
}

/// Environment variable names
mod env_vars {
    pub const ETH_RPC_URL: &str = "ETH_RPC_URL";
    pub const RINKEBY_RPC_URL: &str = "RINKEBY_RPC_URL";
    pub const GOERLI_RPC_URL: &str = "GOERLI_RPC_URL";
    pub const SEPOLIA_RPC_URL: &str = "SEPOLIA_RPC_URL";
    pub const ANVIL_RPC_URL: &str = "ANVIL_RPC_URL";

    pub const ALCHEMY_API_KEY: &str = "ALCHEMY_API_KEY";
    pub const INFURA_API_KEY: &str = "INFURA_API_KEY";
}

/// Public RPC endpoints (rate limited, for testing only)
mod public_rpcs {
    pub const MAINNET: &str = "https://eth.llamarpc.com";
    pub const SEPOLIA: &str = "https://ethereum-sepolia-rpc.publicnode.com";
    pub const ANVIL: &str = "http://127.0.0.1:8545";
}

const PER_CHAIN_VARS: [(&str, u64); 5] = [
    (env_vars::ETH_RPC_URL, chains::MAINNET),
    (env_vars::RINKEBY_RPC_URL, chains::RINKEBY),
    (env_vars::GOERLI_RPC_URL, chains::GOERLI),
    (env_vars::SEPOLIA_RPC_URL, chains::SEPOLIA),
    (env_vars::ANVIL_RPC_URL, chains::ANVIL),
];

impl RpcConfig {
    /// Create RPC config from environment variables
    pub fn from_env() -> Self {
        let mut urls = HashMap::new();

        for (var, chain_id) in PER_CHAIN_VARS {
            if let Ok(url) = std::env::var(var) {
                tracing::debug!(chain_id, "Using {} for RPC", var);
                urls.insert(chain_id, url);
            }
        }

        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::ALCHEMY_API_KEY) {
                tracing::info!("Building RPC URLs from ALCHEMY_API_KEY");
                urls.insert(
                    chains::MAINNET,
                    format!("https://eth-mainnet.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://eth-sepolia.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::GOERLI,
                    format!("https://eth-goerli.g.alchemy.com/v2/{}", key),
                );
                urls.insert(
                    chains::RINKEBY,
                    format!("https://eth-rinkeby.alchemyapi.io/v2/{}", key),
                );
            }
        }

        if urls.is_empty() {
            if let Ok(key) = std::env::var(env_vars::INFURA_API_KEY) {
                tracing::info!("Building RPC URLs from INFURA_API_KEY");
                urls.insert(
                    chains::MAINNET,
                    format!("https://mainnet.infura.io/v3/{}", key),
                );
                urls.insert(
                    chains::SEPOLIA,
                    format!("https://sepolia.infura.io/v3/{}", key),
                );
                urls.insert(chains::GOERLI, format!("https://goerli.infura.io/v3/{}", key));
                urls.insert(
                    chains::RINKEBY,
                    format!("https://rinkeby.infura.io/v3/{}", key),
                );
            }
        }

        // Rinkeby and Goerli have no public fallback; they must be configured
        if !urls.contains_key(&chains::MAINNET) {
            tracing::debug!("No RPC configured for mainnet, using public RPC (rate limited)");
        }
        urls.entry(chains::MAINNET)
            .or_insert_with(|| public_rpcs::MAINNET.to_string());
        urls.entry(chains::SEPOLIA)
            .or_insert_with(|| public_rpcs::SEPOLIA.to_string());
        urls.entry(chains::ANVIL)
            .or_insert_with(|| public_rpcs::ANVIL.to_string());

        Self { urls }
    }

    /// Create with explicit RPC URLs
    pub fn with_urls(urls: HashMap<u64, String>) -> Self {
        Self { urls }
    }

    /// Get RPC URL for a chain
    pub fn get(&self, chain_id: u64) -> Option<&str> {
        self.urls.get(&chain_id).map(|s| s.as_str())
    }
}

impl Default for RpcConfig {
    fn default() -> Self {
        Self::from_env()
    }
}
