//! Error types for the whitelist client

use serde::Serialize;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum Error {
    #[error("Wrong network: expected chain {expected}, wallet is on chain {actual}")]
    WrongNetwork { expected: u64, actual: u64 },

    #[error("Provider rejected the request: {0}")]
    ProviderRejected(String),

    #[error("Contract call failed: {0}")]
    CallFailed(String),

    #[error("Wallet is not connected")]
    NotConnected,

    #[error("Wallet error: {0}")]
    Wallet(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

/// Coarse classification of a failure, kept in page state for display
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
    WrongNetwork,
    ProviderRejected,
    CallFailed,
    NotConnected,
    Other,
}

impl Error {
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::WrongNetwork { .. } => ErrorKind::WrongNetwork,
            Error::ProviderRejected(_) => ErrorKind::ProviderRejected,
            Error::CallFailed(_) => ErrorKind::CallFailed,
            Error::NotConnected => ErrorKind::NotConnected,
            _ => ErrorKind::Other,
        }
    }
}

pub type Result<T> = std::result::Result<T, Error>;
