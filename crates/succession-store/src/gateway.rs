//! Contract data gateway: the key-value surface of the external contract.
//!
//! Reads go through [`ContractReader`]. Only signer-backed gateways implement
//! [`ContractWriter`], so a read-only handle cannot issue `set_data` at all.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GatewayError {
    /// The contract or signer refused the call.
    #[error("contract call failed: {0}")]
    Call(String),

    #[error("transport error: {0}")]
    Transport(#[source] Box<dyn std::error::Error + Send + Sync>),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("ledger data is corrupt: {0}")]
    Corrupt(String),
}

/// Receipt for a mined `set_data` transaction.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Receipt {
    pub tx_hash: String,
    pub block: u64,
}

#[async_trait]
pub trait ContractReader: Send + Sync {
    /// Liveness probe.
    async fn is_available(&self) -> Result<bool, GatewayError>;

    /// Bytes stored under `key`; empty when absent.
    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError>;
}

#[async_trait]
pub trait ContractWriter: ContractReader {
    /// Store `value` under `key`. Each call is its own transaction.
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<Receipt, GatewayError>;
}

#[async_trait]
impl<T: ContractReader + ?Sized> ContractReader for Box<T> {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        (**self).is_available().await
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        (**self).get_data(key).await
    }
}

#[async_trait]
impl<T: ContractWriter + ?Sized> ContractWriter for Box<T> {
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<Receipt, GatewayError> {
        (**self).set_data(key, value).await
    }
}
