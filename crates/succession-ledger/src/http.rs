//! HTTP client for a ledger gateway node.
//!
//! The node fronts the contract's `isAvailable` / `getData` / `setData` calls:
//!
//! - `GET  /api/available`   → `{"available": bool}`
//! - `GET  /api/data/{key}`  → `{"value": "<base64>"}`, 404 when absent
//! - `PUT  /api/data/{key}`  ← `{"value": "<base64>"}` with a bearer signer token,
//!   → `{"tx_hash": "...", "block": n}`

use async_trait::async_trait;
use base64::prelude::*;
use reqwest::{StatusCode, Url};
use serde::{Deserialize, Serialize};
use succession_store::{ContractReader, ContractWriter, GatewayError, Receipt};
use thiserror::Error;
use tracing::{debug, info};

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),
    #[error("server returned {status}: {body}")]
    Server { status: u16, body: String },
    #[error("invalid gateway URL: {0}")]
    InvalidUrl(String),
    #[error("value is not base64: {0}")]
    Encoding(#[from] base64::DecodeError),
}

impl From<LedgerError> for GatewayError {
    fn from(e: LedgerError) -> Self {
        match e {
            // The node relays contract and signer refusals in the body.
            LedgerError::Server { status, body } if body.is_empty() => {
                GatewayError::Call(format!("status {status}"))
            }
            LedgerError::Server { body, .. } => GatewayError::Call(body),
            LedgerError::Encoding(e) => GatewayError::Corrupt(e.to_string()),
            other => GatewayError::Transport(Box::new(other)),
        }
    }
}

#[derive(Deserialize)]
struct AvailableResponse {
    available: bool,
}

#[derive(Serialize, Deserialize)]
struct ValueBody {
    value: String,
}

/// Read-only client. Add a signer with [`with_signer`](Self::with_signer).
#[derive(Clone)]
pub struct LedgerClient {
    client: reqwest::Client,
    base_url: String,
}

/// Client holding a signer token; the only one that can `set_data`.
#[derive(Clone)]
pub struct SignedLedgerClient {
    reader: LedgerClient,
    token: String,
}

impl LedgerClient {
    /// Create a client for the given gateway base URL.
    ///
    /// `base_url` should be like `http://localhost:8545` (no trailing slash).
    pub fn new(base_url: String) -> Self {
        Self {
            client: reqwest::Client::new(),
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    pub fn with_signer(self, token: String) -> SignedLedgerClient {
        SignedLedgerClient {
            reader: self,
            token,
        }
    }

    fn data_url(&self, key: &str) -> Result<Url, LedgerError> {
        let mut url = Url::parse(&format!("{}/api/data", self.base_url))
            .map_err(|e| LedgerError::InvalidUrl(e.to_string()))?;
        url.path_segments_mut()
            .map_err(|_| LedgerError::InvalidUrl(self.base_url.clone()))?
            .push(key);
        Ok(url)
    }

    pub async fn available(&self) -> Result<bool, LedgerError> {
        let url = format!("{}/api/available", self.base_url);
        let resp = self.client.get(&url).send().await?;
        let resp = check_status(resp).await?;
        let body: AvailableResponse = resp.json().await?;
        Ok(body.available)
    }

    pub async fn fetch(&self, key: &str) -> Result<Vec<u8>, LedgerError> {
        let url = self.data_url(key)?;
        debug!(url = %url, "fetching contract value");
        let resp = self.client.get(url).send().await?;
        if resp.status() == StatusCode::NOT_FOUND {
            return Ok(Vec::new());
        }
        let resp = check_status(resp).await?;
        let body: ValueBody = resp.json().await?;
        Ok(BASE64_STANDARD.decode(body.value)?)
    }
}

impl SignedLedgerClient {
    pub async fn store(&self, key: &str, value: &[u8]) -> Result<Receipt, LedgerError> {
        let url = self.reader.data_url(key)?;
        info!(url = %url, bytes = value.len(), "submitting setData transaction");
        let body = ValueBody {
            value: BASE64_STANDARD.encode(value),
        };
        let resp = self
            .reader
            .client
            .put(url)
            .bearer_auth(&self.token)
            .json(&body)
            .send()
            .await?;
        let resp = check_status(resp).await?;
        let receipt: Receipt = resp.json().await?;
        info!(tx_hash = %receipt.tx_hash, block = receipt.block, "transaction mined");
        Ok(receipt)
    }
}

async fn check_status(resp: reqwest::Response) -> Result<reqwest::Response, LedgerError> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().await.unwrap_or_default();
    Err(LedgerError::Server {
        status: status.as_u16(),
        body,
    })
}

#[async_trait]
impl ContractReader for LedgerClient {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        Ok(self.available().await?)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        Ok(self.fetch(key).await?)
    }
}

#[async_trait]
impl ContractReader for SignedLedgerClient {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        Ok(self.reader.available().await?)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        Ok(self.reader.fetch(key).await?)
    }
}

#[async_trait]
impl ContractWriter for SignedLedgerClient {
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<Receipt, GatewayError> {
        Ok(self.store(key, value).await?)
    }
}
