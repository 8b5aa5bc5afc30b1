use succession_core::{TransactionError, ValidationError};
use thiserror::Error;

use crate::gateway::GatewayError;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Transaction(#[from] TransactionError),

    #[error("contract is not available")]
    Unavailable,

    #[error("gateway error: {0}")]
    Gateway(#[from] GatewayError),

    #[error("cannot decode value at {key}: {source}")]
    Decode {
        key: String,
        source: serde_json::Error,
    },

    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

impl StoreError {
    /// Recast a failure during a write sequence as a transaction failure.
    ///
    /// Validation errors pass through unchanged.
    pub(crate) fn into_transaction(self) -> Self {
        match self {
            Self::Validation(_) | Self::Transaction(_) => self,
            other => Self::Transaction(TransactionError::classify(&other.to_string())),
        }
    }
}
