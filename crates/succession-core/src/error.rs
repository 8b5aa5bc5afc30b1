use thiserror::Error;

/// Substring the signer reports when the user declines a transaction.
const USER_REJECTED: &str = "user rejected transaction";

/// A submission form that cannot be accepted.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("please fill required field: {0}")]
    MissingField(&'static str),

    #[error("score must be a number, got {0:?}")]
    InvalidScore(String),
}

/// A write that the signer or the contract refused.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransactionError {
    #[error("Transaction rejected by user")]
    Rejected,

    #[error("Submission failed: {0}")]
    Failed(String),
}

impl TransactionError {
    /// Classify a signer/contract failure message.
    pub fn classify(message: &str) -> Self {
        if message.contains(USER_REJECTED) {
            Self::Rejected
        } else if message.is_empty() {
            Self::Failed("Unknown error".into())
        } else {
            Self::Failed(message.to_string())
        }
    }
}
