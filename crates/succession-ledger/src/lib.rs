//! Ledger transport: HTTP access to a gateway node fronting the contract.

#[cfg(feature = "http")]
pub mod http;

#[cfg(feature = "http")]
pub use http::{LedgerClient, LedgerError, SignedLedgerClient};
