//! In-memory contract gateway.
//!
//! Backs the tests and throwaway sessions. Clones share the same
//! ledger; [`MemoryLedger::read_only`] hands out a handle without `set_data`.
//! Fault injection and raw access exist only under test.

use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use async_trait::async_trait;
use tracing::debug;

use crate::gateway::{ContractReader, ContractWriter, GatewayError, Receipt};

struct LedgerState {
    data: HashMap<String, Vec<u8>>,
    available: bool,
    block: u64,
    failing_reads: HashSet<String>,
    write_failure: Option<String>,
}

/// Signer-backed in-memory ledger.
#[derive(Clone)]
pub struct MemoryLedger {
    state: Arc<Mutex<LedgerState>>,
}

/// Read-only view of a [`MemoryLedger`].
#[derive(Clone)]
pub struct ReadOnlyLedger {
    state: Arc<Mutex<LedgerState>>,
}

impl Default for MemoryLedger {
    fn default() -> Self {
        Self::new()
    }
}

impl MemoryLedger {
    pub fn new() -> Self {
        Self {
            state: Arc::new(Mutex::new(LedgerState {
                data: HashMap::new(),
                available: true,
                block: 0,
                failing_reads: HashSet::new(),
                write_failure: None,
            })),
        }
    }

    pub fn read_only(&self) -> ReadOnlyLedger {
        ReadOnlyLedger {
            state: Arc::clone(&self.state),
        }
    }

    #[cfg(test)]
    pub fn set_available(&self, available: bool) {
        lock(&self.state).available = available;
    }

    /// Make every `get_data(key)` fail with a call error.
    #[cfg(test)]
    pub fn fail_reads_of(&self, key: &str) {
        lock(&self.state).failing_reads.insert(key.to_string());
    }

    /// Make every `set_data` fail with `message`; `None` clears it.
    #[cfg(test)]
    pub fn fail_writes_with(&self, message: Option<&str>) {
        lock(&self.state).write_failure = message.map(str::to_string);
    }

    /// Store bytes directly, bypassing transactions.
    #[cfg(test)]
    pub fn insert_raw(&self, key: &str, value: impl Into<Vec<u8>>) {
        lock(&self.state).data.insert(key.to_string(), value.into());
    }

    #[cfg(test)]
    pub fn raw(&self, key: &str) -> Option<Vec<u8>> {
        lock(&self.state).data.get(key).cloned()
    }

    /// Number of `set_data` transactions mined so far.
    #[cfg(test)]
    pub fn block_height(&self) -> u64 {
        lock(&self.state).block
    }
}

fn lock(state: &Mutex<LedgerState>) -> MutexGuard<'_, LedgerState> {
    state.lock().unwrap_or_else(PoisonError::into_inner)
}

fn is_available(state: &Mutex<LedgerState>) -> Result<bool, GatewayError> {
    Ok(lock(state).available)
}

fn get_data(state: &Mutex<LedgerState>, key: &str) -> Result<Vec<u8>, GatewayError> {
    let state = lock(state);
    if state.failing_reads.contains(key) {
        return Err(GatewayError::Call(format!("read of {key} reverted")));
    }
    Ok(state.data.get(key).cloned().unwrap_or_default())
}

#[async_trait]
impl ContractReader for MemoryLedger {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        is_available(&self.state)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        get_data(&self.state, key)
    }
}

#[async_trait]
impl ContractWriter for MemoryLedger {
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<Receipt, GatewayError> {
        let mut state = lock(&self.state);
        if let Some(message) = &state.write_failure {
            return Err(GatewayError::Call(message.clone()));
        }
        state.data.insert(key.to_string(), value.to_vec());
        state.block += 1;
        let block = state.block;
        debug!(key, block, bytes = value.len(), "memory ledger write");
        Ok(Receipt {
            tx_hash: format!("0x{block:064x}"),
            block,
        })
    }
}

#[async_trait]
impl ContractReader for ReadOnlyLedger {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        is_available(&self.state)
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        get_data(&self.state, key)
    }
}
