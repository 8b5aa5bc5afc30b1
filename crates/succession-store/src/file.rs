//! JSON-file contract gateway for local use.
//!
//! The whole ledger lives in one file:
//!
//! ```json
//! { "block": 2, "entries": { "succession_plan_keys": "<base64>" } }
//! ```
//!
//! Every call re-reads the file; writes go to a uniquely named temp file in
//! the same directory and are renamed into place.

use std::collections::BTreeMap;
use std::io::Write;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use base64::prelude::*;
use serde::{Deserialize, Serialize};
use tracing::{debug, info};

use crate::gateway::{ContractReader, ContractWriter, GatewayError, Receipt};

#[derive(Debug, Default, Serialize, Deserialize)]
struct LedgerFile {
    block: u64,
    entries: BTreeMap<String, String>,
}

/// File-backed ledger. Holding one is holding the signer.
pub struct FileLedger {
    path: PathBuf,
}

impl FileLedger {
    /// Use the ledger at `path`. A missing file is an empty ledger.
    pub fn open(path: &Path) -> Self {
        Self {
            path: path.to_path_buf(),
        }
    }

    async fn load(&self) -> Result<LedgerFile, GatewayError> {
        let bytes = match tokio::fs::read(&self.path).await {
            Ok(bytes) => bytes,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(LedgerFile::default()),
            Err(e) => return Err(e.into()),
        };
        serde_json::from_slice(&bytes)
            .map_err(|e| GatewayError::Corrupt(format!("{}: {e}", self.path.display())))
    }

    async fn store(&self, ledger: &LedgerFile) -> Result<(), GatewayError> {
        let json = serde_json::to_vec_pretty(ledger)
            .map_err(|e| GatewayError::Corrupt(e.to_string()))?;
        let path = self.path.clone();
        tokio::task::spawn_blocking(move || persist(&path, &json))
            .await
            .map_err(|e| GatewayError::Transport(Box::new(e)))?
    }
}

fn persist(path: &Path, json: &[u8]) -> Result<(), GatewayError> {
    let dir = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let mut tmp = tempfile::NamedTempFile::new_in(dir)?;
    tmp.write_all(json)?;
    tmp.as_file().sync_all()?;
    tmp.persist(path).map_err(|e| GatewayError::Io(e.error))?;
    Ok(())
}

#[async_trait]
impl ContractReader for FileLedger {
    /// Available when the file is absent or parses.
    async fn is_available(&self) -> Result<bool, GatewayError> {
        match self.load().await {
            Ok(_) => Ok(true),
            Err(GatewayError::Corrupt(reason)) => {
                info!(reason = %reason, "ledger file unreadable");
                Ok(false)
            }
            Err(e) => Err(e),
        }
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        let ledger = self.load().await?;
        let Some(encoded) = ledger.entries.get(key) else {
            return Ok(Vec::new());
        };
        BASE64_STANDARD
            .decode(encoded)
            .map_err(|e| GatewayError::Corrupt(format!("entry {key}: {e}")))
    }
}

#[async_trait]
impl ContractWriter for FileLedger {
    async fn set_data(&self, key: &str, value: &[u8]) -> Result<Receipt, GatewayError> {
        let mut ledger = self.load().await?;
        ledger
            .entries
            .insert(key.to_string(), BASE64_STANDARD.encode(value));
        ledger.block += 1;
        self.store(&ledger).await?;
        debug!(key, block = ledger.block, path = %self.path.display(), "file ledger write");
        Ok(Receipt {
            tx_hash: format!("local:{:016x}", ledger.block),
            block: ledger.block,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn missing_file_is_empty_and_available() {
        let dir = tempfile::tempdir().unwrap();
        let ledger = FileLedger::open(&dir.path().join("ledger.json"));
        assert!(ledger.is_available().await.unwrap());
        assert!(ledger.get_data("anything").await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn writes_survive_reopen() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let ledger = FileLedger::open(&path);
        let first = ledger.set_data("a", b"one").await.unwrap();
        let second = ledger.set_data("b", b"two").await.unwrap();
        assert_eq!(first.block, 1);
        assert_eq!(second.block, 2);

        let reopened = FileLedger::open(&path);
        assert_eq!(reopened.get_data("a").await.unwrap(), b"one");
        assert_eq!(reopened.get_data("b").await.unwrap(), b"two");
        let names: Vec<_> = std::fs::read_dir(dir.path())
            .unwrap()
            .map(|entry| entry.unwrap().file_name())
            .collect();
        assert_eq!(names, vec![std::ffi::OsString::from("ledger.json")]);
    }

    #[tokio::test]
    async fn concurrent_writers_leave_a_readable_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");

        let writers: Vec<_> = (0..8)
            .map(|i| {
                let ledger = FileLedger::open(&path);
                tokio::spawn(async move { ledger.set_data(&format!("k{i}"), b"v").await })
            })
            .collect();
        for writer in writers {
            writer.await.unwrap().unwrap();
        }

        let ledger = FileLedger::open(&path);
        assert!(ledger.is_available().await.unwrap());
        assert_eq!(std::fs::read_dir(dir.path()).unwrap().count(), 1);
    }

    #[tokio::test]
    async fn corrupt_file_reports_unavailable() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("ledger.json");
        std::fs::write(&path, "not json").unwrap();

        let ledger = FileLedger::open(&path);
        assert!(!ledger.is_available().await.unwrap());
        assert!(matches!(
            ledger.get_data("a").await,
            Err(GatewayError::Corrupt(_))
        ));
    }
}
