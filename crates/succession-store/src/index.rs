//! Key index: the JSON array of record ids under `succession_plan_keys`.

use succession_core::keys::{self, KEY_INDEX};
use tracing::{info, warn};

use crate::StoreError;
use crate::gateway::{ContractReader, ContractWriter, GatewayError, Receipt};

/// Borrowed view of the key index on a gateway.
pub struct KeyIndex<'a, G: ?Sized> {
    gateway: &'a G,
}

impl<'a, G: ContractReader + ?Sized> KeyIndex<'a, G> {
    pub fn new(gateway: &'a G) -> Self {
        Self { gateway }
    }

    /// All record ids in append order.
    ///
    /// An absent index is empty. An index that does not decode is logged and
    /// also treated as empty; only gateway failures are returned.
    pub async fn load_keys(&self) -> Result<Vec<String>, GatewayError> {
        let bytes = self.gateway.get_data(KEY_INDEX).await?;
        match keys::decode_keys(&bytes) {
            Ok(ids) => Ok(ids),
            Err(e) => {
                warn!(key = KEY_INDEX, error = %e, "key index does not decode; treating as empty");
                Ok(Vec::new())
            }
        }
    }
}

impl<G: ContractWriter + ?Sized> KeyIndex<'_, G> {
    /// Append `id` and write the whole index back. No dedup.
    pub async fn append_key(&self, id: &str) -> Result<Receipt, StoreError> {
        let mut ids = self.load_keys().await?;
        ids.push(id.to_string());
        let bytes = keys::encode_keys(&ids)?;
        let receipt = self.gateway.set_data(KEY_INDEX, &bytes).await?;
        info!(id, count = ids.len(), block = receipt.block, "appended to key index");
        Ok(receipt)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::MemoryLedger;

    #[tokio::test]
    async fn absent_index_is_empty() {
        let ledger = MemoryLedger::new();
        assert!(KeyIndex::new(&ledger).load_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn malformed_index_is_empty() {
        let ledger = MemoryLedger::new();
        ledger.insert_raw(KEY_INDEX, "[\"unterminated");
        assert!(KeyIndex::new(&ledger).load_keys().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn append_keeps_order_and_duplicates() {
        let ledger = MemoryLedger::new();
        let index = KeyIndex::new(&ledger);
        index.append_key("a").await.unwrap();
        index.append_key("b").await.unwrap();
        index.append_key("a").await.unwrap();
        assert_eq!(index.load_keys().await.unwrap(), vec!["a", "b", "a"]);
        assert_eq!(ledger.raw(KEY_INDEX).unwrap(), br#"["a","b","a"]"#);
    }

    #[tokio::test]
    async fn append_over_malformed_index_starts_fresh() {
        let ledger = MemoryLedger::new();
        ledger.insert_raw(KEY_INDEX, "garbage");
        KeyIndex::new(&ledger).append_key("x").await.unwrap();
        assert_eq!(
            KeyIndex::new(&ledger).load_keys().await.unwrap(),
            vec!["x"]
        );
    }

    #[tokio::test]
    async fn read_failure_propagates() {
        let ledger = MemoryLedger::new();
        ledger.fail_reads_of(KEY_INDEX);
        assert!(KeyIndex::new(&ledger).load_keys().await.is_err());
    }
}
