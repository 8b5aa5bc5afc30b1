//! Record store: list and create succession plans on a contract gateway.
//!
//! `create` issues two independent transactions (record body, then index
//! append) with no rollback. A crash between them leaves a body nobody lists;
//! an index entry whose body is missing is skipped by [`RecordStore::list_all`].

use chrono::{DateTime, Utc};
use succession_core::keys::{self, record_key};
use succession_core::{PlanInput, Record, StoredPlan};
use tracing::{debug, info, warn};

use crate::StoreError;
use crate::gateway::{ContractReader, ContractWriter};
use crate::index::KeyIndex;

pub struct RecordStore<G> {
    gateway: G,
}

impl<G: ContractReader> RecordStore<G> {
    pub fn new(gateway: G) -> Self {
        Self { gateway }
    }

    pub fn gateway(&self) -> &G {
        &self.gateway
    }

    /// Probe the contract. A `false` answer and a failed probe are both
    /// [`StoreError::Unavailable`].
    pub async fn check_availability(&self) -> Result<(), StoreError> {
        match self.gateway.is_available().await {
            Ok(true) => Ok(()),
            Ok(false) => {
                warn!("contract reports unavailable");
                Err(StoreError::Unavailable)
            }
            Err(e) => {
                warn!(error = %e, "availability probe failed");
                Err(StoreError::Unavailable)
            }
        }
    }

    /// Every listed record, newest first.
    ///
    /// Records are fetched one at a time. A key whose fetch fails, whose body
    /// is empty, or whose body does not decode is logged and left out.
    pub async fn list_all(&self) -> Result<Vec<Record>, StoreError> {
        self.check_availability().await?;
        let ids = KeyIndex::new(&self.gateway).load_keys().await?;

        let mut records = Vec::with_capacity(ids.len());
        let mut skipped = 0usize;
        for id in ids {
            match self.get(&id).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {
                    debug!(id = %id, "indexed record has no body");
                    skipped += 1;
                }
                Err(e) => {
                    warn!(id = %id, error = %e, "skipping unreadable record");
                    skipped += 1;
                }
            }
        }

        // Stable: equal timestamps keep index order.
        records.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        info!(count = records.len(), skipped, "loaded succession plans");
        Ok(records)
    }

    /// Fetch one record by id. `Ok(None)` when nothing is stored under it.
    pub async fn get(&self, id: &str) -> Result<Option<Record>, StoreError> {
        let key = record_key(id);
        let bytes = self.gateway.get_data(&key).await?;
        if bytes.is_empty() {
            return Ok(None);
        }
        let stored: StoredPlan =
            serde_json::from_slice(&bytes).map_err(|source| StoreError::Decode { key, source })?;
        Ok(Some(Record::from_stored(id.to_string(), stored)))
    }
}

impl<G: ContractWriter> RecordStore<G> {
    /// Validate, seal, and persist a new plan.
    pub async fn create(&self, input: &PlanInput) -> Result<Record, StoreError> {
        self.create_at(input, Utc::now()).await
    }

    /// [`create`](Self::create) with an explicit submission time.
    pub async fn create_at(
        &self,
        input: &PlanInput,
        now: DateTime<Utc>,
    ) -> Result<Record, StoreError> {
        let plan = input.validate()?;
        let id = keys::generate_id(now);
        let record = plan.into_record(id, now.timestamp());

        self.write(&record)
            .await
            .map_err(StoreError::into_transaction)?;
        info!(
            id = %record.id,
            readiness = %record.readiness_level,
            department = %record.department,
            "created succession plan"
        );
        Ok(record)
    }

    async fn write(&self, record: &Record) -> Result<(), StoreError> {
        let body = serde_json::to_vec(&record.to_stored())?;
        let receipt = self.gateway.set_data(&record_key(&record.id), &body).await?;
        debug!(id = %record.id, block = receipt.block, "record body written");
        KeyIndex::new(&self.gateway).append_key(&record.id).await?;
        Ok(())
    }
}
