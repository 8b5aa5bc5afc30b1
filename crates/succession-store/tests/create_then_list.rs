//! End-to-end behaviour of the record store against the in-memory and file ledgers.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use succession_core::keys::{KEY_INDEX, record_key};
use succession_core::view;
use succession_core::{Action, AppState, PlanInput, ReadinessLevel, SealedScore};
use succession_store::{
    ContractReader, ContractWriter, FileLedger, GatewayError, KeyIndex, MemoryLedger, RecordStore,
};

fn at(secs: i64) -> DateTime<Utc> {
    DateTime::from_timestamp(secs, 0).unwrap()
}

fn form(position: &str, candidate: &str, department: &str, score: &str) -> PlanInput {
    PlanInput {
        position: position.into(),
        candidate_id: candidate.into(),
        department: department.into(),
        score: score.into(),
    }
}

/// Reader whose reads of one key revert.
struct RevertingRead<G> {
    inner: G,
    key: String,
}

#[async_trait]
impl<G: ContractReader> ContractReader for RevertingRead<G> {
    async fn is_available(&self) -> Result<bool, GatewayError> {
        self.inner.is_available().await
    }

    async fn get_data(&self, key: &str) -> Result<Vec<u8>, GatewayError> {
        if key == self.key {
            return Err(GatewayError::Call(format!("read of {key} reverted")));
        }
        self.inner.get_data(key).await
    }
}

#[tokio::test]
async fn created_record_is_listed_exactly_once() {
    let ledger = MemoryLedger::new();
    let store = RecordStore::new(ledger.clone());

    let input = form("Head of Platform", "E-10442", "Engineering", "79");
    let created = store.create_at(&input, at(1_700_000_000)).await.unwrap();

    let reader = RecordStore::new(ledger.read_only());
    let listed = reader.list_all().await.unwrap();
    let matches: Vec<_> = listed.iter().filter(|r| r.id == created.id).collect();
    assert_eq!(matches.len(), 1);

    let record = matches[0];
    assert_eq!(record.position, "Head of Platform");
    assert_eq!(record.candidate_id, "E-10442");
    assert_eq!(record.department, "Engineering");
    assert_eq!(record.timestamp, 1_700_000_000);
    assert_eq!(record.readiness_level, ReadinessLevel::Medium);
    assert_eq!(record.encrypted_score, SealedScore::seal("79"));
}

#[tokio::test]
async fn malformed_key_index_lists_nothing() {
    let ledger = MemoryLedger::new();
    ledger.set_data(KEY_INDEX, b"this is not json").await.unwrap();
    let store = RecordStore::new(ledger.read_only());
    assert!(store.list_all().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_fetch_does_not_abort_listing() {
    let ledger = MemoryLedger::new();
    let store = RecordStore::new(ledger.clone());
    let a = store.create_at(&form("A", "a", "Ops", "90"), at(1)).await.unwrap();
    let b = store.create_at(&form("B", "b", "Ops", "40"), at(2)).await.unwrap();
    let c = store.create_at(&form("C", "c", "Ops", "60"), at(3)).await.unwrap();

    // Dangling index entry, a reverting read, and an undecodable body.
    KeyIndex::new(&ledger).append_key("ghost").await.unwrap();
    let broken = store.create_at(&form("D", "d", "Ops", "60"), at(4)).await.unwrap();
    ledger
        .set_data(&record_key(&broken.id), b"{\"position\":")
        .await
        .unwrap();

    let reader = RecordStore::new(RevertingRead {
        inner: ledger.read_only(),
        key: record_key(&b.id),
    });
    let ids: Vec<_> = reader
        .list_all()
        .await
        .unwrap()
        .into_iter()
        .map(|r| r.id)
        .collect();
    assert_eq!(ids, vec![c.id, a.id]);
}

#[tokio::test]
async fn stored_record_without_readiness_lists_as_medium() {
    let ledger = MemoryLedger::new();
    ledger.set_data(KEY_INDEX, br#"["legacy"]"#).await.unwrap();
    ledger
        .set_data(
            &record_key("legacy"),
            br#"{"position":"CFO","candidateId":"x1","encryptedScore":"FHE-OTU=","timestamp":42,"department":"Finance"}"#,
        )
        .await
        .unwrap();
    let store = RecordStore::new(ledger.read_only());
    let listed = store.list_all().await.unwrap();
    assert_eq!(listed.len(), 1);
    assert_eq!(listed[0].readiness_level, ReadinessLevel::Medium);
}

#[tokio::test]
async fn file_ledger_round_trip_through_dashboard_state() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("ledger.json");

    let writer = RecordStore::new(FileLedger::open(&path));
    for (i, dept) in ["Engineering", "Finance", "Engineering"].iter().enumerate() {
        let score = if i == 0 { "95" } else { "55" };
        writer
            .create_at(&form(&format!("Role {i}"), &format!("c{i}"), dept, score), at(100 + i as i64))
            .await
            .unwrap();
    }

    let reader = RecordStore::new(FileLedger::open(&path));
    let mut state = AppState::default();
    state.apply(Action::RefreshStarted);
    state.apply(Action::RecordsLoaded(reader.list_all().await.unwrap()));

    assert_eq!(state.records.len(), 3);
    assert_eq!(state.records[0].position, "Role 2");
    assert_eq!(view::readiness_ratio(&state.records), 33.3);

    state.apply(Action::DepartmentChanged("Finance".into()));
    let page = state.page_records();
    assert_eq!(page.len(), 1);
    assert_eq!(page[0].candidate_id, "c1");
}
