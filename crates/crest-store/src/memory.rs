//! In-memory implementation of the score store.
//!
//! Implements `ScoreStore` with `HashMap`s guarded by `tokio::sync::RwLock`.
//! It exists for local development and tests, and as the reference backend
//! when a durable keyed store (the production deployment target) is not
//! configured.
//!
//! # Durability and consistency
//! - **Not durable**: all state is lost on process restart.
//! - **Single-process consistency**: one write lock spans the record insert
//!   and the index insert, so a save commits atomically or not at all.
//!
//! # Leader lookup
//! A `BTreeMap` ordered by rank key plays the role of a secondary index over
//! the ranked subset. `current_leader` reads the first entry; cost is
//! O(log n) in the number of *ranked* records and never scans the unranked
//! population. A scan-and-sort over all records would answer the same
//! question but does not scale and is deliberately not implemented.
use crate::{ScoreRecord, ScoreStore, StoreError, StoreResult};
use async_trait::async_trait;
use crest_common::ScoreId;
use crest_rank::RankKey;
use std::collections::{BTreeMap, HashMap};
use tokio::sync::RwLock;

#[derive(Debug, Default)]
struct Inner {
    records: HashMap<ScoreId, ScoreRecord>,
    // Ordered by (rank key, insertion sequence): among identical keys the
    // earlier insert stays first, so the leader never flaps on a tie.
    ranked: BTreeMap<(RankKey, u64), ScoreId>,
    next_seq: u64,
}

/// In-memory, index-backed score store.
///
/// ```
/// use crest_common::UserId;
/// use crest_store::memory::MemoryScoreStore;
/// use crest_store::{ScoreRecord, ScoreStore};
///
/// let store = MemoryScoreStore::new();
/// let rt = tokio::runtime::Runtime::new().expect("rt");
/// rt.block_on(async {
///     let record = ScoreRecord::new(UserId::new("u1"), "alice", 1500, 42);
///     store.save(record.clone()).await.expect("save");
///     let leader = store.current_leader().await.expect("leader");
///     assert_eq!(leader, Some(record));
/// });
/// ```
#[derive(Debug, Default)]
pub struct MemoryScoreStore {
    inner: RwLock<Inner>,
}

impl MemoryScoreStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreStore for MemoryScoreStore {
    async fn save(&self, record: ScoreRecord) -> StoreResult<()> {
        let mut guard = self.inner.write().await;
        if guard.records.contains_key(&record.id) {
            return Err(StoreError::Conflict(format!(
                "score record {} already exists",
                record.id
            )));
        }
        if let Some(key) = record.ranking.rank_key() {
            let seq = guard.next_seq;
            guard.next_seq += 1;
            guard.ranked.insert((key.clone(), seq), record.id);
        }
        guard.records.insert(record.id, record);
        metrics::counter!("crest_store_scores_total").increment(1);
        metrics::gauge!("crest_store_ranked_records").set(guard.ranked.len() as f64);
        Ok(())
    }

    async fn current_leader(&self) -> StoreResult<Option<ScoreRecord>> {
        let guard = self.inner.read().await;
        let leader = guard
            .ranked
            .first_key_value()
            .and_then(|(_, id)| guard.records.get(id))
            .cloned();
        Ok(leader)
    }
}
