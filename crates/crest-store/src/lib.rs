// Score record persistence and the current leaderboard-leader lookup.
use async_trait::async_trait;
use crest_common::{ScoreId, UserId};
use crest_rank::Ranking;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub mod memory;

pub type StoreResult<T> = Result<T, StoreError>;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("conflict: {0}")]
    Conflict(String),
    #[error(transparent)]
    Unexpected(#[from] anyhow::Error),
}

/// One submitted score. Created once, never mutated, never deleted here.
///
/// The `ranking` variant is computed at construction: a record below the
/// high-score threshold carries `Ranking::Unranked` and can never enter
/// leaderboard queries, no runtime filter involved.
///
/// ```
/// use crest_common::UserId;
/// use crest_store::ScoreRecord;
///
/// let record = ScoreRecord::new(UserId::new("u1"), "alice", 1500, 42);
/// assert!(record.ranking.is_ranked());
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub struct ScoreRecord {
    pub id: ScoreId,
    pub user_id: UserId,
    // Display name at submission time; denormalized, may go stale.
    pub display_name: String,
    pub score: i64,
    pub submitted_at: i64,
    pub ranking: Ranking,
}

impl ScoreRecord {
    pub fn new(
        user_id: UserId,
        display_name: impl Into<String>,
        score: i64,
        submitted_at: i64,
    ) -> Self {
        Self {
            id: ScoreId::new(),
            user_id,
            display_name: display_name.into(),
            score,
            submitted_at,
            ranking: Ranking::for_score(score, submitted_at),
        }
    }
}

/// Append-only score persistence.
///
/// `save` must not partially apply: no record is visible to readers until the
/// write commits. Writes are never retried here; retry policy belongs to the
/// caller.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn save(&self, record: ScoreRecord) -> StoreResult<()>;

    /// The record with the lexicographically smallest rank key, if any.
    async fn current_leader(&self) -> StoreResult<Option<ScoreRecord>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn record_below_threshold_is_unranked() {
        let record = ScoreRecord::new(UserId::new("u1"), "alice", 500, 7);
        assert_eq!(record.ranking, Ranking::Unranked);
    }

    #[test]
    fn record_at_threshold_carries_rank_key() {
        let record = ScoreRecord::new(UserId::new("u1"), "alice", 1_000, 7);
        let key = record.ranking.rank_key().expect("ranked");
        assert_eq!(key.decode().expect("decode"), (1_000, 7));
    }
}
