// Sortable composite rank keys: ascending lexicographic order yields
// descending score, and among equal scores, ascending submission time.
use serde::{Deserialize, Serialize};
use std::fmt;

pub type Result<T> = std::result::Result<T, RankKeyError>;

pub const MIN_SCORE: i64 = 0;
pub const MAX_SCORE: i64 = 999_999;
pub const HIGH_SCORE_THRESHOLD: i64 = 1_000;

// Fixed widths are what make lexicographic order agree with numeric order.
const SCORE_PAD_WIDTH: usize = 6;
const TIMESTAMP_PAD_WIDTH: usize = 10;
const MAX_TIMESTAMP: i64 = 9_999_999_999;

#[derive(thiserror::Error, Debug)]
pub enum RankKeyError {
    #[error("malformed rank key: {0}")]
    Malformed(String),
}

/// Composite key ordering leaderboard records.
///
/// ```
/// use crest_rank::RankKey;
///
/// let high = RankKey::encode(1500, 10);
/// let low = RankKey::encode(1200, 5);
/// assert!(high < low);
/// ```
#[derive(Clone, Debug, Eq, PartialEq, Ord, PartialOrd, Hash, Serialize, Deserialize)]
pub struct RankKey(String);

impl RankKey {
    /// Encode a score and submission timestamp into a sortable key.
    ///
    /// Total and deterministic: out-of-range inputs are clamped rather than
    /// rejected; range validation belongs to the submission boundary.
    pub fn encode(score: i64, submitted_at: i64) -> Self {
        let bounded = score.clamp(MIN_SCORE, MAX_SCORE);
        let inverted = MAX_SCORE - bounded;
        let ts = submitted_at.clamp(0, MAX_TIMESTAMP);
        Self(format!(
            "{inverted:0score_width$}#{ts:0ts_width$}",
            score_width = SCORE_PAD_WIDTH,
            ts_width = TIMESTAMP_PAD_WIDTH,
        ))
    }

    /// Recover the `(score, submitted_at)` pair behind a key.
    pub fn decode(&self) -> Result<(i64, i64)> {
        let (inverted, ts) = self
            .0
            .split_once('#')
            .ok_or_else(|| RankKeyError::Malformed(self.0.clone()))?;
        if inverted.len() != SCORE_PAD_WIDTH || ts.len() != TIMESTAMP_PAD_WIDTH {
            return Err(RankKeyError::Malformed(self.0.clone()));
        }
        let inverted: i64 = inverted
            .parse()
            .map_err(|_| RankKeyError::Malformed(self.0.clone()))?;
        let ts: i64 = ts
            .parse()
            .map_err(|_| RankKeyError::Malformed(self.0.clone()))?;
        if !(0..=MAX_SCORE).contains(&inverted) {
            return Err(RankKeyError::Malformed(self.0.clone()));
        }
        Ok((MAX_SCORE - inverted, ts))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for RankKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Whether a record participates in leaderboard ordering.
///
/// Records below [`HIGH_SCORE_THRESHOLD`] are `Unranked` by construction and
/// excluded from ranking queries without any runtime filtering.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
pub enum Ranking {
    Ranked(RankKey),
    Unranked,
}

impl Ranking {
    /// Build the ranking for a freshly submitted score.
    ///
    /// ```
    /// use crest_rank::Ranking;
    ///
    /// assert!(Ranking::for_score(1000, 7).is_ranked());
    /// assert!(!Ranking::for_score(999, 7).is_ranked());
    /// ```
    pub fn for_score(score: i64, submitted_at: i64) -> Self {
        if score >= HIGH_SCORE_THRESHOLD {
            Self::Ranked(RankKey::encode(score, submitted_at))
        } else {
            Self::Unranked
        }
    }

    pub fn rank_key(&self) -> Option<&RankKey> {
        match self {
            Self::Ranked(key) => Some(key),
            Self::Unranked => None,
        }
    }

    pub fn is_ranked(&self) -> bool {
        matches!(self, Self::Ranked(_))
    }
}
