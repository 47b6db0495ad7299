//! Score submission orchestration.
//!
//! One submission walks validate -> resolve identity -> persist ->
//! notify-or-skip; any step can drop into the failed state, which maps onto
//! `SubmissionError`. Identity and store calls carry explicit timeouts; a
//! timed-out call is a failure of that call, never success-by-default.
//! Fan-out runs after the record is durable and can no longer fail the
//! submission.
use crate::config::LeaderboardConfig;
use crest_common::now_epoch_seconds;
use crest_identity::{AuthError, IdentityProvider};
use crest_notify::{HighScoreEvent, Notifier};
use crest_rank::{MAX_SCORE, MIN_SCORE};
use crest_store::{ScoreRecord, ScoreStore, StoreError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;
use thiserror::Error;
use tokio::time::timeout;

/// Steps of the submission state machine, used for timeout labels and logs.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum Stage {
    Validate,
    ResolveIdentity,
    Persist,
    Notify,
}

impl Stage {
    fn as_str(&self) -> &'static str {
        match self {
            Stage::Validate => "validate",
            Stage::ResolveIdentity => "resolve identity",
            Stage::Persist => "persist",
            Stage::Notify => "notify",
        }
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Error)]
pub enum SubmissionError {
    #[error("invalid score: {0}")]
    Validation(String),
    #[error(transparent)]
    Auth(#[from] AuthError),
    #[error(transparent)]
    Store(#[from] StoreError),
    #[error("{0} step timed out")]
    Timeout(Stage),
}

/// Coordinates one submission across the identity provider, the score store,
/// and the notification fan-out.
pub struct ScoreSubmission {
    identity: Arc<dyn IdentityProvider>,
    scores: Arc<dyn ScoreStore>,
    notifier: Notifier,
    identity_timeout: Duration,
    store_timeout: Duration,
}

impl ScoreSubmission {
    pub fn new(
        identity: Arc<dyn IdentityProvider>,
        scores: Arc<dyn ScoreStore>,
        notifier: Notifier,
        config: &LeaderboardConfig,
    ) -> Self {
        Self {
            identity,
            scores,
            notifier,
            identity_timeout: Duration::from_millis(config.identity_timeout_ms),
            store_timeout: Duration::from_millis(config.store_timeout_ms),
        }
    }

    /// Run one submission to completion and return the persisted record.
    ///
    /// Validation and auth failures return before any side effect. A store
    /// failure is terminal and surfaced; it is not retried here. Fan-out
    /// happens only for ranked records and its outcome is logged, never
    /// returned: by then the score is already durable.
    pub async fn submit(
        &self,
        credential: &str,
        score: i64,
    ) -> Result<ScoreRecord, SubmissionError> {
        if !(MIN_SCORE..=MAX_SCORE).contains(&score) {
            return Err(SubmissionError::Validation(format!(
                "score must be between {MIN_SCORE} and {MAX_SCORE}"
            )));
        }

        let identity = timeout(self.identity_timeout, self.identity.validate(credential))
            .await
            .map_err(|_| SubmissionError::Timeout(Stage::ResolveIdentity))??;

        let record = ScoreRecord::new(
            identity.user_id,
            identity.display_name,
            score,
            now_epoch_seconds(),
        );
        timeout(self.store_timeout, self.scores.save(record.clone()))
            .await
            .map_err(|_| SubmissionError::Timeout(Stage::Persist))??;
        metrics::counter!("crest_submissions_total").increment(1);
        tracing::info!(
            user_id = %record.user_id,
            score,
            ranked = record.ranking.is_ranked(),
            "score recorded"
        );

        // The persisted ranking variant is the routing decision; the score is
        // never re-compared against the threshold here.
        if record.ranking.is_ranked() {
            let event = HighScoreEvent::new(record.display_name.clone(), record.score);
            let report = self.notifier.notify_user(&record.user_id, &event).await;
            tracing::info!(
                stage = %Stage::Notify,
                user_id = %record.user_id,
                attempted = report.attempted,
                delivered = report.delivered,
                failed = report.failed.len(),
                "high score fan-out finished"
            );
        }
        Ok(record)
    }
}
