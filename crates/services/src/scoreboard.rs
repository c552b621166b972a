use std::sync::Arc;

use mathquiz_core::model::{ConfigurationError, PlayerName, ScoreId, ScoreRecord};
use storage::repository::{ScoreRepository, ScoreRow, StorageError};

use crate::Clock;
use crate::error::SessionError;
use crate::session::SessionSummary;

/// Validates and persists finished-session results, and reads them back.
#[derive(Clone)]
pub struct ScoreboardService {
    clock: Clock,
    scores: Arc<dyn ScoreRepository>,
}

impl ScoreboardService {
    #[must_use]
    pub fn new(clock: Clock, scores: Arc<dyn ScoreRepository>) -> Self {
        Self { clock, scores }
    }

    /// Build a record from a session summary, validating the name first.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Name` for a blank or over-long name and
    /// `SessionError::Configuration` if the session never had a difficulty.
    pub fn record_for(
        &self,
        name: &str,
        summary: &SessionSummary,
    ) -> Result<ScoreRecord, SessionError> {
        let player_name = PlayerName::parse(name)?;
        let difficulty = summary
            .difficulty
            .ok_or(ConfigurationError::NoDifficulty)?;
        Ok(ScoreRecord::new(
            player_name,
            summary.score,
            difficulty,
            summary.subjects.iter().copied(),
            self.clock.now(),
        ))
    }

    /// Append a record. Failures are logged and returned, never swallowed.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the repository rejects the write.
    pub async fn save(&self, record: &ScoreRecord) -> Result<ScoreId, StorageError> {
        match self.scores.append_score(record).await {
            Ok(id) => {
                tracing::info!(
                    score_id = %id,
                    player = %record.player_name(),
                    score = record.score(),
                    "score saved"
                );
                Ok(id)
            }
            Err(err) => {
                tracing::warn!(error = %err, score = record.score(), "failed to save score");
                Err(err)
            }
        }
    }

    /// Every saved score, highest first; ties keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read.
    pub async fn list_all(&self) -> Result<Vec<ScoreRow>, StorageError> {
        self.scores.list_scores().await
    }
}
