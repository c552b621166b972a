use async_trait::async_trait;
use mathquiz_core::model::{ScoreId, ScoreRecord};
use std::sync::{Arc, Mutex};
use thiserror::Error;

/// Errors surfaced by storage adapters.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum StorageError {
    #[error("not found")]
    NotFound,

    #[error("connection error: {0}")]
    Connection(String),

    #[error("serialization error: {0}")]
    Serialization(String),
}

/// A saved score together with its storage identifier.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScoreRow {
    pub id: ScoreId,
    pub record: ScoreRecord,
}

impl ScoreRow {
    #[must_use]
    pub fn new(id: ScoreId, record: ScoreRecord) -> Self {
        Self { id, record }
    }
}

/// Append-only scoreboard. There is no update or delete.
#[async_trait]
pub trait ScoreRepository: Send + Sync {
    /// Append a finished-session result.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the record cannot be stored.
    async fn append_score(&self, record: &ScoreRecord) -> Result<ScoreId, StorageError>;

    /// Fetch one saved score.
    ///
    /// # Errors
    ///
    /// Returns `StorageError::NotFound` if missing, or other storage errors.
    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError>;

    /// All saved scores, highest first; equal scores keep insertion order.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if rows cannot be read or decoded.
    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError>;
}

/// Simple in-memory repository implementation for testing and prototyping.
#[derive(Clone, Default)]
pub struct InMemoryRepository {
    scores: Arc<Mutex<Vec<ScoreRow>>>,
}

impl InMemoryRepository {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScoreRepository for InMemoryRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<ScoreId, StorageError> {
        let mut guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let next = i64::try_from(guard.len())
            .map_err(|_| StorageError::Serialization("score id overflow".into()))?
            + 1;
        let id = ScoreId::new(next);
        guard.push(ScoreRow::new(id, record.clone()));
        Ok(id)
    }

    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        guard
            .iter()
            .find(|row| row.id == id)
            .map(|row| row.record.clone())
            .ok_or(StorageError::NotFound)
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError> {
        let guard = self
            .scores
            .lock()
            .map_err(|e| StorageError::Connection(e.to_string()))?;
        let mut rows = guard.clone();
        rows.sort_by(|a, b| b.record.score().cmp(&a.record.score()).then(a.id.cmp(&b.id)));
        Ok(rows)
    }
}

/// Repository handle behind a trait object for easy backend swapping.
#[derive(Clone)]
pub struct Storage {
    pub scores: Arc<dyn ScoreRepository>,
}

impl Storage {
    #[must_use]
    pub fn in_memory() -> Self {
        let scores: Arc<dyn ScoreRepository> = Arc::new(InMemoryRepository::new());
        Self { scores }
    }
}
