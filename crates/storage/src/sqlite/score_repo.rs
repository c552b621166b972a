use mathquiz_core::model::{ScoreId, ScoreRecord};

use super::{
    SqliteRepository,
    mapping::{map_score_row, map_score_row_with_id, score_to_i64, subjects_to_text},
};
use crate::repository::{ScoreRepository, ScoreRow, StorageError};

#[async_trait::async_trait]
impl ScoreRepository for SqliteRepository {
    async fn append_score(&self, record: &ScoreRecord) -> Result<ScoreId, StorageError> {
        let res = sqlx::query(
            r"
                INSERT INTO scores (name, score, difficulty, subjects, created_at)
                VALUES (?1, ?2, ?3, ?4, ?5)
            ",
        )
        .bind(record.player_name().as_str())
        .bind(score_to_i64(record.score()))
        .bind(record.difficulty().as_str())
        .bind(subjects_to_text(record.subjects()))
        .bind(record.created_at())
        .execute(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        Ok(ScoreId::new(res.last_insert_rowid()))
    }

    async fn get_score(&self, id: ScoreId) -> Result<ScoreRecord, StorageError> {
        let row = sqlx::query(
            r"
                SELECT name, score, difficulty, subjects, created_at
                FROM scores
                WHERE id = ?1
            ",
        )
        .bind(id.value())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?
        .ok_or(StorageError::NotFound)?;

        map_score_row(&row)
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError> {
        let rows = sqlx::query(
            r"
                SELECT id, name, score, difficulty, subjects, created_at
                FROM scores
                ORDER BY score DESC, id ASC
            ",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(|e| StorageError::Connection(e.to_string()))?;

        let mut out = Vec::with_capacity(rows.len());
        for row in rows {
            out.push(map_score_row_with_id(&row)?);
        }
        Ok(out)
    }
}
