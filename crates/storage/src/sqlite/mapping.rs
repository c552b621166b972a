use mathquiz_core::model::{Difficulty, PlayerName, ScoreId, ScoreRecord, Subject};
use sqlx::Row;

use crate::repository::{ScoreRow, StorageError};

/// Separator for the `subjects` column.
const SUBJECT_SEPARATOR: &str = ",";

pub(crate) fn ser<E: core::fmt::Display>(e: E) -> StorageError {
    StorageError::Serialization(e.to_string())
}

pub(crate) fn subjects_to_text(subjects: &[Subject]) -> String {
    subjects
        .iter()
        .map(|s| s.as_str())
        .collect::<Vec<_>>()
        .join(SUBJECT_SEPARATOR)
}

pub(crate) fn subjects_from_text(raw: &str) -> Result<Vec<Subject>, StorageError> {
    if raw.trim().is_empty() {
        return Ok(Vec::new());
    }
    raw.split(SUBJECT_SEPARATOR)
        .map(|part| part.parse::<Subject>().map_err(ser))
        .collect()
}

pub(crate) fn score_to_i64(score: u32) -> i64 {
    i64::from(score)
}

fn score_from_i64(v: i64) -> Result<u32, StorageError> {
    u32::try_from(v).map_err(|_| StorageError::Serialization(format!("invalid score: {v}")))
}

pub(crate) fn map_score_row(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRecord, StorageError> {
    let name: String = row.try_get("name").map_err(ser)?;
    let score = score_from_i64(row.try_get::<i64, _>("score").map_err(ser)?)?;
    let difficulty: String = row.try_get("difficulty").map_err(ser)?;
    let subjects: String = row.try_get("subjects").map_err(ser)?;
    let created_at = row.try_get("created_at").map_err(ser)?;

    Ok(ScoreRecord::new(
        PlayerName::parse(&name).map_err(ser)?,
        score,
        difficulty.parse::<Difficulty>().map_err(ser)?,
        subjects_from_text(&subjects)?,
        created_at,
    ))
}

pub(crate) fn map_score_row_with_id(row: &sqlx::sqlite::SqliteRow) -> Result<ScoreRow, StorageError> {
    let id: i64 = row.try_get("id").map_err(ser)?;
    Ok(ScoreRow::new(ScoreId::new(id), map_score_row(row)?))
}
