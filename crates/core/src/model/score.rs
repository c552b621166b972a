use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

use crate::model::{Difficulty, Subject};

/// Longest accepted player name, in characters, after trimming.
pub const MAX_NAME_CHARS: usize = 50;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum NameError {
    #[error("name cannot be empty or whitespace only")]
    Blank,

    #[error("name must be {} characters or less (got {len})", MAX_NAME_CHARS)]
    TooLong { len: usize },
}

/// Trimmed, non-blank player name of at most 50 characters.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PlayerName(String);

impl PlayerName {
    /// Trim and validate a raw name.
    ///
    /// # Errors
    ///
    /// Returns `NameError::Blank` for empty/whitespace input and `NameError::TooLong`
    /// when the trimmed name exceeds 50 characters.
    pub fn parse(raw: &str) -> Result<Self, NameError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(NameError::Blank);
        }
        let len = trimmed.chars().count();
        if len > MAX_NAME_CHARS {
            return Err(NameError::TooLong { len });
        }
        Ok(Self(trimmed.to_owned()))
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PlayerName {
    type Error = NameError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::parse(&value)
    }
}

impl From<PlayerName> for String {
    fn from(value: PlayerName) -> Self {
        value.0
    }
}

impl fmt::Display for PlayerName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Result of one finished session, as saved to the scoreboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScoreRecord {
    player_name: PlayerName,
    score: u32,
    difficulty: Difficulty,
    subjects: Vec<Subject>,
    created_at: DateTime<Utc>,
}

impl ScoreRecord {
    #[must_use]
    pub fn new(
        player_name: PlayerName,
        score: u32,
        difficulty: Difficulty,
        subjects: impl IntoIterator<Item = Subject>,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            player_name,
            score,
            difficulty,
            subjects: subjects.into_iter().collect(),
            created_at,
        }
    }

    #[must_use]
    pub fn player_name(&self) -> &PlayerName {
        &self.player_name
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn subjects(&self) -> &[Subject] {
        &self.subjects
    }

    /// Subjects joined with `", "`, the way the scoreboard shows them.
    #[must_use]
    pub fn subjects_label(&self) -> String {
        self.subjects
            .iter()
            .map(|s| s.as_str())
            .collect::<Vec<_>>()
            .join(", ")
    }

    #[must_use]
    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}
