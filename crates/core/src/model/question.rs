use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

//
// ─── ERRORS ────────────────────────────────────────────────────────────────────
//

/// Invalid or missing quiz selection.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigurationError {
    #[error("no subjects selected")]
    NoSubjects,

    #[error("no difficulty selected")]
    NoDifficulty,

    #[error("unknown subject: {0}")]
    UnknownSubject(String),

    #[error("unknown difficulty: {0}")]
    UnknownDifficulty(String),
}

//
// ─── SUBJECT ───────────────────────────────────────────────────────────────────
//

/// Topic a question is drawn from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Subject {
    Algebra,
    Equations,
    Calculus,
}

impl Subject {
    pub const ALL: [Subject; 3] = [Subject::Algebra, Subject::Equations, Subject::Calculus];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Subject::Algebra => "algebra",
            Subject::Equations => "equations",
            Subject::Calculus => "calculus",
        }
    }
}

impl fmt::Display for Subject {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Subject {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "algebra" => Ok(Subject::Algebra),
            "equations" => Ok(Subject::Equations),
            "calculus" => Ok(Subject::Calculus),
            _ => Err(ConfigurationError::UnknownSubject(s.to_owned())),
        }
    }
}

//
// ─── DIFFICULTY ────────────────────────────────────────────────────────────────
//

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Difficulty {
    Easy,
    Hard,
}

impl Difficulty {
    pub const ALL: [Difficulty; 2] = [Difficulty::Easy, Difficulty::Hard];

    /// Points awarded for an instant correct answer.
    #[must_use]
    pub fn base_points(self) -> u32 {
        match self {
            Difficulty::Easy => 50,
            Difficulty::Hard => 100,
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Difficulty::Easy => "easy",
            Difficulty::Hard => "hard",
        }
    }
}

impl fmt::Display for Difficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Difficulty {
    type Err = ConfigurationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "easy" => Ok(Difficulty::Easy),
            "hard" => Ok(Difficulty::Hard),
            _ => Err(ConfigurationError::UnknownDifficulty(s.to_owned())),
        }
    }
}

//
// ─── QUESTION ──────────────────────────────────────────────────────────────────
//

/// Immutable catalog entry. Prompt and answer are LaTeX source.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Question {
    subject: Subject,
    difficulty: Difficulty,
    prompt: String,
    canonical_answer: String,
}

impl Question {
    #[must_use]
    pub fn new(
        subject: Subject,
        difficulty: Difficulty,
        prompt: impl Into<String>,
        canonical_answer: impl Into<String>,
    ) -> Self {
        Self {
            subject,
            difficulty,
            prompt: prompt.into(),
            canonical_answer: canonical_answer.into(),
        }
    }

    #[must_use]
    pub fn subject(&self) -> Subject {
        self.subject
    }

    #[must_use]
    pub fn difficulty(&self) -> Difficulty {
        self.difficulty
    }

    #[must_use]
    pub fn prompt(&self) -> &str {
        &self.prompt
    }

    #[must_use]
    pub fn canonical_answer(&self) -> &str {
        &self.canonical_answer
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_case_insensitively() {
        assert_eq!(" Algebra ".parse::<Subject>().unwrap(), Subject::Algebra);
        assert_eq!("HARD".parse::<Difficulty>().unwrap(), Difficulty::Hard);
    }

    #[test]
    fn unknown_values_are_configuration_errors() {
        assert_eq!(
            "geometry".parse::<Subject>().unwrap_err(),
            ConfigurationError::UnknownSubject("geometry".into())
        );
        assert_eq!(
            "medium".parse::<Difficulty>().unwrap_err(),
            ConfigurationError::UnknownDifficulty("medium".into())
        );
    }

    #[test]
    fn base_points_per_difficulty() {
        assert_eq!(Difficulty::Easy.base_points(), 50);
        assert_eq!(Difficulty::Hard.base_points(), 100);
    }
}
