//! Static question catalog keyed by subject and difficulty.

mod builtin;

use rand::Rng;
use rand::seq::IndexedRandom;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet, HashSet};
use thiserror::Error;

use crate::expr::{self, Expr};
use crate::model::{ConfigurationError, Difficulty, Question, Subject};

#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum CatalogError {
    #[error("no questions for {subject}/{difficulty}")]
    NotFound {
        subject: Subject,
        difficulty: Difficulty,
    },

    #[error("canonical answer for {prompt:?} is invalid: {reason}")]
    InvalidAnswer { prompt: String, reason: String },

    #[error("duplicate prompt in {subject}/{difficulty}: {prompt:?}")]
    DuplicatePrompt {
        subject: Subject,
        difficulty: Difficulty,
        prompt: String,
    },

    #[error(transparent)]
    Configuration(#[from] ConfigurationError),
}

/// One `{prompt, answer}` pair in a serialized catalog.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub prompt: String,
    pub answer: String,
}

/// Serialized catalog shape: `subject -> difficulty -> [{prompt, answer}]`.
pub type CatalogDocument = BTreeMap<Subject, BTreeMap<Difficulty, Vec<CatalogEntry>>>;

/// Read-only pools of questions, validated at load time.
#[derive(Debug, Clone)]
pub struct QuestionBank {
    pools: BTreeMap<(Subject, Difficulty), Vec<Question>>,
}

impl QuestionBank {
    /// Build a bank from loose questions.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if any subject/difficulty pool is empty,
    /// `CatalogError::InvalidAnswer` if a canonical answer does not parse or has no
    /// value, and `CatalogError::DuplicatePrompt` for repeated prompts in one pool.
    pub fn new(questions: impl IntoIterator<Item = Question>) -> Result<Self, CatalogError> {
        let mut pools: BTreeMap<(Subject, Difficulty), Vec<Question>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for question in questions {
            validate_answer(&question)?;
            let key = (question.subject(), question.difficulty());
            if !seen.insert((key, question.prompt().to_owned())) {
                return Err(CatalogError::DuplicatePrompt {
                    subject: key.0,
                    difficulty: key.1,
                    prompt: question.prompt().to_owned(),
                });
            }
            pools.entry(key).or_default().push(question);
        }

        for subject in Subject::ALL {
            for difficulty in Difficulty::ALL {
                if pools.get(&(subject, difficulty)).is_none_or(Vec::is_empty) {
                    return Err(CatalogError::NotFound {
                        subject,
                        difficulty,
                    });
                }
            }
        }

        Ok(Self { pools })
    }

    /// The catalog shipped with the game.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionBank::new`]; the built-in data is covered by tests.
    pub fn builtin() -> Result<Self, CatalogError> {
        Self::new(builtin::questions())
    }

    /// Build a bank from the serialized `subject -> difficulty -> entries` shape.
    ///
    /// # Errors
    ///
    /// Same as [`QuestionBank::new`].
    pub fn from_document(document: CatalogDocument) -> Result<Self, CatalogError> {
        let questions = document.into_iter().flat_map(|(subject, levels)| {
            levels.into_iter().flat_map(move |(difficulty, entries)| {
                entries
                    .into_iter()
                    .map(move |e| Question::new(subject, difficulty, e.prompt, e.answer))
            })
        });
        Self::new(questions)
    }

    /// Questions for one pool, in catalog order.
    ///
    /// # Errors
    ///
    /// Returns `CatalogError::NotFound` if the pool is empty.
    pub fn questions_for(
        &self,
        subject: Subject,
        difficulty: Difficulty,
    ) -> Result<&[Question], CatalogError> {
        self.pools
            .get(&(subject, difficulty))
            .filter(|pool| !pool.is_empty())
            .map(Vec::as_slice)
            .ok_or(CatalogError::NotFound {
                subject,
                difficulty,
            })
    }

    /// Pick a subject uniformly from `subjects`, then a question uniformly from its pool.
    ///
    /// Draws are independent; the same question may come up twice in a row.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::NoSubjects` (wrapped) for an empty selection and
    /// `CatalogError::NotFound` if the chosen pool is empty.
    pub fn pick_random<R: Rng + ?Sized>(
        &self,
        subjects: &BTreeSet<Subject>,
        difficulty: Difficulty,
        rng: &mut R,
    ) -> Result<&Question, CatalogError> {
        let choices: Vec<Subject> = subjects.iter().copied().collect();
        let subject = *choices.choose(rng).ok_or(ConfigurationError::NoSubjects)?;
        let pool = self.questions_for(subject, difficulty)?;
        pool.choose(rng).ok_or(CatalogError::NotFound {
            subject,
            difficulty,
        })
    }

    /// Total number of questions across all pools.
    #[must_use]
    pub fn question_count(&self) -> usize {
        self.pools.values().map(Vec::len).sum()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Question> {
        self.pools.values().flatten()
    }
}

fn validate_answer(question: &Question) -> Result<(), CatalogError> {
    let invalid = |reason: String| CatalogError::InvalidAnswer {
        prompt: question.prompt().to_owned(),
        reason,
    };
    let parsed = expr::parse(question.canonical_answer()).map_err(|e| invalid(e.to_string()))?;
    let sides: Vec<&Expr> = match &parsed {
        Expr::Equation(lhs, rhs) => vec![&**lhs, &**rhs],
        other => vec![other],
    };
    for side in sides {
        expr::normalize(side).map_err(|e| invalid(e.to_string()))?;
    }
    Ok(())
}
