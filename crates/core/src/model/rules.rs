use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq)]
#[non_exhaustive]
pub enum RulesError {
    #[error("questions per session must be > 0")]
    InvalidQuestionsPerSession,

    #[error("decay rate must be finite and > 0, got {0}")]
    InvalidDecayRate(f64),
}

/// How an answer that omits the variable of an `x = value` answer is judged.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BareValuePolicy {
    /// `4` is accepted for `x = 4`.
    #[default]
    Accept,
    /// The assignment must be written out.
    Reject,
}

/// Tunables for a quiz run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuizRules {
    questions_per_session: u32,
    decay_rate: f64,
    bare_value_policy: BareValuePolicy,
}

impl Default for QuizRules {
    fn default() -> Self {
        Self {
            questions_per_session: 10,
            decay_rate: crate::scoring::DEFAULT_DECAY_RATE,
            bare_value_policy: BareValuePolicy::Accept,
        }
    }
}

impl QuizRules {
    /// Build validated rules.
    ///
    /// # Errors
    ///
    /// Returns `RulesError` if the question count is zero or the decay rate is not a
    /// finite positive number.
    pub fn new(
        questions_per_session: u32,
        decay_rate: f64,
        bare_value_policy: BareValuePolicy,
    ) -> Result<Self, RulesError> {
        if questions_per_session == 0 {
            return Err(RulesError::InvalidQuestionsPerSession);
        }
        if !decay_rate.is_finite() || decay_rate <= 0.0 {
            return Err(RulesError::InvalidDecayRate(decay_rate));
        }
        Ok(Self {
            questions_per_session,
            decay_rate,
            bare_value_policy,
        })
    }

    #[must_use]
    pub fn questions_per_session(&self) -> u32 {
        self.questions_per_session
    }

    #[must_use]
    pub fn decay_rate(&self) -> f64 {
        self.decay_rate
    }

    #[must_use]
    pub fn bare_value_policy(&self) -> BareValuePolicy {
        self.bare_value_policy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_standard_game() {
        let rules = QuizRules::default();
        assert_eq!(rules.questions_per_session(), 10);
        assert!((rules.decay_rate() - 0.1).abs() < f64::EPSILON);
        assert_eq!(rules.bare_value_policy(), BareValuePolicy::Accept);
    }

    #[test]
    fn rejects_invalid_values() {
        assert_eq!(
            QuizRules::new(0, 0.1, BareValuePolicy::Accept).unwrap_err(),
            RulesError::InvalidQuestionsPerSession
        );
        assert!(matches!(
            QuizRules::new(10, f64::NAN, BareValuePolicy::Accept),
            Err(RulesError::InvalidDecayRate(_))
        ));
        assert!(QuizRules::new(10, -1.0, BareValuePolicy::Reject).is_err());
    }
}
