mod ids;
mod question;
mod rules;
mod score;

pub use ids::{ScoreId, SessionId};
pub use question::{ConfigurationError, Difficulty, Question, Subject};
pub use rules::{BareValuePolicy, QuizRules, RulesError};
pub use score::{NameError, PlayerName, ScoreRecord};
