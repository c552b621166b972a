#![forbid(unsafe_code)]

pub mod catalog;
pub mod error;
pub mod scoreboard;
pub mod session;

pub use mathquiz_core::Clock;

pub use catalog::{load_catalog, parse_catalog};
pub use error::{CatalogLoadError, SessionError};
pub use scoreboard::ScoreboardService;
pub use session::{
    AnswerOutcome, QuizLoopService, QuizObserver, QuizSession, SessionPhase, SessionSummary,
};
