mod events;
mod machine;
mod workflow;

// Public API of the session subsystem.
pub use crate::error::SessionError;
pub use events::{NoopObserver, QuizObserver};
pub use machine::{AnswerOutcome, QuizSession, SessionPhase, SessionSummary};
pub use workflow::QuizLoopService;
