use std::sync::Arc;

use mathquiz_core::model::ScoreId;
use storage::repository::ScoreRepository;

use super::events::QuizObserver;
use super::machine::{AnswerOutcome, QuizSession, SessionPhase, SessionSummary};
use crate::Clock;
use crate::error::SessionError;
use crate::scoreboard::ScoreboardService;

/// Drives a [`QuizSession`], forwards display updates to the observer and persists
/// the result once the session is finished.
#[derive(Clone)]
pub struct QuizLoopService {
    scoreboard: ScoreboardService,
    observer: Arc<dyn QuizObserver>,
}

impl QuizLoopService {
    #[must_use]
    pub fn new(
        clock: Clock,
        scores: Arc<dyn ScoreRepository>,
        observer: Arc<dyn QuizObserver>,
    ) -> Self {
        Self {
            scoreboard: ScoreboardService::new(clock, scores),
            observer,
        }
    }

    #[must_use]
    pub fn scoreboard(&self) -> &ScoreboardService {
        &self.scoreboard
    }

    /// Start the session and show its first question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` if the session cannot start; nothing is emitted then.
    pub fn start(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        let prompt = session.start()?.prompt().to_owned();
        self.observer.on_score_changed(session.score());
        self.observer.on_question_changed(&prompt);
        Ok(())
    }

    /// Submit an answer and emit the matching updates.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from [`QuizSession::submit_answer`].
    pub fn submit(
        &self,
        session: &mut QuizSession,
        text: &str,
        elapsed_seconds: u32,
    ) -> Result<AnswerOutcome, SessionError> {
        let outcome = session.submit_answer(text, elapsed_seconds)?;
        match outcome {
            AnswerOutcome::Incorrect => {}
            AnswerOutcome::Correct { .. } => {
                self.observer.on_score_changed(session.score());
                if let Some(question) = session.current_question() {
                    self.observer.on_question_changed(question.prompt());
                }
            }
            AnswerOutcome::Finished { .. } => {
                self.observer.on_score_changed(session.score());
                self.observer.on_session_ended();
            }
        }
        Ok(outcome)
    }

    /// Skip the current question.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from [`QuizSession::skip`].
    pub fn skip(&self, session: &mut QuizSession) -> Result<(), SessionError> {
        let prompt = session.skip()?.prompt().to_owned();
        self.observer.on_question_changed(&prompt);
        Ok(())
    }

    /// End the session early.
    ///
    /// # Errors
    ///
    /// Returns `SessionError` from [`QuizSession::finish`].
    pub fn finish(&self, session: &mut QuizSession) -> Result<SessionSummary, SessionError> {
        let summary = session.finish()?;
        self.observer.on_session_ended();
        Ok(summary)
    }

    /// Forward a one-second tick. Emits only while a question is on screen.
    pub fn tick(&self, session: &mut QuizSession) -> u32 {
        let seconds = session.tick();
        if session.phase() == SessionPhase::Active {
            self.observer.on_elapsed_changed(seconds);
        }
        seconds
    }

    /// Save a finished session under `name`.
    ///
    /// The name is validated before the store is reached. A storage failure is logged
    /// and returned; the session stays finished and the save can be retried.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` unless the session is finished and not
    /// yet saved, `SessionError::Name` for an invalid name and `SessionError::Storage` if the
    /// write fails.
    pub async fn save_score(
        &self,
        session: &mut QuizSession,
        name: &str,
    ) -> Result<ScoreId, SessionError> {
        if session.phase() != SessionPhase::Finished || session.is_score_saved() {
            return Err(SessionError::InvalidTransition {
                operation: "save a score",
                phase: session.phase(),
            });
        }
        let record = self.scoreboard.record_for(name, &session.summary())?;
        let id = self.scoreboard.save(&record).await?;
        session.mark_saved();
        Ok(id)
    }
}
