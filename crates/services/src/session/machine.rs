use std::collections::BTreeSet;
use std::fmt;
use std::sync::Arc;

use rand::SeedableRng;
use rand::rngs::StdRng;

use mathquiz_core::Countup;
use mathquiz_core::catalog::QuestionBank;
use mathquiz_core::expr::{self, AnswerMatch};
use mathquiz_core::model::{
    ConfigurationError, Difficulty, Question, QuizRules, SessionId, Subject,
};
use mathquiz_core::scoring;

use crate::error::SessionError;

//
// ─── PHASE AND OUTCOMES ────────────────────────────────────────────────────────
//

/// Lifecycle of one quiz run: `Idle -> Active -> Finished`, then back to `Idle` via reset.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    Idle,
    Active,
    Finished,
}

impl SessionPhase {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            SessionPhase::Idle => "idle",
            SessionPhase::Active => "active",
            SessionPhase::Finished => "finished",
        }
    }
}

impl fmt::Display for SessionPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of submitting one answer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnswerOutcome {
    /// Wrong or unparseable. The same question stays current.
    Incorrect,
    /// Correct; the next question has been drawn.
    Correct { points: u32 },
    /// Correct, and the session has reached its question limit.
    Finished { points: u32 },
}

impl AnswerOutcome {
    #[must_use]
    pub fn is_correct(self) -> bool {
        !matches!(self, AnswerOutcome::Incorrect)
    }

    /// Points awarded by this submission (zero when incorrect).
    #[must_use]
    pub fn points(self) -> u32 {
        match self {
            AnswerOutcome::Incorrect => 0,
            AnswerOutcome::Correct { points } | AnswerOutcome::Finished { points } => points,
        }
    }
}

/// Snapshot of a session's totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionSummary {
    pub session_id: SessionId,
    pub score: u32,
    pub questions_completed: u32,
    pub attempts: u32,
    pub skips: u32,
    pub difficulty: Option<Difficulty>,
    pub subjects: Vec<Subject>,
}

//
// ─── SESSION ───────────────────────────────────────────────────────────────────
//

/// The quiz state machine. The only component with mutable game state.
///
/// Elapsed time is a passive [`Countup`]: the driver calls [`QuizSession::tick`] once per
/// second and passes the reading back into [`QuizSession::submit_answer`]. No wall
/// clock is read here.
pub struct QuizSession {
    id: SessionId,
    bank: Arc<QuestionBank>,
    rules: QuizRules,
    rng: StdRng,
    phase: SessionPhase,
    subjects: BTreeSet<Subject>,
    difficulty: Option<Difficulty>,
    current: Option<Question>,
    score: u32,
    questions_completed: u32,
    attempts: u32,
    skips: u32,
    countup: Countup,
    saved: bool,
}

impl QuizSession {
    #[must_use]
    pub fn new(bank: Arc<QuestionBank>, rules: QuizRules) -> Self {
        Self {
            id: SessionId::random(),
            bank,
            rules,
            rng: StdRng::from_os_rng(),
            phase: SessionPhase::Idle,
            subjects: BTreeSet::new(),
            difficulty: None,
            current: None,
            score: 0,
            questions_completed: 0,
            attempts: 0,
            skips: 0,
            countup: Countup::new(),
            saved: false,
        }
    }

    /// Use a deterministic question order.
    #[must_use]
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.rng = StdRng::seed_from_u64(seed);
        self
    }

    #[must_use]
    pub fn id(&self) -> SessionId {
        self.id
    }

    #[must_use]
    pub fn phase(&self) -> SessionPhase {
        self.phase
    }

    #[must_use]
    pub fn rules(&self) -> &QuizRules {
        &self.rules
    }

    #[must_use]
    pub fn subjects(&self) -> &BTreeSet<Subject> {
        &self.subjects
    }

    #[must_use]
    pub fn difficulty(&self) -> Option<Difficulty> {
        self.difficulty
    }

    #[must_use]
    pub fn current_question(&self) -> Option<&Question> {
        self.current.as_ref()
    }

    #[must_use]
    pub fn score(&self) -> u32 {
        self.score
    }

    #[must_use]
    pub fn questions_completed(&self) -> u32 {
        self.questions_completed
    }

    /// Whether this finished session's score has already been recorded.
    #[must_use]
    pub fn is_score_saved(&self) -> bool {
        self.saved
    }

    pub(crate) fn mark_saved(&mut self) {
        self.saved = true;
    }

    /// Seconds on the countup for the current question.
    #[must_use]
    pub fn elapsed(&self) -> u32 {
        self.countup.seconds()
    }

    #[must_use]
    pub fn summary(&self) -> SessionSummary {
        SessionSummary {
            session_id: self.id,
            score: self.score,
            questions_completed: self.questions_completed,
            attempts: self.attempts,
            skips: self.skips,
            difficulty: self.difficulty,
            subjects: self.subjects.iter().copied().collect(),
        }
    }

    /// Choose subjects and difficulty. Only valid while idle; does not start the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Idle`.
    pub fn configure(
        &mut self,
        subjects: impl IntoIterator<Item = Subject>,
        difficulty: Difficulty,
    ) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Idle, "configure")?;
        self.subjects = subjects.into_iter().collect();
        self.difficulty = Some(difficulty);
        tracing::debug!(
            session_id = %self.id,
            subjects = ?self.subjects,
            %difficulty,
            "session configured"
        );
        Ok(())
    }

    /// `Idle -> Active`: zero the totals, draw the first question and start the countup.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::Configuration` when no subject or difficulty is selected
    /// (the session stays idle), `SessionError::Catalog` if the pool is missing, and
    /// `SessionError::InvalidTransition` outside `Idle`.
    pub fn start(&mut self) -> Result<&Question, SessionError> {
        self.expect_phase(SessionPhase::Idle, "start")?;
        if self.subjects.is_empty() {
            return Err(ConfigurationError::NoSubjects.into());
        }
        let difficulty = self.difficulty.ok_or(ConfigurationError::NoDifficulty)?;
        let first = self.draw(difficulty)?;

        self.score = 0;
        self.questions_completed = 0;
        self.attempts = 0;
        self.skips = 0;
        self.saved = false;
        self.phase = SessionPhase::Active;
        self.countup.restart();
        tracing::info!(session_id = %self.id, %difficulty, "session started");
        let current: &Question = self.current.insert(first);
        Ok(current)
    }

    /// Check `text` against the current question.
    ///
    /// An incorrect or unparseable answer keeps the question and resumes the countup
    /// from `elapsed_seconds`. A correct one adds decayed points and either draws the
    /// next question with the countup at zero or finishes the session.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Active` and
    /// `SessionError::Catalog` if the next question cannot be drawn (totals unchanged).
    pub fn submit_answer(
        &mut self,
        text: &str,
        elapsed_seconds: u32,
    ) -> Result<AnswerOutcome, SessionError> {
        self.expect_phase(SessionPhase::Active, "submit an answer")?;
        let (Some(difficulty), Some(current)) = (self.difficulty, self.current.as_ref()) else {
            return Err(self.invalid("submit an answer"));
        };

        let verdict = expr::check_answer(
            text,
            current.canonical_answer(),
            self.rules.bare_value_policy(),
        );
        self.attempts = self.attempts.saturating_add(1);

        match &verdict {
            AnswerMatch::Equivalent => {}
            AnswerMatch::NotEquivalent => {
                tracing::debug!(session_id = %self.id, elapsed_seconds, "answer incorrect");
            }
            AnswerMatch::Unparseable(err) => {
                tracing::warn!(session_id = %self.id, error = %err, "answer did not parse");
            }
            AnswerMatch::InvalidCanonical(err) => {
                tracing::warn!(
                    session_id = %self.id,
                    prompt = current.prompt(),
                    error = %err,
                    "canonical answer did not parse"
                );
            }
        }

        if !verdict.is_correct() {
            self.countup.resume_from(elapsed_seconds);
            return Ok(AnswerOutcome::Incorrect);
        }

        let points = scoring::points_with_rate(
            f64::from(elapsed_seconds),
            difficulty,
            self.rules.decay_rate(),
        );
        let completed = self.questions_completed.saturating_add(1);

        if completed >= self.rules.questions_per_session() {
            self.score = self.score.saturating_add(points);
            self.questions_completed = completed;
            self.enter_finished();
            return Ok(AnswerOutcome::Finished { points });
        }

        let next = self.draw(difficulty)?;
        self.score = self.score.saturating_add(points);
        self.questions_completed = completed;
        self.current = Some(next);
        self.countup.restart();
        tracing::debug!(
            session_id = %self.id,
            points,
            score = self.score,
            completed,
            "answer correct"
        );
        Ok(AnswerOutcome::Correct { points })
    }

    /// Draw another question without touching the score or completion count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Active`.
    pub fn skip(&mut self) -> Result<&Question, SessionError> {
        self.expect_phase(SessionPhase::Active, "skip")?;
        let difficulty = self.difficulty.ok_or(ConfigurationError::NoDifficulty)?;
        let next = self.draw(difficulty)?;
        self.skips = self.skips.saturating_add(1);
        self.countup.restart();
        tracing::debug!(session_id = %self.id, skips = self.skips, "question skipped");
        let current: &Question = self.current.insert(next);
        Ok(current)
    }

    /// End the session early, whatever the completion count.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Active`.
    pub fn finish(&mut self) -> Result<SessionSummary, SessionError> {
        self.expect_phase(SessionPhase::Active, "finish")?;
        self.enter_finished();
        Ok(self.summary())
    }

    /// `Finished -> Idle` with a fresh id. The subject and difficulty selection is kept.
    ///
    /// # Errors
    ///
    /// Returns `SessionError::InvalidTransition` outside `Finished`.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.expect_phase(SessionPhase::Finished, "reset")?;
        self.id = SessionId::random();
        self.phase = SessionPhase::Idle;
        self.current = None;
        self.score = 0;
        self.questions_completed = 0;
        self.attempts = 0;
        self.skips = 0;
        self.saved = false;
        self.countup = Countup::new();
        tracing::debug!(session_id = %self.id, "session reset");
        Ok(())
    }

    /// One-second tick from the driver. Advances only while a question is on screen.
    pub fn tick(&mut self) -> u32 {
        self.countup.tick()
    }

    fn draw(&mut self, difficulty: Difficulty) -> Result<Question, SessionError> {
        let question = self
            .bank
            .pick_random(&self.subjects, difficulty, &mut self.rng)?;
        Ok(question.clone())
    }

    fn enter_finished(&mut self) {
        self.phase = SessionPhase::Finished;
        self.current = None;
        self.countup.stop();
        tracing::info!(
            session_id = %self.id,
            score = self.score,
            completed = self.questions_completed,
            "session finished"
        );
    }

    fn expect_phase(
        &self,
        expected: SessionPhase,
        operation: &'static str,
    ) -> Result<(), SessionError> {
        if self.phase == expected {
            Ok(())
        } else {
            Err(self.invalid(operation))
        }
    }

    fn invalid(&self, operation: &'static str) -> SessionError {
        SessionError::InvalidTransition {
            operation,
            phase: self.phase,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mathquiz_core::model::BareValuePolicy;

    fn session() -> QuizSession {
        let bank = Arc::new(QuestionBank::builtin().unwrap());
        QuizSession::new(bank, QuizRules::default()).with_seed(7)
    }

    fn started(subjects: &[Subject], difficulty: Difficulty) -> QuizSession {
        let mut s = session();
        s.configure(subjects.iter().copied(), difficulty).unwrap();
        s.start().unwrap();
        s
    }

    fn right_answer(s: &QuizSession) -> String {
        s.current_question().unwrap().canonical_answer().to_owned()
    }

    #[test]
    fn ten_correct_answers_at_zero_finish_with_full_score() {
        let mut s = started(&[Subject::Algebra], Difficulty::Easy);
        for round in 1..=10 {
            let answer = right_answer(&s);
            let outcome = s.submit_answer(&answer, 0).unwrap();
            if round < 10 {
                assert_eq!(outcome, AnswerOutcome::Correct { points: 50 });
                assert_eq!(s.phase(), SessionPhase::Active);
            } else {
                assert_eq!(outcome, AnswerOutcome::Finished { points: 50 });
            }
        }
        assert_eq!(s.phase(), SessionPhase::Finished);
        assert_eq!(s.score(), 500);
        assert_eq!(s.questions_completed(), 10);
        assert!(s.current_question().is_none());
    }

    #[test]
    fn incorrect_answer_keeps_question_and_totals() {
        let mut s = started(&[Subject::Algebra], Difficulty::Hard);
        let before = s.current_question().cloned();

        let outcome = s.submit_answer("x + 1000", 4).unwrap();

        assert_eq!(outcome, AnswerOutcome::Incorrect);
        assert_eq!(s.current_question().cloned(), before);
        assert_eq!(s.score(), 0);
        assert_eq!(s.questions_completed(), 0);
    }

    #[test]
    fn unparseable_answer_is_just_incorrect() {
        let mut s = started(&[Subject::Calculus], Difficulty::Easy);
        assert_eq!(s.submit_answer("???", 0).unwrap(), AnswerOutcome::Incorrect);
        assert_eq!(s.phase(), SessionPhase::Active);
    }

    #[test]
    fn incorrect_answer_resumes_countup_from_elapsed() {
        let mut s = started(&[Subject::Algebra], Difficulty::Easy);
        s.submit_answer("nope", 7).unwrap();
        assert_eq!(s.elapsed(), 7);
        assert_eq!(s.tick(), 8);
    }

    #[test]
    fn correct_answer_restarts_countup() {
        let mut s = started(&[Subject::Algebra], Difficulty::Easy);
        s.tick();
        s.tick();
        assert_eq!(s.elapsed(), 2);

        let answer = right_answer(&s);
        assert_eq!(
            s.submit_answer(&answer, 2).unwrap(),
            AnswerOutcome::Correct { points: 40 }
        );
        assert_eq!(s.elapsed(), 0);
        assert_eq!(s.score(), 40);
    }

    #[test]
    fn skip_draws_again_without_scoring() {
        let mut s = started(&[Subject::Equations], Difficulty::Easy);
        let first = s.current_question().unwrap().prompt().to_owned();

        let changed = (0..20).any(|_| s.skip().unwrap().prompt() != first);

        assert!(changed);
        assert_eq!(s.score(), 0);
        assert_eq!(s.questions_completed(), 0);
        assert!(s.summary().skips >= 1);
    }

    #[test]
    fn start_without_subjects_is_a_configuration_error() {
        let mut s = session();
        s.configure([], Difficulty::Easy).unwrap();

        let err = s.start().unwrap_err();

        assert!(matches!(
            err,
            SessionError::Configuration(ConfigurationError::NoSubjects)
        ));
        assert_eq!(s.phase(), SessionPhase::Idle);
    }

    #[test]
    fn start_without_difficulty_is_a_configuration_error() {
        let mut s = session();
        assert!(matches!(
            s.start(),
            Err(SessionError::Configuration(ConfigurationError::NoSubjects))
        ));
        s.subjects.insert(Subject::Algebra);
        assert!(matches!(
            s.start(),
            Err(SessionError::Configuration(ConfigurationError::NoDifficulty))
        ));
    }

    #[test]
    fn operations_outside_their_phase_are_rejected() {
        let mut s = session();
        assert!(matches!(
            s.submit_answer("1", 0),
            Err(SessionError::InvalidTransition {
                phase: SessionPhase::Idle,
                ..
            })
        ));
        assert!(s.skip().is_err());
        assert!(s.finish().is_err());
        assert!(s.reset().is_err());

        s.configure([Subject::Algebra], Difficulty::Easy).unwrap();
        s.start().unwrap();
        assert!(s.configure([Subject::Calculus], Difficulty::Hard).is_err());
        assert!(s.start().is_err());
    }

    #[test]
    fn finish_early_then_reset_keeps_selection() {
        let mut s = started(&[Subject::Algebra, Subject::Calculus], Difficulty::Hard);
        let first_id = s.id();
        let answer = right_answer(&s);
        s.submit_answer(&answer, 0).unwrap();

        let summary = s.finish().unwrap();
        assert_eq!(summary.score, 100);
        assert_eq!(summary.questions_completed, 1);
        assert_eq!(summary.attempts, 1);
        assert_eq!(s.phase(), SessionPhase::Finished);
        assert_eq!(s.tick(), 0);

        s.reset().unwrap();
        assert_eq!(s.phase(), SessionPhase::Idle);
        assert_ne!(s.id(), first_id);
        assert_eq!(s.score(), 0);
        assert_eq!(s.difficulty(), Some(Difficulty::Hard));
        assert_eq!(s.subjects().len(), 2);
        s.start().unwrap();
        assert_eq!(s.phase(), SessionPhase::Active);
    }

    #[test]
    fn tick_only_counts_while_active() {
        let mut s = session();
        assert_eq!(s.tick(), 0);
        s.configure([Subject::Algebra], Difficulty::Easy).unwrap();
        s.start().unwrap();
        assert_eq!(s.tick(), 1);
        assert_eq!(s.tick(), 2);
    }

    #[test]
    fn strict_policy_rejects_bare_values_for_equations() {
        let bank = Arc::new(QuestionBank::builtin().unwrap());
        let rules = QuizRules::new(10, 0.1, BareValuePolicy::Reject).unwrap();
        let mut s = QuizSession::new(bank, rules).with_seed(3);
        s.configure([Subject::Equations], Difficulty::Easy).unwrap();
        s.start().unwrap();

        let answer = right_answer(&s);
        let bare = answer.split('=').nth(1).unwrap().trim().to_owned();

        assert_eq!(s.submit_answer(&bare, 0).unwrap(), AnswerOutcome::Incorrect);
        assert!(s.submit_answer(&answer, 0).unwrap().is_correct());
    }

    #[test]
    fn shorter_sessions_follow_the_rules() {
        let bank = Arc::new(QuestionBank::builtin().unwrap());
        let rules = QuizRules::new(2, 0.1, BareValuePolicy::Accept).unwrap();
        let mut s = QuizSession::new(bank, rules).with_seed(1);
        s.configure([Subject::Calculus], Difficulty::Easy).unwrap();
        s.start().unwrap();

        let a = right_answer(&s);
        assert!(matches!(s.submit_answer(&a, 0).unwrap(), AnswerOutcome::Correct { .. }));
        let b = right_answer(&s);
        assert!(matches!(s.submit_answer(&b, 0).unwrap(), AnswerOutcome::Finished { .. }));
    }
}
