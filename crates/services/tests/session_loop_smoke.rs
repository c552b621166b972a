use std::sync::{Arc, Mutex};

use mathquiz_core::catalog::QuestionBank;
use mathquiz_core::model::{Difficulty, NameError, QuizRules, ScoreId, ScoreRecord, Subject};
use mathquiz_core::time::fixed_now;
use services::{
    AnswerOutcome, Clock, QuizLoopService, QuizObserver, QuizSession, SessionError, SessionPhase,
};
use storage::repository::{InMemoryRepository, ScoreRepository, ScoreRow, StorageError};

#[derive(Debug, Clone, PartialEq, Eq)]
enum Update {
    Question(String),
    Score(u32),
    Elapsed(u32),
    Ended,
}

#[derive(Default)]
struct Recorder {
    updates: Mutex<Vec<Update>>,
}

impl Recorder {
    fn take(&self) -> Vec<Update> {
        std::mem::take(&mut *self.updates.lock().unwrap())
    }
}

impl QuizObserver for Recorder {
    fn on_question_changed(&self, prompt: &str) {
        self.updates.lock().unwrap().push(Update::Question(prompt.to_owned()));
    }

    fn on_score_changed(&self, score: u32) {
        self.updates.lock().unwrap().push(Update::Score(score));
    }

    fn on_session_ended(&self) {
        self.updates.lock().unwrap().push(Update::Ended);
    }

    fn on_elapsed_changed(&self, seconds: u32) {
        self.updates.lock().unwrap().push(Update::Elapsed(seconds));
    }
}

struct BrokenStore;

#[async_trait::async_trait]
impl ScoreRepository for BrokenStore {
    async fn append_score(&self, _record: &ScoreRecord) -> Result<ScoreId, StorageError> {
        Err(StorageError::Connection("disk full".into()))
    }

    async fn get_score(&self, _id: ScoreId) -> Result<ScoreRecord, StorageError> {
        Err(StorageError::NotFound)
    }

    async fn list_scores(&self) -> Result<Vec<ScoreRow>, StorageError> {
        Ok(Vec::new())
    }
}

fn new_session(seed: u64) -> QuizSession {
    let bank = Arc::new(QuestionBank::builtin().unwrap());
    let mut session = QuizSession::new(bank, QuizRules::default()).with_seed(seed);
    session
        .configure([Subject::Algebra], Difficulty::Easy)
        .unwrap();
    session
}

fn answer(session: &QuizSession) -> String {
    session
        .current_question()
        .unwrap()
        .canonical_answer()
        .to_owned()
}

#[tokio::test]
async fn quiz_loop_plays_saves_and_lists() {
    let repo = InMemoryRepository::new();
    let recorder = Arc::new(Recorder::default());
    let loop_svc = QuizLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        recorder.clone(),
    );

    let mut session = new_session(11);
    loop_svc.start(&mut session).unwrap();
    let first_prompt = session.current_question().unwrap().prompt().to_owned();
    assert_eq!(
        recorder.take(),
        [Update::Score(0), Update::Question(first_prompt)]
    );

    assert_eq!(loop_svc.tick(&mut session), 1);
    assert_eq!(
        loop_svc.submit(&mut session, "???", 1).unwrap(),
        AnswerOutcome::Incorrect
    );
    assert_eq!(recorder.take(), [Update::Elapsed(1)]);

    while session.phase() == SessionPhase::Active {
        let text = answer(&session);
        loop_svc.submit(&mut session, &text, 0).unwrap();
    }
    assert_eq!(session.score(), 500);
    assert_eq!(session.questions_completed(), 10);
    let updates = recorder.take();
    assert_eq!(updates.last(), Some(&Update::Ended));
    assert_eq!(updates[updates.len() - 2], Update::Score(500));

    let id = loop_svc.save_score(&mut session, "  Ada  ").await.unwrap();
    let saved = repo.get_score(id).await.unwrap();
    assert_eq!(saved.player_name().as_str(), "Ada");
    assert_eq!(saved.score(), 500);
    assert_eq!(saved.created_at(), fixed_now());

    let rows = loop_svc.scoreboard().list_all().await.unwrap();
    assert_eq!(rows.len(), 1);
}

#[tokio::test]
async fn a_finished_session_is_saved_once() {
    let repo = InMemoryRepository::new();
    let loop_svc = QuizLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(services::session::NoopObserver),
    );

    let mut session = new_session(11);
    loop_svc.start(&mut session).unwrap();
    let text = answer(&session);
    loop_svc.submit(&mut session, &text, 0).unwrap();
    loop_svc.finish(&mut session).unwrap();

    loop_svc.save_score(&mut session, "Ada").await.unwrap();
    assert!(session.is_score_saved());
    assert!(matches!(
        loop_svc.save_score(&mut session, "Ada").await,
        Err(SessionError::InvalidTransition {
            operation: "save a score",
            phase: SessionPhase::Finished,
        })
    ));
    assert_eq!(repo.list_scores().await.unwrap().len(), 1);

    session.reset().unwrap();
    assert!(!session.is_score_saved());
}

#[tokio::test]
async fn saving_requires_a_finished_session_and_a_valid_name() {
    let repo = InMemoryRepository::new();
    let loop_svc = QuizLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(repo.clone()),
        Arc::new(services::session::NoopObserver),
    );

    let mut session = new_session(5);
    loop_svc.start(&mut session).unwrap();
    assert!(matches!(
        loop_svc.save_score(&mut session, "Ada").await,
        Err(SessionError::InvalidTransition { .. })
    ));

    loop_svc.finish(&mut session).unwrap();
    let long_name = "x".repeat(51);
    assert!(matches!(
        loop_svc.save_score(&mut session, &long_name).await,
        Err(SessionError::Name(NameError::TooLong { .. }))
    ));
    assert!(repo.list_scores().await.unwrap().is_empty());
}

#[tokio::test]
async fn failed_save_is_reported_and_session_stays_finished() {
    let loop_svc = QuizLoopService::new(
        Clock::fixed(fixed_now()),
        Arc::new(BrokenStore),
        Arc::new(services::session::NoopObserver),
    );

    let mut session = new_session(9);
    loop_svc.start(&mut session).unwrap();
    let text = answer(&session);
    loop_svc.submit(&mut session, &text, 3).unwrap();
    loop_svc.finish(&mut session).unwrap();

    let err = loop_svc.save_score(&mut session, "Grace").await.unwrap_err();
    assert!(matches!(err, SessionError::Storage(StorageError::Connection(_))));
    assert_eq!(session.phase(), SessionPhase::Finished);
    assert!(!session.is_score_saved());
    assert_eq!(session.score(), 37);

    session.reset().unwrap();
    loop_svc.start(&mut session).unwrap();
    assert_eq!(session.phase(), SessionPhase::Active);
}
