/// Display updates emitted toward the presentation layer.
///
/// The session never reaches into presentation objects; the loop service calls these
/// hooks after each transition and the driver decides how to render them.
pub trait QuizObserver: Send + Sync {
    fn on_question_changed(&self, prompt: &str);

    fn on_score_changed(&self, score: u32);

    fn on_session_ended(&self);

    /// Called after every one-second tick of the countup.
    fn on_elapsed_changed(&self, _seconds: u32) {}
}

/// Observer that ignores every update.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoopObserver;

impl QuizObserver for NoopObserver {
    fn on_question_changed(&self, _prompt: &str) {}

    fn on_score_changed(&self, _score: u32) {}

    fn on_session_ended(&self) {}
}
