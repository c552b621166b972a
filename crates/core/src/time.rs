use chrono::{DateTime, Utc};

/// A simple clock abstraction for deterministic time in services and tests.
#[derive(Debug, Clone, Copy, Default)]
pub enum Clock {
    #[default]
    Default,
    Fixed(DateTime<Utc>),
}

impl Clock {
    /// Returns a clock that uses the current system time.
    #[must_use]
    pub fn default_clock() -> Self {
        Self::Default
    }

    /// Returns a clock fixed at the given timestamp.
    #[must_use]
    pub fn fixed(at: DateTime<Utc>) -> Self {
        Self::Fixed(at)
    }

    #[must_use]
    pub fn now(&self) -> DateTime<Utc> {
        match self {
            Clock::Default => Utc::now(),
            Clock::Fixed(t) => *t,
        }
    }
}

/// Passive per-question countup, in whole seconds.
///
/// The countup never reads the wall clock. An external driver calls [`Countup::tick`]
/// once per second and the session reads, resets or resumes it at transition points.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Countup {
    seconds: u32,
    running: bool,
}

impl Countup {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Restart from zero and run.
    pub fn restart(&mut self) {
        self.seconds = 0;
        self.running = true;
    }

    /// Continue counting from `seconds` (used after an incorrect answer).
    pub fn resume_from(&mut self, seconds: u32) {
        self.seconds = seconds;
        self.running = true;
    }

    pub fn stop(&mut self) {
        self.running = false;
    }

    /// Advance by one second if running. Returns the new reading.
    pub fn tick(&mut self) -> u32 {
        if self.running {
            self.seconds = self.seconds.saturating_add(1);
        }
        self.seconds
    }

    #[must_use]
    pub fn seconds(&self) -> u32 {
        self.seconds
    }

    #[must_use]
    pub fn is_running(&self) -> bool {
        self.running
    }
}

/// Deterministic timestamp for tests and examples (2023-11-14T22:13:20Z).
pub const FIXED_TEST_TIMESTAMP: i64 = 1_700_000_000;

/// Returns a deterministic `DateTime<Utc>` for tests and doc examples.
///
/// # Panics
///
/// Panics if the fixed timestamp cannot be represented.
#[must_use]
pub fn fixed_now() -> DateTime<Utc> {
    DateTime::<Utc>::from_timestamp(FIXED_TEST_TIMESTAMP, 0)
        .expect("fixed timestamp should be valid")
}

/// Returns a `Clock` fixed at the deterministic test timestamp.
#[must_use]
pub fn fixed_clock() -> Clock {
    Clock::fixed(fixed_now())
}
