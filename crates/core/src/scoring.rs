//! Time-decayed points for a correct answer.
//!
//! `points = floor(base * e^(-rate * elapsed))`, where `base` is 50 for easy
//! questions and 100 for hard ones. The function is total: negative or NaN elapsed
//! times count as zero, so the result is always within `0..=base`.

use crate::model::Difficulty;

/// Decay rate applied per elapsed second.
pub const DEFAULT_DECAY_RATE: f64 = 0.1;

/// Points for answering a `difficulty` question correctly after `elapsed_seconds`.
#[must_use]
pub fn points(elapsed_seconds: f64, difficulty: Difficulty) -> u32 {
    points_with_rate(elapsed_seconds, difficulty, DEFAULT_DECAY_RATE)
}

/// Same as [`points`], with a caller-provided decay rate.
#[must_use]
pub fn points_with_rate(elapsed_seconds: f64, difficulty: Difficulty, rate: f64) -> u32 {
    let base = difficulty.base_points();
    let elapsed = if elapsed_seconds.is_nan() {
        0.0
    } else {
        elapsed_seconds.max(0.0)
    };
    if elapsed == 0.0 {
        return base;
    }

    let raw = f64::from(base) * (-rate * elapsed).exp();
    if !raw.is_finite() || raw <= 0.0 {
        return 0;
    }
    // raw is in (0, base], so the cast is lossless after floor.
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    let floored = raw.floor() as u32;
    floored.min(base)
}
