//! Contextual options for eligibility evaluation.
//!
//! Operational overrides (a temporarily raised attempt ceiling, a shortened
//! cooldown in staging) are passed in explicitly when policies are built,
//! never read from ambient global state.

use chrono::Duration;

/// Tunable limits consumed by the eligibility policies and grading engine.
#[derive(Debug, Clone, Copy)]
pub struct EligibilityOptions {
    /// Attempt ceiling per certification level inside the window.
    /// A test's own `maximum_attempts` takes precedence when set.
    pub max_attempts: u32,
    /// Sliding window over which attempts are counted.
    pub attempt_window: Duration,
    /// Mandatory wait after an attempt at a level before the next one.
    pub cooldown: Duration,
}

impl Default for EligibilityOptions {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            attempt_window: Duration::days(30),
            cooldown: Duration::hours(24),
        }
    }
}
