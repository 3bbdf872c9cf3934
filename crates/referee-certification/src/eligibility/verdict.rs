//! Eligibility verdicts.

use serde::{Deserialize, Serialize};

/// Outcome of evaluating eligibility for one (referee, test) pair.
///
/// Computed fresh on every query and never persisted. An exclusion is a
/// normal, expected outcome — not an error — and carries the numeric
/// detail callers need to render a precise message ("try again in N
/// hours", "N of M attempts used").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Verdict {
    /// All policies passed; the test may be attempted.
    Eligible,
    /// The referee already holds a certification the test would grant.
    AlreadyCertified,
    /// A prerequisite certification for the test's level is missing.
    MissingPrerequisite,
    /// The Head certification payment for the test's version is missing.
    PaymentRequired,
    /// A recent attempt at the same level blocks new attempts.
    CooldownActive {
        /// Whole hours until the cooldown ends, rounded up.
        hours_remaining: i64,
    },
    /// The attempt ceiling for the level has been reached in the window.
    AttemptLimitReached {
        attempts_used: u32,
        max_attempts: u32,
    },
}

impl Verdict {
    pub fn is_eligible(&self) -> bool {
        matches!(self, Verdict::Eligible)
    }
}

impl std::fmt::Display for Verdict {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Verdict::Eligible => write!(f, "eligible"),
            Verdict::AlreadyCertified => write!(f, "already certified"),
            Verdict::MissingPrerequisite => write!(f, "missing prerequisite certification"),
            Verdict::PaymentRequired => write!(f, "certification payment required"),
            Verdict::CooldownActive { hours_remaining } => {
                write!(f, "cooldown active, try again in {hours_remaining} hours")
            }
            Verdict::AttemptLimitReached {
                attempts_used,
                max_attempts,
            } => write!(
                f,
                "attempt limit reached ({attempts_used} of {max_attempts} used)"
            ),
        }
    }
}
