//! Eligibility policies — the five independent "may this referee attempt
//! this test" rules.
//!
//! Every policy is a pure function of the test, the referee context
//! snapshot, and the evaluation instant. No policy performs I/O or mutates
//! anything, so they can be unit-tested in isolation and evaluated
//! concurrently without ordering hazards.

use chrono::{DateTime, Utc};

use crate::catalog::{Certification, Test};
use crate::config::EligibilityOptions;
use crate::context::RefereeContext;

use super::verdict::Verdict;

/// One eligibility rule.
pub trait EligibilityPolicy: Send + Sync {
    /// Stable policy name, used in logs.
    fn name(&self) -> &'static str;

    /// Evaluate this rule for one (test, referee) pair at `now`.
    fn evaluate(&self, test: &Test, ctx: &RefereeContext, now: DateTime<Utc>) -> Verdict;
}

// ---------------------------------------------------------------------------
// HasRequiredCertification
// ---------------------------------------------------------------------------

/// Progression rule: prerequisites within the same version for initial
/// tests, earlier-version possession for recertification tests.
pub struct HasRequiredCertificationPolicy;

impl EligibilityPolicy for HasRequiredCertificationPolicy {
    fn name(&self) -> &'static str {
        "has_required_certification"
    }

    fn evaluate(&self, test: &Test, ctx: &RefereeContext, _now: DateTime<Utc>) -> Verdict {
        if let Some(renewed) = &test.recertification_for {
            // No re-earning a certification already obtained this cycle.
            for awarded in &test.awarded_certifications {
                if ctx.holds(awarded) {
                    return Verdict::AlreadyCertified;
                }
            }
            if ctx.holds(renewed) {
                return Verdict::AlreadyCertified;
            }

            // Recertification renews a level held under an earlier version.
            if !ctx.holds_level_before(renewed.level, renewed.version) {
                return Verdict::MissingPrerequisite;
            }
            return Verdict::Eligible;
        }

        for awarded in &test.awarded_certifications {
            // No duplicate initial certifications.
            if ctx.holds(awarded) {
                return Verdict::AlreadyCertified;
            }
            if let Some(prerequisite) = awarded.prerequisite() {
                if !ctx.holds(&prerequisite) {
                    return Verdict::MissingPrerequisite;
                }
            }
        }

        Verdict::Eligible
    }
}

// ---------------------------------------------------------------------------
// NumberOfAttempts
// ---------------------------------------------------------------------------

/// Attempt ceiling per certification level inside a trailing window.
///
/// The window is a sliding 30 days (not a calendar month); the ceiling is
/// the test's own `maximum_attempts` when set, else the configured default.
pub struct NumberOfAttemptsPolicy {
    options: EligibilityOptions,
}

impl NumberOfAttemptsPolicy {
    pub fn new(options: EligibilityOptions) -> Self {
        Self { options }
    }
}

impl EligibilityPolicy for NumberOfAttemptsPolicy {
    fn name(&self) -> &'static str {
        "number_of_attempts"
    }

    fn evaluate(&self, test: &Test, ctx: &RefereeContext, now: DateTime<Utc>) -> Verdict {
        let Some(level) = test.certification_level() else {
            return Verdict::Eligible;
        };

        let ceiling = test.maximum_attempts.unwrap_or(self.options.max_attempts);
        let cutoff = now - self.options.attempt_window;
        let used = ctx.attempts_at_level_since(level, cutoff) as u32;

        if used >= ceiling {
            Verdict::AttemptLimitReached {
                attempts_used: used,
                max_attempts: ceiling,
            }
        } else {
            Verdict::Eligible
        }
    }
}

// ---------------------------------------------------------------------------
// Payment
// ---------------------------------------------------------------------------

/// Head-level tests require a completed certification payment for the
/// test's version. Tests of other levels always pass.
pub struct PaymentPolicy;

impl EligibilityPolicy for PaymentPolicy {
    fn name(&self) -> &'static str {
        "payment"
    }

    fn evaluate(&self, test: &Test, ctx: &RefereeContext, _now: DateTime<Utc>) -> Verdict {
        let gated = test
            .awarded_certifications
            .iter()
            .find(|c| c.level.requires_payment());

        match gated {
            Some(cert) if !ctx.paid_for(cert.version) => Verdict::PaymentRequired,
            _ => Verdict::Eligible,
        }
    }
}

// ---------------------------------------------------------------------------
// AttemptCooldown
// ---------------------------------------------------------------------------

/// Mandatory wait after the most recent attempt at the same certification
/// level, regardless of which test or version that attempt was for.
///
/// The window starts at the attempt's finish time, or its start time when
/// it is still unfinished. The remaining time is reported in whole hours,
/// rounded up.
pub struct AttemptCooldownPolicy {
    options: EligibilityOptions,
}

impl AttemptCooldownPolicy {
    pub fn new(options: EligibilityOptions) -> Self {
        Self { options }
    }
}

impl EligibilityPolicy for AttemptCooldownPolicy {
    fn name(&self) -> &'static str {
        "attempt_cooldown"
    }

    fn evaluate(&self, test: &Test, ctx: &RefereeContext, now: DateTime<Utc>) -> Verdict {
        let Some(level) = test.certification_level() else {
            return Verdict::Eligible;
        };
        let Some(latest) = ctx.latest_attempt_at(level) else {
            return Verdict::Eligible;
        };

        let cooldown_end = latest.cooldown_start() + self.options.cooldown;
        if now < cooldown_end {
            let seconds_remaining = (cooldown_end - now).num_seconds();
            Verdict::CooldownActive {
                hours_remaining: (seconds_remaining + 3599) / 3600,
            }
        } else {
            Verdict::Eligible
        }
    }
}

// ---------------------------------------------------------------------------
// RefereeCertified
// ---------------------------------------------------------------------------

/// Final narrow safety check: a test is excluded when the referee already
/// holds the exact certification it awards, independent of the
/// prerequisite-chain logic above.
pub struct RefereeCertifiedPolicy;

impl EligibilityPolicy for RefereeCertifiedPolicy {
    fn name(&self) -> &'static str {
        "referee_certified"
    }

    fn evaluate(&self, test: &Test, ctx: &RefereeContext, _now: DateTime<Utc>) -> Verdict {
        let already_held = test
            .awarded_certifications
            .iter()
            .any(|awarded: &Certification| ctx.holds(awarded));

        if already_held {
            Verdict::AlreadyCertified
        } else {
            Verdict::Eligible
        }
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
