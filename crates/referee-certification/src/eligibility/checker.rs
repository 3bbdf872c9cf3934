//! The eligibility checker — runs the policies in their fixed order.

use chrono::{DateTime, Utc};

use crate::catalog::Test;
use crate::config::EligibilityOptions;
use crate::context::{RefereeContext, RefereeContextProvider, RefereeId};
use crate::error::Result;

use super::policies::{
    AttemptCooldownPolicy, EligibilityPolicy, HasRequiredCertificationPolicy,
    NumberOfAttemptsPolicy, PaymentPolicy, RefereeCertifiedPolicy,
};
use super::verdict::Verdict;

/// Evaluates every policy for a (referee, test) pair.
///
/// The policy order is fixed: progression, attempt ceiling, payment,
/// cooldown, duplicate-certification. The first exclusion wins, so a
/// referee who is both unpaid and cooling down is reported as unpaid.
/// Later policies are not evaluated once a verdict is reached.
pub struct EligibilityChecker {
    policies: Vec<Box<dyn EligibilityPolicy>>,
}

impl EligibilityChecker {
    pub fn new(options: EligibilityOptions) -> Self {
        Self {
            policies: vec![
                Box::new(HasRequiredCertificationPolicy),
                Box::new(NumberOfAttemptsPolicy::new(options)),
                Box::new(PaymentPolicy),
                Box::new(AttemptCooldownPolicy::new(options)),
                Box::new(RefereeCertifiedPolicy),
            ],
        }
    }

    /// The verdict for one (referee, test) pair at `now`.
    pub fn check(&self, test: &Test, ctx: &RefereeContext, now: DateTime<Utc>) -> Verdict {
        for policy in &self.policies {
            let verdict = policy.evaluate(test, ctx, now);
            if !verdict.is_eligible() {
                log::debug!(
                    "referee {} excluded from test {} by {}: {}",
                    ctx.referee,
                    test.id,
                    policy.name(),
                    verdict
                );
                return verdict;
            }
        }
        Verdict::Eligible
    }

    /// Resolve the referee's context through `provider` and check one
    /// test — the single-test eligibility entry point.
    ///
    /// # Errors
    ///
    /// Returns `CertError::RefereeNotFound` when the referee cannot be
    /// resolved — a fatal precondition for the whole query, not a verdict.
    pub fn check_referee<P: RefereeContextProvider>(
        &self,
        provider: &P,
        test: &Test,
        referee: &RefereeId,
        now: DateTime<Utc>,
    ) -> Result<Verdict> {
        let ctx = provider.context(referee)?;
        Ok(self.check(test, &ctx, now))
    }
}

impl Default for EligibilityChecker {
    fn default() -> Self {
        Self::new(EligibilityOptions::default())
    }
}
