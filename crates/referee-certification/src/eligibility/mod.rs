//! Eligibility — who may attempt which test, right now.
//!
//! Five pure policies each answer one question about a (referee, test)
//! pair; the checker runs them in a fixed order and returns the first
//! exclusion. The candidate-set resolver builds the "tests available to
//! me" listing on top of the checker.

mod available;
mod checker;
mod policies;
mod verdict;

pub use available::find_available_tests;
pub use checker::EligibilityChecker;
pub use policies::{
    AttemptCooldownPolicy, EligibilityPolicy, HasRequiredCertificationPolicy,
    NumberOfAttemptsPolicy, PaymentPolicy, RefereeCertifiedPolicy,
};
pub use verdict::Verdict;
