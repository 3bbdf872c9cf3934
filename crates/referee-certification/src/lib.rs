//! RefereeCertification — eligibility and grading for referee
//! certification tests.
//!
//! Determines whether a referee may attempt a proficiency test right now
//! (progression across rulebook versions, attempt ceilings, cooldowns,
//! payment gating, recertification rules) and grades finished submissions
//! into durable, idempotent results with background job serialization per
//! referee and level.

pub mod catalog;
pub mod config;
pub mod context;
pub mod eligibility;
pub mod error;
pub mod grading;
pub mod notify;
pub mod storage;

// Re-export primary types
pub use config::EligibilityOptions;
pub use error::{CertError, Result};

// Re-export catalog types
pub use catalog::{
    Answer, AnswerId, Certification, Level, Question, QuestionChoicePolicy, QuestionId, Test,
    TestBuilder, TestId, Version,
};

// Re-export referee context types
pub use context::{
    AttemptId, CertificationPayment, FinishMethod, RefereeCertification, RefereeContext,
    RefereeContextProvider, RefereeId, RefereeProfile, StoreContextProvider, TestAttempt,
};

// Re-export eligibility types
pub use eligibility::{find_available_tests, EligibilityChecker, EligibilityPolicy, Verdict};

// Re-export grading types
pub use grading::{
    GradingEngine, GradingJobHandle, GradingScheduler, JobId, RefereeAnswer, ResultId,
    SubmittedAnswer, TestResult, TestSubmission,
};

// Re-export notification port
pub use notify::{LogNotifier, NullNotifier, ResultNotifier};
