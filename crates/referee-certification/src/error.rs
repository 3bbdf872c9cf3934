//! Error types for the certification core.
//!
//! Eligibility exclusions are **not** errors — they are ordinary
//! [`Verdict`](crate::eligibility::Verdict) values. Errors here cover
//! precondition failures (unknown referee or test), storage faults, and
//! failed background jobs.

/// Certification core error types covering all operations.
#[derive(Debug, thiserror::Error)]
pub enum CertError {
    #[error("Referee not found: {0}")]
    RefereeNotFound(String),

    #[error("Test not found: {0}")]
    TestNotFound(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Test {0} awards no certifications")]
    MisconfiguredTest(String),

    #[error("Serialization error: {0}")]
    SerializationError(String),

    #[error("Invalid file format: {0}")]
    InvalidFileFormat(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Grading job failed: {0}")]
    JobFailed(String),
}

/// Convenience Result alias.
pub type Result<T> = std::result::Result<T, CertError>;
