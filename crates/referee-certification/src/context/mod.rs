//! Referee context — everything the policies need to know about a referee.
//!
//! The context module provides:
//! - Referee profiles and acquired certifications
//! - Certification payments (Head gating)
//! - Test attempt records with cooldown semantics
//! - The `RefereeContext` snapshot consumed by every policy
//! - The read-only `RefereeContextProvider` port and its store-backed impl

pub mod provider;
pub mod types;

pub use provider::{RefereeContextProvider, StoreContextProvider};
pub use types::{
    AttemptId, CertificationPayment, FinishMethod, RefereeCertification, RefereeContext,
    RefereeId, RefereeProfile, TestAttempt,
};
