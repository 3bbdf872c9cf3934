//! Data structures for the referee side of eligibility and grading.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::collections::BTreeSet;

use crate::catalog::{Certification, Level, TestId, Version};

// ---------------------------------------------------------------------------
// Referee identity
// ---------------------------------------------------------------------------

/// Unique identifier for a referee (certification candidate).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct RefereeId(pub String);

impl std::fmt::Display for RefereeId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registry record for a referee. Absence of a profile is the fatal
/// "referee not found" precondition for eligibility and grading.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefereeProfile {
    pub id: RefereeId,
    pub name: String,
    /// Selected language; drives the candidate-set language filter.
    pub language: Option<String>,
}

// ---------------------------------------------------------------------------
// Acquired certifications and payments
// ---------------------------------------------------------------------------

/// Edge: a referee holds a certification.
///
/// Only rows with `revoked_at == None` count as acquired.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefereeCertification {
    pub referee: RefereeId,
    pub certification: Certification,
    pub received_at: DateTime<Utc>,
    pub revoked_at: Option<DateTime<Utc>>,
    pub needs_renewal_at: Option<DateTime<Utc>>,
}

impl RefereeCertification {
    pub fn new(referee: RefereeId, certification: Certification, received_at: DateTime<Utc>) -> Self {
        Self {
            referee,
            certification,
            received_at,
            revoked_at: None,
            needs_renewal_at: None,
        }
    }

    pub fn is_active(&self) -> bool {
        self.revoked_at.is_none()
    }
}

/// Edge: a referee has paid for the Head certification of a version.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CertificationPayment {
    pub referee: RefereeId,
    pub version: Version,
    pub created_at: DateTime<Utc>,
}

// ---------------------------------------------------------------------------
// Test attempts
// ---------------------------------------------------------------------------

/// Unique identifier for a test attempt.
///
/// Format: `att_` + base58 of the first 16 bytes of
/// SHA-256(`referee:test:started_at`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct AttemptId(pub String);

impl std::fmt::Display for AttemptId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// How a finished attempt ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FinishMethod {
    Submitted,
    Timeout,
}

/// One row per attempt start. Finish fields are set exactly once; a
/// finished attempt is immutable and never deleted.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestAttempt {
    pub id: AttemptId,
    pub test: TestId,
    pub referee: RefereeId,
    pub level: Level,
    pub started_at: DateTime<Utc>,
    pub finished_at: Option<DateTime<Utc>>,
    pub finish_method: Option<FinishMethod>,
    /// Points scored, once graded.
    pub score: Option<u32>,
    pub passed: Option<bool>,
    /// Snapshot of the pass bar at attempt time; the test's bar may change
    /// later.
    pub pass_percentage: Option<u8>,
}

impl TestAttempt {
    /// Create a fresh in-progress attempt.
    pub fn start(test: TestId, referee: RefereeId, level: Level, started_at: DateTime<Utc>) -> Self {
        let id_input = format!("{}:{}:{}", referee.0, test.0, started_at.timestamp_micros());
        let id_hash = Sha256::digest(id_input.as_bytes());
        let id_encoded = bs58::encode(&id_hash[..16]).into_string();

        Self {
            id: AttemptId(format!("att_{id_encoded}")),
            test,
            referee,
            level,
            started_at,
            finished_at: None,
            finish_method: None,
            score: None,
            passed: None,
            pass_percentage: None,
        }
    }

    pub fn is_finished(&self) -> bool {
        self.finished_at.is_some()
    }

    /// Record the outcome of this attempt.
    pub fn finish(
        &mut self,
        finished_at: DateTime<Utc>,
        method: FinishMethod,
        score: u32,
        passed: bool,
        pass_percentage: u8,
    ) {
        self.finished_at = Some(finished_at);
        self.finish_method = Some(method);
        self.score = Some(score);
        self.passed = Some(passed);
        self.pass_percentage = Some(pass_percentage);
    }

    /// Where the cooldown window starts: the finish time for finished
    /// attempts, the start time for in-progress ones.
    pub fn cooldown_start(&self) -> DateTime<Utc> {
        self.finished_at.unwrap_or(self.started_at)
    }
}

// ---------------------------------------------------------------------------
// Referee context snapshot
// ---------------------------------------------------------------------------

/// Immutable snapshot of a referee's state, resolved once per eligibility
/// query and shared by every policy. Policies are pure functions over it.
#[derive(Debug, Clone)]
pub struct RefereeContext {
    pub referee: RefereeId,
    /// Selected language, if any.
    pub language: Option<String>,
    /// Non-revoked certification rows, with acquisition timestamps.
    pub certifications: Vec<RefereeCertification>,
    /// Versions for which the Head certification payment has completed.
    pub head_certifications_paid: BTreeSet<Version>,
    /// All attempts, ordered by `started_at` ascending.
    pub test_attempts: Vec<TestAttempt>,
}

impl RefereeContext {
    /// Whether the referee holds `certification` (non-revoked).
    pub fn holds(&self, certification: &Certification) -> bool {
        self.certifications
            .iter()
            .any(|c| c.is_active() && &c.certification == certification)
    }

    /// Whether the referee holds a certification of `level` under any
    /// version strictly earlier than `version`.
    pub fn holds_level_before(&self, level: Level, version: Version) -> bool {
        self.certifications.iter().any(|c| {
            c.is_active()
                && c.certification.level == level
                && c.certification.version < version
        })
    }

    /// The versions at which the referee holds a certification of `level`.
    pub fn versions_held(&self, level: Level) -> BTreeSet<Version> {
        self.certifications
            .iter()
            .filter(|c| c.is_active() && c.certification.level == level)
            .map(|c| c.certification.version)
            .collect()
    }

    /// The version of the most recently received certification of `level`.
    pub fn latest_version_of(&self, level: Level) -> Option<Version> {
        self.certifications
            .iter()
            .filter(|c| c.is_active() && c.certification.level == level)
            .max_by_key(|c| c.received_at)
            .map(|c| c.certification.version)
    }

    /// Whether the Head payment for `version` has completed.
    pub fn paid_for(&self, version: Version) -> bool {
        self.head_certifications_paid.contains(&version)
    }

    /// The most recent attempt at `level`, regardless of test or version.
    pub fn latest_attempt_at(&self, level: Level) -> Option<&TestAttempt> {
        self.test_attempts
            .iter()
            .filter(|a| a.level == level)
            .max_by_key(|a| a.started_at)
    }

    /// Count of attempts at `level` started at or after `cutoff`.
    pub fn attempts_at_level_since(&self, level: Level, cutoff: DateTime<Utc>) -> usize {
        self.test_attempts
            .iter()
            .filter(|a| a.level == level && a.started_at >= cutoff)
            .count()
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
