//! Grading data structures: submissions in, answers and results out.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};

use crate::catalog::{AnswerId, Level, QuestionId, TestId};
use crate::context::{AttemptId, RefereeId};

// ---------------------------------------------------------------------------
// Submissions
// ---------------------------------------------------------------------------

/// One submitted `(question, answer)` pair, exactly as the client sent it.
///
/// Either side may be missing in a malformed payload; such pairs are
/// skipped during grading rather than aborting the submission.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SubmittedAnswer {
    pub question: Option<QuestionId>,
    pub answer: Option<AnswerId>,
}

/// A finished test sitting, ready to be graded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestSubmission {
    pub test: TestId,
    pub referee: RefereeId,
    pub started_at: DateTime<Utc>,
    pub finished_at: DateTime<Utc>,
    pub answers: Vec<SubmittedAnswer>,
    /// Suppress the result notification (e.g. administrative regrades).
    pub skip_notification: bool,
}

// ---------------------------------------------------------------------------
// Recorded answers
// ---------------------------------------------------------------------------

/// One validated answer recorded against an attempt.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RefereeAnswer {
    pub attempt: AttemptId,
    pub question: QuestionId,
    pub answer: AnswerId,
}

// ---------------------------------------------------------------------------
// Results
// ---------------------------------------------------------------------------

/// Unique identifier for a test result.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ResultId(pub String);

impl std::fmt::Display for ResultId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// The durable, referee-visible summary of a graded attempt.
///
/// At most one result exists per `(referee, level, calendar day)`; the
/// result store enforces this on write.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TestResult {
    pub id: ResultId,
    pub referee: RefereeId,
    pub attempt: AttemptId,
    pub level: Level,
    /// Elapsed wall time rendered as `MM:SS`.
    pub duration: String,
    /// Rounded score percentage (0–100).
    pub percentage: u32,
    pub points_scored: u32,
    pub points_available: u32,
    pub passed: bool,
    /// Snapshot of the pass bar the attempt was graded against.
    pub pass_percentage: u8,
    /// Assigned later by certificate generation; never set by grading.
    pub certificate_url: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl TestResult {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        referee: RefereeId,
        attempt: AttemptId,
        level: Level,
        duration: String,
        percentage: u32,
        points_scored: u32,
        points_available: u32,
        passed: bool,
        pass_percentage: u8,
        created_at: DateTime<Utc>,
    ) -> Self {
        let id_input = format!("{}:{}:{}", referee.0, level, created_at.timestamp_micros());
        let id_hash = Sha256::digest(id_input.as_bytes());
        let id_encoded = bs58::encode(&id_hash[..16]).into_string();

        Self {
            id: ResultId(format!("res_{id_encoded}")),
            referee,
            attempt,
            level,
            duration,
            percentage,
            points_scored,
            points_available,
            passed,
            pass_percentage,
            certificate_url: None,
            created_at,
        }
    }
}

/// Render an elapsed duration as `MM:SS`. Negative durations clamp to
/// `00:00`.
pub(crate) fn format_duration(elapsed: Duration) -> String {
    let seconds = elapsed.num_seconds().max(0);
    format!("{:02}:{:02}", seconds / 60, seconds % 60)
}
