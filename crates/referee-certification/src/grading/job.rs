//! Background grading jobs.
//!
//! Grading runs off the request path: the caller hands a submission to the
//! scheduler and gets a job handle back. Jobs for the same
//! `(referee, level)` pair are serialized through a lease so two racing
//! submissions cannot both create attempt rows or both pass the
//! idempotency guard; jobs for different pairs run concurrently. A started
//! job runs to completion — there is no cancellation.

use std::collections::HashMap;
use std::sync::{Arc, Mutex};

use chrono::{DateTime, Utc};
use sha2::{Digest, Sha256};
use tokio::task::JoinHandle;

use crate::catalog::Level;
use crate::context::RefereeId;
use crate::error::{CertError, Result};

use super::engine::GradingEngine;
use super::types::{TestResult, TestSubmission};

/// Unique identifier for a scheduled grading job.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Handle to one in-flight grading job.
pub struct GradingJobHandle {
    pub id: JobId,
    handle: JoinHandle<Result<Option<TestResult>>>,
}

impl GradingJobHandle {
    /// Wait for the job to finish and return its grading outcome.
    ///
    /// # Errors
    ///
    /// Returns `CertError::JobFailed` when the job panicked or was
    /// aborted, otherwise whatever the grading call returned.
    pub async fn wait(self) -> Result<Option<TestResult>> {
        self.handle
            .await
            .map_err(|e| CertError::JobFailed(e.to_string()))?
    }
}

type Lease = Arc<Mutex<()>>;

/// Schedules grading jobs, serialized per `(referee, level)`.
pub struct GradingScheduler {
    engine: Arc<GradingEngine>,
    leases: Mutex<HashMap<(RefereeId, Level), Lease>>,
}

impl GradingScheduler {
    pub fn new(engine: Arc<GradingEngine>) -> Self {
        Self {
            engine,
            leases: Mutex::new(HashMap::new()),
        }
    }

    /// Schedule grading of `submission` as evaluated at `now`.
    ///
    /// The test reference is resolved up front so an unknown test fails
    /// the caller synchronously instead of inside the job.
    ///
    /// # Errors
    ///
    /// Returns `CertError::TestNotFound` or `CertError::MisconfiguredTest`
    /// when the submission's test cannot be resolved to a level.
    pub fn submit(
        &self,
        submission: TestSubmission,
        now: DateTime<Utc>,
    ) -> Result<GradingJobHandle> {
        let level = self.engine.test_level(&submission.test)?;
        let lease = self.lease_for(submission.referee.clone(), level);

        let id_input = format!(
            "{}:{}:{}",
            submission.referee.0,
            submission.test.0,
            now.timestamp_micros()
        );
        let id_hash = Sha256::digest(id_input.as_bytes());
        let id = JobId(format!("job_{}", bs58::encode(&id_hash[..16]).into_string()));
        log::debug!(
            "scheduling grading job {id} for referee {} at {level}",
            submission.referee
        );

        let engine = Arc::clone(&self.engine);
        let handle = tokio::task::spawn_blocking(move || {
            let _guard = lease.lock().unwrap_or_else(|e| e.into_inner());
            engine.grade(&submission, now)
        });

        Ok(GradingJobHandle { id, handle })
    }

    fn lease_for(&self, referee: RefereeId, level: Level) -> Lease {
        let mut leases = self.leases.lock().unwrap_or_else(|e| e.into_inner());
        // A lease held only by the map belongs to no running job; sweep
        // such entries so the map does not grow with every referee ever
        // graded.
        leases.retain(|_, lease| Arc::strong_count(lease) > 1);
        Arc::clone(leases.entry((referee, level)).or_default())
    }
}
