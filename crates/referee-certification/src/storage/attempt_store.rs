//! Test attempt and recorded-answer persistence.
//!
//! Attempts live at `{root}/attempts/{attempt_id}.json`; the answers
//! recorded against an attempt at `{root}/answers/{attempt_id}.json`.
//! Attempts are never deleted; a finished attempt is rewritten exactly once
//! when its finish fields are set.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::Level;
use crate::context::{AttemptId, RefereeId, TestAttempt};
use crate::error::{CertError, Result};
use crate::grading::RefereeAnswer;

use super::STORE_FILE_VERSION;

const ATTEMPTS_DIR: &str = "attempts";
const ANSWERS_DIR: &str = "answers";

/// Wrapper written to disk for each attempt.
#[derive(Debug, Serialize, Deserialize)]
struct AttemptFile {
    version: u32,
    attempt: TestAttempt,
}

/// Wrapper written to disk for an attempt's recorded answers.
#[derive(Debug, Serialize, Deserialize)]
struct AnswerSetFile {
    version: u32,
    answers: Vec<RefereeAnswer>,
}

/// Filesystem-backed store for [`TestAttempt`] and [`RefereeAnswer`] records.
pub struct AttemptStore {
    base_dir: PathBuf,
}

impl AttemptStore {
    /// Create a store rooted at `base_dir`, creating `attempts/` and
    /// `answers/` if needed.
    ///
    /// # Errors
    ///
    /// Returns `CertError::Io` if a directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(ATTEMPTS_DIR))?;
        std::fs::create_dir_all(base_dir.join(ANSWERS_DIR))?;
        Ok(Self { base_dir })
    }

    /// Persist an attempt (create or finish-rewrite).
    pub fn save_attempt(&self, attempt: &TestAttempt) -> Result<()> {
        let file = AttemptFile {
            version: STORE_FILE_VERSION,
            attempt: attempt.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(self.attempt_path(&attempt.id), json.as_bytes())?;
        Ok(())
    }

    /// Load an attempt by ID.
    ///
    /// # Errors
    ///
    /// Returns `CertError::NotFound` when no attempt exists.
    pub fn load_attempt(&self, id: &AttemptId) -> Result<TestAttempt> {
        let path = self.attempt_path(id);
        if !path.exists() {
            return Err(CertError::NotFound(format!("test attempt {id}")));
        }

        let bytes = std::fs::read(&path)?;
        let file: AttemptFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse attempt file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.attempt)
    }

    /// Every attempt of a referee, ordered by `started_at` ascending.
    pub fn attempts_for_referee(&self, referee: &RefereeId) -> Result<Vec<TestAttempt>> {
        let dir = self.base_dir.join(ATTEMPTS_DIR);
        let mut attempts = Vec::new();

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let bytes = std::fs::read(entry.path())?;
            let file: AttemptFile = serde_json::from_slice(&bytes).map_err(|e| {
                CertError::InvalidFileFormat(format!(
                    "failed to parse attempt file {}: {e}",
                    entry.path().display()
                ))
            })?;
            if &file.attempt.referee == referee {
                attempts.push(file.attempt);
            }
        }

        attempts.sort_by_key(|a| a.started_at);
        Ok(attempts)
    }

    /// The referee's most recent attempt at a certification level,
    /// regardless of test or version.
    pub fn latest_attempt_at_level(
        &self,
        referee: &RefereeId,
        level: Level,
    ) -> Result<Option<TestAttempt>> {
        let attempts = self.attempts_for_referee(referee)?;
        Ok(attempts.into_iter().filter(|a| a.level == level).last())
    }

    /// Persist the answers recorded against an attempt.
    pub fn record_answers(&self, attempt: &AttemptId, answers: &[RefereeAnswer]) -> Result<()> {
        let file = AnswerSetFile {
            version: STORE_FILE_VERSION,
            answers: answers.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(self.answers_path(attempt), json.as_bytes())?;
        Ok(())
    }

    /// Load the answers recorded against an attempt. A missing file is an
    /// empty set.
    pub fn load_answers(&self, attempt: &AttemptId) -> Result<Vec<RefereeAnswer>> {
        let path = self.answers_path(attempt);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = std::fs::read(&path)?;
        let file: AnswerSetFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse answer file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.answers)
    }

    fn attempt_path(&self, id: &AttemptId) -> PathBuf {
        self.base_dir
            .join(ATTEMPTS_DIR)
            .join(format!("{}.json", id.0))
    }

    fn answers_path(&self, id: &AttemptId) -> PathBuf {
        self.base_dir
            .join(ANSWERS_DIR)
            .join(format!("{}.json", id.0))
    }
}
