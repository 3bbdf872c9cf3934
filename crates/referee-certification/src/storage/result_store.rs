//! Test result persistence.
//!
//! Results live at `{root}/results/{referee_id}/{level}_{date}.json`.
//! Keying the file by `(referee, level, calendar day)` makes the
//! at-most-one-result-per-day invariant a property of the store itself:
//! even when the grading engine's idempotency guard is skipped (e.g. two
//! racing jobs), the second write maps to the same path and is refused.

use std::path::PathBuf;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::catalog::Level;
use crate::context::RefereeId;
use crate::error::{CertError, Result};
use crate::grading::TestResult;

use super::STORE_FILE_VERSION;

const RESULTS_DIR: &str = "results";

/// Wrapper written to disk for each result.
#[derive(Debug, Serialize, Deserialize)]
struct ResultFile {
    version: u32,
    result: TestResult,
}

/// Filesystem-backed store for [`TestResult`] records.
pub struct ResultStore {
    base_dir: PathBuf,
}

impl ResultStore {
    /// Create a store rooted at `base_dir`, creating `results/` if needed.
    ///
    /// # Errors
    ///
    /// Returns `CertError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(RESULTS_DIR))?;
        Ok(Self { base_dir })
    }

    /// Persist a result.
    ///
    /// Returns `Ok(true)` when the result was written, `Ok(false)` when a
    /// result already exists for the same `(referee, level, day)` — the
    /// duplicate-result race resolves to "already graded," never an error.
    pub fn save_result(&self, result: &TestResult) -> Result<bool> {
        let day = result.created_at.date_naive();
        let path = self.result_path(&result.referee, result.level, day);

        if path.exists() {
            return Ok(false);
        }
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = ResultFile {
            version: STORE_FILE_VERSION,
            result: result.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(&path, json.as_bytes())?;
        Ok(true)
    }

    /// Whether a result exists for `(referee, level, day)`.
    pub fn exists_for_day(&self, referee: &RefereeId, level: Level, day: NaiveDate) -> bool {
        self.result_path(referee, level, day).exists()
    }

    /// Load the result for `(referee, level, day)`.
    ///
    /// # Errors
    ///
    /// Returns `CertError::NotFound` when no result exists for the key.
    pub fn load_for_day(
        &self,
        referee: &RefereeId,
        level: Level,
        day: NaiveDate,
    ) -> Result<TestResult> {
        let path = self.result_path(referee, level, day);
        if !path.exists() {
            return Err(CertError::NotFound(format!(
                "test result for referee {referee}, level {level}, day {day}"
            )));
        }

        let bytes = std::fs::read(&path)?;
        let file: ResultFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse result file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.result)
    }

    /// Every result of a referee, in no particular order.
    pub fn list_for_referee(&self, referee: &RefereeId) -> Result<Vec<TestResult>> {
        let dir = self.base_dir.join(RESULTS_DIR).join(&referee.0);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut results = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let bytes = std::fs::read(entry.path())?;
            let file: ResultFile = serde_json::from_slice(&bytes).map_err(|e| {
                CertError::InvalidFileFormat(format!(
                    "failed to parse result file {}: {e}",
                    entry.path().display()
                ))
            })?;
            results.push(file.result);
        }

        Ok(results)
    }

    fn result_path(&self, referee: &RefereeId, level: Level, day: NaiveDate) -> PathBuf {
        self.base_dir
            .join(RESULTS_DIR)
            .join(&referee.0)
            .join(format!("{level}_{day}.json"))
    }
}
