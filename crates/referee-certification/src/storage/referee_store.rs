//! Referee profile persistence.
//!
//! Profiles live at `{root}/referees/{referee_id}.json`. Loading a missing
//! profile is the fatal "referee not found" precondition surfaced by
//! eligibility queries and grading.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::context::{RefereeId, RefereeProfile};
use crate::error::{CertError, Result};

use super::STORE_FILE_VERSION;

const REFEREES_DIR: &str = "referees";

/// Wrapper written to disk for each profile.
#[derive(Debug, Serialize, Deserialize)]
struct RefereeFile {
    version: u32,
    referee: RefereeProfile,
}

/// Filesystem-backed store for [`RefereeProfile`] records.
pub struct RefereeStore {
    base_dir: PathBuf,
}

impl RefereeStore {
    /// Create a store rooted at `base_dir`, creating `referees/` if needed.
    ///
    /// # Errors
    ///
    /// Returns `CertError::Io` if the directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(REFEREES_DIR))?;
        Ok(Self { base_dir })
    }

    /// Persist a referee profile.
    pub fn save(&self, profile: &RefereeProfile) -> Result<()> {
        let file = RefereeFile {
            version: STORE_FILE_VERSION,
            referee: profile.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(self.profile_path(&profile.id), json.as_bytes())?;
        Ok(())
    }

    /// Load a referee profile by ID.
    ///
    /// # Errors
    ///
    /// Returns `CertError::RefereeNotFound` when no profile exists — the
    /// fatal precondition for every eligibility and grading call.
    pub fn load(&self, id: &RefereeId) -> Result<RefereeProfile> {
        let path = self.profile_path(id);
        if !path.exists() {
            return Err(CertError::RefereeNotFound(id.0.clone()));
        }

        let bytes = std::fs::read(&path)?;
        let file: RefereeFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse referee file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.referee)
    }

    fn profile_path(&self, id: &RefereeId) -> PathBuf {
        self.base_dir
            .join(REFEREES_DIR)
            .join(format!("{}.json", id.0))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_save_load_profile() {
        let dir = tempfile::tempdir().unwrap();
        let store = RefereeStore::new(dir.path()).unwrap();

        let profile = RefereeProfile {
            id: RefereeId("ref1".into()),
            name: "Alex Referee".into(),
            language: Some("en".into()),
        };
        store.save(&profile).expect("save failed");

        let loaded = store.load(&RefereeId("ref1".into())).expect("load failed");
        assert_eq!(loaded.id, profile.id);
        assert_eq!(loaded.name, profile.name);
        assert_eq!(loaded.language.as_deref(), Some("en"));
    }

    #[test]
    fn test_load_missing_profile_is_referee_not_found() {
        let dir = tempfile::tempdir().unwrap();
        let store = RefereeStore::new(dir.path()).unwrap();

        let result = store.load(&RefereeId("ghost".into()));
        assert!(matches!(result, Err(CertError::RefereeNotFound(_))));
    }
}
