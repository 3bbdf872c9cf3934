//! Acquired certification and payment persistence.
//!
//! Certification rows live at
//! `{root}/certifications/{referee_id}/{level}_{version}.json` and Head
//! payments at `{root}/payments/{referee_id}/{version}.json`. The file
//! naming makes "does the referee hold X" an O(1) filesystem lookup.

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::catalog::{Certification, Version};
use crate::context::{CertificationPayment, RefereeCertification, RefereeId};
use crate::error::{CertError, Result};

use super::STORE_FILE_VERSION;

const CERTIFICATIONS_DIR: &str = "certifications";
const PAYMENTS_DIR: &str = "payments";

/// Wrapper written to disk for each certification row.
#[derive(Debug, Serialize, Deserialize)]
struct CertificationFile {
    version: u32,
    record: RefereeCertification,
}

/// Wrapper written to disk for each payment row.
#[derive(Debug, Serialize, Deserialize)]
struct PaymentFile {
    version: u32,
    payment: CertificationPayment,
}

/// Filesystem-backed store for [`RefereeCertification`] and
/// [`CertificationPayment`] records.
pub struct CertificationStore {
    base_dir: PathBuf,
}

impl CertificationStore {
    /// Create a store rooted at `base_dir`, creating `certifications/` and
    /// `payments/` if needed.
    ///
    /// # Errors
    ///
    /// Returns `CertError::Io` if a directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(CERTIFICATIONS_DIR))?;
        std::fs::create_dir_all(base_dir.join(PAYMENTS_DIR))?;
        Ok(Self { base_dir })
    }

    // ── Certification rows ────────────────────────────────────────────────

    /// Persist a certification row, overwriting any existing row for the
    /// same `(referee, level, version)`.
    pub fn save_certification(&self, record: &RefereeCertification) -> Result<()> {
        let path = self.certification_path(&record.referee, &record.certification);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = CertificationFile {
            version: STORE_FILE_VERSION,
            record: record.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(&path, json.as_bytes())?;
        Ok(())
    }

    /// All certification rows for a referee, revoked ones included.
    pub fn list_for_referee(&self, referee: &RefereeId) -> Result<Vec<RefereeCertification>> {
        let dir = self.base_dir.join(CERTIFICATIONS_DIR).join(&referee.0);
        if !dir.exists() {
            return Ok(Vec::new());
        }

        let mut records = Vec::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let bytes = std::fs::read(entry.path())?;
            let file: CertificationFile = serde_json::from_slice(&bytes).map_err(|e| {
                CertError::InvalidFileFormat(format!(
                    "failed to parse certification file {}: {e}",
                    entry.path().display()
                ))
            })?;
            records.push(file.record);
        }

        Ok(records)
    }

    /// Whether the referee holds `certification` (row present, not revoked).
    pub fn is_held(&self, referee: &RefereeId, certification: &Certification) -> Result<bool> {
        let path = self.certification_path(referee, certification);
        if !path.exists() {
            return Ok(false);
        }

        let bytes = std::fs::read(&path)?;
        let file: CertificationFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse certification file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.record.is_active())
    }

    /// Administratively revoke a held certification.
    ///
    /// # Errors
    ///
    /// Returns `CertError::NotFound` when no row exists for the pair.
    pub fn revoke(
        &self,
        referee: &RefereeId,
        certification: &Certification,
        revoked_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut record = self.load_row(referee, certification)?;
        record.revoked_at = Some(revoked_at);
        self.save_certification(&record)
    }

    /// Administratively flag a held certification as due for renewal.
    ///
    /// # Errors
    ///
    /// Returns `CertError::NotFound` when no row exists for the pair.
    pub fn mark_needs_renewal(
        &self,
        referee: &RefereeId,
        certification: &Certification,
        needs_renewal_at: DateTime<Utc>,
    ) -> Result<()> {
        let mut record = self.load_row(referee, certification)?;
        record.needs_renewal_at = Some(needs_renewal_at);
        self.save_certification(&record)
    }

    // ── Payments ──────────────────────────────────────────────────────────

    /// Persist a completed Head certification payment.
    pub fn save_payment(&self, payment: &CertificationPayment) -> Result<()> {
        let path = self.payment_path(&payment.referee, payment.version);
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let file = PaymentFile {
            version: STORE_FILE_VERSION,
            payment: payment.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(&path, json.as_bytes())?;
        Ok(())
    }

    /// The versions a referee has paid Head certification fees for.
    pub fn paid_versions(&self, referee: &RefereeId) -> Result<BTreeSet<Version>> {
        let dir = self.base_dir.join(PAYMENTS_DIR).join(&referee.0);
        if !dir.exists() {
            return Ok(BTreeSet::new());
        }

        let mut versions = BTreeSet::new();
        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let bytes = std::fs::read(entry.path())?;
            let file: PaymentFile = serde_json::from_slice(&bytes).map_err(|e| {
                CertError::InvalidFileFormat(format!(
                    "failed to parse payment file {}: {e}",
                    entry.path().display()
                ))
            })?;
            versions.insert(file.payment.version);
        }

        Ok(versions)
    }

    // ── Internal helpers ──────────────────────────────────────────────────

    fn load_row(
        &self,
        referee: &RefereeId,
        certification: &Certification,
    ) -> Result<RefereeCertification> {
        let path = self.certification_path(referee, certification);
        if !path.exists() {
            return Err(CertError::NotFound(format!(
                "certification {certification} for referee {referee}"
            )));
        }

        let bytes = std::fs::read(&path)?;
        let file: CertificationFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse certification file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.record)
    }

    fn certification_path(&self, referee: &RefereeId, cert: &Certification) -> PathBuf {
        self.base_dir
            .join(CERTIFICATIONS_DIR)
            .join(&referee.0)
            .join(format!("{}_{}.json", cert.level, cert.version))
    }

    fn payment_path(&self, referee: &RefereeId, version: Version) -> PathBuf {
        self.base_dir
            .join(PAYMENTS_DIR)
            .join(&referee.0)
            .join(format!("{version}.json"))
    }
}
