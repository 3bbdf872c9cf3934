//! The referee context read port.
//!
//! Eligibility and grading consume referee state through this port and
//! never write through it. The store-backed implementation assembles a
//! fresh snapshot on every call so the context reflects the latest
//! committed state.

use crate::error::Result;
use crate::storage::{AttemptStore, CertificationStore, RefereeStore};

use super::types::{RefereeContext, RefereeId};

/// Read-only port resolving a referee's full context.
pub trait RefereeContextProvider {
    /// Resolve the context snapshot for a referee.
    ///
    /// # Errors
    ///
    /// Returns `CertError::RefereeNotFound` when the referee does not
    /// exist — a fatal precondition for the whole eligibility query, not a
    /// per-policy verdict.
    fn context(&self, referee: &RefereeId) -> Result<RefereeContext>;
}

/// [`RefereeContextProvider`] backed by the storage stores.
pub struct StoreContextProvider<'a> {
    referees: &'a RefereeStore,
    certifications: &'a CertificationStore,
    attempts: &'a AttemptStore,
}

impl<'a> StoreContextProvider<'a> {
    pub fn new(
        referees: &'a RefereeStore,
        certifications: &'a CertificationStore,
        attempts: &'a AttemptStore,
    ) -> Self {
        Self {
            referees,
            certifications,
            attempts,
        }
    }
}

impl RefereeContextProvider for StoreContextProvider<'_> {
    fn context(&self, referee: &RefereeId) -> Result<RefereeContext> {
        let profile = self.referees.load(referee)?;

        let certifications = self
            .certifications
            .list_for_referee(referee)?
            .into_iter()
            .filter(|c| c.is_active())
            .collect();
        let head_certifications_paid = self.certifications.paid_versions(referee)?;
        let test_attempts = self.attempts.attempts_for_referee(referee)?;

        Ok(RefereeContext {
            referee: profile.id,
            language: profile.language,
            certifications,
            head_certifications_paid,
            test_attempts,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{Certification, Level, TestId, Version};
    use crate::context::{CertificationPayment, RefereeCertification, RefereeProfile, TestAttempt};
    use crate::error::CertError;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(day: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 6, day, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_context_assembles_all_edges() {
        let dir = tempfile::tempdir().unwrap();
        let referees = RefereeStore::new(dir.path()).unwrap();
        let certifications = CertificationStore::new(dir.path()).unwrap();
        let attempts = AttemptStore::new(dir.path()).unwrap();

        let referee = RefereeId("ref1".into());
        referees
            .save(&RefereeProfile {
                id: referee.clone(),
                name: "Alex".into(),
                language: Some("en".into()),
            })
            .unwrap();

        let assistant = Certification::new(Level::Assistant, Version::Twenty);
        certifications
            .save_certification(&RefereeCertification::new(referee.clone(), assistant, at(1)))
            .unwrap();

        // A revoked cert must not appear in the snapshot.
        let flag = Certification::new(Level::Flag, Version::Twenty);
        certifications
            .save_certification(&RefereeCertification::new(referee.clone(), flag, at(2)))
            .unwrap();
        certifications.revoke(&referee, &flag, at(3)).unwrap();

        certifications
            .save_payment(&CertificationPayment {
                referee: referee.clone(),
                version: Version::Twenty,
                created_at: at(4),
            })
            .unwrap();

        attempts
            .save_attempt(&TestAttempt::start(
                TestId("t1".into()),
                referee.clone(),
                Level::Assistant,
                at(5),
            ))
            .unwrap();

        let provider = StoreContextProvider::new(&referees, &certifications, &attempts);
        let ctx = provider.context(&referee).unwrap();

        assert_eq!(ctx.language.as_deref(), Some("en"));
        assert!(ctx.holds(&assistant));
        assert!(!ctx.holds(&flag));
        assert!(ctx.paid_for(Version::Twenty));
        assert_eq!(ctx.test_attempts.len(), 1);
    }

    #[test]
    fn test_unknown_referee_is_fatal() {
        let dir = tempfile::tempdir().unwrap();
        let referees = RefereeStore::new(dir.path()).unwrap();
        let certifications = CertificationStore::new(dir.path()).unwrap();
        let attempts = AttemptStore::new(dir.path()).unwrap();

        let provider = StoreContextProvider::new(&referees, &certifications, &attempts);
        let result = provider.context(&RefereeId("ghost".into()));
        assert!(matches!(result, Err(CertError::RefereeNotFound(_))));
    }
}
