//! Storage layer for catalog, referee, attempt, and result records.
//!
//! Each store persists one record per JSON file under a versioned wrapper.
//!
//! # Directory layout
//!
//! All stores share a common root:
//!
//! ```text
//! {root}/
//! ├── referees/
//! │   └── {referee_id}.json
//! ├── tests/
//! │   └── {test_id}.json
//! ├── questions/
//! │   └── {test_id}.json
//! ├── certifications/
//! │   └── {referee_id}/
//! │       └── {level}_{version}.json
//! ├── payments/
//! │   └── {referee_id}/
//! │       └── {version}.json
//! ├── attempts/
//! │   └── {attempt_id}.json
//! ├── answers/
//! │   └── {attempt_id}.json
//! └── results/
//!     └── {referee_id}/
//!         └── {level}_{date}.json
//! ```
//!
//! The `results/` file naming carries the per-(referee, level, day)
//! uniqueness constraint: a second result for the same key maps to the same
//! path and is refused, which backstops the grading idempotency guard.
//!
//! # Modules
//!
//! - [`referee_store`] — referee profiles (the referee-exists precondition).
//! - [`test_store`] — test definitions and their question sets.
//! - [`certification_store`] — acquired certifications and Head payments.
//! - [`attempt_store`] — test attempts and recorded answers.
//! - [`result_store`] — durable test results, unique per referee/level/day.

pub mod attempt_store;
pub mod certification_store;
pub mod referee_store;
pub mod result_store;
pub mod test_store;

pub use attempt_store::AttemptStore;
pub use certification_store::CertificationStore;
pub use referee_store::RefereeStore;
pub use result_store::ResultStore;
pub use test_store::TestStore;

/// Format version written into every store file.
pub(crate) const STORE_FILE_VERSION: u32 = 1;
