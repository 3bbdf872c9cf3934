//! The grading engine — turns a finished submission into a durable result.
//!
//! Grading is the only mutating path of the system. It resolves or creates
//! the authoritative attempt row, records the valid answers, scores them,
//! persists at most one result per `(referee, level, calendar day)`, awards
//! certifications on pass, and schedules the result notification.

use std::path::Path;

use chrono::{DateTime, Utc};

use crate::catalog::{Level, Question, Test, TestId};
use crate::config::EligibilityOptions;
use crate::context::{FinishMethod, RefereeCertification, TestAttempt};
use crate::error::{CertError, Result};
use crate::notify::ResultNotifier;
use crate::storage::{AttemptStore, CertificationStore, RefereeStore, ResultStore, TestStore};

use super::types::{format_duration, RefereeAnswer, TestResult, TestSubmission};

/// Grades finished submissions against the stores rooted at one directory.
pub struct GradingEngine {
    tests: TestStore,
    referees: RefereeStore,
    attempts: AttemptStore,
    results: ResultStore,
    certifications: CertificationStore,
    notifier: Box<dyn ResultNotifier>,
    options: EligibilityOptions,
}

impl GradingEngine {
    /// Create an engine over the stores rooted at `base_dir`.
    ///
    /// # Errors
    ///
    /// Returns `CertError::Io` if a store directory cannot be created.
    pub fn new(base_dir: impl AsRef<Path>, notifier: Box<dyn ResultNotifier>) -> Result<Self> {
        Self::with_options(base_dir, notifier, EligibilityOptions::default())
    }

    pub fn with_options(
        base_dir: impl AsRef<Path>,
        notifier: Box<dyn ResultNotifier>,
        options: EligibilityOptions,
    ) -> Result<Self> {
        let base_dir = base_dir.as_ref();
        Ok(Self {
            tests: TestStore::new(base_dir)?,
            referees: RefereeStore::new(base_dir)?,
            attempts: AttemptStore::new(base_dir)?,
            results: ResultStore::new(base_dir)?,
            certifications: CertificationStore::new(base_dir)?,
            notifier,
            options,
        })
    }

    pub fn tests(&self) -> &TestStore {
        &self.tests
    }

    pub fn referees(&self) -> &RefereeStore {
        &self.referees
    }

    pub fn attempts(&self) -> &AttemptStore {
        &self.attempts
    }

    pub fn results(&self) -> &ResultStore {
        &self.results
    }

    pub fn certifications(&self) -> &CertificationStore {
        &self.certifications
    }

    /// The certification level a test examines.
    ///
    /// # Errors
    ///
    /// Returns `CertError::TestNotFound` for an unknown test and
    /// `CertError::MisconfiguredTest` for a test awarding nothing.
    pub fn test_level(&self, test: &TestId) -> Result<Level> {
        let test = self.tests.load_test(test)?;
        test.certification_level()
            .ok_or_else(|| CertError::MisconfiguredTest(test.id.0.clone()))
    }

    /// Grade a finished submission at `now`.
    ///
    /// Returns `Ok(None)` when a result already exists for the same
    /// `(referee, level, calendar day)` — retried jobs and duplicate
    /// submissions resolve to "already graded," never to a second result.
    ///
    /// # Errors
    ///
    /// An unknown test or referee is fatal and aborts grading with no
    /// partial persistence beyond the attempt row itself.
    pub fn grade(&self, submission: &TestSubmission, now: DateTime<Utc>) -> Result<Option<TestResult>> {
        let test = self.tests.load_test(&submission.test)?;
        self.referees.load(&submission.referee)?;
        let level = test
            .certification_level()
            .ok_or_else(|| CertError::MisconfiguredTest(test.id.0.clone()))?;

        let mut attempt = self.resolve_attempt(submission, level)?;

        let recorded = Self::collect_answers(&attempt, submission);
        self.attempts.record_answers(&attempt.id, &recorded)?;

        let questions = self.tests.load_questions(&test.id)?;
        let (points_scored, points_available) = Self::score(&recorded, &questions);

        if self
            .results
            .exists_for_day(&submission.referee, level, now.date_naive())
        {
            log::debug!(
                "skipping grading for referee {}: result already exists for {level} on {}",
                submission.referee,
                now.date_naive()
            );
            return Ok(None);
        }

        let percentage = if points_available == 0 {
            0
        } else {
            (f64::from(points_scored) / f64::from(points_available) * 100.0).round() as u32
        };
        let elapsed = submission.finished_at - submission.started_at;
        let over_time_limit = elapsed > test.time_limit();
        let passed = percentage >= u32::from(test.pass_percentage) && !over_time_limit;

        let method = if over_time_limit {
            FinishMethod::Timeout
        } else {
            FinishMethod::Submitted
        };
        attempt.finish(
            submission.finished_at,
            method,
            points_scored,
            passed,
            test.pass_percentage,
        );
        self.attempts.save_attempt(&attempt)?;

        let result = TestResult::new(
            submission.referee.clone(),
            attempt.id.clone(),
            level,
            format_duration(elapsed),
            percentage,
            points_scored,
            points_available,
            passed,
            test.pass_percentage,
            now,
        );
        if !self.results.save_result(&result)? {
            log::debug!(
                "result for referee {} at {level} on {} lost the write race",
                submission.referee,
                now.date_naive()
            );
            return Ok(None);
        }

        if passed {
            self.award_certifications(&test, &attempt, now)?;
        }

        if !submission.skip_notification {
            if let Err(e) = self
                .notifier
                .schedule_result_notification(&submission.referee, &attempt, &result)
            {
                log::warn!(
                    "result notification for referee {} failed: {e}",
                    submission.referee
                );
            }
        }

        log::info!(
            "graded attempt {} for referee {}: {percentage}% ({points_scored}/{points_available}), passed={passed}",
            attempt.id,
            submission.referee
        );
        Ok(Some(result))
    }

    /// Reuse the referee's in-progress attempt at this level when the
    /// submission starts inside its cooldown window (the same sitting);
    /// otherwise open a fresh attempt row.
    fn resolve_attempt(&self, submission: &TestSubmission, level: Level) -> Result<TestAttempt> {
        if let Some(previous) = self
            .attempts
            .latest_attempt_at_level(&submission.referee, level)?
        {
            let same_sitting = !previous.is_finished()
                && submission.started_at < previous.cooldown_start() + self.options.cooldown;
            if same_sitting {
                return Ok(previous);
            }
        }

        let attempt = TestAttempt::start(
            submission.test.clone(),
            submission.referee.clone(),
            level,
            submission.started_at,
        );
        self.attempts.save_attempt(&attempt)?;
        Ok(attempt)
    }

    /// Keep the well-formed `(question, answer)` pairs; malformed entries
    /// are dropped without aborting the rest of the submission.
    fn collect_answers(attempt: &TestAttempt, submission: &TestSubmission) -> Vec<RefereeAnswer> {
        submission
            .answers
            .iter()
            .filter_map(|pair| match (&pair.question, &pair.answer) {
                (Some(question), Some(answer)) => Some(RefereeAnswer {
                    attempt: attempt.id.clone(),
                    question: question.clone(),
                    answer: answer.clone(),
                }),
                _ => {
                    log::debug!(
                        "skipping malformed answer pair on attempt {}",
                        attempt.id
                    );
                    None
                }
            })
            .collect()
    }

    /// Binary per-question scoring: full points for a correct choice, zero
    /// otherwise. Answers referencing unknown questions are ignored.
    fn score(recorded: &[RefereeAnswer], questions: &[Question]) -> (u32, u32) {
        let mut scored = 0;
        let mut available = 0;

        for answer in recorded {
            let Some(question) = questions.iter().find(|q| q.id == answer.question) else {
                continue;
            };
            available += question.points;
            let correct = question
                .answers
                .iter()
                .any(|a| a.id == answer.answer && a.correct);
            if correct {
                scored += question.points;
            }
        }

        (scored, available)
    }

    fn award_certifications(
        &self,
        test: &Test,
        attempt: &TestAttempt,
        now: DateTime<Utc>,
    ) -> Result<()> {
        for certification in &test.awarded_certifications {
            if self.certifications.is_held(&attempt.referee, certification)? {
                continue;
            }
            self.certifications.save_certification(&RefereeCertification::new(
                attempt.referee.clone(),
                *certification,
                now,
            ))?;
            log::info!(
                "awarded {certification} to referee {}",
                attempt.referee
            );
        }
        Ok(())
    }
}
