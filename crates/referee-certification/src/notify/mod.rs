//! Result notification port.
//!
//! Grading schedules a notification after persisting a result and never
//! waits on delivery. A notifier failure is logged by the engine and must
//! not roll back or fail the grading call.

use crate::context::{RefereeId, TestAttempt};
use crate::error::Result;
use crate::grading::TestResult;

/// Outbound port for "your result is ready" notifications.
pub trait ResultNotifier: Send + Sync {
    /// Schedule a notification carrying the referee, attempt, and result.
    fn schedule_result_notification(
        &self,
        referee: &RefereeId,
        attempt: &TestAttempt,
        result: &TestResult,
    ) -> Result<()>;
}

/// Notifier that records the event in the log. The default wiring until a
/// delivery channel is configured.
pub struct LogNotifier;

impl ResultNotifier for LogNotifier {
    fn schedule_result_notification(
        &self,
        referee: &RefereeId,
        attempt: &TestAttempt,
        result: &TestResult,
    ) -> Result<()> {
        log::info!(
            "result notification scheduled: referee={referee} attempt={} result={} passed={}",
            attempt.id,
            result.id,
            result.passed
        );
        Ok(())
    }
}

/// Notifier that drops everything. For tests and batch regrades.
pub struct NullNotifier;

impl ResultNotifier for NullNotifier {
    fn schedule_result_notification(
        &self,
        _referee: &RefereeId,
        _attempt: &TestAttempt,
        _result: &TestResult,
    ) -> Result<()> {
        Ok(())
    }
}
