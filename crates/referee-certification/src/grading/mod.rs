//! Grading — from finished submission to durable, idempotent result.

mod engine;
mod job;
mod types;

pub use engine::GradingEngine;
pub use job::{GradingJobHandle, GradingScheduler, JobId};
pub use types::{RefereeAnswer, ResultId, SubmittedAnswer, TestResult, TestSubmission};
