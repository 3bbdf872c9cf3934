//! Certification catalog — immutable descriptions of certifications and tests.
//!
//! The catalog module provides:
//! - Certification levels and their progression rules
//! - Ordered rulebook versions
//! - `(Level, Version)` certification value objects
//! - Test definitions with pass bars, time limits, and awarded certifications
//! - Questions and answers with binary per-question scoring

pub mod certification;

pub use certification::{Certification, Level, Version};
pub use test::{
    Answer, AnswerId, Question, QuestionChoicePolicy, QuestionId, Test, TestBuilder, TestId,
};
