//! Integration test: background grading jobs.
//!
//! Verifies that a burst of duplicate submissions for one referee and
//! level is serialized down to exactly one durable result, while
//! submissions for different referees grade independently.

use std::sync::Arc;

use chrono::{DateTime, Duration, TimeZone, Utc};

use referee_certification::catalog::{
    Answer, AnswerId, Certification, Level, Question, QuestionId, TestBuilder, TestId, Version,
};
use referee_certification::context::{RefereeId, RefereeProfile};
use referee_certification::error::CertError;
use referee_certification::grading::{
    GradingEngine, GradingScheduler, SubmittedAnswer, TestSubmission,
};
use referee_certification::notify::NullNotifier;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn seed_scheduler(dir: &std::path::Path, referees: &[&str]) -> GradingScheduler {
    let engine = GradingEngine::new(dir, Box::new(NullNotifier)).unwrap();

    let test = TestBuilder::new("assistant-twenty", "Assistant test")
        .awards(Certification::new(Level::Assistant, Version::Twenty))
        .build();
    engine.tests().save_test(&test).unwrap();

    let questions: Vec<Question> = (1..=4)
        .map(|n| Question {
            id: QuestionId(format!("q{n}")),
            test: test.id.clone(),
            prompt: format!("question {n}"),
            points: 1,
            answers: vec![Answer {
                id: AnswerId(format!("q{n}-right")),
                text: "right".into(),
                correct: true,
            }],
        })
        .collect();
    engine.tests().save_questions(&test.id, &questions).unwrap();

    for referee in referees {
        engine
            .referees()
            .save(&RefereeProfile {
                id: RefereeId((*referee).into()),
                name: (*referee).into(),
                language: None,
            })
            .unwrap();
    }

    GradingScheduler::new(Arc::new(engine))
}

fn submission_for(referee: &str) -> TestSubmission {
    let answers = (1..=4)
        .map(|n| SubmittedAnswer {
            question: Some(QuestionId(format!("q{n}"))),
            answer: Some(AnswerId(format!("q{n}-right"))),
        })
        .collect();
    TestSubmission {
        test: TestId("assistant-twenty".into()),
        referee: RefereeId(referee.into()),
        started_at: base_time(),
        finished_at: base_time() + Duration::minutes(12),
        answers,
        skip_notification: true,
    }
}

#[tokio::test]
async fn duplicate_submission_burst_produces_one_result() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = seed_scheduler(dir.path(), &["alex"]);
    let now = base_time() + Duration::minutes(13);

    let handles: Vec<_> = (0..4)
        .map(|_| scheduler.submit(submission_for("alex"), now).unwrap())
        .collect();

    let mut produced = 0;
    let mut skipped = 0;
    for handle in handles {
        match handle.wait().await.unwrap() {
            Some(result) => {
                produced += 1;
                assert!(result.passed);
                assert_eq!(result.percentage, 100);
                assert_eq!(result.duration, "12:00");
            }
            None => skipped += 1,
        }
    }
    assert_eq!(produced, 1);
    assert_eq!(skipped, 3);
}

#[tokio::test]
async fn distinct_referees_grade_concurrently() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = seed_scheduler(dir.path(), &["alex", "sam", "kim"]);
    let now = base_time() + Duration::minutes(13);

    let handles: Vec<_> = ["alex", "sam", "kim"]
        .iter()
        .map(|r| scheduler.submit(submission_for(r), now).unwrap())
        .collect();

    for handle in handles {
        let result = handle.wait().await.unwrap();
        assert!(result.is_some());
    }
}

#[tokio::test]
async fn unknown_test_is_rejected_before_the_job_starts() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = seed_scheduler(dir.path(), &["alex"]);

    let mut submission = submission_for("alex");
    submission.test = TestId("missing".into());
    let outcome = scheduler.submit(submission, base_time());
    assert!(matches!(outcome, Err(CertError::TestNotFound(_))));
}

#[tokio::test]
async fn unknown_referee_surfaces_as_a_job_error() {
    let dir = tempfile::tempdir().unwrap();
    let scheduler = seed_scheduler(dir.path(), &["alex"]);

    let handle = scheduler
        .submit(submission_for("ghost"), base_time() + Duration::minutes(13))
        .unwrap();
    let outcome = handle.wait().await;
    assert!(matches!(outcome, Err(CertError::RefereeNotFound(_))));
}
