//! Integration test: full certification lifecycle.
//!
//! Walks one referee through a rulebook version:
//! 1. Seed the catalog and the referee
//! 2. Check the fresh referee's available tests and verdicts
//! 3. Pass the Assistant test and verify the award
//! 4. Progress to Flag, then unlock Head via payment
//! 5. Complete the version and verify the listing moves on

use chrono::{DateTime, Duration, TimeZone, Utc};

use referee_certification::catalog::{
    Answer, AnswerId, Certification, Level, Question, QuestionId, TestBuilder, TestId, Version,
};
use referee_certification::context::{
    CertificationPayment, RefereeContextProvider, RefereeId, RefereeProfile, StoreContextProvider,
};
use referee_certification::eligibility::{find_available_tests, EligibilityChecker, Verdict};
use referee_certification::grading::{GradingEngine, SubmittedAnswer, TestSubmission};
use referee_certification::notify::NullNotifier;

fn base_time() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2024, 6, 1, 9, 0, 0).unwrap()
}

fn referee() -> RefereeId {
    RefereeId("alex".into())
}

fn questions_for(test: &TestId) -> Vec<Question> {
    (1..=5)
        .map(|n| Question {
            id: QuestionId(format!("{test}-q{n}")),
            test: test.clone(),
            prompt: format!("question {n}"),
            points: 1,
            answers: vec![
                Answer {
                    id: AnswerId(format!("{test}-q{n}-right")),
                    text: "right".into(),
                    correct: true,
                },
                Answer {
                    id: AnswerId(format!("{test}-q{n}-wrong")),
                    text: "wrong".into(),
                    correct: false,
                },
            ],
        })
        .collect()
}

fn perfect_submission(test: &str, started_at: DateTime<Utc>) -> TestSubmission {
    let test = TestId(test.into());
    let answers = (1..=5)
        .map(|n| SubmittedAnswer {
            question: Some(QuestionId(format!("{test}-q{n}"))),
            answer: Some(AnswerId(format!("{test}-q{n}-right"))),
        })
        .collect();
    TestSubmission {
        test,
        referee: referee(),
        started_at,
        finished_at: started_at + Duration::minutes(15),
        answers,
        skip_notification: true,
    }
}

fn seed_catalog(engine: &GradingEngine) -> Vec<referee_certification::catalog::Test> {
    let mut tests = Vec::new();
    for (id, level) in [
        ("assistant-twenty", Level::Assistant),
        ("flag-twenty", Level::Flag),
        ("head-twenty", Level::Head),
        ("scorekeeper-twenty", Level::Scorekeeper),
    ] {
        let test = TestBuilder::new(id, format!("{level} test (twenty)"))
            .awards(Certification::new(level, Version::Twenty))
            .build();
        engine.tests().save_test(&test).unwrap();
        engine
            .tests()
            .save_questions(&test.id, &questions_for(&test.id))
            .unwrap();
        tests.push(test);
    }
    tests
}

fn available_ids(
    engine: &GradingEngine,
    checker: &EligibilityChecker,
    now: DateTime<Utc>,
) -> Vec<String> {
    let provider = StoreContextProvider::new(
        engine.referees(),
        engine.certifications(),
        engine.attempts(),
    );
    let ctx = provider.context(&referee()).unwrap();
    let catalog = engine.tests().list_tests().unwrap();
    let mut ids: Vec<String> = find_available_tests(checker, &ctx, &catalog, now)
        .into_iter()
        .map(|t| t.id.0)
        .collect();
    ids.sort();
    ids
}

#[test]
fn full_certification_lifecycle() {
    let dir = tempfile::tempdir().unwrap();
    let engine = GradingEngine::new(dir.path(), Box::new(NullNotifier)).unwrap();
    let checker = EligibilityChecker::default();

    // ── Step 1: Seed the catalog and the referee ────────────────────────
    let catalog = seed_catalog(&engine);
    engine
        .referees()
        .save(&RefereeProfile {
            id: referee(),
            name: "Alex".into(),
            language: None,
        })
        .unwrap();

    let provider = StoreContextProvider::new(
        engine.referees(),
        engine.certifications(),
        engine.attempts(),
    );

    // ── Step 2: Fresh referee sees Assistant and Scorekeeper only ───────
    let now = base_time();
    assert_eq!(
        available_ids(&engine, &checker, now),
        vec!["assistant-twenty", "scorekeeper-twenty"]
    );

    let flag = catalog.iter().find(|t| t.id.0 == "flag-twenty").unwrap();
    let head = catalog.iter().find(|t| t.id.0 == "head-twenty").unwrap();
    assert_eq!(
        checker.check_referee(&provider, flag, &referee(), now).unwrap(),
        Verdict::MissingPrerequisite
    );
    assert_eq!(
        checker.check_referee(&provider, head, &referee(), now).unwrap(),
        Verdict::MissingPrerequisite
    );

    // ── Step 3: Pass the Assistant test ─────────────────────────────────
    let result = engine
        .grade(&perfect_submission("assistant-twenty", now), now + Duration::minutes(16))
        .unwrap()
        .expect("assistant grading should produce a result");
    assert!(result.passed);
    assert_eq!(result.percentage, 100);

    let assistant = Certification::new(Level::Assistant, Version::Twenty);
    assert!(engine.certifications().is_held(&referee(), &assistant).unwrap());

    // The listing moves to Flag; the Assistant test is no longer offered.
    let next_day = now + Duration::days(1) + Duration::hours(1);
    assert_eq!(
        available_ids(&engine, &checker, next_day),
        vec!["flag-twenty", "scorekeeper-twenty"]
    );

    let ctx = provider.context(&referee()).unwrap();
    let assistant_test = catalog.iter().find(|t| t.id.0 == "assistant-twenty").unwrap();
    assert_eq!(
        checker.check(assistant_test, &ctx, next_day),
        Verdict::AlreadyCertified
    );

    // Right after the pass the Assistant-level cooldown is still active,
    // but Flag is a different level and unaffected.
    let right_after = now + Duration::hours(2);
    let ctx = provider.context(&referee()).unwrap();
    assert_eq!(checker.check(flag, &ctx, right_after), Verdict::Eligible);

    // ── Step 4: Pass Flag, then unlock Head via payment ─────────────────
    engine
        .grade(
            &perfect_submission("flag-twenty", next_day),
            next_day + Duration::minutes(16),
        )
        .unwrap()
        .expect("flag grading should produce a result");

    let day_three = next_day + Duration::days(1) + Duration::hours(1);
    let ctx = provider.context(&referee()).unwrap();
    assert_eq!(checker.check(head, &ctx, day_three), Verdict::PaymentRequired);
    assert!(!available_ids(&engine, &checker, day_three).contains(&"head-twenty".into()));

    engine
        .certifications()
        .save_payment(&CertificationPayment {
            referee: referee(),
            version: Version::Twenty,
            created_at: day_three,
        })
        .unwrap();

    let ctx = provider.context(&referee()).unwrap();
    assert_eq!(checker.check(head, &ctx, day_three), Verdict::Eligible);
    assert!(available_ids(&engine, &checker, day_three).contains(&"head-twenty".into()));

    // ── Step 5: Complete the version ────────────────────────────────────
    engine
        .grade(
            &perfect_submission("head-twenty", day_three),
            day_three + Duration::minutes(16),
        )
        .unwrap()
        .expect("head grading should produce a result");

    // A second head grading the same day is an idempotent no-op.
    assert!(engine
        .grade(
            &perfect_submission("head-twenty", day_three),
            day_three + Duration::minutes(20),
        )
        .unwrap()
        .is_none());

    // Only Scorekeeper remains; the progression for Twenty is finished and
    // no recertification path exists in this catalog.
    let day_four = day_three + Duration::days(1) + Duration::hours(1);
    assert_eq!(
        available_ids(&engine, &checker, day_four),
        vec!["scorekeeper-twenty"]
    );

    for level in [Level::Assistant, Level::Flag, Level::Head] {
        let cert = Certification::new(level, Version::Twenty);
        assert!(engine.certifications().is_held(&referee(), &cert).unwrap());
    }
}

#[test]
fn recertification_opens_after_completing_an_older_version() {
    let dir = tempfile::tempdir().unwrap();
    let engine = GradingEngine::new(dir.path(), Box::new(NullNotifier)).unwrap();
    let checker = EligibilityChecker::default();

    engine
        .referees()
        .save(&RefereeProfile {
            id: referee(),
            name: "Alex".into(),
            language: None,
        })
        .unwrap();

    // The referee completed the Eighteen progression administratively.
    let now = base_time();
    for level in [Level::Assistant, Level::Flag, Level::Head] {
        engine
            .certifications()
            .save_certification(&referee_certification::context::RefereeCertification::new(
                referee(),
                Certification::new(level, Version::Eighteen),
                now - Duration::days(400),
            ))
            .unwrap();
    }

    let recert = TestBuilder::new("recert-assistant-twenty", "Assistant recertification")
        .awards(Certification::new(Level::Assistant, Version::Twenty))
        .recertification_for(Certification::new(Level::Assistant, Version::Twenty))
        .build();
    engine.tests().save_test(&recert).unwrap();
    let eighteen_recert = TestBuilder::new("recert-assistant-eighteen", "Stale recertification")
        .awards(Certification::new(Level::Assistant, Version::Eighteen))
        .recertification_for(Certification::new(Level::Assistant, Version::Eighteen))
        .build();
    engine.tests().save_test(&eighteen_recert).unwrap();

    let ids = available_ids(&engine, &checker, now);

    // Only the recertification toward the newer version is offered; the
    // referee cannot recertify within the cycle they certified in.
    assert_eq!(ids, vec!["recert-assistant-twenty"]);

    let provider = StoreContextProvider::new(
        engine.referees(),
        engine.certifications(),
        engine.attempts(),
    );
    let ctx = provider.context(&referee()).unwrap();
    assert_eq!(checker.check(&recert, &ctx, now), Verdict::Eligible);
}
