//! Candidate-set resolution — the "tests available to me" listing.
//!
//! Rather than checking every test in the catalog against every policy,
//! the resolver first narrows the catalog structurally per rulebook
//! version (next attainable level, Scorekeeper, recertification paths),
//! then runs the full checker over the survivors, then applies the
//! language filter once over the whole set.

use std::collections::{BTreeSet, HashSet};

use chrono::{DateTime, Utc};

use crate::catalog::{Certification, Level, Test, Version};
use crate::context::RefereeContext;

use super::checker::EligibilityChecker;

/// Resolve the tests currently offered to a referee.
///
/// `tests` is the full catalog; inactive tests are never offered. The
/// returned set contains at most one test per `(level, version)` pair,
/// preferring initial-certification tests over recertification tests.
pub fn find_available_tests(
    checker: &EligibilityChecker,
    ctx: &RefereeContext,
    tests: &[Test],
    now: DateTime<Utc>,
) -> Vec<Test> {
    let active: Vec<&Test> = tests.iter().filter(|t| t.is_active).collect();

    let mut candidates: Vec<&Test> = Vec::new();
    let mut seen: HashSet<&str> = HashSet::new();
    for version in relevant_versions(ctx, &active) {
        for test in structural_candidates(ctx, &active, version) {
            if seen.insert(test.id.0.as_str()) {
                candidates.push(test);
            }
        }
    }

    let eligible: Vec<&Test> = candidates
        .into_iter()
        .filter(|t| checker.check(t, ctx, now).is_eligible())
        .collect();

    let filtered = filter_by_language(ctx, eligible);
    dedupe_per_level_version(filtered)
}

/// Every rulebook version mentioned by the active catalog or held by the
/// referee.
fn relevant_versions(ctx: &RefereeContext, active: &[&Test]) -> BTreeSet<Version> {
    let mut versions: BTreeSet<Version> = active
        .iter()
        .flat_map(|t| t.awarded_certifications.iter().map(|c| c.version))
        .collect();
    versions.extend(ctx.certifications.iter().map(|c| c.certification.version));
    versions
}

/// The structurally plausible tests of one version, before policy checks.
fn structural_candidates<'a>(
    ctx: &RefereeContext,
    active: &[&'a Test],
    version: Version,
) -> Vec<&'a Test> {
    let mut out = Vec::new();

    let next = next_attainable_level(ctx, version);
    match next {
        Some(level) => {
            // Progression incomplete: offer the single next rung.
            out.extend(active.iter().copied().filter(|t| {
                !t.is_recertification()
                    && t.awards(&Certification::new(level, version))
            }));
        }
        None => {
            // Every rung held for this version: offer the paths renewing
            // its certifications, but only toward a version newer than
            // the one the referee most recently certified at for that
            // level. Same-cycle recertification is never offered.
            out.extend(active.iter().copied().filter(|t| {
                t.recertification_for
                    .map(|renewed| {
                        ctx.holds(&Certification::new(renewed.level, version))
                            && ctx
                                .latest_version_of(renewed.level)
                                .map(|held| held < renewed.version)
                                .unwrap_or(false)
                    })
                    .unwrap_or(false)
            }));
        }
    }

    // Scorekeeper is orthogonal and offered for every version.
    out.extend(active.iter().copied().filter(|t| {
        !t.is_recertification() && t.awards(&Certification::new(Level::Scorekeeper, version))
    }));

    out
}

/// The next rung of the Assistant → Flag → Head progression for `version`,
/// or `None` when every rung is already held.
fn next_attainable_level(ctx: &RefereeContext, version: Version) -> Option<Level> {
    Level::progression()
        .into_iter()
        .find(|level| !ctx.holds(&Certification::new(*level, version)))
}

/// Language filter, applied once over the whole candidate set: when any
/// candidate matches the referee's selected language, only those are
/// offered; otherwise the set passes through unfiltered.
fn filter_by_language<'a>(ctx: &RefereeContext, candidates: Vec<&'a Test>) -> Vec<&'a Test> {
    let Some(language) = &ctx.language else {
        return candidates;
    };

    let any_match = candidates
        .iter()
        .any(|t| t.language.as_deref() == Some(language.as_str()));
    if !any_match {
        return candidates;
    }

    candidates
        .into_iter()
        .filter(|t| t.language.as_deref() == Some(language.as_str()))
        .collect()
}

/// At most one test per `(level, version)`, preferring initial tests over
/// recertification tests.
fn dedupe_per_level_version(candidates: Vec<&Test>) -> Vec<Test> {
    let mut kept: Vec<&Test> = Vec::new();
    let mut taken: HashSet<(Level, Version)> = HashSet::new();

    let (initial, recert): (Vec<&Test>, Vec<&Test>) = candidates
        .into_iter()
        .partition(|t| !t.is_recertification());

    for test in initial.into_iter().chain(recert) {
        let Some(cert) = test.awarded_certifications.first() else {
            continue;
        };
        if taken.insert((cert.level, cert.version)) {
            kept.push(test);
        }
    }

    kept.into_iter().cloned().collect()
}
