//! Certification levels, rulebook versions, and the `(Level, Version)` pair.

use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Level
// ---------------------------------------------------------------------------

/// A rung in the referee progression.
///
/// `Assistant`, `Flag` (the snitch referee), and `Head` form a strict
/// progression within one rulebook version. `Scorekeeper` is orthogonal
/// and has no prerequisite.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Level {
    Assistant,
    Flag,
    Head,
    Scorekeeper,
}

impl Level {
    /// The level a referee must already hold (same version) before
    /// attempting this one.
    pub fn prerequisite(&self) -> Option<Level> {
        match self {
            Level::Assistant => None,
            Level::Flag => Some(Level::Assistant),
            Level::Head => Some(Level::Flag),
            Level::Scorekeeper => None,
        }
    }

    /// Whether tests awarding this level are gated on a completed
    /// certification payment for the test's version.
    pub fn requires_payment(&self) -> bool {
        matches!(self, Level::Head)
    }

    /// The levels that make up the full progression of a version family,
    /// in prerequisite order. Scorekeeper is not part of the progression.
    pub fn progression() -> [Level; 3] {
        [Level::Assistant, Level::Flag, Level::Head]
    }
}

impl std::fmt::Display for Level {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Level::Assistant => "assistant",
            Level::Flag => "flag",
            Level::Head => "head",
            Level::Scorekeeper => "scorekeeper",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Version
// ---------------------------------------------------------------------------

/// A rulebook epoch under which certifications and tests are defined.
///
/// Versions are totally ordered: `Eighteen < Twenty < TwentyTwo`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum Version {
    Eighteen,
    Twenty,
    TwentyTwo,
}

impl std::fmt::Display for Version {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Version::Eighteen => "eighteen",
            Version::Twenty => "twenty",
            Version::TwentyTwo => "twenty_two",
        };
        write!(f, "{name}")
    }
}

// ---------------------------------------------------------------------------
// Certification
// ---------------------------------------------------------------------------

/// A `(Level, Version)` pair — the unit a referee acquires, a test awards,
/// and a payment unlocks. Immutable; equality by value.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Certification {
    pub level: Level,
    pub version: Version,
}

impl Certification {
    pub fn new(level: Level, version: Version) -> Self {
        Self { level, version }
    }

    /// The certification that must be held (same version) before this one
    /// can be attempted.
    pub fn prerequisite(&self) -> Option<Certification> {
        self.level
            .prerequisite()
            .map(|level| Certification::new(level, self.version))
    }
}

impl std::fmt::Display for Certification {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.level, self.version)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
