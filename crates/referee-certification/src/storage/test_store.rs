//! Test definition and question persistence.
//!
//! Tests live at `{root}/tests/{test_id}.json`; their question sets at
//! `{root}/questions/{test_id}.json`. A test with no question file grades
//! as an empty question set rather than failing.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::catalog::{Question, Test, TestId};
use crate::error::{CertError, Result};

use super::STORE_FILE_VERSION;

const TESTS_DIR: &str = "tests";
const QUESTIONS_DIR: &str = "questions";

/// Wrapper written to disk for each test definition.
#[derive(Debug, Serialize, Deserialize)]
struct TestFile {
    version: u32,
    test: Test,
}

/// Wrapper written to disk for a test's question set.
#[derive(Debug, Serialize, Deserialize)]
struct QuestionSetFile {
    version: u32,
    questions: Vec<Question>,
}

/// Filesystem-backed store for [`Test`] definitions and their questions.
pub struct TestStore {
    base_dir: PathBuf,
}

impl TestStore {
    /// Create a store rooted at `base_dir`, creating `tests/` and
    /// `questions/` if needed.
    ///
    /// # Errors
    ///
    /// Returns `CertError::Io` if a directory cannot be created.
    pub fn new(base_dir: impl Into<PathBuf>) -> Result<Self> {
        let base_dir = base_dir.into();
        std::fs::create_dir_all(base_dir.join(TESTS_DIR))?;
        std::fs::create_dir_all(base_dir.join(QUESTIONS_DIR))?;
        Ok(Self { base_dir })
    }

    /// Persist a test definition.
    pub fn save_test(&self, test: &Test) -> Result<()> {
        let file = TestFile {
            version: STORE_FILE_VERSION,
            test: test.clone(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(self.test_path(&test.id), json.as_bytes())?;
        Ok(())
    }

    /// Load a test definition by ID.
    ///
    /// # Errors
    ///
    /// Returns `CertError::TestNotFound` when no definition exists.
    pub fn load_test(&self, id: &TestId) -> Result<Test> {
        let path = self.test_path(id);
        if !path.exists() {
            return Err(CertError::TestNotFound(id.0.clone()));
        }

        let bytes = std::fs::read(&path)?;
        let file: TestFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse test file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.test)
    }

    /// Load every stored test definition, in no particular order.
    pub fn list_tests(&self) -> Result<Vec<Test>> {
        let dir = self.base_dir.join(TESTS_DIR);
        let mut tests = Vec::new();

        for entry in std::fs::read_dir(&dir)? {
            let entry = entry?;
            let name = entry.file_name();
            let name_str = name.to_string_lossy();
            if let Some(stem) = name_str.strip_suffix(".json") {
                tests.push(self.load_test(&TestId(stem.to_string()))?);
            }
        }

        Ok(tests)
    }

    /// Persist the question set of a test.
    pub fn save_questions(&self, test: &TestId, questions: &[Question]) -> Result<()> {
        let file = QuestionSetFile {
            version: STORE_FILE_VERSION,
            questions: questions.to_vec(),
        };
        let json = serde_json::to_string_pretty(&file)
            .map_err(|e| CertError::SerializationError(e.to_string()))?;
        std::fs::write(self.questions_path(test), json.as_bytes())?;
        Ok(())
    }

    /// Load the question set of a test. A missing file is an empty set.
    pub fn load_questions(&self, test: &TestId) -> Result<Vec<Question>> {
        let path = self.questions_path(test);
        if !path.exists() {
            return Ok(Vec::new());
        }

        let bytes = std::fs::read(&path)?;
        let file: QuestionSetFile = serde_json::from_slice(&bytes).map_err(|e| {
            CertError::InvalidFileFormat(format!(
                "failed to parse question file {}: {e}",
                path.display()
            ))
        })?;
        Ok(file.questions)
    }

    fn test_path(&self, id: &TestId) -> PathBuf {
        self.base_dir.join(TESTS_DIR).join(format!("{}.json", id.0))
    }

    fn questions_path(&self, id: &TestId) -> PathBuf {
        self.base_dir
            .join(QUESTIONS_DIR)
            .join(format!("{}.json", id.0))
    }
}
