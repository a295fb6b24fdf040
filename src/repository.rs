use std::fs;
use std::path::{Path, PathBuf};

use include_dir::{include_dir, Dir};

use crate::error::RepositoryError;
use crate::question::{QuestionBank, QuestionRecord};

static BANK_DIR: Dir = include_dir!("src/bank");

pub const DEFAULT_BANK_FILE: &str = "questions.json";

/// Where a session's questions come from.
pub trait QuestionRepository {
    fn load(&self) -> Result<Vec<QuestionRecord>, RepositoryError>;
}

fn parse_bank(origin: &str, text: &str) -> Result<Vec<QuestionRecord>, RepositoryError> {
    let bank: QuestionBank = serde_json::from_str(text).map_err(|source| RepositoryError::Parse {
        origin: origin.to_string(),
        source,
    })?;
    let records = bank.into_records()?;
    tracing::debug!(origin, questions = records.len(), "question bank loaded");
    Ok(records)
}

/// A question bank file on disk
#[derive(Debug, Clone)]
pub struct JsonQuestionRepository {
    path: PathBuf,
}

impl JsonQuestionRepository {
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl QuestionRepository for JsonQuestionRepository {
    fn load(&self) -> Result<Vec<QuestionRecord>, RepositoryError> {
        let text = fs::read_to_string(&self.path).map_err(|source| RepositoryError::Io {
            path: self.path.clone(),
            source,
        })?;
        parse_bank(&self.path.display().to_string(), &text)
    }
}

/// The bank compiled into the binary
#[derive(Debug, Clone, Copy, Default)]
pub struct EmbeddedQuestionRepository;

impl EmbeddedQuestionRepository {
    pub fn raw() -> &'static str {
        BANK_DIR
            .get_file(DEFAULT_BANK_FILE)
            .and_then(|f| f.contents_utf8())
            .unwrap_or_default()
    }
}

impl QuestionRepository for EmbeddedQuestionRepository {
    fn load(&self) -> Result<Vec<QuestionRecord>, RepositoryError> {
        parse_bank("<built-in>", Self::raw())
    }
}

/// Copy the built-in bank to `path` when it is missing, or always when
/// `overwrite` is set. Returns whether a file was written.
pub fn seed_default_bank(path: &Path, overwrite: bool) -> std::io::Result<bool> {
    if path.exists() && !overwrite {
        return Ok(false);
    }
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }
    fs::write(path, EmbeddedQuestionRepository::raw())?;
    tracing::info!(path = %path.display(), "seeded default question bank");
    Ok(true)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuestionError;
    use assert_matches::assert_matches;
    use tempfile::tempdir;

    #[test]
    fn test_embedded_bank_is_playable() {
        let records = EmbeddedQuestionRepository.load().unwrap();
        assert!(records.len() >= 10, "built-in bank should cover a full session");
    }

    #[test]
    fn test_seed_only_when_missing() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("data").join(DEFAULT_BANK_FILE);

        assert!(seed_default_bank(&path, false).unwrap());
        std::fs::write(&path, r#"{"QuestionsData": []}"#).unwrap();
        assert!(!seed_default_bank(&path, false).unwrap());
        assert!(JsonQuestionRepository::new(&path).load().unwrap().is_empty());

        assert!(seed_default_bank(&path, true).unwrap());
        let records = JsonQuestionRepository::new(&path).load().unwrap();
        assert_eq!(records, EmbeddedQuestionRepository.load().unwrap());
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let dir = tempdir().unwrap();
        let repo = JsonQuestionRepository::new(dir.path().join("nope.json"));
        assert_matches!(repo.load(), Err(RepositoryError::Io { .. }));
    }

    #[test]
    fn test_bad_json_and_bad_record() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("q.json");

        std::fs::write(&path, "not json").unwrap();
        assert_matches!(
            JsonQuestionRepository::new(&path).load(),
            Err(RepositoryError::Parse { .. })
        );

        std::fs::write(
            &path,
            r#"{"QuestionsData":[{"Question":"Q","Options":{"A":"1","B":"2","C":"3"},"Answer":"A"}]}"#,
        )
        .unwrap();
        assert_matches!(
            JsonQuestionRepository::new(&path).load(),
            Err(RepositoryError::Question(QuestionError::Malformed { index: 0, .. }))
        );
    }
}
