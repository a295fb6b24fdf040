//! Error types shared across the quiz engine.
//!
//! Fatal start-up failures (`PoolError::Empty`, `QuestionError`, `ConfigError`,
//! `RegistrationError`) are folded into `SessionError`. Persistence failures
//! are kept separate because a finished session survives them.

use std::path::PathBuf;

use thiserror::Error;

/// Failures of the question pool.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum PoolError {
    /// No questions were supplied; a session cannot start.
    #[error("question pool is empty")]
    Empty,

    /// Every question the session may show has been shown.
    ///
    /// Internal signal: the session turns it into normal completion.
    #[error("question pool exhausted after {shown} questions")]
    Exhausted { shown: usize },
}

/// A question record that cannot be played.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum QuestionError {
    #[error("question #{index} is malformed: {reason}")]
    Malformed { index: usize, reason: String },
}

/// Failures while loading a question bank.
#[derive(Debug, Error)]
pub enum RepositoryError {
    #[error("failed to read question bank {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("question bank {origin} is not valid JSON: {source}")]
    Parse {
        origin: String,
        #[source]
        source: serde_json::Error,
    },

    #[error(transparent)]
    Question(#[from] QuestionError),
}

/// Leaderboard storage failures.
#[derive(Debug, Error)]
pub enum PersistenceError {
    /// Recovered by callers as an empty leaderboard.
    #[error("failed to read leaderboard {path}: {reason}")]
    Read { path: PathBuf, reason: String },

    /// Surfaced to the caller; the in-memory result is unaffected.
    #[error("failed to write leaderboard {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

#[derive(Debug, Error, Clone, PartialEq)]
pub enum ConfigError {
    #[error("total rounds must be at least 1")]
    ZeroRounds,

    #[error("{field} must be a positive number of seconds, got {value}")]
    NonPositiveDuration { field: &'static str, value: f64 },

    #[error("time bonus thresholds must be strictly ascending (tier {tier})")]
    UnsortedBonusTable { tier: usize },
}

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum RegistrationError {
    #[error("player name is required")]
    MissingName,

    #[error("player name is longer than {max} characters")]
    NameTooLong { max: usize },

    #[error("'{0}' is not a valid e-mail address")]
    InvalidEmail(String),
}

/// Anything that prevents a session from reaching its first question.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error(transparent)]
    Pool(#[from] PoolError),

    #[error(transparent)]
    Question(#[from] QuestionError),

    #[error(transparent)]
    Repository(#[from] RepositoryError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Registration(#[from] RegistrationError),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn messages_name_the_problem() {
        let err = QuestionError::Malformed {
            index: 3,
            reason: "option C is empty".into(),
        };
        assert_eq!(err.to_string(), "question #3 is malformed: option C is empty");
        assert_eq!(
            PoolError::Exhausted { shown: 10 }.to_string(),
            "question pool exhausted after 10 questions"
        );
    }

    #[test]
    fn session_error_wraps_without_rewording() {
        let err: SessionError = PoolError::Empty.into();
        assert_eq!(err.to_string(), "question pool is empty");
    }
}
