use directories::ProjectDirs;
use std::path::PathBuf;

/// Centralized application directory resolution
pub struct AppDirs;

impl AppDirs {
    fn data_dir() -> PathBuf {
        ProjectDirs::from("", "", "quizbit")
            .map(|pd| pd.data_local_dir().to_path_buf())
            .unwrap_or_else(|| PathBuf::from("."))
    }

    pub fn questions_path() -> PathBuf {
        Self::data_dir().join("questions.json")
    }

    pub fn leaderboard_path() -> PathBuf {
        Self::data_dir().join("players.json")
    }

    /// `$HOME/.local/state/quizbit/quizbit.log`, falling back to the data dir.
    pub fn log_path() -> Option<PathBuf> {
        if let Ok(home) = std::env::var("HOME") {
            let state_dir = PathBuf::from(home)
                .join(".local")
                .join("state")
                .join("quizbit");
            Some(state_dir.join("quizbit.log"))
        } else {
            ProjectDirs::from("", "", "quizbit")
                .map(|proj_dirs| proj_dirs.data_local_dir().join("quizbit.log"))
        }
    }
}
