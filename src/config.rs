use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::error::ConfigError;
use crate::score::{default_bonus_table, BonusTier, DEFAULT_BASE_POINTS};

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct QuizConfig {
    pub total_rounds_target: usize,
    pub max_response_secs: f64,
    pub inter_round_delay_secs: f64,
    pub base_points: u32,
    pub time_bonus_table: Vec<BonusTier>,
}

impl Default for QuizConfig {
    fn default() -> Self {
        Self {
            total_rounds_target: 10,
            max_response_secs: 46.0,
            inter_round_delay_secs: 6.0,
            base_points: DEFAULT_BASE_POINTS,
            time_bonus_table: default_bonus_table(),
        }
    }
}

impl QuizConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.total_rounds_target == 0 {
            return Err(ConfigError::ZeroRounds);
        }
        for (field, value) in [
            ("max_response_secs", self.max_response_secs),
            ("inter_round_delay_secs", self.inter_round_delay_secs),
        ] {
            if !(value.is_finite() && value > 0.0) {
                return Err(ConfigError::NonPositiveDuration { field, value });
            }
        }
        for (i, pair) in self.time_bonus_table.windows(2).enumerate() {
            if pair[1].within_secs <= pair[0].within_secs {
                return Err(ConfigError::UnsortedBonusTable { tier: i + 1 });
            }
        }
        Ok(())
    }

    pub fn max_response(&self) -> Duration {
        Duration::try_from_secs_f64(self.max_response_secs).unwrap_or(Duration::MAX)
    }

    pub fn inter_round_delay(&self) -> Duration {
        Duration::try_from_secs_f64(self.inter_round_delay_secs).unwrap_or(Duration::MAX)
    }
}

pub trait ConfigStore {
    fn load(&self) -> QuizConfig;
    fn save(&self, cfg: &QuizConfig) -> std::io::Result<()>;
}

#[derive(Debug, Clone)]
pub struct FileConfigStore {
    path: PathBuf,
}

impl FileConfigStore {
    pub fn new() -> Self {
        let path = if let Some(pd) = ProjectDirs::from("", "", "quizbit") {
            pd.config_dir().join("config.json")
        } else {
            PathBuf::from("quizbit_config.json")
        };
        Self { path }
    }

    pub fn with_path<P: AsRef<Path>>(p: P) -> Self {
        Self {
            path: p.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl Default for FileConfigStore {
    fn default() -> Self {
        Self::new()
    }
}

impl ConfigStore for FileConfigStore {
    fn load(&self) -> QuizConfig {
        if let Ok(bytes) = fs::read(&self.path) {
            match serde_json::from_slice::<QuizConfig>(&bytes) {
                Ok(cfg) => return cfg,
                Err(e) => tracing::warn!("ignoring unreadable config {}: {e}", self.path.display()),
            }
        }
        QuizConfig::default()
    }

    fn save(&self, cfg: &QuizConfig) -> std::io::Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let data = serde_json::to_vec_pretty(cfg)?;
        fs::write(&self.path, data)
    }
}
