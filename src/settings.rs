//! Settings
//!
//! One JSON file holds the tuning for both simulations and the leaderboard
//! endpoints. Every field has a default, so a partial file only overrides what
//! it names and a missing file means stock tuning.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::market::MarketConfig;
use crate::runner::RunnerConfig;

pub const ENV_RUNNER_LEADERBOARD: &str = "PORTFOLIO_SIMS_RUNNER_LEADERBOARD";
pub const ENV_MARKET_LEADERBOARD: &str = "PORTFOLIO_SIMS_MARKET_LEADERBOARD";

#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("could not read settings {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid settings {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
}

/// Remote score boards; a missing URL disables that board
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LeaderboardConfig {
    pub runner_url: Option<String>,
    pub market_url: Option<String>,
    pub top_n: usize,
    pub timeout_ms: u64,
}

impl Default for LeaderboardConfig {
    fn default() -> Self {
        Self {
            runner_url: None,
            market_url: None,
            top_n: 10,
            timeout_ms: 5_000,
        }
    }
}

impl LeaderboardConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub runner: RunnerConfig,
    pub market: MarketConfig,
    pub leaderboard: LeaderboardConfig,
    /// Where the runner's best score is kept
    pub best_score_path: PathBuf,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            runner: RunnerConfig::default(),
            market: MarketConfig::default(),
            leaderboard: LeaderboardConfig::default(),
            best_score_path: PathBuf::from("best_score.json"),
        }
    }
}

impl Settings {
    pub fn from_file(path: &Path) -> Result<Self, SettingsError> {
        let json = fs::read_to_string(path).map_err(|source| SettingsError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&json).map_err(|source| SettingsError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Load from `path` if given, else defaults; then apply env overrides
    pub fn load(path: Option<&Path>) -> Self {
        let mut settings = match path {
            Some(path) => match Self::from_file(path) {
                Ok(settings) => {
                    log::info!("Loaded settings from {}", path.display());
                    settings
                }
                Err(err) => {
                    log::warn!("{}; using default settings", err);
                    Self::default()
                }
            },
            None => {
                log::info!("Using default settings");
                Self::default()
            }
        };
        settings.apply_env(|key| std::env::var(key).ok());
        settings
    }

    /// Leaderboard URLs from the environment win over the file; blank disables
    pub fn apply_env(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(url) = lookup(ENV_RUNNER_LEADERBOARD) {
            self.leaderboard.runner_url = non_blank(url);
        }
        if let Some(url) = lookup(ENV_MARKET_LEADERBOARD) {
            self.leaderboard.market_url = non_blank(url);
        }
    }
}

fn non_blank(value: String) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}
