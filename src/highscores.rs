//! Local best score for the runner
//!
//! Stored as a small JSON file. A missing or unreadable file means no best
//! score yet; it never stops the game.

use std::fs;
use std::io;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum StoreError {
    #[error("best score file I/O failed: {0}")]
    Io(#[from] io::Error),

    #[error("best score encoding failed: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BestScore {
    pub best: u32,
}

impl BestScore {
    /// Read the stored best, falling back to zero
    pub fn load(path: &Path) -> Self {
        match Self::read(path) {
            Ok(score) => {
                log::info!("Loaded best score {} from {}", score.best, path.display());
                score
            }
            Err(StoreError::Io(err)) if err.kind() == io::ErrorKind::NotFound => {
                log::info!("No best score at {}, starting fresh", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("Ignoring best score at {}: {}", path.display(), err);
                Self::default()
            }
        }
    }

    fn read(path: &Path) -> Result<Self, StoreError> {
        let json = fs::read_to_string(path)?;
        Ok(serde_json::from_str(&json)?)
    }

    /// Keep `score` if it beats the current best
    pub fn record(&mut self, score: u32) -> bool {
        if score > self.best {
            self.best = score;
            true
        } else {
            false
        }
    }

    /// Write through a temp file so a crash never leaves a torn file
    pub fn save(&self, path: &Path) -> Result<(), StoreError> {
        if let Some(dir) = path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }
        let tmp = path.with_extension("json.tmp");
        fs::write(&tmp, serde_json::to_string(self)?)?;
        fs::rename(&tmp, path)?;
        log::info!("Best score {} saved", self.best);
        Ok(())
    }
}
