//! High score leaderboard
//!
//! Keeps the best few runs as `(score, name)` pairs, persisted as JSON.

use std::io::ErrorKind;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Maximum number of high scores to keep
pub const MAX_HIGH_SCORES: usize = 5;

#[derive(Debug, Error)]
pub enum HighScoreError {
    #[error("failed to access highscore file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed highscore data: {0}")]
    Format(#[from] serde_json::Error),
}

/// A single high score entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScoreEntry {
    pub score: u32,
    pub name: String,
}

/// High score leaderboard, best first
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HighScores {
    pub entries: Vec<HighScoreEntry>,
}

impl HighScores {
    pub fn new() -> Self {
        Self::default()
    }

    /// Check if a score would make the board
    pub fn qualifies(&self, score: u32) -> bool {
        if self.entries.len() < MAX_HIGH_SCORES {
            return true;
        }
        self.entries.last().map(|e| score > e.score).unwrap_or(true)
    }

    /// Add a score. Returns the rank achieved (1-indexed) or None if it didn't qualify
    ///
    /// Ties rank below existing entries with the same score.
    pub fn add(&mut self, score: u32, name: impl Into<String>) -> Option<usize> {
        if !self.qualifies(score) {
            return None;
        }

        let entry = HighScoreEntry {
            score,
            name: name.into(),
        };
        let pos = self
            .entries
            .iter()
            .position(|e| score > e.score)
            .unwrap_or(self.entries.len());
        self.entries.insert(pos, entry);
        self.entries.truncate(MAX_HIGH_SCORES);

        log::info!("High score {} ranked #{}", score, pos + 1);
        Some(pos + 1)
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn top_score(&self) -> Option<u32> {
        self.entries.first().map(|e| e.score)
    }

    pub fn from_json(json: &str) -> Result<Self, HighScoreError> {
        let mut scores: Self = serde_json::from_str(json)?;
        // Normalize order and length
        scores.entries.sort_by(|a, b| b.score.cmp(&a.score));
        scores.entries.truncate(MAX_HIGH_SCORES);
        Ok(scores)
    }

    pub fn to_json(&self) -> Result<String, HighScoreError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load from a file; a missing file is an empty board
    pub fn load(path: impl AsRef<Path>) -> Result<Self, HighScoreError> {
        match std::fs::read_to_string(path.as_ref()) {
            Ok(json) => {
                let scores = Self::from_json(&json)?;
                log::info!("Loaded {} high scores", scores.entries.len());
                Ok(scores)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {
                log::info!("No high scores found, starting fresh");
                Ok(Self::new())
            }
            Err(e) => Err(e.into()),
        }
    }

    pub fn save(&self, path: impl AsRef<Path>) -> Result<(), HighScoreError> {
        std::fs::write(path.as_ref(), self.to_json()?)?;
        log::info!("High scores saved ({} entries)", self.entries.len());
        Ok(())
    }
}
