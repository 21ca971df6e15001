//! Reader for the emulator's stats file.
//!
//! The emulator script rewrites the file with one `key=value` pair per line,
//! all values integers. Until the first write the file does not exist, which
//! is a normal "not ready yet" condition rather than an error.

use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum GameStateError {
    #[error("stats file {0:?} is missing or empty")]
    NotReady(PathBuf),
    #[error("line {line}: {reason}")]
    Malformed { line: usize, reason: String },
    #[error("failed to read {path:?}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct GameState {
    values: BTreeMap<String, i64>,
}

impl GameState {
    /// Parse stats file contents. Lines without `=` are ignored.
    pub fn parse(content: &str) -> Result<Self, GameStateError> {
        let mut values = BTreeMap::new();

        for (idx, line) in content.lines().enumerate() {
            let Some((key, value)) = line.trim().split_once('=') else {
                continue;
            };
            let key = key.trim();
            let value = value.trim();
            let parsed = value.parse::<i64>().map_err(|_| GameStateError::Malformed {
                line: idx + 1,
                reason: format!("value '{}' for '{}' is not an integer", value, key),
            })?;
            values.insert(key.to_string(), parsed);
        }

        Ok(Self { values })
    }

    pub fn get(&self, key: &str) -> Option<i64> {
        self.values.get(key).copied()
    }

    pub fn hp(&self) -> Option<i64> {
        self.get("hp")
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    pub fn values(&self) -> &BTreeMap<String, i64> {
        &self.values
    }
}

/// Handle on the stats file written by the emulator script
#[derive(Debug, Clone)]
pub struct StatsFile {
    path: PathBuf,
}

impl StatsFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read and parse the current state.
    ///
    /// A missing file, or one with no `key=value` lines, is `NotReady`.
    pub async fn read(&self) -> Result<GameState, GameStateError> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                return Err(GameStateError::NotReady(self.path.clone()));
            }
            Err(source) => {
                return Err(GameStateError::Io {
                    path: self.path.clone(),
                    source,
                });
            }
        };

        let state = GameState::parse(&content)?;
        if state.is_empty() {
            return Err(GameStateError::NotReady(self.path.clone()));
        }
        Ok(state)
    }
}
