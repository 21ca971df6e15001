//! The action channel: a single-slot mailbox shared with the emulator.
//!
//! Every send overwrites the slot. There is no queue and no acknowledgment;
//! the emulator script polls the slot at its own pace. A write is only
//! guaranteed to be observed if the slot is left alone for at least one
//! emulator poll period. Two sends closer together than that can lose the
//! first input.

use std::path::{Path, PathBuf};
use thiserror::Error;
use tracing::debug;

use crate::primitive::{InputVocabulary, PrimitiveInput};

#[derive(Debug, Error)]
pub enum ChannelError {
    #[error("failed to write '{token}' to {path:?}: {source}")]
    Write {
        path: PathBuf,
        token: String,
        source: std::io::Error,
    },
}

#[async_trait::async_trait]
pub trait ActionChannel: Send {
    /// Replace the slot contents with `input`
    async fn send(&mut self, input: PrimitiveInput) -> Result<(), ChannelError>;
}

/// Action channel backed by a plain file holding one token, no newline
pub struct FileActionChannel {
    path: PathBuf,
    vocabulary: InputVocabulary,
}

impl FileActionChannel {
    pub fn new(path: impl Into<PathBuf>, vocabulary: InputVocabulary) -> Self {
        Self {
            path: path.into(),
            vocabulary,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

#[async_trait::async_trait]
impl ActionChannel for FileActionChannel {
    async fn send(&mut self, input: PrimitiveInput) -> Result<(), ChannelError> {
        let token = self.vocabulary.token(input);
        tokio::fs::write(&self.path, token)
            .await
            .map_err(|source| ChannelError::Write {
                path: self.path.clone(),
                token: token.to_string(),
                source,
            })?;
        debug!("Wrote '{}' to {}", token, self.path.display());
        Ok(())
    }
}
