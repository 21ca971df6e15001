//! Per-cycle error taxonomy.
//!
//! Nothing here is fatal. `NotReady` and `MalformedState` make the loop wait
//! and poll again; every other kind is logged, recorded in the history and the
//! loop moves on to the next cycle.

use thiserror::Error;

use crate::channel::ChannelError;
use crate::game_state::GameStateError;
use crate::response_parser::ParseFailure;

#[derive(Debug, Error)]
pub enum CycleError {
    #[error("game state not ready: {0}")]
    NotReady(String),
    #[error("malformed game state: {0}")]
    MalformedState(String),
    #[error("could not parse model response: {0}")]
    Parse(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
    #[error("action channel write failed: {0}")]
    ChannelWrite(#[from] ChannelError),
    #[error("decision provider failed: {0}")]
    Provider(String),
}

impl CycleError {
    /// Short label used in logs and statistics
    pub fn kind(&self) -> &'static str {
        match self {
            CycleError::NotReady(_) => "not_ready",
            CycleError::MalformedState(_) => "malformed_state",
            CycleError::Parse(_) => "parse_error",
            CycleError::UnknownAction(_) => "unknown_action",
            CycleError::ChannelWrite(_) => "channel_write_error",
            CycleError::Provider(_) => "provider_error",
        }
    }
}

impl From<ParseFailure> for CycleError {
    fn from(failure: ParseFailure) -> Self {
        match failure {
            ParseFailure::Parse(reason) => CycleError::Parse(reason),
            ParseFailure::UnknownAction(name) => CycleError::UnknownAction(name),
        }
    }
}

impl From<GameStateError> for CycleError {
    fn from(error: GameStateError) -> Self {
        match error {
            GameStateError::NotReady(path) => CycleError::NotReady(format!("{:?}", path)),
            // An unreadable file is retried the same way as a missing one
            GameStateError::Io { .. } => CycleError::NotReady(error.to_string()),
            GameStateError::Malformed { .. } => CycleError::MalformedState(error.to_string()),
        }
    }
}
