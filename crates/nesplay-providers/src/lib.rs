mod console;
pub mod mock;

pub use console::ConsoleProvider;
pub use mock::{MockProvider, MockResponse};

use anyhow::Result;
use base64::Engine;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Trait for anything that can choose the next action.
///
/// Implementations receive the current game state, the recent history and the
/// list of valid action names, and answer with raw text. Only the response
/// parser in `nesplay-core` interprets that text.
#[async_trait::async_trait]
pub trait DecisionProvider: Send + Sync {
    /// Produce a raw response for the given request
    async fn decide(&self, request: DecisionRequest) -> Result<String>;

    /// Get the provider name
    fn name(&self) -> &str;
}

/// Everything a provider is told about the current cycle
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DecisionContext {
    /// Values read from the emulator's stats file
    pub game_state: BTreeMap<String, i64>,
    /// Recent cycle summaries, oldest first
    pub history: Vec<String>,
    /// Action names the dispatcher will accept
    pub available_actions: Vec<String>,
}

impl DecisionContext {
    /// Value of a game-state key, or `N/A` when the emulator did not report it
    pub fn stat(&self, key: &str) -> String {
        self.game_state
            .get(key)
            .map(|v| v.to_string())
            .unwrap_or_else(|| "N/A".to_string())
    }

    /// Compact multi-line rendering used by interactive providers and logs
    pub fn summary(&self) -> String {
        let mut out = String::new();

        out.push_str("Status:\n");
        for (key, value) in &self.game_state {
            out.push_str(&format!("  {} = {}\n", key, value));
        }

        out.push_str("Recent history:\n");
        if self.history.is_empty() {
            out.push_str("  (none)\n");
        }
        for entry in &self.history {
            out.push_str(&format!("  - {}\n", entry));
        }

        out.push_str("Available actions:\n  ");
        out.push_str(&self.available_actions.join(", "));
        out.push('\n');
        out
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DecisionRequest {
    pub context: DecisionContext,
    /// Screenshot of the current frame, if one was captured
    #[serde(skip)]
    pub frame: Option<ImageContent>,
}

impl DecisionRequest {
    pub fn new(context: DecisionContext) -> Self {
        Self {
            context,
            frame: None,
        }
    }

    pub fn with_frame(mut self, frame: Option<ImageContent>) -> Self {
        self.frame = frame;
        self
    }
}

/// Image content for multimodal requests
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ImageContent {
    /// Media type (e.g., "image/png", "image/jpeg", "image/gif", "image/webp")
    pub media_type: String,
    /// Base64-encoded image data
    pub data: String,
}

impl ImageContent {
    pub fn new(media_type: &str, data: String) -> Self {
        Self {
            media_type: media_type.to_string(),
            data,
        }
    }

    /// Encode raw image bytes, detecting the media type from the file signature.
    /// Returns None for data that is not a recognized image format.
    pub fn from_bytes(bytes: &[u8]) -> Option<Self> {
        let media_type = Self::media_type_from_bytes(bytes)?;
        let data = base64::engine::general_purpose::STANDARD.encode(bytes);
        Some(Self::new(media_type, data))
    }

    /// Detect media type from image data magic bytes (file signature)
    pub fn media_type_from_bytes(bytes: &[u8]) -> Option<&'static str> {
        if bytes.len() < 12 {
            return None;
        }

        // PNG: 89 50 4E 47 0D 0A 1A 0A
        if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
            return Some("image/png");
        }

        // JPEG: FF D8 FF
        if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
            return Some("image/jpeg");
        }

        // GIF: 47 49 46 38 (GIF8)
        if bytes.starts_with(b"GIF8") {
            return Some("image/gif");
        }

        // WebP: RIFF....WEBP
        if bytes.starts_with(b"RIFF") && &bytes[8..12] == b"WEBP" {
            return Some("image/webp");
        }

        None
    }

    /// Size of the decoded image in bytes
    pub fn decoded_len(&self) -> usize {
        let padding = self.data.chars().rev().take_while(|c| *c == '=').count();
        (self.data.len() / 4 * 3).saturating_sub(padding)
    }
}
