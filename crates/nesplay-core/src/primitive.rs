//! Primitive inputs and the tokens that carry them to the emulator.

use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// One atomic button or direction understood by the emulator script
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum PrimitiveInput {
    Up,
    Down,
    Left,
    Right,
    Confirm,
    Cancel,
    MenuUp,
    MenuDown,
    MenuLeft,
    MenuRight,
}

impl PrimitiveInput {
    pub const ALL: [PrimitiveInput; 10] = [
        PrimitiveInput::Up,
        PrimitiveInput::Down,
        PrimitiveInput::Left,
        PrimitiveInput::Right,
        PrimitiveInput::Confirm,
        PrimitiveInput::Cancel,
        PrimitiveInput::MenuUp,
        PrimitiveInput::MenuDown,
        PrimitiveInput::MenuLeft,
        PrimitiveInput::MenuRight,
    ];

    /// Canonical configuration name
    pub fn name(&self) -> &'static str {
        match self {
            PrimitiveInput::Up => "up",
            PrimitiveInput::Down => "down",
            PrimitiveInput::Left => "left",
            PrimitiveInput::Right => "right",
            PrimitiveInput::Confirm => "confirm",
            PrimitiveInput::Cancel => "cancel",
            PrimitiveInput::MenuUp => "menu-up",
            PrimitiveInput::MenuDown => "menu-down",
            PrimitiveInput::MenuLeft => "menu-left",
            PrimitiveInput::MenuRight => "menu-right",
        }
    }

    /// Token the stock Mesen Lua script expects in the action file
    pub fn default_token(&self) -> &'static str {
        match self {
            PrimitiveInput::Up => "up",
            PrimitiveInput::Down => "down",
            PrimitiveInput::Left => "left",
            PrimitiveInput::Right => "right",
            PrimitiveInput::Confirm => "a",
            PrimitiveInput::Cancel => "b",
            PrimitiveInput::MenuUp => "menu_up",
            PrimitiveInput::MenuDown => "menu_down",
            PrimitiveInput::MenuLeft => "menu_left",
            PrimitiveInput::MenuRight => "menu_right",
        }
    }
}

impl fmt::Display for PrimitiveInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum PrimitiveError {
    #[error("unknown primitive input '{0}'")]
    Unknown(String),
    #[error("empty token configured for primitive '{0}'")]
    EmptyToken(PrimitiveInput),
}

impl FromStr for PrimitiveInput {
    type Err = PrimitiveError;

    /// Accepts the canonical names plus the NES button aliases `a` and `b`.
    /// Case, `-` and `_` are not significant.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key: String = s
            .trim()
            .to_lowercase()
            .chars()
            .filter(|c| *c != '-' && *c != '_')
            .collect();

        let input = match key.as_str() {
            "up" => PrimitiveInput::Up,
            "down" => PrimitiveInput::Down,
            "left" => PrimitiveInput::Left,
            "right" => PrimitiveInput::Right,
            "confirm" | "a" => PrimitiveInput::Confirm,
            "cancel" | "b" => PrimitiveInput::Cancel,
            "menuup" => PrimitiveInput::MenuUp,
            "menudown" => PrimitiveInput::MenuDown,
            "menuleft" => PrimitiveInput::MenuLeft,
            "menuright" => PrimitiveInput::MenuRight,
            _ => return Err(PrimitiveError::Unknown(s.to_string())),
        };
        Ok(input)
    }
}

/// Mapping from primitive to the exact text written to the action file
#[derive(Debug, Clone, PartialEq)]
pub struct InputVocabulary {
    tokens: HashMap<PrimitiveInput, String>,
}

impl Default for InputVocabulary {
    fn default() -> Self {
        Self {
            tokens: PrimitiveInput::ALL
                .iter()
                .map(|p| (*p, p.default_token().to_string()))
                .collect(),
        }
    }
}

impl InputVocabulary {
    /// Default tokens with `[input.tokens]` overrides applied
    pub fn with_overrides(overrides: &BTreeMap<String, String>) -> Result<Self, PrimitiveError> {
        let mut vocabulary = Self::default();
        for (name, token) in overrides {
            let input: PrimitiveInput = name.parse()?;
            let token = token.trim();
            if token.is_empty() {
                return Err(PrimitiveError::EmptyToken(input));
            }
            vocabulary.tokens.insert(input, token.to_string());
        }
        Ok(vocabulary)
    }

    pub fn token(&self, input: PrimitiveInput) -> &str {
        self.tokens
            .get(&input)
            .map(String::as_str)
            .unwrap_or_else(|| input.default_token())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_aliases() {
        assert_eq!("A".parse::<PrimitiveInput>().unwrap(), PrimitiveInput::Confirm);
        assert_eq!("b".parse::<PrimitiveInput>().unwrap(), PrimitiveInput::Cancel);
        assert_eq!("menu_up".parse::<PrimitiveInput>().unwrap(), PrimitiveInput::MenuUp);
        assert_eq!("Menu-Right".parse::<PrimitiveInput>().unwrap(), PrimitiveInput::MenuRight);
        assert_eq!(" down ".parse::<PrimitiveInput>().unwrap(), PrimitiveInput::Down);
        assert!("start".parse::<PrimitiveInput>().is_err());
    }

    #[test]
    fn test_names_round_trip() {
        for input in PrimitiveInput::ALL {
            assert_eq!(input.name().parse::<PrimitiveInput>().unwrap(), input);
        }
    }

    #[test]
    fn test_vocabulary_overrides() {
        let mut overrides = BTreeMap::new();
        overrides.insert("confirm".to_string(), "A".to_string());
        overrides.insert("menu_down".to_string(), "down".to_string());

        let vocabulary = InputVocabulary::with_overrides(&overrides).unwrap();
        assert_eq!(vocabulary.token(PrimitiveInput::Confirm), "A");
        assert_eq!(vocabulary.token(PrimitiveInput::MenuDown), "down");
        assert_eq!(vocabulary.token(PrimitiveInput::Cancel), "b");
    }

    #[test]
    fn test_vocabulary_rejects_bad_entries() {
        let mut overrides = BTreeMap::new();
        overrides.insert("select".to_string(), "sel".to_string());
        assert_eq!(
            InputVocabulary::with_overrides(&overrides),
            Err(PrimitiveError::Unknown("select".to_string()))
        );

        let mut overrides = BTreeMap::new();
        overrides.insert("up".to_string(), "  ".to_string());
        assert_eq!(
            InputVocabulary::with_overrides(&overrides),
            Err(PrimitiveError::EmptyToken(PrimitiveInput::Up))
        );
    }
}
