//! Static lookup from high-level action names to primitive input sequences.
//!
//! Names are case-folded to upper case both when the table is built and when
//! it is queried. The table never checks game-state preconditions: a menu
//! macro simply replays its presses from wherever the game happens to be.

use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

use crate::primitive::{PrimitiveError, PrimitiveInput};

/// Normalized (trimmed, upper-case) action identifier
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ActionName(String);

impl ActionName {
    pub fn new(raw: &str) -> Self {
        ActionName(raw.trim().to_uppercase())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl fmt::Display for ActionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ActionName {
    fn from(raw: &str) -> Self {
        ActionName::new(raw)
    }
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum MacroTableError {
    #[error("macro table has no actions")]
    Empty,
    #[error("macro table contains an empty action name")]
    EmptyName,
    #[error("action '{0}' has an empty input sequence")]
    EmptySequence(String),
    #[error("action '{action}' uses {source}")]
    UnknownPrimitive {
        action: String,
        source: PrimitiveError,
    },
    #[error("action '{0}' is defined more than once (names are case-insensitive)")]
    Duplicate(String),
}

#[derive(Debug, Clone, PartialEq)]
pub struct MacroTable {
    macros: BTreeMap<ActionName, Vec<PrimitiveInput>>,
}

impl MacroTable {
    /// Build a table from already-typed sequences
    pub fn new<I, S>(entries: I) -> Result<Self, MacroTableError>
    where
        I: IntoIterator<Item = (S, Vec<PrimitiveInput>)>,
        S: AsRef<str>,
    {
        let mut macros = BTreeMap::new();

        for (raw_name, sequence) in entries {
            let name = ActionName::new(raw_name.as_ref());
            if name.is_empty() {
                return Err(MacroTableError::EmptyName);
            }
            if sequence.is_empty() {
                return Err(MacroTableError::EmptySequence(name.to_string()));
            }
            if macros.contains_key(&name) {
                return Err(MacroTableError::Duplicate(name.to_string()));
            }
            macros.insert(name, sequence);
        }

        if macros.is_empty() {
            return Err(MacroTableError::Empty);
        }

        Ok(Self { macros })
    }

    /// Build a table from the `[macros]` configuration section
    pub fn from_config(macros: &BTreeMap<String, Vec<String>>) -> Result<Self, MacroTableError> {
        let mut entries = Vec::with_capacity(macros.len());

        for (name, tokens) in macros {
            let sequence = tokens
                .iter()
                .map(|token| token.parse::<PrimitiveInput>())
                .collect::<Result<Vec<_>, _>>()
                .map_err(|source| MacroTableError::UnknownPrimitive {
                    action: name.clone(),
                    source,
                })?;
            entries.push((name.as_str(), sequence));
        }

        Self::new(entries)
    }

    /// Case-insensitive lookup
    pub fn lookup(&self, name: &str) -> Option<&[PrimitiveInput]> {
        self.get(&ActionName::new(name))
    }

    pub fn get(&self, name: &ActionName) -> Option<&[PrimitiveInput]> {
        self.macros.get(name).map(Vec::as_slice)
    }

    pub fn contains(&self, name: &ActionName) -> bool {
        self.macros.contains_key(name)
    }

    /// Action names in sorted order
    pub fn names(&self) -> impl Iterator<Item = &ActionName> {
        self.macros.keys()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&ActionName, &[PrimitiveInput])> {
        self.macros.iter().map(|(name, seq)| (name, seq.as_slice()))
    }

    pub fn len(&self) -> usize {
        self.macros.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macros.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::primitive::PrimitiveInput::*;

    #[test]
    fn test_case_insensitive_lookup() {
        let table = MacroTable::new(vec![("Talk", vec![Confirm, Confirm])]).unwrap();

        for variant in ["TALK", "talk", "Talk", " tAlK "] {
            assert_eq!(table.lookup(variant), Some(&[Confirm, Confirm][..]));
        }
        assert_eq!(table.lookup("TALKS"), None);
    }

    #[test]
    fn test_rejects_empty_sequence() {
        let err = MacroTable::new(vec![("NOTHING", Vec::new())]).unwrap_err();
        assert_eq!(err, MacroTableError::EmptySequence("NOTHING".to_string()));
    }

    #[test]
    fn test_rejects_case_collision() {
        let err = MacroTable::new(vec![("search", vec![Confirm]), ("SEARCH", vec![Cancel])])
            .unwrap_err();
        assert_eq!(err, MacroTableError::Duplicate("SEARCH".to_string()));
    }

    #[test]
    fn test_rejects_empty_table_and_name() {
        let none: Vec<(&str, Vec<PrimitiveInput>)> = Vec::new();
        assert_eq!(MacroTable::new(none).unwrap_err(), MacroTableError::Empty);
        assert_eq!(
            MacroTable::new(vec![("  ", vec![Up])]).unwrap_err(),
            MacroTableError::EmptyName
        );
    }

    #[test]
    fn test_from_config_reports_bad_token() {
        let mut macros = BTreeMap::new();
        macros.insert("WARP".to_string(), vec!["up".to_string(), "select".to_string()]);

        match MacroTable::from_config(&macros).unwrap_err() {
            MacroTableError::UnknownPrimitive { action, source } => {
                assert_eq!(action, "WARP");
                assert_eq!(source, PrimitiveError::Unknown("select".to_string()));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
