//! Extracts a single action name from raw model output.
//!
//! Models answer in several shapes: a bare JSON object, the same object inside
//! a fenced code block, an `<action>NAME</action>` tag, or prose with a JSON
//! object somewhere in it. Each shape is a [`ResponseFormat`]; the parser tries
//! them in order and stops at the first one that yields a name.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use thiserror::Error;
use tracing::debug;

use crate::macro_table::{ActionName, MacroTable};

/// Fenced code block, optionally tagged `json`
static FENCED_BLOCK: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?s)```[ \t]*(?i:json)?[ \t]*\r?\n?(.*?)```").unwrap());

static ACTION_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?is)<action>(.*?)</action>").unwrap());

/// Outcome of one format's attempt on a response
#[derive(Debug, Clone, PartialEq)]
pub enum FormatMatch {
    /// The response does not use this encoding
    NotPresent,
    /// The encoding was recognized but its payload could not be decoded
    Malformed(String),
    /// Raw (not yet normalized) action name
    Found(String),
}

pub trait ResponseFormat: Send + Sync {
    fn name(&self) -> &'static str;

    fn extract(&self, raw: &str) -> FormatMatch;
}

#[derive(Debug, Clone, Error, PartialEq)]
pub enum ParseFailure {
    #[error("{0}")]
    Parse(String),
    #[error("unknown action '{0}'")]
    UnknownAction(String),
}

/// Read the `action` field of a JSON object
fn action_from_json(payload: &str) -> FormatMatch {
    match serde_json::from_str::<Value>(payload) {
        Ok(value) => action_from_value(&value),
        Err(e) => FormatMatch::Malformed(format!("invalid JSON: {}", e)),
    }
}

fn action_from_value(value: &Value) -> FormatMatch {
    let Some(object) = value.as_object() else {
        return FormatMatch::Malformed("JSON payload is not an object".to_string());
    };
    match object.get("action") {
        Some(Value::String(name)) => FormatMatch::Found(name.clone()),
        Some(other) => FormatMatch::Malformed(format!("\"action\" is not a string: {}", other)),
        None => FormatMatch::Malformed("JSON object has no \"action\" field".to_string()),
    }
}

/// The whole response is one JSON object
pub struct StrictJson;

impl ResponseFormat for StrictJson {
    fn name(&self) -> &'static str {
        "json"
    }

    fn extract(&self, raw: &str) -> FormatMatch {
        let trimmed = raw.trim();
        if !trimmed.starts_with('{') {
            return FormatMatch::NotPresent;
        }
        action_from_json(trimmed)
    }
}

/// A JSON object inside a ``` fenced block
pub struct FencedJson;

impl ResponseFormat for FencedJson {
    fn name(&self) -> &'static str {
        "fenced-json"
    }

    fn extract(&self, raw: &str) -> FormatMatch {
        let mut first_malformed = None;

        for caps in FENCED_BLOCK.captures_iter(raw) {
            let body = caps.get(1).map(|m| m.as_str().trim()).unwrap_or_default();
            if !body.starts_with('{') {
                continue;
            }
            match action_from_json(body) {
                FormatMatch::Found(name) => return FormatMatch::Found(name),
                FormatMatch::Malformed(reason) if first_malformed.is_none() => {
                    first_malformed = Some(reason);
                }
                _ => {}
            }
        }

        first_malformed
            .map(FormatMatch::Malformed)
            .unwrap_or(FormatMatch::NotPresent)
    }
}

/// `<action>NAME</action>`
pub struct TaggedAction;

impl ResponseFormat for TaggedAction {
    fn name(&self) -> &'static str {
        "tagged"
    }

    fn extract(&self, raw: &str) -> FormatMatch {
        let Some(caps) = ACTION_TAG.captures(raw) else {
            return FormatMatch::NotPresent;
        };
        let name = caps
            .get(1)
            .map(|m| m.as_str())
            .unwrap_or_default()
            .trim_matches(|c: char| c.is_whitespace() || c == '"' || c == '\'');
        if name.is_empty() {
            FormatMatch::Malformed("empty <action> tag".to_string())
        } else {
            FormatMatch::Found(name.to_string())
        }
    }
}

/// First top-level JSON object with an `action` field embedded in prose.
/// Objects nested inside another object are never considered.
pub struct InlineJson;

impl ResponseFormat for InlineJson {
    fn name(&self) -> &'static str {
        "inline-json"
    }

    fn extract(&self, raw: &str) -> FormatMatch {
        let mut search_from = 0;
        while let Some(offset) = raw[search_from..].find('{') {
            let pos = search_from + offset;
            let mut values = serde_json::Deserializer::from_str(&raw[pos..]).into_iter::<Value>();
            match values.next() {
                Some(Ok(value)) => {
                    if let FormatMatch::Found(name) = action_from_value(&value) {
                        return FormatMatch::Found(name);
                    }
                    // Resume after the whole object so its children are skipped
                    search_from = pos + values.byte_offset();
                }
                _ => search_from = pos + 1,
            }
        }
        FormatMatch::NotPresent
    }
}

pub struct ResponseParser {
    formats: Vec<Box<dyn ResponseFormat>>,
}

impl Default for ResponseParser {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseParser {
    /// Parser with every built-in format, strictest first
    pub fn new() -> Self {
        Self::with_formats(vec![
            Box::new(StrictJson),
            Box::new(FencedJson),
            Box::new(TaggedAction),
            Box::new(InlineJson),
        ])
    }

    pub fn with_formats(formats: Vec<Box<dyn ResponseFormat>>) -> Self {
        Self { formats }
    }

    /// Normalized action name from the first format that decodes one.
    /// Membership in the macro table is not checked.
    pub fn extract(&self, raw: &str) -> Result<ActionName, ParseFailure> {
        let mut first_malformed: Option<String> = None;

        for format in &self.formats {
            match format.extract(raw) {
                FormatMatch::Found(name) => {
                    let action = ActionName::new(&name);
                    if action.is_empty() {
                        return Err(ParseFailure::Parse(format!(
                            "empty action name in {} response",
                            format.name()
                        )));
                    }
                    debug!("Parsed action '{}' from {} response", action, format.name());
                    return Ok(action);
                }
                FormatMatch::Malformed(reason) => {
                    debug!("{} format rejected response: {}", format.name(), reason);
                    if first_malformed.is_none() {
                        first_malformed = Some(format!("{} response: {}", format.name(), reason));
                    }
                }
                FormatMatch::NotPresent => {}
            }
        }

        Err(ParseFailure::Parse(
            first_malformed.unwrap_or_else(|| "no recognized action encoding".to_string()),
        ))
    }

    /// Extract an action name and check it against the macro table
    pub fn parse(&self, raw: &str, table: &MacroTable) -> Result<ActionName, ParseFailure> {
        let action = self.extract(raw)?;
        if table.contains(&action) {
            Ok(action)
        } else {
            Err(ParseFailure::UnknownAction(action.to_string()))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strict_json() {
        assert_eq!(
            StrictJson.extract(r#"  {"action": "TALK"}  "#),
            FormatMatch::Found("TALK".to_string())
        );
        assert_eq!(StrictJson.extract("TALK"), FormatMatch::NotPresent);
        assert!(matches!(StrictJson.extract("{action: TALK}"), FormatMatch::Malformed(_)));
        assert!(matches!(
            StrictJson.extract(r#"{"action": 3}"#),
            FormatMatch::Malformed(_)
        ));
    }

    #[test]
    fn test_fenced_json_skips_non_json_blocks() {
        let raw = "Looking at the map:\n```\nhp=12\n```\nDecision:\n```json\n{\"action\": \"search\"}\n```";
        assert_eq!(FencedJson.extract(raw), FormatMatch::Found("search".to_string()));
    }

    #[test]
    fn test_fenced_json_malformed() {
        let raw = "```json\n{\"action\": \"TALK\"\n```";
        assert!(matches!(FencedJson.extract(raw), FormatMatch::Malformed(_)));
    }

    #[test]
    fn test_tagged_action() {
        assert_eq!(
            TaggedAction.extract("I will open the door. <ACTION> open_door </Action>"),
            FormatMatch::Found("open_door".to_string())
        );
        assert_eq!(
            TaggedAction.extract("<action>\"TALK\"</action>"),
            FormatMatch::Found("TALK".to_string())
        );
        assert!(matches!(TaggedAction.extract("<action> </action>"), FormatMatch::Malformed(_)));
        assert_eq!(TaggedAction.extract("<act>TALK</act>"), FormatMatch::NotPresent);
    }

    #[test]
    fn test_inline_json_ignores_objects_without_action() {
        let raw = r#"State {"hp": 10} so I choose {"action": "BATTLE_RUN", "why": "low hp"} now"#;
        assert_eq!(InlineJson.extract(raw), FormatMatch::Found("BATTLE_RUN".to_string()));
        assert_eq!(InlineJson.extract("no braces here"), FormatMatch::NotPresent);
    }

    #[test]
    fn test_inline_json_ignores_nested_action() {
        assert_eq!(
            InlineJson.extract(r#"I pick {"choice": {"action": "TALK"}} today"#),
            FormatMatch::NotPresent
        );
        assert_eq!(
            InlineJson.extract(r#"{broken {"action": "SEARCH"} ok"#),
            FormatMatch::Found("SEARCH".to_string())
        );

        let parser = ResponseParser::new();
        match parser.extract(r#"{"choice": {"action": "TALK"}}"#) {
            Err(ParseFailure::Parse(reason)) => assert!(reason.contains("\"action\""), "{}", reason),
            other => panic!("unexpected result: {:?}", other),
        }
    }

    #[test]
    fn test_malformed_reason_is_reported() {
        let parser = ResponseParser::new();
        match parser.extract(r#"{"action": }"#) {
            Err(ParseFailure::Parse(reason)) => assert!(reason.contains("json"), "{}", reason),
            other => panic!("unexpected result: {:?}", other),
        }
        assert_eq!(
            parser.extract("just some words"),
            Err(ParseFailure::Parse("no recognized action encoding".to_string()))
        );
    }

    #[test]
    fn test_format_order_is_respected() {
        // Tag only parser ignores the JSON object entirely
        let parser = ResponseParser::with_formats(vec![Box::new(TaggedAction)]);
        assert_eq!(
            parser.extract(r#"{"action": "TALK"}"#),
            Err(ParseFailure::Parse("no recognized action encoding".to_string()))
        );

        // Strict JSON wins over a tag that appears inside it
        let parser = ResponseParser::new();
        assert_eq!(
            parser.extract(r#"{"action": "SEARCH", "note": "<action>TALK</action>"}"#),
            Ok(ActionName::new("SEARCH"))
        );
    }
}
