//! Bounded recency window of cycle summaries, fed back to the model so it can
//! notice when it is stuck repeating itself.

use std::collections::VecDeque;
use std::fmt;

use crate::game_state::GameState;
use crate::macro_table::ActionName;

/// Summary of one cycle. Never modified after it is recorded.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HistoryEntry(String);

impl HistoryEntry {
    pub fn new(text: impl Into<String>) -> Self {
        HistoryEntry(text.into())
    }

    pub fn executed(action: &ActionName, state: &GameState) -> Self {
        let hp = state
            .hp()
            .map(|hp| hp.to_string())
            .unwrap_or_else(|| "N/A".to_string());
        HistoryEntry(format!("Action: {}, HP: {}", action, hp))
    }

    pub fn failed(reason: impl fmt::Display) -> Self {
        HistoryEntry(format!("Macro execution failed: {}", reason))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for HistoryEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// FIFO buffer that evicts its oldest entry once `capacity` is reached
#[derive(Debug, Clone)]
pub struct ActionHistory {
    entries: VecDeque<HistoryEntry>,
    capacity: usize,
}

impl ActionHistory {
    /// A capacity of zero is treated as one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    /// Append an entry, returning the one evicted to make room
    pub fn push(&mut self, entry: HistoryEntry) -> Option<HistoryEntry> {
        let evicted = if self.entries.len() == self.capacity {
            self.entries.pop_front()
        } else {
            None
        };
        self.entries.push_back(entry);
        evicted
    }

    /// Oldest first
    pub fn entries(&self) -> impl ExactSizeIterator<Item = &HistoryEntry> + DoubleEndedIterator {
        self.entries.iter()
    }

    /// Owned copy for a decision request, oldest first
    pub fn snapshot(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.0.clone()).collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
