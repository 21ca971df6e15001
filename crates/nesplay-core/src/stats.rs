//! Session statistics formatting module.
//!
//! Counts what happened to each cycle of a run and renders the summary printed
//! when a bounded run finishes.

use chrono::{DateTime, Local};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::agent::CycleOutcome;

#[derive(Debug, Clone, Serialize)]
pub struct SessionStats {
    pub started_at: DateTime<Local>,
    /// Dispatch cycles completed (executed or failed)
    pub cycles: u64,
    pub executed: u64,
    /// Polls that found the game state not ready
    pub waits: u64,
    /// Cycles that dispatched the fallback action after a provider error
    pub fallbacks: u64,
    /// Failed cycles by error kind
    pub failures: BTreeMap<&'static str, u64>,
    /// Executions per action name
    pub actions: BTreeMap<String, u64>,
}

impl Default for SessionStats {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionStats {
    pub fn new() -> Self {
        Self {
            started_at: Local::now(),
            cycles: 0,
            executed: 0,
            waits: 0,
            fallbacks: 0,
            failures: BTreeMap::new(),
            actions: BTreeMap::new(),
        }
    }

    pub fn record(&mut self, outcome: &CycleOutcome) {
        match outcome {
            CycleOutcome::Waiting(_) => self.waits += 1,
            CycleOutcome::Executed(action) => {
                self.cycles += 1;
                self.executed += 1;
                *self.actions.entry(action.to_string()).or_insert(0) += 1;
            }
            CycleOutcome::Failed(error) => {
                self.cycles += 1;
                *self.failures.entry(error.kind()).or_insert(0) += 1;
            }
        }
    }

    pub fn record_fallback(&mut self) {
        self.fallbacks += 1;
    }

    pub fn failed(&self) -> u64 {
        self.failures.values().sum()
    }

    /// Format the summary, `presses` being the primitives written this session
    pub fn format(&self, presses: u64) -> String {
        let mut stats = String::new();

        stats.push_str("\n=== SESSION SUMMARY ===\n");
        stats.push_str(&format!(
            "Started:            {}\n",
            self.started_at.format("%Y-%m-%d %H:%M:%S")
        ));
        stats.push_str(&format!("Cycles:             {:>8}\n", self.cycles));
        stats.push_str(&format!("Macros Executed:    {:>8}\n", self.executed));
        stats.push_str(&format!("Macros Failed:      {:>8}\n", self.failed()));
        stats.push_str(&format!("Inputs Written:     {:>8}\n", presses));
        stats.push_str(&format!("Waits (not ready):  {:>8}\n", self.waits));
        stats.push_str(&format!("Fallback Actions:   {:>8}\n", self.fallbacks));

        if self.executed > 0 {
            stats.push_str(&format!(
                "Average Inputs/Macro: {:.1}\n",
                presses as f64 / self.executed as f64
            ));
        }

        if !self.failures.is_empty() {
            stats.push_str("Failures:\n");
            for (kind, count) in &self.failures {
                stats.push_str(&format!("   • {:<20}{:>6}\n", kind, count));
            }
        }

        if !self.actions.is_empty() {
            stats.push_str("Actions:\n");
            for (action, count) in &self.actions {
                stats.push_str(&format!("   • {:<20}{:>6}\n", action, count));
            }
        }

        stats.push_str(&"=".repeat(30));
        stats.push('\n');
        stats
    }
}
