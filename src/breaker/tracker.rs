//! Per-command consecutive failure counts.

use std::collections::HashMap;

use crate::dispatch::command::CommandId;

/// Failure counter keyed by command.
///
/// Not synchronized; the breaker serializes access. Missing entries count as
/// zero, and counts only grow between clears.
#[derive(Debug, Default)]
pub struct ErrorTracker {
    counts: HashMap<CommandId, u32>,
}

impl ErrorTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record one failure and return the new count.
    pub fn increment(&mut self, id: CommandId) -> u32 {
        let count = self.counts.entry(id).or_insert(0);
        *count = count.saturating_add(1);
        *count
    }

    pub fn count_of(&self, id: CommandId) -> u32 {
        self.counts.get(&id).copied().unwrap_or(0)
    }

    /// Forget a command entirely.
    pub fn clear(&mut self, id: CommandId) {
        self.counts.remove(&id);
    }

    /// Number of commands with at least one recorded failure.
    pub fn tracked(&self) -> usize {
        self.counts.len()
    }
}
