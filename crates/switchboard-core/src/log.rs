//! Capped, append-only dispatch log.
//!
//! Keeps the last `capacity` entries in call order. Appending to a full log
//! evicts the oldest entry first.

use std::collections::VecDeque;
use std::sync::Mutex;

use switchboard_contracts::dispatch::DispatchLogEntry;

/// Default number of entries retained.
pub const DEFAULT_LOG_CAPACITY: usize = 100;

/// Ring buffer of recent dispatch log entries.
///
/// One mutex guards push and eviction together, so entries appear once and
/// in the order `push` was called.
#[derive(Debug)]
pub struct DispatchLog {
    capacity: usize,
    entries: Mutex<VecDeque<DispatchLogEntry>>,
}

impl DispatchLog {
    /// A zero capacity is raised to one.
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            capacity,
            entries: Mutex::new(VecDeque::with_capacity(capacity)),
        }
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn push(&self, entry: DispatchLogEntry) {
        let mut entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        while entries.len() >= self.capacity {
            entries.pop_front();
        }
        entries.push_back(entry);
    }

    /// All retained entries, oldest first.
    pub fn entries(&self) -> Vec<DispatchLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().cloned().collect()
    }

    /// Up to `limit` entries, most recent first.
    pub fn recent(&self, limit: usize) -> Vec<DispatchLogEntry> {
        let entries = self.entries.lock().unwrap_or_else(|e| e.into_inner());
        entries.iter().rev().take(limit).cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.lock().unwrap_or_else(|e| e.into_inner()).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for DispatchLog {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use chrono::Utc;

    use switchboard_contracts::intent::{Intent, Language};

    use super::*;

    fn entry(input: &str) -> DispatchLogEntry {
        DispatchLogEntry {
            timestamp: Utc::now(),
            input: input.to_string(),
            agent: None,
            provider: None,
            intent: Intent::GeneralConversation,
            confidence: 0.5,
            language: Language::English,
            error: None,
        }
    }

    #[test]
    fn evicts_oldest_when_full() {
        let log = DispatchLog::new(3);
        for i in 0..5 {
            log.push(entry(&format!("msg-{i}")));
        }

        let inputs: Vec<String> = log.entries().into_iter().map(|e| e.input).collect();
        assert_eq!(inputs, vec!["msg-2", "msg-3", "msg-4"]);
    }

    #[test]
    fn recent_is_most_recent_first() {
        let log = DispatchLog::new(10);
        log.push(entry("first"));
        log.push(entry("second"));
        log.push(entry("third"));

        let inputs: Vec<String> = log.recent(2).into_iter().map(|e| e.input).collect();
        assert_eq!(inputs, vec!["third", "second"]);
    }

    #[test]
    fn zero_capacity_keeps_one_entry() {
        let log = DispatchLog::new(0);
        log.push(entry("a"));
        log.push(entry("b"));
        assert_eq!(log.capacity(), 1);
        assert_eq!(log.entries()[0].input, "b");
    }
}
