use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// One curriculum concept and the keyword evidence that proves it was practiced.
///
/// Topics are authored once and never mutated during a run. Keyword sets may
/// overlap between topics; every topic counts its own occurrences.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Topic {
    pub level: u32,
    pub name: String,
    pub keywords: Vec<String>,
    pub min_occurrences: u32,
    pub xp_reward: u64,
}

impl Topic {
    /// Creates a new topic definition.
    pub fn new(
        level: u32,
        name: impl Into<String>,
        keywords: &[&str],
        min_occurrences: u32,
        xp_reward: u64,
    ) -> Self {
        Self {
            level,
            name: name.into(),
            keywords: keywords.iter().map(|k| k.to_string()).collect(),
            min_occurrences,
            xp_reward,
        }
    }

    /// Checks if `found` occurrences are enough to call the topic completed.
    pub fn is_completed(&self, found: u64) -> bool {
        found >= u64::from(self.min_occurrences)
    }
}

/// Per-run occurrence counters keyed by topic name.
///
/// Counters start at zero every run and are never persisted. Merging is plain
/// addition, so the order in which scanned blobs are folded does not matter.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScanCounts {
    found: HashMap<String, u64>,
}

impl ScanCounts {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds `count` occurrences to `topic`.
    pub fn add(&mut self, topic: &str, count: u64) {
        if count == 0 {
            return;
        }
        *self.found.entry(topic.to_string()).or_insert(0) += count;
    }

    /// Folds another set of counters into this one.
    pub fn merge(&mut self, other: ScanCounts) {
        for (topic, count) in other.found {
            *self.found.entry(topic).or_insert(0) += count;
        }
    }

    /// Occurrences found for `topic` so far this run.
    pub fn found(&self, topic: &str) -> u64 {
        self.found.get(topic).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.found.is_empty()
    }
}
