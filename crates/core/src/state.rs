//! Learner State
//!
//! The durable record of a learner's progress and the auxiliary snapshot of
//! topics that have already been rewarded. Both are self-describing JSON
//! records: missing fields fall back to defaults and unknown fields are ignored.

use crate::league::League;
use chrono::NaiveDate;
use serde::de::IgnoredAny;
use serde::{Deserialize, Deserializer, Serialize};
use std::collections::BTreeSet;

/// Persistent, authoritative progress record for one learner.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct LearnerState {
    pub username: String,
    pub total_xp: u64,
    pub current_streak: u32,
    pub longest_streak: u32,
    pub total_activity_count: u64,
    pub level: u32,
    /// Derived from level and XP every run. Unrecognized stored values read as
    /// the default league.
    #[serde(deserialize_with = "lenient_league")]
    pub league: League,
    /// Topics evidenced by the most recent run.
    pub completed_topic_count: usize,
    pub last_activity_date: Option<NaiveDate>,
    /// Only ever grows.
    pub unlocked_achievements: BTreeSet<String>,
    /// Inactivity days penalized by the most recent run.
    pub penalty_days: u32,
}

fn lenient_league<'de, D>(deserializer: D) -> Result<League, D::Error>
where
    D: Deserializer<'de>,
{
    #[derive(Deserialize)]
    #[serde(untagged)]
    enum Stored {
        Known(League),
        Unknown(IgnoredAny),
    }

    Ok(match Stored::deserialize(deserializer)? {
        Stored::Known(league) => league,
        Stored::Unknown(_) => League::default(),
    })
}

impl Default for LearnerState {
    fn default() -> Self {
        Self {
            username: String::new(),
            total_xp: 0,
            current_streak: 0,
            longest_streak: 0,
            total_activity_count: 0,
            level: 1,
            league: League::Bronze,
            completed_topic_count: 0,
            last_activity_date: None,
            unlocked_achievements: BTreeSet::new(),
            penalty_days: 0,
        }
    }
}

impl LearnerState {
    /// First-run defaults for `username`.
    pub fn new(username: impl Into<String>) -> Self {
        Self {
            username: username.into(),
            ..Self::default()
        }
    }

    pub fn has_unlocked(&self, achievement_id: &str) -> bool {
        self.unlocked_achievements.contains(achievement_id)
    }

    /// Restores the invariants a hand-edited or older record may violate.
    pub fn normalize(&mut self) {
        self.level = self.level.max(1);
        self.longest_streak = self.longest_streak.max(self.current_streak);
        self.league = League::derive(self.level, self.total_xp);
    }
}

/// Names of topics that have already been rewarded, persisted between runs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CompletedTopics(BTreeSet<String>);

impl CompletedTopics {
    pub fn contains(&self, name: &str) -> bool {
        self.0.contains(name)
    }

    pub fn insert(&mut self, name: impl Into<String>) -> bool {
        self.0.insert(name.into())
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.0.iter()
    }
}

impl<S: Into<String>> FromIterator<S> for CompletedTopics {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        Self(iter.into_iter().map(Into::into).collect())
    }
}

impl<S: Into<String>> Extend<S> for CompletedTopics {
    fn extend<I: IntoIterator<Item = S>>(&mut self, iter: I) {
        self.0.extend(iter.into_iter().map(Into::into));
    }
}
