//! Achievement Engine
//!
//! A registry of one-time milestones. Each achievement owns a pure predicate over
//! the learner state and this run's topic counters, so every rule can be tested
//! on its own. The registry evaluates every locked achievement once per run.

use crate::state::LearnerState;
use crate::syllabus::Syllabus;
use crate::topic::ScanCounts;
use std::collections::HashSet;
use tracing::info;

/// Read-only view handed to achievement predicates.
pub struct AchievementContext<'a> {
    pub state: &'a LearnerState,
    counts: &'a ScanCounts,
    syllabus: &'a Syllabus,
}

impl<'a> AchievementContext<'a> {
    pub fn new(state: &'a LearnerState, counts: &'a ScanCounts, syllabus: &'a Syllabus) -> Self {
        Self {
            state,
            counts,
            syllabus,
        }
    }

    /// Occurrences of `topic` found this run.
    pub fn found(&self, topic: &str) -> u64 {
        self.counts.found(topic)
    }

    /// Whether `topic` met its own threshold this run. Unknown topics never do.
    pub fn is_completed(&self, topic: &str) -> bool {
        self.syllabus
            .get(topic)
            .is_some_and(|t| t.is_completed(self.counts.found(topic)))
    }
}

pub type Predicate = fn(&AchievementContext<'_>) -> bool;

/// A one-time unlockable milestone.
#[derive(Debug, Clone)]
pub struct Achievement {
    pub id: &'static str,
    pub name: &'static str,
    pub description: &'static str,
    pub icon: &'static str,
    pub xp_reward: u64,
    pub predicate: Predicate,
}

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum AchievementError {
    #[error("Duplicate achievement id: {0}")]
    DuplicateId(String),
}

/// Ordered table of achievements keyed by id.
#[derive(Debug, Clone)]
pub struct AchievementRegistry {
    achievements: Vec<Achievement>,
}

impl AchievementRegistry {
    pub fn new(achievements: Vec<Achievement>) -> Result<Self, AchievementError> {
        let mut seen = HashSet::new();
        for achievement in &achievements {
            if !seen.insert(achievement.id) {
                return Err(AchievementError::DuplicateId(achievement.id.to_string()));
            }
        }
        Ok(Self { achievements })
    }

    /// The standard milestones for the built-in Go curriculum.
    pub fn standard() -> Self {
        Self {
            achievements: vec![
                Achievement {
                    id: "first_commit",
                    name: "First Step",
                    description: "Made the first commit",
                    icon: "🎯",
                    xp_reward: 100,
                    predicate: |ctx| ctx.state.total_activity_count >= 1,
                },
                Achievement {
                    id: "week_streak",
                    name: "Week on Fire",
                    description: "7 days in a row",
                    icon: "🔥",
                    xp_reward: 300,
                    predicate: |ctx| ctx.state.current_streak >= 7,
                },
                Achievement {
                    id: "month_streak",
                    name: "Unbreakable",
                    description: "30 days in a row",
                    icon: "💪",
                    xp_reward: 1000,
                    predicate: |ctx| ctx.state.current_streak >= 30,
                },
                Achievement {
                    id: "level_3",
                    name: "Bronze Warrior",
                    description: "Reached level 3",
                    icon: "🥉",
                    xp_reward: 200,
                    predicate: |ctx| ctx.state.level >= 3,
                },
                Achievement {
                    id: "level_5",
                    name: "Silver Master",
                    description: "Reached level 5",
                    icon: "🥈",
                    xp_reward: 500,
                    predicate: |ctx| ctx.state.level >= 5,
                },
                Achievement {
                    id: "level_7",
                    name: "Golden Guru",
                    description: "Reached level 7",
                    icon: "🥇",
                    xp_reward: 1000,
                    predicate: |ctx| ctx.state.level >= 7,
                },
                Achievement {
                    id: "maps_master",
                    name: "Cartographer",
                    description: "Used maps 10+ times",
                    icon: "🗺️",
                    xp_reward: 250,
                    predicate: |ctx| ctx.found("Maps") >= 10,
                },
                Achievement {
                    id: "concurrency_king",
                    name: "Lord of Threads",
                    description: "Mastered goroutines and channels",
                    icon: "⚡",
                    xp_reward: 400,
                    predicate: |ctx| ctx.is_completed("Goroutines") && ctx.is_completed("Channels"),
                },
                Achievement {
                    id: "error_handler",
                    name: "Error Warden",
                    description: "Handled 20+ errors",
                    icon: "🛡️",
                    xp_reward: 300,
                    predicate: |ctx| ctx.found("Error handling") >= 20,
                },
                Achievement {
                    id: "hundred_commits",
                    name: "Centurion",
                    description: "100 commits with Go code",
                    icon: "💯",
                    xp_reward: 2000,
                    predicate: |ctx| ctx.state.total_activity_count >= 100,
                },
            ],
        }
    }

    pub fn get(&self, id: &str) -> Option<&Achievement> {
        self.achievements.iter().find(|a| a.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Achievement> {
        self.achievements.iter()
    }

    pub fn len(&self) -> usize {
        self.achievements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.achievements.is_empty()
    }

    /// Unlocks every locked achievement whose predicate holds.
    ///
    /// All predicates see the same state: rewards are applied only after the
    /// whole table has been evaluated, so an unlock this run cannot trigger a
    /// second unlock through its own XP.
    pub fn evaluate(
        &self,
        state: &mut LearnerState,
        counts: &ScanCounts,
        syllabus: &Syllabus,
    ) -> Vec<Achievement> {
        let unlocked: Vec<Achievement> = {
            let ctx = AchievementContext::new(state, counts, syllabus);
            self.achievements
                .iter()
                .filter(|a| !ctx.state.has_unlocked(a.id))
                .filter(|a| (a.predicate)(&ctx))
                .cloned()
                .collect()
        };

        for achievement in &unlocked {
            info!(id = achievement.id, xp = achievement.xp_reward, "Achievement unlocked");
            state.unlocked_achievements.insert(achievement.id.to_string());
            state.total_xp = state.total_xp.saturating_add(achievement.xp_reward);
        }

        unlocked
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::topic::Topic;

    fn context_parts() -> (Syllabus, ScanCounts) {
        let syllabus = Syllabus::go_curriculum();
        (syllabus, ScanCounts::new())
    }

    fn check(id: &str, state: &LearnerState, counts: &ScanCounts, syllabus: &Syllabus) -> bool {
        let registry = AchievementRegistry::standard();
        let achievement = registry.get(id).expect("standard achievement");
        (achievement.predicate)(&AchievementContext::new(state, counts, syllabus))
    }

    #[test]
    fn test_standard_registry_is_valid() {
        let registry = AchievementRegistry::standard();
        assert_eq!(registry.len(), 10);
        assert!(AchievementRegistry::new(registry.iter().cloned().collect()).is_ok());
    }

    #[test]
    fn test_duplicate_ids_rejected() {
        let a = AchievementRegistry::standard().get("level_3").unwrap().clone();
        let err = AchievementRegistry::new(vec![a.clone(), a]).unwrap_err();
        assert_eq!(err, AchievementError::DuplicateId("level_3".to_string()));
    }

    #[test]
    fn test_activity_and_streak_rules() {
        let (syllabus, counts) = context_parts();
        let mut state = LearnerState::new("gopher");
        assert!(!check("first_commit", &state, &counts, &syllabus));
        state.total_activity_count = 1;
        assert!(check("first_commit", &state, &counts, &syllabus));
        assert!(!check("hundred_commits", &state, &counts, &syllabus));

        state.current_streak = 7;
        assert!(check("week_streak", &state, &counts, &syllabus));
        assert!(!check("month_streak", &state, &counts, &syllabus));
    }

    #[test]
    fn test_level_rules() {
        let (syllabus, counts) = context_parts();
        let state = LearnerState {
            level: 5,
            ..LearnerState::default()
        };
        assert!(check("level_3", &state, &counts, &syllabus));
        assert!(check("level_5", &state, &counts, &syllabus));
        assert!(!check("level_7", &state, &counts, &syllabus));
    }

    #[test]
    fn test_topic_count_rules() {
        let syllabus = Syllabus::go_curriculum();
        let state = LearnerState::default();
        let mut counts = ScanCounts::new();
        counts.add("Maps", 9);
        counts.add("Goroutines", 1);
        counts.add("Channels", 1);
        assert!(!check("maps_master", &state, &counts, &syllabus));
        assert!(!check("concurrency_king", &state, &counts, &syllabus));

        counts.add("Maps", 1);
        counts.add("Channels", 1);
        counts.add("Error handling", 20);
        assert!(check("maps_master", &state, &counts, &syllabus));
        assert!(check("concurrency_king", &state, &counts, &syllabus));
        assert!(check("error_handler", &state, &counts, &syllabus));
    }

    #[test]
    fn test_evaluate_unlocks_once_and_rewards() {
        let (syllabus, counts) = context_parts();
        let registry = AchievementRegistry::standard();
        let mut state = LearnerState {
            total_activity_count: 1,
            ..LearnerState::new("gopher")
        };

        let first = registry.evaluate(&mut state, &counts, &syllabus);
        assert_eq!(first.len(), 1);
        assert_eq!(first[0].id, "first_commit");
        assert_eq!(state.total_xp, 100);
        assert!(state.has_unlocked("first_commit"));

        let second = registry.evaluate(&mut state, &counts, &syllabus);
        assert!(second.is_empty());
        assert_eq!(state.total_xp, 100);
    }

    #[test]
    fn test_rewards_do_not_chain_within_a_pass() {
        let syllabus = Syllabus::new(vec![Topic::new(1, "Any", &["x"], 1, 1)]).unwrap();
        let registry = AchievementRegistry::new(vec![
            Achievement {
                id: "starter",
                name: "Starter",
                description: "",
                icon: "",
                xp_reward: 500,
                predicate: |ctx| ctx.state.total_activity_count >= 1,
            },
            Achievement {
                id: "rich",
                name: "Rich",
                description: "",
                icon: "",
                xp_reward: 10,
                predicate: |ctx| ctx.state.total_xp >= 500,
            },
        ])
        .unwrap();
        let mut state = LearnerState {
            total_activity_count: 1,
            ..LearnerState::default()
        };

        let unlocked = registry.evaluate(&mut state, &ScanCounts::new(), &syllabus);
        assert_eq!(unlocked.len(), 1);
        assert_eq!(state.total_xp, 500);

        // The next pass sees the XP earned by the previous one.
        let unlocked = registry.evaluate(&mut state, &ScanCounts::new(), &syllabus);
        assert_eq!(unlocked[0].id, "rich");
        assert_eq!(state.total_xp, 510);
    }

    #[test]
    fn test_unknown_topic_is_never_completed() {
        let (syllabus, counts) = context_parts();
        let state = LearnerState::default();
        let ctx = AchievementContext::new(&state, &counts, &syllabus);
        assert!(!ctx.is_completed("Quantum tunnelling"));
    }
}
