//! Completion & Reward Calculation
//!
//! Compares this run's keyword counts against every topic threshold and against
//! the set of topics that were already rewarded. Only first-time completions earn
//! XP; topics that lose their evidence (refactors, deleted files) keep the XP they
//! already earned.

use crate::state::CompletedTopics;
use crate::syllabus::Syllabus;
use crate::topic::{ScanCounts, Topic};
use std::fmt;
use tracing::{info, warn};

/// The hint shown to the learner about what to practice next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum NextGoal {
    Topic(String),
    AllComplete,
}

impl fmt::Display for NextGoal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            NextGoal::Topic(name) => write!(f, "{}", name),
            NextGoal::AllComplete => write!(f, "All topics complete! 🎉"),
        }
    }
}

/// Result of comparing one run's evidence against the syllabus.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionOutcome {
    /// Names of topics completed this run, in syllabus order.
    pub completed: Vec<String>,
    /// Topics completed this run that had never been rewarded before.
    pub newly_completed: Vec<Topic>,
    pub next_goal: NextGoal,
    /// Highest level among topics completed this run, floor 1.
    pub current_level: u32,
    /// How many previously rewarded topics are no longer evidenced.
    pub regressed: usize,
    pub xp_awarded: u64,
    pub percent: f64,
}

/// Evaluates topic completion for a run.
pub fn evaluate(
    syllabus: &Syllabus,
    counts: &ScanCounts,
    previously_completed: &CompletedTopics,
) -> CompletionOutcome {
    let mut completed = Vec::new();
    let mut newly_completed = Vec::new();
    let mut next_goal = None;
    let mut current_level = 1;
    let mut xp_awarded = 0u64;

    for topic in syllabus.topics() {
        if topic.is_completed(counts.found(&topic.name)) {
            if !previously_completed.contains(&topic.name) {
                info!(topic = %topic.name, xp = topic.xp_reward, "New topic completed");
                xp_awarded = xp_awarded.saturating_add(topic.xp_reward);
                newly_completed.push(topic.clone());
            }
            current_level = current_level.max(topic.level);
            completed.push(topic.name.clone());
        } else if next_goal.is_none() {
            next_goal = Some(NextGoal::Topic(topic.name.clone()));
        }
    }

    let regressed = previously_completed
        .iter()
        .filter(|name| !completed.iter().any(|c| c == *name))
        .count();
    if regressed > 0 {
        warn!(
            regressed,
            "Previously completed topics are no longer found in the code; earned XP is kept"
        );
    }

    let percent = if syllabus.is_empty() {
        0.0
    } else {
        completed.len() as f64 / syllabus.len() as f64 * 100.0
    };

    CompletionOutcome {
        completed,
        newly_completed,
        next_goal: next_goal.unwrap_or(NextGoal::AllComplete),
        current_level,
        regressed,
        xp_awarded,
        percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn syllabus() -> Syllabus {
        Syllabus::new(vec![
            Topic::new(1, "Variables", &["var "], 1, 50),
            Topic::new(2, "Loops", &["for "], 2, 75),
            Topic::new(3, "Maps", &["map["], 2, 100),
        ])
        .unwrap()
    }

    fn counts(pairs: &[(&str, u64)]) -> ScanCounts {
        let mut counts = ScanCounts::new();
        for (name, n) in pairs {
            counts.add(name, *n);
        }
        counts
    }

    #[test]
    fn test_first_completion_awards_xp() {
        let outcome = evaluate(
            &syllabus(),
            &counts(&[("Variables", 1), ("Loops", 1)]),
            &CompletedTopics::default(),
        );
        assert_eq!(outcome.completed, vec!["Variables".to_string()]);
        assert_eq!(outcome.newly_completed.len(), 1);
        assert_eq!(outcome.xp_awarded, 50);
        assert_eq!(outcome.current_level, 1);
        assert_eq!(outcome.next_goal, NextGoal::Topic("Loops".to_string()));
        assert_eq!(outcome.regressed, 0);
    }

    #[test]
    fn test_previously_completed_topics_are_not_rewarded_again() {
        let previous: CompletedTopics = ["Variables"].into_iter().collect();
        let outcome = evaluate(
            &syllabus(),
            &counts(&[("Variables", 5), ("Loops", 2)]),
            &previous,
        );
        assert_eq!(outcome.completed.len(), 2);
        assert_eq!(outcome.newly_completed[0].name, "Loops");
        assert_eq!(outcome.xp_awarded, 75);
        assert_eq!(outcome.current_level, 2);
    }

    #[test]
    fn test_all_complete_sentinel() {
        let outcome = evaluate(
            &syllabus(),
            &counts(&[("Variables", 1), ("Loops", 2), ("Maps", 2)]),
            &CompletedTopics::default(),
        );
        assert_eq!(outcome.next_goal, NextGoal::AllComplete);
        assert_eq!(outcome.current_level, 3);
        assert_eq!(outcome.percent, 100.0);
        assert_eq!(outcome.xp_awarded, 225);
    }

    #[test]
    fn test_regression_is_reported_without_reward_changes() {
        let previous: CompletedTopics = ["Variables", "Loops"].into_iter().collect();
        let outcome = evaluate(&syllabus(), &counts(&[("Variables", 1)]), &previous);
        assert_eq!(outcome.regressed, 1);
        assert_eq!(outcome.xp_awarded, 0);
        assert!(outcome.newly_completed.is_empty());
    }

    #[test]
    fn test_level_floor_is_one_without_evidence() {
        let outcome = evaluate(&syllabus(), &ScanCounts::new(), &CompletedTopics::default());
        assert_eq!(outcome.current_level, 1);
        assert_eq!(outcome.percent, 0.0);
        assert_eq!(outcome.next_goal, NextGoal::Topic("Variables".to_string()));
    }

    #[test]
    fn test_next_goal_display() {
        assert_eq!(NextGoal::Topic("Maps".into()).to_string(), "Maps");
        assert!(NextGoal::AllComplete.to_string().starts_with("All topics complete"));
    }
}
