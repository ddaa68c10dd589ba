//! Progress Engine
//!
//! Ties the scanner, the completion calculator, the temporal calculator and the
//! achievement registry into one pure scan-compute cycle. The engine never
//! touches the filesystem or the network: it takes the loaded state, the
//! rewarded-topic snapshot, the text to scan and today's date, and returns the
//! next state together with everything a report needs.

use crate::achievement::{Achievement, AchievementRegistry};
use crate::completion::{self, NextGoal};
use crate::league::League;
use crate::scanner;
use crate::state::{CompletedTopics, LearnerState};
use crate::streak;
use crate::syllabus::Syllabus;
use crate::topic::{ScanCounts, Topic};
use chrono::NaiveDate;
use tracing::info;

/// Tunable XP rules.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RewardRules {
    /// XP removed per missed day beyond the first.
    pub penalty_per_day: u64,
    /// XP per streak day, granted once on the first run of each day.
    pub streak_bonus_per_day: u64,
}

impl Default for RewardRules {
    fn default() -> Self {
        Self {
            penalty_per_day: 30,
            streak_bonus_per_day: 20,
        }
    }
}

/// `after - before` as a signed value, saturating at the `i64` bounds.
fn signed_delta(before: u64, after: u64) -> i64 {
    let delta = i128::from(after) - i128::from(before);
    i64::try_from(delta).unwrap_or(if delta > 0 { i64::MAX } else { i64::MIN })
}

/// Everything one run produced.
#[derive(Debug, Clone)]
pub struct RunOutcome {
    pub state: LearnerState,
    /// Snapshot to persist for the next run.
    pub completed: CompletedTopics,
    /// Net XP change over the run, penalties included.
    pub xp_delta: i64,
    /// XP earned this run from topics, streak bonus and achievements.
    pub xp_gained: u64,
    pub penalty_xp: u64,
    pub streak_bonus_xp: u64,
    pub newly_completed: Vec<Topic>,
    pub newly_unlocked: Vec<Achievement>,
    pub next_goal: NextGoal,
    pub regressed: usize,
    pub counts: ScanCounts,
    pub percent: f64,
}

/// The gamification engine, configured with a syllabus and achievement table.
#[derive(Debug, Clone)]
pub struct ProgressEngine {
    syllabus: Syllabus,
    achievements: AchievementRegistry,
    rules: RewardRules,
}

impl Default for ProgressEngine {
    fn default() -> Self {
        Self::new(
            Syllabus::go_curriculum(),
            AchievementRegistry::standard(),
            RewardRules::default(),
        )
    }
}

impl ProgressEngine {
    pub fn new(syllabus: Syllabus, achievements: AchievementRegistry, rules: RewardRules) -> Self {
        Self {
            syllabus,
            achievements,
            rules,
        }
    }

    pub fn syllabus(&self) -> &Syllabus {
        &self.syllabus
    }

    pub fn achievements(&self) -> &AchievementRegistry {
        &self.achievements
    }

    pub fn rules(&self) -> RewardRules {
        self.rules
    }

    /// Runs one scan-compute cycle.
    pub fn run<'a, I>(
        &self,
        mut state: LearnerState,
        previously_completed: &CompletedTopics,
        blobs: I,
        today: NaiveDate,
    ) -> RunOutcome
    where
        I: IntoIterator<Item = &'a str>,
    {
        state.normalize();
        let xp_before = state.total_xp;

        let temporal = streak::apply(&mut state, today, self.rules.penalty_per_day);
        state.total_activity_count = state.total_activity_count.saturating_add(1);

        let counts = scanner::scan_all(&self.syllabus, blobs);
        let completion = completion::evaluate(&self.syllabus, &counts, previously_completed);

        let streak_bonus_xp = if temporal.day_advanced {
            u64::from(state.current_streak).saturating_mul(self.rules.streak_bonus_per_day)
        } else {
            0
        };
        if streak_bonus_xp > 0 {
            info!(streak = state.current_streak, xp = streak_bonus_xp, "Streak bonus");
        }

        state.total_xp = state
            .total_xp
            .saturating_add(completion.xp_awarded)
            .saturating_add(streak_bonus_xp);
        state.level = state.level.max(completion.current_level);
        state.completed_topic_count = completion.completed.len();
        state.league = League::derive(state.level, state.total_xp);

        let newly_unlocked = self.achievements.evaluate(&mut state, &counts, &self.syllabus);
        let achievement_xp: u64 = newly_unlocked.iter().map(|a| a.xp_reward).sum();
        state.league = League::derive(state.level, state.total_xp);

        let mut completed = previously_completed.clone();
        completed.extend(completion.completed.iter().cloned());

        let xp_gained = completion
            .xp_awarded
            .saturating_add(streak_bonus_xp)
            .saturating_add(achievement_xp);
        let xp_delta = signed_delta(xp_before, state.total_xp);

        info!(
            user = %state.username,
            total_xp = state.total_xp,
            xp_delta,
            level = state.level,
            league = %state.league,
            streak = state.current_streak,
            completed = state.completed_topic_count,
            "Run computed"
        );

        RunOutcome {
            state,
            completed,
            xp_delta,
            xp_gained,
            penalty_xp: temporal.penalty_xp,
            streak_bonus_xp,
            newly_completed: completion.newly_completed,
            newly_unlocked,
            next_goal: completion.next_goal,
            regressed: completion.regressed,
            counts,
            percent: completion.percent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_signed_delta_saturates() {
        assert_eq!(signed_delta(100, 40), -60);
        assert_eq!(signed_delta(40, 100), 60);
        assert_eq!(signed_delta(0, u64::MAX), i64::MAX);
        assert_eq!(signed_delta(u64::MAX, 0), i64::MIN);
        assert_eq!(signed_delta(u64::MAX, u64::MAX), 0);
    }

    const VARS: &str = "var name string\nvar age int\n";

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 6, d).unwrap()
    }

    fn engine() -> ProgressEngine {
        let syllabus = Syllabus::new(vec![
            Topic::new(1, "Variables", &["var "], 2, 50),
            Topic::new(2, "Loops", &["for "], 1, 75),
        ])
        .unwrap();
        let achievements = AchievementRegistry::new(vec![Achievement {
            id: "first_commit",
            name: "First Step",
            description: "Made the first commit",
            icon: "🎯",
            xp_reward: 100,
            predicate: |ctx| ctx.state.total_activity_count >= 1,
        }])
        .unwrap();
        ProgressEngine::new(
            syllabus,
            achievements,
            RewardRules {
                penalty_per_day: 30,
                streak_bonus_per_day: 0,
            },
        )
    }

    fn run(
        engine: &ProgressEngine,
        state: LearnerState,
        snapshot: &CompletedTopics,
        code: &str,
        today: NaiveDate,
    ) -> RunOutcome {
        engine.run(state, snapshot, [code], today)
    }

    #[test]
    fn test_first_run_scenario() {
        let engine = engine();
        let outcome = run(
            &engine,
            LearnerState::new("gopher"),
            &CompletedTopics::default(),
            VARS,
            day(1),
        );

        assert_eq!(outcome.state.level, 1);
        assert_eq!(outcome.state.current_streak, 1);
        assert_eq!(outcome.state.penalty_days, 0);
        assert_eq!(outcome.newly_completed.len(), 1);
        assert_eq!(outcome.newly_unlocked.len(), 1);
        // Topic reward plus the first-commit achievement.
        assert_eq!(outcome.state.total_xp, 150);
        assert_eq!(outcome.xp_delta, 150);
        assert_eq!(outcome.next_goal, NextGoal::Topic("Loops".to_string()));
        assert!(outcome.completed.contains("Variables"));
    }

    #[test]
    fn test_same_day_rerun_is_idempotent() {
        let engine = engine();
        let first = run(
            &engine,
            LearnerState::new("gopher"),
            &CompletedTopics::default(),
            VARS,
            day(1),
        );
        let second = run(&engine, first.state.clone(), &first.completed, VARS, day(1));

        assert_eq!(second.state.total_xp, first.state.total_xp);
        assert_eq!(second.state.level, first.state.level);
        assert_eq!(
            second.state.unlocked_achievements,
            first.state.unlocked_achievements
        );
        assert_eq!(second.state.current_streak, 1);
        assert_eq!(second.xp_gained, 0);
        assert!(second.newly_unlocked.is_empty());
        assert_eq!(second.state.total_activity_count, 2);
    }

    #[test]
    fn test_gap_applies_penalty_before_rewards() {
        let engine = engine();
        let first = run(
            &engine,
            LearnerState::new("gopher"),
            &CompletedTopics::default(),
            VARS,
            day(1),
        );
        let second = run(&engine, first.state, &first.completed, VARS, day(1));
        let third = run(&engine, second.state, &second.completed, VARS, day(4));

        assert_eq!(third.penalty_xp, 60);
        assert_eq!(third.state.total_xp, 90);
        assert_eq!(third.state.current_streak, 1);
        assert_eq!(third.state.penalty_days, 2);
        assert_eq!(third.xp_delta, -60);
    }

    #[test]
    fn test_removing_code_keeps_xp_and_unlocks() {
        let engine = engine();
        let first = run(
            &engine,
            LearnerState::new("gopher"),
            &CompletedTopics::default(),
            "var a int\nvar b int\nfor x {}",
            day(1),
        );
        assert_eq!(first.state.level, 2);
        let xp = first.state.total_xp;

        let second = run(&engine, first.state.clone(), &first.completed, "", day(1));
        assert_eq!(second.state.total_xp, xp);
        assert_eq!(second.state.level, 2);
        assert_eq!(second.regressed, 2);
        assert_eq!(second.state.completed_topic_count, 0);
        assert!(
            second.state.unlocked_achievements.len() >= first.state.unlocked_achievements.len()
        );

        // Restoring the code does not award the topics a second time.
        let third = run(
            &engine,
            second.state.clone(),
            &second.completed,
            "var a int\nvar b int\nfor x {}",
            day(1),
        );
        assert_eq!(third.state.total_xp, xp);
        assert!(third.newly_completed.is_empty());
    }

    #[test]
    fn test_consecutive_days_grow_streak_with_bonus() {
        let engine = ProgressEngine::new(
            engine().syllabus().clone(),
            AchievementRegistry::new(vec![]).unwrap(),
            RewardRules::default(),
        );
        let mut state = LearnerState::new("gopher");
        let snapshot = CompletedTopics::default();
        let mut last_streak = 0;
        let mut xp = 0;
        for d in 1..=4 {
            let outcome = run(&engine, state, &snapshot, "", day(d));
            assert!(outcome.state.current_streak > last_streak);
            assert_eq!(
                outcome.streak_bonus_xp,
                u64::from(outcome.state.current_streak) * 20
            );
            last_streak = outcome.state.current_streak;
            xp += outcome.streak_bonus_xp;
            assert_eq!(outcome.state.total_xp, xp);
            state = outcome.state;
        }

        // A second run on the same day earns no further bonus.
        let again = run(&engine, state, &snapshot, "", day(4));
        assert_eq!(again.streak_bonus_xp, 0);
        assert_eq!(again.state.total_xp, xp);
    }

    #[test]
    fn test_default_engine_league_follows_final_xp() {
        let engine = ProgressEngine::default();
        let state = LearnerState {
            total_xp: 950,
            last_activity_date: Some(day(1)),
            current_streak: 1,
            longest_streak: 1,
            total_activity_count: 5,
            unlocked_achievements: ["first_commit".to_string()].into_iter().collect(),
            ..LearnerState::new("gopher")
        };
        let outcome = engine.run(
            state,
            &CompletedTopics::default(),
            ["var a = 1\nvar b = 2"],
            day(2),
        );
        // 950 + 50 (topic) + 40 (streak 2 * 20) crosses into Silver.
        assert_eq!(outcome.state.total_xp, 1040);
        assert_eq!(outcome.state.league, League::Silver);
    }

    #[test]
    fn test_xp_never_negative_and_unlocks_monotonic() {
        let engine = engine();
        let mut state = LearnerState::new("gopher");
        let mut snapshot = CompletedTopics::default();
        let mut unlocked = 0;
        for (d, code) in [(1, VARS), (9, ""), (28, "")] {
            let outcome = run(&engine, state, &snapshot, code, day(d));
            assert!(outcome.state.unlocked_achievements.len() >= unlocked);
            unlocked = outcome.state.unlocked_achievements.len();
            state = outcome.state;
            snapshot = outcome.completed;
        }
        assert_eq!(state.total_xp, 0);
        assert_eq!(unlocked, 1);
    }
}
