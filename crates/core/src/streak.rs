//! Temporal Progress
//!
//! Streak continuation, streak reset and inactivity penalties, all driven by the
//! gap between the last recorded activity date and the date of the current run.

use crate::state::LearnerState;
use chrono::NaiveDate;
use tracing::{info, warn};

/// What the temporal step did to the learner state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StreakUpdate {
    /// Whole days since the last activity; `None` on the first run ever.
    pub gap_days: Option<i64>,
    pub penalty_days: u32,
    /// XP actually removed after clamping at zero.
    pub penalty_xp: u64,
    /// True when this is the first run of a new calendar day.
    pub day_advanced: bool,
}

/// Applies the streak state machine for a run on `today`.
///
/// Penalties are deducted before this run's rewards are added. A `today` earlier
/// than the last activity date is treated as the same day and does not move the
/// recorded date backwards.
pub fn apply(state: &mut LearnerState, today: NaiveDate, penalty_per_day: u64) -> StreakUpdate {
    let update = match state.last_activity_date {
        None => {
            state.current_streak = 1;
            state.longest_streak = state.longest_streak.max(1);
            state.penalty_days = 0;
            StreakUpdate {
                gap_days: None,
                penalty_days: 0,
                penalty_xp: 0,
                day_advanced: true,
            }
        }
        Some(last) => {
            let mut gap = (today - last).num_days();
            if gap < 0 {
                warn!(%last, %today, "Last activity is in the future; treating as same day");
                gap = 0;
            }
            match gap {
                0 => {
                    state.penalty_days = 0;
                    StreakUpdate {
                        gap_days: Some(0),
                        penalty_days: 0,
                        penalty_xp: 0,
                        day_advanced: false,
                    }
                }
                1 => {
                    state.current_streak = state.current_streak.saturating_add(1);
                    state.penalty_days = 0;
                    StreakUpdate {
                        gap_days: Some(1),
                        penalty_days: 0,
                        penalty_xp: 0,
                        day_advanced: true,
                    }
                }
                _ => {
                    let missed = u32::try_from(gap - 1).unwrap_or(u32::MAX);
                    let wanted = u64::from(missed).saturating_mul(penalty_per_day);
                    let penalty_xp = wanted.min(state.total_xp);
                    state.total_xp -= penalty_xp;
                    state.current_streak = 1;
                    state.penalty_days = missed;
                    info!(missed_days = missed, penalty_xp, "Inactivity penalty applied");
                    StreakUpdate {
                        gap_days: Some(gap),
                        penalty_days: missed,
                        penalty_xp,
                        day_advanced: true,
                    }
                }
            }
        }
    };

    state.longest_streak = state.longest_streak.max(state.current_streak);
    state.last_activity_date = match state.last_activity_date {
        Some(last) if last > today => Some(last),
        _ => Some(today),
    };
    update
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 5, d).unwrap()
    }

    fn state_on(last: NaiveDate, streak: u32, xp: u64) -> LearnerState {
        LearnerState {
            last_activity_date: Some(last),
            current_streak: streak,
            longest_streak: streak,
            total_xp: xp,
            ..LearnerState::new("gopher")
        }
    }

    #[test]
    fn test_first_run_starts_streak() {
        let mut state = LearnerState::new("gopher");
        let update = apply(&mut state, day(1), 30);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 1);
        assert_eq!(state.penalty_days, 0);
        assert_eq!(state.last_activity_date, Some(day(1)));
        assert!(update.day_advanced);
        assert_eq!(update.gap_days, None);
    }

    #[test]
    fn test_same_day_keeps_streak() {
        let mut state = state_on(day(4), 3, 500);
        let update = apply(&mut state, day(4), 30);
        assert_eq!(state.current_streak, 3);
        assert_eq!(state.total_xp, 500);
        assert!(!update.day_advanced);
    }

    #[test]
    fn test_consecutive_days_grow_streak() {
        let mut state = state_on(day(1), 1, 0);
        for (offset, expected) in (2..=5).zip(2..) {
            apply(&mut state, day(offset), 30);
            assert_eq!(state.current_streak, expected);
            assert!(state.current_streak <= state.longest_streak);
        }
        assert_eq!(state.longest_streak, 5);
    }

    #[test]
    fn test_gap_resets_streak_and_penalizes() {
        let mut state = state_on(day(1), 6, 1000);
        let update = apply(&mut state, day(4), 30);
        assert_eq!(state.current_streak, 1);
        assert_eq!(state.longest_streak, 6);
        assert_eq!(state.penalty_days, 2);
        assert_eq!(update.penalty_xp, 60);
        assert_eq!(state.total_xp, 940);
    }

    #[test]
    fn test_penalty_clamps_at_zero() {
        let mut state = state_on(day(1), 2, 40);
        let update = apply(&mut state, day(20), 30);
        assert_eq!(state.total_xp, 0);
        assert_eq!(update.penalty_xp, 40);
        assert_eq!(state.penalty_days, 18);
    }

    #[test]
    fn test_clock_skew_is_same_day() {
        let mut state = state_on(day(10), 4, 300);
        let update = apply(&mut state, day(8), 30);
        assert_eq!(update.gap_days, Some(0));
        assert_eq!(state.current_streak, 4);
        assert_eq!(state.total_xp, 300);
        assert_eq!(state.last_activity_date, Some(day(10)));
    }
}
