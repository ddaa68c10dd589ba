//! Report Rendering
//!
//! Pure functions that turn a finished run into the Markdown message sent to
//! chat channels and into the compact record pushed to the leaderboard.

use crate::engine::RunOutcome;
use crate::league::level_title;
use crate::state::LearnerState;
use crate::syllabus::Syllabus;
use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

const BAR_WIDTH: usize = 10;
const MAX_LISTED_TOPICS: usize = 5;

/// Renders a `width`-cell progress bar for `percent` (clamped to 0..=100).
pub fn progress_bar(percent: f64, width: usize) -> String {
    let percent = percent.clamp(0.0, 100.0);
    let filled = ((percent / 100.0) * width as f64) as usize;
    (0..width)
        .map(|i| if i < filled { '▰' } else { '▱' })
        .collect()
}

fn streak_flair(streak: u32) -> Option<&'static str> {
    match streak {
        s if s >= 30 => Some("Legendary!"),
        s if s >= 14 => Some("Incredible!"),
        s if s >= 7 => Some("Excellent!"),
        _ => None,
    }
}

/// Renders the human-readable run report.
pub fn render_report(outcome: &RunOutcome, syllabus: &Syllabus) -> String {
    let state = &outcome.state;
    let mut report = String::from("🎮 GO LEARNING TRACKER\n\n");

    report.push_str(&format!("👤 {}\n", state.username));
    report.push_str(&format!(
        "⚡ Level {} · {} · {} XP",
        state.level,
        level_title(state.level),
        state.total_xp
    ));
    if outcome.xp_gained > 0 {
        report.push_str(&format!(" *(+{})*", outcome.xp_gained));
    }
    report.push_str(&format!("\n🛡 {}\n\n", state.league));

    report.push_str(&format!(
        "{} {:.0}%\n",
        progress_bar(outcome.percent, BAR_WIDTH),
        outcome.percent
    ));
    report.push_str(&format!(
        "{}/{} topics · {} commits\n",
        state.completed_topic_count,
        syllabus.len(),
        state.total_activity_count
    ));

    if state.current_streak >= 3 {
        report.push_str(&format!(
            "\n🔥 Hot streak: {} days in a row",
            state.current_streak
        ));
        if let Some(flair) = streak_flair(state.current_streak) {
            report.push_str(&format!(" · {}", flair));
        }
        report.push('\n');
    }

    if outcome.penalty_xp > 0 || state.penalty_days > 0 {
        report.push_str(&format!(
            "\n⚠️ Lost focus: -{} XP ({} days without practice)\n",
            outcome.penalty_xp, state.penalty_days
        ));
    }

    if outcome.regressed > 0 {
        report.push_str(&format!(
            "\n💡 {} topics are no longer found in the code; earned XP is kept\n",
            outcome.regressed
        ));
    }

    if !outcome.newly_unlocked.is_empty() {
        report.push_str("\n🎉 New achievement unlocked!\n");
        for achievement in &outcome.newly_unlocked {
            report.push_str(&format!(
                "{} {} *(+{} XP)*\n",
                achievement.icon, achievement.name, achievement.xp_reward
            ));
        }
    }

    report.push_str(&format!("\n🎯 Next goal: {}\n", outcome.next_goal));

    report.push_str("\nProgress:\n");
    let mut levels = vec![state.level];
    if state.level < syllabus.max_level() {
        levels.push(state.level + 1);
    }
    let listed = levels
        .iter()
        .flat_map(|level| syllabus.topics_at_level(*level))
        .take(MAX_LISTED_TOPICS);
    for topic in listed {
        let mark = if topic.is_completed(outcome.counts.found(&topic.name)) {
            "✓"
        } else {
            "→"
        };
        report.push_str(&format!("  {} {}\n", mark, topic.name));
    }

    report.push_str("\n#golang #buildinpublic\n");
    report
}

/// Compact summary record for the shared leaderboard.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LeaderboardEntry {
    pub username: String,
    pub total_xp: u64,
    pub level: u32,
    pub league: String,
    pub completed_topics: usize,
    pub current_streak: u32,
    pub last_update: String,
}

impl LeaderboardEntry {
    pub fn from_state(state: &LearnerState, at: NaiveDateTime) -> Self {
        Self {
            username: state.username.clone(),
            total_xp: state.total_xp,
            level: state.level,
            league: state.league.to_string(),
            completed_topics: state.completed_topic_count,
            current_streak: state.current_streak,
            last_update: at.format("%Y-%m-%d %H:%M:%S").to_string(),
        }
    }
}
