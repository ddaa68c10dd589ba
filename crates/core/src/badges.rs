//! README progress badges (shields.io).

use crate::state::LearnerState;

const BADGE_PREFIXES: [&str; 5] = ["![Level]", "![Progress]", "![Streak]", "![XP]", "![League]"];

/// Renders the five badge lines for the learner.
pub fn render(state: &LearnerState, percent: f64) -> String {
    let league = state.league.to_string().replace(' ', "_");
    [
        format!("![Level](https://img.shields.io/badge/Level-{}-blue)", state.level),
        format!("![Progress](https://img.shields.io/badge/Progress-{:.0}%25-brightgreen)", percent),
        format!("![Streak](https://img.shields.io/badge/Streak-{}_days-orange)", state.current_streak),
        format!("![XP](https://img.shields.io/badge/XP-{}-purple)", state.total_xp),
        format!("![League](https://img.shields.io/badge/League-{}-gold)", league),
    ]
    .join("\n")
}

/// Replaces an existing badge block in `readme`, or inserts `block` after the
/// first line when there is none.
pub fn apply(readme: &str, block: &str) -> String {
    let lines: Vec<&str> = readme.lines().collect();

    let existing = lines.windows(BADGE_PREFIXES.len()).position(|window| {
        window
            .iter()
            .zip(BADGE_PREFIXES)
            .all(|(line, prefix)| line.starts_with(prefix))
    });

    let mut out: Vec<&str> = Vec::with_capacity(lines.len() + BADGE_PREFIXES.len() + 2);
    match existing {
        Some(start) => {
            out.extend(&lines[..start]);
            out.push(block);
            out.extend(&lines[start + BADGE_PREFIXES.len()..]);
        }
        None if lines.is_empty() => out.push(block),
        None => {
            out.push(lines[0]);
            out.extend(["", block, ""]);
            out.extend(&lines[1..]);
        }
    }

    let mut content = out.join("\n");
    if readme.ends_with('\n') {
        content.push('\n');
    }
    content
}
