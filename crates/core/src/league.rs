use serde::{Deserialize, Serialize};
use std::fmt;

/// Qualitative tier derived from level and cumulative XP.
///
/// The league is always recomputed from `(level, total_xp)`; it is stored
/// alongside the learner state only so external readers can see it.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum League {
    #[default]
    Bronze,
    Silver,
    Gold,
    Diamond,
}

impl League {
    /// Maps a level and XP total onto a tier. Either criterion is enough.
    pub fn derive(level: u32, total_xp: u64) -> Self {
        if level >= 7 || total_xp >= 3000 {
            League::Diamond
        } else if level >= 5 || total_xp >= 2000 {
            League::Gold
        } else if level >= 3 || total_xp >= 1000 {
            League::Silver
        } else {
            League::Bronze
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            League::Bronze => "Bronze",
            League::Silver => "Silver",
            League::Gold => "Gold",
            League::Diamond => "Diamond",
        }
    }

    pub fn icon(&self) -> &'static str {
        match self {
            League::Bronze => "🥉",
            League::Silver => "🥈",
            League::Gold => "🥇",
            League::Diamond => "💎",
        }
    }
}

impl fmt::Display for League {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.icon(), self.name())
    }
}

/// Fantasy rank shown next to a level number. Unknown levels fall back to the first rank.
pub fn level_title(level: u32) -> &'static str {
    match level {
        2 => "Apprentice ⚔️",
        3 => "Seeker 🗡️",
        4 => "Pathfinder 🏹",
        5 => "Sorcerer 🔮",
        6 => "Archmage ⚡",
        7 => "Grandmaster 👑",
        _ => "Novice 🌱",
    }
}
