//! Progress tracking and gamification engine.
//!
//! The crate is pure computation: the caller supplies source text, the loaded
//! learner state and today's date, and gets back the next state plus the data
//! needed for reports and notifications. Persistence, discovery and delivery
//! live in the tracker service.

pub mod achievement;
pub mod badges;
pub mod completion;
pub mod engine;
pub mod league;
pub mod report;
pub mod scanner;
pub mod state;
pub mod streak;
pub mod syllabus;
pub mod topic;

pub use achievement::{Achievement, AchievementContext, AchievementRegistry};
pub use completion::NextGoal;
pub use engine::{ProgressEngine, RewardRules, RunOutcome};
pub use league::League;
pub use state::{CompletedTopics, LearnerState};
pub use syllabus::Syllabus;
pub use topic::{ScanCounts, Topic};
