//! Syllabus Catalog
//!
//! The syllabus is the ordered, leveled list of topics a learner works through.
//! It is plain configuration data handed to the engine at construction, so tests
//! can substitute small synthetic catalogs for the built-in curriculum.

use crate::topic::Topic;
use std::collections::HashSet;

/// Errors raised while assembling a syllabus.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum SyllabusError {
    #[error("Duplicate topic name: {0}")]
    DuplicateTopic(String),
    #[error("Topic '{0}' has no keywords")]
    NoKeywords(String),
}

/// An ordered catalog of topics. Authoring order is the order of "next goal" hints.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Syllabus {
    topics: Vec<Topic>,
}

impl Syllabus {
    /// Builds a syllabus, rejecting duplicate names and keyword-less topics.
    pub fn new(topics: Vec<Topic>) -> Result<Self, SyllabusError> {
        let mut seen = HashSet::new();
        for topic in &topics {
            if !seen.insert(topic.name.as_str()) {
                return Err(SyllabusError::DuplicateTopic(topic.name.clone()));
            }
            if topic.keywords.iter().all(|k| k.is_empty()) {
                return Err(SyllabusError::NoKeywords(topic.name.clone()));
            }
        }
        Ok(Self { topics })
    }

    /// The built-in Go curriculum: sixteen topics across seven levels.
    pub fn go_curriculum() -> Self {
        Self {
            topics: vec![
                // Level 1: basics
                Topic::new(1, "Data types", &["int", "float", "string", "bool"], 3, 50),
                Topic::new(1, "Variables and constants", &["var ", "const "], 2, 50),
                // Level 2: control flow
                Topic::new(2, "Conditionals (if/else)", &["if ", "else"], 2, 75),
                Topic::new(2, "Loops (for)", &["for "], 2, 75),
                Topic::new(2, "Switch", &["switch "], 1, 75),
                // Level 3: collections
                Topic::new(3, "Arrays and slices", &["[]", "make([]", "append("], 3, 100),
                Topic::new(3, "Maps", &["map[", "make(map"], 2, 100),
                // Level 4: functions
                Topic::new(4, "Functions", &["func "], 3, 125),
                Topic::new(4, "Error handling", &["error", "if err != nil"], 2, 125),
                // Level 5: types
                Topic::new(5, "Structs", &["type ", "struct"], 2, 150),
                Topic::new(5, "Methods", &[") func", "receiver"], 2, 150),
                Topic::new(5, "Interfaces", &["interface"], 1, 150),
                // Level 6: concurrency
                Topic::new(6, "Goroutines", &["go func", "go "], 1, 200),
                Topic::new(6, "Channels", &["chan ", "<-"], 2, 200),
                // Level 7: advanced
                Topic::new(7, "HTTP server", &["http.HandleFunc", "http.ListenAndServe"], 1, 250),
                Topic::new(7, "Testing", &["func Test", "t.Error"], 1, 250),
            ],
        }
    }

    pub fn topics(&self) -> &[Topic] {
        &self.topics
    }

    pub fn get(&self, name: &str) -> Option<&Topic> {
        self.topics.iter().find(|t| t.name == name)
    }

    pub fn len(&self) -> usize {
        self.topics.len()
    }

    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }

    /// Highest level in the catalog, or 1 for an empty syllabus.
    pub fn max_level(&self) -> u32 {
        self.topics.iter().map(|t| t.level).max().unwrap_or(1)
    }

    /// Topics of a single level, in authoring order.
    pub fn topics_at_level(&self, level: u32) -> impl Iterator<Item = &Topic> {
        self.topics.iter().filter(move |t| t.level == level)
    }
}
