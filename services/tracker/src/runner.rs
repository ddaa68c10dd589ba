//! One tracking run: load, scan, compute, persist, deliver.
//!
//! Persistence happens before any delivery. Once both files are written the
//! run has succeeded, whatever the sinks do afterwards.

use crate::discovery::{self, SourceFile};
use crate::notify::{self, Delivery, Notifier};
use crate::store::StateStore;
use anyhow::{Context, Result};
use chrono::{NaiveDate, NaiveDateTime};
use codequest_core::report::{self, LeaderboardEntry};
use codequest_core::{ProgressEngine, RunOutcome, badges};
use std::path::PathBuf;
use tracing::{info, warn};

/// Where to look for source files.
#[derive(Debug, Clone)]
pub struct SourceSet {
    pub root: PathBuf,
    pub extension: String,
    pub skip_dirs: Vec<String>,
}

/// The result of a completed run.
#[derive(Debug)]
pub struct RunSummary {
    pub outcome: RunOutcome,
    pub report: String,
    pub files_scanned: usize,
    pub delivered: usize,
    pub failed_deliveries: usize,
}

/// Wires the engine to its collaborators.
pub struct Tracker {
    engine: ProgressEngine,
    store: StateStore,
    notifiers: Vec<Box<dyn Notifier>>,
    username: String,
}

impl Tracker {
    pub fn new(
        engine: ProgressEngine,
        store: StateStore,
        notifiers: Vec<Box<dyn Notifier>>,
        username: String,
    ) -> Self {
        Self {
            engine,
            store,
            notifiers,
            username,
        }
    }

    /// Runs the full cycle over the files found under `sources`.
    ///
    /// Returns `Ok(None)` without touching any state when there is nothing to scan.
    pub async fn run_once(
        &self,
        sources: &SourceSet,
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<Option<RunSummary>> {
        let paths =
            discovery::find_sources(&sources.root, &sources.extension, &sources.skip_dirs);
        if paths.is_empty() {
            warn!(
                root = %sources.root.display(),
                extension = %sources.extension,
                "No source files found"
            );
            return Ok(None);
        }
        let files = discovery::read_sources(&paths);
        info!(found = paths.len(), readable = files.len(), "Scanning source files");

        self.run_with_files(&files, today, now).await.map(Some)
    }

    /// Runs the cycle over already-loaded files.
    pub async fn run_with_files(
        &self,
        files: &[SourceFile],
        today: NaiveDate,
        now: NaiveDateTime,
    ) -> Result<RunSummary> {
        let state = self
            .store
            .load_state(&self.username)
            .context("Failed to load learner state")?;
        let snapshot = self
            .store
            .load_snapshot()
            .context("Failed to load completed topics")?;

        let outcome = self.engine.run(
            state,
            &snapshot,
            files.iter().map(|f| f.text.as_str()),
            today,
        );

        self.store
            .save(&outcome.state, &outcome.completed)
            .context("Failed to save progress")?;

        let report = report::render_report(&outcome, self.engine.syllabus());
        let delivery = Delivery {
            message: report.clone(),
            entry: LeaderboardEntry::from_state(&outcome.state, now),
            badges: badges::render(&outcome.state, outcome.percent),
        };
        let delivered = notify::deliver_all(&self.notifiers, &delivery).await;

        Ok(RunSummary {
            files_scanned: files.len(),
            failed_deliveries: self.notifiers.len() - delivered,
            delivered,
            report,
            outcome,
        })
    }
}
