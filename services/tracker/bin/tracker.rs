//! Main Entrypoint for the Learning Tracker
//!
//! This binary is responsible for:
//! 1. Loading configuration from the environment and the command line.
//! 2. Initializing logging.
//! 3. Building the progress engine, the state store and the delivery sinks.
//! 4. Running one scan-compute-persist-deliver cycle and printing the report.

use anyhow::Context;
use chrono::Local;
use clap::Parser;
use codequest_core::{AchievementRegistry, ProgressEngine, RewardRules, Syllabus};
use codequest_tracker::{
    config::Config,
    notify::{LeaderboardNotifier, Notifier, ReadmeBadges, TelegramNotifier},
    runner::{SourceSet, Tracker},
    store::StateStore,
};
use std::path::PathBuf;
use std::time::Duration;
use tracing::{info, warn};

#[derive(Parser)]
#[command(author, version, about = "Tracks Go learning progress and reports it", long_about = None)]
struct Cli {
    /// Directory to scan for source files (overrides TRACKER_ROOT)
    #[arg(long)]
    root: Option<PathBuf>,

    /// Learner state file (overrides STATE_PATH)
    #[arg(long)]
    state: Option<PathBuf>,

    /// Completed-topic snapshot file (overrides SNAPSHOT_PATH)
    #[arg(long)]
    snapshot: Option<PathBuf>,

    /// Compute and save progress without notifying anyone or touching the README
    #[arg(long)]
    dry_run: bool,
}

fn build_notifiers(config: &Config) -> anyhow::Result<Vec<Box<dyn Notifier>>> {
    let client = reqwest::Client::builder()
        .timeout(Duration::from_secs(15))
        .build()
        .context("Failed to build HTTP client")?;

    let mut notifiers: Vec<Box<dyn Notifier>> = Vec::new();
    notifiers.push(Box::new(ReadmeBadges::new(&config.readme_path)));

    match &config.telegram {
        Some(telegram) => notifiers.push(Box::new(TelegramNotifier::new(
            client.clone(),
            telegram.token.clone(),
            telegram.chat_id.clone(),
        ))),
        None => warn!("TELEGRAM_TOKEN / TELEGRAM_CHAT_ID not set; skipping Telegram"),
    }

    match &config.leaderboard_webhook {
        Some(url) => notifiers.push(Box::new(LeaderboardNotifier::new(client, url.clone()))),
        None => warn!("LEADERBOARD_WEBHOOK not set; skipping leaderboard"),
    }

    Ok(notifiers)
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // --- 1. Load Configuration ---
    let mut config = Config::from_env().context("Failed to load configuration")?;
    if let Some(root) = cli.root {
        config.root = root;
    }
    if let Some(state) = cli.state {
        config.state_path = state;
    }
    if let Some(snapshot) = cli.snapshot {
        config.snapshot_path = snapshot;
    }

    // --- 2. Initialize Logging ---
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .with_timer(tracing_subscriber::fmt::time::ChronoLocal::rfc_3339())
        .init();
    info!("Configuration loaded. Starting analysis...");

    // --- 3. Build Engine, Store and Sinks ---
    let engine = ProgressEngine::new(
        Syllabus::go_curriculum(),
        AchievementRegistry::standard(),
        RewardRules {
            penalty_per_day: config.penalty_per_day,
            streak_bonus_per_day: config.streak_bonus_per_day,
        },
    );
    let store = StateStore::new(&config.state_path, &config.snapshot_path);
    let notifiers = if cli.dry_run {
        info!("Dry run: delivery disabled");
        Vec::new()
    } else {
        build_notifiers(&config)?
    };
    let tracker = Tracker::new(engine, store, notifiers, config.username.clone());

    // --- 4. Run ---
    let sources = SourceSet {
        root: config.root.clone(),
        extension: config.source_extension.clone(),
        skip_dirs: config.skip_dirs.clone(),
    };
    let now = Local::now().naive_local();
    let Some(summary) = tracker.run_once(&sources, now.date(), now).await? else {
        warn!("Nothing to analyze.");
        return Ok(());
    };

    println!("\n{}", summary.report);
    info!(
        files = summary.files_scanned,
        total_xp = summary.outcome.state.total_xp,
        xp_delta = summary.outcome.xp_delta,
        delivered = summary.delivered,
        failed_deliveries = summary.failed_deliveries,
        "Analysis complete."
    );
    Ok(())
}
