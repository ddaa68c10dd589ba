use std::path::PathBuf;
use tracing::Level;

/// A custom error type for configuration loading failures.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingVar(String),
    #[error("Invalid value for environment variable {0}: {1}")]
    InvalidValue(String, String),
}

/// Credentials for the Telegram Bot API.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TelegramConfig {
    pub token: String,
    pub chat_id: String,
}

/// Holds all configuration loaded from the environment at startup.
#[derive(Clone, Debug)]
pub struct Config {
    pub root: PathBuf,
    pub state_path: PathBuf,
    pub snapshot_path: PathBuf,
    pub readme_path: PathBuf,
    pub username: String,
    pub source_extension: String,
    pub skip_dirs: Vec<String>,
    pub telegram: Option<TelegramConfig>,
    pub leaderboard_webhook: Option<String>,
    pub penalty_per_day: u64,
    pub streak_bonus_per_day: u64,
    pub log_level: Level,
}

fn var_or(name: &str, default: &str) -> String {
    std::env::var(name).unwrap_or_else(|_| default.to_string())
}

fn non_empty_var(name: &str) -> Option<String> {
    std::env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_xp(name: &str, default: u64) -> Result<u64, ConfigError> {
    match std::env::var(name) {
        Ok(raw) => raw
            .trim()
            .parse::<u64>()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), e.to_string())),
        Err(_) => Ok(default),
    }
}

impl Config {
    /// Loads configuration from environment variables.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Only load from .env in non-test mode to avoid contamination
        if !cfg!(test) {
            dotenvy::dotenv().ok();
        }

        let root = PathBuf::from(var_or("TRACKER_ROOT", "."));
        let state_path = PathBuf::from(var_or("STATE_PATH", "stats.json"));
        let snapshot_path = PathBuf::from(var_or("SNAPSHOT_PATH", ".completed_topics"));
        let readme_path = PathBuf::from(var_or("README_PATH", "README.md"));

        let username = non_empty_var("GITHUB_ACTOR").unwrap_or_else(|| "GoLearner".to_string());

        let source_extension = var_or("SOURCE_EXTENSION", "go")
            .trim_start_matches('.')
            .to_string();
        if source_extension.is_empty() {
            return Err(ConfigError::InvalidValue(
                "SOURCE_EXTENSION".to_string(),
                "extension must not be empty".to_string(),
            ));
        }

        let skip_dirs = var_or("SKIP_DIRS", ".git,target,notifier")
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();

        let telegram = match (non_empty_var("TELEGRAM_TOKEN"), non_empty_var("TELEGRAM_CHAT_ID")) {
            (Some(token), Some(chat_id)) => Some(TelegramConfig { token, chat_id }),
            (None, None) => None,
            (Some(_), None) => {
                return Err(ConfigError::MissingVar(
                    "TELEGRAM_CHAT_ID must be set together with TELEGRAM_TOKEN".to_string(),
                ));
            }
            (None, Some(_)) => {
                return Err(ConfigError::MissingVar(
                    "TELEGRAM_TOKEN must be set together with TELEGRAM_CHAT_ID".to_string(),
                ));
            }
        };

        let leaderboard_webhook = non_empty_var("LEADERBOARD_WEBHOOK");

        let penalty_per_day = parse_xp("PENALTY_XP_PER_DAY", 30)?;
        let streak_bonus_per_day = parse_xp("STREAK_BONUS_XP", 20)?;

        let log_level_str = var_or("RUST_LOG", "INFO");
        let log_level = log_level_str.parse::<Level>().map_err(|_| {
            ConfigError::InvalidValue(
                "RUST_LOG".to_string(),
                format!("'{}' is not a valid log level", log_level_str),
            )
        })?;

        Ok(Self {
            root,
            state_path,
            snapshot_path,
            readme_path,
            username,
            source_extension,
            skip_dirs,
            telegram,
            leaderboard_webhook,
            penalty_per_day,
            streak_bonus_per_day,
            log_level,
        })
    }
}
