//! Delivery Sinks
//!
//! Everything that happens after progress has been saved: the Telegram report,
//! the shared leaderboard and the README badges. Delivery is best-effort; a
//! failing sink is logged and the run still succeeds.

use anyhow::{Context, Result, anyhow};
use async_trait::async_trait;
use codequest_core::report::LeaderboardEntry;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};

const TELEGRAM_API_BASE: &str = "https://api.telegram.org";

/// The finished output of a run, handed to every sink.
#[derive(Debug, Clone)]
pub struct Delivery {
    /// Rendered Markdown report.
    pub message: String,
    pub entry: LeaderboardEntry,
    /// Rendered README badge block.
    pub badges: String,
}

/// Defines the contract for any destination a finished run is sent to.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait Notifier: Send + Sync {
    /// Short name used in logs.
    fn name(&self) -> &'static str;

    async fn deliver(&self, delivery: &Delivery) -> Result<()>;
}

#[derive(Serialize)]
struct TelegramMessage<'a> {
    chat_id: &'a str,
    text: &'a str,
    parse_mode: &'a str,
}

/// Sends the report through the Telegram Bot API.
pub struct TelegramNotifier {
    client: reqwest::Client,
    api_base: String,
    token: String,
    chat_id: String,
}

impl TelegramNotifier {
    pub fn new(client: reqwest::Client, token: String, chat_id: String) -> Self {
        Self::with_api_base(client, TELEGRAM_API_BASE.to_string(), token, chat_id)
    }

    pub fn with_api_base(
        client: reqwest::Client,
        api_base: String,
        token: String,
        chat_id: String,
    ) -> Self {
        Self {
            client,
            api_base,
            token,
            chat_id,
        }
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/bot{}/sendMessage",
            self.api_base.trim_end_matches('/'),
            self.token
        )
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    fn name(&self) -> &'static str {
        "telegram"
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        let body = TelegramMessage {
            chat_id: &self.chat_id,
            text: &delivery.message,
            parse_mode: "Markdown",
        };
        let response = self
            .client
            .post(self.endpoint())
            .json(&body)
            .send()
            .await
            .context("Telegram request failed")?;

        let status = response.status();
        if !status.is_success() {
            return Err(anyhow!("Telegram responded {}", status));
        }
        Ok(())
    }
}

/// Posts the compact summary record to a leaderboard webhook.
pub struct LeaderboardNotifier {
    client: reqwest::Client,
    url: String,
}

impl LeaderboardNotifier {
    pub fn new(client: reqwest::Client, url: String) -> Self {
        Self { client, url }
    }
}

#[async_trait]
impl Notifier for LeaderboardNotifier {
    fn name(&self) -> &'static str {
        "leaderboard"
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        let response = self
            .client
            .post(&self.url)
            .json(&delivery.entry)
            .send()
            .await
            .context("Leaderboard request failed")?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(anyhow!("Leaderboard responded {}: {}", status, body));
        }
        Ok(())
    }
}

/// Rewrites the badge block of a README file. A missing README is left alone.
pub struct ReadmeBadges {
    path: PathBuf,
}

impl ReadmeBadges {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl Notifier for ReadmeBadges {
    fn name(&self) -> &'static str {
        "readme-badges"
    }

    async fn deliver(&self, delivery: &Delivery) -> Result<()> {
        let content = match tokio::fs::read_to_string(&self.path).await {
            Ok(content) => content,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(()),
            Err(e) => {
                return Err(e).with_context(|| format!("Failed to read {}", self.path.display()));
            }
        };

        let updated = codequest_core::badges::apply(&content, &delivery.badges);
        if updated != content {
            tokio::fs::write(&self.path, updated)
                .await
                .with_context(|| format!("Failed to write {}", self.path.display()))?;
        }
        Ok(())
    }
}

/// Hands `delivery` to every sink in turn and returns how many succeeded.
pub async fn deliver_all(notifiers: &[Box<dyn Notifier>], delivery: &Delivery) -> usize {
    let mut delivered = 0;
    for notifier in notifiers {
        match notifier.deliver(delivery).await {
            Ok(()) => {
                info!(sink = notifier.name(), "Delivered");
                delivered += 1;
            }
            Err(e) => warn!(sink = notifier.name(), error = ?e, "Delivery failed"),
        }
    }
    delivered
}
