use std::env;
use std::time::Duration;

use url::Url;

use crate::core::error::{AppError, AppResult};

/// Immutable process configuration.
///
/// Built once at startup from environment variables (a `.env` file is loaded
/// before this runs) and carried inside `HandlerDeps` — handlers never reach
/// into the environment themselves.
#[derive(Debug, Clone)]
pub struct AppConfig {
    /// Telegram bot token (`BOT_TOKEN`)
    pub bot_token: String,
    /// User id of the single administrator (`ADMIN_ID`)
    pub admin_id: i64,
    /// Chat id of the backup channel every snapshot is pushed to (`BACKUP_GROUP_ID`)
    pub backup_group_id: i64,
    /// Full public webhook URL (`WEBHOOK_URL`, e.g. `https://host/telegram`).
    /// When unset the bot falls back to long polling.
    pub webhook_url: Option<Url>,
    /// Port the webhook/health HTTP server binds to (`PORT`, default 8000)
    pub port: u16,
    /// SQLite database file path (`DATABASE_PATH`, default `bot.db`)
    pub database_path: String,
    /// Log file path (`LOG_FILE_PATH`, default `bot.log`)
    pub log_file_path: String,
}

impl AppConfig {
    /// Read the configuration from the environment.
    ///
    /// # Errors
    /// Returns `AppError::Config` if a required variable is missing or malformed.
    pub fn from_env() -> AppResult<Self> {
        let webhook_url = match env::var("WEBHOOK_URL") {
            Ok(raw) => Some(
                Url::parse(&raw).map_err(|e| AppError::Config(format!("invalid WEBHOOK_URL: {}", e)))?,
            ),
            Err(_) => None,
        };

        Ok(Self {
            bot_token: required("BOT_TOKEN")?,
            admin_id: required_i64("ADMIN_ID")?,
            backup_group_id: required_i64("BACKUP_GROUP_ID")?,
            webhook_url,
            port: parse_or("PORT", 8000)?,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "bot.db".to_string()),
            log_file_path: env::var("LOG_FILE_PATH").unwrap_or_else(|_| "bot.log".to_string()),
        })
    }

    /// Whether the given user id is the configured administrator.
    pub fn is_admin(&self, user_id: i64) -> bool {
        user_id == self.admin_id
    }
}

fn required(name: &str) -> AppResult<String> {
    env::var(name).map_err(|_| AppError::Config(format!("{} environment variable not set", name)))
}

fn required_i64(name: &str) -> AppResult<i64> {
    required(name)?
        .parse()
        .map_err(|e| AppError::Config(format!("invalid {}: {}", name, e)))
}

fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> AppResult<T>
where
    T::Err: std::fmt::Display,
{
    match env::var(name) {
        Ok(raw) => raw
            .parse()
            .map_err(|e| AppError::Config(format!("invalid {}: {}", name, e))),
        Err(_) => Ok(default),
    }
}

/// Network configuration
pub mod network {
    use super::Duration;

    /// Request timeout for Bot API calls, including backup document uploads
    /// and restore-file downloads (in seconds). Backup delivery is best-effort
    /// and never retried, so the timeout bounds the only suspension points.
    pub const REQUEST_TIMEOUT_SECS: u64 = 30;

    /// Request timeout duration
    pub fn timeout() -> Duration {
        Duration::from_secs(REQUEST_TIMEOUT_SECS)
    }
}
