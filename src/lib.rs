//! Sloganbot - Telegram group bot that keeps a per-chat leaderboard of slogan scores
//!
//! Group messages that exactly match a registered slogan phrase add the slogan's
//! score to the sender's running total for that chat. An admin-only reply-keyboard
//! panel manages the slogan list, and every mutation pushes a fresh zip/JSON
//! snapshot of the store to a fixed backup channel. Uploading that archive back
//! to the bot restores the store wholesale.
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging, and digit-normalization utilities
//! - `storage`: the two-table SQLite store and the backup archive codec
//! - `telegram`: bot wiring, dispatcher schema, and all update handlers

pub mod core;
pub mod storage;
pub mod telegram;

// Re-export commonly used types for convenience
pub use self::core::{config::AppConfig, AppError, AppResult};
pub use self::storage::{create_pool, get_connection, DbConnection, DbPool};
pub use self::telegram::{create_bot, schema, HandlerDeps};
