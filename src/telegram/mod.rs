//! Telegram bot integration and handlers

pub mod backup;
pub mod bot;
pub mod editor;
pub mod schema;
pub mod scorer;
pub mod types;

/// The bot type used throughout the crate.
pub type Bot = teloxide::Bot;

// Re-exports for convenience
pub use bot::{admin_keyboard, create_bot, Command};
pub use schema::schema;
pub use types::{sender_id, HandlerDeps, HandlerError};
