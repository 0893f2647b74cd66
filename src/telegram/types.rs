//! Handler types and shared dependencies

use std::sync::Arc;

use teloxide::types::Message;

use crate::core::config::AppConfig;
use crate::storage::db::DbPool;
use crate::telegram::editor::EditorSessions;

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub config: Arc<AppConfig>,
    pub db_pool: Arc<DbPool>,
    pub sessions: Arc<EditorSessions>,
}

impl HandlerDeps {
    /// Create new handler dependencies
    pub fn new(config: Arc<AppConfig>, db_pool: Arc<DbPool>) -> Self {
        Self {
            config,
            db_pool,
            sessions: Arc::new(EditorSessions::default()),
        }
    }

    /// Whether the message was sent by the configured administrator.
    pub fn is_from_admin(&self, msg: &Message) -> bool {
        sender_id(msg).is_some_and(|id| self.config.is_admin(id))
    }
}

/// Extracts the sender's user id from a message, if any.
pub fn sender_id(msg: &Message) -> Option<i64> {
    msg.from.as_ref().and_then(|u| i64::try_from(u.id.0).ok())
}
