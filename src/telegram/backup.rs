//! Backup publishing and restore
//!
//! Every mutation pushes a fresh `db.zip` snapshot to the backup group, so
//! the newest document there is always the current state. Restore is the
//! reverse path: the administrator sends a `db.zip` document back to the bot
//! and the whole store is replaced with its contents.

use teloxide::net::Download;
use teloxide::prelude::*;
use teloxide::types::InputFile;

use crate::core::error::AppError;
use crate::storage::codec::{self, ARCHIVE_NAME};
use crate::storage::{db, get_connection};
use crate::telegram::types::HandlerDeps;
use crate::telegram::Bot;

const MSG_RESTORED: &str = "جایگزین شد";

/// Snapshots the store and sends it to the backup group as `db.zip`.
///
/// Best-effort: a failed push is logged and swallowed so the mutation that
/// triggered it still confirms to the administrator. The next mutation will
/// push a snapshot that supersedes the missed one.
pub async fn snapshot_and_publish(bot: &Bot, deps: &HandlerDeps) {
    let document = match get_connection(&deps.db_pool).map_err(AppError::from).and_then(|conn| {
        db::snapshot(&conn).map_err(AppError::from)
    }) {
        Ok(document) => document,
        Err(e) => {
            log::error!("Backup snapshot failed: {}", e);
            return;
        }
    };

    let bytes = match codec::encode(&document) {
        Ok(bytes) => bytes,
        Err(e) => {
            log::error!("Backup encoding failed: {}", e);
            return;
        }
    };

    let chat_id = ChatId(deps.config.backup_group_id);
    let file = InputFile::memory(bytes).file_name(ARCHIVE_NAME);
    if let Err(e) = bot.send_document(chat_id, file).await {
        log::error!("Backup delivery to {} failed: {}", chat_id, e);
    } else {
        log::info!(
            "Backup published ({} slogans, {} user scores)",
            document.slogans.len(),
            document.user_scores.len()
        );
    }
}

/// Handles an incoming document: a `db.zip` from the administrator replaces
/// the entire store. Any other document, or any other sender, is ignored.
pub async fn handle_document(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), AppError> {
    if !deps.is_from_admin(&msg) {
        return Ok(());
    }
    let Some(doc) = msg.document() else { return Ok(()) };
    if doc.file_name.as_deref() != Some(ARCHIVE_NAME) {
        return Ok(());
    }

    let file = bot.get_file(doc.file.id.clone()).await?;
    let mut bytes = Vec::with_capacity(file.size as usize);
    bot.download_file(&file.path, &mut bytes).await?;

    let document = match codec::decode(&bytes) {
        Ok(document) => document,
        Err(e) => {
            log::warn!("Rejected restore archive: {}", e);
            bot.send_message(msg.chat.id, format!("فایل پشتیبان نامعتبر است: {}", e))
                .await?;
            return Ok(());
        }
    };

    {
        let mut conn = get_connection(&deps.db_pool)?;
        db::replace_all(&mut conn, &document)?;
    }
    log::info!(
        "Store restored from archive ({} slogans, {} user scores)",
        document.slogans.len(),
        document.user_scores.len()
    );

    bot.send_message(msg.chat.id, MSG_RESTORED).await?;
    Ok(())
}
