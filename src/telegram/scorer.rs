//! Group scorer: exact-match slogan scoring and the score commands

use teloxide::prelude::*;
use teloxide::types::{ParseMode, ReplyParameters};

use crate::core::error::AppError;
use crate::core::utils::mention_html;
use crate::storage::{db, get_connection};
use crate::telegram::backup::snapshot_and_publish;
use crate::telegram::types::{sender_id, HandlerDeps};
use crate::telegram::Bot;

/// Rows shown on the leaderboard.
const LEADERBOARD_LIMIT: i64 = 20;

const MEDALS: [&str; 3] = ["🥇", "🥈", "🥉"];
const TITLES: [&str; 3] = ["اول", "دوم", "سوم"];

/// Handles a group message: an exact slogan match scores the sender and
/// replies with the delta and new total. Anything else is ignored.
pub async fn handle_group_message(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), AppError> {
    let Some(text) = msg.text() else { return Ok(()) };
    let Some(user_id) = sender_id(&msg) else { return Ok(()) };
    let chat_id = msg.chat.id.0;

    let delta = {
        let conn = get_connection(&deps.db_pool)?;
        db::get_slogan(&conn, text)?
    };
    let Some(delta) = delta else { return Ok(()) };

    let total = {
        let mut conn = get_connection(&deps.db_pool)?;
        db::apply_match(&mut conn, user_id, chat_id, delta)?
    };
    log::info!(
        "Slogan match in chat {} by user {}: {:+} (total {})",
        chat_id,
        user_id,
        delta,
        total
    );

    snapshot_and_publish(&bot, &deps).await;

    let verdict = if delta >= 0 { "تبریک" } else { "شرم بر تو!" };
    let reply = format!("{}\n{:+} امتیاز\nجمع کل: {}", verdict, delta, total);
    bot.send_message(msg.chat.id, reply)
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handles /my_state: the sender's accumulated score in this chat.
pub async fn handle_my_state(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), AppError> {
    let Some(user_id) = sender_id(&msg) else { return Ok(()) };

    let score = {
        let conn = get_connection(&deps.db_pool)?;
        db::get_user_score(&conn, user_id, msg.chat.id.0)?.unwrap_or(0)
    };

    bot.send_message(msg.chat.id, format!("امتیاز شما: {}", score))
        .reply_parameters(ReplyParameters::new(msg.id))
        .await?;

    Ok(())
}

/// Handles /leader_board: the chat's top scorers, highest first.
pub async fn handle_leader_board(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), AppError> {
    let rows = {
        let conn = get_connection(&deps.db_pool)?;
        db::top_user_scores(&conn, msg.chat.id.0, LEADERBOARD_LIMIT)?
    };

    if rows.is_empty() {
        bot.send_message(msg.chat.id, "خالی").await?;
        return Ok(());
    }

    let mut lines = Vec::with_capacity(rows.len());
    for (rank, row) in rows.iter().enumerate() {
        let name = display_name(&bot, row.user_id).await;
        let medal = MEDALS.get(rank).copied().unwrap_or("");
        let title = TITLES
            .get(rank)
            .map(|t| (*t).to_string())
            .unwrap_or_else(|| format!("{}", rank + 1));
        lines.push(format!(
            "• نفر {}{} :\n( {} امتیاز | {} )",
            title,
            medal,
            row.score,
            mention_html(row.user_id, &name)
        ));
    }

    bot.send_message(msg.chat.id, lines.join("\n\n"))
        .parse_mode(ParseMode::Html)
        .await?;

    Ok(())
}

/// Resolves a user's display name, falling back to the raw id when the
/// profile is unreachable (deleted account, privacy settings).
async fn display_name(bot: &Bot, user_id: i64) -> String {
    match bot.get_chat(ChatId(user_id)).await {
        Ok(chat) => chat
            .first_name()
            .map(str::to_string)
            .unwrap_or_else(|| user_id.to_string()),
        Err(e) => {
            log::warn!("Could not resolve name for user {}: {}", user_id, e);
            user_id.to_string()
        }
    }
}
