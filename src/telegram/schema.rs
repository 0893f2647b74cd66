//! Dispatcher schema and handler chain builders

use teloxide::dispatching::{HandlerExt, UpdateFilterExt, UpdateHandler};
use teloxide::prelude::*;
use teloxide::types::Message;

use crate::telegram::backup::handle_document;
use crate::telegram::bot::{admin_keyboard, Command, BTN_ADD, BTN_DELETE, BTN_LIST};
use crate::telegram::editor::{handle_admin_message, handle_list_slogans};
use crate::telegram::scorer::{handle_group_message, handle_leader_board, handle_my_state};
use crate::telegram::types::{sender_id, HandlerDeps, HandlerError};
use crate::telegram::Bot;

/// Creates the main dispatcher schema for the Telegram bot.
///
/// This function returns a handler tree that can be used with teloxide's
/// Dispatcher. Branch order matters: the editor branch must see panel input
/// before the list branch so that an active dialogue captures button text
/// verbatim, and the group scorer comes last so it only sees messages no
/// other branch claimed.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_commands = deps.clone();
    let deps_documents = deps.clone();
    let deps_editor = deps.clone();
    let deps_list = deps.clone();
    let deps_scorer = deps.clone();

    dptree::entry()
        .branch(command_handler(deps_commands))
        .branch(document_handler(deps_documents))
        .branch(editor_handler(deps_editor))
        .branch(list_handler(deps_list))
        .branch(group_message_handler(deps_scorer))
}

/// Handler for the /start, /my_state and /leader_board commands
fn command_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter_command::<Command>()
        .endpoint(move |bot: Bot, msg: Message, cmd: Command| {
            let deps = deps.clone();
            async move {
                let result = match cmd {
                    Command::Start => handle_start(&bot, &msg, &deps).await,
                    Command::MyState => handle_my_state(bot, msg, deps).await,
                    Command::LeaderBoard => handle_leader_board(bot, msg, deps).await,
                };
                if let Err(e) = result {
                    log::error!("Command handler failed: {}", e);
                }
                Ok(())
            }
        })
}

/// /start: shows the admin panel to the administrator, silent for anyone else.
async fn handle_start(bot: &Bot, msg: &Message, deps: &HandlerDeps) -> Result<(), crate::AppError> {
    if !deps.is_from_admin(msg) {
        return Ok(());
    }
    bot.send_message(msg.chat.id, "پنل مدیریت:")
        .reply_markup(admin_keyboard())
        .await?;
    Ok(())
}

/// Handler for incoming documents (restore archives)
fn document_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.document().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_document(bot, msg, deps).await {
                    log::error!("Restore handler failed: {}", e);
                }
                Ok(())
            }
        })
}

/// Handler for the admin editor dialogues (add and delete flows)
fn editor_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_filter = deps.clone();
    Update::filter_message()
        .filter(move |msg: Message| {
            if !msg.chat.is_private() || !deps_filter.is_from_admin(&msg) {
                return false;
            }
            let Some(text) = msg.text() else { return false };
            let in_dialogue = sender_id(&msg).is_some_and(|id| deps_filter.sessions.is_active(id));
            in_dialogue || text == BTN_ADD || text == BTN_DELETE
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_admin_message(bot, msg, deps).await {
                    log::error!("Editor handler failed: {}", e);
                }
                Ok(())
            }
        })
}

/// Handler for the list-slogans panel button
fn list_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    let deps_filter = deps.clone();
    Update::filter_message()
        .filter(move |msg: Message| {
            msg.chat.is_private() && deps_filter.is_from_admin(&msg) && msg.text() == Some(BTN_LIST)
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_list_slogans(bot, msg, deps).await {
                    log::error!("List handler failed: {}", e);
                }
                Ok(())
            }
        })
}

/// Handler for group text messages (slogan matching)
fn group_message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| {
            (msg.chat.is_group() || msg.chat.is_supergroup()) && msg.text().is_some()
        })
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                if let Err(e) = handle_group_message(bot, msg, deps).await {
                    log::error!("Scorer handler failed: {}", e);
                }
                Ok(())
            }
        })
}
