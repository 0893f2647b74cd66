//! Admin editor: the two short dialogues that manage the slogan list
//!
//! Dialogue state is an explicit finite-state machine keyed by the
//! administrator's user id. `transition` is a pure function of
//! (state, input) -> (next state, effect); the handler executes the effect
//! (prompt, commit, or nothing) and every commit ends with a backup push.

use dashmap::DashMap;
use teloxide::prelude::*;

use crate::core::error::AppError;
use crate::core::utils::{html_escape, parse_score};
use crate::storage::db;
use crate::storage::get_connection;
use crate::telegram::backup::snapshot_and_publish;
use crate::telegram::bot::{admin_keyboard, BTN_ADD, BTN_DELETE};
use crate::telegram::types::{sender_id, HandlerDeps};
use crate::telegram::Bot;

/// Keyword that aborts an active dialogue with no mutation.
pub const CANCEL: &str = "لغو";

const PROMPT_TEXT: &str = "متن شعار؟ یا لغو";
const PROMPT_SCORE: &str = "امتیاز؟";
const PROMPT_DELETE_TEXT: &str = "متن شعار جهت حذف؟";
const MSG_INVALID_NUMBER: &str = "عدد نامعتبر";
const MSG_SAVED: &str = "ثبت شد";
const MSG_DELETED: &str = "حذف شد";

/// Dialogue position of one administrator session.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum EditorState {
    #[default]
    Idle,
    /// Add flow: waiting for the slogan text.
    AwaitText,
    /// Add flow: text captured, waiting for the score.
    AwaitScore { text: String },
    /// Delete flow: waiting for the text to delete.
    AwaitDeleteText,
}

/// What the handler must do after a transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EditorEffect {
    /// Nothing: input neither starts nor belongs to a dialogue, or it cancelled one.
    None,
    /// Send a prompt or a local validation error.
    Reply(&'static str),
    /// Commit an insert/overwrite, then back up and confirm.
    UpsertSlogan { text: String, score: i64 },
    /// Commit a delete (no-op if absent), then back up and confirm.
    DeleteSlogan { text: String },
}

/// Pure dialogue step. Captured texts are taken verbatim; score input is
/// digit-normalized before parsing, and invalid numbers re-prompt without
/// leaving `AwaitScore`.
pub fn transition(state: EditorState, input: &str) -> (EditorState, EditorEffect) {
    match state {
        EditorState::Idle => match input {
            BTN_ADD => (EditorState::AwaitText, EditorEffect::Reply(PROMPT_TEXT)),
            BTN_DELETE => (EditorState::AwaitDeleteText, EditorEffect::Reply(PROMPT_DELETE_TEXT)),
            _ => (EditorState::Idle, EditorEffect::None),
        },
        EditorState::AwaitText => {
            if input == CANCEL {
                (EditorState::Idle, EditorEffect::None)
            } else {
                (
                    EditorState::AwaitScore { text: input.to_string() },
                    EditorEffect::Reply(PROMPT_SCORE),
                )
            }
        }
        EditorState::AwaitScore { text } => {
            if input == CANCEL {
                return (EditorState::Idle, EditorEffect::None);
            }
            match parse_score(input) {
                Some(score) => (EditorState::Idle, EditorEffect::UpsertSlogan { text, score }),
                None => (
                    EditorState::AwaitScore { text },
                    EditorEffect::Reply(MSG_INVALID_NUMBER),
                ),
            }
        }
        EditorState::AwaitDeleteText => {
            if input == CANCEL {
                (EditorState::Idle, EditorEffect::None)
            } else {
                (EditorState::Idle, EditorEffect::DeleteSlogan { text: input.to_string() })
            }
        }
    }
}

/// Session store for editor dialogues, keyed by administrator user id.
/// One state cell per user, so only one flow can be active at a time.
#[derive(Default)]
pub struct EditorSessions {
    states: DashMap<i64, EditorState>,
}

impl EditorSessions {
    /// Whether a dialogue is currently in progress for this user.
    pub fn is_active(&self, user_id: i64) -> bool {
        self.states.contains_key(&user_id)
    }

    /// Runs one dialogue step and stores the resulting state.
    pub fn step(&self, user_id: i64, input: &str) -> EditorEffect {
        let state = self
            .states
            .remove(&user_id)
            .map(|(_, state)| state)
            .unwrap_or_default();
        let (next, effect) = transition(state, input);
        if next != EditorState::Idle {
            self.states.insert(user_id, next);
        }
        effect
    }
}

/// Handles one admin panel message: entry buttons and dialogue replies.
pub async fn handle_admin_message(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), AppError> {
    let Some(text) = msg.text() else { return Ok(()) };
    let Some(user_id) = sender_id(&msg) else { return Ok(()) };

    match deps.sessions.step(user_id, text) {
        EditorEffect::None => {}
        EditorEffect::Reply(reply) => {
            bot.send_message(msg.chat.id, reply).await?;
        }
        EditorEffect::UpsertSlogan { text, score } => {
            {
                let conn = get_connection(&deps.db_pool)?;
                db::upsert_slogan(&conn, &text, score)?;
            }
            log::info!("Slogan upserted ({} -> {})", text, score);
            snapshot_and_publish(&bot, &deps).await;
            bot.send_message(msg.chat.id, MSG_SAVED)
                .reply_markup(admin_keyboard())
                .await?;
        }
        EditorEffect::DeleteSlogan { text } => {
            let existed = {
                let conn = get_connection(&deps.db_pool)?;
                db::delete_slogan(&conn, &text)?
            };
            log::info!("Slogan delete requested ({}, existed: {})", text, existed);
            snapshot_and_publish(&bot, &deps).await;
            bot.send_message(msg.chat.id, MSG_DELETED)
                .reply_markup(admin_keyboard())
                .await?;
        }
    }

    Ok(())
}

/// Handles the list button: all slogans, highest score first.
pub async fn handle_list_slogans(bot: Bot, msg: Message, deps: HandlerDeps) -> Result<(), AppError> {
    let slogans = {
        let conn = get_connection(&deps.db_pool)?;
        db::list_slogans(&conn)?
    };

    if slogans.is_empty() {
        bot.send_message(msg.chat.id, "خالی").await?;
        return Ok(());
    }

    let lines: Vec<String> = slogans
        .iter()
        .map(|s| format!("<code>{}</code>  ({})", html_escape(&s.text), s.score))
        .collect();
    bot.send_message(msg.chat.id, lines.join("\n"))
        .parse_mode(teloxide::types::ParseMode::Html)
        .await?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_idle_ignores_arbitrary_text() {
        let (state, effect) = transition(EditorState::Idle, "سلام");
        assert_eq!(state, EditorState::Idle);
        assert_eq!(effect, EditorEffect::None);
    }

    #[test]
    fn test_add_flow_happy_path() {
        let (state, effect) = transition(EditorState::Idle, BTN_ADD);
        assert_eq!(state, EditorState::AwaitText);
        assert_eq!(effect, EditorEffect::Reply(PROMPT_TEXT));

        let (state, effect) = transition(state, "خوب");
        assert_eq!(state, EditorState::AwaitScore { text: "خوب".to_string() });
        assert_eq!(effect, EditorEffect::Reply(PROMPT_SCORE));

        let (state, effect) = transition(state, "۱۵");
        assert_eq!(state, EditorState::Idle);
        assert_eq!(
            effect,
            EditorEffect::UpsertSlogan {
                text: "خوب".to_string(),
                score: 15
            }
        );
    }

    #[test]
    fn test_add_flow_invalid_score_reprompts() {
        let state = EditorState::AwaitScore { text: "خوب".to_string() };

        let (state, effect) = transition(state, "پنج");
        assert_eq!(state, EditorState::AwaitScore { text: "خوب".to_string() });
        assert_eq!(effect, EditorEffect::Reply(MSG_INVALID_NUMBER));

        let (state, effect) = transition(state, "-5");
        assert_eq!(state, EditorState::Idle);
        assert_eq!(
            effect,
            EditorEffect::UpsertSlogan {
                text: "خوب".to_string(),
                score: -5
            }
        );
    }

    #[test]
    fn test_cancel_aborts_each_stage() {
        for state in [
            EditorState::AwaitText,
            EditorState::AwaitScore { text: "x".to_string() },
            EditorState::AwaitDeleteText,
        ] {
            let (next, effect) = transition(state, CANCEL);
            assert_eq!(next, EditorState::Idle);
            assert_eq!(effect, EditorEffect::None);
        }
    }

    #[test]
    fn test_captured_text_is_verbatim() {
        // Entry phrases are only special while idle.
        let (state, _) = transition(EditorState::AwaitText, BTN_DELETE);
        assert_eq!(state, EditorState::AwaitScore { text: BTN_DELETE.to_string() });
    }

    #[test]
    fn test_delete_flow() {
        let (state, effect) = transition(EditorState::Idle, BTN_DELETE);
        assert_eq!(state, EditorState::AwaitDeleteText);
        assert_eq!(effect, EditorEffect::Reply(PROMPT_DELETE_TEXT));

        let (state, effect) = transition(state, "خوب");
        assert_eq!(state, EditorState::Idle);
        assert_eq!(effect, EditorEffect::DeleteSlogan { text: "خوب".to_string() });
    }

    #[test]
    fn test_sessions_track_state_per_user() {
        let sessions = EditorSessions::default();

        assert_eq!(sessions.step(1, BTN_ADD), EditorEffect::Reply(PROMPT_TEXT));
        assert!(sessions.is_active(1));
        assert!(!sessions.is_active(2));

        assert_eq!(sessions.step(1, "خوب"), EditorEffect::Reply(PROMPT_SCORE));
        assert_eq!(
            sessions.step(1, "۵"),
            EditorEffect::UpsertSlogan {
                text: "خوب".to_string(),
                score: 5
            }
        );
        assert!(!sessions.is_active(1));
    }
}
