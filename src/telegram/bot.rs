//! Bot instance creation, command enum, and the admin panel keyboard

use reqwest::ClientBuilder;
use teloxide::types::{KeyboardButton, KeyboardMarkup};
use teloxide::utils::command::BotCommands;

use crate::core::config::{self, AppConfig};
use crate::telegram::Bot;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug)]
#[command(rename_rule = "snake_case", description = "دستورات:")]
pub enum Command {
    #[command(description = "نمایش پنل مدیریت")]
    Start,
    #[command(description = "امتیاز شما در این گروه")]
    MyState,
    #[command(description = "جدول امتیازات گروه")]
    LeaderBoard,
}

/// Reply-keyboard button that starts the add-slogan dialogue.
pub const BTN_ADD: &str = "افزودن شعار";
/// Reply-keyboard button that starts the delete-slogan dialogue.
pub const BTN_DELETE: &str = "حذف شعار";
/// Reply-keyboard button that lists all slogans.
pub const BTN_LIST: &str = "لیست شعار ها";

/// The administrator's reply keyboard panel.
pub fn admin_keyboard() -> KeyboardMarkup {
    KeyboardMarkup::new(vec![
        vec![KeyboardButton::new(BTN_ADD), KeyboardButton::new(BTN_DELETE)],
        vec![KeyboardButton::new(BTN_LIST)],
    ])
    .resize_keyboard()
}

/// Creates a Bot instance with a bounded-timeout HTTP client.
///
/// The shared client timeout bounds every network suspension point,
/// including backup delivery and restore-file downloads.
pub fn create_bot(app_config: &AppConfig) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    Ok(Bot::with_client(app_config.bot_token.clone(), client))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let descriptions = format!("{}", Command::descriptions());
        assert!(descriptions.contains("start"));
        assert!(descriptions.contains("my_state"));
        assert!(descriptions.contains("leader_board"));
    }
}
