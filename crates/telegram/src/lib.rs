pub mod commands;

pub use commands::{start_bot, BotDeps, Command};

use async_trait::async_trait;
use teloxide::prelude::*;

use common::{Error, Notifier, Result};

/// Sends alert and status text to one configured chat.
pub struct TelegramNotifier {
    bot: Bot,
    chat_id: ChatId,
}

impl TelegramNotifier {
    pub fn new(token: impl Into<String>, chat_id: i64) -> Self {
        Self {
            bot: Bot::new(token),
            chat_id: ChatId(chat_id),
        }
    }
}

#[async_trait]
impl Notifier for TelegramNotifier {
    async fn notify(&self, message: &str) -> Result<()> {
        self.bot
            .send_message(self.chat_id, message)
            .await
            .map_err(|e| Error::Notify(e.to_string()))?;
        Ok(())
    }
}
