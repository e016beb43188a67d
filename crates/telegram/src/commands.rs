use std::sync::Arc;

use teloxide::{
    dispatching::UpdateHandler,
    prelude::*,
    utils::command::BotCommands,
};
use tracing::{info, warn};

use common::{EngineCommand, EngineState};
use engine::EngineHandle;

type HandlerResult = Result<(), Box<dyn std::error::Error + Send + Sync>>;

/// Dependencies injected into every handler via `dptree`.
#[derive(Clone)]
pub struct BotDeps {
    pub engine: EngineHandle,
    pub allowed_user_ids: Arc<Vec<i64>>,
}

/// Telegram bot commands exposed to the operator.
#[derive(BotCommands, Clone, Debug, PartialEq)]
#[command(rename_rule = "lowercase", description = "SpikeWatch commands:")]
pub enum Command {
    #[command(description = "Show scanner state and cooling symbols")]
    Status,
    #[command(description = "Suspend scan cycles")]
    Pause,
    #[command(description = "Resume scan cycles")]
    Resume,
    #[command(description = "List commands")]
    Help,
}

/// Start the command bot in long-polling mode.
pub async fn start_bot(token: String, deps: BotDeps) {
    let bot = Bot::new(token);
    let deps = Arc::new(deps);

    info!("Telegram command bot starting (long-polling)");

    Dispatcher::builder(bot, schema())
        .dependencies(dptree::deps![deps])
        .build()
        .dispatch()
        .await;
}

fn schema() -> UpdateHandler<Box<dyn std::error::Error + Send + Sync>> {
    use dptree::case;

    let command_handler = teloxide::filter_command::<Command, _>()
        .branch(case![Command::Status].endpoint(handle_status))
        .branch(case![Command::Pause].endpoint(handle_pause))
        .branch(case![Command::Resume].endpoint(handle_resume))
        .branch(case![Command::Help].endpoint(handle_help));

    Update::filter_message()
        .filter_map(|msg: Message| msg.from().map(|u| u.id))
        .filter_async(auth_filter)
        .branch(command_handler)
}

/// Silently drop messages from users not in the allowed list.
async fn auth_filter(user_id: UserId, deps: Arc<BotDeps>) -> bool {
    let uid = user_id.0 as i64;
    let allowed = deps.allowed_user_ids.contains(&uid);
    if !allowed {
        warn!(user_id = uid, "Unauthorized Telegram access attempt");
    }
    allowed
}

async fn handle_status(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let state = deps.engine.state().await;
    let cooling = deps.engine.cooling_symbols().await;
    bot.send_message(msg.chat.id, status_text(state, &cooling)).await?;
    Ok(())
}

async fn handle_pause(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let reply = match deps.engine.state().await {
        EngineState::Running => {
            deps.engine.send(EngineCommand::Pause).await;
            "⏸ Scanning paused."
        }
        EngineState::Paused => "Scanning is already paused.",
        EngineState::Stopped => "Engine is not running.",
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn handle_resume(bot: Bot, msg: Message, deps: Arc<BotDeps>) -> HandlerResult {
    let reply = match deps.engine.state().await {
        EngineState::Paused => {
            deps.engine.send(EngineCommand::Resume).await;
            "▶️ Scanning resumed."
        }
        EngineState::Running => "Scanning is already running.",
        EngineState::Stopped => "Engine is not running.",
    };
    bot.send_message(msg.chat.id, reply).await?;
    Ok(())
}

async fn handle_help(bot: Bot, msg: Message) -> HandlerResult {
    bot.send_message(msg.chat.id, Command::descriptions().to_string()).await?;
    Ok(())
}

/// Reply text for `/status`.
pub fn status_text(state: EngineState, cooling: &[String]) -> String {
    let mut text = format!(
        "SpikeWatch Status\n\
         Engine: {state}\n\
         Cooling symbols: {}",
        cooling.len()
    );
    if !cooling.is_empty() {
        text.push_str(&format!("\n{}", cooling.join(", ")));
    }
    text
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn commands_parse_lowercase() {
        assert_eq!(Command::parse("/status", "spikewatch_bot").unwrap(), Command::Status);
        assert_eq!(Command::parse("/pause", "spikewatch_bot").unwrap(), Command::Pause);
        assert_eq!(Command::parse("/resume", "spikewatch_bot").unwrap(), Command::Resume);
        assert!(Command::parse("/start", "spikewatch_bot").is_err());
    }

    #[test]
    fn status_lists_cooling_symbols() {
        let text = status_text(EngineState::Running, &["BTCUSDT".into(), "SOLUSDT".into()]);
        assert!(text.contains("Engine: running"));
        assert!(text.contains("Cooling symbols: 2"));
        assert!(text.contains("BTCUSDT, SOLUSDT"));
    }

    #[test]
    fn status_without_cooling_symbols() {
        let text = status_text(EngineState::Paused, &[]);
        assert!(text.contains("Engine: paused"));
        assert!(text.ends_with("Cooling symbols: 0"));
    }
}
