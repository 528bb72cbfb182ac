//! Bot initialization: command list and Bot instance creation

use reqwest::ClientBuilder;
use teloxide::prelude::*;
use teloxide::utils::command::BotCommands;

use crate::core::config;

/// Bot commands enum with descriptions
#[derive(BotCommands, Clone, Debug, PartialEq, Eq)]
#[command(rename_rule = "lowercase", description = "These commands are supported:")]
pub enum Command {
    #[command(description = "how to use the bot")]
    Start,
    #[command(description = "show this help")]
    Help,
}

/// Reply to /start and /help
pub const WELCOME_TEXT: &str = "Send me a YouTube or YouTube Music link.";

/// Creates a Bot instance with custom or default API URL
///
/// # Returns
/// * `Ok(Bot)` - Successfully created bot instance
/// * `Err(anyhow::Error)` - Missing token, invalid `BOT_API_URL` or HTTP client failure
pub fn create_bot() -> anyhow::Result<Bot> {
    let token = config::BOT_TOKEN.clone();
    if token.is_empty() {
        anyhow::bail!("BOT_TOKEN is not set");
    }

    let client = ClientBuilder::new().timeout(config::network::timeout()).build()?;
    let bot = Bot::with_client(token, client);

    let bot = match config::BOT_API_URL.as_deref() {
        Some(bot_api_url) => {
            log::info!("Using custom Bot API URL: {}", bot_api_url);
            let url = url::Url::parse(bot_api_url).map_err(|e| anyhow::anyhow!("Invalid BOT_API_URL: {}", e))?;
            bot.set_api_url(url)
        }
        None => bot,
    };

    Ok(bot)
}

/// Registers the command list shown in Telegram clients
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(Command::bot_commands()).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_descriptions() {
        let commands = Command::descriptions().to_string();

        assert!(commands.contains("These commands are supported"));
        assert!(commands.contains("/start"));
        assert!(commands.contains("/help"));
    }

    #[test]
    fn test_command_parse() {
        assert_eq!(Command::parse("/start", "yt_courier_bot").ok(), Some(Command::Start));
        assert_eq!(Command::parse("/help", "yt_courier_bot").ok(), Some(Command::Help));
        assert!(Command::parse("/mode", "yt_courier_bot").is_err());
    }

    #[test]
    fn test_bot_commands_list() {
        assert_eq!(Command::bot_commands().len(), 2);
    }
}
