//! Bot instance creation and command menu

use reqwest::ClientBuilder;
use secrecy::{ExposeSecret, SecretString};
use teloxide::prelude::*;
use teloxide::types::BotCommand;
use url::Url;

use crate::core::config::REQUEST_TIMEOUT;

/// Creates a Bot instance with custom or default API URL
///
/// The HTTP client timeout covers large document uploads.
pub fn create_bot(token: &SecretString, api_url: Option<&Url>) -> anyhow::Result<Bot> {
    let client = ClientBuilder::new().timeout(REQUEST_TIMEOUT).build()?;
    let bot = Bot::with_client(token.expose_secret(), client);

    Ok(match api_url {
        Some(url) => {
            log::info!("Using custom Bot API URL: {}", url);
            bot.set_api_url(url.clone())
        }
        None => bot,
    })
}

/// Menu entries registered with `setMyCommands`
pub fn menu_commands() -> Vec<BotCommand> {
    vec![
        BotCommand::new("start", "how to use the bot"),
        BotCommand::new("dl", "download a video: /dl <URL>"),
        BotCommand::new("help", "show usage"),
    ]
}

/// Sets up bot commands in Telegram UI
pub async fn setup_bot_commands(bot: &Bot) -> Result<(), teloxide::RequestError> {
    bot.set_my_commands(menu_commands()).await?;
    Ok(())
}
