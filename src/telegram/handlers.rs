//! Message handling
//!
//! [`handle_command`] runs one command to completion: it never returns
//! download or upload failures, those become chat replies. It only errors
//! with the [`RequestError`] of a reply that could not be delivered.

use std::path::PathBuf;
use std::sync::Arc;

use teloxide::dispatching::{UpdateFilterExt, UpdateHandler};
use teloxide::RequestError;
use teloxide::prelude::*;
use teloxide::types::{Message, MessageId};

use crate::core::config::{Config, UploadSettings};
use crate::download::job::DownloadJob;
use crate::download::send::{ChatGateway, SendOutcome, send_media};
use crate::download::source::MediaSource;
use crate::download::ytdlp_errors::get_error_message;
use crate::telegram::command::{ChatCommand, should_reply};

/// Error type for handlers
pub type HandlerError = Box<dyn std::error::Error + Send + Sync + 'static>;

/// What the handler needs from the configuration
#[derive(Debug, Clone)]
pub struct HandlerSettings {
    pub temp_dir: PathBuf,
    /// Cookie file written at startup, if any
    pub cookies_file: Option<PathBuf>,
    pub upload: UploadSettings,
    pub max_height: u32,
}

impl HandlerSettings {
    pub fn from_config(config: &Config, cookies_file: Option<PathBuf>) -> Self {
        Self {
            temp_dir: config.download.temp_dir.clone(),
            cookies_file,
            upload: config.upload,
            max_height: config.download.max_height,
        }
    }

    pub fn usage_text(&self) -> String {
        format!(
            "Send me a video URL or use /dl <URL>\n\
             I download a low-res copy (<={}p) and send it here. \
             Files over {} MB arrive as numbered parts; join them in order to restore the file.\n\
             If content requires login/age-check, set YTDLP_COOKIES_CONTENT env (cookies.txt content).",
            self.max_height,
            self.upload.upload_limit / 1024 / 1024
        )
    }
}

/// Dependencies required by handlers
#[derive(Clone)]
pub struct HandlerDeps {
    pub source: Arc<dyn MediaSource>,
    pub settings: Arc<HandlerSettings>,
    pub bot_username: Option<String>,
}

impl HandlerDeps {
    pub fn new(source: Arc<dyn MediaSource>, settings: HandlerSettings, bot_username: Option<String>) -> Self {
        Self {
            source,
            settings: Arc::new(settings),
            bot_username,
        }
    }
}

/// Creates the dispatcher schema for the bot.
///
/// The same tree is used in production and can be fed to a Dispatcher in tests.
pub fn schema(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    dptree::entry().branch(message_handler(deps))
}

/// Handler for text messages: commands and bare URLs
fn message_handler(deps: HandlerDeps) -> UpdateHandler<HandlerError> {
    Update::filter_message()
        .filter(|msg: Message| msg.text().is_some())
        .endpoint(move |bot: Bot, msg: Message| {
            let deps = deps.clone();
            async move {
                let text = msg.text().unwrap_or_default();
                let command = ChatCommand::parse(text, deps.bot_username.as_deref());

                if !should_reply(msg.chat.is_private(), &command) {
                    log::debug!("Ignoring message in chat {}: {:?}", msg.chat.id, command);
                    return Ok(());
                }

                log::info!("Chat {}: {:?}", msg.chat.id, command);
                if let Err(e) =
                    handle_command(&bot, deps.source.as_ref(), &deps.settings, msg.chat.id, command).await
                {
                    log::error!("Failed to reply in chat {}: {}", msg.chat.id, e);
                }
                Ok::<(), HandlerError>(())
            }
        })
}

/// Parses and handles a message text
pub async fn handle_text<G, S>(
    gateway: &G,
    source: &S,
    settings: &HandlerSettings,
    chat_id: ChatId,
    text: &str,
    bot_username: Option<&str>,
) -> Result<(), RequestError>
where
    G: ChatGateway + ?Sized,
    S: MediaSource + ?Sized,
{
    let command = ChatCommand::parse(text, bot_username);
    handle_command(gateway, source, settings, chat_id, command).await
}

/// Executes one command, reporting every failure in the chat
pub async fn handle_command<G, S>(
    gateway: &G,
    source: &S,
    settings: &HandlerSettings,
    chat_id: ChatId,
    command: ChatCommand,
) -> Result<(), RequestError>
where
    G: ChatGateway + ?Sized,
    S: MediaSource + ?Sized,
{
    match command {
        ChatCommand::Start | ChatCommand::Help => {
            gateway.send_text(chat_id, &settings.usage_text()).await?;
        }
        ChatCommand::Unknown(text) => {
            log::debug!("Unrecognized message in chat {}: {:?}", chat_id, text);
            let reply = format!("Usage: /dl <URL>\n\n{}", settings.usage_text());
            gateway.send_text(chat_id, &reply).await?;
        }
        ChatCommand::Download(url) => {
            handle_download(gateway, source, settings, chat_id, url).await?;
        }
        ChatCommand::ForOtherBot(text) => {
            log::debug!("Command for another bot in chat {}: {:?}", chat_id, text);
        }
    }
    Ok(())
}

async fn handle_download<G, S>(
    gateway: &G,
    source: &S,
    settings: &HandlerSettings,
    chat_id: ChatId,
    url: url::Url,
) -> Result<(), RequestError>
where
    G: ChatGateway + ?Sized,
    S: MediaSource + ?Sized,
{
    let status = match gateway
        .send_text(chat_id, &format!("Queued: {url}\nStarting download..."))
        .await
    {
        Ok(id) => Some(id),
        Err(e) => {
            log::warn!("Failed to send status message to chat {}: {}", chat_id, e);
            None
        }
    };

    let job = match DownloadJob::create(url, &settings.temp_dir, settings.cookies_file.clone()).await {
        Ok(job) => job,
        Err(e) => {
            log::error!("Failed to create job directory in {}: {}", settings.temp_dir.display(), e);
            return reply(
                gateway,
                chat_id,
                status,
                "❌ Download failed: the server could not prepare a temporary directory.",
            )
            .await;
        }
    };

    let result = run_job(gateway, source, settings, chat_id, &job, status).await;
    job.cleanup().await;
    result
}

async fn run_job<G, S>(
    gateway: &G,
    source: &S,
    settings: &HandlerSettings,
    chat_id: ChatId,
    job: &DownloadJob,
    status: Option<MessageId>,
) -> Result<(), RequestError>
where
    G: ChatGateway + ?Sized,
    S: MediaSource + ?Sized,
{
    let media = match source.fetch(job).await {
        Ok(media) => media,
        Err(e) => {
            log::error!(
                "Download failed for {} via {} [{}]: {}",
                job.url,
                source.name(),
                e.subcategory(),
                e
            );
            return reply(gateway, chat_id, status, &get_error_message(&e)).await;
        }
    };

    match send_media(gateway, chat_id, &media.path, &settings.upload, status).await {
        Ok(SendOutcome::Single) => reply(gateway, chat_id, status, "✅ Done — file sent.").await,
        Ok(SendOutcome::Parts(total)) => {
            let text = format!("✅ Done — big file sent in {total} parts.");
            reply(gateway, chat_id, status, &text).await
        }
        Err(e) => {
            log::error!("Upload of {} to chat {} failed: {}", media.file_name(), chat_id, e);
            reply(gateway, chat_id, status, &format!("❌ Upload failed: {e}")).await
        }
    }
}

/// Puts `text` into the status message, or sends it fresh when that fails.
async fn reply<G>(gateway: &G, chat_id: ChatId, status: Option<MessageId>, text: &str) -> Result<(), RequestError>
where
    G: ChatGateway + ?Sized,
{
    if let Some(message_id) = status {
        match gateway.edit_text(chat_id, message_id, text).await {
            Ok(()) => return Ok(()),
            Err(e) => log::warn!("Failed to edit status message, sending a new one: {}", e),
        }
    }
    gateway.send_text(chat_id, text).await.map(|_| ())
}
