use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use dotenvy::dotenv;
use teloxide::prelude::*;
use url::Url;

use tubedrop::cli::{Cli, Commands};
use tubedrop::core::{Config, init_logger};
use tubedrop::download::local::download_to_dir;
use tubedrop::download::ytdlp::probe_version;
use tubedrop::download::{MediaSource, YtDlpSource, log_cookies_configuration, provision_cookies};
use tubedrop::telegram::command::parse_download_url;
use tubedrop::telegram::{HandlerDeps, HandlerSettings, create_bot, schema, setup_bot_commands};

const STARTUP_MAX_RETRIES: u32 = 3;

/// Main entry point for the bot
///
/// # Errors
/// Returns an error if startup fails (configuration, cookies, bot creation).
#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse_args();

    // Load environment variables from .env if present
    let _ = dotenv();

    let config = Config::from_env()?;
    init_logger(config.log_level, config.log_file.as_deref())?;

    // Panics inside handlers should end up in the log, not only on stderr
    std::panic::set_hook(Box::new(|panic_info| {
        log::error!("Panic caught: {}", panic_info);
        if let Some(location) = panic_info.location() {
            log::error!("Panic at {}:{}:{}", location.file(), location.line(), location.column());
        }
    }));

    match cli.command {
        None | Some(Commands::Run) => run_bot(config).await,
        Some(Commands::Download { url, output }) => run_cli_download(config, &url, &output).await,
    }
}

async fn run_bot(config: Config) -> Result<()> {
    log::info!("Starting tubedrop bot...");

    // An unwritable cookie file is fatal: later downloads would silently run without it
    let cookies_file = provision_cookies(&config.cookies)?;
    log_cookies_configuration(cookies_file.as_deref());

    probe_version(&config.download.ytdlp_bin).await;

    let token = config.token()?;
    let bot = create_bot(token, config.bot_api_url.as_ref())?;

    let me = get_me_with_retry(&bot).await?;
    let bot_username = me.username.clone();
    log::info!("Bot started as @{}", bot_username.as_deref().unwrap_or("<unknown>"));

    if let Err(e) = setup_bot_commands(&bot).await {
        log::warn!("Failed to set bot commands: {}", e);
    }

    let source: Arc<dyn MediaSource> = Arc::new(YtDlpSource::new(config.download.clone()));
    let settings = HandlerSettings::from_config(&config, cookies_file);
    let deps = HandlerDeps::new(source, settings, bot_username);

    Dispatcher::builder(bot, schema(deps))
        .enable_ctrlc_handler()
        .build()
        .dispatch()
        .await;

    log::info!("Dispatcher shutdown gracefully");
    Ok(())
}

async fn get_me_with_retry(bot: &Bot) -> Result<teloxide::types::Me> {
    let mut attempt = 0;
    loop {
        match bot.get_me().await {
            Ok(me) => return Ok(me),
            Err(e) => {
                attempt += 1;
                let retryable = matches!(e, teloxide::RequestError::Network(_) | teloxide::RequestError::Io(_));
                if attempt >= STARTUP_MAX_RETRIES || !retryable {
                    return Err(anyhow::anyhow!("Failed to get bot info after {} attempts: {}", attempt, e));
                }
                log::warn!(
                    "get_me failed (attempt {}/{}): {}. Retrying...",
                    attempt,
                    STARTUP_MAX_RETRIES,
                    e
                );
                tokio::time::sleep(Duration::from_secs(2u64.pow(attempt))).await;
            }
        }
    }
}

/// Runs one download without Telegram and copies the file into `output`.
async fn run_cli_download(config: Config, url: &str, output: &Path) -> Result<()> {
    let url: Url = parse_download_url(url).with_context(|| format!("not a valid http(s) URL: {url}"))?;

    let cookies_file = provision_cookies(&config.cookies)?;
    log_cookies_configuration(cookies_file.as_deref());

    let source = YtDlpSource::new(config.download.clone());
    let path = download_to_dir(&source, url, &config.download.temp_dir, cookies_file, output).await?;

    println!("{}", path.display());
    Ok(())
}
