//! Telegram side: bot setup, command parsing and the dispatcher schema

pub mod bot;
pub mod command;
pub mod handlers;

pub use bot::{create_bot, setup_bot_commands};
pub use command::ChatCommand;
pub use handlers::{HandlerDeps, HandlerError, HandlerSettings, schema};
