//! tubedrop - Telegram bot that downloads low-resolution videos with yt-dlp
//!
//! # Module Structure
//!
//! - `core`: configuration, errors, logging and subprocess helpers
//! - `download`: cookie provisioning, yt-dlp invocation and result delivery
//! - `telegram`: bot setup, command parsing and the dispatcher schema

pub mod cli;
pub mod core;
pub mod download;
pub mod telegram;

pub use core::{Config, ConfigError};
pub use download::{DownloadError, MediaSource, YtDlpSource};
pub use telegram::{HandlerDeps, schema};
