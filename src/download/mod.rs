//! Fetching media with yt-dlp and delivering it to the chat

pub mod cookies;
pub mod error;
pub mod job;
pub mod local;
pub mod send;
pub mod source;
pub mod ytdlp;
pub mod ytdlp_errors;

pub use cookies::{log_cookies_configuration, provision_cookies};
pub use error::{DownloadError, FailureKind};
pub use job::{DownloadJob, DownloadedMedia};
pub use send::{ChatGateway, SendOutcome, UploadError, send_media};
pub use source::MediaSource;
pub use ytdlp::YtDlpSource;
