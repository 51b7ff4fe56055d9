use std::path::PathBuf;

use thiserror::Error;

/// Startup configuration errors. Always fatal.
#[derive(Error, Debug)]
pub enum ConfigError {
    /// `TELEGRAM_TOKEN` is unset or blank
    #[error("TELEGRAM_TOKEN environment variable is not set")]
    MissingToken,

    /// A variable is set but cannot be used
    #[error("invalid value {value:?} for {var}: {reason}")]
    Invalid {
        var: &'static str,
        value: String,
        reason: String,
    },
}

/// Writing the cookie blob to disk failed. Fatal at startup.
#[derive(Error, Debug)]
#[error("failed to write cookies to {}: {source}", .path.display())]
pub struct CookieWriteError {
    pub path: PathBuf,
    #[source]
    pub source: std::io::Error,
}
