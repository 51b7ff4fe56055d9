//! Runtime configuration
//!
//! Everything is read once at startup into [`Config`] and passed explicitly
//! to the components that need it. Nothing downstream reads the environment.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;

use secrecy::SecretString;
use simplelog::LevelFilter;
use url::Url;

use crate::core::error::ConfigError;

/// Telegram Bot API attachment limit for bots (50 MB)
pub const UPLOAD_LIMIT_BYTES: u64 = 50 * 1024 * 1024;

/// Size of each part when a file is over [`UPLOAD_LIMIT_BYTES`] (48 MB)
pub const PART_SIZE_BYTES: u64 = 48 * 1024 * 1024;

/// Default destination for the cookie blob
pub const DEFAULT_COOKIES_FILE: &str = "/tmp/cookies.txt";

/// Default timeout for a single yt-dlp run (4 minutes)
pub const DEFAULT_YTDLP_TIMEOUT_SECS: u64 = 240;

/// Default resolution cap for downloaded video
pub const DEFAULT_MAX_HEIGHT: u32 = 360;

/// Request timeout for Bot API calls.
/// Uploads close to the limit over slow links take minutes.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(900);

/// Cookie provisioning settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CookieSettings {
    /// Raw Netscape cookie file content (`YTDLP_COOKIES_CONTENT`)
    pub content: Option<String>,
    /// Where the content gets written (`YTDLP_COOKIES_FILE`)
    pub file: PathBuf,
}

/// yt-dlp invocation settings
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadSettings {
    pub ytdlp_bin: String,
    pub temp_dir: PathBuf,
    pub timeout: Duration,
    pub max_height: u32,
    /// Full format selector override (`YTDLP_FORMAT`)
    pub format: Option<String>,
}

impl DownloadSettings {
    /// yt-dlp `-f` selector: low-res video+audio, falling back to anything.
    pub fn format_selector(&self) -> String {
        match &self.format {
            Some(format) => format.clone(),
            None => {
                let h = self.max_height;
                format!("bestvideo[height<={h}]+bestaudio/best[height<={h}]/best")
            }
        }
    }
}

impl Default for DownloadSettings {
    fn default() -> Self {
        Self {
            ytdlp_bin: "yt-dlp".to_string(),
            temp_dir: PathBuf::from("/tmp"),
            timeout: Duration::from_secs(DEFAULT_YTDLP_TIMEOUT_SECS),
            max_height: DEFAULT_MAX_HEIGHT,
            format: None,
        }
    }
}

/// Limits used by the result sender
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UploadSettings {
    /// Files up to this size are sent as a single document
    pub upload_limit: u64,
    /// Byte length of each part for larger files
    pub part_size: u64,
}

impl UploadSettings {
    pub fn new(upload_limit: u64, part_size: u64) -> Result<Self, ConfigError> {
        if part_size == 0 || part_size > upload_limit {
            return Err(ConfigError::Invalid {
                var: "part_size",
                value: part_size.to_string(),
                reason: format!("must be between 1 and the upload limit ({upload_limit})"),
            });
        }
        Ok(Self {
            upload_limit,
            part_size,
        })
    }
}

impl Default for UploadSettings {
    fn default() -> Self {
        Self {
            upload_limit: UPLOAD_LIMIT_BYTES,
            part_size: PART_SIZE_BYTES,
        }
    }
}

/// Process-wide configuration
#[derive(Debug)]
pub struct Config {
    token: Option<SecretString>,
    pub cookies: CookieSettings,
    pub download: DownloadSettings,
    pub upload: UploadSettings,
    /// Custom Bot API server (`BOT_API_URL`)
    pub bot_api_url: Option<Url>,
    pub log_level: LevelFilter,
    pub log_file: Option<PathBuf>,
}

impl Config {
    /// Reads configuration from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// Builds configuration from an arbitrary key lookup.
    ///
    /// Empty values are treated as unset, except `YTDLP_COOKIES_CONTENT`
    /// which is kept verbatim and only dropped when it is exactly empty.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_string()).filter(|v| !v.is_empty());

        let token = get("TELEGRAM_TOKEN").map(SecretString::from);

        let cookies = CookieSettings {
            content: lookup("YTDLP_COOKIES_CONTENT").filter(|v| !v.is_empty()),
            file: get("YTDLP_COOKIES_FILE")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from(DEFAULT_COOKIES_FILE)),
        };

        let defaults = DownloadSettings::default();
        let download = DownloadSettings {
            ytdlp_bin: get("YTDL_BIN").unwrap_or(defaults.ytdlp_bin),
            temp_dir: get("TEMP_FILES_DIR").map(PathBuf::from).unwrap_or(defaults.temp_dir),
            timeout: match get("YTDLP_TIMEOUT_SECS") {
                Some(raw) => Duration::from_secs(parse_var::<u64>("YTDLP_TIMEOUT_SECS", &raw)?),
                None => defaults.timeout,
            },
            max_height: match get("YTDLP_MAX_HEIGHT") {
                Some(raw) => parse_var::<u32>("YTDLP_MAX_HEIGHT", &raw)?,
                None => defaults.max_height,
            },
            format: get("YTDLP_FORMAT"),
        };
        if download.timeout.is_zero() {
            return Err(ConfigError::Invalid {
                var: "YTDLP_TIMEOUT_SECS",
                value: "0".to_string(),
                reason: "timeout must be positive".to_string(),
            });
        }

        let bot_api_url = match get("BOT_API_URL") {
            Some(raw) => Some(Url::parse(&raw).map_err(|e| ConfigError::Invalid {
                var: "BOT_API_URL",
                value: raw.clone(),
                reason: e.to_string(),
            })?),
            None => None,
        };

        let log_level = match get("LOG_LEVEL") {
            Some(raw) => parse_var::<LevelFilter>("LOG_LEVEL", &raw)?,
            None => LevelFilter::Info,
        };

        Ok(Self {
            token,
            cookies,
            download,
            upload: UploadSettings::default(),
            bot_api_url,
            log_level,
            log_file: get("LOG_FILE_PATH").map(PathBuf::from),
        })
    }

    /// Bot token; only required when the bot is actually started.
    pub fn token(&self) -> Result<&SecretString, ConfigError> {
        self.token.as_ref().ok_or(ConfigError::MissingToken)
    }
}

fn parse_var<T>(var: &'static str, raw: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: std::fmt::Display,
{
    raw.parse::<T>().map_err(|e| ConfigError::Invalid {
        var,
        value: raw.to_string(),
        reason: e.to_string(),
    })
}
