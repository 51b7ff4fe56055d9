use std::path::PathBuf;
use std::time::Duration;

use thiserror::Error;

use crate::core::process::ProcessError;

/// Coarse category of a failed download, used to pick the chat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureKind {
    /// Login, age or privacy wall; cookies are likely required
    NeedsCookies,
    /// Anything else
    Generic,
}

/// A single download attempt failed. Recoverable: reported to the chat.
#[derive(Error, Debug)]
pub enum DownloadError {
    /// yt-dlp exited with a non-zero status
    #[error("yt-dlp exited with {}: {stderr}", .code.map_or_else(|| "signal".to_string(), |c| format!("code {c}")))]
    Exited {
        code: Option<i32>,
        stderr: String,
        kind: FailureKind,
    },

    /// yt-dlp reported success but left no usable file behind
    #[error("download finished but no output file was found in {}", .0.display())]
    MissingOutput(PathBuf),

    /// yt-dlp did not finish in time and was killed
    #[error("download timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// yt-dlp could not be started at all
    #[error("failed to run yt-dlp: {0}")]
    Process(#[source] ProcessError),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl DownloadError {
    pub fn kind(&self) -> FailureKind {
        match self {
            DownloadError::Exited { kind, .. } => *kind,
            _ => FailureKind::Generic,
        }
    }

    /// Returns subcategory for logs
    pub fn subcategory(&self) -> &'static str {
        match self {
            DownloadError::Exited {
                kind: FailureKind::NeedsCookies,
                ..
            } => "needs_cookies",
            DownloadError::Exited { .. } => "ytdlp",
            DownloadError::MissingOutput(_) => "missing_output",
            DownloadError::Timeout(_) => "timeout",
            DownloadError::Process(_) => "process",
            DownloadError::Io(_) => "io",
        }
    }
}

impl From<ProcessError> for DownloadError {
    fn from(err: ProcessError) -> Self {
        match err {
            ProcessError::Timeout(timeout) => DownloadError::Timeout(timeout),
            other => DownloadError::Process(other),
        }
    }
}
