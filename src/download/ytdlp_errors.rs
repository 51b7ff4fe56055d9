//! yt-dlp error analysis
//!
//! Classifies yt-dlp stderr and builds the chat replies for failed
//! downloads. Matching is a best-effort substring heuristic over a
//! third-party tool's output; a miss degrades to [`FailureKind::Generic`].

use once_cell::sync::Lazy;
use regex::Regex;

use crate::download::error::{DownloadError, FailureKind};

/// Terminal color sequences yt-dlp emits when it thinks stderr is a TTY
#[allow(clippy::expect_used)]
static ANSI_ESCAPE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\x1b\[[0-9;]*[A-Za-z]").expect("ansi escape regex"));

/// Lowercase fragments yt-dlp prints when a login, age check or
/// membership wall blocks extraction.
const NEEDS_COOKIES_PATTERNS: &[&str] = &[
    "sign in to confirm",
    "confirm your age",
    "age-restricted",
    "age restricted",
    "inappropriate for some users",
    "login required",
    "login_required",
    "requires login",
    "log in to",
    "please sign in",
    "use --cookies",
    "cookies are no longer valid",
    "private video",
    "video is private",
    "members-only",
    "members only",
    "join this channel",
];

/// Maximum number of characters of tool output quoted back to the chat
const MAX_DETAILS_CHARS: usize = 600;

/// Analyzes yt-dlp stderr and determines the failure category
pub fn analyze_ytdlp_error(stderr: &str) -> FailureKind {
    let stderr_lower = stderr.to_lowercase();
    if NEEDS_COOKIES_PATTERNS.iter().any(|p| stderr_lower.contains(p)) {
        FailureKind::NeedsCookies
    } else {
        FailureKind::Generic
    }
}

/// Picks the most informative lines of yt-dlp output for the user.
///
/// Prefers `ERROR:` lines (without the prefix), falls back to the last
/// non-empty line, and keeps only the tail if it is still too long.
pub fn sanitize_user_error_message(stderr: &str) -> String {
    let stderr = ANSI_ESCAPE_RE.replace_all(stderr, "");
    let errors: Vec<&str> = stderr
        .lines()
        .map(str::trim)
        .filter_map(|line| line.strip_prefix("ERROR:"))
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .collect();

    let text = if errors.is_empty() {
        stderr
            .lines()
            .map(str::trim)
            .rfind(|line| !line.is_empty())
            .unwrap_or_default()
            .to_string()
    } else {
        errors.join("\n")
    };

    truncate_tail(&text, MAX_DETAILS_CHARS)
}

/// Keeps the last `max_chars` characters, on a char boundary.
fn truncate_tail(text: &str, max_chars: usize) -> String {
    let count = text.chars().count();
    if count <= max_chars {
        return text.to_string();
    }
    let tail: String = text.chars().skip(count - max_chars).collect();
    format!("…{tail}")
}

/// Chat reply for a failed download
pub fn get_error_message(err: &DownloadError) -> String {
    match err {
        DownloadError::Exited { stderr, kind, .. } => {
            let details = sanitize_user_error_message(stderr);
            let details = if details.is_empty() {
                "yt-dlp exited without an error message".to_string()
            } else {
                details
            };
            match kind {
                FailureKind::NeedsCookies => format!(
                    "❌ Download failed: this video requires login or age verification.\n\n{details}\n\n\
                     Hint: set YTDLP_COOKIES_CONTENT (exported cookies.txt content) in the bot environment and restart."
                ),
                FailureKind::Generic => format!("❌ Download failed: {details}"),
            }
        }
        DownloadError::Timeout(timeout) => format!(
            "❌ Download failed: timed out after {}s. Try again later or pick a shorter video.",
            timeout.as_secs()
        ),
        DownloadError::MissingOutput(_) => "❌ Download failed: yt-dlp produced no file.".to_string(),
        DownloadError::Process(_) => "❌ Download failed: the downloader is unavailable on the server.".to_string(),
        DownloadError::Io(_) => "❌ Download failed: could not read the downloaded file.".to_string(),
    }
}
