//! Cookie provisioning for yt-dlp
//!
//! Browser-exported cookies arrive as raw Netscape cookie file text in
//! `YTDLP_COOKIES_CONTENT`. They are written to disk once at startup so
//! yt-dlp can be pointed at them with `--cookies`.

use std::path::{Path, PathBuf};

use crate::core::config::CookieSettings;
use crate::core::error::CookieWriteError;

/// Writes the configured cookie content to its file.
///
/// # Returns
/// * `Ok(Some(path))` - content was set and written verbatim, replacing any existing file
/// * `Ok(None)` - no content configured; nothing is written and downloads run without cookies
/// * `Err(CookieWriteError)` - directory creation or the write itself failed
pub fn provision_cookies(settings: &CookieSettings) -> Result<Option<PathBuf>, CookieWriteError> {
    let Some(content) = settings.content.as_deref().filter(|c| !c.is_empty()) else {
        log::info!("No YTDLP_COOKIES_CONTENT provided; proceeding without cookies");
        return Ok(None);
    };

    let path = &settings.file;
    let to_error = |source| CookieWriteError {
        path: path.clone(),
        source,
    };

    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs_err::create_dir_all(parent).map_err(to_error)?;
    }
    fs_err::write(path, content).map_err(to_error)?;

    log::info!("Wrote cookies to {} ({} bytes)", path.display(), content.len());
    Ok(Some(path.clone()))
}

/// Logs the cookie state at startup
pub fn log_cookies_configuration(cookies_file: Option<&Path>) {
    match cookies_file {
        Some(path) => {
            let lines = fs_err::read_to_string(path)
                .map(|content| {
                    content
                        .lines()
                        .filter(|l| !l.trim().is_empty() && !l.starts_with('#'))
                        .count()
                })
                .unwrap_or(0);
            log::info!("🍪 Cookies: {} ({} cookie lines)", path.display(), lines);
            if lines == 0 {
                log::warn!("⚠️  Cookie file has no cookie lines; is it in Netscape format?");
            }
        }
        None => {
            log::warn!("⚠️  Cookies: not configured");
            log::warn!("   Age-restricted and login-only videos will fail.");
            log::warn!("   Export cookies.txt from a logged-in browser and set YTDLP_COOKIES_CONTENT.");
        }
    }
}
