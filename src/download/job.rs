//! Per-command download job
//!
//! Every job gets its own scratch directory so concurrent commands never
//! see each other's files, and cleanup is a single directory removal.

use std::path::{Path, PathBuf};

use url::Url;
use uuid::Uuid;

/// A single download request: source URL, scratch directory, optional cookies.
#[derive(Debug, Clone)]
pub struct DownloadJob {
    pub url: Url,
    pub work_dir: PathBuf,
    pub cookies_file: Option<PathBuf>,
}

/// File produced by a successful download
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DownloadedMedia {
    pub path: PathBuf,
    pub size: u64,
}

impl DownloadedMedia {
    /// File name shown to the chat
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "video.mp4".to_string())
    }
}

impl DownloadJob {
    /// Creates the job and its scratch directory under `temp_dir`.
    pub async fn create(url: Url, temp_dir: &Path, cookies_file: Option<PathBuf>) -> std::io::Result<Self> {
        let work_dir = temp_dir.join(format!("tubedrop-{}", Uuid::new_v4().simple()));
        fs_err::tokio::create_dir_all(&work_dir).await?;
        log::debug!("Created job directory {}", work_dir.display());
        Ok(Self {
            url,
            work_dir,
            cookies_file,
        })
    }

    /// yt-dlp `-o` template inside the scratch directory
    pub fn output_template(&self) -> PathBuf {
        self.work_dir.join("%(id)s.%(ext)s")
    }

    /// Removes the scratch directory and everything left in it.
    pub async fn cleanup(&self) {
        match fs_err::tokio::remove_dir_all(&self.work_dir).await {
            Ok(()) => log::debug!("Removed job directory {}", self.work_dir.display()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to clean up {}: {}", self.work_dir.display(), e),
        }
    }
}
