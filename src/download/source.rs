//! Download backend abstraction
//!
//! The chat handler only talks to a [`MediaSource`]; production uses
//! [`YtDlpSource`](crate::download::ytdlp::YtDlpSource), tests substitute
//! their own.

use async_trait::async_trait;

use crate::download::error::DownloadError;
use crate::download::job::{DownloadJob, DownloadedMedia};

#[async_trait]
pub trait MediaSource: Send + Sync {
    /// Human-readable name of this source (e.g., "yt-dlp")
    fn name(&self) -> &str;

    /// Runs one download attempt for the job, leaving the file in `job.work_dir`.
    ///
    /// The returned file always exists and is non-empty.
    async fn fetch(&self, job: &DownloadJob) -> Result<DownloadedMedia, DownloadError>;
}
