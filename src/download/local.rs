//! Download to a local directory, without Telegram
//!
//! Backs the `tubedrop download` subcommand. Same job layout and cleanup as
//! the chat path; the finished file is copied out before the job directory
//! is removed.

use std::path::{Path, PathBuf};

use anyhow::Result;
use url::Url;

use crate::download::job::DownloadJob;
use crate::download::source::MediaSource;
use crate::download::ytdlp_errors::get_error_message;

/// Downloads `url` and copies the result into `output`, returning its path.
///
/// Failures carry the same text a chat would receive.
pub async fn download_to_dir<S>(
    source: &S,
    url: Url,
    temp_dir: &Path,
    cookies_file: Option<PathBuf>,
    output: &Path,
) -> Result<PathBuf>
where
    S: MediaSource + ?Sized,
{
    let job = DownloadJob::create(url, temp_dir, cookies_file).await?;
    let result = copy_result(source, &job, output).await;
    job.cleanup().await;
    result
}

async fn copy_result<S>(source: &S, job: &DownloadJob, output: &Path) -> Result<PathBuf>
where
    S: MediaSource + ?Sized,
{
    let media = source
        .fetch(job)
        .await
        .map_err(|e| anyhow::anyhow!("{}", get_error_message(&e)))?;

    fs_err::tokio::create_dir_all(output).await?;
    let dest = output.join(media.file_name());
    fs_err::tokio::copy(&media.path, &dest).await?;
    log::info!("Saved {} ({} bytes)", dest.display(), media.size);
    Ok(dest)
}
