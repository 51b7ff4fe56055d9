//! yt-dlp invocation
//!
//! One subprocess per job, no retries. The output file is located from the
//! `--print after_move:filepath` line, or by scanning the job directory when
//! yt-dlp printed nothing usable.

use std::ffi::OsString;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::process::Command;

use crate::core::config::DownloadSettings;
use crate::core::process::run_with_timeout;
use crate::download::error::DownloadError;
use crate::download::job::{DownloadJob, DownloadedMedia};
use crate::download::source::MediaSource;
use crate::download::ytdlp_errors::analyze_ytdlp_error;

/// Suffixes of files yt-dlp leaves behind mid-download
const PARTIAL_SUFFIXES: &[&str] = &[".part", ".ytdl", ".temp", ".tmp"];

/// Download source backed by the yt-dlp CLI
pub struct YtDlpSource {
    settings: DownloadSettings,
}

impl YtDlpSource {
    pub fn new(settings: DownloadSettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &DownloadSettings {
        &self.settings
    }

    /// Full argument list for one job
    pub fn build_args(&self, job: &DownloadJob) -> Vec<OsString> {
        let format = self.settings.format_selector();
        let mut args: Vec<OsString> = [
            "-f",
            format.as_str(),
            "--no-playlist",
            "--no-warnings",
            "--merge-output-format",
            "mp4",
            "--geo-bypass",
            "--retries",
            "3",
            "--skip-unavailable-fragments",
            "--force-overwrites",
            "--no-progress",
            "--print",
            "after_move:filepath",
        ]
        .into_iter()
        .map(OsString::from)
        .collect();

        args.push("-o".into());
        args.push(job.output_template().into_os_string());

        if let Some(cookies) = &job.cookies_file {
            log::info!("Using cookiefile: {}", cookies.display());
            args.push("--cookies".into());
            args.push(cookies.clone().into_os_string());
        }

        args.push("--".into());
        args.push(job.url.as_str().into());
        args
    }
}

#[async_trait]
impl MediaSource for YtDlpSource {
    fn name(&self) -> &str {
        "yt-dlp"
    }

    async fn fetch(&self, job: &DownloadJob) -> Result<DownloadedMedia, DownloadError> {
        let mut cmd = Command::new(&self.settings.ytdlp_bin);
        cmd.args(self.build_args(job));

        log::info!("Starting yt-dlp for {} in {}", job.url, job.work_dir.display());
        let started = std::time::Instant::now();
        let output = run_with_timeout(&mut cmd, self.settings.timeout).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
            let kind = analyze_ytdlp_error(&stderr);
            log::error!(
                "yt-dlp failed for {} (exit {:?}, {:?}): {}",
                job.url,
                output.status.code(),
                kind,
                stderr
            );
            return Err(DownloadError::Exited {
                code: output.status.code(),
                stderr,
                kind,
            });
        }

        let stdout = String::from_utf8_lossy(&output.stdout);
        let path = match printed_path(&stdout, &job.work_dir) {
            Some(path) => path,
            None => find_downloaded_file(&job.work_dir)
                .await?
                .ok_or_else(|| DownloadError::MissingOutput(job.work_dir.clone()))?,
        };

        let size = fs_err::tokio::metadata(&path).await?.len();
        if size == 0 {
            log::error!("yt-dlp exited 0 but {} is empty", path.display());
            return Err(DownloadError::MissingOutput(job.work_dir.clone()));
        }

        log::info!(
            "Downloaded {} ({} bytes) in {:.1}s",
            path.display(),
            size,
            started.elapsed().as_secs_f64()
        );
        Ok(DownloadedMedia { path, size })
    }
}

/// Last printed line that names an existing file inside `work_dir`.
fn printed_path(stdout: &str, work_dir: &Path) -> Option<PathBuf> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(PathBuf::from)
        .rfind(|path| path.starts_with(work_dir) && path.is_file())
}

/// Largest complete file in `work_dir`, ignoring yt-dlp partials.
async fn find_downloaded_file(work_dir: &Path) -> std::io::Result<Option<PathBuf>> {
    let mut entries = fs_err::tokio::read_dir(work_dir).await?;
    let mut best: Option<(u64, PathBuf)> = None;

    while let Some(entry) = entries.next_entry().await? {
        let name = entry.file_name().to_string_lossy().into_owned();
        if PARTIAL_SUFFIXES.iter().any(|suffix| name.ends_with(suffix)) {
            continue;
        }
        let metadata = entry.metadata().await?;
        if !metadata.is_file() {
            continue;
        }
        if best.as_ref().is_none_or(|(size, _)| metadata.len() > *size) {
            best = Some((metadata.len(), entry.path()));
        }
    }

    Ok(best.map(|(_, path)| path))
}

/// Logs the installed yt-dlp version; `None` if it cannot be run.
pub async fn probe_version(ytdlp_bin: &str) -> Option<String> {
    let mut cmd = Command::new(ytdlp_bin);
    cmd.arg("--version");

    match run_with_timeout(&mut cmd, std::time::Duration::from_secs(15)).await {
        Ok(output) if output.status.success() => {
            let version = String::from_utf8_lossy(&output.stdout).trim().to_string();
            log::info!("yt-dlp version: {}", version);
            Some(version)
        }
        Ok(output) => {
            log::warn!(
                "{} --version exited with {:?}; downloads will likely fail",
                ytdlp_bin,
                output.status.code()
            );
            None
        }
        Err(e) => {
            log::warn!("yt-dlp is not available ({}); downloads will fail", e);
            None
        }
    }
}
