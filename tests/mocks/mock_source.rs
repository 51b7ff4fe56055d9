//! Scripted [`MediaSource`]

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Mutex;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use tubedrop::download::error::DownloadError;
use tubedrop::download::job::{DownloadJob, DownloadedMedia};
use tubedrop::download::source::MediaSource;
use tubedrop::download::ytdlp_errors::analyze_ytdlp_error;

/// What the next fetch does
#[derive(Debug, Clone)]
pub enum SourceBehavior {
    /// Writes `name` with these bytes into the job directory
    File { name: String, bytes: Vec<u8> },
    /// Behaves like yt-dlp exiting 1 with this stderr
    Exit { stderr: String },
    /// Exits 0 without leaving a file
    NoOutput,
}

pub struct MockSource {
    behavior: SourceBehavior,
    calls: AtomicUsize,
    jobs: Mutex<Vec<DownloadJob>>,
}

impl MockSource {
    pub fn new(behavior: SourceBehavior) -> Self {
        Self {
            behavior,
            calls: AtomicUsize::new(0),
            jobs: Mutex::new(Vec::new()),
        }
    }

    pub fn file(name: &str, bytes: Vec<u8>) -> Self {
        Self::new(SourceBehavior::File {
            name: name.to_string(),
            bytes,
        })
    }

    pub fn exit(stderr: &str) -> Self {
        Self::new(SourceBehavior::Exit {
            stderr: stderr.to_string(),
        })
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    pub fn jobs(&self) -> Vec<DownloadJob> {
        self.jobs.lock().unwrap().clone()
    }

    pub fn last_work_dir(&self) -> Option<PathBuf> {
        self.jobs().last().map(|job| job.work_dir.clone())
    }
}

#[async_trait]
impl MediaSource for MockSource {
    fn name(&self) -> &str {
        "mock"
    }

    async fn fetch(&self, job: &DownloadJob) -> Result<DownloadedMedia, DownloadError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.jobs.lock().unwrap().push(job.clone());

        match &self.behavior {
            SourceBehavior::File { name, bytes } => {
                let path = job.work_dir.join(name);
                tokio::fs::write(&path, bytes).await?;
                Ok(DownloadedMedia {
                    path,
                    size: bytes.len() as u64,
                })
            }
            SourceBehavior::Exit { stderr } => Err(DownloadError::Exited {
                code: Some(1),
                stderr: stderr.clone(),
                kind: analyze_ytdlp_error(stderr),
            }),
            SourceBehavior::NoOutput => Err(DownloadError::MissingOutput(job.work_dir.clone())),
        }
    }
}
