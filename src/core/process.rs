//! Process execution utilities with timeout support
//!
//! yt-dlp can stall on network problems indefinitely; every run is bounded
//! and the child's process group is killed when the deadline passes.

use std::process::{Output, Stdio};
use std::time::Duration;

use thiserror::Error;
use tokio::process::Command;

#[derive(Error, Debug)]
pub enum ProcessError {
    #[error("failed to start {program}: {source}")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed waiting for {program}: {source}")]
    Wait {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("process timed out after {}s", .0.as_secs())]
    Timeout(Duration),
}

/// Run an async Command with a timeout, capturing stdout and stderr.
///
/// On Unix the child leads its own process group, and on timeout the whole
/// group is killed so helpers it spawned (ffmpeg merges) stop writing too.
pub async fn run_with_timeout(cmd: &mut Command, timeout: Duration) -> Result<Output, ProcessError> {
    let program = cmd.as_std().get_program().to_string_lossy().into_owned();

    #[cfg(unix)]
    cmd.process_group(0);

    let child = cmd
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true)
        .spawn()
        .map_err(|source| ProcessError::Spawn {
            program: program.clone(),
            source,
        })?;
    let pid = child.id();

    match tokio::time::timeout(timeout, child.wait_with_output()).await {
        Ok(Ok(output)) => Ok(output),
        Ok(Err(source)) => Err(ProcessError::Wait { program, source }),
        Err(_) => {
            log::error!("{} timed out after {}s, killing", program, timeout.as_secs());
            if let Some(pid) = pid {
                kill_process_group(pid).await;
            }
            Err(ProcessError::Timeout(timeout))
        }
    }
}

/// Sends SIGKILL to the process group led by `pid`.
#[cfg(unix)]
async fn kill_process_group(pid: u32) {
    let group = format!("-{pid}");
    let result = Command::new("kill")
        .args(["-KILL", "--", group.as_str()])
        .stdin(Stdio::null())
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .status()
        .await;
    match result {
        Ok(status) if status.success() => log::debug!("Killed process group {}", pid),
        Ok(status) => log::warn!("kill for process group {} exited with {}", pid, status),
        Err(e) => log::warn!("Failed to kill process group {}: {}", pid, e),
    }
}

#[cfg(not(unix))]
async fn kill_process_group(_pid: u32) {}
