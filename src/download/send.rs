//! Result delivery
//!
//! Files within the Bot API limit go out as one document. Larger files are
//! cut into consecutive byte ranges, each written to a `.partNNN` file and
//! sent in order with a `part i/n` caption. Parts are raw byte slices, so
//! `cat name.part001 name.part002 ... > name` restores the original.

use std::ops::Range;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use teloxide::prelude::*;
use teloxide::RequestError;
use teloxide::types::{ChatAction, InputFile, MessageId};
use thiserror::Error;
use tokio::io::{AsyncReadExt, AsyncSeekExt, AsyncWriteExt};

use crate::core::config::UploadSettings;

/// Delivering the downloaded file failed. Recoverable: reported to the chat.
#[derive(Error, Debug)]
pub enum UploadError {
    #[error("Telegram error: {0}")]
    Telegram(#[from] RequestError),

    #[error("failed to prepare {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("part {index}/{total} failed: {source}")]
    Part {
        index: usize,
        total: usize,
        #[source]
        source: Box<UploadError>,
    },
}

impl UploadError {
    fn io(path: &Path, source: std::io::Error) -> Self {
        UploadError::Io {
            path: path.to_path_buf(),
            source,
        }
    }
}

/// The few chat operations the bot needs.
///
/// Implemented for [`Bot`]; tests use a recording fake.
#[async_trait]
pub trait ChatGateway: Send + Sync {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, RequestError>;

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), RequestError>;

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
        caption: Option<&str>,
    ) -> Result<(), RequestError>;
}

#[async_trait]
impl ChatGateway for Bot {
    async fn send_text(&self, chat_id: ChatId, text: &str) -> Result<MessageId, RequestError> {
        let message = self.send_message(chat_id, text).await?;
        Ok(message.id)
    }

    async fn edit_text(&self, chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), RequestError> {
        self.edit_message_text(chat_id, message_id, text).await?;
        Ok(())
    }

    async fn send_document(
        &self,
        chat_id: ChatId,
        path: &Path,
        file_name: &str,
        caption: Option<&str>,
    ) -> Result<(), RequestError> {
        if let Err(e) = self.send_chat_action(chat_id, ChatAction::UploadDocument).await {
            log::warn!("Failed to send chat action: {}", e);
        }

        let input = InputFile::file(path.to_path_buf()).file_name(file_name.to_string());
        let mut request = Requester::send_document(self, chat_id, input);
        if let Some(caption) = caption {
            request = request.caption(caption);
        }
        request.await?;
        Ok(())
    }
}

/// How a file was delivered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SendOutcome {
    Single,
    Parts(usize),
}

/// Consecutive byte ranges of at most `part_size` covering `0..size`.
pub fn part_ranges(size: u64, part_size: u64) -> Vec<Range<u64>> {
    if part_size == 0 {
        return vec![0..size];
    }
    (0..size.div_ceil(part_size))
        .map(|i| {
            let start = i * part_size;
            start..(start + part_size).min(size)
        })
        .collect()
}

/// `<name>.part001`, `<name>.part002`, ...
pub fn part_file_name(file_name: &str, index: usize) -> String {
    format!("{file_name}.part{index:03}")
}

/// Copies `range` of `source` into a new file at `dest`.
pub async fn write_part(source: &Path, range: Range<u64>, dest: &Path) -> std::io::Result<u64> {
    let mut input = tokio::fs::File::open(source).await?;
    input.seek(std::io::SeekFrom::Start(range.start)).await?;
    let mut output = tokio::fs::File::create(dest).await?;

    let mut limited = input.take(range.end - range.start);
    let copied = tokio::io::copy(&mut limited, &mut output).await?;
    output.flush().await?;
    Ok(copied)
}

/// Sends a downloaded file to the chat, splitting it when over the limit.
///
/// Stops at the first failing part; parts already sent stay in the chat.
pub async fn send_media<G>(
    gateway: &G,
    chat_id: ChatId,
    path: &Path,
    settings: &UploadSettings,
    status: Option<MessageId>,
) -> Result<SendOutcome, UploadError>
where
    G: ChatGateway + ?Sized,
{
    let size = fs_err::tokio::metadata(path)
        .await
        .map_err(|e| UploadError::io(path, e))?
        .len();
    let file_name = path
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "video.mp4".to_string());

    if size <= settings.upload_limit {
        update_status(
            gateway,
            chat_id,
            status,
            &format!("Uploading {} ({} MB)...", file_name, size / 1024 / 1024),
        )
        .await;
        log::info!("Sending {} ({} bytes) to chat {}", file_name, size, chat_id);
        gateway.send_document(chat_id, path, &file_name, None).await?;
        return Ok(SendOutcome::Single);
    }

    let ranges = part_ranges(size, settings.part_size);
    let total = ranges.len();
    log::info!(
        "{} is {} bytes (> {}), sending in {} parts",
        file_name,
        size,
        settings.upload_limit,
        total
    );
    update_status(
        gateway,
        chat_id,
        status,
        &format!(
            "File is {} MB (over {} MB). Sending in {} parts...",
            size / 1024 / 1024,
            settings.upload_limit / 1024 / 1024,
            total
        ),
    )
    .await;

    for (i, range) in ranges.into_iter().enumerate() {
        let index = i + 1;
        let part_name = part_file_name(&file_name, index);
        let part_path = path.with_file_name(&part_name);

        let result = send_part(gateway, chat_id, path, range, &part_path, &part_name, index, total).await;
        match fs_err::tokio::remove_file(&part_path).await {
            Ok(()) => {}
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
            Err(e) => log::warn!("Failed to remove {}: {}", part_path.display(), e),
        }

        result.map_err(|source| UploadError::Part {
            index,
            total,
            source: Box::new(source),
        })?;
    }

    Ok(SendOutcome::Parts(total))
}

#[allow(clippy::too_many_arguments)]
async fn send_part<G>(
    gateway: &G,
    chat_id: ChatId,
    source: &Path,
    range: Range<u64>,
    part_path: &Path,
    part_name: &str,
    index: usize,
    total: usize,
) -> Result<(), UploadError>
where
    G: ChatGateway + ?Sized,
{
    write_part(source, range, part_path)
        .await
        .map_err(|e| UploadError::io(part_path, e))?;
    log::info!("Sending part {}/{} ({}) to chat {}", index, total, part_name, chat_id);
    let caption = format!("part {index}/{total}");
    gateway
        .send_document(chat_id, part_path, part_name, Some(caption.as_str()))
        .await?;
    Ok(())
}

/// Best-effort status message edit; failures only get logged.
pub async fn update_status<G>(gateway: &G, chat_id: ChatId, status: Option<MessageId>, text: &str)
where
    G: ChatGateway + ?Sized,
{
    if let Some(message_id) = status {
        if let Err(e) = gateway.edit_text(chat_id, message_id, text).await {
            log::warn!("Failed to update status message: {}", e);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_part_ranges_exact_multiple() {
        assert_eq!(part_ranges(100, 50), vec![0..50, 50..100]);
    }

    #[test]
    fn test_part_ranges_remainder() {
        assert_eq!(part_ranges(120, 48), vec![0..48, 48..96, 96..120]);
    }

    #[test]
    fn test_part_ranges_count_is_ceil() {
        for size in [1u64, 47, 48, 49, 95, 96, 97, 1000] {
            let ranges = part_ranges(size, 48);
            assert_eq!(ranges.len() as u64, size.div_ceil(48), "size {size}");
            assert_eq!(ranges.first().map(|r| r.start), Some(0));
            assert_eq!(ranges.last().map(|r| r.end), Some(size));
            assert!(ranges.windows(2).all(|w| w[0].end == w[1].start));
            assert!(ranges.iter().all(|r| r.end - r.start <= 48 && r.end > r.start));
        }
    }

    #[test]
    fn test_part_ranges_empty_file() {
        assert!(part_ranges(0, 48).is_empty());
    }

    #[test]
    fn test_part_file_name() {
        assert_eq!(part_file_name("abc.mp4", 1), "abc.mp4.part001");
        assert_eq!(part_file_name("abc.mp4", 12), "abc.mp4.part012");
    }

    #[tokio::test]
    async fn test_write_part_copies_exact_range() {
        let dir = tempfile::tempdir().unwrap();
        let source = dir.path().join("src.bin");
        let data: Vec<u8> = (0..=255u8).cycle().take(1000).collect();
        std::fs::write(&source, &data).unwrap();

        let dest = dir.path().join("part");
        let copied = write_part(&source, 300..700, &dest).await.unwrap();

        assert_eq!(copied, 400);
        assert_eq!(std::fs::read(&dest).unwrap(), &data[300..700]);
    }
}
