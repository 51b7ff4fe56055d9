//! Recording [`ChatGateway`]

#![allow(dead_code)]

use std::path::Path;
use std::sync::Mutex;
use std::sync::atomic::{AtomicI32, AtomicUsize, Ordering};

use async_trait::async_trait;
use teloxide::types::{ChatId, MessageId};
use teloxide::{ApiError, RequestError};

use tubedrop::download::send::ChatGateway;

/// One call that reached the chat
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Sent {
    Text(String),
    Edit { message_id: i32, text: String },
    Document {
        file_name: String,
        caption: Option<String>,
        /// Contents at the time of sending; part files are deleted right after
        bytes: Vec<u8>,
    },
}

#[derive(Default)]
pub struct MockGateway {
    sent: Mutex<Vec<Sent>>,
    next_id: AtomicI32,
    documents: AtomicUsize,
    /// 1-based index of the document upload that fails
    fail_document_at: Option<usize>,
    fail_edits: bool,
}

impl MockGateway {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn failing_document_at(index: usize) -> Self {
        Self {
            fail_document_at: Some(index),
            ..Self::default()
        }
    }

    pub fn failing_edits() -> Self {
        Self {
            fail_edits: true,
            ..Self::default()
        }
    }

    pub fn sent(&self) -> Vec<Sent> {
        self.sent.lock().unwrap().clone()
    }

    pub fn texts(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Text(text) => Some(text),
                _ => None,
            })
            .collect()
    }

    pub fn edits(&self) -> Vec<String> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Edit { text, .. } => Some(text),
                _ => None,
            })
            .collect()
    }

    /// (file name, caption, bytes) of every document, in order
    pub fn documents(&self) -> Vec<(String, Option<String>, Vec<u8>)> {
        self.sent()
            .into_iter()
            .filter_map(|s| match s {
                Sent::Document {
                    file_name,
                    caption,
                    bytes,
                } => Some((file_name, caption, bytes)),
                _ => None,
            })
            .collect()
    }

    /// Text of the last message or edit, i.e. what the user sees last
    pub fn last_reply(&self) -> Option<String> {
        self.sent().into_iter().rev().find_map(|s| match s {
            Sent::Text(text) | Sent::Edit { text, .. } => Some(text),
            Sent::Document { .. } => None,
        })
    }

    fn record(&self, sent: Sent) {
        self.sent.lock().unwrap().push(sent);
    }
}

fn fake_failure() -> RequestError {
    RequestError::Api(ApiError::BotBlocked)
}

#[async_trait]
impl ChatGateway for MockGateway {
    async fn send_text(&self, _chat_id: ChatId, text: &str) -> Result<MessageId, RequestError> {
        self.record(Sent::Text(text.to_string()));
        Ok(MessageId(self.next_id.fetch_add(1, Ordering::SeqCst) + 1))
    }

    async fn edit_text(&self, _chat_id: ChatId, message_id: MessageId, text: &str) -> Result<(), RequestError> {
        if self.fail_edits {
            return Err(fake_failure());
        }
        self.record(Sent::Edit {
            message_id: message_id.0,
            text: text.to_string(),
        });
        Ok(())
    }

    async fn send_document(
        &self,
        _chat_id: ChatId,
        path: &Path,
        file_name: &str,
        caption: Option<&str>,
    ) -> Result<(), RequestError> {
        let index = self.documents.fetch_add(1, Ordering::SeqCst) + 1;
        if self.fail_document_at == Some(index) {
            return Err(fake_failure());
        }
        let bytes = std::fs::read(path).unwrap();
        self.record(Sent::Document {
            file_name: file_name.to_string(),
            caption: caption.map(str::to_string),
            bytes,
        });
        Ok(())
    }
}
