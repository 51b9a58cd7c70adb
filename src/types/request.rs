//! API request types

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;

/// One uploaded file as sent by the UI: the filename plus the file content as
/// a base64 payload carrying a data-URL prefix
/// (`data:application/pdf;base64,...`).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadFile {
    pub filename: String,
    pub content: String,
}

/// Upload request for a batch of files
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct UploadRequest {
    #[serde(default)]
    pub files: Vec<UploadFile>,
}

/// Chat request: the question plus the conversation log as currently held by
/// the UI
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ChatRequest {
    #[serde(default)]
    pub question: String,
    #[serde(default)]
    pub messages: Vec<ChatMessage>,
}

impl ChatRequest {
    /// Create a request with an empty prior log
    pub fn new(question: impl Into<String>) -> Self {
        Self {
            question: question.into(),
            messages: Vec::new(),
        }
    }

    /// Continue an existing conversation
    pub fn with_messages(mut self, messages: Vec<ChatMessage>) -> Self {
        self.messages = messages;
        self
    }
}
