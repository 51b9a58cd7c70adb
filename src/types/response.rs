//! API response types

use serde::{Deserialize, Serialize};

use super::chat::ChatMessage;

/// Per-file upload failure
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadError {
    pub filename: String,
    pub error: String,
}

/// Response to an upload batch
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UploadResponse {
    /// Filenames stored in the working directory
    pub stored: Vec<String>,
    /// Files rejected during validation or decoding
    pub errors: Vec<UploadError>,
    /// Whether this batch triggered a successful index rebuild
    pub index_rebuilt: bool,
    /// Rebuild failure, if any; the stored files index on the next rebuild
    #[serde(skip_serializing_if = "Option::is_none")]
    pub index_error: Option<String>,
    /// Always empty: the UI resets its file picker with this value
    pub selection: Vec<String>,
}

/// Response to a chat submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatResponse {
    /// Updated conversation log
    pub messages: Vec<ChatMessage>,
    /// Always empty: the UI clears its input field with this value
    pub input: String,
}

impl ChatResponse {
    /// Wrap an updated log, clearing the input field
    pub fn new(messages: Vec<ChatMessage>) -> Self {
        Self {
            messages,
            input: String::new(),
        }
    }
}
