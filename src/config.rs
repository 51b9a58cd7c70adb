//! Configuration for the chat service

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Approximate characters per model token, used to turn the chunk token
/// budget into a character budget.
pub const CHARS_PER_TOKEN: usize = 4;

/// Main service configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    /// Server configuration
    #[serde(default)]
    pub server: ServerConfig,
    /// Storage paths
    #[serde(default)]
    pub storage: StorageConfig,
    /// Chunking configuration
    #[serde(default)]
    pub chunking: ChunkingConfig,
    /// OpenAI-compatible backend configuration
    #[serde(default)]
    pub openai: OpenAiConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file, falling back to defaults when the
    /// file does not exist.
    pub fn load(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content)
            .map_err(|e| Error::Config(format!("{}: {}", path.display(), e)))
    }
}

/// Server configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Host address
    pub host: String,
    /// Port number
    pub port: u16,
    /// Enable CORS
    pub enable_cors: bool,
    /// Maximum upload body size in bytes (default: 50MB)
    pub max_upload_size: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8888,
            enable_cors: true,
            max_upload_size: 50 * 1024 * 1024, // 50MB
        }
    }
}

/// Storage paths
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StorageConfig {
    /// Working directory holding uploaded PDFs
    pub documents_dir: PathBuf,
    /// Persisted index artifact (format owned by the index backend)
    pub index_path: PathBuf,
    /// Credential file
    pub credentials_path: PathBuf,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            documents_dir: PathBuf::from("documents"),
            index_path: PathBuf::from("index.json"),
            credentials_path: PathBuf::from("credentials.toml"),
        }
    }
}

/// Text chunking configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChunkingConfig {
    /// Chunk budget in model tokens, sized to the completion model's context
    /// window
    pub max_chunk_tokens: usize,
    /// Overlap between consecutive chunks in characters
    pub chunk_overlap: usize,
    /// Chunks shorter than this many characters are dropped
    pub min_chunk_size: usize,
}

impl ChunkingConfig {
    /// Character budget derived from the token budget.
    pub fn chunk_char_budget(&self) -> usize {
        self.max_chunk_tokens * CHARS_PER_TOKEN
    }
}

impl Default for ChunkingConfig {
    fn default() -> Self {
        Self {
            max_chunk_tokens: 4096,
            chunk_overlap: 200,
            min_chunk_size: 20,
        }
    }
}

/// OpenAI-compatible backend configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OpenAiConfig {
    /// API base URL
    pub base_url: String,
    /// Completion model name
    pub chat_model: String,
    /// Embedding model name
    pub embed_model: String,
    /// Temperature for answer generation
    pub temperature: f32,
    /// Request timeout in seconds
    pub timeout_secs: u64,
    /// Number of chunks retrieved per question
    pub top_k: usize,
    /// Throwaway question used to validate a candidate API key
    pub canary_question: String,
}

impl Default for OpenAiConfig {
    fn default() -> Self {
        Self {
            base_url: "https://api.openai.com/v1".to_string(),
            chat_model: "gpt-3.5-turbo".to_string(),
            embed_model: "text-embedding-ada-002".to_string(),
            temperature: 0.3, // Lower for more factual answers
            timeout_secs: 120,
            top_k: 5,
            canary_question: "ping".to_string(),
        }
    }
}
