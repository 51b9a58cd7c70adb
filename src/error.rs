//! Error types for the chat service

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use thiserror::Error;

/// Result type alias for chat service operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Chat service errors
#[derive(Debug, Error)]
pub enum Error {
    /// No API key has been configured yet
    #[error("no API key configured")]
    MissingCredential,

    /// The API key was rejected by the completion service
    #[error("API key rejected: {0}")]
    InvalidCredential(String),

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Rejected upload (extension, empty payload, undecodable content)
    #[error("Invalid upload '{filename}': {message}")]
    InvalidUpload { filename: String, message: String },

    /// Text extraction failed for one file; the file is skipped
    #[error("Failed to extract text from '{filename}': {message}")]
    Extraction { filename: String, message: String },

    /// Index rebuild failed (fatal to that rebuild attempt)
    #[error("Index build failed: {0}")]
    IndexBuild(String),

    /// Query against the index failed
    #[error("Query failed: {0}")]
    Query(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// JSON error
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// HTTP request error
    #[error("HTTP request error: {0}")]
    Http(#[from] reqwest::Error),
}

impl Error {
    /// Create an invalid upload error
    pub fn invalid_upload(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidUpload {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an extraction error
    pub fn extraction(filename: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Extraction {
            filename: filename.into(),
            message: message.into(),
        }
    }

    /// Create an index build error
    pub fn index_build(message: impl Into<String>) -> Self {
        Self::IndexBuild(message.into())
    }

    /// Create a query error
    pub fn query(message: impl Into<String>) -> Self {
        Self::Query(message.into())
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let (status, error_type, message) = match &self {
            Error::MissingCredential => (
                StatusCode::UNAUTHORIZED,
                "missing_credential",
                self.to_string(),
            ),
            Error::InvalidCredential(msg) => {
                (StatusCode::UNAUTHORIZED, "invalid_credential", msg.clone())
            }
            Error::Config(msg) => (StatusCode::BAD_REQUEST, "config_error", msg.clone()),
            Error::InvalidUpload { filename, message } => (
                StatusCode::BAD_REQUEST,
                "invalid_upload",
                format!("'{}': {}", filename, message),
            ),
            Error::Extraction { filename, message } => (
                StatusCode::UNPROCESSABLE_ENTITY,
                "extraction_error",
                format!("'{}': {}", filename, message),
            ),
            Error::IndexBuild(msg) => {
                (StatusCode::INTERNAL_SERVER_ERROR, "index_build_error", msg.clone())
            }
            Error::Query(msg) => (StatusCode::SERVICE_UNAVAILABLE, "query_error", msg.clone()),
            Error::Io(err) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "io_error",
                err.to_string(),
            ),
            Error::Json(err) => (StatusCode::BAD_REQUEST, "json_error", err.to_string()),
            Error::Http(err) => (StatusCode::BAD_GATEWAY, "http_error", err.to_string()),
        };

        let body = Json(json!({
            "error": {
                "type": error_type,
                "message": message,
            }
        }));

        (status, body).into_response()
    }
}
