//! paperchat: chat over uploaded PDF documents
//!
//! A single-process HTTP service that stores uploaded PDFs, builds a vector
//! index over their extracted text, and answers questions by retrieving
//! relevant passages and forwarding them to an OpenAI-compatible completion
//! service. Embedding computation, similarity ranking, and answer synthesis
//! live behind the [`providers::IndexBackend`] capability so the rest of the
//! crate can run against a stub.

pub mod config;
pub mod credentials;
pub mod error;
pub mod indexing;
pub mod ingestion;
pub mod providers;
pub mod retrieval;
pub mod server;
pub mod types;

pub use config::AppConfig;
pub use error::{Error, Result};
pub use types::chat::{ChatMessage, ChatRole};
