//! Index backend abstraction
//!
//! The vector index and the language model behind it are external services.
//! Everything the rest of the crate needs from them fits in two operations:
//! building an index over document text and answering a question against it.

pub mod openai;
pub mod vector_index;

pub use openai::OpenAiBackend;
pub use vector_index::{IndexEntry, SourceText, VectorIndex};

use async_trait::async_trait;

use crate::error::Result;

/// Capability interface over the external embedding/indexing/LLM service.
///
/// Implementations:
/// - `OpenAiBackend`: embeddings + chat completions over an OpenAI-compatible
///   HTTP API
#[async_trait]
pub trait IndexBackend: Send + Sync {
    /// Build a vector index over the given document chunks.
    async fn build(&self, chunks: &[SourceText]) -> Result<VectorIndex>;

    /// Answer a question using embedding-similarity retrieval over the index.
    ///
    /// Implementations must contact the service even when the index is empty,
    /// so that a call made with a candidate credential doubles as a canary
    /// check; an empty index yields an empty answer.
    async fn query(&self, index: &VectorIndex, question: &str) -> Result<String>;

    /// Provider name for logging.
    fn name(&self) -> &str;
}
