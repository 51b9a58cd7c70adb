//! Query answering over the index

use std::sync::Arc;

use crate::error::Result;
use crate::indexing::IndexBuilder;
use crate::providers::IndexBackend;

/// Fixed reply when retrieval yields nothing to answer from.
pub const NO_INFORMATION_ANSWER: &str =
    "I have no information to answer from. Please upload a PDF document first.";

/// Fixed reply when the answering service fails.
pub const QUERY_FAILED_ANSWER: &str =
    "Sorry, I could not reach the answering service. Please try again.";

/// Answers questions against the current index.
pub struct QueryResponder {
    backend: Arc<dyn IndexBackend>,
    builder: Arc<IndexBuilder>,
}

impl QueryResponder {
    pub fn new(backend: Arc<dyn IndexBackend>, builder: Arc<IndexBuilder>) -> Self {
        Self { backend, builder }
    }

    /// Answer a question. A missing index triggers a lazy rebuild; an empty
    /// answer from the backend is replaced with the fixed fallback message.
    /// One attempt per submission, no retries.
    pub async fn answer(&self, question: &str) -> Result<String> {
        let index = self.builder.ensure_index().await?;
        let raw = self.backend.query(&index, question).await?;

        let answer = raw.trim();
        if answer.is_empty() {
            return Ok(NO_INFORMATION_ANSWER.to_string());
        }
        Ok(answer.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::AppConfig;
    use crate::error::Error;
    use crate::ingestion::TextExtractor;
    use crate::providers::testing::StubBackend;
    use std::path::Path;

    struct PlainTextExtractor;

    impl TextExtractor for PlainTextExtractor {
        fn extract(&self, path: &Path) -> Result<String> {
            Ok(std::fs::read_to_string(path)?)
        }
    }

    fn responder_over(root: &Path, backend: Arc<StubBackend>) -> QueryResponder {
        let mut config = AppConfig::default();
        config.storage.documents_dir = root.join("documents");
        config.storage.index_path = root.join("index.json");

        let backend: Arc<dyn IndexBackend> = backend;
        let builder = Arc::new(IndexBuilder::new(
            &config,
            Arc::clone(&backend),
            Arc::new(PlainTextExtractor),
        ));
        QueryResponder::new(backend, builder)
    }

    #[tokio::test]
    async fn test_empty_index_yields_fallback_answer() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::new());
        let responder = responder_over(dir.path(), Arc::clone(&backend));

        let answer = responder.answer("What is the refund policy?").await.unwrap();
        assert_eq!(answer, NO_INFORMATION_ANSWER);
        assert_eq!(backend.query_count(), 1);
    }

    #[tokio::test]
    async fn test_answer_derives_from_stored_content() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("documents");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("features.pdf"), "dark mode is available in settings").unwrap();

        let backend = Arc::new(StubBackend::new());
        let responder = responder_over(dir.path(), Arc::clone(&backend));

        let answer = responder.answer("is there dark mode?").await.unwrap();
        assert!(answer.contains("dark mode is available in settings"));
        assert_eq!(
            backend.last_question.lock().as_deref(),
            Some("is there dark mode?")
        );
    }

    #[tokio::test]
    async fn test_backend_failure_propagates() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::rejecting());
        let responder = responder_over(dir.path(), Arc::clone(&backend));

        let result = responder.answer("anything").await;
        assert!(matches!(result, Err(Error::InvalidCredential(_))));
    }
}
