//! Shared application state
//!
//! One context object wires the credential store, ingestor, index builder,
//! and responder together; handlers receive it by shared ownership instead
//! of reaching for module-level globals.

use std::sync::Arc;

use crate::config::AppConfig;
use crate::credentials::CredentialStore;
use crate::indexing::IndexBuilder;
use crate::ingestion::{DocumentIngestor, PdfTextExtractor, TextExtractor};
use crate::providers::{IndexBackend, OpenAiBackend};
use crate::retrieval::QueryResponder;

/// Session phase derived from what exists on disk.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionPhase {
    /// No API key configured yet
    NoCredential,
    /// Key configured, nothing uploaded yet
    AwaitingFirstDocument,
    /// Documents stored and queryable
    Ready,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AppConfig,
    credentials: Arc<CredentialStore>,
    ingestor: DocumentIngestor,
    builder: Arc<IndexBuilder>,
    responder: QueryResponder,
}

impl AppState {
    /// Wire the production components: OpenAI backend, PDF extraction.
    pub fn new(config: AppConfig) -> Self {
        let credentials = Arc::new(CredentialStore::new(
            config.storage.credentials_path.clone(),
        ));
        let backend: Arc<dyn IndexBackend> =
            Arc::new(OpenAiBackend::new(&config.openai, Arc::clone(&credentials)));
        Self::assemble(config, credentials, backend, Arc::new(PdfTextExtractor))
    }

    /// Wire the state around explicit backend and extractor implementations
    /// (tests use stubs here).
    pub fn with_backend(
        config: AppConfig,
        backend: Arc<dyn IndexBackend>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let credentials = Arc::new(CredentialStore::new(
            config.storage.credentials_path.clone(),
        ));
        Self::assemble(config, credentials, backend, extractor)
    }

    fn assemble(
        config: AppConfig,
        credentials: Arc<CredentialStore>,
        backend: Arc<dyn IndexBackend>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        let ingestor = DocumentIngestor::new(config.storage.documents_dir.clone());
        let builder = Arc::new(IndexBuilder::new(&config, Arc::clone(&backend), extractor));
        let responder = QueryResponder::new(backend, Arc::clone(&builder));

        tracing::info!(
            "Application state initialized (documents: {}, index: {})",
            config.storage.documents_dir.display(),
            config.storage.index_path.display()
        );

        Self {
            inner: Arc::new(AppStateInner {
                config,
                credentials,
                ingestor,
                builder,
                responder,
            }),
        }
    }

    /// Get configuration
    pub fn config(&self) -> &AppConfig {
        &self.inner.config
    }

    /// Get the credential store
    pub fn credentials(&self) -> &Arc<CredentialStore> {
        &self.inner.credentials
    }

    /// Get the document ingestor
    pub fn ingestor(&self) -> &DocumentIngestor {
        &self.inner.ingestor
    }

    /// Get the index builder
    pub fn builder(&self) -> &Arc<IndexBuilder> {
        &self.inner.builder
    }

    /// Get the query responder
    pub fn responder(&self) -> &QueryResponder {
        &self.inner.responder
    }

    /// Where the session currently stands.
    pub fn phase(&self) -> SessionPhase {
        if !self.inner.credentials.has_credential() {
            return SessionPhase::NoCredential;
        }
        if self.inner.ingestor.has_documents() {
            SessionPhase::Ready
        } else {
            SessionPhase::AwaitingFirstDocument
        }
    }

    /// Whether the service is ready to take questions.
    pub fn is_ready(&self) -> bool {
        self.phase() != SessionPhase::NoCredential
    }
}


#[cfg(test)]
mod tests {
    use super::testing::test_state;
    use super::*;
    use crate::credentials::ApiKey;
    use crate::providers::testing::StubBackend;

    #[test]
    fn test_phase_transitions() {
        let dir = tempfile::tempdir().unwrap();
        let state = test_state(dir.path(), Arc::new(StubBackend::new()));

        assert_eq!(state.phase(), SessionPhase::NoCredential);
        assert!(!state.is_ready());

        state
            .credentials()
            .save_credential(&ApiKey::new("sk-test"))
            .unwrap();
        assert_eq!(state.phase(), SessionPhase::AwaitingFirstDocument);
        assert!(state.is_ready());

        state.ingestor().ingest("doc.pdf", b"content").unwrap();
        assert_eq!(state.phase(), SessionPhase::Ready);
    }
}
