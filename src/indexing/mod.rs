//! Index construction over the working directory
//!
//! The builder walks the uploaded documents, extracts their text, chunks it
//! to the token budget, and hands the chunks to the backend. The resulting
//! artifact is persisted to a fixed path (overwriting any prior artifact)
//! and kept in memory for queries.

use parking_lot::RwLock;
use std::path::PathBuf;
use std::sync::Arc;

use crate::config::AppConfig;
use crate::error::Result;
use crate::ingestion::{is_pdf_filename, TextChunker, TextExtractor};
use crate::providers::{IndexBackend, SourceText, VectorIndex};

pub struct IndexBuilder {
    backend: Arc<dyn IndexBackend>,
    extractor: Arc<dyn TextExtractor>,
    chunker: TextChunker,
    documents_dir: PathBuf,
    index_path: PathBuf,
    /// In-memory handle to the most recent index
    current: RwLock<Option<Arc<VectorIndex>>>,
}

impl IndexBuilder {
    pub fn new(
        config: &AppConfig,
        backend: Arc<dyn IndexBackend>,
        extractor: Arc<dyn TextExtractor>,
    ) -> Self {
        Self {
            backend,
            extractor,
            chunker: TextChunker::new(&config.chunking),
            documents_dir: config.storage.documents_dir.clone(),
            index_path: config.storage.index_path.clone(),
            current: RwLock::new(None),
        }
    }

    /// Whether an index is available in memory or on disk.
    pub fn artifact_exists(&self) -> bool {
        self.current.read().is_some() || self.index_path.exists()
    }

    /// Rebuild the index over every PDF currently in the working directory.
    /// Files that fail extraction are skipped with a warning; the rest of the
    /// batch still indexes.
    pub async fn rebuild(&self) -> Result<Arc<VectorIndex>> {
        let chunks = self.collect_chunks()?;
        tracing::info!(
            "Building index over {} chunks from {}",
            chunks.len(),
            self.documents_dir.display()
        );

        let index = self.backend.build(&chunks).await?;
        index.save(&self.index_path)?;

        let index = Arc::new(index);
        *self.current.write() = Some(Arc::clone(&index));
        tracing::info!(
            "Index rebuilt: {} entries persisted to {}",
            index.len(),
            self.index_path.display()
        );
        Ok(index)
    }

    /// Rebuild and then validate the active credential with a canary query.
    /// The credential only counts as usable when the canary succeeds.
    pub async fn rebuild_validated(&self, canary_question: &str) -> Result<Arc<VectorIndex>> {
        let index = self.rebuild().await?;
        self.backend.query(&index, canary_question).await?;
        Ok(index)
    }

    /// The current index: the in-memory handle, else the persisted artifact,
    /// else a fresh rebuild (lazy policy for a missing index).
    pub async fn ensure_index(&self) -> Result<Arc<VectorIndex>> {
        if let Some(index) = self.current.read().clone() {
            return Ok(index);
        }

        if self.index_path.exists() {
            match VectorIndex::load(&self.index_path) {
                Ok(index) => {
                    let index = Arc::new(index);
                    *self.current.write() = Some(Arc::clone(&index));
                    return Ok(index);
                }
                Err(e) => {
                    tracing::warn!("Failed to load index artifact, rebuilding: {}", e);
                }
            }
        }

        self.rebuild().await
    }

    /// Extract and chunk every PDF in the working directory.
    fn collect_chunks(&self) -> Result<Vec<SourceText>> {
        let mut chunks = Vec::new();
        if !self.documents_dir.exists() {
            return Ok(chunks);
        }

        let mut paths: Vec<PathBuf> = std::fs::read_dir(&self.documents_dir)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .filter(|path| {
                path.file_name()
                    .and_then(|n| n.to_str())
                    .map(is_pdf_filename)
                    .unwrap_or(false)
            })
            .collect();
        paths.sort();

        for path in paths {
            let filename = path
                .file_name()
                .and_then(|n| n.to_str())
                .unwrap_or_default()
                .to_string();

            match self.extractor.extract(&path) {
                Ok(text) => {
                    for piece in self.chunker.chunk_text(&text) {
                        chunks.push(SourceText {
                            filename: filename.clone(),
                            text: piece,
                        });
                    }
                }
                Err(e) => {
                    // Unreadable files are skipped; the rest of the batch
                    // still indexes.
                    tracing::warn!("Skipping '{}': {}", filename, e);
                }
            }
        }

        Ok(chunks)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use crate::providers::testing::StubBackend;
    use std::path::Path;

    /// Reads stored files as plain UTF-8, standing in for the PDF backend.
    struct PlainTextExtractor;

    impl TextExtractor for PlainTextExtractor {
        fn extract(&self, path: &Path) -> Result<String> {
            Ok(std::fs::read_to_string(path)?)
        }
    }

    /// Fails for every file, exercising the skip path.
    struct FailingExtractor;

    impl TextExtractor for FailingExtractor {
        fn extract(&self, path: &Path) -> Result<String> {
            Err(Error::extraction(
                path.display().to_string(),
                "unreadable",
            ))
        }
    }

    fn test_config(root: &Path) -> AppConfig {
        let mut config = AppConfig::default();
        config.storage.documents_dir = root.join("documents");
        config.storage.index_path = root.join("index.json");
        config.storage.credentials_path = root.join("credentials.toml");
        config
    }

    fn builder_with(
        root: &Path,
        backend: Arc<StubBackend>,
        extractor: Arc<dyn TextExtractor>,
    ) -> IndexBuilder {
        IndexBuilder::new(&test_config(root), backend, extractor)
    }

    #[tokio::test]
    async fn test_rebuild_indexes_stored_documents() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("documents");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("a.pdf"), "alpha contents").unwrap();
        std::fs::write(docs.join("b.pdf"), "beta contents").unwrap();
        std::fs::write(docs.join("ignored.txt"), "not a pdf").unwrap();

        let backend = Arc::new(StubBackend::new());
        let builder = builder_with(dir.path(), Arc::clone(&backend), Arc::new(PlainTextExtractor));

        let index = builder.rebuild().await.unwrap();
        assert_eq!(backend.build_count(), 1);
        assert_eq!(index.len(), 2);

        let texts: Vec<&str> = index.entries().iter().map(|e| e.text.as_str()).collect();
        assert!(texts.contains(&"alpha contents"));
        assert!(texts.contains(&"beta contents"));

        // The artifact landed at the fixed path
        assert!(dir.path().join("index.json").exists());
        assert!(builder.artifact_exists());
    }

    #[tokio::test]
    async fn test_rebuild_with_no_documents_yields_empty_index() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::new());
        let builder = builder_with(dir.path(), Arc::clone(&backend), Arc::new(PlainTextExtractor));

        let index = builder.rebuild().await.unwrap();
        assert!(index.is_empty());
        assert!(dir.path().join("index.json").exists());
    }

    #[tokio::test]
    async fn test_unreadable_files_are_skipped() {
        let dir = tempfile::tempdir().unwrap();
        let docs = dir.path().join("documents");
        std::fs::create_dir_all(&docs).unwrap();
        std::fs::write(docs.join("broken.pdf"), "whatever").unwrap();

        let backend = Arc::new(StubBackend::new());
        let builder = builder_with(dir.path(), Arc::clone(&backend), Arc::new(FailingExtractor));

        let index = builder.rebuild().await.unwrap();
        assert!(index.is_empty());
        assert_eq!(backend.build_count(), 1);
    }

    #[tokio::test]
    async fn test_ensure_index_loads_persisted_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::new());

        // A previous process run left an artifact behind
        {
            let builder =
                builder_with(dir.path(), Arc::clone(&backend), Arc::new(PlainTextExtractor));
            let docs = dir.path().join("documents");
            std::fs::create_dir_all(&docs).unwrap();
            std::fs::write(docs.join("a.pdf"), "persisted contents").unwrap();
            builder.rebuild().await.unwrap();
        }

        let fresh_backend = Arc::new(StubBackend::new());
        let builder = builder_with(
            dir.path(),
            Arc::clone(&fresh_backend),
            Arc::new(PlainTextExtractor),
        );

        let index = builder.ensure_index().await.unwrap();
        assert_eq!(index.len(), 1);
        // Loaded from disk, not rebuilt
        assert_eq!(fresh_backend.build_count(), 0);
    }

    #[tokio::test]
    async fn test_ensure_index_rebuilds_lazily_when_nothing_persisted() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::new());
        let builder = builder_with(dir.path(), Arc::clone(&backend), Arc::new(PlainTextExtractor));

        assert!(!builder.artifact_exists());
        let index = builder.ensure_index().await.unwrap();
        assert!(index.is_empty());
        assert_eq!(backend.build_count(), 1);
    }

    #[tokio::test]
    async fn test_rebuild_validated_fails_when_canary_fails() {
        let dir = tempfile::tempdir().unwrap();
        let backend = Arc::new(StubBackend::rejecting());
        let builder = builder_with(dir.path(), Arc::clone(&backend), Arc::new(PlainTextExtractor));

        let result = builder.rebuild_validated("ping").await;
        assert!(matches!(result, Err(Error::InvalidCredential(_))));
        assert_eq!(backend.query_count(), 1);
    }
}
