//! Persisted vector index artifact
//!
//! The serialized form belongs to this module; callers treat the artifact
//! file as opaque and only pass its path around.

use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::error::Result;

/// A chunk of document text handed to the backend for indexing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SourceText {
    /// Filename the chunk came from
    pub filename: String,
    /// Chunk text
    pub text: String,
}

/// One indexed chunk with its embedding vector.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IndexEntry {
    pub filename: String,
    pub text: String,
    pub embedding: Vec<f32>,
}

/// In-memory handle to the vector index over all current documents.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct VectorIndex {
    entries: Vec<IndexEntry>,
}

impl VectorIndex {
    pub fn new(entries: Vec<IndexEntry>) -> Self {
        Self { entries }
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Persist the artifact, overwriting any previous one at the same path.
    pub fn save(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string(self)?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Load a previously persisted artifact.
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&content)?)
    }

    /// Rank entries by cosine similarity to the query embedding and keep the
    /// best `k`.
    pub fn top_k(&self, query_embedding: &[f32], k: usize) -> Vec<&IndexEntry> {
        let mut scored: Vec<(&IndexEntry, f32)> = self
            .entries
            .iter()
            .map(|e| (e, cosine_similarity(query_embedding, &e.embedding)))
            .collect();
        scored.sort_by(|a, b| b.1.partial_cmp(&a.1).unwrap_or(std::cmp::Ordering::Equal));
        scored.truncate(k);
        scored.into_iter().map(|(e, _)| e).collect()
    }
}

/// Cosine similarity between two vectors.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f32 {
    if a.len() != b.len() || a.is_empty() {
        return 0.0;
    }
    let dot: f32 = a.iter().zip(b.iter()).map(|(x, y)| x * y).sum();
    let norm_a: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
    let norm_b: f32 = b.iter().map(|x| x * x).sum::<f32>().sqrt();
    if norm_a == 0.0 || norm_b == 0.0 {
        return 0.0;
    }
    dot / (norm_a * norm_b)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(text: &str, embedding: Vec<f32>) -> IndexEntry {
        IndexEntry {
            filename: "doc.pdf".to_string(),
            text: text.to_string(),
            embedding,
        }
    }

    #[test]
    fn test_cosine_similarity() {
        assert!((cosine_similarity(&[1.0, 0.0], &[1.0, 0.0]) - 1.0).abs() < 1e-6);
        assert!(cosine_similarity(&[1.0, 0.0], &[0.0, 1.0]).abs() < 1e-6);
        assert_eq!(cosine_similarity(&[1.0], &[1.0, 2.0]), 0.0);
        assert_eq!(cosine_similarity(&[], &[]), 0.0);
    }

    #[test]
    fn test_top_k_ranks_by_similarity() {
        let index = VectorIndex::new(vec![
            entry("orthogonal", vec![0.0, 1.0]),
            entry("aligned", vec![1.0, 0.0]),
            entry("diagonal", vec![1.0, 1.0]),
        ]);

        let top = index.top_k(&[1.0, 0.0], 2);
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].text, "aligned");
        assert_eq!(top[1].text, "diagonal");
    }

    #[test]
    fn test_save_and_load_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        let index = VectorIndex::new(vec![entry("some text", vec![0.1, 0.2, 0.3])]);
        index.save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert_eq!(loaded.len(), 1);
        assert_eq!(loaded.entries()[0].text, "some text");
        assert_eq!(loaded.entries()[0].embedding, vec![0.1, 0.2, 0.3]);
    }

    #[test]
    fn test_save_overwrites_previous_artifact() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("index.json");

        VectorIndex::new(vec![entry("old", vec![1.0])]).save(&path).unwrap();
        VectorIndex::default().save(&path).unwrap();

        let loaded = VectorIndex::load(&path).unwrap();
        assert!(loaded.is_empty());
    }
}
