//! Document ingestion: validate uploads and store them in the working
//! directory

pub mod chunker;
pub mod extractor;

pub use chunker::TextChunker;
pub use extractor::{PdfTextExtractor, TextExtractor};

use base64::Engine;
use std::path::{Path, PathBuf};

use crate::error::{Error, Result};

/// Marker separating a data-URL prefix from the base64 payload.
const DATA_URL_MARKER: &str = ";base64,";

/// Case-insensitive check for the `.pdf` extension.
pub fn is_pdf_filename(filename: &str) -> bool {
    Path::new(filename)
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("pdf"))
        .unwrap_or(false)
}

/// Validates and stores uploaded documents in the working directory.
pub struct DocumentIngestor {
    documents_dir: PathBuf,
}

impl DocumentIngestor {
    pub fn new(documents_dir: impl Into<PathBuf>) -> Self {
        Self {
            documents_dir: documents_dir.into(),
        }
    }

    /// The working directory holding uploaded PDFs.
    pub fn documents_dir(&self) -> &Path {
        &self.documents_dir
    }

    /// Whether at least one PDF has been stored.
    pub fn has_documents(&self) -> bool {
        match std::fs::read_dir(&self.documents_dir) {
            Ok(entries) => entries.filter_map(|e| e.ok()).any(|e| {
                e.file_name()
                    .to_str()
                    .map(is_pdf_filename)
                    .unwrap_or(false)
            }),
            Err(_) => false,
        }
    }

    /// Store one uploaded file. The filename must carry a `.pdf` extension
    /// (case-insensitive) and the payload must be non-empty. The write
    /// overwrites any previous upload with the same name.
    pub fn ingest(&self, filename: &str, raw_bytes: &[u8]) -> Result<()> {
        if !is_pdf_filename(filename) {
            return Err(Error::invalid_upload(
                filename,
                "only .pdf files are accepted",
            ));
        }
        if raw_bytes.is_empty() {
            return Err(Error::invalid_upload(filename, "empty file content"));
        }
        let name = sanitize_filename(filename)?;
        std::fs::create_dir_all(&self.documents_dir)?;
        std::fs::write(self.documents_dir.join(name), raw_bytes)?;
        Ok(())
    }

    /// Decode a data-URL upload payload (`data:application/pdf;base64,...`)
    /// and store it. Payloads without a prefix are treated as bare base64.
    pub fn ingest_encoded(&self, filename: &str, content: &str) -> Result<()> {
        let payload = match content.find(DATA_URL_MARKER) {
            Some(pos) => &content[pos + DATA_URL_MARKER.len()..],
            None => content,
        };
        let raw = base64::engine::general_purpose::STANDARD
            .decode(payload.trim())
            .map_err(|e| {
                Error::invalid_upload(filename, format!("invalid base64 content: {}", e))
            })?;
        self.ingest(filename, &raw)
    }
}

/// Strip any path components from an uploaded filename.
fn sanitize_filename(filename: &str) -> Result<String> {
    Path::new(filename)
        .file_name()
        .and_then(|n| n.to_str())
        .map(|n| n.to_string())
        .ok_or_else(|| Error::invalid_upload(filename, "unusable filename"))
}
