//! PDF text extraction

use std::path::Path;
use std::sync::mpsc::{self, RecvTimeoutError};
use std::thread;
use std::time::Duration;

use crate::error::{Error, Result};

/// Hard ceiling for a single extraction. pdf-extract can spin on malformed
/// font tables, so extraction runs on its own thread and is abandoned when
/// the deadline passes.
const EXTRACTION_TIMEOUT: Duration = Duration::from_secs(60);

/// Extraction backend: turns a stored document into plain text.
pub trait TextExtractor: Send + Sync {
    fn extract(&self, path: &Path) -> Result<String>;
}

/// Whole-document text extraction via pdf-extract.
pub struct PdfTextExtractor;

impl TextExtractor for PdfTextExtractor {
    fn extract(&self, path: &Path) -> Result<String> {
        let filename = path
            .file_name()
            .and_then(|n| n.to_str())
            .unwrap_or("<unknown>")
            .to_string();
        let data = std::fs::read(path)?;
        extract_pdf_text_from_bytes(&filename, &data)
    }
}

/// Extract text from in-memory PDF bytes, guarded by a worker thread so a
/// pathological file cannot hang the caller.
pub fn extract_pdf_text_from_bytes(filename: &str, data: &[u8]) -> Result<String> {
    let data = data.to_vec();
    let (tx, rx) = mpsc::channel();

    thread::spawn(move || {
        let result = pdf_extract::extract_text_from_mem(&data);
        let _ = tx.send(result);
    });

    match rx.recv_timeout(EXTRACTION_TIMEOUT) {
        Ok(Ok(text)) => {
            let text = normalize_text(&text);
            if text.is_empty() {
                Err(Error::extraction(filename, "no extractable text"))
            } else {
                Ok(text)
            }
        }
        Ok(Err(e)) => Err(Error::extraction(filename, e.to_string())),
        Err(RecvTimeoutError::Timeout) => Err(Error::extraction(
            filename,
            format!(
                "extraction timed out after {}s",
                EXTRACTION_TIMEOUT.as_secs()
            ),
        )),
        Err(RecvTimeoutError::Disconnected) => {
            Err(Error::extraction(filename, "extraction worker crashed"))
        }
    }
}

/// Collapse the whitespace noise PDF layout leaves behind: trailing spaces on
/// each line and runs of more than one blank line.
fn normalize_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut blank_run = 0usize;

    for line in text.lines() {
        let line = line.trim_end();
        if line.is_empty() {
            blank_run += 1;
            if blank_run > 1 {
                continue;
            }
        } else {
            blank_run = 0;
        }
        out.push_str(line);
        out.push('\n');
    }

    out.trim().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_collapses_blank_runs() {
        let raw = "first line   \n\n\n\nsecond line\t\n";
        assert_eq!(normalize_text(raw), "first line\n\nsecond line");
    }

    #[test]
    fn test_normalize_empty_input() {
        assert_eq!(normalize_text("   \n \n"), "");
    }

    #[test]
    fn test_garbage_bytes_fail_with_extraction_error() {
        let result = extract_pdf_text_from_bytes("garbage.pdf", b"this is not a pdf");
        match result {
            Err(Error::Extraction { filename, .. }) => assert_eq!(filename, "garbage.pdf"),
            other => panic!("expected extraction error, got {:?}", other),
        }
    }
}
