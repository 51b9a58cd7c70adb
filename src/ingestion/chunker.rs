//! Text chunking bounded by the model token budget

use unicode_segmentation::UnicodeSegmentation;

use crate::config::ChunkingConfig;

/// Splits document text into chunks that fit the completion model's context
/// window, preferring sentence boundaries and carrying a small overlap
/// between neighbours.
pub struct TextChunker {
    /// Character budget per chunk (token budget x approximate chars/token)
    max_chars: usize,
    /// Overlap between chunks in characters
    overlap: usize,
    /// Minimum chunk size
    min_size: usize,
}

impl TextChunker {
    pub fn new(config: &ChunkingConfig) -> Self {
        Self {
            max_chars: config.chunk_char_budget().max(1),
            overlap: config.chunk_overlap,
            min_size: config.min_chunk_size,
        }
    }

    /// Split text into chunks no larger than the character budget.
    pub fn chunk_text(&self, text: &str) -> Vec<String> {
        let text = text.trim();
        if text.is_empty() {
            return Vec::new();
        }

        let mut chunks = Vec::new();
        let mut current = String::new();

        for sentence in text.unicode_sentences() {
            // A single oversized sentence is split hard at the budget.
            if sentence.len() > self.max_chars {
                if current.trim().len() >= self.min_size {
                    chunks.push(current.trim().to_string());
                }
                let mut pieces = hard_split(sentence, self.max_chars);
                // The last piece becomes the running chunk so overlap
                // continues across the boundary.
                current = pieces.pop().unwrap_or_default();
                chunks.extend(pieces);
                continue;
            }

            if !current.is_empty() && current.len() + sentence.len() > self.max_chars {
                if current.trim().len() >= self.min_size {
                    chunks.push(current.trim().to_string());
                }
                current = tail(&current, self.overlap);
                if current.len() + sentence.len() > self.max_chars {
                    current.clear();
                }
            }
            current.push_str(sentence);
        }

        if current.trim().len() >= self.min_size {
            chunks.push(current.trim().to_string());
        }

        // A document shorter than the minimum still indexes as one chunk.
        if chunks.is_empty() {
            chunks.push(text.to_string());
        }
        chunks
    }
}

/// Split text at the budget on char boundaries, ignoring sentence structure.
fn hard_split(text: &str, max: usize) -> Vec<String> {
    let mut pieces = Vec::new();
    let mut current = String::new();
    for ch in text.chars() {
        if !current.is_empty() && current.len() + ch.len_utf8() > max {
            pieces.push(std::mem::take(&mut current));
        }
        current.push(ch);
    }
    if !current.is_empty() {
        pieces.push(current);
    }
    pieces
}

/// Last `len` bytes of `text`, aligned down to a char boundary.
fn tail(text: &str, len: usize) -> String {
    if text.len() <= len {
        return text.to_string();
    }
    let mut start = text.len() - len;
    while !text.is_char_boundary(start) {
        start += 1;
    }
    text[start..].to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chunker(max_chunk_tokens: usize, chunk_overlap: usize, min_chunk_size: usize) -> TextChunker {
        TextChunker::new(&ChunkingConfig {
            max_chunk_tokens,
            chunk_overlap,
            min_chunk_size,
        })
    }

    #[test]
    fn test_short_text_is_one_chunk() {
        let chunker = chunker(4096, 200, 20);
        let chunks = chunker.chunk_text("A short paragraph that easily fits one chunk.");
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_tiny_text_still_indexes() {
        let chunker = chunker(4096, 200, 20);
        let chunks = chunker.chunk_text("dark mode");
        assert_eq!(chunks, vec!["dark mode".to_string()]);
    }

    #[test]
    fn test_empty_text_yields_no_chunks() {
        let chunker = chunker(4096, 200, 20);
        assert!(chunker.chunk_text("   \n ").is_empty());
    }

    #[test]
    fn test_chunks_respect_the_budget() {
        // Token budget of 25 -> 100-char budget
        let chunker = chunker(25, 10, 5);
        let text = "This is sentence one. This is sentence two. This is sentence three. \
                    This is sentence four. This is sentence five. This is sentence six."
            .repeat(3);
        let chunks = chunker.chunk_text(&text);

        assert!(chunks.len() > 1);
        for chunk in &chunks {
            assert!(chunk.len() <= 100, "chunk exceeded budget: {}", chunk.len());
        }
    }

    #[test]
    fn test_oversized_sentence_is_hard_split() {
        let chunker = chunker(10, 0, 5); // 40-char budget
        let text = "x".repeat(150);
        let chunks = chunker.chunk_text(&text);

        assert!(chunks.len() >= 3);
        for chunk in &chunks {
            assert!(chunk.len() <= 40);
        }
        let total: usize = chunks.iter().map(|c| c.len()).sum();
        assert_eq!(total, 150);
    }

    #[test]
    fn test_hard_split_respects_char_boundaries() {
        // Multibyte characters must not be cut mid-codepoint
        let pieces = hard_split(&"é".repeat(30), 7);
        for piece in &pieces {
            assert!(piece.len() <= 7);
            assert!(piece.chars().all(|c| c == 'é'));
        }
    }
}
