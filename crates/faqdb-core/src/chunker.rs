//! Fixed-size, overlapping character windows.
//!
//! Offsets count Unicode scalar values, so a window never splits a code point.

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::types::{chunk_id, DocumentChunk};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ChunkingConfig {
    pub chunk_size: usize,
    pub overlap: usize,
}

impl Default for ChunkingConfig {
    fn default() -> Self { Self { chunk_size: 400, overlap: 50 } }
}

impl ChunkingConfig {
    pub fn validate(&self) -> Result<()> {
        if self.chunk_size == 0 {
            return Err(Error::invalid_config("chunk_size must be greater than 0"));
        }
        if self.overlap >= self.chunk_size {
            return Err(Error::invalid_config(format!(
                "overlap ({}) must be smaller than chunk_size ({})",
                self.overlap, self.chunk_size
            )));
        }
        Ok(())
    }

    fn step(&self) -> usize { self.chunk_size - self.overlap }
}

#[derive(Debug, Clone, Copy)]
pub struct TextChunker {
    config: ChunkingConfig,
}

impl TextChunker {
    pub fn new(config: ChunkingConfig) -> Result<Self> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Split `text` into windows of `chunk_size` characters, each starting
    /// `chunk_size - overlap` characters after the previous one.
    ///
    /// Stops at the first window that reaches the end of the text, so the
    /// last chunk may be shorter and is never wholly contained in its
    /// predecessor. Empty text yields no chunks.
    pub fn chunk(&self, text: &str) -> Vec<String> {
        let bounds: Vec<usize> = text.char_indices().map(|(i, _)| i).chain(std::iter::once(text.len())).collect();
        let len = bounds.len() - 1;
        let mut chunks = Vec::new();
        let mut start = 0usize;
        while start < len {
            let end = (start + self.config.chunk_size).min(len);
            chunks.push(text[bounds[start]..bounds[end]].to_string());
            // A further window would lie inside this one; the count is
            // max(1, ceil((len - overlap) / step)), not one per step start.
            if end == len { break; }
            start += self.config.step();
        }
        chunks
    }

    /// Chunk a whole document, assigning stable ids derived from `source_id`.
    pub fn chunk_document(&self, source_id: &str, text: &str) -> Vec<DocumentChunk> {
        let pieces = self.chunk(text);
        let total_chunks = pieces.len();
        pieces
            .into_iter()
            .enumerate()
            .map(|(chunk_index, text)| DocumentChunk {
                id: chunk_id(source_id, chunk_index),
                source_id: source_id.to_string(),
                text,
                chunk_index,
                total_chunks,
            })
            .collect()
    }
}

/// One-shot form of [`TextChunker::chunk`].
pub fn chunk_text(text: &str, chunk_size: usize, overlap: usize) -> Result<Vec<String>> {
    Ok(TextChunker::new(ChunkingConfig { chunk_size, overlap })?.chunk(text))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn reconstruct(chunks: &[String], overlap: usize) -> String {
        let mut out = String::new();
        for (i, c) in chunks.iter().enumerate() {
            if i == 0 { out.push_str(c); } else { out.extend(c.chars().skip(overlap)); }
        }
        out
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 400, 50).unwrap().is_empty());
    }

    #[test]
    fn five_hundred_chars_make_two_chunks() {
        let text = "A".repeat(500);
        let chunks = chunk_text(&text, 400, 50).unwrap();
        assert_eq!(chunks.len(), 2);
        assert_eq!(chunks[0], text[0..400]);
        assert_eq!(chunks[1], text[350..500]);
    }

    #[test]
    fn rejects_bad_configuration() {
        assert!(matches!(chunk_text("abc", 0, 0), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(chunk_text("abc", 10, 10), Err(Error::InvalidConfiguration(_))));
        assert!(matches!(chunk_text("abc", 10, 25), Err(Error::InvalidConfiguration(_))));
    }

    #[test]
    fn zero_overlap_tiles_the_text() {
        let chunks = chunk_text("abcdefgh", 3, 0).unwrap();
        assert_eq!(chunks, vec!["abc", "def", "gh"]);
    }

    #[test]
    fn overlap_removed_reconstructs_text() {
        let texts = [
            "a".to_string(),
            "short".to_string(),
            "The exam registration deadline is two weeks before the session.".repeat(9),
            "Prüfungsanmeldung endet früh. 试验规则适用于所有学生。".repeat(13),
            "x".repeat(400),
            "y".repeat(401),
        ];
        let configs = [(400, 50), (10, 3), (7, 0), (5, 4), (1, 0)];
        for text in &texts {
            for &(size, overlap) in &configs {
                let chunks = chunk_text(text, size, overlap).unwrap();
                assert_eq!(&reconstruct(&chunks, overlap), text, "size={size} overlap={overlap}");
                assert!(chunks.iter().all(|c| !c.is_empty() && c.chars().count() <= size));
            }
        }
    }

    #[test]
    fn window_reaching_the_end_is_the_last() {
        let text = "q".repeat(400);
        assert_eq!(chunk_text(&text, 400, 50).unwrap(), [text.clone()]);
        assert_eq!(chunk_text("abc", 400, 50).unwrap(), ["abc"]);
    }

    #[test]
    fn chunk_count_matches_window_formula() {
        for len in 1..60usize {
            let text = "z".repeat(len);
            let chunks = chunk_text(&text, 10, 4).unwrap();
            let expected = len.saturating_sub(4).div_ceil(6).max(1);
            assert_eq!(chunks.len(), expected, "len={len}");
        }
    }

    #[test]
    fn is_deterministic() {
        let text = "Students must present a valid ID card. ".repeat(30);
        assert_eq!(chunk_text(&text, 400, 50).unwrap(), chunk_text(&text, 400, 50).unwrap());
    }

    #[test]
    fn document_chunks_carry_ids_and_positions() {
        let chunker = TextChunker::new(ChunkingConfig { chunk_size: 4, overlap: 1 }).unwrap();
        let chunks = chunker.chunk_document("rules.txt", "abcdefghij");
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[0].id, "rules.txt:0");
        assert_eq!(chunks[2].id, "rules.txt:2");
        assert!(chunks.iter().all(|c| c.total_chunks == 3 && c.source_id == "rules.txt"));
        assert_eq!(chunks[1].metadata().get("source").map(String::as_str), Some("rules.txt"));
    }
}
