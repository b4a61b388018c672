//! Overlapping character splitter.
//!
//! Lengths are counted in `char`s. Cuts land after the strongest boundary found in the
//! allowed window, falling back to a hard cut at the size limit.

use super::Chunk;
use crate::config::ChunkingSettings;
use crate::error::{Result, VidchatError};
use crate::transcript::VideoDocument;

/// Boundary classes, strongest first. A cut is placed right after the separator.
const BOUNDARIES: &[&[&str]] = &[
    &["\n\n"],
    &["\n"],
    &[". ", "! ", "? "],
    &[" ", "\t"],
];

/// Splits text into chunks of at most `chunk_size` chars where each chunk after the first
/// repeats the last `chunk_overlap` chars of its predecessor.
#[derive(Debug, Clone, Copy)]
pub struct TextSplitter {
    chunk_size: usize,
    chunk_overlap: usize,
}

impl TextSplitter {
    /// Create a splitter. Fails unless `0 <= chunk_overlap < chunk_size`.
    pub fn new(chunk_size: usize, chunk_overlap: usize) -> Result<Self> {
        if chunk_size == 0 {
            return Err(VidchatError::Config(
                "chunk size must be greater than zero".to_string(),
            ));
        }
        if chunk_overlap >= chunk_size {
            return Err(VidchatError::Config(format!(
                "chunk overlap ({}) must be smaller than chunk size ({})",
                chunk_overlap, chunk_size
            )));
        }
        Ok(Self {
            chunk_size,
            chunk_overlap,
        })
    }

    /// Create a splitter from configuration.
    pub fn from_settings(settings: &ChunkingSettings) -> Result<Self> {
        Self::new(settings.chunk_size, settings.chunk_overlap)
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn chunk_overlap(&self) -> usize {
        self.chunk_overlap
    }

    /// Lazily split `text` into overlapping slices.
    pub fn split<'a>(&self, text: &'a str) -> Splits<'a> {
        let mut offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        offsets.push(text.len());

        Splits {
            text,
            offsets,
            start: 0,
            chunk_size: self.chunk_size,
            chunk_overlap: self.chunk_overlap,
            done: text.is_empty(),
        }
    }

    /// Split a transcript and tag every piece with its owning video.
    pub fn split_document(&self, doc: &VideoDocument) -> Vec<Chunk> {
        self.split(&doc.transcript)
            .enumerate()
            .map(|(order, content)| Chunk::new(content.to_string(), doc.video_id.clone(), order))
            .collect()
    }
}

/// Iterator returned by [`TextSplitter::split`].
pub struct Splits<'a> {
    text: &'a str,
    /// Byte offset of every char, plus `text.len()` as a sentinel.
    offsets: Vec<usize>,
    /// Char index where the next chunk starts.
    start: usize,
    chunk_size: usize,
    chunk_overlap: usize,
    done: bool,
}

impl<'a> Splits<'a> {
    fn char_len(&self) -> usize {
        self.offsets.len() - 1
    }

    fn slice(&self, from: usize, to: usize) -> &'a str {
        let text: &'a str = self.text;
        &text[self.offsets[from]..self.offsets[to]]
    }

    /// Char index at which to end the chunk starting at `self.start`.
    ///
    /// The cut must leave the next chunk starting strictly after `self.start`, so it lies in
    /// `(start + overlap, start + chunk_size]`.
    fn find_cut(&self, limit: usize) -> usize {
        let lowest = self.start + self.chunk_overlap + 1;
        let window_start = self.offsets[self.start];
        let window = self.slice(self.start, limit);

        for class in BOUNDARIES {
            let best = class
                .iter()
                .filter_map(|sep| window.rfind(sep).map(|idx| window_start + idx + sep.len()))
                .max();

            if let Some(end_byte) = best {
                // Separators are ASCII, so the end always falls on a char boundary.
                if let Ok(end) = self.offsets.binary_search(&end_byte) {
                    if end >= lowest {
                        return end;
                    }
                }
            }
        }

        limit
    }
}

impl<'a> Iterator for Splits<'a> {
    type Item = &'a str;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }

        let len = self.char_len();
        let limit = self.start + self.chunk_size;

        if limit >= len {
            self.done = true;
            return Some(self.slice(self.start, len));
        }

        let end = self.find_cut(limit);
        let piece = self.slice(self.start, end);
        self.start = end - self.chunk_overlap;
        Some(piece)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Rebuild the source text by dropping the overlap prefix of every chunk but the first.
    fn reassemble(chunks: &[&str], overlap: usize) -> String {
        let mut out = String::new();
        for (i, chunk) in chunks.iter().enumerate() {
            if i == 0 {
                out.push_str(chunk);
            } else {
                out.extend(chunk.chars().skip(overlap));
            }
        }
        out
    }

    fn sample_transcript() -> String {
        let sentences = [
            "Chronoc beans grow only during reverse time flow cycles.",
            "They are believed to contain nutrients that enhance memory!",
            "Do they really reconstruct past neural paths?",
            "Farmers in Quazantar harvest them at dawn",
        ];
        let mut text = String::new();
        for i in 0..40 {
            text.push_str(sentences[i % sentences.len()]);
            text.push(if i % 7 == 6 { '\n' } else { ' ' });
            if i % 13 == 12 {
                text.push('\n');
            }
        }
        text
    }

    #[test]
    fn test_short_input_is_single_chunk() {
        let splitter = TextSplitter::new(1000, 200).unwrap();
        let text = "Chronoc beans grow only during reverse time cycles.";
        let chunks: Vec<&str> = splitter.split(text).collect();
        assert_eq!(chunks, vec![text]);

        let exact = "a".repeat(1000);
        let chunks: Vec<&str> = splitter.split(&exact).collect();
        assert_eq!(chunks.len(), 1);
    }

    #[test]
    fn test_empty_input_has_no_chunks() {
        let splitter = TextSplitter::new(10, 2).unwrap();
        assert_eq!(splitter.split("").count(), 0);
    }

    #[test]
    fn test_reassembly_restores_text() {
        let text = sample_transcript();
        for (size, overlap) in [(1000, 200), (120, 30), (50, 0), (17, 16), (64, 10)] {
            let splitter = TextSplitter::new(size, overlap).unwrap();
            let chunks: Vec<&str> = splitter.split(&text).collect();
            assert!(chunks.len() > 1, "size {} should split", size);
            assert_eq!(reassemble(&chunks, overlap), text, "size {} overlap {}", size, overlap);
        }
    }

    #[test]
    fn test_chunks_respect_size_and_overlap() {
        let text = sample_transcript();
        let splitter = TextSplitter::new(150, 40).unwrap();
        let chunks: Vec<&str> = splitter.split(&text).collect();

        for chunk in &chunks {
            assert!(chunk.chars().count() <= 150);
        }
        for pair in chunks.windows(2) {
            let prev: Vec<char> = pair[0].chars().collect();
            let tail: String = prev[prev.len() - 40..].iter().collect();
            let head: String = pair[1].chars().take(40).collect();
            assert_eq!(tail, head);
        }
    }

    #[test]
    fn test_prefers_sentence_boundaries() {
        let text = "First sentence is here. Second sentence follows it. Third one ends the text.";
        let splitter = TextSplitter::new(40, 5).unwrap();
        let first = splitter.split(text).next().unwrap();
        assert_eq!(first, "First sentence is here. ");
    }

    #[test]
    fn test_prefers_paragraphs_over_sentences() {
        let text = "One. Two. Three.\n\nFour five six seven eight nine ten eleven";
        let splitter = TextSplitter::new(30, 3).unwrap();
        let first = splitter.split(text).next().unwrap();
        assert_eq!(first, "One. Two. Three.\n\n");
    }

    #[test]
    fn test_hard_cut_without_whitespace() {
        let text = "x".repeat(25);
        let splitter = TextSplitter::new(10, 3).unwrap();
        let chunks: Vec<&str> = splitter.split(&text).collect();
        assert_eq!(chunks[0].len(), 10);
        assert_eq!(reassemble(&chunks, 3), text);
    }

    #[test]
    fn test_multibyte_text() {
        let text = "Les haricots Chronoc poussent à l'envers. Ça défie le temps — étrange. ".repeat(6);
        let splitter = TextSplitter::new(45, 12).unwrap();
        let chunks: Vec<&str> = splitter.split(&text).collect();
        assert!(chunks.iter().all(|c| c.chars().count() <= 45));
        assert_eq!(reassemble(&chunks, 12), text);
    }

    #[test]
    fn test_invalid_configuration() {
        assert!(TextSplitter::new(0, 0).is_err());
        assert!(TextSplitter::new(100, 100).is_err());
        assert!(TextSplitter::new(100, 150).is_err());
        assert!(TextSplitter::new(100, 99).is_ok());
    }

    #[test]
    fn test_split_document_tags_video_id() {
        let doc = VideoDocument::new("video_014", sample_transcript());
        let splitter = TextSplitter::new(200, 50).unwrap();
        let chunks = splitter.split_document(&doc);

        assert!(chunks.len() > 1);
        for (i, chunk) in chunks.iter().enumerate() {
            assert_eq!(chunk.video_id, "video_014");
            assert_eq!(chunk.order, i);
        }
    }
}
