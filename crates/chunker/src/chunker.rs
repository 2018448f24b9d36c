use crate::config::ChunkerConfig;
use crate::types::Chunk;

/// Sliding-window text chunker
#[derive(Debug, Clone, Default)]
pub struct Chunker {
    config: ChunkerConfig,
}

impl Chunker {
    #[must_use]
    pub const fn new(config: ChunkerConfig) -> Self {
        Self { config }
    }

    #[must_use]
    pub const fn config(&self) -> &ChunkerConfig {
        &self.config
    }

    /// Split `text` into overlapping windows.
    #[must_use]
    pub fn chunk(&self, text: &str) -> Vec<String> {
        chunk_text(text, self.config.size, self.config.overlap)
    }

    /// Split `text` and tag every window with `source`.
    #[must_use]
    pub fn chunk_document(&self, text: &str, source: &str) -> Vec<Chunk> {
        let chunks: Vec<Chunk> = self
            .chunk(text)
            .into_iter()
            .map(|window| Chunk::new(window, source))
            .collect();
        log::info!(
            "Split {source} into {} chunks (size={}, overlap={})",
            chunks.len(),
            self.config.size,
            self.config.overlap
        );
        chunks
    }
}

/// Split `text` into windows of at most `size` characters, each starting `size - overlap`
/// characters after the previous one.
///
/// When `overlap >= size` the next window starts where the previous one ended. The final window
/// may be shorter than `size`. Empty input yields no windows.
#[must_use]
pub fn chunk_text(text: &str, size: usize, overlap: usize) -> Vec<String> {
    if text.is_empty() {
        return Vec::new();
    }

    let size = size.max(1);
    let stride = ChunkerConfig::new(size, overlap).stride();

    // Byte offset of every char boundary, including the end of the string.
    let bounds: Vec<usize> = text
        .char_indices()
        .map(|(offset, _)| offset)
        .chain(std::iter::once(text.len()))
        .collect();
    let total_chars = bounds.len() - 1;

    let mut chunks = Vec::with_capacity(total_chars / stride + 1);
    let mut start = 0;
    while start < total_chars {
        let end = (start + size).min(total_chars);
        chunks.push(text[bounds[start]..bounds[end]].to_string());
        start += stride;
    }
    chunks
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn lengths(chunks: &[String]) -> Vec<usize> {
        chunks.iter().map(|c| c.chars().count()).collect()
    }

    #[test]
    fn empty_text_has_no_chunks() {
        assert!(chunk_text("", 500, 50).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(chunk_text("hello", 500, 50), vec!["hello".to_string()]);
    }

    #[test]
    fn twelve_hundred_chars_make_three_windows() {
        let text: String = (0..1200).map(|i| char::from(b'a' + (i % 26) as u8)).collect();
        let chunks = chunk_text(&text, 500, 50);

        assert_eq!(lengths(&chunks), vec![500, 500, 300]);
        assert_eq!(chunks[1], text[450..950]);
        assert_eq!(chunks[2], text[900..]);
    }

    #[test]
    fn overlap_equal_to_size_still_advances() {
        let chunks = chunk_text("abcdefghij", 4, 4);
        assert_eq!(chunks, vec!["abcd", "efgh", "ij"]);
    }

    #[test]
    fn overlap_larger_than_size_still_advances() {
        let chunks = chunk_text("abcdefghij", 3, 7);
        assert_eq!(chunks, vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn windows_respect_char_boundaries() {
        let text = "héllo wörld ✓✓✓";
        let chunks = chunk_text(text, 4, 1);
        assert!(chunks.iter().all(|c| c.chars().count() <= 4));
        assert_eq!(chunks[0], "héll");
        assert_eq!(chunks[1], "lo w");
    }

    #[test]
    fn chunk_document_tags_source() {
        let chunker = Chunker::new(ChunkerConfig::new(5, 0));
        let chunks = chunker.chunk_document("abcdefg", "a.txt");
        assert_eq!(
            chunks,
            vec![Chunk::new("abcde", "a.txt"), Chunk::new("fg", "a.txt")]
        );
    }
}
