//! Fixed-window segmentation with overlap and optional sentence snapping.

use contextdb_core::types::Chunk;

/// Collapses runs of any whitespace to a single space and trims the ends.
pub fn normalize_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Sliding-window chunker over normalized text.
///
/// The window advances by `chunk_size` characters; when `split_on_sentence`
/// is set and the window does not reach end-of-text, the boundary is pulled
/// back to the nearest preceding sentence terminator followed by whitespace,
/// falling back to the nearest preceding whitespace, falling back to the raw
/// boundary. Each next window starts `overlap` characters before the previous
/// end; degenerate parameter combinations are forced forward so segmentation
/// always terminates.
#[derive(Debug, Clone)]
pub struct FixedWindowChunker {
    pub chunk_size: usize,
    pub overlap: usize,
    pub split_on_sentence: bool,
}

impl Default for FixedWindowChunker {
    fn default() -> Self {
        Self {
            chunk_size: 1000,
            overlap: 200,
            split_on_sentence: true,
        }
    }
}

impl FixedWindowChunker {
    pub fn new(chunk_size: usize, overlap: usize, split_on_sentence: bool) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            split_on_sentence,
        }
    }

    /// Deterministic segmentation of `text`. Offsets are character offsets
    /// into the normalized text.
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        let normalized = normalize_whitespace(text);
        let chars: Vec<char> = normalized.chars().collect();
        self.segment_chars(&chars)
    }

    pub(crate) fn segment_chars(&self, chars: &[char]) -> Vec<Chunk> {
        let total = chars.len();
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut start = 0usize;

        while start < total {
            let mut end = (start + self.chunk_size).min(total);
            if self.split_on_sentence && end < total {
                if let Some(boundary) = sentence_boundary(chars, start, end) {
                    end = boundary;
                } else if let Some(boundary) = whitespace_boundary(chars, start, end) {
                    end = boundary;
                }
                // neither found: keep the raw window boundary, which
                // guarantees forward progress
            }

            let (trimmed_start, trimmed_end) = trimmed_span(chars, start, end);
            if trimmed_start < trimmed_end {
                let text: String = chars[trimmed_start..trimmed_end].iter().collect();
                chunks.push(Chunk::new(text, chunks.len(), trimmed_start, trimmed_end));
            }

            if end >= total {
                break;
            }
            let next = end.saturating_sub(self.overlap);
            // never re-open a window at or before the previous start
            start = if next > start { next } else { end };
        }

        chunks
    }
}

/// Nearest boundary inside `(start, end)` sitting right after a sentence
/// terminator that is followed by whitespace or end-of-text.
fn sentence_boundary(chars: &[char], start: usize, end: usize) -> Option<usize> {
    for p in (start + 1..end).rev() {
        if matches!(chars[p - 1], '.' | '!' | '?' | '\n') {
            match chars.get(p) {
                None => return Some(p),
                Some(c) if c.is_whitespace() => return Some(p),
                Some(_) => {}
            }
        }
    }
    None
}

/// Nearest whitespace position inside `(start, end)`.
fn whitespace_boundary(chars: &[char], start: usize, end: usize) -> Option<usize> {
    (start + 1..end).rev().find(|&p| chars[p].is_whitespace())
}

/// Shrinks `[start, end)` to its non-whitespace extent so recorded offsets
/// line up with the emitted chunk text.
fn trimmed_span(chars: &[char], start: usize, end: usize) -> (usize, usize) {
    let mut s = start;
    let mut e = end;
    while s < e && chars[s].is_whitespace() {
        s += 1;
    }
    while e > s && chars[e - 1].is_whitespace() {
        e -= 1;
    }
    (s, e)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalization_collapses_runs() {
        assert_eq!(normalize_whitespace("  a\t\tb\n\nc  "), "a b c");
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunker = FixedWindowChunker::default();
        let chunks = chunker.segment("hello world.");
        assert_eq!(chunks.len(), 1);
        assert_eq!(chunks[0].text, "hello world.");
        assert_eq!((chunks[0].start, chunks[0].end), (0, 12));
    }

    #[test]
    fn boundary_snaps_to_sentence_terminator() {
        let chunker = FixedWindowChunker::new(20, 0, true);
        let chunks = chunker.segment("One sentence. Another sentence follows here.");
        assert!(chunks[0].text.ends_with('.'), "got {:?}", chunks[0].text);
        assert_eq!(chunks[0].text, "One sentence.");
    }

    #[test]
    fn boundary_falls_back_to_whitespace() {
        let chunker = FixedWindowChunker::new(10, 0, true);
        let chunks = chunker.segment("alpha bravo charlie");
        assert_eq!(chunks[0].text, "alpha");
    }

    #[test]
    fn unbroken_text_keeps_raw_boundary() {
        let chunker = FixedWindowChunker::new(8, 2, true);
        let chunks = chunker.segment("abcdefghijklmnop");
        assert_eq!(chunks[0].text.chars().count(), 8);
        assert!(chunks.len() >= 2);
    }
}
