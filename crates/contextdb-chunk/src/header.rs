//! Header-aware segmentation for structured documents.
//!
//! The text is scanned line by line; recognized headers open a new section
//! and section bodies accumulate until the next header. Sections that fit
//! the window become one chunk each; oversized section bodies are re-segmented
//! with the fixed-window strategy, every sub-chunk inheriting the section
//! header.

use contextdb_core::types::Chunk;
use tracing::debug;

use crate::fixed::{normalize_whitespace, FixedWindowChunker};

/// Best-effort header classifier.
///
/// A candidate line must be under 100 characters and must be immediately
/// followed by a non-empty line. It qualifies as a header when it ends with
/// `:`, when it is short (< 50 chars) with no period, or when its letters
/// are mostly uppercase.
pub(crate) fn is_header(line: &str, has_following_content: bool) -> bool {
    let line = line.trim();
    if line.is_empty() || line.len() >= 100 || !has_following_content {
        return false;
    }
    if line.ends_with(':') {
        return true;
    }
    if line.len() < 50 && !line.contains('.') {
        return true;
    }
    mostly_uppercase(line)
}

/// Uppercase ratio over alphabetic characters only; needs at least three
/// letters to vote.
fn mostly_uppercase(line: &str) -> bool {
    let letters: Vec<char> = line.chars().filter(|c| c.is_alphabetic()).collect();
    if letters.len() < 3 {
        return false;
    }
    let upper = letters.iter().filter(|c| c.is_uppercase()).count();
    (upper as f32 / letters.len() as f32) > 0.8
}

struct Section {
    header: Option<String>,
    body_lines: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct HeaderAwareChunker {
    pub chunk_size: usize,
    pub overlap: usize,
    pub min_chunk_size: usize,
}

impl Default for HeaderAwareChunker {
    fn default() -> Self {
        Self {
            chunk_size: 512,
            overlap: 128,
            min_chunk_size: 100,
        }
    }
}

impl HeaderAwareChunker {
    pub fn new(chunk_size: usize, overlap: usize, min_chunk_size: usize) -> Self {
        Self {
            chunk_size: chunk_size.max(1),
            overlap,
            min_chunk_size,
        }
    }

    /// Deterministic segmentation of `text`. Offsets are character offsets
    /// into the concatenation of the normalized section texts, so they stay
    /// strictly increasing across the whole document.
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        let sections = split_sections(text);
        let mut chunks: Vec<Chunk> = Vec::new();
        let mut cursor = 0usize;

        for section in &sections {
            let body = normalize_whitespace(&section.body_lines.join("\n"));
            let combined = match &section.header {
                Some(header) if body.is_empty() => header.clone(),
                Some(header) => format!("{header} {body}"),
                None => body.clone(),
            };
            let combined_len = combined.chars().count();
            if combined_len == 0 {
                continue;
            }

            if combined_len <= self.chunk_size {
                if combined_len < self.min_chunk_size {
                    // whole section is below the viable minimum: emit it
                    // anyway rather than lose the text
                    debug!(
                        section_len = combined_len,
                        "section below min_chunk_size, emitting as-is"
                    );
                }
                let mut chunk =
                    Chunk::new(combined, chunks.len(), cursor, cursor + combined_len);
                chunk.header = section.header.clone();
                chunk.structured = true;
                chunks.push(chunk);
            } else {
                let fixed = FixedWindowChunker::new(self.chunk_size, self.overlap, true);
                let header_len = combined_len - body.chars().count();
                for mut sub in fixed.segment(&body) {
                    sub.index = chunks.len();
                    sub.start += cursor + header_len;
                    sub.end += cursor + header_len;
                    sub.header = section.header.clone();
                    sub.structured = true;
                    chunks.push(sub);
                }
            }
            cursor += combined_len + 1;
        }

        chunks
    }
}

fn split_sections(text: &str) -> Vec<Section> {
    let lines: Vec<&str> = text.lines().collect();
    let mut sections: Vec<Section> = Vec::new();
    let mut current = Section {
        header: None,
        body_lines: Vec::new(),
    };

    for (i, line) in lines.iter().enumerate() {
        let next_is_content = lines.get(i + 1).is_some_and(|l| !l.trim().is_empty());
        if is_header(line, next_is_content) {
            if current.header.is_some() || !current.body_lines.is_empty() {
                sections.push(current);
            }
            current = Section {
                header: Some(line.trim().to_string()),
                body_lines: Vec::new(),
            };
        } else if !line.trim().is_empty() {
            current.body_lines.push((*line).to_string());
        }
    }
    if current.header.is_some() || !current.body_lines.is_empty() {
        sections.push(current);
    }
    sections
}
