//! Chunking strategy selection.
//!
//! Scores structural signals in a document and picks header-aware chunking
//! for documents that look structured. This is a best-effort heuristic, not
//! a classifier with correctness guarantees; thresholds live on the policy
//! object so they can be tuned without touching orchestration code.

use contextdb_core::config::ChunkingConfig;
use contextdb_core::types::{Chunk, Document};
use tracing::debug;

use crate::fixed::FixedWindowChunker;
use crate::header::{is_header, HeaderAwareChunker};

/// Title words that usually indicate documentation-style content.
const DOC_TITLE_HINTS: &[&str] = &[
    "guide",
    "manual",
    "documentation",
    "readme",
    "reference",
    "tutorial",
    "handbook",
    "howto",
    "faq",
];

/// The two segmentation strategies, carrying their parameters.
#[derive(Debug, Clone)]
pub enum ChunkStrategy {
    FixedWindow(FixedWindowChunker),
    HeaderAware(HeaderAwareChunker),
}

impl ChunkStrategy {
    pub fn segment(&self, text: &str) -> Vec<Chunk> {
        match self {
            ChunkStrategy::FixedWindow(chunker) => chunker.segment(text),
            ChunkStrategy::HeaderAware(chunker) => chunker.segment(text),
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            ChunkStrategy::FixedWindow(_) => "fixed_window",
            ChunkStrategy::HeaderAware(_) => "header_aware",
        }
    }
}

/// Structure-score policy: signal weights and the selection cutoff.
#[derive(Debug, Clone)]
pub struct StrategyPolicy {
    chunking: ChunkingConfig,
    /// Minimum structure score that selects header-aware chunking.
    pub structured_cutoff: u32,
}

impl Default for StrategyPolicy {
    fn default() -> Self {
        Self {
            chunking: ChunkingConfig::default(),
            structured_cutoff: 5,
        }
    }
}

impl StrategyPolicy {
    pub fn from_config(chunking: &ChunkingConfig) -> Self {
        Self {
            chunking: chunking.clone(),
            structured_cutoff: 5,
        }
    }

    /// Picks a strategy for the document based on its structure score.
    pub fn select(&self, document: &Document) -> ChunkStrategy {
        let score = self.structure_score(&document.title, &document.content);
        let strategy = if score >= self.structured_cutoff {
            ChunkStrategy::HeaderAware(HeaderAwareChunker::new(
                self.chunking.structured_window,
                self.chunking.structured_overlap,
                self.chunking.min_chunk_size,
            ))
        } else {
            ChunkStrategy::FixedWindow(FixedWindowChunker::new(
                self.chunking.window,
                self.chunking.overlap,
                self.chunking.split_on_sentence,
            ))
        };
        debug!(
            document_id = %document.id,
            score,
            strategy = strategy.name(),
            "selected chunking strategy"
        );
        strategy
    }

    /// Additive structure score over title and body signals.
    pub fn structure_score(&self, title: &str, text: &str) -> u32 {
        let mut score = 0u32;

        let title_lower = title.to_lowercase();
        if DOC_TITLE_HINTS.iter().any(|hint| title_lower.contains(hint)) {
            score += 2;
        }

        let lines: Vec<&str> = text.lines().collect();
        if lines.is_empty() {
            return score;
        }
        let line_count = lines.len() as f32;

        let code_lines = lines
            .iter()
            .filter(|l| {
                let t = l.trim_start();
                t.starts_with("```") || (l.starts_with("    ") || l.starts_with('\t')) && !t.is_empty()
            })
            .count();
        if code_lines > 5 {
            score += 2;
        }

        let header_count = lines
            .iter()
            .enumerate()
            .filter(|(i, line)| {
                let next_is_content = lines.get(i + 1).is_some_and(|l| !l.trim().is_empty());
                is_header(line, next_is_content)
            })
            .count();
        let header_density = header_count as f32 / line_count;
        if header_density > 0.05 {
            score += 3;
        } else if header_density > 0.02 {
            score += 1;
        }

        let list_lines = lines.iter().filter(|l| is_list_item(l)).count();
        if list_lines as f32 / line_count > 0.15 {
            score += 2;
        }

        let non_empty: Vec<&&str> = lines.iter().filter(|l| !l.trim().is_empty()).collect();
        if !non_empty.is_empty() {
            let avg_len =
                non_empty.iter().map(|l| l.len()).sum::<usize>() as f32 / non_empty.len() as f32;
            if avg_len < 60.0 {
                score += 1;
            }
        }

        if header_count > 5 {
            score += 2;
        }

        score
    }
}

fn is_list_item(line: &str) -> bool {
    let t = line.trim_start();
    if t.starts_with("- ") || t.starts_with("* ") || t.starts_with("• ") {
        return true;
    }
    let mut chars = t.chars();
    let leading_digits: String = chars.by_ref().take_while(char::is_ascii_digit).collect();
    !leading_digits.is_empty() && t[leading_digits.len()..].starts_with('.')
}
