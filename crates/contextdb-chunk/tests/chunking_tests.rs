use contextdb_chunk::{
    normalize_whitespace, ChunkStrategy, FixedWindowChunker, HeaderAwareChunker, StrategyPolicy,
};
use contextdb_core::types::Document;

fn sentence_text(sentences: usize) -> String {
    (0..sentences)
        .map(|i| format!("Sentence number {i} talks about growing vegetables at home."))
        .collect::<Vec<_>>()
        .join(" ")
}

#[test]
fn starts_are_strictly_increasing() {
    let text = sentence_text(60);
    for (size, overlap) in [(1000, 200), (120, 40), (80, 79), (50, 0)] {
        let chunker = FixedWindowChunker::new(size, overlap, true);
        let chunks = chunker.segment(&text);
        assert!(!chunks.is_empty());
        for pair in chunks.windows(2) {
            assert!(
                pair[1].start > pair[0].start,
                "size={size} overlap={overlap}: {} !> {}",
                pair[1].start,
                pair[0].start
            );
        }
    }
}

#[test]
fn chunks_cover_all_non_whitespace_input() {
    let text = sentence_text(40);
    let normalized = normalize_whitespace(&text);
    let chars: Vec<char> = normalized.chars().collect();
    let chunker = FixedWindowChunker::new(200, 50, true);
    let chunks = chunker.segment(&text);

    let mut covered = vec![false; chars.len()];
    for chunk in &chunks {
        for flag in &mut covered[chunk.start..chunk.end] {
            *flag = true;
        }
    }
    for (i, c) in chars.iter().enumerate() {
        if !c.is_whitespace() {
            assert!(covered[i], "position {i} ({c:?}) not covered by any chunk");
        }
    }
}

#[test]
fn chunk_text_matches_recorded_span() {
    let text = sentence_text(30);
    let normalized = normalize_whitespace(&text);
    let chars: Vec<char> = normalized.chars().collect();
    let chunks = FixedWindowChunker::new(150, 30, true).segment(&text);
    for chunk in &chunks {
        let span: String = chars[chunk.start..chunk.end].iter().collect();
        assert_eq!(span, chunk.text);
    }
}

#[test]
fn overlap_equal_to_window_still_terminates() {
    // degenerate parameters: next start would never advance without the
    // forced-progress rule
    let text = sentence_text(20);
    let chunks = FixedWindowChunker::new(50, 50, false).segment(&text);
    assert!(!chunks.is_empty());
    for pair in chunks.windows(2) {
        assert!(pair[1].start > pair[0].start);
    }
}

#[test]
fn empty_and_whitespace_input_produce_no_chunks() {
    let chunker = FixedWindowChunker::default();
    assert!(chunker.segment("").is_empty());
    assert!(chunker.segment(" \n\t  ").is_empty());
}

#[test]
fn sections_become_single_tagged_chunks() {
    // two sections, each body ~400 chars, both under the 512 window
    let body_a = "Tomatoes need full sun and steady watering to thrive. ".repeat(7);
    let body_b = "Carrots prefer loose sandy soil without fresh manure. ".repeat(7);
    let text = format!("Section A:\n{body_a}\nSection B:\n{body_b}");

    let chunks = HeaderAwareChunker::default().segment(&text);
    assert_eq!(chunks.len(), 2, "one chunk per section");
    assert_eq!(chunks[0].header.as_deref(), Some("Section A:"));
    assert_eq!(chunks[1].header.as_deref(), Some("Section B:"));
    assert!(chunks[0].text.contains("Tomatoes"));
    assert!(chunks[1].text.contains("Carrots"));
    assert!(chunks.iter().all(|c| c.structured));
    assert!(chunks[1].start > chunks[0].start);
}

#[test]
fn oversized_section_is_subchunked_with_inherited_header() {
    let body = "Peppers germinate slowly and want warm soil from the start. ".repeat(20);
    let text = format!("Growing Peppers:\n{body}");

    let chunker = HeaderAwareChunker::default();
    let chunks = chunker.segment(&text);
    assert!(chunks.len() > 1, "1200-char body must be re-segmented");
    for chunk in &chunks {
        assert_eq!(chunk.header.as_deref(), Some("Growing Peppers:"));
        assert!(chunk.text.chars().count() <= chunker.chunk_size);
    }
    for pair in chunks.windows(2) {
        assert!(pair[1].start > pair[0].start);
    }
}

#[test]
fn min_chunk_size_only_violated_by_short_sections() {
    let long_body = "Beans fix nitrogen and crop heavily in small spaces every year. ".repeat(6);
    let text = format!("Notes:\nMice ate two rows.\nBeans:\n{long_body}");
    let chunker = HeaderAwareChunker::default();
    let chunks = chunker.segment(&text);

    for chunk in &chunks {
        let len = chunk.text.chars().count();
        if len < chunker.min_chunk_size {
            // fallback case: the entire section was shorter than the minimum
            assert_eq!(chunk.header.as_deref(), Some("Notes:"));
        }
    }
    assert!(chunks.iter().any(|c| c.header.as_deref() == Some("Beans:")));
}

#[test]
fn candidate_followed_by_blank_lines_stays_body_text() {
    // a short line separated from the rest by blank lines must not claim
    // the distant content as its section
    let text = "Shopping list\n\n\nTomatoes and carrots were on sale at the market all week long.";
    let chunks = HeaderAwareChunker::default().segment(text);
    assert_eq!(chunks.len(), 1);
    assert_eq!(chunks[0].header, None);
    assert!(chunks[0].text.contains("Shopping list"));
    assert!(chunks[0].text.contains("Tomatoes"));
}

#[test]
fn structured_document_selects_header_aware() {
    let text = "\
Overview:
A short line about the tool.
Install:
- step one
- step two
- step three
Usage:
Run the binary.
Options:
See the flags.
Troubleshooting:
Check the logs.";
    let policy = StrategyPolicy::default();
    let doc = Document::new("d1", "Operations Manual", text);
    assert!(policy.structure_score(&doc.title, &doc.content) >= policy.structured_cutoff);
    assert!(matches!(policy.select(&doc), ChunkStrategy::HeaderAware(_)));
}

#[test]
fn plain_prose_selects_fixed_window() {
    let text = sentence_text(12);
    let policy = StrategyPolicy::default();
    let doc = Document::new("d2", "A rainy afternoon", &text);
    assert!(matches!(policy.select(&doc), ChunkStrategy::FixedWindow(_)));
}

#[test]
fn segmentation_is_deterministic() {
    let text = sentence_text(25);
    let chunker = FixedWindowChunker::new(180, 60, true);
    assert_eq!(chunker.segment(&text), chunker.segment(&text));
}
