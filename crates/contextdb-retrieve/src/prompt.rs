//! Augmented prompt assembly.

/// Divider placed between chunk texts in the context block.
pub const CONTEXT_DIVIDER: &str = "\n\n---\n\n";

const INSTRUCTION: &str = "Answer the question using only the context below. \
If the context does not contain enough information to answer, say so explicitly \
instead of guessing.";

/// Wraps the surviving chunk texts and the original query in the
/// instruction template.
pub fn build_prompt(query: &str, chunk_texts: &[&str]) -> String {
    format!(
        "{INSTRUCTION}\n\nContext:\n{}\n\nQuestion: {query}",
        chunk_texts.join(CONTEXT_DIVIDER)
    )
}

/// Deduplicates cited document titles, preserving first-citation order.
pub fn citation_titles<'a>(titles: impl IntoIterator<Item = &'a str>) -> Vec<String> {
    let mut seen: Vec<String> = Vec::new();
    for title in titles {
        if !seen.iter().any(|t| t == title) {
            seen.push(title.to_string());
        }
    }
    seen
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn prompt_contains_context_and_question() {
        let prompt = build_prompt("what changed?", &["first chunk", "second chunk"]);
        assert!(prompt.contains("first chunk"));
        assert!(prompt.contains(CONTEXT_DIVIDER));
        assert!(prompt.ends_with("Question: what changed?"));
    }

    #[test]
    fn citations_deduplicate_preserving_order() {
        let titles = citation_titles(["Report", "Notes", "Report"]);
        assert_eq!(titles, vec!["Report", "Notes"]);
    }
}
