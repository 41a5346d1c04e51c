/// Topic used when no token in the text qualifies.
pub const FALLBACK_TOPIC: &str = "general";

const MAX_TOKENS: usize = 10;
const MIN_TOKEN_LEN: usize = 4;

const STOP_WORDS: &[&str] = &[
    // articles and determiners
    "a", "an", "the", "this", "that", "these", "those", "some", "any",
    // question words
    "what", "which", "who", "whom", "whose", "when", "where", "why", "how",
    "whats", "hows", "whys", "whos",
    // auxiliaries
    "is", "are", "was", "were", "be", "been", "does", "did", "do", "can", "could",
    "would", "should", "will", "have", "has", "had",
    // short prepositions and conjunctions
    "of", "in", "on", "at", "to", "for", "by", "with", "from", "into", "about",
    "and", "or", "but", "between",
    // pronouns and request verbs
    "you", "your", "explain", "tell", "describe", "please",
];

/// Picks a topic label for free text.
///
/// Looks at the first ten whitespace-separated tokens, strips everything but
/// ASCII letters and digits, lowercases, and returns the first token that is
/// longer than three characters and not a stop word. Falls back to
/// [`FALLBACK_TOPIC`].
pub fn extract_topic(text: &str) -> String {
    text.split_whitespace()
        .take(MAX_TOKENS)
        .map(normalize_token)
        .find(|token| token.len() >= MIN_TOKEN_LEN && !STOP_WORDS.contains(&token.as_str()))
        .unwrap_or_else(|| FALLBACK_TOPIC.to_string())
}

fn normalize_token(token: &str) -> String {
    token
        .chars()
        .filter(|c| c.is_ascii_alphanumeric())
        .map(|c| c.to_ascii_lowercase())
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn picks_first_content_word() {
        assert_eq!(extract_topic("What is recursion in programming?"), "recursion");
    }

    #[test]
    fn is_deterministic() {
        let text = "What is recursion in programming?";
        let first = extract_topic(text);
        for _ in 0..5 {
            assert_eq!(extract_topic(text), first);
        }
    }

    #[test]
    fn stop_words_only_falls_back() {
        assert_eq!(extract_topic("is a an of"), FALLBACK_TOPIC);
    }

    #[test]
    fn empty_falls_back() {
        assert_eq!(extract_topic(""), FALLBACK_TOPIC);
        assert_eq!(extract_topic("   \t\n"), FALLBACK_TOPIC);
    }

    #[test]
    fn strips_punctuation_and_case() {
        assert_eq!(extract_topic("Explain: Closures, please!"), "closures");
        assert_eq!(extract_topic("HTTP/2 multiplexing?"), "http2");
    }

    #[test]
    fn short_tokens_are_skipped() {
        assert_eq!(extract_topic("Why do we use git rebase"), "rebase");
    }

    #[test]
    fn question_stop_words_are_skipped() {
        assert_eq!(extract_topic("Which statement about ownership holds"), "statement");
    }

    #[test]
    fn contracted_question_words_are_skipped() {
        assert_eq!(
            extract_topic("What's the difference between Rc and Arc?"),
            "difference"
        );
        assert_eq!(extract_topic("How's borrowing checked?"), "borrowing");
    }

    #[test]
    fn only_first_ten_tokens_considered() {
        let text = "a a a a a a a a a a recursion";
        assert_eq!(extract_topic(text), FALLBACK_TOPIC);
        let text = "a a a a a a a a a recursion";
        assert_eq!(extract_topic(text), "recursion");
    }

    #[test]
    fn non_ascii_tokens_reduce_to_remaining_chars() {
        // "café" keeps "caf", which is too short
        assert_eq!(extract_topic("café lattes"), "lattes");
    }
}
