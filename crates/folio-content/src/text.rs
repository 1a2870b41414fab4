//! Word-level text helpers
//!
//! Tokens are lowercased runs of alphabetic characters. Everything above
//! this counts and ranks those tokens.

use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

/// Common English function words excluded from term rankings
pub const STOP_WORDS: &[&str] = &[
    "a", "about", "above", "after", "again", "against", "all", "also", "am", "an", "and", "any",
    "are", "as", "at", "be", "because", "been", "before", "being", "below", "between", "both",
    "but", "by", "can", "could", "did", "do", "does", "doing", "down", "during", "each", "even",
    "few", "for", "from", "further", "had", "has", "have", "having", "he", "her", "here", "hers",
    "him", "his", "how", "i", "if", "in", "into", "is", "it", "its", "itself", "just", "like",
    "may", "me", "might", "more", "most", "much", "must", "my", "no", "nor", "not", "now", "of",
    "off", "on", "once", "only", "or", "other", "our", "ours", "out", "over", "own", "same",
    "she", "should", "so", "some", "such", "than", "that", "the", "their", "theirs", "them",
    "then", "there", "these", "they", "this", "those", "through", "to", "too", "under", "until",
    "up", "us", "very", "was", "we", "were", "what", "when", "where", "which", "while", "who",
    "whom", "why", "will", "with", "would", "you", "your", "yours",
];

static STOP_SET: Lazy<HashSet<&'static str>> = Lazy::new(|| STOP_WORDS.iter().copied().collect());

static SENTENCE_END: Lazy<Regex> = Lazy::new(|| Regex::new(r"[.!?]+(?:\s+|$)").unwrap());

/// Whether `word` (lowercase) is a stop word
#[inline]
#[must_use]
pub fn is_stop_word(word: &str) -> bool {
    STOP_SET.contains(word)
}

/// Lowercased alphabetic tokens, in document order
pub fn alpha_tokens(text: &str) -> impl Iterator<Item = String> + '_ {
    text.split(|c: char| !c.is_alphabetic())
        .filter(|t| !t.is_empty())
        .map(str::to_lowercase)
}

/// Token frequencies in first-seen order
#[must_use]
pub fn term_frequencies(text: &str) -> IndexMap<String, usize> {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for token in alpha_tokens(text) {
        *counts.entry(token).or_default() += 1;
    }
    counts
}

/// Top `n` non-stop-word terms by frequency, ties in first-seen order
#[must_use]
pub fn top_terms(text: &str, n: usize) -> Vec<String> {
    let mut ranked: Vec<(String, usize)> = term_frequencies(text)
        .into_iter()
        .filter(|(term, _)| !is_stop_word(term))
        .collect();
    // stable sort keeps first-seen order among equal counts
    ranked.sort_by(|a, b| b.1.cmp(&a.1));
    ranked.into_iter().take(n).map(|(term, _)| term).collect()
}

/// Truncate to at most `max` characters without splitting a code point
#[must_use]
pub fn truncate_chars(text: &str, max: usize) -> String {
    match text.char_indices().nth(max) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}

/// Sentences split on terminal punctuation
#[must_use]
pub fn sentences(text: &str) -> Vec<String> {
    let mut out = Vec::new();
    let mut start = 0;
    for m in SENTENCE_END.find_iter(text) {
        let sentence = text[start..m.end()].trim();
        if !sentence.is_empty() {
            out.push(sentence.to_string());
        }
        start = m.end();
    }
    let rest = text[start..].trim();
    if !rest.is_empty() {
        out.push(rest.to_string());
    }
    out
}

/// Last sentence of `text`, if any
#[must_use]
pub fn last_sentence(text: &str) -> Option<String> {
    sentences(text).pop()
}

/// Normalized prefix used to spot repeated text
///
/// Lowercases, strips punctuation, collapses whitespace and keeps the first
/// `len` characters.
#[must_use]
pub fn fingerprint(text: &str, len: usize) -> String {
    let lowered = text.to_lowercase();
    let stripped: String = lowered
        .chars()
        .filter(|c| c.is_alphanumeric() || c.is_whitespace())
        .collect();
    let collapsed = stripped.split_whitespace().collect::<Vec<_>>().join(" ");
    truncate_chars(&collapsed, len)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn tokens_are_lowercased_alphabetic_runs() {
        let tokens: Vec<String> = alpha_tokens("Rust's 2024 edition: fast-safe!").collect();
        assert_eq!(tokens, vec!["rust", "s", "edition", "fast", "safe"]);
    }

    #[test]
    fn top_terms_skip_stop_words() {
        let text = "the cache and the cache and the store; cache store index";
        assert_eq!(top_terms(text, 2), vec!["cache", "store"]);
    }

    #[test]
    fn truncate_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé");
        assert_eq!(truncate_chars("hi", 10), "hi");
    }

    #[test]
    fn sentence_split_and_last() {
        let text = "First one. Second one! Third without stop";
        assert_eq!(sentences(text).len(), 3);
        assert_eq!(last_sentence(text).as_deref(), Some("Third without stop"));
        assert_eq!(last_sentence("   "), None);
    }

    #[test]
    fn fingerprint_normalizes() {
        let a = fingerprint("Hello,   World!\nAgain.", 200);
        let b = fingerprint("hello world again", 200);
        assert_eq!(a, b);
        assert_eq!(fingerprint("abcdef", 3), "abc");
    }
}
