//! Flesch reading ease over section bodies
//!
//! Syllables are estimated from vowel groups, so scores are approximate for
//! irregular words. Scores are clamped to 0-100.

use crate::markdown;
use crate::model::Section;
use crate::text;

const BASE: f64 = 206.835;
const WORDS_PER_SENTENCE_WEIGHT: f64 = 1.015;
const SYLLABLES_PER_WORD_WEIGHT: f64 = 84.6;

fn is_vowel(c: char) -> bool {
    matches!(c, 'a' | 'e' | 'i' | 'o' | 'u' | 'y')
}

/// Estimated syllable count of one word, at least 1
#[must_use]
pub fn syllables(word: &str) -> usize {
    let word = word.to_lowercase();
    let mut groups = 0;
    let mut previous_vowel = false;
    for c in word.chars() {
        let vowel = is_vowel(c);
        if vowel && !previous_vowel {
            groups += 1;
        }
        previous_vowel = vowel;
    }
    // silent trailing e, except "-le" as in "table"
    if groups > 1 && word.ends_with('e') && !word.ends_with("le") {
        groups -= 1;
    }
    groups.max(1)
}

/// Reading ease of plain `text`, rounded to one decimal
///
/// `None` when the text has no words.
#[must_use]
pub fn reading_ease(text: &str) -> Option<f64> {
    let words: Vec<String> = text::alpha_tokens(text).collect();
    if words.is_empty() {
        return None;
    }
    let sentence_count = text::sentences(text).len().max(1);
    let syllable_count: usize = words.iter().map(|w| syllables(w)).sum();

    let words_per_sentence = words.len() as f64 / sentence_count as f64;
    let syllables_per_word = syllable_count as f64 / words.len() as f64;
    let score = BASE
        - WORDS_PER_SENTENCE_WEIGHT * words_per_sentence
        - SYLLABLES_PER_WORD_WEIGHT * syllables_per_word;
    Some((score.clamp(0.0, 100.0) * 10.0).round() / 10.0)
}

/// Reading ease of the section bodies, headings and markup excluded
#[must_use]
pub fn readability_score(sections: &[Section]) -> Option<f64> {
    let plain: Vec<String> = sections
        .iter()
        .map(|s| markdown::plain_text(&s.content))
        .collect();
    reading_ease(&plain.join("\n"))
}
