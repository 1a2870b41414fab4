//! Holistic summary compiler
//!
//! Reduces the full document to a compact context object that every pass
//! receives instead of the whole document. The summary is rebuilt from the
//! current sections on every pass and never patched in place.
//!
//! Every list is capped so the serialized form stays within a few kilobytes
//! no matter how long the document grows.

use crate::markdown;
use crate::model::{flatten_outline, ordered, Brief, BusinessInfo, Section};
use crate::structure::{ContentStructureExtractor, PatternExtractor};
use crate::text::{self, is_stop_word, truncate_chars};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Sections described individually in the outline and digests
pub const MAX_SUMMARY_SECTIONS: usize = 10;
/// Characters kept of each outline heading, term and anchor string
pub const MAX_HEADING_CHARS: usize = 60;
/// Overused terms reported
pub const MAX_OVERUSED_TERMS: usize = 10;
/// Distinct anchor texts reported
pub const MAX_ANCHORS: usize = 15;
/// Key terms per section
pub const KEY_TERMS_PER_SECTION: usize = 5;
/// Characters kept of each section's trailing sentence
pub const TRAILING_SENTENCE_CHARS: usize = 200;
/// Characters kept of the introduction
pub const INTRO_CHARS: usize = 500;
/// Previewed sub-topics kept from the introduction
pub const MAX_PREVIEW_ITEMS: usize = 8;
/// Discourse anchors kept
pub const MAX_DISCOURSE_ANCHORS: usize = 10;

const OVERUSE_MIN_COUNT: usize = 3;
const OVERUSE_MIN_LEN: usize = 3;
const ANCHOR_WORD_MIN_LEN: usize = 4;

/// One outline entry
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OutlineEntry {
    pub order: u32,
    pub heading: String,
    pub word_count: usize,
}

/// Document structure at a glance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StructuralOutline {
    pub sections: Vec<OutlineEntry>,
    pub total_word_count: usize,
    pub section_count: usize,
    /// Sections left out of `sections` by the size cap
    pub omitted_sections: usize,
}

/// A term and how often it occurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TermCount {
    pub term: String,
    pub count: usize,
}

/// Vocabulary richness over the whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VocabularyMetrics {
    pub total_words: usize,
    pub unique_words: usize,
    pub type_token_ratio: f64,
    pub overused_terms: Vec<TermCount>,
}

/// Share of the document one section takes
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CoverageEntry {
    pub order: u32,
    pub percent: f64,
}

/// How one internal-link anchor text is used
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AnchorUsage {
    pub anchor: String,
    /// Id of the first section using the anchor
    pub first_section: String,
    pub count: usize,
}

/// Continuity hints for one section
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SectionDigest {
    pub order: u32,
    pub key_terms: Vec<String>,
    pub trailing_sentence: Option<String>,
}

/// What the introduction promises
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct IntroductionDigest {
    pub opening: String,
    pub previewed_topics: Vec<String>,
}

/// Featured-snippet format the title suggests
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SnippetTarget {
    Paragraph,
    List,
    Table,
}

/// Compact digest of the whole document
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HolisticSummary {
    pub outline: StructuralOutline,
    pub vocabulary: VocabularyMetrics,
    pub coverage: Vec<CoverageEntry>,
    pub anchors: Vec<AnchorUsage>,
    pub section_digests: Vec<SectionDigest>,
    pub introduction: Option<IntroductionDigest>,
    pub discourse_anchors: Vec<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub featured_snippet: Option<SnippetTarget>,
}

impl HolisticSummary {
    /// Compact JSON form handed to the generation service
    ///
    /// # Errors
    /// Returns the serializer error; with the types above this does not occur
    /// in practice.
    pub fn to_compact_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Byte length of [`Self::to_compact_json`], 0 if serialization fails
    #[must_use]
    pub fn serialized_len(&self) -> usize {
        self.to_compact_json().map_or(0, |s| s.len())
    }

    /// Anchors used more than once, which reads as monotonous linking
    pub fn repeated_anchors(&self) -> impl Iterator<Item = &AnchorUsage> {
        self.anchors.iter().filter(|a| a.count > 1)
    }
}

/// Summarize with the default pattern heuristics
#[must_use]
pub fn summarize(sections: &[Section], brief: &Brief, business: &BusinessInfo) -> HolisticSummary {
    summarize_with(&PatternExtractor, sections, brief, business)
}

/// Summarize with a caller-supplied structure extractor
#[must_use]
pub fn summarize_with(
    extractor: &dyn ContentStructureExtractor,
    sections: &[Section],
    brief: &Brief,
    business: &BusinessInfo,
) -> HolisticSummary {
    let sorted = ordered(sections);

    let outline = structural_outline(&sorted);
    let vocabulary = vocabulary_metrics(&sorted);
    let coverage = coverage(&sorted, outline.total_word_count);
    let anchors = anchor_usage(&sorted);
    let section_digests = sorted
        .iter()
        .take(MAX_SUMMARY_SECTIONS)
        .map(|s| section_digest(s))
        .collect();
    let introduction = sorted
        .iter()
        .find(|s| s.looks_like_introduction())
        .map(|s| introduction_digest(extractor, s));
    let discourse_anchors = discourse_anchors(&sorted, brief, business);
    let featured_snippet = snippet_target(&brief.title);

    let summary = HolisticSummary {
        outline,
        vocabulary,
        coverage,
        anchors,
        section_digests,
        introduction,
        discourse_anchors,
        featured_snippet,
    };

    tracing::debug!(
        sections = summary.outline.section_count,
        words = summary.outline.total_word_count,
        anchors = summary.anchors.len(),
        "compiled holistic summary"
    );
    summary
}

fn structural_outline(sorted: &[&Section]) -> StructuralOutline {
    let entries: Vec<OutlineEntry> = sorted
        .iter()
        .map(|s| OutlineEntry {
            order: s.order,
            heading: truncate_chars(s.heading.trim(), MAX_HEADING_CHARS),
            word_count: s.word_count(),
        })
        .collect();
    let total_word_count = entries.iter().map(|e| e.word_count).sum();
    let section_count = entries.len();
    let omitted_sections = section_count.saturating_sub(MAX_SUMMARY_SECTIONS);

    StructuralOutline {
        sections: entries.into_iter().take(MAX_SUMMARY_SECTIONS).collect(),
        total_word_count,
        section_count,
        omitted_sections,
    }
}

fn vocabulary_metrics(sorted: &[&Section]) -> VocabularyMetrics {
    let mut counts: IndexMap<String, usize> = IndexMap::new();
    for section in sorted {
        let plain = markdown::plain_text(&section.content);
        for token in text::alpha_tokens(&plain) {
            *counts.entry(token).or_default() += 1;
        }
    }

    let total_words: usize = counts.values().sum();
    let unique_words = counts.len();
    let type_token_ratio = if total_words == 0 {
        0.0
    } else {
        round_to(unique_words as f64 / total_words as f64, 3)
    };

    let mut overused: Vec<TermCount> = counts
        .into_iter()
        .filter(|(term, count)| {
            *count > OVERUSE_MIN_COUNT && term.chars().count() > OVERUSE_MIN_LEN && !is_stop_word(term)
        })
        .map(|(term, count)| TermCount {
            term: truncate_chars(&term, MAX_HEADING_CHARS),
            count,
        })
        .collect();
    overused.sort_by(|a, b| b.count.cmp(&a.count));
    overused.truncate(MAX_OVERUSED_TERMS);

    VocabularyMetrics {
        total_words,
        unique_words,
        type_token_ratio,
        overused_terms: overused,
    }
}

fn coverage(sorted: &[&Section], total: usize) -> Vec<CoverageEntry> {
    sorted
        .iter()
        .take(MAX_SUMMARY_SECTIONS)
        .map(|s| CoverageEntry {
            order: s.order,
            percent: if total == 0 {
                0.0
            } else {
                round_to(s.word_count() as f64 * 100.0 / total as f64, 1)
            },
        })
        .collect()
}

fn anchor_usage(sorted: &[&Section]) -> Vec<AnchorUsage> {
    let mut usage: IndexMap<String, AnchorUsage> = IndexMap::new();
    for section in sorted {
        for link in markdown::links(&section.content) {
            let key = link.text.trim().to_lowercase();
            if key.is_empty() {
                continue;
            }
            usage
                .entry(key.clone())
                .or_insert_with(|| AnchorUsage {
                    anchor: truncate_chars(&key, MAX_HEADING_CHARS),
                    first_section: truncate_chars(&section.id, MAX_HEADING_CHARS),
                    count: 0,
                })
                .count += 1;
        }
    }
    usage.into_values().take(MAX_ANCHORS).collect()
}

fn section_digest(section: &Section) -> SectionDigest {
    let plain = markdown::plain_text(&section.content);
    SectionDigest {
        order: section.order,
        key_terms: text::top_terms(&plain, KEY_TERMS_PER_SECTION)
            .into_iter()
            .map(|t| truncate_chars(&t, MAX_HEADING_CHARS))
            .collect(),
        trailing_sentence: text::last_sentence(&plain)
            .map(|s| truncate_chars(&s, TRAILING_SENTENCE_CHARS)),
    }
}

fn introduction_digest(
    extractor: &dyn ContentStructureExtractor,
    section: &Section,
) -> IntroductionDigest {
    let plain = markdown::plain_text(&section.content);
    IntroductionDigest {
        opening: truncate_chars(&plain, INTRO_CHARS),
        previewed_topics: extractor
            .previewed_topics(&section.content, MAX_PREVIEW_ITEMS)
            .into_iter()
            .map(|t| truncate_chars(&t, MAX_HEADING_CHARS))
            .collect(),
    }
}

/// Seed keyword, title words, then outline words; section headings only without an outline
fn discourse_anchors(sorted: &[&Section], brief: &Brief, business: &BusinessInfo) -> Vec<String> {
    let mut anchors: IndexMap<String, String> = IndexMap::new();
    let mut push = |candidate: &str| {
        let key = candidate.to_lowercase();
        if !key.is_empty() && !anchors.contains_key(&key) {
            anchors.insert(key, truncate_chars(candidate, MAX_HEADING_CHARS));
        }
    };

    if let Some(seed) = business.seed_keyword.as_deref() {
        push(seed.trim());
    }
    for word in long_words(&brief.title) {
        push(&word);
    }

    let outline = flatten_outline(&brief.outline);
    if outline.is_empty() {
        for section in sorted {
            for word in long_words(&section.heading) {
                push(&word);
            }
        }
    } else {
        for node in outline {
            for word in long_words(&node.heading) {
                push(&word);
            }
        }
    }

    anchors.into_values().take(MAX_DISCOURSE_ANCHORS).collect()
}

fn long_words(text: &str) -> Vec<String> {
    text.split(|c: char| !c.is_alphanumeric() && c != '-')
        .map(|w| w.trim_matches('-').to_lowercase())
        .filter(|w| w.chars().count() > ANCHOR_WORD_MIN_LEN)
        .collect()
}

/// Snippet format implied by the title, if any
#[must_use]
pub fn snippet_target(title: &str) -> Option<SnippetTarget> {
    let title = title.to_lowercase();
    if title.contains("what is") || title.contains("what are") {
        Some(SnippetTarget::Paragraph)
    } else if title.contains("how to") || title.contains("steps") {
        Some(SnippetTarget::List)
    } else if title.contains(" vs ") || title.contains(" vs. ") || title.contains("comparison") {
        Some(SnippetTarget::Table)
    } else {
        None
    }
}

fn round_to(value: f64, decimals: i32) -> f64 {
    let factor = 10f64.powi(decimals);
    (value * factor).round() / factor
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::OutlineNode;
    use pretty_assertions::assert_eq;

    fn doc() -> Vec<Section> {
        vec![
            Section::new(
                "s2",
                "Choosing a Frame",
                "Steel frames last. Steel frames flex. Steel frames rust. Steel frames are heavy. \
                 See [frame guide](/frames) and [frame guide](/frames-2).",
                2,
            ),
            Section::new(
                "s1",
                "Introduction",
                "This guide covers bikes, including frames, wheels, and brakes. Read on.",
                1,
            ),
            Section::new("s3", "Wheels", "Pick [Frame Guide](/frames) wheels carefully.", 3),
        ]
    }

    fn brief() -> Brief {
        Brief {
            title: "How to choose a touring bicycle".into(),
            outline: vec![OutlineNode::new("Introduction", 2), OutlineNode::new("Choosing Frames", 2)],
            ..Brief::default()
        }
    }

    fn business() -> BusinessInfo {
        BusinessInfo {
            seed_keyword: Some("Touring Bikes".into()),
            ..BusinessInfo::default()
        }
    }

    #[test]
    fn outline_is_sorted_and_counted() {
        let summary = summarize(&doc(), &brief(), &business());
        let orders: Vec<u32> = summary.outline.sections.iter().map(|e| e.order).collect();
        assert_eq!(orders, vec![1, 2, 3]);
        assert_eq!(summary.outline.section_count, 3);
        let expected: usize = doc().iter().map(Section::word_count).sum();
        assert_eq!(summary.outline.total_word_count, expected);
    }

    #[test]
    fn coverage_sums_to_hundred() {
        let summary = summarize(&doc(), &brief(), &business());
        let total: f64 = summary.coverage.iter().map(|c| c.percent).sum();
        assert!((total - 100.0).abs() < 0.5, "coverage total {total}");
    }

    #[test]
    fn overused_terms_need_frequency_and_length() {
        let summary = summarize(&doc(), &brief(), &business());
        let terms: Vec<&str> = summary
            .vocabulary
            .overused_terms
            .iter()
            .map(|t| t.term.as_str())
            .collect();
        assert!(terms.contains(&"frames"));
        assert!(terms.contains(&"steel"));
        assert!(summary.vocabulary.type_token_ratio > 0.0);
        assert!(summary.vocabulary.type_token_ratio <= 1.0);
    }

    #[test]
    fn anchors_are_case_folded_and_counted() {
        let summary = summarize(&doc(), &brief(), &business());
        assert_eq!(summary.anchors.len(), 1);
        assert_eq!(
            summary.anchors[0],
            AnchorUsage {
                anchor: "frame guide".into(),
                first_section: "s2".into(),
                count: 3,
            }
        );
        assert_eq!(summary.repeated_anchors().count(), 1);
    }

    #[test]
    fn digests_carry_key_terms_and_last_sentence() {
        let summary = summarize(&doc(), &brief(), &business());
        let frame = summary.section_digests.iter().find(|d| d.order == 2).unwrap();
        assert_eq!(frame.key_terms[..2], ["steel".to_string(), "frames".to_string()]);
        assert_eq!(
            frame.trailing_sentence.as_deref(),
            Some("See frame guide and frame guide.")
        );
    }

    #[test]
    fn introduction_digest_previews_topics() {
        let summary = summarize(&doc(), &brief(), &business());
        let intro = summary.introduction.unwrap();
        assert!(intro.opening.starts_with("This guide covers bikes"));
        assert_eq!(intro.previewed_topics, vec!["frames", "wheels", "brakes"]);
    }

    #[test]
    fn discourse_anchors_start_with_seed() {
        let summary = summarize(&doc(), &brief(), &business());
        assert_eq!(
            summary.discourse_anchors,
            vec!["Touring Bikes", "choose", "touring", "bicycle", "introduction", "choosing", "frames"]
        );
    }

    #[test]
    fn section_headings_feed_anchors_without_outline() {
        let no_outline = Brief {
            outline: Vec::new(),
            ..brief()
        };
        let with_outline = summarize(&doc(), &brief(), &business());
        let without = summarize(&doc(), &no_outline, &business());
        assert!(!with_outline.discourse_anchors.contains(&"wheels".to_string()));
        assert!(without.discourse_anchors.contains(&"wheels".to_string()));
    }

    #[test]
    fn snippet_targets_follow_title_patterns() {
        assert_eq!(snippet_target("What is a derailleur?"), Some(SnippetTarget::Paragraph));
        assert_eq!(snippet_target("How to true a wheel"), Some(SnippetTarget::List));
        assert_eq!(snippet_target("7 steps to a faster ride"), Some(SnippetTarget::List));
        assert_eq!(snippet_target("Steel vs aluminium"), Some(SnippetTarget::Table));
        assert_eq!(snippet_target("A comparison of hubs"), Some(SnippetTarget::Table));
        assert_eq!(snippet_target("Bike fit basics"), None);
    }

    #[test]
    fn empty_document_is_safe() {
        let summary = summarize(&[], &Brief::default(), &BusinessInfo::default());
        assert_eq!(summary.outline.total_word_count, 0);
        assert!(summary.coverage.is_empty());
        assert_eq!(summary.vocabulary.type_token_ratio, 0.0);
        assert!(summary.introduction.is_none());
    }
}
