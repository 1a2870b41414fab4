//! Content structure detection
//!
//! Lists, tables, question/answer pairs, named entities and previewed topics
//! are inferred with line patterns. The heuristics sit behind
//! [`ContentStructureExtractor`] so another language's rules can be swapped in
//! without touching the summary compiler or the field collector.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

/// A question heading followed by its answer text
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QuestionAnswer {
    pub question: String,
    pub answer: String,
}

/// A contiguous list block
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ListBlock {
    /// Nearest heading above the list, if any
    pub context: Option<String>,
    pub items: Vec<String>,
}

/// A contiguous pipe-delimited table
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TableBlock {
    pub context: Option<String>,
    /// Data and header rows; separator rows are not counted
    pub rows: Vec<Vec<String>>,
}

/// Everything a structure scan found
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StructureScan {
    pub ordered_lists: Vec<ListBlock>,
    pub unordered_lists: Vec<ListBlock>,
    pub question_answers: Vec<QuestionAnswer>,
    pub tables: Vec<TableBlock>,
}

/// Replaceable structure heuristics
pub trait ContentStructureExtractor: Send + Sync {
    /// Detect lists, tables and question/answer pairs
    fn scan(&self, content: &str) -> StructureScan;

    /// Named entities, most specific first, at most `limit`
    fn entities(&self, content: &str, limit: usize) -> Vec<String>;

    /// Sub-topics an introduction announces, at most `limit`
    fn previewed_topics(&self, intro: &str, limit: usize) -> Vec<String>;
}

static ORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*\d+[.)]\s+(.+)$").unwrap());
static UNORDERED_ITEM: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s*[-*+]\s+(.+)$").unwrap());
static HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s{0,3}(#{1,6})\s+(.+?)\s*#*\s*$").unwrap());
static TABLE_SEPARATOR: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\|?\s*:?-{2,}:?\s*(\|\s*:?-{2,}:?\s*)*\|?$").unwrap());
static MULTI_WORD_PROPER: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\b[A-Z][a-zA-Z]+(?:\s+[A-Z][a-zA-Z]+)+\b").unwrap());
static SINGLE_PROPER: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b[A-Z][a-zA-Z]{2,}\b").unwrap());
static INCLUDING: Lazy<Regex> = Lazy::new(|| Regex::new(r"(?i)\bincluding\s+([^.;:!?]+)").unwrap());
static MARKDOWN_NOISE: Lazy<Regex> = Lazy::new(|| Regex::new(r"[*_`]|!\[[^\]]*\]\([^)]*\)").unwrap());
static LINK: Lazy<Regex> = Lazy::new(|| Regex::new(r"\[([^\]]+)\]\([^)]*\)").unwrap());

/// Capitalized words that are not entities on their own
pub const COMMON_CAPITALIZED: &[&str] = &[
    "A", "An", "And", "As", "At", "But", "By", "Can", "Do", "Does", "Each", "Every", "For", "From",
    "Here", "How", "However", "If", "In", "Is", "It", "Its", "Many", "Most", "No", "Not", "Of",
    "On", "Once", "Or", "Our", "Some", "Step", "Steps", "That", "The", "Their", "Then", "There",
    "These", "They", "This", "Those", "To", "Use", "Using", "We", "What", "When", "Where",
    "Which", "While", "Who", "Why", "With", "You", "Your", "Introduction", "Conclusion",
    "Summary", "Overview", "First", "Second", "Third", "Finally", "Next", "Also", "Yes",
];

static COMMON_SET: Lazy<HashSet<&'static str>> =
    Lazy::new(|| COMMON_CAPITALIZED.iter().copied().collect());

fn clean_inline(text: &str) -> String {
    let flattened = LINK.replace_all(text, "$1");
    MARKDOWN_NOISE.replace_all(&flattened, "").trim().to_string()
}

/// Line-pattern heuristics for English markdown
#[derive(Debug, Clone, Copy, Default)]
pub struct PatternExtractor;

impl PatternExtractor {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[derive(Clone, Copy, PartialEq, Eq)]
enum Block {
    None,
    Ordered,
    Unordered,
    Table,
}

struct ScanState {
    scan: StructureScan,
    block: Block,
    items: Vec<String>,
    rows: Vec<Vec<String>>,
    heading: Option<String>,
    question: Option<String>,
    answer: Vec<String>,
}

impl ScanState {
    fn close_block(&mut self) {
        let context = self.heading.clone();
        match self.block {
            Block::Ordered if !self.items.is_empty() => self.scan.ordered_lists.push(ListBlock {
                context,
                items: std::mem::take(&mut self.items),
            }),
            Block::Unordered if !self.items.is_empty() => {
                self.scan.unordered_lists.push(ListBlock {
                    context,
                    items: std::mem::take(&mut self.items),
                });
            }
            Block::Table if !self.rows.is_empty() => self.scan.tables.push(TableBlock {
                context,
                rows: std::mem::take(&mut self.rows),
            }),
            _ => {}
        }
        self.items.clear();
        self.rows.clear();
        self.block = Block::None;
    }

    fn close_question(&mut self) {
        if let Some(question) = self.question.take() {
            let answer = self.answer.join(" ").trim().to_string();
            if !answer.is_empty() {
                self.scan
                    .question_answers
                    .push(QuestionAnswer { question, answer });
            }
        }
        self.answer.clear();
    }

    fn switch_to(&mut self, block: Block) {
        if self.block != block {
            self.close_block();
            self.block = block;
        }
    }
}

impl ContentStructureExtractor for PatternExtractor {
    fn scan(&self, content: &str) -> StructureScan {
        let mut state = ScanState {
            scan: StructureScan::default(),
            block: Block::None,
            items: Vec::new(),
            rows: Vec::new(),
            heading: None,
            question: None,
            answer: Vec::new(),
        };
        let mut in_fence = false;

        for line in content.lines() {
            let trimmed = line.trim();
            if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
                in_fence = !in_fence;
                continue;
            }
            if in_fence {
                continue;
            }

            if let Some(caps) = HEADING.captures(line) {
                state.close_block();
                state.close_question();
                let text = clean_inline(&caps[2]);
                if text.ends_with('?') {
                    state.question = Some(text.clone());
                }
                state.heading = Some(text);
                continue;
            }

            if trimmed.is_empty() {
                // blank lines end tables but not loose lists
                if state.block == Block::Table {
                    state.close_block();
                }
                continue;
            }

            if state.question.is_some() {
                state.answer.push(clean_inline(trimmed));
            }

            if let Some(caps) = ORDERED_ITEM.captures(line) {
                state.switch_to(Block::Ordered);
                state.items.push(clean_inline(&caps[1]));
            } else if let Some(caps) = UNORDERED_ITEM.captures(line) {
                state.switch_to(Block::Unordered);
                state.items.push(clean_inline(&caps[1]));
            } else if trimmed.starts_with('|') && trimmed.ends_with('|') && trimmed.len() > 1 {
                state.switch_to(Block::Table);
                if !TABLE_SEPARATOR.is_match(trimmed) {
                    let cells = trimmed
                        .trim_matches('|')
                        .split('|')
                        .map(|c| clean_inline(c.trim()))
                        .collect();
                    state.rows.push(cells);
                }
            } else {
                state.close_block();
            }
        }

        state.close_block();
        state.close_question();
        state.scan
    }

    fn entities(&self, content: &str, limit: usize) -> Vec<String> {
        let text: String = content
            .lines()
            .map(|l| HEADING.captures(l).map_or_else(|| clean_inline(l), |c| clean_inline(&c[2])))
            .collect::<Vec<_>>()
            .join("\n");

        let mut out: Vec<String> = Vec::new();
        let mut seen: HashSet<String> = HashSet::new();
        let mut covered: HashSet<String> = HashSet::new();

        for m in MULTI_WORD_PROPER.find_iter(&text) {
            let words: Vec<&str> = m
                .as_str()
                .split_whitespace()
                .skip_while(|w| COMMON_SET.contains(w))
                .collect();
            if words.len() < 2 {
                continue;
            }
            let phrase = words.join(" ");
            for word in &words {
                covered.insert((*word).to_string());
            }
            if seen.insert(phrase.to_lowercase()) {
                out.push(phrase);
            }
        }

        let mut counts: HashMap<&str, usize> = HashMap::new();
        let mut order: Vec<&str> = Vec::new();
        for m in SINGLE_PROPER.find_iter(&text) {
            let word = m.as_str();
            if COMMON_SET.contains(word) {
                continue;
            }
            let count = counts.entry(word).or_insert(0);
            if *count == 0 {
                order.push(word);
            }
            *count += 1;
        }
        for word in order {
            if counts.get(word).copied().unwrap_or(0) >= 2
                && !covered.contains(word)
                && seen.insert(word.to_lowercase())
            {
                out.push(word.to_string());
            }
        }

        out.truncate(limit);
        out
    }

    fn previewed_topics(&self, intro: &str, limit: usize) -> Vec<String> {
        let bullets: Vec<String> = intro
            .lines()
            .filter_map(|l| {
                UNORDERED_ITEM
                    .captures(l)
                    .or_else(|| ORDERED_ITEM.captures(l))
                    .map(|c| clean_inline(&c[1]))
            })
            .filter(|s| !s.is_empty())
            .take(limit)
            .collect();
        if !bullets.is_empty() {
            return bullets;
        }

        let Some(caps) = INCLUDING.captures(intro) else {
            return Vec::new();
        };
        clean_inline(&caps[1])
            .split(',')
            .flat_map(|part| part.split(" and "))
            .map(|item| item.trim().trim_start_matches("and ").trim().to_string())
            .filter(|item| !item.is_empty())
            .take(limit)
            .collect()
    }
}
