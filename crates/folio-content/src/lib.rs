//! Folio Content
//!
//! Document model and the two content passes every job depends on: the
//! holistic summary that stands in for the full document as pass context,
//! and the pre-publish validator that gates export.
//!
//! # Core Concepts
//!
//! - [`Section`], [`Brief`], [`BusinessInfo`]: the document and its inputs
//! - [`HolisticSummary`]: bounded-size digest rebuilt on every pass
//! - [`ContentStructureExtractor`]: lists, Q/A pairs, tables and entities
//! - [`ValidationReport`]: duplicates, placeholders and H1 placement
//! - [`readability_score`]: Flesch reading ease of the section bodies
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_content::{summarize, validate, Brief, BusinessInfo, Section, ValidateOptions};
//!
//! let sections = vec![Section::new("s1", "Introduction", body, 0).introduction()];
//! let summary = summarize(&sections, &Brief::titled("Bike care"), &BusinessInfo::default());
//! assert!(summary.serialized_len() < 8 * 1024);
//!
//! let report = validate(&markdown, &ValidateOptions { auto_fix: true, title: None });
//! if !report.valid {
//!     eprintln!("{:#?}", report.issues);
//! }
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod model;
mod readability;
mod structure;
mod summary;
mod validator;

pub mod markdown;
pub mod text;

pub use model::{
    flatten_outline, ordered, render_markdown, Brief, BusinessInfo, ContextualVector,
    OutlineNode, Section, VisualSemantic,
};
pub use readability::{readability_score, reading_ease, syllables};
pub use structure::{
    ContentStructureExtractor, ListBlock, PatternExtractor, QuestionAnswer, StructureScan,
    TableBlock, COMMON_CAPITALIZED,
};
pub use summary::{
    snippet_target, summarize, summarize_with, AnchorUsage, CoverageEntry, HolisticSummary,
    IntroductionDigest, OutlineEntry, SectionDigest, SnippetTarget, StructuralOutline, TermCount,
    VocabularyMetrics, INTRO_CHARS, KEY_TERMS_PER_SECTION, MAX_ANCHORS, MAX_DISCOURSE_ANCHORS,
    MAX_HEADING_CHARS, MAX_OVERUSED_TERMS, MAX_PREVIEW_ITEMS, MAX_SUMMARY_SECTIONS,
    TRAILING_SENTENCE_CHARS,
};
pub use validator::{
    deduplicate_content, normalize_h1, validate, DedupOutcome, DuplicateHeading,
    DuplicateImage, DuplicateParagraph, DuplicateReport, H1Report, IssueKind, IssueSeverity,
    Placeholder, PlaceholderReport, ValidateOptions, ValidationIssue, ValidationReport,
    DEDUP_PARAGRAPH_MIN_CHARS, DUPLICATE_PARAGRAPH_MIN_CHARS, PARAGRAPH_FINGERPRINT_CHARS,
    SECTION_FINGERPRINT_CHARS,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
