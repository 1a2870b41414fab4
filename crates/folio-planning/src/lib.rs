//! Folio Planning
//!
//! Decisions taken once, before the first pass: how deep the document
//! should go and which macro-structure it should follow.
//!
//! # Core Concepts
//!
//! - [`suggest`]: weighted depth score mapped onto a preset
//! - [`apply_user_choice`]: preset or custom override of a suggestion
//! - [`select`]: rule-ordered template routing with confidence and alternatives
//!
//! Unknown inputs never fail; they fall back to neutral scores and the
//! [`Template::Definitional`] template.
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_planning::{select, suggest, DepthInput, TemplateInput, WebsiteType};
//!
//! let depth = suggest(&DepthInput { competitor_word_counts: vec![1800, 2400], ..Default::default() });
//! let template = select(&TemplateInput { website_type: WebsiteType::Blog, ..Default::default() });
//! println!("{} sections, {}", depth.settings.max_sections, template.template);
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod depth;
mod error;
mod signals;
mod template;

pub use depth::{
    apply_user_choice, suggest, CompetitorBenchmark, CustomSettings, DepthChoice, DepthInput,
    DepthMode, DepthSettings, DepthSuggestion, SectionDepth, WordRange, AUTHORITY_WEIGHT,
    COMPETITOR_WEIGHT, HIGH_QUALITY_THRESHOLD, INTENT_WEIGHT, MODERATE_THRESHOLD, SERP_WEIGHT,
    TOPIC_WEIGHT,
};
pub use error::PlanningError;
pub use signals::{QueryIntent, SerpDifficulty, TopicType};
pub use template::{
    query_type_suggestion, select, Alternative, BriefHints, CompetitorAnalysis, Template,
    TemplateInput, TemplateSelection, WebsiteType, POPULAR_TEMPLATES,
};

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
