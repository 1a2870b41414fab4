//! The progressive fields record

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Structured content type a document part qualifies as
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PartKind {
    /// Ordered list with at least three steps
    HowTo,
    /// Unordered list with at least three items
    ItemList,
    /// At least two question headings with answers
    #[serde(rename = "FAQPage")]
    FaqPage,
    /// Table with at least three rows
    Table,
}

impl PartKind {
    /// schema.org type name
    #[must_use]
    pub const fn schema_type(self) -> &'static str {
        match self {
            Self::HowTo => "HowTo",
            Self::ItemList => "ItemList",
            Self::FaqPage => "FAQPage",
            Self::Table => "Table",
        }
    }
}

/// A detected structured part of the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HasPart {
    pub kind: PartKind,
    /// Nearest heading, when one precedes the block
    pub name: Option<String>,
    /// Steps, items, Q/A pairs or rows
    pub item_count: usize,
}

/// One entry of the flattened outline
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OutlineSection {
    pub heading: String,
    pub level: u8,
}

/// An image referenced by the content or declared in the brief
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ImageField {
    pub url: Option<String>,
    pub alt: Option<String>,
    pub caption: Option<String>,
}

/// Structured data accumulated pass by pass
///
/// Built only by folding [`FieldEvent`](crate::FieldEvent)s; see
/// [`FieldLog`](crate::FieldLog).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ProgressiveFields {
    pub main_entity: Option<String>,
    pub headline: Option<String>,
    pub description: Option<String>,
    pub word_count: Option<usize>,
    pub sections: Vec<OutlineSection>,
    pub has_part: Vec<HasPart>,
    pub images: Vec<ImageField>,
    pub keywords: Vec<String>,
    pub entities: Vec<String>,
    pub abstract_text: Option<String>,
    pub quality_score: Option<f64>,
    pub readability_score: Option<f64>,
    /// Pass numbers in the order they contributed
    pub passes_contributed: Vec<u32>,
    pub updated_at: Option<DateTime<Utc>>,
}

impl ProgressiveFields {
    /// Empty record for a new job
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Required fields not yet collected, by serialized name
    #[must_use]
    pub fn missing_required(&self) -> Vec<&'static str> {
        let mut missing = Vec::new();
        if self.main_entity.is_none() {
            missing.push("mainEntity");
        }
        if self.headline.is_none() {
            missing.push("headline");
        }
        if self.description.is_none() {
            missing.push("description");
        }
        if self.word_count.is_none() {
            missing.push("wordCount");
        }
        missing
    }

    /// Whether structured data can be emitted
    #[inline]
    #[must_use]
    pub fn is_complete(&self) -> bool {
        self.missing_required().is_empty()
    }

    /// Whether `pass` has contributed
    #[inline]
    #[must_use]
    pub fn has_pass(&self, pass: u32) -> bool {
        self.passes_contributed.contains(&pass)
    }
}

/// Free-function form of [`ProgressiveFields::is_complete`]
#[inline]
#[must_use]
pub fn is_complete(fields: &ProgressiveFields) -> bool {
    fields.is_complete()
}
