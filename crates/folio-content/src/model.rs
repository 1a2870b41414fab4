//! Document model shared by every pass
//!
//! Sections carry markdown bodies; the [`Brief`] and [`BusinessInfo`] are the
//! inputs the job was started with and never change between passes.

use serde::{Deserialize, Serialize};

/// One section of the document being generated
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Section {
    /// Stable section key
    pub id: String,
    /// Heading text without markdown markers
    pub heading: String,
    /// Markdown body
    pub content: String,
    /// Explicit position in the document
    pub order: u32,
    /// Set when the section is the document introduction
    #[serde(default)]
    pub is_introduction: bool,
}

impl Section {
    /// Create a section
    #[must_use]
    pub fn new(
        id: impl Into<String>,
        heading: impl Into<String>,
        content: impl Into<String>,
        order: u32,
    ) -> Self {
        Self {
            id: id.into(),
            heading: heading.into(),
            content: content.into(),
            order,
            is_introduction: false,
        }
    }

    /// Mark as introduction
    #[must_use]
    pub fn introduction(mut self) -> Self {
        self.is_introduction = true;
        self
    }

    /// Flagged or heading-matched introduction
    #[must_use]
    pub fn looks_like_introduction(&self) -> bool {
        if self.is_introduction {
            return true;
        }
        let heading = self.heading.trim().to_lowercase();
        heading == "intro" || heading.contains("introduction")
    }

    /// Whitespace-delimited word count of the body
    #[inline]
    #[must_use]
    pub fn word_count(&self) -> usize {
        self.content.split_whitespace().count()
    }
}

/// Sections sorted by their `order` field
#[must_use]
pub fn ordered(sections: &[Section]) -> Vec<&Section> {
    let mut sorted: Vec<&Section> = sections.iter().collect();
    sorted.sort_by_key(|s| s.order);
    sorted
}

/// Render sections as one markdown document
///
/// An H1 from `title` is emitted first when supplied; each section becomes
/// an H2 followed by its body.
#[must_use]
pub fn render_markdown(title: Option<&str>, sections: &[Section]) -> String {
    let mut out = String::new();
    if let Some(title) = title {
        out.push_str("# ");
        out.push_str(title.trim());
        out.push_str("\n\n");
    }
    for section in ordered(sections) {
        if !section.heading.trim().is_empty() {
            out.push_str("## ");
            out.push_str(section.heading.trim());
            out.push_str("\n\n");
        }
        let body = section.content.trim();
        if !body.is_empty() {
            out.push_str(body);
            out.push_str("\n\n");
        }
    }
    let trimmed = out.trim_end().len();
    out.truncate(trimmed);
    out.push('\n');
    out
}

/// Node of the brief's structured outline
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct OutlineNode {
    pub heading: String,
    pub level: u8,
    pub children: Vec<OutlineNode>,
}

impl OutlineNode {
    #[must_use]
    pub fn new(heading: impl Into<String>, level: u8) -> Self {
        Self {
            heading: heading.into(),
            level,
            children: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_child(mut self, child: OutlineNode) -> Self {
        self.children.push(child);
        self
    }
}

/// Depth-first, declared-order traversal of an outline
#[must_use]
pub fn flatten_outline(outline: &[OutlineNode]) -> Vec<&OutlineNode> {
    fn walk<'a>(nodes: &'a [OutlineNode], out: &mut Vec<&'a OutlineNode>) {
        for node in nodes {
            out.push(node);
            walk(&node.children, out);
        }
    }
    let mut out = Vec::new();
    walk(outline, &mut out);
    out
}

/// A semantic cluster the brief asks the document to cover
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ContextualVector {
    pub subject_label: String,
    pub heading: Option<String>,
}

/// An image the brief declares for the document
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct VisualSemantic {
    pub description: String,
    pub alt_text: Option<String>,
    pub url: Option<String>,
}

/// Content brief the job was started with
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct Brief {
    pub title: String,
    pub meta_description: Option<String>,
    pub target_keyword: Option<String>,
    pub outline: Vec<OutlineNode>,
    pub key_takeaways: Vec<String>,
    pub contextual_vectors: Vec<ContextualVector>,
    pub visual_semantics: Vec<VisualSemantic>,
}

impl Brief {
    /// Brief with only a title
    #[must_use]
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            ..Self::default()
        }
    }
}

/// Business context of the site the document is written for
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BusinessInfo {
    /// Central entity the site is about
    pub seed_keyword: Option<String>,
    pub brand_name: Option<String>,
    pub domain: Option<String>,
    pub language: Option<String>,
}
