//! Markdown scanning via pulldown-cmark
//!
//! Extracts the pieces the summary, collector and validator need: headings
//! with their source lines, links, images and a plain-text rendering.

use pulldown_cmark::{Event, Options, Parser as MdParser, Tag, TagEnd};
use serde::{Deserialize, Serialize};

/// Heading found in a markdown body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Heading {
    /// Level 1-6
    pub level: u8,
    pub text: String,
    /// 1-indexed source line
    pub line: usize,
}

/// Inline link
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Link {
    pub text: String,
    pub url: String,
}

/// Inline image
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub alt: String,
    pub url: String,
    pub title: Option<String>,
}

fn parser(content: &str) -> MdParser<'_> {
    MdParser::new_ext(content, Options::ENABLE_TABLES | Options::ENABLE_STRIKETHROUGH)
}

fn line_of(content: &str, offset: usize) -> usize {
    content[..offset.min(content.len())].matches('\n').count() + 1
}

/// All headings in document order
#[must_use]
pub fn headings(content: &str) -> Vec<Heading> {
    let mut out = Vec::new();
    let mut current: Option<Heading> = None;

    for (event, range) in parser(content).into_offset_iter() {
        match event {
            Event::Start(Tag::Heading { level, .. }) => {
                current = Some(Heading {
                    level: level as u8,
                    text: String::new(),
                    line: line_of(content, range.start),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(ref mut heading) = current {
                    heading.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Heading(_)) => {
                if let Some(mut heading) = current.take() {
                    heading.text = heading.text.trim().to_string();
                    out.push(heading);
                }
            }
            _ => {}
        }
    }
    out
}

/// All inline links, with their visible text
#[must_use]
pub fn links(content: &str) -> Vec<Link> {
    let mut out = Vec::new();
    let mut current: Option<Link> = None;

    for event in parser(content) {
        match event {
            Event::Start(Tag::Link { dest_url, .. }) => {
                current = Some(Link {
                    text: String::new(),
                    url: dest_url.to_string(),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(ref mut link) = current {
                    link.text.push_str(&text);
                }
            }
            Event::End(TagEnd::Link) => {
                if let Some(link) = current.take() {
                    out.push(link);
                }
            }
            _ => {}
        }
    }
    out
}

/// All inline images, with alt text collected from the image label
#[must_use]
pub fn images(content: &str) -> Vec<Image> {
    let mut out = Vec::new();
    let mut current: Option<Image> = None;

    for event in parser(content) {
        match event {
            Event::Start(Tag::Image {
                dest_url, title, ..
            }) => {
                current = Some(Image {
                    alt: String::new(),
                    url: dest_url.to_string(),
                    title: (!title.is_empty()).then(|| title.to_string()),
                });
            }
            Event::Text(text) | Event::Code(text) => {
                if let Some(ref mut image) = current {
                    image.alt.push_str(&text);
                }
            }
            Event::End(TagEnd::Image) => {
                if let Some(image) = current.take() {
                    out.push(image);
                }
            }
            _ => {}
        }
    }
    out
}

/// Text content with links flattened to their text and images dropped
///
/// Block boundaries become single newlines; headings are kept as text.
#[must_use]
pub fn plain_text(content: &str) -> String {
    let mut out = String::new();
    let mut image_depth = 0usize;

    for event in parser(content) {
        match event {
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) if image_depth == 0 => out.push_str(&text),
            Event::SoftBreak | Event::HardBreak if image_depth == 0 => out.push(' '),
            Event::End(
                TagEnd::Paragraph | TagEnd::Heading(_) | TagEnd::Item | TagEnd::TableRow,
            ) => {
                if !out.ends_with('\n') {
                    out.push('\n');
                }
            }
            _ => {}
        }
    }
    out.trim().to_string()
}

/// First paragraph that is not a heading, as plain text
#[must_use]
pub fn first_paragraph(content: &str) -> Option<String> {
    let mut in_paragraph = false;
    let mut image_depth = 0usize;
    let mut buf = String::new();

    for event in parser(content) {
        match event {
            Event::Start(Tag::Paragraph) => {
                in_paragraph = true;
                buf.clear();
            }
            Event::Start(Tag::Image { .. }) => image_depth += 1,
            Event::End(TagEnd::Image) => image_depth = image_depth.saturating_sub(1),
            Event::Text(text) | Event::Code(text) if in_paragraph && image_depth == 0 => {
                buf.push_str(&text);
            }
            Event::SoftBreak | Event::HardBreak if in_paragraph => buf.push(' '),
            Event::End(TagEnd::Paragraph) => {
                in_paragraph = false;
                let trimmed = buf.trim();
                if !trimmed.is_empty() {
                    return Some(trimmed.to_string());
                }
            }
            _ => {}
        }
    }
    None
}
