//! Pre-publish validation
//!
//! Final gate before export: repeated headings, paragraphs and images,
//! leftover placeholders and H1 placement. The auto-fix path removes
//! duplicate sections and paragraphs and reports every removal.

use crate::markdown;
use crate::text::{fingerprint, truncate_chars};
use indexmap::IndexMap;
use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};

/// Minimum paragraph length checked for duplicates
pub const DUPLICATE_PARAGRAPH_MIN_CHARS: usize = 100;
/// Fingerprint length for paragraph comparison
pub const PARAGRAPH_FINGERPRINT_CHARS: usize = 200;
/// Fingerprint length for section comparison during auto-fix
pub const SECTION_FINGERPRINT_CHARS: usize = 500;
/// Minimum paragraph length removed during auto-fix
pub const DEDUP_PARAGRAPH_MIN_CHARS: usize = 150;

static SUBHEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^(#{2,4})\s+(.+?)\s*#*\s*$").unwrap());
static H1_LINE: Lazy<Regex> = Lazy::new(|| Regex::new(r"^#\s+\S").unwrap());
static PLACEHOLDER: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\[(?:IMAGE|TODO|PLACEHOLDER|INSERT):[^\]]*\]|\{\{[^}]*\}\}").unwrap()
});
static ATX_HEADING: Lazy<Regex> = Lazy::new(|| Regex::new(r"^\s{0,3}#{1,6}\s+\S").unwrap());

/// Validation switches
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ValidateOptions {
    /// Produce `fixed_content` with duplicates removed
    pub auto_fix: bool,
    /// When auto-fixing, also normalize the H1 to this title
    pub title: Option<String>,
}

/// Issue category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum IssueKind {
    DuplicateHeading,
    DuplicateParagraph,
    DuplicateImage,
    Placeholder,
    MultipleH1,
    MisplacedH1,
}

/// Whether an issue blocks export on its own
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// One finding
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationIssue {
    pub kind: IssueKind,
    pub severity: IssueSeverity,
    pub message: String,
    /// 1-indexed lines involved
    pub lines: Vec<usize>,
}

/// Heading text repeated across the document
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateHeading {
    pub text: String,
    pub lines: Vec<usize>,
}

/// Paragraph whose fingerprint recurs
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateParagraph {
    /// Start of the fingerprint, for display
    pub preview: String,
    pub occurrences: usize,
    pub lines: Vec<usize>,
}

/// Image alt text used more than once
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateImage {
    pub alt: String,
    pub occurrences: usize,
}

/// All duplicate findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DuplicateReport {
    pub headings: Vec<DuplicateHeading>,
    pub paragraphs: Vec<DuplicateParagraph>,
    pub images: Vec<DuplicateImage>,
}

impl DuplicateReport {
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.headings.is_empty() && self.paragraphs.is_empty() && self.images.is_empty()
    }

    #[must_use]
    pub fn total(&self) -> usize {
        self.headings.len() + self.paragraphs.len() + self.images.len()
    }
}

/// An unresolved placeholder token
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Placeholder {
    pub token: String,
    pub line: usize,
}

/// Placeholder findings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaceholderReport {
    pub placeholders: Vec<Placeholder>,
}

impl PlaceholderReport {
    #[inline]
    #[must_use]
    pub fn count(&self) -> usize {
        self.placeholders.len()
    }
}

/// H1 placement
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct H1Report {
    pub count: usize,
    pub lines: Vec<usize>,
    /// The single H1 is the first non-blank line
    pub at_start: bool,
}

/// Outcome of [`validate`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ValidationReport {
    /// No blocking issue was found
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
    pub duplicate_report: DuplicateReport,
    pub placeholder_report: PlaceholderReport,
    pub h1_report: H1Report,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_content: Option<String>,
    pub fix_log: Vec<String>,
    pub removed_count: usize,
}

/// Result of [`deduplicate_content`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DedupOutcome {
    pub content: String,
    pub fix_log: Vec<String>,
    pub removed_count: usize,
}

/// Validate final markdown content
#[must_use]
pub fn validate(content: &str, options: &ValidateOptions) -> ValidationReport {
    let duplicate_report = DuplicateReport {
        headings: duplicate_headings(content),
        paragraphs: duplicate_paragraphs(content),
        images: duplicate_images(content),
    };
    let placeholder_report = find_placeholders(content);
    let h1_report = h1_report(content);

    let mut issues = Vec::new();
    for dup in &duplicate_report.headings {
        issues.push(ValidationIssue {
            kind: IssueKind::DuplicateHeading,
            severity: IssueSeverity::Warning,
            message: format!("heading \"{}\" appears {} times", dup.text, dup.lines.len()),
            lines: dup.lines.clone(),
        });
    }
    for dup in &duplicate_report.paragraphs {
        issues.push(ValidationIssue {
            kind: IssueKind::DuplicateParagraph,
            severity: IssueSeverity::Warning,
            message: format!(
                "paragraph \"{}...\" appears {} times",
                truncate_chars(&dup.preview, 60),
                dup.occurrences
            ),
            lines: dup.lines.clone(),
        });
    }
    for dup in &duplicate_report.images {
        issues.push(ValidationIssue {
            kind: IssueKind::DuplicateImage,
            severity: IssueSeverity::Warning,
            message: format!("image alt \"{}\" used {} times", dup.alt, dup.occurrences),
            lines: Vec::new(),
        });
    }
    for placeholder in &placeholder_report.placeholders {
        issues.push(ValidationIssue {
            kind: IssueKind::Placeholder,
            severity: IssueSeverity::Error,
            message: format!("unresolved placeholder {}", placeholder.token),
            lines: vec![placeholder.line],
        });
    }
    if h1_report.count > 1 {
        issues.push(ValidationIssue {
            kind: IssueKind::MultipleH1,
            severity: IssueSeverity::Error,
            message: format!("{} H1 headings, expected at most one", h1_report.count),
            lines: h1_report.lines.clone(),
        });
    } else if h1_report.count == 1 && !h1_report.at_start {
        issues.push(ValidationIssue {
            kind: IssueKind::MisplacedH1,
            severity: IssueSeverity::Error,
            message: "H1 is not at the start of the document".to_string(),
            lines: h1_report.lines.clone(),
        });
    }

    let valid = duplicate_report.is_empty()
        && !issues.iter().any(|i| i.severity == IssueSeverity::Error);

    let (fixed_content, fix_log, removed_count) = if options.auto_fix {
        let outcome = deduplicate_content(content);
        let mut fix_log = outcome.fix_log;
        let mut fixed = outcome.content;
        if let Some(title) = options.title.as_deref() {
            let normalized = normalize_h1(&fixed, title);
            if normalized != fixed {
                fix_log.push(format!("normalized H1 to \"{}\"", title.trim()));
                fixed = normalized;
            }
        }
        (Some(fixed), fix_log, outcome.removed_count)
    } else {
        (None, Vec::new(), 0)
    };

    tracing::info!(
        valid,
        issues = issues.len(),
        duplicates = duplicate_report.total(),
        placeholders = placeholder_report.count(),
        removed = removed_count,
        "pre-publish validation finished"
    );

    ValidationReport {
        valid,
        issues,
        duplicate_report,
        placeholder_report,
        h1_report,
        fixed_content,
        fix_log,
        removed_count,
    }
}

/// Lines outside fenced code blocks, 1-indexed
fn prose_lines(content: &str) -> impl Iterator<Item = (usize, &str)> {
    let mut in_fence = false;
    content.lines().enumerate().filter_map(move |(idx, line)| {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
            return None;
        }
        (!in_fence).then_some((idx + 1, line))
    })
}

fn duplicate_headings(content: &str) -> Vec<DuplicateHeading> {
    let mut seen: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (line_no, line) in prose_lines(content) {
        if let Some(caps) = SUBHEADING.captures(line) {
            let key = caps[2].trim().to_lowercase();
            seen.entry(key).or_default().push(line_no);
        }
    }
    seen.into_iter()
        .filter(|(_, lines)| lines.len() > 1)
        .map(|(text, lines)| DuplicateHeading { text, lines })
        .collect()
}

/// Blocks separated by blank lines or ATX headings, with their starting line
///
/// Each heading line is a block of its own.
fn paragraphs(content: &str) -> Vec<(usize, &str)> {
    fn flush<'a>(
        out: &mut Vec<(usize, &'a str)>,
        content: &'a str,
        block: Option<(usize, usize, usize)>,
    ) {
        if let Some((line, from, to)) = block {
            out.push((line, content[from..to].trim()));
        }
    }

    let mut out = Vec::new();
    let mut block: Option<(usize, usize, usize)> = None;
    let mut offset = 0;
    for (idx, raw) in content.split_inclusive('\n').enumerate() {
        let start = offset;
        offset += raw.len();
        let line = raw.trim_end_matches(['\n', '\r']);
        if line.trim().is_empty() {
            flush(&mut out, content, block.take());
        } else if ATX_HEADING.is_match(line) {
            flush(&mut out, content, block.take());
            out.push((idx + 1, line.trim()));
        } else {
            let end = start + line.len();
            match &mut block {
                Some((_, _, to)) => *to = end,
                None => block = Some((idx + 1, start, end)),
            }
        }
    }
    flush(&mut out, content, block);
    out
}

fn is_heading_block(block: &str) -> bool {
    ATX_HEADING.is_match(block)
}

fn duplicate_paragraphs(content: &str) -> Vec<DuplicateParagraph> {
    let mut seen: IndexMap<String, Vec<usize>> = IndexMap::new();
    for (line, paragraph) in paragraphs(content) {
        if is_heading_block(paragraph) || paragraph.chars().count() <= DUPLICATE_PARAGRAPH_MIN_CHARS {
            continue;
        }
        let key = fingerprint(paragraph, PARAGRAPH_FINGERPRINT_CHARS);
        seen.entry(key).or_default().push(line);
    }
    seen.into_iter()
        .filter(|(_, lines)| lines.len() > 1)
        .map(|(preview, lines)| DuplicateParagraph {
            preview: truncate_chars(&preview, 80),
            occurrences: lines.len(),
            lines,
        })
        .collect()
}

fn duplicate_images(content: &str) -> Vec<DuplicateImage> {
    let mut seen: IndexMap<String, usize> = IndexMap::new();
    for image in markdown::images(content) {
        let alt = image.alt.trim().to_string();
        if !alt.is_empty() {
            *seen.entry(alt).or_default() += 1;
        }
    }
    seen.into_iter()
        .filter(|(_, count)| *count > 1)
        .map(|(alt, occurrences)| DuplicateImage { alt, occurrences })
        .collect()
}

fn find_placeholders(content: &str) -> PlaceholderReport {
    let placeholders = content
        .lines()
        .enumerate()
        .flat_map(|(idx, line)| {
            PLACEHOLDER.find_iter(line).map(move |m| Placeholder {
                token: m.as_str().to_string(),
                line: idx + 1,
            })
        })
        .collect();
    PlaceholderReport { placeholders }
}

fn h1_report(content: &str) -> H1Report {
    let lines: Vec<usize> = prose_lines(content)
        .filter(|(_, line)| H1_LINE.is_match(line))
        .map(|(n, _)| n)
        .collect();
    let first_content_line = content
        .lines()
        .position(|l| !l.trim().is_empty())
        .map(|idx| idx + 1);
    H1Report {
        count: lines.len(),
        at_start: lines.len() == 1 && lines.first().copied() == first_content_line,
        lines,
    }
}

/// Replace every H1 with a single H1 built from `title` at the top
#[must_use]
pub fn normalize_h1(content: &str, title: &str) -> String {
    let h1_lines: Vec<usize> = prose_lines(content)
        .filter(|(_, line)| H1_LINE.is_match(line))
        .map(|(n, _)| n)
        .collect();
    let body: Vec<&str> = content
        .lines()
        .enumerate()
        .filter(|(idx, _)| !h1_lines.contains(&(idx + 1)))
        .map(|(_, line)| line)
        .collect();
    let body = body.join("\n");
    let body = body.trim_start_matches(['\n', ' ', '\t', '\r']);

    let mut out = format!("# {}\n", title.trim());
    if !body.is_empty() {
        out.push('\n');
        out.push_str(body);
        if !out.ends_with('\n') {
            out.push('\n');
        }
    }
    out
}

struct DocSection<'a> {
    heading: Option<&'a str>,
    body: String,
}

fn split_h2_sections(content: &str) -> Vec<DocSection<'_>> {
    let mut sections = vec![DocSection {
        heading: None,
        body: String::new(),
    }];
    let mut in_fence = false;
    for line in content.lines() {
        let trimmed = line.trim_start();
        if trimmed.starts_with("```") || trimmed.starts_with("~~~") {
            in_fence = !in_fence;
        }
        if !in_fence && line.starts_with("## ") {
            sections.push(DocSection {
                heading: Some(line),
                body: String::new(),
            });
            continue;
        }
        if let Some(current) = sections.last_mut() {
            current.body.push_str(line);
            current.body.push('\n');
        }
    }
    sections
}

fn heading_label(heading: Option<&str>) -> String {
    heading.map_or_else(
        || "preamble".to_string(),
        |h| h.trim_start_matches('#').trim().to_string(),
    )
}

/// Remove repeated sections, then repeated paragraphs within each section
///
/// Sections are split on H2 boundaries and compared by a 500-character
/// fingerprint of their body; later repeats are dropped. Within each
/// surviving section, paragraphs over 150 characters whose fingerprint
/// repeats are dropped. Passes repeat until nothing more is removed, so the
/// output is stable under a second run. Content with nothing to remove is
/// returned as is.
#[must_use]
pub fn deduplicate_content(content: &str) -> DedupOutcome {
    let mut current = content.to_string();
    let mut fix_log = Vec::new();
    let mut removed_count = 0;
    loop {
        let (next, removed) = dedup_pass(&current, &mut fix_log);
        if removed == 0 {
            break;
        }
        removed_count += removed;
        current = next;
    }
    DedupOutcome {
        content: current,
        fix_log,
        removed_count,
    }
}

fn dedup_pass(content: &str, fix_log: &mut Vec<String>) -> (String, usize) {
    let mut removed_count = 0;

    let mut seen_sections: IndexMap<String, String> = IndexMap::new();
    let mut kept: Vec<DocSection<'_>> = Vec::new();
    for section in split_h2_sections(content) {
        let key = fingerprint(&section.body, SECTION_FINGERPRINT_CHARS);
        if section.heading.is_some() && !key.is_empty() {
            if let Some(original) = seen_sections.get(&key) {
                let label = heading_label(section.heading);
                tracing::debug!(section = %label, original = %original, "removing duplicate section");
                fix_log.push(format!(
                    "removed section \"{label}\" (duplicate of \"{original}\")"
                ));
                removed_count += 1;
                continue;
            }
            seen_sections.insert(key, heading_label(section.heading));
        }
        kept.push(section);
    }

    let mut out = String::with_capacity(content.len());
    for section in &kept {
        let label = heading_label(section.heading);
        let mut seen_paragraphs: Vec<String> = Vec::new();
        let mut paragraphs_out: Vec<&str> = Vec::new();
        let mut section_changed = false;

        for (_, paragraph) in paragraphs(&section.body) {
            if !is_heading_block(paragraph) && paragraph.chars().count() > DEDUP_PARAGRAPH_MIN_CHARS {
                let key = fingerprint(paragraph, PARAGRAPH_FINGERPRINT_CHARS);
                if seen_paragraphs.contains(&key) {
                    tracing::debug!(section = %label, "removing duplicate paragraph");
                    fix_log.push(format!(
                        "removed duplicate paragraph in \"{label}\": \"{}...\"",
                        truncate_chars(paragraph, 60)
                    ));
                    removed_count += 1;
                    section_changed = true;
                    continue;
                }
                seen_paragraphs.push(key);
            }
            paragraphs_out.push(paragraph);
        }

        if let Some(heading) = section.heading {
            out.push_str(heading);
            out.push('\n');
        }
        if section_changed {
            let body = section.body.as_str();
            let lead = body.len() - body.trim_start_matches('\n').len();
            let trail = body.len() - body.trim_end_matches('\n').len();
            out.push_str(&"\n".repeat(lead));
            out.push_str(&paragraphs_out.join("\n\n"));
            out.push_str(&"\n".repeat(trail.max(1)));
        } else {
            out.push_str(&section.body);
        }
    }

    if removed_count == 0 {
        return (content.to_string(), 0);
    }
    if !content.ends_with('\n') && out.ends_with('\n') {
        out.pop();
    }
    (out, removed_count)
}
