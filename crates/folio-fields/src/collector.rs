//! Per-pass field reducers and the generic dispatcher
//!
//! Each contributing pass has a pure function producing its [`FieldsDelta`]
//! from the current document. Passes without a handler contribute an empty
//! delta, which still records the pass in `passes_contributed`.

use crate::error::{FieldsError, FieldsResult};
use crate::event::{apply, FieldEvent, FieldsDelta};
use crate::fields::{HasPart, ImageField, OutlineSection, PartKind, ProgressiveFields};
use folio_content::text::truncate_chars;
use folio_content::{
    flatten_outline, markdown, ordered, render_markdown, Brief, BusinessInfo,
    ContentStructureExtractor, PatternExtractor, Section,
};

/// Minimum list items or table rows for a structured part
pub const MIN_PART_ITEMS: usize = 3;
/// Minimum question/answer pairs for an FAQ part
pub const MIN_FAQ_PAIRS: usize = 2;
/// Key takeaways and contextual vectors contributing keywords
pub const KEYWORD_SOURCE_LIMIT: usize = 5;
/// Entities kept
pub const MAX_ENTITIES: usize = 15;
/// Characters kept of the abstract
pub const ABSTRACT_CHARS: usize = 500;
/// Characters kept of a derived description
pub const DESCRIPTION_CHARS: usize = 160;

/// Document state a pass hands to the collector
#[derive(Debug, Clone, Copy)]
pub struct PassInputs<'a> {
    pub sections: &'a [Section],
    pub brief: &'a Brief,
    pub business: &'a BusinessInfo,
    /// Overall quality, 0-100, known once the final pass is evaluated
    pub quality_score: Option<f64>,
    pub readability_score: Option<f64>,
}

impl<'a> PassInputs<'a> {
    #[must_use]
    pub fn new(sections: &'a [Section], brief: &'a Brief, business: &'a BusinessInfo) -> Self {
        Self {
            sections,
            brief,
            business,
            quality_score: None,
            readability_score: None,
        }
    }

    #[must_use]
    pub fn with_scores(mut self, quality: Option<f64>, readability: Option<f64>) -> Self {
        self.quality_score = quality;
        self.readability_score = readability;
        self
    }

    fn content(&self) -> String {
        render_markdown(None, self.sections)
    }

    fn word_count(&self) -> usize {
        self.sections.iter().map(Section::word_count).sum()
    }
}

fn non_empty(value: Option<&str>) -> Option<String> {
    value
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
}

/// Pass 1: identity, description, initial word count and outline
#[must_use]
pub fn pass1_delta(inputs: &PassInputs<'_>) -> FieldsDelta {
    let content = inputs.content();

    let main_entity = markdown::headings(&content)
        .into_iter()
        .find(|h| h.level == 1 && !h.text.is_empty())
        .map(|h| h.text)
        .or_else(|| non_empty(Some(&inputs.brief.title)))
        .or_else(|| non_empty(inputs.business.seed_keyword.as_deref()));

    let headline = non_empty(Some(&inputs.brief.title)).or_else(|| main_entity.clone());

    let description = non_empty(inputs.brief.meta_description.as_deref()).or_else(|| {
        markdown::first_paragraph(&content).map(|p| truncate_chars(&p, DESCRIPTION_CHARS))
    });

    let outline = flatten_outline(&inputs.brief.outline);
    let sections = if outline.is_empty() {
        ordered(inputs.sections)
            .into_iter()
            .map(|s| OutlineSection {
                heading: s.heading.trim().to_string(),
                level: 2,
            })
            .collect()
    } else {
        outline
            .into_iter()
            .map(|node| OutlineSection {
                heading: node.heading.clone(),
                level: node.level,
            })
            .collect()
    };

    FieldsDelta {
        main_entity,
        headline,
        description,
        word_count: Some(inputs.word_count()),
        sections,
        ..FieldsDelta::default()
    }
}

/// Pass 3: structured parts detected in the content
#[must_use]
pub fn pass3_delta(extractor: &dyn ContentStructureExtractor, inputs: &PassInputs<'_>) -> FieldsDelta {
    let scan = extractor.scan(&inputs.content());
    let mut has_part = Vec::new();

    for list in scan.ordered_lists.iter().filter(|l| l.items.len() >= MIN_PART_ITEMS) {
        has_part.push(HasPart {
            kind: PartKind::HowTo,
            name: list.context.clone(),
            item_count: list.items.len(),
        });
    }
    for list in scan.unordered_lists.iter().filter(|l| l.items.len() >= MIN_PART_ITEMS) {
        has_part.push(HasPart {
            kind: PartKind::ItemList,
            name: list.context.clone(),
            item_count: list.items.len(),
        });
    }
    if scan.question_answers.len() >= MIN_FAQ_PAIRS {
        has_part.push(HasPart {
            kind: PartKind::FaqPage,
            name: None,
            item_count: scan.question_answers.len(),
        });
    }
    for table in scan.tables.iter().filter(|t| t.rows.len() >= MIN_PART_ITEMS) {
        has_part.push(HasPart {
            kind: PartKind::Table,
            name: table.context.clone(),
            item_count: table.rows.len(),
        });
    }

    tracing::debug!(parts = has_part.len(), "detected structured parts");
    FieldsDelta {
        has_part,
        ..FieldsDelta::default()
    }
}

/// Pass 4: images from the content and the brief
#[must_use]
pub fn pass4_delta(inputs: &PassInputs<'_>) -> FieldsDelta {
    let mut images: Vec<ImageField> = Vec::new();
    let mut push = |image: ImageField| {
        if !images.contains(&image) {
            images.push(image);
        }
    };

    for image in markdown::images(&inputs.content()) {
        push(ImageField {
            url: non_empty(Some(&image.url)),
            alt: non_empty(Some(&image.alt)),
            caption: non_empty(image.title.as_deref()),
        });
    }
    for visual in &inputs.brief.visual_semantics {
        let description = non_empty(Some(&visual.description));
        push(ImageField {
            url: non_empty(visual.url.as_deref()),
            alt: non_empty(visual.alt_text.as_deref()).or_else(|| description.clone()),
            caption: description,
        });
    }

    FieldsDelta {
        images,
        ..FieldsDelta::default()
    }
}

/// Pass 5: keywords from the brief and entities from the content
#[must_use]
pub fn pass5_delta(extractor: &dyn ContentStructureExtractor, inputs: &PassInputs<'_>) -> FieldsDelta {
    let brief = inputs.brief;
    let candidates = brief
        .target_keyword
        .iter()
        .map(String::as_str)
        .chain(brief.key_takeaways.iter().take(KEYWORD_SOURCE_LIMIT).map(String::as_str))
        .chain(
            brief
                .contextual_vectors
                .iter()
                .take(KEYWORD_SOURCE_LIMIT)
                .map(|v| v.subject_label.as_str()),
        );

    let mut keywords: Vec<String> = Vec::new();
    for candidate in candidates {
        let candidate = candidate.trim();
        if candidate.is_empty() {
            continue;
        }
        if !keywords.iter().any(|k| k.eq_ignore_ascii_case(candidate)) {
            keywords.push(candidate.to_string());
        }
    }

    FieldsDelta {
        keywords,
        entities: extractor.entities(&inputs.content(), MAX_ENTITIES),
        ..FieldsDelta::default()
    }
}

/// Pass 7: abstract from the introduction, or the first paragraph
#[must_use]
pub fn pass7_delta(inputs: &PassInputs<'_>) -> FieldsDelta {
    let from_intro = ordered(inputs.sections)
        .into_iter()
        .find(|s| s.looks_like_introduction())
        .map(|s| markdown::plain_text(&s.content))
        .filter(|text| !text.is_empty());

    let abstract_text = from_intro
        .or_else(|| markdown::first_paragraph(&inputs.content()))
        .map(|text| truncate_chars(&text, ABSTRACT_CHARS));

    FieldsDelta {
        abstract_text,
        ..FieldsDelta::default()
    }
}

/// Pass 8: scores and the final word count
#[must_use]
pub fn pass8_delta(inputs: &PassInputs<'_>) -> FieldsDelta {
    FieldsDelta {
        word_count: Some(inputs.word_count()),
        quality_score: inputs.quality_score,
        readability_score: inputs.readability_score,
        ..FieldsDelta::default()
    }
}

/// Delta for any pass; passes without a handler yield an empty delta
///
/// # Errors
/// Returns [`FieldsError::InvalidPass`] for pass 0.
pub fn delta_for_pass(
    extractor: &dyn ContentStructureExtractor,
    pass: u32,
    inputs: &PassInputs<'_>,
) -> FieldsResult<FieldsDelta> {
    let delta = match pass {
        0 => return Err(FieldsError::InvalidPass(pass)),
        1 => pass1_delta(inputs),
        3 => pass3_delta(extractor, inputs),
        4 => pass4_delta(inputs),
        5 => pass5_delta(extractor, inputs),
        7 => pass7_delta(inputs),
        8 => pass8_delta(inputs),
        _ => FieldsDelta::empty(),
    };
    Ok(delta)
}

/// Event recording what `pass` contributes
///
/// # Errors
/// Returns [`FieldsError::InvalidPass`] for pass 0.
pub fn event_for_pass(
    extractor: &dyn ContentStructureExtractor,
    pass: u32,
    inputs: &PassInputs<'_>,
) -> FieldsResult<FieldEvent> {
    let delta = delta_for_pass(extractor, pass, inputs)?;
    FieldEvent::new(pass, delta)
}

/// Merge what `pass` contributes onto `existing`, using a caller's extractor
///
/// # Errors
/// Returns [`FieldsError::InvalidPass`] for pass 0.
pub fn collect_with(
    extractor: &dyn ContentStructureExtractor,
    existing: ProgressiveFields,
    pass: u32,
    inputs: &PassInputs<'_>,
) -> FieldsResult<ProgressiveFields> {
    let event = event_for_pass(extractor, pass, inputs)?;
    tracing::debug!(pass, empty = event.delta().is_empty(), "collected progressive fields");
    Ok(apply(existing, &event))
}

/// Merge what `pass` contributes onto `existing`
///
/// # Errors
/// Returns [`FieldsError::InvalidPass`] for pass 0.
pub fn collect(
    existing: ProgressiveFields,
    pass: u32,
    inputs: &PassInputs<'_>,
) -> FieldsResult<ProgressiveFields> {
    collect_with(&PatternExtractor, existing, pass, inputs)
}

/// Reducer for pass 1
#[must_use]
pub fn collect_pass1(existing: ProgressiveFields, inputs: &PassInputs<'_>) -> ProgressiveFields {
    apply(existing, &FieldEvent::stamped(1, pass1_delta(inputs)))
}

/// Reducer for pass 3
#[must_use]
pub fn collect_pass3(existing: ProgressiveFields, inputs: &PassInputs<'_>) -> ProgressiveFields {
    apply(existing, &FieldEvent::stamped(3, pass3_delta(&PatternExtractor, inputs)))
}

/// Reducer for pass 4
#[must_use]
pub fn collect_pass4(existing: ProgressiveFields, inputs: &PassInputs<'_>) -> ProgressiveFields {
    apply(existing, &FieldEvent::stamped(4, pass4_delta(inputs)))
}

/// Reducer for pass 5
#[must_use]
pub fn collect_pass5(existing: ProgressiveFields, inputs: &PassInputs<'_>) -> ProgressiveFields {
    apply(existing, &FieldEvent::stamped(5, pass5_delta(&PatternExtractor, inputs)))
}

/// Reducer for pass 7
#[must_use]
pub fn collect_pass7(existing: ProgressiveFields, inputs: &PassInputs<'_>) -> ProgressiveFields {
    apply(existing, &FieldEvent::stamped(7, pass7_delta(inputs)))
}

/// Reducer for pass 8, which also replaces the word count
#[must_use]
pub fn collect_pass8(existing: ProgressiveFields, inputs: &PassInputs<'_>) -> ProgressiveFields {
    apply(existing, &FieldEvent::stamped(8, pass8_delta(inputs)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use folio_content::{ContextualVector, OutlineNode, VisualSemantic};
    use pretty_assertions::assert_eq;

    fn brief() -> Brief {
        Brief {
            title: "Road Bike Maintenance".into(),
            meta_description: Some("Keep a road bike running smoothly.".into()),
            target_keyword: Some("road bike maintenance".into()),
            outline: vec![
                OutlineNode::new("Cleaning", 2).with_child(OutlineNode::new("Chain", 3)),
                OutlineNode::new("Brakes", 2),
            ],
            key_takeaways: vec!["Clean the chain".into(), "Road Bike Maintenance".into()],
            contextual_vectors: vec![ContextualVector {
                subject_label: "drivetrain".into(),
                heading: None,
            }],
            visual_semantics: vec![VisualSemantic {
                description: "Chain being cleaned".into(),
                alt_text: None,
                url: None,
            }],
        }
    }

    fn sections() -> Vec<Section> {
        vec![
            Section::new(
                "intro",
                "Introduction",
                "Regular care keeps a [road bike](/bikes) fast. ![Bike on stand](stand.png)",
                0,
            )
            .introduction(),
            Section::new(
                "steps",
                "Cleaning steps",
                "1. Remove the wheels\n2. Degrease the chain\n3. Rinse the frame\n\n- rag\n- brush\n- degreaser\n",
                1,
            ),
            Section::new(
                "faq",
                "Questions",
                "### How often should I clean the chain?\n\nEvery 300 km.\n\n### Do I need special tools?\n\nA brush is enough.\n",
                2,
            ),
        ]
    }

    #[test]
    fn pass1_sets_identity_and_outline() {
        let sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();
        let delta = pass1_delta(&PassInputs::new(&sections, &brief, &business));

        assert_eq!(delta.main_entity.as_deref(), Some("Road Bike Maintenance"));
        assert_eq!(delta.headline.as_deref(), Some("Road Bike Maintenance"));
        assert_eq!(delta.description.as_deref(), Some("Keep a road bike running smoothly."));
        assert!(delta.word_count.unwrap() > 20);
        let outline: Vec<(&str, u8)> = delta
            .sections
            .iter()
            .map(|s| (s.heading.as_str(), s.level))
            .collect();
        assert_eq!(outline, vec![("Cleaning", 2), ("Chain", 3), ("Brakes", 2)]);
    }

    #[test]
    fn pass1_prefers_h1_in_content() {
        let sections = vec![Section::new("a", "A", "# Gravel Bikes\n\nText body.", 0)];
        let brief = Brief::default();
        let business = BusinessInfo::default();
        let delta = pass1_delta(&PassInputs::new(&sections, &brief, &business));
        assert_eq!(delta.main_entity.as_deref(), Some("Gravel Bikes"));
        assert_eq!(delta.headline.as_deref(), Some("Gravel Bikes"));
        assert_eq!(delta.description.as_deref(), Some("Text body."));
    }

    #[test]
    fn pass3_detects_parts() {
        let sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();
        let delta = pass3_delta(&PatternExtractor, &PassInputs::new(&sections, &brief, &business));
        let kinds: Vec<PartKind> = delta.has_part.iter().map(|p| p.kind).collect();
        assert!(kinds.contains(&PartKind::HowTo));
        assert!(kinds.contains(&PartKind::ItemList));
        assert!(kinds.contains(&PartKind::FaqPage));
        assert!(!kinds.contains(&PartKind::Table));
    }

    #[test]
    fn pass4_merges_content_and_brief_images() {
        let sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();
        let delta = pass4_delta(&PassInputs::new(&sections, &brief, &business));
        assert_eq!(delta.images.len(), 2);
        assert_eq!(delta.images[0].url.as_deref(), Some("stand.png"));
        assert_eq!(delta.images[0].alt.as_deref(), Some("Bike on stand"));
        assert_eq!(delta.images[1].alt.as_deref(), Some("Chain being cleaned"));
    }

    #[test]
    fn pass5_dedupes_keywords() {
        let sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();
        let delta = pass5_delta(&PatternExtractor, &PassInputs::new(&sections, &brief, &business));
        assert_eq!(
            delta.keywords,
            vec!["road bike maintenance", "Clean the chain", "drivetrain"]
        );
        assert!(delta.entities.len() <= MAX_ENTITIES);
    }

    #[test]
    fn pass7_uses_introduction_plain_text() {
        let sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();
        let delta = pass7_delta(&PassInputs::new(&sections, &brief, &business));
        assert_eq!(delta.abstract_text.as_deref(), Some("Regular care keeps a road bike fast."));
    }

    #[test]
    fn unhandled_passes_only_mark_contribution() {
        let sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();
        let inputs = PassInputs::new(&sections, &brief, &business);
        for pass in [2, 6, 9] {
            assert!(delta_for_pass(&PatternExtractor, pass, &inputs).unwrap().is_empty());
        }
        let fields = collect(ProgressiveFields::new(), 2, &inputs).unwrap();
        assert_eq!(fields.passes_contributed, vec![2]);
        assert!(fields.updated_at.is_some());
        assert_eq!(
            collect(ProgressiveFields::new(), 0, &inputs).unwrap_err(),
            FieldsError::InvalidPass(0)
        );
    }

    #[test]
    fn full_run_is_complete_and_recounts_words() {
        let mut sections = sections();
        let brief = brief();
        let business = BusinessInfo::default();

        let mut fields = ProgressiveFields::new();
        for pass in 1..=7 {
            fields = collect(fields, pass, &PassInputs::new(&sections, &brief, &business)).unwrap();
        }
        let early_count = fields.word_count.unwrap();
        assert!(fields.is_complete());

        sections.push(Section::new("extra", "More", "one two three four five", 3));
        let inputs = PassInputs::new(&sections, &brief, &business).with_scores(Some(82.0), Some(64.5));
        let fields = collect_pass8(fields, &inputs);

        assert_eq!(fields.word_count, Some(early_count + 5));
        assert_eq!(fields.quality_score, Some(82.0));
        assert_eq!(fields.passes_contributed, (1..=8).collect::<Vec<u32>>());
    }
}
