use folio_content::{
    summarize, Brief, BusinessInfo, OutlineNode, Section, MAX_ANCHORS, MAX_HEADING_CHARS,
    MAX_SUMMARY_SECTIONS,
};
use pretty_assertions::assert_eq;

fn section(i: usize) -> Section {
    let body = format!(
        "Part {i} covers wheel truing, spoke tension and rim inspection in detail. \
         Riders who check [spoke tension {i}](https://example.com/spokes/{i}) monthly avoid \
         most wheel failures. Compare with the [truing stand guide](https://example.com/stand) \
         before starting.\n\n\
         - Loosen the spoke nipple\n- Spin the wheel\n- Check the brake track\n\n\
         A well trued wheel rolls straighter, brakes more evenly and lasts longer on rough \
         roads. Section {i} ends with a recap of the inspection checklist."
    );
    let s = Section::new(format!("s{i}"), format!("Wheel maintenance step number {i} explained"), body, i as u32);
    if i == 0 {
        s.introduction()
    } else {
        s
    }
}

fn brief() -> Brief {
    Brief {
        title: "How to True a Bicycle Wheel".into(),
        outline: (0..12)
            .map(|i| OutlineNode::new(format!("Wheel maintenance step {i}"), 2))
            .collect(),
        ..Brief::default()
    }
}

fn business() -> BusinessInfo {
    BusinessInfo {
        seed_keyword: Some("bicycle wheel truing".into()),
        brand_name: Some("SpokeShop".into()),
        ..BusinessInfo::default()
    }
}

#[test]
fn summary_stays_small_as_document_grows() {
    let short: Vec<Section> = (0..6).map(section).collect();
    let long: Vec<Section> = (0..60).map(section).collect();

    let short_summary = summarize(&short, &brief(), &business());
    let long_summary = summarize(&long, &brief(), &business());

    assert!(short_summary.serialized_len() < 8 * 1024, "{}", short_summary.serialized_len());
    assert!(long_summary.serialized_len() < 8 * 1024, "{}", long_summary.serialized_len());

    // growth is bounded even though the document is ten times longer
    assert!(long_summary.serialized_len() < short_summary.serialized_len() * 3);
}

#[test]
fn long_documents_are_capped_but_counted() {
    let long: Vec<Section> = (0..60).map(section).collect();
    let summary = summarize(&long, &brief(), &business());

    assert_eq!(summary.outline.section_count, 60);
    assert_eq!(summary.outline.sections.len(), MAX_SUMMARY_SECTIONS);
    assert_eq!(summary.outline.omitted_sections, 50);
    assert_eq!(summary.section_digests.len(), MAX_SUMMARY_SECTIONS);
    assert_eq!(summary.anchors.len(), MAX_ANCHORS);

    // shared anchor text is counted across every section
    let stand = summary
        .anchors
        .iter()
        .find(|a| a.anchor == "truing stand guide")
        .unwrap();
    assert_eq!(stand.count, 60);
    assert_eq!(stand.first_section, "s0");
}

#[test]
fn summary_is_rebuilt_not_patched() {
    let mut sections: Vec<Section> = (0..4).map(section).collect();
    let before = summarize(&sections, &brief(), &business());

    sections[1].content = "Replaced body with a single sentence.".into();
    let after = summarize(&sections, &brief(), &business());

    assert!(after.outline.total_word_count < before.outline.total_word_count);
    assert_eq!(
        after.section_digests[1].trailing_sentence.as_deref(),
        Some("Replaced body with a single sentence.")
    );
    assert_eq!(summarize(&sections, &brief(), &business()), after);
}

#[test]
fn compact_json_matches_length() {
    let sections: Vec<Section> = (0..3).map(section).collect();
    let summary = summarize(&sections, &brief(), &business());
    let json = summary.to_compact_json().unwrap();
    assert_eq!(json.len(), summary.serialized_len());
    assert!(json.contains("\"discourseAnchors\""));
}

#[test]
fn oversized_tokens_are_truncated() {
    let giant = "z".repeat(20_000);
    let body = format!("{giant} {giant} {giant} {giant} {giant} see [the guide](/guide)");
    let sections = vec![Section::new(giant.clone(), "Giant token", body, 1)];

    let summary = summarize(&sections, &brief(), &business());

    assert!(summary.serialized_len() < 8 * 1024, "{}", summary.serialized_len());
    let overused = &summary.vocabulary.overused_terms[0];
    assert_eq!(overused.count, 5);
    assert_eq!(overused.term.chars().count(), MAX_HEADING_CHARS);
    assert!(summary.section_digests[0]
        .key_terms
        .iter()
        .all(|t| t.chars().count() <= MAX_HEADING_CHARS));
    assert_eq!(summary.anchors[0].first_section.chars().count(), MAX_HEADING_CHARS);
}
