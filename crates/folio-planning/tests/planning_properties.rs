use folio_planning::{
    apply_user_choice, select, suggest, DepthChoice, DepthInput, DepthMode, QueryIntent,
    SerpDifficulty, TemplateInput, TopicType, WebsiteType,
};
use proptest::prelude::*;

fn intent() -> impl Strategy<Value = QueryIntent> {
    prop_oneof![
        Just(QueryIntent::Informational),
        Just(QueryIntent::Commercial),
        Just(QueryIntent::Transactional),
        Just(QueryIntent::Navigational),
        Just(QueryIntent::Unknown),
    ]
}

fn topic() -> impl Strategy<Value = TopicType> {
    prop_oneof![Just(TopicType::Core), Just(TopicType::Outer), Just(TopicType::Child)]
}

fn difficulty() -> impl Strategy<Value = SerpDifficulty> {
    prop_oneof![
        Just(SerpDifficulty::Low),
        Just(SerpDifficulty::Medium),
        Just(SerpDifficulty::High)
    ]
}

fn website() -> impl Strategy<Value = WebsiteType> {
    prop_oneof![
        Just(WebsiteType::Ecommerce),
        Just(WebsiteType::Saas),
        Just(WebsiteType::Services),
        Just(WebsiteType::Local),
        Just(WebsiteType::Blog),
        Just(WebsiteType::News),
        Just(WebsiteType::Affiliate),
        Just(WebsiteType::Directory),
        Just(WebsiteType::Other),
    ]
}

fn depth_input() -> impl Strategy<Value = DepthInput> {
    (
        prop::collection::vec(0u32..6000, 0..8),
        difficulty(),
        intent(),
        topic(),
        0u8..=100,
    )
        .prop_map(|(counts, serp, intent, topic, authority)| DepthInput {
            competitor_word_counts: counts,
            serp_difficulty: serp,
            query_intent: intent,
            topic_type: topic,
            existing_topical_authority: authority,
        })
}

proptest! {
    #[test]
    fn depth_suggestion_is_well_formed(input in depth_input()) {
        let suggestion = suggest(&input);
        prop_assert!((0.0..=100.0).contains(&suggestion.score));
        prop_assert!(suggestion.reasoning.len() == 4);
        let range = suggestion.settings.target_word_count;
        prop_assert!(range.min <= range.max);
        prop_assert!(suggestion.settings.min_sections <= suggestion.settings.max_sections);
        let preset = suggestion.recommended.preset();
        prop_assert!(range.min >= preset.target_word_count.min);
        prop_assert!(range.max >= preset.target_word_count.max);
    }

    #[test]
    fn user_preset_always_wins(input in depth_input()) {
        let suggestion = suggest(&input);
        let chosen = apply_user_choice(&suggestion, DepthChoice::HighQuality, None);
        prop_assert_eq!(chosen.recommended, DepthMode::HighQuality);
        prop_assert_eq!(chosen.settings, DepthMode::HighQuality.preset());
        prop_assert!(chosen.reasoning.len() <= 3);
    }

    #[test]
    fn template_selection_is_well_formed(
        website in website(),
        intent in intent(),
        query_type in prop_oneof![
            Just("how-to"), Just("tutorial"), Just("versus"), Just("comparative"),
            Just("product"), Just("list"), Just("anything"), Just("")
        ],
        topic in topic(),
    ) {
        let selection = select(&TemplateInput {
            website_type: website,
            query_intent: intent,
            query_type: query_type.to_string(),
            topic_type: topic,
            ..TemplateInput::default()
        });
        prop_assert!((60..=100).contains(&selection.confidence));
        prop_assert!(selection.alternatives.len() <= 3);
        prop_assert!(selection.alternatives.iter().all(|a| a.template != selection.template));
        for (i, a) in selection.alternatives.iter().enumerate() {
            prop_assert!(selection.alternatives[i + 1..].iter().all(|b| b.template != a.template));
        }
    }
}
