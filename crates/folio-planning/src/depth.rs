//! Content depth scorer
//!
//! Five signals are scored 0-100 and weighted into a single score that picks
//! one of three presets. Reasoning lists the signals that moved the score
//! furthest from neutral.

use crate::signals::{capitalize, QueryIntent, SerpDifficulty, TopicType};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Weight of the competitor word-count signal
pub const COMPETITOR_WEIGHT: f64 = 0.35;
/// Weight of the SERP difficulty signal
pub const SERP_WEIGHT: f64 = 0.25;
/// Weight of the topic type signal
pub const TOPIC_WEIGHT: f64 = 0.20;
/// Weight of the topical authority signal
pub const AUTHORITY_WEIGHT: f64 = 0.15;
/// Weight of the query intent signal
pub const INTENT_WEIGHT: f64 = 0.05;

/// Score at or above which `high-quality` is recommended
pub const HIGH_QUALITY_THRESHOLD: f64 = 70.0;
/// Score at or above which `moderate` is recommended
pub const MODERATE_THRESHOLD: f64 = 45.0;

const NEUTRAL: f64 = 50.0;
const REASONING_SIGNALS: usize = 4;
const OVERRIDE_KEEPS_REASONS: usize = 2;

/// Inputs to [`suggest`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct DepthInput {
    pub competitor_word_counts: Vec<u32>,
    pub serp_difficulty: SerpDifficulty,
    pub query_intent: QueryIntent,
    pub topic_type: TopicType,
    /// Current authority on the topic, 0-100
    pub existing_topical_authority: u8,
}

/// Recommended depth preset
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthMode {
    HighQuality,
    Moderate,
    QuickPublish,
}

impl DepthMode {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::HighQuality => "high-quality",
            Self::Moderate => "moderate",
            Self::QuickPublish => "quick-publish",
        }
    }

    /// Preset settings for the mode
    #[must_use]
    pub const fn preset(self) -> DepthSettings {
        match self {
            Self::HighQuality => DepthSettings {
                max_sections: 10,
                min_sections: 8,
                target_word_count: WordRange { min: 2000, max: 3500 },
                section_depth: SectionDepth::Comprehensive,
            },
            Self::Moderate => DepthSettings {
                max_sections: 7,
                min_sections: 5,
                target_word_count: WordRange { min: 1200, max: 2000 },
                section_depth: SectionDepth::Standard,
            },
            Self::QuickPublish => DepthSettings {
                max_sections: 5,
                min_sections: 3,
                target_word_count: WordRange { min: 600, max: 1000 },
                section_depth: SectionDepth::Brief,
            },
        }
    }

    fn from_score(score: f64) -> Self {
        if score >= HIGH_QUALITY_THRESHOLD {
            Self::HighQuality
        } else if score >= MODERATE_THRESHOLD {
            Self::Moderate
        } else {
            Self::QuickPublish
        }
    }
}

impl fmt::Display for DepthMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Qualitative depth of each section
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SectionDepth {
    Comprehensive,
    Standard,
    Brief,
}

/// Inclusive word-count range
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct WordRange {
    pub min: u32,
    pub max: u32,
}

/// Structural target handed to generation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSettings {
    pub max_sections: u32,
    pub min_sections: u32,
    pub target_word_count: WordRange,
    pub section_depth: SectionDepth,
}

/// Partial settings layered over the `moderate` preset
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomSettings {
    pub max_sections: Option<u32>,
    pub min_sections: Option<u32>,
    pub target_word_count: Option<WordRange>,
    pub section_depth: Option<SectionDepth>,
}

/// What competitors publish for the query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CompetitorBenchmark {
    pub average_word_count: u32,
    pub top_performer_word_count: u32,
    pub sample_size: usize,
}

impl CompetitorBenchmark {
    #[must_use]
    pub fn from_counts(counts: &[u32]) -> Self {
        if counts.is_empty() {
            return Self::default();
        }
        let total: u64 = counts.iter().map(|&c| u64::from(c)).sum();
        let average = total / counts.len() as u64;
        Self {
            average_word_count: u32::try_from(average).unwrap_or(u32::MAX),
            top_performer_word_count: counts.iter().copied().max().unwrap_or(0),
            sample_size: counts.len(),
        }
    }
}

/// Outcome of [`suggest`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepthSuggestion {
    pub recommended: DepthMode,
    /// Weighted score, 0-100
    pub score: f64,
    pub reasoning: Vec<String>,
    pub competitor_benchmark: CompetitorBenchmark,
    pub settings: DepthSettings,
    /// Set when the settings came from a user override
    #[serde(default)]
    pub user_override: bool,
}

/// User choice for [`apply_user_choice`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DepthChoice {
    HighQuality,
    Moderate,
    QuickPublish,
    Custom,
}

struct Signal {
    score: f64,
    weight: f64,
    reason: String,
}

impl Signal {
    fn impact(&self) -> f64 {
        (self.score - NEUTRAL).abs() * self.weight
    }
}

fn competitor_signal(benchmark: &CompetitorBenchmark) -> Signal {
    if benchmark.sample_size == 0 {
        return Signal {
            score: NEUTRAL,
            weight: COMPETITOR_WEIGHT,
            reason: "No competitor word counts available; competitor signal is neutral".into(),
        };
    }
    let avg = benchmark.average_word_count;
    let (score, verdict) = if avg >= 2000 {
        (90.0, "long-form content is the norm")
    } else if avg >= 1200 {
        (60.0, "mid-length content is the norm")
    } else {
        (30.0, "short content ranks")
    };
    Signal {
        score,
        weight: COMPETITOR_WEIGHT,
        reason: format!(
            "Competitors average {avg} words (top {}): {verdict}",
            benchmark.top_performer_word_count
        ),
    }
}

fn serp_signal(difficulty: SerpDifficulty) -> Signal {
    let (score, reason) = match difficulty {
        SerpDifficulty::High => (90.0, "High SERP difficulty demands comprehensive coverage"),
        SerpDifficulty::Medium => (55.0, "Medium SERP difficulty needs solid coverage"),
        SerpDifficulty::Low => (25.0, "Low SERP difficulty can be won with a concise piece"),
    };
    Signal {
        score,
        weight: SERP_WEIGHT,
        reason: reason.into(),
    }
}

fn topic_signal(topic: TopicType) -> Signal {
    let (score, reason) = match topic {
        TopicType::Core => (95.0, "Core topic deserves the most thorough treatment"),
        TopicType::Outer => (50.0, "Outer topic supports the core with moderate depth"),
        TopicType::Child => (30.0, "Child topic covers a narrow sub-question"),
    };
    Signal {
        score,
        weight: TOPIC_WEIGHT,
        reason: reason.into(),
    }
}

fn authority_signal(authority: u8) -> Signal {
    let authority = authority.min(100);
    let score = f64::from(100 - authority);
    let reason = if authority < 50 {
        format!("Topical authority is {authority}/100; deeper content builds it")
    } else {
        format!("Topical authority is already {authority}/100; less depth is needed")
    };
    Signal {
        score,
        weight: AUTHORITY_WEIGHT,
        reason,
    }
}

fn intent_signal(intent: QueryIntent) -> Signal {
    let score = match intent {
        QueryIntent::Informational => 75.0,
        QueryIntent::Commercial => 65.0,
        QueryIntent::Transactional => 45.0,
        QueryIntent::Navigational => 25.0,
        QueryIntent::Unknown => NEUTRAL,
    };
    Signal {
        score,
        weight: INTENT_WEIGHT,
        reason: format!("{} intent scores {score:.0} for depth", capitalize(intent.as_str())),
    }
}

fn round_to(value: f64, places: i32) -> f64 {
    let factor = 10f64.powi(places);
    (value * factor).round() / factor
}

/// Suggest a depth preset from competitor and topic signals
#[must_use]
pub fn suggest(input: &DepthInput) -> DepthSuggestion {
    let benchmark = CompetitorBenchmark::from_counts(&input.competitor_word_counts);

    let mut signals = vec![
        competitor_signal(&benchmark),
        serp_signal(input.serp_difficulty),
        topic_signal(input.topic_type),
        authority_signal(input.existing_topical_authority),
        intent_signal(input.query_intent),
    ];
    let score = round_to(signals.iter().map(|s| s.score * s.weight).sum(), 2);
    let recommended = DepthMode::from_score(score);

    // stable sort keeps declaration order among equal impacts
    signals.sort_by(|a, b| b.impact().total_cmp(&a.impact()));
    let reasoning = signals
        .into_iter()
        .take(REASONING_SIGNALS)
        .map(|s| s.reason)
        .collect();

    let mut settings = recommended.preset();
    if recommended == DepthMode::HighQuality
        && benchmark.average_word_count > settings.target_word_count.min
    {
        let widened_min = (f64::from(benchmark.average_word_count) * 0.9).round() as u32;
        settings.target_word_count = WordRange {
            min: settings.target_word_count.min.max(widened_min),
            max: settings
                .target_word_count
                .max
                .max(benchmark.top_performer_word_count),
        };
    }

    tracing::debug!(score, recommended = %recommended, "depth suggestion");
    DepthSuggestion {
        recommended,
        score,
        reasoning,
        competitor_benchmark: benchmark,
        settings,
        user_override: false,
    }
}

/// Apply the user's choice on top of a suggestion
///
/// A preset replaces the settings outright. `Custom` layers `custom` over
/// the `moderate` preset. The reasoning gains a leading line naming the
/// choice and keeps at most two earlier reasons.
#[must_use]
pub fn apply_user_choice(
    suggestion: &DepthSuggestion,
    choice: DepthChoice,
    custom: Option<&CustomSettings>,
) -> DepthSuggestion {
    let (recommended, settings, line) = match choice {
        DepthChoice::HighQuality => preset_choice(DepthMode::HighQuality),
        DepthChoice::Moderate => preset_choice(DepthMode::Moderate),
        DepthChoice::QuickPublish => preset_choice(DepthMode::QuickPublish),
        DepthChoice::Custom => {
            let base = DepthMode::Moderate.preset();
            let custom = custom.copied().unwrap_or_default();
            let settings = DepthSettings {
                max_sections: custom.max_sections.unwrap_or(base.max_sections),
                min_sections: custom.min_sections.unwrap_or(base.min_sections),
                target_word_count: custom.target_word_count.unwrap_or(base.target_word_count),
                section_depth: custom.section_depth.unwrap_or(base.section_depth),
            };
            (DepthMode::Moderate, settings, "User selected custom settings".to_string())
        }
    };

    let mut reasoning = Vec::with_capacity(OVERRIDE_KEEPS_REASONS + 1);
    reasoning.push(line);
    reasoning.extend(
        suggestion
            .reasoning
            .iter()
            .take(OVERRIDE_KEEPS_REASONS)
            .cloned(),
    );

    DepthSuggestion {
        recommended,
        score: suggestion.score,
        reasoning,
        competitor_benchmark: suggestion.competitor_benchmark,
        settings,
        user_override: true,
    }
}

fn preset_choice(mode: DepthMode) -> (DepthMode, DepthSettings, String) {
    (mode, mode.preset(), format!("User selected {mode}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn strong_input() -> DepthInput {
        DepthInput {
            competitor_word_counts: vec![2500, 3000, 2800, 2200, 2600],
            serp_difficulty: SerpDifficulty::High,
            query_intent: QueryIntent::Unknown,
            topic_type: TopicType::Core,
            existing_topical_authority: 20,
        }
    }

    #[test]
    fn strong_signals_pick_high_quality_and_widen() {
        let suggestion = suggest(&strong_input());
        assert_eq!(suggestion.recommended, DepthMode::HighQuality);
        assert!(suggestion.settings.max_sections >= 8);
        assert!(suggestion.settings.target_word_count.min >= 2000);
        // 0.9 x 2620 average
        assert_eq!(suggestion.settings.target_word_count.min, 2358);
        assert_eq!(suggestion.settings.target_word_count.max, 3500);
        assert_eq!(suggestion.competitor_benchmark.average_word_count, 2620);
        assert_eq!(suggestion.competitor_benchmark.top_performer_word_count, 3000);
        assert!((suggestion.score - 87.5).abs() < f64::EPSILON);
    }

    #[test]
    fn reasoning_ranks_by_weighted_deviation() {
        let suggestion = suggest(&strong_input());
        assert_eq!(suggestion.reasoning.len(), 4);
        // competitor 40*0.35=14, serp 40*0.25=10, topic 45*0.2=9, authority 30*0.15=4.5
        assert!(suggestion.reasoning[0].starts_with("Competitors average 2620 words"));
        assert!(suggestion.reasoning[1].starts_with("High SERP difficulty"));
        assert!(suggestion.reasoning[2].starts_with("Core topic"));
        assert!(suggestion.reasoning[3].starts_with("Topical authority is 20/100"));
    }

    #[test]
    fn weak_signals_pick_quick_publish() {
        let suggestion = suggest(&DepthInput {
            competitor_word_counts: vec![500, 700],
            serp_difficulty: SerpDifficulty::Low,
            query_intent: QueryIntent::Navigational,
            topic_type: TopicType::Child,
            existing_topical_authority: 90,
        });
        assert_eq!(suggestion.recommended, DepthMode::QuickPublish);
        assert_eq!(suggestion.settings, DepthMode::QuickPublish.preset());
    }

    #[test]
    fn empty_inputs_use_neutral_defaults() {
        let suggestion = suggest(&DepthInput::default());
        assert_eq!(suggestion.competitor_benchmark, CompetitorBenchmark::default());
        // 50*.35 + 55*.25 + 50*.2 + 100*.15 + 50*.05
        assert!((suggestion.score - 58.75).abs() < 1e-9);
        assert_eq!(suggestion.recommended, DepthMode::Moderate);
    }

    #[test]
    fn preset_override_replaces_settings() {
        let suggestion = suggest(&strong_input());
        let chosen = apply_user_choice(&suggestion, DepthChoice::QuickPublish, None);
        assert_eq!(chosen.recommended, DepthMode::QuickPublish);
        assert_eq!(chosen.settings, DepthMode::QuickPublish.preset());
        assert_eq!(chosen.reasoning.len(), 3);
        assert_eq!(chosen.reasoning[0], "User selected quick-publish");
        assert_eq!(chosen.reasoning[1], suggestion.reasoning[0]);
        assert!(chosen.user_override);
    }

    #[test]
    fn custom_override_layers_on_moderate() {
        let suggestion = suggest(&strong_input());
        let custom = CustomSettings {
            max_sections: Some(12),
            ..CustomSettings::default()
        };
        let chosen = apply_user_choice(&suggestion, DepthChoice::Custom, Some(&custom));
        let moderate = DepthMode::Moderate.preset();
        assert_eq!(chosen.settings.max_sections, 12);
        assert_eq!(chosen.settings.min_sections, moderate.min_sections);
        assert_eq!(chosen.settings.target_word_count, moderate.target_word_count);
        assert_eq!(chosen.reasoning[0], "User selected custom settings");
    }
}
