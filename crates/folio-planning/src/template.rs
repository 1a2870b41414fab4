//! Structural template router
//!
//! Rules are applied in order, later rules overriding earlier ones:
//! website default, commercial comparison, query-type family, brief hints.
//! Competitor formats only add reasoning.

use crate::error::PlanningError;
use crate::signals::{capitalize, QueryIntent, TopicType};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

const BASE_CONFIDENCE: u8 = 60;
const MAX_CONFIDENCE: u8 = 100;
const MAX_ALTERNATIVES: usize = 3;

const PROCEDURAL_QUERY_TYPES: &[&str] = &["procedural", "how-to", "tutorial"];
const COMPARATIVE_QUERY_TYPES: &[&str] = &["comparative", "comparison", "versus"];

/// Pool used to fill alternatives once the specific candidates run out
pub const POPULAR_TEMPLATES: [Template; 4] = [
    Template::ProcessHowto,
    Template::Comparison,
    Template::ListingDirectory,
    Template::Definitional,
];

/// Macro-structure of a document
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Template {
    Definitional,
    ProcessHowto,
    Comparison,
    ListingDirectory,
    EcommerceProduct,
    EcommerceCategory,
    ServicePage,
    LocalBusiness,
    NewsArticle,
    Review,
}

impl Template {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Definitional => "DEFINITIONAL",
            Self::ProcessHowto => "PROCESS_HOWTO",
            Self::Comparison => "COMPARISON",
            Self::ListingDirectory => "LISTING_DIRECTORY",
            Self::EcommerceProduct => "ECOMMERCE_PRODUCT",
            Self::EcommerceCategory => "ECOMMERCE_CATEGORY",
            Self::ServicePage => "SERVICE_PAGE",
            Self::LocalBusiness => "LOCAL_BUSINESS",
            Self::NewsArticle => "NEWS_ARTICLE",
            Self::Review => "REVIEW",
        }
    }

    /// Parse a template name, falling back to [`Template::Definitional`]
    #[must_use]
    pub fn resolve(name: &str) -> Self {
        name.parse().unwrap_or_else(|_| {
            tracing::debug!(name, "unknown template name, using DEFINITIONAL");
            Self::Definitional
        })
    }

    fn fits_intent(self, intent: QueryIntent) -> bool {
        match intent {
            QueryIntent::Informational => {
                matches!(self, Self::Definitional | Self::ProcessHowto | Self::NewsArticle)
            }
            QueryIntent::Commercial => {
                matches!(self, Self::Comparison | Self::Review | Self::ListingDirectory)
            }
            QueryIntent::Transactional => matches!(
                self,
                Self::EcommerceProduct | Self::EcommerceCategory | Self::ServicePage
            ),
            QueryIntent::Navigational => matches!(self, Self::LocalBusiness | Self::ServicePage),
            QueryIntent::Unknown => false,
        }
    }
}

impl FromStr for Template {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let key = s.trim().to_uppercase().replace(['-', ' '], "_");
        let template = match key.as_str() {
            "DEFINITIONAL" => Self::Definitional,
            "PROCESS_HOWTO" | "HOWTO" => Self::ProcessHowto,
            "COMPARISON" => Self::Comparison,
            "LISTING_DIRECTORY" | "LISTICLE" => Self::ListingDirectory,
            "ECOMMERCE_PRODUCT" => Self::EcommerceProduct,
            "ECOMMERCE_CATEGORY" => Self::EcommerceCategory,
            "SERVICE_PAGE" => Self::ServicePage,
            "LOCAL_BUSINESS" => Self::LocalBusiness,
            "NEWS_ARTICLE" => Self::NewsArticle,
            "REVIEW" => Self::Review,
            _ => return Err(PlanningError::unknown("template", s)),
        };
        Ok(template)
    }
}

impl fmt::Display for Template {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of site the document is published on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum WebsiteType {
    Ecommerce,
    Saas,
    Services,
    Local,
    Blog,
    News,
    Affiliate,
    Directory,
    #[default]
    #[serde(other)]
    Other,
}

impl WebsiteType {
    /// Parse, mapping unrecognized values to [`WebsiteType::Other`]
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        match s.trim().to_uppercase().replace(['-', ' '], "_").as_str() {
            "ECOMMERCE" | "E_COMMERCE" | "SHOP" => Self::Ecommerce,
            "SAAS" => Self::Saas,
            "SERVICES" | "SERVICE" | "AGENCY" => Self::Services,
            "LOCAL" | "LOCAL_BUSINESS" => Self::Local,
            "BLOG" | "INFORMATIONAL" | "CONTENT" => Self::Blog,
            "NEWS" | "PUBLISHER" => Self::News,
            "AFFILIATE" => Self::Affiliate,
            "DIRECTORY" | "MARKETPLACE" => Self::Directory,
            _ => Self::Other,
        }
    }

    /// Template the site type starts from
    #[must_use]
    pub const fn default_template(self) -> Template {
        match self {
            Self::Ecommerce => Template::EcommerceProduct,
            Self::Saas | Self::Services => Template::ServicePage,
            Self::Local => Template::LocalBusiness,
            Self::News => Template::NewsArticle,
            Self::Affiliate => Template::Comparison,
            Self::Directory => Template::ListingDirectory,
            Self::Blog | Self::Other => Template::Definitional,
        }
    }
}

/// Section signals taken from the brief
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BriefHints {
    pub has_step_sections: bool,
    pub has_comparison_sections: bool,
}

/// What ranking competitors look like
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CompetitorAnalysis {
    /// Template name most competitors follow
    pub dominant_format: Option<String>,
}

/// Inputs to [`select`]
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct TemplateInput {
    pub website_type: WebsiteType,
    pub query_intent: QueryIntent,
    /// Free-form query classification such as `how-to` or `product`
    pub query_type: String,
    pub topic_type: TopicType,
    pub topic_class: Option<String>,
    pub brief_hints: Option<BriefHints>,
    pub competitor_analysis: Option<CompetitorAnalysis>,
}

/// A template that was considered but not chosen
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Alternative {
    pub template: Template,
    pub reason: String,
}

/// Outcome of [`select`]
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TemplateSelection {
    pub template: Template,
    /// 0-100
    pub confidence: u8,
    pub reasoning: Vec<String>,
    /// At most three, never the selected template
    pub alternatives: Vec<Alternative>,
}

fn query_family(query_type: &str) -> (bool, bool) {
    let key = query_type.trim().to_lowercase().replace(['_', ' '], "-");
    (
        PROCEDURAL_QUERY_TYPES.contains(&key.as_str()),
        COMPARATIVE_QUERY_TYPES.contains(&key.as_str()),
    )
}

/// Template a query type points at, if any
#[must_use]
pub fn query_type_suggestion(query_type: &str) -> Option<Template> {
    let (procedural, comparative) = query_family(query_type);
    if procedural {
        return Some(Template::ProcessHowto);
    }
    if comparative {
        return Some(Template::Comparison);
    }
    let key = query_type.trim().to_lowercase().replace(['_', ' '], "-");
    match key.as_str() {
        "product" => Some(Template::EcommerceProduct),
        "category" | "collection" => Some(Template::EcommerceCategory),
        "list" | "listicle" | "best" | "top" => Some(Template::ListingDirectory),
        "definition" | "definitional" | "what-is" | "explainer" => Some(Template::Definitional),
        "review" => Some(Template::Review),
        "local" | "near-me" => Some(Template::LocalBusiness),
        "service" => Some(Template::ServicePage),
        "news" => Some(Template::NewsArticle),
        _ => None,
    }
}

fn intent_fallback(intent: QueryIntent) -> Template {
    match intent {
        QueryIntent::Commercial => Template::Comparison,
        QueryIntent::Transactional => Template::EcommerceProduct,
        QueryIntent::Navigational => Template::ServicePage,
        QueryIntent::Informational | QueryIntent::Unknown => Template::Definitional,
    }
}

/// Choose the document template
#[must_use]
pub fn select(input: &TemplateInput) -> TemplateSelection {
    let mut reasoning = Vec::new();
    let website_default = input.website_type.default_template();
    let query_suggestion = query_type_suggestion(&input.query_type);
    let (procedural, comparative) = query_family(&input.query_type);

    let mut template = website_default;
    reasoning.push(format!(
        "Website type {:?} defaults to {website_default}",
        input.website_type
    ));

    if input.query_intent == QueryIntent::Commercial
        && input.query_type.trim().eq_ignore_ascii_case("comparative")
    {
        template = Template::Comparison;
        reasoning.push("Commercial comparative query calls for COMPARISON".into());
    }

    if procedural {
        template = Template::ProcessHowto;
        reasoning.push(format!("Query type '{}' is procedural", input.query_type.trim()));
    } else if comparative {
        template = Template::Comparison;
        reasoning.push(format!("Query type '{}' is comparative", input.query_type.trim()));
    }

    let mut hint_forced = false;
    let mut hint_consistent = false;
    if let Some(hints) = input.brief_hints {
        match (hints.has_step_sections, hints.has_comparison_sections) {
            (true, false) => {
                template = Template::ProcessHowto;
                hint_forced = true;
                reasoning.push("Brief outline contains step sections".into());
            }
            (false, true) => {
                template = Template::Comparison;
                hint_forced = true;
                reasoning.push("Brief outline contains comparison sections".into());
            }
            (true, true) => {
                hint_consistent =
                    matches!(template, Template::ProcessHowto | Template::Comparison);
                reasoning.push("Brief has both step and comparison sections; no override".into());
            }
            (false, false) => {}
        }
    }

    if let Some(analysis) = &input.competitor_analysis {
        match analysis.dominant_format.as_deref().map(Template::resolve) {
            Some(format) if format == template => {
                reasoning.push(format!("Competitors also use {format}"));
            }
            Some(format) => {
                reasoning.push(format!(
                    "Competitors favour {format}; structure stays {template}"
                ));
            }
            None => reasoning.push("Competitor analysis has no dominant format".into()),
        }
    }

    reasoning.push(format!("{} topic", capitalize(input.topic_type.as_str())));
    if let Some(class) = input.topic_class.as_deref().filter(|c| !c.trim().is_empty()) {
        reasoning.push(format!("Topic class: {}", class.trim()));
    }

    let mut confidence = u32::from(BASE_CONFIDENCE);
    if template == website_default {
        confidence += 15;
    }
    if query_suggestion == Some(template) {
        confidence += 10;
    }
    if hint_forced {
        confidence += 10;
    } else if hint_consistent {
        confidence += 5;
    }
    if template.fits_intent(input.query_intent) {
        confidence += 5;
    }
    if input.competitor_analysis.is_some() {
        confidence += 5;
    }
    let confidence = u8::try_from(confidence.min(u32::from(MAX_CONFIDENCE))).unwrap_or(MAX_CONFIDENCE);

    let alternatives = alternatives(template, website_default, query_suggestion, input.query_intent);

    tracing::debug!(template = %template, confidence, "template selected");
    TemplateSelection {
        template,
        confidence,
        reasoning,
        alternatives,
    }
}

fn alternatives(
    selected: Template,
    website_default: Template,
    query_suggestion: Option<Template>,
    intent: QueryIntent,
) -> Vec<Alternative> {
    let mut candidates: Vec<(Template, String)> = vec![(
        website_default,
        "Default for this website type".to_string(),
    )];
    if let Some(suggested) = query_suggestion {
        candidates.push((suggested, "Suggested by the query type".into()));
    }
    candidates.push((intent_fallback(intent), format!("Fits {intent} intent")));
    candidates.extend(
        POPULAR_TEMPLATES
            .iter()
            .map(|&t| (t, "Widely used structure".to_string())),
    );

    let mut out: Vec<Alternative> = Vec::with_capacity(MAX_ALTERNATIVES);
    for (template, reason) in candidates {
        if out.len() == MAX_ALTERNATIVES {
            break;
        }
        if template == selected || out.iter().any(|a| a.template == template) {
            continue;
        }
        out.push(Alternative { template, reason });
    }
    out
}
