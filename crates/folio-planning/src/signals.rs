//! Query and topic signals shared by the depth scorer and template router

use crate::error::PlanningError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

fn normalize(s: &str) -> String {
    s.trim().to_lowercase().replace(['_', ' '], "-")
}

pub(crate) fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars).collect()
    })
}

/// Search intent behind the target query
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum QueryIntent {
    Informational,
    Commercial,
    Transactional,
    Navigational,
    #[default]
    #[serde(other)]
    Unknown,
}

impl QueryIntent {
    /// Parse, mapping unrecognized values to [`QueryIntent::Unknown`]
    #[must_use]
    pub fn parse_lenient(s: &str) -> Self {
        s.parse().unwrap_or(Self::Unknown)
    }

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Informational => "informational",
            Self::Commercial => "commercial",
            Self::Transactional => "transactional",
            Self::Navigational => "navigational",
            Self::Unknown => "unknown",
        }
    }
}

impl FromStr for QueryIntent {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "informational" => Ok(Self::Informational),
            "commercial" | "commercial-investigation" => Ok(Self::Commercial),
            "transactional" => Ok(Self::Transactional),
            "navigational" => Ok(Self::Navigational),
            "unknown" => Ok(Self::Unknown),
            _ => Err(PlanningError::unknown("query intent", s)),
        }
    }
}

impl fmt::Display for QueryIntent {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where the topic sits in the site's topical map
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TopicType {
    Core,
    #[default]
    Outer,
    Child,
}

impl TopicType {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Core => "core",
            Self::Outer => "outer",
            Self::Child => "child",
        }
    }
}

impl FromStr for TopicType {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "core" | "pillar" => Ok(Self::Core),
            "outer" => Ok(Self::Outer),
            "child" | "cluster" => Ok(Self::Child),
            _ => Err(PlanningError::unknown("topic type", s)),
        }
    }
}

impl fmt::Display for TopicType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// How hard the results page is to rank on
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SerpDifficulty {
    Low,
    #[default]
    Medium,
    High,
}

impl SerpDifficulty {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Low => "low",
            Self::Medium => "medium",
            Self::High => "high",
        }
    }
}

impl FromStr for SerpDifficulty {
    type Err = PlanningError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match normalize(s).as_str() {
            "low" | "easy" => Ok(Self::Low),
            "medium" | "moderate" => Ok(Self::Medium),
            "high" | "hard" => Ok(Self::High),
            _ => Err(PlanningError::unknown("serp difficulty", s)),
        }
    }
}

impl fmt::Display for SerpDifficulty {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn intent_parsing_is_lenient() {
        assert_eq!(QueryIntent::parse_lenient("Transactional"), QueryIntent::Transactional);
        assert_eq!(QueryIntent::parse_lenient("shopping"), QueryIntent::Unknown);
        assert!("shopping".parse::<QueryIntent>().is_err());
    }

    #[test]
    fn unknown_intent_deserializes() {
        let intent: QueryIntent = serde_json::from_str("\"curious\"").unwrap();
        assert_eq!(intent, QueryIntent::Unknown);
    }

    #[test]
    fn topic_and_difficulty_aliases() {
        assert_eq!("pillar".parse::<TopicType>().unwrap(), TopicType::Core);
        assert_eq!("HARD".parse::<SerpDifficulty>().unwrap(), SerpDifficulty::High);
    }
}
