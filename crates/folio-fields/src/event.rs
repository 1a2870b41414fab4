//! Append-only field events and the fold that replays them
//!
//! Every contributing pass records one [`FieldEvent`]. The current
//! [`ProgressiveFields`] is never edited in place; it is the fold of the log.
//!
//! Merge rules:
//! - scalar fields fill only when still empty
//! - list fields append new values, skipping ones already present
//! - the outline is taken once, from the first pass that supplies it
//! - `word_count` from [`WORD_COUNT_OVERRIDE_PASS`] replaces any earlier count

use crate::error::FieldsError;
use crate::fields::{HasPart, ImageField, OutlineSection, ProgressiveFields};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The final pass recounts words over the finished content
pub const WORD_COUNT_OVERRIDE_PASS: u32 = 8;

/// Fields one pass contributes; `None` and empty lists contribute nothing
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct FieldsDelta {
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
}

impl FieldsDelta {
    /// Delta that only marks the pass as contributed
    #[inline]
    #[must_use]
    pub fn empty() -> Self {
        Self::default()
    }

    /// Whether the delta sets no field
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self == &Self::default()
    }
}

/// One recorded contribution
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FieldEvent {
    pass_number: u32,
    delta: FieldsDelta,
    recorded_at: DateTime<Utc>,
}

impl FieldEvent {
    /// Event stamped with the current time
    ///
    /// # Errors
    /// Returns [`FieldsError::InvalidPass`] for pass 0.
    pub fn new(pass_number: u32, delta: FieldsDelta) -> Result<Self, FieldsError> {
        Self::at(pass_number, delta, Utc::now())
    }

    /// Event with an explicit timestamp
    ///
    /// # Errors
    /// Returns [`FieldsError::InvalidPass`] for pass 0.
    pub fn at(
        pass_number: u32,
        delta: FieldsDelta,
        recorded_at: DateTime<Utc>,
    ) -> Result<Self, FieldsError> {
        if pass_number == 0 {
            return Err(FieldsError::InvalidPass(pass_number));
        }
        Ok(Self {
            pass_number,
            delta,
            recorded_at,
        })
    }

    /// Event for a pass number known to be non-zero
    pub(crate) fn stamped(pass_number: u32, delta: FieldsDelta) -> Self {
        debug_assert!(pass_number > 0);
        Self {
            pass_number,
            delta,
            recorded_at: Utc::now(),
        }
    }

    #[inline]
    #[must_use]
    pub fn pass_number(&self) -> u32 {
        self.pass_number
    }

    #[inline]
    #[must_use]
    pub fn delta(&self) -> &FieldsDelta {
        &self.delta
    }

    #[inline]
    #[must_use]
    pub fn recorded_at(&self) -> DateTime<Utc> {
        self.recorded_at
    }
}

fn fill<T: Clone>(slot: &mut Option<T>, value: Option<&T>) {
    if slot.is_none() {
        *slot = value.cloned();
    }
}

fn union<T: Clone + PartialEq>(into: &mut Vec<T>, values: &[T]) {
    for value in values {
        if !into.contains(value) {
            into.push(value.clone());
        }
    }
}

/// Apply one event on top of `fields`
#[must_use]
pub fn apply(mut fields: ProgressiveFields, event: &FieldEvent) -> ProgressiveFields {
    let delta = &event.delta;

    fill(&mut fields.main_entity, delta.main_entity.as_ref());
    fill(&mut fields.headline, delta.headline.as_ref());
    fill(&mut fields.description, delta.description.as_ref());
    fill(&mut fields.abstract_text, delta.abstract_text.as_ref());
    fill(&mut fields.quality_score, delta.quality_score.as_ref());
    fill(&mut fields.readability_score, delta.readability_score.as_ref());

    match delta.word_count {
        Some(count) if event.pass_number == WORD_COUNT_OVERRIDE_PASS => {
            tracing::debug!(
                previous = ?fields.word_count,
                count,
                "final pass overrides word count"
            );
            fields.word_count = Some(count);
        }
        _ => fill(&mut fields.word_count, delta.word_count.as_ref()),
    }

    if fields.sections.is_empty() {
        fields.sections.clone_from(&delta.sections);
    }
    union(&mut fields.has_part, &delta.has_part);
    union(&mut fields.images, &delta.images);
    union(&mut fields.keywords, &delta.keywords);
    union(&mut fields.entities, &delta.entities);

    fields.passes_contributed.push(event.pass_number);
    fields.updated_at = Some(event.recorded_at);
    fields
}

/// Replay `events` in order on top of `base`
#[must_use]
pub fn fold<'a, I>(base: ProgressiveFields, events: I) -> ProgressiveFields
where
    I: IntoIterator<Item = &'a FieldEvent>,
{
    events.into_iter().fold(base, apply)
}

/// Append-only log of field events for one job
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FieldLog {
    events: Vec<FieldEvent>,
}

impl FieldLog {
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record an event
    pub fn append(&mut self, event: FieldEvent) {
        self.events.push(event);
    }

    #[inline]
    #[must_use]
    pub fn events(&self) -> &[FieldEvent] {
        &self.events
    }

    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.events.len()
    }

    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Current fields: the fold of every event from an empty record
    #[must_use]
    pub fn current(&self) -> ProgressiveFields {
        fold(ProgressiveFields::new(), &self.events)
    }
}
