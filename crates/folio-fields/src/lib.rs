//! Folio Fields
//!
//! Structured-data fields collected progressively as passes complete.
//!
//! # Core Concepts
//!
//! - [`ProgressiveFields`]: the accumulated record, never replaced wholesale
//! - [`FieldEvent`] / [`FieldLog`]: append-only contributions per pass
//! - [`fold`]: replays events; the final pass's word count is the one override
//! - [`collect`]: dispatches a pass number to its reducer
//!
//! # Example
//!
//! ```rust,ignore
//! use folio_fields::{collect, emit_structured_data, PassInputs, ProgressiveFields};
//!
//! let mut fields = ProgressiveFields::new();
//! for pass in 1..=8 {
//!     let inputs = PassInputs::new(&sections, &brief, &business);
//!     fields = collect(fields, pass, &inputs)?;
//! }
//! let json_ld = emit_structured_data(&fields)?;
//! ```

#![warn(unreachable_pub)]
#![allow(missing_docs)]

mod collector;
mod error;
mod event;
mod fields;
mod jsonld;

pub use collector::{
    collect, collect_pass1, collect_pass3, collect_pass4, collect_pass5, collect_pass7,
    collect_pass8, collect_with, delta_for_pass, event_for_pass, pass1_delta, pass3_delta,
    pass4_delta, pass5_delta, pass7_delta, pass8_delta, PassInputs, ABSTRACT_CHARS,
    DESCRIPTION_CHARS, KEYWORD_SOURCE_LIMIT, MAX_ENTITIES, MIN_FAQ_PAIRS, MIN_PART_ITEMS,
};
pub use error::{FieldsError, FieldsResult};
pub use event::{apply, fold, FieldEvent, FieldLog, FieldsDelta, WORD_COUNT_OVERRIDE_PASS};
pub use fields::{is_complete, HasPart, ImageField, OutlineSection, PartKind, ProgressiveFields};
pub use jsonld::emit_structured_data;

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
