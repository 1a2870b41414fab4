//! schema.org JSON-LD emission

use crate::error::{FieldsError, FieldsResult};
use crate::fields::ProgressiveFields;
use serde_json::{json, Map, Value};

/// Emit an `Article` JSON-LD object from complete fields
///
/// # Errors
/// Returns [`FieldsError::Incomplete`] while a required field is missing.
pub fn emit_structured_data(fields: &ProgressiveFields) -> FieldsResult<Value> {
    let missing = fields.missing_required();
    if !missing.is_empty() {
        tracing::debug!(?missing, "structured data not ready");
        return Err(FieldsError::Incomplete { missing });
    }

    let mut doc = Map::new();
    doc.insert("@context".into(), json!("https://schema.org"));
    doc.insert("@type".into(), json!("Article"));
    doc.insert("headline".into(), json!(fields.headline));
    doc.insert("description".into(), json!(fields.description));
    doc.insert("wordCount".into(), json!(fields.word_count));
    doc.insert(
        "about".into(),
        json!({ "@type": "Thing", "name": fields.main_entity }),
    );

    if !fields.keywords.is_empty() {
        doc.insert("keywords".into(), json!(fields.keywords.join(", ")));
    }
    if !fields.entities.is_empty() {
        let mentions: Vec<Value> = fields
            .entities
            .iter()
            .map(|name| json!({ "@type": "Thing", "name": name }))
            .collect();
        doc.insert("mentions".into(), Value::Array(mentions));
    }
    let sections: Vec<&str> = fields
        .sections
        .iter()
        .filter(|s| s.level <= 2)
        .map(|s| s.heading.as_str())
        .collect();
    if !sections.is_empty() {
        doc.insert("articleSection".into(), json!(sections));
    }
    if !fields.has_part.is_empty() {
        let parts: Vec<Value> = fields
            .has_part
            .iter()
            .map(|part| {
                let mut obj = Map::new();
                obj.insert("@type".into(), json!(part.kind.schema_type()));
                if let Some(name) = &part.name {
                    obj.insert("name".into(), json!(name));
                }
                obj.insert("numberOfItems".into(), json!(part.item_count));
                Value::Object(obj)
            })
            .collect();
        doc.insert("hasPart".into(), Value::Array(parts));
    }
    if !fields.images.is_empty() {
        let images: Vec<Value> = fields
            .images
            .iter()
            .map(|image| {
                let mut obj = Map::new();
                obj.insert("@type".into(), json!("ImageObject"));
                if let Some(url) = &image.url {
                    obj.insert("url".into(), json!(url));
                }
                if let Some(alt) = &image.alt {
                    obj.insert("name".into(), json!(alt));
                }
                if let Some(caption) = &image.caption {
                    obj.insert("caption".into(), json!(caption));
                }
                Value::Object(obj)
            })
            .collect();
        doc.insert("image".into(), Value::Array(images));
    }
    if let Some(text) = &fields.abstract_text {
        doc.insert("abstract".into(), json!(text));
    }

    Ok(Value::Object(doc))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fields::{HasPart, ImageField, OutlineSection, PartKind};
    use pretty_assertions::assert_eq;

    fn complete() -> ProgressiveFields {
        ProgressiveFields {
            main_entity: Some("Road bike".into()),
            headline: Some("Road Bike Maintenance".into()),
            description: Some("Keep it running.".into()),
            word_count: Some(1520),
            ..ProgressiveFields::default()
        }
    }

    #[test]
    fn incomplete_fields_are_reported() {
        let fields = ProgressiveFields {
            headline: Some("x".into()),
            ..ProgressiveFields::default()
        };
        assert_eq!(
            emit_structured_data(&fields).unwrap_err(),
            FieldsError::Incomplete {
                missing: vec!["mainEntity", "description", "wordCount"]
            }
        );
    }

    #[test]
    fn minimal_article() {
        let value = emit_structured_data(&complete()).unwrap();
        assert_eq!(value["@type"], "Article");
        assert_eq!(value["headline"], "Road Bike Maintenance");
        assert_eq!(value["wordCount"], 1520);
        assert_eq!(value["about"]["name"], "Road bike");
        assert!(value.get("keywords").is_none());
        assert!(value.get("hasPart").is_none());
    }

    #[test]
    fn optional_fields_are_rendered() {
        let fields = ProgressiveFields {
            keywords: vec!["chain".into(), "brakes".into()],
            entities: vec!["Shimano Ultegra".into()],
            sections: vec![
                OutlineSection { heading: "Cleaning".into(), level: 2 },
                OutlineSection { heading: "Chain".into(), level: 3 },
            ],
            has_part: vec![HasPart { kind: PartKind::HowTo, name: Some("Steps".into()), item_count: 4 }],
            images: vec![ImageField { url: Some("a.png".into()), alt: Some("Chain".into()), caption: None }],
            abstract_text: Some("Short abstract.".into()),
            ..complete()
        };
        let value = emit_structured_data(&fields).unwrap();
        assert_eq!(value["keywords"], "chain, brakes");
        assert_eq!(value["mentions"][0]["name"], "Shimano Ultegra");
        assert_eq!(value["articleSection"], json!(["Cleaning"]));
        assert_eq!(value["hasPart"][0]["@type"], "HowTo");
        assert_eq!(value["hasPart"][0]["numberOfItems"], 4);
        assert_eq!(value["image"][0]["url"], "a.png");
        assert_eq!(value["abstract"], "Short abstract.");
    }
}
