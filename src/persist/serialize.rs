use crate::{
    ast::{AstObject, Document},
    persist::{PersistedObject, PersistedReference, PersistedValue},
    value::Value,
};

/// Projects the tree hanging off the document root onto the persisted form.
///
/// The projection is deterministic: settings come out in key order.
/// Objects detached from the root are not part of the output; references to
/// them keep their target id and will not resolve after deserialization.
///
/// # Examples
///
/// ```
/// use formgen::ast::{concepts, Document};
/// use formgen::persist::{serialize, PersistedValue};
///
/// let doc = Document::new(concepts::RECORD_TYPE);
/// match serialize(&doc) {
///     PersistedValue::Object(root) => assert_eq!(root.concept, "Record Type"),
///     other => panic!("unexpected {other:?}"),
/// }
/// ```
pub fn serialize(doc: &Document) -> PersistedValue {
    PersistedValue::Object(serialize_object(doc, doc.root_object()))
}

/// Projects a single value, following owned children into the arena.
pub fn serialize_value(doc: &Document, value: &Value) -> PersistedValue {
    match value {
        Value::Boolean(b) => PersistedValue::Boolean(*b),
        Value::Integer(n) => PersistedValue::Integer(*n),
        Value::Float(n) => PersistedValue::Float(*n),
        Value::String(s) => PersistedValue::String(s.clone()),
        Value::Object(id) => match doc.get(id) {
            Some(object) => PersistedValue::Object(serialize_object(doc, object)),
            // Owned ids always live in the arena; keep the edge if one does not.
            None => PersistedValue::Reference(PersistedReference {
                ref_id: Some(id.to_string()),
            }),
        },
        Value::Reference(reference) => PersistedValue::Reference(PersistedReference {
            ref_id: reference.target().map(ToString::to_string),
        }),
        Value::Sequence(items) => {
            PersistedValue::Sequence(items.iter().map(|item| serialize_value(doc, item)).collect())
        }
    }
}

fn serialize_object(doc: &Document, object: &AstObject) -> PersistedObject {
    PersistedObject {
        id: object.id.to_string(),
        concept: object.concept.clone(),
        settings: object
            .settings
            .iter()
            .map(|(property, value)| (property.clone(), serialize_value(doc, value)))
            .collect(),
    }
}

/// Serializes the document to compact JSON text.
pub fn to_json(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string(&serialize(doc))
}

/// Serializes the document to JSON text with 2-space indentation.
pub fn to_json_pretty(doc: &Document) -> Result<String, serde_json::Error> {
    serde_json::to_string_pretty(&serialize(doc))
}
