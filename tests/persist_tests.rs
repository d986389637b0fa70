use std::collections::HashSet;

use formgen::ast::{AstError, Document, NodeId, Resolution, Settings, concepts};
use formgen::persist::{
    DeserializeError, PersistedValue, deserialize, deserialize_with, from_json, serialize, to_json,
};
use formgen::{AstObject, Reference, Value};
use pretty_assertions::assert_eq;

fn settings(pairs: Vec<(&str, Value)>) -> Settings {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

/// Record with two attributes where the first attribute's value reads the
/// second one, so the reference points forward in traversal order.
fn forward_reference_document() -> Document {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let root = doc.root().clone();
    doc.replace_single_value(&root, "name", Some("rental".into())).unwrap();

    let total = doc
        .new_object(
            concepts::DATA_ATTRIBUTE,
            settings(vec![("name", "total".into()), ("type", "amount".into())]),
        )
        .unwrap();
    let price = doc
        .new_object(
            concepts::DATA_ATTRIBUTE,
            settings(vec![("name", "price".into()), ("type", "amount".into())]),
        )
        .unwrap();
    let reads_price = doc.reference_to(&price).unwrap();
    let reference = doc
        .new_object(concepts::ATTRIBUTE_REFERENCE, settings(vec![("attribute", reads_price)]))
        .unwrap();
    doc.replace_single_value(&total, "value", Some(Value::Object(reference)))
        .unwrap();
    doc.replace_single_value(
        &root,
        "attributes",
        Some(Value::Sequence(vec![Value::Object(total), Value::Object(price)])),
    )
    .unwrap();
    doc
}

fn ids_of(doc: &Document) -> HashSet<NodeId> {
    doc.objects().map(|object| object.id.clone()).collect()
}

// ============================================================================
// Round trip
// ============================================================================

#[test]
fn test_round_trip_preserves_ids_and_structure() {
    let doc = forward_reference_document();
    let persisted = serialize(&doc);

    let restored = deserialize(persisted.clone()).unwrap();

    assert_eq!(restored.root(), doc.root());
    assert_eq!(ids_of(&restored), ids_of(&doc));
    assert_eq!(serialize(&restored), persisted);
    for object in doc.objects() {
        assert_eq!(restored.get(&object.id), Some(object));
    }
}

#[test]
fn test_round_trip_through_json_text() {
    let doc = forward_reference_document();
    let text = to_json(&doc).unwrap();

    let restored = from_json(&text).unwrap();

    assert_eq!(to_json(&restored).unwrap(), text);
}

#[test]
fn test_forward_references_resolve() {
    let doc = forward_reference_document();
    let restored = deserialize(serialize(&doc)).unwrap();

    let root = restored.root().clone();
    let references = restored.all_instances_of(concepts::ATTRIBUTE_REFERENCE, &root);
    assert_eq!(references.len(), 1);
    let target = references[0]
        .get("attribute")
        .and_then(Value::as_reference)
        .and_then(|r| restored.resolve(r).target())
        .unwrap();
    assert_eq!(target.get_str("name"), Some("price"));
    assert!(restored.dangling_references().is_empty());
}

#[test]
fn test_parents_are_rebuilt() {
    let doc = forward_reference_document();
    let restored = deserialize(serialize(&doc)).unwrap();

    for object in doc.objects() {
        assert_eq!(restored.parent_of(&object.id), doc.parent_of(&object.id));
    }
}

// ============================================================================
// Persisted shape
// ============================================================================

#[test]
fn test_serialized_shape() {
    let text = r#"{
        "id": "r1",
        "concept": "Record Type",
        "settings": {
            "attributes": [
                { "id": "a1", "concept": "Data Attribute", "settings": { "name": "price", "type": "amount" } },
                {
                    "id": "a2",
                    "concept": "Data Attribute",
                    "settings": {
                        "name": "total",
                        "value": { "id": "e1", "concept": "Attribute Reference", "settings": { "attribute": { "refId": "a1" } } }
                    }
                }
            ],
            "name": "rental"
        }
    }"#;

    let doc = from_json(text).unwrap();
    let expected: serde_json::Value = serde_json::from_str(text).unwrap();
    let actual: serde_json::Value = serde_json::to_value(serialize(&doc)).unwrap();

    assert_eq!(actual, expected);
}

#[test]
fn test_numbers_keep_integer_and_float_apart() {
    let doc = from_json(
        r#"{ "id": "r", "concept": "Record Type", "settings": { "count": 3, "ratio": 0.5 } }"#,
    )
    .unwrap();

    assert_eq!(doc.root_object().get("count"), Some(&Value::Integer(3)));
    assert_eq!(doc.root_object().get("ratio"), Some(&Value::Float(0.5)));
}

#[test]
fn test_missing_settings_default_to_empty() {
    let doc = from_json(r#"{ "id": "r", "concept": "Record Type" }"#).unwrap();
    assert!(doc.root_object().settings.is_empty());
}

// ============================================================================
// Reference edge cases
// ============================================================================

#[test]
fn test_unresolved_ref_id_only_fails_that_reference() {
    let doc = from_json(
        r#"{
            "id": "r",
            "concept": "Record Type",
            "settings": {
                "attributes": [
                    { "id": "e1", "concept": "Attribute Reference", "settings": { "attribute": { "refId": "nowhere" } } },
                    { "id": "a1", "concept": "Data Attribute", "settings": { "name": "price" } }
                ]
            }
        }"#,
    )
    .unwrap();

    assert_eq!(doc.object_count(), 3);
    let reference = doc.get(&NodeId::from("e1")).unwrap();
    let Some(Value::Reference(edge)) = reference.get("attribute") else {
        panic!("expected a reference");
    };
    assert_eq!(doc.resolve(edge), Resolution::Dangling(&NodeId::from("nowhere")));

    let dangling = doc.dangling_references();
    assert_eq!(dangling.len(), 1);
    assert_eq!(dangling[0].target, NodeId::from("nowhere"));
}

#[test]
fn test_dangling_reference_keeps_its_id_when_serialized() {
    let text = r#"{"id":"r","concept":"Record Type","settings":{"attribute":{"refId":"nowhere"}}}"#;
    let doc = from_json(text).unwrap();

    assert_eq!(to_json(&doc).unwrap(), text);
}

#[test]
fn test_absent_references() {
    let doc = from_json(
        r#"{ "id": "r", "concept": "Record Type", "settings": { "a": { "refId": null }, "b": {} } }"#,
    )
    .unwrap();

    let absent = Value::Reference(Reference::absent());
    assert_eq!(doc.root_object().get("a"), Some(&absent));
    assert_eq!(doc.root_object().get("b"), Some(&absent));
    assert!(doc.dangling_references().is_empty());

    let text = to_json(&doc).unwrap();
    assert_eq!(
        text,
        r#"{"id":"r","concept":"Record Type","settings":{"a":{"refId":null},"b":{"refId":null}}}"#
    );
}

#[test]
fn test_non_finite_floats_never_reach_the_persisted_form() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let root = doc.root().clone();

    assert_eq!(
        doc.replace_single_value(&root, "ratio", Some(Value::Float(f64::NAN))),
        Err(AstError::NonFiniteNumber {
            node: root.clone(),
            property: "ratio".to_string()
        })
    );
    assert!(matches!(
        doc.new_object(
            concepts::NUMBER,
            settings(vec![("value", Value::Float(f64::INFINITY))])
        ),
        Err(AstError::NonFiniteNumber { .. })
    ));
    doc.replace_single_value(&root, "ratios", Some(Value::Sequence(vec![Value::Float(0.5)])))
        .unwrap();
    assert!(matches!(
        doc.replace_in_multiple_value(&root, "ratios", 1, Some(Value::Float(f64::NEG_INFINITY))),
        Err(AstError::NonFiniteNumber { .. })
    ));

    let text = to_json(&doc).unwrap();
    assert!(!text.contains("null"));
    let restored = from_json(&text).unwrap();
    assert_eq!(
        restored.root_object().get("ratios"),
        Some(&Value::Sequence(vec![Value::Float(0.5)]))
    );
}

// ============================================================================
// Failures
// ============================================================================

#[test]
fn test_root_must_be_an_object() {
    assert!(matches!(from_json("[1, 2]"), Err(DeserializeError::RootNotAnObject)));
    assert!(matches!(
        from_json(r#"{ "refId": "a" }"#),
        Err(DeserializeError::RootNotAnObject)
    ));
}

#[test]
fn test_invalid_json_is_reported() {
    assert!(matches!(from_json("{ not json"), Err(DeserializeError::Json(_))));
}

#[test]
fn test_duplicate_ids_are_rejected() {
    let siblings = r#"{
        "id": "r",
        "concept": "Record Type",
        "settings": {
            "attributes": [
                { "id": "a", "concept": "Data Attribute" },
                { "id": "a", "concept": "Data Attribute" }
            ]
        }
    }"#;
    let nested = r#"{
        "id": "r",
        "concept": "Record Type",
        "settings": { "only": { "id": "r", "concept": "Data Attribute" } }
    }"#;

    for text in [siblings, nested] {
        match from_json(text) {
            Err(DeserializeError::DuplicateId(id)) => assert_eq!(id.as_str(), if text == siblings { "a" } else { "r" }),
            other => panic!("expected duplicate id, got {other:?}"),
        }
    }
}

// ============================================================================
// Decorate hook
// ============================================================================

#[test]
fn test_decorator_sees_every_object() {
    let doc = forward_reference_document();
    let mut seen = Vec::new();

    let restored = deserialize_with(serialize(&doc), &mut |object: &mut AstObject| {
        seen.push(object.id.clone());
        object
            .settings
            .insert("decorated".to_string(), Value::Boolean(true));
    })
    .unwrap();

    assert_eq!(seen.len(), doc.object_count());
    assert!(
        restored
            .objects()
            .all(|object| object.get("decorated") == Some(&Value::Boolean(true)))
    );
}

#[test]
fn test_untagged_values_map_to_variants() {
    let value: PersistedValue = serde_json::from_str(r#"[true, "x", {"refId": "a"}]"#).unwrap();
    let PersistedValue::Sequence(items) = value else {
        panic!("expected a sequence");
    };
    assert!(matches!(items[0], PersistedValue::Boolean(true)));
    assert!(matches!(items[1], PersistedValue::String(_)));
    assert!(matches!(items[2], PersistedValue::Reference(_)));
}
