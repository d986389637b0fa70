use std::collections::HashMap;

use thiserror::Error;

use crate::{
    ast::{AstObject, Document, NodeId, Settings},
    persist::{PersistedObject, PersistedValue},
    value::{Reference, Value},
};

/// Errors for persisted documents that cannot be turned into an AST.
#[derive(Debug, Error)]
pub enum DeserializeError {
    /// Not JSON, or JSON that does not have the persisted shape
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),

    /// The top-level value is not an `{id, concept, settings}` object
    #[error("the document root is not an AST object")]
    RootNotAnObject,

    /// Two objects in the document carry the same id
    #[error("duplicate object id: {0}")]
    DuplicateId(NodeId),
}

/// Hook applied to every freshly built object before it is linked into the
/// document.
///
/// Only objects are decorated. Sequences and reference edges are plain values
/// of their owner's settings, with no identity of their own, so a decorator
/// sees them through the object that holds them.
///
/// Decorators may attach whatever bookkeeping they need but must leave the
/// object's owned children and references as they are.
pub trait Decorate {
    fn decorate(&mut self, object: &mut AstObject);
}

impl<F> Decorate for F
where
    F: FnMut(&mut AstObject),
{
    fn decorate(&mut self, object: &mut AstObject) {
        self(object)
    }
}

/// The decorator that leaves objects untouched.
#[derive(Debug, Clone, Copy, Default)]
pub struct Identity;

impl Decorate for Identity {
    fn decorate(&mut self, _object: &mut AstObject) {}
}

/// Rebuilds a document from its persisted form.
///
/// A `refId` naming no object in the document leaves that one reference
/// dangling; it does not fail the whole document.
pub fn deserialize(document: PersistedValue) -> Result<Document, DeserializeError> {
    deserialize_with(document, &mut Identity)
}

/// Parses JSON text and rebuilds the document it describes.
pub fn from_json(text: &str) -> Result<Document, DeserializeError> {
    let document: PersistedValue = serde_json::from_str(text)?;
    deserialize(document)
}

/// Like [`deserialize`], running `decorate` over every object as it is built.
pub fn deserialize_with<D>(document: PersistedValue, decorate: &mut D) -> Result<Document, DeserializeError>
where
    D: Decorate + ?Sized,
{
    let PersistedValue::Object(root) = document else {
        return Err(DeserializeError::RootNotAnObject);
    };

    // Pass 1: build every object, collecting reference sites.
    let mut builder = Builder {
        objects: HashMap::new(),
        pending: Vec::new(),
        decorate,
    };
    let root = builder.build_object(root)?;

    // Pass 2: match every reference site against the id table.
    let Builder { objects, pending, .. } = builder;
    let mut unresolved = 0;
    for site in &pending {
        if !objects.contains_key(&site.target) {
            unresolved += 1;
            tracing::warn!(
                node = %site.node,
                property = %site.property,
                target = %site.target,
                "reference does not resolve"
            );
        }
    }
    tracing::debug!(
        objects = objects.len(),
        references = pending.len(),
        unresolved,
        "deserialized document"
    );

    Ok(Document::from_arena(root, objects))
}

/// A reference encountered in pass 1.
struct PendingReference {
    target: NodeId,
    node: NodeId,
    property: String,
}

struct Builder<'d, D: ?Sized> {
    objects: HashMap<NodeId, AstObject>,
    pending: Vec<PendingReference>,
    decorate: &'d mut D,
}

impl<D> Builder<'_, D>
where
    D: Decorate + ?Sized,
{
    fn build_object(&mut self, persisted: PersistedObject) -> Result<NodeId, DeserializeError> {
        let id = NodeId::from(persisted.id);
        if self.objects.contains_key(&id) {
            return Err(DeserializeError::DuplicateId(id));
        }

        let mut settings = Settings::new();
        for (property, value) in persisted.settings {
            let value = self.build_value(&id, &property, value)?;
            settings.insert(property, value);
        }

        let mut object = AstObject::new(id.clone(), persisted.concept, settings);
        self.decorate.decorate(&mut object);

        // Children were inserted first; a child reusing this id shows up here.
        if self.objects.insert(id.clone(), object).is_some() {
            return Err(DeserializeError::DuplicateId(id));
        }
        Ok(id)
    }

    fn build_value(
        &mut self,
        owner: &NodeId,
        property: &str,
        persisted: PersistedValue,
    ) -> Result<Value, DeserializeError> {
        Ok(match persisted {
            PersistedValue::Object(object) => Value::Object(self.build_object(object)?),
            PersistedValue::Reference(reference) => match reference.ref_id {
                Some(target) => {
                    let target = NodeId::from(target);
                    self.pending.push(PendingReference {
                        target: target.clone(),
                        node: owner.clone(),
                        property: property.to_string(),
                    });
                    Value::Reference(Reference::to(target))
                }
                None => Value::Reference(Reference::absent()),
            },
            PersistedValue::Sequence(items) => Value::Sequence(
                items
                    .into_iter()
                    .map(|item| self.build_value(owner, property, item))
                    .collect::<Result<_, _>>()?,
            ),
            PersistedValue::Boolean(b) => Value::Boolean(b),
            PersistedValue::Integer(n) => Value::Integer(n),
            PersistedValue::Float(n) => Value::Float(n),
            PersistedValue::String(s) => Value::String(s),
        })
    }
}
