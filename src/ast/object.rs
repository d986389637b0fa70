use std::collections::BTreeMap;

use crate::{ast::NodeId, value::Value};

/// Property name to value mapping. Keys are kept sorted so that traversal and
/// serialization order is deterministic.
pub type Settings = BTreeMap<String, Value>;

/// Identity-bearing AST node.
///
/// Objects are created through [`Document::new_object`](crate::ast::Document::new_object)
/// (or by deserialization) and live in the document's arena; other objects
/// point at them by [`NodeId`].
#[derive(Debug, Clone, PartialEq)]
pub struct AstObject {
    pub id: NodeId,
    pub concept: String,
    pub settings: Settings,
}

impl AstObject {
    pub fn new(id: NodeId, concept: impl Into<String>, settings: Settings) -> Self {
        AstObject {
            id,
            concept: concept.into(),
            settings,
        }
    }

    pub fn get(&self, property: &str) -> Option<&Value> {
        self.settings.get(property)
    }

    /// String-valued property
    pub fn get_str(&self, property: &str) -> Option<&str> {
        self.get(property).and_then(Value::as_str)
    }

    pub fn is_a(&self, concept: &str) -> bool {
        self.concept == concept
    }

    /// True if `child` is stored directly under `property` as an owned object
    pub fn owns_at(&self, property: &str, child: &NodeId) -> bool {
        self.get(property).and_then(Value::as_object) == Some(child)
    }
}
