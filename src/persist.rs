//! Persisted document format.
//!
//! A document is persisted as a JSON tree that mirrors the AST's ownership
//! tree. Reference edges are cut into `{"refId": ...}` stubs, which is what
//! makes the tree shape possible even when references form cycles:
//!
//! ```json
//! {
//!   "id": "r1",
//!   "concept": "Record Type",
//!   "settings": {
//!     "attributes": [
//!       { "id": "a1", "concept": "Data Attribute", "settings": { "name": "price" } },
//!       { "id": "a2", "concept": "Attribute Reference",
//!         "settings": { "attribute": { "refId": "a1" } } }
//!     ]
//!   }
//! }
//! ```
//!
//! [`serialize`] projects a [`Document`](crate::ast::Document) onto this form;
//! [`deserialize`] rebuilds the document, resolving references that point
//! forward as well as backward.
pub mod deserialize;
pub mod serialize;

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

pub use deserialize::{Decorate, DeserializeError, Identity, deserialize, deserialize_with, from_json};
pub use serialize::{serialize, serialize_value, to_json, to_json_pretty};

/// One node of the persisted document tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PersistedValue {
    /// `{id, concept, settings}`
    Object(PersistedObject),

    /// `{refId}`
    Reference(PersistedReference),

    Sequence(Vec<PersistedValue>),

    Boolean(bool),

    Integer(i64),

    Float(f64),

    String(String),
}

/// A persisted AST object.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedObject {
    pub id: String,
    pub concept: String,
    #[serde(default)]
    pub settings: BTreeMap<String, PersistedValue>,
}

/// A persisted reference edge. An absent target is written as `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PersistedReference {
    #[serde(rename = "refId", default)]
    pub ref_id: Option<String>,
}
