use std::fmt;

use uuid::Uuid;

/// Identifier of an [`AstObject`](crate::ast::AstObject), unique within a document.
///
/// Fresh ids are random (UUID v4, 122 random bits), which keeps the collision
/// probability negligible for documents with tens of thousands of objects.
/// Ids read back from a persisted document are kept verbatim.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct NodeId(String);

impl NodeId {
    /// Generate a fresh id
    pub fn generate() -> Self {
        NodeId(Uuid::new_v4().simple().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for NodeId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeId {
    fn from(s: &str) -> Self {
        NodeId(s.to_string())
    }
}

impl From<String> for NodeId {
    fn from(s: String) -> Self {
        NodeId(s)
    }
}
