use crate::ast::NodeId;

/// A property value stored in an [`AstObject`](crate::ast::AstObject)'s settings.
///
/// The variants separate the two kinds of edges a node can have:
///
/// - [`Value::Object`] is a **tree edge**: the referenced node is an owned child.
///   Tree edges always form a rooted tree.
/// - [`Value::Reference`] is a **reference edge**: it never owns its target, may
///   point forward in traversal order, and may form cycles.
///
/// # Examples
///
/// ```
/// use formgen::{Reference, Value};
/// use formgen::ast::NodeId;
///
/// let name = Value::from("rental price");
/// let count = Value::Integer(3);
/// let reference = Value::Reference(Reference::to(NodeId::from("abc")));
///
/// assert_eq!(name.as_str(), Some("rental price"));
/// assert!(count.is_primitive());
/// assert!(reference.as_reference().is_some());
/// ```
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    /// Boolean primitive
    Boolean(bool),

    /// Integer primitive (preserved separately from floats)
    Integer(i64),

    /// Floating-point primitive
    Float(f64),

    /// UTF-8 string primitive
    String(String),

    /// Owned child object (tree edge)
    Object(NodeId),

    /// Non-owning edge to another object
    Reference(Reference),

    /// Ordered sequence of values
    Sequence(Vec<Value>),
}

/// A non-owning edge to a target object, resolved by id.
///
/// The target may be absent (never set), or name an object the document does
/// not contain; see [`Document::resolve`](crate::ast::Document::resolve) for
/// how the three states are told apart.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Reference {
    target: Option<NodeId>,
}

impl Reference {
    /// Reference to the object with the given id.
    pub fn to(target: NodeId) -> Self {
        Reference {
            target: Some(target),
        }
    }

    /// Reference without a target.
    pub fn absent() -> Self {
        Reference { target: None }
    }

    /// Id of the target, if one was set.
    pub fn target(&self) -> Option<&NodeId> {
        self.target.as_ref()
    }
}

impl Value {
    /// True for booleans, numbers, and strings
    pub fn is_primitive(&self) -> bool {
        matches!(
            self,
            Value::Boolean(_) | Value::Integer(_) | Value::Float(_) | Value::String(_)
        )
    }

    /// Get as string slice
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Get the id of an owned child
    pub fn as_object(&self) -> Option<&NodeId> {
        match self {
            Value::Object(id) => Some(id),
            _ => None,
        }
    }

    /// Get as reference edge
    pub fn as_reference(&self) -> Option<&Reference> {
        match self {
            Value::Reference(r) => Some(r),
            _ => None,
        }
    }

    /// Get as sequence
    pub fn as_sequence(&self) -> Option<&[Value]> {
        match self {
            Value::Sequence(items) => Some(items),
            _ => None,
        }
    }

    /// False if the value holds a NaN or infinite float, directly or inside a
    /// sequence. JSON has no spelling for those.
    pub fn is_finite(&self) -> bool {
        match self {
            Value::Float(n) => n.is_finite(),
            Value::Sequence(items) => items.iter().all(Value::is_finite),
            _ => true,
        }
    }

    /// Ids of the children this value owns directly, including those nested
    /// in sequences. Reference targets are not included.
    pub fn owned_ids(&self) -> Vec<&NodeId> {
        let mut ids = Vec::new();
        collect_owned(self, &mut ids);
        ids
    }
}

fn collect_owned<'a>(value: &'a Value, ids: &mut Vec<&'a NodeId>) {
    match value {
        Value::Object(id) => ids.push(id),
        Value::Sequence(items) => items.iter().for_each(|item| collect_owned(item, ids)),
        _ => {}
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Boolean(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Self {
        Value::Integer(n)
    }
}

impl From<f64> for Value {
    fn from(n: f64) -> Self {
        Value::Float(n)
    }
}

impl From<NodeId> for Value {
    fn from(id: NodeId) -> Self {
        Value::Object(id)
    }
}

impl From<Reference> for Value {
    fn from(r: Reference) -> Self {
        Value::Reference(r)
    }
}

impl From<Vec<Value>> for Value {
    fn from(items: Vec<Value>) -> Self {
        Value::Sequence(items)
    }
}
