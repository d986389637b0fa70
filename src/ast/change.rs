use crate::ast::NodeId;

/// A mutation applied to a [`Document`](crate::ast::Document).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Change {
    /// A fresh object was created by the factory
    Created { node: NodeId, concept: String },

    /// A single-valued property was assigned
    PropertySet { node: NodeId, property: String },

    /// A single-valued property was deleted
    PropertyRemoved { node: NodeId, property: String },

    /// An element of a sequence-valued property was replaced (or appended)
    ElementReplaced {
        node: NodeId,
        property: String,
        index: usize,
    },

    /// An element of a sequence-valued property was spliced out
    ElementRemoved {
        node: NodeId,
        property: String,
        index: usize,
    },
}

/// Receives every [`Change`] made through a document's mutation primitives.
///
/// This is the seam a UI layer hooks into to observe edits; the document
/// itself knows nothing about what observers do with the notifications.
pub trait ChangeObserver {
    fn on_change(&mut self, change: &Change);
}

impl<F> ChangeObserver for F
where
    F: FnMut(&Change),
{
    fn on_change(&mut self, change: &Change) {
        self(change)
    }
}
