use std::{
    collections::{HashMap, HashSet},
    fmt,
};

use thiserror::Error;

use crate::{
    ast::{AstObject, Change, ChangeObserver, NodeId, Settings},
    value::{Reference, Value},
};

/// Errors from misusing the document's factory and mutation primitives.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum AstError {
    /// No object with this id lives in the document
    #[error("unknown node: {0}")]
    UnknownNode(NodeId),

    /// The property is missing or does not hold a sequence
    #[error("property '{property}' of {node} is not a sequence")]
    NotASequence { node: NodeId, property: String },

    /// Element index past the end of a sequence
    #[error("index {index} is out of bounds for property '{property}' of {node} (length {len})")]
    IndexOutOfBounds {
        node: NodeId,
        property: String,
        index: usize,
        len: usize,
    },

    /// The child is already owned somewhere else in the tree
    #[error("{child} is already owned by {owner}")]
    AlreadyOwned { child: NodeId, owner: NodeId },

    /// The child is the parent itself or one of its ancestors
    #[error("attaching {child} under {parent} would create an ownership cycle")]
    OwnershipCycle { child: NodeId, parent: NodeId },

    /// The document root can never be owned
    #[error("the root {0} cannot be attached as a child")]
    RootAsChild(NodeId),

    /// NaN and infinite floats cannot be persisted
    #[error("property '{property}' of {node} would hold a non-finite number")]
    NonFiniteNumber { node: NodeId, property: String },
}

/// How a [`Reference`] resolves against a document.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Resolution<'a> {
    /// The target lives in the document
    Resolved(&'a AstObject),

    /// The reference names an id the document does not contain
    Dangling(&'a NodeId),

    /// The reference has no target
    Absent,
}

impl<'a> Resolution<'a> {
    pub fn target(self) -> Option<&'a AstObject> {
        match self {
            Resolution::Resolved(object) => Some(object),
            _ => None,
        }
    }
}

/// Arena holding every object of one AST, keyed by id.
///
/// Owned children are stored as [`Value::Object`] handles, references as
/// [`Value::Reference`] handles; neither is a pointer, so reference cycles
/// never become ownership cycles. The document tracks each child's owner and
/// refuses mutations that would break the tree shape.
///
/// Objects that become unreachable from the root stay in the arena (references
/// to them keep resolving) until [`Document::prune`] drops them.
pub struct Document {
    root: NodeId,
    objects: HashMap<NodeId, AstObject>,
    parents: HashMap<NodeId, NodeId>,
    observer: Option<Box<dyn ChangeObserver>>,
}

impl fmt::Debug for Document {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Document")
            .field("root", &self.root)
            .field("objects", &self.objects.len())
            .field("observed", &self.observer.is_some())
            .finish()
    }
}

impl Document {
    /// Creates a document whose root is a fresh object of the given concept.
    pub fn new(root_concept: &str) -> Self {
        let root = AstObject::new(NodeId::generate(), root_concept, Settings::new());
        let root_id = root.id.clone();
        Document {
            root: root_id.clone(),
            objects: HashMap::from([(root_id, root)]),
            parents: HashMap::new(),
            observer: None,
        }
    }

    /// Assembles a document from already-built objects. The caller guarantees
    /// that `objects` contains `root` and that the owned edges form a tree.
    pub(crate) fn from_arena(root: NodeId, objects: HashMap<NodeId, AstObject>) -> Self {
        let mut parents = HashMap::new();
        for object in objects.values() {
            for value in object.settings.values() {
                for child in value.owned_ids() {
                    parents.insert(child.clone(), object.id.clone());
                }
            }
        }
        Document {
            root,
            objects,
            parents,
            observer: None,
        }
    }

    pub fn root(&self) -> &NodeId {
        &self.root
    }

    pub fn root_object(&self) -> &AstObject {
        // The root is never removed from the arena.
        &self.objects[&self.root]
    }

    pub fn get(&self, id: &NodeId) -> Option<&AstObject> {
        self.objects.get(id)
    }

    pub fn contains(&self, id: &NodeId) -> bool {
        self.objects.contains_key(id)
    }

    /// Number of objects in the arena, including detached ones
    pub fn object_count(&self) -> usize {
        self.objects.len()
    }

    pub fn objects(&self) -> impl Iterator<Item = &AstObject> {
        self.objects.values()
    }

    /// Owner of an attached child; `None` for the root and detached objects
    pub fn parent_of(&self, id: &NodeId) -> Option<&NodeId> {
        self.parents.get(id)
    }

    /// Installs the observer notified of every subsequent change.
    pub fn set_observer(&mut self, observer: impl ChangeObserver + 'static) {
        self.observer = Some(Box::new(observer));
    }

    pub fn clear_observer(&mut self) {
        self.observer = None;
    }

    fn notify(&mut self, change: Change) {
        if let Some(observer) = self.observer.as_mut() {
            observer.on_change(&change);
        }
    }

    // ------------------------------------------------------------------
    // Structural predicates
    // ------------------------------------------------------------------

    /// True if `value` is an owned object that lives in this document.
    pub fn is_ast_object(&self, value: &Value) -> bool {
        value.as_object().is_some_and(|id| self.contains(id))
    }

    /// True only if `value` is a reference whose target resolves.
    ///
    /// Dangling and absent references are *not* references by this predicate;
    /// use [`Document::resolve`] to tell those two apart.
    pub fn is_ast_reference(&self, value: &Value) -> bool {
        value
            .as_reference()
            .is_some_and(|r| matches!(self.resolve(r), Resolution::Resolved(_)))
    }

    pub fn resolve<'a>(&'a self, reference: &'a Reference) -> Resolution<'a> {
        match reference.target() {
            None => Resolution::Absent,
            Some(id) => match self.objects.get(id) {
                Some(object) => Resolution::Resolved(object),
                None => Resolution::Dangling(id),
            },
        }
    }

    // ------------------------------------------------------------------
    // Factory
    // ------------------------------------------------------------------

    /// Creates a detached object with a fresh id. Objects in `settings` become
    /// its owned children.
    pub fn new_object(&mut self, concept: &str, settings: Settings) -> Result<NodeId, AstError> {
        let id = NodeId::generate();
        for (property, value) in &settings {
            check_finite(&id, property, value)?;
        }
        let children = Value::Sequence(settings.values().cloned().collect());
        self.check_attachable(&id, &children, None)?;
        for value in settings.values() {
            adopt(&mut self.parents, &id, value);
        }
        self.objects
            .insert(id.clone(), AstObject::new(id.clone(), concept, settings));
        self.notify(Change::Created {
            node: id.clone(),
            concept: concept.to_string(),
        });
        Ok(id)
    }

    /// Reference value pointing at an object of this document.
    pub fn reference_to(&self, target: &NodeId) -> Result<Value, AstError> {
        if !self.contains(target) {
            return Err(AstError::UnknownNode(target.clone()));
        }
        Ok(Value::Reference(Reference::to(target.clone())))
    }

    // ------------------------------------------------------------------
    // Mutation primitives
    // ------------------------------------------------------------------

    /// Assigns `property` of `node`; `None` removes the property.
    ///
    /// Owned children of the previous value are detached.
    pub fn replace_single_value(
        &mut self,
        node: &NodeId,
        property: &str,
        new_value: Option<Value>,
    ) -> Result<(), AstError> {
        let old = self.object(node)?.settings.get(property).cloned();
        if let Some(value) = &new_value {
            check_finite(node, property, value)?;
            self.check_attachable(node, value, old.as_ref())?;
        }
        if let Some(old) = &old {
            release(&mut self.parents, old);
        }

        let change = match new_value {
            Some(value) => {
                adopt(&mut self.parents, node, &value);
                self.object_mut(node)?
                    .settings
                    .insert(property.to_string(), value);
                Change::PropertySet {
                    node: node.clone(),
                    property: property.to_string(),
                }
            }
            None => {
                self.object_mut(node)?.settings.remove(property);
                Change::PropertyRemoved {
                    node: node.clone(),
                    property: property.to_string(),
                }
            }
        };
        self.notify(change);
        Ok(())
    }

    /// Replaces the element at `index` of the sequence held by `property`.
    ///
    /// `None` splices the element out, shifting later elements down by one.
    /// `Some` at `index == len` appends.
    pub fn replace_in_multiple_value(
        &mut self,
        node: &NodeId,
        property: &str,
        index: usize,
        new_value: Option<Value>,
    ) -> Result<(), AstError> {
        let items = self.sequence(node, property)?;
        let len = items.len();
        let limit = if new_value.is_some() { len + 1 } else { len };
        if index >= limit {
            return Err(AstError::IndexOutOfBounds {
                node: node.clone(),
                property: property.to_string(),
                index,
                len,
            });
        }
        let old = items.get(index).cloned();

        if let Some(value) = &new_value {
            check_finite(node, property, value)?;
            self.check_attachable(node, value, old.as_ref())?;
        }
        if let Some(old) = &old {
            release(&mut self.parents, old);
        }

        let change = match new_value {
            Some(value) => {
                adopt(&mut self.parents, node, &value);
                let items = self.sequence_mut(node, property)?;
                if index == items.len() {
                    items.push(value);
                } else {
                    items[index] = value;
                }
                Change::ElementReplaced {
                    node: node.clone(),
                    property: property.to_string(),
                    index,
                }
            }
            None => {
                self.sequence_mut(node, property)?.remove(index);
                Change::ElementRemoved {
                    node: node.clone(),
                    property: property.to_string(),
                    index,
                }
            }
        };
        self.notify(change);
        Ok(())
    }

    /// Drops every object that is not tree-reachable from the root and returns
    /// how many were removed. References to removed objects become dangling.
    pub fn prune(&mut self) -> usize {
        let reachable: HashSet<NodeId> = self
            .tree_objects(&self.root)
            .into_iter()
            .map(|object| object.id.clone())
            .collect();
        let before = self.objects.len();
        self.objects.retain(|id, _| reachable.contains(id));
        self.parents.retain(|child, _| reachable.contains(child));
        let removed = before - self.objects.len();
        tracing::debug!(removed, remaining = self.objects.len(), "pruned detached objects");
        removed
    }

    fn object(&self, id: &NodeId) -> Result<&AstObject, AstError> {
        self.objects
            .get(id)
            .ok_or_else(|| AstError::UnknownNode(id.clone()))
    }

    fn object_mut(&mut self, id: &NodeId) -> Result<&mut AstObject, AstError> {
        self.objects
            .get_mut(id)
            .ok_or_else(|| AstError::UnknownNode(id.clone()))
    }

    fn sequence(&self, node: &NodeId, property: &str) -> Result<&Vec<Value>, AstError> {
        match self.object(node)?.settings.get(property) {
            Some(Value::Sequence(items)) => Ok(items),
            _ => Err(AstError::NotASequence {
                node: node.clone(),
                property: property.to_string(),
            }),
        }
    }

    fn sequence_mut(&mut self, node: &NodeId, property: &str) -> Result<&mut Vec<Value>, AstError> {
        match self.object_mut(node)?.settings.get_mut(property) {
            Some(Value::Sequence(items)) => Ok(items),
            _ => Err(AstError::NotASequence {
                node: node.clone(),
                property: property.to_string(),
            }),
        }
    }

    /// Checks that every child owned by `value` may be placed under `parent`,
    /// given that `replaced` (the value currently in that slot) is released.
    fn check_attachable(
        &self,
        parent: &NodeId,
        value: &Value,
        replaced: Option<&Value>,
    ) -> Result<(), AstError> {
        let released: HashSet<&NodeId> = replaced
            .map(Value::owned_ids)
            .unwrap_or_default()
            .into_iter()
            .collect();
        let mut seen = HashSet::new();

        for child in value.owned_ids() {
            if !self.contains(child) {
                return Err(AstError::UnknownNode(child.clone()));
            }
            if *child == self.root {
                return Err(AstError::RootAsChild(child.clone()));
            }
            if !seen.insert(child) {
                return Err(AstError::AlreadyOwned {
                    child: child.clone(),
                    owner: parent.clone(),
                });
            }
            if let Some(owner) = self.parents.get(child) {
                if !(owner == parent && released.contains(child)) {
                    return Err(AstError::AlreadyOwned {
                        child: child.clone(),
                        owner: owner.clone(),
                    });
                }
            }
            let mut ancestor = Some(parent);
            while let Some(current) = ancestor {
                if current == child {
                    return Err(AstError::OwnershipCycle {
                        child: child.clone(),
                        parent: parent.clone(),
                    });
                }
                ancestor = self.parents.get(current);
            }
        }
        Ok(())
    }
}

fn check_finite(node: &NodeId, property: &str, value: &Value) -> Result<(), AstError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(AstError::NonFiniteNumber {
            node: node.clone(),
            property: property.to_string(),
        })
    }
}

fn adopt(parents: &mut HashMap<NodeId, NodeId>, parent: &NodeId, value: &Value) {
    for child in value.owned_ids() {
        parents.insert(child.clone(), parent.clone());
    }
}

fn release(parents: &mut HashMap<NodeId, NodeId>, value: &Value) {
    for child in value.owned_ids() {
        parents.remove(child);
    }
}
