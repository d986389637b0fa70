use crate::{
    ast::{
        AstObject, Document, NodeId, Resolution,
        concepts::{self, properties},
    },
    value::Value,
};

/// A tree-reachable reference whose target id names no object in the document.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DanglingReference {
    /// Object holding the reference
    pub node: NodeId,
    /// Property holding the reference (possibly inside a sequence)
    pub property: String,
    /// The id that failed to resolve
    pub target: NodeId,
}

impl Document {
    /// Every object tree-reachable from `from` (including itself), depth-first
    /// and pre-order. Properties are visited in key order, sequences in
    /// element order. Reference edges are never followed.
    pub fn tree_objects(&self, from: &NodeId) -> Vec<&AstObject> {
        let mut objects = Vec::new();
        if let Some(object) = self.get(from) {
            self.visit(object, &mut objects);
        }
        objects
    }

    /// Find all instances of `concept` in the tree hanging off of `from`,
    /// including `from` itself.
    pub fn all_instances_of(&self, concept: &str, from: &NodeId) -> Vec<&AstObject> {
        self.tree_objects(from)
            .into_iter()
            .filter(|object| object.is_a(concept))
            .collect()
    }

    /// Instances of `concept` in the tree hanging off of an arbitrary value.
    pub fn all_instances_in_value(&self, concept: &str, value: &Value) -> Vec<&AstObject> {
        value
            .owned_ids()
            .into_iter()
            .flat_map(|id| self.all_instances_of(concept, id))
            .collect()
    }

    /// Every tree-reachable reference that names an id missing from the
    /// document.
    pub fn dangling_references(&self) -> Vec<DanglingReference> {
        let mut dangling = Vec::new();
        for object in self.tree_objects(self.root()) {
            for (property, value) in &object.settings {
                self.collect_dangling(object, property, value, &mut dangling);
            }
        }
        dangling
    }

    fn visit<'a>(&'a self, object: &'a AstObject, objects: &mut Vec<&'a AstObject>) {
        objects.push(object);
        for value in object.settings.values() {
            for child in value.owned_ids() {
                if let Some(child) = self.get(child) {
                    self.visit(child, objects);
                }
            }
        }
    }

    fn collect_dangling(
        &self,
        object: &AstObject,
        property: &str,
        value: &Value,
        dangling: &mut Vec<DanglingReference>,
    ) {
        match value {
            Value::Reference(reference) => {
                if let Resolution::Dangling(target) = self.resolve(reference) {
                    dangling.push(DanglingReference {
                        node: object.id.clone(),
                        property: property.to_string(),
                        target: target.clone(),
                    });
                }
            }
            Value::Sequence(items) => items
                .iter()
                .for_each(|item| self.collect_dangling(object, property, item, dangling)),
            _ => {}
        }
    }
}

/// True if the attribute's value is computed from an expression (as opposed to
/// being stored with an optional initial value).
pub fn is_computed_from_expression(attribute: &AstObject) -> bool {
    matches!(attribute.get(properties::VALUE), Some(Value::Object(_)))
}

/// The attributes read by an attribute's `initial value` and `value`
/// expressions: the resolved targets of every Attribute Reference in those
/// subtrees, without duplicates, in traversal order.
pub fn referenced_attributes_in_value(doc: &Document, attribute: &AstObject) -> Vec<NodeId> {
    let mut targets: Vec<NodeId> = Vec::new();
    for property in [properties::INITIAL_VALUE, properties::VALUE] {
        let Some(value) = attribute.get(property) else {
            continue;
        };
        for reference in doc.all_instances_in_value(concepts::ATTRIBUTE_REFERENCE, value) {
            let target = reference
                .get(properties::ATTRIBUTE)
                .and_then(Value::as_reference)
                .and_then(|r| doc.resolve(r).target());
            if let Some(target) = target {
                if !targets.contains(&target.id) {
                    targets.push(target.id.clone());
                }
            }
        }
    }
    targets
}
