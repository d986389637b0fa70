//! Concept tags and well-known property names of the record language.

/// A record type: `name` and a sequence of `attributes`
pub const RECORD_TYPE: &str = "Record Type";

/// An attribute: `name`, `type`, optional `initial value` and `value` expressions
pub const DATA_ATTRIBUTE: &str = "Data Attribute";

/// Reference to another attribute through its `attribute` property
pub const ATTRIBUTE_REFERENCE: &str = "Attribute Reference";

/// `left operand` `operator` `right operand`
pub const BINARY_OPERATION: &str = "Binary Operation";

/// Numeric literal held in `value`
pub const NUMBER: &str = "Number";

/// Explicit grouping of `sub`
pub const PARENTHESES: &str = "Parentheses";

pub mod properties {
    pub const NAME: &str = "name";
    pub const ATTRIBUTES: &str = "attributes";
    pub const TYPE: &str = "type";
    pub const INITIAL_VALUE: &str = "initial value";
    pub const VALUE: &str = "value";
    pub const ATTRIBUTE: &str = "attribute";
    pub const OPERATOR: &str = "operator";
    pub const LEFT_OPERAND: &str = "left operand";
    pub const RIGHT_OPERAND: &str = "right operand";
    pub const SUB: &str = "sub";
}
