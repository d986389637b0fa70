//! # Record Model - Abstract Syntax Tree
//!
//! This module defines the in-memory AST for user-authored data models: record
//! types, their attributes, and the expressions that initialize or compute
//! attribute values. The AST is always built programmatically (there is no
//! text parser); it is persisted through [`crate::persist`].
//!
//! ## Architecture Overview
//!
//! - **[id]** - Generated node identifiers
//! - **[object]** - The identity-bearing [`AstObject`] node
//! - **[document]** - The [`Document`] arena: factory, mutation, resolution
//! - **[change]** - Change notifications reported by mutations
//! - **[query]** - Tree traversals and domain queries
//! - **[concepts]** - The concept vocabulary
//!
//! ## Core Concepts
//!
//! ### Tree edges vs. reference edges
//!
//! Every object is owned by exactly one parent (except the root), so the
//! ownership edges form a tree. References are plain id handles resolved
//! through the document, so they may point anywhere, including at an ancestor:
//!
//! ```text
//! Record Type "rental"
//! └── attributes: [
//!       Data Attribute "rental price"
//!       Data Attribute "discount"
//!       └── value: Binary Operation "of"
//!           ├── left operand:  Number 10
//!           └── right operand: Attribute Reference ──ref──▶ "rental price"
//!     ]
//! ```
//!
//! Traversals that enumerate nodes follow tree edges only, so they terminate
//! even when references form cycles.
//!
//! ## Examples
//!
//! ```
//! use formgen::ast::{concepts, Document};
//!
//! let mut doc = Document::new(concepts::RECORD_TYPE);
//! let root = doc.root().clone();
//! doc.replace_single_value(&root, "name", Some("rental".into())).unwrap();
//!
//! assert_eq!(doc.all_instances_of(concepts::RECORD_TYPE, &root).len(), 1);
//! ```
pub mod change;
pub mod concepts;
pub mod document;
pub mod id;
pub mod object;
pub mod query;

pub use change::{Change, ChangeObserver};
pub use document::{AstError, Document, Resolution};
pub use id::NodeId;
pub use object::{AstObject, Settings};
pub use query::DanglingReference;
