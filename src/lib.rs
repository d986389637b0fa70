pub mod ast;
#[cfg(feature = "cli")]
pub mod cli;
pub mod dependency;
pub mod diagnostic;
pub mod generator;
pub mod persist;
pub mod precedence;
pub mod render;
pub mod template;
pub mod value;

pub use ast::{AstError, AstObject, Document, NodeId, Resolution};
pub use dependency::{DependencyOrder, dependency_order_of};
pub use diagnostic::{Diagnostic, DiagnosticKind, DiagnosticPolicy, Generated, GenerationError};
pub use generator::{GenerateOptions, generate, generate_record_module};
pub use persist::{DeserializeError, deserialize, from_json, serialize, to_json, to_json_pretty};
pub use precedence::{Associativity, OperatorTable};
pub use render::{ExpressionRenderer, render_expression};
pub use template::{Fragment, as_string, indent};
pub use value::{Reference, Value};
