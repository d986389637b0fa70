//! Generation diagnostics.
//!
//! Generation never aborts on a bad node. Each defect is recorded as a
//! [`Diagnostic`] and also written into the output in place of the text that
//! could not be produced, so the generated artifact shows where it went wrong:
//!
//! ```text
//! get total() {
//!     return this.price + /* [GENERATION PROBLEM] attribute reference is undefined */
//! }
//! ```
//!
//! Whether diagnostics are acceptable is up to the caller, via
//! [`Generated::into_result`] and a [`DiagnosticPolicy`].

use std::fmt;

use thiserror::Error;

use crate::ast::NodeId;

/// Marker text that starts every inline diagnostic placeholder
pub const PROBLEM_MARKER: &str = "[GENERATION PROBLEM]";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DiagnosticKind {
    /// Reference names an id that is not in the document
    DanglingReference,
    /// Reference without a target
    AbsentReference,
    /// A required property is not set
    MissingValue,
    /// A property holds a value of the wrong shape
    InvalidValue,
    /// No rendering rule for the node's concept
    UnhandledConcept,
    /// No rendering rule for the attribute type
    UnhandledType,
    /// Attributes read each other in a cycle; original order was kept
    CyclicDependency,
}

/// One generation defect.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Diagnostic {
    pub kind: DiagnosticKind,
    /// The offending node, when there is one
    pub node: Option<NodeId>,
    pub message: String,
}

impl Diagnostic {
    pub fn new(kind: DiagnosticKind, node: Option<&NodeId>, message: impl Into<String>) -> Self {
        Diagnostic {
            kind,
            node: node.cloned(),
            message: message.into(),
        }
    }

    /// Inline comment standing in for the output that could not be produced.
    pub fn placeholder(&self) -> String {
        format!("/* {PROBLEM_MARKER} {} */", self.message)
    }
}

impl fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.node {
            Some(node) => write!(f, "{:?} at {}: {}", self.kind, node, self.message),
            None => write!(f, "{:?}: {}", self.kind, self.message),
        }
    }
}

/// What to do with a result that carries diagnostics.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DiagnosticPolicy {
    /// Log them and keep the output
    #[default]
    Warn,
    /// Treat any diagnostic as a failed generation
    Deny,
}

/// Raised by [`Generated::into_result`] under [`DiagnosticPolicy::Deny`].
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum GenerationError {
    #[error("generation produced {} problem(s)", .0.len())]
    Denied(Vec<Diagnostic>),
}

/// Generated output together with the defects found while producing it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Generated<T> {
    pub output: T,
    pub diagnostics: Vec<Diagnostic>,
}

impl<T> Generated<T> {
    pub fn is_clean(&self) -> bool {
        self.diagnostics.is_empty()
    }

    /// Applies `policy`: under `Deny`, any diagnostic turns into an error.
    pub fn into_result(self, policy: DiagnosticPolicy) -> Result<T, GenerationError> {
        if self.diagnostics.is_empty() {
            return Ok(self.output);
        }
        match policy {
            DiagnosticPolicy::Deny => Err(GenerationError::Denied(self.diagnostics)),
            DiagnosticPolicy::Warn => {
                for diagnostic in &self.diagnostics {
                    tracing::warn!(%diagnostic, "generation problem");
                }
                Ok(self.output)
            }
        }
    }
}
