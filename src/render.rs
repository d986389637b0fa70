//! Expression rendering to JavaScript.
//!
//! Translates an expression subtree into infix JavaScript text. Parentheses
//! are inserted exactly where the [`OperatorTable`] says evaluation order
//! requires them, plus wherever the AST has an explicit Parentheses node.
//!
//! Rendering never fails. A node that cannot be rendered is replaced by an
//! inline [`PROBLEM_MARKER`](crate::diagnostic::PROBLEM_MARKER) comment and
//! recorded as a [`Diagnostic`].

use std::str::FromStr;

use rust_decimal::Decimal;

use crate::{
    ast::{
        AstObject, Document, Resolution,
        concepts::{self, properties},
    },
    diagnostic::{Diagnostic, DiagnosticKind, Generated},
    precedence::OperatorTable,
    template::camel_case,
    value::Value,
};

/// JavaScript spelling of a record-language operator.
pub fn js_operator_for(operator: &str) -> &str {
    match operator {
        "of" => "* 0.01 *",
        "^" => "**",
        other => other,
    }
}

/// Generated identifier for a named object (record type or attribute).
pub fn js_name_for(named: &AstObject) -> Option<String> {
    named
        .get_str(properties::NAME)
        .map(camel_case)
        .filter(|name| !name.is_empty())
}

/// Renders a single expression with a fresh renderer.
///
/// # Examples
///
/// ```
/// use formgen::ast::{concepts, Document, Settings};
/// use formgen::precedence::OperatorTable;
/// use formgen::render::render_expression;
/// use formgen::Value;
///
/// let mut doc = Document::new(concepts::RECORD_TYPE);
/// let number = doc
///     .new_object(concepts::NUMBER, Settings::from([("value".to_string(), Value::Integer(42))]))
///     .unwrap();
///
/// let rendered = render_expression(&doc, &OperatorTable::default(), &Value::Object(number));
/// assert_eq!(rendered.output, "42");
/// assert!(rendered.is_clean());
/// ```
pub fn render_expression(doc: &Document, operators: &OperatorTable, value: &Value) -> Generated<String> {
    let mut renderer = ExpressionRenderer::new(doc, operators);
    let output = renderer.render(value);
    Generated {
        output,
        diagnostics: renderer.into_diagnostics(),
    }
}

/// Recursive expression-to-text translator that collects diagnostics.
pub struct ExpressionRenderer<'a> {
    doc: &'a Document,
    operators: &'a OperatorTable,
    diagnostics: Vec<Diagnostic>,
}

impl<'a> ExpressionRenderer<'a> {
    pub fn new(doc: &'a Document, operators: &'a OperatorTable) -> Self {
        ExpressionRenderer {
            doc,
            operators,
            diagnostics: Vec::new(),
        }
    }

    pub fn document(&self) -> &'a Document {
        self.doc
    }

    pub fn into_diagnostics(self) -> Vec<Diagnostic> {
        self.diagnostics
    }

    /// Records a diagnostic and returns its inline placeholder.
    pub fn problem(
        &mut self,
        kind: DiagnosticKind,
        node: Option<&AstObject>,
        message: impl Into<String>,
    ) -> String {
        let diagnostic = Diagnostic::new(kind, node.map(|n| &n.id), message);
        let placeholder = diagnostic.placeholder();
        self.diagnostics.push(diagnostic);
        placeholder
    }

    /// Renders a top-level expression.
    pub fn render(&mut self, value: &Value) -> String {
        self.render_in(value, &[])
    }

    /// Renders `value`; `ancestors` lists the enclosing expression nodes, the
    /// immediate parent last.
    pub fn render_in(&mut self, value: &Value, ancestors: &[&'a AstObject]) -> String {
        let doc = self.doc;
        let Some(expr) = value.as_object().and_then(|id| doc.get(id)) else {
            return self.problem(
                DiagnosticKind::InvalidValue,
                None,
                format!("value {} isn't handled as an expression", describe(value)),
            );
        };

        match expr.concept.as_str() {
            concepts::ATTRIBUTE_REFERENCE => self.render_attribute_reference(expr),
            concepts::NUMBER => self.render_number(expr),
            concepts::BINARY_OPERATION => {
                let nested = with_parent(ancestors, expr);
                let left = self.render_operand(expr, properties::LEFT_OPERAND, &nested);
                // JavaScript rejects a unary minus directly before `**`.
                let left = if is_exponentiation(expr) && left.starts_with('-') {
                    format!("({left})")
                } else {
                    left
                };
                let operator = match expr.get_str(properties::OPERATOR) {
                    Some(operator) => js_operator_for(operator).to_string(),
                    None => self.problem(
                        DiagnosticKind::MissingValue,
                        Some(expr),
                        "binary operation's operator is undefined",
                    ),
                };
                let right = self.render_operand(expr, properties::RIGHT_OPERAND, &nested);
                let text = format!("{left} {operator} {right}");
                if self.operators.requires_parentheses(expr, ancestors.last().copied()) {
                    format!("({text})")
                } else {
                    text
                }
            }
            concepts::PARENTHESES => {
                let nested = with_parent(ancestors, expr);
                format!("({})", self.render_operand(expr, properties::SUB, &nested))
            }
            other => self.problem(
                DiagnosticKind::UnhandledConcept,
                Some(expr),
                format!("value of concept \"{other}\" isn't handled as an expression"),
            ),
        }
    }

    fn render_operand(
        &mut self,
        expr: &'a AstObject,
        property: &str,
        ancestors: &[&'a AstObject],
    ) -> String {
        match expr.get(property) {
            Some(value) => self.render_in(value, ancestors),
            None => self.problem(
                DiagnosticKind::MissingValue,
                Some(expr),
                format!("{}'s {property} is undefined", expr.concept.to_lowercase()),
            ),
        }
    }

    fn render_attribute_reference(&mut self, expr: &'a AstObject) -> String {
        let doc = self.doc;
        let resolution = match expr.get(properties::ATTRIBUTE) {
            Some(Value::Reference(reference)) => doc.resolve(reference),
            _ => Resolution::Absent,
        };
        match resolution {
            Resolution::Resolved(target) => match js_name_for(target) {
                Some(name) => format!("this.{name}"),
                None => self.problem(
                    DiagnosticKind::MissingValue,
                    Some(target),
                    "referenced attribute has no name",
                ),
            },
            Resolution::Dangling(id) => self.problem(
                DiagnosticKind::DanglingReference,
                Some(expr),
                format!("attribute reference to unknown object \"{id}\""),
            ),
            Resolution::Absent => self.problem(
                DiagnosticKind::AbsentReference,
                Some(expr),
                "attribute reference is undefined",
            ),
        }
    }

    fn render_number(&mut self, expr: &'a AstObject) -> String {
        match expr.get(properties::VALUE) {
            Some(Value::Integer(n)) => n.to_string(),
            // `f64` Display is the shortest round-tripping form and never
            // uses exponent notation; `3.0` prints as `3`.
            Some(Value::Float(n)) if n.is_finite() => n.to_string(),
            Some(Value::Float(n)) => self.problem(
                DiagnosticKind::InvalidValue,
                Some(expr),
                format!("number's value {n} is not finite"),
            ),
            Some(Value::String(text)) => match Decimal::from_str(text.trim()) {
                Ok(decimal) => decimal.to_string(),
                Err(_) => self.problem(
                    DiagnosticKind::InvalidValue,
                    Some(expr),
                    format!("number's value \"{text}\" is not a number"),
                ),
            },
            Some(other) => self.problem(
                DiagnosticKind::InvalidValue,
                Some(expr),
                format!("number's value {} is not a number", describe(other)),
            ),
            None => self.problem(
                DiagnosticKind::MissingValue,
                Some(expr),
                "number's value is undefined",
            ),
        }
    }
}

fn is_exponentiation(expr: &AstObject) -> bool {
    expr.get_str(properties::OPERATOR).map(js_operator_for) == Some("**")
}

fn with_parent<'a>(ancestors: &[&'a AstObject], parent: &'a AstObject) -> Vec<&'a AstObject> {
    let mut nested = ancestors.to_vec();
    nested.push(parent);
    nested
}

/// Short description of a value for diagnostic messages.
fn describe(value: &Value) -> String {
    match value {
        Value::Boolean(b) => format!("\"{b}\""),
        Value::Integer(n) => format!("\"{n}\""),
        Value::Float(n) => format!("\"{n}\""),
        Value::String(s) => format!("\"{s}\""),
        Value::Object(id) => format!("\"object {id}\""),
        Value::Reference(_) => "\"reference\"".to_string(),
        Value::Sequence(items) => format!("\"sequence of {}\"", items.len()),
    }
}
