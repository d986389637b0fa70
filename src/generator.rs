//! Record module generation.
//!
//! Generates a JavaScript module for a Record Type: a class holding one field
//! per attribute (computed attributes become getters) and a form component
//! binding every attribute to an input.
//!
//! ```text
//! class Rental {
//!     rentalPrice = 0.0
//!     get discount() {
//!         return 10 * 0.01 * this.rentalPrice
//!     }
//!     ...
//! ```
//!
//! Field initializers may read other fields, so fields are emitted in
//! dependency order. When the attributes read each other in a cycle the
//! authored order is kept and the cycle is reported as a diagnostic.

use std::collections::HashMap;

use crate::{
    ast::{
        AstObject, Document, NodeId,
        concepts::{self, properties},
        query::{is_computed_from_expression, referenced_attributes_in_value},
    },
    dependency::{DependencyOrder, dependency_order_of},
    diagnostic::{DiagnosticKind, DiagnosticPolicy, Generated},
    precedence::OperatorTable,
    render::{ExpressionRenderer, js_name_for},
    template::{Fragment, TemplatePrinter, indent, with_first_upper},
    value::Value,
};

/// Options controlling code generation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Spaces per indentation level
    pub indent_width: usize,
    /// Precedence table used to place parentheses
    pub operators: OperatorTable,
    /// How callers of [`Generated::into_result`] should treat diagnostics
    pub policy: DiagnosticPolicy,
}

impl Default for GenerateOptions {
    fn default() -> Self {
        GenerateOptions {
            indent_width: 4,
            operators: OperatorTable::default(),
            policy: DiagnosticPolicy::Warn,
        }
    }
}

/// Generates the module for the document's root, which must be a Record Type.
pub fn generate(doc: &Document, options: &GenerateOptions) -> Generated<String> {
    generate_record_module(doc, doc.root_object(), options)
}

/// Generates the module for `record`.
pub fn generate_record_module(
    doc: &Document,
    record: &AstObject,
    options: &GenerateOptions,
) -> Generated<String> {
    let mut generator = RecordGenerator {
        doc,
        renderer: ExpressionRenderer::new(doc, &options.operators),
    };
    let fragment = generator.record_module(record);
    let output = TemplatePrinter::new(options.indent_width).print(&fragment);
    let diagnostics = generator.renderer.into_diagnostics();

    tracing::debug!(
        record = %record.id,
        diagnostics = diagnostics.len(),
        "generated record module"
    );
    Generated {
        output,
        diagnostics,
    }
}

/// An attribute with its generated identifier, computed once.
struct NamedAttribute<'a> {
    object: &'a AstObject,
    name: String,
}

struct RecordGenerator<'a> {
    doc: &'a Document,
    renderer: ExpressionRenderer<'a>,
}

impl<'a> RecordGenerator<'a> {
    fn record_module(&mut self, record: &'a AstObject) -> Fragment {
        let mut preamble = Vec::new();
        if !record.is_a(concepts::RECORD_TYPE) {
            preamble.push(Fragment::from(self.renderer.problem(
                DiagnosticKind::UnhandledConcept,
                Some(record),
                format!("value of concept \"{}\" isn't a record type", record.concept),
            )));
        }

        let name = self.name_of(record, "record");
        let class_name = with_first_upper(&name);
        let attributes: Vec<NamedAttribute<'a>> = self
            .attributes_of(record)
            .into_iter()
            .map(|object| NamedAttribute {
                name: self.name_of(object, "attribute"),
                object,
            })
            .collect();
        let fields = self.class_fields(record, &attributes);
        let form_fields: Vec<Fragment> = attributes
            .iter()
            .map(|attribute| self.form_field(&name, attribute))
            .collect();

        Fragment::from(vec![
            Fragment::from(preamble),
            Fragment::from(format!(
                r#"import React from "react"
import {{ createRoot }} from "react-dom/client"
import {{ makeAutoObservable }} from "mobx"
import {{ observer }} from "mobx-react"

import {{ FormField, Input }} from "./components"
import {{ DateRange, Period }} from "./dates"

class {class_name} {{"#
            )),
            indent(1, fields),
            indent(
                1,
                vec![
                    Fragment::from("constructor() {"),
                    indent(1, "makeAutoObservable(this)"),
                    Fragment::from("}"),
                ],
            ),
            Fragment::from(format!(
                "}}\n\nconst {class_name}Form = observer(({{ {name} }}) => <form>"
            )),
            indent(1, form_fields),
            Fragment::from(format!(
                "</form>)\n\nconst {name} = new {class_name}()\n\ncreateRoot(document.getElementById(\"root\"))"
            )),
            indent(
                1,
                vec![
                    Fragment::from(".render("),
                    indent(1, format!("<{class_name}Form {name}={{{name}}} />")),
                    Fragment::from(")"),
                ],
            ),
            // trailing newline
            Fragment::from(""),
        ])
    }

    /// The attribute objects of `record`, in authored order.
    fn attributes_of(&mut self, record: &'a AstObject) -> Vec<&'a AstObject> {
        let doc = self.doc;
        let Some(items) = record.get(properties::ATTRIBUTES).and_then(Value::as_sequence) else {
            return Vec::new();
        };
        let mut attributes = Vec::with_capacity(items.len());
        for item in items {
            match item.as_object().and_then(|id| doc.get(id)) {
                Some(attribute) => attributes.push(attribute),
                None => {
                    self.renderer.problem(
                        DiagnosticKind::InvalidValue,
                        Some(record),
                        "record type has an attribute that is not an AST object",
                    );
                }
            }
        }
        attributes
    }

    fn class_fields(&mut self, record: &'a AstObject, attributes: &[NamedAttribute<'a>]) -> Vec<Fragment> {
        let doc = self.doc;
        let ids: Vec<NodeId> = attributes.iter().map(|a| a.object.id.clone()).collect();
        let by_id: HashMap<&NodeId, &NamedAttribute<'a>> =
            attributes.iter().map(|a| (&a.object.id, a)).collect();
        let order = dependency_order_of(&ids, |id| {
            doc.get(id)
                .map(|attribute| referenced_attributes_in_value(doc, attribute))
                .unwrap_or_default()
        });

        let mut fields = Vec::with_capacity(attributes.len() + 1);
        if let DependencyOrder::Unorderable(stuck) = &order {
            let names: Vec<String> = stuck
                .iter()
                .filter_map(|id| doc.get(id))
                .map(|attribute| format!("\"{}\"", attribute.get_str(properties::NAME).unwrap_or("?")))
                .collect();
            fields.push(Fragment::from(self.renderer.problem(
                DiagnosticKind::CyclicDependency,
                Some(record),
                format!("attributes {} depend on each other cyclically", names.join(", ")),
            )));
        }

        for id in order.or_original(&ids) {
            if let Some(attribute) = by_id.get(&id) {
                fields.push(self.class_field(attribute));
            }
        }
        fields
    }

    fn class_field(&mut self, named: &NamedAttribute<'a>) -> Fragment {
        let (attribute, field_name) = (named.object, &named.name);
        if let Some(value @ Value::Object(_)) = attribute.get(properties::VALUE) {
            return Fragment::from(vec![
                Fragment::from(format!("get {field_name}() {{")),
                indent(1, format!("return {}", self.renderer.render(value))),
                Fragment::from("}"),
            ]);
        }

        let initializer = match attribute.get(properties::INITIAL_VALUE) {
            Some(value @ Value::Object(_)) => self.renderer.render(value),
            _ => self.default_init_expression(attribute),
        };
        Fragment::from(format!("{field_name} = {initializer}"))
    }

    fn default_init_expression(&mut self, attribute: &'a AstObject) -> String {
        match attribute.get_str(properties::TYPE) {
            Some("amount") => "0.0".to_string(),
            Some("percentage") => "0".to_string(),
            Some("date range") => "new DateRange()".to_string(),
            Some("period in days") => "new Period()".to_string(),
            Some(other) => self.renderer.problem(
                DiagnosticKind::UnhandledType,
                Some(attribute),
                format!("type \"{other}\" has no default initial value"),
            ),
            None => self.renderer.problem(
                DiagnosticKind::MissingValue,
                Some(attribute),
                "attribute's type is undefined",
            ),
        }
    }

    fn form_field(&mut self, object_expr: &str, named: &NamedAttribute<'a>) -> Fragment {
        // An unnamed attribute already carries a placeholder as its name.
        let label = match named.object.get_str(properties::NAME) {
            Some(name) if !name.is_empty() => with_first_upper(name),
            _ => named.name.clone(),
        };
        Fragment::from(vec![
            Fragment::from(format!(r#"<FormField label="{label}">"#)),
            indent(1, self.form_field_inputs(object_expr, named)),
            Fragment::from("</FormField>"),
        ])
    }

    fn form_field_inputs(&mut self, object_expr: &str, named: &NamedAttribute<'a>) -> Fragment {
        let (attribute, field_name) = (named.object, &named.name);
        let computed = is_computed_from_expression(attribute);
        match attribute.get_str(properties::TYPE) {
            Some("amount") => Fragment::from(if computed {
                format!("$ {{{object_expr}.{field_name}.toFixed(2)}}")
            } else {
                format!("$ {}", form_field_input("number", object_expr, field_name))
            }),
            Some("percentage") => Fragment::from(if computed {
                format!("{{{object_expr}.{field_name}}} %")
            } else {
                format!("{} %", form_field_input("number", object_expr, field_name))
            }),
            Some("date range") | Some("period in days") => Fragment::from(
                ["from", "to"]
                    .iter()
                    .map(|sub_field| {
                        form_field_input("date", &format!("{object_expr}.{field_name}"), sub_field)
                    })
                    .collect::<Vec<_>>(),
            ),
            Some(other) => Fragment::from(self.renderer.problem(
                DiagnosticKind::UnhandledType,
                Some(attribute),
                format!("type \"{other}\" has no form input"),
            )),
            None => Fragment::from(self.renderer.problem(
                DiagnosticKind::MissingValue,
                Some(attribute),
                "attribute's type is undefined",
            )),
        }
    }

    /// Identifier for a named object, or a diagnostic standing in for it.
    fn name_of(&mut self, named: &'a AstObject, what: &str) -> String {
        match js_name_for(named) {
            Some(name) => name,
            None => self.renderer.problem(
                DiagnosticKind::MissingValue,
                Some(named),
                format!("{what}'s name is undefined"),
            ),
        }
    }
}

fn form_field_input(input_type: &str, object_expr: &str, field_name: &str) -> String {
    format!(r#"<Input type="{input_type}" object={{{object_expr}}} fieldName="{field_name}" />"#)
}
