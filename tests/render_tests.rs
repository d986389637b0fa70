use formgen::ast::{Document, NodeId, Settings, concepts};
use formgen::diagnostic::{DiagnosticKind, PROBLEM_MARKER};
use formgen::precedence::{Associativity, OperatorTable};
use formgen::render::render_expression;
use formgen::persist::deserialize_with;
use formgen::{AstObject, Generated, Reference, Value};

fn settings(pairs: Vec<(&str, Value)>) -> Settings {
    pairs.into_iter().map(|(k, v)| (k.to_string(), v)).collect()
}

fn number(doc: &mut Document, n: i64) -> Value {
    Value::Object(
        doc.new_object(concepts::NUMBER, settings(vec![("value", Value::Integer(n))]))
            .unwrap(),
    )
}

fn binary(doc: &mut Document, operator: &str, left: Value, right: Value) -> Value {
    Value::Object(
        doc.new_object(
            concepts::BINARY_OPERATION,
            settings(vec![
                ("operator", operator.into()),
                ("left operand", left),
                ("right operand", right),
            ]),
        )
        .unwrap(),
    )
}

fn parentheses(doc: &mut Document, sub: Value) -> Value {
    Value::Object(
        doc.new_object(concepts::PARENTHESES, settings(vec![("sub", sub)]))
            .unwrap(),
    )
}

fn attribute_reference(doc: &mut Document, attribute: Value) -> Value {
    Value::Object(
        doc.new_object(concepts::ATTRIBUTE_REFERENCE, settings(vec![("attribute", attribute)]))
            .unwrap(),
    )
}

fn render(doc: &Document, value: &Value) -> Generated<String> {
    render_expression(doc, &OperatorTable::default(), value)
}

fn render_clean(doc: &Document, value: &Value) -> String {
    let rendered = render(doc, value);
    assert!(rendered.is_clean(), "unexpected diagnostics: {:?}", rendered.diagnostics);
    rendered.output
}

// ============================================================================
// Minimal parenthesization
// ============================================================================

#[test]
fn test_lower_precedence_operand_is_parenthesized() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let sum = binary(&mut doc, "+", two, three);
    let expr = binary(&mut doc, "*", sum, four);

    assert_eq!(render_clean(&doc, &expr), "(2 + 3) * 4");
}

#[test]
fn test_higher_precedence_operand_is_not_parenthesized() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let product = binary(&mut doc, "*", three, four);
    let expr = binary(&mut doc, "+", two, product);

    assert_eq!(render_clean(&doc, &expr), "2 + 3 * 4");
}

#[test]
fn test_left_associative_chain() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let left = binary(&mut doc, "-", two, three);
    let expr = binary(&mut doc, "-", left, four);

    assert_eq!(render_clean(&doc, &expr), "2 - 3 - 4");
}

#[test]
fn test_right_nested_subtraction_is_parenthesized() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let right = binary(&mut doc, "-", three, four);
    let expr = binary(&mut doc, "-", two, right);

    assert_eq!(render_clean(&doc, &expr), "2 - (3 - 4)");
}

#[test]
fn test_equal_precedence_mixed_operators() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let right = binary(&mut doc, "+", three, four);
    let expr = binary(&mut doc, "-", two, right);

    assert_eq!(render_clean(&doc, &expr), "2 - (3 + 4)");
}

#[test]
fn test_exponentiation_is_right_associative() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let right = binary(&mut doc, "^", three, four);
    let expr = binary(&mut doc, "^", two, right);
    assert_eq!(render_clean(&doc, &expr), "2 ** 3 ** 4");

    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let left = binary(&mut doc, "^", two, three);
    let expr = binary(&mut doc, "^", left, four);
    assert_eq!(render_clean(&doc, &expr), "(2 ** 3) ** 4");
}

#[test]
fn test_of_renders_as_percentage_product() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (ten, price) = (number(&mut doc, 10), number(&mut doc, 250));
    let expr = binary(&mut doc, "of", ten, price);

    assert_eq!(render_clean(&doc, &expr), "10 * 0.01 * 250");
}

#[test]
fn test_parentheses_node_is_always_kept() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let product = binary(&mut doc, "*", two, three);
    let wrapped = parentheses(&mut doc, product);
    let expr = binary(&mut doc, "+", wrapped, four);

    assert_eq!(render_clean(&doc, &expr), "(2 * 3) + 4");
}

#[test]
fn test_operand_inside_parentheses_node_is_not_doubled() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let sum = binary(&mut doc, "+", two, three);
    let wrapped = parentheses(&mut doc, sum);
    let expr = binary(&mut doc, "*", wrapped, four);

    assert_eq!(render_clean(&doc, &expr), "(2 + 3) * 4");
}

#[test]
fn test_custom_operator_table() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let right = binary(&mut doc, "-", three, four);
    let expr = binary(&mut doc, "-", two, right);

    let table = OperatorTable::new([vec!["-", "+"]]).with_associativity("-", Associativity::Right);
    let rendered = render_expression(&doc, &table, &expr);

    assert_eq!(rendered.output, "2 - 3 - 4");
}

#[test]
fn test_unknown_operator_is_parenthesized() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three, four) = (number(&mut doc, 2), number(&mut doc, 3), number(&mut doc, 4));
    let inner = binary(&mut doc, "%", two, three);
    let expr = binary(&mut doc, "+", inner, four);

    assert_eq!(render_clean(&doc, &expr), "(2 % 3) + 4");
}

// ============================================================================
// Leaves
// ============================================================================

#[test]
fn test_number_values() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    for (value, expected) in [
        (Value::Integer(-7), "-7"),
        (Value::Float(2.5), "2.5"),
        (Value::Float(3.0), "3"),
        (Value::Float(1e-30), "0.000000000000000000000000000001"),
        (Value::Float(1e30), "1000000000000000000000000000000"),
        (Value::from("12.50"), "12.50"),
    ] {
        let id = doc
            .new_object(concepts::NUMBER, settings(vec![("value", value)]))
            .unwrap();
        assert_eq!(render_clean(&doc, &Value::Object(id)), expected);
    }
}

#[test]
fn test_non_finite_number_is_reported() {
    let persisted = serde_json::from_str(
        r#"{ "id": "n", "concept": "Number", "settings": { "value": 1.0 } }"#,
    )
    .unwrap();
    // Mutation primitives refuse non-finite floats; a decorator can still
    // plant one.
    let doc = deserialize_with(persisted, &mut |object: &mut AstObject| {
        object
            .settings
            .insert("value".to_string(), Value::Float(f64::INFINITY));
    })
    .unwrap();

    let rendered = render(&doc, &Value::Object(NodeId::from("n")));

    assert_eq!(
        rendered.output,
        format!("/* {PROBLEM_MARKER} number's value inf is not finite */")
    );
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::InvalidValue);
}

#[test]
fn test_negative_base_of_exponentiation_is_parenthesized() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (minus_two, two) = (number(&mut doc, -2), number(&mut doc, 2));
    let expr = binary(&mut doc, "^", minus_two, two);
    assert_eq!(render_clean(&doc, &expr), "(-2) ** 2");

    let (two, minus_two) = (number(&mut doc, 2), number(&mut doc, -2));
    let expr = binary(&mut doc, "^", two, minus_two);
    assert_eq!(render_clean(&doc, &expr), "2 ** -2");

    let (minus_two, two) = (number(&mut doc, -2), number(&mut doc, 2));
    let expr = binary(&mut doc, "*", minus_two, two);
    assert_eq!(render_clean(&doc, &expr), "-2 * 2");
}

#[test]
fn test_attribute_reference_renders_field_access() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let price = doc
        .new_object(
            concepts::DATA_ATTRIBUTE,
            settings(vec![("name", "rental price".into())]),
        )
        .unwrap();
    let edge = doc.reference_to(&price).unwrap();
    let expr = attribute_reference(&mut doc, edge);

    assert_eq!(render_clean(&doc, &expr), "this.rentalPrice");
}

// ============================================================================
// Problems
// ============================================================================

#[test]
fn test_dangling_reference_becomes_marker() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let edge = Value::Reference(Reference::to(NodeId::from("gone")));
    let expr = attribute_reference(&mut doc, edge);

    let rendered = render(&doc, &expr);

    assert_eq!(
        rendered.output,
        format!("/* {PROBLEM_MARKER} attribute reference to unknown object \"gone\" */")
    );
    assert_eq!(rendered.diagnostics.len(), 1);
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::DanglingReference);
    assert_eq!(rendered.diagnostics[0].node.as_ref(), expr.as_object());
}

#[test]
fn test_absent_reference_becomes_marker() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let expr = attribute_reference(&mut doc, Value::Reference(Reference::absent()));
    let unset = Value::Object(
        doc.new_object(concepts::ATTRIBUTE_REFERENCE, Settings::new())
            .unwrap(),
    );

    for value in [expr, unset] {
        let rendered = render(&doc, &value);
        assert!(rendered.output.contains("attribute reference is undefined"));
        assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::AbsentReference);
    }
}

#[test]
fn test_problem_inside_expression_keeps_the_rest() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let two = number(&mut doc, 2);
    let missing = Value::Object(doc.new_object(concepts::NUMBER, Settings::new()).unwrap());
    let expr = binary(&mut doc, "+", two, missing);

    let rendered = render(&doc, &expr);

    assert_eq!(
        rendered.output,
        format!("2 + /* {PROBLEM_MARKER} number's value is undefined */")
    );
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::MissingValue);
}

#[test]
fn test_missing_operand() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let two = number(&mut doc, 2);
    let expr = Value::Object(
        doc.new_object(
            concepts::BINARY_OPERATION,
            settings(vec![("operator", "*".into()), ("left operand", two)]),
        )
        .unwrap(),
    );

    let rendered = render(&doc, &expr);

    assert!(
        rendered
            .output
            .ends_with("/* [GENERATION PROBLEM] binary operation's right operand is undefined */")
    );
}

#[test]
fn test_unhandled_concept_and_invalid_value() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let attribute = Value::Object(
        doc.new_object(concepts::DATA_ATTRIBUTE, Settings::new())
            .unwrap(),
    );

    let rendered = render(&doc, &attribute);
    assert_eq!(
        rendered.output,
        format!("/* {PROBLEM_MARKER} value of concept \"Data Attribute\" isn't handled as an expression */")
    );
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::UnhandledConcept);

    let rendered = render(&doc, &Value::from("oops"));
    assert_eq!(
        rendered.output,
        format!("/* {PROBLEM_MARKER} value \"oops\" isn't handled as an expression */")
    );
    assert_eq!(rendered.diagnostics[0].kind, DiagnosticKind::InvalidValue);
}

// ============================================================================
// The parenthesization predicate on its own
// ============================================================================

#[test]
fn test_requires_parentheses_only_for_binary_operations() {
    let mut doc = Document::new(concepts::RECORD_TYPE);
    let (two, three) = (number(&mut doc, 2), number(&mut doc, 3));
    let two_id = two.as_object().cloned().unwrap();
    let expr = binary(&mut doc, "*", two, three);
    let table = OperatorTable::default();

    let parent = doc.get(expr.as_object().unwrap()).unwrap();
    let leaf = doc.get(&two_id).unwrap();

    assert!(!table.requires_parentheses(leaf, Some(parent)));
    assert!(!table.requires_parentheses(parent, None));
    assert!(!table.requires_parentheses(parent, Some(doc.root_object())));
    assert_eq!(table.precedence_of("of"), Some(1));
    assert_eq!(table.precedence_of("%"), None);
}
