use crate::{
    ast::{Definition, InputValue, Selection, Type},
    parser::{ParseError, Spanning, parse_document_source},
    printer::print_document,
};

fn parse_or_panic(s: &str) -> Vec<Definition<'_>> {
    parse_document_source(s).unwrap_or_else(|e| panic!("parse error on input {s:#?}: {e}"))
}

fn parse_err(s: &str) -> Spanning<ParseError> {
    match parse_document_source(s) {
        Ok(_) => panic!("expected parse failure on input {s:#?}"),
        Err(e) => e,
    }
}

/// A successfully parsed document prints back to source that re-parses to
/// the same tree; printing is a fixed point after one round.
fn assert_round_trip(s: &str) {
    let printed = print_document(&parse_or_panic(s));
    let reprinted = print_document(&parse_or_panic(&printed));
    assert_eq!(printed, reprinted, "printer round-trip diverged for {s:#?}");
}

#[test]
fn simple_query() {
    let doc = parse_or_panic("{ hello }");

    assert_eq!(doc.len(), 1);
    let Definition::Operation(op) = &doc[0] else {
        panic!("expected an operation definition");
    };
    assert_eq!(op.item.selection_set.len(), 1);
    let Selection::Field(field) = &op.item.selection_set[0] else {
        panic!("expected a field selection");
    };
    assert_eq!(field.item.name.item, "hello");
    assert_eq!(field.item.alias, None);
    assert_eq!(field.item.arguments, None);
    assert_eq!(field.item.selection_set, None);
}

#[test]
fn subscription_operation() {
    let doc = parse_or_panic("subscription OnEmail { importantEmail }");

    let Definition::Operation(op) = &doc[0] else {
        panic!("expected an operation definition");
    };
    assert_eq!(
        op.item.operation_type,
        crate::ast::OperationType::Subscription
    );
    assert_eq!(op.item.name.map(|n| n.item), Some("OnEmail"));
}

#[test]
fn field_arguments_and_values() {
    let doc = parse_or_panic(
        r#"{ field(int: 1, float: 1.5, string: "s", bool: true, nil: null, enum: VALUE, list: [1, 2], obj: {a: 1}, var: $v) }"#,
    );

    let Definition::Operation(op) = &doc[0] else {
        panic!("expected an operation definition");
    };
    let Selection::Field(field) = &op.item.selection_set[0] else {
        panic!("expected a field selection");
    };
    let args = &field.item.arguments.as_ref().unwrap().item;

    assert!(args.get("int").unwrap().item.unlocated_eq(&InputValue::Int(1)));
    assert!(
        args.get("float")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::Float(1.5))
    );
    assert!(
        args.get("string")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::string("s"))
    );
    assert!(
        args.get("bool")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::Boolean(true))
    );
    assert!(args.get("nil").unwrap().item.unlocated_eq(&InputValue::Null));
    assert!(
        args.get("enum")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::enum_value("VALUE"))
    );
    assert!(
        args.get("list")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::list(vec![
                InputValue::Int(1),
                InputValue::Int(2)
            ]))
    );
    assert!(
        args.get("obj")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::object(vec![("a", InputValue::Int(1))]))
    );
    assert!(
        args.get("var")
            .unwrap()
            .item
            .unlocated_eq(&InputValue::variable("v"))
    );
}

#[test]
fn variable_definitions() {
    let doc = parse_or_panic("query Q($id: ID!, $limit: Int = 10, $tags: [String!]) { node }");

    let Definition::Operation(op) = &doc[0] else {
        panic!("expected an operation definition");
    };
    let var_defs = &op.item.variable_definitions.as_ref().unwrap().item;
    let defs: Vec<_> = var_defs.iter().collect();

    assert_eq!(defs.len(), 3);
    assert_eq!(defs[0].0.item, "id");
    assert_eq!(defs[0].1.var_type.item, Type::NonNullNamed("ID"));
    assert_eq!(defs[1].0.item, "limit");
    assert!(
        defs[1]
            .1
            .default_value
            .as_ref()
            .unwrap()
            .item
            .unlocated_eq(&InputValue::Int(10))
    );
    assert_eq!(
        defs[2].1.var_type.item,
        Type::List(Box::new(Type::NonNullNamed("String"))),
    );
}

#[test]
fn fragments_and_spreads() {
    let doc = parse_or_panic(
        r#"
        query withFragments {
          user(id: 4) {
            friends(first: 10) { ...friendFields }
            mutualFriends(first: 10) { ...friendFields }
          }
        }

        fragment friendFields on User {
          id
          name
          ... on Pet { name }
          ... @include(if: true) { id }
        }
      "#,
    );

    assert_eq!(doc.len(), 2);
    assert!(matches!(&doc[1], Definition::Fragment(f) if f.item.name.item == "friendFields"));
}

#[test]
fn leading_and_trailing_commas_in_lists() {
    parse_or_panic(r#"{ field(arg: [, 1, 2, ,]) }"#);
}

#[test]
fn errors_carry_positions() {
    let err = parse_err("{");
    assert_eq!(err.item, ParseError::UnexpectedEndOfFile);

    let err = parse_err("query { }");
    assert_eq!(err.item, ParseError::unexpected_token(crate::parser::Token::CurlyClose));

    let err = parse_err("{ noSource");
    assert_eq!(err.item, ParseError::UnexpectedEndOfFile);
}

#[test]
fn round_trips_through_the_printer() {
    assert_round_trip("{ hello }");
    assert_round_trip("query Foo($a: Int = 3) { hello(a: $a) @skip(if: false) }");
    assert_round_trip(
        r#"
        mutation SendEmail {
          a: send(to: "foo@example.com", body: {subject: "hi", tags: [1, 2.5, null, true, RED]})
        }
      "#,
    );
    assert_round_trip(
        r#"
        subscription Sub { newMessage { body sender } }
        fragment frag on Message { body ... on Wide { extra } ...other }
      "#,
    );
}
