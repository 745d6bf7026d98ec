use crate::{
    ast::{
        Definition, DirectiveLocation, InputValue, Type, TypeDefinition, TypeSystemDefinition,
    },
    parser::parse_document_source,
    printer::print_document,
};

fn parse_or_panic(s: &str) -> Vec<Definition<'_>> {
    parse_document_source(s).unwrap_or_else(|e| panic!("parse error on input {s:#?}: {e}"))
}

#[test]
fn object_type_with_interfaces_and_description() {
    let doc = parse_or_panic(
        r#"
        "A being with a name"
        type Dog implements Being & Pet {
          "The name"
          name(surname: Boolean = false): String
          barkVolume: Int!
        }
      "#,
    );

    let Definition::TypeSystem(TypeSystemDefinition::Type(type_def)) = &doc[0] else {
        panic!("expected a type definition");
    };
    let TypeDefinition::Object(obj) = &type_def.item else {
        panic!("expected an object type definition");
    };

    assert_eq!(obj.name.item, "Dog");
    assert_eq!(
        obj.description.as_ref().map(|d| d.item.as_str()),
        Some("A being with a name")
    );
    assert_eq!(
        obj.interfaces.iter().map(|i| i.item).collect::<Vec<_>>(),
        vec!["Being", "Pet"]
    );
    assert_eq!(obj.fields.len(), 2);

    let name_field = &obj.fields[0].item;
    assert_eq!(name_field.name.item, "name");
    assert_eq!(
        name_field.description.as_ref().map(|d| d.item.as_str()),
        Some("The name")
    );
    assert_eq!(name_field.arguments.len(), 1);
    assert!(
        name_field.arguments[0]
            .item
            .default_value
            .as_ref()
            .unwrap()
            .item
            .unlocated_eq(&InputValue::Boolean(false))
    );

    assert_eq!(obj.fields[1].item.field_type.item, Type::NonNullNamed("Int"));
}

#[test]
fn schema_scalar_union_enum_input() {
    let doc = parse_or_panic(
        r#"
        schema {
          query: Query
          mutation: Mutation
          subscription: Subscription
        }

        scalar DateTime @specifiedBy(url: "https://example.com/datetime")

        union Pet = Dog | Cat

        enum Color {
          RED
          GREEN @deprecated(reason: "use RED")
        }

        input Point {
          x: Int!
          y: Int! = 0
        }
      "#,
    );

    assert_eq!(doc.len(), 5);

    let Definition::TypeSystem(TypeSystemDefinition::Schema(schema_def)) = &doc[0] else {
        panic!("expected a schema definition");
    };
    assert_eq!(schema_def.item.operation_types.len(), 3);

    let Definition::TypeSystem(TypeSystemDefinition::Type(union_def)) = &doc[2] else {
        panic!("expected a union definition");
    };
    let TypeDefinition::Union(u) = &union_def.item else {
        panic!("expected a union definition");
    };
    assert_eq!(
        u.members.iter().map(|m| m.item).collect::<Vec<_>>(),
        vec!["Dog", "Cat"]
    );
}

#[test]
fn directive_definitions() {
    let doc = parse_or_panic(
        r#"
        directive @cacheControl(maxAge: Int) on FIELD_DEFINITION | OBJECT
        directive @tag(name: String!) repeatable on SCHEMA | SCALAR
      "#,
    );

    let Definition::TypeSystem(TypeSystemDefinition::Directive(first)) = &doc[0] else {
        panic!("expected a directive definition");
    };
    assert_eq!(first.item.name.item, "cacheControl");
    assert!(!first.item.repeatable);
    assert_eq!(
        first.item.locations.iter().map(|l| l.item).collect::<Vec<_>>(),
        vec![
            DirectiveLocation::FieldDefinition,
            DirectiveLocation::Object
        ]
    );

    let Definition::TypeSystem(TypeSystemDefinition::Directive(second)) = &doc[1] else {
        panic!("expected a directive definition");
    };
    assert!(second.item.repeatable);
}

#[test]
fn extensions_retain_their_inner_definition() {
    let doc = parse_or_panic(
        r#"
        extend schema { mutation: Mutation }
        extend type Query { extra: String }
        extend enum Color { BLUE }
      "#,
    );

    assert!(matches!(
        &doc[0],
        Definition::TypeSystem(TypeSystemDefinition::SchemaExtension(..))
    ));

    let Definition::TypeSystem(TypeSystemDefinition::TypeExtension(ext)) = &doc[1] else {
        panic!("expected a type extension");
    };
    let TypeDefinition::Object(obj) = &ext.item else {
        panic!("extension retains its object definition");
    };
    assert_eq!(obj.name.item, "Query");
    assert_eq!(obj.fields.len(), 1);

    let Definition::TypeSystem(TypeSystemDefinition::TypeExtension(ext)) = &doc[2] else {
        panic!("expected a type extension");
    };
    assert!(matches!(&ext.item, TypeDefinition::Enum(e) if e.values.len() == 1));
}

#[test]
fn sdl_round_trips_through_the_printer() {
    let source = r#"
        schema {
          query: Query
        }

        interface Being {
          name: String
        }

        type Query implements Being {
          name: String
          dog(limit: Int = 10): [Dog!]!
        }

        union Search = Query | Dog

        type Dog {
          nickname: String @deprecated(reason: "fetch name")
        }

        input Filter {
          first: Int
          after: ID
        }

        directive @weight(value: Float!) on FIELD
      "#;

    let printed = print_document(&parse_or_panic(source));
    let reprinted = print_document(&parse_or_panic(&printed));
    assert_eq!(printed, reprinted);
}
