use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{Resolver, Schema, Value, Variables, graphql};

fn menagerie_schema() -> Schema {
    crate::build_schema(
        r#"
        "The entry point"
        type Query {
          pet: Pet
          dog: Dog
        }

        interface Named {
          name: String
        }

        union Pet = Dog | Cat

        type Dog implements Named {
          name: String
          barkVolume: Int @deprecated(reason: "too loud")
        }

        type Cat implements Named {
          name: String
          meows: Boolean
        }

        enum Mood {
          HAPPY
          GRUMPY @deprecated
        }
      "#,
    )
    .unwrap()
    .resolver("Query", "dog", Resolver::sync(|_| {
        Ok(Value::Object(crate::Object::from_iter([(
            "name",
            Value::from("rex"),
        )])))
    }))
    .finish()
    .unwrap()
}

async fn run(schema: &Schema, query: &str) -> serde_json::Value {
    let response = graphql(schema, query, &Value::Null, &(), &Variables::new(), None).await;
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn schema_meta_field() {
    let schema = menagerie_schema();

    assert_eq!(
        run(
            &schema,
            "{ __schema { queryType { name kind } mutationType { name } } }"
        )
        .await,
        json!({
            "data": {
                "__schema": {
                    "queryType": {"name": "Query", "kind": "OBJECT"},
                    "mutationType": null,
                }
            }
        }),
    );
}

#[tokio::test]
async fn type_meta_field() {
    let schema = menagerie_schema();

    assert_eq!(
        run(
            &schema,
            r#"{ __type(name: "Dog") { kind name interfaces { name } } }"#
        )
        .await,
        json!({
            "data": {
                "__type": {
                    "kind": "OBJECT",
                    "name": "Dog",
                    "interfaces": [{"name": "Named"}],
                }
            }
        }),
    );

    assert_eq!(
        run(&schema, r#"{ __type(name: "Missing") { name } }"#).await,
        json!({"data": {"__type": null}}),
    );
}

#[tokio::test]
async fn typename_meta_field() {
    let schema = menagerie_schema();

    assert_eq!(
        run(&schema, "{ __typename dog { __typename name } }").await,
        json!({"data": {"__typename": "Query", "dog": {"__typename": "Dog", "name": "rex"}}}),
    );
}

#[tokio::test]
async fn deprecated_fields_are_hidden_by_default() {
    let schema = menagerie_schema();

    assert_eq!(
        run(
            &schema,
            r#"{ __type(name: "Dog") { fields { name } } }"#
        )
        .await,
        json!({
            "data": {
                "__type": {"fields": [{"name": "name"}]}
            }
        }),
    );

    assert_eq!(
        run(
            &schema,
            r#"{ __type(name: "Dog") { fields(includeDeprecated: true) { name isDeprecated deprecationReason } } }"#
        )
        .await,
        json!({
            "data": {
                "__type": {
                    "fields": [
                        {"name": "name", "isDeprecated": false, "deprecationReason": null},
                        {"name": "barkVolume", "isDeprecated": true, "deprecationReason": "too loud"},
                    ]
                }
            }
        }),
    );
}

#[tokio::test]
async fn enum_values_and_deprecation() {
    let schema = menagerie_schema();

    assert_eq!(
        run(
            &schema,
            r#"{ __type(name: "Mood") { enumValues(includeDeprecated: true) { name isDeprecated deprecationReason } } }"#
        )
        .await,
        json!({
            "data": {
                "__type": {
                    "enumValues": [
                        {"name": "HAPPY", "isDeprecated": false, "deprecationReason": null},
                        {"name": "GRUMPY", "isDeprecated": true, "deprecationReason": "No longer supported"},
                    ]
                }
            }
        }),
    );
}

#[tokio::test]
async fn union_possible_types() {
    let schema = menagerie_schema();

    assert_eq!(
        run(
            &schema,
            r#"{ __type(name: "Pet") { kind possibleTypes { name } } }"#
        )
        .await,
        json!({
            "data": {
                "__type": {
                    "kind": "UNION",
                    "possibleTypes": [{"name": "Dog"}, {"name": "Cat"}],
                }
            }
        }),
    );
}

#[tokio::test]
async fn directives_are_exposed() {
    let schema = menagerie_schema();

    let result = run(
        &schema,
        "{ __schema { directives { name isRepeatable } } }",
    )
    .await;

    let directives = result["data"]["__schema"]["directives"]
        .as_array()
        .unwrap()
        .iter()
        .map(|d| d["name"].as_str().unwrap().to_owned())
        .collect::<Vec<_>>();

    for expected in ["skip", "include", "deprecated", "specifiedBy"] {
        assert!(directives.iter().any(|d| d == expected), "missing @{expected}");
    }
}

#[tokio::test]
async fn schema_description_is_exposed() {
    let schema = crate::build_schema(
        r#"
        "Service entry"
        schema {
          query: Query
        }

        type Query {
          ok: Boolean
        }
      "#,
    )
    .unwrap()
    .finish()
    .unwrap();

    assert_eq!(
        run(&schema, "{ __schema { description } }").await,
        json!({"data": {"__schema": {"description": "Service entry"}}}),
    );
}
