use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{Object, Resolver, Schema, Value, Variables, graphql};

fn nest(inner: Value) -> Value {
    Value::Object(Object::from_iter([("inner", inner)]))
}

fn schema_returning(me: Value) -> Schema {
    crate::build_schema(
        r#"
        type Query {
          me: User
          teamMate: User!
        }

        type User {
          name: String!
          nickname: String
        }
      "#,
    )
    .unwrap()
    .resolver("Query", "me", Resolver::sync(move |_| Ok(me.clone())))
    .finish()
    .unwrap()
}

async fn run(schema: &Schema, query: &str) -> serde_json::Value {
    let response = graphql(schema, query, &Value::Null, &(), &Variables::new(), None).await;
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn null_in_non_null_position_propagates_to_nearest_nullable_ancestor() {
    let schema = schema_returning(Value::Object(Object::from_iter([
        ("name", Value::Null),
        ("nickname", Value::from("spare")),
    ])));

    assert_eq!(
        run(&schema, "{ me { name nickname } }").await,
        json!({
            "data": {"me": null},
            "errors": [{
                "message": "Cannot return null for non-nullable field User.name.",
                "locations": [{"line": 1, "column": 8}],
                "path": ["me", "name"],
            }]
        }),
    );
}

#[tokio::test]
async fn nullable_siblings_survive() {
    let schema = schema_returning(Value::Object(Object::from_iter([(
        "name",
        Value::from("ada"),
    )])));

    assert_eq!(
        run(&schema, "{ me { name nickname } }").await,
        json!({"data": {"me": {"name": "ada", "nickname": null}}}),
    );
}

#[tokio::test]
async fn list_elements_nullify_independently() {
    let schema = crate::build_schema(
        r#"
        type Query {
          scores: [Int]
        }
      "#,
    )
    .unwrap()
    .resolver(
        "Query",
        "scores",
        Resolver::sync(|_| {
            Ok(Value::List(vec![
                Value::from(1),
                Value::from("not a number"),
                Value::from(3),
            ]))
        }),
    )
    .finish()
    .unwrap();

    let result = run(&schema, "{ scores }").await;
    assert_eq!(result["data"], json!({"scores": [1, null, 3]}));
    assert_eq!(result["errors"][0]["path"], json!(["scores", 1]));
}

#[tokio::test]
async fn non_null_list_elements_nullify_the_list() {
    let schema = crate::build_schema(
        r#"
        type Query {
          scores: [Int!]
        }
      "#,
    )
    .unwrap()
    .resolver(
        "Query",
        "scores",
        Resolver::sync(|_| {
            Ok(Value::List(vec![Value::from(1), Value::Null, Value::from(3)]))
        }),
    )
    .finish()
    .unwrap();

    let result = run(&schema, "{ scores }").await;
    assert_eq!(result["data"], json!({"scores": null}));
}
