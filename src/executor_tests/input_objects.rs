use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{Resolver, ResolverContext, Schema, Value, Variables, graphql};

fn echo_schema(input_sdl: &str) -> Schema {
    crate::build_schema(&format!(
        r#"
        type Query {{
          echo(input: TestInputObject): TestOutputObject
        }}

        {input_sdl}

        type TestOutputObject {{
          field1: String
          field2: String
        }}
      "#,
    ))
    .unwrap()
    .resolver(
        "Query",
        "echo",
        Resolver::sync(|ctx: ResolverContext<'_>| Ok(ctx.arg("input").clone())),
    )
    .finish()
    .unwrap()
}

async fn run(schema: &Schema, query: &str) -> serde_json::Value {
    let response = graphql(schema, query, &Value::Null, &(), &Variables::new(), None).await;
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn explicit_null_is_preserved() {
    let schema = echo_schema(
        r#"
        input TestInputObject {
          field1: String
          field2: String
        }
      "#,
    );

    assert_eq!(
        run(
            &schema,
            r#"{ echo(input: {field1: "v1", field2: null}) { field1 field2 } }"#
        )
        .await,
        json!({"data": {"echo": {"field1": "v1", "field2": null}}}),
    );
}

#[tokio::test]
async fn omitted_field_picks_up_its_default() {
    let schema = echo_schema(
        r#"
        input TestInputObject {
          field1: String
          field2: String = "v2"
        }
      "#,
    );

    assert_eq!(
        run(
            &schema,
            r#"{ echo(input: {field1: "v1"}) { field1 field2 } }"#
        )
        .await,
        json!({"data": {"echo": {"field1": "v1", "field2": "v2"}}}),
    );
}

#[tokio::test]
async fn null_for_non_null_field_is_a_validation_error() {
    let schema = echo_schema(
        r#"
        input TestInputObject {
          field1: String
          field2: String!
        }
      "#,
    );

    assert_eq!(
        run(
            &schema,
            r#"{ echo(input: {field1: "v1", field2: null}) { field1 field2 } }"#
        )
        .await,
        json!({
            "errors": [{
                "message": "Expected value of type \"String!\", found null.",
                "locations": [{"line": 1, "column": 38}],
            }]
        }),
    );
}

#[tokio::test]
async fn unknown_keys_are_validation_errors() {
    let schema = echo_schema(
        r#"
        input TestInputObject {
          field1: String
          field2: String
        }
      "#,
    );

    assert_eq!(
        run(
            &schema,
            r#"{ echo(input: {field1: "v1", field3: "nope"}) { field1 } }"#
        )
        .await,
        json!({
            "errors": [{
                "message": "Field \"field3\" is not defined by type \"TestInputObject\". Did you mean \"field1\" or \"field2\"?",
                "locations": [{"line": 1, "column": 30}],
            }]
        }),
    );
}
