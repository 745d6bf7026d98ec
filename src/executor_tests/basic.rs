use futures::FutureExt as _;
use pretty_assertions::assert_eq;
use serde_json::json;

use crate::{
    CancellationToken, ExecutionOptions, ExecutionStrategies, ExecutionStrategy, FieldResult,
    Resolver, ResolverContext, Schema, Value, Variables, graphql, graphql_with,
};

fn hello_schema() -> Schema {
    crate::build_schema(
        r#"
        schema {
          query: RootQueryType
        }

        type RootQueryType {
          hello(name: String): String
        }
      "#,
    )
    .unwrap()
    .resolver(
        "RootQueryType",
        "hello",
        Resolver::sync(|ctx: ResolverContext<'_>| {
            Ok(match ctx.arg("name").as_string_value() {
                Some(name) => Value::from(name),
                None => Value::from("world"),
            })
        }),
    )
    .finish()
    .unwrap()
}

async fn run(schema: &Schema, query: &str) -> serde_json::Value {
    run_with_variables(schema, query, &Variables::new()).await
}

async fn run_with_variables(
    schema: &Schema,
    query: &str,
    variables: &Variables,
) -> serde_json::Value {
    let response = graphql(schema, query, &Value::Null, &(), variables, None).await;
    serde_json::to_value(&response).unwrap()
}

#[tokio::test]
async fn hello_world() {
    let schema = hello_schema();

    assert_eq!(
        run(&schema, "{ hello }").await,
        json!({"data": {"hello": "world"}}),
    );
}

#[tokio::test]
async fn unknown_field_is_a_request_error() {
    let schema = hello_schema();

    assert_eq!(
        run(&schema, "{ boyhowdy }").await,
        json!({
            "errors": [{
                "message": "Cannot query field \"boyhowdy\" on type \"RootQueryType\".",
                "locations": [{"line": 1, "column": 3}],
            }]
        }),
    );
}

#[tokio::test]
async fn argument_from_variable() {
    let schema = hello_schema();

    let variables = Variables::from([("name".to_owned(), crate::InputValue::string("bob"))]);
    assert_eq!(
        run_with_variables(
            &schema,
            "query sayHello($name: String) { hello(name: $name) }",
            &variables,
        )
        .await,
        json!({"data": {"hello": "bob"}}),
    );
}

#[tokio::test]
async fn missing_required_variable_fails_before_execution() {
    let schema = crate::build_schema(
        r#"
        type Query {
          hello(name: String!): String
        }
      "#,
    )
    .unwrap()
    .resolver(
        "Query",
        "hello",
        Resolver::sync(|ctx: ResolverContext<'_>| Ok(ctx.arg("name").clone())),
    )
    .finish()
    .unwrap();

    assert_eq!(
        run(
            &schema,
            "query sayHello($name: String!) { hello(name: $name) }"
        )
        .await,
        json!({
            "errors": [{
                "message": "Variable \"$name\" of required type \"String!\" was not provided.",
                "locations": [{"line": 1, "column": 16}],
            }]
        }),
    );
}

fn deferred_answer<'a>(
    _: ResolverContext<'a>,
) -> futures::future::BoxFuture<'a, FieldResult<Value>> {
    async { Ok(Value::from(42)) }.boxed()
}

#[tokio::test]
async fn resolvers_may_defer() {
    let schema = crate::build_schema("type Query { answer: Int }")
        .unwrap()
        .resolver("Query", "answer", Resolver::new(deferred_answer))
        .finish()
        .unwrap();

    assert_eq!(
        run(&schema, "{ answer }").await,
        json!({"data": {"answer": 42}}),
    );
}

fn deferred_b<'a>(
    _: ResolverContext<'a>,
) -> futures::future::BoxFuture<'a, FieldResult<Value>> {
    async { Ok(Value::from("b")) }.boxed()
}

fn ordering_schema() -> Schema {
    crate::build_schema(
        r#"
        type Query {
          a: String
          b: String
          c: String
          nested: Query
        }
      "#,
    )
    .unwrap()
    .resolver("Query", "a", Resolver::sync(|_| Ok(Value::from("a"))))
    .resolver("Query", "b", Resolver::new(deferred_b))
    .resolver("Query", "c", Resolver::sync(|_| Ok(Value::from("c"))))
    .resolver(
        "Query",
        "nested",
        Resolver::sync(|_| Ok(Value::Object(crate::Object::new()))),
    )
    .finish()
    .unwrap()
}

#[tokio::test]
async fn response_keys_follow_document_order() {
    let schema = ordering_schema();

    let response = graphql(
        &schema,
        r#"
        {
          zed: c
          ...bFirst
          a
          nested { c a }
        }
        fragment bFirst on Query { b }
      "#,
        &Value::Null,
        &(),
        &Variables::new(),
        None,
    )
    .await;

    // Serialized key order is the order keys were first introduced by
    // document-order traversal, fragments expanded in place.
    assert_eq!(
        serde_json::to_string(&response).unwrap(),
        r#"{"data":{"zed":"c","b":"b","a":"a","nested":{"c":"c","a":"a"}}}"#,
    );
}

#[tokio::test]
async fn strategies_cannot_affect_the_response() {
    let schema = ordering_schema();
    let query = "{ a b c nested { a b } }";

    let mut expected = None;
    for strategy in [
        ExecutionStrategy::Serial,
        ExecutionStrategy::Concurrent,
        ExecutionStrategy::Dispatch(2),
    ] {
        let options = ExecutionOptions {
            strategies: ExecutionStrategies {
                query: strategy,
                ..ExecutionStrategies::default()
            },
            ..ExecutionOptions::default()
        };
        let response = graphql_with(
            &schema,
            query,
            &Value::Null,
            &(),
            &Variables::new(),
            None,
            &options,
        )
        .await;
        let serialized = serde_json::to_string(&response).unwrap();

        match &expected {
            None => expected = Some(serialized),
            Some(previous) => assert_eq!(previous, &serialized),
        }
    }
}

#[tokio::test]
async fn cancelled_requests_keep_partial_data_and_append_an_error() {
    let schema = hello_schema();

    let token = CancellationToken::new();
    token.cancel();

    let options = ExecutionOptions {
        token,
        ..ExecutionOptions::default()
    };
    let response = graphql_with(
        &schema,
        "{ hello }",
        &Value::Null,
        &(),
        &Variables::new(),
        None,
        &options,
    )
    .await;

    let serialized = serde_json::to_value(&response).unwrap();
    assert_eq!(serialized["data"], json!({"hello": null}));
    assert_eq!(
        serialized["errors"][0]["message"],
        json!("Execution was cancelled"),
    );
}

#[tokio::test]
async fn skip_and_include_are_honored() {
    let schema = ordering_schema();

    assert_eq!(
        run(
            &schema,
            r#"{ a @skip(if: true) b @include(if: false) c @include(if: true) }"#
        )
        .await,
        json!({"data": {"c": "c"}}),
    );
}

#[tokio::test]
async fn resolver_errors_nullify_only_their_field() {
    let schema = crate::build_schema("type Query { good: String bad: String }")
        .unwrap()
        .resolver("Query", "good", Resolver::sync(|_| Ok(Value::from("ok"))))
        .resolver(
            "Query",
            "bad",
            Resolver::sync(|_| Err(crate::FieldError::from("boom"))),
        )
        .finish()
        .unwrap();

    assert_eq!(
        run(&schema, "{ good bad }").await,
        json!({
            "data": {"good": "ok", "bad": null},
            "errors": [{
                "message": "boom",
                "locations": [{"line": 1, "column": 8}],
                "path": ["bad"],
            }]
        }),
    );
}
